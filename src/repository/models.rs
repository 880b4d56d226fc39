use chrono::{NaiveDate, Weekday};
use std::sync::Arc;

use crate::shared::{geo::Coordinate, time::Time};

/// A station a traveler can board at. Platforms and entrances are folded
/// away during the build; everything left here can appear in a report.
#[derive(Debug, Default, Clone)]
pub struct Stop {
    /// The global internal index used for O(1) array lookups.
    pub index: u32,
    /// The unique external identifier.
    pub id: Arc<str>,
    /// The display name of the station.
    pub name: Arc<str>,
    /// A match-optimized version of the name (lowercased).
    pub normalized_name: Arc<str>,
    pub coordinate: Coordinate,
}

/// A named line (e.g. "Harlem Line") grouping trips for display.
#[derive(Debug, Default, Clone)]
pub struct Route {
    pub index: u32,
    pub id: Arc<str>,
    pub short_name: Option<Arc<str>>,
    pub long_name: Option<Arc<str>>,
    pub route_type: i32,
}

impl Route {
    /// The rider-facing line name, falling back to the id when the feed
    /// names the route neither way.
    pub fn display_name(&self) -> &str {
        self.long_name
            .as_deref()
            .or(self.short_name.as_deref())
            .unwrap_or(&self.id)
    }
}

/// A single scheduled run of a vehicle through an ordered stop sequence.
#[derive(Debug, Default, Clone)]
pub struct Trip {
    pub index: u32,
    pub id: Arc<str>,
    /// Pointer to the parent [`Route`].
    pub route_idx: u32,
    /// Pointer to the governing [`Service`].
    pub service_idx: u32,
    pub headsign: Option<Arc<str>>,
    pub short_name: Option<Arc<str>>,
    /// The trip's contiguous range in the global stop-time array.
    pub stop_times: Slice,
}

/// One scheduled call of a trip at a stop.
#[derive(Debug, Default, Clone, Copy)]
pub struct StopTime {
    /// Pointer to the parent [`Trip`].
    pub trip_idx: u32,
    /// Pointer to the visited [`Stop`].
    pub stop_idx: u32,
    /// Order of this call within the trip, as given by the feed.
    pub sequence: u32,
    pub arrival_time: Time,
    pub departure_time: Time,
}

/// A contiguous range within one of the repository's global arrays.
#[derive(Debug, Default, Clone, Copy)]
pub struct Slice {
    pub start: u32,
    pub count: u32,
}

impl Slice {
    pub fn range(&self) -> std::ops::Range<usize> {
        self.start as usize..(self.start + self.count) as usize
    }
}

/// A recurring weekly operating pattern with an inclusive date range,
/// identifying the dates a group of trips runs on.
///
/// A service that exists only as dated exceptions (legal in GTFS) gets an
/// all-false week, so its weekly verdict is never active and the
/// exceptions alone decide.
#[derive(Debug, Clone)]
pub struct Service {
    pub index: u32,
    pub id: Arc<str>,
    /// Monday-first operating flags.
    pub weekdays: [bool; 7],
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// The service's contiguous range in the global exception array.
    pub exceptions: Slice,
}

impl Default for Service {
    fn default() -> Self {
        Self {
            index: 0,
            id: "".into(),
            weekdays: [false; 7],
            start: NaiveDate::MIN,
            end: NaiveDate::MIN,
            exceptions: Slice::default(),
        }
    }
}

impl Service {
    pub fn runs_on(&self, weekday: Weekday) -> bool {
        self.weekdays[weekday.num_days_from_monday() as usize]
    }
}

/// Whether a dated exception turns service on or off that day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExceptionKind {
    Added,
    Removed,
}

/// A date-specific override of a [`Service`]'s weekly pattern.
#[derive(Debug, Clone, Copy)]
pub struct ServiceException {
    /// Pointer to the overridden [`Service`].
    pub service_idx: u32,
    pub date: NaiveDate,
    pub kind: ExceptionKind,
}
