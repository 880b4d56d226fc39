use chrono::NaiveDate;
use rayon::prelude::*;
use std::{collections::HashMap, sync::Arc};
use thiserror::Error;
use tracing::{debug, info};

mod models;
pub use models::*;

use crate::{
    gtfs::{self, Gtfs, models::GtfsCalendar, models::GtfsCalendarDate},
    shared::time::Time,
};

type IdToIndex = HashMap<Arc<str>, usize>;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Gtfs(#[from] gtfs::Error),
    #[error("trip {trip_id} references unknown route {route_id}")]
    UnknownRoute { trip_id: String, route_id: String },
    #[error("trip {trip_id} references unknown service {service_id}")]
    UnknownService { trip_id: String, service_id: String },
    #[error("stop time references unknown trip {trip_id}")]
    UnknownTrip { trip_id: String },
    #[error("stop time for trip {trip_id} references unknown stop {stop_id}")]
    UnknownStop { trip_id: String, stop_id: String },
    #[error("calendar entry for {service_id} has unparseable date {value}")]
    BadDate { service_id: String, value: String },
    #[error("calendar exception for {service_id} has unknown exception type {value}")]
    BadExceptionType { service_id: String, value: u8 },
    #[error("stop time for trip {trip_id} has unparseable time {value}")]
    BadTime { trip_id: String, value: String },
    #[error("stop times for trip {trip_id} regress at sequence {sequence}")]
    TimeRegression { trip_id: String, sequence: u32 },
}

/// The immutable, fully cross-referenced timetable index.
///
/// Built once from a streamed feed, then shared read-only by every query;
/// a dangling reference or a regressing stop sequence fails the build
/// instead of being skipped, since it means the feed is corrupt upstream.
#[derive(Debug, Clone, Default)]
pub struct Repository {
    pub stops: Box<[Stop]>,
    pub routes: Box<[Route]>,
    pub trips: Box<[Trip]>,
    pub stop_times: Box<[StopTime]>,
    pub services: Box<[Service]>,
    pub exceptions: Box<[ServiceException]>,

    stop_lookup: Arc<IdToIndex>,
    route_lookup: Arc<IdToIndex>,
    trip_lookup: Arc<IdToIndex>,
    service_lookup: Arc<IdToIndex>,
}

impl Repository {
    pub fn new() -> Self {
        Default::default()
    }

    /// Streams the feed's tables into the index.
    /// Depending on the size of the feed this can be a long blocking function.
    pub fn with_gtfs(mut self, gtfs: Gtfs) -> Result<Self, Error> {
        // Stations. Entrances and generic nodes never carry stop times,
        // so only stops, platforms and parent stations are kept.
        let mut stop_lookup: IdToIndex = HashMap::new();
        let mut stops: Vec<Stop> = Vec::new();
        gtfs.stream_stops(|(_, stop)| {
            if !matches!(stop.location_type, None | Some(0) | Some(1)) {
                return;
            }
            let normalized_name: Arc<str> = stop.stop_name.to_lowercase().into();
            let value = Stop {
                index: stops.len() as u32,
                id: stop.stop_id.into(),
                name: stop.stop_name.into(),
                normalized_name,
                coordinate: (stop.stop_lat, stop.stop_lon).into(),
            };
            stop_lookup.insert(value.id.clone(), stops.len());
            stops.push(value);
        })?;
        self.stops = stops.into();
        self.stop_lookup = stop_lookup.into();
        debug!("loaded {} stops", self.stops.len());

        // Routes
        let mut route_lookup: IdToIndex = HashMap::new();
        let mut routes: Vec<Route> = Vec::new();
        gtfs.stream_routes(|(i, route)| {
            let value = Route {
                index: i as u32,
                id: route.route_id.into(),
                short_name: route.route_short_name.map(|val| val.into()),
                long_name: route.route_long_name.map(|val| val.into()),
                route_type: route.route_type,
            };
            route_lookup.insert(value.id.clone(), i);
            routes.push(value);
        })?;
        self.routes = routes.into();
        self.route_lookup = route_lookup.into();
        debug!("loaded {} routes", self.routes.len());

        // Service calendars. The raw rows are buffered first because date
        // parsing can fail and the stream callback cannot propagate errors.
        let mut raw_calendars: Vec<GtfsCalendar> = Vec::new();
        gtfs.stream_calendar(|(_, row)| raw_calendars.push(row))?;
        let mut service_lookup: IdToIndex = HashMap::new();
        let mut services: Vec<Service> = Vec::new();
        for row in raw_calendars {
            let start = parse_service_date(&row.service_id, &row.start_date)?;
            let end = parse_service_date(&row.service_id, &row.end_date)?;
            let weekdays = [
                row.monday,
                row.tuesday,
                row.wednesday,
                row.thursday,
                row.friday,
                row.saturday,
                row.sunday,
            ]
            .map(|flag| flag == 1);
            let value = Service {
                index: services.len() as u32,
                id: row.service_id.into(),
                weekdays,
                start,
                end,
                exceptions: Slice::default(),
            };
            service_lookup.insert(value.id.clone(), services.len());
            services.push(value);
        }

        // Dated exceptions. A service id that never appeared in the weekly
        // table is legal in GTFS and becomes a service with an all-false
        // week, active only on its added dates.
        let mut raw_dates: Vec<GtfsCalendarDate> = Vec::new();
        gtfs.stream_calendar_dates(|(_, row)| raw_dates.push(row))?;
        let mut exceptions: Vec<ServiceException> = Vec::with_capacity(raw_dates.len());
        for row in raw_dates {
            let date = parse_service_date(&row.service_id, &row.date)?;
            let kind = match row.exception_type {
                1 => ExceptionKind::Added,
                2 => ExceptionKind::Removed,
                other => {
                    return Err(Error::BadExceptionType {
                        service_id: row.service_id,
                        value: other,
                    });
                }
            };
            let service_idx = match service_lookup.get(row.service_id.as_str()) {
                Some(index) => *index,
                None => {
                    let index = services.len();
                    let value = Service {
                        index: index as u32,
                        id: row.service_id.into(),
                        ..Default::default()
                    };
                    service_lookup.insert(value.id.clone(), index);
                    services.push(value);
                    index
                }
            };
            exceptions.push(ServiceException {
                service_idx: service_idx as u32,
                date,
                kind,
            });
        }
        exceptions.sort_by_key(|exception| exception.service_idx);
        let mut cursor = 0;
        while cursor < exceptions.len() {
            let service_idx = exceptions[cursor].service_idx as usize;
            let start = cursor;
            while cursor < exceptions.len()
                && exceptions[cursor].service_idx as usize == service_idx
            {
                cursor += 1;
            }
            services[service_idx].exceptions = Slice {
                start: start as u32,
                count: (cursor - start) as u32,
            };
        }
        self.services = services.into();
        self.exceptions = exceptions.into();
        self.service_lookup = service_lookup.into();
        debug!(
            "loaded {} services with {} dated exceptions",
            self.services.len(),
            self.exceptions.len()
        );

        // Trips
        let mut raw_trips: Vec<gtfs::models::GtfsTrip> = Vec::new();
        gtfs.stream_trips(|(_, row)| raw_trips.push(row))?;
        let mut trip_lookup: IdToIndex = HashMap::new();
        let mut trips: Vec<Trip> = Vec::with_capacity(raw_trips.len());
        for row in raw_trips {
            let route_idx =
                *self
                    .route_lookup
                    .get(row.route_id.as_str())
                    .ok_or_else(|| Error::UnknownRoute {
                        trip_id: row.trip_id.clone(),
                        route_id: row.route_id.clone(),
                    })?;
            let service_idx = *self.service_lookup.get(row.service_id.as_str()).ok_or_else(
                || Error::UnknownService {
                    trip_id: row.trip_id.clone(),
                    service_id: row.service_id.clone(),
                },
            )?;
            let value = Trip {
                index: trips.len() as u32,
                id: row.trip_id.into(),
                route_idx: route_idx as u32,
                service_idx: service_idx as u32,
                headsign: row.trip_headsign.map(|val| val.into()),
                short_name: row.trip_short_name.map(|val| val.into()),
                stop_times: Slice::default(),
            };
            trip_lookup.insert(value.id.clone(), trips.len());
            trips.push(value);
        }
        self.trip_lookup = trip_lookup.into();
        debug!("loaded {} trips", trips.len());

        // Stop times, grouped per trip and checked for regressions
        let mut raw_stop_times: Vec<gtfs::models::GtfsStopTime> = Vec::new();
        gtfs.stream_stop_times(|(_, row)| raw_stop_times.push(row))?;
        let mut stop_times: Vec<StopTime> = Vec::with_capacity(raw_stop_times.len());
        for row in raw_stop_times {
            let trip_idx =
                *self
                    .trip_lookup
                    .get(row.trip_id.as_str())
                    .ok_or_else(|| Error::UnknownTrip {
                        trip_id: row.trip_id.clone(),
                    })?;
            let stop_idx =
                *self
                    .stop_lookup
                    .get(row.stop_id.as_str())
                    .ok_or_else(|| Error::UnknownStop {
                        trip_id: row.trip_id.clone(),
                        stop_id: row.stop_id.clone(),
                    })?;
            let arrival_time =
                Time::parse_hms(&row.arrival_time).ok_or_else(|| Error::BadTime {
                    trip_id: row.trip_id.clone(),
                    value: row.arrival_time.clone(),
                })?;
            let departure_time =
                Time::parse_hms(&row.departure_time).ok_or_else(|| Error::BadTime {
                    trip_id: row.trip_id.clone(),
                    value: row.departure_time.clone(),
                })?;
            stop_times.push(StopTime {
                trip_idx: trip_idx as u32,
                stop_idx: stop_idx as u32,
                sequence: row.stop_sequence,
                arrival_time,
                departure_time,
            });
        }
        stop_times.par_sort_by_key(|val| (val.trip_idx, val.sequence));
        let mut cursor = 0;
        while cursor < stop_times.len() {
            let trip_idx = stop_times[cursor].trip_idx as usize;
            let start = cursor;
            while cursor < stop_times.len() && stop_times[cursor].trip_idx as usize == trip_idx {
                let call = &stop_times[cursor];
                if call.departure_time < call.arrival_time {
                    return Err(Error::TimeRegression {
                        trip_id: trips[trip_idx].id.to_string(),
                        sequence: call.sequence,
                    });
                }
                if cursor > start && call.arrival_time < stop_times[cursor - 1].departure_time {
                    return Err(Error::TimeRegression {
                        trip_id: trips[trip_idx].id.to_string(),
                        sequence: call.sequence,
                    });
                }
                cursor += 1;
            }
            trips[trip_idx].stop_times = Slice {
                start: start as u32,
                count: (cursor - start) as u32,
            };
        }
        self.stop_times = stop_times.into();
        self.trips = trips.into();

        info!(
            "indexed {} stops, {} trips, {} stop times",
            self.stops.len(),
            self.trips.len(),
            self.stop_times.len()
        );
        Ok(self)
    }

    /// Get a stop with the given id.
    /// If no stop is found with the given id None is returned.
    pub fn stop_by_id(&self, id: &str) -> Option<&Stop> {
        let index = self.stop_lookup.get(id)?;
        Some(&self.stops[*index])
    }

    /// Get a route with the given id.
    pub fn route_by_id(&self, id: &str) -> Option<&Route> {
        let index = self.route_lookup.get(id)?;
        Some(&self.routes[*index])
    }

    /// Get a trip with the given id.
    pub fn trip_by_id(&self, id: &str) -> Option<&Trip> {
        let index = self.trip_lookup.get(id)?;
        Some(&self.trips[*index])
    }

    /// Get a service calendar with the given id.
    pub fn service_by_id(&self, id: &str) -> Option<&Service> {
        let index = self.service_lookup.get(id)?;
        Some(&self.services[*index])
    }

    /// Returns a trip's calls in stop-sequence order.
    pub fn stop_times_by_trip_idx(&self, trip_idx: u32) -> &[StopTime] {
        let slice = self.trips[trip_idx as usize].stop_times;
        &self.stop_times[slice.range()]
    }

    /// Returns a service's dated exceptions.
    pub fn exceptions_for(&self, service: &Service) -> &[ServiceException] {
        &self.exceptions[service.exceptions.range()]
    }

    /// Case-insensitive substring match over stop names, exact-name and
    /// shorter matches first. Used to resolve a terminal given as text.
    pub fn stops_matching_name(&self, needle: &str) -> Vec<&Stop> {
        let normalized_needle = needle.to_lowercase();
        let mut matches: Vec<&Stop> = self
            .stops
            .iter()
            .filter(|stop| stop.normalized_name.contains(&normalized_needle))
            .collect();
        matches.sort_by_key(|stop| {
            (
                stop.normalized_name.as_ref() != normalized_needle,
                stop.name.len(),
                stop.id.clone(),
            )
        });
        matches
    }
}

fn parse_service_date(service_id: &str, value: &str) -> Result<NaiveDate, Error> {
    NaiveDate::parse_from_str(value.trim(), "%Y%m%d").map_err(|_| Error::BadDate {
        service_id: service_id.to_string(),
        value: value.to_string(),
    })
}
