use chrono::NaiveDate;

use crate::shared::time::{Duration, Time};

/// The chosen boarding for one station: the latest trip that still
/// reaches the terminal by the target.
#[derive(Debug, Clone, Copy)]
pub struct TrainLeg {
    /// Index of the chosen trip.
    pub trip_idx: u32,
    /// Index of the trip's route, for report line names.
    pub route_idx: u32,
    /// Departure time-of-day at the origin station - the boarding deadline.
    pub departure: Time,
    /// Arrival time-of-day at the terminal.
    pub arrival: Time,
}

impl TrainLeg {
    pub fn duration(&self) -> Duration {
        self.arrival - self.departure
    }
}

/// Per-station outcome of an arrive-by query. Infeasibility is a value,
/// not an error: it has to flow through to the final report so callers
/// can say how many stations had no qualifying train.
#[derive(Debug, Clone, Copy, Default)]
pub enum TrainTime {
    Feasible(TrainLeg),
    #[default]
    NoQualifyingTrip,
}

impl TrainTime {
    pub fn is_feasible(&self) -> bool {
        matches!(self, TrainTime::Feasible(_))
    }

    pub fn leg(&self) -> Option<&TrainLeg> {
        match self {
            TrainTime::Feasible(leg) => Some(leg),
            TrainTime::NoQualifyingTrip => None,
        }
    }
}

/// The full per-station answer for one (date, target arrival) query.
///
/// Covers every station in the feed except the terminal itself; a pure
/// computation result, rebuilt on each request and never mutated.
#[derive(Debug, Clone)]
pub struct StationTimes {
    pub date: NaiveDate,
    pub target: Time,
    /// Stop index of the terminal the query was run against.
    pub terminal: u32,
    times: Box<[TrainTime]>,
}

impl StationTimes {
    pub(crate) fn new(
        date: NaiveDate,
        target: Time,
        terminal: u32,
        times: Vec<TrainTime>,
    ) -> Self {
        Self {
            date,
            target,
            terminal,
            times: times.into(),
        }
    }

    /// The outcome for one stop index.
    pub fn train(&self, stop_idx: u32) -> &TrainTime {
        &self.times[stop_idx as usize]
    }

    /// All stations with their outcomes, terminal excluded.
    pub fn stations(&self) -> impl Iterator<Item = (u32, &TrainTime)> {
        self.times
            .iter()
            .enumerate()
            .map(|(index, train)| (index as u32, train))
            .filter(|(index, _)| *index != self.terminal)
    }

    pub fn feasible_count(&self) -> usize {
        self.stations().filter(|(_, train)| train.is_feasible()).count()
    }

    pub fn infeasible_count(&self) -> usize {
        self.stations().filter(|(_, train)| !train.is_feasible()).count()
    }
}
