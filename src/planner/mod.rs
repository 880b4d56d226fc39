pub mod service_day;
pub mod times;

pub use times::*;

use chrono::NaiveDate;
use rayon::prelude::*;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use crate::{repository::Repository, shared::time::Time};

#[derive(Error, Debug)]
pub enum Error {
    #[error("terminal stop id does not match any entry")]
    InvalidTerminalID,
}

/// One qualifying boarding found while walking a trip: a station the
/// trip calls at before reaching the terminal in time.
struct Candidate {
    stop_idx: u32,
    leg: TrainLeg,
}

/// Arrive-by query over the repository: for every station, the latest
/// train that still reaches the terminal by the target time on the
/// given date, and how long that ride takes.
///
/// Defaults to today and the end of the civil day, so an unadorned
/// solve answers "what is the last train in from each station today".
pub struct ArriveBy<'a> {
    repository: &'a Repository,
    terminal: Arc<str>,
    date: NaiveDate,
    target: Time,
}

impl<'a> ArriveBy<'a> {
    pub fn new(repository: &'a Repository, terminal_id: &str) -> Self {
        Self {
            repository,
            terminal: terminal_id.into(),
            date: chrono::Local::now().date_naive(),
            target: Time::END_OF_DAY,
        }
    }

    pub fn on(mut self, date: NaiveDate) -> Self {
        self.date = date;
        self
    }

    pub fn arrive_by(mut self, target: Time) -> Self {
        self.target = target;
        self
    }

    pub fn solve(self) -> Result<StationTimes, self::Error> {
        let terminal = self
            .repository
            .stop_by_id(&self.terminal)
            .ok_or(self::Error::InvalidTerminalID)?;

        let active = service_day::active_services(self.repository, self.date);
        debug!(
            "{} of {} services active on {}",
            active.iter().filter(|flag| **flag).count(),
            active.len(),
            self.date
        );

        // Walk every trip that runs on the date and reaches the terminal
        // by the target, collecting one candidate per earlier call.
        let candidates: Vec<Candidate> = self
            .repository
            .trips
            .par_iter()
            .filter(|trip| active[trip.service_idx as usize])
            .flat_map(|trip| {
                let calls = self.repository.stop_times_by_trip_idx(trip.index);
                let Some(position) = calls
                    .iter()
                    .position(|call| call.stop_idx == terminal.index)
                else {
                    return Vec::new();
                };
                let arrival = calls[position].arrival_time;
                if arrival > self.target {
                    return Vec::new();
                }
                calls[..position]
                    .iter()
                    .filter(|call| call.departure_time < arrival)
                    .filter(|call| call.stop_idx != terminal.index)
                    .map(|call| Candidate {
                        stop_idx: call.stop_idx,
                        leg: TrainLeg {
                            trip_idx: trip.index,
                            route_idx: trip.route_idx,
                            departure: call.departure_time,
                            arrival,
                        },
                    })
                    .collect()
            })
            .collect();
        debug!("{} qualifying boardings collected", candidates.len());

        // Keep the best candidate per station: latest departure wins,
        // equal departures fall back to the earlier terminal arrival.
        let mut times = vec![TrainTime::NoQualifyingTrip; self.repository.stops.len()];
        for candidate in candidates {
            let slot = &mut times[candidate.stop_idx as usize];
            let replace = match slot.leg() {
                Some(incumbent) => beats(&candidate.leg, incumbent),
                None => true,
            };
            if replace {
                *slot = TrainTime::Feasible(candidate.leg);
            }
        }

        Ok(StationTimes::new(
            self.date,
            self.target,
            terminal.index,
            times,
        ))
    }
}

fn beats(challenger: &TrainLeg, incumbent: &TrainLeg) -> bool {
    challenger.departure > incumbent.departure
        || (challenger.departure == incumbent.departure
            && challenger.arrival < incumbent.arrival)
}
