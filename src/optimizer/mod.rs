mod drive;
pub use drive::*;

use thiserror::Error;
use tracing::debug;

use crate::{
    planner::{StationTimes, TrainLeg},
    repository::Repository,
    shared::time::{Duration, Time},
};

#[derive(Error, Debug)]
pub enum Error {
    #[error("no station has both a drive estimate and a qualifying train")]
    NoFeasibleOption,
}

/// One station that qualifies on both legs.
#[derive(Debug, Clone, Copy)]
pub struct CombinedOption {
    pub stop_idx: u32,
    pub leg: TrainLeg,
    pub drive: DriveEstimate,
    /// Drive duration plus scheduled train duration.
    pub total: Duration,
}

impl CombinedOption {
    /// The latest moment the traveler can board and still make the
    /// target: the chosen trip's departure at this station.
    pub fn boarding_deadline(&self) -> Time {
        self.leg.departure
    }
}

/// The joined comparison across all stations, options first by total.
///
/// Exclusions are carried explicitly rather than silently shrinking the
/// candidate set: `no_train` holds stations with no qualifying trip,
/// `no_drive` stations whose train leg was fine but that lack a road
/// estimate, and `unmatched_drive` collaborator entries naming stations
/// the feed does not know.
#[derive(Debug, Clone, Default)]
pub struct Ranking {
    pub options: Vec<CombinedOption>,
    pub no_train: Vec<u32>,
    pub no_drive: Vec<u32>,
    pub unmatched_drive: Vec<String>,
}

impl Ranking {
    /// The minimizing option, if any station qualified.
    pub fn best(&self) -> Option<&CombinedOption> {
        self.options.first()
    }

    pub fn best_or_err(&self) -> Result<&CombinedOption, Error> {
        self.best().ok_or(Error::NoFeasibleOption)
    }
}

/// Joins per-station train times with per-station drive times and ranks
/// every station that has both. Ordering: ascending total, ties broken
/// by earlier terminal arrival, then by stop id for determinism.
pub fn rank(repository: &Repository, times: &StationTimes, drives: &DriveTimes) -> Ranking {
    let mut ranking = Ranking::default();
    for (stop_idx, train) in times.stations() {
        let Some(leg) = train.leg() else {
            ranking.no_train.push(stop_idx);
            continue;
        };
        let stop = &repository.stops[stop_idx as usize];
        let Some(drive) = drives.get(stop.id.as_ref()) else {
            ranking.no_drive.push(stop_idx);
            continue;
        };
        ranking.options.push(CombinedOption {
            stop_idx,
            leg: *leg,
            drive: *drive,
            total: drive.duration + leg.duration(),
        });
    }

    for id in drives.keys() {
        if repository.stop_by_id(id).is_none() {
            ranking.unmatched_drive.push(id.to_string());
        }
    }
    ranking.unmatched_drive.sort();

    ranking.options.sort_by(|a, b| {
        a.total
            .cmp(&b.total)
            .then(a.leg.arrival.cmp(&b.leg.arrival))
            .then_with(|| {
                let a_id = &repository.stops[a.stop_idx as usize].id;
                let b_id = &repository.stops[b.stop_idx as usize].id;
                a_id.cmp(b_id)
            })
    });

    debug!(
        "ranked {} options ({} without a qualifying train, {} without a drive estimate)",
        ranking.options.len(),
        ranking.no_train.len(),
        ranking.no_drive.len()
    );
    ranking
}
