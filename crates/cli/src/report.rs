use railhead::{optimizer::Ranking, planner::StationTimes, repository::Repository};
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct TrainTimeRecord<'a> {
    station: &'a str,
    line: &'a str,
    scheduled_departure: String,
    scheduled_arrival: String,
    train_min: Option<f64>,
    status: &'a str,
}

/// The per-station train-time report: every station in the feed, the
/// quickest qualifying rides first, stations with no qualifying train
/// at the bottom with an explicit status.
pub fn write_train_times(
    path: impl AsRef<Path>,
    repository: &Repository,
    times: &StationTimes,
) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_path(path)?;
    let mut stations: Vec<_> = times.stations().collect();
    stations.sort_by(|(a_idx, a_train), (b_idx, b_train)| {
        let a_key = a_train.leg().map(|leg| leg.duration().as_seconds());
        let b_key = b_train.leg().map(|leg| leg.duration().as_seconds());
        // None sorts last, equal rides fall back to the station name
        match (a_key, b_key) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        }
        .then_with(|| {
            let a_name = &repository.stops[*a_idx as usize].name;
            let b_name = &repository.stops[*b_idx as usize].name;
            a_name.cmp(b_name)
        })
    });

    for (stop_idx, train) in stations {
        let stop = &repository.stops[stop_idx as usize];
        match train.leg() {
            Some(leg) => writer.serialize(TrainTimeRecord {
                station: &stop.name,
                line: repository.routes[leg.route_idx as usize].display_name(),
                scheduled_departure: leg.departure.to_hm_string(),
                scheduled_arrival: leg.arrival.to_hm_string(),
                train_min: Some(round1(leg.duration().as_minutes())),
                status: "",
            })?,
            None => writer.serialize(TrainTimeRecord {
                station: &stop.name,
                line: "",
                scheduled_departure: String::new(),
                scheduled_arrival: String::new(),
                train_min: None,
                status: "no qualifying train",
            })?,
        }
    }
    writer.flush()?;
    Ok(())
}

#[derive(Serialize)]
struct RankedRecord<'a> {
    station: &'a str,
    line: &'a str,
    drive_min: Option<f64>,
    drive_km: Option<f64>,
    train_min: Option<f64>,
    scheduled_departure: String,
    scheduled_arrival: String,
    total_min: Option<f64>,
    status: &'a str,
}

/// The full comparison table: ranked options ascending by total, then
/// the excluded stations with the reason they fell out.
pub fn write_ranking(
    path: impl AsRef<Path>,
    repository: &Repository,
    times: &StationTimes,
    ranking: &Ranking,
) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_path(path)?;
    for option in &ranking.options {
        let stop = &repository.stops[option.stop_idx as usize];
        let line = repository.routes[option.leg.route_idx as usize].display_name();
        writer.serialize(RankedRecord {
            station: &stop.name,
            line,
            drive_min: Some(round1(option.drive.duration.as_minutes())),
            drive_km: Some(round1(option.drive.distance.as_kilometers())),
            train_min: Some(round1(option.leg.duration().as_minutes())),
            scheduled_departure: option.leg.departure.to_hm_string(),
            scheduled_arrival: option.leg.arrival.to_hm_string(),
            total_min: Some(round1(option.total.as_minutes())),
            status: "",
        })?;
    }
    for stop_idx in &ranking.no_drive {
        let stop = &repository.stops[*stop_idx as usize];
        let leg = times.train(*stop_idx).leg();
        writer.serialize(RankedRecord {
            station: &stop.name,
            line: leg
                .map(|leg| repository.routes[leg.route_idx as usize].display_name())
                .unwrap_or(""),
            drive_min: None,
            drive_km: None,
            train_min: leg.map(|leg| round1(leg.duration().as_minutes())),
            scheduled_departure: leg
                .map(|leg| leg.departure.to_hm_string())
                .unwrap_or_default(),
            scheduled_arrival: leg
                .map(|leg| leg.arrival.to_hm_string())
                .unwrap_or_default(),
            total_min: None,
            status: "no drive estimate",
        })?;
    }
    for stop_idx in &ranking.no_train {
        let stop = &repository.stops[*stop_idx as usize];
        writer.serialize(RankedRecord {
            station: &stop.name,
            line: "",
            drive_min: None,
            drive_km: None,
            train_min: None,
            scheduled_departure: String::new(),
            scheduled_arrival: String::new(),
            total_min: None,
            status: "no qualifying train",
        })?;
    }
    writer.flush()?;
    Ok(())
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
