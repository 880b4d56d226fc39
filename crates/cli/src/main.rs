mod geocode;
mod osrm;
mod report;

use chrono::NaiveDate;
use railhead::{
    gtfs::{Config, Gtfs},
    optimizer,
    planner::ArriveBy,
    repository::{Repository, Stop},
    shared::time::Time,
};
use std::{path::Path, time::Instant};
use tracing::{error, info};

const DEFAULT_TERMINAL: &str = "Grand Central Terminal";
const TRAIN_TIMES_FILE: &str = "station_train_times.csv";
const RANKING_FILE: &str = "ranked_trip_options.csv";

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().init();

    let args: Vec<_> = std::env::args().collect();
    if args.len() < 5 {
        error!(
            "Usage: railhead-cli <gtfs.zip> <origin address> <YYYY-MM-DD> <HH:MM> [terminal name]"
        );
        std::process::exit(1);
    }
    let path = match Path::new(&args[1]).canonicalize() {
        Ok(path) => path,
        Err(err) => {
            error!("Cannot open feed {}: {err}", args[1]);
            std::process::exit(1);
        }
    };
    let address = &args[2];
    let date = match NaiveDate::parse_from_str(&args[3], "%Y-%m-%d") {
        Ok(date) => date,
        Err(err) => {
            error!("Bad target date {}: {err}", args[3]);
            std::process::exit(1);
        }
    };
    let target = match Time::parse_hm(&args[4]) {
        Some(target) => target,
        None => {
            error!("Bad target arrival time {} (expected HH:MM)", args[4]);
            std::process::exit(1);
        }
    };
    let terminal_name = args.get(5).map(String::as_str).unwrap_or(DEFAULT_TERMINAL);

    info!("Loading feed...");
    let now = Instant::now();
    let gtfs = Gtfs::new(Config::default()).from_zip(path);
    let repository = match Repository::new().with_gtfs(gtfs) {
        Ok(repository) => repository,
        Err(err) => {
            error!("Feed is inconsistent: {err}");
            std::process::exit(1);
        }
    };
    info!("Loading feed took {:?}", now.elapsed());

    let terminal = match repository.stops_matching_name(terminal_name).first() {
        Some(stop) => (*stop).clone(),
        None => {
            error!("No stop in the feed matches terminal name '{terminal_name}'");
            std::process::exit(1);
        }
    };
    info!("Terminal resolved to {} ({})", terminal.name, terminal.id);

    let times = match ArriveBy::new(&repository, &terminal.id)
        .on(date)
        .arrive_by(target)
        .solve()
    {
        Ok(times) => times,
        Err(err) => {
            error!("{err}");
            std::process::exit(1);
        }
    };
    info!(
        "{} stations have a train arriving by {} on {}, {} do not",
        times.feasible_count(),
        target,
        date,
        times.infeasible_count()
    );

    info!("Geocoding {address}...");
    let origin = match geocode::locate(address).await {
        Ok(Some(origin)) => origin,
        Ok(None) => {
            error!("Could not geocode address: {address}");
            std::process::exit(1);
        }
        Err(err) => {
            error!("Geocoding failed: {err}");
            std::process::exit(1);
        }
    };
    info!("Origin located at {origin}");

    // Only stations with a qualifying train need a road estimate
    let reachable: Vec<&Stop> = times
        .stations()
        .filter(|(_, train)| train.is_feasible())
        .map(|(stop_idx, _)| &repository.stops[stop_idx as usize])
        .collect();
    info!("Computing driving times to {} stations...", reachable.len());
    let drives = osrm::drive_times(origin, &reachable).await;

    let ranking = optimizer::rank(&repository, &times, &drives);

    if let Err(err) = report::write_train_times(TRAIN_TIMES_FILE, &repository, &times) {
        error!("Could not write {TRAIN_TIMES_FILE}: {err}");
        std::process::exit(1);
    }
    if let Err(err) = report::write_ranking(RANKING_FILE, &repository, &times, &ranking) {
        error!("Could not write {RANKING_FILE}: {err}");
        std::process::exit(1);
    }
    info!("Saved {TRAIN_TIMES_FILE} and {RANKING_FILE}");

    match ranking.best() {
        Some(best) => {
            let stop = &repository.stops[best.stop_idx as usize];
            let line = repository.routes[best.leg.route_idx as usize].display_name();
            info!("Best option: {} ({})", stop.name, line);
            info!("  Drive time: {}", best.drive.duration);
            info!("  Train time: {}", best.leg.duration());
            info!("  Total travel: {}", best.total);
            info!(
                "  Depart {} by {} to arrive {} at {}",
                stop.name,
                best.boarding_deadline(),
                terminal.name,
                best.leg.arrival
            );
        }
        None => {
            error!(
                "No feasible option: {} stations had no qualifying train, {} lacked a drive estimate",
                ranking.no_train.len(),
                ranking.no_drive.len()
            );
            std::process::exit(1);
        }
    }
}
