mod common;

use chrono::NaiveDate;
use railhead::optimizer::{self, DriveEstimate, DriveTimes};
use railhead::planner::{ArriveBy, StationTimes};
use railhead::repository::Repository;
use railhead::shared::{geo::Distance, time::Duration, time::Time};

fn solve(repository: &Repository) -> StationTimes {
    ArriveBy::new(repository, "TRM")
        .on(NaiveDate::from_ymd_opt(2026, 5, 20).unwrap())
        .arrive_by(Time::parse_hm("08:30").unwrap())
        .solve()
        .unwrap()
}

fn estimate(seconds: u32, km: f64) -> DriveEstimate {
    DriveEstimate {
        duration: Duration::from_seconds(seconds),
        distance: Distance::from_kilometers(km),
    }
}

#[test]
fn picks_the_minimum_total() {
    let repository = common::repository("optimizer-min", &common::standard_feed());
    let times = solve(&repository);

    let mut drives = DriveTimes::new();
    drives.insert("AAA".into(), estimate(318, 4.1)); // 5.3 min
    drives.insert("BBB".into(), estimate(720, 9.8)); // 12.0 min
    drives.insert("CCC".into(), estimate(300, 3.9));

    let ranking = optimizer::rank(&repository, &times, &drives);
    // Ashford: 5.3 + 39.0 = 44.3 min beats Brookdale: 12.0 + 45.0 = 57.0
    assert_eq!(ranking.options.len(), 2);
    let best = ranking.best().unwrap();
    let stop = &repository.stops[best.stop_idx as usize];
    assert_eq!(stop.id.as_ref(), "AAA");
    assert_eq!(best.total.as_minutes(), 44.3);
    assert_eq!(best.boarding_deadline().to_hm_string(), "07:49");
    assert_eq!(best.leg.arrival.to_hm_string(), "08:28");

    // Chester had a drive estimate but no qualifying train
    assert_eq!(ranking.no_train.len(), 1);
    assert!(ranking.no_drive.is_empty());

    // Removing the winner leaves Brookdale as the new, worse minimum
    drives.remove("AAA");
    let rerun = optimizer::rank(&repository, &times, &drives);
    let second = rerun.best().unwrap();
    assert_eq!(repository.stops[second.stop_idx as usize].id.as_ref(), "BBB");
    assert!(second.total > best.total);
}

#[test]
fn missing_drive_estimates_are_counted_not_defaulted() {
    let repository = common::repository("optimizer-missing", &common::standard_feed());
    let times = solve(&repository);

    let mut drives = DriveTimes::new();
    drives.insert("AAA".into(), estimate(318, 4.1));

    let ranking = optimizer::rank(&repository, &times, &drives);
    assert_eq!(ranking.options.len(), 1);
    // Brookdale has a feasible train but no road estimate; Chester has
    // neither and lands in the other tally.
    let brookdale = repository.stop_by_id("BBB").unwrap();
    assert_eq!(ranking.no_drive, vec![brookdale.index]);
    let chester = repository.stop_by_id("CCC").unwrap();
    assert_eq!(ranking.no_train, vec![chester.index]);
}

#[test]
fn drive_entries_for_unknown_stations_are_reported() {
    let repository = common::repository("optimizer-unmatched", &common::standard_feed());
    let times = solve(&repository);

    let mut drives = DriveTimes::new();
    drives.insert("AAA".into(), estimate(318, 4.1));
    drives.insert("ZZZ".into(), estimate(60, 0.5));

    let ranking = optimizer::rank(&repository, &times, &drives);
    assert_eq!(ranking.unmatched_drive, vec!["ZZZ".to_string()]);
    assert_eq!(ranking.options.len(), 1);
}

#[test]
fn equal_totals_prefer_the_earlier_arrival() {
    let repository = common::repository("optimizer-tie", &common::standard_feed());
    let times = solve(&repository);

    // Ashford 10.0 + 39.0 = 49.0, Brookdale 4.0 + 45.0 = 49.0; the tie
    // goes to Brookdale, which reaches the terminal at 08:25.
    let mut drives = DriveTimes::new();
    drives.insert("AAA".into(), estimate(600, 7.7));
    drives.insert("BBB".into(), estimate(240, 3.0));

    let ranking = optimizer::rank(&repository, &times, &drives);
    let best = ranking.best().unwrap();
    assert_eq!(repository.stops[best.stop_idx as usize].id.as_ref(), "BBB");
}

#[test]
fn no_feasible_option_is_surfaced() {
    let repository = common::repository("optimizer-none", &common::standard_feed());
    let times = solve(&repository);

    let ranking = optimizer::rank(&repository, &times, &DriveTimes::new());
    assert!(ranking.best().is_none());
    assert!(matches!(
        ranking.best_or_err(),
        Err(optimizer::Error::NoFeasibleOption)
    ));
    // Every feasible station is accounted for in the skip tallies
    assert_eq!(ranking.no_drive.len(), 2);
    assert_eq!(ranking.no_train.len(), 1);
}

#[test]
fn sole_qualifier_wins_by_default() {
    let repository = common::repository("optimizer-sole", &common::standard_feed());
    let times = solve(&repository);

    let mut drives = DriveTimes::new();
    drives.insert("BBB".into(), estimate(3600, 40.0));

    let ranking = optimizer::rank(&repository, &times, &drives);
    assert_eq!(ranking.options.len(), 1);
    assert_eq!(
        repository.stops[ranking.best().unwrap().stop_idx as usize]
            .id
            .as_ref(),
        "BBB"
    );
}
