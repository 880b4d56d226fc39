use railhead::{
    gtfs::{Config, Gtfs},
    repository::Repository,
};
use std::{fs::File, io::Write, path::PathBuf};
use zip::{ZipWriter, write::SimpleFileOptions};

/// Writes a feed archive into the temp dir so each case can shape its
/// own calendar. `name` keeps parallel test binaries off each other's
/// files.
pub fn feed_zip(name: &str, files: &[(&str, &str)]) -> PathBuf {
    let mut path = std::env::temp_dir();
    path.push(format!("railhead-test-{name}.zip"));
    let file = File::create(&path).unwrap();
    let mut writer = ZipWriter::new(file);
    for (file_name, content) in files {
        writer
            .start_file(*file_name, SimpleFileOptions::default())
            .unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    writer.finish().unwrap();
    path
}

pub fn repository(name: &str, files: &[(&str, &str)]) -> Repository {
    let path = feed_zip(name, files);
    let gtfs = Gtfs::new(Config::default()).from_zip(path);
    Repository::new().with_gtfs(gtfs).unwrap()
}

/// The shared fixture: a one-line network into Terminal City.
///
/// Weekday service (WKD) runs Mon-Fri through 2026, weekend service
/// (WND) Sat-Sun. 2026-05-25 is a Monday holiday: WKD is removed and
/// WND added by dated exceptions.
///
/// Trips:
///   T1 WKD  Ashford 07:49 -> Terminal 08:28
///   T2 WKD  Ashford 08:05 -> Terminal 08:45
///   T3 WKD  Ashford 07:15 -> Brookdale 07:40 -> Terminal 08:25
///   T4 WND  Ashford 08:00 -> Terminal 08:29
///   T5 WKD  Chester 09:00 -> Terminal 09:40
///   T6 WKD  Terminal 07:00 -> Ashford 07:30 (outbound)
pub fn standard_feed() -> Vec<(&'static str, &'static str)> {
    vec![
        (
            "stops.txt",
            "stop_id,stop_name,stop_lat,stop_lon\n\
             TRM,Terminal City,41.0000,-73.0000\n\
             AAA,Ashford,41.1000,-73.1000\n\
             BBB,Brookdale,41.2000,-73.2000\n\
             CCC,Chester,41.3000,-73.3000\n",
        ),
        (
            "routes.txt",
            "route_id,route_long_name,route_type\n\
             R1,Main Line,2\n",
        ),
        (
            "calendar.txt",
            "service_id,monday,tuesday,wednesday,thursday,friday,saturday,sunday,start_date,end_date\n\
             WKD,1,1,1,1,1,0,0,20260101,20261231\n\
             WND,0,0,0,0,0,1,1,20260101,20261231\n",
        ),
        (
            "calendar_dates.txt",
            "service_id,date,exception_type\n\
             WKD,20260525,2\n\
             WND,20260525,1\n",
        ),
        (
            "trips.txt",
            "route_id,service_id,trip_id\n\
             R1,WKD,T1\n\
             R1,WKD,T2\n\
             R1,WKD,T3\n\
             R1,WND,T4\n\
             R1,WKD,T5\n\
             R1,WKD,T6\n",
        ),
        (
            "stop_times.txt",
            "trip_id,arrival_time,departure_time,stop_id,stop_sequence\n\
             T1,07:49:00,07:49:00,AAA,1\n\
             T1,08:28:00,08:28:00,TRM,2\n\
             T2,08:05:00,08:05:00,AAA,1\n\
             T2,08:45:00,08:45:00,TRM,2\n\
             T3,07:15:00,07:15:00,AAA,1\n\
             T3,07:40:00,07:40:00,BBB,2\n\
             T3,08:25:00,08:25:00,TRM,3\n\
             T4,08:00:00,08:00:00,AAA,1\n\
             T4,08:29:00,08:29:00,TRM,2\n\
             T5,09:00:00,09:00:00,CCC,1\n\
             T5,09:40:00,09:40:00,TRM,2\n\
             T6,07:00:00,07:00:00,TRM,1\n\
             T6,07:30:00,07:30:00,AAA,2\n",
        ),
    ]
}
