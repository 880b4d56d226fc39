use serde::de::DeserializeOwned;
use std::{
    fs::File,
    io::{self},
    path::PathBuf,
};
use thiserror::Error;
use zip::{ZipArchive, read::ZipFile};

mod config;
pub mod models;
pub use config::*;
use models::*;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("Csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Could not find file with name: {0}")]
    FileNotFound(String),
}

#[derive(Default)]
pub enum StorageType {
    #[default]
    None,
    Zip(PathBuf),
}

/// Streaming access to the tables of a GTFS archive.
///
/// Rows are handed to a callback one at a time so the raw tables never
/// have to sit in memory next to the built index. A malformed row stops
/// the stream with a csv error instead of being skipped.
#[derive(Default)]
pub struct Gtfs {
    config: Config,
    storage: StorageType,
}

impl Gtfs {
    pub fn new(config: self::Config) -> Self {
        Self {
            config,
            storage: Default::default(),
        }
    }

    pub fn from_zip(mut self, path: PathBuf) -> Self {
        self.storage = StorageType::Zip(path);
        self
    }

    pub fn stream_stops<F>(&self, f: F) -> Result<(), self::Error>
    where
        F: FnMut((usize, GtfsStop)),
    {
        self.stream::<GtfsStop, F>(&self.config.stops_path, true, f)
    }

    pub fn stream_routes<F>(&self, f: F) -> Result<(), self::Error>
    where
        F: FnMut((usize, GtfsRoute)),
    {
        self.stream::<GtfsRoute, F>(&self.config.routes_path, true, f)
    }

    pub fn stream_trips<F>(&self, f: F) -> Result<(), self::Error>
    where
        F: FnMut((usize, GtfsTrip)),
    {
        self.stream::<GtfsTrip, F>(&self.config.trips_path, true, f)
    }

    pub fn stream_stop_times<F>(&self, f: F) -> Result<(), self::Error>
    where
        F: FnMut((usize, GtfsStopTime)),
    {
        self.stream::<GtfsStopTime, F>(&self.config.stop_times_path, true, f)
    }

    /// `calendar.txt` is optional when a feed expresses all of its service
    /// in `calendar_dates.txt`, so a missing file streams zero rows.
    pub fn stream_calendar<F>(&self, f: F) -> Result<(), self::Error>
    where
        F: FnMut((usize, GtfsCalendar)),
    {
        self.stream::<GtfsCalendar, F>(&self.config.calendar_path, false, f)
    }

    /// Optional for the opposite reason: a feed with no dated exceptions
    /// simply ships no `calendar_dates.txt`.
    pub fn stream_calendar_dates<F>(&self, f: F) -> Result<(), self::Error>
    where
        F: FnMut((usize, GtfsCalendarDate)),
    {
        self.stream::<GtfsCalendarDate, F>(&self.config.calendar_dates_path, false, f)
    }

    fn stream<T, F>(&self, file_name: &str, required: bool, f: F) -> Result<(), self::Error>
    where
        T: DeserializeOwned,
        F: FnMut((usize, T)),
    {
        match &self.storage {
            StorageType::None => Ok(()),
            StorageType::Zip(path) => stream_from_zip::<T, F>(path, file_name, required, f),
        }
    }
}

fn stream_from_zip<T, F>(
    zip_path: &PathBuf,
    file_name: &str,
    required: bool,
    mut f: F,
) -> Result<(), self::Error>
where
    T: DeserializeOwned,
    F: FnMut((usize, T)),
{
    let zip_file = File::open(zip_path)?;
    let mut archive = ZipArchive::new(zip_file)?;
    let file = match get_file(&mut archive, file_name) {
        Ok(file) => file,
        Err(Error::FileNotFound(_)) if !required => return Ok(()),
        Err(err) => return Err(err),
    };
    let mut reader = csv::Reader::from_reader(file);
    for (i, result) in reader.deserialize().enumerate() {
        let record: T = result?;
        f((i, record));
    }
    Ok(())
}

fn get_file<'a>(
    archive: &'a mut ZipArchive<File>,
    name: &'a str,
) -> Result<ZipFile<'a, File>, self::Error> {
    let index = archive
        .index_for_name(name)
        .ok_or(self::Error::FileNotFound(name.to_string()))?;
    let file = archive.by_index(index)?;
    Ok(file)
}
