use serde::de::DeserializeOwned;
use std::{
    fs::File,
    io::{self},
    path::{Path, PathBuf},
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
    Dir(PathBuf),
    Zip(PathBuf),
}

/// Streams typed schedule rows out of a GTFS feed, either an extracted
/// directory of `.txt` files or a `.zip` archive.
///
/// Rows are handed to the caller one at a time; a row that fails to decode
/// aborts the stream with the underlying CSV error.
#[derive(Default)]
pub struct GtfsReader {
    config: Config,
    storage: StorageType,
}

impl GtfsReader {
    pub fn new(config: self::Config) -> Self {
        Self {
            config,
            storage: Default::default(),
        }
    }

    pub fn from_dir(mut self, path: PathBuf) -> Self {
        self.storage = StorageType::Dir(path);
        self
    }

    pub fn from_zip(mut self, path: PathBuf) -> Self {
        self.storage = StorageType::Zip(path);
        self
    }

    pub fn stream_services<F>(&self, f: F) -> Result<(), self::Error>
    where
        F: FnMut((usize, GtfsCalendar)),
    {
        self.stream(&self.config.services_path, f)
    }

    pub fn stream_service_exceptions<F>(&self, f: F) -> Result<(), self::Error>
    where
        F: FnMut((usize, GtfsCalendarDate)),
    {
        self.stream(&self.config.service_exceptions_path, f)
    }

    pub fn stream_routes<F>(&self, f: F) -> Result<(), self::Error>
    where
        F: FnMut((usize, GtfsRoute)),
    {
        self.stream(&self.config.routes_path, f)
    }

    pub fn stream_trips<F>(&self, f: F) -> Result<(), self::Error>
    where
        F: FnMut((usize, GtfsTrip)),
    {
        self.stream(&self.config.trips_path, f)
    }

    pub fn stream_stops<F>(&self, f: F) -> Result<(), self::Error>
    where
        F: FnMut((usize, GtfsStop)),
    {
        self.stream(&self.config.stops_path, f)
    }

    pub fn stream_stop_times<F>(&self, f: F) -> Result<(), self::Error>
    where
        F: FnMut((usize, GtfsStopTime)),
    {
        self.stream(&self.config.stop_times_path, f)
    }

    fn stream<T, F>(&self, file_name: &str, f: F) -> Result<(), self::Error>
    where
        T: DeserializeOwned,
        F: FnMut((usize, T)),
    {
        match &self.storage {
            StorageType::None => Ok(()),
            StorageType::Dir(path) => stream_from_dir::<T, F>(path, file_name, f),
            StorageType::Zip(path) => stream_from_zip::<T, F>(path, file_name, f),
        }
    }
}

fn stream_from_dir<T, F>(dir: &Path, file_name: &str, f: F) -> Result<(), self::Error>
where
    T: DeserializeOwned,
    F: FnMut((usize, T)),
{
    let path = dir.join(file_name);
    if !path.is_file() {
        return Err(self::Error::FileNotFound(file_name.to_string()));
    }
    let file = File::open(path)?;
    stream_rows(file, f)
}

fn stream_from_zip<T, F>(zip_path: &Path, file_name: &str, f: F) -> Result<(), self::Error>
where
    T: DeserializeOwned,
    F: FnMut((usize, T)),
{
    let zip_file = File::open(zip_path)?;
    let mut archive = ZipArchive::new(zip_file)?;
    let file = get_file(&mut archive, file_name)?;
    stream_rows(file, f)
}

fn stream_rows<R, T, F>(reader: R, mut f: F) -> Result<(), self::Error>
where
    R: io::Read,
    T: DeserializeOwned,
    F: FnMut((usize, T)),
{
    let mut reader = csv::Reader::from_reader(reader);
    for (i, row) in reader.deserialize().enumerate() {
        f((i, row?));
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
