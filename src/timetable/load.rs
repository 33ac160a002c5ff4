use std::time::Instant;

use chrono::NaiveDate;
use tracing::debug;

use crate::{
    gtfs::{self, GtfsReader},
    shared::{geo::Coordinate, time::Time},
};

use super::{Error, Timetable, TimetableBuilder};

impl Timetable {
    /// Streams the schedule files through a [`TimetableBuilder`] and
    /// finalizes the result.
    /// Depending on the size of the feed this can be a long blocking function.
    pub fn load_gtfs(gtfs: &GtfsReader) -> Result<Self, Error> {
        let mut builder = TimetableBuilder::new();

        debug!("Loading services...");
        let now = Instant::now();
        let mut services = Vec::new();
        gtfs.stream_services(|(_, row)| services.push(row))?;
        for row in services {
            let start = parse_date(&row.start_date)?;
            let end = parse_date(&row.end_date)?;
            builder.add_service(&row.service_id, start, end);
        }
        debug!("Loading services took {:?}", now.elapsed());

        debug!("Loading service exceptions...");
        let now = Instant::now();
        let mut exceptions = Vec::new();
        match gtfs.stream_service_exceptions(|(_, row)| exceptions.push(row)) {
            Ok(()) => {}
            // calendar_dates.txt is optional; a feed without it carries no
            // exceptions.
            Err(gtfs::Error::FileNotFound(_)) => debug!("No service exception file"),
            Err(err) => return Err(err.into()),
        }
        for row in exceptions {
            // A single-day window, registered after the calendar entries so
            // it wins the id lookup over a same-id calendar window.
            let date = parse_date(&row.date)?;
            builder.add_service(&row.service_id, date, date);
        }
        debug!("Loading service exceptions took {:?}", now.elapsed());

        debug!("Loading routes...");
        let now = Instant::now();
        gtfs.stream_routes(|(_, row)| {
            let name = row
                .route_short_name
                .as_deref()
                .filter(|val| !val.is_empty())
                .or(row.route_long_name.as_deref().filter(|val| !val.is_empty()))
                .unwrap_or(row.route_id.as_str());
            builder.add_route(&row.route_id, name);
        })?;
        debug!("Loading routes took {:?}", now.elapsed());

        debug!("Loading trips...");
        let now = Instant::now();
        gtfs.stream_trips(|(_, row)| {
            builder.add_trip(&row.trip_id, &row.route_id, &row.service_id);
        })?;
        debug!("Loading trips took {:?}", now.elapsed());

        debug!("Loading stops...");
        let now = Instant::now();
        gtfs.stream_stops(|(_, row)| {
            let coordinate = Coordinate::new(row.stop_lat, row.stop_lon);
            let parent = row
                .parent_station
                .as_deref()
                .filter(|val| !val.is_empty());
            builder.add_stop(&row.stop_id, &row.stop_name, coordinate, parent);
        })?;
        debug!("Loading stops took {:?}", now.elapsed());

        debug!("Loading stop times...");
        let now = Instant::now();
        let mut stop_times = Vec::new();
        gtfs.stream_stop_times(|(_, row)| stop_times.push(row))?;
        for row in stop_times {
            let arrival_time = parse_time(&row.arrival_time)?;
            let departure_time = parse_time(&row.departure_time)?;
            builder.add_stop_time(
                &row.trip_id,
                &row.stop_id,
                row.stop_sequence,
                arrival_time,
                departure_time,
                row.stop_headsign.as_deref(),
            );
        }
        debug!("Loading stop times took {:?}", now.elapsed());

        debug!("Resolving timetable...");
        let now = Instant::now();
        let timetable = builder.build()?;
        debug!("Resolving timetable took {:?}", now.elapsed());
        Ok(timetable)
    }
}

fn parse_date(value: &str) -> Result<NaiveDate, Error> {
    NaiveDate::parse_from_str(value, "%Y%m%d").map_err(|_| Error::InvalidDate(value.to_string()))
}

fn parse_time(value: &str) -> Result<Time, Error> {
    Time::from_hms(value).ok_or_else(|| Error::InvalidTime(value.to_string()))
}
