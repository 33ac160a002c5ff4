use std::{cmp::Ordering, collections::HashMap, sync::Arc};

use chrono::NaiveDate;
use thiserror::Error;

use crate::{
    gtfs,
    shared::time::{Duration, Time},
};

mod builder;
mod entities;
mod load;

pub use builder::TimetableBuilder;
pub use entities::*;

#[derive(Error, Debug)]
pub enum Error {
    #[error("GTFS error: {0}")]
    Gtfs(#[from] gtfs::Error),
    #[error("Unknown route id: {0}")]
    UnknownRoute(String),
    #[error("Unknown service id: {0}")]
    UnknownService(String),
    #[error("Unknown trip id: {0}")]
    UnknownTrip(String),
    #[error("Unknown stop id: {0}")]
    UnknownStop(String),
    #[error("Invalid time: {0}")]
    InvalidTime(String),
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("Duplicate stop sequence {sequence} on trip {trip_id}")]
    DuplicateSequence { trip_id: String, sequence: u16 },
}

/// The finalized in-memory schedule.
///
/// Entities live in owning arrays and reference each other by index, so the
/// whole structure is cycle-free and cheap to share across threads. Built
/// through [`TimetableBuilder`] or [`Timetable::load_gtfs`]; read-only after
/// that.
#[derive(Debug, Default, Clone)]
pub struct Timetable {
    pub stops: Box<[Stop]>,
    pub routes: Box<[Route]>,
    pub trips: Box<[Trip]>,
    pub services: Box<[Service]>,
    /// Every visit in the schedule, grouped per trip and ordered by sequence
    /// inside each trip's range.
    pub stop_times: Box<[StopTime]>,

    stop_lookup: HashMap<Arc<str>, u32>,
    route_lookup: HashMap<Arc<str>, u32>,
    trip_lookup: HashMap<Arc<str>, u32>,
    service_lookup: HashMap<Arc<str>, u32>,

    stop_to_stop_times: Box<[Box<[u32]>]>,
    stop_to_routes: Box<[Box<[u32]>]>,
    route_to_trips: Box<[Box<[u32]>]>,
}

impl Timetable {
    pub fn builder() -> TimetableBuilder {
        TimetableBuilder::new()
    }

    /// Get a stop with the given id.
    /// If no stop is found with the given id None is returned.
    pub fn stop_by_id(&self, id: &str) -> Option<&Stop> {
        let index = self.stop_lookup.get(id)?;
        Some(&self.stops[*index as usize])
    }

    /// Get a route with the given id.
    /// If no route is found with the given id None is returned.
    pub fn route_by_id(&self, id: &str) -> Option<&Route> {
        let index = self.route_lookup.get(id)?;
        Some(&self.routes[*index as usize])
    }

    /// Get a trip with the given id.
    /// If no trip is found with the given id None is returned.
    pub fn trip_by_id(&self, id: &str) -> Option<&Trip> {
        let index = self.trip_lookup.get(id)?;
        Some(&self.trips[*index as usize])
    }

    /// Get a service with the given id.
    /// If no service is found with the given id None is returned.
    pub fn service_by_id(&self, id: &str) -> Option<&Service> {
        let index = self.service_lookup.get(id)?;
        Some(&self.services[*index as usize])
    }

    /// All of a trip's visits in sequence order.
    pub fn stop_times_by_trip_idx(&self, trip_idx: u32) -> &[StopTime] {
        let slice = self.trips[trip_idx as usize].stop_times;
        let start = slice.start_idx as usize;
        &self.stop_times[start..start + slice.count as usize]
    }

    /// A stop's visits ordered by arrival time.
    pub fn stop_times_by_stop_idx(&self, stop_idx: u32) -> impl Iterator<Item = &StopTime> {
        self.stop_to_stop_times[stop_idx as usize]
            .iter()
            .map(|index| &self.stop_times[*index as usize])
    }

    /// Indices into [`Self::stop_times`] for a stop's visits, ordered by
    /// arrival time.
    pub fn stop_time_indices_by_stop_idx(&self, stop_idx: u32) -> &[u32] {
        &self.stop_to_stop_times[stop_idx as usize]
    }

    /// Indices of the routes serving a stop, sorted ascending.
    pub fn routes_by_stop_idx(&self, stop_idx: u32) -> &[u32] {
        &self.stop_to_routes[stop_idx as usize]
    }

    /// Indices of a route's trips.
    pub fn trips_by_route_idx(&self, route_idx: u32) -> &[u32] {
        &self.route_to_trips[route_idx as usize]
    }

    /// The visit that follows the given one on its trip.
    /// Returns None when the given visit is the trip's last.
    pub fn next_stop_time(&self, stop_time: &StopTime) -> Option<&StopTime> {
        let slice = self.trips[stop_time.trip_idx as usize].stop_times;
        let next = stop_time.inner_idx + 1;
        if next < slice.count {
            Some(&self.stop_times[(slice.start_idx + next) as usize])
        } else {
            None
        }
    }

    /// Whether two stops are served by at least one common route.
    pub fn on_shared_route(&self, a_stop_idx: u32, b_stop_idx: u32) -> bool {
        let a = self.routes_by_stop_idx(a_stop_idx);
        let b = self.routes_by_stop_idx(b_stop_idx);
        let (mut i, mut j) = (0, 0);
        while i < a.len() && j < b.len() {
            match a[i].cmp(&b[j]) {
                Ordering::Less => i += 1,
                Ordering::Greater => j += 1,
                Ordering::Equal => return true,
            }
        }
        false
    }

    /// The stop where a trip begins, taken from its first visit in sequence
    /// order. None for a trip without visits.
    pub fn trip_origin(&self, trip_idx: u32) -> Option<&Stop> {
        let visit = self.stop_times_by_trip_idx(trip_idx).first()?;
        Some(&self.stops[visit.stop_idx as usize])
    }

    /// The stop where a trip ends, taken from its last visit in sequence
    /// order. None for a trip without visits.
    pub fn trip_destination(&self, trip_idx: u32) -> Option<&Stop> {
        let visit = self.stop_times_by_trip_idx(trip_idx).last()?;
        Some(&self.stops[visit.stop_idx as usize])
    }

    /// Arrival time of a trip's first visit.
    pub fn trip_start(&self, trip_idx: u32) -> Option<Time> {
        let visit = self.stop_times_by_trip_idx(trip_idx).first()?;
        Some(visit.arrival_time)
    }

    /// Arrival time of a trip's last visit.
    pub fn trip_finish(&self, trip_idx: u32) -> Option<Time> {
        let visit = self.stop_times_by_trip_idx(trip_idx).last()?;
        Some(visit.arrival_time)
    }

    /// Scheduled span of a trip from first arrival to last arrival.
    pub fn trip_duration(&self, trip_idx: u32) -> Option<Duration> {
        Some(self.trip_finish(trip_idx)? - self.trip_start(trip_idx)?)
    }

    /// Whether a trip's service window covers the given date.
    pub fn trip_runs_on(&self, trip_idx: u32, date: NaiveDate) -> bool {
        let trip = &self.trips[trip_idx as usize];
        self.services[trip.service_idx as usize].includes(date)
    }

    /// Per-trip activity mask for a travel date, indexed by trip index.
    pub fn active_trips(&self, date: NaiveDate) -> Box<[bool]> {
        self.trips
            .iter()
            .map(|trip| self.services[trip.service_idx as usize].includes(date))
            .collect()
    }
}
