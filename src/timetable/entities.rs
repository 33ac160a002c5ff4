use std::sync::Arc;

use chrono::NaiveDate;

use crate::shared::{geo::Coordinate, time::Time};

/// A calendar window during which scheduled trips operate.
#[derive(Debug, Default, Clone)]
pub struct Service {
    /// The global internal index used for O(1) array lookups in the timetable.
    pub index: u32,
    /// The unique external identifier.
    pub id: Arc<str>,
    /// First date of the window.
    pub start: NaiveDate,
    /// Last date of the window.
    pub end: NaiveDate,
}

impl Service {
    /// Closed-interval test: the first and last dates both count.
    pub fn includes(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// A grouping of trips that are displayed to riders under a single name
/// (e.g., "Blue Line").
#[derive(Debug, Default, Clone)]
pub struct Route {
    pub index: u32,
    pub id: Arc<str>,
    pub name: Arc<str>,
}

/// A specific journey taken by a vehicle through a sequence of stops.
#[derive(Debug, Default, Clone)]
pub struct Trip {
    pub index: u32,
    pub id: Arc<str>,
    /// Pointer to the parent [`Route`].
    pub route_idx: u32,
    /// Pointer to the [`Service`] window that schedules this trip.
    pub service_idx: u32,
    /// Range of this trip's visits within the global stop-time array.
    pub stop_times: Slice,
}

/// A physical point where passengers can board or alight from a vehicle.
#[derive(Debug, Default, Clone)]
pub struct Stop {
    /// The global internal index for this stop.
    pub index: u32,
    /// Unique external identifier for the stop.
    pub id: Arc<str>,
    /// Human-readable name (e.g., "Main St & 4th Ave").
    pub name: Arc<str>,
    pub coordinate: Coordinate,
    /// Index of the parent station when this stop is a platform or other
    /// child location of a larger site.
    pub parent_idx: Option<u32>,
}

impl Stop {
    /// A main stop stands on its own rather than under a parent station.
    pub const fn is_main_stop(&self) -> bool {
        self.parent_idx.is_none()
    }
}

/// Individual event within a trip where a vehicle calls at a stop.
#[derive(Debug, Default, Clone)]
pub struct StopTime {
    /// Global internal index of this stop-time record.
    pub index: u32,
    /// Internal index of the parent [`Trip`].
    pub trip_idx: u32,
    /// Internal index of the visited [`Stop`].
    pub stop_idx: u32,
    /// The order of this stop within the trip (starts from 1).
    pub sequence: u16,
    /// Zero-based position of this stop within its specific trip.
    pub inner_idx: u32,
    /// Scheduled arrival time.
    pub arrival_time: Time,
    /// Scheduled departure time.
    pub departure_time: Time,
    /// Destination shown to passengers when the vehicle calls here.
    pub headsign: Option<Arc<str>>,
}

impl StopTime {
    /// Whether both visits belong to the same vehicle run.
    pub const fn on_same_trip(&self, other: &Self) -> bool {
        self.trip_idx == other.trip_idx
    }
}

/// Metadata describing a contiguous range within the global stop-time array.
#[derive(Default, Debug, Clone, Copy)]
pub struct Slice {
    /// The index where the range begins.
    pub start_idx: u32,
    /// The number of records in the range.
    pub count: u32,
}
