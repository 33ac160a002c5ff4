use serde::{Deserialize, Serialize};

/// Row of `calendar.txt`. Only the service window is consumed; a service is
/// taken to operate on every date inside it.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct GtfsCalendar {
    pub service_id: String,
    pub start_date: String,
    pub end_date: String,
}

/// Row of `calendar_dates.txt`. Each exception names one date on which its
/// service runs, replacing any `calendar.txt` window with the same id.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct GtfsCalendarDate {
    pub service_id: String,
    pub date: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct GtfsRoute {
    pub route_id: String,
    pub route_short_name: Option<String>,
    pub route_long_name: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct GtfsTrip {
    pub route_id: String,
    pub service_id: String,
    pub trip_id: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct GtfsStop {
    pub stop_id: String,
    pub stop_name: String,
    pub stop_lat: f64,
    pub stop_lon: f64,
    pub parent_station: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct GtfsStopTime {
    pub trip_id: String,
    pub arrival_time: String,
    pub departure_time: String,
    pub stop_id: String,
    pub stop_sequence: u16,
    pub stop_headsign: Option<String>,
}
