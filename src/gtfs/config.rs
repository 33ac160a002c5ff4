pub struct Config {
    pub services_path: String,
    pub service_exceptions_path: String,
    pub routes_path: String,
    pub trips_path: String,
    pub stops_path: String,
    pub stop_times_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            services_path: "calendar.txt".into(),
            service_exceptions_path: "calendar_dates.txt".into(),
            routes_path: "routes.txt".into(),
            trips_path: "trips.txt".into(),
            stops_path: "stops.txt".into(),
            stop_times_path: "stop_times.txt".into(),
        }
    }
}
