use std::{collections::HashMap, sync::Arc};

use chrono::NaiveDate;
use rayon::prelude::*;

use crate::shared::{geo::Coordinate, time::Time};

use super::{Error, Route, Service, Slice, Stop, StopTime, Timetable, Trip};

struct RawService {
    id: String,
    start: NaiveDate,
    end: NaiveDate,
}

struct RawRoute {
    id: String,
    name: String,
}

struct RawTrip {
    id: String,
    route_id: String,
    service_id: String,
}

struct RawStop {
    id: String,
    name: String,
    coordinate: Coordinate,
    parent_id: Option<String>,
}

struct RawStopTime {
    trip_id: String,
    stop_id: String,
    sequence: u16,
    arrival_time: Time,
    departure_time: Time,
    headsign: Option<String>,
}

/// Accumulates schedule rows and resolves them into an immutable
/// [`Timetable`].
///
/// Rows may arrive in any order; every cross-reference is resolved when
/// [`build`](Self::build) runs, and an id that resolves to nothing fails the
/// build rather than producing a dangling relation.
#[derive(Default)]
pub struct TimetableBuilder {
    services: Vec<RawService>,
    routes: Vec<RawRoute>,
    trips: Vec<RawTrip>,
    stops: Vec<RawStop>,
    stop_times: Vec<RawStopTime>,
}

impl TimetableBuilder {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn add_service(&mut self, id: &str, start: NaiveDate, end: NaiveDate) -> &mut Self {
        self.services.push(RawService {
            id: id.to_string(),
            start,
            end,
        });
        self
    }

    pub fn add_route(&mut self, id: &str, name: &str) -> &mut Self {
        self.routes.push(RawRoute {
            id: id.to_string(),
            name: name.to_string(),
        });
        self
    }

    pub fn add_trip(&mut self, id: &str, route_id: &str, service_id: &str) -> &mut Self {
        self.trips.push(RawTrip {
            id: id.to_string(),
            route_id: route_id.to_string(),
            service_id: service_id.to_string(),
        });
        self
    }

    pub fn add_stop(
        &mut self,
        id: &str,
        name: &str,
        coordinate: Coordinate,
        parent_id: Option<&str>,
    ) -> &mut Self {
        self.stops.push(RawStop {
            id: id.to_string(),
            name: name.to_string(),
            coordinate,
            parent_id: parent_id.map(|val| val.to_string()),
        });
        self
    }

    pub fn add_stop_time(
        &mut self,
        trip_id: &str,
        stop_id: &str,
        sequence: u16,
        arrival_time: Time,
        departure_time: Time,
        headsign: Option<&str>,
    ) -> &mut Self {
        self.stop_times.push(RawStopTime {
            trip_id: trip_id.to_string(),
            stop_id: stop_id.to_string(),
            sequence,
            arrival_time,
            departure_time,
            headsign: headsign.map(|val| val.to_string()),
        });
        self
    }

    pub fn build(self) -> Result<Timetable, Error> {
        let mut service_lookup: HashMap<Arc<str>, u32> = HashMap::new();
        let services: Box<[Service]> = self
            .services
            .into_iter()
            .enumerate()
            .map(|(i, raw)| {
                let service = Service {
                    index: i as u32,
                    id: raw.id.into(),
                    start: raw.start,
                    end: raw.end,
                };
                service_lookup.insert(service.id.clone(), i as u32);
                service
            })
            .collect();

        let mut route_lookup: HashMap<Arc<str>, u32> = HashMap::new();
        let routes: Box<[Route]> = self
            .routes
            .into_iter()
            .enumerate()
            .map(|(i, raw)| {
                let route = Route {
                    index: i as u32,
                    id: raw.id.into(),
                    name: raw.name.into(),
                };
                route_lookup.insert(route.id.clone(), i as u32);
                route
            })
            .collect();

        let mut stop_lookup: HashMap<Arc<str>, u32> = HashMap::new();
        let mut stops: Vec<(Stop, Option<String>)> = self
            .stops
            .into_iter()
            .enumerate()
            .map(|(i, raw)| {
                let stop = Stop {
                    index: i as u32,
                    id: raw.id.into(),
                    name: raw.name.into(),
                    coordinate: raw.coordinate,
                    parent_idx: None,
                };
                stop_lookup.insert(stop.id.clone(), i as u32);
                (stop, raw.parent_id)
            })
            .collect();

        // Parents resolve after every stop is known, so child rows may come
        // first. An id that matches no stop leaves the child parentless.
        for (stop, parent_id) in stops.iter_mut() {
            if let Some(parent_id) = parent_id
                && let Some(parent_idx) = stop_lookup.get(parent_id.as_str())
            {
                stop.parent_idx = Some(*parent_idx);
            }
        }
        let stops: Box<[Stop]> = stops.into_iter().map(|(stop, _)| stop).collect();

        let mut trip_lookup: HashMap<Arc<str>, u32> = HashMap::new();
        let mut route_to_trips: Vec<Vec<u32>> = vec![Vec::new(); routes.len()];
        let mut trips: Vec<Trip> = Vec::with_capacity(self.trips.len());
        for (i, raw) in self.trips.into_iter().enumerate() {
            let route_idx = *route_lookup
                .get(raw.route_id.as_str())
                .ok_or_else(|| Error::UnknownRoute(raw.route_id.clone()))?;
            let service_idx = *service_lookup
                .get(raw.service_id.as_str())
                .ok_or_else(|| Error::UnknownService(raw.service_id.clone()))?;
            let trip = Trip {
                index: i as u32,
                id: raw.id.into(),
                route_idx,
                service_idx,
                stop_times: Slice::default(),
            };
            route_to_trips[route_idx as usize].push(i as u32);
            trip_lookup.insert(trip.id.clone(), i as u32);
            trips.push(trip);
        }

        let mut per_trip: Vec<Vec<StopTime>> = vec![Vec::new(); trips.len()];
        for raw in self.stop_times {
            let trip_idx = *trip_lookup
                .get(raw.trip_id.as_str())
                .ok_or_else(|| Error::UnknownTrip(raw.trip_id.clone()))?;
            let stop_idx = *stop_lookup
                .get(raw.stop_id.as_str())
                .ok_or_else(|| Error::UnknownStop(raw.stop_id.clone()))?;
            per_trip[trip_idx as usize].push(StopTime {
                index: 0,
                trip_idx,
                stop_idx,
                sequence: raw.sequence,
                inner_idx: 0,
                arrival_time: raw.arrival_time,
                departure_time: raw.departure_time,
                headsign: raw.headsign.map(|val| val.into()),
            });
        }

        let total = per_trip.iter().map(|buffer| buffer.len()).sum();
        let mut stop_times: Vec<StopTime> = Vec::with_capacity(total);
        for (trip_idx, mut buffer) in per_trip.into_iter().enumerate() {
            buffer.par_sort_by_key(|val| val.sequence);
            for pair in buffer.windows(2) {
                if pair[0].sequence == pair[1].sequence {
                    return Err(Error::DuplicateSequence {
                        trip_id: trips[trip_idx].id.to_string(),
                        sequence: pair[0].sequence,
                    });
                }
            }

            let slice = Slice {
                start_idx: stop_times.len() as u32,
                count: buffer.len() as u32,
            };
            buffer.iter_mut().enumerate().for_each(|(j, st)| {
                st.inner_idx = j as u32;
                st.index = slice.start_idx + st.inner_idx;
            });
            trips[trip_idx].stop_times = slice;
            stop_times.append(&mut buffer);
        }

        let mut stop_to_stop_times: Vec<Vec<u32>> = vec![Vec::new(); stops.len()];
        let mut stop_to_routes: Vec<Vec<u32>> = vec![Vec::new(); stops.len()];
        for st in &stop_times {
            stop_to_stop_times[st.stop_idx as usize].push(st.index);
            stop_to_routes[st.stop_idx as usize].push(trips[st.trip_idx as usize].route_idx);
        }
        stop_to_stop_times.par_iter_mut().for_each(|visits| {
            visits.sort_unstable_by_key(|&index| {
                let st = &stop_times[index as usize];
                (st.arrival_time, st.index)
            });
        });
        stop_to_routes.par_iter_mut().for_each(|routes| {
            routes.sort_unstable();
            routes.dedup();
        });

        Ok(Timetable {
            stops,
            routes,
            trips: trips.into(),
            services,
            stop_times: stop_times.into(),
            stop_lookup,
            route_lookup,
            trip_lookup,
            service_lookup,
            stop_to_stop_times: stop_to_stop_times.into_iter().map(|val| val.into()).collect(),
            stop_to_routes: stop_to_routes.into_iter().map(|val| val.into()).collect(),
            route_to_trips: route_to_trips.into_iter().map(|val| val.into()).collect(),
        })
    }
}
