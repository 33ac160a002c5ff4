use std::{collections::HashMap, time::Instant};

use chrono::NaiveDate;
use rayon::prelude::*;
use tracing::debug;

use crate::{
    quadtree::{Bounds, Item, QuadTree},
    shared::geo::{Coordinate, Distance, LATITUDE_DISTANCE, LONGITUDE_DISTANCE},
    timetable::Timetable,
};

mod penalty;
pub use penalty::*;

/// Tunable weights and thresholds for graph construction.
///
/// The defaults mirror a walking rider: a transfer costs twenty minutes of
/// friction, walking speed is 5 km/h, cross-route edges reach at most a
/// kilometer, distance itself is free and no cost cutoff applies.
#[derive(Debug, Clone)]
pub struct Config {
    /// Cross-route pairs further apart than this are never connected.
    pub transfer_distance: Distance,
    /// Flat cost in minutes added per transfer.
    pub transfer_penalty: f64,
    /// Cost in minutes per kilometer, charged only when a transfer occurs.
    pub distance_penalty: f64,
    /// Assumed walking speed in km/h.
    pub walk_speed: f64,
    /// Edges costing more than this are dropped from the graph.
    pub max_cost: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            transfer_distance: Distance::from_kilometers(1.0),
            transfer_penalty: 20.0,
            distance_penalty: 0.0,
            walk_speed: 5.0,
            max_cost: f64::INFINITY,
        }
    }
}

/// A directed connectivity graph over the stops active on one travel date.
///
/// Edges connect plausible neighbors only: consecutive stops along some
/// active trip, and cross-route stop pairs within walking reach. Each edge
/// carries the cheapest feasible [`Penalty`] over the candidate visit pairs.
/// Built once, read-only afterwards.
#[derive(Debug, Default, Clone)]
pub struct Graph {
    edges: HashMap<u32, HashMap<u32, Penalty>>,
}

impl Graph {
    /// Scores every plausible neighbor pair among the stops active on
    /// `date` and records the surviving directed edges.
    pub fn build(timetable: &Timetable, date: NaiveDate, config: &Config) -> Self {
        debug!("Indexing stops active on {date}...");
        let now = Instant::now();
        let active = timetable.active_trips(date);
        let active_stops: Vec<u32> = timetable
            .stops
            .iter()
            .filter(|stop| {
                timetable
                    .stop_times_by_stop_idx(stop.index)
                    .any(|visit| active[visit.trip_idx as usize])
            })
            .map(|stop| stop.index)
            .collect();
        if active_stops.is_empty() {
            debug!("No active stops on {date}");
            return Self::default();
        }

        let mut tree = QuadTree::with_bounds(extent(timetable, &active_stops));
        for &stop_idx in &active_stops {
            let coordinate = timetable.stops[stop_idx as usize].coordinate;
            tree.insert(Item::new(stop_idx, coordinate.longitude, coordinate.latitude));
        }
        debug!("Indexing active stops took {:?}", now.elapsed());

        debug!("Scanning candidate pairs...");
        let now = Instant::now();
        let sources: Vec<(u32, HashMap<u32, Penalty>)> = active_stops
            .par_iter()
            .map(|&from_idx| {
                let mut edges: HashMap<u32, Penalty> = HashMap::new();
                scan_ride_edges(timetable, &active, config, from_idx, &mut edges);
                scan_walk_edges(timetable, &active, config, &tree, from_idx, &mut edges);
                (from_idx, edges)
            })
            .collect();
        debug!("Scanning candidate pairs took {:?}", now.elapsed());

        let mut edges = HashMap::with_capacity(sources.len());
        for (from_idx, list) in sources {
            if !list.is_empty() {
                edges.insert(from_idx, list);
            }
        }
        Self { edges }
    }

    /// The weight of the edge between two stops, if one was recorded.
    pub fn edge(&self, from_stop_idx: u32, to_stop_idx: u32) -> Option<&Penalty> {
        self.edges.get(&from_stop_idx)?.get(&to_stop_idx)
    }

    /// Outgoing (destination, weight) pairs of a stop. Empty for a stop
    /// without recorded edges.
    pub fn neighbors(&self, stop_idx: u32) -> impl Iterator<Item = (u32, &Penalty)> {
        self.edges
            .get(&stop_idx)
            .into_iter()
            .flat_map(|list| list.iter().map(|(to_idx, penalty)| (*to_idx, penalty)))
    }

    /// Every stop with at least one outgoing edge.
    pub fn sources(&self) -> impl Iterator<Item = u32> {
        self.edges.keys().copied()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.values().map(|list| list.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

/// Consecutive-visit edges: for every active visit at the source, the next
/// visit on the same trip names the destination stop.
fn scan_ride_edges(
    timetable: &Timetable,
    active: &[bool],
    config: &Config,
    from_idx: u32,
    edges: &mut HashMap<u32, Penalty>,
) {
    for visit in timetable.stop_times_by_stop_idx(from_idx) {
        if !active[visit.trip_idx as usize] {
            continue;
        }
        let Some(next) = timetable.next_stop_time(visit) else {
            continue;
        };
        if next.stop_idx == from_idx {
            continue;
        }
        let penalty = Penalty::between(timetable, visit, next, config);
        record(edges, next.stop_idx, penalty, config);
    }
}

/// Cross-route edges: stops within walking reach of the source that share no
/// route with it, weighted by the cheapest feasible visit pairing.
fn scan_walk_edges(
    timetable: &Timetable,
    active: &[bool],
    config: &Config,
    tree: &QuadTree<u32>,
    from_idx: u32,
    edges: &mut HashMap<u32, Penalty>,
) {
    let from_stop = &timetable.stops[from_idx as usize];
    let query = coverage(&from_stop.coordinate, config.transfer_distance);
    for item in tree.query(&query) {
        let to_idx = item.payload;
        if to_idx == from_idx {
            continue;
        }
        let to_stop = &timetable.stops[to_idx as usize];
        // The box query over-reaches at the corners; re-check the real
        // distance before accepting a candidate.
        if from_stop.coordinate.distance_to(&to_stop.coordinate) >= config.transfer_distance {
            continue;
        }
        if timetable.on_shared_route(from_idx, to_idx) {
            continue;
        }

        let mut best: Option<Penalty> = None;
        for visit in timetable.stop_times_by_stop_idx(from_idx) {
            if !active[visit.trip_idx as usize] {
                continue;
            }
            let candidates = timetable.stop_time_indices_by_stop_idx(to_idx);
            let start = candidates.partition_point(|&index| {
                timetable.stop_times[index as usize].arrival_time < visit.arrival_time
            });
            let Some(onward) = candidates[start..]
                .iter()
                .map(|&index| &timetable.stop_times[index as usize])
                .find(|candidate| active[candidate.trip_idx as usize])
            else {
                continue;
            };
            let penalty = Penalty::between(timetable, visit, onward, config);
            if !penalty.is_feasible() {
                continue;
            }
            best = match best {
                Some(current) if current.cost() <= penalty.cost() => Some(current),
                _ => Some(penalty),
            };
        }
        if let Some(penalty) = best {
            record(edges, to_idx, penalty, config);
        }
    }
}

/// Keeps the cheapest admissible weight per destination. Infeasible pairs
/// and pairs past the cost cutoff never enter the graph.
fn record(edges: &mut HashMap<u32, Penalty>, to_idx: u32, penalty: Penalty, config: &Config) {
    if !penalty.is_feasible() || penalty.cost() > config.max_cost {
        return;
    }
    edges
        .entry(to_idx)
        .and_modify(|current| {
            if penalty.cost() < current.cost() {
                *current = penalty;
            }
        })
        .or_insert(penalty);
}

/// Minimal rectangle enclosing the given stops, in (longitude, latitude)
/// space.
fn extent(timetable: &Timetable, stop_idxs: &[u32]) -> Bounds {
    let mut left = f64::INFINITY;
    let mut right = f64::NEG_INFINITY;
    let mut bottom = f64::INFINITY;
    let mut top = f64::NEG_INFINITY;
    for &stop_idx in stop_idxs {
        let coordinate = timetable.stops[stop_idx as usize].coordinate;
        left = left.min(coordinate.longitude);
        right = right.max(coordinate.longitude);
        bottom = bottom.min(coordinate.latitude);
        top = top.max(coordinate.latitude);
    }
    Bounds::new(left, right, bottom, top)
}

/// Bounding box reaching `radius` out from a point in every direction, for
/// seeding a range query. Longitude degrees shrink with latitude, so the box
/// widens accordingly.
fn coverage(center: &Coordinate, radius: Distance) -> Bounds {
    let delta_lat = radius.as_kilometers() / LATITUDE_DISTANCE.as_kilometers();
    let shrink = center.latitude.to_radians().cos().abs().max(1e-6);
    let delta_lon = radius.as_kilometers() / (LONGITUDE_DISTANCE.as_kilometers() * shrink);
    Bounds::new(
        center.longitude - delta_lon,
        center.longitude + delta_lon,
        center.latitude - delta_lat,
        center.latitude + delta_lat,
    )
}

#[test]
fn coverage_encloses_center_test() {
    let center = Coordinate::new(59.33, 18.07);
    let bounds = coverage(&center, Distance::from_kilometers(1.0));
    assert!(bounds.contains(center.longitude, center.latitude));
    assert!(bounds.width() > 0.0 && bounds.height() > 0.0);
}
