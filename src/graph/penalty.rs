use crate::{
    shared::{geo::Distance, time::Duration},
    timetable::{StopTime, Timetable},
};

use super::Config;

/// The weight of a candidate edge between two visits.
///
/// The scalar cost combines elapsed time, transfer friction and an optional
/// distance term, but the constituents stay inspectable so downstream layers
/// can reason about why an edge costs what it does.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Penalty {
    /// Time between leaving the source visit and arriving at the
    /// destination visit. Negative when the pair is infeasible.
    pub elapsed: Duration,
    /// Great-circle distance between the two stops.
    pub distance: Distance,
    /// 0 for a ride continuation on the same trip, 1 otherwise.
    pub transfers: u32,
    cost: f64,
}

impl Penalty {
    /// Scores the move from one visit to another.
    ///
    /// A destination that arrives before the source is backward travel: the
    /// pair keeps its raw elapsed time and distance for inspection, but the
    /// cost is infinite and no graph ever records it. On a transfer the
    /// elapsed time is widened to at least the time it takes to walk between
    /// the stops, so a scheduled gap too short to cover on foot is priced at
    /// the walk instead.
    pub fn between(timetable: &Timetable, from: &StopTime, to: &StopTime, config: &Config) -> Self {
        let from_stop = &timetable.stops[from.stop_idx as usize];
        let to_stop = &timetable.stops[to.stop_idx as usize];
        let distance = from_stop.coordinate.distance_to(&to_stop.coordinate);
        let elapsed = to.arrival_time - from.arrival_time;
        let transfers = if from.on_same_trip(to) { 0 } else { 1 };

        if elapsed.is_negative() {
            return Self {
                elapsed,
                distance,
                transfers,
                cost: f64::INFINITY,
            };
        }

        let elapsed = if transfers > 0 {
            elapsed.max(time_to_walk(distance, config.walk_speed))
        } else {
            elapsed
        };

        let mut cost = elapsed.as_minutes() + transfers as f64 * config.transfer_penalty;
        if transfers > 0 {
            cost += distance.as_kilometers() * config.distance_penalty;
        }

        Self {
            elapsed,
            distance,
            transfers,
            cost,
        }
    }

    /// The scalar weight in minutes. Infinite for an infeasible pair.
    pub const fn cost(&self) -> f64 {
        self.cost
    }

    pub fn is_feasible(&self) -> bool {
        self.cost.is_finite()
    }
}

/// How long covering a distance takes on foot, rounded up to whole seconds.
pub fn time_to_walk(distance: Distance, walk_speed: f64) -> Duration {
    let hours = distance.as_kilometers() / walk_speed;
    Duration::from_seconds((hours * 60.0 * 60.0).ceil() as i64)
}

#[test]
fn time_to_walk_test() {
    let half_hour = time_to_walk(Distance::from_kilometers(2.5), 5.0);
    assert_eq!(half_hour.as_seconds(), 30 * 60);
    let nothing = time_to_walk(Distance::from_kilometers(0.0), 5.0);
    assert_eq!(nothing.as_seconds(), 0);
}
