use chrono::NaiveDate;
use stopmesh::{
    graph::{Config, Penalty},
    shared::{Coordinate, Time},
    timetable::{StopTime, Timetable},
};

fn t(hms: &str) -> Time {
    Time::from_hms(hms).unwrap()
}

/// One ride trip over A and B, plus single-visit trips on separate routes
/// that give A several transfer targets at varying gaps and distances.
fn timetable() -> Timetable {
    let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
    let end = NaiveDate::from_ymd_opt(2025, 12, 31).unwrap();

    let mut builder = Timetable::builder();
    builder.add_service("wd", start, end);
    for route in ["R1", "R2", "R3", "R4", "R5"] {
        builder.add_route(route, route);
    }
    builder.add_trip("T1", "R1", "wd");
    builder.add_trip("T2", "R2", "wd");
    builder.add_trip("T3", "R3", "wd");
    builder.add_trip("T4", "R4", "wd");
    builder.add_trip("T5", "R5", "wd");

    builder.add_stop("A", "Central", Coordinate::new(59.3000, 18.0000), None);
    builder.add_stop("B", "North", Coordinate::new(59.3050, 18.0000), None);
    // A few meters from A.
    builder.add_stop("C", "Central East", Coordinate::new(59.3001, 18.0001), None);
    // Roughly 556 m from A, a 400 second walk at 5 km/h.
    builder.add_stop("D", "North Annex", Coordinate::new(59.3050, 18.0000), None);
    builder.add_stop("E", "Central Underground", Coordinate::new(59.3000, 18.0000), None);
    builder.add_stop("F", "North Underground", Coordinate::new(59.3050, 18.0000), None);

    builder.add_stop_time("T1", "A", 1, t("08:00:00"), t("08:00:00"), None);
    builder.add_stop_time("T1", "B", 2, t("08:05:00"), t("08:05:00"), None);
    builder.add_stop_time("T2", "C", 1, t("08:10:00"), t("08:10:00"), None);
    builder.add_stop_time("T3", "D", 1, t("08:00:30"), t("08:00:30"), None);
    builder.add_stop_time("T4", "E", 1, t("08:00:00"), t("08:00:00"), None);
    builder.add_stop_time("T5", "F", 1, t("08:00:00"), t("08:00:00"), None);

    builder.build().unwrap()
}

fn visit<'a>(timetable: &'a Timetable, trip_id: &str, inner_idx: usize) -> &'a StopTime {
    let trip = timetable.trip_by_id(trip_id).unwrap();
    &timetable.stop_times_by_trip_idx(trip.index)[inner_idx]
}

#[test]
fn same_trip_ride_test() {
    let timetable = timetable();
    let config = Config::default();
    let penalty = Penalty::between(
        &timetable,
        visit(&timetable, "T1", 0),
        visit(&timetable, "T1", 1),
        &config,
    );

    assert!(penalty.is_feasible());
    assert_eq!(penalty.transfers, 0);
    assert_eq!(penalty.elapsed.as_seconds(), 300);
    assert!((penalty.cost() - 5.0).abs() < 1e-9);
}

#[test]
fn backward_pair_is_infinite_test() {
    let timetable = timetable();
    let config = Config::default();
    let penalty = Penalty::between(
        &timetable,
        visit(&timetable, "T1", 1),
        visit(&timetable, "T1", 0),
        &config,
    );

    assert!(!penalty.is_feasible());
    assert_eq!(penalty.cost(), f64::INFINITY);
    assert!(penalty.elapsed.is_negative());
    assert_eq!(penalty.elapsed.as_seconds(), -300);
}

#[test]
fn self_pair_is_cheapest_test() {
    let timetable = timetable();
    let config = Config::default();
    let source = visit(&timetable, "T1", 0);
    let penalty = Penalty::between(&timetable, source, source, &config);

    assert!(penalty.is_feasible());
    assert_eq!(penalty.transfers, 0);
    assert_eq!(penalty.elapsed.as_seconds(), 0);
    assert!((penalty.cost() - 0.0).abs() < 1e-9);
}

#[test]
fn transfer_adds_flat_penalty_test() {
    let timetable = timetable();
    let config = Config::default();
    // A at 08:00 to C at 08:10, a few meters away: the scheduled gap
    // dwarfs the walk, so the cost is ten minutes plus the flat penalty.
    let penalty = Penalty::between(
        &timetable,
        visit(&timetable, "T1", 0),
        visit(&timetable, "T2", 0),
        &config,
    );

    assert!(penalty.is_feasible());
    assert_eq!(penalty.transfers, 1);
    assert_eq!(penalty.elapsed.as_seconds(), 600);
    assert!((penalty.cost() - 30.0).abs() < 1e-9);
}

#[test]
fn walk_time_widens_short_gap_test() {
    let timetable = timetable();
    let config = Config::default();
    // A at 08:00 to D at 08:00:30: a 30 second gap over a 400 second walk.
    let penalty = Penalty::between(
        &timetable,
        visit(&timetable, "T1", 0),
        visit(&timetable, "T3", 0),
        &config,
    );

    assert!(penalty.is_feasible());
    assert_eq!(penalty.transfers, 1);
    assert!(penalty.elapsed.as_seconds() > 30);
    assert!((395..=405).contains(&penalty.elapsed.as_seconds()));
}

#[test]
fn zero_gap_same_location_transfer_test() {
    let timetable = timetable();
    let config = Config::default();
    // E sits exactly at A's coordinates and arrives at the same moment.
    let penalty = Penalty::between(
        &timetable,
        visit(&timetable, "T1", 0),
        visit(&timetable, "T4", 0),
        &config,
    );

    assert!(penalty.is_feasible());
    assert_eq!(penalty.transfers, 1);
    assert_eq!(penalty.elapsed.as_seconds(), 0);
    assert_eq!(penalty.distance.as_kilometers(), 0.0);
    assert!((penalty.cost() - config.transfer_penalty).abs() < 1e-9);
}

#[test]
fn simultaneous_arrivals_are_feasible_test() {
    let timetable = timetable();
    let config = Config::default();
    // F arrives the moment A does but half a kilometer away: simultaneous
    // is not backward, and the walk sets the effective elapsed time.
    let penalty = Penalty::between(
        &timetable,
        visit(&timetable, "T1", 0),
        visit(&timetable, "T5", 0),
        &config,
    );

    assert!(penalty.is_feasible());
    assert_eq!(penalty.transfers, 1);
    assert!(penalty.elapsed.as_seconds() > 0);
    assert!(penalty.cost() >= config.transfer_penalty);
}

#[test]
fn distance_term_gated_by_transfer_test() {
    let timetable = timetable();
    let config = Config {
        distance_penalty: 3.0,
        ..Config::default()
    };

    // Same trip: pure ride time, no distance term despite the nonzero rate.
    let ride = Penalty::between(
        &timetable,
        visit(&timetable, "T1", 0),
        visit(&timetable, "T1", 1),
        &config,
    );
    assert!((ride.cost() - ride.elapsed.as_minutes()).abs() < 1e-9);

    // Transfer: the scalar decomposes into its inspectable constituents.
    let transfer = Penalty::between(
        &timetable,
        visit(&timetable, "T1", 0),
        visit(&timetable, "T2", 0),
        &config,
    );
    let expected = transfer.elapsed.as_minutes()
        + transfer.transfers as f64 * config.transfer_penalty
        + transfer.distance.as_kilometers() * config.distance_penalty;
    assert!((transfer.cost() - expected).abs() < 1e-9);
    assert!(transfer.cost() > ride.cost());
}

#[test]
fn feasible_cost_is_never_negative_test() {
    let timetable = timetable();
    let config = Config::default();
    let source = visit(&timetable, "T1", 0);
    for trip_id in ["T1", "T2", "T3", "T4", "T5"] {
        let penalty = Penalty::between(&timetable, source, visit(&timetable, trip_id, 0), &config);
        if penalty.is_feasible() {
            assert!(penalty.cost() >= 0.0);
        }
    }
}
