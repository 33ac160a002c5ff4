use std::{
    cmp,
    fmt::Display,
    ops::{Add, Div, Mul, Sub},
};

use serde::{Deserialize, Serialize};

pub(crate) const LONGITUDE_DISTANCE: Distance = Distance::from_meters(111_320.0);
pub(crate) const LATITUDE_DISTANCE: Distance = Distance::from_meters(110_540.0);

const MILE_IN_KILOMETERS: f64 = 1.609344;

/// A physical distance, stored as kilometers.
/// Meter and mile values are converted on the way in and out.
#[derive(Debug, Clone, Copy, Default)]
pub struct Distance(f64);

impl PartialEq for Distance {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl PartialOrd for Distance {
    fn partial_cmp(&self, other: &Self) -> Option<cmp::Ordering> {
        self.0.partial_cmp(&other.0)
    }
}

impl Add for Distance {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Distance {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Mul<f64> for Distance {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self::Output {
        Self(self.0 * rhs)
    }
}

impl Div<f64> for Distance {
    type Output = Self;
    fn div(self, rhs: f64) -> Self::Output {
        Self(self.0 / rhs)
    }
}

impl Distance {
    pub const fn from_kilometers(distance: f64) -> Self {
        Self(distance)
    }

    pub const fn from_meters(distance: f64) -> Self {
        Self(distance / 1000.0)
    }

    pub const fn from_miles(distance: f64) -> Self {
        Self(distance * MILE_IN_KILOMETERS)
    }

    pub const fn as_kilometers(&self) -> f64 {
        self.0
    }

    pub const fn as_meters(&self) -> f64 {
        self.0 * 1000.0
    }

    pub const fn as_miles(&self) -> f64 {
        self.0 / MILE_IN_KILOMETERS
    }
}

/// A point on Earth, latitude and longitude in degrees.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("{}, {}", self.latitude, self.longitude))
    }
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Great-circle distance to another point. Symmetric.
    pub fn distance_to(&self, coord: &Self) -> Distance {
        const R: f64 = 6371.0;
        let dist_lat = f64::to_radians(coord.latitude - self.latitude);
        let dist_lon = f64::to_radians(coord.longitude - self.longitude);
        let a = f64::powi(f64::sin(dist_lat / 2.0), 2)
            + f64::cos(f64::to_radians(self.latitude))
                * f64::cos(f64::to_radians(coord.latitude))
                * f64::sin(dist_lon / 2.0)
                * f64::sin(dist_lon / 2.0);
        let c = 2.0 * f64::atan2(f64::sqrt(a), f64::sqrt(1.0 - a));
        Distance::from_kilometers(R * c)
    }
}

#[test]
fn distance_test() {
    let coord_a = Coordinate {
        latitude: 48.85800943005911,
        longitude: 2.3514350059357927,
    };

    let coord_b = Coordinate {
        latitude: 51.5052389927712,
        longitude: -0.12495407345099824,
    };
    let d = coord_a.distance_to(&coord_b);
    assert!((d.as_kilometers() - 343.5).abs() < 5.0);
}

#[test]
fn distance_symmetry_test() {
    let coord_a = Coordinate::new(59.3293, 18.0686);
    let coord_b = Coordinate::new(57.7089, 11.9746);
    let forward = coord_a.distance_to(&coord_b);
    let backward = coord_b.distance_to(&coord_a);
    assert!((forward.as_kilometers() - backward.as_kilometers()).abs() < 1e-9);
}

#[test]
fn distance_eq_test() {
    let dist_a = Distance::from_meters(1000.0);
    let dist_b = Distance::from_kilometers(1.0);
    assert_eq!(dist_a, dist_b)
}

#[test]
fn distance_cmp_test() {
    let dist_a = Distance::from_meters(1000.0);
    let dist_b = Distance::from_kilometers(0.5);
    assert!(dist_a > dist_b)
}

#[test]
fn distance_miles_test() {
    let dist = Distance::from_miles(1.0);
    assert!((dist.as_kilometers() - 1.609344).abs() < 1e-9);
    assert!((dist.as_miles() - 1.0).abs() < 1e-9);
}
