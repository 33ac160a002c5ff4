use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

/// A time of day, stored as seconds since midnight.
///
/// Schedules that run past midnight carry hour values of 24 and up, so this
/// is not bounded to a single day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Time(u32);

impl From<u32> for Time {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl Sub<Time> for Time {
    type Output = Duration;

    fn sub(self, rhs: Self) -> Self::Output {
        Duration(self.0 as i64 - rhs.0 as i64)
    }
}

impl Time {
    pub const fn from_seconds(secs: u32) -> Self {
        Self(secs)
    }

    pub const fn as_seconds(&self) -> u32 {
        self.0
    }

    pub fn to_hms_string(&self) -> String {
        let h = self.0 / 3600;
        let m = (self.0 % 3600) / 60;
        let s = self.0 % 60;
        format!("{:02}:{:02}:{:02}", h, m, s)
    }

    pub fn from_hms(time: &str) -> Option<Self> {
        const HOUR_TO_SEC: u32 = 60 * 60;
        const MINUTE_TO_SEC: u32 = 60;
        let mut split = time.split(':');
        let hours: u32 = split.next()?.parse().ok()?;
        let hours = hours.checked_mul(HOUR_TO_SEC)?;
        let minutes: u32 = split.next()?.parse().ok()?;
        let minutes = minutes.checked_mul(MINUTE_TO_SEC)?;
        let seconds: u32 = split.next()?.parse().ok()?;
        let seconds = hours.checked_add(minutes)?.checked_add(seconds)?;
        Some(Self(seconds))
    }
}

#[test]
fn parse_unparse_1() {
    let time = "00:00:00";
    let stime = Time::from_hms(time).unwrap();
    assert_eq!(time, stime.to_hms_string())
}

#[test]
fn parse_unparse_2() {
    let time = "00:00:30";
    let stime = Time::from_hms(time).unwrap();
    assert_eq!(time, stime.to_hms_string())
}

#[test]
fn parse_unparse_3() {
    let time = "00:30:00";
    let stime = Time::from_hms(time).unwrap();
    assert_eq!(time, stime.to_hms_string())
}

#[test]
fn parse_unparse_4() {
    let time = "12:00:00";
    let stime = Time::from_hms(time).unwrap();
    assert_eq!(time, stime.to_hms_string())
}

#[test]
fn parse_unparse_5() {
    let time = "25:10:00";
    let stime = Time::from_hms(time).unwrap();
    assert_eq!(time, stime.to_hms_string())
}

#[test]
fn valid_time_test_1() {
    let time = "00:00:00";
    assert_eq!(Time::from_hms(time).unwrap().as_seconds(), 0);
}

#[test]
fn valid_time_test_2() {
    let time = "00:00:30";
    assert_eq!(Time::from_hms(time).unwrap().as_seconds(), 30);
}

#[test]
fn valid_time_test_3() {
    let time = "00:01:30";
    assert_eq!(Time::from_hms(time).unwrap().as_seconds(), 90);
}

#[test]
fn valid_time_test_4() {
    let time = "01:01:30";
    assert_eq!(Time::from_hms(time).unwrap().as_seconds(), 3690);
}

#[test]
fn valid_time_test_5() {
    let time = "24:00:00";
    assert_eq!(Time::from_hms(time).unwrap().as_seconds(), 86400);
}

#[test]
fn invalid_time_test_1() {
    let time = "00:00:0a";
    assert!(Time::from_hms(time).is_none())
}

#[test]
fn invalid_time_test_2() {
    let time = "00:00";
    assert!(Time::from_hms(time).is_none())
}

#[test]
fn invalid_time_test_3() {
    // An hour field large enough to overflow the seconds counter.
    let time = "1193047:00:00";
    assert!(Time::from_hms(time).is_none())
}

/// Signed elapsed time in seconds.
///
/// Negative values are meaningful: they mark a pair of events that occur in
/// reverse order, and callers test for them instead of clamping them away.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Duration(i64);

impl From<i64> for Duration {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl Duration {
    pub const fn from_seconds(secs: i64) -> Self {
        Self(secs)
    }

    pub const fn from_minutes(minutes: i64) -> Self {
        Self(minutes * 60)
    }

    pub const fn from_hours(hours: i64) -> Self {
        Self(hours * 60 * 60)
    }

    pub const fn as_seconds(&self) -> i64 {
        self.0
    }

    pub const fn as_minutes(&self) -> f64 {
        self.0 as f64 / 60.0
    }

    pub const fn as_hours(&self) -> f64 {
        self.0 as f64 / (60.0 * 60.0)
    }

    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }
}

impl Sub for Duration {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl SubAssign for Duration {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0
    }
}

impl Add for Duration {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Duration {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0
    }
}

impl Neg for Duration {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

#[test]
fn duration_sign_test() {
    let early = Time::from_hms("08:00:00").unwrap();
    let late = Time::from_hms("08:10:00").unwrap();
    assert!((early - late).is_negative());
    assert!(!(late - early).is_negative());
}

#[test]
fn duration_minutes_test() {
    let early = Time::from_hms("08:00:00").unwrap();
    let late = Time::from_hms("08:10:00").unwrap();
    let elapsed = late - early;
    assert_eq!(elapsed.as_seconds(), 600);
    assert!((elapsed.as_minutes() - 10.0).abs() < 1e-9);
}

#[test]
fn duration_arithmetic_test() {
    let a = Duration::from_minutes(5);
    let b = Duration::from_seconds(30);
    assert_eq!((a + b).as_seconds(), 330);
    assert_eq!((a - b).as_seconds(), 270);
    assert_eq!((-a).as_seconds(), -300);
}

#[test]
fn duration_ord_test() {
    let short = Duration::from_seconds(10);
    let long = Duration::from_minutes(1);
    assert!(long > short);
    assert_eq!(short.max(long), long);
}
