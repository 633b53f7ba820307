//! Monotonic timestamps
//!
//! A `Timestamp` is a (seconds, nanoseconds) reading from a monotonic clock
//! with an arbitrary epoch. It is only meaningful for computing differences
//! within one process run, never as calendar time.

use core::ops::Sub;
use std::time::Duration;

/// Nanoseconds in one second
pub const NANOS_PER_SEC: u32 = 1_000_000_000;

/// Seconds + nanoseconds since an arbitrary monotonic epoch
///
/// Values produced by a backend's `get_time` and by `time_sub` keep
/// `nanosec` in `[0, NANOS_PER_SEC)`, so the derived ordering (seconds
/// first) is the chronological one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp {
    pub sec: u32,
    pub nanosec: u32,
}

impl Timestamp {
    /// Zero duration / the epoch
    pub const ZERO: Timestamp = Timestamp { sec: 0, nanosec: 0 };

    /// Create a timestamp, carrying whole seconds out of `nanosec`
    #[inline]
    pub const fn new(sec: u32, nanosec: u32) -> Self {
        Self {
            sec: sec.wrapping_add(nanosec / NANOS_PER_SEC),
            nanosec: nanosec % NANOS_PER_SEC,
        }
    }

    /// Build from a nanosecond count (seconds truncate to 32 bits)
    #[inline]
    pub const fn from_nanos(nanos: u64) -> Self {
        Self {
            sec: (nanos / NANOS_PER_SEC as u64) as u32,
            nanosec: (nanos % NANOS_PER_SEC as u64) as u32,
        }
    }

    /// Total nanoseconds
    #[inline]
    pub const fn as_nanos(&self) -> u64 {
        self.sec as u64 * NANOS_PER_SEC as u64 + self.nanosec as u64
    }

    /// Seconds as a floating point value
    #[inline]
    pub fn as_secs_f64(&self) -> f64 {
        time_to_f64(*self)
    }
}

impl Sub for Timestamp {
    type Output = Timestamp;

    #[inline]
    fn sub(self, rhs: Timestamp) -> Timestamp {
        time_sub(self, rhs)
    }
}

impl From<Duration> for Timestamp {
    fn from(d: Duration) -> Self {
        Timestamp {
            sec: d.as_secs() as u32,
            nanosec: d.subsec_nanos(),
        }
    }
}

impl From<Timestamp> for Duration {
    fn from(t: Timestamp) -> Self {
        Duration::new(t.sec as u64, t.nanosec)
    }
}

/// Difference `t1 - t2` with the nanosecond borrow normalized
///
/// Inputs are normalized first, so hand-built values with
/// `nanosec >= NANOS_PER_SEC` are accepted. Requires `t1 >= t2`; otherwise
/// the seconds component wraps.
#[inline]
pub fn time_sub(t1: Timestamp, t2: Timestamp) -> Timestamp {
    let t1 = Timestamp::new(t1.sec, t1.nanosec);
    let t2 = Timestamp::new(t2.sec, t2.nanosec);
    if t1.nanosec >= t2.nanosec {
        Timestamp {
            sec: t1.sec.wrapping_sub(t2.sec),
            nanosec: t1.nanosec - t2.nanosec,
        }
    } else {
        Timestamp {
            sec: t1.sec.wrapping_sub(t2.sec).wrapping_sub(1),
            nanosec: t1.nanosec + NANOS_PER_SEC - t2.nanosec,
        }
    }
}

/// `sec + nanosec / 1e9`
#[inline]
pub fn time_to_f64(t: Timestamp) -> f64 {
    t.sec as f64 + t.nanosec as f64 / NANOS_PER_SEC as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sub_without_borrow() {
        let d = time_sub(Timestamp::new(5, 700), Timestamp::new(2, 200));
        assert_eq!(d, Timestamp { sec: 3, nanosec: 500 });
    }

    #[test]
    fn test_sub_with_borrow() {
        let d = time_sub(Timestamp::new(5, 100), Timestamp::new(2, 999_999_900));
        assert_eq!(d, Timestamp { sec: 2, nanosec: 200 });
        assert!(d.nanosec < NANOS_PER_SEC);
    }

    #[test]
    fn test_sub_unnormalized_inputs() {
        let t1 = Timestamp { sec: 1, nanosec: 3_500_000_000 };
        let t2 = Timestamp { sec: 0, nanosec: 4_000_000_000 };
        let d = time_sub(t1, t2);
        assert_eq!(d, Timestamp { sec: 0, nanosec: 500_000_000 });

        let d = time_sub(Timestamp { sec: 2, nanosec: u32::MAX }, Timestamp::new(1, 999_999_999));
        assert!(d.nanosec < NANOS_PER_SEC);
        assert_eq!(d.as_nanos(), 1_000_000_000 + u32::MAX as u64 - 999_999_999);
    }

    #[test]
    fn test_sub_normalized_over_grid() {
        let samples = [0u32, 1, 499_999_999, 500_000_000, 999_999_999];
        for &a_ns in &samples {
            for &b_ns in &samples {
                let t1 = Timestamp::new(10, a_ns);
                let t2 = Timestamp::new(3, b_ns);
                let d = t1 - t2;
                assert!(d.nanosec < NANOS_PER_SEC);
                assert_eq!(d.as_nanos(), t1.as_nanos() - t2.as_nanos());
            }
        }
    }

    #[test]
    fn test_sub_self_is_zero() {
        for t in [Timestamp::ZERO, Timestamp::new(1, 1), Timestamp::new(u32::MAX, 999_999_999)] {
            assert_eq!(time_to_f64(time_sub(t, t)), 0.0);
        }
    }

    #[test]
    fn test_to_f64() {
        let t = Timestamp::new(2, 500_000_000);
        assert!((time_to_f64(t) - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_new_carries_nanos() {
        let t = Timestamp::new(1, 2_500_000_000);
        assert_eq!(t, Timestamp { sec: 3, nanosec: 500_000_000 });
    }

    #[test]
    fn test_duration_conversion() {
        let d = Duration::new(7, 123);
        let t = Timestamp::from(d);
        assert_eq!(t, Timestamp { sec: 7, nanosec: 123 });
        assert_eq!(Duration::from(t), d);
        assert_eq!(Timestamp::from_nanos(t.as_nanos()), t);
    }

    #[test]
    fn test_ordering() {
        assert!(Timestamp::new(1, 999_999_999) < Timestamp::new(2, 0));
        assert!(Timestamp::new(2, 1) > Timestamp::new(2, 0));
    }
}
