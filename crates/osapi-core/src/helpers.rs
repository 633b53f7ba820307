//! Helpers built strictly on top of the active table

use crate::binding;
use crate::buf::OsBuf;
use crate::time::{time_sub, time_to_f64, Timestamp};

/// Seconds elapsed since `start`, read through the table's clock
///
/// `start` is left untouched.
#[inline]
pub fn elapsed_since(start: &Timestamp) -> f64 {
    let now = (binding::current().get_time)();
    time_to_f64(time_sub(now, *start))
}

/// Same as `elapsed_since`
#[inline]
pub fn time_measure(start: &Timestamp) -> f64 {
    elapsed_since(start)
}

/// Seconds since `start`, then reset `start` to now
///
/// ```ignore
/// let mut t = osapi::api::get_time();
/// load_assets();
/// os_log!("assets: {:.3}s", lap(&mut t));
/// build_world();
/// os_log!("world: {:.3}s", lap(&mut t));
/// ```
pub fn lap(start: &mut Timestamp) -> f64 {
    let now = (binding::current().get_time)();
    let elapsed = time_to_f64(time_sub(now, *start));
    *start = now;
    elapsed
}

/// Sleep for a fractional number of seconds through the `sleep` slot
///
/// Zero, negative and NaN durations return immediately.
pub fn sleepf(seconds: f64) {
    if seconds.is_nan() || seconds <= 0.0 {
        return;
    }
    let sec = seconds.trunc();
    let nanosec = ((seconds - sec) * 1e9) as i32;
    (binding::current().sleep)(sec.min(i32::MAX as f64) as i32, nanosec);
}

/// Copy `src` into memory from the table's `malloc`
///
/// `None` when the allocator fails.
#[inline]
pub fn memdup(src: &[u8]) -> Option<OsBuf> {
    OsBuf::copy_from(src)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::install_custom;
    use crate::mock::{self, MockBackend};
    use crate::table::OsApiTable;

    #[test]
    fn test_memdup_equal_and_distinct() {
        let _guard = mock::exclusive();
        install_custom(OsApiTable::from_platform::<MockBackend>());

        let src = vec![1u8, 2, 3, 4, 5];
        let copy = memdup(&src).unwrap();
        assert_eq!(&copy[..], &src[..]);
        assert_ne!(copy.as_ptr(), src.as_ptr());
    }

    #[test]
    fn test_memdup_with_null_allocator() {
        let _guard = mock::exclusive();
        install_custom(OsApiTable::mock().with_failing_alloc());

        assert!(memdup(b"payload").is_none());
    }

    #[test]
    fn test_elapsed_and_lap_with_fake_clock() {
        let _guard = mock::exclusive();
        install_custom(OsApiTable::mock().with_fake_clock());
        mock::FakeClock::set(Timestamp::new(100, 0));

        let mut start = (binding::current().get_time)();
        mock::FakeClock::advance(Timestamp::new(1, 500_000_000));

        assert!((elapsed_since(&start) - 1.5).abs() < 1e-9);
        assert!((time_measure(&start) - 1.5).abs() < 1e-9);
        assert_eq!(start, Timestamp::new(100, 0));

        assert!((lap(&mut start) - 1.5).abs() < 1e-9);
        assert_eq!(start, Timestamp::new(101, 500_000_000));
        assert_eq!(lap(&mut start), 0.0);
    }

    #[test]
    fn test_sleepf_splits_seconds() {
        let _guard = mock::exclusive();
        install_custom(OsApiTable::mock().with_fake_clock());
        mock::FakeClock::set(Timestamp::ZERO);

        sleepf(2.25);
        assert_eq!(mock::FakeClock::now(), Timestamp::new(2, 250_000_000));
    }

    #[test]
    fn test_sleepf_non_positive_is_noop() {
        let _guard = mock::exclusive();
        install_custom(OsApiTable::mock().with_fake_clock());
        mock::FakeClock::set(Timestamp::new(5, 0));

        sleepf(0.0);
        sleepf(-3.0);
        sleepf(f64::NAN);
        assert_eq!(mock::FakeClock::now(), Timestamp::new(5, 0));
    }
}
