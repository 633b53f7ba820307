//! Clock over `Instant`, sleep over `thread::sleep`

use std::sync::OnceLock;
use std::time::{Duration, Instant};

use osapi_core::traits::OsClock;
use osapi_core::Timestamp;

use super::PortableBackend;

static EPOCH: OnceLock<Instant> = OnceLock::new();

/// Total requested nanoseconds, `None` if not positive
pub(crate) fn sleep_nanos(sec: i32, nanosec: i32) -> Option<u64> {
    let total = sec as i64 * 1_000_000_000 + nanosec as i64;
    (total > 0).then_some(total as u64)
}

impl OsClock for PortableBackend {
    fn sleep(sec: i32, nanosec: i32) {
        if let Some(nanos) = sleep_nanos(sec, nanosec) {
            std::thread::sleep(Duration::from_nanos(nanos));
        }
    }

    fn get_time() -> Timestamp {
        Timestamp::from(EPOCH.get_or_init(Instant::now).elapsed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sleep_nanos() {
        assert_eq!(sleep_nanos(0, 0), None);
        assert_eq!(sleep_nanos(-1, 0), None);
        assert_eq!(sleep_nanos(1, 500), Some(1_000_000_500));
        assert_eq!(sleep_nanos(0, 1_500_000_000), Some(1_500_000_000));
        assert_eq!(sleep_nanos(1, -500_000_000), Some(500_000_000));
    }

    #[test]
    fn test_clock_monotonic() {
        let a = PortableBackend::get_time();
        PortableBackend::sleep(0, 2_000_000);
        let b = PortableBackend::get_time();
        assert!(b > a);
        assert!((b - a).as_secs_f64() >= 0.002);
    }
}
