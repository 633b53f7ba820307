//! Monotonic clock and nanosleep

use nix::errno::Errno;
use nix::time::{clock_gettime, ClockId};
use osapi_core::traits::OsClock;
use osapi_core::Timestamp;

use super::{fatal, PosixBackend};
use crate::portable::sleep_nanos;

impl OsClock for PosixBackend {
    fn sleep(sec: i32, nanosec: i32) {
        let Some(nanos) = sleep_nanos(sec, nanosec) else {
            return;
        };
        // Safety: timespec is plain data
        let mut req: libc::timespec = unsafe { core::mem::zeroed() };
        req.tv_sec = (nanos / 1_000_000_000) as libc::time_t;
        req.tv_nsec = (nanos % 1_000_000_000) as _;
        let mut rem = req;
        // Resume after signal interruptions with the remaining time
        // Safety: both timespecs are valid for the call
        while unsafe { libc::nanosleep(&req, &mut rem) } == -1 {
            if Errno::last() != Errno::EINTR {
                break;
            }
            req = rem;
        }
    }

    fn get_time() -> Timestamp {
        match clock_gettime(ClockId::CLOCK_MONOTONIC) {
            Ok(ts) => Timestamp {
                sec: ts.tv_sec() as u32,
                nanosec: ts.tv_nsec() as u32,
            },
            Err(errno) => fatal("clock_gettime(CLOCK_MONOTONIC)", errno),
        }
    }
}
