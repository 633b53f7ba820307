//! Log sinks that forward to the `log` crate
//!
//! For applications that already run a `log` backend (env_logger, fern,
//! ...). Messages keep their level and carry the `osapi` target so they can
//! be filtered separately.

use crate::table::OsApiTable;

/// `log` target used for every forwarded message
pub const LOG_TARGET: &str = "osapi";

pub fn forward_info(msg: &str) {
    log::info!(target: LOG_TARGET, "{}", msg);
}

pub fn forward_warning(msg: &str) {
    log::warn!(target: LOG_TARGET, "{}", msg);
}

pub fn forward_error(msg: &str) {
    log::error!(target: LOG_TARGET, "{}", msg);
}

pub fn forward_debug(msg: &str) {
    log::debug!(target: LOG_TARGET, "{}", msg);
}

impl OsApiTable {
    /// Replace the four log sinks with `log` crate forwards
    pub fn with_log_bridge(self) -> Self {
        Self {
            log: forward_info,
            log_warning: forward_warning,
            log_error: forward_error,
            log_debug: forward_debug,
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock;
    use crate::{os_dbg, os_err, os_log, os_warn};
    use std::sync::Mutex;

    static RECORDS: Mutex<Vec<(log::Level, String, String)>> = Mutex::new(Vec::new());

    struct Recorder;

    impl log::Log for Recorder {
        fn enabled(&self, _metadata: &log::Metadata) -> bool {
            true
        }

        fn log(&self, record: &log::Record) {
            RECORDS.lock().unwrap_or_else(|e| e.into_inner()).push((
                record.level(),
                record.target().to_string(),
                record.args().to_string(),
            ));
        }

        fn flush(&self) {}
    }

    static RECORDER: Recorder = Recorder;

    #[test]
    fn test_bridge_forwards_levels() {
        let _guard = mock::exclusive();
        let _ = log::set_logger(&RECORDER);
        log::set_max_level(log::LevelFilter::Trace);

        crate::binding::install_custom(OsApiTable::mock().with_log_bridge());

        os_log!("bridge info {}", 1);
        os_warn!("bridge warn");
        os_err!("bridge error");
        os_dbg!("bridge debug");

        let records = RECORDS.lock().unwrap_or_else(|e| e.into_inner()).clone();
        let expect = [
            (log::Level::Info, "bridge info 1"),
            (log::Level::Warn, "bridge warn"),
            (log::Level::Error, "bridge error"),
            (log::Level::Debug, "bridge debug"),
        ];
        for (level, msg) in expect {
            assert!(
                records
                    .iter()
                    .any(|(l, t, m)| *l == level && t == LOG_TARGET && m == msg),
                "missing {:?} {}",
                level,
                msg
            );
        }
    }
}
