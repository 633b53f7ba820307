//! Leveled logging through the table's sinks
//!
//! Four entry points, one per sink:
//!
//! ```ignore
//! use osapi_core::{os_log, os_warn, os_err, os_dbg};
//!
//! os_log!("Worker {} started", id);
//! os_warn!("Unexpected state: {:?}", state);
//! os_err!("dlopen '{}' failed", name);
//! os_dbg!("Debug info: x={}", x);
//! ```
//!
//! The message is formatted at the call site and handed to the active
//! table's `log` / `log_warning` / `log_error` / `log_debug` slot. Nothing
//! here filters: a custom sink sees every message sent to it.
//!
//! The default sinks end up in `write_line`, which writes one prefixed line
//! to stderr when the level is enabled in a process-wide mask. Each level
//! has its own bit, so levels can be switched independently.

use std::fmt;
use std::io::Write;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::OnceLock;
use std::time::Instant;

use crate::binding;

/// Log levels (matches common conventions)
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Off = 0,
    Error = 1,
    Warn = 2,
    Info = 3,
    Debug = 4,
}

impl LogLevel {
    pub fn from_u8(v: u8) -> Self {
        match v {
            0 => LogLevel::Off,
            1 => LogLevel::Error,
            2 => LogLevel::Warn,
            3 => LogLevel::Info,
            _ => LogLevel::Debug,
        }
    }

    pub fn prefix(&self) -> &'static str {
        match self {
            LogLevel::Off => "",
            LogLevel::Error => "[ERROR]",
            LogLevel::Warn => "[WARN] ",
            LogLevel::Info => "[INFO] ",
            LogLevel::Debug => "[DEBUG]",
        }
    }

    /// Bit of this level in the enable mask
    #[inline]
    const fn bit(self) -> u8 {
        match self {
            LogLevel::Off => 0,
            l => 1 << (l as u8 - 1),
        }
    }

    /// Mask enabling every level up to and including `self`
    #[inline]
    const fn mask_upto(self) -> u8 {
        ((1u16 << self as u8) - 1) as u8
    }
}

impl FromStr for LogLevel {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "off" | "0" => Ok(LogLevel::Off),
            "error" | "1" => Ok(LogLevel::Error),
            "warn" | "2" => Ok(LogLevel::Warn),
            "info" | "3" => Ok(LogLevel::Info),
            "debug" | "4" => Ok(LogLevel::Debug),
            _ => Err(()),
        }
    }
}

// Global writer configuration
static LEVEL_MASK: AtomicU8 = AtomicU8::new(LogLevel::Info.mask_upto());
static FLUSH_ENABLED: AtomicBool = AtomicBool::new(false);
static TIME_ENABLED: AtomicBool = AtomicBool::new(false);
static START: OnceLock<Instant> = OnceLock::new();

/// Enable every level up to `level`, disable the rest
pub fn set_log_level(level: LogLevel) {
    LEVEL_MASK.store(level.mask_upto(), Ordering::Relaxed);
}

/// Highest level whose bit is set
pub fn log_level() -> LogLevel {
    let mask = LEVEL_MASK.load(Ordering::Relaxed);
    (1..=LogLevel::Debug as u8)
        .rev()
        .map(LogLevel::from_u8)
        .find(|l| mask & l.bit() != 0)
        .unwrap_or(LogLevel::Off)
}

/// Toggle a single level without touching the others
pub fn set_level_enabled(level: LogLevel, enabled: bool) {
    if enabled {
        LEVEL_MASK.fetch_or(level.bit(), Ordering::Relaxed);
    } else {
        LEVEL_MASK.fetch_and(!level.bit(), Ordering::Relaxed);
    }
}

/// Check if a log level is enabled
#[inline]
pub fn level_enabled(level: LogLevel) -> bool {
    level != LogLevel::Off && LEVEL_MASK.load(Ordering::Relaxed) & level.bit() != 0
}

/// Flush stderr after every line
pub fn set_flush_enabled(enabled: bool) {
    FLUSH_ENABLED.store(enabled, Ordering::Relaxed);
}

#[inline]
pub fn flush_enabled() -> bool {
    FLUSH_ENABLED.load(Ordering::Relaxed)
}

/// Prefix lines with seconds since the first logged line
pub fn set_time_enabled(enabled: bool) {
    TIME_ENABLED.store(enabled, Ordering::Relaxed);
}

#[inline]
pub fn time_enabled() -> bool {
    TIME_ENABLED.load(Ordering::Relaxed)
}

/// Default sink body: one line on stderr if `level` is enabled
///
/// Uses a lock on stderr to keep lines whole.
pub fn write_line(level: LogLevel, msg: &str) {
    if !level_enabled(level) {
        return;
    }
    emit(level, format_args!("{}", msg));
}

/// Unfiltered error line, for diagnostics right before an abort
#[doc(hidden)]
pub fn write_fatal(args: fmt::Arguments<'_>) {
    emit(LogLevel::Error, args);
    let _ = std::io::stderr().flush();
}

fn emit(level: LogLevel, args: fmt::Arguments<'_>) {
    let stderr = std::io::stderr();
    let mut handle = stderr.lock();
    if time_enabled() {
        let elapsed = START.get_or_init(Instant::now).elapsed();
        let _ = write!(handle, "[{:>5}.{:06}] ", elapsed.as_secs(), elapsed.subsec_micros());
    }
    let _ = write!(handle, "{} ", level.prefix());
    let _ = handle.write_fmt(args);
    let _ = handle.write_all(b"\n");
    if flush_enabled() {
        let _ = handle.flush();
    }
}

/// Send to the active table's info sink
pub fn log_info(msg: &str) {
    match binding::try_current() {
        Ok(api) => (api.log)(msg),
        Err(_) => write_line(LogLevel::Info, msg),
    }
}

/// Send to the active table's warning sink
pub fn log_warn(msg: &str) {
    match binding::try_current() {
        Ok(api) => (api.log_warning)(msg),
        Err(_) => write_line(LogLevel::Warn, msg),
    }
}

/// Send to the active table's error sink
pub fn log_error(msg: &str) {
    match binding::try_current() {
        Ok(api) => (api.log_error)(msg),
        Err(_) => write_line(LogLevel::Error, msg),
    }
}

/// Send to the active table's debug sink
pub fn log_debug(msg: &str) {
    match binding::try_current() {
        Ok(api) => (api.log_debug)(msg),
        Err(_) => write_line(LogLevel::Debug, msg),
    }
}

/// Internal: format once, dispatch to one sink
#[doc(hidden)]
pub fn _dispatch(level: LogLevel, args: fmt::Arguments<'_>) {
    let sink: fn(&str) = match level {
        LogLevel::Off => return,
        LogLevel::Error => log_error,
        LogLevel::Warn => log_warn,
        LogLevel::Info => log_info,
        LogLevel::Debug => log_debug,
    };
    match args.as_str() {
        Some(s) => sink(s),
        None => sink(&args.to_string()),
    }
}

// ============================================================================
// Public Macros
// ============================================================================

/// Informational message through the table's `log` sink
#[macro_export]
macro_rules! os_log {
    ($($arg:tt)*) => {{
        $crate::logging::_dispatch(
            $crate::logging::LogLevel::Info,
            format_args!($($arg)*)
        );
    }};
}

/// Warning through the table's `log_warning` sink
#[macro_export]
macro_rules! os_warn {
    ($($arg:tt)*) => {{
        $crate::logging::_dispatch(
            $crate::logging::LogLevel::Warn,
            format_args!($($arg)*)
        );
    }};
}

/// Error through the table's `log_error` sink
#[macro_export]
macro_rules! os_err {
    ($($arg:tt)*) => {{
        $crate::logging::_dispatch(
            $crate::logging::LogLevel::Error,
            format_args!($($arg)*)
        );
    }};
}

/// Debug message through the table's `log_debug` sink
#[macro_export]
macro_rules! os_dbg {
    ($($arg:tt)*) => {{
        $crate::logging::_dispatch(
            $crate::logging::LogLevel::Debug,
            format_args!($($arg)*)
        );
    }};
}

// ============================================================================
// Tests
// ============================================================================
