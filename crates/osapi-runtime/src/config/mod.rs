//! Runtime configuration for the default backends
//!
//! Provides compile-time defaults with optional environment overrides.
//!
//! # Configuration Priority (highest wins)
//!
//! 1. Builder setters
//! 2. Environment variables, only when `OsConfig::from_env()` is called
//! 3. User's osapi_config.rs (compile-time, via `OSAPI_CONFIG_RS`)
//! 4. Library defaults
//!
//! # Example
//!
//! ```rust,ignore
//! use osapi_runtime::config::OsConfig;
//!
//! let config = OsConfig::from_env()
//!     .log_level(LogLevel::Debug)
//!     .etc_root("/opt/game/etc");
//! osapi_runtime::install_defaults_with(&config)?;
//! ```

pub mod env;

/// Values merged by build.rs from library defaults and `OSAPI_CONFIG_RS`
pub mod defaults {
    include!(concat!(env!("OUT_DIR"), "/osapi_merged_config.rs"));
}

use osapi_core::{ConfigError, LogLevel};

use self::env::{env_get, env_get_bool, env_get_str};

/// Default backend configuration with builder pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OsConfig {
    /// Highest level written by the default log sinks
    pub log_level: LogLevel,
    /// Flush stderr after every log line
    pub flush_log: bool,
    /// Prefix log lines with elapsed time
    pub log_time: bool,
    /// Root directory for `module_to_etc`
    pub etc_root: String,
    /// Directory prepended by `module_to_dl` (empty: loader search path)
    pub lib_dir: String,
}

impl Default for OsConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl OsConfig {
    /// Create config from compile-time defaults with environment overrides.
    ///
    /// Environment variables (all optional):
    /// - `OSAPI_LOG_LEVEL` - off/error/warn/info/debug or 0-4
    /// - `OSAPI_FLUSH_LOG` - Flush after every line (0/1)
    /// - `OSAPI_LOG_TIME` - Elapsed time prefix (0/1)
    /// - `OSAPI_ETC_ROOT` - Module resource root
    /// - `OSAPI_LIB_DIR` - Module library directory
    pub fn from_env() -> Self {
        let base = Self::new();
        Self {
            log_level: env_get("OSAPI_LOG_LEVEL", base.log_level),
            flush_log: env_get_bool("OSAPI_FLUSH_LOG", base.flush_log),
            log_time: env_get_bool("OSAPI_LOG_TIME", base.log_time),
            etc_root: env_get_str("OSAPI_ETC_ROOT", &base.etc_root),
            lib_dir: env_get_str("OSAPI_LIB_DIR", &base.lib_dir),
        }
    }

    /// Create config with compile-time defaults (no env override).
    pub fn new() -> Self {
        Self {
            log_level: LogLevel::from_u8(defaults::LOG_LEVEL),
            flush_log: defaults::FLUSH_LOG,
            log_time: defaults::LOG_TIME,
            etc_root: defaults::ETC_ROOT.to_string(),
            lib_dir: defaults::LIB_DIR.to_string(),
        }
    }

    // Builder methods

    pub fn log_level(mut self, level: LogLevel) -> Self {
        self.log_level = level;
        self
    }

    pub fn flush_log(mut self, enable: bool) -> Self {
        self.flush_log = enable;
        self
    }

    pub fn log_time(mut self, enable: bool) -> Self {
        self.log_time = enable;
        self
    }

    pub fn etc_root(mut self, root: impl Into<String>) -> Self {
        self.etc_root = root.into();
        self
    }

    pub fn lib_dir(mut self, dir: impl Into<String>) -> Self {
        self.lib_dir = dir.into();
        self
    }

    /// Validate configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.etc_root.is_empty() {
            return Err(ConfigError::InvalidValue("etc_root must not be empty"));
        }
        if self.etc_root.contains('\0') {
            return Err(ConfigError::InvalidValue("etc_root must not contain NUL"));
        }
        if self.lib_dir.contains('\0') {
            return Err(ConfigError::InvalidValue("lib_dir must not contain NUL"));
        }
        Ok(())
    }

    /// Print configuration (for debugging)
    pub fn print(&self) {
        eprintln!("osapi configuration:");
        eprintln!("  backend:    {}", crate::BACKEND_NAME);
        eprintln!("  log_level:  {:?}", self.log_level);
        eprintln!("  flush_log:  {}", self.flush_log);
        eprintln!("  log_time:   {}", self.log_time);
        eprintln!("  etc_root:   {}", self.etc_root);
        eprintln!(
            "  lib_dir:    {}",
            if self.lib_dir.is_empty() { "(loader search path)" } else { self.lib_dir.as_str() }
        );
    }
}
