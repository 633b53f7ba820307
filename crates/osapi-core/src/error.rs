//! Error types for the OS API layer
//!
//! Slots themselves report failure through sentinel returns (`None`).
//! These types only appear at the Rust-native edges: table lookup,
//! configuration and owned-buffer operations.

use core::fmt;

/// Result type for OS API operations
pub type OsResult<T> = Result<T, OsError>;

/// Errors surfaced by the non-slot parts of the layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OsError {
    /// No API table has been installed yet
    NotInstalled,

    /// The table's allocator returned its failure sentinel
    AllocationFailed,

    /// The table's thread_new slot refused to spawn
    SpawnFailed,

    /// Dynamic library could not be located or loaded
    LibraryNotFound(String),

    /// Symbol absent from a loaded library
    SymbolNotFound(String),

    /// Invalid configuration
    Config(ConfigError),
}

impl fmt::Display for OsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OsError::NotInstalled => write!(f, "no OS API table installed"),
            OsError::AllocationFailed => write!(f, "allocation failed"),
            OsError::SpawnFailed => write!(f, "thread spawn failed"),
            OsError::LibraryNotFound(name) => write!(f, "library not found: {}", name),
            OsError::SymbolNotFound(name) => write!(f, "symbol not found: {}", name),
            OsError::Config(e) => write!(f, "config error: {}", e),
        }
    }
}

impl std::error::Error for OsError {}

/// Configuration error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidValue(msg) => write!(f, "invalid value: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for OsError {
    fn from(e: ConfigError) -> Self {
        OsError::Config(e)
    }
}
