//! Configuration module for resolver settings and YAML loading
//!
//! This module provides:
//! - Configuration types (`ResolverConfig`, `FallbackAppIds`, policy enums)
//! - YAML loading functionality (`load_config`)
//! - Fixed storage keys and identifiers (`constants`)
//! - Logging configuration (`init_logging`)

pub mod constants;
mod loader;
pub mod logging;
mod types;

// Re-export types
pub use types::{
    AppIdPolicy, FallbackAppIds, LocalPolicy, ResolverConfig, SocketUrlPolicy, StagingPolicy,
};

// Re-export loader functions
pub use loader::{load_config, load_config_from_str};

// Re-export logging functions
pub use logging::init_logging;
