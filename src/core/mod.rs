//! Core module - location, storage, resolution context and the resolver
//!
//! This module uses **explicit re-exports** instead of glob exports
//! (`pub use module::*`) so the public API only changes on purpose.
//!
//! ## Usage
//! ```ignore
//! use endpoint_resolver::core::{BrowserState, ConfigResolver, Location};
//! ```

pub mod context;
pub mod endpoint;
pub mod location;
pub mod resolver;
pub mod storage;
pub mod types;
pub mod urls;

// Explicit re-exports for context module
pub use context::{BrowserState, Navigator, RecordingNavigator, ResolutionContext};

// Explicit re-exports for endpoint module
pub use endpoint::EndpointOverride;

// Explicit re-exports for location module
pub use location::Location;

// Explicit re-exports for resolver module
pub use resolver::ConfigResolver;

// Explicit re-exports for storage module
pub use storage::{KeyValueStore, MemoryStore, StorageSnapshot};

// Explicit re-exports for types module
pub use types::{AppId, HostFlags, ResolvedConfig, StoredAccount};

// Explicit re-exports for urls module
pub use urls::website_url;
