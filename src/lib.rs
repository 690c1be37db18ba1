//! Endpoint Resolver
//!
//! Picks the application id and WebSocket host a web client should use,
//! from its current location, its local/session storage and a static
//! domain-to-app-id table:
//! - Hostname classification (production, staging, test link, local)
//! - App id cascade with explicit storage side effects
//! - WebSocket host selection by account type or per-account override
//! - QA endpoint override from test-link URLs

pub mod config;
pub mod core;
pub mod error;

pub use crate::core::{AppId, BrowserState, ConfigResolver, Location, ResolutionContext, ResolvedConfig};
pub use error::AppError;
