//! Injected environment for a single resolution call
//!
//! `ResolutionContext` bundles everything the resolver would otherwise read
//! from globals: the current location, both storage areas and the navigator
//! used for the one redirect the resolver can trigger.

use std::cell::RefCell;

use super::location::Location;
use super::storage::{KeyValueStore, MemoryStore, StorageSnapshot};

/// Performs full-page navigations
pub trait Navigator {
    fn navigate(&self, href: &str);
}

/// Navigator that records every requested navigation instead of performing it
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    visits: RefCell<Vec<String>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// All navigations requested so far, oldest first
    pub fn visits(&self) -> Vec<String> {
        self.visits.borrow().clone()
    }

    pub fn last_visit(&self) -> Option<String> {
        self.visits.borrow().last().cloned()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, href: &str) {
        tracing::debug!(href = %href, "Navigation requested");
        self.visits.borrow_mut().push(href.to_string());
    }
}

/// Borrowed view of the ambient state for one resolver call
#[derive(Clone, Copy)]
pub struct ResolutionContext<'a> {
    pub location: &'a Location,
    /// Durable storage (`localStorage`)
    pub local: &'a dyn KeyValueStore,
    /// Per-tab storage (`sessionStorage`)
    pub session: &'a dyn KeyValueStore,
    pub navigator: &'a dyn Navigator,
}

impl<'a> ResolutionContext<'a> {
    pub fn new(
        location: &'a Location,
        local: &'a dyn KeyValueStore,
        session: &'a dyn KeyValueStore,
        navigator: &'a dyn Navigator,
    ) -> Self {
        Self {
            location,
            local,
            session,
            navigator,
        }
    }

    pub fn hostname(&self) -> &'a str {
        &self.location.hostname
    }

    /// Session value first, then local
    pub fn session_or_local(&self, key: &str) -> Option<String> {
        self.session
            .get_item(key)
            .filter(|v| !v.is_empty())
            .or_else(|| self.local.get_item(key).filter(|v| !v.is_empty()))
    }
}

impl std::fmt::Debug for ResolutionContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolutionContext")
            .field("location", &self.location.href())
            .finish_non_exhaustive()
    }
}

/// Owned, in-memory browser state
///
/// Backs the CLI and tests: owns a location, both storage areas and a
/// recording navigator, and lends them out as a `ResolutionContext`.
#[derive(Debug)]
pub struct BrowserState {
    pub location: Location,
    pub local: MemoryStore,
    pub session: MemoryStore,
    pub navigator: RecordingNavigator,
}

impl BrowserState {
    pub fn new(location: Location) -> Self {
        Self {
            location,
            local: MemoryStore::new(),
            session: MemoryStore::new(),
            navigator: RecordingNavigator::new(),
        }
    }

    pub fn with_snapshot(location: Location, snapshot: StorageSnapshot) -> Self {
        let (local, session) = snapshot.into_stores();
        Self {
            location,
            local,
            session,
            navigator: RecordingNavigator::new(),
        }
    }

    pub fn context(&self) -> ResolutionContext<'_> {
        ResolutionContext::new(&self.location, &self.local, &self.session, &self.navigator)
    }

    pub fn snapshot(&self) -> StorageSnapshot {
        StorageSnapshot::from_stores(&self.local, &self.session)
    }
}
