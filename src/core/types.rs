//! Resolver output types

use serde::Serialize;

/// Application identifier handed to the API connection
///
/// Table lookups and fixed fallbacks yield `Numeric`. Values typed in by a
/// user (stored `config.app_id`, the user override) are passed through as
/// `Stored` without coercion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AppId {
    Numeric(u32),
    Stored(String),
}

impl std::fmt::Display for AppId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppId::Numeric(id) => write!(f, "{}", id),
            AppId::Stored(raw) => f.write_str(raw),
        }
    }
}

impl From<u32> for AppId {
    fn from(id: u32) -> Self {
        AppId::Numeric(id)
    }
}

/// Everything a connection layer needs, computed in one pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedConfig {
    pub app_id: AppId,
    pub server_url: String,
    pub is_production: bool,
}

/// Hostname classifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
pub struct HostFlags {
    pub production: bool,
    pub staging: bool,
    pub test_link: bool,
    pub local: bool,
    pub bot: bool,
}

/// One entry of the stored `accountsList`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredAccount {
    pub loginid: String,
    pub currency: Option<String>,
    pub is_virtual: bool,
}
