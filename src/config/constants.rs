//! Storage keys, fixed identifiers and default hosts
//!
//! Centralizes every hardcoded value the resolver relies on. The user app id
//! override can be supplied via environment variable at runtime or at build
//! time.

// =============================================================================
// Storage Keys
// =============================================================================

/// Manually configured application id (local storage)
pub const KEY_APP_ID: &str = "config.app_id";
/// Explicit WebSocket server override (local storage)
pub const KEY_SERVER_URL: &str = "config.server_url";
/// Prefix of the per-account server override, `config.server_url.<loginid>`
pub const KEY_SERVER_URL_PREFIX: &str = "config.server_url.";
/// Persisted default application id, written when a user override is active
pub const KEY_DEFAULT_APP_ID: &str = "config.default_app_id";
/// Platform flag (session storage)
pub const KEY_PLATFORM: &str = "config.platform";
pub const KEY_ACTIVE_LOGINID: &str = "active_loginid";
pub const KEY_ACTIVE_WALLET_LOGINID: &str = "active_wallet_loginid";
/// JSON object keyed by login id
pub const KEY_ACCOUNTS_LIST: &str = "accountsList";
pub const KEY_DEBUG_SERVICE_WORKER: &str = "debug_service_worker";

/// Query parameter carrying the login id after an OAuth redirect
pub const QUERY_ACCOUNT: &str = "acct1";
pub const QUERY_QA_SERVER: &str = "qa_server";
pub const QUERY_APP_ID: &str = "app_id";

// =============================================================================
// Fixed Application Identifiers
// =============================================================================

pub const BOT_PRODUCTION_APP_ID: u32 = 19111;
pub const BOT_STAGING_APP_ID: u32 = 19112;
pub const STAGING_FALLBACK_APP_ID: u32 = 16303;
pub const LOCAL_APP_ID: u32 = 36300;
pub const DEFAULT_APP_ID: u32 = 16929;

// =============================================================================
// Hosts & URLs
// =============================================================================

/// WebSocket host for real accounts
pub const REAL_SERVER: &str = "green.derivws.com";
/// WebSocket host for virtual accounts and unknown sessions
pub const VIRTUAL_SERVER: &str = "blue.derivws.com";

/// The one production domain served without the `/app` path prefix
pub const CANONICAL_DOMAIN: &str = "binary.com";

pub const WEBSITE_URL: &str = "https://deriv.com";

// =============================================================================
// Live Chat
// =============================================================================

pub const LIVECHAT_LICENSE_ID: u32 = 12049137;
pub const LIVECHAT_CLIENT_ID: &str = "66aa088aad5a414484c1fd1fa8a5ace7";

// =============================================================================
// Overrides
// =============================================================================

/// Environment variable (runtime or build time) holding the user app id override
pub const USER_APP_ID_ENV: &str = "ENDPOINT_USER_APP_ID";

/// Application id of a self-registered app, empty when unset
///
/// Environment variable: `ENDPOINT_USER_APP_ID`, read at runtime first and
/// then at compile time.
pub fn user_app_id() -> String {
    std::env::var(USER_APP_ID_ENV)
        .ok()
        .or_else(|| option_env!("ENDPOINT_USER_APP_ID").map(str::to_string))
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

/// Print the fixed values (for startup logs)
pub fn log_configuration() {
    tracing::info!("=== Endpoint Resolver Constants ===");
    tracing::info!("  - Default app id: {}", DEFAULT_APP_ID);
    tracing::info!("  - Staging fallback app id: {}", STAGING_FALLBACK_APP_ID);
    tracing::info!("  - Local app id: {}", LOCAL_APP_ID);
    tracing::info!("  - Real server: {}", REAL_SERVER);
    tracing::info!("  - Virtual server: {}", VIRTUAL_SERVER);
    tracing::info!("  - User app id override: {:?}", user_app_id());
    tracing::info!("===================================");
}
