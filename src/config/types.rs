//! Configuration types for the resolver
//!
//! `ResolverConfig` holds the static lookup tables, the fixed fallback
//! identifiers and the policy selected for each operation that historically
//! had two diverging implementations. Every field has a default so a YAML
//! file only needs to list what it overrides.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::constants;
use crate::error::{AppError, Result};

// ============================================================================
// Policies
// ============================================================================

/// How staging hosts are recognised
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum StagingPolicy {
    /// Hostname starts with `staging.` (case-insensitive)
    #[default]
    Prefix,
    /// Hostname is one of the domain table keys containing `staging`,
    /// optionally prefixed with `www.`
    DomainTable,
}

/// How local development hosts are recognised
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum LocalPolicy {
    /// Hostname ends with `localhost`, optionally followed by a port
    #[default]
    Permissive,
    /// Hostname is exactly `localhost`
    Strict,
}

/// Precedence chain used to pick the application id
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum AppIdPolicy {
    /// platform → stored id → user override → staging → localhost → production.
    /// Mutates `config.default_app_id` in the override, staging and
    /// production branches.
    #[default]
    Cascade,
    /// stored id → user override → exact domain match → default. Never writes.
    Simple,
}

/// How the WebSocket host is derived
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SocketUrlPolicy {
    /// Global `config.server_url` override, then real/virtual host by login id
    #[default]
    LoginIdColor,
    /// `config.server_url.<loginid>` override, then the platform's host
    PerAccount,
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Fixed identifiers returned when no table entry applies
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FallbackAppIds {
    /// Bot traffic on production hosts
    pub bot_production: u32,
    /// Bot traffic on staging hosts
    pub bot_staging: u32,
    /// Staging host missing from the domain table
    pub staging: u32,
    /// Any `localhost` host
    pub local: u32,
    /// Production host missing from the domain table
    pub default: u32,
}

impl Default for FallbackAppIds {
    fn default() -> Self {
        Self {
            bot_production: constants::BOT_PRODUCTION_APP_ID,
            bot_staging: constants::BOT_STAGING_APP_ID,
            staging: constants::STAGING_FALLBACK_APP_ID,
            local: constants::LOCAL_APP_ID,
            default: constants::DEFAULT_APP_ID,
        }
    }
}

/// Root resolver configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ResolverConfig {
    /// Production/staging hostname → application id
    pub domain_app_ids: BTreeMap<String, u32>,
    /// Session platform flag → application id
    pub platform_app_ids: BTreeMap<String, u32>,
    /// Session platform flag → WebSocket host (per-account socket policy only)
    pub platform_servers: BTreeMap<String, String>,
    pub fallback_app_ids: FallbackAppIds,
    /// Application id of a self-registered app; empty disables the override
    pub user_app_id: String,
    pub real_server: String,
    pub virtual_server: String,
    pub staging_policy: StagingPolicy,
    pub local_policy: LocalPolicy,
    pub app_id_policy: AppIdPolicy,
    pub socket_url_policy: SocketUrlPolicy,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        let domain_app_ids = [
            ("deriv.app", 16929),
            ("app.deriv.com", 16929),
            ("staging-app.deriv.com", 16303),
            ("app.deriv.me", 1411),
            ("staging-app.deriv.me", 1411),
            ("app.deriv.be", 30767),
            ("staging-app.deriv.be", 31186),
            ("binary.com", 1),
            ("test-app.deriv.com", 51072),
            ("tradeprofxapp.pages.dev", 80074),
        ]
        .into_iter()
        .map(|(domain, id)| (domain.to_string(), id))
        .collect();

        let platform_app_ids = [("derivgo".to_string(), 23789)].into_iter().collect();

        Self {
            domain_app_ids,
            platform_app_ids,
            platform_servers: BTreeMap::new(),
            fallback_app_ids: FallbackAppIds::default(),
            user_app_id: String::new(),
            real_server: constants::REAL_SERVER.to_string(),
            virtual_server: constants::VIRTUAL_SERVER.to_string(),
            staging_policy: StagingPolicy::default(),
            local_policy: LocalPolicy::default(),
            app_id_policy: AppIdPolicy::default(),
            socket_url_policy: SocketUrlPolicy::default(),
        }
    }
}

impl ResolverConfig {
    /// Fill `user_app_id` from `ENDPOINT_USER_APP_ID` when the config left it empty
    pub fn with_env_overrides(mut self) -> Self {
        if self.user_app_id.is_empty() {
            self.user_app_id = constants::user_app_id();
        }
        self
    }

    /// Validate configuration rules
    pub fn validate(&self) -> Result<()> {
        // Rule: at least one domain, otherwise production detection is meaningless
        if self.domain_app_ids.is_empty() {
            return Err(AppError::Config(
                "domain_app_ids cannot be empty".to_string(),
            ));
        }

        // Rule: domain keys are bare hostnames
        for (domain, id) in &self.domain_app_ids {
            if domain.is_empty()
                || domain.chars().any(|c| c.is_whitespace() || c == '/' || c == ':')
            {
                return Err(AppError::Config(format!(
                    "domain_app_ids: '{}' is not a bare hostname",
                    domain
                )));
            }
            if *id == 0 {
                return Err(AppError::Config(format!(
                    "domain_app_ids: app id for '{}' must be > 0",
                    domain
                )));
            }
        }

        for (platform, id) in &self.platform_app_ids {
            if platform.trim().is_empty() || *id == 0 {
                return Err(AppError::Config(format!(
                    "platform_app_ids: invalid entry '{}' => {}",
                    platform, id
                )));
            }
        }

        for (platform, host) in &self.platform_servers {
            if host.trim().is_empty() {
                return Err(AppError::Config(format!(
                    "platform_servers: host for '{}' cannot be empty",
                    platform
                )));
            }
        }

        let fallbacks = &self.fallback_app_ids;
        let ids = [
            ("bot_production", fallbacks.bot_production),
            ("bot_staging", fallbacks.bot_staging),
            ("staging", fallbacks.staging),
            ("local", fallbacks.local),
            ("default", fallbacks.default),
        ];
        if let Some((name, _)) = ids.iter().find(|(_, id)| *id == 0) {
            return Err(AppError::Config(format!(
                "fallback_app_ids.{} must be > 0",
                name
            )));
        }

        // Rule: user override is either unset or a plain number
        if !self.user_app_id.is_empty() && !self.user_app_id.chars().all(|c| c.is_ascii_digit()) {
            return Err(AppError::Config(format!(
                "user_app_id must be numeric, got '{}'",
                self.user_app_id
            )));
        }

        if self.real_server.trim().is_empty() || self.virtual_server.trim().is_empty() {
            return Err(AppError::Config(
                "real_server and virtual_server cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
