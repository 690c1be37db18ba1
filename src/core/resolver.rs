//! Application id and WebSocket host resolution
//!
//! `ConfigResolver` owns the lookup tables and the regexes compiled from
//! them. Every operation is a function of the `ResolutionContext` it is
//! given; nothing is cached between calls, so a storage change is visible to
//! the very next call.
//!
//! Only `app_id` (under `AppIdPolicy::Cascade`) and
//! `check_and_set_endpoint_from_url` write to storage.

use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::constants::{
    KEY_ACCOUNTS_LIST, KEY_ACTIVE_LOGINID, KEY_ACTIVE_WALLET_LOGINID, KEY_APP_ID,
    KEY_DEBUG_SERVICE_WORKER, KEY_DEFAULT_APP_ID, KEY_PLATFORM, KEY_SERVER_URL,
    KEY_SERVER_URL_PREFIX, QUERY_ACCOUNT,
};
use crate::config::{AppIdPolicy, LocalPolicy, ResolverConfig, SocketUrlPolicy, StagingPolicy};
use crate::error::{AppError, Result};

use super::context::ResolutionContext;
use super::types::{AppId, HostFlags, ResolvedConfig, StoredAccount};

// ============================================================================
// Fixed Patterns
// ============================================================================

static STAGING_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^staging\.").expect("staging prefix regex"));
static TEST_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(.*)\.binary\.sx$").expect("test link regex"));
static LOCAL_PERMISSIVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)localhost(:\d+)?$").expect("local regex"));
static LOCAL_STRICT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^localhost$").expect("strict local regex"));
static LOCALHOST_ANYWHERE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)localhost").expect("localhost regex"));
static BOT_HOST: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)bot").expect("bot regex"));
static VIRTUAL_ACCOUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(VRT|VRW)").expect("virtual account regex"));

/// Anchored, case-insensitive alternation of `domains`, each optionally
/// prefixed with `www.`. `None` when there is nothing to match.
fn domain_alternation<'a, I>(domains: I) -> Result<Option<Regex>>
where
    I: IntoIterator<Item = &'a str>,
{
    let alternatives: Vec<String> = domains
        .into_iter()
        .map(|domain| format!(r"(www\.)?{}", regex::escape(domain)))
        .collect();

    if alternatives.is_empty() {
        return Ok(None);
    }

    RegexBuilder::new(&format!("^({})$", alternatives.join("|")))
        .case_insensitive(true)
        .build()
        .map(Some)
        .map_err(|e| AppError::Config(format!("Cannot build domain pattern: {}", e)))
}

/// `parseInt`-style truthiness: the leading integer of `raw` is non-zero
fn leading_int_is_nonzero(raw: &str) -> bool {
    let trimmed = raw.trim_start();
    let unsigned = trimmed
        .strip_prefix('-')
        .or_else(|| trimmed.strip_prefix('+'))
        .unwrap_or(trimmed);
    unsigned
        .chars()
        .take_while(char::is_ascii_digit)
        .any(|c| c != '0')
}

// ============================================================================
// Resolver
// ============================================================================

/// Resolves application id, WebSocket host and hostname classifications
#[derive(Debug, Clone)]
pub struct ConfigResolver {
    config: ResolverConfig,
    production_hosts: Regex,
    staging_hosts: Option<Regex>,
}

impl ConfigResolver {
    /// Build a resolver, compiling the domain patterns once
    pub fn new(config: ResolverConfig) -> Result<Self> {
        config.validate()?;

        let production_hosts = domain_alternation(config.domain_app_ids.keys().map(String::as_str))?
            .ok_or_else(|| AppError::Config("domain_app_ids cannot be empty".to_string()))?;
        let staging_hosts = domain_alternation(
            config
                .domain_app_ids
                .keys()
                .map(String::as_str)
                .filter(|domain| domain.contains("staging")),
        )?;

        Ok(Self {
            config,
            production_hosts,
            staging_hosts,
        })
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    // ------------------------------------------------------------------------
    // Hostname classification
    // ------------------------------------------------------------------------

    /// Domain table key equal to the hostname, unless it is a `staging.` host
    pub fn current_production_domain<'r>(&'r self, ctx: &ResolutionContext<'_>) -> Option<&'r str> {
        let hostname = ctx.hostname();
        if hostname.starts_with("staging.") {
            return None;
        }
        self.config
            .domain_app_ids
            .get_key_value(hostname)
            .map(|(domain, _)| domain.as_str())
    }

    /// Hostname is a domain table entry, with or without `www.`
    pub fn is_production(&self, ctx: &ResolutionContext<'_>) -> bool {
        self.production_hosts.is_match(ctx.hostname())
    }

    pub fn is_staging(&self, ctx: &ResolutionContext<'_>) -> bool {
        match self.config.staging_policy {
            StagingPolicy::Prefix => STAGING_PREFIX.is_match(ctx.hostname()),
            StagingPolicy::DomainTable => self
                .staging_hosts
                .as_ref()
                .is_some_and(|re| re.is_match(ctx.hostname())),
        }
    }

    /// `*.binary.sx` preview deployments
    pub fn is_test_link(&self, ctx: &ResolutionContext<'_>) -> bool {
        TEST_LINK.is_match(ctx.hostname())
    }

    pub fn is_local(&self, ctx: &ResolutionContext<'_>) -> bool {
        match self.config.local_policy {
            LocalPolicy::Permissive => LOCAL_PERMISSIVE.is_match(ctx.hostname()),
            LocalPolicy::Strict => LOCAL_STRICT.is_match(ctx.hostname()),
        }
    }

    pub fn is_bot(&self, ctx: &ResolutionContext<'_>) -> bool {
        BOT_HOST.is_match(ctx.hostname())
    }

    pub fn host_flags(&self, ctx: &ResolutionContext<'_>) -> HostFlags {
        HostFlags {
            production: self.is_production(ctx),
            staging: self.is_staging(ctx),
            test_link: self.is_test_link(ctx),
            local: self.is_local(ctx),
            bot: self.is_bot(ctx),
        }
    }

    // ------------------------------------------------------------------------
    // Application id
    // ------------------------------------------------------------------------

    /// Application id for the current context
    ///
    /// Under `AppIdPolicy::Cascade` this is not a pure read: an active user
    /// override is persisted to `config.default_app_id`, and the staging and
    /// production branches remove that key. See [`AppIdPolicy`].
    pub fn app_id(&self, ctx: &ResolutionContext<'_>) -> AppId {
        match self.config.app_id_policy {
            AppIdPolicy::Cascade => self.cascade_app_id(ctx),
            AppIdPolicy::Simple => self.simple_app_id(ctx),
        }
    }

    fn platform_app_id(&self, ctx: &ResolutionContext<'_>) -> Option<u32> {
        let platform = ctx.session.get_item(KEY_PLATFORM)?;
        self.config.platform_app_ids.get(&platform).copied()
    }

    fn stored_app_id(&self, ctx: &ResolutionContext<'_>) -> Option<String> {
        ctx.local.get_item(KEY_APP_ID).filter(|id| !id.is_empty())
    }

    fn domain_app_id(&self, ctx: &ResolutionContext<'_>) -> Option<u32> {
        self.current_production_domain(ctx)
            .and_then(|domain| self.config.domain_app_ids.get(domain))
            .copied()
    }

    fn cascade_app_id(&self, ctx: &ResolutionContext<'_>) -> AppId {
        let fallbacks = &self.config.fallback_app_ids;

        if let Some(id) = self.platform_app_id(ctx) {
            debug!(app_id = id, "App id from session platform");
            return AppId::Numeric(id);
        }

        if let Some(stored) = self.stored_app_id(ctx) {
            debug!(app_id = %stored, "App id from stored config");
            return AppId::Stored(stored);
        }

        let user_app_id = &self.config.user_app_id;
        if !user_app_id.is_empty() {
            ctx.local.set_item(KEY_DEFAULT_APP_ID, user_app_id);
            debug!(app_id = %user_app_id, "App id from user override, persisted as default");
            return AppId::Stored(user_app_id.clone());
        }

        let is_bot = self.is_bot(ctx);

        if self.is_staging(ctx) {
            ctx.local.remove_item(KEY_DEFAULT_APP_ID);
            let id = if is_bot {
                fallbacks.bot_staging
            } else {
                self.domain_app_id(ctx).unwrap_or(fallbacks.staging)
            };
            debug!(app_id = id, is_bot, "App id for staging host");
            return AppId::Numeric(id);
        }

        if LOCALHOST_ANYWHERE.is_match(ctx.hostname()) {
            debug!(app_id = fallbacks.local, "App id for localhost");
            return AppId::Numeric(fallbacks.local);
        }

        ctx.local.remove_item(KEY_DEFAULT_APP_ID);
        let id = if is_bot {
            fallbacks.bot_production
        } else {
            self.domain_app_id(ctx).unwrap_or(fallbacks.default)
        };
        debug!(app_id = id, is_bot, "App id for production host");
        AppId::Numeric(id)
    }

    fn simple_app_id(&self, ctx: &ResolutionContext<'_>) -> AppId {
        if let Some(stored) = self.stored_app_id(ctx) {
            return AppId::Stored(stored);
        }
        if !self.config.user_app_id.is_empty() {
            return AppId::Stored(self.config.user_app_id.clone());
        }
        let id = self
            .config
            .domain_app_ids
            .get(ctx.hostname())
            .copied()
            .unwrap_or(self.config.fallback_app_ids.default);
        AppId::Numeric(id)
    }

    // ------------------------------------------------------------------------
    // WebSocket host
    // ------------------------------------------------------------------------

    /// Active login id: session, then local storage, then the `acct1` query parameter
    pub fn active_loginid(&self, ctx: &ResolutionContext<'_>, is_wallets: bool) -> Option<String> {
        let key = if is_wallets {
            KEY_ACTIVE_WALLET_LOGINID
        } else {
            KEY_ACTIVE_LOGINID
        };
        ctx.session_or_local(key).or_else(|| {
            ctx.location
                .query_param(QUERY_ACCOUNT)
                .filter(|id| !id.is_empty())
        })
    }

    /// WebSocket host for the current context
    pub fn socket_url(&self, ctx: &ResolutionContext<'_>, is_wallets: bool) -> String {
        match self.config.socket_url_policy {
            SocketUrlPolicy::LoginIdColor => self.login_id_color_socket_url(ctx, is_wallets),
            SocketUrlPolicy::PerAccount => self.per_account_socket_url(ctx, is_wallets),
        }
    }

    fn login_id_color_socket_url(&self, ctx: &ResolutionContext<'_>, is_wallets: bool) -> String {
        if let Some(server_url) = ctx.local.get_item(KEY_SERVER_URL).filter(|s| !s.is_empty()) {
            debug!(server_url = %server_url, "Socket URL from stored override");
            return server_url;
        }

        let loginid = self.active_loginid(ctx, is_wallets);
        let is_real = loginid
            .as_deref()
            .is_some_and(|id| !VIRTUAL_ACCOUNT.is_match(id));

        if is_real {
            self.config.real_server.clone()
        } else {
            self.config.virtual_server.clone()
        }
    }

    fn per_account_socket_url(&self, ctx: &ResolutionContext<'_>, is_wallets: bool) -> String {
        let loginid = self.active_loginid(ctx, is_wallets).or_else(|| {
            self.accounts_list(ctx)
                .into_iter()
                .next()
                .map(|account| account.loginid)
        });

        if let Some(loginid) = &loginid {
            let key = format!("{}{}", KEY_SERVER_URL_PREFIX, loginid);
            if let Some(server_url) = ctx.local.get_item(&key).filter(|s| !s.is_empty()) {
                debug!(loginid = %loginid, server_url = %server_url, "Socket URL from per-account override");
                return server_url;
            }
        }

        ctx.session
            .get_item(KEY_PLATFORM)
            .and_then(|platform| self.config.platform_servers.get(&platform).cloned())
            .unwrap_or_else(|| self.config.virtual_server.clone())
    }

    // ------------------------------------------------------------------------
    // Stored flags
    // ------------------------------------------------------------------------

    /// Accounts from the stored `accountsList` JSON object, in login id order
    ///
    /// Missing, malformed or non-object JSON yields an empty list.
    pub fn accounts_list(&self, ctx: &ResolutionContext<'_>) -> Vec<StoredAccount> {
        let Some(raw) = ctx.local.get_item(KEY_ACCOUNTS_LIST) else {
            return Vec::new();
        };

        let accounts = match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(accounts)) => accounts,
            Ok(other) => {
                warn!(kind = ?other, "Stored accountsList is not an object, ignoring");
                return Vec::new();
            }
            Err(e) => {
                warn!(error = %e, "Stored accountsList is malformed, ignoring");
                return Vec::new();
            }
        };

        let mut accounts: Vec<StoredAccount> = accounts
            .into_iter()
            .map(|(loginid, details)| {
                let currency = details
                    .get("currency")
                    .and_then(Value::as_str)
                    .filter(|c| !c.is_empty())
                    .map(str::to_string);
                let is_virtual = match details.get("is_virtual") {
                    Some(Value::Bool(flag)) => *flag,
                    Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
                    _ => VIRTUAL_ACCOUNT.is_match(&loginid),
                };
                StoredAccount {
                    loginid,
                    currency,
                    is_virtual,
                }
            })
            .collect();
        accounts.sort_by(|a, b| a.loginid.cmp(&b.loginid));
        accounts
    }

    /// `debug_service_worker` holds a non-zero integer
    pub fn debug_service_worker(&self, ctx: &ResolutionContext<'_>) -> bool {
        ctx.local
            .get_item(KEY_DEBUG_SERVICE_WORKER)
            .is_some_and(|flag| leading_int_is_nonzero(&flag))
    }

    /// App id, socket host and production flag in one pass
    pub fn resolve(&self, ctx: &ResolutionContext<'_>, is_wallets: bool) -> ResolvedConfig {
        ResolvedConfig {
            app_id: self.app_id(ctx),
            server_url: self.socket_url(ctx, is_wallets),
            is_production: self.is_production(ctx),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::constants::{LOCAL_APP_ID, STAGING_FALLBACK_APP_ID};
    use crate::core::context::BrowserState;
    use crate::core::location::Location;
    use crate::core::storage::{KeyValueStore, StorageSnapshot};
    use std::collections::BTreeSet;

    fn resolver() -> ConfigResolver {
        ConfigResolver::new(ResolverConfig::default()).unwrap()
    }

    fn resolver_with(config: ResolverConfig) -> ConfigResolver {
        ConfigResolver::new(config).unwrap()
    }

    fn browser(href: &str) -> BrowserState {
        BrowserState::new(Location::parse(href).unwrap())
    }

    // --- classification ---

    #[test]
    fn test_current_production_domain_exact_match() {
        let r = resolver();
        assert_eq!(
            r.current_production_domain(&browser("https://app.deriv.com/").context()),
            Some("app.deriv.com")
        );
        assert_eq!(
            r.current_production_domain(&browser("https://www.app.deriv.com/").context()),
            None
        );
        assert_eq!(
            r.current_production_domain(&browser("https://staging.app.deriv.com/").context()),
            None
        );
    }

    #[test]
    fn test_is_production_escapes_every_dot() {
        let r = resolver();
        assert!(r.is_production(&browser("https://app.deriv.com/").context()));
        assert!(r.is_production(&browser("https://www.app.deriv.com/").context()));
        assert!(!r.is_production(&browser("https://evil-app.deriv.com/").context()));
        assert!(!r.is_production(&browser("https://appxderivxcom.io/").context()));
        assert!(!r.is_production(&browser("https://app.deriv.com.evil.io/").context()));
    }

    #[test]
    fn test_is_staging_prefix_policy() {
        let r = resolver();
        assert!(r.is_staging(&browser("https://staging.app.deriv.com/").context()));
        assert!(!r.is_staging(&browser("https://staging-app.deriv.com/").context()));
    }

    #[test]
    fn test_is_staging_domain_table_policy() {
        let r = resolver_with(ResolverConfig {
            staging_policy: StagingPolicy::DomainTable,
            ..Default::default()
        });
        assert!(r.is_staging(&browser("https://staging-app.deriv.com/").context()));
        assert!(r.is_staging(&browser("https://www.staging-app.deriv.be/").context()));
        assert!(!r.is_staging(&browser("https://staging.app.deriv.com/").context()));
        assert!(!r.is_staging(&browser("https://app.deriv.com/").context()));
    }

    #[test]
    fn test_domain_table_policy_without_staging_domains() {
        let mut config = ResolverConfig {
            staging_policy: StagingPolicy::DomainTable,
            ..Default::default()
        };
        config.domain_app_ids.retain(|domain, _| !domain.contains("staging"));
        let r = resolver_with(config);
        assert!(!r.is_staging(&browser("https://staging-app.deriv.com/").context()));
    }

    #[test]
    fn test_is_test_link() {
        let r = resolver();
        assert!(r.is_test_link(&browser("https://foo.binary.sx/").context()));
        assert!(r.is_test_link(&browser("https://a.b.BINARY.sx/").context()));
        assert!(!r.is_test_link(&browser("https://foo.binary.com/").context()));
        assert!(!r.is_test_link(&browser("https://binary.sx/").context()));
    }

    #[test]
    fn test_is_local_policies() {
        let permissive = resolver();
        let strict = resolver_with(ResolverConfig {
            local_policy: LocalPolicy::Strict,
            ..Default::default()
        });
        let local = browser("http://localhost:8443/");
        let dev = browser("http://dev.localhost/");

        assert!(permissive.is_local(&local.context()));
        assert!(permissive.is_local(&dev.context()));
        assert!(strict.is_local(&local.context()));
        assert!(!strict.is_local(&dev.context()));
    }

    #[test]
    fn test_host_flags() {
        let flags = resolver().host_flags(&browser("https://bot.binary.sx/").context());
        assert!(flags.test_link);
        assert!(flags.bot);
        assert!(!flags.production);
        assert!(!flags.staging);
        assert!(!flags.local);
    }

    // --- app id: cascade ---

    #[test]
    fn test_app_id_platform_beats_stored_id() {
        let b = browser("https://app.deriv.com/");
        b.session.set_item(KEY_PLATFORM, "derivgo");
        b.local.set_item(KEY_APP_ID, "999");
        assert_eq!(resolver().app_id(&b.context()), AppId::Numeric(23789));
    }

    #[test]
    fn test_app_id_unknown_platform_is_ignored() {
        let b = browser("https://app.deriv.com/");
        b.session.set_item(KEY_PLATFORM, "unknown");
        assert_eq!(resolver().app_id(&b.context()), AppId::Numeric(16929));
    }

    #[test]
    fn test_app_id_platform_only_read_from_session() {
        let b = browser("https://app.deriv.com/");
        b.local.set_item(KEY_PLATFORM, "derivgo");
        assert_eq!(resolver().app_id(&b.context()), AppId::Numeric(16929));
    }

    #[test]
    fn test_app_id_stored_value_not_coerced() {
        for href in ["https://app.deriv.com/", "http://localhost/", "https://staging.x.io/"] {
            let b = browser(href);
            b.local.set_item(KEY_APP_ID, "999");
            assert_eq!(resolver().app_id(&b.context()), AppId::Stored("999".into()), "{}", href);
            assert_eq!(b.local.get_item(KEY_DEFAULT_APP_ID), None);
        }
    }

    #[test]
    fn test_app_id_user_override_is_persisted() {
        let r = resolver_with(ResolverConfig {
            user_app_id: "1089".to_string(),
            ..Default::default()
        });
        let b = browser("https://app.deriv.com/");
        assert_eq!(r.app_id(&b.context()), AppId::Stored("1089".into()));
        assert_eq!(b.local.get_item(KEY_DEFAULT_APP_ID).as_deref(), Some("1089"));
    }

    #[test]
    fn test_app_id_staging_clears_default_and_falls_back() {
        let b = browser("https://staging.app.deriv.com/");
        b.local.set_item(KEY_DEFAULT_APP_ID, "1089");
        assert_eq!(resolver().app_id(&b.context()), AppId::Numeric(STAGING_FALLBACK_APP_ID));
        assert_eq!(b.local.get_item(KEY_DEFAULT_APP_ID), None);
    }

    #[test]
    fn test_app_id_staging_bot() {
        let b = browser("https://staging.bot.deriv.com/");
        assert_eq!(resolver().app_id(&b.context()), AppId::Numeric(19112));
    }

    #[test]
    fn test_app_id_staging_domain_from_table() {
        let r = resolver_with(ResolverConfig {
            staging_policy: StagingPolicy::DomainTable,
            ..Default::default()
        });
        let b = browser("https://staging-app.deriv.be/");
        assert_eq!(r.app_id(&b.context()), AppId::Numeric(31186));
    }

    #[test]
    fn test_app_id_localhost_leaves_storage_alone() {
        let b = browser("http://localhost:8443/");
        b.local.set_item(KEY_DEFAULT_APP_ID, "1089");
        assert_eq!(resolver().app_id(&b.context()), AppId::Numeric(LOCAL_APP_ID));
        assert_eq!(b.local.get_item(KEY_DEFAULT_APP_ID).as_deref(), Some("1089"));
    }

    #[test]
    fn test_app_id_production_table_and_fallbacks() {
        let r = resolver();
        assert_eq!(r.app_id(&browser("https://app.deriv.me/").context()), AppId::Numeric(1411));
        assert_eq!(r.app_id(&browser("https://binary.com/").context()), AppId::Numeric(1));
        assert_eq!(r.app_id(&browser("https://unknown.io/").context()), AppId::Numeric(16929));
        assert_eq!(r.app_id(&browser("https://robots.io/").context()), AppId::Numeric(19111));
    }

    #[test]
    fn test_app_id_production_clears_default() {
        let b = browser("https://app.deriv.com/");
        b.local.set_item(KEY_DEFAULT_APP_ID, "1089");
        resolver().app_id(&b.context());
        assert_eq!(b.local.get_item(KEY_DEFAULT_APP_ID), None);
    }

    #[test]
    fn test_pages_dev_deployment_is_production() {
        let r = resolver();
        let b = browser("https://tradeprofxapp.pages.dev/");
        let ctx = b.context();
        assert_eq!(r.app_id(&ctx), AppId::Numeric(80074));
        assert!(r.is_production(&ctx));
        assert_eq!(r.current_production_domain(&ctx), Some("tradeprofxapp.pages.dev"));
        assert_eq!(
            r.url_for(&ctx, "/trade", None),
            "https://tradeprofxapp.pages.dev/app/trade"
        );
    }

    // --- app id: cascade storage side effects ---

    /// Browser with every resolver key populated except `config.app_id`
    /// and the session platform flag, which select cascade branches.
    fn seeded_browser(href: &str) -> BrowserState {
        let b = browser(href);
        b.local.set_item(KEY_DEFAULT_APP_ID, "1089");
        b.local.set_item(KEY_SERVER_URL, "qa10.deriv.dev");
        b.local.set_item("config.server_url.CR1", "qa11.deriv.dev");
        b.local.set_item(KEY_ACTIVE_LOGINID, "CR1");
        b.local.set_item(KEY_ACTIVE_WALLET_LOGINID, "CRW1");
        b.local.set_item(KEY_ACCOUNTS_LIST, r#"{"CR1": {"currency": "USD"}}"#);
        b.local.set_item(KEY_DEBUG_SERVICE_WORKER, "1");
        b.local.set_item(KEY_PLATFORM, "derivgo");
        b.session.set_item(KEY_ACTIVE_LOGINID, "CR1");
        b
    }

    /// Keys whose value differs between two snapshots, as `area:key`
    fn changed_keys(before: &StorageSnapshot, after: &StorageSnapshot) -> Vec<String> {
        let mut changed = Vec::new();
        for (area, old, new) in [
            ("local", &before.local, &after.local),
            ("session", &before.session, &after.session),
        ] {
            let keys: BTreeSet<&String> = old.keys().chain(new.keys()).collect();
            for key in keys {
                if old.get(key) != new.get(key) {
                    changed.push(format!("{}:{}", area, key));
                }
            }
        }
        changed
    }

    fn app_id_diff(r: &ConfigResolver, b: &BrowserState) -> (AppId, Vec<String>) {
        let before = b.snapshot();
        let app_id = r.app_id(&b.context());
        (app_id, changed_keys(&before, &b.snapshot()))
    }

    #[test]
    fn test_cascade_platform_branch_writes_nothing() {
        let b = seeded_browser("https://app.deriv.com/");
        b.session.set_item(KEY_PLATFORM, "derivgo");
        let (app_id, changed) = app_id_diff(&resolver(), &b);
        assert_eq!(app_id, AppId::Numeric(23789));
        assert!(changed.is_empty(), "Got: {:?}", changed);
    }

    #[test]
    fn test_cascade_stored_branch_writes_nothing() {
        let b = seeded_browser("https://app.deriv.com/");
        b.local.set_item(KEY_APP_ID, "999");
        let (app_id, changed) = app_id_diff(&resolver(), &b);
        assert_eq!(app_id, AppId::Stored("999".into()));
        assert!(changed.is_empty(), "Got: {:?}", changed);
    }

    #[test]
    fn test_cascade_user_override_writes_only_default_key() {
        let r = resolver_with(ResolverConfig {
            user_app_id: "2048".to_string(),
            ..Default::default()
        });
        let b = seeded_browser("https://app.deriv.com/");
        let (app_id, changed) = app_id_diff(&r, &b);
        assert_eq!(app_id, AppId::Stored("2048".into()));
        assert_eq!(changed, vec!["local:config.default_app_id".to_string()]);
        assert_eq!(b.local.get_item(KEY_DEFAULT_APP_ID).as_deref(), Some("2048"));
    }

    #[test]
    fn test_cascade_staging_removes_only_default_key() {
        let b = seeded_browser("https://staging.app.deriv.com/");
        let (app_id, changed) = app_id_diff(&resolver(), &b);
        assert_eq!(app_id, AppId::Numeric(STAGING_FALLBACK_APP_ID));
        assert_eq!(changed, vec!["local:config.default_app_id".to_string()]);
    }

    #[test]
    fn test_cascade_localhost_writes_nothing() {
        let b = seeded_browser("http://localhost:8443/");
        let (app_id, changed) = app_id_diff(&resolver(), &b);
        assert_eq!(app_id, AppId::Numeric(LOCAL_APP_ID));
        assert!(changed.is_empty(), "Got: {:?}", changed);
    }

    #[test]
    fn test_cascade_production_removes_only_default_key() {
        let b = seeded_browser("https://app.deriv.com/");
        let (app_id, changed) = app_id_diff(&resolver(), &b);
        assert_eq!(app_id, AppId::Numeric(16929));
        assert_eq!(changed, vec!["local:config.default_app_id".to_string()]);
    }

    // --- app id: simple ---

    #[test]
    fn test_simple_app_id_never_writes() {
        let r = resolver_with(ResolverConfig {
            app_id_policy: AppIdPolicy::Simple,
            user_app_id: "1089".to_string(),
            ..Default::default()
        });
        let b = browser("https://app.deriv.com/");
        b.local.set_item(KEY_DEFAULT_APP_ID, "5");
        assert_eq!(r.app_id(&b.context()), AppId::Stored("1089".into()));
        assert_eq!(b.local.get_item(KEY_DEFAULT_APP_ID).as_deref(), Some("5"));
    }

    #[test]
    fn test_simple_app_id_table_then_default() {
        let r = resolver_with(ResolverConfig {
            app_id_policy: AppIdPolicy::Simple,
            ..Default::default()
        });
        let b = browser("https://staging-app.deriv.com/");
        b.session.set_item(KEY_PLATFORM, "derivgo");
        assert_eq!(r.app_id(&b.context()), AppId::Numeric(16303));
        assert_eq!(r.app_id(&browser("http://localhost/").context()), AppId::Numeric(16929));
    }

    // --- socket url ---

    #[test]
    fn test_socket_url_by_account_type() {
        let r = resolver();
        let b = browser("https://app.deriv.com/");
        assert_eq!(r.socket_url(&b.context(), false), "blue.derivws.com");

        b.local.set_item(KEY_ACTIVE_LOGINID, "VRTC12345");
        assert_eq!(r.socket_url(&b.context(), false), "blue.derivws.com");

        b.local.set_item(KEY_ACTIVE_LOGINID, "CR12345");
        assert_eq!(r.socket_url(&b.context(), false), "green.derivws.com");

        b.session.set_item(KEY_ACTIVE_LOGINID, "VRW1");
        assert_eq!(r.socket_url(&b.context(), false), "blue.derivws.com");
    }

    #[test]
    fn test_socket_url_stored_override_wins() {
        let b = browser("https://app.deriv.com/?acct1=CR1");
        b.local.set_item(KEY_SERVER_URL, "qa10.deriv.dev");
        assert_eq!(resolver().socket_url(&b.context(), false), "qa10.deriv.dev");
    }

    #[test]
    fn test_socket_url_wallet_keys() {
        let r = resolver();
        let b = browser("https://app.deriv.com/");
        b.local.set_item(KEY_ACTIVE_LOGINID, "CR1");
        b.local.set_item(KEY_ACTIVE_WALLET_LOGINID, "VRW1001");
        assert_eq!(r.socket_url(&b.context(), false), "green.derivws.com");
        assert_eq!(r.socket_url(&b.context(), true), "blue.derivws.com");
    }

    #[test]
    fn test_socket_url_from_query_param() {
        let r = resolver();
        assert_eq!(
            r.socket_url(&browser("https://app.deriv.com/?acct1=CR900").context(), false),
            "green.derivws.com"
        );
        assert_eq!(
            r.socket_url(&browser("https://app.deriv.com/?acct1=").context(), false),
            "blue.derivws.com"
        );
    }

    #[test]
    fn test_per_account_socket_url() {
        let mut config = ResolverConfig {
            socket_url_policy: SocketUrlPolicy::PerAccount,
            ..Default::default()
        };
        config
            .platform_servers
            .insert("derivgo".to_string(), "go.derivws.com".to_string());
        let r = resolver_with(config);

        let b = browser("https://app.deriv.com/");
        assert_eq!(r.socket_url(&b.context(), false), "blue.derivws.com");

        b.session.set_item(KEY_PLATFORM, "derivgo");
        assert_eq!(r.socket_url(&b.context(), false), "go.derivws.com");

        b.local.set_item(KEY_ACTIVE_LOGINID, "CR1");
        b.local.set_item("config.server_url.CR1", "qa22.deriv.dev");
        b.local.set_item(KEY_SERVER_URL, "ignored.derivws.com");
        assert_eq!(r.socket_url(&b.context(), false), "qa22.deriv.dev");
    }

    #[test]
    fn test_per_account_socket_url_uses_accounts_list() {
        let r = resolver_with(ResolverConfig {
            socket_url_policy: SocketUrlPolicy::PerAccount,
            ..Default::default()
        });
        let b = browser("https://app.deriv.com/");
        b.local.set_item(KEY_ACCOUNTS_LIST, r#"{"CR7": {"currency": "USD"}}"#);
        b.local.set_item("config.server_url.CR7", "qa7.deriv.dev");
        assert_eq!(r.socket_url(&b.context(), false), "qa7.deriv.dev");
    }

    // --- stored flags ---

    #[test]
    fn test_accounts_list_parsing() {
        let b = browser("https://app.deriv.com/");
        b.local.set_item(
            KEY_ACCOUNTS_LIST,
            r#"{"VRTC1": {"currency": "USD"}, "CR2": {"currency": "", "is_virtual": 0}, "MF3": {"is_virtual": true}}"#,
        );
        let accounts = resolver().accounts_list(&b.context());
        assert_eq!(accounts.len(), 3);
        assert_eq!(accounts[0].loginid, "CR2");
        assert_eq!(accounts[0].currency, None);
        assert!(!accounts[0].is_virtual);
        assert!(accounts[1].is_virtual);
        assert_eq!(accounts[2].loginid, "VRTC1");
        assert_eq!(accounts[2].currency.as_deref(), Some("USD"));
        assert!(accounts[2].is_virtual);
    }

    #[test]
    fn test_accounts_list_malformed_is_empty() {
        let r = resolver();
        let b = browser("https://app.deriv.com/");
        assert!(r.accounts_list(&b.context()).is_empty());

        b.local.set_item(KEY_ACCOUNTS_LIST, "{not json");
        assert!(r.accounts_list(&b.context()).is_empty());

        b.local.set_item(KEY_ACCOUNTS_LIST, "[1, 2]");
        assert!(r.accounts_list(&b.context()).is_empty());
    }

    #[test]
    fn test_debug_service_worker_flag() {
        let r = resolver();
        let b = browser("https://app.deriv.com/");
        assert!(!r.debug_service_worker(&b.context()));

        for (raw, expected) in [("1", true), ("0", false), ("12abc", true), ("abc", false), (" -3", true), ("00", false)] {
            b.local.set_item(KEY_DEBUG_SERVICE_WORKER, raw);
            assert_eq!(r.debug_service_worker(&b.context()), expected, "{:?}", raw);
        }
    }

    #[test]
    fn test_resolve_bundles_outputs() {
        let b = browser("https://app.deriv.com/?acct1=CR1");
        let resolved = resolver().resolve(&b.context(), false);
        assert_eq!(resolved.app_id, AppId::Numeric(16929));
        assert_eq!(resolved.server_url, "green.derivws.com");
        assert!(resolved.is_production);
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = ResolverConfig {
            user_app_id: "not-a-number".to_string(),
            ..Default::default()
        };
        assert!(ConfigResolver::new(config).is_err());
    }
}
