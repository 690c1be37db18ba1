//! Endpoint Resolver CLI
//!
//! Resolves the app id and WebSocket host for a page URL against a storage
//! snapshot, the same way the web client would at startup:
//! 1. Loads resolver configuration (built-in defaults or YAML)
//! 2. Loads local/session storage from a snapshot file
//! 3. Optionally applies a QA endpoint override carried in the URL
//! 4. Prints the resolved configuration as JSON

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use tracing::info;

use endpoint_resolver::config::{self, constants, ResolverConfig};
use endpoint_resolver::core::{
    BrowserState, ConfigResolver, HostFlags, Location, ResolvedConfig, StorageSnapshot,
};

#[derive(Parser, Debug)]
#[command(name = "endpoint-resolver", version, about = "Resolve app id and WebSocket host for a page URL")]
struct Cli {
    /// Page URL, e.g. https://app.deriv.com/?acct1=CR90000
    #[arg(long)]
    url: String,

    /// Storage snapshot (YAML or JSON) with `local` and `session` maps
    #[arg(long)]
    storage: Option<PathBuf>,

    /// Resolver configuration YAML; built-in tables when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Resolve the wallet login id instead of the trading one
    #[arg(long)]
    wallets: bool,

    /// Apply `qa_server`/`app_id` from a test-link URL before resolving
    #[arg(long)]
    apply_url_endpoint: bool,

    /// Write storage changes back to the snapshot file
    #[arg(long, requires = "storage")]
    save: bool,
}

#[derive(Serialize)]
struct Report {
    location: String,
    redirect: Option<String>,
    production_domain: Option<String>,
    flags: HostFlags,
    debug_service_worker: bool,
    #[serde(flatten)]
    resolved: ResolvedConfig,
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    config::init_logging();

    let cli = Cli::parse();

    let resolver_config = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => ResolverConfig::default(),
    }
    .with_env_overrides();
    let resolver = ConfigResolver::new(resolver_config)?;
    constants::log_configuration();

    let snapshot = match &cli.storage {
        Some(path) => StorageSnapshot::load(path)?,
        None => StorageSnapshot::default(),
    };
    let location = Location::parse(&cli.url)?;
    let mut browser = BrowserState::with_snapshot(location, snapshot);

    let mut redirect = None;
    if cli.apply_url_endpoint && resolver.check_and_set_endpoint_from_url(&browser.context()) {
        let href = browser
            .navigator
            .last_visit()
            .context("endpoint override applied without a redirect")?;
        info!(href = %href, "Following redirect");
        browser.location = Location::parse(&href)?;
        redirect = Some(href);
    }

    let ctx = browser.context();
    let report = Report {
        location: browser.location.href(),
        redirect,
        production_domain: resolver.current_production_domain(&ctx).map(str::to_string),
        flags: resolver.host_flags(&ctx),
        debug_service_worker: resolver.debug_service_worker(&ctx),
        resolved: resolver.resolve(&ctx, cli.wallets),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);

    if cli.save {
        if let Some(path) = &cli.storage {
            browser.snapshot().save(path)?;
            info!(path = %path.display(), "Storage snapshot saved");
        }
    }

    Ok(())
}
