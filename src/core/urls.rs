//! Absolute URL construction for the current origin

use crate::config::constants::{CANONICAL_DOMAIN, WEBSITE_URL};

use super::context::ResolutionContext;
use super::resolver::ConfigResolver;

/// Marketing site root
pub fn website_url() -> &'static str {
    WEBSITE_URL
}

impl ConfigResolver {
    /// Absolute URL for `path` on the current origin, with optional query
    ///
    /// Production domains other than `binary.com` serve the app under
    /// `/app`, so a leading `/` is rewritten to `/app/` there. Paths starting
    /// with `/br_` are never rewritten.
    pub fn url_for(&self, ctx: &ResolutionContext<'_>, path: &str, params: Option<&str>) -> String {
        let mut path = path.to_string();

        if !path.starts_with("/br_") {
            let needs_prefix = self
                .current_production_domain(ctx)
                .is_some_and(|domain| domain != CANONICAL_DOMAIN);
            if needs_prefix {
                if let Some(rest) = path.strip_prefix('/') {
                    path = format!("/app/{}", rest);
                }
            }
        }

        let location = ctx.location;
        let port = location.port.map(|p| format!(":{}", p)).unwrap_or_default();
        let query = params
            .filter(|p| !p.is_empty())
            .map(|p| format!("?{}", p))
            .unwrap_or_default();

        format!(
            "{}//{}{}{}{}",
            location.protocol, location.hostname, port, path, query
        )
    }

    /// `<protocol>//<hostname>/<path>`, dropping any port
    pub fn url_for_current_domain(&self, ctx: &ResolutionContext<'_>, path: &str) -> String {
        format!("{}//{}/{}", ctx.location.protocol, ctx.location.hostname, path)
    }
}
