//! QA endpoint override carried in a test-link URL
//!
//! Preview deployments on `*.binary.sx` can be pointed at a QA backend by
//! opening them with `?qa_server=<host>&app_id=<id>`. The pair is stored
//! and the page reloads without those parameters.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info};
use url::form_urlencoded;

use crate::config::constants::{KEY_APP_ID, KEY_SERVER_URL, QUERY_APP_ID, QUERY_QA_SERVER};

use super::context::ResolutionContext;
use super::resolver::ConfigResolver;

/// `qa<1-4 digits>.deriv.dev` (optionally `www.`) or any `*.derivws.com` host
static QA_SERVER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^((www\.)?qa[0-9]{1,4}\.deriv\.dev|.*\.derivws\.com)$").expect("qa server regex")
});
static NUMERIC_APP_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+$").expect("app id regex"));

/// Validated endpoint pair taken from the query string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointOverride {
    pub server_url: String,
    pub app_id: String,
}

impl EndpointOverride {
    /// Both values pass their allow-list patterns
    pub fn validate(server_url: &str, app_id: &str) -> Option<Self> {
        if QA_SERVER.is_match(server_url) && NUMERIC_APP_ID.is_match(app_id) {
            Some(Self {
                server_url: server_url.to_string(),
                app_id: app_id.to_string(),
            })
        } else {
            None
        }
    }
}

impl ConfigResolver {
    /// Apply a `qa_server`/`app_id` pair found in a test-link URL
    ///
    /// On a `*.binary.sx` host whose query carries a valid pair, stores it
    /// under `config.server_url` and `config.app_id`, then navigates to the
    /// same page with both parameters removed and returns `true`. Every other
    /// case returns `false` and touches nothing.
    pub fn check_and_set_endpoint_from_url(&self, ctx: &ResolutionContext<'_>) -> bool {
        if !self.is_test_link(ctx) {
            return false;
        }

        let location = ctx.location;
        let (Some(qa_server), Some(app_id)) = (
            location.query_param(QUERY_QA_SERVER),
            location.query_param(QUERY_APP_ID),
        ) else {
            return false;
        };

        let Some(endpoint) = EndpointOverride::validate(&qa_server, &app_id) else {
            debug!(qa_server = %qa_server, app_id = %app_id, "Rejected endpoint override from URL");
            return false;
        };

        ctx.local.set_item(KEY_APP_ID, &endpoint.app_id);
        ctx.local.set_item(KEY_SERVER_URL, &endpoint.server_url);
        info!(
            server_url = %endpoint.server_url,
            app_id = %endpoint.app_id,
            "Endpoint override applied from URL"
        );

        let remaining: Vec<(String, String)> = form_urlencoded::parse(location.query().as_bytes())
            .into_owned()
            .filter(|(key, _)| key != QUERY_QA_SERVER && key != QUERY_APP_ID)
            .collect();
        let params = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(remaining)
            .finish();

        let href = format!(
            "{}//{}{}{}{}",
            location.protocol,
            location.hostname,
            location.pathname,
            if params.is_empty() {
                String::new()
            } else {
                format!("?{}", params)
            },
            location.hash
        );
        ctx.navigator.navigate(&href);

        true
    }
}
