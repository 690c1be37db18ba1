//! Current page location, split into the parts the resolver inspects

use serde::{Deserialize, Serialize};
use url::{form_urlencoded, Url};

use crate::error::{AppError, Result};

/// Decomposed page URL
///
/// Field conventions follow the browser `Location` object: `protocol` keeps
/// its trailing colon, `search` and `hash` keep their leading `?`/`#` and are
/// empty when absent, `port` is `None` for the scheme's default port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub protocol: String,
    pub hostname: String,
    pub port: Option<u16>,
    pub pathname: String,
    pub search: String,
    pub hash: String,
}

impl Location {
    /// Parse an absolute URL such as `https://app.deriv.com/trade?acct1=CR1`
    pub fn parse(href: &str) -> Result<Self> {
        let url = Url::parse(href).map_err(|source| AppError::InvalidUrl {
            url: href.to_string(),
            source,
        })?;
        Ok(Self::from(&url))
    }

    /// Bare location for a hostname, served over https at `/`
    pub fn for_host(hostname: &str) -> Self {
        Self {
            protocol: "https:".to_string(),
            hostname: hostname.to_ascii_lowercase(),
            port: None,
            pathname: "/".to_string(),
            search: String::new(),
            hash: String::new(),
        }
    }

    /// Query string without its leading `?`
    pub fn query(&self) -> &str {
        self.search.strip_prefix('?').unwrap_or(&self.search)
    }

    /// First value of a query parameter, decoded
    pub fn query_param(&self, name: &str) -> Option<String> {
        form_urlencoded::parse(self.query().as_bytes())
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    }

    /// Full href, reassembled from the parts
    pub fn href(&self) -> String {
        let port = self.port.map(|p| format!(":{}", p)).unwrap_or_default();
        format!(
            "{}//{}{}{}{}{}",
            self.protocol, self.hostname, port, self.pathname, self.search, self.hash
        )
    }
}

impl From<&Url> for Location {
    fn from(url: &Url) -> Self {
        let prefixed = |prefix: char, part: Option<&str>| match part {
            Some(p) if !p.is_empty() => format!("{}{}", prefix, p),
            _ => String::new(),
        };

        Self {
            protocol: format!("{}:", url.scheme()),
            hostname: url.host_str().unwrap_or_default().to_string(),
            port: url.port(),
            pathname: url.path().to_string(),
            search: prefixed('?', url.query()),
            hash: prefixed('#', url.fragment()),
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.href())
    }
}
