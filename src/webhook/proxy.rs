//! Proxy selection for webhook endpoints.
//!
//! The decision is a pure function of the endpoint, an optional explicit
//! proxy, and a [`ProxyEnvironment`] snapshot. Transports resolve it once at
//! construction and never consult the process environment again.

use std::collections::HashMap;
use std::env;

use super::endpoint::{Scheme, WebhookEndpoint};

/// Variables consulted when capturing the process environment.
const PROXY_VARS: [&str; 3] = ["http_proxy", "https_proxy", "no_proxy"];

/// Whether requests go through a proxy.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ProxyDecision {
    #[default]
    Direct,
    Proxy(String),
}

impl ProxyDecision {
    pub fn proxy_url(&self) -> Option<&str> {
        match self {
            Self::Direct => None,
            Self::Proxy(url) => Some(url),
        }
    }
}

/// Snapshot of proxy-related environment variables.
///
/// Keys are stored lower-cased. When both spellings of a variable are
/// present the lower-case one wins, as curl and most HTTP clients do.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProxyEnvironment {
    vars: HashMap<String, String>,
}

impl ProxyEnvironment {
    /// An environment with no proxy configuration.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Read the proxy variables from the current process environment.
    pub fn capture() -> Self {
        let mut vars = HashMap::new();
        for name in PROXY_VARS {
            let value = env::var(name).or_else(|_| env::var(name.to_ascii_uppercase()));
            if let Ok(value) = value {
                vars.insert(name.to_owned(), value);
            }
        }
        Self { vars }
    }

    /// Build a snapshot from explicit `(name, value)` pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut vars: HashMap<String, String> = HashMap::new();
        for (key, value) in pairs {
            let key = key.as_ref();
            let lower = key.to_ascii_lowercase();
            if key == lower || !vars.contains_key(&lower) {
                vars.insert(lower, value.into());
            }
        }
        Self { vars }
    }

    /// Proxy configured for `scheme`, ignoring empty values.
    pub fn proxy_for(&self, scheme: Scheme) -> Option<&str> {
        self.get(&format!("{scheme}_proxy"))
    }

    /// Raw no-proxy exclusion list.
    pub fn no_proxy(&self) -> Option<&str> {
        self.get("no_proxy")
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }
}

/// Return `true` when `host` matches an entry of the exclusion list.
///
/// Entries are separated by commas and/or whitespace. A single leading `*`
/// is stripped and the remainder is compared as a case-sensitive suffix, so
/// a bare `*` excludes every host.
pub fn is_excluded(host: &str, no_proxy: &str) -> bool {
    no_proxy
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|entry| !entry.is_empty())
        .map(|entry| entry.strip_prefix('*').unwrap_or(entry))
        .any(|suffix| host.ends_with(suffix))
}

/// Decide how requests to `endpoint` are routed.
pub fn resolve_proxy(
    endpoint: &WebhookEndpoint,
    explicit: Option<&str>,
    env: &ProxyEnvironment,
) -> ProxyDecision {
    if let Some(proxy) = explicit {
        return ProxyDecision::Proxy(proxy.to_owned());
    }
    if env
        .no_proxy()
        .is_some_and(|list| is_excluded(endpoint.host(), list))
    {
        return ProxyDecision::Direct;
    }
    env.proxy_for(endpoint.scheme())
        .map_or(ProxyDecision::Direct, |p| ProxyDecision::Proxy(p.to_owned()))
}
