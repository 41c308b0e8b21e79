//! Demo settings read from the environment.

use anyhow::{Context, Result};
use webservice_core::{Headers, Url, WebServiceConfig};

pub const DEFAULT_ENDPOINT: &str = "https://api.genderize.io/";

#[derive(Debug, Clone)]
pub struct DemoConfig {
    /// `GENDERIZE_URL`.
    pub endpoint: Url,
    pub service: WebServiceConfig,
}

impl DemoConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source. `WEBSERVICE_DEBUG` defaults
    /// to on.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let raw = lookup("GENDERIZE_URL").unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        let endpoint = Url::parse(&raw).with_context(|| format!("GENDERIZE_URL is not a valid URL: {raw}"))?;

        let debug = match lookup("WEBSERVICE_DEBUG") {
            None => true,
            Some(value) => parse_flag(&value).with_context(|| format!("WEBSERVICE_DEBUG must be a boolean, got {value:?}"))?,
        };

        let mut default_headers = Headers::new();
        default_headers.insert(
            "X-Example".to_string(),
            "sent with every request unless a resource overrides it".to_string(),
        );

        Ok(Self {
            endpoint,
            service: WebServiceConfig {
                debug,
                default_headers,
            },
        })
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
