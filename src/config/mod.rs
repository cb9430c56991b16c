use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, bail};

use crate::market_data::PricePolicy;
use crate::market_data::adapters::GmxNetwork;
use crate::persistence::DEFAULT_OUTPUT_PATH;

pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub log_level: String,
    pub network: GmxNetwork,
    /// Ticker endpoint actually fetched.
    pub feed_url: String,
    pub output_path: PathBuf,
    /// `None` keeps the HTTP client's default.
    pub request_timeout: Option<Duration>,
    pub price_policy: PricePolicy,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        // dotenvy loads .env, but doesn't override already-set env vars
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let log_level = get("RUST_LOG").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());

        let network = match get("GMX_NETWORK") {
            Some(raw) => raw
                .parse::<GmxNetwork>()
                .map_err(anyhow::Error::msg)
                .context("invalid GMX_NETWORK")?,
            None => GmxNetwork::default(),
        };

        let feed_url = match get("PRICE_FEED_URL") {
            Some(url) => {
                let url = url.trim().to_string();
                if !(url.starts_with("http://") || url.starts_with("https://")) {
                    bail!("invalid PRICE_FEED_URL: {url} is not an http(s) URL");
                }
                url
            }
            None => network.tickers_url().to_string(),
        };

        let output_path = get("PRICE_SNAPSHOT_OUTPUT")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_PATH));

        let request_timeout = get("PRICE_SNAPSHOT_TIMEOUT_SECS")
            .map(|raw| {
                raw.trim()
                    .parse::<u64>()
                    .with_context(|| format!("invalid PRICE_SNAPSHOT_TIMEOUT_SECS: {raw}"))
            })
            .transpose()?
            .map(Duration::from_secs);

        let price_policy = match get("PRICE_SNAPSHOT_STRICT") {
            Some(raw) if parse_flag(&raw)? => PricePolicy::Strict,
            _ => PricePolicy::Lenient,
        };

        Ok(Self {
            log_level,
            network,
            feed_url,
            output_path,
            request_timeout,
            price_policy,
        })
    }
}

fn parse_flag(raw: &str) -> anyhow::Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("invalid PRICE_SNAPSHOT_STRICT: {other}"),
    }
}
