use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::market_data::error::{FetchError, FetchResult};
use crate::market_data::normalize::{FetchedSnapshot, PricePolicy, normalize_ticks};
use crate::market_data::traits::TickerSource;

const ARBITRUM_TICKERS_URL: &str = "https://arbitrum-api.gmxinfra.io/prices/tickers";
const AVALANCHE_TICKERS_URL: &str = "https://avalanche-api.gmxinfra.io/prices/tickers";

/// Error responses are kept only up to this many characters.
const MAX_ERROR_BODY_CHARS: usize = 512;

/// Chains the GMX off-chain price API is served for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GmxNetwork {
    #[default]
    Arbitrum,
    Avalanche,
}

impl GmxNetwork {
    pub fn tickers_url(self) -> &'static str {
        match self {
            GmxNetwork::Arbitrum => ARBITRUM_TICKERS_URL,
            GmxNetwork::Avalanche => AVALANCHE_TICKERS_URL,
        }
    }
}

impl fmt::Display for GmxNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GmxNetwork::Arbitrum => f.write_str("arbitrum"),
            GmxNetwork::Avalanche => f.write_str("avalanche"),
        }
    }
}

impl FromStr for GmxNetwork {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "arbitrum" | "arbi" => Ok(GmxNetwork::Arbitrum),
            "avalanche" | "avax" => Ok(GmxNetwork::Avalanche),
            other => Err(format!("unknown GMX network: {other}")),
        }
    }
}

/// Fetches `/prices/tickers` from a GMX price API over HTTP.
pub struct GmxTickerClient {
    http: Client,
    url: String,
    policy: PricePolicy,
}

impl GmxTickerClient {
    /// Without a timeout the transport default applies.
    pub fn new(
        url: impl Into<String>,
        timeout: Option<Duration>,
        policy: PricePolicy,
    ) -> FetchResult<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(FetchError::Client)?;

        Ok(Self {
            http,
            url: url.into(),
            policy,
        })
    }
}

#[async_trait]
impl TickerSource for GmxTickerClient {
    fn endpoint(&self) -> &str {
        &self.url
    }

    async fn fetch_snapshot(&self) -> FetchResult<FetchedSnapshot> {
        let response = self
            .http
            .get(&self.url)
            .send()
            .await
            .map_err(FetchError::Request)?;

        let status = response.status();
        if !status.is_success() {
            let body = match response.text().await {
                Ok(text) => truncate_body(text),
                Err(err) => format!("<failed to read body: {err}>"),
            };
            return Err(FetchError::Status { status, body });
        }

        let bytes = response.bytes().await.map_err(FetchError::Body)?;
        let body: Value = serde_json::from_slice(&bytes)?;

        normalize_ticks(body, self.policy)
    }
}

fn truncate_body(mut text: String) -> String {
    if let Some((cut, _)) = text.char_indices().nth(MAX_ERROR_BODY_CHARS) {
        text.truncate(cut);
        text.push_str("...");
    }
    text
}
