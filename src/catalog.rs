//! Market catalog client
//!
//! Lists every market the exchange trades. Only used when the recorder is
//! asked to follow all BTC markets instead of a fixed list.

use reqwest::header::COOKIE;
use std::time::Duration;
use tracing::{info, warn};

use crate::config::{Config, Credentials};
use crate::error::{RecorderError, Result};
use crate::pair::{TradingPair, DEFAULT_QUOTE};

/// Authenticated client for the markets endpoint
pub struct MarketCatalog {
    client: reqwest::Client,
    endpoint: String,
    credentials: Credentials,
}

impl MarketCatalog {
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_endpoint(
            &config.catalog_endpoint,
            config.credentials.clone(),
            config.connect_timeout,
        )
    }

    pub fn with_endpoint(endpoint: &str, credentials: Credentials, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            credentials,
        })
    }

    /// Pair identifiers (`"<QUOTE>-<BASE>"`) in the order the exchange lists them
    pub async fn list_trading_pairs(&self) -> Result<Vec<String>> {
        info!(url = %self.endpoint, "Fetching available markets");

        let response = self
            .client
            .get(&self.endpoint)
            .header(COOKIE, self.credentials.cookie_header())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RecorderError::Fetch(format!(
                "{} returned {}",
                self.endpoint, status
            )));
        }

        let body = response.text().await?;
        let pairs = parse_markets(&body)?;

        info!(count = pairs.len(), "Market pairs found");
        Ok(pairs)
    }

    /// Every BTC-quoted market, skipping identifiers that do not parse
    pub async fn btc_pairs(&self) -> Result<Vec<TradingPair>> {
        let pairs = self
            .list_trading_pairs()
            .await?
            .into_iter()
            .filter_map(|id| match id.parse::<TradingPair>() {
                Ok(pair) => Some(pair),
                Err(e) => {
                    warn!(pair = %id, error = %e, "Skipping market");
                    None
                }
            })
            .filter(|pair| pair.quote == DEFAULT_QUOTE)
            .collect();

        Ok(pairs)
    }
}

/// Extract the sole key of each object in a `[{"BTC-XMR": {...}}, ...]` body
pub fn parse_markets(body: &str) -> Result<Vec<String>> {
    let markets: Vec<serde_json::Map<String, serde_json::Value>> = serde_json::from_str(body)
        .map_err(|e| RecorderError::Fetch(format!("Unexpected markets body: {}", e)))?;

    markets
        .into_iter()
        .map(|entry| {
            if entry.len() != 1 {
                return Err(RecorderError::Fetch(format!(
                    "market entry has {} keys, expected 1",
                    entry.len()
                )));
            }
            entry
                .into_iter()
                .next()
                .map(|(pair, _)| pair)
                .ok_or_else(|| RecorderError::Fetch("empty market entry".to_string()))
        })
        .collect()
}
