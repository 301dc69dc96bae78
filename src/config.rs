//! Configuration module for the trade recorder
//!
//! Everything is read from the environment (optionally seeded from a `.env`
//! file). The two session tokens have no default and must be supplied.

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{RecorderError, Result};
use crate::pair::TradingPair;

/// String wrapper that keeps session tokens out of logs
///
/// Debug output is always `SecretString(***)`; Display shows `first4...last4`.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SecretString(String);

impl SecretString {
    pub fn new(value: impl Into<String>) -> Self {
        SecretString(value.into())
    }

    /// The raw token. Only for building outbound frames and headers.
    pub fn expose_secret(&self) -> &str {
        &self.0
    }

    /// `first4...last4`, counted in characters
    pub fn masked(&self) -> String {
        let s = &self.0;
        if s.chars().count() <= 8 {
            return "***".to_string();
        }
        let head: String = s.chars().take(4).collect();
        let mut tail: Vec<char> = s.chars().rev().take(4).collect();
        tail.reverse();
        format!("{}...{}", head, tail.into_iter().collect::<String>())
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretString(***)")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.masked())
    }
}

/// Session tokens copied from an authenticated browser session
#[derive(Clone, Debug, Default)]
pub struct Credentials {
    /// Cloudflare browser-clearance cookie
    pub cf_clearance: SecretString,
    /// Signed session token, sent as the `jwt` cookie
    pub jwt: SecretString,
}

impl Credentials {
    /// Value for the HTTP `Cookie` header
    pub fn cookie_header(&self) -> String {
        format!(
            "cf_clearance={}; jwt={}",
            self.cf_clearance.expose_secret(),
            self.jwt.expose_secret()
        )
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Session tokens used on every connection attempt
    pub credentials: Credentials,

    /// Trading pairs to record (e.g., ["BTC-WOW", "BTC-XMR"])
    pub pairs: Vec<TradingPair>,

    /// Record every BTC market returned by the catalog instead of `pairs`
    pub discover_all_pairs: bool,

    /// Streaming endpoint
    pub ws_endpoint: String,

    /// Market catalog endpoint
    pub catalog_endpoint: String,

    /// Directory holding the per-symbol logs
    pub data_dir: PathBuf,

    /// Connection age after which the next event triggers a renewal
    pub renewal_interval: Duration,

    /// Budget for connecting and for catalog requests
    pub connect_timeout: Duration,

    /// Abort every session when one cannot (re)connect
    pub fail_fast: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Ok(Self::from_lookup(|key| env::var(key).ok())?)
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let credentials = Credentials {
            cf_clearance: required_secret(&lookup, "TRADEOGRE_CF_CLEARANCE")?,
            jwt: required_secret(&lookup, "TRADEOGRE_JWT")?,
        };

        let pairs = lookup("TRADING_PAIRS")
            .unwrap_or_else(|| "BTC-WOW,BTC-XMR".to_string())
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| s.parse::<TradingPair>())
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            credentials,
            pairs,
            discover_all_pairs: parse_or(&lookup, "DISCOVER_ALL_PAIRS", defaults.discover_all_pairs)?,
            ws_endpoint: lookup("WS_ENDPOINT").unwrap_or(defaults.ws_endpoint),
            catalog_endpoint: lookup("CATALOG_ENDPOINT").unwrap_or(defaults.catalog_endpoint),
            data_dir: lookup("DATA_DIR").map(PathBuf::from).unwrap_or(defaults.data_dir),
            renewal_interval: Duration::from_secs(parse_or(
                &lookup,
                "RENEWAL_SECS",
                defaults.renewal_interval.as_secs(),
            )?),
            connect_timeout: Duration::from_millis(parse_or(
                &lookup,
                "CONNECT_TIMEOUT_MS",
                defaults.connect_timeout.as_millis() as u64,
            )?),
            fail_fast: parse_or(&lookup, "FAIL_FAST", defaults.fail_fast)?,
        })
    }
}

fn required_secret<F>(lookup: &F, key: &str) -> Result<SecretString>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key).map(|v| v.trim().to_string()) {
        Some(value) if !value.is_empty() => Ok(SecretString::new(value)),
        _ => Err(RecorderError::Config(format!("{} is not set", key))),
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| RecorderError::Config(format!("{}={:?}: {}", key, raw, e))),
        None => Ok(default),
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            credentials: Credentials::default(),
            pairs: vec![TradingPair::btc("WOW"), TradingPair::btc("XMR")],
            discover_all_pairs: false,
            ws_endpoint: "wss://tradeogre.com:8443".to_string(),
            catalog_endpoint: "https://tradeogre.com/api/v1/markets".to_string(),
            data_dir: PathBuf::from("data"),
            renewal_interval: Duration::from_secs(3600),
            connect_timeout: Duration::from_millis(2000),
            fail_fast: true,
        }
    }
}
