//! Trading pair identifiers
//!
//! The exchange names markets `"<QUOTE>-<BASE>"`, e.g. `BTC-XMR` is XMR priced
//! in BTC. The same string is the subscription channel name.

use std::fmt;
use std::str::FromStr;

use crate::error::RecorderError;

/// Quote currency of the default configuration
pub const DEFAULT_QUOTE: &str = "BTC";

/// A single market
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TradingPair {
    pub quote: String,
    pub base: String,
}

impl TradingPair {
    pub fn new(quote: &str, base: &str) -> Self {
        Self {
            quote: quote.to_uppercase(),
            base: base.to_uppercase(),
        }
    }

    /// A pair quoted in BTC
    pub fn btc(base: &str) -> Self {
        Self::new(DEFAULT_QUOTE, base)
    }

    /// Subscription channel name
    pub fn channel(&self) -> String {
        self.to_string()
    }

    /// Base symbol, used in log lines and file names
    pub fn symbol(&self) -> &str {
        &self.base
    }
}

impl fmt::Display for TradingPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.quote, self.base)
    }
}

impl FromStr for TradingPair {
    type Err = RecorderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().split_once('-') {
            Some((quote, base)) if !quote.is_empty() && !base.is_empty() => {
                Ok(Self::new(quote, base))
            }
            _ => Err(RecorderError::Config(format!(
                "invalid trading pair {:?}, expected <QUOTE>-<BASE>",
                s
            ))),
        }
    }
}
