//! Parser module for TradeOgre stream frames
//!
//! Handles the two outbound control frames and the inbound subscription
//! updates. Every frame carries its kind in the `a` field.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{RecorderError, Result};

/// Discriminator of a trade update on a subscribed market
pub const SUBSCRIPTION_UPDATE: &str = "sub";

/// Frames sent to the exchange right after connecting
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "a", rename_all = "lowercase")]
pub enum ControlFrame {
    /// Authenticates the socket with the session token
    Auth { cookie: String },

    /// Subscribes to one market channel
    #[serde(rename = "submarket")]
    Subscribe { name: String },
}

impl ControlFrame {
    pub fn auth(jwt: &str) -> Self {
        ControlFrame::Auth {
            cookie: format!("jwt={}", jwt),
        }
    }

    pub fn subscribe(channel: impl Into<String>) -> Self {
        ControlFrame::Subscribe {
            name: channel.into(),
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}

/// Trade direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// `"sell"` is a sell; any other tag is a buy
    pub fn from_tag(tag: Option<&str>) -> Self {
        match tag {
            Some("sell") => Side::Sell,
            _ => Side::Buy,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "BUY",
            Side::Sell => "SELL",
        }
    }
}

/// One executed trade
///
/// Price and amount are the exact text the exchange sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeEvent {
    pub side: Side,
    pub price: String,
    pub amount: String,
}

impl TradeEvent {
    /// Human readable description, shared by the log file and the console
    pub fn describe(&self, symbol: &str) -> String {
        format!(
            "{} {} {} at a price of {} BTC",
            self.side.as_str(),
            self.amount,
            symbol,
            self.price
        )
    }
}

/// Raw inbound frame
#[derive(Debug, Deserialize)]
struct RawFrame {
    #[serde(rename = "a")]
    kind: serde_json::Value,

    #[serde(rename = "t", default)]
    side: Option<serde_json::Value>,

    #[serde(rename = "d", default)]
    data: Option<serde_json::Value>,
}

/// Parsed inbound frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedMessage {
    Trade(TradeEvent),
    /// Housekeeping frame with the given discriminator
    Ignored(String),
}

impl ParsedMessage {
    /// Parse a raw frame body
    pub fn parse(raw: &str) -> Result<Self> {
        let frame: RawFrame = serde_json::from_str(raw)?;

        if frame.kind.as_str() != Some(SUBSCRIPTION_UPDATE) {
            let kind = match frame.kind {
                serde_json::Value::String(kind) => kind,
                other => other.to_string(),
            };
            return Ok(ParsedMessage::Ignored(kind));
        }

        let side = Side::from_tag(frame.side.as_ref().and_then(|v| v.as_str()));

        let data = frame
            .data
            .ok_or_else(|| RecorderError::Parse("subscription update without data".to_string()))?;
        let levels = data
            .as_object()
            .ok_or_else(|| RecorderError::Parse("trade data is not an object".to_string()))?;

        // A trade frame carries exactly one price/amount entry.
        if levels.len() != 1 {
            return Err(RecorderError::Parse(format!(
                "expected one price entry, got {}",
                levels.len()
            )));
        }

        let (price, amount) = levels
            .iter()
            .next()
            .ok_or_else(|| RecorderError::Parse("empty trade data".to_string()))?;
        let amount = amount
            .as_str()
            .ok_or_else(|| RecorderError::Parse(format!("amount is not a string: {}", amount)))?;

        validate_decimal("price", price)?;
        validate_decimal("amount", amount)?;

        Ok(ParsedMessage::Trade(TradeEvent {
            side,
            price: price.clone(),
            amount: amount.to_string(),
        }))
    }
}

fn validate_decimal(field: &str, text: &str) -> Result<()> {
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .map(|_| ())
        .map_err(|e| RecorderError::Parse(format!("{} {:?} is not a decimal: {}", field, text, e)))
}
