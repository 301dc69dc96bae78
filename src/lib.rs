//! TradeOgre trade recorder library
//!
//! Connects to the exchange's trade stream, subscribes to one channel per
//! trading pair and appends every trade to a per-symbol text log.

pub mod catalog;
pub mod config;
pub mod error;
pub mod notify;
pub mod pair;
pub mod parser;
pub mod recorder;
pub mod supervisor;
pub mod websocket;

pub use catalog::MarketCatalog;
pub use config::{Config, Credentials, SecretString};
pub use error::{RecorderError, Result};
pub use notify::Notifier;
pub use pair::TradingPair;
pub use parser::{ControlFrame, ParsedMessage, Side, TradeEvent};
pub use recorder::TradeLog;
pub use supervisor::Supervisor;
pub use websocket::{SessionState, StreamSession, WebSocketClient};
