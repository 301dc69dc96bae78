//! WebSocket module for TradeOgre stream sessions

mod client;
mod session;

pub use client::WebSocketClient;
pub use session::{SessionState, StreamSession};
