//! Per-symbol stream session
//!
//! Owns one connection and one trade log. The connection is renewed after it
//! has been open for the configured interval; the log stays open throughout.

use std::time::{Duration, Instant};
use tracing::{debug, error, info};

use super::WebSocketClient;
use crate::config::{Config, Credentials};
use crate::error::Result;
use crate::notify::{timestamp, Notifier};
use crate::pair::TradingPair;
use crate::parser::{ControlFrame, ParsedMessage, TradeEvent};
use crate::recorder::TradeLog;

/// Connection lifecycle of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connecting,
    Subscribed,
    Renewing,
    Terminated,
}

/// One persistent subscription to one market
pub struct StreamSession {
    pair: TradingPair,
    client: WebSocketClient,
    credentials: Credentials,
    log: TradeLog,
    notifier: Notifier,
    renewal_interval: Duration,
    connected_at: Option<Instant>,
    state: SessionState,
    renewals: u64,
}

impl StreamSession {
    /// Create a disconnected session and open its trade log
    pub async fn open(config: &Config, pair: TradingPair) -> Result<Self> {
        let log = TradeLog::open(&config.data_dir, pair.symbol()).await?;

        Ok(Self {
            client: WebSocketClient::new(&config.ws_endpoint, config.connect_timeout),
            credentials: config.credentials.clone(),
            log,
            notifier: Notifier,
            renewal_interval: config.renewal_interval,
            connected_at: None,
            state: SessionState::Disconnected,
            renewals: 0,
            pair,
        })
    }

    /// Connect, authenticate and subscribe
    ///
    /// Neither control frame is acknowledged by the exchange, so the session
    /// counts as subscribed once both are sent. A failure here leaves the
    /// session terminated and is reported as a fatal error.
    pub async fn connect(&mut self) -> Result<()> {
        self.state = SessionState::Connecting;
        self.notifier
            .status(&format!("Connecting to {} websocket endpoint", self.pair));

        if let Err(e) = self.handshake().await {
            self.notifier.failure(&e.to_string());
            error!(pair = %self.pair, error = %e, "Handshake failed");
            self.client.close().await;
            self.state = SessionState::Terminated;
            return Err(e);
        }

        self.state = SessionState::Subscribed;
        info!(pair = %self.pair, renewals = self.renewals, "Subscribed");
        Ok(())
    }

    async fn handshake(&mut self) -> Result<()> {
        self.client.connect().await?;
        self.connected_at = Some(Instant::now());

        self.client
            .send_frame(&ControlFrame::auth(self.credentials.jwt.expose_secret()))
            .await?;
        self.client
            .send_frame(&ControlFrame::subscribe(self.pair.channel()))
            .await?;
        Ok(())
    }

    /// Consume frames until the session fails
    ///
    /// Runs on an already connected session; a disconnected one is connected
    /// first. The returned error says why the session stopped.
    pub async fn run(mut self) -> Result<()> {
        let result = self.consume().await;

        self.state = SessionState::Terminated;
        self.client.close().await;

        if let Err(e) = &result {
            error!(pair = %self.pair, error = %e, lines = self.log.lines_written(), "Session terminated");
        }
        result
    }

    async fn consume(&mut self) -> Result<()> {
        loop {
            match self.state {
                SessionState::Disconnected | SessionState::Connecting => self.connect().await?,
                SessionState::Subscribed => {
                    let Some(raw) = self.client.recv().await? else {
                        continue;
                    };
                    if self.handle_frame(&raw).await?.is_some() && self.renewal_due() {
                        self.state = SessionState::Renewing;
                    }
                }
                SessionState::Renewing => self.renew().await?,
                SessionState::Terminated => return Ok(()),
            }
        }
    }

    /// Parse one frame and record it if it is a trade
    pub async fn handle_frame(&mut self, raw: &str) -> Result<Option<TradeEvent>> {
        let trade = match ParsedMessage::parse(raw)? {
            ParsedMessage::Trade(trade) => trade,
            ParsedMessage::Ignored(kind) => {
                debug!(pair = %self.pair, kind = %kind, "Ignoring frame");
                return Ok(None);
            }
        };

        let description = trade.describe(self.pair.symbol());
        let at = timestamp();
        self.log.append(&at, &description).await?;
        self.notifier.trade(trade.side, &description);

        Ok(Some(trade))
    }

    /// Whether the connection has outlived the renewal interval
    pub fn renewal_due(&self) -> bool {
        self.connected_at
            .map(|at| at.elapsed() >= self.renewal_interval)
            .unwrap_or(false)
    }

    async fn renew(&mut self) -> Result<()> {
        self.notifier
            .status(&format!("renewing the websocket connection for {}", self.pair.symbol()));
        info!(
            pair = %self.pair,
            age_secs = self.connected_at.map(|at| at.elapsed().as_secs()).unwrap_or(0),
            "Renewing connection"
        );

        self.client.close().await;
        self.renewals += 1;
        self.connect().await
    }

    pub fn state(&self) -> SessionState {
        self.state
    }
}
