//! Process supervisor
//!
//! Starts one stream session per trading pair and keeps them running until
//! shutdown is requested or a session fails in a way the policy treats as
//! fatal.

use std::future::Future;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use crate::catalog::MarketCatalog;
use crate::config::Config;
use crate::error::{RecorderError, Result};
use crate::pair::TradingPair;
use crate::websocket::StreamSession;

type SessionOutcome = (TradingPair, Result<()>);

/// Supervises independent per-pair sessions
pub struct Supervisor {
    config: Config,
}

impl Supervisor {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Pairs to record: the configured list, or every BTC market when discovery is on
    pub async fn resolve_pairs(&self) -> Result<Vec<TradingPair>> {
        if !self.config.discover_all_pairs {
            return Ok(self.config.pairs.clone());
        }

        let catalog = MarketCatalog::new(&self.config)?;
        catalog.btc_pairs().await
    }

    /// Start every session, then wait for `shutdown`
    ///
    /// With `fail_fast` set, a connect failure in any session (at start or
    /// during a renewal) stops all sessions and is returned. Otherwise the
    /// failing session is dropped and the rest keep running.
    pub async fn run<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let pairs = self.resolve_pairs().await?;
        info!(pairs = ?pairs.iter().map(|p| p.to_string()).collect::<Vec<_>>(), "Starting sessions");

        let mut sessions: JoinSet<SessionOutcome> = JoinSet::new();

        for pair in pairs {
            let mut session = StreamSession::open(&self.config, pair.clone()).await?;

            match session.connect().await {
                Ok(()) => {
                    sessions.spawn(async move { (pair, session.run().await) });
                }
                Err(e) if self.should_abort(&e) => {
                    sessions.abort_all();
                    return Err(e);
                }
                Err(e) => {
                    warn!(pair = %pair, error = %e, "Session failed to start, continuing without it");
                }
            }
        }

        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!(running = sessions.len(), "Shutdown requested");
                    sessions.abort_all();
                    return Ok(());
                }
                joined = sessions.join_next() => {
                    match joined {
                        None => {
                            warn!("No sessions left running, waiting for shutdown");
                            (&mut shutdown).await;
                            return Ok(());
                        }
                        Some(Ok((pair, Ok(())))) => {
                            info!(pair = %pair, "Session finished");
                        }
                        Some(Ok((pair, Err(e)))) => {
                            if self.should_abort(&e) {
                                error!(pair = %pair, error = %e, "Session lost its connection, stopping");
                                sessions.abort_all();
                                return Err(e);
                            }
                            warn!(pair = %pair, error = %e, "Session ended");
                        }
                        Some(Err(e)) => {
                            error!(error = %e, "Session task failed");
                        }
                    }
                }
            }
        }
    }

    fn should_abort(&self, err: &RecorderError) -> bool {
        self.config.fail_fast && err.is_fatal()
    }
}

/// Resolve when `signal` fires
///
/// If the signal handler cannot be installed the error is logged and the
/// returned future never resolves, so the recorder keeps running until killed.
pub async fn shutdown_on<F>(signal: F)
where
    F: Future<Output = std::io::Result<()>>,
{
    if let Err(e) = signal.await {
        error!(error = %e, "Unable to listen for shutdown signal, running until killed");
        std::future::pending::<()>().await;
    }
}
