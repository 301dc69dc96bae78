//! Append-only per-symbol trade logs
//!
//! One text file per symbol, one line per trade, flushed after every write.

use std::path::{Path, PathBuf};
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::error::{RecorderError, Result};

/// `[<timestamp>] <description>\n`
pub fn format_line(at: &str, description: &str) -> String {
    format!("[{}] {}\n", at, description)
}

/// Path of the log for `symbol` under `data_dir`
pub fn log_path(data_dir: &Path, symbol: &str) -> PathBuf {
    data_dir.join(format!("{}.txt", symbol))
}

/// Open trade log, owned by exactly one stream session
#[derive(Debug)]
pub struct TradeLog {
    path: PathBuf,
    file: File,
    lines_written: u64,
}

impl TradeLog {
    /// Open (or create) the log for `symbol`, creating `data_dir` if needed
    pub async fn open(data_dir: &Path, symbol: &str) -> Result<Self> {
        fs::create_dir_all(data_dir).await.map_err(|e| {
            RecorderError::Io(format!("Failed to create {}: {}", data_dir.display(), e))
        })?;

        let path = log_path(data_dir, symbol);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|e| RecorderError::Io(format!("Failed to open {}: {}", path.display(), e)))?;

        info!(path = %path.display(), "Trade log opened");

        Ok(Self {
            path,
            file,
            lines_written: 0,
        })
    }

    /// Append one trade line stamped with `at` and flush it to the OS
    pub async fn append(&mut self, at: &str, description: &str) -> Result<()> {
        let line = format_line(at, description);
        self.file.write_all(line.as_bytes()).await?;
        self.file.flush().await?;
        self.lines_written += 1;

        debug!(path = %self.path.display(), lines = self.lines_written, "Trade appended");
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Lines appended through this handle
    pub fn lines_written(&self) -> u64 {
        self.lines_written
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_line() {
        assert_eq!(
            format_line("2021-05-31 16:09:39", "SELL 12.5 XMR at a price of 0.000031 BTC"),
            "[2021-05-31 16:09:39] SELL 12.5 XMR at a price of 0.000031 BTC\n"
        );
    }

    #[tokio::test]
    async fn test_append_creates_dir_and_file() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("data");

        let mut log = TradeLog::open(&data_dir, "XMR").await.unwrap();
        log.append("2021-05-31 16:09:39", "BUY 1 XMR at a price of 0.1 BTC")
            .await
            .unwrap();

        assert_eq!(log.path(), data_dir.join("XMR.txt"));
        assert_eq!(log.lines_written(), 1);
        let contents = std::fs::read_to_string(data_dir.join("XMR.txt")).unwrap();
        assert_eq!(contents, "[2021-05-31 16:09:39] BUY 1 XMR at a price of 0.1 BTC\n");
    }

    #[tokio::test]
    async fn test_reopen_appends_in_order() {
        let dir = tempfile::tempdir().unwrap();

        let mut first = TradeLog::open(dir.path(), "WOW").await.unwrap();
        first.append("t1", "one").await.unwrap();
        first.append("t2", "two").await.unwrap();
        drop(first);

        let mut second = TradeLog::open(dir.path(), "WOW").await.unwrap();
        second.append("t3", "three").await.unwrap();

        let contents = std::fs::read_to_string(dir.path().join("WOW.txt")).unwrap();
        assert_eq!(contents, "[t1] one\n[t2] two\n[t3] three\n");
    }
}
