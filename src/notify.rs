//! Colorized console notifications
//!
//! Human readable status and trade lines for an operator watching the
//! terminal. Diagnostics go through `tracing` on stdout; the ticker is
//! written to stderr so it never interleaves with JSON log output.

use chrono::{DateTime, Local};
use console::{style, Term};

use crate::parser::Side;

/// Timestamp layout shared by the console and the trade logs
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Current local time in [`TIMESTAMP_FORMAT`]
pub fn timestamp() -> String {
    format_timestamp(&Local::now())
}

pub fn format_timestamp(at: &DateTime<Local>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Stateless console printer
#[derive(Debug, Clone, Copy, Default)]
pub struct Notifier;

impl Notifier {
    /// Status line, yellow
    pub fn status(&self, message: &str) {
        self.emit(&self.render_status(&timestamp(), message, true));
    }

    /// Failure line, red
    pub fn failure(&self, message: &str) {
        self.emit(&self.render_status(&timestamp(), message, false));
    }

    /// Trade line, red with a down arrow for sells and green with an up arrow for buys
    pub fn trade(&self, side: Side, description: &str) {
        self.emit(&self.render_trade(&timestamp(), side, description));
    }

    /// Terminal the ticker is written to
    pub fn term(&self) -> Term {
        Term::stderr()
    }

    fn emit(&self, line: &str) {
        let _ = self.term().write_line(line);
    }

    pub fn render_status(&self, at: &str, message: &str, ok: bool) -> String {
        let body = format!("[+] {}", message);
        let body = if ok {
            style(body).for_stderr().yellow()
        } else {
            style(body).for_stderr().red()
        };
        format!("[{}] {}", at, body)
    }

    pub fn render_trade(&self, at: &str, side: Side, description: &str) -> String {
        let body = match side {
            Side::Sell => style(format!("⬇️  {}", description)).for_stderr().red(),
            Side::Buy => style(format!("⬆️  {}", description)).for_stderr().green(),
        };
        format!("[{}] {}", at, body)
    }
}
