//! Shared test utilities: a scripted stand-in for the exchange stream

#![allow(dead_code)]

use futures_util::{SinkExt, StreamExt};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::{accept_async, tungstenite::Message};

use trade_recorder::{Config, Credentials, SecretString};

/// What the mock does once its scripted frames are sent
#[derive(Debug, Clone, Copy)]
pub enum After {
    /// Keep the socket open until the client closes it
    Hold,
    /// Close the socket from the server side
    Close,
}

/// Frames pushed on one accepted connection
#[derive(Debug, Clone)]
pub struct Script {
    pub frames: Vec<String>,
    pub after: After,
}

impl Script {
    pub fn new(frames: &[&str], after: After) -> Self {
        Self {
            frames: frames.iter().map(|f| f.to_string()).collect(),
            after,
        }
    }
}

/// What the mock observed on one connection
#[derive(Debug, Clone, Default)]
pub struct ConnectionRecord {
    pub control_frames: Vec<serde_json::Value>,
    pub closed_by_client: bool,
}

pub struct MockExchange {
    pub url: String,
    pub connections: Arc<Mutex<Vec<ConnectionRecord>>>,
    pushers: Arc<Mutex<Vec<mpsc::UnboundedSender<String>>>>,
}

impl MockExchange {
    /// Accept one connection per script, in order
    pub async fn start(scripts: Vec<Script>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("ws://{}", listener.local_addr().unwrap());
        let connections: Arc<Mutex<Vec<ConnectionRecord>>> = Arc::new(Mutex::new(Vec::new()));
        let pushers: Arc<Mutex<Vec<mpsc::UnboundedSender<String>>>> =
            Arc::new(Mutex::new(Vec::new()));

        let records = connections.clone();
        let senders = pushers.clone();
        tokio::spawn(async move {
            for script in scripts {
                let (tcp, _) = listener.accept().await.unwrap();
                let mut ws = accept_async(tcp).await.unwrap();

                let mut control_frames = Vec::new();
                while control_frames.len() < 2 {
                    match ws.next().await {
                        Some(Ok(Message::Binary(data))) => {
                            control_frames.push(serde_json::from_slice(&data).unwrap())
                        }
                        Some(Ok(Message::Text(text))) => {
                            control_frames.push(serde_json::from_str(&text).unwrap())
                        }
                        Some(Ok(_)) => continue,
                        _ => break,
                    }
                }

                let (tx, mut rx) = mpsc::unbounded_channel::<String>();
                let index = {
                    let mut guard = records.lock().unwrap();
                    guard.push(ConnectionRecord {
                        control_frames,
                        closed_by_client: false,
                    });
                    senders.lock().unwrap().push(tx);
                    guard.len() - 1
                };

                for frame in script.frames {
                    ws.send(Message::Text(frame)).await.unwrap();
                }

                match script.after {
                    After::Close => {
                        let _ = ws.close(None).await;
                    }
                    After::Hold => {
                        let records = records.clone();
                        tokio::spawn(async move {
                            loop {
                                tokio::select! {
                                    msg = ws.next() => {
                                        match msg {
                                            Some(Ok(msg)) if !msg.is_close() => continue,
                                            _ => break,
                                        }
                                    }
                                    Some(frame) = rx.recv() => {
                                        if ws.send(Message::Text(frame)).await.is_err() {
                                            break;
                                        }
                                    }
                                }
                            }
                            records.lock().unwrap()[index].closed_by_client = true;
                        });
                    }
                }
            }
        });

        Self {
            url,
            connections,
            pushers,
        }
    }

    pub fn records(&self) -> Vec<ConnectionRecord> {
        self.connections.lock().unwrap().clone()
    }

    /// Accept index of the connection subscribed to `channel`
    pub fn connection_for(&self, channel: &str) -> usize {
        self.records()
            .iter()
            .position(|r| r.control_frames.get(1).map(|f| f["name"] == channel) == Some(true))
            .unwrap()
    }

    /// Send `frame` on a held connection, by accept order
    pub fn push(&self, connection: usize, frame: &str) {
        self.pushers.lock().unwrap()[connection]
            .send(frame.to_string())
            .unwrap();
    }
}

pub fn test_credentials() -> Credentials {
    Credentials {
        cf_clearance: SecretString::new("cf-clearance-token"),
        jwt: SecretString::new("header.payload.signature"),
    }
}

pub fn test_config(ws_endpoint: &str, data_dir: &Path) -> Config {
    Config {
        credentials: test_credentials(),
        ws_endpoint: ws_endpoint.to_string(),
        data_dir: data_dir.to_path_buf(),
        ..Config::default()
    }
}

/// An address nothing listens on
pub async fn unreachable_endpoint() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("ws://{}", addr)
}

/// Poll `check` until it holds or `limit` elapses
pub async fn wait_for<F: Fn() -> bool>(check: F, limit: Duration) -> bool {
    let deadline = tokio::time::Instant::now() + limit;
    while tokio::time::Instant::now() < deadline {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    check()
}

pub fn read_lines(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap_or_default()
        .lines()
        .map(|l| l.to_string())
        .collect()
}
