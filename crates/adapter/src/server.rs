//! TCP server for the remote pad
//!
//! Handles incoming connections and manages client lifecycle.
//! Uses tokio for async networking; every command goes through the engine
//! handle, so remote presses are serialized with local input and gravity.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{broadcast, mpsc, oneshot};

use crate::engine::{EngineError, EngineEvent, EngineHandle};
use crate::input::{Button, PadInput, Screen, VirtualPad};
use crate::protocol::*;
use crate::types::GameCommand;

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Print connection lifecycle lines on stderr.
    pub log_connections: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7878,
            log_connections: true,
        }
    }
}

impl ServerConfig {
    /// Create from `GIFT_PAD_HOST` / `GIFT_PAD_PORT`
    pub fn from_env() -> Self {
        use std::env;

        let defaults = Self::default();
        let host = env::var("GIFT_PAD_HOST")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.host);
        let port = env::var("GIFT_PAD_PORT")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.port);

        Self {
            host,
            port,
            log_connections: defaults.log_connections,
        }
    }

    /// Check if the pad server is disabled via `GIFT_PAD_DISABLED`
    pub fn is_disabled() -> bool {
        std::env::var("GIFT_PAD_DISABLED")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }

    /// Bind target; `host` may be an IP address or a resolvable name.
    pub fn bind_target(&self) -> (&str, u16) {
        (self.host.as_str(), self.port)
    }
}

/// Live connection count, readable from the UI thread.
#[derive(Debug, Clone, Default)]
pub struct PadStatus {
    clients: Arc<AtomicUsize>,
}

impl PadStatus {
    pub fn clients(&self) -> usize {
        self.clients.load(Ordering::Relaxed)
    }
}

/// Per-connection protocol state.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ClientSession {
    pub handshaken: bool,
    pub stream: bool,
    pub last_seq: Option<u64>,
}

impl ClientSession {
    /// Accept `seq` only if it is greater than every earlier one.
    pub fn check_and_update_seq(&mut self, seq: u64) -> bool {
        match self.last_seq {
            Some(prev) if seq <= prev => false,
            _ => {
                self.last_seq = Some(seq);
                true
            }
        }
    }
}

/// Map a pad message to an engine command.
///
/// `Ok(None)` means the message is valid but maps to nothing (`noop`, unknown
/// action name), which is acknowledged as ignored.
pub fn map_message(
    pad: &VirtualPad,
    msg: &ClientMessage,
) -> Result<Option<GameCommand>, (ErrorCode, String)> {
    match msg {
        ClientMessage::Hello(_) => Ok(None),
        ClientMessage::Button(m) => match Button::from_str(&m.button) {
            Some(button) => Ok(match pad.press(button) {
                PadInput::Command(cmd) => Some(cmd),
                PadInput::Noop => None,
            }),
            None => Err((
                ErrorCode::InvalidMessage,
                format!("Unknown button: {}", m.button),
            )),
        },
        ClientMessage::Action(m) => Ok(GameCommand::from_str(&m.action)),
        ClientMessage::Start(m) => Ok(Some(GameCommand::Start(m.name.clone()))),
        ClientMessage::Reset(_) => Ok(Some(GameCommand::Reset)),
    }
}

/// Start the TCP server
///
/// Runs until the listener fails. `ready_tx` receives the bound address, which
/// is useful with port 0.
pub async fn run_server(
    config: ServerConfig,
    engine: EngineHandle,
    status: PadStatus,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind(config.bind_target())
        .await
        .with_context(|| format!("binding pad server on {}:{}", config.host, config.port))?;
    let bound = listener.local_addr()?;
    if config.log_connections {
        eprintln!("[Pad] listening on {}", bound);
    }
    if let Some(tx) = ready_tx {
        let _ = tx.send(bound);
    }

    let mut client_id_counter = 0usize;

    loop {
        let (socket, peer) = listener.accept().await?;
        client_id_counter += 1;
        let client_id = client_id_counter;
        let log = config.log_connections;

        if log {
            eprintln!("[Pad] client {} connected from {}", client_id, peer);
        }

        let engine = engine.clone();
        let status = status.clone();
        tokio::spawn(async move {
            status.clients.fetch_add(1, Ordering::Relaxed);
            if let Err(e) = handle_client(socket, engine).await {
                if log {
                    eprintln!("[Pad] client {} error: {}", client_id, e);
                }
            }
            status.clients.fetch_sub(1, Ordering::Relaxed);
            if log {
                eprintln!("[Pad] client {} disconnected", client_id);
            }
        });
    }
}

/// Handle a single client connection
async fn handle_client(socket: TcpStream, engine: EngineHandle) -> anyhow::Result<()> {
    let (reader, mut writer) = socket.into_split();
    let mut reader = BufReader::new(reader);

    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();

    let write_task = tokio::spawn(async move {
        let mut buf: Vec<u8> = Vec::with_capacity(4096);
        while let Some(msg) = rx.recv().await {
            buf.clear();
            if serde_json::to_writer(&mut buf, &msg).is_err() {
                continue;
            }
            buf.push(b'\n');
            if writer.write_all(&buf).await.is_err() {
                break;
            }
            if writer.flush().await.is_err() {
                break;
            }
        }
    });

    let pad = VirtualPad::new(Screen::Tetris);
    let mut session = ClientSession::default();
    let mut forwarder: Option<tokio::task::JoinHandle<()>> = None;
    let mut line = String::new();

    loop {
        line.clear();
        if reader.read_line(&mut line).await? == 0 {
            break;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let msg = match parse_message(trimmed) {
            Ok(ParsedMessage::Known(msg)) => msg,
            Ok(ParsedMessage::Unknown { seq }) => {
                if session.handshaken && !session.check_and_update_seq(seq) {
                    let _ = tx.send(create_error(
                        seq,
                        ErrorCode::InvalidSeq,
                        "seq must be strictly increasing",
                    ));
                    continue;
                }
                let _ = tx.send(create_error(seq, ErrorCode::InvalidMessage, "Unknown message type"));
                continue;
            }
            Err(e) => {
                let seq = extract_seq_best_effort(trimmed).unwrap_or(0);
                let _ = tx.send(create_error(
                    seq,
                    ErrorCode::InvalidMessage,
                    &format!("JSON parse error: {}", e),
                ));
                continue;
            }
        };

        let seq = msg.seq();

        if let ClientMessage::Hello(hello) = &msg {
            if session.handshaken && !session.check_and_update_seq(seq) {
                let _ = tx.send(create_error(
                    seq,
                    ErrorCode::InvalidSeq,
                    "seq must be strictly increasing",
                ));
                continue;
            }
            session.handshaken = true;
            session.last_seq = Some(seq);
            session.stream = hello.stream;

            let _ = tx.send(create_welcome(seq));

            if let Some(task) = forwarder.take() {
                task.abort();
            }
            forwarder = Some(spawn_forwarder(&engine, tx.clone(), session.stream));
            continue;
        }

        if !session.handshaken {
            let _ = tx.send(create_error(
                seq,
                ErrorCode::HandshakeRequired,
                "Send hello first",
            ));
            continue;
        }

        if !session.check_and_update_seq(seq) {
            let _ = tx.send(create_error(
                seq,
                ErrorCode::InvalidSeq,
                "seq must be strictly increasing",
            ));
            continue;
        }

        let command = match map_message(&pad, &msg) {
            Ok(Some(command)) => command,
            Ok(None) => {
                let _ = tx.send(create_ack(seq, AckStatus::Ignored));
                continue;
            }
            Err((code, message)) => {
                let _ = tx.send(create_error(seq, code, &message));
                continue;
            }
        };

        // Backpressure: bounded engine queue.
        let reply = match engine.try_request(command) {
            Ok(pending) => match pending.outcome().await {
                Ok(outcome) => outcome_reply(seq, outcome),
                Err(e) => engine_error(seq, e),
            },
            Err(e) => engine_error(seq, e),
        };
        let _ = tx.send(reply);
    }

    if let Some(task) = forwarder.take() {
        task.abort();
    }
    drop(tx);
    let _ = write_task.await;

    Ok(())
}

fn engine_error(seq: u64, e: EngineError) -> ServerMessage {
    let code = match e {
        EngineError::Backpressure => ErrorCode::Backpressure,
        EngineError::Closed => ErrorCode::EngineClosed,
    };
    create_error(seq, code, e.message())
}

/// Push engine output to one client: game-over reports always, snapshots
/// only when the client asked to stream.
fn spawn_forwarder(
    engine: &EngineHandle,
    tx: mpsc::UnboundedSender<ServerMessage>,
    stream: bool,
) -> tokio::task::JoinHandle<()> {
    let mut snapshots = engine.watch();
    let mut events = engine.subscribe();

    tokio::spawn(async move {
        let mut snapshot_seq = 0u64;

        if stream {
            snapshot_seq += 1;
            let msg = build_snapshot(&snapshots.borrow_and_update(), snapshot_seq);
            if tx.send(msg).is_err() {
                return;
            }
        }

        loop {
            tokio::select! {
                changed = snapshots.changed(), if stream => {
                    if changed.is_err() {
                        break;
                    }
                    snapshot_seq += 1;
                    let msg = build_snapshot(&snapshots.borrow_and_update(), snapshot_seq);
                    if tx.send(msg).is_err() {
                        break;
                    }
                }
                event = events.recv() => match event {
                    Ok(EngineEvent::GameOver(report)) => {
                        if tx.send(build_over(&report)).is_err() {
                            break;
                        }
                    }
                    Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => {}
                    Err(broadcast::error::RecvError::Closed) => break,
                },
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seq_must_increase() {
        let mut session = ClientSession::default();
        assert!(session.check_and_update_seq(1));
        assert!(session.check_and_update_seq(5));
        assert!(!session.check_and_update_seq(5));
        assert!(!session.check_and_update_seq(2));
        assert!(session.check_and_update_seq(6));
    }

    #[test]
    fn test_map_message() {
        let pad = VirtualPad::new(Screen::Tetris);
        let button = ClientMessage::Button(ButtonMessage {
            seq: 1,
            button: "up".to_string(),
        });
        assert_eq!(map_message(&pad, &button), Ok(Some(GameCommand::HardDrop)));

        let unknown = ClientMessage::Button(ButtonMessage {
            seq: 2,
            button: "select".to_string(),
        });
        assert!(matches!(
            map_message(&pad, &unknown),
            Err((ErrorCode::InvalidMessage, _))
        ));

        let noop = ClientMessage::Action(ActionMessage {
            seq: 3,
            action: "noop".to_string(),
        });
        assert_eq!(map_message(&pad, &noop), Ok(None));

        let rotate = ClientMessage::Action(ActionMessage {
            seq: 4,
            action: "rotate".to_string(),
        });
        assert_eq!(map_message(&pad, &rotate), Ok(Some(GameCommand::RotateCw)));
    }

    #[test]
    fn test_buttons_off_the_tetris_screen_are_noop() {
        let pad = VirtualPad::new(Screen::Gallery);
        let button = ClientMessage::Button(ButtonMessage {
            seq: 1,
            button: "a".to_string(),
        });
        assert_eq!(map_message(&pad, &button), Ok(None));
    }

    #[test]
    fn test_server_config_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_target(), ("127.0.0.1", 7878));
        assert!(config.log_connections);
    }

    async fn bind_with_host(host: &str) -> anyhow::Result<SocketAddr> {
        let engine = crate::engine::Engine::spawn(
            crate::engine::EngineConfig::default(),
            crate::core::PieceGenerator::uniform(1),
        );
        let config = ServerConfig {
            host: host.to_string(),
            port: 0,
            log_connections: false,
        };
        let (ready_tx, ready_rx) = oneshot::channel();
        let server = tokio::spawn(run_server(
            config,
            engine,
            PadStatus::default(),
            Some(ready_tx),
        ));
        match ready_rx.await {
            Ok(addr) => {
                server.abort();
                Ok(addr)
            }
            Err(_) => match server.await? {
                Err(e) => Err(e),
                Ok(()) => anyhow::bail!("server exited without binding"),
            },
        }
    }

    #[tokio::test]
    async fn test_host_names_are_resolved() {
        let addr = bind_with_host("localhost").await.unwrap();
        assert!(addr.ip().is_loopback());
        assert_ne!(addr.port(), 0);
    }

    #[tokio::test]
    async fn test_unresolvable_host_fails_to_bind() {
        let err = bind_with_host("not a host").await.unwrap_err();
        assert!(format!("{:#}", err).contains("binding pad server on not a host:0"));
    }
}
