//! Protocol module - JSON message types for the remote pad
//!
//! Line-delimited JSON. Every message carries a `type` tag; client messages
//! also carry a `seq` that must strictly increase per connection.

use serde::{Deserialize, Serialize};

use crate::core::{ActiveSnapshot, CommandOutcome, GameOverReport, GameSnapshot, StartError};
use crate::types::{BOARD_HEIGHT, BOARD_WIDTH};

pub const PROTOCOL_VERSION: &str = "1.0.0";

// ============== Client -> Server Messages ==============

/// First message on a connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelloMessage {
    pub seq: u64,
    /// Free-form client name, for logs.
    #[serde(default)]
    pub client: String,
    /// Whether to stream a snapshot after every engine change.
    #[serde(default)]
    pub stream: bool,
}

/// Virtual pad button press (`up`, `down`, `left`, `right`, `a`, `b`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonMessage {
    pub seq: u64,
    pub button: String,
}

/// Named game command (`moveLeft`, `hardDrop`, `rotate`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionMessage {
    pub seq: u64,
    pub action: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartMessage {
    pub seq: u64,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetMessage {
    pub seq: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Hello(HelloMessage),
    Button(ButtonMessage),
    Action(ActionMessage),
    Start(StartMessage),
    Reset(ResetMessage),
}

impl ClientMessage {
    pub fn seq(&self) -> u64 {
        match self {
            ClientMessage::Hello(m) => m.seq,
            ClientMessage::Button(m) => m.seq,
            ClientMessage::Action(m) => m.seq,
            ClientMessage::Start(m) => m.seq,
            ClientMessage::Reset(m) => m.seq,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedMessage {
    Known(ClientMessage),
    /// Valid JSON object with an unrecognised `type`.
    Unknown { seq: u64 },
}

/// Parse one inbound line.
pub fn parse_message(json: &str) -> Result<ParsedMessage, serde_json::Error> {
    match serde_json::from_str::<ClientMessage>(json) {
        Ok(m) => Ok(ParsedMessage::Known(m)),
        Err(e) => {
            #[derive(Debug, Deserialize)]
            struct Header<'a> {
                #[serde(rename = "type", borrow)]
                msg_type: Option<&'a str>,
                seq: Option<u64>,
            }
            let header = serde_json::from_str::<Header>(json)?;
            match header.msg_type {
                Some("hello" | "button" | "action" | "start" | "reset") | None => Err(e),
                Some(_) => Ok(ParsedMessage::Unknown {
                    seq: header.seq.unwrap_or(0),
                }),
            }
        }
    }
}

/// Pull `seq` out of a line that failed to parse, if it is there at all.
pub fn extract_seq_best_effort(s: &str) -> Option<u64> {
    let start = s.find("\"seq\"")?;
    let rest = s[start + 5..].trim_start().strip_prefix(':')?.trim_start();
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    rest[..end].parse().ok()
}

// ============== Server -> Client Messages ==============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSize {
    pub width: u8,
    pub height: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WelcomeMessage {
    pub seq: u64,
    pub protocol_version: String,
    pub board: BoardSize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AckStatus {
    Ok,
    Blocked,
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AckMessage {
    pub seq: u64,
    pub status: AckStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    HandshakeRequired,
    InvalidSeq,
    InvalidMessage,
    MissingName,
    Backpressure,
    EngineClosed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorMessage {
    pub seq: u64,
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivePieceMessage {
    pub kind: String,
    pub x: i8,
    pub y: i8,
    pub color: [u8; 3],
    /// 0/1 occupancy rows of the current orientation.
    pub shape: Vec<Vec<u8>>,
}

impl From<&ActiveSnapshot> for ActivePieceMessage {
    fn from(a: &ActiveSnapshot) -> Self {
        Self {
            kind: a.kind.as_str().to_string(),
            x: a.x,
            y: a.y,
            color: [a.color.r, a.color.g, a.color.b],
            shape: a.shape.rows(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotMessage {
    /// Server-side counter of published snapshots.
    pub seq: u64,
    pub phase: String,
    pub session_id: u32,
    pub piece_id: u32,
    pub score: u32,
    pub lines: u32,
    pub level: u32,
    pub gravity_ms: f64,
    pub player: String,
    /// Row-major, 0 = clear, 1..=7 = merged piece code.
    pub board: Vec<[u8; BOARD_WIDTH as usize]>,
    pub active: Option<ActivePieceMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closing_message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverMessage {
    pub session_id: u32,
    pub player: String,
    pub score: u32,
    pub lines: u32,
    pub level: u32,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Welcome(WelcomeMessage),
    Ack(AckMessage),
    Error(ErrorMessage),
    Snapshot(SnapshotMessage),
    Over(OverMessage),
}

// ============== Utility Functions ==============

pub fn create_welcome(seq: u64) -> ServerMessage {
    ServerMessage::Welcome(WelcomeMessage {
        seq,
        protocol_version: PROTOCOL_VERSION.to_string(),
        board: BoardSize {
            width: BOARD_WIDTH,
            height: BOARD_HEIGHT,
        },
    })
}

pub fn create_ack(seq: u64, status: AckStatus) -> ServerMessage {
    ServerMessage::Ack(AckMessage { seq, status })
}

pub fn create_error(seq: u64, code: ErrorCode, message: &str) -> ServerMessage {
    ServerMessage::Error(ErrorMessage {
        seq,
        code,
        message: message.to_string(),
    })
}

/// Reply for an engine outcome.
pub fn outcome_reply(seq: u64, outcome: CommandOutcome) -> ServerMessage {
    match outcome {
        CommandOutcome::Applied => create_ack(seq, AckStatus::Ok),
        CommandOutcome::Blocked => create_ack(seq, AckStatus::Blocked),
        CommandOutcome::Ignored => create_ack(seq, AckStatus::Ignored),
        CommandOutcome::Rejected(StartError::MissingName) => create_error(
            seq,
            ErrorCode::MissingName,
            StartError::MissingName.message(),
        ),
        CommandOutcome::Rejected(StartError::NotIdle) => create_ack(seq, AckStatus::Ignored),
    }
}

pub fn build_snapshot(snap: &GameSnapshot, seq: u64) -> ServerMessage {
    ServerMessage::Snapshot(SnapshotMessage {
        seq,
        phase: snap.phase.as_str().to_string(),
        session_id: snap.session_id,
        piece_id: snap.piece_id,
        score: snap.score,
        lines: snap.lines,
        level: snap.level,
        gravity_ms: snap.gravity_ms,
        player: snap.player.clone(),
        board: snap.board.to_vec(),
        active: snap.active.as_ref().map(ActivePieceMessage::from),
        closing_message: snap.closing_message.clone(),
    })
}

pub fn build_over(report: &GameOverReport) -> ServerMessage {
    ServerMessage::Over(OverMessage {
        session_id: report.session_id,
        player: report.player.clone(),
        score: report.score,
        lines: report.lines,
        level: report.level,
        message: report.message.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{GameState, PieceGenerator};
    use crate::types::PieceKind;

    #[test]
    fn test_parse_hello() {
        let parsed =
            parse_message(r#"{"type":"hello","seq":1,"client":"phone","stream":true}"#).unwrap();
        assert_eq!(
            parsed,
            ParsedMessage::Known(ClientMessage::Hello(HelloMessage {
                seq: 1,
                client: "phone".to_string(),
                stream: true,
            }))
        );
    }

    #[test]
    fn test_parse_defaults() {
        let parsed = parse_message(r#"{"type":"hello","seq":1}"#).unwrap();
        let ParsedMessage::Known(ClientMessage::Hello(h)) = parsed else {
            panic!("expected hello");
        };
        assert!(!h.stream);
        assert_eq!(h.client, "");

        let parsed = parse_message(r#"{"type":"start","seq":4}"#).unwrap();
        assert_eq!(
            parsed,
            ParsedMessage::Known(ClientMessage::Start(StartMessage {
                seq: 4,
                name: String::new()
            }))
        );
    }

    #[test]
    fn test_parse_commands() {
        let b = parse_message(r#"{"type":"button","seq":2,"button":"left"}"#).unwrap();
        assert!(matches!(b, ParsedMessage::Known(ClientMessage::Button(ref m)) if m.button == "left"));

        let a = parse_message(r#"{"type":"action","seq":3,"action":"hardDrop"}"#).unwrap();
        assert!(matches!(a, ParsedMessage::Known(ClientMessage::Action(ref m)) if m.action == "hardDrop"));

        let r = parse_message(r#"{"type":"reset","seq":5}"#).unwrap();
        assert_eq!(r, ParsedMessage::Known(ClientMessage::Reset(ResetMessage { seq: 5 })));
    }

    #[test]
    fn test_unknown_type_is_not_a_parse_error() {
        let parsed = parse_message(r#"{"type":"dance","seq":9}"#).unwrap();
        assert_eq!(parsed, ParsedMessage::Unknown { seq: 9 });
    }

    #[test]
    fn test_malformed_known_type_is_an_error() {
        assert!(parse_message(r#"{"type":"button","seq":2}"#).is_err());
        assert!(parse_message("not json").is_err());
        assert!(parse_message(r#"{"seq":2}"#).is_err());
    }

    #[test]
    fn test_extract_seq_best_effort() {
        assert_eq!(extract_seq_best_effort(r#"{"type":"button","seq": 12,"#), Some(12));
        assert_eq!(extract_seq_best_effort(r#"{"seq":7}"#), Some(7));
        assert_eq!(extract_seq_best_effort("garbage"), None);
    }

    #[test]
    fn test_server_messages_are_tagged() {
        let v = serde_json::to_value(create_ack(3, AckStatus::Blocked)).unwrap();
        assert_eq!(v["type"], "ack");
        assert_eq!(v["status"], "blocked");

        let v = serde_json::to_value(create_error(4, ErrorCode::InvalidSeq, "x")).unwrap();
        assert_eq!(v["type"], "error");
        assert_eq!(v["code"], "invalid_seq");

        let v = serde_json::to_value(create_welcome(1)).unwrap();
        assert_eq!(v["board"]["width"], 10);
        assert_eq!(v["board"]["height"], 18);
    }

    #[test]
    fn test_outcome_reply() {
        assert_eq!(
            outcome_reply(1, CommandOutcome::Applied),
            create_ack(1, AckStatus::Ok)
        );
        let v = serde_json::to_value(outcome_reply(
            2,
            CommandOutcome::Rejected(StartError::MissingName),
        ))
        .unwrap();
        assert_eq!(v["code"], "missing_name");
        assert_eq!(v["message"], "Please enter your name first!");
    }

    #[test]
    fn test_build_snapshot() {
        let mut state = GameState::new(PieceGenerator::scripted(vec![PieceKind::I]));
        state.start("Ayu").unwrap();
        let v = serde_json::to_value(build_snapshot(&state.snapshot(), 8)).unwrap();

        assert_eq!(v["type"], "snapshot");
        assert_eq!(v["phase"], "playing");
        assert_eq!(v["player"], "Ayu");
        assert_eq!(v["board"].as_array().unwrap().len(), 18);
        assert_eq!(v["active"]["kind"], "i");
        assert_eq!(v["active"]["x"], 3);
        assert_eq!(v["active"]["shape"][1], serde_json::json!([1, 1, 1, 1]));
        assert!(v.get("closing_message").is_none());
    }
}
