//! JSONL event log.
//!
//! One line per engine event, written by a background task so the engine loop
//! never waits on the file system.

use anyhow::Context;
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::EngineEvent;

/// Flat, serializable form of an [`EngineEvent`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventRecord {
    pub ts: u64,
    pub event: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lines_cleared: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lines: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gravity_ms: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl EventRecord {
    fn empty(event: &'static str) -> Self {
        Self {
            ts: current_timestamp_ms(),
            event,
            session_id: None,
            player: None,
            lines_cleared: None,
            points: None,
            score: None,
            lines: None,
            level: None,
            gravity_ms: None,
            message: None,
        }
    }

    pub fn from_event(event: &EngineEvent) -> Self {
        match event {
            EngineEvent::Started { session_id, player } => Self {
                session_id: Some(*session_id),
                player: Some(player.clone()),
                ..Self::empty("started")
            },
            EngineEvent::Settled {
                lines_cleared,
                points,
                score,
            } => Self {
                lines_cleared: Some(*lines_cleared),
                points: Some(*points),
                score: Some(*score),
                ..Self::empty("settled")
            },
            EngineEvent::LevelUp { level, gravity_ms } => Self {
                level: Some(*level),
                gravity_ms: Some(*gravity_ms),
                ..Self::empty("level_up")
            },
            EngineEvent::GameOver(report) => Self {
                session_id: Some(report.session_id),
                player: Some(report.player.clone()),
                score: Some(report.score),
                lines: Some(report.lines),
                level: Some(report.level),
                message: Some(report.message.clone()),
                ..Self::empty("game_over")
            },
            EngineEvent::Reset => Self::empty("reset"),
        }
    }
}

/// Start the writer task appending records to `path`.
///
/// The task ends when every sender is dropped, or on the first I/O error.
pub fn spawn_event_log(path: String) -> (mpsc::UnboundedSender<EventRecord>, JoinHandle<()>) {
    let (tx, rx) = mpsc::unbounded_channel::<EventRecord>();
    let task = tokio::spawn(async move {
        if let Err(e) = write_records(&path, rx).await {
            eprintln!("[Engine] event log stopped: {:#}", e);
        }
    });
    (tx, task)
}

async fn write_records(
    path: &str,
    mut rx: mpsc::UnboundedReceiver<EventRecord>,
) -> anyhow::Result<()> {
    use tokio::fs::OpenOptions;
    use tokio::io::AsyncWriteExt;

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await
        .with_context(|| format!("opening {}", path))?;

    let mut buf: Vec<u8> = Vec::with_capacity(512);
    while let Some(rec) = rx.recv().await {
        buf.clear();
        if serde_json::to_writer(&mut buf, &rec).is_err() {
            continue;
        }
        buf.push(b'\n');
        file.write_all(&buf)
            .await
            .with_context(|| format!("writing {}", path))?;
        file.flush().await?;
    }
    Ok(())
}

fn current_timestamp_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
