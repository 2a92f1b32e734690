//! Engine task: exclusive owner of the session.
//!
//! Commands and gravity ticks are both handled by one `select!` loop, so every
//! transition runs to completion before the next one starts.

use tokio::sync::{broadcast, mpsc, oneshot, watch};

use gift_tetris_core::{CommandOutcome, GameSnapshot, GameState, PieceGenerator};

use crate::config::EngineConfig;
use crate::event_log::{spawn_event_log, EventRecord};
use crate::timer::GravityTimer;
use crate::types::GameCommand;
use crate::EngineEvent;

const EVENT_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineError {
    /// Command queue is full
    Backpressure,
    /// Engine task has stopped
    Closed,
}

impl EngineError {
    pub fn code(self) -> &'static str {
        match self {
            EngineError::Backpressure => "backpressure",
            EngineError::Closed => "engine_closed",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            EngineError::Backpressure => "command queue is full",
            EngineError::Closed => "engine is not running",
        }
    }
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for EngineError {}

/// Queued command, with a reply slot when the sender waits for the outcome.
#[derive(Debug)]
struct Envelope {
    command: GameCommand,
    reply: Option<oneshot::Sender<CommandOutcome>>,
}

/// Cloneable handle to a running engine.
///
/// The engine stops once every handle is dropped.
#[derive(Debug, Clone)]
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<Envelope>,
    snapshot_rx: watch::Receiver<GameSnapshot>,
    event_tx: broadcast::Sender<EngineEvent>,
}

impl EngineHandle {
    /// Queue a command without waiting.
    pub fn try_send(&self, command: GameCommand) -> Result<(), EngineError> {
        self.cmd_tx
            .try_send(Envelope {
                command,
                reply: None,
            })
            .map_err(|e| match e {
                mpsc::error::TrySendError::Full(_) => EngineError::Backpressure,
                mpsc::error::TrySendError::Closed(_) => EngineError::Closed,
            })
    }

    /// Queue a command, waiting for room in the queue.
    pub async fn send(&self, command: GameCommand) -> Result<(), EngineError> {
        self.cmd_tx
            .send(Envelope {
                command,
                reply: None,
            })
            .await
            .map_err(|_| EngineError::Closed)
    }

    /// Queue a command and wait until it has been applied.
    pub async fn request(&self, command: GameCommand) -> Result<CommandOutcome, EngineError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.cmd_tx
            .send(Envelope {
                command,
                reply: Some(reply_tx),
            })
            .await
            .map_err(|_| EngineError::Closed)?;
        reply_rx.await.map_err(|_| EngineError::Closed)
    }

    /// Queue a command without waiting for room; the outcome arrives later.
    pub fn try_request(&self, command: GameCommand) -> Result<PendingOutcome, EngineError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.cmd_tx
            .try_send(Envelope {
                command,
                reply: Some(reply_tx),
            })
            .map_err(|e| match e {
                mpsc::error::TrySendError::Full(_) => EngineError::Backpressure,
                mpsc::error::TrySendError::Closed(_) => EngineError::Closed,
            })?;
        Ok(PendingOutcome(reply_rx))
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> GameSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    pub fn watch(&self) -> watch::Receiver<GameSnapshot> {
        self.snapshot_rx.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.event_tx.subscribe()
    }
}

/// Outcome of a command queued with [`EngineHandle::try_request`].
#[derive(Debug)]
pub struct PendingOutcome(oneshot::Receiver<CommandOutcome>);

impl PendingOutcome {
    pub async fn outcome(self) -> Result<CommandOutcome, EngineError> {
        self.0.await.map_err(|_| EngineError::Closed)
    }
}

pub struct Engine {
    state: GameState,
    timer: GravityTimer,
    cmd_rx: mpsc::Receiver<Envelope>,
    snapshot_tx: watch::Sender<GameSnapshot>,
    event_tx: broadcast::Sender<EngineEvent>,
    log_tx: Option<mpsc::UnboundedSender<EventRecord>>,
}

impl Engine {
    /// Start the engine task on the current tokio runtime.
    pub fn spawn(config: EngineConfig, generator: PieceGenerator) -> EngineHandle {
        let state =
            GameState::new(generator).with_closing_template(config.closing_template.clone());

        let (cmd_tx, cmd_rx) = mpsc::channel::<Envelope>(config.max_pending.max(1));
        let (snapshot_tx, snapshot_rx) = watch::channel(state.snapshot());
        let (event_tx, _) = broadcast::channel::<EngineEvent>(EVENT_CHANNEL_CAPACITY);
        let log_tx = config.log_path.clone().map(|path| spawn_event_log(path).0);

        let engine = Engine {
            state,
            timer: GravityTimer::new(),
            cmd_rx,
            snapshot_tx,
            event_tx: event_tx.clone(),
            log_tx,
        };
        tokio::spawn(engine.run());

        EngineHandle {
            cmd_tx,
            snapshot_rx,
            event_tx,
        }
    }

    async fn run(mut self) {
        loop {
            tokio::select! {
                envelope = self.cmd_rx.recv() => match envelope {
                    Some(envelope) => self.handle_command(envelope),
                    None => break,
                },
                _ = self.timer.tick() => self.handle_gravity(),
            }
        }
        self.timer.disarm();
        eprintln!("[Engine] all handles dropped, stopping");
    }

    fn handle_command(&mut self, envelope: Envelope) {
        let outcome = self.state.apply(&envelope.command);
        if outcome == CommandOutcome::Applied {
            self.publish();
        }
        if let Some(reply) = envelope.reply {
            let _ = reply.send(outcome);
        }
    }

    fn handle_gravity(&mut self) {
        if !self.state.is_playing() {
            self.timer.disarm();
            return;
        }
        self.state.gravity_tick();
        self.publish();
    }

    /// Forward queued events, refresh the snapshot, then resync the timer.
    fn publish(&mut self) {
        for event in self.state.drain_events() {
            if let Some(tx) = self.log_tx.as_ref() {
                let _ = tx.send(EventRecord::from_event(&event));
            }
            // No subscribers is fine.
            let _ = self.event_tx.send(event);
        }

        let state = &self.state;
        self.snapshot_tx.send_modify(|s| state.snapshot_into(s));

        self.timer
            .sync(self.state.is_playing(), self.state.gravity_ms());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Phase, PieceKind};
    use std::time::Duration;

    fn spawn_scripted(kinds: Vec<PieceKind>) -> EngineHandle {
        Engine::spawn(EngineConfig::default(), PieceGenerator::scripted(kinds))
    }

    #[tokio::test(start_paused = true)]
    async fn start_requires_a_name() {
        let engine = spawn_scripted(vec![PieceKind::O]);
        let outcome = engine.request(GameCommand::Start("  ".into())).await.unwrap();
        assert_eq!(
            outcome,
            CommandOutcome::Rejected(gift_tetris_core::StartError::MissingName)
        );
        assert_eq!(engine.snapshot().phase, Phase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn gravity_ticks_once_per_second_at_level_one() {
        let engine = spawn_scripted(vec![PieceKind::O]);
        engine
            .request(GameCommand::Start("Ayu".into()))
            .await
            .unwrap();
        assert_eq!(engine.snapshot().active.unwrap().y, 0);

        tokio::time::sleep(Duration::from_millis(900)).await;
        assert_eq!(engine.snapshot().active.unwrap().y, 0);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(engine.snapshot().active.unwrap().y, 1);

        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert_eq!(engine.snapshot().active.unwrap().y, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn reset_cancels_gravity() {
        let engine = spawn_scripted(vec![PieceKind::T]);
        engine
            .request(GameCommand::Start("Ayu".into()))
            .await
            .unwrap();
        engine.request(GameCommand::Reset).await.unwrap();
        let before = engine.snapshot();
        assert_eq!(before.phase, Phase::Idle);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(engine.snapshot(), before);
    }

    #[tokio::test(start_paused = true)]
    async fn commands_in_idle_are_ignored() {
        let engine = spawn_scripted(vec![PieceKind::T]);
        assert_eq!(
            engine.request(GameCommand::MoveLeft).await.unwrap(),
            CommandOutcome::Ignored
        );
    }

    #[tokio::test(start_paused = true)]
    async fn stacking_to_the_top_ends_the_session() {
        let engine = spawn_scripted(vec![PieceKind::O]);
        let mut events = engine.subscribe();
        engine
            .request(GameCommand::Start("Ayu".into()))
            .await
            .unwrap();

        // Nine Os fill columns 4-5 to the top; the tenth spawns on top of them.
        for _ in 0..9 {
            engine.request(GameCommand::HardDrop).await.unwrap();
        }
        assert_eq!(engine.snapshot().phase, Phase::Playing);
        engine.request(GameCommand::SoftDrop).await.unwrap();

        let snap = engine.snapshot();
        assert_eq!(snap.phase, Phase::Over);
        assert!(snap.closing_message.unwrap().contains("Ayu"));

        let mut report = None;
        while let Ok(event) = events.try_recv() {
            if let EngineEvent::GameOver(r) = event {
                report = Some(r);
            }
        }
        let report = report.expect("game over event");
        assert_eq!(report.player, "Ayu");
        assert_eq!(report.score, 0);

        // Over is terminal: no gravity, no movement.
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(engine.snapshot().phase, Phase::Over);
        assert_eq!(
            engine.request(GameCommand::MoveLeft).await.unwrap(),
            CommandOutcome::Ignored
        );
    }

    #[tokio::test(start_paused = true)]
    async fn try_request_reports_the_outcome() {
        let engine = spawn_scripted(vec![PieceKind::O]);
        let pending = engine
            .try_request(GameCommand::Start("Ayu".into()))
            .unwrap();
        assert_eq!(pending.outcome().await, Ok(CommandOutcome::Applied));

        for _ in 0..4 {
            engine.request(GameCommand::MoveLeft).await.unwrap();
        }
        let pending = engine.try_request(GameCommand::MoveLeft).unwrap();
        assert_eq!(pending.outcome().await, Ok(CommandOutcome::Blocked));
    }

    #[tokio::test(start_paused = true)]
    async fn full_queue_reports_backpressure() {
        let config = EngineConfig {
            max_pending: 1,
            ..EngineConfig::default()
        };
        let engine = Engine::spawn(config, PieceGenerator::scripted(vec![PieceKind::O]));
        // The engine task has not run yet, so the second command finds the queue full.
        engine.try_send(GameCommand::MoveLeft).unwrap();
        assert_eq!(
            engine.try_send(GameCommand::MoveLeft),
            Err(EngineError::Backpressure)
        );
    }
}
