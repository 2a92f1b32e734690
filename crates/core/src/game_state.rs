//! Game state module - the session state machine
//!
//! This module ties together the board, the active piece, the piece generator
//! and scoring. Every public operation is one atomic transition: it reads the
//! board and piece, decides, and writes the result before returning. Timing is
//! not handled here; whoever owns the session calls [`GameState::gravity_tick`]
//! at [`GameState::gravity_ms`] intervals.

use arrayvec::ArrayVec;

use crate::board::{collides, settle, Board};
use crate::pieces::{try_rotate, Piece};
use crate::rng::PieceGenerator;
use crate::scoring::{calculate_line_score, gravity_interval_ms, next_level};
use crate::snapshot::{ActiveSnapshot, GameSnapshot};
use crate::types::*;

/// Closing dedication shown after a top out; `{name}` is replaced by the player.
pub const DEFAULT_CLOSING_TEMPLATE: &str =
    "INGET YA {name}! walaupun kamu kalah, tapi kamu selalu menang kok di hati aku, HEHE I LOVE YOU <3";

const EVENT_CAPACITY: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartError {
    /// Name was empty (or only whitespace)
    MissingName,
    /// A session is already running or has ended without a reset
    NotIdle,
}

impl StartError {
    pub fn code(self) -> &'static str {
        match self {
            StartError::MissingName => "missing_name",
            StartError::NotIdle => "not_idle",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            StartError::MissingName => MISSING_NAME_MESSAGE,
            StartError::NotIdle => "a session is already in progress",
        }
    }
}

/// What a command did to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// State changed
    Applied,
    /// Move or rotation would collide; nothing changed
    Blocked,
    /// Not valid in the current phase; nothing changed
    Ignored,
    /// Start precondition failed; session stays idle
    Rejected(StartError),
}

/// Final numbers handed to the host when a session tops out.
#[derive(Debug, Clone, PartialEq)]
pub struct GameOverReport {
    pub session_id: u32,
    pub player: String,
    pub score: u32,
    pub lines: u32,
    pub level: u32,
    pub message: String,
}

/// Transition notices, queued until an observer drains them.
#[derive(Debug, Clone, PartialEq)]
pub enum CoreEvent {
    Started { session_id: u32, player: String },
    Settled { lines_cleared: u32, points: u32, score: u32 },
    LevelUp { level: u32, gravity_ms: f64 },
    GameOver(GameOverReport),
    Reset,
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    board: Board,
    active: Option<Piece>,
    generator: PieceGenerator,
    phase: Phase,
    player: String,
    score: u32,
    lines: u32,
    level: u32,
    gravity_ms: f64,
    /// Monotonic session id (increments on every successful start).
    session_id: u32,
    /// Monotonic id for spawned pieces within the process.
    piece_id: u32,
    closing_template: String,
    closing_message: Option<String>,
    events: ArrayVec<CoreEvent, EVENT_CAPACITY>,
}

/// Closing line for a finished session.
///
/// Without a captured name this is the validation text instead.
pub fn compose_closing_message(template: &str, player: &str) -> String {
    let name = player.trim();
    if name.is_empty() {
        return MISSING_NAME_MESSAGE.to_string();
    }
    template.replace("{name}", name)
}

impl GameState {
    /// Create an idle session drawing pieces from `generator`
    pub fn new(generator: PieceGenerator) -> Self {
        Self {
            board: Board::new(),
            active: None,
            generator,
            phase: Phase::Idle,
            player: String::new(),
            score: 0,
            lines: 0,
            level: START_LEVEL,
            gravity_ms: BASE_GRAVITY_MS,
            session_id: 0,
            piece_id: 0,
            closing_template: DEFAULT_CLOSING_TEMPLATE.to_string(),
            closing_message: None,
            events: ArrayVec::new(),
        }
    }

    /// Create an idle session with a seeded uniform generator
    pub fn with_seed(seed: u32) -> Self {
        Self::new(PieceGenerator::uniform(seed))
    }

    pub fn with_closing_template(mut self, template: impl Into<String>) -> Self {
        self.closing_template = template.into();
        self
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_playing(&self) -> bool {
        self.phase == Phase::Playing
    }

    pub fn game_over(&self) -> bool {
        self.phase == Phase::Over
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn lines(&self) -> u32 {
        self.lines
    }

    pub fn gravity_ms(&self) -> f64 {
        self.gravity_ms
    }

    pub fn player(&self) -> &str {
        &self.player
    }

    pub fn session_id(&self) -> u32 {
        self.session_id
    }

    pub fn piece_id(&self) -> u32 {
        self.piece_id
    }

    pub fn closing_message(&self) -> Option<&str> {
        self.closing_message.as_deref()
    }

    pub fn active(&self) -> Option<Piece> {
        self.active
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    #[cfg(test)]
    pub(crate) fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    #[cfg(test)]
    pub(crate) fn active_mut(&mut self) -> Option<&mut Piece> {
        self.active.as_mut()
    }

    /// Take every queued event, oldest first.
    pub fn drain_events(&mut self) -> impl Iterator<Item = CoreEvent> + '_ {
        self.events.drain(..)
    }

    fn push_event(&mut self, event: CoreEvent) {
        // Without an observer the queue fills up; later events are dropped.
        let _ = self.events.try_push(event);
    }

    pub fn snapshot_into(&self, out: &mut GameSnapshot) {
        self.board.write_u8_grid(&mut out.board);

        out.active = if self.is_playing() {
            self.active.map(ActiveSnapshot::from)
        } else {
            None
        };
        out.phase = self.phase;
        out.session_id = self.session_id;
        out.piece_id = self.piece_id;
        out.score = self.score;
        out.level = self.level;
        out.lines = self.lines;
        out.gravity_ms = self.gravity_ms;
        out.player.clone_from(&self.player);
        out.closing_message.clone_from(&self.closing_message);
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let mut s = GameSnapshot::default();
        self.snapshot_into(&mut s);
        s
    }

    /// Begin a session for `name`.
    ///
    /// Only valid from idle. Resets board, score, lines and level, seeds the
    /// gravity interval and spawns the first piece.
    pub fn start(&mut self, name: &str) -> Result<(), StartError> {
        if self.phase != Phase::Idle {
            return Err(StartError::NotIdle);
        }
        let name = name.trim();
        if name.is_empty() {
            return Err(StartError::MissingName);
        }

        self.player = name.to_string();
        self.board = Board::new();
        self.score = 0;
        self.lines = 0;
        self.level = START_LEVEL;
        self.gravity_ms = BASE_GRAVITY_MS;
        self.closing_message = None;
        self.session_id = self.session_id.wrapping_add(1);
        self.spawn_piece();
        self.phase = Phase::Playing;

        self.push_event(CoreEvent::Started {
            session_id: self.session_id,
            player: self.player.clone(),
        });
        Ok(())
    }

    /// Return to idle from any phase. The last player name is kept.
    pub fn reset(&mut self) {
        self.phase = Phase::Idle;
        self.board.clear();
        self.active = None;
        self.score = 0;
        self.lines = 0;
        self.level = START_LEVEL;
        self.gravity_ms = BASE_GRAVITY_MS;
        self.closing_message = None;
        self.push_event(CoreEvent::Reset);
    }

    /// Replace the active piece with a fresh one at the spawn position.
    fn spawn_piece(&mut self) {
        let kind = self.generator.draw();
        self.active = Some(Piece::spawn(kind));
        self.piece_id = self.piece_id.wrapping_add(1);
    }

    /// Shift the active piece one column; `dir` is -1 or +1.
    pub fn move_horizontal(&mut self, dir: i8) -> bool {
        if !self.is_playing() {
            return false;
        }
        let Some(active) = self.active.as_mut() else {
            return false;
        };
        if collides(active, &self.board, (dir, 0)) {
            return false;
        }
        active.x += dir;
        true
    }

    /// One row of gravity (also the soft drop command).
    ///
    /// Returns true if the piece moved down. When blocked on the spawn row the
    /// session tops out without settling; otherwise the piece lands and settles.
    pub fn gravity_tick(&mut self) -> bool {
        if !self.is_playing() {
            return false;
        }
        let Some(active) = self.active.as_mut() else {
            return false;
        };

        if !collides(active, &self.board, (0, 1)) {
            active.y += 1;
            active.collided = false;
            return true;
        }

        if active.y < 1 {
            self.top_out();
            return false;
        }

        active.collided = true;
        self.resolve_landing();
        false
    }

    /// Alias of [`GameState::gravity_tick`] for player input.
    pub fn soft_drop(&mut self) -> bool {
        self.gravity_tick()
    }

    /// Drop to the lowest free offset and settle in one step.
    ///
    /// Returns the number of rows fallen. A piece that already overlaps the
    /// stack has no free offset; it is left for the next gravity tick.
    pub fn hard_drop(&mut self) -> u32 {
        if !self.is_playing() || self.active_overlaps_stack() {
            return 0;
        }
        let Some(active) = self.active.as_mut() else {
            return 0;
        };

        let mut distance: i8 = 0;
        while !collides(active, &self.board, (0, distance + 1)) {
            distance += 1;
        }
        active.y += distance;
        active.collided = true;

        self.resolve_landing();
        distance as u32
    }

    /// Whether the active piece sits on merged cells (a spawn into the stack).
    fn active_overlaps_stack(&self) -> bool {
        self.active
            .map(|p| collides(&p, &self.board, (0, 0)))
            .unwrap_or(false)
    }

    /// Rotate with the alternating wall-kick search
    pub fn rotate(&mut self, clockwise: bool) -> bool {
        if !self.is_playing() {
            return false;
        }
        let Some(active) = self.active else {
            return false;
        };
        match try_rotate(&active, &self.board, clockwise) {
            Some(rotated) => {
                self.active = Some(rotated);
                true
            }
            None => false,
        }
    }

    /// Settle a piece flagged as collided.
    fn resolve_landing(&mut self) {
        if self.active.map(|p| p.collided).unwrap_or(false) {
            self.settle_active();
        }
    }

    /// Merge, clear lines, score, level up, then spawn the next piece.
    ///
    /// A spawn that overlaps the stack is left for the next gravity tick to
    /// detect as a top out.
    fn settle_active(&mut self) {
        let Some(piece) = self.active.take() else {
            return;
        };

        self.board = settle(&piece, &self.board);
        let cleared = self.board.sweep_full_rows();
        let lines_cleared = cleared.len();

        let points = calculate_line_score(lines_cleared, self.level);
        if lines_cleared > 0 {
            self.score = self.score.saturating_add(points);
            self.lines += lines_cleared as u32;
        }
        self.push_event(CoreEvent::Settled {
            lines_cleared: lines_cleared as u32,
            points,
            score: self.score,
        });

        let level = next_level(self.lines, self.level);
        if level != self.level {
            self.level = level;
            self.gravity_ms = gravity_interval_ms(level);
            self.push_event(CoreEvent::LevelUp {
                level,
                gravity_ms: self.gravity_ms,
            });
        }

        self.spawn_piece();
    }

    fn top_out(&mut self) {
        self.phase = Phase::Over;
        let message = compose_closing_message(&self.closing_template, &self.player);
        self.closing_message = Some(message.clone());
        self.push_event(CoreEvent::GameOver(GameOverReport {
            session_id: self.session_id,
            player: self.player.clone(),
            score: self.score,
            lines: self.lines,
            level: self.level,
            message,
        }));
    }

    /// Apply a command from any input source
    pub fn apply(&mut self, command: &GameCommand) -> CommandOutcome {
        let moved = |ok: bool| {
            if ok {
                CommandOutcome::Applied
            } else {
                CommandOutcome::Blocked
            }
        };

        match command {
            GameCommand::Start(name) => match self.start(name) {
                Ok(()) => CommandOutcome::Applied,
                Err(StartError::NotIdle) => CommandOutcome::Ignored,
                Err(e) => CommandOutcome::Rejected(e),
            },
            GameCommand::Reset => {
                self.reset();
                CommandOutcome::Applied
            }
            _ if !self.is_playing() => CommandOutcome::Ignored,
            GameCommand::MoveLeft => moved(self.move_horizontal(-1)),
            GameCommand::MoveRight => moved(self.move_horizontal(1)),
            GameCommand::RotateCw => moved(self.rotate(true)),
            GameCommand::RotateCcw => moved(self.rotate(false)),
            GameCommand::SoftDrop => {
                self.soft_drop();
                CommandOutcome::Applied
            }
            GameCommand::HardDrop if self.active_overlaps_stack() => CommandOutcome::Blocked,
            GameCommand::HardDrop => {
                self.hard_drop();
                CommandOutcome::Applied
            }
        }
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::with_seed(1)
    }
}
