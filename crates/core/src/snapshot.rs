//! Snapshot module - read-only views of a session
//!
//! Renderers and remote clients never touch [`GameState`](crate::GameState);
//! they read a [`GameSnapshot`] written after every state change.

use crate::pieces::{Piece, ShapeMatrix};
use crate::types::{Phase, PieceKind, Rgb, BASE_GRAVITY_MS, BOARD_HEIGHT, BOARD_WIDTH, START_LEVEL};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActiveSnapshot {
    pub kind: PieceKind,
    pub shape: ShapeMatrix,
    pub color: Rgb,
    pub x: i8,
    pub y: i8,
}

impl From<Piece> for ActiveSnapshot {
    fn from(value: Piece) -> Self {
        Self {
            kind: value.kind,
            shape: value.shape,
            color: value.color(),
            x: value.x,
            y: value.y,
        }
    }
}

impl ActiveSnapshot {
    /// Absolute board coordinates of the occupied cells.
    pub fn cells(&self) -> impl Iterator<Item = (i8, i8)> + '_ {
        self.shape
            .occupied()
            .map(move |(dx, dy)| (self.x + dx, self.y + dy))
    }
}

/// Read-only view of a session, published after every state change.
#[derive(Debug, Clone, PartialEq)]
pub struct GameSnapshot {
    pub board: [[u8; BOARD_WIDTH as usize]; BOARD_HEIGHT as usize],
    pub active: Option<ActiveSnapshot>,
    pub phase: Phase,
    pub session_id: u32,
    pub piece_id: u32,
    pub score: u32,
    pub lines: u32,
    pub level: u32,
    pub gravity_ms: f64,
    pub player: String,
    pub closing_message: Option<String>,
}

impl GameSnapshot {
    /// Back to the idle, empty-board state.
    pub fn clear(&mut self) {
        self.board = [[0u8; BOARD_WIDTH as usize]; BOARD_HEIGHT as usize];
        self.active = None;
        self.phase = Phase::Idle;
        self.session_id = 0;
        self.piece_id = 0;
        self.score = 0;
        self.lines = 0;
        self.level = START_LEVEL;
        self.gravity_ms = BASE_GRAVITY_MS;
        self.player.clear();
        self.closing_message = None;
    }

    /// Merged piece kind at (x, y), if any.
    pub fn cell(&self, x: usize, y: usize) -> Option<PieceKind> {
        self.board
            .get(y)
            .and_then(|row| row.get(x))
            .and_then(|v| PieceKind::from_code(*v))
    }
}

impl Default for GameSnapshot {
    fn default() -> Self {
        Self {
            board: [[0u8; BOARD_WIDTH as usize]; BOARD_HEIGHT as usize],
            active: None,
            phase: Phase::Idle,
            session_id: 0,
            piece_id: 0,
            score: 0,
            lines: 0,
            level: START_LEVEL,
            gravity_ms: BASE_GRAVITY_MS,
            player: String::new(),
            closing_message: None,
        }
    }
}
