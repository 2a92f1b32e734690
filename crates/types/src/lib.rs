//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the application.
//! All types are pure data structures with no external dependencies, making them
//! usable in any context (core logic, terminal rendering, remote pad protocol).
//!
//! # Board Dimensions
//!
//! The well is smaller than the guideline playfield:
//!
//! - **Width**: 10 columns (indexed 0-9)
//! - **Height**: 18 rows (indexed 0-17)
//! - **Spawn position**: horizontally centred on row 0
//!
//! # Timing
//!
//! | Level | Gravity interval |
//! |-------|------------------|
//! | 1 | 1000ms |
//! | 2 | ~322.58ms |
//! | 3 | ~243.90ms |
//! | n | `1000 / (n + 1.1)` ms |
//!
//! # Examples
//!
//! ```
//! use gift_tetris_types::{GameCommand, PieceKind, BOARD_HEIGHT, BOARD_WIDTH};
//!
//! assert_eq!(PieceKind::from_str("t"), Some(PieceKind::T));
//! assert_eq!(GameCommand::from_str("moveLeft"), Some(GameCommand::MoveLeft));
//! assert_eq!(GameCommand::from_str("noop"), None);
//!
//! assert_eq!(BOARD_WIDTH, 10);
//! assert_eq!(BOARD_HEIGHT, 18);
//! ```

/// Board width in cells (10 columns)
pub const BOARD_WIDTH: u8 = 10;

/// Board height in cells (18 rows)
pub const BOARD_HEIGHT: u8 = 18;

/// Gravity interval before the first level-up (1 row per second)
pub const BASE_GRAVITY_MS: f64 = 1000.0;

/// Cumulative cleared lines needed per level step
pub const LINES_PER_LEVEL: u32 = 10;

/// Level a fresh session starts on
pub const START_LEVEL: u32 = 1;

/// Line clear scoring table, indexed by `lines_cleared - 1`.
///
/// Multiplied by the current level. Counts outside the table score nothing.
pub const LINE_SCORES: [u32; 4] = [40, 100, 300, 1200];

/// Largest shape matrix in the catalog (the I piece is 4x4).
pub const MAX_SHAPE_SIZE: usize = 4;

/// Validation text shown when a session is started without a name.
pub const MISSING_NAME_MESSAGE: &str = "Please enter your name first!";

/// 24-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// The seven tetromino piece kinds
///
/// Each piece has a distinct shape and a fixed display color:
/// - **I**: cyan bar
/// - **J**: blue
/// - **L**: amber
/// - **O**: yellow 2x2 square
/// - **S**: green
/// - **T**: purple
/// - **Z**: red
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    I,
    J,
    L,
    O,
    S,
    T,
    Z,
}

impl PieceKind {
    /// Catalog order, used for uniform draws.
    pub const ALL: [PieceKind; 7] = [
        PieceKind::I,
        PieceKind::J,
        PieceKind::L,
        PieceKind::O,
        PieceKind::S,
        PieceKind::T,
        PieceKind::Z,
    ];

    /// Parse piece kind from string (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use gift_tetris_types::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_str("i"), Some(PieceKind::I));
    /// assert_eq!(PieceKind::from_str("O"), Some(PieceKind::O));
    /// assert_eq!(PieceKind::from_str("unknown"), None);
    /// ```
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "i" => Some(PieceKind::I),
            "j" => Some(PieceKind::J),
            "l" => Some(PieceKind::L),
            "o" => Some(PieceKind::O),
            "s" => Some(PieceKind::S),
            "t" => Some(PieceKind::T),
            "z" => Some(PieceKind::Z),
            _ => None,
        }
    }

    /// Convert to lowercase string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            PieceKind::I => "i",
            PieceKind::J => "j",
            PieceKind::L => "l",
            PieceKind::O => "o",
            PieceKind::S => "s",
            PieceKind::T => "t",
            PieceKind::Z => "z",
        }
    }

    /// Display color from the piece catalog.
    pub fn color(&self) -> Rgb {
        match self {
            PieceKind::I => Rgb::new(80, 227, 230),
            PieceKind::J => Rgb::new(36, 95, 223),
            PieceKind::L => Rgb::new(223, 173, 36),
            PieceKind::O => Rgb::new(223, 217, 36),
            PieceKind::S => Rgb::new(48, 211, 56),
            PieceKind::T => Rgb::new(132, 61, 198),
            PieceKind::Z => Rgb::new(227, 78, 78),
        }
    }

    /// Compact grid code (1..=7); 0 is reserved for an empty cell.
    pub fn code(&self) -> u8 {
        match self {
            PieceKind::I => 1,
            PieceKind::J => 2,
            PieceKind::L => 3,
            PieceKind::O => 4,
            PieceKind::S => 5,
            PieceKind::T => 6,
            PieceKind::Z => 7,
        }
    }

    /// Inverse of [`PieceKind::code`].
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(PieceKind::I),
            2 => Some(PieceKind::J),
            3 => Some(PieceKind::L),
            4 => Some(PieceKind::O),
            5 => Some(PieceKind::S),
            6 => Some(PieceKind::T),
            7 => Some(PieceKind::Z),
            _ => None,
        }
    }
}

/// Whether a board cell is empty or permanently settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellState {
    Clear,
    Merged,
}

/// A cell on the game board
///
/// A merged cell always carries its piece kind and a clear cell never does, so
/// the pair `(kind, state)` can only take legal combinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Cell {
    #[default]
    Clear,
    Merged(PieceKind),
}

impl Cell {
    pub fn state(&self) -> CellState {
        match self {
            Cell::Clear => CellState::Clear,
            Cell::Merged(_) => CellState::Merged,
        }
    }

    pub fn kind(&self) -> Option<PieceKind> {
        match self {
            Cell::Clear => None,
            Cell::Merged(kind) => Some(*kind),
        }
    }

    pub fn is_merged(&self) -> bool {
        matches!(self, Cell::Merged(_))
    }

    /// Grid code: 0 for clear, [`PieceKind::code`] for merged.
    pub fn code(&self) -> u8 {
        self.kind().map(|k| k.code()).unwrap_or(0)
    }
}

/// Session lifecycle.
///
/// `Idle -> Playing -> Over`; only an explicit reset leaves `Over`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Phase {
    #[default]
    Idle,
    Playing,
    Over,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Playing => "playing",
            Phase::Over => "over",
        }
    }
}

/// Commands accepted by the engine
///
/// Keyboard, virtual pad and remote clients all translate into this vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameCommand {
    /// Move piece one cell left
    MoveLeft,
    /// Move piece one cell right
    MoveRight,
    /// Drop piece one cell (same as a gravity tick)
    SoftDrop,
    /// Instantly drop piece to lowest legal position and settle it
    HardDrop,
    /// Rotate piece clockwise
    RotateCw,
    /// Rotate piece counter-clockwise
    RotateCcw,
    /// Begin a session for the named player (idle only)
    Start(String),
    /// Return to idle from any phase
    Reset,
}

impl GameCommand {
    /// Parse a parameterless command name.
    ///
    /// `start` needs a name and is never produced here; unknown names
    /// (including the pad's `noop`) return `None` and are simply ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// use gift_tetris_types::GameCommand;
    ///
    /// assert_eq!(GameCommand::from_str("hardDrop"), Some(GameCommand::HardDrop));
    /// assert_eq!(GameCommand::from_str("rotate"), Some(GameCommand::RotateCw));
    /// assert_eq!(GameCommand::from_str("drop"), Some(GameCommand::SoftDrop));
    /// assert_eq!(GameCommand::from_str("start"), None);
    /// ```
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "moveleft" => Some(GameCommand::MoveLeft),
            "moveright" => Some(GameCommand::MoveRight),
            "softdrop" | "drop" => Some(GameCommand::SoftDrop),
            "harddrop" => Some(GameCommand::HardDrop),
            "rotatecw" | "rotate" | "rotateright" => Some(GameCommand::RotateCw),
            "rotateccw" | "rotateleft" => Some(GameCommand::RotateCcw),
            "reset" => Some(GameCommand::Reset),
            _ => None,
        }
    }

    /// Convert to camelCase string for logs and the pad protocol
    pub fn as_str(&self) -> &'static str {
        match self {
            GameCommand::MoveLeft => "moveLeft",
            GameCommand::MoveRight => "moveRight",
            GameCommand::SoftDrop => "softDrop",
            GameCommand::HardDrop => "hardDrop",
            GameCommand::RotateCw => "rotateCw",
            GameCommand::RotateCcw => "rotateCcw",
            GameCommand::Start(_) => "start",
            GameCommand::Reset => "reset",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_state_matches_kind() {
        assert_eq!(Cell::Clear.state(), CellState::Clear);
        assert_eq!(Cell::Clear.kind(), None);
        assert_eq!(Cell::Merged(PieceKind::T).state(), CellState::Merged);
        assert_eq!(Cell::Merged(PieceKind::T).kind(), Some(PieceKind::T));
        assert_eq!(Cell::default(), Cell::Clear);
    }

    #[test]
    fn piece_codes_roundtrip_and_skip_zero() {
        for kind in PieceKind::ALL {
            assert_ne!(kind.code(), 0);
            assert_eq!(PieceKind::from_code(kind.code()), Some(kind));
        }
        assert_eq!(PieceKind::from_code(0), None);
        assert_eq!(Cell::Clear.code(), 0);
    }

    #[test]
    fn command_names_are_case_insensitive() {
        assert_eq!(GameCommand::from_str("MOVELEFT"), Some(GameCommand::MoveLeft));
        assert_eq!(GameCommand::from_str("rotateCW"), Some(GameCommand::RotateCw));
        assert_eq!(GameCommand::from_str("rotateCCW"), Some(GameCommand::RotateCcw));
        assert_eq!(GameCommand::from_str("noop"), None);
        assert_eq!(GameCommand::from_str(""), None);
    }

    #[test]
    fn catalog_colors_are_distinct() {
        for (i, a) in PieceKind::ALL.iter().enumerate() {
            for b in PieceKind::ALL.iter().skip(i + 1) {
                assert_ne!(a.color(), b.color());
            }
        }
    }
}
