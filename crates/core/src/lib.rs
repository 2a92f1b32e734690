//! Core game logic - pure, deterministic, and testable
//!
//! This crate contains the rules of the gift Tetris session. It has no
//! dependencies on timing, terminals or networking: the owner of a
//! [`GameState`] decides when gravity ticks and where commands come from.
//!
//! # Module Structure
//!
//! - [`board`]: 10x18 grid, the collision predicate and row sweeping
//! - [`pieces`]: the seven shape matrices, spawning, and rotation with kicks
//! - [`rng`]: uniform piece generation (with replacement) and scripted sequences
//! - [`scoring`]: line-clear points, leveling and gravity intervals
//! - [`game_state`]: the idle / playing / over session state machine
//! - [`snapshot`]: read-only views for renderers and remote clients
//!
//! # Game Rules
//!
//! - Collisions: walls, the floor and merged cells; rows above the top are free
//! - Rotation: transpose and flip, then an alternating horizontal kick search
//! - Landing: a blocked drop on the spawn row ends the session without settling
//! - Scoring: 40 / 100 / 300 / 1200 times the level for 1-4 rows
//! - Leveling: one level per settle once `lines / 10 >= level`
//!
//! # Example
//!
//! ```
//! use gift_tetris_core::{GameState, PieceGenerator};
//! use gift_tetris_core::types::{GameCommand, Phase, PieceKind};
//!
//! let mut game = GameState::new(PieceGenerator::scripted(vec![PieceKind::O]));
//! game.start("Ayu").unwrap();
//!
//! game.apply(&GameCommand::MoveLeft);
//! game.apply(&GameCommand::HardDrop);
//!
//! assert_eq!(game.phase(), Phase::Playing);
//! assert_eq!(game.board().merged_count(), 4);
//! ```

pub mod board;
pub mod game_state;
pub mod pieces;
pub mod rng;
pub mod scoring;
pub mod snapshot;

pub use gift_tetris_types as types;

// Re-export commonly used types for convenience
pub use board::{collides, settle, Board};
pub use game_state::{
    compose_closing_message, CommandOutcome, CoreEvent, GameOverReport, GameState, StartError,
    DEFAULT_CLOSING_TEMPLATE,
};
pub use pieces::{spawn_shape, try_rotate, Piece, ShapeMatrix};
pub use rng::{PieceGenerator, SimpleRng};
pub use scoring::{calculate_line_score, gravity_interval_ms, next_level};
pub use snapshot::{ActiveSnapshot, GameSnapshot};
