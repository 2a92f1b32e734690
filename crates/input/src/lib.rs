//! Input adapters.
//!
//! Maps raw input into [`crate::types::GameCommand`] values. Nothing here
//! touches game state; callers forward the commands to the engine.
//!
//! - [`map`]: crossterm keyboard events during play
//! - [`name`]: the name prompt shown before a session starts
//! - [`pad`]: the handheld console's virtual buttons

pub mod map;
pub mod name;
pub mod pad;

pub use gift_tetris_types as types;

pub use map::{handle_key_event, should_quit};
pub use name::{NameEntry, NameInput};
pub use pad::{Button, PadInput, Screen, VirtualPad};
