//! Gift Tetris (workspace facade crate).
//!
//! Re-exports the dedicated crates under `crates/` as
//! `gift_tetris::{core, adapter, term, input, engine, types}`.

pub use gift_tetris_adapter as adapter;
pub use gift_tetris_core as core;
pub use gift_tetris_engine as engine;
pub use gift_tetris_input as input;
pub use gift_tetris_term as term;
pub use gift_tetris_types as types;
