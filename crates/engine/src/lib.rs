//! Engine runtime: drives a [`GameState`](gift_tetris_core::GameState) from a
//! command channel and a gravity timer.
//!
//! - [`Engine::spawn`] starts the task and returns an [`EngineHandle`]
//! - [`GravityTimer`] owns the cancellable gravity interval
//! - [`EngineConfig`] reads `GIFT_TETRIS_*` environment variables
//! - [`event_log`] appends every [`EngineEvent`] to an optional JSONL file

pub mod config;
pub mod event_log;
pub mod runtime;
pub mod timer;

pub use gift_tetris_core as core;
pub use gift_tetris_types as types;

pub use config::EngineConfig;
pub use gift_tetris_core::{CommandOutcome, CoreEvent as EngineEvent, GameOverReport, StartError};
pub use runtime::{Engine, EngineError, EngineHandle, PendingOutcome};
pub use timer::GravityTimer;
