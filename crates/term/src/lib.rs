//! Terminal game renderer.
//!
//! A small, game-oriented rendering layer: no widget toolkit, just a
//! framebuffer of styled cells flushed to the terminal with crossterm.
//!
//! - [`fb`]: framebuffer and cell styles
//! - [`game_view`]: snapshot to framebuffer (well, side panel, overlays)
//! - [`renderer`]: diffed output to the real terminal

pub mod fb;
pub mod game_view;
pub mod renderer;

pub use gift_tetris_core as core;
pub use gift_tetris_types as types;

pub use fb::{Cell, CellStyle, FrameBuffer, Rgb};
pub use game_view::{wrap_words, GameView, Hud, PadStatusView, PromptView, Viewport};
pub use renderer::{encode_diff_into, encode_full_into, TerminalRenderer};
