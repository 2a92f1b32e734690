//! Key mapping from terminal events to game commands.

use crate::types::GameCommand;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Map keyboard input to game commands.
pub fn handle_key_event(key: KeyEvent) -> Option<GameCommand> {
    match key.code {
        // Movement
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Some(GameCommand::MoveLeft),
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Some(GameCommand::MoveRight),
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => Some(GameCommand::SoftDrop),

        // Rotation
        KeyCode::Up | KeyCode::Char('x') | KeyCode::Char('X') => Some(GameCommand::RotateCw),
        KeyCode::Char('z') | KeyCode::Char('Z') => Some(GameCommand::RotateCcw),

        // Actions
        KeyCode::Char(' ') => Some(GameCommand::HardDrop),
        KeyCode::Char('r') | KeyCode::Char('R') => Some(GameCommand::Reset),

        _ => None,
    }
}

/// Check if key should quit the game.
pub fn should_quit(key: KeyEvent) -> bool {
    matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc)
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}
