//! Name prompt shown while the session is idle.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::types::{GameCommand, MISSING_NAME_MESSAGE};

/// Longest name the prompt accepts.
pub const MAX_NAME_LEN: usize = 24;

/// Result of feeding one key to the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameInput {
    /// Buffer or notice changed; redraw.
    Edited,
    /// Enter with a usable name.
    Submit(GameCommand),
    /// Key is not for the prompt.
    Unhandled,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameEntry {
    buffer: String,
    notice: Option<&'static str>,
}

impl NameEntry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prompt pre-filled with a remembered name.
    pub fn with_name(name: &str) -> Self {
        let mut entry = Self::new();
        entry.buffer.extend(name.chars().take(MAX_NAME_LEN));
        entry
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }

    /// Validation notice from the last submit, if it failed.
    pub fn notice(&self) -> Option<&'static str> {
        self.notice
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> NameInput {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return NameInput::Unhandled;
        }
        match key.code {
            KeyCode::Enter => self.submit(),
            KeyCode::Backspace => {
                self.buffer.pop();
                NameInput::Edited
            }
            KeyCode::Char(ch) if !ch.is_control() => {
                if self.buffer.chars().count() < MAX_NAME_LEN {
                    self.buffer.push(ch);
                }
                self.notice = None;
                NameInput::Edited
            }
            _ => NameInput::Unhandled,
        }
    }

    fn submit(&mut self) -> NameInput {
        let name = self.buffer.trim();
        if name.is_empty() {
            self.notice = Some(MISSING_NAME_MESSAGE);
            return NameInput::Edited;
        }
        self.notice = None;
        NameInput::Submit(GameCommand::Start(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::from(code)
    }

    #[test]
    fn typing_and_backspace_edit_the_buffer() {
        let mut entry = NameEntry::new();
        for ch in "Ayuu".chars() {
            assert_eq!(entry.handle_key(key(KeyCode::Char(ch))), NameInput::Edited);
        }
        entry.handle_key(key(KeyCode::Backspace));
        assert_eq!(entry.text(), "Ayu");
    }

    #[test]
    fn empty_submit_sets_notice() {
        let mut entry = NameEntry::new();
        entry.handle_key(key(KeyCode::Char(' ')));
        assert_eq!(entry.handle_key(key(KeyCode::Enter)), NameInput::Edited);
        assert_eq!(entry.notice(), Some(MISSING_NAME_MESSAGE));

        // Typing clears the notice.
        entry.handle_key(key(KeyCode::Char('A')));
        assert_eq!(entry.notice(), None);
    }

    #[test]
    fn submit_trims_the_name() {
        let mut entry = NameEntry::with_name("  Ayu ");
        assert_eq!(
            entry.handle_key(key(KeyCode::Enter)),
            NameInput::Submit(GameCommand::Start("Ayu".to_string()))
        );
    }

    #[test]
    fn length_is_capped() {
        let mut entry = NameEntry::new();
        for _ in 0..40 {
            entry.handle_key(key(KeyCode::Char('x')));
        }
        assert_eq!(entry.text().chars().count(), MAX_NAME_LEN);
    }

    #[test]
    fn control_keys_are_not_consumed() {
        let mut entry = NameEntry::new();
        assert_eq!(
            entry.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            NameInput::Unhandled
        );
        assert_eq!(entry.handle_key(key(KeyCode::Esc)), NameInput::Unhandled);
        assert_eq!(entry.text(), "");
    }
}
