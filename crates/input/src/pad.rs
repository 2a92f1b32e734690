//! Virtual pad of the handheld console.
//!
//! Six buttons drive whichever screen is showing. Only the Tetris screen turns
//! them into game commands; every other screen answers `noop`.

use crate::types::GameCommand;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    Up,
    Down,
    Left,
    Right,
    A,
    B,
}

impl Button {
    pub const ALL: [Button; 6] = [
        Button::Up,
        Button::Down,
        Button::Left,
        Button::Right,
        Button::A,
        Button::B,
    ];

    /// Parse from a case-insensitive name (`"up"`, `"a"`, ...)
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "up" => Some(Button::Up),
            "down" => Some(Button::Down),
            "left" => Some(Button::Left),
            "right" => Some(Button::Right),
            "a" => Some(Button::A),
            "b" => Some(Button::B),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Button::Up => "up",
            Button::Down => "down",
            Button::Left => "left",
            Button::Right => "right",
            Button::A => "a",
            Button::B => "b",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Screen {
    #[default]
    Home,
    Message,
    Gallery,
    Music,
    Tetris,
}

/// What a button press means on the current screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PadInput {
    Command(GameCommand),
    Noop,
}

impl PadInput {
    pub fn command(self) -> Option<GameCommand> {
        match self {
            PadInput::Command(cmd) => Some(cmd),
            PadInput::Noop => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PadInput::Command(cmd) => cmd.as_str(),
            PadInput::Noop => "noop",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VirtualPad {
    screen: Screen,
}

impl VirtualPad {
    pub fn new(screen: Screen) -> Self {
        Self { screen }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn set_screen(&mut self, screen: Screen) {
        self.screen = screen;
    }

    pub fn press(&self, button: Button) -> PadInput {
        if self.screen != Screen::Tetris {
            return PadInput::Noop;
        }
        let cmd = match button {
            Button::Up => GameCommand::HardDrop,
            Button::Down => GameCommand::SoftDrop,
            Button::Left => GameCommand::MoveLeft,
            Button::Right => GameCommand::MoveRight,
            Button::A | Button::B => GameCommand::RotateCw,
        };
        PadInput::Command(cmd)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tetris_screen_mapping() {
        let pad = VirtualPad::new(Screen::Tetris);
        assert_eq!(pad.press(Button::Up).as_str(), "hardDrop");
        assert_eq!(pad.press(Button::Down).as_str(), "softDrop");
        assert_eq!(pad.press(Button::Left).as_str(), "moveLeft");
        assert_eq!(pad.press(Button::Right).as_str(), "moveRight");
        assert_eq!(pad.press(Button::A), PadInput::Command(GameCommand::RotateCw));
        assert_eq!(pad.press(Button::B), PadInput::Command(GameCommand::RotateCw));
    }

    #[test]
    fn other_screens_are_noop() {
        for screen in [Screen::Home, Screen::Message, Screen::Gallery, Screen::Music] {
            let pad = VirtualPad::new(screen);
            for button in Button::ALL {
                assert_eq!(pad.press(button), PadInput::Noop);
                assert_eq!(pad.press(button).command(), None);
            }
        }
    }

    #[test]
    fn button_names_round_trip() {
        for button in Button::ALL {
            assert_eq!(Button::from_str(button.as_str()), Some(button));
        }
        assert_eq!(Button::from_str("START"), None);
        assert_eq!(Button::from_str("Left"), Some(Button::Left));
    }

    #[test]
    fn switching_screens_changes_the_mapping() {
        let mut pad = VirtualPad::default();
        assert_eq!(pad.screen(), Screen::Home);
        assert_eq!(pad.press(Button::Up), PadInput::Noop);

        pad.set_screen(Screen::Tetris);
        assert_eq!(pad.press(Button::Up).command(), Some(GameCommand::HardDrop));

        pad.set_screen(Screen::Music);
        assert_eq!(pad.press(Button::Up).command(), None);
    }
}
