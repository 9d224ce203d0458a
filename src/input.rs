use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::snake::Direction;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Command {
    Turn(Direction),
    Start,
    Stop,
    Quit,
}

/// Maps a key press to a command. Which keys mean anything depends on
/// whether a game is in progress: while stopped only Space does.
pub fn interpret(key: &KeyEvent, running: bool) -> Option<Command> {
    if is_ctrl_c(key) {
        return Some(Command::Quit);
    }

    if !running {
        return match key.code {
            KeyCode::Char(' ') => Some(Command::Start),
            _ => None,
        };
    }

    match key.code {
        KeyCode::Up => Some(Command::Turn(Direction::Up)),
        KeyCode::Down => Some(Command::Turn(Direction::Down)),
        KeyCode::Left => Some(Command::Turn(Direction::Left)),
        KeyCode::Right => Some(Command::Turn(Direction::Right)),
        KeyCode::Esc => Some(Command::Stop),
        _ => None,
    }
}

fn is_ctrl_c(ev: &KeyEvent) -> bool {
    ev.code == KeyCode::Char('c') && ev.modifiers.contains(KeyModifiers::CONTROL)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_arrows_while_running() {
        assert_eq!(interpret(&key(KeyCode::Up), true), Some(Command::Turn(Direction::Up)));
        assert_eq!(interpret(&key(KeyCode::Down), true), Some(Command::Turn(Direction::Down)));
        assert_eq!(interpret(&key(KeyCode::Left), true), Some(Command::Turn(Direction::Left)));
        assert_eq!(interpret(&key(KeyCode::Right), true), Some(Command::Turn(Direction::Right)));
        assert_eq!(interpret(&key(KeyCode::Esc), true), Some(Command::Stop));
    }

    #[test]
    fn test_space_only_starts_when_stopped() {
        assert_eq!(interpret(&key(KeyCode::Char(' ')), false), Some(Command::Start));
        assert_eq!(interpret(&key(KeyCode::Char(' ')), true), None);
    }

    #[test]
    fn test_arrows_ignored_when_stopped() {
        assert_eq!(interpret(&key(KeyCode::Up), false), None);
        assert_eq!(interpret(&key(KeyCode::Esc), false), None);
    }

    #[test]
    fn test_other_keys_ignored() {
        assert_eq!(interpret(&key(KeyCode::Char('w')), true), None);
        assert_eq!(interpret(&key(KeyCode::Enter), true), None);
        assert_eq!(interpret(&key(KeyCode::Char('c')), true), None);
    }

    #[test]
    fn test_ctrl_c_quits() {
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(interpret(&ctrl_c, true), Some(Command::Quit));
        assert_eq!(interpret(&ctrl_c, false), Some(Command::Quit));
    }
}
