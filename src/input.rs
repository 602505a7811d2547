//! Decoding of terminal key presses into game commands. Everything that
//! knows about concrete keys lives here so the game loop only ever sees
//! `Command`s.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::game::Command;
use crate::snake::Direction::*;

pub fn is_ctrl_c(ev: &KeyEvent) -> bool {
    ev.modifiers.contains(KeyModifiers::CONTROL) && matches!(ev.code, KeyCode::Char('c') | KeyCode::Char('C'))
}

/// Maps an in-game key press to a command. Letter keys are case-insensitive
/// and the arrow keys mirror WASD.
pub fn command_for(ev: &KeyEvent) -> Option<Command> {
    if ev.kind != KeyEventKind::Press {
        return None;
    }
    if is_ctrl_c(ev) {
        return Some(Command::Quit);
    }

    let command = match ev.code {
        KeyCode::Up => Command::Turn(Up),
        KeyCode::Down => Command::Turn(Down),
        KeyCode::Left => Command::Turn(Left),
        KeyCode::Right => Command::Turn(Right),
        KeyCode::Esc => Command::TogglePause,
        KeyCode::Char(c) => match c.to_ascii_lowercase() {
            'w' => Command::Turn(Up),
            's' => Command::Turn(Down),
            'a' => Command::Turn(Left),
            'd' => Command::Turn(Right),
            'p' => Command::TogglePause,
            'q' => Command::Quit,
            _ => return None,
        },
        _ => return None,
    };

    Some(command)
}

/// Answer to the "play again?" prompt. `None` for keys that mean neither.
pub fn play_again_answer(ev: &KeyEvent) -> Option<bool> {
    if ev.kind != KeyEventKind::Press {
        return None;
    }
    if is_ctrl_c(ev) {
        return Some(false);
    }

    match ev.code {
        KeyCode::Esc => Some(false),
        KeyCode::Char(c) => match c.to_ascii_lowercase() {
            'y' => Some(true),
            'n' | 'q' => Some(false),
            _ => None,
        },
        _ => None,
    }
}
