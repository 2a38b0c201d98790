use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::maze::Dir;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Move(Dir),
    Confirm,
    Back,
    Restart,
    Next,
    Map,
    Pick(u32),
    Quit,
}

pub fn direction_for(code: KeyCode) -> Option<Dir> {
    match code {
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') | KeyCode::Char('k') => Some(Dir::Up),
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') | KeyCode::Char('l') => Some(Dir::Right),
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') | KeyCode::Char('j') => Some(Dir::Down),
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') | KeyCode::Char('h') => Some(Dir::Left),
        _ => None,
    }
}

// `0` stands for the last level.
pub fn level_for_digit(n: u32, total_levels: u32) -> u32 {
    if n == 0 {
        total_levels
    } else {
        n
    }
}

pub fn command_for(key: KeyEvent) -> Option<Command> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Command::Quit);
    }
    if let Some(dir) = direction_for(key.code) {
        return Some(Command::Move(dir));
    }
    match key.code {
        KeyCode::Enter | KeyCode::Char(' ') => Some(Command::Confirm),
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => Some(Command::Back),
        KeyCode::Char('r') | KeyCode::Char('R') => Some(Command::Restart),
        KeyCode::Char('n') | KeyCode::Char('N') => Some(Command::Next),
        KeyCode::Char('m') | KeyCode::Char('M') => Some(Command::Map),
        KeyCode::Char(c) if c.is_ascii_digit() => c.to_digit(10).map(Command::Pick),
        _ => None,
    }
}
