use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};

pub(crate) enum Action {
    Quit,
    TogglePause,
    Rebuild,
    Resize(u16, u16),
}

/// Drain every pending event without blocking the frame.
pub(crate) fn poll_actions() -> io::Result<Vec<Action>> {
    let mut actions = Vec::new();
    while event::poll(Duration::ZERO)? {
        match event::read()? {
            Event::Key(k) if k.kind == KeyEventKind::Press => match k.code {
                KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                    actions.push(Action::Quit);
                }
                KeyCode::Char('c') if k.modifiers.contains(KeyModifiers::CONTROL) => {
                    actions.push(Action::Quit);
                }
                KeyCode::Char(' ') => actions.push(Action::TogglePause),
                KeyCode::Char('r') | KeyCode::Char('R') => actions.push(Action::Rebuild),
                _ => {}
            },
            Event::Resize(cols, rows) => actions.push(Action::Resize(cols, rows)),
            _ => {}
        }
    }
    Ok(actions)
}
