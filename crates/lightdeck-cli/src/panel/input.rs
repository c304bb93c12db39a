//! Keyboard and mouse handling for the terminal panel.
//!
//! The mouse stands in for the touchscreen: holding the left button is a
//! finger on the glass, dragging moves it, releasing lifts it.
//!
//! # Key Bindings
//!
//! | Key | Action |
//! |-----|--------|
//! | `q` / `Esc` / `Ctrl-C` | Quit |
//! | `r` | Re-read every device |

use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use lightdeck_core::Point;
use lightdeck_core::layout::{SCREEN_HEIGHT, SCREEN_WIDTH};

/// What the event loop should do with one terminal event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Leave the panel.
    Quit,
    /// Re-read all devices now.
    Refresh,
    /// Finger down or moving at this canvas point.
    Touch(Point),
    /// Finger lifted.
    Lift,
    /// Terminal resized to `(columns, rows)`.
    Resize(u16, u16),
    /// Nothing to do.
    None,
}

/// Translate a terminal event. `size` is the current `(columns, rows)`.
pub fn handle_event(event: Event, size: (u16, u16)) -> Action {
    match event {
        Event::Key(key) => handle_key(key),
        Event::Mouse(mouse) => handle_mouse(mouse, size),
        Event::Resize(columns, rows) => Action::Resize(columns, rows),
        _ => Action::None,
    }
}

/// Map a key press to an action.
pub fn handle_key(key: KeyEvent) -> Action {
    if key.kind != KeyEventKind::Press {
        return Action::None;
    }
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Action::Quit,
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        KeyCode::Char('r') => Action::Refresh,
        _ => Action::None,
    }
}

/// Map a mouse event to a touch.
pub fn handle_mouse(event: MouseEvent, size: (u16, u16)) -> Action {
    match event.kind {
        MouseEventKind::Down(MouseButton::Left) | MouseEventKind::Drag(MouseButton::Left) => {
            Action::Touch(cell_to_canvas(event.column, event.row, size))
        }
        MouseEventKind::Up(MouseButton::Left) => Action::Lift,
        _ => Action::None,
    }
}

/// Centre of a terminal cell in canvas coordinates.
pub fn cell_to_canvas(column: u16, row: u16, (columns, rows): (u16, u16)) -> Point {
    Point::new(
        scale(column, columns, SCREEN_WIDTH),
        scale(row, rows, SCREEN_HEIGHT),
    )
}

fn scale(cell: u16, cells: u16, extent: i32) -> i32 {
    let cells = i32::from(cells.max(1));
    let cell = i32::from(cell).min(cells - 1);
    (2 * cell + 1) * extent / (2 * cells)
}
