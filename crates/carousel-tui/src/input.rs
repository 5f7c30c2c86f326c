use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

use carousel_core::LayoutMode;

use crate::app::App;

/// Input action that can be performed
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Quit,
    Next,
    Previous,
    /// Assign the selection from outside, relative to the current one
    JumpBy(i64),
    JumpToFirst,
    JumpToLast,
    SetLayout(LayoutMode),
    CycleAlignment,
    GrowDensity,
    ShrinkDensity,
    ToggleFliptych,
    ToggleWarp,
    ToggleForeground,
    CycleScale,
    ToggleDepthWait,
    PlaySelection,
    Reload,
    DragStart { column: u16, row: u16 },
    DragMove { column: u16, row: u16 },
    DragEnd,
    None,
}

/// Handle a key event and return the corresponding action
pub fn handle_key_event(key: KeyEvent) -> Action {
    match (key.code, key.modifiers) {
        (KeyCode::Char('q'), _) | (KeyCode::Esc, _) => Action::Quit,
        (KeyCode::Char('c'), KeyModifiers::CONTROL) => Action::Quit,

        (KeyCode::Right | KeyCode::Down, _) => Action::Next,
        (KeyCode::Char('l') | KeyCode::Char('j'), _) => Action::Next,
        (KeyCode::Left | KeyCode::Up, _) => Action::Previous,
        (KeyCode::Char('h') | KeyCode::Char('k'), _) => Action::Previous,
        (KeyCode::PageDown, _) | (KeyCode::Char('d'), KeyModifiers::CONTROL) => Action::JumpBy(10),
        (KeyCode::PageUp, _) | (KeyCode::Char('u'), KeyModifiers::CONTROL) => Action::JumpBy(-10),
        (KeyCode::Home, _) | (KeyCode::Char('g'), _) => Action::JumpToFirst,
        (KeyCode::End, _) | (KeyCode::Char('G'), _) => Action::JumpToLast,

        (KeyCode::Char('1'), _) => Action::SetLayout(LayoutMode::Row),
        (KeyCode::Char('2'), _) => Action::SetLayout(LayoutMode::Column),
        (KeyCode::Char('3'), _) => Action::SetLayout(LayoutMode::Wheel),
        (KeyCode::Char('a'), _) => Action::CycleAlignment,
        (KeyCode::Char('+') | KeyCode::Char('='), _) => Action::GrowDensity,
        (KeyCode::Char('-'), _) => Action::ShrinkDensity,
        (KeyCode::Char('f'), _) => Action::ToggleFliptych,
        (KeyCode::Char('w'), _) => Action::ToggleWarp,
        (KeyCode::Char('c'), _) => Action::ToggleForeground,
        (KeyCode::Char('s'), _) => Action::CycleScale,
        (KeyCode::Char('z'), _) => Action::ToggleDepthWait,
        (KeyCode::Char('r'), _) => Action::Reload,

        (KeyCode::Enter, _) | (KeyCode::Char(' '), _) => Action::PlaySelection,
        _ => Action::None,
    }
}

/// Handle a mouse event: the wheel steps once per notch, a left drag over the hit area is a
/// gesture session
pub fn handle_mouse_event(mouse: MouseEvent, app: &App) -> Action {
    match mouse.kind {
        MouseEventKind::ScrollDown => Action::Next,
        MouseEventKind::ScrollUp => Action::Previous,
        MouseEventKind::Down(MouseButton::Left) if app.hits(mouse.column, mouse.row) => {
            Action::DragStart {
                column: mouse.column,
                row: mouse.row,
            }
        }
        MouseEventKind::Drag(MouseButton::Left) if app.is_dragging() => Action::DragMove {
            column: mouse.column,
            row: mouse.row,
        },
        MouseEventKind::Up(MouseButton::Left) if app.is_dragging() => Action::DragEnd,
        _ => Action::None,
    }
}
