use crossterm::event::KeyCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiCommand {
    Quit,
    OpenSymbolSelector,
    NextInterval,
    ToggleFibonacci,
    TogglePivot,
    ToggleNotifications,
    SendTestNotification,
    NextRefreshInterval,
    RefreshNow,
    /// Move the window start by this many days.
    ShiftFrom(i64),
    /// Move the window end by this many days.
    ShiftTo(i64),
    ResetRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupCommand {
    Up,
    Down,
    Select,
    Close,
}

pub fn parse_main_command(key_code: &KeyCode) -> Option<UiCommand> {
    match key_code {
        KeyCode::Esc => Some(UiCommand::Quit),
        KeyCode::Char(c) => match c.to_ascii_lowercase() {
            'q' => Some(UiCommand::Quit),
            's' => Some(UiCommand::OpenSymbolSelector),
            'i' => Some(UiCommand::NextInterval),
            'f' => Some(UiCommand::ToggleFibonacci),
            'p' => Some(UiCommand::TogglePivot),
            'e' => Some(UiCommand::ToggleNotifications),
            't' => Some(UiCommand::SendTestNotification),
            'r' => Some(UiCommand::NextRefreshInterval),
            'u' => Some(UiCommand::RefreshNow),
            '[' => Some(UiCommand::ShiftFrom(-1)),
            ']' => Some(UiCommand::ShiftFrom(1)),
            '{' => Some(UiCommand::ShiftTo(-1)),
            '}' => Some(UiCommand::ShiftTo(1)),
            'c' => Some(UiCommand::ResetRange),
            _ => None,
        },
        _ => None,
    }
}

pub fn parse_popup_command(key_code: &KeyCode) -> Option<PopupCommand> {
    match key_code {
        KeyCode::Up => Some(PopupCommand::Up),
        KeyCode::Down => Some(PopupCommand::Down),
        KeyCode::Enter => Some(PopupCommand::Select),
        KeyCode::Esc => Some(PopupCommand::Close),
        KeyCode::Char(c) => match c.to_ascii_lowercase() {
            'k' => Some(PopupCommand::Up),
            'j' => Some(PopupCommand::Down),
            'q' | 's' => Some(PopupCommand::Close),
            _ => None,
        },
        _ => None,
    }
}
