use crossterm::event::KeyCode;
use level_watch::input::{parse_main_command, parse_popup_command, PopupCommand, UiCommand};

#[test]
fn parse_main_command_maps_case_insensitive_char_keys() {
    assert_eq!(
        parse_main_command(&KeyCode::Char('s')),
        Some(UiCommand::OpenSymbolSelector)
    );
    assert_eq!(
        parse_main_command(&KeyCode::Char('I')),
        Some(UiCommand::NextInterval)
    );
    assert_eq!(
        parse_main_command(&KeyCode::Char('f')),
        Some(UiCommand::ToggleFibonacci)
    );
    assert_eq!(parse_main_command(&KeyCode::Char('P')), Some(UiCommand::TogglePivot));
    assert_eq!(
        parse_main_command(&KeyCode::Char('e')),
        Some(UiCommand::ToggleNotifications)
    );
    assert_eq!(
        parse_main_command(&KeyCode::Char('t')),
        Some(UiCommand::SendTestNotification)
    );
    assert_eq!(
        parse_main_command(&KeyCode::Char('r')),
        Some(UiCommand::NextRefreshInterval)
    );
    assert_eq!(parse_main_command(&KeyCode::Char('U')), Some(UiCommand::RefreshNow));
}

#[test]
fn parse_main_command_quits_on_q_and_esc() {
    assert_eq!(parse_main_command(&KeyCode::Char('q')), Some(UiCommand::Quit));
    assert_eq!(parse_main_command(&KeyCode::Esc), Some(UiCommand::Quit));
    assert_eq!(parse_main_command(&KeyCode::Char('x')), None);
    assert_eq!(parse_main_command(&KeyCode::Enter), None);
}

#[test]
/// Verifies the bracket keys move one end of the date range by a day
/// and `c` resets the range to its default.
fn parse_main_command_maps_range_keys() {
    assert_eq!(parse_main_command(&KeyCode::Char('[')), Some(UiCommand::ShiftFrom(-1)));
    assert_eq!(parse_main_command(&KeyCode::Char(']')), Some(UiCommand::ShiftFrom(1)));
    assert_eq!(parse_main_command(&KeyCode::Char('{')), Some(UiCommand::ShiftTo(-1)));
    assert_eq!(parse_main_command(&KeyCode::Char('}')), Some(UiCommand::ShiftTo(1)));
    assert_eq!(parse_main_command(&KeyCode::Char('C')), Some(UiCommand::ResetRange));
}

#[test]
fn parse_popup_command_supports_arrows_and_vim_keys() {
    assert_eq!(parse_popup_command(&KeyCode::Up), Some(PopupCommand::Up));
    assert_eq!(parse_popup_command(&KeyCode::Char('j')), Some(PopupCommand::Down));
    assert_eq!(parse_popup_command(&KeyCode::Enter), Some(PopupCommand::Select));
    assert_eq!(parse_popup_command(&KeyCode::Esc), Some(PopupCommand::Close));
    assert_eq!(parse_popup_command(&KeyCode::Char('S')), Some(PopupCommand::Close));
    assert_eq!(parse_popup_command(&KeyCode::Char('f')), None);
}
