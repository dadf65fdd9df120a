pub mod alert;
pub mod color;
pub mod editor;
pub mod help;
pub mod hours_field;
pub mod status_bar;
pub mod subject_form;
pub mod subject_list;
pub mod timetable;

use ratatui::layout::{Constraint, Flex, Layout, Rect};

/// Centered rect covering a percentage of `area`
/// Based on ratatui popup example: https://ratatui.rs/examples/apps/popup/
pub fn popup_area(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let vertical = Layout::vertical([Constraint::Percentage(percent_y)]).flex(Flex::Center);
    let horizontal = Layout::horizontal([Constraint::Percentage(percent_x)]).flex(Flex::Center);
    let [area] = vertical.areas(area);
    let [area] = horizontal.areas(area);
    area
}

/// Cut `text` to `max_width` characters, marking the cut with "..."
pub fn truncate_with_ellipsis(text: &str, max_width: usize) -> String {
    if text.chars().count() <= max_width {
        text.to_string()
    } else {
        text.chars().take(max_width.saturating_sub(3)).collect::<String>() + "..."
    }
}
