use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::config::{KeyBindings, Theme};
use crate::tui::widgets::{color::parse_color, popup_area};
use crate::utils::format_key_binding_for_display as key;

pub fn render_help(f: &mut Frame, area: Rect, bindings: &KeyBindings, theme: &Theme) {
    let style = Style::default().fg(parse_color(&theme.fg)).bg(parse_color(&theme.bg));
    let popup = popup_area(area, 60, 70);
    f.render_widget(Clear, popup);

    let paragraph = Paragraph::new(build_help_text(bindings))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Help - Key Bindings")
                .title_alignment(Alignment::Center)
                .style(style),
        )
        .style(style)
        .wrap(Wrap { trim: false });

    f.render_widget(paragraph, popup);
}

pub fn build_help_text(kb: &KeyBindings) -> String {
    let mut text = String::new();

    text.push_str("Subjects:\n");
    text.push_str(&format!("  {} / {}: Move selection\n", key(&kb.list_up), key(&kb.list_down)));
    text.push_str(&format!("  {}: Add subject\n", key(&kb.add_subject)));
    text.push_str(&format!("  {} / Enter: Edit selected subject\n", key(&kb.edit)));
    text.push_str(&format!("  {}: Delete selected subject\n", key(&kb.delete_subject)));
    text.push_str(&format!("  {}: Edit study hours per day\n", key(&kb.edit_hours)));
    text.push_str(&format!("  {}: Generate timetable\n", key(&kb.generate)));
    text.push_str("  PgUp / PgDn: Scroll timetable\n");
    text.push('\n');

    text.push_str("Editing:\n");
    text.push_str(&format!("  {} / Shift+Tab: Next / previous field\n", key(&kb.next_field)));
    text.push_str("  Enter: New chapter line (Chapters) or next field\n");
    text.push_str(&format!("  {}: Undo\n", key(&kb.undo)));
    text.push_str(&format!("  {}: Generate timetable\n", key(&kb.generate_in_form)));
    text.push_str("  Arrow keys / Home / End: Move cursor\n");
    text.push_str("  Esc: Back to subject list\n");
    text.push('\n');

    text.push_str("General:\n");
    text.push_str(&format!("  {}: Show/hide help\n", key(&kb.help)));
    text.push_str(&format!("  {}: Quit\n", key(&kb.quit)));

    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_help_lists_configured_bindings() {
        let mut bindings = KeyBindings::default();
        bindings.generate = "F5".to_string();
        bindings.generate_in_form = "F6".to_string();
        let text = build_help_text(&bindings);
        assert!(text.contains("F5: Generate timetable"));
        assert!(text.contains("F6: Generate timetable"));
        assert!(!text.contains("Ctrl+g"));
        assert!(text.contains("a: Add subject"));
        assert!(text.contains("q: Quit"));
    }
}
