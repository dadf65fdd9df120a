use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState};

use crate::config::Theme;
use crate::models::ScheduleEntry;
use crate::tui::widgets::color::parse_color;

pub fn render_timetable(
    f: &mut Frame,
    area: Rect,
    entries: &[ScheduleEntry],
    scroll: usize,
    generate_key: &str,
    theme: &Theme,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("Generated Timetable ({})", entries.len()));
    let style = Style::default().fg(parse_color(&theme.fg));

    if entries.is_empty() {
        let paragraph = Paragraph::new(empty_hint(generate_key))
            .style(style.add_modifier(Modifier::DIM))
            .block(block);
        f.render_widget(paragraph, area);
        return;
    }

    let lines: Vec<String> = entries.iter().map(ScheduleEntry::to_string).collect();
    let paragraph = Paragraph::new(lines.join("\n"))
        .style(style)
        .block(block)
        .scroll((scroll as u16, 0));
    f.render_widget(paragraph, area);

    let visible = area.height.saturating_sub(2) as usize;
    if entries.len() > visible {
        let mut state = ScrollbarState::new(entries.len()).position(scroll);
        f.render_stateful_widget(Scrollbar::new(ScrollbarOrientation::VerticalRight), area, &mut state);
    }
}

fn empty_hint(generate_key: &str) -> String {
    format!("No timetable yet. Press '{}' to generate one.", generate_key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_hint_names_generate_key() {
        assert_eq!(empty_hint("g"), "No timetable yet. Press 'g' to generate one.");
        assert_eq!(empty_hint("F5"), "No timetable yet. Press 'F5' to generate one.");
    }
}
