use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

use crate::config::Theme;
use crate::models::Subject;
use crate::tui::widgets::color::parse_color;
use crate::tui::widgets::truncate_with_ellipsis;

pub fn render_subject_list(
    f: &mut Frame,
    area: Rect,
    subjects: &[Subject],
    list_state: &mut ListState,
    focused: bool,
    add_key: &str,
    theme: &Theme,
) {
    let border_style = if focused {
        Style::default().fg(parse_color(&theme.accent))
    } else {
        Style::default().fg(parse_color(&theme.fg))
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("Subjects ({})", subjects.len()))
        .border_style(border_style);

    if subjects.is_empty() {
        let hint = Paragraph::new(empty_hint(add_key))
            .block(block)
            .style(Style::default().add_modifier(Modifier::DIM));
        f.render_widget(hint, area);
        return;
    }

    // 2 for borders, 2 for the highlight symbol
    let max_width = area.width.saturating_sub(4) as usize;
    let items: Vec<ListItem> = subjects
        .iter()
        .enumerate()
        .map(|(i, subject)| ListItem::new(truncate_with_ellipsis(&subject_label(i, subject), max_width)))
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(parse_color(&theme.highlight_bg))
                .fg(parse_color(&theme.highlight_fg)),
        )
        .highlight_symbol("> ");

    f.render_stateful_widget(list, area, list_state);
}

fn empty_hint(add_key: &str) -> String {
    format!("No subjects yet.\nPress '{}' to add one.", add_key)
}

/// "Subject N: name (chapters, exam date)", numbered from 1 in list order
pub fn subject_label(index: usize, subject: &Subject) -> String {
    let chapters = match subject.chapters.len() {
        1 => "1 chapter".to_string(),
        n => format!("{} chapters", n),
    };
    if subject.exam_date.is_empty() {
        format!("Subject {}: {} ({})", index + 1, subject.display_name(), chapters)
    } else {
        format!(
            "Subject {}: {} ({}, exam {})",
            index + 1,
            subject.display_name(),
            chapters,
            subject.exam_date
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SubjectId;

    #[test]
    fn test_subject_label() {
        let mut subject = Subject::new(SubjectId::new(7));
        assert_eq!(subject_label(0, &subject), "Subject 1: (unnamed) (0 chapters)");

        subject.name = "Math".to_string();
        subject.exam_date = "2024-06-01".to_string();
        subject.set_chapters_text("Algebra");
        assert_eq!(subject_label(2, &subject), "Subject 3: Math (1 chapter, exam 2024-06-01)");
    }

    #[test]
    fn test_empty_hint_names_add_key() {
        assert_eq!(empty_hint("a"), "No subjects yet.\nPress 'a' to add one.");
        assert_eq!(empty_hint("n"), "No subjects yet.\nPress 'n' to add one.");
    }
}
