use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use crate::config::Theme;
use crate::models::Subject;
use crate::tui::app::{FormField, SubjectForm};
use crate::tui::widgets::color::parse_color;
use crate::tui::widgets::editor::Editor;
use crate::utils::exam_date_needs_hint;

const FIELDS: [FormField; 3] = [FormField::Name, FormField::ExamDate, FormField::Chapters];

fn field_areas(area: Rect) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Length(3), Constraint::Min(3)])
        .split(area)
}

fn field_title(field: FormField, text: &str) -> String {
    if field == FormField::ExamDate && exam_date_needs_hint(text) {
        format!("{} - not a valid date", field.label())
    } else {
        field.label().to_string()
    }
}

/// Render the form for the subject being edited.
/// Returns the absolute cursor position inside the focused field.
pub fn render_subject_form(f: &mut Frame, area: Rect, form: &mut SubjectForm, theme: &Theme) -> Option<(u16, u16)> {
    if area.width < 2 || area.height < 2 {
        return None;
    }

    let active_style = Style::default()
        .bg(parse_color(&theme.highlight_bg))
        .fg(parse_color(&theme.highlight_fg));
    let inactive_style = Style::default().fg(parse_color(&theme.fg)).add_modifier(Modifier::DIM);
    let accent = Style::default().fg(parse_color(&theme.accent));

    let areas = field_areas(area);
    let mut cursor = None;

    for (field, field_area) in FIELDS.into_iter().zip(areas.iter().copied()) {
        let is_active = form.current_field == field;
        let editor = match field {
            FormField::Name => &mut form.name,
            FormField::ExamDate => &mut form.exam_date,
            FormField::Chapters => &mut form.chapters,
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .title(field_title(field, &editor.text()))
            .border_style(if is_active { accent } else { Style::default() });
        let inner = block.inner(field_area);
        let (height, width) = (inner.height as usize, inner.width as usize);

        if is_active {
            editor.update_scroll(height);
            editor.update_horizontal_scroll(width);
            cursor = editor
                .cursor_offset(height, width)
                .map(|(col, row)| (inner.x + col, inner.y + row));
        }

        let style = if is_active { active_style } else { inactive_style };
        let paragraph = Paragraph::new(editor_lines(editor, height, width)).style(style).block(block);
        f.render_widget(paragraph, field_area);
    }

    cursor
}

fn editor_lines(editor: &Editor, height: usize, width: usize) -> Vec<Line<'static>> {
    editor.visible_lines(height, width).into_iter().map(Line::from).collect()
}

/// Read-only view of the selected subject while browsing the list
pub fn render_subject_preview(f: &mut Frame, area: Rect, subject: Option<&Subject>, theme: &Theme) {
    let style = Style::default().fg(parse_color(&theme.fg));
    let Some(subject) = subject else {
        let paragraph = Paragraph::new("Select or add a subject to edit it.")
            .style(style.add_modifier(Modifier::DIM))
            .block(Block::default().borders(Borders::ALL).title("Subject"));
        f.render_widget(paragraph, area);
        return;
    };

    let areas = field_areas(area);
    let chapters: Vec<Line> = subject
        .chapters
        .iter()
        .enumerate()
        .map(|(i, chapter)| Line::from(format!("{}. {}", i + 1, chapter)))
        .collect();
    let values = [
        vec![Line::from(subject.name.clone())],
        vec![Line::from(subject.exam_date.clone())],
        chapters,
    ];

    for ((field, field_area), lines) in FIELDS.into_iter().zip(areas.iter().copied()).zip(values) {
        let text = match field {
            FormField::Name => subject.name.as_str(),
            FormField::ExamDate => subject.exam_date.as_str(),
            FormField::Chapters => subject.chapters_text.as_str(),
        };
        let paragraph = Paragraph::new(lines)
            .style(style)
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL).title(field_title(field, text)));
        f.render_widget(paragraph, field_area);
    }
}
