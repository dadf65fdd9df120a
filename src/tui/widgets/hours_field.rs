use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::config::Theme;
use crate::tui::widgets::color::parse_color;
use crate::tui::widgets::editor::Editor;

/// Study hours per day. Shows the editor text while editing, the stored
/// value otherwise. Returns the cursor position when editing.
pub fn render_hours_field(
    f: &mut Frame,
    area: Rect,
    hours: f64,
    editor: Option<&mut Editor>,
    theme: &Theme,
) -> Option<(u16, u16)> {
    let editing = editor.is_some();
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Study Hours Per Day")
        .border_style(if editing {
            Style::default().fg(parse_color(&theme.accent))
        } else {
            Style::default()
        });
    let inner = block.inner(area);

    let (text, cursor) = match editor {
        Some(editor) => {
            let width = inner.width as usize;
            editor.update_horizontal_scroll(width);
            let text = editor.visible_lines(1, width).into_iter().next().unwrap_or_default();
            let cursor = editor.cursor_offset(1, width).map(|(col, row)| (inner.x + col, inner.y + row));
            (text, cursor)
        }
        None => (hours.to_string(), None),
    };

    let style = if editing {
        Style::default()
            .bg(parse_color(&theme.highlight_bg))
            .fg(parse_color(&theme.highlight_fg))
    } else {
        Style::default().fg(parse_color(&theme.fg))
    };
    f.render_widget(Paragraph::new(text).style(style).block(block), area);
    cursor
}
