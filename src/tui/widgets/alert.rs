use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::config::Theme;
use crate::tui::app::AlertState;
use crate::tui::widgets::{color::parse_color, popup_area};

/// Blocking message box for service and transport errors
pub fn render_alert(f: &mut Frame, area: Rect, alert: &AlertState, theme: &Theme) {
    let style = Style::default().fg(parse_color(&theme.fg)).bg(parse_color(&theme.bg));
    let accent = Style::default().fg(parse_color(&theme.accent)).add_modifier(Modifier::BOLD);

    let popup = popup_area(area, 50, 35);
    f.render_widget(Clear, popup);

    let mut lines: Vec<Line> = Vec::new();
    lines.push(Line::from(""));
    for message_line in alert.message.lines() {
        lines.push(Line::from(Span::styled(message_line.to_string(), style)));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Press Enter or Esc to dismiss", style)));

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(Span::styled(alert.title.clone(), accent))
                .title_alignment(Alignment::Center)
                .style(style),
        )
        .style(style)
        .wrap(Wrap { trim: true })
        .alignment(Alignment::Center);

    f.render_widget(paragraph, popup);
}
