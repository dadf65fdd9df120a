use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::widgets::Paragraph;

use crate::config::Theme;
use crate::tui::widgets::color::{get_contrast_text_color, parse_color};
use crate::tui::widgets::truncate_with_ellipsis;

const SEPARATOR: &str = " • ";
const ELLIPSIS: &str = "...";

pub fn render_status_bar(f: &mut Frame, area: Rect, message: Option<&str>, key_hints: &[String], theme: &Theme) {
    let max_width = area.width as usize;

    let (content, style) = match message {
        Some(msg) => {
            // Messages get the highlight background so they stand out from hints
            let highlight_bg = parse_color(&theme.highlight_bg);
            let style = Style::default()
                .fg(get_contrast_text_color(highlight_bg))
                .bg(highlight_bg)
                .add_modifier(Modifier::BOLD);
            (truncate_with_ellipsis(msg, max_width), style)
        }
        None => {
            let style = Style::default().fg(parse_color(&theme.fg)).bg(parse_color(&theme.bg));
            (fit_hints(key_hints, max_width), style)
        }
    };

    f.render_widget(Paragraph::new(content).style(style), area);
}

/// Join as many hints as fit, ending with an ellipsis when some were dropped
pub fn fit_hints(hints: &[String], max_width: usize) -> String {
    let mut text = String::new();
    for (i, hint) in hints.iter().enumerate() {
        let sep_len = if i == 0 { 0 } else { SEPARATOR.chars().count() };
        let would_be = text.chars().count() + sep_len + hint.chars().count();
        if would_be > max_width {
            if text.is_empty() {
                return truncate_with_ellipsis(hint, max_width);
            }
            if text.chars().count() + ELLIPSIS.len() > max_width {
                let keep = max_width.saturating_sub(ELLIPSIS.len());
                text = text.chars().take(keep).collect();
            }
            text.push_str(ELLIPSIS);
            return text;
        }
        if i > 0 {
            text.push_str(SEPARATOR);
        }
        text.push_str(hint);
    }
    text
}
