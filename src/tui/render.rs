use ratatui::Frame;
use ratatui::layout::Alignment;
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders};

use crate::tui::app::Mode;
use crate::tui::widgets::{
    alert::render_alert,
    color::parse_color,
    help::render_help,
    hours_field::render_hours_field,
    status_bar::render_status_bar,
    subject_form::{render_subject_form, render_subject_preview},
    subject_list::render_subject_list,
    timetable::render_timetable,
};
use crate::tui::{App, Layout};
use crate::utils::format_key_binding_for_display as key;

pub fn render(f: &mut Frame, app: &mut App, layout: &Layout) {
    let theme = app.theme.clone();
    let outer_block = Block::default()
        .borders(Borders::ALL)
        .title("Study Planner")
        .title_alignment(Alignment::Center)
        .style(Style::default().fg(parse_color(&theme.fg)).bg(parse_color(&theme.bg)));
    f.render_widget(outer_block, f.area());

    let mode = app.ui.mode;
    let mut cursor = render_hours_field(
        f,
        layout.hours_area,
        app.planner.study_hours_per_day,
        app.hours_editor.as_mut().filter(|_| mode == Mode::EditHours),
        &theme,
    );

    render_subject_list(
        f,
        layout.sidebar_area,
        &app.planner.subjects,
        &mut app.ui.list_state,
        mode == Mode::View,
        &key(&app.config.key_bindings.add_subject),
        &theme,
    );

    if mode == Mode::EditSubject && app.form.is_some() {
        if let Some(form) = app.form.as_mut() {
            cursor = render_subject_form(f, layout.main_area, form, &theme);
        }
    } else {
        render_subject_preview(f, layout.main_area, app.selected_subject(), &theme);
    }

    render_timetable(
        f,
        layout.timetable_area,
        &app.planner.generated_timetable,
        app.ui.timetable_scroll,
        &key(&app.config.key_bindings.generate),
        &theme,
    );

    let message = status_text(app);
    render_status_bar(f, layout.status_area, message.as_deref(), &key_hints(app), &theme);

    // Popups draw over everything else
    match mode {
        Mode::Help => render_help(f, f.area(), &app.config.key_bindings, &theme),
        Mode::Alert => {
            if let Some(alert) = app.alert.as_ref() {
                render_alert(f, f.area(), alert, &theme);
            }
        }
        _ => {
            if let Some(position) = cursor {
                f.set_cursor_position(position);
            }
        }
    }
}

/// Status line text: a pending message wins, then the in-flight notice
fn status_text(app: &App) -> Option<String> {
    match (&app.status.message, app.is_generating()) {
        (Some(message), _) => Some(message.clone()),
        (None, true) => Some("Generating…".to_string()),
        (None, false) => None,
    }
}

fn key_hints(app: &App) -> Vec<String> {
    let kb = &app.config.key_bindings;
    match app.ui.mode {
        Mode::View => vec![
            format!("{}: Add", key(&kb.add_subject)),
            format!("{}: Edit", key(&kb.edit)),
            format!("{}: Delete", key(&kb.delete_subject)),
            format!("{}: Hours", key(&kb.edit_hours)),
            format!("{}: Generate", key(&kb.generate)),
            format!("{}: Help", key(&kb.help)),
            format!("{}: Quit", key(&kb.quit)),
        ],
        Mode::EditSubject => vec![
            format!("{}: Next field", key(&kb.next_field)),
            format!("{}: Undo", key(&kb.undo)),
            format!("{}: Generate", key(&kb.generate_in_form)),
            "Esc: Done".to_string(),
        ],
        Mode::EditHours => vec!["Enter/Esc: Done".to_string()],
        Mode::Help => vec![format!("Esc/{}: Close help", key(&kb.help))],
        Mode::Alert => vec!["Enter/Esc: Dismiss".to_string()],
    }
}
