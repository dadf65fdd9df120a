use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode, size as terminal_size,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use std::io;
use std::time::Duration;
use tracing::{debug, info};

use crate::tui::app::Mode;
use crate::tui::error::TuiError;
use crate::tui::widgets::editor::Editor;
use crate::tui::{App, Layout};
use crate::utils::has_primary_modifier;

const TIMETABLE_PAGE: usize = 5;

/// Guard that restores the terminal even on panic.
/// Leaving raw mode or the alternate screen enabled makes the user's
/// terminal unusable.
struct TerminalGuard {
    raw_mode_enabled: bool,
    alternate_screen_enabled: bool,
}

impl TerminalGuard {
    fn new() -> Result<Self, TuiError> {
        enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen)?;
        Ok(Self {
            raw_mode_enabled: true,
            alternate_screen_enabled: true,
        })
    }

    /// Restore on normal exit; drop becomes a no-op afterwards
    fn restore(&mut self) -> Result<(), TuiError> {
        if self.raw_mode_enabled {
            disable_raw_mode()?;
            self.raw_mode_enabled = false;
        }
        if self.alternate_screen_enabled {
            execute!(io::stdout(), LeaveAlternateScreen)?;
            self.alternate_screen_enabled = false;
        }
        Ok(())
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        // Already cleaning up, errors are ignored
        if self.raw_mode_enabled {
            let _ = disable_raw_mode();
        }
        if self.alternate_screen_enabled {
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
        }
    }
}

pub fn run_event_loop(mut app: App) -> Result<(), TuiError> {
    // Check size before entering the alternate screen so the error is readable
    let (width, height) = terminal_size()?;
    let min_width = Layout::MIN_WIDTH + 2;
    let min_height = Layout::MIN_HEIGHT + 2;
    if width < min_width || height < min_height {
        return Err(TuiError::RenderError(format!(
            "Terminal size too small. Current: {}x{}, Minimum required: {}x{}. Please resize your terminal window.",
            width, height, min_width, min_height
        )));
    }

    let mut guard = TerminalGuard::new()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
    info!(width, height, "run_event_loop: terminal ready");

    loop {
        app.poll_generation_replies();
        app.check_status_message_timeout();

        let size = terminal.size()?;
        let rect = Rect::new(0, 0, size.width, size.height);
        terminal.draw(|f| {
            let layout = Layout::calculate(rect, app.config.sidebar_width_percent);
            crate::tui::render::render(f, &mut app, &layout);
        })?;

        // Only Press events, Windows also reports Release
        if event::poll(Duration::from_millis(16))? {
            if let Event::Key(key_event) = event::read()? {
                if key_event.kind == KeyEventKind::Press && handle_key_event(&mut app, key_event)? {
                    break;
                }
            }
        }
    }

    guard.restore()?;
    info!("run_event_loop: exited");
    Ok(())
}

/// Dispatch a key press by mode. Returns true when the app should quit.
pub fn handle_key_event(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    match app.ui.mode {
        Mode::Alert => handle_alert_mode(app, key_event),
        Mode::Help => handle_help_mode(app, key_event),
        Mode::EditHours => handle_edit_hours_mode(app, key_event),
        Mode::EditSubject => handle_edit_subject_mode(app, key_event),
        Mode::View => handle_view_mode(app, key_event),
    }
}

fn handle_alert_mode(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    if matches!(key_event.code, KeyCode::Enter | KeyCode::Esc) {
        app.dismiss_alert();
    }
    Ok(false)
}

fn handle_help_mode(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    if key_event.code == KeyCode::Esc || app.keys.help.matches(&key_event) {
        app.exit_help_mode();
    }
    Ok(false)
}

fn handle_view_mode(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    let keys = app.keys.clone();

    if keys.quit.matches(&key_event) {
        return Ok(true);
    }

    if keys.list_up.matches(&key_event) || key_event.code == KeyCode::Up {
        app.move_selection_up();
    } else if keys.list_down.matches(&key_event) || key_event.code == KeyCode::Down {
        app.move_selection_down();
    } else if keys.add_subject.matches(&key_event) {
        app.add_subject();
    } else if keys.delete_subject.matches(&key_event) {
        app.delete_selected_subject();
    } else if keys.edit.matches(&key_event) || key_event.code == KeyCode::Enter {
        app.enter_edit_subject();
    } else if keys.edit_hours.matches(&key_event) {
        app.enter_edit_hours();
    } else if keys.generate.matches(&key_event) {
        app.start_generation();
    } else if keys.help.matches(&key_event) {
        app.enter_help_mode();
    } else if key_event.code == KeyCode::PageDown {
        app.scroll_timetable_down(TIMETABLE_PAGE);
    } else if key_event.code == KeyCode::PageUp {
        app.scroll_timetable_up(TIMETABLE_PAGE);
    } else {
        debug!(?key_event, "handle_view_mode: unbound key");
    }
    Ok(false)
}

fn handle_edit_subject_mode(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    let ctrl = has_primary_modifier(key_event.modifiers);

    if key_event.code == KeyCode::Esc {
        app.exit_edit_subject();
        return Ok(false);
    }
    if key_event.code == KeyCode::BackTab {
        app.navigate_form_field(false);
        return Ok(false);
    }
    if app.keys.next_field.matches(&key_event) {
        app.navigate_form_field(true);
        return Ok(false);
    }
    if app.keys.undo.matches(&key_event) {
        app.form_undo();
        return Ok(false);
    }
    if app.keys.generate_in_form.matches(&key_event) {
        app.start_generation();
        return Ok(false);
    }

    match key_event.code {
        KeyCode::Enter => app.form_enter(),
        KeyCode::Backspace => app.edit_form_field(Editor::delete_char),
        KeyCode::Delete => app.edit_form_field(Editor::delete_forward),
        KeyCode::Left => app.move_form_cursor(Editor::move_cursor_left),
        KeyCode::Right => app.move_form_cursor(Editor::move_cursor_right),
        KeyCode::Up => app.move_form_cursor(Editor::move_cursor_up),
        KeyCode::Down => app.move_form_cursor(Editor::move_cursor_down),
        KeyCode::Home => app.move_form_cursor(Editor::move_cursor_home),
        KeyCode::End => app.move_form_cursor(Editor::move_cursor_end),
        KeyCode::Char(c) if !ctrl && !key_event.modifiers.contains(KeyModifiers::ALT) => {
            app.edit_form_field(|editor| editor.insert_char(c));
        }
        _ => {}
    }
    Ok(false)
}

fn handle_edit_hours_mode(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    match key_event.code {
        KeyCode::Enter | KeyCode::Esc => app.exit_edit_hours(),
        KeyCode::Backspace => app.edit_hours(Editor::delete_char),
        KeyCode::Delete => app.edit_hours(Editor::delete_forward),
        KeyCode::Left => app.move_hours_cursor(Editor::move_cursor_left),
        KeyCode::Right => app.move_hours_cursor(Editor::move_cursor_right),
        KeyCode::Home => app.move_hours_cursor(Editor::move_cursor_home),
        KeyCode::End => app.move_hours_cursor(Editor::move_cursor_end),
        KeyCode::Char(c) if !has_primary_modifier(key_event.modifiers) => {
            app.edit_hours(|editor| editor.insert_char(c));
        }
        _ => {}
    }
    Ok(false)
}
