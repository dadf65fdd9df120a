use directories::ProjectDirs;
use std::path::PathBuf;

/// Profile mode for the application (dev or prod)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    Dev,
    Prod,
}

impl Profile {
    pub fn app_name(self) -> &'static str {
        match self {
            Profile::Dev => "study-planner-dev",
            Profile::Prod => "study-planner",
        }
    }
}

/// Get the configuration directory path
/// If profile is Dev, uses "study-planner-dev" instead of "study-planner"
pub fn get_config_dir(profile: Profile) -> Option<PathBuf> {
    ProjectDirs::from("com", "study-planner", profile.app_name())
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the data directory path (log files live here)
pub fn get_data_dir(profile: Profile) -> Option<PathBuf> {
    ProjectDirs::from("com", "study-planner", profile.app_name())
        .map(|dirs| dirs.data_dir().to_path_buf())
}

/// Parse a date string in ISO 8601 format (YYYY-MM-DD)
pub fn parse_date(date_str: &str) -> Result<chrono::NaiveDate, chrono::ParseError> {
    chrono::NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
}

/// Whether an exam date should carry a format hint in the form.
/// Empty dates are allowed and never flagged.
pub fn exam_date_needs_hint(date_str: &str) -> bool {
    !date_str.is_empty() && parse_date(date_str).is_err()
}

/// Parse the study-hours input the way a browser number field does:
/// empty text is 0, anything else must be a finite number
pub fn parse_study_hours(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }
    trimmed.parse::<f64>().ok().filter(|h| h.is_finite())
}

/// Parsed key binding information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedKeyBinding {
    pub key_code: crossterm::event::KeyCode,
    pub requires_ctrl: bool,
}

impl ParsedKeyBinding {
    /// Whether a key event triggers this binding
    pub fn matches(&self, event: &crossterm::event::KeyEvent) -> bool {
        event.code == self.key_code && has_primary_modifier(event.modifiers) == self.requires_ctrl
    }
}

/// Check if a key event has the primary modifier (Ctrl on Windows/Linux, Option/Alt on macOS)
pub fn has_primary_modifier(modifiers: crossterm::event::KeyModifiers) -> bool {
    #[cfg(target_os = "macos")]
    {
        modifiers.contains(crossterm::event::KeyModifiers::CONTROL)
            || modifiers.contains(crossterm::event::KeyModifiers::ALT)
    }

    #[cfg(not(target_os = "macos"))]
    {
        modifiers.contains(crossterm::event::KeyModifiers::CONTROL)
    }
}

/// Format a key binding string for display, showing the platform-appropriate modifier
pub fn format_key_binding_for_display(key_binding: &str) -> String {
    #[cfg(target_os = "macos")]
    {
        key_binding.replace("Ctrl+", "Opt+")
    }

    #[cfg(not(target_os = "macos"))]
    {
        key_binding.to_string()
    }
}

/// Parse a key binding string from config into a ParsedKeyBinding
/// Supports: single keys ("q", "a"), special keys ("Enter", "Tab", "F1"),
/// and the Ctrl modifier ("Ctrl+z")
pub fn parse_key_binding(key_str: &str) -> Result<ParsedKeyBinding, String> {
    let key_str = key_str.trim();

    if let Some(key_part) = key_str.strip_prefix("Ctrl+") {
        let key_code = parse_key_code(key_part)?;
        return Ok(ParsedKeyBinding {
            key_code,
            requires_ctrl: true,
        });
    }

    let key_code = parse_key_code(key_str)?;
    Ok(ParsedKeyBinding {
        key_code,
        requires_ctrl: false,
    })
}

/// Parse a key code from a string (without modifiers)
fn parse_key_code(key_str: &str) -> Result<crossterm::event::KeyCode, String> {
    use crossterm::event::KeyCode;

    match key_str {
        "Enter" => Ok(KeyCode::Enter),
        "Esc" | "Escape" => Ok(KeyCode::Esc),
        "Backspace" => Ok(KeyCode::Backspace),
        "Tab" => Ok(KeyCode::Tab),
        "Space" | " " => Ok(KeyCode::Char(' ')),
        "Left" => Ok(KeyCode::Left),
        "Right" => Ok(KeyCode::Right),
        "Up" => Ok(KeyCode::Up),
        "Down" => Ok(KeyCode::Down),
        "Home" => Ok(KeyCode::Home),
        "End" => Ok(KeyCode::End),
        "Delete" => Ok(KeyCode::Delete),
        _ => {
            if let Some(n) = key_str.strip_prefix('F').and_then(|n| n.parse::<u8>().ok()) {
                if (1..=12).contains(&n) {
                    return Ok(KeyCode::F(n));
                }
            }
            let mut chars = key_str.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(KeyCode::Char(c)),
                _ => Err(format!("Unknown key binding: {}", key_str)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    #[test]
    fn test_parse_simple_and_special_keys() {
        assert_eq!(parse_key_binding("g").unwrap().key_code, KeyCode::Char('g'));
        assert_eq!(parse_key_binding("Tab").unwrap().key_code, KeyCode::Tab);
        assert_eq!(parse_key_binding("F1").unwrap().key_code, KeyCode::F(1));
        assert_eq!(parse_key_binding("F12").unwrap().key_code, KeyCode::F(12));
        assert_eq!(parse_key_binding(" Space ").unwrap().key_code, KeyCode::Char(' '));
    }

    #[test]
    fn test_parse_ctrl_binding() {
        let binding = parse_key_binding("Ctrl+z").unwrap();
        assert_eq!(binding.key_code, KeyCode::Char('z'));
        assert!(binding.requires_ctrl);
    }

    #[test]
    fn test_parse_unknown_binding() {
        assert!(parse_key_binding("Hyper+x").is_err());
        assert!(parse_key_binding("F13").is_err());
        assert!(parse_key_binding("").is_err());
    }

    #[test]
    fn test_binding_matches_event() {
        let binding = parse_key_binding("Ctrl+g").unwrap();
        assert!(binding.matches(&KeyEvent::new(KeyCode::Char('g'), KeyModifiers::CONTROL)));
        assert!(!binding.matches(&KeyEvent::new(KeyCode::Char('g'), KeyModifiers::NONE)));

        let plain = parse_key_binding("g").unwrap();
        assert!(plain.matches(&KeyEvent::new(KeyCode::Char('g'), KeyModifiers::NONE)));
    }

    #[test]
    fn test_parse_study_hours() {
        assert_eq!(parse_study_hours(""), Some(0.0));
        assert_eq!(parse_study_hours(" 6 "), Some(6.0));
        assert_eq!(parse_study_hours("-1.5"), Some(-1.5));
        assert_eq!(parse_study_hours("abc"), None);
        assert_eq!(parse_study_hours("inf"), None);
        assert_eq!(parse_study_hours("NaN"), None);
    }

    #[test]
    fn test_exam_date_hint() {
        assert!(!exam_date_needs_hint(""));
        assert!(!exam_date_needs_hint("2024-06-01"));
        assert!(exam_date_needs_hint("06/01/2024"));
        assert!(exam_date_needs_hint("2024-02-30"));
    }
}
