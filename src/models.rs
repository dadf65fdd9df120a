use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Stable per-session identifier for a subject.
///
/// Assigned from a monotonically increasing counter when the subject is
/// created and never reused, so deleting one subject does not change the
/// identity of the ones after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubjectId(u64);

impl SubjectId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Single-line text fields of a subject that can be replaced directly
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubjectField {
    Name,
    ExamDate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Subject {
    pub id: SubjectId,
    pub name: String,
    pub chapters: Vec<String>,
    pub chapters_text: String, // raw text the chapters were derived from
    pub exam_date: String,     // ISO 8601: YYYY-MM-DD, may be empty
}

impl Subject {
    pub fn new(id: SubjectId) -> Self {
        Self {
            id,
            name: String::new(),
            chapters: Vec::new(),
            chapters_text: String::new(),
            exam_date: String::new(),
        }
    }

    /// Replace the chapter list from free text, one chapter per line
    pub fn set_chapters_text(&mut self, raw_text: &str) {
        self.chapters = parse_chapters(raw_text);
        self.chapters_text = raw_text.to_string();
    }

    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            "(unnamed)"
        } else {
            &self.name
        }
    }
}

/// Split user text into chapters: one per line, trimmed, empty lines dropped.
/// Order and duplicates are preserved.
pub fn parse_chapters(raw_text: &str) -> Vec<String> {
    raw_text
        .split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// One dated study assignment returned by the timetable service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub date: String,
    pub subject: String,
    pub chapter: String,
    pub hours: f64,
}

impl fmt::Display for ScheduleEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} - {} ({} hrs)",
            self.date, self.subject, self.chapter, self.hours
        )
    }
}

/// Wire form of a subject. Ids and raw chapter text stay client-side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectPayload {
    pub name: String,
    pub chapters: Vec<String>,
    pub exam_date: String,
}

impl From<&Subject> for SubjectPayload {
    fn from(subject: &Subject) -> Self {
        Self {
            name: subject.name.clone(),
            chapters: subject.chapters.clone(),
            exam_date: subject.exam_date.clone(),
        }
    }
}

/// Body of `POST /generate-timetable`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimetableRequest {
    pub subjects: Vec<SubjectPayload>,
    #[serde(serialize_with = "serialize_js_number")]
    pub study_hours_per_day: f64,
}

/// Raw response body; `error` is kept as a JSON value so truthiness can be
/// judged the way the browser client did.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TimetableResponse {
    #[serde(default)]
    pub error: Option<serde_json::Value>,
    #[serde(default)]
    pub timetable: Option<Vec<ScheduleEntry>>,
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

impl TimetableResponse {
    /// The service-reported error message, if the `error` field is truthy
    pub fn error_message(&self) -> Option<String> {
        let value = self.error.as_ref()?;
        if !is_truthy(value) {
            return None;
        }
        Some(match value {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }
}

/// JavaScript truthiness for a JSON value
pub fn is_truthy(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => false,
        serde_json::Value::Bool(b) => *b,
        serde_json::Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        serde_json::Value::String(s) => !s.is_empty(),
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => true,
    }
}

/// Whole numbers go out as JSON integers (`5`, not `5.0`)
fn serialize_js_number<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.fract() == 0.0 && value.abs() < 9_007_199_254_740_992.0 {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_chapters_trims_and_drops_blank_lines() {
        assert_eq!(parse_chapters("Ch1\n\nCh2\n  Ch3  "), vec!["Ch1", "Ch2", "Ch3"]);
    }

    #[test]
    fn test_parse_chapters_keeps_duplicates_and_order() {
        assert_eq!(parse_chapters("b\na\nb"), vec!["b", "a", "b"]);
    }

    #[test]
    fn test_parse_chapters_handles_crlf_and_whitespace_only() {
        assert_eq!(parse_chapters("one\r\n   \r\ntwo\r\n"), vec!["one", "two"]);
        assert!(parse_chapters("").is_empty());
        assert!(parse_chapters(" \n\t\n").is_empty());
    }

    #[test]
    fn test_set_chapters_text_replaces_wholesale() {
        let mut subject = Subject::new(SubjectId::new(1));
        subject.set_chapters_text("a\nb\nc");
        subject.set_chapters_text("z");
        assert_eq!(subject.chapters, vec!["z"]);
        assert_eq!(subject.chapters_text, "z");
    }

    #[test]
    fn test_request_serializes_wire_schema() {
        let mut subject = Subject::new(SubjectId::new(7));
        subject.name = "Math".to_string();
        subject.exam_date = "2024-06-01".to_string();
        subject.set_chapters_text("Ch1\nCh2");

        let request = TimetableRequest {
            subjects: vec![SubjectPayload::from(&subject)],
            study_hours_per_day: 5.0,
        };
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "subjects": [{ "name": "Math", "chapters": ["Ch1", "Ch2"], "examDate": "2024-06-01" }],
                "studyHoursPerDay": 5
            })
        );
    }

    #[test]
    fn test_fractional_hours_serialize_as_float() {
        let request = TimetableRequest {
            subjects: vec![],
            study_hours_per_day: 2.5,
        };
        let text = serde_json::to_string(&request).unwrap();
        assert_eq!(text, r#"{"subjects":[],"studyHoursPerDay":2.5}"#);
    }

    #[test]
    fn test_error_truthiness() {
        use serde_json::json;
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("")));
        assert!(is_truthy(&json!("boom")));
        assert!(is_truthy(&json!(1)));
        assert!(is_truthy(&json!({ "code": 3 })));
        assert!(is_truthy(&json!([])));
    }

    #[test]
    fn test_error_message_from_non_string_value() {
        let response: TimetableResponse = serde_json::from_str(r#"{"error": {"code": 3}}"#).unwrap();
        assert_eq!(response.error_message().as_deref(), Some(r#"{"code":3}"#));

        let response: TimetableResponse = serde_json::from_str(r#"{"error": "", "timetable": []}"#).unwrap();
        assert_eq!(response.error_message(), None);
    }

    #[test]
    fn test_schedule_entry_display() {
        let entry = ScheduleEntry {
            date: "2024-05-01".to_string(),
            subject: "Math".to_string(),
            chapter: "Ch1".to_string(),
            hours: 2.0,
        };
        assert_eq!(entry.to_string(), "2024-05-01: Math - Ch1 (2 hrs)");

        let entry = ScheduleEntry { hours: 1.5, ..entry };
        assert_eq!(entry.to_string(), "2024-05-01: Math - Ch1 (1.5 hrs)");
    }
}
