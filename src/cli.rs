use clap::{Parser, Subcommand};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::client::TimetableService;
use crate::models::SubjectField;
use crate::planner::{self, PlannerError, PlannerState, Transition};

#[derive(Parser)]
#[command(name = "planner")]
#[command(about = "Study Planner - collect subjects and request a study timetable")]
#[command(version)]
pub struct Cli {
    /// Custom config file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Use development mode (uses separate dev config/logs)
    #[arg(long)]
    pub dev: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Override the timetable service base URL
    #[arg(long)]
    pub service_url: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Launch interactive TUI (default if no subcommand)
    Tui,
    /// Request a timetable once for subjects read from a JSON file
    Generate {
        /// JSON file: {"subjects": [{"name", "chapters", "examDate"}], "studyHoursPerDay"}
        #[arg(short, long)]
        input: PathBuf,
        /// Study hours per day (overrides the file)
        #[arg(long)]
        hours: Option<f64>,
        /// Print the raw timetable JSON instead of one line per entry
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Failed to read {path}: {message}")]
    ReadError { path: String, message: String },
    #[error("Invalid input file: {0}")]
    InputError(#[from] serde_json::Error),
    #[error("Planner error: {0}")]
    PlannerError(#[from] PlannerError),
    #[error("Timetable service reported: {0}")]
    ServiceRejected(String),
    #[error("Request failed: {0}")]
    RequestFailed(String),
}

/// Chapters may be given as a list or as one block of text
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ChaptersInput {
    List(Vec<String>),
    Text(String),
}

impl ChaptersInput {
    fn to_text(&self) -> String {
        match self {
            ChaptersInput::List(items) => items.join("\n"),
            ChaptersInput::Text(text) => text.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub chapters: Option<ChaptersInput>,
    #[serde(default)]
    pub exam_date: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanInput {
    #[serde(default)]
    pub subjects: Vec<SubjectInput>,
    #[serde(default)]
    pub study_hours_per_day: Option<f64>,
}

impl PlanInput {
    pub fn from_json(text: &str) -> Result<Self, CliError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, CliError> {
        let text = fs::read_to_string(path).map_err(|e| CliError::ReadError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_json(&text)
    }

    /// Build planner state through the normal actions, so chapters are
    /// normalized exactly as typed input would be
    pub fn into_state(self, default_hours: f64, hours_override: Option<f64>) -> Result<PlannerState, CliError> {
        let mut state = PlannerState::new(default_hours);
        if let Some(hours) = hours_override.or(self.study_hours_per_day) {
            state.set_study_hours_per_day(hours)?;
        }
        for subject in self.subjects {
            let id = state.add_subject();
            state.update_subject_field(id, SubjectField::Name, subject.name)?;
            state.update_subject_field(id, SubjectField::ExamDate, subject.exam_date)?;
            if let Some(chapters) = subject.chapters {
                state.update_chapters(id, chapters.to_text())?;
            }
        }
        Ok(state)
    }
}

/// Handle the generate command
pub async fn handle_generate(
    input: &Path,
    hours: Option<f64>,
    json: bool,
    default_hours: f64,
    service: &dyn TimetableService,
) -> Result<(), CliError> {
    let mut state = PlanInput::from_file(input)?.into_state(default_hours, hours)?;
    info!(input = %input.display(), subjects = state.subjects.len(), "handle_generate: called");

    match planner::generate_timetable(&mut state, service).await? {
        Transition::TimetableReplaced { .. } => {
            if json {
                let body = serde_json::json!({ "timetable": state.generated_timetable });
                println!("{}", serde_json::to_string_pretty(&body)?);
            } else if state.generated_timetable.is_empty() {
                println!("The service returned an empty timetable");
            } else {
                for entry in &state.generated_timetable {
                    println!("{}", entry);
                }
            }
            Ok(())
        }
        Transition::ServiceRejected(message) => Err(CliError::ServiceRejected(message)),
        Transition::RequestFailed(message) => Err(CliError::RequestFailed(message)),
        other => Err(CliError::RequestFailed(format!("Unexpected outcome: {:?}", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ServiceReply;
    use crate::client::mock::MockTimetableService;
    use crate::models::ScheduleEntry;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_generate_command() {
        let cli = Cli::try_parse_from([
            "planner", "--dev", "--service-url", "http://localhost:9000", "generate", "-i", "plan.json", "--hours", "3",
        ])
        .unwrap();
        assert!(cli.dev);
        assert_eq!(cli.service_url.as_deref(), Some("http://localhost:9000"));
        match cli.command {
            Some(Commands::Generate { input, hours, json }) => {
                assert_eq!(input, PathBuf::from("plan.json"));
                assert_eq!(hours, Some(3.0));
                assert!(!json);
            }
            _ => panic!("expected generate command"),
        }
    }

    #[test]
    fn test_plan_input_accepts_list_or_text_chapters() {
        let input = PlanInput::from_json(
            r#"{
                "subjects": [
                    {"name": "Math", "chapters": ["  Algebra ", "", "Geometry"], "examDate": "2024-06-01"},
                    {"name": "Bio", "chapters": "Cells\n\n  Genetics  "}
                ],
                "studyHoursPerDay": 4
            }"#,
        )
        .unwrap();
        let state = input.into_state(5.0, None).unwrap();

        assert_eq!(state.study_hours_per_day, 4.0);
        assert_eq!(state.subjects[0].chapters, vec!["Algebra", "Geometry"]);
        assert_eq!(state.subjects[0].exam_date, "2024-06-01");
        assert_eq!(state.subjects[1].chapters, vec!["Cells", "Genetics"]);
        assert_eq!(state.subjects[1].exam_date, "");
    }

    #[test]
    fn test_hours_override_and_default() {
        let state = PlanInput::from_json(r#"{"subjects": [], "studyHoursPerDay": 4}"#)
            .unwrap()
            .into_state(5.0, Some(2.0))
            .unwrap();
        assert_eq!(state.study_hours_per_day, 2.0);

        let state = PlanInput::from_json(r#"{"subjects": []}"#).unwrap().into_state(6.0, None).unwrap();
        assert_eq!(state.study_hours_per_day, 6.0);
    }

    #[test]
    fn test_non_finite_default_hours_never_reach_the_request() {
        let state = PlanInput::from_json(r#"{"subjects": []}"#)
            .unwrap()
            .into_state(f64::NAN, None)
            .unwrap();
        assert_eq!(state.study_hours_per_day, 5.0);

        let err = PlanInput::from_json(r#"{"subjects": []}"#)
            .unwrap()
            .into_state(5.0, Some(f64::INFINITY))
            .unwrap_err();
        assert!(err.to_string().contains("finite"));
    }

    #[tokio::test]
    async fn test_handle_generate_reports_rejection() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plan.json");
        fs::write(&path, r#"{"subjects": []}"#).unwrap();

        let service = MockTimetableService::new(vec![ServiceReply::Rejected("No subjects".to_string())]);
        let err = handle_generate(&path, None, false, 5.0, &service).await.unwrap_err();
        assert!(matches!(err, CliError::ServiceRejected(ref m) if m == "No subjects"));
    }

    #[tokio::test]
    async fn test_handle_generate_success() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plan.json");
        fs::write(&path, r#"{"subjects": [{"name": "Math", "chapters": ["Ch1"], "examDate": "2024-06-01"}]}"#).unwrap();

        let service = MockTimetableService::new(vec![ServiceReply::Timetable(vec![ScheduleEntry {
            date: "2024-05-01".to_string(),
            subject: "Math".to_string(),
            chapter: "Ch1".to_string(),
            hours: 5.0,
        }])]);
        handle_generate(&path, None, true, 5.0, &service).await.unwrap();
        assert_eq!(service.call_count(), 1);
        assert_eq!(service.requests()[0].subjects[0].chapters, vec!["Ch1"]);
    }

    #[tokio::test]
    async fn test_handle_generate_missing_file() {
        let service = MockTimetableService::new(vec![]);
        let err = handle_generate(Path::new("/nonexistent/plan.json"), None, false, 5.0, &service)
            .await
            .unwrap_err();
        assert!(matches!(err, CliError::ReadError { .. }));
        assert_eq!(service.call_count(), 0);
    }
}
