pub mod cli;
pub mod client;
pub mod config;
pub mod logging;
pub mod models;
pub mod planner;
pub mod tui;
pub mod utils;

pub use client::{ClientError, HttpTimetableClient, ServiceReply, TimetableService};
pub use config::Config;
pub use models::{ScheduleEntry, Subject, SubjectId};
pub use planner::{PlannerAction, PlannerState, Transition};
pub use utils::Profile;
