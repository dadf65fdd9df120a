//! Client side of the timetable service
//!
//! The service is an opaque collaborator: it receives subjects and a daily
//! hour budget and answers with dated schedule entries or an error string.

use async_trait::async_trait;

mod error;
mod http;

pub use error::ClientError;
pub use http::{HttpTimetableClient, interpret_response};

use crate::models::{ScheduleEntry, TimetableRequest};

/// Outcome of a request that reached the service and was understood
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceReply {
    /// The service produced a schedule
    Timetable(Vec<ScheduleEntry>),
    /// The service reported an `error` message
    Rejected(String),
}

/// Anything that can turn a request into a timetable.
///
/// Each call is independent: one request, one reply, no retries.
#[async_trait]
pub trait TimetableService: Send + Sync {
    async fn generate(&self, request: &TimetableRequest) -> Result<ServiceReply, ClientError>;
}
