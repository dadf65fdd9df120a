//! Planner state container
//!
//! All mutations go through [`PlannerAction`] so every transition can be
//! exercised without a terminal. Generation is split into issuing a request
//! ([`PlannerState::begin_generation`]) and applying its reply, so the
//! network call can run elsewhere and only the newest reply is kept.

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::client::{ClientError, ServiceReply, TimetableService};
use crate::models::{ScheduleEntry, Subject, SubjectField, SubjectId, SubjectPayload, TimetableRequest};

pub const DEFAULT_STUDY_HOURS: f64 = 5.0;

/// Sequence number of a generation request; 0 means none issued yet
pub type RequestSeq = u64;

#[derive(Debug, Error, PartialEq)]
pub enum PlannerError {
    #[error("Subject {0} does not exist")]
    UnknownSubject(SubjectId),
    #[error("Study hours must be a finite number, got {0}")]
    InvalidHours(f64),
}

#[derive(Debug)]
pub enum PlannerAction {
    AddSubject,
    UpdateSubjectField {
        id: SubjectId,
        field: SubjectField,
        value: String,
    },
    UpdateChapters {
        id: SubjectId,
        raw_text: String,
    },
    DeleteSubject {
        id: SubjectId,
    },
    SetStudyHoursPerDay(f64),
    ReceiveReply {
        seq: RequestSeq,
        reply: Result<ServiceReply, ClientError>,
    },
}

/// What an applied action did, for the caller to report
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    Updated,
    SubjectAdded(SubjectId),
    SubjectDeleted(SubjectId),
    TimetableReplaced { entries: usize },
    /// The service returned an `error` field; the timetable is unchanged
    ServiceRejected(String),
    /// Transport or decoding failed; the timetable is unchanged
    RequestFailed(String),
    StaleReplyDiscarded { seq: RequestSeq },
}

/// A request snapshot waiting to be sent
#[derive(Debug, Clone, PartialEq)]
pub struct PendingRequest {
    pub seq: RequestSeq,
    pub request: TimetableRequest,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlannerState {
    pub subjects: Vec<Subject>,
    pub study_hours_per_day: f64,
    pub generated_timetable: Vec<ScheduleEntry>,
    latest_request: RequestSeq,
    next_subject_id: u64,
}

impl Default for PlannerState {
    fn default() -> Self {
        Self::new(DEFAULT_STUDY_HOURS)
    }
}

impl PlannerState {
    /// A non-finite starting budget falls back to [`DEFAULT_STUDY_HOURS`]
    pub fn new(study_hours_per_day: f64) -> Self {
        let study_hours_per_day = if study_hours_per_day.is_finite() {
            study_hours_per_day
        } else {
            warn!(hours = study_hours_per_day, "PlannerState::new: non-finite hours, using default");
            DEFAULT_STUDY_HOURS
        };
        Self {
            subjects: Vec::new(),
            study_hours_per_day,
            generated_timetable: Vec::new(),
            latest_request: 0,
            next_subject_id: 1,
        }
    }

    pub fn apply(&mut self, action: PlannerAction) -> Result<Transition, PlannerError> {
        match action {
            PlannerAction::AddSubject => Ok(Transition::SubjectAdded(self.push_subject())),
            PlannerAction::UpdateSubjectField { id, field, value } => {
                let subject = self.subject_mut(id)?;
                match field {
                    SubjectField::Name => subject.name = value,
                    SubjectField::ExamDate => subject.exam_date = value,
                }
                Ok(Transition::Updated)
            }
            PlannerAction::UpdateChapters { id, raw_text } => {
                let subject = self.subject_mut(id)?;
                subject.set_chapters_text(&raw_text);
                Ok(Transition::Updated)
            }
            PlannerAction::DeleteSubject { id } => {
                let position = self.position_of(id).ok_or(PlannerError::UnknownSubject(id))?;
                self.subjects.remove(position);
                debug!(%id, position, "apply: subject deleted");
                Ok(Transition::SubjectDeleted(id))
            }
            PlannerAction::SetStudyHoursPerDay(hours) => {
                if !hours.is_finite() {
                    return Err(PlannerError::InvalidHours(hours));
                }
                self.study_hours_per_day = hours;
                Ok(Transition::Updated)
            }
            PlannerAction::ReceiveReply { seq, reply } => Ok(self.receive_reply(seq, reply)),
        }
    }

    /// Snapshot the current state as a request and mark it as the newest.
    ///
    /// Any reply to an earlier request is discarded from now on.
    pub fn begin_generation(&mut self) -> PendingRequest {
        self.latest_request += 1;
        info!(seq = self.latest_request, subjects = self.subjects.len(), "begin_generation: called");
        PendingRequest {
            seq: self.latest_request,
            request: self.to_request(),
        }
    }

    pub fn to_request(&self) -> TimetableRequest {
        TimetableRequest {
            subjects: self.subjects.iter().map(SubjectPayload::from).collect(),
            study_hours_per_day: self.study_hours_per_day,
        }
    }

    pub fn latest_request(&self) -> RequestSeq {
        self.latest_request
    }

    pub fn subject(&self, id: SubjectId) -> Option<&Subject> {
        self.subjects.iter().find(|s| s.id == id)
    }

    pub fn position_of(&self, id: SubjectId) -> Option<usize> {
        self.subjects.iter().position(|s| s.id == id)
    }

    /// Resolve a display position to the subject living there now
    pub fn subject_id_at(&self, index: usize) -> Option<SubjectId> {
        self.subjects.get(index).map(|s| s.id)
    }

    // Convenience wrappers around apply()

    pub fn add_subject(&mut self) -> SubjectId {
        self.push_subject()
    }

    pub fn update_subject_field(
        &mut self,
        id: SubjectId,
        field: SubjectField,
        value: impl Into<String>,
    ) -> Result<(), PlannerError> {
        self.apply(PlannerAction::UpdateSubjectField {
            id,
            field,
            value: value.into(),
        })
        .map(|_| ())
    }

    pub fn update_chapters(&mut self, id: SubjectId, raw_text: impl Into<String>) -> Result<(), PlannerError> {
        self.apply(PlannerAction::UpdateChapters {
            id,
            raw_text: raw_text.into(),
        })
        .map(|_| ())
    }

    pub fn delete_subject(&mut self, id: SubjectId) -> Result<(), PlannerError> {
        self.apply(PlannerAction::DeleteSubject { id }).map(|_| ())
    }

    pub fn set_study_hours_per_day(&mut self, hours: f64) -> Result<(), PlannerError> {
        self.apply(PlannerAction::SetStudyHoursPerDay(hours)).map(|_| ())
    }

    fn push_subject(&mut self) -> SubjectId {
        let id = SubjectId::new(self.next_subject_id);
        self.next_subject_id += 1;
        self.subjects.push(Subject::new(id));
        debug!(%id, count = self.subjects.len(), "push_subject: subject added");
        id
    }

    fn subject_mut(&mut self, id: SubjectId) -> Result<&mut Subject, PlannerError> {
        self.subjects
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(PlannerError::UnknownSubject(id))
    }

    fn receive_reply(&mut self, seq: RequestSeq, reply: Result<ServiceReply, ClientError>) -> Transition {
        if seq != self.latest_request {
            warn!(seq, latest = self.latest_request, "receive_reply: discarding stale reply");
            return Transition::StaleReplyDiscarded { seq };
        }

        match reply {
            Ok(ServiceReply::Timetable(entries)) => {
                info!(seq, entries = entries.len(), "receive_reply: timetable replaced");
                let count = entries.len();
                self.generated_timetable = entries;
                Transition::TimetableReplaced { entries: count }
            }
            Ok(ServiceReply::Rejected(message)) => {
                warn!(seq, %message, "receive_reply: service rejected request");
                Transition::ServiceRejected(message)
            }
            Err(e) => {
                warn!(seq, error = %e, "receive_reply: request failed");
                Transition::RequestFailed(e.to_string())
            }
        }
    }
}

/// Pure form of [`PlannerState::apply`]: the input state is left untouched.
pub fn reduce(state: &PlannerState, action: PlannerAction) -> Result<(PlannerState, Transition), PlannerError> {
    let mut next = state.clone();
    let transition = next.apply(action)?;
    Ok((next, transition))
}

/// Issue one request, wait for it and apply the reply
pub async fn generate_timetable(
    state: &mut PlannerState,
    service: &dyn TimetableService,
) -> Result<Transition, PlannerError> {
    let pending = state.begin_generation();
    let reply = service.generate(&pending.request).await;
    state.apply(PlannerAction::ReceiveReply {
        seq: pending.seq,
        reply,
    })
}
