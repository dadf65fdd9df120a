use ratatui::widgets::ListState;
use std::sync::Arc;
use std::time::Instant;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

use crate::client::{ClientError, ServiceReply, TimetableService};
use crate::config::{Config, KeyBindings, Theme};
use crate::models::{Subject, SubjectField, SubjectId};
use crate::planner::{PendingRequest, PlannerAction, PlannerState, RequestSeq, Transition};
use crate::tui::error::TuiError;
use crate::tui::widgets::editor::Editor;
use crate::utils::{self, ParsedKeyBinding};

const STATUS_MESSAGE_TIMEOUT_SECS: u64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    View,
    EditSubject,
    EditHours,
    Help,
    Alert,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Name,
    ExamDate,
    Chapters,
}

impl FormField {
    pub fn next(self) -> Self {
        match self {
            FormField::Name => FormField::ExamDate,
            FormField::ExamDate => FormField::Chapters,
            FormField::Chapters => FormField::Name,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            FormField::Name => FormField::Chapters,
            FormField::ExamDate => FormField::Name,
            FormField::Chapters => FormField::ExamDate,
        }
    }

    pub fn is_multi_line(self) -> bool {
        self == FormField::Chapters
    }

    pub fn label(self) -> &'static str {
        match self {
            FormField::Name => "Subject Name",
            FormField::ExamDate => "Exam Date (YYYY-MM-DD)",
            FormField::Chapters => "Chapters (one per line)",
        }
    }
}

/// Editors for the subject being edited. Text lives here while the
/// subject in planner state is updated on every keystroke.
#[derive(Debug, Clone)]
pub struct SubjectForm {
    pub subject_id: SubjectId,
    pub current_field: FormField,
    pub name: Editor,
    pub exam_date: Editor,
    pub chapters: Editor,
}

impl SubjectForm {
    pub fn for_subject(subject: &Subject) -> Self {
        Self {
            subject_id: subject.id,
            current_field: FormField::Name,
            name: Editor::from_string(&subject.name),
            exam_date: Editor::from_string(&subject.exam_date),
            chapters: Editor::from_string(&subject.chapters_text),
        }
    }

    pub fn editor(&self, field: FormField) -> &Editor {
        match field {
            FormField::Name => &self.name,
            FormField::ExamDate => &self.exam_date,
            FormField::Chapters => &self.chapters,
        }
    }

    pub fn current_editor_mut(&mut self) -> &mut Editor {
        match self.current_field {
            FormField::Name => &mut self.name,
            FormField::ExamDate => &mut self.exam_date,
            FormField::Chapters => &mut self.chapters,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlertState {
    pub title: String,
    pub message: String,
    return_to: Mode,
}

/// Key bindings parsed once from config
#[derive(Debug, Clone)]
pub struct KeyMap {
    pub quit: ParsedKeyBinding,
    pub add_subject: ParsedKeyBinding,
    pub delete_subject: ParsedKeyBinding,
    pub edit: ParsedKeyBinding,
    pub edit_hours: ParsedKeyBinding,
    pub generate: ParsedKeyBinding,
    pub generate_in_form: ParsedKeyBinding,
    pub list_up: ParsedKeyBinding,
    pub list_down: ParsedKeyBinding,
    pub next_field: ParsedKeyBinding,
    pub help: ParsedKeyBinding,
    pub undo: ParsedKeyBinding,
}

impl KeyMap {
    pub fn from_config(bindings: &KeyBindings) -> Result<Self, TuiError> {
        let parse = |name: &str, value: &str| {
            utils::parse_key_binding(value).map_err(|e| TuiError::KeyBindingError(format!("{}: {}", name, e)))
        };
        Ok(Self {
            quit: parse("quit", &bindings.quit)?,
            add_subject: parse("add_subject", &bindings.add_subject)?,
            delete_subject: parse("delete_subject", &bindings.delete_subject)?,
            edit: parse("edit", &bindings.edit)?,
            edit_hours: parse("edit_hours", &bindings.edit_hours)?,
            generate: parse("generate", &bindings.generate)?,
            generate_in_form: parse("generate_in_form", &bindings.generate_in_form)?,
            list_up: parse("list_up", &bindings.list_up)?,
            list_down: parse("list_down", &bindings.list_down)?,
            next_field: parse("next_field", &bindings.next_field)?,
            help: parse("help", &bindings.help)?,
            undo: parse("undo", &bindings.undo)?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct UiState {
    pub mode: Mode,
    pub selected_index: usize,
    pub list_state: ListState,
    pub timetable_scroll: usize,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            mode: Mode::View,
            selected_index: 0,
            list_state: ListState::default(),
            timetable_scroll: 0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct StatusState {
    pub message: Option<String>,
    pub message_time: Option<Instant>,
}

type GenerationReply = (RequestSeq, Result<ServiceReply, ClientError>);

/// Requests run on the runtime; replies come back over the channel and are
/// applied on the event-loop thread
pub struct GenerationState {
    service: Arc<dyn TimetableService>,
    runtime: Handle,
    tx: UnboundedSender<GenerationReply>,
    rx: UnboundedReceiver<GenerationReply>,
    in_flight: usize,
}

pub struct App {
    pub config: Config,
    pub theme: Theme,
    pub keys: KeyMap,
    pub planner: PlannerState,

    pub ui: UiState,
    pub form: Option<SubjectForm>,
    pub hours_editor: Option<Editor>,
    pub alert: Option<AlertState>,
    pub status: StatusState,
    generation: GenerationState,
}

impl App {
    pub fn new(config: Config, service: Arc<dyn TimetableService>, runtime: Handle) -> Result<Self, TuiError> {
        let keys = KeyMap::from_config(&config.key_bindings)?;
        let theme = config.get_active_theme();
        let planner = PlannerState::new(config.default_study_hours);
        let (tx, rx) = mpsc::unbounded_channel();
        info!(theme = %config.current_theme, hours = planner.study_hours_per_day, "App::new: called");

        let mut app = Self {
            config,
            theme,
            keys,
            planner,
            ui: UiState::default(),
            form: None,
            hours_editor: None,
            alert: None,
            status: StatusState::default(),
            generation: GenerationState {
                service,
                runtime,
                tx,
                rx,
                in_flight: 0,
            },
        };
        app.sync_list_state();
        Ok(app)
    }

    // Selection

    pub fn selected_subject_id(&self) -> Option<SubjectId> {
        self.planner.subject_id_at(self.ui.selected_index)
    }

    pub fn selected_subject(&self) -> Option<&Subject> {
        self.planner.subjects.get(self.ui.selected_index)
    }

    pub fn sync_list_state(&mut self) {
        if self.planner.subjects.is_empty() {
            self.ui.list_state.select(None);
        } else {
            self.ui.list_state.select(Some(self.ui.selected_index));
        }
    }

    /// Keep the selection inside the list after it shrinks
    pub fn adjust_selected_index(&mut self) {
        let len = self.planner.subjects.len();
        if self.ui.selected_index >= len {
            self.ui.selected_index = len.saturating_sub(1);
        }
        self.sync_list_state();
    }

    pub fn move_selection_up(&mut self) {
        if self.ui.selected_index > 0 {
            self.ui.selected_index -= 1;
            self.sync_list_state();
        }
    }

    pub fn move_selection_down(&mut self) {
        if self.ui.selected_index + 1 < self.planner.subjects.len() {
            self.ui.selected_index += 1;
            self.sync_list_state();
        }
    }

    // Subjects

    /// Append a subject, select it and open its form
    pub fn add_subject(&mut self) {
        let id = self.planner.add_subject();
        self.ui.selected_index = self.planner.subjects.len() - 1;
        self.sync_list_state();
        debug!(%id, "add_subject: opening form");
        self.enter_edit_subject();
    }

    pub fn delete_selected_subject(&mut self) {
        let Some(id) = self.selected_subject_id() else {
            self.set_status_message("No subject selected".to_string());
            return;
        };
        match self.planner.delete_subject(id) {
            Ok(()) => {
                self.adjust_selected_index();
                self.set_status_message("Subject deleted".to_string());
            }
            Err(e) => self.set_status_message(e.to_string()),
        }
    }

    pub fn enter_edit_subject(&mut self) {
        match self.selected_subject() {
            Some(subject) => {
                self.form = Some(SubjectForm::for_subject(subject));
                self.ui.mode = Mode::EditSubject;
            }
            None => self.set_status_message("No subject selected".to_string()),
        }
    }

    pub fn exit_edit_subject(&mut self) {
        self.form = None;
        self.ui.mode = Mode::View;
    }

    pub fn navigate_form_field(&mut self, forward: bool) {
        if let Some(form) = self.form.as_mut() {
            form.current_field = if forward {
                form.current_field.next()
            } else {
                form.current_field.prev()
            };
        }
    }

    /// Run an edit against the focused field and write the result back
    pub fn edit_form_field(&mut self, edit: impl FnOnce(&mut Editor)) {
        let Some(form) = self.form.as_mut() else {
            return;
        };
        edit(form.current_editor_mut());
        self.commit_form_field();
    }

    /// Cursor movement inside the focused field; nothing is written back
    pub fn move_form_cursor(&mut self, movement: impl FnOnce(&mut Editor)) {
        if let Some(form) = self.form.as_mut() {
            movement(form.current_editor_mut());
        }
    }

    /// Enter adds a line to Chapters and moves on from single-line fields
    pub fn form_enter(&mut self) {
        let multi_line = self.form.as_ref().map(|f| f.current_field.is_multi_line());
        match multi_line {
            Some(true) => self.edit_form_field(Editor::insert_newline),
            Some(false) => self.navigate_form_field(true),
            None => {}
        }
    }

    pub fn form_undo(&mut self) {
        let mut undone = false;
        self.edit_form_field(|editor| undone = editor.undo());
        if !undone {
            self.set_status_message("Nothing to undo".to_string());
        }
    }

    fn commit_form_field(&mut self) {
        let Some(form) = self.form.as_ref() else {
            return;
        };
        let id = form.subject_id;
        let text = form.editor(form.current_field).text();
        let action = match form.current_field {
            FormField::Name => PlannerAction::UpdateSubjectField {
                id,
                field: SubjectField::Name,
                value: text,
            },
            FormField::ExamDate => PlannerAction::UpdateSubjectField {
                id,
                field: SubjectField::ExamDate,
                value: text,
            },
            FormField::Chapters => PlannerAction::UpdateChapters { id, raw_text: text },
        };

        if let Err(e) = self.planner.apply(action) {
            warn!(error = %e, "commit_form_field: subject no longer exists");
            self.exit_edit_subject();
            self.set_status_message(e.to_string());
        }
    }

    // Study hours

    pub fn enter_edit_hours(&mut self) {
        let text = self.planner.study_hours_per_day.to_string();
        self.hours_editor = Some(Editor::from_string(&text));
        self.ui.mode = Mode::EditHours;
    }

    pub fn exit_edit_hours(&mut self) {
        self.hours_editor = None;
        self.ui.mode = Mode::View;
    }

    /// Run an edit against the hours text and re-parse it
    pub fn edit_hours(&mut self, edit: impl FnOnce(&mut Editor)) {
        let Some(editor) = self.hours_editor.as_mut() else {
            return;
        };
        edit(editor);
        let text = editor.text();
        self.commit_hours(&text);
    }

    pub fn move_hours_cursor(&mut self, movement: impl FnOnce(&mut Editor)) {
        if let Some(editor) = self.hours_editor.as_mut() {
            movement(editor);
        }
    }

    fn commit_hours(&mut self, text: &str) {
        let accepted = utils::parse_study_hours(text)
            .map(|hours| self.planner.set_study_hours_per_day(hours).is_ok())
            .unwrap_or(false);
        if !accepted {
            self.set_status_message(format!(
                "'{}' is not a number; keeping {}",
                text, self.planner.study_hours_per_day
            ));
        }
    }

    // Generation

    pub fn is_generating(&self) -> bool {
        self.generation.in_flight > 0
    }

    /// Snapshot the state and send it to the service in the background
    pub fn start_generation(&mut self) {
        let PendingRequest { seq, request } = self.planner.begin_generation();
        let service = Arc::clone(&self.generation.service);
        let tx = self.generation.tx.clone();
        self.generation.in_flight += 1;

        let request_task = self
            .generation
            .runtime
            .spawn(async move { service.generate(&request).await });

        // Every request sends exactly one reply, even when its task panics
        self.generation.runtime.spawn(async move {
            let reply = request_task.await.unwrap_or_else(|e| {
                warn!(seq, error = %e, "start_generation: request task failed");
                Err(ClientError::TaskFailed(e.to_string()))
            });
            // Receiver is gone only when the app has exited
            let _ = tx.send((seq, reply));
        });
    }

    /// Apply every reply that has arrived since the last frame
    pub fn poll_generation_replies(&mut self) {
        while let Ok((seq, reply)) = self.generation.rx.try_recv() {
            self.generation.in_flight = self.generation.in_flight.saturating_sub(1);
            match self.planner.apply(PlannerAction::ReceiveReply { seq, reply }) {
                Ok(transition) => self.handle_transition(transition),
                Err(e) => self.set_status_message(e.to_string()),
            }
        }
    }

    fn handle_transition(&mut self, transition: Transition) {
        match transition {
            Transition::TimetableReplaced { entries } => {
                self.ui.timetable_scroll = 0;
                self.set_status_message(format!("Timetable updated ({} entries)", entries));
            }
            Transition::ServiceRejected(message) => self.show_alert("Timetable service", message),
            Transition::RequestFailed(message) => self.show_alert("Request failed", message),
            Transition::StaleReplyDiscarded { seq } => debug!(seq, "handle_transition: stale reply ignored"),
            other => debug!(?other, "handle_transition: nothing to report"),
        }
    }

    // Alert

    pub fn show_alert(&mut self, title: &str, message: String) {
        // A second alert replaces the first but keeps the original return mode
        let return_to = match &self.alert {
            Some(existing) => existing.return_to,
            None => self.ui.mode,
        };
        self.alert = Some(AlertState {
            title: title.to_string(),
            message,
            return_to,
        });
        self.ui.mode = Mode::Alert;
    }

    pub fn dismiss_alert(&mut self) {
        if let Some(alert) = self.alert.take() {
            self.ui.mode = alert.return_to;
        }
    }

    // Help

    pub fn enter_help_mode(&mut self) {
        self.ui.mode = Mode::Help;
    }

    pub fn exit_help_mode(&mut self) {
        self.ui.mode = Mode::View;
    }

    // Timetable panel

    pub fn scroll_timetable_down(&mut self, lines: usize) {
        let max = self.planner.generated_timetable.len().saturating_sub(1);
        self.ui.timetable_scroll = (self.ui.timetable_scroll + lines).min(max);
    }

    pub fn scroll_timetable_up(&mut self, lines: usize) {
        self.ui.timetable_scroll = self.ui.timetable_scroll.saturating_sub(lines);
    }

    // Status bar

    pub fn set_status_message(&mut self, message: String) {
        self.status.message = Some(message);
        self.status.message_time = Some(Instant::now());
    }

    pub fn clear_status_message(&mut self) {
        self.status.message = None;
        self.status.message_time = None;
    }

    pub fn check_status_message_timeout(&mut self) {
        if let Some(time) = self.status.message_time {
            if time.elapsed().as_secs() >= STATUS_MESSAGE_TIMEOUT_SECS {
                self.clear_status_message();
            }
        }
    }
}
