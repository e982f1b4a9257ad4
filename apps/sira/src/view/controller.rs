//! View controller — the session state machine.
//!
//! ```text
//! Unauthenticated ──sign-in──▶ Idle ──submit──▶ Generating ──ok──▶ Ready
//!        ▲                      ▲                   │                │
//!        └──── sign-out ────────┴──── error ────────┘◀── regenerate ─┘
//! ```
//!
//! The controller owns the form and the last result for one signed-in user.
//! Generation is split into `begin_generation` / `complete_generation` so the
//! caller can await the remote call while still rendering the Generating
//! state. Tickets tie a completion to the session and generation it was
//! started for; anything arriving for a stale ticket is dropped.

use std::path::PathBuf;

use tracing::{info, warn};

use crate::errors::{AppError, ErrorNotice};
use crate::export::{DocumentExporter, ExportError, FileSink, EXPORT_FILENAME};
use crate::generation::prompt_builder::PromptBuilder;
use crate::llm_client::{GenerationClient, GenerationError};
use crate::models::form::{FormField, FormRecord};
use crate::models::generation::{GenerationRequest, GenerationResult};
use crate::models::language::Language;
use crate::models::user::User;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    Unauthenticated,
    Idle,
    Generating,
    Ready,
}

/// Proof that a generation was started; required to apply its outcome.
#[derive(Debug)]
pub struct GenerationTicket {
    session_epoch: u64,
    generation_id: u64,
    pub request: GenerationRequest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The result was stored; the controller is Ready.
    Ready,
    /// A generation is already in flight; nothing was started.
    Ignored,
    /// The ticket belonged to a finished or signed-out session.
    Discarded,
}

pub struct ViewController {
    language: Language,
    builder: PromptBuilder,
    state: ViewState,
    user: Option<User>,
    form: FormRecord,
    result: Option<GenerationResult>,
    notice: Option<ErrorNotice>,
    last_export: Option<PathBuf>,
    session_epoch: u64,
    next_generation_id: u64,
    in_flight: Option<u64>,
}

impl ViewController {
    pub fn new(language: Language) -> Self {
        Self {
            language,
            builder: PromptBuilder::new(language),
            state: ViewState::Unauthenticated,
            user: None,
            form: FormRecord::default(),
            result: None,
            notice: None,
            last_export: None,
            session_epoch: 0,
            next_generation_id: 0,
            in_flight: None,
        }
    }

    pub fn state(&self) -> ViewState {
        self.state
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn form(&self) -> &FormRecord {
        &self.form
    }

    pub fn result(&self) -> Option<&GenerationResult> {
        self.result.as_ref()
    }

    pub fn notice(&self) -> Option<&ErrorNotice> {
        self.notice.as_ref()
    }

    pub fn last_export(&self) -> Option<&PathBuf> {
        self.last_export.as_ref()
    }

    // ── Session ──────────────────────────────────────────────────────────

    /// Applies a session gate event.
    pub fn on_auth_change(&mut self, user: Option<User>) {
        let Some(user) = user else {
            self.sign_out();
            return;
        };

        match &self.user {
            Some(current) if current.id == user.id => return,
            Some(current) => {
                info!("Switching session from {} to {}", current.email, user.email);
                self.reset();
            }
            None => self.reset(),
        }

        info!("Session started for {}", user.email);
        self.user = Some(user);
        self.state = ViewState::Idle;
    }

    /// Clears the form and result and returns to Unauthenticated.
    pub fn sign_out(&mut self) {
        if self.state == ViewState::Unauthenticated {
            return;
        }
        if self.in_flight.is_some() {
            warn!("Signing out with a generation in flight; its result will be discarded");
        }
        self.reset();
        if let Some(user) = self.user.take() {
            info!("Session ended for {}", user.email);
        }
        self.state = ViewState::Unauthenticated;
    }

    fn reset(&mut self) {
        self.form = FormRecord::default();
        self.result = None;
        self.notice = None;
        self.last_export = None;
        self.in_flight = None;
        self.session_epoch += 1;
    }

    // ── Form ─────────────────────────────────────────────────────────────

    /// Replaces one field. An in-flight request is unaffected: it was built
    /// from the record as it was at submit time.
    pub fn set_field(&mut self, field: FormField, value: impl Into<String>) -> Result<(), AppError> {
        if self.state == ViewState::Unauthenticated {
            return Err(self.surface(AppError::Unauthorized));
        }
        self.form = self.form.set_field(field, value);

        if self.form.is_complete()
            && self.notice.as_ref().is_some_and(|n| n.code == "INVALID_INPUT")
        {
            self.notice = None;
        }
        Ok(())
    }

    // ── Generation ───────────────────────────────────────────────────────

    /// The submit / regenerate action.
    ///
    /// Returns `Ok(None)` without touching state while a generation is
    /// already in flight. An incomplete form is refused with the missing
    /// fields as the visible notice.
    pub fn begin_generation(&mut self) -> Result<Option<GenerationTicket>, AppError> {
        match self.state {
            ViewState::Unauthenticated => return Err(self.surface(AppError::Unauthorized)),
            ViewState::Generating => {
                warn!("Submit ignored: a generation is already in flight");
                return Ok(None);
            }
            ViewState::Idle | ViewState::Ready => {}
        }

        let request = match self.builder.build(&self.form) {
            Ok(request) => request,
            Err(e) => return Err(self.surface(e.into())),
        };

        let generation_id = self.next_generation_id;
        self.next_generation_id += 1;
        self.in_flight = Some(generation_id);
        self.notice = None;
        self.state = ViewState::Generating;
        info!("Generation {generation_id} started");

        Ok(Some(GenerationTicket {
            session_epoch: self.session_epoch,
            generation_id,
            request,
        }))
    }

    /// Applies the outcome of the call started with `ticket`.
    ///
    /// Success stores the text untouched and moves to Ready. Failure moves
    /// back to Idle with the error as the visible notice; any earlier result
    /// is kept.
    pub fn complete_generation(
        &mut self,
        ticket: GenerationTicket,
        outcome: Result<GenerationResult, GenerationError>,
    ) -> Result<Completion, AppError> {
        let current = ticket.session_epoch == self.session_epoch
            && self.in_flight == Some(ticket.generation_id)
            && self.state == ViewState::Generating;
        if !current {
            warn!(
                "Discarding result of generation {} (stale session or generation)",
                ticket.generation_id
            );
            return Ok(Completion::Discarded);
        }

        self.in_flight = None;
        match outcome {
            Ok(result) => {
                info!(
                    "Generation {} completed ({} chars)",
                    ticket.generation_id,
                    result.as_str().chars().count()
                );
                self.result = Some(result);
                self.notice = None;
                self.state = ViewState::Ready;
                Ok(Completion::Ready)
            }
            Err(e) => {
                self.state = ViewState::Idle;
                Err(self.surface(e.into()))
            }
        }
    }

    /// Runs one full submit: begin, a single `generate` call, complete.
    pub async fn submit(&mut self, client: &dyn GenerationClient) -> Result<Completion, AppError> {
        let Some(ticket) = self.begin_generation()? else {
            return Ok(Completion::Ignored);
        };
        let outcome = client.generate(&ticket.request).await;
        self.complete_generation(ticket, outcome)
    }

    // ── Export ───────────────────────────────────────────────────────────

    /// Exports the current result as `CV.docx` through `sink`.
    pub fn export(
        &mut self,
        exporter: &DocumentExporter,
        sink: &dyn FileSink,
    ) -> Result<PathBuf, AppError> {
        if self.state == ViewState::Unauthenticated {
            return Err(self.surface(AppError::Unauthorized));
        }

        let saved = match &self.result {
            None => Err(ExportError::NothingToExport),
            Some(result) => exporter
                .export(result.as_str())
                .and_then(|bytes| sink.save_file(&bytes, EXPORT_FILENAME)),
        };

        match saved {
            Ok(path) => {
                info!("Exported CV to {}", path.display());
                self.notice = None;
                self.last_export = Some(path.clone());
                Ok(path)
            }
            Err(e) => Err(self.surface(e.into())),
        }
    }

    /// Records the error as the visible notice and hands it back.
    fn surface(&mut self, err: AppError) -> AppError {
        self.notice = Some(err.notice());
        err
    }
}
