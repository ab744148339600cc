//! Add/edit form for a single book record.
//!
//! ```text
//! Loading (edit only) -> Ready -> Submitting -> Succeeded
//!        \                  ^          |
//!         -> LoadFailed     +----------+ (submit error)
//! ```
//!
//! I/O is split from the transitions: `begin_submit` yields a [`SubmitRequest`]
//! which whoever owns the network sends, and `finish_submit` applies the
//! outcome. [`BookFormController::submit`] does both in one call.

use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::{Duration, Instant},
};

use shared::{
    domain::{Book, BookId},
    protocol::BookPayload,
};
use tracing::{info, warn};

use crate::{
    navigation::{DeferredNavigation, Route, DEFAULT_REDIRECT_DELAY},
    validation::{self, FieldErrors, FormField, FormValues},
    CatalogApi, CatalogError, CatalogResult, SubmitRejected,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Add,
    Edit(BookId),
}

impl FormMode {
    fn verb(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Edit(_) => "edit",
        }
    }

    fn past_tense(self) -> &'static str {
        match self {
            Self::Add => "added",
            Self::Edit(_) => "edited",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormPhase {
    Loading,
    Ready,
    Submitting,
    Succeeded,
    LoadFailed(String),
}

#[derive(Debug, Clone, Default)]
pub struct FormState {
    pub values: FormValues,
    pub errors: FieldErrors,
    pub submit_error: Option<String>,
    pub submitting: bool,
    pub message: Option<String>,
}

static NEXT_TICKET: AtomicU64 = AtomicU64::new(1);

/// Identifies one submission; unique across every form in the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubmitTicket(u64);

impl SubmitTicket {
    pub fn issue() -> Self {
        Self(NEXT_TICKET.fetch_add(1, Ordering::Relaxed))
    }
}

/// A validated create/update ready to go over the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitRequest {
    pub ticket: SubmitTicket,
    pub mode: FormMode,
    pub payload: BookPayload,
}

impl SubmitRequest {
    pub async fn send(&self, api: &dyn CatalogApi) -> CatalogResult<Book> {
        match self.mode {
            FormMode::Add => api.create_book(&self.payload).await,
            FormMode::Edit(id) => api.update_book(id, &self.payload).await,
        }
    }
}

#[derive(Debug)]
pub struct BookFormController {
    mode: FormMode,
    phase: FormPhase,
    state: FormState,
    in_flight: Option<(SubmitTicket, String)>,
    last_failure: Option<CatalogError>,
    navigation: Option<DeferredNavigation>,
    redirect_delay: Duration,
    current_year: Option<i32>,
}

impl BookFormController {
    /// Add mode starts `Ready`; edit mode starts `Loading` until
    /// [`apply_loaded`](Self::apply_loaded) runs.
    pub fn new(mode: FormMode) -> Self {
        let phase = match mode {
            FormMode::Add => FormPhase::Ready,
            FormMode::Edit(_) => FormPhase::Loading,
        };
        Self {
            mode,
            phase,
            state: FormState::default(),
            in_flight: None,
            last_failure: None,
            navigation: None,
            redirect_delay: DEFAULT_REDIRECT_DELAY,
            current_year: None,
        }
    }

    /// Builds the controller and, in edit mode, fetches the record to edit.
    pub async fn initialize(mode: FormMode, api: &dyn CatalogApi) -> Self {
        let mut controller = Self::new(mode);
        if let FormMode::Edit(id) = mode {
            let result = api.get_book(id).await;
            controller.apply_loaded(result);
        }
        controller
    }

    pub fn with_redirect_delay(mut self, delay: Duration) -> Self {
        self.redirect_delay = delay;
        self
    }

    /// Pins the year used for the upper bound of the year rule.
    pub fn with_current_year(mut self, year: i32) -> Self {
        self.current_year = Some(year);
        self
    }

    pub fn apply_loaded(&mut self, result: CatalogResult<Book>) {
        if self.phase != FormPhase::Loading {
            warn!(phase = ?self.phase, "ignoring book load outside of loading phase");
            return;
        }
        match result {
            Ok(book) if self.mode != FormMode::Edit(book.id) => {
                warn!(
                    mode = ?self.mode,
                    book_id = book.id.0,
                    "ignoring book loaded for another form"
                );
            }
            Ok(book) => {
                self.state.values = FormValues::from_book(&book);
                self.phase = FormPhase::Ready;
            }
            Err(err) => {
                warn!(mode = ?self.mode, "failed to load book for editing: {err}");
                self.phase = FormPhase::LoadFailed(err.to_string());
            }
        }
    }

    /// Stores raw input and clears that field's error. No re-validation here.
    pub fn update_field(&mut self, field: FormField, value: impl Into<String>) {
        if self.phase != FormPhase::Ready {
            return;
        }
        *self.state.values.get_mut(field) = value.into();
        self.state.errors.remove(&field);
    }

    pub fn validate(&self) -> FieldErrors {
        let year = self.current_year.unwrap_or_else(validation::current_year);
        validation::validate(&self.state.values, year)
    }

    pub fn begin_submit(&mut self) -> Result<SubmitRequest, SubmitRejected> {
        match self.phase {
            FormPhase::Submitting => return Err(SubmitRejected::InProgress),
            FormPhase::Ready => {}
            _ => return Err(SubmitRejected::NotReady),
        }

        self.state.message = None;
        self.state.submit_error = None;
        self.state.errors = self.validate();
        if !self.state.errors.is_empty() {
            return Err(SubmitRejected::Invalid(self.state.errors.len()));
        }
        let Some(payload) = self.state.values.to_payload() else {
            return Err(SubmitRejected::Invalid(1));
        };

        let ticket = SubmitTicket::issue();
        self.in_flight = Some((ticket, payload.title.clone()));
        self.phase = FormPhase::Submitting;
        self.state.submitting = true;
        Ok(SubmitRequest {
            ticket,
            mode: self.mode,
            payload,
        })
    }

    /// Applies the outcome of the submission identified by `ticket`. Results
    /// for any other ticket are dropped.
    pub fn finish_submit(
        &mut self,
        ticket: SubmitTicket,
        result: CatalogResult<Book>,
        now: Instant,
    ) {
        let title = match self.in_flight.take() {
            Some((pending, title)) if pending == ticket => title,
            other => {
                warn!(
                    phase = ?self.phase,
                    ?ticket,
                    "ignoring submit result for another submission"
                );
                self.in_flight = other;
                return;
            }
        };
        self.state.submitting = false;
        match result {
            Ok(book) => {
                info!(book_id = book.id.0, mode = ?self.mode, "book saved");
                self.last_failure = None;
                self.state.message = Some(format!(
                    "Book \"{title}\" {} successfully!",
                    self.mode.past_tense()
                ));
                self.phase = FormPhase::Succeeded;
                self.navigation = Some(DeferredNavigation::schedule(
                    Route::ManagerList,
                    now,
                    self.redirect_delay,
                ));
            }
            Err(err) => {
                warn!(mode = ?self.mode, "book submit failed: {err}");
                self.state.submit_error =
                    Some(format!("Failed to {} book: {err}", self.mode.verb()));
                self.last_failure = Some(err);
                self.phase = FormPhase::Ready;
            }
        }
    }

    /// Validates, sends, and applies the outcome.
    pub async fn submit(&mut self, api: &dyn CatalogApi) -> Result<(), SubmitRejected> {
        let request = self.begin_submit()?;
        let result = request.send(api).await;
        self.finish_submit(request.ticket, result, Instant::now());
        Ok(())
    }

    /// True while the submission behind `ticket` is the one in flight.
    pub fn owns(&self, ticket: SubmitTicket) -> bool {
        matches!(&self.in_flight, Some((pending, _)) if *pending == ticket)
    }

    pub fn poll_navigation(&self, now: Instant) -> Option<Route> {
        self.navigation.as_ref().and_then(|nav| nav.poll(now))
    }

    pub fn pending_navigation(&self) -> Option<&DeferredNavigation> {
        self.navigation.as_ref()
    }

    pub fn cancel_navigation(&mut self) {
        if let Some(nav) = self.navigation.as_mut() {
            nav.cancel();
        }
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn phase(&self) -> &FormPhase {
        &self.phase
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn values(&self) -> &FormValues {
        &self.state.values
    }

    pub fn field_error(&self, field: FormField) -> Option<&str> {
        self.state.errors.get(&field).map(String::as_str)
    }

    pub fn is_submitting(&self) -> bool {
        self.state.submitting
    }

    pub fn message(&self) -> Option<&str> {
        self.state.message.as_deref()
    }

    pub fn submit_error(&self) -> Option<&str> {
        self.state.submit_error.as_deref()
    }

    /// True when the last submission failed before reaching the server.
    pub fn failed_on_network(&self) -> bool {
        self.last_failure
            .as_ref()
            .is_some_and(CatalogError::is_network)
    }

    pub fn load_error(&self) -> Option<&str> {
        match &self.phase {
            FormPhase::LoadFailed(message) => Some(message),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "tests/form_tests.rs"]
mod tests;
