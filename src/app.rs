//! Application state and the submit/complete cycle around a clip request.
//!
//! Every submission gets a [`Ticket`]. Only the most recently issued ticket may
//! change state when its response arrives; earlier responses are dropped, so
//! overlapping submissions can never leave state showing an older video.

use log::{debug, error, info, warn};

use crate::gemini::ClipService;
use crate::{Clip, ClipError};

pub const EMPTY_URL_MESSAGE: &str = "Please enter a YouTube URL.";
pub const REQUEST_FAILED_MESSAGE: &str = "Failed to generate clips. Please check the URL or try again later.";

/// Identifies one submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl Ticket {
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// What the presentation layer should show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Idle,
    Loading,
    Error,
    Results,
}

#[derive(Debug, Default, Clone)]
pub struct AppState {
    pub url: String,
    pub loading: bool,
    /// User-facing message
    pub error: Option<String>,
    /// Underlying failure, for diagnostics only
    pub cause: Option<String>,
    pub clips: Vec<Clip>,
}

impl AppState {
    pub fn view(&self) -> View {
        if self.loading {
            View::Loading
        } else if self.error.is_some() {
            View::Error
        } else if self.clips.is_empty() {
            View::Idle
        } else {
            View::Results
        }
    }
}

pub struct App<S> {
    service: S,
    state: AppState,
    issued: u64,
}

impl<S: ClipService> App<S> {
    pub fn new(service: S) -> Self {
        Self {
            service,
            state: AppState::default(),
            issued: 0,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Start a submission. An empty URL sets the validation message and
    /// returns an error without issuing a ticket.
    pub fn begin(&mut self, url: &str) -> Result<Ticket, ClipError> {
        let url = url.trim();
        self.state.url = url.to_string();

        if url.is_empty() {
            self.state.error = Some(EMPTY_URL_MESSAGE.to_string());
            return Err(ClipError::Validation(EMPTY_URL_MESSAGE.to_string()));
        }

        if crate::extract_video_id(url).is_none() {
            warn!("Submitting URL that does not look like a YouTube video: {url}");
        }

        self.issued += 1;
        let ticket = Ticket(self.issued);

        self.state.error = None;
        self.state.cause = None;
        self.state.clips.clear();
        self.state.loading = true;

        debug!("Issued ticket {} for {url}", ticket.id());
        Ok(ticket)
    }

    /// Apply the outcome of a request. Returns false when the ticket has been
    /// superseded and the result was discarded.
    pub fn complete(&mut self, ticket: Ticket, result: Result<Vec<Clip>, ClipError>) -> bool {
        if ticket.id() != self.issued {
            info!(
                "Discarding stale response for ticket {} (latest is {})",
                ticket.id(),
                self.issued
            );
            return false;
        }

        match result {
            Ok(clips) => {
                debug!("Ticket {} produced {} clips", ticket.id(), clips.len());
                self.state.error = None;
                self.state.cause = None;
                self.state.clips = clips;
            }
            Err(e) => {
                error!("Clip request failed: {e}");
                self.state.error = Some(REQUEST_FAILED_MESSAGE.to_string());
                self.state.cause = Some(e.to_string());
            }
        }
        self.state.loading = false;
        true
    }

    /// Submit a URL and wait for the service.
    pub async fn submit(&mut self, url: &str) -> Result<(), ClipError> {
        let ticket = self.begin(url)?;
        let result = self.service.request_clips(&self.state.url).await;
        let outcome = result.as_ref().map(|_| ()).map_err(Clone::clone);
        self.complete(ticket, result);
        outcome
    }
}

/// Submissions that may overlap: tracks requests still running and whether
/// more input can arrive.
pub struct Session<S> {
    app: App<S>,
    in_flight: usize,
    input_open: bool,
}

impl<S: ClipService> Session<S> {
    pub fn new(app: App<S>) -> Self {
        Self {
            app,
            in_flight: 0,
            input_open: true,
        }
    }

    pub fn app(&self) -> &App<S> {
        &self.app
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn input_open(&self) -> bool {
        self.input_open
    }

    /// Start a request for one line of input. Blank lines are rejected
    /// without affecting requests already running.
    pub fn submit_line(&mut self, line: &str) -> Result<Ticket, ClipError> {
        let ticket = self.app.begin(line)?;
        self.in_flight += 1;
        Ok(ticket)
    }

    /// Hand a finished request to the controller. Returns true when it was
    /// applied, false when a newer submission superseded it.
    pub fn receive(&mut self, ticket: Ticket, result: Result<Vec<Clip>, ClipError>) -> bool {
        self.in_flight = self.in_flight.saturating_sub(1);
        self.app.complete(ticket, result)
    }

    pub fn close_input(&mut self) {
        debug!("Input closed with {} request(s) in flight", self.in_flight);
        self.input_open = false;
    }

    /// No more input and nothing left to wait for
    pub fn is_finished(&self) -> bool {
        !self.input_open && self.in_flight == 0
    }
}
