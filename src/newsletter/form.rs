use thiserror::Error;

use super::transport::Transport;

pub const EMPTY_EMAIL_MESSAGE: &str = "Please enter your email.";
pub const NOT_CONFIGURED_MESSAGE: &str =
    "Newsletter signup is not configured. Set SHOWCASE_GOOGLE_SCRIPT_URL or SHOWCASE_NEWSLETTER_API_URL.";
pub const SUCCESS_MESSAGE: &str = "Thanks! You’re subscribed.";
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong. Try again.";
pub const REQUEST_FAILED_MESSAGE: &str = "Request failed";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("Please enter your email.")]
    EmptyEmail,
    #[error("Newsletter signup is not configured. Set SHOWCASE_GOOGLE_SCRIPT_URL or SHOWCASE_NEWSLETTER_API_URL.")]
    NotConfigured,
    /// The endpoint answered with a non-2xx status
    #[error("{message}")]
    Http { status: u16, message: String },
    /// The request never completed
    #[error("{0}")]
    Transport(String),
}

impl SubmitError {
    /// Message preference: response body as received, then status reason,
    /// then a fixed string. Only empty values fall through.
    pub fn http(status: u16, reason: Option<&str>, body: &str) -> Self {
        let message = [Some(body), reason]
            .into_iter()
            .flatten()
            .find(|m| !m.is_empty())
            .unwrap_or(REQUEST_FAILED_MESSAGE)
            .to_string();
        SubmitError::Http { status, message }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.trim().is_empty() {
            SubmitError::Transport(GENERIC_FAILURE_MESSAGE.to_string())
        } else {
            SubmitError::Transport(message)
        }
    }

    /// Detected before any network traffic
    pub fn is_configuration(&self) -> bool {
        matches!(self, SubmitError::EmptyEmail | SubmitError::NotConfigured)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitState {
    Idle,
    Submitting,
    Rejected,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormMessage {
    pub text: String,
    pub kind: MessageKind,
}

impl FormMessage {
    pub fn is_error(&self) -> bool {
        self.kind == MessageKind::Error
    }
}

/// What a submission sends: one form-encoded `email` field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignupRequest {
    pub endpoint: String,
    pub email: String,
}

/// Newsletter form state machine.
///
/// `begin_submit` validates and, when a request should go out, returns it and
/// disables the submit control. `settle` records the outcome and re-enables
/// the control whatever happened.
#[derive(Debug, Clone)]
pub struct NewsletterForm {
    input: String,
    endpoint: Option<String>,
    state: SubmitState,
    message: Option<FormMessage>,
    submit_enabled: bool,
}

impl NewsletterForm {
    pub fn new(endpoint: Option<String>) -> Self {
        Self {
            input: String::new(),
            endpoint: endpoint.filter(|e| !e.trim().is_empty()),
            state: SubmitState::Idle,
            message: None,
            submit_enabled: true,
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// Text-field binding
    pub fn input_mut(&mut self) -> &mut String {
        &mut self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn state(&self) -> SubmitState {
        self.state
    }

    pub fn message(&self) -> Option<&FormMessage> {
        self.message.as_ref()
    }

    pub fn submit_enabled(&self) -> bool {
        self.submit_enabled
    }

    pub fn is_configured(&self) -> bool {
        self.endpoint.is_some()
    }

    pub fn begin_submit(&mut self) -> Option<SignupRequest> {
        if self.state == SubmitState::Submitting {
            return None;
        }
        self.message = None;

        let email = self.input.trim();
        if email.is_empty() {
            self.reject(SubmitError::EmptyEmail);
            return None;
        }

        let Some(endpoint) = self.endpoint.clone() else {
            self.reject(SubmitError::NotConfigured);
            return None;
        };

        let request = SignupRequest {
            endpoint,
            email: email.to_string(),
        };
        self.state = SubmitState::Submitting;
        self.submit_enabled = false;
        Some(request)
    }

    pub fn settle(&mut self, outcome: Result<(), SubmitError>) {
        match outcome {
            Ok(()) => {
                self.state = SubmitState::Succeeded;
                self.show(SUCCESS_MESSAGE, MessageKind::Success);
                self.input.clear();
            }
            Err(e) => {
                self.state = SubmitState::Failed;
                self.show(&e.to_string(), MessageKind::Error);
            }
        }
        self.submit_enabled = true;
    }

    /// Validate, send through `transport` and settle, all on this thread
    pub fn submit(&mut self, transport: &dyn Transport) -> SubmitState {
        if let Some(request) = self.begin_submit() {
            let outcome = transport.send(&request);
            self.settle(outcome);
        }
        self.state
    }

    fn reject(&mut self, error: SubmitError) {
        self.state = SubmitState::Rejected;
        self.show(&error.to_string(), MessageKind::Error);
    }

    fn show(&mut self, text: &str, kind: MessageKind) {
        self.message = Some(FormMessage {
            text: text.to_string(),
            kind,
        });
    }
}
