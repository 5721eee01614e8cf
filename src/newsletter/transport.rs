use std::sync::Arc;
use std::thread::JoinHandle;

use serde::Serialize;

use super::form::{SignupRequest, SubmitError};

/// Delivers a sign-up to the endpoint
pub trait Transport {
    fn send(&self, request: &SignupRequest) -> Result<(), SubmitError>;
}

#[derive(Serialize)]
struct SignupForm<'a> {
    email: &'a str,
}

/// Form-encoded POST over HTTP(S)
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: reqwest::blocking::Client::builder().build()?,
        })
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: &SignupRequest) -> Result<(), SubmitError> {
        log::debug!("Posting newsletter signup to {}", request.endpoint);

        let response = self
            .client
            .post(&request.endpoint)
            .form(&SignupForm {
                email: &request.email,
            })
            .send()
            .map_err(|e| SubmitError::transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response
            .text()
            .map_err(|e| SubmitError::transport(e.to_string()))?;
        Err(SubmitError::http(status.as_u16(), status.canonical_reason(), &body))
    }
}

/// Send on a worker thread and hand the outcome to `on_settled`
pub fn spawn_submit<T, F>(transport: Arc<T>, request: SignupRequest, on_settled: F) -> JoinHandle<()>
where
    T: Transport + Send + Sync + 'static,
    F: FnOnce(Result<(), SubmitError>) + Send + 'static,
{
    std::thread::spawn(move || {
        let outcome = transport.send(&request);
        match &outcome {
            Ok(()) => log::info!("Newsletter signup accepted"),
            Err(e) => log::warn!("Newsletter signup failed: {}", e),
        }
        on_settled(outcome);
    })
}
