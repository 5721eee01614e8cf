use std::cell::RefCell;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::thread::{self, JoinHandle};

use model_showcase::newsletter::{
    HttpTransport, NewsletterForm, SignupRequest, SubmitError, SubmitState, Transport,
    EMPTY_EMAIL_MESSAGE, NOT_CONFIGURED_MESSAGE, SUCCESS_MESSAGE,
};

/// Records every request and answers with a canned outcome
struct RecordingTransport {
    outcome: Result<(), SubmitError>,
    sent: RefCell<Vec<SignupRequest>>,
}

impl RecordingTransport {
    fn new(outcome: Result<(), SubmitError>) -> Self {
        Self {
            outcome,
            sent: RefCell::new(Vec::new()),
        }
    }

    fn calls(&self) -> usize {
        self.sent.borrow().len()
    }
}

impl Transport for RecordingTransport {
    fn send(&self, request: &SignupRequest) -> Result<(), SubmitError> {
        self.sent.borrow_mut().push(request.clone());
        self.outcome.clone()
    }
}

/// One-shot HTTP server; the handle yields the raw request it received
fn serve_once(status: &'static str, reply: &'static str) -> (String, JoinHandle<String>) {
    serve_raw(format!(
        "HTTP/1.1 {status}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{reply}",
        reply.len()
    ))
}

/// Like `serve_once`, writing `response` exactly as given before hanging up
fn serve_raw(response: String) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream.try_clone().unwrap());

        let mut head = String::new();
        let mut content_length = 0;
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).unwrap();
            if line == "\r\n" || line.is_empty() {
                break;
            }
            let lower = line.to_ascii_lowercase();
            if let Some(value) = lower.strip_prefix("content-length:") {
                content_length = value.trim().parse().unwrap();
            }
            head.push_str(&lower);
        }

        let mut body = vec![0; content_length];
        reader.read_exact(&mut body).unwrap();

        stream.write_all(response.as_bytes()).unwrap();

        format!("{head}\r\n{}", String::from_utf8(body).unwrap())
    });

    (format!("http://{addr}/signup"), handle)
}

#[cfg(test)]
mod newsletter_tests {
    use super::*;

    #[test]
    fn test_successful_signup_posts_form_and_clears_input() {
        let (endpoint, server) = serve_once("200 OK", "ok");
        let transport = HttpTransport::new().unwrap();
        let mut form = NewsletterForm::new(Some(endpoint));
        form.set_input("  a@b.com ");

        let state = form.submit(&transport);
        let request = server.join().unwrap();

        assert_eq!(state, SubmitState::Succeeded);
        assert!(request.starts_with("post /signup"), "{request}");
        assert!(request.contains("content-type: application/x-www-form-urlencoded"));
        assert!(request.ends_with("\r\nemail=a%40b.com"), "{request}");

        let message = form.message().unwrap();
        assert_eq!(message.text, SUCCESS_MESSAGE);
        assert!(!message.is_error());
        assert_eq!(form.input(), "");
        assert!(form.submit_enabled());
    }

    #[test]
    fn test_rejected_signup_shows_body_and_keeps_input() {
        let (endpoint, server) = serve_once("400 Bad Request", "Email already subscribed");
        let transport = HttpTransport::new().unwrap();
        let mut form = NewsletterForm::new(Some(endpoint));
        form.set_input("a@b.com");

        let state = form.submit(&transport);
        server.join().unwrap();

        assert_eq!(state, SubmitState::Failed);
        assert_eq!(form.message().unwrap().text, "Email already subscribed");
        assert_eq!(form.input(), "a@b.com");
        assert!(form.submit_enabled());
    }

    #[test]
    fn test_empty_body_falls_back_to_reason_phrase() {
        let (endpoint, server) = serve_once("503 Service Unavailable", "");
        let transport = HttpTransport::new().unwrap();
        let mut form = NewsletterForm::new(Some(endpoint));
        form.set_input("a@b.com");

        form.submit(&transport);
        server.join().unwrap();

        assert_eq!(form.message().unwrap().text, "Service Unavailable");
    }

    #[test]
    fn test_rejection_body_is_shown_verbatim() {
        let (endpoint, server) = serve_once("409 Conflict", "\n  Already on the list\n");
        let transport = HttpTransport::new().unwrap();
        let mut form = NewsletterForm::new(Some(endpoint));
        form.set_input("a@b.com");

        form.submit(&transport);
        server.join().unwrap();

        assert_eq!(form.message().unwrap().text, "\n  Already on the list\n");
    }

    #[test]
    fn test_truncated_error_body_reports_transport_error() {
        let (endpoint, server) = serve_raw(
            "HTTP/1.1 500 Internal Server Error\r\nContent-Length: 100\r\nConnection: close\r\n\r\npartial"
                .to_string(),
        );
        let transport = HttpTransport::new().unwrap();
        let mut form = NewsletterForm::new(Some(endpoint));
        form.set_input("a@b.com");

        let state = form.submit(&transport);
        server.join().unwrap();

        assert_eq!(state, SubmitState::Failed);
        let message = form.message().unwrap();
        assert!(message.is_error());
        assert_ne!(message.text, "Internal Server Error");
        assert_ne!(message.text, "partial");
        assert!(!message.text.is_empty());
    }

    #[test]
    fn test_unreachable_endpoint_reports_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let endpoint = format!("http://{}/signup", listener.local_addr().unwrap());
        drop(listener);

        let transport = HttpTransport::new().unwrap();
        let mut form = NewsletterForm::new(Some(endpoint));
        form.set_input("a@b.com");

        let state = form.submit(&transport);

        assert_eq!(state, SubmitState::Failed);
        let message = form.message().unwrap();
        assert!(message.is_error());
        assert!(!message.text.is_empty());
        assert_eq!(form.input(), "a@b.com");
    }

    #[test]
    fn test_empty_input_never_reaches_transport() {
        let transport = RecordingTransport::new(Ok(()));
        let mut form = NewsletterForm::new(Some("https://example.com/signup".into()));
        form.set_input("   ");

        let state = form.submit(&transport);

        assert_eq!(state, SubmitState::Rejected);
        assert_eq!(transport.calls(), 0);
        assert_eq!(form.message().unwrap().text, EMPTY_EMAIL_MESSAGE);
    }

    #[test]
    fn test_unconfigured_endpoint_never_reaches_transport() {
        let transport = RecordingTransport::new(Ok(()));
        let mut form = NewsletterForm::new(None);
        form.set_input("a@b.com");

        let state = form.submit(&transport);

        assert_eq!(state, SubmitState::Rejected);
        assert_eq!(transport.calls(), 0);
        assert_eq!(form.message().unwrap().text, NOT_CONFIGURED_MESSAGE);
        assert_eq!(form.input(), "a@b.com");
    }

    #[test]
    fn test_trimmed_email_is_sent_once() {
        let transport = RecordingTransport::new(Ok(()));
        let mut form = NewsletterForm::new(Some("https://example.com/signup".into()));
        form.set_input("\tme@example.com  ");

        form.submit(&transport);

        let sent = transport.sent.borrow();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].email, "me@example.com");
        assert_eq!(sent[0].endpoint, "https://example.com/signup");
    }

    #[test]
    fn test_new_attempt_clears_previous_message() {
        let transport = RecordingTransport::new(Err(SubmitError::transport("offline")));
        let mut form = NewsletterForm::new(Some("https://example.com/signup".into()));
        form.set_input("a@b.com");
        form.submit(&transport);
        assert_eq!(form.message().unwrap().text, "offline");

        form.begin_submit();

        assert!(form.message().is_none());
        assert_eq!(form.state(), SubmitState::Submitting);
    }
}
