pub mod form;
pub mod transport;

pub use form::{
    FormMessage, MessageKind, NewsletterForm, SignupRequest, SubmitError, SubmitState,
    EMPTY_EMAIL_MESSAGE, GENERIC_FAILURE_MESSAGE, NOT_CONFIGURED_MESSAGE, REQUEST_FAILED_MESSAGE,
    SUCCESS_MESSAGE,
};
pub use transport::{spawn_submit, HttpTransport, Transport};
