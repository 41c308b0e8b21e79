//! Presentation-side reaction to networking errors.
//!
//! A surface that can show alerts implements `NetworkingErrorHandler` and
//! gets the default routing for free: connectivity errors are left to the
//! surface's own offline indicator, `Unauthorized` goes to the application's
//! session logic, everything else becomes an alert.

use tracing::debug;

use crate::error::NetworkingError;

/// Callback run once the user has dealt with the error.
pub type Completion = Box<dyn FnOnce() + Send + 'static>;

/// What a surface shows for a networking error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorAlert {
    pub title: String,
    pub message: String,
    pub dismiss_label: String,
}

impl ErrorAlert {
    pub fn for_error(error: &NetworkingError) -> Self {
        Self {
            title: "Oops".to_string(),
            message: error.localized_description(),
            dismiss_label: "OK".to_string(),
        }
    }
}

pub trait NetworkingErrorHandler {
    /// Route `error` to the right reaction. For `NotConnectedToInternet`
    /// nothing happens and `completion` is dropped without running.
    fn handle_networking_error(&self, error: &NetworkingError, completion: Option<Completion>) {
        debug!(reason = %error.localized_failure_reason(), code = error.code(), "networking error");
        match error {
            NetworkingError::NotConnectedToInternet => {}
            NetworkingError::Unauthorized => self.handle_unauthorized_networking_error(completion),
            _ => self.present_alert(ErrorAlert::for_error(error), completion),
        }
    }

    /// Application-specific reaction to an expired session, e.g. sending the
    /// user back to login.
    fn handle_unauthorized_networking_error(&self, completion: Option<Completion>);

    /// Show `alert` and run `on_dismiss` after the user dismisses it.
    fn present_alert(&self, alert: ErrorAlert, on_dismiss: Option<Completion>);
}
