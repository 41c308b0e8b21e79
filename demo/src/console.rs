//! Terminal stand-in for an alert-presenting screen.

use std::io::{self, Write};
use std::sync::Mutex;

use tracing::warn;
use webservice_core::{Completion, ErrorAlert, NetworkingErrorHandler};

/// Prints alerts to a writer and treats them as dismissed right away.
pub struct ConsoleErrorHandler<W> {
    out: Mutex<W>,
}

impl ConsoleErrorHandler<io::Stderr> {
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }
}

impl<W: Write> ConsoleErrorHandler<W> {
    pub fn new(out: W) -> Self {
        Self { out: Mutex::new(out) }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_line(&self, line: &str) {
        let mut out = self.out.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Err(e) = writeln!(out, "{line}") {
            warn!(error = %e, "failed to write alert");
        }
    }
}

impl<W: Write> NetworkingErrorHandler for ConsoleErrorHandler<W> {
    // Nothing to re-authenticate against in the demo.
    fn handle_unauthorized_networking_error(&self, completion: Option<Completion>) {
        self.write_line("session expired");
        if let Some(completion) = completion {
            completion();
        }
    }

    fn present_alert(&self, alert: ErrorAlert, on_dismiss: Option<Completion>) {
        self.write_line(&format!("{}: {} [{}]", alert.title, alert.message, alert.dismiss_label));
        if let Some(on_dismiss) = on_dismiss {
            on_dismiss();
        }
    }
}
