//! Demo of `webservice-core` against the genderize.io API.
//!
//! Two lookups run concurrently: a valid one for "Rick" and one with a
//! misspelled parameter that the server rejects. Failures are routed through
//! a console `NetworkingErrorHandler`.

pub mod config;
pub mod console;
pub mod person;

use webservice_core::{NetworkingError, NetworkingErrorHandler};

pub use config::DemoConfig;
pub use console::ConsoleErrorHandler;
pub use person::{Gender, Person};

/// Line printed for a successful lookup, or `None` after handing the error to
/// `handler`.
pub fn report<H: NetworkingErrorHandler>(outcome: Result<Person, NetworkingError>, handler: &H) -> Option<String> {
    match outcome {
        Ok(person) => Some(person.describe()),
        Err(error) => {
            handler.handle_networking_error(&error, None);
            None
        }
    }
}
