use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use webservice_core::{UreqTransport, WebService};
use webservice_demo::{report, ConsoleErrorHandler, DemoConfig, Person};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = DemoConfig::from_env()?;
    let service = WebService::from_config(UreqTransport::new(), config.service.clone());
    let handler = Arc::new(ConsoleErrorHandler::stderr());

    let lookups = [
        Person::gender_for(&config.endpoint, "Rick"),
        Person::misspelled_lookup(&config.endpoint, "Morty"),
    ];

    let handles: Vec<_> = lookups
        .into_iter()
        .map(|resource| {
            let handler = Arc::clone(&handler);
            service.load(resource, move |outcome| {
                if let Some(line) = report(outcome, handler.as_ref()) {
                    println!("{line}");
                }
            })
        })
        .collect();

    for handle in handles {
        handle.await?;
    }
    Ok(())
}
