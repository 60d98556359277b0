pub mod aggregate;
pub mod badge;
pub mod config;
pub mod errors;
pub mod metrics_defs;
pub mod pipeline;
pub mod request;
pub mod service;
pub mod snyk;

#[cfg(test)]
mod testutils;

use errors::BadgeServiceError;
use pipeline::BadgePipeline;
use service::BadgeService;
use shared::admin_service::AdminService;
use shared::http::{run_http_service, serve};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::net::TcpListener;

const USER_AGENT: &str = concat!("badger/", env!("CARGO_PKG_VERSION"));

/// Serves badges until the listener fails. The admin listener, if configured,
/// reports ready once the badge listener is bound.
pub async fn run(config: config::Config) -> Result<(), BadgeServiceError> {
    config.validate()?;

    let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
    let service = BadgeService::new(BadgePipeline::new(client, &config)?);
    let ready = Arc::new(AtomicBool::new(false));

    let badge_task = {
        let ready = ready.clone();
        let listener = config.listener.clone();
        async move {
            let tcp_listener = TcpListener::bind(format!("{}:{}", listener.host, listener.port)).await?;
            tracing::info!(host = %listener.host, port = listener.port, "Serving badges");
            ready.store(true, Ordering::Relaxed);
            serve(tcp_listener, service).await
        }
    };

    match config.admin_listener {
        Some(admin_listener) => {
            let admin_service =
                AdminService::<_, BadgeServiceError>::new(move || ready.load(Ordering::Relaxed));
            let admin_task =
                run_http_service(&admin_listener.host, admin_listener.port, admin_service);
            tokio::try_join!(badge_task, admin_task)?;
        }
        None => badge_task.await?,
    }

    Ok(())
}
