pub mod config;
pub mod errors;
pub mod handler;
pub mod metrics_defs;
pub mod model;
pub mod normalize;
pub mod notion;
pub mod params;
mod service;

use handler::FeedHandler;
use notion::NotionClient;
use service::FeedService;
use shared::admin_service::AdminService;
use shared::http::run_http_service;
use std::sync::Arc;

pub use config::{Config, Credential};
pub use errors::FeedError;

/// Serves the feed and the admin probes until either listener fails.
pub async fn run(config: Config, token: Credential) -> Result<(), FeedError> {
    let client = NotionClient::new(&config.notion, token)?;
    let handler = FeedHandler::new(
        Arc::new(client),
        config.capabilities,
        config.version.clone(),
    );

    tracing::info!(
        notion_url = %config.notion.base_url,
        format = config.capabilities.format,
        ping = config.capabilities.ping,
        "starting feed"
    );

    let feed_task = run_http_service(
        &config.listener.host,
        config.listener.port,
        FeedService::new(handler),
    );
    // Nothing to warm up, the service is ready as soon as it listens
    let admin_task = run_http_service(
        &config.admin_listener.host,
        config.admin_listener.port,
        AdminService::<_, FeedError>::new(|| true),
    );

    tokio::try_join!(feed_task, admin_task)?;
    Ok(())
}
