//! CoopNet — cooperative member-portal backend.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;
use tracing_subscriber::EnvFilter;

mod routes;
mod state;

use coopnet_chat::{
    ChatHandler, CompletionConfig, ConversationLog, LlmClient, WhatsAppClient,
};
use coopnet_core::CoopNetConfig;
use coopnet_drive::GoogleDrive;
use coopnet_locator::{DocumentSearch, RequestLedger};
use coopnet_store::{PostgrestStore, RecordStore};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = CoopNetConfig::from_env()?;
    let timeout = Duration::from_millis(config.request_timeout_ms);

    // Collaborator clients are constructed once here and injected; nothing
    // below this point reaches for process-wide state.
    let drive = Arc::new(GoogleDrive::new(&config.drive, timeout)?);
    let store: Arc<dyn RecordStore> = Arc::new(PostgrestStore::new(&config.record_store, timeout)?);
    let messenger = Arc::new(WhatsAppClient::new(&config.messaging, timeout)?);
    let completion = Arc::new(LlmClient::new(CompletionConfig::from_env()?, timeout)?);

    let search = DocumentSearch::new(drive, config.folder_naming.clone(), timeout);
    let handler = ChatHandler::new(
        search,
        RequestLedger::new(store.clone()),
        ConversationLog::new(store.clone()),
        completion,
        messenger,
        config.monthly_request_limit,
    );

    let port = config.port;
    let state = Arc::new(AppState { config, handler });
    let app = routes::build_router(state);

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("coopnet server listening on {addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
