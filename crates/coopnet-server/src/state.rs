//! Shared application state.

use coopnet_chat::ChatHandler;
use coopnet_core::CoopNetConfig;

/// State accessible from all route handlers.
pub struct AppState {
    pub config: CoopNetConfig,
    pub handler: ChatHandler,
}
