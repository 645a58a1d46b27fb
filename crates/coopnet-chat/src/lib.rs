//! Chat-handling layer: routes inbound member messages.
//!
//! Every message runs the new-service classifier first, then the invoice
//! flow when billing words are present, and otherwise falls through to the
//! AI assistant. Outbound delivery goes over the messaging channel; the
//! structured [`Reply`] is what the webhook caller gets back.

pub mod completion;
pub mod conversations;
pub mod handler;
pub mod messaging;
pub mod replies;

pub use completion::{CompletionConfig, LlmClient, Provider, TextCompletion};
pub use conversations::ConversationLog;
pub use handler::ChatHandler;
pub use messaging::{DeliveryId, Messenger, WhatsAppClient};
pub use replies::Reply;
