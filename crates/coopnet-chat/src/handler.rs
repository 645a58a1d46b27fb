//! Inbound message routing: classifier, invoice flow, assistant fallback.

use std::sync::Arc;

use tracing::{info, warn};

use coopnet_locator::{
    extract_intent, is_new_service_request, mentions_invoice, DocumentSearch, RequestLedger,
    SearchQuery,
};

use crate::completion::TextCompletion;
use crate::conversations::ConversationLog;
use crate::messaging::Messenger;
use crate::replies::{self, Reply};

pub struct ChatHandler {
    search: DocumentSearch,
    ledger: RequestLedger,
    conversations: ConversationLog,
    completion: Arc<dyn TextCompletion>,
    messenger: Arc<dyn Messenger>,
    monthly_limit: u64,
}

impl ChatHandler {
    pub fn new(
        search: DocumentSearch,
        ledger: RequestLedger,
        conversations: ConversationLog,
        completion: Arc<dyn TextCompletion>,
        messenger: Arc<dyn Messenger>,
        monthly_limit: u64,
    ) -> Self {
        Self {
            search,
            ledger,
            conversations,
            completion,
            messenger,
            monthly_limit,
        }
    }

    /// Handle one inbound message end to end: route it, deliver the reply
    /// over the messaging channel, log the exchange.
    pub async fn handle_message(&self, recipient: &str, text: &str) -> Reply {
        let reply = self.route(recipient, text).await;
        self.conversations.log(recipient, text, reply.text()).await;
        reply
    }

    async fn route(&self, recipient: &str, text: &str) -> Reply {
        // "quiero internet" is an installation request, not a billing one;
        // it must short-circuit before any invoice parsing.
        if is_new_service_request(text) {
            info!("new-service request from {recipient}");
            return self
                .text_reply(recipient, Reply::NewServiceRedirect {
                    text: replies::NEW_SERVICE_REDIRECT.into(),
                })
                .await;
        }

        if mentions_invoice(text) {
            return self.invoice_flow(recipient, text).await;
        }

        match self
            .completion
            .complete(replies::SYSTEM_PROMPT, text)
            .await
        {
            Ok(answer) => {
                self.text_reply(recipient, Reply::Assistant { text: answer })
                    .await
            }
            Err(e) => {
                warn!("completion failed for {recipient}: {e}");
                self.text_reply(recipient, Reply::Apology {
                    text: replies::TRANSPORT_APOLOGY.into(),
                })
                .await
            }
        }
    }

    async fn invoice_flow(&self, recipient: &str, text: &str) -> Reply {
        let intent = extract_intent(text);
        let account = match intent.account {
            Some(account) => account,
            None => {
                return self
                    .text_reply(recipient, Reply::AccountMissing {
                        text: replies::ASK_ACCOUNT.into(),
                    })
                    .await;
            }
        };

        // The ledger only reports; the limit is enforced here. A failed
        // count must not block delivery.
        match self.ledger.count_this_month(recipient).await {
            Ok(count) if count >= self.monthly_limit => {
                info!("monthly limit reached for {recipient} ({count})");
                return self
                    .text_reply(recipient, Reply::QuotaReached {
                        text: replies::QUOTA_REACHED.into(),
                    })
                    .await;
            }
            Ok(_) => {}
            Err(e) => warn!("ledger count failed for {recipient}: {e}"),
        }

        let query = SearchQuery {
            account: account.clone(),
            month: intent.month,
            year: intent.year,
            doc_type: intent.doc_type,
        };

        let located = match self.search.find_document(&query).await {
            Ok(Some(located)) => located,
            Ok(None) => {
                return self
                    .text_reply(recipient, Reply::InvoiceNotFound {
                        text: replies::NOT_FOUND.into(),
                    })
                    .await;
            }
            Err(e) => {
                warn!("invoice search failed for {recipient}: {e}");
                return self
                    .text_reply(recipient, Reply::Apology {
                        text: replies::TRANSPORT_APOLOGY.into(),
                    })
                    .await;
            }
        };

        let bytes = match self.search.download(&located).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("download failed for {}: {e}", located.handle.name);
                return self
                    .text_reply(recipient, Reply::Apology {
                        text: replies::TRANSPORT_APOLOGY.into(),
                    })
                    .await;
            }
        };

        match self
            .messenger
            .send_document(recipient, &located.handle.name, bytes)
            .await
        {
            Ok(delivery) => {
                // Commit only after the authoritative match went out.
                self.ledger
                    .record(recipient, &account, &located.handle.name, located.period)
                    .await;
                info!(
                    "delivered {} ({}) to {recipient}",
                    located.handle.name, located.doc_type
                );
                self.text_reply(recipient, Reply::InvoiceDelivered {
                    text: replies::invoice_delivered(&located),
                    file_name: located.handle.name.clone(),
                    doc_type: located.doc_type,
                    delivery_id: delivery.0,
                })
                .await
            }
            Err(e) => {
                warn!("document delivery failed for {recipient}: {e}");
                self.text_reply(recipient, Reply::Apology {
                    text: replies::TRANSPORT_APOLOGY.into(),
                })
                .await
            }
        }
    }

    /// Push the reply text to the member. Send failures are logged; the
    /// structured reply still goes back to the webhook caller.
    async fn text_reply(&self, recipient: &str, reply: Reply) -> Reply {
        if let Err(e) = self.messenger.send_text(recipient, reply.text()).await {
            warn!("text delivery failed for {recipient}: {e}");
        }
        reply
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::{SecondsFormat, Utc};
    use parking_lot::Mutex;

    use coopnet_core::config::FolderNaming;
    use coopnet_core::{Error, Result};
    use coopnet_drive::{BlobHierarchy, DocumentHandle, FolderHandle};
    use coopnet_locator::folder::folder_name;
    use coopnet_locator::ledger::INVOICE_REQUESTS_TABLE;
    use coopnet_locator::{BillingPeriod, DocumentType};
    use coopnet_store::{MemoryStore, RecordStore};

    use crate::messaging::DeliveryId;

    #[derive(Default)]
    struct FakeDrive {
        folders: HashMap<String, Vec<String>>,
        lookups: Mutex<usize>,
    }

    #[async_trait]
    impl BlobHierarchy for FakeDrive {
        async fn find_folder_by_exact_name(&self, name: &str) -> Result<Option<FolderHandle>> {
            *self.lookups.lock() += 1;
            Ok(self.folders.contains_key(name).then(|| FolderHandle {
                id: format!("id-{name}"),
                name: name.to_string(),
            }))
        }

        async fn list_documents(
            &self,
            folder: &FolderHandle,
            _mime_type: &str,
        ) -> Result<Vec<DocumentHandle>> {
            Ok(self
                .folders
                .get(&folder.name)
                .cloned()
                .unwrap_or_default()
                .into_iter()
                .map(|name| DocumentHandle {
                    id: format!("doc-{name}"),
                    name,
                })
                .collect())
        }

        async fn download(&self, _document: &DocumentHandle) -> Result<Vec<u8>> {
            Ok(b"%PDF-1.4".to_vec())
        }
    }

    #[derive(Default)]
    struct FakeMessenger {
        texts: Mutex<Vec<(String, String)>>,
        documents: Mutex<Vec<(String, String)>>,
        fail_documents: bool,
    }

    #[async_trait]
    impl Messenger for FakeMessenger {
        async fn send_text(&self, recipient: &str, body: &str) -> Result<DeliveryId> {
            self.texts.lock().push((recipient.into(), body.into()));
            Ok(DeliveryId("wamid.text".into()))
        }

        async fn send_document(
            &self,
            recipient: &str,
            file_name: &str,
            _bytes: Vec<u8>,
        ) -> Result<DeliveryId> {
            if self.fail_documents {
                return Err(Error::Messaging("channel rejected the document".into()));
            }
            self.documents
                .lock()
                .push((recipient.into(), file_name.into()));
            Ok(DeliveryId("wamid.doc".into()))
        }
    }

    struct FakeCompletion {
        fail: bool,
    }

    #[async_trait]
    impl TextCompletion for FakeCompletion {
        async fn complete(&self, _system: &str, user: &str) -> Result<String> {
            if self.fail {
                return Err(Error::Completion("provider down".into()));
            }
            Ok(format!("respuesta a: {user}"))
        }
    }

    struct Fixture {
        handler: ChatHandler,
        drive: Arc<FakeDrive>,
        messenger: Arc<FakeMessenger>,
        store: Arc<MemoryStore>,
    }

    fn fixture(drive: FakeDrive, messenger: FakeMessenger, completion_fails: bool) -> Fixture {
        let drive = Arc::new(drive);
        let messenger = Arc::new(messenger);
        let store = Arc::new(MemoryStore::new());
        let search = DocumentSearch::new(
            drive.clone(),
            FolderNaming::default(),
            Duration::from_secs(1),
        );
        let handler = ChatHandler::new(
            search,
            RequestLedger::new(store.clone()),
            ConversationLog::new(store.clone()),
            Arc::new(FakeCompletion {
                fail: completion_fails,
            }),
            messenger.clone(),
            2,
        );
        Fixture {
            handler,
            drive,
            messenger,
            store,
        }
    }

    /// Folder holding account 6370's invoice for the current month.
    fn current_servicios_folder() -> (String, Vec<String>) {
        let period = BillingPeriod::containing(Utc::now().date_naive());
        let name = folder_name(&FolderNaming::default(), period, DocumentType::Servicios);
        (name, vec!["0063700097-01.pdf".into()])
    }

    #[tokio::test]
    async fn test_new_service_request_short_circuits() {
        let f = fixture(FakeDrive::default(), FakeMessenger::default(), false);
        let reply = f
            .handler
            .handle_message("wa-111", "Quiero internet en mi casa")
            .await;

        assert!(matches!(reply, Reply::NewServiceRedirect { .. }));
        // No document search happened at all.
        assert_eq!(*f.drive.lookups.lock(), 0);
        assert_eq!(f.messenger.texts.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_invoice_happy_path_delivers_and_records() {
        let (name, files) = current_servicios_folder();
        let mut drive = FakeDrive::default();
        drive.folders.insert(name, files);
        let f = fixture(drive, FakeMessenger::default(), false);

        let reply = f
            .handler
            .handle_message("wa-111", "Quiero mi factura, mi número de cuenta es 6370")
            .await;

        match reply {
            Reply::InvoiceDelivered {
                file_name,
                doc_type,
                delivery_id,
                ..
            } => {
                assert_eq!(file_name, "0063700097-01.pdf");
                assert_eq!(doc_type, DocumentType::Servicios);
                assert_eq!(delivery_id, "wamid.doc");
            }
            other => panic!("expected delivery, got {other:?}"),
        }
        assert_eq!(f.messenger.documents.lock().len(), 1);
        assert_eq!(f.store.rows(INVOICE_REQUESTS_TABLE).len(), 1);
    }

    #[tokio::test]
    async fn test_invoice_without_account_asks_for_it() {
        let f = fixture(FakeDrive::default(), FakeMessenger::default(), false);
        let reply = f.handler.handle_message("wa-111", "quiero mi factura").await;

        assert!(matches!(reply, Reply::AccountMissing { .. }));
        assert_eq!(*f.drive.lookups.lock(), 0);
    }

    #[tokio::test]
    async fn test_no_match_asks_to_confirm() {
        let f = fixture(FakeDrive::default(), FakeMessenger::default(), false);
        let reply = f
            .handler
            .handle_message("wa-111", "la factura de la cuenta 6370 por favor")
            .await;

        assert!(matches!(reply, Reply::InvoiceNotFound { .. }));
        // Unpinned search walked current plus three prior months.
        assert_eq!(*f.drive.lookups.lock(), 8);
    }

    #[tokio::test]
    async fn test_quota_blocks_before_searching() {
        let f = fixture(FakeDrive::default(), FakeMessenger::default(), false);
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        for _ in 0..2 {
            f.store
                .insert(
                    INVOICE_REQUESTS_TABLE,
                    serde_json::json!({
                        "recipient": "wa-111",
                        "account": "6370",
                        "file_name": "0063700097-01.pdf",
                        "requested_at": now,
                    }),
                )
                .await
                .unwrap();
        }

        let reply = f
            .handler
            .handle_message("wa-111", "otra factura, cuenta 6370")
            .await;

        assert!(matches!(reply, Reply::QuotaReached { .. }));
        assert_eq!(*f.drive.lookups.lock(), 0);
    }

    #[tokio::test]
    async fn test_failed_delivery_is_not_recorded() {
        let (name, files) = current_servicios_folder();
        let mut drive = FakeDrive::default();
        drive.folders.insert(name, files);
        let mut messenger = FakeMessenger::default();
        messenger.fail_documents = true;
        let f = fixture(drive, messenger, false);

        let reply = f
            .handler
            .handle_message("wa-111", "factura de la cuenta 6370")
            .await;

        assert!(matches!(reply, Reply::Apology { .. }));
        assert!(f.store.rows(INVOICE_REQUESTS_TABLE).is_empty());
    }

    #[tokio::test]
    async fn test_ledger_write_failure_does_not_break_delivery() {
        let (name, files) = current_servicios_folder();
        let mut drive = FakeDrive::default();
        drive.folders.insert(name, files);
        let f = fixture(drive, FakeMessenger::default(), false);
        f.store.fail_writes(true);

        let reply = f
            .handler
            .handle_message("wa-111", "factura de la cuenta 6370")
            .await;

        assert!(matches!(reply, Reply::InvoiceDelivered { .. }));
        assert_eq!(f.messenger.documents.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_small_talk_goes_to_the_assistant() {
        let f = fixture(FakeDrive::default(), FakeMessenger::default(), false);
        let reply = f
            .handler
            .handle_message("wa-111", "¿a qué hora abre la oficina?")
            .await;

        match reply {
            Reply::Assistant { text } => assert!(text.contains("¿a qué hora abre la oficina?")),
            other => panic!("expected assistant reply, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_completion_failure_apologizes() {
        let f = fixture(FakeDrive::default(), FakeMessenger::default(), true);
        let reply = f.handler.handle_message("wa-111", "hola").await;
        assert!(matches!(reply, Reply::Apology { .. }));
    }

    #[tokio::test]
    async fn test_exchanges_are_logged() {
        let f = fixture(FakeDrive::default(), FakeMessenger::default(), false);
        f.handler.handle_message("wa-111", "hola").await;

        let rows = f.store.rows(crate::conversations::CONVERSATIONS_TABLE);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["inbound"], "hola");
    }
}
