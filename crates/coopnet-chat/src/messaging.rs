//! Push messaging over the WhatsApp Cloud API.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde_json::{json, Value};
use tracing::debug;

use coopnet_core::config::MessagingConfig;
use coopnet_core::{Error, Result};

/// Provider-assigned id for a delivered message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryId(pub String);

/// Outbound messaging capability.
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send_text(&self, recipient: &str, body: &str) -> Result<DeliveryId>;

    /// Deliver a document by name and content.
    async fn send_document(
        &self,
        recipient: &str,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<DeliveryId>;
}

pub struct WhatsAppClient {
    client: Client,
    base_url: String,
    phone_number_id: String,
    access_token: String,
}

impl WhatsAppClient {
    pub fn new(config: &MessagingConfig, timeout: std::time::Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            phone_number_id: config.phone_number_id.clone(),
            access_token: config.access_token.clone(),
        })
    }

    async fn post_message(&self, payload: Value) -> Result<DeliveryId> {
        let url = format!("{}/{}/messages", self.base_url, self.phone_number_id);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(&payload)
            .send()
            .await?;
        let parsed: Value = check_status(response).await?.json().await?;
        parsed["messages"][0]["id"]
            .as_str()
            .map(|id| DeliveryId(id.to_string()))
            .ok_or_else(|| Error::Messaging("send succeeded but no message id returned".into()))
    }

    /// Upload media first; documents are sent by reference, not inline.
    async fn upload_media(&self, file_name: &str, bytes: Vec<u8>) -> Result<String> {
        let url = format!("{}/{}/media", self.base_url, self.phone_number_id);
        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str("application/pdf")
            .map_err(|e| Error::Messaging(format!("bad media part: {e}")))?;
        let form = Form::new()
            .text("messaging_product", "whatsapp")
            .text("type", "application/pdf")
            .part("file", part);

        debug!("uploading media {file_name}");
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.access_token)
            .multipart(form)
            .send()
            .await?;
        let parsed: Value = check_status(response).await?.json().await?;
        parsed["id"]
            .as_str()
            .map(|id| id.to_string())
            .ok_or_else(|| Error::Messaging("media upload returned no id".into()))
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        let body = response.text().await.unwrap_or_default();
        Err(Error::RemoteStatus {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl Messenger for WhatsAppClient {
    async fn send_text(&self, recipient: &str, body: &str) -> Result<DeliveryId> {
        self.post_message(json!({
            "messaging_product": "whatsapp",
            "to": recipient,
            "type": "text",
            "text": {"body": body},
        }))
        .await
    }

    async fn send_document(
        &self,
        recipient: &str,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<DeliveryId> {
        let media_id = self.upload_media(file_name, bytes).await?;
        self.post_message(json!({
            "messaging_product": "whatsapp",
            "to": recipient,
            "type": "document",
            "document": {"id": media_id, "filename": file_name},
        }))
        .await
    }
}
