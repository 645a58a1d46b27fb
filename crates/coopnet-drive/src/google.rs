//! Google Drive v3 client — direct HTTP via reqwest.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use tracing::debug;

use coopnet_core::config::DriveConfig;
use coopnet_core::{Error, Result};

use crate::types::{DocumentHandle, FolderHandle};
use crate::BlobHierarchy;

const FOLDER_MIME: &str = "application/vnd.google-apps.folder";

/// Drive `files.list` response shape (only the fields we request).
#[derive(Debug, Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<FileEntry>,
}

#[derive(Debug, Deserialize)]
struct FileEntry {
    id: String,
    name: String,
}

pub struct GoogleDrive {
    client: Client,
    base_url: String,
    access_token: String,
}

impl GoogleDrive {
    pub fn new(config: &DriveConfig, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            access_token: config.access_token.clone(),
        })
    }

    async fn list_files(&self, query: &str) -> Result<Vec<FileEntry>> {
        let url = format!("{}/files", self.base_url);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.access_token)
            .query(&[
                ("q", query),
                ("fields", "files(id, name)"),
                ("pageSize", "1000"),
            ])
            .send()
            .await?;
        let response = check_status(response).await?;
        let list: FileList = response.json().await?;
        Ok(list.files)
    }
}

async fn check_status(response: Response) -> Result<Response> {
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

/// Escape a name for embedding in a Drive query string literal.
fn escape_query_value(name: &str) -> String {
    name.replace('\\', "\\\\").replace('\'', "\\'")
}

#[async_trait]
impl BlobHierarchy for GoogleDrive {
    async fn find_folder_by_exact_name(&self, name: &str) -> Result<Option<FolderHandle>> {
        let query = format!(
            "name = '{}' and mimeType = '{}' and trashed = false",
            escape_query_value(name),
            FOLDER_MIME,
        );
        debug!("drive folder lookup: {name}");
        let files = self.list_files(&query).await?;
        Ok(files
            .into_iter()
            .find(|f| f.name == name)
            .map(|f| FolderHandle {
                id: f.id,
                name: f.name,
            }))
    }

    async fn list_documents(
        &self,
        folder: &FolderHandle,
        mime_type: &str,
    ) -> Result<Vec<DocumentHandle>> {
        let query = format!(
            "'{}' in parents and mimeType = '{}' and trashed = false",
            escape_query_value(&folder.id),
            mime_type,
        );
        let files = self.list_files(&query).await?;
        Ok(files
            .into_iter()
            .map(|f| DocumentHandle {
                id: f.id,
                name: f.name,
            })
            .collect())
    }

    async fn download(&self, document: &DocumentHandle) -> Result<Vec<u8>> {
        let url = format!("{}/files/{}", self.base_url, document.id);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.access_token)
            .query(&[("alt", "media")])
            .send()
            .await?;
        let response = check_status(response).await?;
        let bytes = response.bytes().await?;
        Ok(bytes.to_vec())
    }
}
