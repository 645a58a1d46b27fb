//! Hosted relational backend client (PostgREST-style API).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, Response, StatusCode};
use serde_json::Value;
use tracing::debug;

use coopnet_core::config::RecordStoreConfig;
use coopnet_core::{Error, Result};

use crate::types::Filter;
use crate::RecordStore;

/// Client for the cooperative's hosted relational API.
pub struct PostgrestStore {
    client: Client,
    base_url: String,
}

impl PostgrestStore {
    pub fn new(config: &RecordStoreConfig, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(&config.api_key)
            .map_err(|_| Error::Config("record store api key is not a valid header".into()))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", config.api_key))
            .map_err(|_| Error::Config("record store api key is not a valid header".into()))?;
        headers.insert("apikey", key);
        headers.insert("Authorization", bearer);

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn table_url(&self, table: &str, filter: &Filter) -> String {
        let mut url = format!("{}/rest/v1/{}", self.base_url, table);
        let params: Vec<String> = filter
            .conditions
            .iter()
            .map(|c| {
                let raw = match &c.value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                format!("{}={}.{}", c.field, c.op.as_str(), raw)
            })
            .collect();
        if !params.is_empty() {
            url.push('?');
            url.push_str(&params.join("&"));
        }
        url
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

/// Parse the total out of a `Content-Range: 0-24/3573` header.
fn parse_content_range_total(response: &Response) -> Option<u64> {
    response
        .headers()
        .get("content-range")?
        .to_str()
        .ok()?
        .rsplit('/')
        .next()?
        .parse()
        .ok()
}

#[async_trait]
impl RecordStore for PostgrestStore {
    async fn insert(&self, table: &str, record: Value) -> Result<()> {
        let url = format!("{}/rest/v1/{}", self.base_url, table);
        debug!("record store insert into {table}");
        let response = self
            .client
            .post(&url)
            .header("Prefer", "return=minimal")
            .json(&record)
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    async fn select(&self, table: &str, filter: &Filter) -> Result<Vec<Value>> {
        let response = self.client.get(self.table_url(table, filter)).send().await?;
        let response = check_status(response).await?;
        let rows: Vec<Value> = response.json().await?;
        Ok(rows)
    }

    async fn count(&self, table: &str, filter: &Filter) -> Result<u64> {
        let mut url = self.table_url(table, filter);
        url.push_str(if url.contains('?') { "&" } else { "?" });
        url.push_str("select=id");
        let response = self
            .client
            .get(&url)
            .header("Prefer", "count=exact")
            .header("Range", "0-0")
            .send()
            .await?;
        // 416 means "range past the end", i.e. zero rows.
        if response.status() == StatusCode::RANGE_NOT_SATISFIABLE {
            return Ok(0);
        }
        let response = check_status(response).await?;
        parse_content_range_total(&response)
            .ok_or_else(|| Error::Storage(format!("count on {table}: missing Content-Range")))
    }

    async fn update(&self, table: &str, filter: &Filter, patch: Value) -> Result<u64> {
        let response = self
            .client
            .patch(self.table_url(table, filter))
            .header("Prefer", "return=representation")
            .json(&patch)
            .send()
            .await?;
        let response = check_status(response).await?;
        let rows: Vec<Value> = response.json().await?;
        Ok(rows.len() as u64)
    }

    async fn delete(&self, table: &str, filter: &Filter) -> Result<u64> {
        let response = self
            .client
            .delete(self.table_url(table, filter))
            .header("Prefer", "return=representation")
            .send()
            .await?;
        let response = check_status(response).await?;
        let rows: Vec<Value> = response.json().await?;
        Ok(rows.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store() -> PostgrestStore {
        PostgrestStore::new(
            &RecordStoreConfig {
                base_url: "https://example.supabase.co/".into(),
                api_key: "key".into(),
            },
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn test_table_url_trims_slash_and_encodes_filter() {
        let filter = Filter::new()
            .eq("recipient", "549351")
            .gte("requested_at", "2026-08-01T00:00:00Z");
        assert_eq!(
            store().table_url("invoice_requests", &filter),
            "https://example.supabase.co/rest/v1/invoice_requests\
             ?recipient=eq.549351&requested_at=gte.2026-08-01T00:00:00Z"
        );
    }

    #[test]
    fn test_table_url_without_filter() {
        assert_eq!(
            store().table_url("conversations", &Filter::new()),
            "https://example.supabase.co/rest/v1/conversations"
        );
    }

    #[test]
    fn test_numeric_filter_value() {
        let filter = Filter::new().eq("year", json!(2026));
        assert_eq!(
            store().table_url("invoice_requests", &filter),
            "https://example.supabase.co/rest/v1/invoice_requests?year=eq.2026"
        );
    }
}
