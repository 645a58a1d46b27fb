//! In-memory [`RecordStore`] for tests.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use coopnet_core::Result;

use crate::types::Filter;
use crate::RecordStore;

/// Table-per-key row store behind a mutex.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<HashMap<String, Vec<Value>>>,
    fail_writes: Mutex<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent inserts fail, for exercising best-effort writers.
    pub fn fail_writes(&self, fail: bool) {
        *self.fail_writes.lock() = fail;
    }

    /// Snapshot of a table's rows.
    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.tables.lock().get(table).cloned().unwrap_or_default()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn insert(&self, table: &str, record: Value) -> Result<()> {
        if *self.fail_writes.lock() {
            return Err(coopnet_core::Error::Storage("write failure injected".into()));
        }
        self.tables
            .lock()
            .entry(table.to_string())
            .or_default()
            .push(record);
        Ok(())
    }

    async fn select(&self, table: &str, filter: &Filter) -> Result<Vec<Value>> {
        Ok(self
            .rows(table)
            .into_iter()
            .filter(|row| filter.matches(row))
            .collect())
    }

    async fn count(&self, table: &str, filter: &Filter) -> Result<u64> {
        Ok(self.select(table, filter).await?.len() as u64)
    }

    async fn update(&self, table: &str, filter: &Filter, patch: Value) -> Result<u64> {
        let mut tables = self.tables.lock();
        let rows = match tables.get_mut(table) {
            Some(rows) => rows,
            None => return Ok(0),
        };
        let mut touched = 0;
        for row in rows.iter_mut().filter(|row| filter.matches(row)) {
            if let (Value::Object(target), Value::Object(fields)) = (&mut *row, &patch) {
                for (k, v) in fields {
                    target.insert(k.clone(), v.clone());
                }
            }
            touched += 1;
        }
        Ok(touched)
    }

    async fn delete(&self, table: &str, filter: &Filter) -> Result<u64> {
        let mut tables = self.tables.lock();
        let rows = match tables.get_mut(table) {
            Some(rows) => rows,
            None => return Ok(0),
        };
        let before = rows.len();
        rows.retain(|row| !filter.matches(row));
        Ok((before - rows.len()) as u64)
    }
}
