//! Record source client interfaces and built-in clients.
//!
//! Ownership model:
//! - `RecordSourceClient` is the acquisition-facing interface that yields
//!   pages of validated records for one table at a time.
//! - Clients own connection state (HTTP handles, credentials); the
//!   acquisition stage owns pagination and accumulation.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::data::Record;
use crate::errors::SourceError;
use crate::types::{PageToken, TableName};

/// Airtable-compatible REST client.
#[cfg(feature = "airtable")]
pub mod airtable;
#[cfg(feature = "airtable")]
pub use airtable::{AirtableClient, AirtableConfig};

/// One page of records for a table.
///
/// Pass `next` back into the following fetch to continue; `None` means the
/// table is exhausted.
#[derive(Clone, Debug, Default)]
pub struct RecordPage {
    /// Records in source order.
    pub records: Vec<Record>,
    /// Continuation token for the next page, if any.
    pub next: Option<PageToken>,
}

/// Acquisition-facing record source interface.
///
/// Implementations must keep page order stable for a fixed remote state:
/// fetching page `n` then its `next` token walks the table in source order.
/// A table name that does not resolve remotely fails the call for that
/// table only.
#[async_trait]
pub trait RecordSourceClient: Send + Sync {
    /// Fetch one page of `table`, starting from `page` (or the beginning).
    async fn fetch_page(
        &self,
        table: &TableName,
        page: Option<&PageToken>,
    ) -> Result<RecordPage, SourceError>;
}

/// In-memory client for tests and offline runs.
///
/// Tables are registered as pre-paged record lists; continuation tokens are
/// page indices.
#[derive(Clone, Debug, Default)]
pub struct InMemoryClient {
    tables: HashMap<TableName, Vec<Vec<Record>>>,
}

impl InMemoryClient {
    /// Create a client with no tables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a table served as a single page.
    pub fn with_table(
        mut self,
        table: impl Into<TableName>,
        records: Vec<Record>,
    ) -> Self {
        self.tables.insert(table.into(), vec![records]);
        self
    }

    /// Register a table served as the given pages, in order.
    pub fn with_pages(
        mut self,
        table: impl Into<TableName>,
        pages: Vec<Vec<Record>>,
    ) -> Self {
        self.tables.insert(table.into(), pages);
        self
    }
}

#[async_trait]
impl RecordSourceClient for InMemoryClient {
    async fn fetch_page(
        &self,
        table: &TableName,
        page: Option<&PageToken>,
    ) -> Result<RecordPage, SourceError> {
        let pages = self
            .tables
            .get(table)
            .ok_or_else(|| SourceError::TableFetch {
                table: table.clone(),
                reason: "table not found".to_string(),
            })?;

        let idx = match page {
            None => 0,
            Some(token) => token.parse::<usize>().map_err(|_| SourceError::TableFetch {
                table: table.clone(),
                reason: format!("invalid page token '{token}'"),
            })?,
        };

        let records = pages.get(idx).cloned().unwrap_or_default();
        let next = if idx + 1 < pages.len() {
            Some((idx + 1).to_string())
        } else {
            None
        };
        Ok(RecordPage { records, next })
    }
}
