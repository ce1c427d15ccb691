use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;

use crate::config::PluginOptions;
use crate::constants::fetch::{
    DEFAULT_API_BASE, DEFAULT_PAGE_SIZE, DEFAULT_VIEW, REQUEST_TIMEOUT_SECS,
};
use crate::constants::options::{ENV_API_KEY, OPTION_API_KEY};
use crate::data::Record;
use crate::errors::SourceError;
use crate::source::{RecordPage, RecordSourceClient};
use crate::types::{BaseId, PageToken, TableName};

/// Configuration for the Airtable-compatible REST client.
#[derive(Clone, Debug)]
pub struct AirtableConfig {
    /// Bearer token used to authenticate every request.
    pub api_key: String,
    /// Base the configured tables live in.
    pub base_id: BaseId,
    /// REST endpoint root, e.g. `https://api.airtable.com/v0`.
    pub api_base: String,
    /// View queried when paging a table.
    pub view: String,
    /// Records requested per page.
    pub page_size: usize,
}

impl AirtableConfig {
    /// Create a config with required credentials and default endpoint values.
    pub fn new(api_key: impl Into<String>, base_id: impl Into<BaseId>) -> Self {
        Self {
            api_key: api_key.into(),
            base_id: base_id.into(),
            api_base: DEFAULT_API_BASE.to_string(),
            view: DEFAULT_VIEW.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Build a config from resolved plugin options.
    ///
    /// The API key comes from the options or the environment; its absence
    /// is a configuration error surfaced before any network access.
    pub fn from_options(options: &PluginOptions) -> Result<Self, SourceError> {
        let api_key = options.resolve_api_key().ok_or_else(|| {
            SourceError::Configuration(format!(
                "'{OPTION_API_KEY}' is not configured and {ENV_API_KEY} is unset"
            ))
        })?;
        Ok(Self::new(api_key, options.base_id.clone()))
    }
}

/// Paginated record client for Airtable-compatible REST bases.
///
/// Pages are requested with the continuation token the previous response
/// carried; the service guarantees source order within a view.
pub struct AirtableClient {
    config: AirtableConfig,
    base_url: Url,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct PageResponse {
    #[serde(default)]
    records: Vec<RawRecord>,
    #[serde(default)]
    offset: Option<PageToken>,
}

#[derive(Debug, Deserialize)]
struct RawRecord {
    #[serde(default)]
    fields: serde_json::Map<String, Value>,
}

impl AirtableClient {
    /// Build a client, validating the endpoint and constructing the HTTP
    /// handle once.
    pub fn new(config: AirtableConfig) -> Result<Self, SourceError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|err| {
                SourceError::Configuration(format!("failed building http client: {err}"))
            })?;
        let base_url = Url::parse(&config.api_base).map_err(|err| {
            SourceError::Configuration(format!("invalid api base '{}': {err}", config.api_base))
        })?;
        Ok(Self {
            config,
            base_url,
            http,
        })
    }

    fn table_url(&self, table: &str) -> Result<Url, SourceError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                SourceError::Configuration(format!(
                    "api base '{}' cannot carry table paths",
                    self.config.api_base
                ))
            })?
            .push(&self.config.base_id)
            .push(table);
        Ok(url)
    }
}

#[async_trait]
impl RecordSourceClient for AirtableClient {
    async fn fetch_page(
        &self,
        table: &TableName,
        page: Option<&PageToken>,
    ) -> Result<RecordPage, SourceError> {
        let url = self.table_url(table)?;
        let page_size = self.config.page_size.to_string();
        let mut request = self
            .http
            .get(url)
            .bearer_auth(&self.config.api_key)
            .query(&[
                ("view", self.config.view.as_str()),
                ("pageSize", page_size.as_str()),
            ]);
        if let Some(token) = page {
            request = request.query(&[("offset", token.as_str())]);
        }

        let response = request
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|err| SourceError::TableFetch {
                table: table.clone(),
                reason: err.to_string(),
            })?;

        let payload: PageResponse =
            response.json().await.map_err(|err| SourceError::TableFetch {
                table: table.clone(),
                reason: format!("failed decoding page payload: {err}"),
            })?;

        let mut records = Vec::with_capacity(payload.records.len());
        for raw in &payload.records {
            records.push(Record::from_json_map(table, &raw.fields)?);
        }
        Ok(RecordPage {
            records,
            next: payload.offset,
        })
    }
}
