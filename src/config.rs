use std::collections::HashMap;
use std::env;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::constants::options::{
    ENV_API_KEY, OPTION_API_KEY, OPTION_BASE_ID, OPTION_TABLES, OPTION_WATCH, RUNTIME_PARAM_WATCH,
};
use crate::errors::SourceError;
use crate::types::{BaseId, TableName};

/// Host runtime parameters (command-line flags) that may override file
/// configuration, keyed by parameter name.
pub type RuntimeParameters = HashMap<String, bool>;

/// Declarative metadata for one plugin option.
///
/// The host's configuration assembly uses these to merge file options,
/// environment variables, and runtime parameters into [`PluginOptions`].
#[derive(Clone, Debug, PartialEq)]
pub struct OptionSpec {
    /// Option key as it appears in the host configuration file.
    pub key: &'static str,
    /// Environment variable consulted when the option is absent.
    pub env: Option<&'static str>,
    /// Default value applied when neither configuration nor environment
    /// provide one.
    pub default: Option<Value>,
    /// Runtime parameter that overrides the option regardless of file
    /// configuration.
    pub runtime_parameter: Option<&'static str>,
    /// Secret options are never echoed back by the host.
    pub private: bool,
}

/// Resolved plugin options, as they come from the host configuration file,
/// environment, and runtime parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PluginOptions {
    /// Secret API key. Falls back to the environment when `None`.
    pub api_key: Option<String>,
    /// Identifier of the remote base to pull tables from. Required.
    pub base_id: BaseId,
    /// Ordered list of table names to fetch. Required, non-empty.
    pub tables: Vec<TableName>,
    /// Re-run the pipeline when remote data changes.
    pub watch: bool,
    /// Reuse a previously stored plugin context instead of refetching.
    pub reuse_cache: bool,
    /// Derive model field names from the union of all records' fields
    /// instead of the first record only.
    pub all_field_names: bool,
}

impl Default for PluginOptions {
    fn default() -> Self {
        Self {
            api_key: None,
            base_id: String::new(),
            tables: Vec::new(),
            watch: false,
            reuse_cache: false,
            all_field_names: false,
        }
    }
}

impl PluginOptions {
    /// Create options with the required base id and table list.
    pub fn new(
        base_id: impl Into<BaseId>,
        tables: impl IntoIterator<Item = impl Into<TableName>>,
    ) -> Self {
        Self {
            base_id: base_id.into(),
            tables: tables.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Resolve the API key from explicit configuration or the environment.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key_from(|var| env::var(var).ok())
    }

    fn api_key_from(&self, lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
        self.api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .or_else(|| lookup(ENV_API_KEY).filter(|key| !key.trim().is_empty()))
    }

    /// Apply host runtime parameters on top of file configuration.
    pub fn apply_runtime_parameters(&mut self, parameters: &RuntimeParameters) {
        if let Some(watch) = parameters.get(RUNTIME_PARAM_WATCH) {
            self.watch = *watch;
        }
    }

    /// Fail fast on missing required options, before any network access.
    pub fn validate(&self) -> Result<(), SourceError> {
        if self.base_id.trim().is_empty() {
            return Err(SourceError::Configuration(format!(
                "'{OPTION_BASE_ID}' is required"
            )));
        }
        if self.tables.is_empty() {
            return Err(SourceError::Configuration(format!(
                "'{OPTION_TABLES}' must name at least one table"
            )));
        }
        if let Some(idx) = self.tables.iter().position(|table| table.trim().is_empty()) {
            return Err(SourceError::Configuration(format!(
                "'{OPTION_TABLES}' entry {idx} is empty"
            )));
        }
        Ok(())
    }

    /// Option metadata exported to the host's configuration assembly.
    pub fn option_specs() -> Vec<OptionSpec> {
        vec![
            OptionSpec {
                key: OPTION_API_KEY,
                env: Some(ENV_API_KEY),
                default: None,
                runtime_parameter: None,
                private: true,
            },
            OptionSpec {
                key: OPTION_BASE_ID,
                env: None,
                default: None,
                runtime_parameter: None,
                private: false,
            },
            OptionSpec {
                key: OPTION_TABLES,
                env: None,
                default: Some(json!([])),
                runtime_parameter: None,
                private: false,
            },
            OptionSpec {
                key: OPTION_WATCH,
                env: None,
                default: Some(json!(false)),
                runtime_parameter: Some(RUNTIME_PARAM_WATCH),
                private: false,
            },
        ]
    }
}
