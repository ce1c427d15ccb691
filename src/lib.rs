#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Acquisition stage: paginated table fetching and the watch loop.
pub mod acquire;
/// Plugin option types and host configuration metadata.
pub mod config;
/// Centralized constants used across stages and clients.
pub mod constants;
/// Plugin context cache shared between acquisition and normalization.
pub mod context;
/// Record, schema model, and pipeline data types.
pub mod data;
mod hash;
/// Normalization stage: schema models and normalized entries.
pub mod normalize;
/// Host lifecycle contract and the concrete plugin.
pub mod plugin;
/// Interactive setup questions and answer post-processing.
pub mod setup;
/// Record source client traits and built-in clients.
pub mod source;
/// Shared type aliases.
pub mod types;

mod errors;

pub use acquire::fetch_tables;
pub use config::{OptionSpec, PluginOptions, RuntimeParameters};
pub use context::{ContextStore, PluginContext, TableFetch};
pub use data::{FieldValue, NormalizedEntry, PipelineData, Record, SchemaModel};
pub use errors::SourceError;
pub use normalize::transform;
pub use plugin::{GridSourcePlugin, HostHandle, RefreshHandle, SourcePlugin};
pub use setup::{
    Answers, AnswerValue, PersistedOptions, Question, QuestionKind, SetupPlan, options_from_setup,
};
#[cfg(feature = "airtable")]
pub use source::{AirtableClient, AirtableConfig};
pub use source::{InMemoryClient, RecordPage, RecordSourceClient};
pub use types::{BaseId, EntryId, FieldName, OptionKey, PageToken, PluginName, TableName};
