/// Constants tied to the plugin's identity in the host pipeline.
pub mod plugin {
    /// Plugin name used for the context-store key and the model `source` field.
    pub const PLUGIN_NAME: &str = "gridsource";
}

/// Constants used by option resolution.
pub mod options {
    /// Environment variable consulted when `apiKey` is absent from configuration.
    pub const ENV_API_KEY: &str = "AIRTABLE_API_KEY";
    /// Host runtime parameter that overrides the `watch` option.
    pub const RUNTIME_PARAM_WATCH: &str = "watch";
    /// Option key for the secret API key.
    pub const OPTION_API_KEY: &str = "apiKey";
    /// Option key for the remote base identifier.
    pub const OPTION_BASE_ID: &str = "baseId";
    /// Option key for the configured table list.
    pub const OPTION_TABLES: &str = "tables";
    /// Option key for watch mode.
    pub const OPTION_WATCH: &str = "watch";
}

/// Constants used by the acquisition stage and remote clients.
pub mod fetch {
    /// Default REST endpoint for Airtable-compatible bases.
    pub const DEFAULT_API_BASE: &str = "https://api.airtable.com/v0";
    /// Default view queried when paging a table.
    pub const DEFAULT_VIEW: &str = "Grid view";
    /// Default number of records requested per page.
    pub const DEFAULT_PAGE_SIZE: usize = 100;
    /// Request timeout for remote page fetches, in seconds.
    pub const REQUEST_TIMEOUT_SECS: u64 = 20;
    /// Poll interval for the watch loop, in seconds.
    pub const WATCH_POLL_INTERVAL_SECS: u64 = 30;
}

/// Constants used by the setup negotiation stage.
pub mod setup {
    /// Answer key for Jane's starting points.
    pub const KEY_POINTS_JANE: &str = "pointsForJane";
    /// Answer key for John's starting points.
    pub const KEY_POINTS_JOHN: &str = "pointsForJohn";
    /// Prompt shown for Jane's starting points.
    pub const PROMPT_POINTS_JANE: &str = "How many points should Jane start with?";
    /// Prompt shown for John's starting points.
    pub const PROMPT_POINTS_JOHN: &str = "How many points should John start with?";
    /// Upper bound applied to John's starting points during post-processing.
    pub const MAX_STARTING_POINTS: f64 = 15.0;
    /// Progress message shown while the setup procedure gathers state.
    pub const PROGRESS_MESSAGE: &str = "Crunching some numbers...";
}
