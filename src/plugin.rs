use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::acquire::{fetch_tables, spawn_watch};
use crate::config::{OptionSpec, PluginOptions};
use crate::constants::fetch::WATCH_POLL_INTERVAL_SECS;
use crate::constants::plugin::PLUGIN_NAME;
use crate::context::{ContextStore, PluginContext};
use crate::data::PipelineData;
use crate::errors::SourceError;
use crate::normalize;
use crate::setup::{self, Answers, PersistedOptions, SetupPlan};
use crate::source::RecordSourceClient;

/// Re-run trigger the host hands to the acquisition entry point.
///
/// Calling [`notify`](RefreshHandle::notify) asks the host to re-execute
/// the plugin chain's normalization stages.
#[derive(Clone)]
pub struct RefreshHandle {
    inner: Arc<dyn Fn() + Send + Sync>,
}

impl RefreshHandle {
    /// Wrap a host callback.
    pub fn new(callback: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            inner: Arc::new(callback),
        }
    }

    /// A handle that ignores notifications, for hosts without re-runs.
    pub fn noop() -> Self {
        Self::new(|| {})
    }

    /// Signal the host that plugin data changed.
    pub fn notify(&self) {
        (self.inner)();
    }
}

impl fmt::Debug for RefreshHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshHandle").finish_non_exhaustive()
    }
}

/// Collaborators the host hands to lifecycle entry points: resolved
/// options, the context store, and the re-run trigger.
#[derive(Clone)]
pub struct HostHandle {
    /// Options resolved from file configuration, environment, and runtime
    /// parameters.
    pub options: PluginOptions,
    /// Store the plugin's context lives in, keyed by plugin identity.
    pub context: ContextStore,
    /// Re-run trigger callback.
    pub refresh: RefreshHandle,
}

/// Host lifecycle contract implemented by source plugins.
///
/// `bootstrap` runs once at startup; `transform` runs at startup and on
/// every refresh trigger; the two setup entry points are used only by the
/// offline configuration-authoring tool.
#[async_trait]
pub trait SourcePlugin: Send + Sync {
    /// Plugin identity, used to key the context store.
    fn name(&self) -> &'static str;

    /// Option metadata for the host's configuration assembly.
    fn option_specs(&self) -> Vec<OptionSpec>;

    /// Acquisition entry point: fetch remote data into the context store.
    async fn bootstrap(&self, host: &HostHandle) -> Result<(), SourceError>;

    /// Normalization entry point: merge cached data into the pipeline
    /// data. Must not mutate its inputs.
    fn transform(
        &self,
        data: &PipelineData,
        context: &PluginContext,
        options: &PluginOptions,
    ) -> PipelineData;

    /// Question-generation phase of interactive setup.
    fn setup(&self) -> SetupPlan;

    /// Answer post-processing phase of interactive setup. Pure.
    fn options_from_setup(&self, answers: &Answers) -> PersistedOptions;
}

/// The concrete source plugin, wiring the three stages to a record source
/// client.
pub struct GridSourcePlugin {
    client: Arc<dyn RecordSourceClient>,
    watch_task: Mutex<Option<JoinHandle<()>>>,
    watch_interval: Duration,
}

impl GridSourcePlugin {
    /// Create a plugin over any record source client.
    pub fn new(client: Arc<dyn RecordSourceClient>) -> Self {
        Self {
            client,
            watch_task: Mutex::new(None),
            watch_interval: Duration::from_secs(WATCH_POLL_INTERVAL_SECS),
        }
    }

    /// Create a plugin over the Airtable REST client, resolving
    /// credentials from the given options.
    #[cfg(feature = "airtable")]
    pub fn airtable(options: &PluginOptions) -> Result<Self, SourceError> {
        use crate::source::{AirtableClient, AirtableConfig};

        let config = AirtableConfig::from_options(options)?;
        Ok(Self::new(Arc::new(AirtableClient::new(config)?)))
    }

    /// Override the watch poll interval.
    pub fn with_watch_interval(mut self, interval: Duration) -> Self {
        self.watch_interval = interval;
        self
    }

    /// Abort the watch loop, if one is running.
    pub fn stop_watch(&self) {
        let mut slot = self.watch_task.lock().expect("watch task slot poisoned");
        if let Some(task) = slot.take() {
            task.abort();
        }
    }
}

impl Drop for GridSourcePlugin {
    fn drop(&mut self) {
        self.stop_watch();
    }
}

#[async_trait]
impl SourcePlugin for GridSourcePlugin {
    fn name(&self) -> &'static str {
        PLUGIN_NAME
    }

    fn option_specs(&self) -> Vec<OptionSpec> {
        PluginOptions::option_specs()
    }

    async fn bootstrap(&self, host: &HostHandle) -> Result<(), SourceError> {
        host.options.validate()?;

        if host.options.reuse_cache
            && let Some(context) = host.context.get(PLUGIN_NAME)
        {
            info!(
                records = context.record_count(),
                "loaded records from cache"
            );
            return Ok(());
        }

        let context = fetch_tables(self.client.as_ref(), &host.options).await;
        debug!(tables = ?context.tables, "initial entries");
        host.context.set(PLUGIN_NAME, context);

        if host.options.watch {
            let task = spawn_watch(
                self.client.clone(),
                host.options.clone(),
                host.context.clone(),
                PLUGIN_NAME,
                host.refresh.clone(),
                self.watch_interval,
            );
            let mut slot = self.watch_task.lock().expect("watch task slot poisoned");
            if let Some(previous) = slot.replace(task) {
                previous.abort();
            }
        }
        Ok(())
    }

    fn transform(
        &self,
        data: &PipelineData,
        context: &PluginContext,
        options: &PluginOptions,
    ) -> PipelineData {
        normalize::transform(data, context, options)
    }

    fn setup(&self) -> SetupPlan {
        setup::setup_plan()
    }

    fn options_from_setup(&self, answers: &Answers) -> PersistedOptions {
        setup::options_from_setup(answers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SourceError;
    use crate::source::{InMemoryClient, RecordPage};
    use crate::types::{PageToken, TableName};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Client that fails the test if the network is touched.
    struct UnreachableClient;

    #[async_trait]
    impl RecordSourceClient for UnreachableClient {
        async fn fetch_page(
            &self,
            _table: &TableName,
            _page: Option<&PageToken>,
        ) -> Result<RecordPage, SourceError> {
            panic!("configuration errors must fail before any fetch");
        }
    }

    fn host(options: PluginOptions) -> HostHandle {
        HostHandle {
            options,
            context: ContextStore::new(),
            refresh: RefreshHandle::noop(),
        }
    }

    #[tokio::test]
    async fn bootstrap_fails_fast_on_missing_configuration() {
        let plugin = GridSourcePlugin::new(Arc::new(UnreachableClient));
        let err = plugin
            .bootstrap(&host(PluginOptions::default()))
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::Configuration(_)));
    }

    #[tokio::test]
    async fn bootstrap_stores_the_fetched_context_under_the_plugin_name() {
        let client = InMemoryClient::new().with_table(
            "words",
            vec![
                [("Word".to_string(), crate::data::FieldValue::from("x"))]
                    .into_iter()
                    .collect(),
            ],
        );
        let plugin = GridSourcePlugin::new(Arc::new(client));
        let host = host(PluginOptions::new("appTest", ["words"]));

        plugin.bootstrap(&host).await.unwrap();

        let context = host.context.get(plugin.name()).unwrap();
        assert_eq!(context.table_count(), 1);
        assert_eq!(context.record_count(), 1);
    }

    #[tokio::test]
    async fn bootstrap_reuses_the_cache_when_asked_to() {
        let counting = CountingClient::default();
        let calls = counting.calls.clone();
        let plugin = GridSourcePlugin::new(Arc::new(counting));

        let mut options = PluginOptions::new("appTest", ["words"]);
        options.reuse_cache = true;
        let host = host(options);
        host.context.set(PLUGIN_NAME, PluginContext::default());

        plugin.bootstrap(&host).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        // Without a stored context the fetch still happens.
        host.context.clear(PLUGIN_NAME);
        plugin.bootstrap(&host).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[derive(Default)]
    struct CountingClient {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl RecordSourceClient for CountingClient {
        async fn fetch_page(
            &self,
            _table: &TableName,
            _page: Option<&PageToken>,
        ) -> Result<RecordPage, SourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(RecordPage::default())
        }
    }
}
