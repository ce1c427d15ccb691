use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use indexmap::IndexMap;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::config::PluginOptions;
use crate::context::{ContextStore, PluginContext, TableFetch};
use crate::plugin::RefreshHandle;
use crate::source::RecordSourceClient;
use crate::types::{PageToken, TableName};

/// Fetch every configured table into a fresh plugin context.
///
/// Tables are fetched one at a time in configuration order; within a
/// table, pages are requested until the source reports exhaustion. A page
/// failure stops that table's pagination, flags the table as partial, and
/// the run continues with the next table.
pub async fn fetch_tables(
    client: &dyn RecordSourceClient,
    options: &PluginOptions,
) -> PluginContext {
    let mut tables = IndexMap::with_capacity(options.tables.len());
    for table in &options.tables {
        tables.insert(table.clone(), fetch_table(client, table).await);
    }

    let context = PluginContext {
        tables,
        fetched_at: Some(Utc::now()),
    };
    info!(
        tables = context.table_count(),
        records = context.record_count(),
        "generated tables"
    );
    context
}

async fn fetch_table(client: &dyn RecordSourceClient, table: &TableName) -> TableFetch {
    let mut records = Vec::new();
    let mut page_token: Option<PageToken> = None;
    loop {
        match client.fetch_page(table, page_token.as_ref()).await {
            Ok(page) => {
                for record in &page.records {
                    debug!(table = %table, fields = ?record, "retrieved record");
                }
                records.extend(page.records);
                match page.next {
                    Some(token) => page_token = Some(token),
                    None => return TableFetch::complete(records),
                }
            }
            Err(err) => {
                warn!(
                    table = %table,
                    error = %err,
                    "page fetch failed, keeping records received so far"
                );
                return TableFetch::partial(records, err.to_string());
            }
        }
    }
}

/// Spawn the watch loop: refetch on an interval and publish a refreshed
/// context plus a host refresh signal whenever the table data changed.
///
/// The returned handle can be aborted to stop watching; the loop itself
/// never exits on its own.
pub fn spawn_watch(
    client: Arc<dyn RecordSourceClient>,
    options: PluginOptions,
    store: ContextStore,
    plugin: &'static str,
    refresh: RefreshHandle,
    poll_interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick fires immediately; skip it so the loop starts
        // one full interval after bootstrap.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let fresh = fetch_tables(client.as_ref(), &options).await;
            let changed = match store.get(plugin) {
                Some(current) => !current.same_tables(&fresh),
                None => true,
            };
            if changed {
                info!(plugin, "remote data changed, triggering refresh");
                store.set(plugin, fresh);
                refresh.notify();
            }
        }
    })
}
