use std::hash::Hash;
use std::sync::Arc;

use indexmap::IndexSet;

use crate::config::PluginOptions;
use crate::constants::plugin::PLUGIN_NAME;
use crate::context::{PluginContext, TableFetch};
use crate::data::{NormalizedEntry, PipelineData, SchemaModel};
use crate::hash::stable_hash_with;
use crate::types::{EntryId, FieldName};

/// Derive schema models and normalized entries from the cached context and
/// append them to the pipeline data.
///
/// Pure function over its inputs: the returned value is a new pipeline
/// data object with prior models and objects preserved in order. One model
/// is produced per cached table and one entry per cached record, each
/// entry sharing its table's model reference.
///
/// No deduplication is performed. Calling this twice over an unchanged
/// context doubles the object count; the host invokes it once per
/// acquisition cycle.
pub fn transform(
    data: &PipelineData,
    context: &PluginContext,
    options: &PluginOptions,
) -> PipelineData {
    let mut out = data.clone();
    for (table, fetch) in &context.tables {
        let field_names = if options.all_field_names {
            union_field_names(fetch)
        } else {
            first_record_field_names(fetch)
        };
        let model = Arc::new(SchemaModel {
            source: PLUGIN_NAME.to_string(),
            model_name: table.clone(),
            model_label: table.clone(),
            project_id: options.base_id.clone(),
            field_names,
        });
        out.models.push(model.clone());

        for (row, record) in fetch.records.iter().enumerate() {
            out.objects.push(NormalizedEntry {
                fields: record.clone(),
                id: entry_id(&options.base_id, table, row),
                metadata: model.clone(),
            });
        }
    }
    out
}

/// Synthetic entry id: stable hash of base id, table name, and row
/// position, so unchanged data keeps its ids across runs.
pub(crate) fn entry_id(base_id: &str, table: &str, row: usize) -> EntryId {
    format!(
        "{:016x}",
        stable_hash_with(|hasher| {
            base_id.hash(hasher);
            table.hash(hasher);
            row.hash(hasher);
        })
    )
}

/// Field names from the table's first record, in source field order.
///
/// Records with differing field sets are not reconciled against this; see
/// [`union_field_names`] for the opt-in alternative.
fn first_record_field_names(fetch: &TableFetch) -> Vec<FieldName> {
    fetch
        .records
        .first()
        .map(|record| record.field_names())
        .unwrap_or_default()
}

/// Union of all records' field names, in first-seen order.
fn union_field_names(fetch: &TableFetch) -> Vec<FieldName> {
    let mut names: IndexSet<FieldName> = IndexSet::new();
    for record in &fetch.records {
        for (name, _) in record.iter() {
            if !names.contains(name) {
                names.insert(name.clone());
            }
        }
    }
    names.into_iter().collect()
}
