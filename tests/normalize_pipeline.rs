use gridsource::{
    FieldValue, PipelineData, PluginContext, PluginOptions, Record, TableFetch, transform,
};
use serde_json::json;

fn record(pairs: &[(&str, &str)]) -> Record {
    pairs
        .iter()
        .map(|(name, value)| (name.to_string(), FieldValue::from(*value)))
        .collect()
}

fn context_with(tables: &[(&str, Vec<Record>)]) -> PluginContext {
    let mut context = PluginContext::default();
    for (table, records) in tables {
        context
            .tables
            .insert(table.to_string(), TableFetch::complete(records.clone()));
    }
    context
}

fn poems_and_words() -> PluginContext {
    context_with(&[
        ("poems", vec![record(&[("Start", "a"), ("Finish", "b")])]),
        ("words", vec![record(&[("Word", "x")])]),
    ])
}

#[test]
fn one_model_per_table_and_one_object_per_record() {
    let context = context_with(&[
        ("poems", vec![record(&[("Start", "a")]), record(&[("Start", "b")])]),
        ("words", vec![record(&[("Word", "x")])]),
        ("empty", Vec::new()),
    ]);
    let options = PluginOptions::new("appTest", ["poems", "words", "empty"]);

    let data = transform(&PipelineData::default(), &context, &options);
    assert_eq!(data.models.len(), 3);
    assert_eq!(data.objects.len(), 3);
}

#[test]
fn the_poems_and_words_scenario_produces_the_documented_shape() {
    let context = poems_and_words();
    let options = PluginOptions::new("appL6vJByD0dxVlnA", ["poems", "words"]);

    let data = transform(&PipelineData::default(), &context, &options);

    let poems = &data.models[0];
    assert_eq!(poems.source, "gridsource");
    assert_eq!(poems.model_name, "poems");
    assert_eq!(poems.model_label, "poems");
    assert_eq!(poems.project_id, "appL6vJByD0dxVlnA");
    assert_eq!(poems.field_names, vec!["Start", "Finish"]);

    let words = &data.models[1];
    assert_eq!(words.model_name, "words");
    assert_eq!(words.field_names, vec!["Word"]);

    assert_eq!(data.objects.len(), 2);
    let first = &data.objects[0];
    assert_eq!(first.fields.get("Start"), Some(&FieldValue::from("a")));
    assert_eq!(first.fields.get("Finish"), Some(&FieldValue::from("b")));
    assert_eq!(first.metadata.model_name, "poems");
    let second = &data.objects[1];
    assert_eq!(second.fields.get("Word"), Some(&FieldValue::from("x")));
    assert_eq!(second.metadata.model_name, "words");
    assert_ne!(first.id, second.id);

    // Serialized entries flatten fields next to the id and metadata tag.
    let value = serde_json::to_value(first).unwrap();
    assert_eq!(value["Start"], json!("a"));
    assert_eq!(value["Finish"], json!("b"));
    assert_eq!(value["__metadata"]["modelName"], json!("poems"));
    assert!(value["id"].is_string());
}

#[test]
fn every_entry_points_at_its_own_tables_model() {
    let context = context_with(&[
        ("poems", vec![record(&[("Start", "a")]), record(&[("Start", "b")])]),
        ("words", vec![record(&[("Word", "x")])]),
    ]);
    let options = PluginOptions::new("appTest", ["poems", "words"]);

    let data = transform(&PipelineData::default(), &context, &options);
    for entry in &data.objects {
        let has_fields: Vec<_> = entry.fields.field_names();
        if has_fields.contains(&"Word".to_string()) {
            assert_eq!(entry.metadata.model_name, "words");
        } else {
            assert_eq!(entry.metadata.model_name, "poems");
        }
    }
}

#[test]
fn empty_tables_get_a_model_with_no_field_names_and_no_entries() {
    let context = context_with(&[("empty", Vec::new())]);
    let options = PluginOptions::new("appTest", ["empty"]);

    let data = transform(&PipelineData::default(), &context, &options);
    assert_eq!(data.models.len(), 1);
    assert!(data.models[0].field_names.is_empty());
    assert!(data.objects.is_empty());
}

#[test]
fn transforming_twice_doubles_the_object_count() {
    let context = poems_and_words();
    let options = PluginOptions::new("appTest", ["poems", "words"]);

    let once = transform(&PipelineData::default(), &context, &options);
    let twice = transform(&once, &context, &options);

    assert_eq!(once.objects.len(), 2);
    assert_eq!(twice.objects.len(), 4);
    assert_eq!(twice.models.len(), 4);
}

#[test]
fn prior_pipeline_entries_are_preserved_in_order() {
    let context = poems_and_words();
    let options = PluginOptions::new("appTest", ["poems", "words"]);

    let upstream = transform(&PipelineData::default(), &context, &options);
    let upstream_ids: Vec<_> = upstream.objects.iter().map(|o| o.id.clone()).collect();
    let upstream_models = upstream.models.len();

    let merged = transform(&upstream, &context, &options);

    // Input untouched, prior entries lead the merged collections.
    assert_eq!(upstream.objects.len(), 2);
    let merged_ids: Vec<_> = merged.objects.iter().map(|o| o.id.clone()).collect();
    assert_eq!(&merged_ids[..2], upstream_ids.as_slice());
    assert_eq!(merged.models[..upstream_models], upstream.models[..]);
}

#[test]
fn foreign_buckets_survive_the_merge() {
    let context = poems_and_words();
    let options = PluginOptions::new("appTest", ["poems", "words"]);

    let mut upstream = PipelineData::default();
    upstream
        .rest
        .insert("files".to_string(), json!([{"path": "data.json"}]));

    let merged = transform(&upstream, &context, &options);
    assert_eq!(merged.rest["files"][0]["path"], json!("data.json"));
}

#[test]
fn partial_tables_still_normalize_their_cached_records() {
    let mut context = PluginContext::default();
    context.tables.insert(
        "poems".to_string(),
        TableFetch::partial(vec![record(&[("Start", "a")])], "remote hiccup"),
    );
    let options = PluginOptions::new("appTest", ["poems"]);

    let data = transform(&PipelineData::default(), &context, &options);
    assert_eq!(data.models.len(), 1);
    assert_eq!(data.objects.len(), 1);
}
