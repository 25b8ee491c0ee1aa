//! Flattened views of label records for display and field selection.
//!
//! A record flattens to `dotted.key -> text` pairs in document order: nested
//! objects extend the key, arrays are joined with `", "`, nulls are skipped.
//!
//! A selected field matches a flattened key when it equals the key, equals
//! the key with dots replaced by underscores, or is a dotted prefix of it.
//! So `openfda` selects every `openfda.*` key and `openfda_brand_name`
//! selects `openfda.brand_name`.

use indexmap::IndexMap;
use serde_json::Value;

use crate::label::LabelRecord;
use crate::query::QueryBatch;

/// Flattens a record into dotted keys. Non-object records flatten to nothing.
#[must_use]
pub fn flatten_record(record: &LabelRecord) -> IndexMap<String, String> {
    let mut out = IndexMap::new();
    if let Value::Object(map) = record.as_value() {
        for (key, value) in map {
            flatten_into(&mut out, key.clone(), value);
        }
    }
    out
}

fn flatten_into(out: &mut IndexMap<String, String>, key: String, value: &Value) {
    match value {
        Value::Null => {}
        Value::Array(items) => {
            let joined = items.iter().map(scalar_text).collect::<Vec<_>>().join(", ");
            out.insert(key, joined);
        }
        Value::Object(map) => {
            for (child, nested) in map {
                flatten_into(out, format!("{key}.{child}"), nested);
            }
        }
        scalar => {
            out.insert(key, scalar_text(scalar));
        }
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn field_matches_key(key: &str, field: &str) -> bool {
    key == field
        || key.replace('.', "_") == field
        || key
            .strip_prefix(field)
            .is_some_and(|rest| rest.starts_with('.'))
}

/// Every flattened key of the record, in document order.
#[must_use]
pub fn available_field_keys(record: &LabelRecord) -> Vec<String> {
    flatten_record(record).into_keys().collect()
}

/// Flattened pairs restricted to `fields`; all pairs when `fields` is empty.
#[must_use]
pub fn select_fields<S: AsRef<str>>(
    record: &LabelRecord,
    fields: &[S],
) -> IndexMap<String, String> {
    let flat = flatten_record(record);
    if fields.is_empty() {
        return flat;
    }
    flat.into_iter()
        .filter(|(key, _)| {
            fields
                .iter()
                .any(|field| field_matches_key(key, field.as_ref()))
        })
        .collect()
}

/// Selected fields that match none of `available_keys`, in selection order.
#[must_use]
pub fn missing_selected_fields<K, S>(available_keys: &[K], fields: &[S]) -> Vec<String>
where
    K: AsRef<str>,
    S: AsRef<str>,
{
    fields
        .iter()
        .map(AsRef::as_ref)
        .filter(|field| {
            !available_keys
                .iter()
                .any(|key| field_matches_key(key.as_ref(), field))
        })
        .map(str::to_string)
        .collect()
}

/// Per field, how many successful names have a non-empty value for it.
#[must_use]
pub fn field_counts<S: AsRef<str>>(batch: &QueryBatch, fields: &[S]) -> IndexMap<String, usize> {
    let mut counts: IndexMap<String, usize> = fields
        .iter()
        .map(|field| (field.as_ref().to_string(), 0))
        .collect();

    for (_, found) in batch.successes() {
        let flat = flatten_record(&found.record);
        for (field, count) in &mut counts {
            if flat
                .iter()
                .any(|(key, value)| !value.is_empty() && field_matches_key(key, field))
            {
                *count += 1;
            }
        }
    }
    counts
}
