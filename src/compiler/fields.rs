use serde_json::{Map, Value};

/// Keys starting with this marker are builder bookkeeping and never reach the document.
pub const INTERNAL_PREFIX: char = '_';

pub fn is_internal(key: &str) -> bool {
    key.starts_with(INTERNAL_PREFIX)
}

/// Keeps the fields that belong in the output: internal keys are dropped
/// whatever their value, and absent values are omitted rather than written as `null`.
pub fn filter_fields<I, K>(fields: I) -> Map<String, Value>
where
    I: IntoIterator<Item = (K, Option<Value>)>,
    K: Into<String>,
{
    fields
        .into_iter()
        .filter_map(|(key, value)| {
            let key = key.into();
            if is_internal(&key) {
                return None;
            }
            value.map(|value| (key, value))
        })
        .collect()
}
