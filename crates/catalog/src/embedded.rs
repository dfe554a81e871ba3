//! Decoder for embedded list cells such as `genres` and `production_countries`.
//!
//! The dataset stores these columns as Python literals rather than JSON:
//!
//! ```text
//! [{'id': 35, 'name': 'Comedy'}, {'id': 18, 'name': 'Drama'}]
//! [{'iso_3166_1': 'CI', 'name': "Cote D'Ivoire"}]
//! ```
//!
//! Single quotes delimit structure, and a name containing an apostrophe is
//! wrapped in double quotes instead. Decoding is two steps:
//! 1. [`normalize_quotes`] rewrites the cell into valid JSON
//! 2. `serde_json` parses the result and the id/name pairs are extracted

use crate::error::FieldError;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fmt::Display;

/// Names of the id and name keys inside each embedded object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryKeys {
    pub id: &'static str,
    pub name: &'static str,
}

impl EntryKeys {
    pub const fn new(id: &'static str, name: &'static str) -> Self {
        Self { id, name }
    }
}

impl Default for EntryKeys {
    fn default() -> Self {
        GENRE_KEYS
    }
}

/// Keys used by the `genres` column
pub const GENRE_KEYS: EntryKeys = EntryKeys::new("id", "name");

/// Keys used by the `production_countries` column
pub const COUNTRY_KEYS: EntryKeys = EntryKeys::new("iso_3166_1", "name");

// =============================================================================
// Quote normalization
// =============================================================================

/// Rewrite a Python-literal cell into JSON.
///
/// Rules, applied in a single left-to-right scan:
/// - A `"` opens a *text span* that runs to the next `"` on the same line.
///   The span is copied verbatim, so every `'` inside it stays a literal
///   apostrophe.
/// - A `"` with no partner on its line is emitted unchanged.
/// - Every other `'` is structural and becomes `"`.
/// - Everything else is copied as is.
///
/// ```
/// use catalog::embedded::normalize_quotes;
///
/// assert_eq!(
///     normalize_quotes(r#"[{'name': "Cote D'Ivoire"}]"#),
///     r#"[{"name": "Cote D'Ivoire"}]"#,
/// );
/// ```
pub fn normalize_quotes(raw: &str) -> String {
    let chars: Vec<char> = raw.chars().collect();
    let mut out = String::with_capacity(raw.len());
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '"' => {
                if let Some(close) = find_text_span(&chars, i) {
                    out.push('"');
                    out.extend(&chars[i + 1..close]);
                    out.push('"');
                    i = close + 1;
                    continue;
                }
                out.push('"');
            }
            '\'' => out.push('"'),
            c => out.push(c),
        }
        i += 1;
    }

    out
}

/// Index of the `"` closing a text span opened at `open`, if there is one.
fn find_text_span(chars: &[char], open: usize) -> Option<usize> {
    chars[open + 1..]
        .iter()
        .take_while(|&&c| c != '\n')
        .position(|&c| c == '"')
        .map(|close| open + 1 + close)
}

// =============================================================================
// Typed extraction
// =============================================================================

/// A type an embedded id or name can be converted into.
///
/// Only JSON integers and strings are accepted; anything else is reported
/// as [`FieldError::UnsupportedType`].
pub trait EmbeddedValue: Sized {
    /// Human readable name of the accepted JSON type, used in errors
    const EXPECTED: &'static str;

    fn from_json(value: &Value) -> Result<Self, FieldError>;
}

impl EmbeddedValue for u32 {
    const EXPECTED: &'static str = "unsigned 32-bit integer";

    fn from_json(value: &Value) -> Result<Self, FieldError> {
        value
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| unsupported::<Self>(value))
    }
}

impl EmbeddedValue for i64 {
    const EXPECTED: &'static str = "integer";

    fn from_json(value: &Value) -> Result<Self, FieldError> {
        value.as_i64().ok_or_else(|| unsupported::<Self>(value))
    }
}

impl EmbeddedValue for String {
    const EXPECTED: &'static str = "string";

    fn from_json(value: &Value) -> Result<Self, FieldError> {
        value
            .as_str()
            .map(str::to_owned)
            .ok_or_else(|| unsupported::<Self>(value))
    }
}

fn unsupported<T: EmbeddedValue>(value: &Value) -> FieldError {
    let found = match value {
        Value::Null => "null".to_string(),
        Value::Bool(_) => "boolean".to_string(),
        Value::Number(n) => format!("number {n}"),
        Value::String(_) => "string".to_string(),
        Value::Array(_) => "array".to_string(),
        Value::Object(_) => "object".to_string(),
    };
    FieldError::UnsupportedType {
        expected: T::EXPECTED,
        found,
    }
}

// =============================================================================
// Public decoders
// =============================================================================

/// Decode an embedded list cell into `(id, name)` pairs, in cell order.
///
/// Returns `Ok(None)` for a blank cell, which callers distinguish from an
/// empty list (`[]`).
pub fn decode_embedded_list<K, V>(
    raw: &str,
    keys: EntryKeys,
) -> Result<Option<Vec<(K, V)>>, FieldError>
where
    K: EmbeddedValue,
    V: EmbeddedValue,
{
    if raw.trim().is_empty() {
        return Ok(None);
    }

    let normalized = normalize_quotes(raw);
    let entries: Vec<Map<String, Value>> =
        serde_json::from_str(&normalized).map_err(|e| FieldError::DecodeError {
            reason: e.to_string(),
        })?;

    let mut pairs = Vec::with_capacity(entries.len());
    for entry in &entries {
        let id = lookup(entry, keys.id)?;
        let name = lookup(entry, keys.name)?;
        pairs.push((K::from_json(id)?, V::from_json(name)?));
    }

    Ok(Some(pairs))
}

fn lookup<'a>(entry: &'a Map<String, Value>, key: &str) -> Result<&'a Value, FieldError> {
    entry.get(key).ok_or_else(|| FieldError::MissingKey {
        key: key.to_string(),
    })
}

/// Decode a required embedded list cell into an id → name map.
///
/// A blank cell is [`FieldError::MissingValue`]; an id listed twice is
/// [`FieldError::DuplicateKey`].
pub fn decode_embedded_map<K, V>(raw: &str, keys: EntryKeys) -> Result<BTreeMap<K, V>, FieldError>
where
    K: EmbeddedValue + Ord + Display,
    V: EmbeddedValue,
{
    let pairs = decode_embedded_list::<K, V>(raw, keys)?.ok_or(FieldError::MissingValue)?;

    let mut map = BTreeMap::new();
    for (id, name) in pairs {
        match map.entry(id) {
            Entry::Vacant(slot) => {
                slot.insert(name);
            }
            Entry::Occupied(slot) => {
                return Err(FieldError::DuplicateKey {
                    key: slot.key().to_string(),
                });
            }
        }
    }

    Ok(map)
}

/// Lenient variant: normalize and parse the cell as JSON, or give up quietly.
///
/// Used for `runtime`, the one column where bad input is not an error.
pub fn decode_lenient<T: DeserializeOwned>(raw: &str) -> Option<T> {
    if raw.trim().is_empty() {
        return None;
    }
    serde_json::from_str(&normalize_quotes(raw)).ok()
}
