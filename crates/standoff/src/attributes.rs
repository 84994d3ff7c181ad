use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::LazyLock;

use crate::error::LineError;

/// These attributes may hold any number of ids (>= 0).
pub const MULTI_VALUED: &[&str] = &[
    "nested-source",
    "attitude-link",
    "insubstantial",
    "target-speech-link",
    "target-link",
    "eTarget-link",
    "newETarget-link",
    "sTarget-link",
    "targetFrame-link",
];

// key="quoted value" or key=bare
static PAIR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([^\s="]+)\s*=\s*(?:"([^"]*)"|([^\s"]*))"#).expect("attribute pattern compiles")
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Scalar(String),
    List(Vec<String>),
}

impl AttrValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Scalar(s) => Some(s),
            AttrValue::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            AttrValue::List(ids) => Some(ids),
            AttrValue::Scalar(_) => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attributes(BTreeMap<String, AttrValue>);

impl Attributes {
    pub fn get(&self, key: &str) -> Option<&AttrValue> {
        self.0.get(key)
    }

    pub fn str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(AttrValue::as_str)
    }

    /// Ids of a multi-valued attribute; absent means no ids.
    pub fn ids(&self, key: &str) -> &[String] {
        self.get(key).and_then(AttrValue::as_list).unwrap_or(&[])
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: AttrValue) {
        self.0.insert(key.into(), value);
    }

    pub fn remove(&mut self, key: &str) -> Option<AttrValue> {
        self.0.remove(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &AttrValue)> {
        self.0.iter()
    }
}

/// Parse an attribute string such as `id="w" nested-source="w,src-1"`.
///
/// Pairs are separated by whitespace outside quotes, so quoted values may
/// contain spaces. Keys in [`MULTI_VALUED`] become id lists.
pub fn parse_attributes(raw: &str) -> Result<Attributes, LineError> {
    let raw = raw.trim();
    let mut attributes = Attributes::default();
    let mut cursor = 0;

    for caps in PAIR.captures_iter(raw) {
        let Some(whole) = caps.get(0) else { continue };
        let gap = &raw[cursor..whole.start()];
        if !gap.trim().is_empty() {
            return Err(LineError::BadAttribute(gap.trim().to_string()));
        }
        cursor = whole.end();

        let key = caps[1].to_string();
        // Quoted values are kept verbatim.
        let value = match (caps.get(2), caps.get(3)) {
            (Some(quoted), _) => quoted.as_str(),
            (None, Some(bare)) => bare.as_str().trim(),
            (None, None) => "",
        };

        let value = if MULTI_VALUED.contains(&key.as_str()) {
            AttrValue::List(parse_id_list(value))
        } else {
            AttrValue::Scalar(value.to_string())
        };
        attributes.insert(key, value);
    }

    let rest = &raw[cursor..];
    if !rest.trim().is_empty() {
        return Err(LineError::BadAttribute(rest.trim().to_string()));
    }

    Ok(attributes)
}

// `none` marks an empty list, alone or as a stray list element.
fn parse_id_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty() && *id != "none")
        .map(str::to_string)
        .collect()
}

/// Serialize attributes back to `key="value"` pairs.
pub fn format_attributes(attributes: &Attributes) -> String {
    attributes
        .iter()
        .map(|(key, value)| match value {
            AttrValue::Scalar(s) => format!("{}=\"{}\"", key, s),
            AttrValue::List(ids) if ids.is_empty() => format!("{}=\"none\"", key),
            AttrValue::List(ids) => format!("{}=\"{}\"", key, ids.join(",")),
        })
        .collect::<Vec<_>>()
        .join(" ")
}
