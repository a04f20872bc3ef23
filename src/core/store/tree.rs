//! Nested string-valued locale trees (`<outputRoot>/<code>.json`).
//!
//! Dot-separated keys map 1:1 to nested object paths. After loading, every
//! leaf is a string: `null` becomes `""`, numbers and booleans are stringified
//! and arrays become objects keyed by index.

use std::{fs, path::Path};

use anyhow::{Context, Result, bail};
use serde_json::{Map, Value};

/// A key path runs through an existing string leaf, or ends on an object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathConflict {
    pub key: String,
    /// The part of `key` that is already occupied.
    pub at: String,
}

impl std::fmt::Display for PathConflict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.key == self.at {
            write!(f, "'{}' already holds nested keys", self.key)
        } else {
            write!(f, "'{}' is a string, cannot nest '{}' under it", self.at, self.key)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocaleTree {
    root: Map<String, Value>,
}

impl LocaleTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tree from parsed JSON, normalizing every leaf to a string.
    pub fn from_value(value: Value) -> Result<Self> {
        let Value::Object(map) = value else {
            bail!("Root of a locale file must be an object");
        };
        let root = map.into_iter().map(|(k, v)| (k, normalize(v))).collect();
        Ok(Self { root })
    }

    /// Load a locale file, or an empty tree when it does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;
        if content.trim().is_empty() {
            return Ok(Self::new());
        }
        let value: Value = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse JSON: {}", path.display()))?;
        Self::from_value(value).with_context(|| format!("Invalid locale file: {}", path.display()))
    }

    /// Pretty-print with 2-space indentation and a trailing newline.
    pub fn to_pretty_string(&self) -> Result<String> {
        let content = serde_json::to_string_pretty(&self.root).context("Failed to serialize JSON")?;
        Ok(format!("{}\n", content))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        fs::write(path, self.to_pretty_string()?)
            .with_context(|| format!("Failed to write file: {}", path.display()))?;
        tracing::debug!(path = %path.display(), keys = self.len(), "wrote locale file");
        Ok(())
    }

    /// All `(key, value)` leaves in document order.
    pub fn flatten(&self) -> Vec<(String, String)> {
        let mut out = Vec::new();
        flatten_into(&self.root, "", &mut out);
        out
    }

    pub fn keys(&self) -> Vec<String> {
        self.flatten().into_iter().map(|(k, _)| k).collect()
    }

    pub fn len(&self) -> usize {
        self.flatten().len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        let mut current = &self.root;
        let mut parts = key.split('.').peekable();
        while let Some(part) = parts.next() {
            let value = current.get(part)?;
            if parts.peek().is_none() {
                return value.as_str();
            }
            current = value.as_object()?;
        }
        None
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Set a leaf, creating intermediate objects.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), PathConflict> {
        let parts: Vec<&str> = key.split('.').collect();
        let (last, parents) = parts.split_last().ok_or_else(|| PathConflict {
            key: key.to_string(),
            at: key.to_string(),
        })?;

        let mut current = &mut self.root;
        for (depth, part) in parents.iter().enumerate() {
            let entry = current
                .entry(part.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            current = match entry {
                Value::Object(map) => map,
                _ => {
                    return Err(PathConflict {
                        key: key.to_string(),
                        at: parts[..=depth].join("."),
                    });
                }
            };
        }
        if matches!(current.get(*last), Some(Value::Object(_))) {
            return Err(PathConflict {
                key: key.to_string(),
                at: key.to_string(),
            });
        }
        current.insert(last.to_string(), Value::String(value.to_string()));
        Ok(())
    }

    /// Remove a leaf and every parent object left empty by the removal.
    ///
    /// Returns true if the key existed.
    pub fn remove(&mut self, key: &str) -> bool {
        let parts: Vec<&str> = key.split('.').collect();
        remove_path(&mut self.root, &parts)
    }
}

fn normalize(value: Value) -> Value {
    match value {
        Value::Null => Value::String(String::new()),
        Value::Bool(b) => Value::String(b.to_string()),
        Value::Number(n) => Value::String(n.to_string()),
        Value::String(s) => Value::String(s),
        Value::Array(items) => Value::Object(
            items
                .into_iter()
                .enumerate()
                .map(|(i, v)| (i.to_string(), normalize(v)))
                .collect(),
        ),
        Value::Object(map) => {
            Value::Object(map.into_iter().map(|(k, v)| (k, normalize(v))).collect())
        }
    }
}

fn flatten_into(map: &Map<String, Value>, prefix: &str, out: &mut Vec<(String, String)>) {
    for (key, value) in map {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };
        match value {
            Value::Object(child) => flatten_into(child, &path, out),
            Value::String(s) => out.push((path, s.clone())),
            other => out.push((path, other.to_string())),
        }
    }
}

fn remove_path(map: &mut Map<String, Value>, parts: &[&str]) -> bool {
    let Some((first, rest)) = parts.split_first() else {
        return false;
    };
    if rest.is_empty() {
        return match map.get(*first) {
            Some(Value::Object(_)) | None => false,
            Some(_) => map.shift_remove(*first).is_some(),
        };
    }

    let removed = match map.get_mut(*first) {
        Some(Value::Object(child)) => remove_path(child, rest),
        _ => false,
    };
    if removed && matches!(map.get(*first), Some(Value::Object(child)) if child.is_empty()) {
        map.shift_remove(*first);
    }
    removed
}
