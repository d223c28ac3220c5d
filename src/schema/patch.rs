use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::StoreResult;

/// A JSON merge patch over a preferences object.
///
/// Object members merge recursively, other values replace, and `null`
/// removes a member (so the field falls back to its default).
///
/// # Examples
///
/// ```
/// use simstore::schema::{PlatformPrefs, PrefsPatch};
///
/// let mut patch = PrefsPatch::new();
/// patch.set("common.data_draw", false);
///
/// let mut prefs = PlatformPrefs::default();
/// patch.apply_to(&mut prefs).unwrap();
/// assert!(!prefs.common.data_draw);
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrefsPatch(Map<String, Value>);

impl PrefsPatch {
    /// Creates an empty patch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sets the member at a dotted path such as `"common.name"`.
    pub fn set(&mut self, path: &str, value: impl Into<Value>) -> &mut Self {
        let segments: Vec<&str> = path.split('.').collect();
        set_path(&mut self.0, &segments, value.into());
        self
    }

    /// Builder form of [`PrefsPatch::set`].
    #[must_use]
    pub fn with(mut self, path: &str, value: impl Into<Value>) -> Self {
        self.set(path, value);
        self
    }

    /// Folds `other` into this patch; members of `other` win.
    pub fn merge(&mut self, other: &Self) {
        merge_maps(&mut self.0, &other.0, false);
    }

    /// Applies the patch to a preferences value.
    ///
    /// # Errors
    ///
    /// Returns [`crate::StoreError::InvalidPatch`] if the patched value no
    /// longer deserializes into `P`. `prefs` is left unchanged in that case.
    pub fn apply_to<P>(&self, prefs: &mut P) -> StoreResult<()>
    where
        P: Serialize + DeserializeOwned,
    {
        if self.is_empty() {
            return Ok(());
        }
        let mut value = serde_json::to_value(&*prefs)?;
        if let Value::Object(target) = &mut value {
            merge_maps(target, &self.0, true);
        }
        *prefs = serde_json::from_value(value)?;
        Ok(())
    }
}

fn set_path(node: &mut Map<String, Value>, segments: &[&str], value: Value) {
    match segments {
        [] => {}
        [last] => {
            node.insert((*last).to_string(), value);
        }
        [head, rest @ ..] => {
            let child = node
                .entry((*head).to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !child.is_object() {
                *child = Value::Object(Map::new());
            }
            if let Value::Object(map) = child {
                set_path(map, rest, value);
            }
        }
    }
}

/// Recursive merge. With `drop_nulls`, `null` members delete the target member.
fn merge_maps(target: &mut Map<String, Value>, patch: &Map<String, Value>, drop_nulls: bool) {
    for (key, value) in patch {
        match value {
            Value::Null if drop_nulls => {
                target.remove(key);
            }
            Value::Object(child) => {
                let slot = target
                    .entry(key.clone())
                    .or_insert_with(|| Value::Object(Map::new()));
                if let Value::Object(existing) = slot {
                    merge_maps(existing, child, drop_nulls);
                } else {
                    *slot = value.clone();
                }
            }
            _ => {
                target.insert(key.clone(), value.clone());
            }
        }
    }
}
