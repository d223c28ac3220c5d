//! Store configuration.
//!
//! Every field has a default, so a JSON document only needs the keys it
//! changes:
//!
//! ```
//! use simstore::StoreConfig;
//!
//! let config = StoreConfig::from_json(r#"{ "data_limiting": true }"#).unwrap();
//! assert!(config.data_limiting);
//! assert!(!config.interpolation);
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};
use crate::schema::{DefaultPrefs, ScenarioProperties};

/// Initial settings of a [`MemoryDataStore`](crate::MemoryDataStore).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Trim slices to their entity's limits after every commit.
    pub data_limiting: bool,
    /// Install a [`LinearInterpolator`](crate::LinearInterpolator) and enable interpolation.
    pub interpolation: bool,
    /// Initial scenario properties.
    pub scenario: ScenarioProperties,
    /// Preferences copied into every new entity.
    pub default_prefs: DefaultPrefs,
}

impl StoreConfig {
    /// Parses a configuration from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Config`] if the document is not valid JSON or
    /// does not match the configuration layout.
    pub fn from_json(json: &str) -> StoreResult<Self> {
        serde_json::from_str(json).map_err(|e| StoreError::config(e.to_string()))
    }

    /// Reads a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Config`] if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| StoreError::config(format!("{}: {e}", path.display())))?;
        Self::from_json(&text)
    }
}
