//! Error types for simstore.
//!
//! Lookups of unknown ids are not errors: accessors return `None`.
//! The errors here cover operations that report a status back to the
//! caller (flush, command editing, data-table rows, configuration).

use thiserror::Error;

use crate::id::{ObjectId, ObjectType};

/// Top-level error type for store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No entity has the id.
    #[error("Object not found: {id}")]
    NotFound {
        /// The unknown id.
        id: ObjectId,
    },

    /// The id names an entity of another type.
    #[error("Object {id} is a {actual:?}, expected {expected:?}")]
    WrongType {
        /// The id looked up.
        id: ObjectId,
        /// Type the operation needs.
        expected: ObjectType,
        /// Type the id belongs to.
        actual: ObjectType,
    },

    /// A preference patch does not fit the preferences it targets.
    #[error("Preference patch does not apply: {message}")]
    InvalidPatch {
        /// What went wrong.
        message: String,
    },

    /// The owner already has a table with this name.
    #[error("Data table '{name}' already exists for owner {owner}")]
    DuplicateTable {
        /// Owner of the table.
        owner: ObjectId,
        /// Table name.
        name: String,
    },

    /// The owner has no table with this name.
    #[error("Data table '{name}' not found for owner {owner}")]
    TableNotFound {
        /// Owner looked up.
        owner: ObjectId,
        /// Table name looked up.
        name: String,
    },

    /// Configuration could not be read or parsed.
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong.
        message: String,
    },
}

impl StoreError {
    /// Creates a not-found error for `id`.
    #[must_use]
    pub const fn not_found(id: ObjectId) -> Self {
        Self::NotFound { id }
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Returns true if this is a not-found error.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::TableNotFound { .. })
    }

    /// Returns true if an id resolved to an unexpected entity type.
    #[must_use]
    pub const fn is_wrong_type(&self) -> bool {
        matches!(self, Self::WrongType { .. })
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidPatch {
            message: err.to_string(),
        }
    }
}

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = StoreError::not_found(ObjectId::new(7));
        let msg = format!("{err}");
        assert!(msg.contains("not found"));
        assert!(msg.contains('7'));
        assert!(err.is_not_found());
        assert!(!err.is_wrong_type());
    }

    #[test]
    fn test_wrong_type_display() {
        let err = StoreError::WrongType {
            id: ObjectId::new(3),
            expected: ObjectType::PLATFORM,
            actual: ObjectType::BEAM,
        };
        assert!(err.is_wrong_type());
        assert!(format!("{err}").contains("expected"));
    }

    #[test]
    fn test_table_errors() {
        let err = StoreError::DuplicateTable {
            owner: ObjectId::SCENARIO,
            name: "rcs".to_string(),
        };
        assert!(format!("{err}").contains("rcs"));
        assert!(!err.is_not_found());

        let err = StoreError::TableNotFound {
            owner: ObjectId::new(1),
            name: "rcs".to_string(),
        };
        assert!(err.is_not_found());
    }

    #[test]
    fn test_from_serde_json() {
        let json_err = serde_json::from_str::<u32>("\"x\"").unwrap_err();
        let err: StoreError = json_err.into();
        assert!(matches!(err, StoreError::InvalidPatch { .. }));
    }

    #[test]
    fn test_config_error() {
        let err = StoreError::config("bad file");
        assert!(format!("{err}").contains("bad file"));
    }
}
