//! Transactional mutation of the store.
//!
//! Every mutation goes through a guard that borrows the store mutably:
//!
//! - [`NewEntryTransaction`]: a freshly allocated entity, visible only after `commit()`.
//! - [`PropertiesTransaction`], [`PrefsTransaction`], [`CommonPrefsTransaction`]
//!   and [`ScenarioPropertiesTransaction`]: a scratch copy of live settings.
//! - [`NewUpdateTransaction`]: one new sample, command, or generic/category datum.
//!
//! The guard dereferences to the value being edited. `commit()` consumes the
//! guard and applies the change; observers are notified when the guard is
//! dropped, after the store is consistent again. Dropping a guard without
//! committing leaves the store untouched.
//!
//! ```
//! use simstore::{MemoryDataStore, Platform};
//!
//! let mut store = MemoryDataStore::new();
//! let mut txn = store.add_entity::<Platform>();
//! txn.original_id = 1001;
//! let id = txn.commit();
//!
//! let mut prefs = store.mutable_prefs::<Platform>(id).unwrap();
//! prefs.common.name = "ownship".to_string();
//! prefs.commit();
//!
//! assert_eq!(store.id_list_by_name("ownship", simstore::ObjectType::ALL), vec![id]);
//! ```

mod entry;
mod settings;
mod update;

pub use entry::NewEntryTransaction;
pub use settings::{
    CommonPrefsTransaction, PrefsTransaction, PropertiesTransaction, ScenarioPropertiesTransaction,
};
pub use update::NewUpdateTransaction;

use crate::schema::{CommonPrefs, Preferences, Settings};

/// Copies `scratch` over `live` if they serialize differently.
///
/// Returns true if `live` was replaced.
pub fn commit_settings<S: Settings>(live: &mut S, scratch: &S) -> bool {
    if live.serialized_eq(scratch) {
        return false;
    }
    live.clone_from(scratch);
    true
}

/// Returns true if the displayed name differs between `old` and `new`.
///
/// The name counts when it differs; the alias counts only while aliasing is
/// on; toggling aliasing always counts.
#[must_use]
pub fn detect_name_change(old: &CommonPrefs, new: &CommonPrefs) -> bool {
    old.name != new.name
        || (new.use_alias && old.alias != new.alias)
        || old.use_alias != new.use_alias
}

/// Outcome of a preferences commit, applied by the store on release.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrefsEffects {
    /// Live preferences were replaced.
    pub changed: bool,
    /// The displayed name changed.
    pub name_changed: bool,
    /// `name` before the commit.
    pub old_name: String,
    /// `name` after the commit.
    pub new_name: String,
}

/// Commits `scratch` over `live` and describes what changed.
pub fn commit_preferences<P: Preferences>(live: &mut P, scratch: &P) -> PrefsEffects {
    let old = live.common().clone();
    if !commit_settings(live, scratch) {
        return PrefsEffects::default();
    }
    let new = live.common();
    PrefsEffects {
        changed: true,
        name_changed: detect_name_change(&old, new),
        old_name: old.name,
        new_name: new.name.clone(),
    }
}
