//! Name index over entities.

use std::collections::{BTreeMap, HashMap};

use crate::id::{ObjectId, ObjectType};

/// Maps entity names (the `name` preference, not the alias) to ids.
#[derive(Debug, Default)]
pub struct EntityNameCache {
    by_name: HashMap<String, BTreeMap<ObjectId, ObjectType>>,
}

impl EntityNameCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Indexes `id` under `name`.
    pub fn add_entity(&mut self, name: &str, id: ObjectId, kind: ObjectType) {
        self.by_name.entry(name.to_string()).or_default().insert(id, kind);
    }

    /// Removes `id` from under `name`.
    pub fn remove_entity(&mut self, name: &str, id: ObjectId) {
        if let Some(ids) = self.by_name.get_mut(name) {
            ids.remove(&id);
            if ids.is_empty() {
                self.by_name.remove(name);
            }
        }
    }

    /// Moves `id` from `old_name` to `new_name`, keeping its type.
    pub fn name_change(&mut self, new_name: &str, old_name: &str, id: ObjectId) {
        let kind = self
            .by_name
            .get(old_name)
            .and_then(|ids| ids.get(&id).copied());
        let Some(kind) = kind else {
            return;
        };
        self.remove_entity(old_name, id);
        self.add_entity(new_name, id, kind);
    }

    /// Ids named `name` whose type is in `mask`, in ascending id order.
    #[must_use]
    pub fn entries(&self, name: &str, mask: ObjectType) -> Vec<ObjectId> {
        self.by_name.get(name).map_or_else(Vec::new, |ids| {
            ids.iter()
                .filter(|(_, kind)| mask.intersects(**kind))
                .map(|(id, _)| *id)
                .collect()
        })
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.by_name.clear();
    }

    /// Number of distinct names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    /// Returns true if no names are indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_filter_by_type() {
        let mut cache = EntityNameCache::new();
        cache.add_entity("alpha", ObjectId::new(2), ObjectType::BEAM);
        cache.add_entity("alpha", ObjectId::new(1), ObjectType::PLATFORM);

        assert_eq!(
            cache.entries("alpha", ObjectType::ALL),
            vec![ObjectId::new(1), ObjectId::new(2)]
        );
        assert_eq!(cache.entries("alpha", ObjectType::BEAM), vec![ObjectId::new(2)]);
        assert!(cache.entries("beta", ObjectType::ALL).is_empty());
    }

    #[test]
    fn test_name_change_moves_entry() {
        let mut cache = EntityNameCache::new();
        cache.add_entity("", ObjectId::new(1), ObjectType::PLATFORM);
        cache.name_change("ship", "", ObjectId::new(1));

        assert!(cache.entries("", ObjectType::ALL).is_empty());
        assert_eq!(cache.entries("ship", ObjectType::PLATFORM), vec![ObjectId::new(1)]);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_remove_entity() {
        let mut cache = EntityNameCache::new();
        cache.add_entity("ship", ObjectId::new(1), ObjectType::PLATFORM);
        cache.remove_entity("ship", ObjectId::new(1));
        assert!(cache.is_empty());
        // unknown removals are ignored
        cache.remove_entity("ship", ObjectId::new(1));
    }
}
