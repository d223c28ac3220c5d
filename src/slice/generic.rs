use std::collections::BTreeMap;

use crate::schema::{DataLimits, GenericData};
use crate::time::FlushRange;

use super::upper_bound;

/// Tag/value data of one entity (or of the scenario, id `0`).
///
/// The current view maps each tag to its latest value at the update time.
/// A value with a non-negative duration expires `duration` seconds after it
/// was reported.
#[derive(Debug, Clone, Default)]
pub struct GenericDataSlice {
    items: Vec<GenericData>,
    current: BTreeMap<String, String>,
}

impl GenericDataSlice {
    /// Creates an empty slice.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Recomputes the current tag/value view; returns true if it changed.
    pub fn update(&mut self, time: f64) -> bool {
        let end = upper_bound(&self.items, time, |d| d.time);
        let mut view: BTreeMap<String, (String, f64)> = BTreeMap::new();
        for data in &self.items[..end] {
            let expires = if data.duration < 0.0 {
                f64::MAX
            } else {
                data.time + data.duration
            };
            for entry in &data.entries {
                view.insert(entry.key.clone(), (entry.value.clone(), expires));
            }
        }
        let next: BTreeMap<String, String> = view
            .into_iter()
            .filter(|(_, (_, expires))| time < *expires)
            .map(|(key, (value, _))| (key, value))
            .collect();
        let changed = next != self.current;
        self.current = next;
        changed
    }

    /// Current tag/value view.
    #[must_use]
    pub const fn current(&self) -> &BTreeMap<String, String> {
        &self.current
    }

    /// Current value of `tag`, if any.
    #[must_use]
    pub fn value(&self, tag: &str) -> Option<&str> {
        self.current.get(tag).map(String::as_str)
    }

    /// Inserts data in time order; returns false if nothing was stored.
    ///
    /// With `ignore_duplicates`, entries whose value equals the tag's latest
    /// value at or before `data.time` are dropped first.
    pub fn insert(&mut self, mut data: GenericData, ignore_duplicates: bool) -> bool {
        let idx = upper_bound(&self.items, data.time, |d| d.time);
        if ignore_duplicates {
            let prior = &self.items[..idx];
            data.entries.retain(|entry| {
                let latest = prior
                    .iter()
                    .rev()
                    .flat_map(|d| d.entries.iter().rev())
                    .find(|e| e.key == entry.key);
                latest.map_or(true, |e| e.value != entry.value)
            });
            if data.entries.is_empty() {
                return false;
            }
        }
        self.items.insert(idx, data);
        true
    }

    /// Removes every value of `tag`; returns how many values were removed.
    pub fn remove_tag(&mut self, tag: &str) -> usize {
        let mut removed = 0;
        for data in &mut self.items {
            let before = data.entries.len();
            data.entries.retain(|e| e.key != tag);
            removed += before - data.entries.len();
        }
        self.items.retain(|d| !d.entries.is_empty());
        self.current.remove(tag);
        removed
    }

    /// Removes all data and clears the current view.
    pub fn flush(&mut self) {
        self.items.clear();
        self.current.clear();
    }

    /// Removes the data inside `range`.
    pub fn flush_range(&mut self, range: FlushRange) {
        self.items.retain(|d| !range.contains(d.time));
    }

    /// Evicts the oldest data beyond `limits`.
    pub fn limit(&mut self, limits: &DataLimits) {
        if let Some(points) = limits.max_points() {
            if self.items.len() > points {
                let excess = self.items.len() - points;
                self.items.drain(..excess);
            }
        }
        if let (Some(seconds), Some(last)) = (limits.max_seconds(), self.items.last()) {
            let oldest = last.time - seconds;
            let keep_from = self.items.partition_point(|d| d.time < oldest);
            self.items.drain(..keep_from);
        }
    }

    /// Time of the first data, or `f64::MAX` when empty.
    #[must_use]
    pub fn first_time(&self) -> f64 {
        self.items.first().map_or(f64::MAX, |d| d.time)
    }

    /// Time of the last data, or `-f64::MAX` when empty.
    #[must_use]
    pub fn last_time(&self) -> f64 {
        self.items.last().map_or(-f64::MAX, |d| d.time)
    }

    /// Number of stored data items.
    #[must_use]
    pub fn num_items(&self) -> usize {
        self.items.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(time: f64, pairs: &[(&str, &str)]) -> GenericData {
        let mut d = GenericData::new(time);
        for (k, v) in pairs {
            d.push(*k, *v);
        }
        d
    }

    #[test]
    fn test_update_latest_value_wins() {
        let mut slice = GenericDataSlice::new();
        slice.insert(data(1.0, &[("mode", "search")]), false);
        slice.insert(data(3.0, &[("mode", "track")]), false);

        assert!(!slice.update(0.5));
        assert!(slice.update(2.0));
        assert_eq!(slice.value("mode"), Some("search"));
        assert!(slice.update(3.0));
        assert_eq!(slice.value("mode"), Some("track"));
        assert!(!slice.update(4.0));
    }

    #[test]
    fn test_duration_expires() {
        let mut slice = GenericDataSlice::new();
        let mut d = data(1.0, &[("alert", "on")]);
        d.duration = 2.0;
        slice.insert(d, false);

        slice.update(2.0);
        assert_eq!(slice.value("alert"), Some("on"));
        assert!(slice.update(3.0));
        assert_eq!(slice.value("alert"), None);
    }

    #[test]
    fn test_ignore_duplicates() {
        let mut slice = GenericDataSlice::new();
        assert!(slice.insert(data(1.0, &[("a", "1"), ("b", "x")]), true));
        assert!(!slice.insert(data(2.0, &[("a", "1")]), true));
        assert!(slice.insert(data(3.0, &[("a", "1"), ("b", "y")]), true));
        assert_eq!(slice.num_items(), 2);
        // without the flag duplicates are kept
        assert!(slice.insert(data(4.0, &[("b", "y")]), false));
        assert_eq!(slice.num_items(), 3);
    }

    #[test]
    fn test_remove_tag() {
        let mut slice = GenericDataSlice::new();
        slice.insert(data(1.0, &[("a", "1"), ("b", "2")]), false);
        slice.insert(data(2.0, &[("a", "3")]), false);
        slice.update(2.0);

        assert_eq!(slice.remove_tag("a"), 2);
        assert_eq!(slice.num_items(), 1);
        assert_eq!(slice.value("a"), None);
        assert_eq!(slice.remove_tag("missing"), 0);
    }

    #[test]
    fn test_flush_and_limit() {
        let mut slice = GenericDataSlice::new();
        for t in [1.0, 2.0, 3.0, 4.0] {
            slice.insert(data(t, &[("k", "v")]), false);
        }
        slice.limit(&DataLimits::new(0, 1.0));
        assert_eq!(slice.first_time(), 3.0);
        slice.flush_range(FlushRange::new(4.0, f64::MAX));
        assert_eq!(slice.last_time(), 3.0);
        slice.update(3.0);
        slice.flush();
        assert_eq!(slice.num_items(), 0);
        assert!(slice.current().is_empty());
    }
}
