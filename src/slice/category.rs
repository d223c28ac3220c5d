use std::collections::{BTreeMap, HashMap};

use crate::schema::{CategoryData, DataLimits};
use crate::time::{FlushRange, STATIC_TIME};

/// Scenario-wide dictionary of category names and values.
///
/// Strings are interned to small integers; category data slices only store
/// the integers.
#[derive(Debug, Clone, Default)]
pub struct CategoryNameManager {
    names: Vec<String>,
    name_ids: HashMap<String, i32>,
    values: Vec<String>,
    value_ids: HashMap<(i32, String), i32>,
}

impl CategoryNameManager {
    /// Creates an empty dictionary.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the id of category `name`, registering it if needed.
    pub fn add_category_name(&mut self, name: &str) -> i32 {
        if let Some(&id) = self.name_ids.get(name) {
            return id;
        }
        let id = next_id(self.names.len());
        self.names.push(name.to_string());
        self.name_ids.insert(name.to_string(), id);
        id
    }

    /// Returns the id of `value` within `category`, registering it if needed.
    pub fn add_category_value(&mut self, category: i32, value: &str) -> i32 {
        let key = (category, value.to_string());
        if let Some(&id) = self.value_ids.get(&key) {
            return id;
        }
        let id = next_id(self.values.len());
        self.values.push(value.to_string());
        self.value_ids.insert(key, id);
        id
    }

    /// Id of category `name`, if registered.
    #[must_use]
    pub fn name_int(&self, name: &str) -> Option<i32> {
        self.name_ids.get(name).copied()
    }

    /// Id of `value` within `category`, if registered.
    #[must_use]
    pub fn value_int(&self, category: i32, value: &str) -> Option<i32> {
        self.value_ids.get(&(category, value.to_string())).copied()
    }

    /// Category name for `id`.
    #[must_use]
    pub fn name_string(&self, id: i32) -> Option<&str> {
        usize::try_from(id).ok().and_then(|i| self.names.get(i)).map(String::as_str)
    }

    /// Value string for `id`.
    #[must_use]
    pub fn value_string(&self, id: i32) -> Option<&str> {
        usize::try_from(id).ok().and_then(|i| self.values.get(i)).map(String::as_str)
    }

    /// Number of registered category names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Forgets every name and value.
    pub fn clear(&mut self) {
        self.names.clear();
        self.name_ids.clear();
        self.values.clear();
        self.value_ids.clear();
    }
}

fn next_id(len: usize) -> i32 {
    i32::try_from(len).unwrap_or(i32::MAX)
}

/// Category values of one entity over time.
///
/// Points are kept per category as `(time, value id)` pairs in time order.
/// Points stamped at `-1` are static and survive a plain [`flush`](Self::flush).
#[derive(Debug, Clone, Default)]
pub struct CategoryDataSlice {
    points: BTreeMap<i32, Vec<(f64, i32)>>,
    current: BTreeMap<i32, i32>,
}

impl CategoryDataSlice {
    /// Creates an empty slice.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores every category/value pair of `data`, interning strings in `names`.
    ///
    /// A point at the same time as an existing point of that category replaces it.
    pub fn insert(&mut self, data: &CategoryData, names: &mut CategoryNameManager) {
        for entry in &data.entries {
            let category = names.add_category_name(&entry.key);
            let value = names.add_category_value(category, &entry.value);
            let points = self.points.entry(category).or_default();
            let idx = points.partition_point(|(t, _)| *t <= data.time);
            if idx > 0 && points[idx - 1].0 == data.time {
                points[idx - 1].1 = value;
            } else {
                points.insert(idx, (data.time, value));
            }
        }
    }

    /// Recomputes the current value of every category; returns true if any changed.
    pub fn update(&mut self, time: f64) -> bool {
        let next: BTreeMap<i32, i32> = self
            .points
            .iter()
            .filter_map(|(&category, points)| {
                let idx = points.partition_point(|(t, _)| *t <= time);
                (idx > 0).then(|| (category, points[idx - 1].1))
            })
            .collect();
        let changed = next != self.current;
        self.current = next;
        changed
    }

    /// Current value id per category id.
    #[must_use]
    pub const fn current(&self) -> &BTreeMap<i32, i32> {
        &self.current
    }

    /// Current values resolved to strings.
    #[must_use]
    pub fn current_strings(&self, names: &CategoryNameManager) -> BTreeMap<String, String> {
        self.current
            .iter()
            .filter_map(|(&category, &value)| {
                Some((
                    names.name_string(category)?.to_string(),
                    names.value_string(value)?.to_string(),
                ))
            })
            .collect()
    }

    /// Removes the point of `category` at `time` with `value`; returns true if found.
    pub fn remove_point(&mut self, time: f64, category: i32, value: i32) -> bool {
        let Some(points) = self.points.get_mut(&category) else {
            return false;
        };
        let Some(idx) = points.iter().position(|&(t, v)| t == time && v == value) else {
            return false;
        };
        points.remove(idx);
        if points.is_empty() {
            self.points.remove(&category);
        }
        true
    }

    /// Removes every point except static ones.
    pub fn flush(&mut self) {
        self.retain(|t| t == STATIC_TIME);
    }

    /// Removes the points inside `range`.
    pub fn flush_range(&mut self, range: FlushRange) {
        self.retain(|t| !range.contains(t));
    }

    fn retain(&mut self, keep: impl Fn(f64) -> bool) {
        for points in self.points.values_mut() {
            points.retain(|&(t, _)| keep(t));
        }
        self.points.retain(|_, points| !points.is_empty());
    }

    /// Evicts old points per category; the newest point of a category is always kept.
    pub fn limit(&mut self, limits: &DataLimits) {
        for points in self.points.values_mut() {
            if let Some(max) = limits.max_points() {
                let max = max.max(1);
                if points.len() > max {
                    let excess = points.len() - max;
                    points.drain(..excess);
                }
            }
            if let (Some(seconds), Some(&(last, _))) = (limits.max_seconds(), points.last()) {
                let oldest = last - seconds;
                let keep_from = points.partition_point(|(t, _)| *t < oldest);
                points.drain(..keep_from);
            }
        }
    }

    /// Total number of stored points.
    #[must_use]
    pub fn num_items(&self) -> usize {
        self.points.values().map(Vec::len).sum()
    }

    /// Time of the earliest point, or `f64::MAX` when empty.
    #[must_use]
    pub fn first_time(&self) -> f64 {
        self.points
            .values()
            .filter_map(|p| p.first().map(|(t, _)| *t))
            .fold(f64::MAX, f64::min)
    }

    /// Time of the latest point, or `-f64::MAX` when empty.
    #[must_use]
    pub fn last_time(&self) -> f64 {
        self.points
            .values()
            .filter_map(|p| p.last().map(|(t, _)| *t))
            .fold(-f64::MAX, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(time: f64, pairs: &[(&str, &str)]) -> CategoryData {
        let mut d = CategoryData::new(time);
        for (k, v) in pairs {
            d.push(*k, *v);
        }
        d
    }

    #[test]
    fn test_name_manager_interns() {
        let mut names = CategoryNameManager::new();
        let a = names.add_category_name("Affiliation");
        assert_eq!(names.add_category_name("Affiliation"), a);
        let v = names.add_category_value(a, "Friendly");
        assert_eq!(names.value_int(a, "Friendly"), Some(v));
        assert_eq!(names.name_string(a), Some("Affiliation"));
        assert_eq!(names.value_string(v), Some("Friendly"));
        names.clear();
        assert!(names.is_empty());
        assert_eq!(names.name_int("Affiliation"), None);
    }

    #[test]
    fn test_update_reports_changes() {
        let mut names = CategoryNameManager::new();
        let mut slice = CategoryDataSlice::new();
        slice.insert(&data(1.0, &[("Affiliation", "Friendly")]), &mut names);
        slice.insert(&data(5.0, &[("Affiliation", "Hostile")]), &mut names);

        assert!(!slice.update(0.0));
        assert!(slice.update(1.0));
        assert!(!slice.update(2.0));
        assert!(slice.update(5.0));
        let current = slice.current_strings(&names);
        assert_eq!(current.get("Affiliation").map(String::as_str), Some("Hostile"));
    }

    #[test]
    fn test_flush_keeps_static_points() {
        let mut names = CategoryNameManager::new();
        let mut slice = CategoryDataSlice::new();
        slice.insert(&data(STATIC_TIME, &[("Type", "Ship")]), &mut names);
        slice.insert(&data(2.0, &[("Type", "Sub")]), &mut names);
        slice.flush();
        assert_eq!(slice.num_items(), 1);
        assert_eq!(slice.first_time(), STATIC_TIME);

        slice.flush_range(FlushRange::including_static());
        assert_eq!(slice.num_items(), 0);
        assert_eq!(slice.last_time(), -f64::MAX);
    }

    #[test]
    fn test_remove_point() {
        let mut names = CategoryNameManager::new();
        let mut slice = CategoryDataSlice::new();
        slice.insert(&data(1.0, &[("Type", "Ship")]), &mut names);
        let cat = names.name_int("Type").unwrap();
        let val = names.value_int(cat, "Ship").unwrap();
        assert!(!slice.remove_point(2.0, cat, val));
        assert!(slice.remove_point(1.0, cat, val));
        assert_eq!(slice.num_items(), 0);
    }

    #[test]
    fn test_limit_keeps_newest() {
        let mut names = CategoryNameManager::new();
        let mut slice = CategoryDataSlice::new();
        for (t, v) in [(1.0, "a"), (2.0, "b"), (3.0, "c")] {
            slice.insert(&data(t, &[("K", v)]), &mut names);
        }
        slice.limit(&DataLimits::new(2, 0.0));
        assert_eq!(slice.first_time(), 2.0);
        slice.limit(&DataLimits::new(0, 0.5));
        assert_eq!(slice.num_items(), 1);
        assert_eq!(slice.last_time(), 3.0);
    }
}
