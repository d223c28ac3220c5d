//! Data tables owned by entities (or by the scenario, owner `0`).
//!
//! A table is a time-ordered list of rows; each row maps column names to
//! values. The manager groups tables by owner so removing an entity can drop
//! all of its tables at once, and bulk operations reach every table of an owner
//! through [`TableList::accept`].

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};
use crate::id::ObjectId;
use crate::schema::DataLimits;
use crate::time::FlushRange;

/// Unique id of a data table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableId(u64);

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "table-{}", self.0)
    }
}

/// One row of a data table.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TableRow {
    pub time: f64,
    pub values: BTreeMap<String, f64>,
}

impl TableRow {
    /// Creates an empty row at `time`.
    #[must_use]
    pub fn new(time: f64) -> Self {
        Self {
            time,
            values: BTreeMap::new(),
        }
    }

    /// Builder-style column setter.
    #[must_use]
    pub fn with(mut self, column: impl Into<String>, value: f64) -> Self {
        self.values.insert(column.into(), value);
        self
    }
}

/// A named, time-ordered table.
#[derive(Debug, Clone)]
pub struct DataTable {
    id: TableId,
    owner: ObjectId,
    name: String,
    rows: Vec<TableRow>,
}

impl DataTable {
    /// Store-assigned table id.
    #[must_use]
    pub const fn id(&self) -> TableId {
        self.id
    }

    /// Entity owning the table.
    #[must_use]
    pub const fn owner(&self) -> ObjectId {
        self.owner
    }

    /// Table name, unique per owner.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Adds a row; a row at an existing time merges into it.
    pub fn add_row(&mut self, row: TableRow) {
        let idx = self.rows.partition_point(|r| r.time <= row.time);
        if idx > 0 && self.rows[idx - 1].time == row.time {
            self.rows[idx - 1].values.extend(row.values);
        } else {
            self.rows.insert(idx, row);
        }
    }

    /// Latest value of `column` at or before `time`.
    #[must_use]
    pub fn value_at(&self, column: &str, time: f64) -> Option<f64> {
        let end = self.rows.partition_point(|r| r.time <= time);
        self.rows[..end]
            .iter()
            .rev()
            .find_map(|r| r.values.get(column).copied())
    }

    /// Rows, oldest first.
    #[must_use]
    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    /// Removes every row.
    pub fn flush(&mut self) {
        self.rows.clear();
    }

    /// Removes the rows inside `range`.
    pub fn flush_range(&mut self, range: FlushRange) {
        self.rows.retain(|r| !range.contains(r.time));
    }

    /// Evicts the oldest rows beyond `limits`.
    pub fn limit(&mut self, limits: &DataLimits) {
        if let Some(points) = limits.max_points() {
            if self.rows.len() > points {
                let excess = self.rows.len() - points;
                self.rows.drain(..excess);
            }
        }
        if let (Some(seconds), Some(last)) = (limits.max_seconds(), self.rows.last()) {
            let oldest = last.time - seconds;
            let keep_from = self.rows.partition_point(|r| r.time < oldest);
            self.rows.drain(..keep_from);
        }
    }
}

/// Visitor over the tables of one owner.
pub trait TableVisitor {
    /// Called once per table.
    fn visit(&mut self, table: &mut DataTable);
}

impl<F: FnMut(&mut DataTable)> TableVisitor for F {
    fn visit(&mut self, table: &mut DataTable) {
        self(table);
    }
}

/// Tables of one owner, by name.
#[derive(Debug, Clone, Default)]
pub struct TableList {
    tables: BTreeMap<String, DataTable>,
}

impl TableList {
    /// Visits every table.
    pub fn accept(&mut self, visitor: &mut dyn TableVisitor) {
        for table in self.tables.values_mut() {
            visitor.visit(table);
        }
    }

    /// Table called `name`, if any.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&DataTable> {
        self.tables.get(name)
    }

    /// Mutable table called `name`, if any.
    pub fn find_mut(&mut self, name: &str) -> Option<&mut DataTable> {
        self.tables.get_mut(name)
    }

    /// Tables in name order.
    pub fn iter(&self) -> impl Iterator<Item = &DataTable> {
        self.tables.values()
    }

    /// Number of tables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Returns true if the owner has no tables.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

/// All data tables of a store.
#[derive(Debug, Default)]
pub struct DataTableManager {
    by_owner: BTreeMap<ObjectId, TableList>,
    next_id: u64,
}

impl DataTableManager {
    /// Creates an empty manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates table `name` for `owner`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateTable`] if `owner` already has a table named `name`.
    pub fn add_table(&mut self, owner: ObjectId, name: &str) -> StoreResult<TableId> {
        let list = self.by_owner.entry(owner).or_default();
        if list.tables.contains_key(name) {
            return Err(StoreError::DuplicateTable {
                owner,
                name: name.to_string(),
            });
        }
        self.next_id += 1;
        let id = TableId(self.next_id);
        list.tables.insert(
            name.to_string(),
            DataTable {
                id,
                owner,
                name: name.to_string(),
                rows: Vec::new(),
            },
        );
        Ok(id)
    }

    /// Tables of `owner`, if it has any.
    #[must_use]
    pub fn tables_for_owner(&self, owner: ObjectId) -> Option<&TableList> {
        self.by_owner.get(&owner)
    }

    /// Mutable tables of `owner`, if it has any.
    pub fn tables_for_owner_mut(&mut self, owner: ObjectId) -> Option<&mut TableList> {
        self.by_owner.get_mut(&owner)
    }

    /// Table `name` of `owner`.
    #[must_use]
    pub fn find_table(&self, owner: ObjectId, name: &str) -> Option<&DataTable> {
        self.by_owner.get(&owner)?.find(name)
    }

    /// Drops every table of `owner`; returns how many were dropped.
    pub fn delete_tables_by_owner(&mut self, owner: ObjectId) -> usize {
        self.by_owner.remove(&owner).map_or(0, |list| list.len())
    }

    /// Total number of tables.
    #[must_use]
    pub fn table_count(&self) -> usize {
        self.by_owner.values().map(TableList::len).sum()
    }

    /// Drops every table.
    pub fn clear(&mut self) {
        self.by_owner.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_table_rejects_duplicates() {
        let mut tables = DataTableManager::new();
        let owner = ObjectId::new(1);
        let a = tables.add_table(owner, "rcs").unwrap();
        let b = tables.add_table(ObjectId::new(2), "rcs").unwrap();
        assert_ne!(a, b);

        let err = tables.add_table(owner, "rcs").unwrap_err();
        assert!(matches!(err, StoreError::DuplicateTable { .. }));
        assert_eq!(tables.table_count(), 2);
    }

    #[test]
    fn test_rows_merge_and_lookup() {
        let mut tables = DataTableManager::new();
        let owner = ObjectId::new(1);
        tables.add_table(owner, "t").unwrap();
        let table = tables
            .tables_for_owner_mut(owner)
            .and_then(|l| l.find_mut("t"))
            .unwrap();
        table.add_row(TableRow::new(2.0).with("snr", 4.0));
        table.add_row(TableRow::new(1.0).with("snr", 3.0));
        table.add_row(TableRow::new(2.0).with("rng", 100.0));

        assert_eq!(table.rows().len(), 2);
        assert_eq!(table.value_at("snr", 1.5), Some(3.0));
        assert_eq!(table.value_at("rng", 2.0), Some(100.0));
        assert_eq!(table.value_at("snr", 0.5), None);
    }

    #[test]
    fn test_accept_visits_each_table() {
        let mut tables = DataTableManager::new();
        let owner = ObjectId::SCENARIO;
        for name in ["a", "b"] {
            tables.add_table(owner, name).unwrap();
            tables
                .tables_for_owner_mut(owner)
                .and_then(|l| l.find_mut(name))
                .unwrap()
                .add_row(TableRow::new(1.0).with("x", 1.0));
        }
        let list = tables.tables_for_owner_mut(owner).unwrap();
        let mut visited = 0;
        list.accept(&mut |table: &mut DataTable| {
            table.flush();
            visited += 1;
        });
        assert_eq!(visited, 2);
        assert!(list.iter().all(|t| t.rows().is_empty()));
    }

    #[test]
    fn test_limit_and_delete_by_owner() {
        let mut tables = DataTableManager::new();
        let owner = ObjectId::new(5);
        tables.add_table(owner, "t").unwrap();
        let table = tables
            .tables_for_owner_mut(owner)
            .and_then(|l| l.find_mut("t"))
            .unwrap();
        for t in [1.0, 2.0, 3.0] {
            table.add_row(TableRow::new(t).with("x", t));
        }
        table.limit(&DataLimits::new(2, 0.0));
        assert_eq!(table.rows()[0].time, 2.0);

        assert_eq!(tables.delete_tables_by_owner(owner), 1);
        assert!(tables.tables_for_owner(owner).is_none());
        assert_eq!(tables.delete_tables_by_owner(owner), 0);
    }
}
