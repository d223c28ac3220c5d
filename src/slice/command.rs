use crate::schema::{Command, DataLimits, PrefsPatch};
use crate::time::FlushRange;

use super::upper_bound;

/// Time-ordered preference commands of one entity.
///
/// [`CommandSlice::update`] yields the merged patch of the commands that take
/// effect since the previous update. Moving backwards in time, or editing the
/// commands already passed, makes the next update re-merge every command up to
/// the requested time.
#[derive(Debug, Clone, Default)]
pub struct CommandSlice {
    commands: Vec<Command>,
    last_update: Option<f64>,
    dirty: bool,
}

impl CommandSlice {
    /// Creates an empty slice.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances to `time` and returns the patch to apply, if any.
    pub fn update(&mut self, time: f64) -> Option<PrefsPatch> {
        let end = upper_bound(&self.commands, time, |c| c.time);
        let start = match self.last_update {
            Some(last) if !self.dirty && time >= last => upper_bound(&self.commands, last, |c| c.time),
            _ => 0,
        };
        self.last_update = Some(time);
        self.dirty = false;

        let mut patch = PrefsPatch::new();
        for command in self.commands.get(start..end).unwrap_or_default() {
            patch.merge(&command.update_prefs);
        }
        (!patch.is_empty()).then_some(patch)
    }

    /// Inserts a command after any command with the same time.
    pub fn insert(&mut self, command: Command) {
        if self.last_update.is_some_and(|last| command.time <= last) {
            self.dirty = true;
        }
        let idx = upper_bound(&self.commands, command.time, |c| c.time);
        self.commands.insert(idx, command);
    }

    /// Removes the commands inside `range`.
    pub fn flush(&mut self, range: FlushRange) {
        self.commands.retain(|c| !range.contains(c.time));
        self.dirty = true;
    }

    /// Evicts the oldest commands beyond `limits`.
    pub fn limit(&mut self, limits: &DataLimits) {
        if let Some(points) = limits.max_points() {
            if self.commands.len() > points {
                let excess = self.commands.len() - points;
                self.commands.drain(..excess);
            }
        }
        if let (Some(seconds), Some(last)) = (limits.max_seconds(), self.commands.last()) {
            let oldest = last.time - seconds;
            let keep_from = self.commands.partition_point(|c| c.time < oldest);
            self.commands.drain(..keep_from);
        }
    }

    /// Edits commands in place; commands for which `modifier` returns false are removed.
    ///
    /// The slice is re-sorted and the next update re-merges from the start.
    pub fn modify<F>(&mut self, mut modifier: F)
    where
        F: FnMut(&mut Command) -> bool,
    {
        self.commands.retain_mut(|c| modifier(c));
        self.commands.sort_by(|a, b| a.time.total_cmp(&b.time));
        self.dirty = true;
    }

    /// Time of the first command, or `f64::MAX` when empty.
    #[must_use]
    pub fn first_time(&self) -> f64 {
        self.commands.first().map_or(f64::MAX, |c| c.time)
    }

    /// Time of the last command, or `-f64::MAX` when empty.
    #[must_use]
    pub fn last_time(&self) -> f64 {
        self.commands.last().map_or(-f64::MAX, |c| c.time)
    }

    /// Number of stored commands.
    #[must_use]
    pub fn num_items(&self) -> usize {
        self.commands.len()
    }

    /// Stored commands, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Command> {
        self.commands.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::PlatformPrefs;

    fn draw_command(time: f64, draw: bool) -> Command {
        Command::new(time, PrefsPatch::new().with("common.draw", draw))
    }

    fn apply(patch: Option<PrefsPatch>) -> Option<bool> {
        let mut prefs = PlatformPrefs::default();
        patch?.apply_to(&mut prefs).unwrap();
        Some(prefs.common.draw)
    }

    #[test]
    fn test_update_yields_crossed_commands_once() {
        let mut slice = CommandSlice::new();
        slice.insert(draw_command(2.0, false));
        slice.insert(draw_command(4.0, true));

        assert_eq!(apply(slice.update(1.0)), None);
        assert_eq!(apply(slice.update(2.0)), Some(false));
        assert_eq!(apply(slice.update(3.0)), None);
        assert_eq!(apply(slice.update(5.0)), Some(true));
    }

    #[test]
    fn test_rewind_remerges_from_start() {
        let mut slice = CommandSlice::new();
        slice.insert(draw_command(2.0, false));
        slice.insert(draw_command(4.0, true));
        slice.update(5.0);

        assert_eq!(apply(slice.update(3.0)), Some(false));
    }

    #[test]
    fn test_out_of_order_insert_forces_remerge() {
        let mut slice = CommandSlice::new();
        slice.insert(draw_command(4.0, true));
        slice.update(5.0);
        slice.insert(draw_command(1.0, false));

        // both commands are at or before 5.0; the later one wins
        assert_eq!(apply(slice.update(5.0)), Some(true));
    }

    #[test]
    fn test_modify_removes_and_resorts() {
        let mut slice = CommandSlice::new();
        slice.insert(draw_command(1.0, false));
        slice.insert(draw_command(2.0, true));
        slice.modify(|c| {
            if c.time == 1.0 {
                c.time = 3.0;
            }
            true
        });
        assert_eq!(slice.first_time(), 2.0);
        assert_eq!(slice.last_time(), 3.0);

        slice.modify(|c| c.time < 3.0);
        assert_eq!(slice.num_items(), 1);
    }

    #[test]
    fn test_flush_and_limit() {
        let mut slice = CommandSlice::new();
        for t in [1.0, 2.0, 3.0, 4.0] {
            slice.insert(draw_command(t, true));
        }
        slice.limit(&DataLimits::new(3, 0.0));
        assert_eq!(slice.first_time(), 2.0);
        slice.flush(FlushRange::new(3.0, f64::MAX));
        assert_eq!(slice.num_items(), 1);
        slice.flush(FlushRange::all());
        assert_eq!(slice.num_items(), 0);
        assert_eq!(slice.first_time(), f64::MAX);
    }
}
