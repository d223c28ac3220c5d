use log::trace;

use crate::interpolate::Interpolator;
use crate::schema::DataLimits;
use crate::time::FlushRange;

use super::{upper_bound, Sample};

/// Composition window of slices whose current sample spans several updates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliceWindow {
    /// Most updates composed; `0` means no point limit.
    pub max_points: usize,
    /// Updates older than `time - max_seconds` are left out; `<= 0` means no age limit.
    pub max_seconds: f64,
}

/// Time-ordered samples of one entity plus the sample current at the last update.
///
/// The slice also owns an "interpolated" slot, written whenever an update
/// interpolates, and a "published" slot holding the last sample synthesized by
/// the store. Either may be current, so the current sample is not necessarily
/// one of the stored samples.
#[derive(Debug, Clone)]
pub struct MemoryDataSlice<T> {
    samples: Vec<T>,
    current: Option<T>,
    interpolated: Option<T>,
    published: Option<T>,
    changed: bool,
    window: Option<SliceWindow>,
}

impl<T> Default for MemoryDataSlice<T> {
    fn default() -> Self {
        Self {
            samples: Vec::new(),
            current: None,
            interpolated: None,
            published: None,
            changed: false,
            window: None,
        }
    }
}

impl<T: Sample> MemoryDataSlice<T> {
    /// Creates an empty slice.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Recomputes the current sample for `time` without interpolation.
    pub fn update(&mut self, time: f64) {
        self.update_with(time, None);
    }

    /// Recomputes the current sample for `time`.
    ///
    /// An exact match wins. Otherwise the samples bracketing `time` are handed
    /// to `interpolator`; without one, or past the last sample, the sample
    /// before `time` is current. Before the first sample there is no current
    /// sample.
    pub fn update_with(&mut self, time: f64, interpolator: Option<&dyn Interpolator>) {
        let next = match self.window {
            Some(window) => self.windowed(time, window),
            None => self.at_time(time, interpolator),
        };
        self.changed = next != self.current;
        self.current = next;
    }

    fn at_time(&mut self, time: f64, interpolator: Option<&dyn Interpolator>) -> Option<T> {
        let idx = upper_bound(&self.samples, time, T::time);
        if idx == 0 {
            return None;
        }
        let prev = &self.samples[idx - 1];
        if prev.time() == time {
            return Some(prev.clone());
        }
        if let (Some(interpolator), Some(next)) = (interpolator, self.samples.get(idx)) {
            if let Some(sample) = T::interpolate(interpolator, prev, next, time) {
                self.interpolated = Some(sample.clone());
                return Some(sample);
            }
        }
        Some(prev.clone())
    }

    fn windowed(&self, time: f64, window: SliceWindow) -> Option<T> {
        let end = upper_bound(&self.samples, time, T::time);
        let mut start = 0;
        if window.max_seconds > 0.0 {
            let oldest = time - window.max_seconds;
            start = self.samples[..end].partition_point(|s| s.time() <= oldest);
        }
        if window.max_points > 0 && end - start > window.max_points {
            start = end - window.max_points;
        }
        T::compose(&self.samples[start..end], time)
    }

    /// Sets the composition window used by [`MemoryDataSlice::update`].
    pub fn set_window(&mut self, window: Option<SliceWindow>) {
        self.window = window;
    }

    /// The composition window, if any.
    #[must_use]
    pub const fn window(&self) -> Option<SliceWindow> {
        self.window
    }

    /// Sample current at the last update, if any.
    #[must_use]
    pub const fn current(&self) -> Option<&T> {
        self.current.as_ref()
    }

    /// Replaces the current sample; marks the slice changed if it differs.
    pub fn set_current(&mut self, sample: Option<T>) {
        if sample != self.current {
            self.changed = true;
        }
        self.current = sample;
    }

    /// The sample produced by the last interpolating update.
    #[must_use]
    pub const fn interpolated(&self) -> Option<&T> {
        self.interpolated.as_ref()
    }

    /// The last sample handed to [`MemoryDataSlice::publish`].
    #[must_use]
    pub const fn published(&self) -> Option<&T> {
        self.published.as_ref()
    }

    /// Publishes a synthesized sample as current and marks the slice changed.
    pub fn publish(&mut self, sample: T) {
        self.published = Some(sample.clone());
        self.current = Some(sample);
        self.changed = true;
    }

    /// Makes the published sample current again without marking a change.
    pub(crate) fn restore_published(&mut self) {
        self.current.clone_from(&self.published);
    }

    /// Returns true if the current sample changed at the last update.
    #[must_use]
    pub const fn has_changed(&self) -> bool {
        self.changed
    }

    /// Forces the changed flag on.
    pub fn set_changed(&mut self) {
        self.changed = true;
    }

    /// Clears the changed flag.
    pub fn clear_changed(&mut self) {
        self.changed = false;
    }

    /// Inserts a sample in time order, replacing a sample with the same time.
    pub fn insert(&mut self, sample: T) {
        let idx = upper_bound(&self.samples, sample.time(), T::time);
        if idx > 0 && self.samples[idx - 1].time() == sample.time() {
            self.samples[idx - 1] = sample;
        } else {
            self.samples.insert(idx, sample);
        }
    }

    /// Removes the samples inside `range`.
    ///
    /// The current sample is dropped when it, or a sample it was derived
    /// from, falls inside the range.
    pub fn flush(&mut self, range: FlushRange) {
        let stale = self
            .current
            .as_ref()
            .is_some_and(|c| self.depends_on(c.time(), range));
        let before = self.samples.len();
        self.samples.retain(|s| !range.contains(s.time()));
        if stale {
            self.current = None;
            self.interpolated = None;
            self.published = None;
            self.changed = true;
        }
        trace!("flushed {} samples in {range}", before - self.samples.len());
    }

    /// Returns true if a current sample stamped `time` rests on a sample in `range`.
    fn depends_on(&self, time: f64, range: FlushRange) -> bool {
        if range.contains(time) {
            return true;
        }
        let idx = upper_bound(&self.samples, time, T::time);
        let prev = idx.checked_sub(1).map(|i| &self.samples[i]);
        if prev.is_some_and(|p| p.time() == time) {
            return false;
        }
        prev.is_some_and(|p| range.contains(p.time()))
            || self.samples.get(idx).is_some_and(|n| range.contains(n.time()))
    }

    /// Evicts the oldest samples beyond the point limit, then those older
    /// than the newest sample minus the time limit.
    pub fn limit(&mut self, limits: &DataLimits) {
        if let Some(points) = limits.max_points() {
            if self.samples.len() > points {
                let excess = self.samples.len() - points;
                self.samples.drain(..excess);
            }
        }
        if let (Some(seconds), Some(last)) = (limits.max_seconds(), self.samples.last()) {
            let oldest = last.time() - seconds;
            let keep_from = self.samples.partition_point(|s| s.time() < oldest);
            self.samples.drain(..keep_from);
        }
    }

    /// Time of the first sample, or `f64::MAX` when empty.
    #[must_use]
    pub fn first_time(&self) -> f64 {
        self.samples.first().map_or(f64::MAX, T::time)
    }

    /// Time of the last sample, or `-f64::MAX` when empty.
    #[must_use]
    pub fn last_time(&self) -> f64 {
        self.samples.last().map_or(-f64::MAX, T::time)
    }

    /// Number of stored samples.
    #[must_use]
    pub fn num_items(&self) -> usize {
        self.samples.len()
    }

    /// Returns true if no samples are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Stored samples, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.samples.iter()
    }
}
