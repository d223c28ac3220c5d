//! Time-series slices.
//!
//! Every entity owns an update slice (its authoritative time series) and a
//! command slice (discrete preference changes). Generic and category data live
//! in slices keyed by id inside the store. Each slice answers "what is current
//! at time t" through `update`, and supports range flushes and limit-driven
//! eviction.

/// Category data slice and category name dictionary.
pub mod category;
/// Command slice.
pub mod command;
/// Generic tag/value data slice.
pub mod generic;
/// Update slice.
pub mod memory;

pub use category::{CategoryDataSlice, CategoryNameManager};
pub use command::CommandSlice;
pub use generic::GenericDataSlice;
pub use memory::{MemoryDataSlice, SliceWindow};

use crate::interpolate::Interpolator;
use crate::schema::{
    BeamUpdate, GateUpdate, LaserUpdate, LobGroupUpdate, NoUpdate, PlatformUpdate, ProjectorUpdate,
};

/// A time-stamped value stored in a [`MemoryDataSlice`].
pub trait Sample: Clone + PartialEq + std::fmt::Debug {
    /// Time of the sample in scenario seconds.
    fn time(&self) -> f64;

    /// Re-stamps the sample.
    fn set_time(&mut self, time: f64);

    /// Synthesizes a sample at `time` between `prev` and `next`.
    fn interpolate(_interpolator: &dyn Interpolator, _prev: &Self, _next: &Self, _time: f64) -> Option<Self> {
        None
    }

    /// Combines the samples of a window into one current sample.
    fn compose(_window: &[Self], _time: f64) -> Option<Self> {
        None
    }
}

macro_rules! impl_sample {
    ($ty:ty, $method:ident) => {
        impl Sample for $ty {
            fn time(&self) -> f64 {
                self.time
            }

            fn set_time(&mut self, time: f64) {
                self.time = time;
            }

            fn interpolate(interpolator: &dyn Interpolator, prev: &Self, next: &Self, time: f64) -> Option<Self> {
                interpolator.$method(prev, next, time)
            }
        }
    };
}

impl_sample!(PlatformUpdate, interpolate_platform);
impl_sample!(BeamUpdate, interpolate_beam);
impl_sample!(GateUpdate, interpolate_gate);
impl_sample!(LaserUpdate, interpolate_laser);
impl_sample!(ProjectorUpdate, interpolate_projector);

impl Sample for LobGroupUpdate {
    fn time(&self) -> f64 {
        self.time
    }

    fn set_time(&mut self, time: f64) {
        self.time = time;
    }

    /// All data points of the window, oldest first, stamped with the newest update's time.
    fn compose(window: &[Self], _time: f64) -> Option<Self> {
        let last = window.last()?;
        Some(Self {
            time: last.time,
            datapoints: window.iter().flat_map(|u| u.datapoints.iter().cloned()).collect(),
        })
    }
}

impl Sample for NoUpdate {
    fn time(&self) -> f64 {
        match *self {}
    }

    fn set_time(&mut self, _time: f64) {
        match *self {}
    }
}

/// Index of the first element whose time is greater than `time`.
pub(crate) fn upper_bound<T>(items: &[T], time: f64, time_of: impl Fn(&T) -> f64) -> usize {
    items.partition_point(|item| time_of(item) <= time)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::LobPoint;

    #[test]
    fn test_upper_bound() {
        let times = [1.0, 2.0, 2.0, 5.0];
        assert_eq!(upper_bound(&times, 0.5, |t| *t), 0);
        assert_eq!(upper_bound(&times, 2.0, |t| *t), 3);
        assert_eq!(upper_bound(&times, 9.0, |t| *t), 4);
    }

    #[test]
    fn test_lob_compose_flattens_window() {
        let point = |t: f64| LobPoint {
            time: t,
            ..LobPoint::default()
        };
        let window = vec![
            LobGroupUpdate {
                time: 1.0,
                datapoints: vec![point(1.0)],
            },
            LobGroupUpdate {
                time: 2.0,
                datapoints: vec![point(2.0), point(2.0)],
            },
        ];
        let composed = LobGroupUpdate::compose(&window, 2.5).unwrap();
        assert_eq!(composed.time, 2.0);
        assert_eq!(composed.datapoints.len(), 3);
        assert!(LobGroupUpdate::compose(&[], 2.5).is_none());
    }
}
