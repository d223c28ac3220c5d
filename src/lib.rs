//! # simstore - In-memory, time-indexed entity data store
//!
//! simstore holds the entities of a simulation scenario (platforms and the
//! beams, gates, lasers, projectors, LOB groups and custom renderings they
//! host) together with their time-stamped data, and answers "what is the
//! state of everything at time t" for a playback or live-data application.
//!
//! ## Core Concepts
//!
//! - **Entity**: an object with store-assigned id, immutable-ish properties and mutable preferences
//! - **Slice**: the ordered time series of one entity, with a current sample after `update`
//! - **Transaction**: a guard over a scratch copy; commit publishes, drop discards
//! - **Observer**: a weakly held listener notified of adds, removals, preference changes and flushes
//!
//! ## Usage
//!
//! ```rust
//! use simstore::{MemoryDataStore, Platform, PlatformUpdate, Vec3};
//!
//! let mut store = MemoryDataStore::new();
//! let id = store.add_entity::<Platform>().commit();
//!
//! let mut update = store.add_update::<Platform>(id).unwrap();
//! *update = PlatformUpdate::at(5.0, Vec3::new(1.0, 2.0, 3.0));
//! update.commit();
//!
//! store.update(5.0);
//! let current = store.update_slice::<Platform>(id).unwrap().current().unwrap();
//! assert_eq!(current.position, Some(Vec3::new(1.0, 2.0, 3.0)));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Core types
pub mod error;
pub mod id;
pub mod schema;
pub mod time;

// Time series and shared data
pub mod interpolate;
pub mod name_cache;
pub mod slice;
pub mod table;

// The store and its mutation surface
pub mod clock;
pub mod config;
pub mod notify;
pub mod proxy;
pub mod store;
pub mod transaction;

// Re-export primary types at crate root for convenience
pub use clock::{Clock, PlaybackClock};
pub use config::StoreConfig;
pub use error::{StoreError, StoreResult};
pub use id::{ObjectId, ObjectType};
pub use interpolate::{Interpolator, LinearInterpolator};
pub use notify::{DataStoreListener, NewUpdatesListener, ScenarioListener};
pub use proxy::{DataStoreProxy, InternalsMemento};
pub use schema::{
    BeamPrefs, BeamProperties, BeamType, BeamUpdate, CategoryData, Command, CommonPrefs,
    CustomRenderingPrefs, CustomRenderingProperties, DefaultPrefs, GatePrefs, GateProperties,
    GateType, GateUpdate, GenericData, LaserPrefs, LaserProperties, LaserUpdate, LobGroupPrefs,
    LobGroupProperties, LobGroupUpdate, LobPoint, PlatformPrefs, PlatformProperties,
    PlatformUpdate, PrefsPatch, ProjectorPrefs, ProjectorProperties, ProjectorUpdate,
    ScenarioProperties, Vec3,
};
pub use store::{
    Beam, CustomRendering, EntityKind, FlushFields, FlushScope, FlushType, Gate, Laser, LobGroup,
    MemoryDataStore, Platform, Projector,
};
pub use table::{DataTable, TableRow};
pub use time::{FlushRange, TimeBounds, STATIC_TIME};
pub use transaction::{NewEntryTransaction, NewUpdateTransaction};
