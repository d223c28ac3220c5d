//! The time-update engine.
//!
//! `update(time)` walks the containers in dependency order: platforms, then
//! beams (target beams read platform positions), then gates (target gates read
//! their beam), then generic and category data, then lasers, projectors, LOB
//! groups and custom renderings. Observers may change the store from inside
//! command-driven preference callbacks, so every pass iterates over an id
//! snapshot and re-resolves each entry.

use log::{error, trace, warn};

use crate::id::ObjectId;
use crate::interpolate::Interpolator;
use crate::notify::StoreEvent;
use crate::schema::{BeamType, BeamUpdate, EntityProperties, GateType};
use crate::slice::SliceWindow;
use crate::time::STATIC_TIME;

use super::{Beam, CustomRendering, EntityKind, Entry, Gate, Laser, LobGroup, MemoryDataStore, Platform, Projector};

impl MemoryDataStore {
    /// Advances every entity to `time` and notifies observers.
    ///
    /// Calling it again with the same time and no change in between does
    /// nothing.
    pub fn update(&mut self, time: f64) {
        if !self.has_changed && time == self.last_update_time {
            trace!("update({time}) skipped; nothing changed");
            return;
        }

        self.update_platforms(time);
        self.update_beams(time);
        self.update_gates(time);
        self.update_generic_data(time);
        self.update_category_data(time);
        self.update_lasers(time);
        self.update_projectors(time);
        self.update_lob_groups(time);
        self.update_custom_renderings(time);

        self.last_update_time = time;
        self.has_changed = false;
        self.notify(&[StoreEvent::Change]);
    }

    fn ids_of<K: EntityKind>(&self) -> Vec<ObjectId> {
        K::container(&self.entities).keys().copied().collect()
    }

    /// Applies the commands crossed since the last update as a preferences commit.
    fn apply_commands<K: EntityKind>(&mut self, id: ObjectId, time: f64) {
        let Some(entry) = self.entry_mut::<K>(id) else {
            return;
        };
        let Some(patch) = entry.commands.update(time) else {
            return;
        };
        let mut prefs = entry.prefs.clone();
        if let Err(err) = patch.apply_to(&mut prefs) {
            warn!("command for {id} at {time} not applied: {err}");
            return;
        }
        let effects = self.commit_prefs::<K>(id, &prefs);
        self.release_prefs(id, effects);
    }

    fn update_platforms(&mut self, time: f64) {
        let file_mode = self.is_file_mode();
        let interpolator = self.active_interpolator();
        for id in self.ids_of::<Platform>() {
            self.apply_commands::<Platform>(id, time);
            let Some(entry) = self.entry_mut::<Platform>(id) else {
                continue;
            };
            if !entry.prefs.common.data_draw {
                entry.updates.set_current(None);
                continue;
            }
            if file_mode && is_expired(entry, time) {
                entry.updates.set_current(None);
                continue;
            }
            let interpolator = interpolator.as_deref().filter(|_| entry.prefs.interpolate_pos);
            entry.updates.update_with(time, interpolator);
        }
    }

    fn update_beams(&mut self, time: f64) {
        let interpolator = self.active_interpolator();
        for id in self.ids_of::<Beam>() {
            self.apply_commands::<Beam>(id, time);
            let Some(entry) = self.entry_mut::<Beam>(id) else {
                continue;
            };
            if !entry.prefs.common.data_draw {
                entry.updates.set_current(None);
                continue;
            }
            if entry.properties.beam_type == BeamType::Target {
                self.update_target_beam(id, time);
                continue;
            }
            let interpolator = interpolator.as_deref().filter(|_| entry.prefs.interpolate_beam_pos);
            entry.updates.update_with(time, interpolator);
        }
    }

    /// Host and target platforms of a target beam, if both have a current position.
    fn target_pair(&self, beam: ObjectId) -> Option<(ObjectId, ObjectId)> {
        let entry = self.entry::<Beam>(beam)?;
        let host = entry.properties.host_id()?;
        let target = entry.prefs.target_id?;
        (self.has_position(host) && self.has_position(target)).then_some((host, target))
    }

    fn has_position(&self, platform: ObjectId) -> bool {
        self.entry::<Platform>(platform)
            .and_then(|entry| entry.updates.current())
            .is_some_and(|update| update.position.is_some())
    }

    fn update_target_beam(&mut self, id: ObjectId, time: f64) {
        let valid = self.target_pair(id).is_some();
        let Some(entry) = self.entry_mut::<Beam>(id) else {
            return;
        };
        if !valid {
            entry.updates.set_current(None);
            return;
        }
        let stale = entry.updates.current().is_none()
            || entry.updates.published().map(|sample| sample.time) != Some(time);
        if stale {
            // pointing is derived downstream from the two platform positions
            entry.updates.publish(BeamUpdate {
                time,
                ..BeamUpdate::default()
            });
        } else {
            entry.updates.clear_changed();
        }
    }

    fn update_gates(&mut self, time: f64) {
        let interpolator = self.active_interpolator();
        for id in self.ids_of::<Gate>() {
            self.apply_commands::<Gate>(id, time);
            let Some(entry) = self.entry_mut::<Gate>(id) else {
                continue;
            };
            if !entry.prefs.common.data_draw {
                entry.updates.set_current(None);
                continue;
            }
            let interpolator = interpolator.as_deref().filter(|_| entry.prefs.interpolate_gate_pos);
            if entry.properties.gate_type == GateType::Target {
                self.update_target_gate(id, time, interpolator);
                continue;
            }
            entry.updates.update_with(time, interpolator);
            if uses_beam_beamwidth(entry) {
                entry.updates.set_changed();
            }
        }
    }

    fn update_target_gate(&mut self, id: ObjectId, time: f64, interpolator: Option<&dyn Interpolator>) {
        let beam = self.entry::<Gate>(id).and_then(|gate| gate.properties.host_id());
        let host_is_target_beam = beam
            .and_then(|beam| self.entry::<Beam>(beam))
            .is_some_and(|beam| beam.properties.beam_type == BeamType::Target);
        if !host_is_target_beam {
            debug_assert!(false, "target gate {id} is not hosted by a target beam");
            error!("target gate {id} is not hosted by a target beam");
            if let Some(gate) = self.entry_mut::<Gate>(id) {
                gate.updates.set_current(None);
            }
            return;
        }
        let valid = beam.and_then(|beam| self.target_pair(beam)).is_some();

        let Some(gate) = self.entry_mut::<Gate>(id) else {
            return;
        };
        if !valid {
            gate.updates.set_current(None);
            return;
        }
        let was_off = gate.updates.current().is_none();
        let last_published = gate.updates.published().map(|sample| sample.time);

        // ranges come from the gate's own time series
        gate.updates.update_with(time, interpolator);
        let Some(current) = gate.updates.current() else {
            return;
        };
        if was_off || last_published != Some(time) || uses_beam_beamwidth(gate) {
            let mut sample = current.clone();
            sample.time = time;
            sample.azimuth = 0.0;
            sample.elevation = 0.0;
            gate.updates.publish(sample);
        } else {
            gate.updates.restore_published();
            gate.updates.clear_changed();
        }
    }

    fn update_generic_data(&mut self, time: f64) {
        for slice in self.generic_data.values_mut() {
            slice.update(time);
        }
    }

    fn update_category_data(&mut self, time: f64) {
        let ids: Vec<ObjectId> = self.category_data.keys().copied().collect();
        for id in ids {
            let changed = self
                .category_data
                .get_mut(&id)
                .is_some_and(|slice| slice.update(time));
            if changed {
                let kind = self.object_type(id);
                self.notify(&[StoreEvent::CategoryDataChange { id, kind }]);
            }
        }
    }

    fn update_lasers(&mut self, time: f64) {
        let interpolator = self.active_interpolator();
        for id in self.ids_of::<Laser>() {
            self.apply_commands::<Laser>(id, time);
            let Some(entry) = self.entry_mut::<Laser>(id) else {
                continue;
            };
            if !entry.prefs.common.data_draw {
                entry.updates.set_current(None);
                continue;
            }
            entry.updates.update_with(time, interpolator.as_deref());
        }
    }

    fn update_projectors(&mut self, time: f64) {
        let interpolator = self.active_interpolator();
        for id in self.ids_of::<Projector>() {
            self.apply_commands::<Projector>(id, time);
            let Some(entry) = self.entry_mut::<Projector>(id) else {
                continue;
            };
            let interpolator = interpolator
                .as_deref()
                .filter(|_| entry.prefs.interpolate_projector_fov);
            entry.updates.update_with(time, interpolator);
        }
    }

    fn update_lob_groups(&mut self, time: f64) {
        for id in self.ids_of::<LobGroup>() {
            self.apply_commands::<LobGroup>(id, time);
            let Some(entry) = self.entry_mut::<LobGroup>(id) else {
                continue;
            };
            // the window preferences may change between ticks
            let window = SliceWindow {
                max_points: entry.prefs.max_data_points as usize,
                max_seconds: entry.prefs.max_data_seconds,
            };
            entry.updates.set_window(Some(window));
            entry.updates.update(time);
        }
    }

    fn update_custom_renderings(&mut self, time: f64) {
        for id in self.ids_of::<CustomRendering>() {
            self.apply_commands::<CustomRendering>(id, time);
        }
    }
}

/// In file mode a non-static platform only exists between its first and last update.
fn is_expired(entry: &Entry<Platform>, time: f64) -> bool {
    let first = entry.updates.first_time();
    first != STATIC_TIME && (time < first || time > entry.updates.last_time())
}

/// A gate without its own extents is drawn with its beam's width.
fn uses_beam_beamwidth(gate: &Entry<Gate>) -> bool {
    gate.properties.host_id().is_some()
        && gate
            .updates
            .current()
            .is_some_and(|update| update.height <= 0.0 || update.width <= 0.0)
}
