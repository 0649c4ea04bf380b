/// LightRoot — a `SceneLighting` implementation backed by a SlotMap
///
/// Hosts that do not expose their own light storage can mirror it into a
/// LightRoot. Removing a light invalidates its key immediately; the key may
/// stay in its list until `prune_lists()` runs, exactly like a host that
/// compacts its lists lazily.

use slotmap::SlotMap;
use crate::error::{Error, Result};
use super::lighting::{
    AmbientState, Light, LightKey, LightState, SceneLighting, VisibilityCounters,
};

/// Light storage with generational handles
#[derive(Debug, Default)]
pub struct LightRoot {
    lights: SlotMap<LightKey, Light>,
    lists: Vec<Vec<LightKey>>,
    counters: VisibilityCounters,
    ambient: AmbientState,
}

impl LightRoot {
    /// Create an empty root
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a light into list `list_index`, creating lists as needed
    pub fn insert_light(&mut self, list_index: usize, light: Light) -> LightKey {
        let key = self.lights.insert(light);
        if self.lists.len() <= list_index {
            self.lists.resize_with(list_index + 1, Vec::new);
        }
        self.lists[list_index].push(key);
        key
    }

    /// Delete a light. Its key becomes stale at once.
    pub fn remove_light(&mut self, key: LightKey) -> Option<Light> {
        self.lights.remove(key)
    }

    /// Drop stale keys from every list
    pub fn prune_lists(&mut self) {
        let lights = &self.lights;
        for list in &mut self.lists {
            list.retain(|key| lights.contains_key(*key));
        }
    }

    /// Number of live lights
    pub fn light_count(&self) -> usize {
        self.lights.len()
    }
}

impl SceneLighting for LightRoot {
    fn light_lists(&self) -> &[Vec<LightKey>] {
        &self.lists
    }

    fn light(&self, key: LightKey) -> Result<Light> {
        self.lights
            .get(key)
            .copied()
            .ok_or_else(|| Error::InvalidObject(format!("light {:?} is no longer alive", key)))
    }

    fn set_light_state(&mut self, key: LightKey, state: &LightState) -> Result<()> {
        let light = self
            .lights
            .get_mut(key)
            .ok_or_else(|| Error::InvalidObject(format!("light {:?} is no longer alive", key)))?;
        light.state = *state;
        Ok(())
    }

    fn visibility_counters(&self) -> VisibilityCounters {
        self.counters
    }

    fn set_visibility_counters(&mut self, counters: VisibilityCounters) {
        self.counters = counters;
    }

    fn ambient_state(&self) -> AmbientState {
        self.ambient
    }

    fn set_ambient_state(&mut self, state: &AmbientState) {
        self.ambient = *state;
    }
}

#[cfg(test)]
#[path = "light_root_tests.rs"]
mod tests;
