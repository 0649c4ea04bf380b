/// SceneStateGuard — keeps the scope pass from leaking into the host's light system.
///
/// Per frame: `backup_light_states()` after the primary pass,
/// `apply_light_states_for_scope()` right before the scope draw,
/// `restore_light_states()` once it returned. Every per-light operation is
/// liveness-checked through `SceneLighting`; a light that fails is logged
/// and counted as skipped, the loop continues.

use rustc_hash::FxHashSet;
use crate::host::{
    AmbientState, CullFlag, LightKey, LightKind, LightState, SceneLighting, VisibilityCounters,
};

const SOURCE: &str = "scope::SceneStateGuard";

/// Original state of one light
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightSnapshot {
    pub key: LightKey,
    pub kind: LightKind,
    pub state: LightState,
}

impl LightSnapshot {
    /// State forced on the light during the scope pass
    fn scope_state(&self) -> LightState {
        LightState {
            cull_flag: CullFlag::FullyVisible,
            occluded: false,
            lod_dimmer: 1.0,
            dynamic: self.kind.is_dynamic(),
            culling_process: self.state.culling_process,
            ..self.state
        }
    }
}

/// Copy of the host's global ambient state
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AmbientSnapshot {
    pub state: AmbientState,
    pub is_valid: bool,
}

/// Outcome of a backup, apply, or restore sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LightSyncReport {
    /// Lights read or written successfully
    pub updated: usize,
    /// Lights that failed the liveness check
    pub skipped: usize,
}

/// Snapshots of the host light system for the current frame
#[derive(Debug, Default)]
pub struct SceneStateGuard {
    lights: Vec<LightSnapshot>,
    counters: VisibilityCounters,
    ambient: AmbientSnapshot,
    backed_up: bool,
}

impl SceneStateGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot every live light of every list and the visibility counters.
    ///
    /// Replaces the previous frame's snapshots. A key listed twice is
    /// recorded once. The ambient state is captured only when no valid
    /// snapshot is cached; it stays cached until `invalidate_ambient_snapshot()`.
    pub fn backup_light_states(&mut self, scene: &dyn SceneLighting) -> LightSyncReport {
        self.lights.clear();
        let mut report = LightSyncReport::default();
        let mut seen: FxHashSet<LightKey> = FxHashSet::default();

        for (list_index, list) in scene.light_lists().iter().enumerate() {
            for &key in list {
                if !seen.insert(key) {
                    continue;
                }
                match scene.light(key) {
                    Ok(light) => {
                        self.lights.push(LightSnapshot { key, kind: light.kind, state: light.state });
                        report.updated += 1;
                    }
                    Err(e) => {
                        crate::scope_warn!(SOURCE,
                            "Skipping light {:?} in list {} during backup: {}", key, list_index, e);
                        report.skipped += 1;
                    }
                }
            }
        }

        self.counters = scene.visibility_counters();
        if !self.ambient.is_valid {
            self.backup_ambient_light_states(scene);
            crate::scope_debug!(SOURCE, "Ambient snapshot captured");
        }
        self.backed_up = true;

        crate::scope_trace!(SOURCE, "Backed up {} lights ({} skipped)", report.updated, report.skipped);
        report
    }

    /// Force every backed-up light visible for the scope pass.
    ///
    /// Applies the ambient snapshot first, then writes the backed-up
    /// visibility counters. With `limit_count`, only the first `max_lights`
    /// snapshots are forced and the rest keep their current state.
    pub fn apply_light_states_for_scope(
        &self,
        scene: &mut dyn SceneLighting,
        limit_count: bool,
        max_lights: usize,
    ) -> LightSyncReport {
        let mut report = LightSyncReport::default();
        if !self.backed_up {
            crate::scope_debug!(SOURCE, "Apply requested before any backup");
            return report;
        }

        self.apply_ambient_light_states(scene);
        scene.set_visibility_counters(self.counters);

        let count = if limit_count { max_lights.min(self.lights.len()) } else { self.lights.len() };
        for snapshot in &self.lights[..count] {
            match scene.set_light_state(snapshot.key, &snapshot.scope_state()) {
                Ok(()) => report.updated += 1,
                Err(e) => {
                    crate::scope_warn!(SOURCE, "Skipping light {:?} during apply: {}", snapshot.key, e);
                    report.skipped += 1;
                }
            }
        }
        report
    }

    /// Write every original light state back, then the counters and the ambient state.
    ///
    /// Safe to call more than once per backup.
    pub fn restore_light_states(&self, scene: &mut dyn SceneLighting) -> LightSyncReport {
        let mut report = LightSyncReport::default();
        if !self.backed_up {
            crate::scope_debug!(SOURCE, "Restore requested before any backup");
            return report;
        }

        for snapshot in &self.lights {
            match scene.set_light_state(snapshot.key, &snapshot.state) {
                Ok(()) => report.updated += 1,
                Err(e) => {
                    crate::scope_warn!(SOURCE, "Skipping light {:?} during restore: {}", snapshot.key, e);
                    report.skipped += 1;
                }
            }
        }
        scene.set_visibility_counters(self.counters);
        self.restore_ambient_light_states(scene);
        report
    }

    /// Copy the host's ambient state into the snapshot
    pub fn backup_ambient_light_states(&mut self, scene: &dyn SceneLighting) {
        self.ambient = AmbientSnapshot { state: scene.ambient_state(), is_valid: true };
    }

    /// Write the snapshot into the host. Returns false without a valid snapshot.
    pub fn apply_ambient_light_states(&self, scene: &mut dyn SceneLighting) -> bool {
        self.write_ambient(scene, "apply")
    }

    /// Write the snapshot back into the host. Returns false without a valid snapshot.
    pub fn restore_ambient_light_states(&self, scene: &mut dyn SceneLighting) -> bool {
        self.write_ambient(scene, "restore")
    }

    /// Drop the cached ambient snapshot so the next backup captures a fresh one
    pub fn invalidate_ambient_snapshot(&mut self) {
        self.ambient.is_valid = false;
    }

    /// Discard the per-frame light snapshots and counters. The cached
    /// ambient snapshot survives.
    pub fn end_frame(&mut self) {
        self.lights.clear();
        self.counters = VisibilityCounters::default();
        self.backed_up = false;
    }

    /// Forget every snapshot
    pub fn clear(&mut self) {
        self.lights.clear();
        self.counters = VisibilityCounters::default();
        self.ambient = AmbientSnapshot::default();
        self.backed_up = false;
    }

    pub fn light_snapshots(&self) -> &[LightSnapshot] {
        &self.lights
    }

    pub fn ambient_snapshot(&self) -> &AmbientSnapshot {
        &self.ambient
    }

    pub fn visibility_counters(&self) -> VisibilityCounters {
        self.counters
    }

    pub fn is_backed_up(&self) -> bool {
        self.backed_up
    }

    fn write_ambient(&self, scene: &mut dyn SceneLighting, operation: &str) -> bool {
        if !self.ambient.is_valid {
            crate::scope_debug!(SOURCE, "Ambient {} skipped, no valid snapshot", operation);
            return false;
        }
        scene.set_ambient_state(&self.ambient.state);
        true
    }
}

#[cfg(test)]
#[path = "scene_state_guard_tests.rs"]
mod tests;
