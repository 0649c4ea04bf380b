//! Lighting module — backup, override, and restore of host light state
//! around the scope pass.

mod scene_state_guard;

pub use scene_state_guard::{AmbientSnapshot, LightSnapshot, LightSyncReport, SceneStateGuard};
