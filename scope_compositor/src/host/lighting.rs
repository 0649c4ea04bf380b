/// Host lighting model seen through the `SceneLighting` trait
///
/// Lights are host-owned and may be deleted between the moment the
/// compositor snapshots them and the moment it restores them. They are
/// therefore addressed through generational `LightKey` handles: a stale
/// handle fails the liveness check instead of reaching freed memory.

use glam::{Mat4, Vec4};
use slotmap::new_key_type;
use crate::error::Result;

new_key_type! {
    /// Generational handle to a host light
    pub struct LightKey;
}

/// Identity of a host camera object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CameraId(pub u32);

/// Identity of a host culling process (the visibility job a light is attached to)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CullingProcessId(pub u32);

/// Light type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightKind {
    Ambient,
    Directional,
    Point,
    Spot,
}

impl LightKind {
    /// Point and spot lights are accumulated as dynamic lights
    pub fn is_dynamic(&self) -> bool {
        matches!(self, LightKind::Point | LightKind::Spot)
    }
}

/// Per-light visibility result written by the host's culling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CullFlag {
    FullyVisible,
    PartiallyVisible,
    Culled,
}

/// Mutable per-frame state of a light
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightState {
    pub cull_flag: CullFlag,
    pub occluded: bool,
    pub temporary: bool,
    pub dynamic: bool,
    /// Level-of-detail fade factor, 1.0 = no fade
    pub lod_dimmer: f32,
    pub camera: Option<CameraId>,
    pub culling_process: Option<CullingProcessId>,
}

impl Default for LightState {
    fn default() -> Self {
        Self {
            cull_flag: CullFlag::FullyVisible,
            occluded: false,
            temporary: false,
            dynamic: false,
            lod_dimmer: 1.0,
            camera: None,
            culling_process: None,
        }
    }
}

/// A host light as read through `SceneLighting::light`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub kind: LightKind,
    pub state: LightState,
}

/// Counters on the scene root that gate how many lights the accumulator renders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VisibilityCounters {
    pub visible_lights: u32,
    pub visible_shadow_lights: u32,
    pub active_shadow_maps: u32,
}

/// Global ambient-lighting state
///
/// `color_table[axis][sign]` holds the directional ambient coefficient for
/// the positive/negative direction of each world axis.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AmbientState {
    pub color_table: [[Vec4; 2]; 3],
    pub enable_flags: [bool; 2],
    pub transforms: [Mat4; 2],
    pub specular_enabled: bool,
}

/// Host light/shadow root
pub trait SceneLighting {
    /// Every light list attached to the root
    fn light_lists(&self) -> &[Vec<LightKey>];

    /// Read a light
    ///
    /// # Errors
    ///
    /// `InvalidObject` if the handle is stale or the object is not a light.
    fn light(&self, key: LightKey) -> Result<Light>;

    /// Overwrite a light's mutable state
    ///
    /// # Errors
    ///
    /// `InvalidObject` if the handle is stale.
    fn set_light_state(&mut self, key: LightKey, state: &LightState) -> Result<()>;

    /// Visibility counters of the root
    fn visibility_counters(&self) -> VisibilityCounters;

    /// Overwrite the visibility counters
    fn set_visibility_counters(&mut self, counters: VisibilityCounters);

    /// Current global ambient state
    fn ambient_state(&self) -> AmbientState;

    /// Overwrite the global ambient state
    fn set_ambient_state(&mut self, state: &AmbientState);
}
