/// GlobalRenderState — flags and default geometry of both cameras.
///
/// Init-once / reset-explicit: `initialize()` populates the default view
/// volumes and viewports, `reset()` returns every field to the zeroed state.
/// The orchestrator owns the single instance and mutates it during a pass.
/// Nothing here touches the GPU.

use bitflags::bitflags;
use crate::camera::ViewVolume;
use crate::host::{CameraId, HostRenderer, Viewport};

/// Field of view the scope camera starts with, in degrees
pub const DEFAULT_SCOPE_FOV_DEGREES: f32 = 20.0;

/// Edge length of the square scope texture before quality scaling
pub const DEFAULT_SCOPE_TEXTURE_SIZE: u32 = 1024;

const DEFAULT_PRIMARY_WIDTH: u32 = 1920;
const DEFAULT_PRIMARY_HEIGHT: u32 = 1080;

bitflags! {
    /// Process-wide compositor flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct RenderFlags: u32 {
        /// Pipeline enabled by the UI / input collaborators
        const RENDER_READY      = 1 << 0;
        /// Scope camera and resources are set up
        const SCOPE_READY       = 1 << 1;
        /// At least one first-pass copy has completed
        const FIRST_COPY_DONE   = 1 << 2;
        /// Control panel finished its own setup
        const UI_INITIALIZED    = 1 << 3;
        /// First frame after the player (re)spawned
        const FIRST_SPAWN       = 1 << 4;
        /// Host anti-aliasing is active
        const AA_ENABLED        = 1 << 5;
        /// Skip the primary composite and show only the scope render
        const RENDER_SCOPE_ONLY = 1 << 6;
        /// Primary view volume was captured this frame
        const FRUSTUM_BACKED_UP = 1 << 7;
    }
}

/// Flags and default geometry describing the primary and scope cameras
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalRenderState {
    flags: RenderFlags,
    primary_view_volume: ViewVolume,
    scope_view_volume: ViewVolume,
    primary_viewport: Viewport,
    scope_viewport: Viewport,
    first_person_camera: Option<CameraId>,
}

fn zero_volume() -> ViewVolume {
    ViewVolume { near: 0.0, far: 0.0, left: 0.0, right: 0.0, top: 0.0, bottom: 0.0 }
}

impl GlobalRenderState {
    /// Zeroed state. Call `initialize()` before the first frame.
    pub fn new() -> Self {
        Self {
            flags: RenderFlags::empty(),
            primary_view_volume: zero_volume(),
            scope_view_volume: zero_volume(),
            primary_viewport: Viewport::default(),
            scope_viewport: Viewport::default(),
            first_person_camera: None,
        }
    }

    /// Populate default geometry and try to capture the host's first-person camera.
    ///
    /// A missing camera is logged, not fatal: it usually appears a few frames
    /// after the host finishes loading.
    pub fn initialize(&mut self, host: &dyn HostRenderer) {
        let primary = ViewVolume::default();
        self.primary_view_volume = primary;
        self.scope_view_volume = ViewVolume::from_fov(
            DEFAULT_SCOPE_FOV_DEGREES,
            primary.aspect(),
            primary.near,
            primary.far,
        );
        self.primary_viewport = Viewport::full(DEFAULT_PRIMARY_WIDTH, DEFAULT_PRIMARY_HEIGHT);
        self.scope_viewport = Viewport::full(DEFAULT_SCOPE_TEXTURE_SIZE, DEFAULT_SCOPE_TEXTURE_SIZE);

        self.first_person_camera = host.first_person_camera();
        match self.first_person_camera {
            Some(camera) => crate::scope_info!("scope::GlobalRenderState",
                "Captured first-person camera {:?}", camera),
            None => crate::scope_warn!("scope::GlobalRenderState",
                "First-person camera not available yet"),
        }
    }

    /// Zero every flag and geometry value. Idempotent.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    // ===== FLAGS =====

    /// All flags
    pub fn flags(&self) -> RenderFlags {
        self.flags
    }

    fn set_flag(&mut self, flag: RenderFlags, value: bool) {
        self.flags.set(flag, value);
    }

    pub fn is_render_ready(&self) -> bool {
        self.flags.contains(RenderFlags::RENDER_READY)
    }

    pub fn set_render_ready(&mut self, value: bool) {
        self.set_flag(RenderFlags::RENDER_READY, value);
    }

    pub fn is_scope_ready(&self) -> bool {
        self.flags.contains(RenderFlags::SCOPE_READY)
    }

    pub fn set_scope_ready(&mut self, value: bool) {
        self.set_flag(RenderFlags::SCOPE_READY, value);
    }

    pub fn is_first_copy_done(&self) -> bool {
        self.flags.contains(RenderFlags::FIRST_COPY_DONE)
    }

    pub fn set_first_copy_done(&mut self, value: bool) {
        self.set_flag(RenderFlags::FIRST_COPY_DONE, value);
    }

    pub fn is_ui_initialized(&self) -> bool {
        self.flags.contains(RenderFlags::UI_INITIALIZED)
    }

    pub fn set_ui_initialized(&mut self, value: bool) {
        self.set_flag(RenderFlags::UI_INITIALIZED, value);
    }

    pub fn is_first_spawn(&self) -> bool {
        self.flags.contains(RenderFlags::FIRST_SPAWN)
    }

    pub fn set_first_spawn(&mut self, value: bool) {
        self.set_flag(RenderFlags::FIRST_SPAWN, value);
    }

    pub fn is_aa_enabled(&self) -> bool {
        self.flags.contains(RenderFlags::AA_ENABLED)
    }

    pub fn set_aa_enabled(&mut self, value: bool) {
        self.set_flag(RenderFlags::AA_ENABLED, value);
    }

    pub fn is_render_scope_only(&self) -> bool {
        self.flags.contains(RenderFlags::RENDER_SCOPE_ONLY)
    }

    pub fn set_render_scope_only(&mut self, value: bool) {
        self.set_flag(RenderFlags::RENDER_SCOPE_ONLY, value);
    }

    pub fn is_frustum_backed_up(&self) -> bool {
        self.flags.contains(RenderFlags::FRUSTUM_BACKED_UP)
    }

    pub fn set_frustum_backed_up(&mut self, value: bool) {
        self.set_flag(RenderFlags::FRUSTUM_BACKED_UP, value);
    }

    // ===== GEOMETRY =====

    pub fn primary_view_volume(&self) -> &ViewVolume {
        &self.primary_view_volume
    }

    pub fn set_primary_view_volume(&mut self, volume: ViewVolume) {
        self.primary_view_volume = volume;
    }

    pub fn scope_view_volume(&self) -> &ViewVolume {
        &self.scope_view_volume
    }

    pub fn set_scope_view_volume(&mut self, volume: ViewVolume) {
        self.scope_view_volume = volume;
    }

    pub fn primary_viewport(&self) -> &Viewport {
        &self.primary_viewport
    }

    pub fn set_primary_viewport(&mut self, viewport: Viewport) {
        self.primary_viewport = viewport;
    }

    pub fn scope_viewport(&self) -> &Viewport {
        &self.scope_viewport
    }

    pub fn set_scope_viewport(&mut self, viewport: Viewport) {
        self.scope_viewport = viewport;
    }

    /// First-person camera captured at initialization
    pub fn first_person_camera(&self) -> Option<CameraId> {
        self.first_person_camera
    }
}

impl Default for GlobalRenderState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "global_render_state_tests.rs"]
mod tests;
