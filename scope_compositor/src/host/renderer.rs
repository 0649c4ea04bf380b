/// HostRenderer trait - the single-camera renderer the compositor drives
///
/// The host calls the compositor from inside its own draw sequence and hands
/// over itself through this trait. Everything reachable from here is
/// host-owned: the compositor borrows it for one frame and must leave it
/// as it found it.

use std::fmt;
use std::sync::Arc;
use glam::{Mat4, Vec3};
use crate::camera::CameraState;
use crate::error::Result;
use super::device::{GraphicsDevice, Viewport};
use super::lighting::{CameraId, SceneLighting};
use super::texture::Texture;

/// Intermediate render targets shared between the primary and secondary pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RenderTargetId {
    Normals,
    Albedo,
    Emissive,
    Material,
    AmbientOcclusion,
    MotionVectors,
    DepthMip,
    Mask,
    DeferredDiffuse,
    DeferredSpecular,
    /// Host-specific target addressed by its raw index
    Custom(u32),
}

impl fmt::Display for RenderTargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderTargetId::Custom(index) => write!(f, "Custom({})", index),
            other => write!(f, "{:?}", other),
        }
    }
}

/// The live targets of the current frame. Re-acquired every frame.
#[derive(Debug, Clone)]
pub struct FrameTargets {
    pub back_buffer: Arc<dyn Texture>,
    pub main_color: Arc<dyn Texture>,
    pub main_depth_stencil: Arc<dyn Texture>,
}

/// Cached camera-dependent matrices the host's shaders read
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewProjection {
    pub view: Mat4,
    pub projection: Mat4,
    pub view_projection: Mat4,
    pub eye_position: Vec3,
}

impl Default for ViewProjection {
    fn default() -> Self {
        Self {
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            view_projection: Mat4::IDENTITY,
            eye_position: Vec3::ZERO,
        }
    }
}

/// Index range of the on-screen quad representing the optical device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeGeometry {
    pub index_count: u32,
    pub first_index: u32,
    pub vertex_offset: i32,
}

/// Output slot expected by an active upscaling / frame-generation collaborator
#[derive(Debug, Clone)]
pub struct OutputSlot {
    pub target: Arc<dyn Texture>,
    pub viewport: Viewport,
}

/// The host renderer contract
pub trait HostRenderer {
    /// Current device/context, `None` while the host has no device
    fn device(&mut self) -> Option<&mut dyn GraphicsDevice>;

    /// Live back buffer and primary color/depth targets of this frame
    fn frame_targets(&self) -> Option<FrameTargets>;

    /// A shared intermediate target
    fn render_target(&self, id: RenderTargetId) -> Option<Arc<dyn Texture>>;

    /// Clone of the primary camera's current state, `None` if the clone failed
    fn clone_primary_camera(&self) -> Option<CameraState>;

    /// The host's first-person camera object, if it exists yet
    fn first_person_camera(&self) -> Option<CameraId>;

    /// The camera the host is currently rendering from
    fn current_camera(&self) -> Option<CameraState>;

    /// Point the host's global "current camera" at `camera`
    fn set_current_camera(&mut self, camera: CameraState);

    /// Camera-dependent cached matrices
    fn view_projection(&self) -> ViewProjection;

    /// Overwrite the camera-dependent cached matrices
    fn set_view_projection(&mut self, cache: ViewProjection);

    /// Light/shadow root, `None` while unavailable
    fn scene_lighting(&mut self) -> Option<&mut dyn SceneLighting>;

    /// Eye position used by the light accumulator
    fn accumulator_eye_position(&self) -> Vec3;

    /// Overwrite the accumulator eye position
    fn set_accumulator_eye_position(&mut self, eye: Vec3);

    /// Run the host's own single-camera "draw the world" entry point
    fn draw_world(&mut self) -> Result<()>;

    /// Scope quad geometry, bound on the device when returned
    fn scope_geometry(&mut self) -> Option<ScopeGeometry>;

    /// Output slot of an active upscaler, `None` for the default back buffer
    fn upscaler_output(&self) -> Option<OutputSlot>;
}
