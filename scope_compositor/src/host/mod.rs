//! Host module — the contract between the compositor and the host renderer.
//!
//! The compositor owns none of these objects. They describe the device, the
//! render targets, the lights, and the cameras of a single-camera renderer.

mod device;
mod light_root;
mod lighting;
mod renderer;
mod texture;

#[cfg(test)]
pub(crate) mod mock_host;

pub use device::{
    BlendState, CompareOp, DepthStencilState, GraphicsDevice, PipelineState,
    PrimitiveTopology, RasterizerState, ScopeCompositeConstants, ShaderProgram,
    StencilMergeConstants, StencilTest, Viewport,
};
pub use light_root::LightRoot;
pub use lighting::{
    AmbientState, CameraId, CullFlag, CullingProcessId, Light, LightKey, LightKind,
    LightState, SceneLighting, VisibilityCounters,
};
pub use renderer::{
    FrameTargets, HostRenderer, OutputSlot, RenderTargetId, ScopeGeometry, ViewProjection,
};
pub use texture::{Texture, TextureDesc, TextureFormat, TextureId, TextureInfo, TextureUsage};
