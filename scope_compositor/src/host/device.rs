/// GraphicsDevice trait - the immediate-mode device/context of the host
///
/// The compositor never creates its own device. Every command goes through
/// the host's device on the host's render thread, in submission order.

use std::sync::Arc;
use bytemuck::{Pod, Zeroable};
use crate::error::Result;
use super::texture::{Texture, TextureDesc, TextureId};

// ============================================================================
// Fixed-function state
// ============================================================================

/// Viewport dimensions and depth range
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

impl Viewport {
    /// Full-target viewport for a `width` x `height` surface
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: width as f32,
            height: height as f32,
            min_depth: 0.0,
            max_depth: 1.0,
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::full(0, 0)
    }
}

/// Comparison function for depth and stencil tests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Never,
    Less,
    Equal,
    LessOrEqual,
    Greater,
    NotEqual,
    GreaterOrEqual,
    Always,
}

impl CompareOp {
    /// Evaluate `value <op> reference`
    pub fn evaluate(&self, value: u8, reference: u8) -> bool {
        match self {
            CompareOp::Never => false,
            CompareOp::Less => value < reference,
            CompareOp::Equal => value == reference,
            CompareOp::LessOrEqual => value <= reference,
            CompareOp::Greater => value > reference,
            CompareOp::NotEqual => value != reference,
            CompareOp::GreaterOrEqual => value >= reference,
            CompareOp::Always => true,
        }
    }
}

/// Read-only stencil test
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StencilTest {
    pub compare: CompareOp,
    pub reference: u8,
    pub read_mask: u8,
}

/// Depth/stencil state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DepthStencilState {
    pub depth_test: bool,
    pub depth_write: bool,
    pub stencil: Option<StencilTest>,
}

impl DepthStencilState {
    /// Depth disabled, stencil passes where the stored value differs from `sentinel`
    pub fn stencil_not_equal(sentinel: u8) -> Self {
        Self {
            depth_test: false,
            depth_write: false,
            stencil: Some(StencilTest {
                compare: CompareOp::NotEqual,
                reference: sentinel,
                read_mask: 0xFF,
            }),
        }
    }
}

/// Blend state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendState {
    /// Source replaces destination
    #[default]
    Opaque,
    /// Source-over alpha blending
    AlphaBlend,
}

/// Rasterizer state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RasterizerState {
    pub cull_back_faces: bool,
    pub scissor_enable: bool,
}

impl Default for RasterizerState {
    fn default() -> Self {
        Self { cull_back_faces: true, scissor_enable: false }
    }
}

/// Primitive topology
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrimitiveTopology {
    #[default]
    TriangleList,
    TriangleStrip,
}

/// Fragment programs the compositor binds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderProgram {
    /// Full-screen triangle copying shader resource 0 texel-for-texel
    FullscreenCopy,
    /// Full-screen triangle for reduced-resolution targets.
    ///
    /// Resource 0 is the backup, resource 1 the full-resolution depth-stencil.
    /// Reads `StencilMergeConstants` from push constants, samples the stencil
    /// at `texel * texel_scale`, discards where it equals the sentinel and
    /// writes the backup texel everywhere else.
    StencilResolveMerge,
    /// Textured scope quad; resource 0 is the scope texture
    ScopeComposite,
    /// Collaborator-supplied program (tonemap, thermal, night vision)
    External(u32),
}

/// Push constants of `ShaderProgram::StencilResolveMerge`
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct StencilMergeConstants {
    pub sentinel: u32,
    pub texel_scale: u32,
    pub _pad: [u32; 2],
}

/// Push constants of `ShaderProgram::ScopeComposite`
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ScopeCompositeConstants {
    /// Output viewport (x, y, width, height)
    pub viewport: [f32; 4],
    /// Scope texture size in texels (width, height) and 1/width, 1/height
    pub texel_size: [f32; 4],
}

/// Every piece of fixed-function state the compositor touches
///
/// Captured with `GraphicsDevice::pipeline_state()` before a block of work and
/// put back with `set_pipeline_state()` afterwards.
#[derive(Debug, Clone, Default)]
pub struct PipelineState {
    pub render_targets: Vec<Arc<dyn Texture>>,
    pub depth_stencil_view: Option<Arc<dyn Texture>>,
    pub viewport: Viewport,
    pub blend: BlendState,
    pub depth_stencil: DepthStencilState,
    pub rasterizer: RasterizerState,
    pub topology: PrimitiveTopology,
    pub program: Option<ShaderProgram>,
    pub shader_resources: Vec<Arc<dyn Texture>>,
}

impl PipelineState {
    /// Compare two states by value, textures by identity
    pub fn same_as(&self, other: &PipelineState) -> bool {
        fn ids(list: &[Arc<dyn Texture>]) -> Vec<TextureId> {
            list.iter().map(|t| t.id()).collect()
        }
        ids(&self.render_targets) == ids(&other.render_targets)
            && self.depth_stencil_view.as_ref().map(|t| t.id())
                == other.depth_stencil_view.as_ref().map(|t| t.id())
            && self.viewport == other.viewport
            && self.blend == other.blend
            && self.depth_stencil == other.depth_stencil
            && self.rasterizer == other.rasterizer
            && self.topology == other.topology
            && self.program == other.program
            && ids(&self.shader_resources) == ids(&other.shader_resources)
    }
}

// ============================================================================
// GraphicsDevice trait
// ============================================================================

/// Immediate-mode device/context of the host renderer
pub trait GraphicsDevice {
    /// Create a texture
    fn create_texture(&mut self, desc: TextureDesc) -> Result<Arc<dyn Texture>>;

    /// Copy the whole of `src` into `dst`
    ///
    /// # Errors
    ///
    /// `SizeMismatch` if the two resources differ in extent or format.
    fn copy_texture(&mut self, dst: &Arc<dyn Texture>, src: &Arc<dyn Texture>) -> Result<()>;

    /// Clear a color target
    fn clear_render_target(&mut self, target: &Arc<dyn Texture>, color: [f32; 4]) -> Result<()>;

    /// Clear a depth-stencil target
    fn clear_depth_stencil(&mut self, target: &Arc<dyn Texture>, depth: f32, stencil: u8) -> Result<()>;

    /// Snapshot of the currently bound fixed-function state
    fn pipeline_state(&self) -> PipelineState;

    /// Bind a complete fixed-function state
    fn set_pipeline_state(&mut self, state: &PipelineState);

    /// Upload push constants for the next draw
    fn push_constants(&mut self, data: &[u8]) -> Result<()>;

    /// Draw non-indexed vertices (3 vertices = full-screen triangle)
    fn draw(&mut self, vertex_count: u32, first_vertex: u32) -> Result<()>;

    /// Draw indexed vertices from the currently bound geometry
    fn draw_indexed(&mut self, index_count: u32, first_index: u32, vertex_offset: i32) -> Result<()>;
}
