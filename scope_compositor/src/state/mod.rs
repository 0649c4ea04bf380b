//! Render state module — flags and default geometry of the compositor.

mod global_render_state;

pub use global_render_state::{
    GlobalRenderState, RenderFlags, DEFAULT_SCOPE_FOV_DEGREES, DEFAULT_SCOPE_TEXTURE_SIZE,
};
