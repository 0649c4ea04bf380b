//! Orchestrator module — the per-frame scope pass state machine and the
//! resources it owns for the duration of a frame.

mod frame_textures;
mod pass_orchestrator;
mod pass_state;
mod post_process;
mod scope_camera;

pub use frame_textures::{scope_extent, FrameTexture, TemporaryFrameTextures};
pub use pass_orchestrator::{FrameOutcome, FrameReport, PassOrchestrator};
pub use pass_state::PassState;
pub use post_process::PostProcessPass;
pub use scope_camera::{Attachment, ScopeCamera};
