/*!
# Scope Compositor

Dual-pass scope rendering on top of a single-camera host renderer.

The host renders its frame once for the primary camera. The compositor then
re-renders the scene from a magnified scope camera into the same targets,
stitches the first-pass pixels back around the scope region with a
stencil-driven merge, and composites the scope image onto the scope lens.

## Architecture

- **PassOrchestrator**: per-frame state machine driving both passes
- **GlobalRenderState**: flags and viewport geometry shared by the passes
- **SceneStateGuard**: backup, override, and restore of host light state
- **AuxiliaryFrustumCuller**: visibility test against the scope frustum
- **RegionMerger**: render-target backups and the stencil region merge
- **DeferredSetup**: delayed, cancellable setup off the render thread

The host is reached only through the traits of the `host` module.
*/

// Internal modules
mod error;
mod engine;
mod config;
pub mod log;
pub mod host;
pub mod camera;
pub mod state;
pub mod culling;
pub mod lighting;
pub mod merge;
pub mod orchestrator;
pub mod setup;

// Main scope3d namespace module
pub mod scope3d {
    // Error types
    pub use crate::error::{Error, Result};

    // Engine singleton
    pub use crate::engine::Engine;

    // Configuration
    pub use crate::config::{
        default_merge_targets, CompositorConfig, MergeTargetDesc, QualityPreset, ScopeRegion,
        TargetResolution, FLAT_NORMAL,
    };

    // Frame driver
    pub use crate::orchestrator::{FrameOutcome, FrameReport, PassOrchestrator, PassState};

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
    }

    // Host contract sub-module
    pub mod host {
        pub use crate::host::*;
    }

    // Camera sub-module
    pub mod camera {
        pub use crate::camera::*;
    }

    // Render state sub-module
    pub mod state {
        pub use crate::state::*;
    }

    // Culling sub-module
    pub mod culling {
        pub use crate::culling::*;
    }

    // Lighting sub-module
    pub mod lighting {
        pub use crate::lighting::*;
    }

    // Merge sub-module
    pub mod merge {
        pub use crate::merge::*;
    }

    // Orchestrator sub-module
    pub mod orchestrator {
        pub use crate::orchestrator::*;
    }

    // Deferred setup sub-module
    pub mod setup {
        pub use crate::setup::*;
    }
}

// Re-export math library at crate root
pub use glam;
