/// Compositor configuration
///
/// Read-only inputs of the pipeline. Loading these from presets on disk is
/// the host's business; the compositor only validates and consumes them.

use glam::Vec3;
use crate::error::{Error, Result};
use crate::host::RenderTargetId;

/// Encoded "flat" normal (0, 0, 1) written into a cleared normal buffer
pub const FLAT_NORMAL: [f32; 4] = [0.5, 0.5, 1.0, 0.0];

/// Normalized sub-rectangle of the scope view the culler restricts itself to
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScopeRegion {
    /// Horizontal center, 0 = left edge, 1 = right edge
    pub center_u: f32,
    /// Vertical center, 0 = top edge, 1 = bottom edge
    pub center_v: f32,
    /// Half-extent in normalized units
    pub radius: f32,
}

/// Resolution of a shared target relative to the primary depth-stencil buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetResolution {
    Full,
    Half,
}

/// A shared target the region merger backs up and merges
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MergeTargetDesc {
    pub id: RenderTargetId,
    pub resolution: TargetResolution,
    /// Value the target is cleared to before the secondary pass
    pub clear_color: [f32; 4],
}

impl MergeTargetDesc {
    pub fn full(id: RenderTargetId) -> Self {
        Self { id, resolution: TargetResolution::Full, clear_color: [0.0; 4] }
    }

    pub fn half(id: RenderTargetId) -> Self {
        Self { id, resolution: TargetResolution::Half, clear_color: [0.0; 4] }
    }

    pub fn with_clear_color(mut self, color: [f32; 4]) -> Self {
        self.clear_color = color;
        self
    }
}

/// Quality presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QualityPreset {
    /// Half-resolution scope texture, no post-process passes
    Performance,
    /// Three-quarter resolution scope texture
    #[default]
    Balanced,
    /// Full resolution scope texture
    Quality,
}

impl QualityPreset {
    /// Scale applied to the scope texture relative to the primary color target
    pub fn resolution_scale(&self) -> f32 {
        match self {
            QualityPreset::Performance => 0.5,
            QualityPreset::Balanced => 0.75,
            QualityPreset::Quality => 1.0,
        }
    }

    /// Whether collaborator post-process passes run
    pub fn runs_post_process(&self) -> bool {
        !matches!(self, QualityPreset::Performance)
    }
}

/// The ten targets shared by both passes
pub fn default_merge_targets() -> Vec<MergeTargetDesc> {
    vec![
        MergeTargetDesc::full(RenderTargetId::Normals).with_clear_color(FLAT_NORMAL),
        MergeTargetDesc::full(RenderTargetId::Albedo),
        MergeTargetDesc::full(RenderTargetId::Emissive),
        MergeTargetDesc::full(RenderTargetId::Material),
        MergeTargetDesc::full(RenderTargetId::AmbientOcclusion),
        MergeTargetDesc::full(RenderTargetId::MotionVectors),
        MergeTargetDesc::half(RenderTargetId::DepthMip),
        MergeTargetDesc::full(RenderTargetId::Mask),
        MergeTargetDesc::half(RenderTargetId::DeferredDiffuse),
        MergeTargetDesc::half(RenderTargetId::DeferredSpecular),
    ]
}

/// Compositor configuration
#[derive(Debug, Clone, PartialEq)]
pub struct CompositorConfig {
    /// Field of view of the scope camera, in degrees
    pub target_fov_degrees: f32,
    /// Offset of the scope camera in the primary camera's local axes (right, forward, up)
    pub camera_offset: Vec3,
    /// Extra margin around the culling sub-region, 0.05 = 5 %
    pub culling_margin: f32,
    /// Shadow casters farther than this from the eye are not drawn in the scope pass
    pub shadow_caster_range: f32,
    /// Stencil value the scope pass writes inside the region it owns
    pub stencil_sentinel: u8,
    /// Optional culling sub-region of the scope view
    pub scope_region: Option<ScopeRegion>,
    pub quality: QualityPreset,
    /// Force only the first `max_lights` backed-up lights visible
    pub limit_light_count: bool,
    pub max_lights: usize,
    pub merged_targets: Vec<MergeTargetDesc>,
}

impl Default for CompositorConfig {
    fn default() -> Self {
        Self {
            target_fov_degrees: 20.0,
            camera_offset: Vec3::ZERO,
            culling_margin: 0.05,
            shadow_caster_range: 4096.0,
            stencil_sentinel: 0x7F,
            scope_region: None,
            quality: QualityPreset::default(),
            limit_light_count: false,
            max_lights: 64,
            merged_targets: default_merge_targets(),
        }
    }
}

impl CompositorConfig {
    /// Check every field
    ///
    /// # Errors
    ///
    /// `InitializationFailed` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        if !(self.target_fov_degrees > 0.0 && self.target_fov_degrees < 180.0) {
            return Err(Error::InitializationFailed(format!(
                "target_fov_degrees must be in (0, 180), got {}", self.target_fov_degrees)));
        }
        if !(self.culling_margin >= 0.0) {
            return Err(Error::InitializationFailed(format!(
                "culling_margin must be >= 0, got {}", self.culling_margin)));
        }
        if !(self.shadow_caster_range > 0.0) {
            return Err(Error::InitializationFailed(format!(
                "shadow_caster_range must be > 0, got {}", self.shadow_caster_range)));
        }
        if self.limit_light_count && self.max_lights == 0 {
            return Err(Error::InitializationFailed(
                "max_lights must be > 0 when limit_light_count is set".to_string()));
        }
        if let Some(region) = &self.scope_region {
            if !(region.radius > 0.0) {
                return Err(Error::InitializationFailed(format!(
                    "scope_region radius must be > 0, got {}", region.radius)));
            }
        }
        for (index, target) in self.merged_targets.iter().enumerate() {
            if self.merged_targets[..index].iter().any(|other| other.id == target.id) {
                return Err(Error::InitializationFailed(format!(
                    "merge target {} listed twice", target.id)));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
