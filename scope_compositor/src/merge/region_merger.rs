/// RegionMerger — restores first-pass content of the shared targets
/// everywhere outside the scope region.
///
/// The scope draw writes the stencil sentinel inside the region it owns.
/// After the scope pass every backed-up target is overwritten from its
/// backup wherever the stencil differs from the sentinel:
///
/// - full-resolution targets use the fixed-function stencil test against
///   the shared depth-stencil buffer,
/// - reduced-resolution targets bind `StencilResolveMerge`, which samples
///   the full-resolution stencil at `HALF_RES_TEXEL_SCALE` times the
///   target texel and performs the comparison itself.
///
/// Live targets are looked up through `live_targets()` before the device is
/// borrowed, and passed back in index order.

use std::sync::Arc;
use crate::config::{CompositorConfig, TargetResolution};
use crate::error::{Error, Result};
use crate::host::{
    BlendState, DepthStencilState, GraphicsDevice, HostRenderer, PipelineState,
    PrimitiveTopology, RasterizerState, ShaderProgram, StencilMergeConstants, Texture, Viewport,
};
use super::rt_backup::RTBackup;

const SOURCE: &str = "scope::RegionMerger";

/// Stencil texels per reduced-resolution texel, along each axis
pub const HALF_RES_TEXEL_SCALE: u32 = 2;

/// Per-target outcome of a backup, merge, or restore sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MergeReport {
    pub processed: usize,
    pub skipped: usize,
    /// Backups recreated because the live target changed shape
    pub reallocated: usize,
}

#[derive(Debug)]
pub struct RegionMerger {
    backups: Vec<RTBackup>,
    initialized: bool,
}

impl RegionMerger {
    pub fn new(config: &CompositorConfig) -> Self {
        Self {
            backups: config.merged_targets.iter().copied().map(RTBackup::new).collect(),
            initialized: false,
        }
    }

    /// Resolve the configured targets, in backup order
    pub fn live_targets(&self, host: &dyn HostRenderer) -> Vec<Option<Arc<dyn Texture>>> {
        self.backups.iter().map(|backup| host.render_target(backup.id())).collect()
    }

    /// Allocate a backup for every configured target.
    ///
    /// A target that is missing or whose backup cannot be created is logged
    /// and excluded from later merges. Returns the number of enabled backups.
    pub fn initialize(&mut self, device: &mut dyn GraphicsDevice, live: &[Option<Arc<dyn Texture>>]) -> usize {
        for (index, backup) in self.backups.iter_mut().enumerate() {
            backup.release();
            match live.get(index).and_then(|t| t.as_ref()) {
                Some(texture) => {
                    if let Err(e) = backup.allocate(device, texture) {
                        crate::scope_warn!(SOURCE, "Backup of {} disabled: {}", backup.id(), e);
                    }
                }
                None => crate::scope_warn!(SOURCE, "Target {} not available, excluded from merge", backup.id()),
            }
        }
        self.initialized = true;
        let enabled = self.enabled_count();
        crate::scope_info!(SOURCE, "Initialized {}/{} target backups", enabled, self.backups.len());
        enabled
    }

    /// Copy every enabled live target into its backup
    pub fn backup_render_targets(
        &mut self,
        device: &mut dyn GraphicsDevice,
        live: &[Option<Arc<dyn Texture>>],
    ) -> MergeReport {
        let mut report = MergeReport::default();
        for (index, backup) in self.backups.iter_mut().enumerate() {
            if !backup.is_enabled() {
                continue;
            }
            let Some(texture) = live.get(index).and_then(|t| t.as_ref()) else {
                backup.mark_consumed();
                crate::scope_warn!(SOURCE, "Target {} vanished, backup skipped", backup.id());
                report.skipped += 1;
                continue;
            };
            match backup.capture(device, texture) {
                Ok(reallocated) => {
                    report.processed += 1;
                    report.reallocated += usize::from(reallocated);
                }
                Err(e) => {
                    crate::scope_warn!(SOURCE, "Backup of {} failed: {}", backup.id(), e);
                    report.skipped += 1;
                }
            }
        }
        report
    }

    /// Restore first-pass pixels outside the sentinel region of every backed-up target.
    ///
    /// The device's pipeline state is captured before the first target and
    /// put back after the last one, whatever happened in between.
    pub fn merge_render_targets(
        &mut self,
        device: &mut dyn GraphicsDevice,
        live: &[Option<Arc<dyn Texture>>],
        depth_stencil: &Arc<dyn Texture>,
        sentinel: u8,
    ) -> MergeReport {
        let mut report = MergeReport::default();
        let saved = device.pipeline_state();

        for (index, backup) in self.backups.iter_mut().enumerate() {
            if !backup.is_current() {
                continue;
            }
            backup.mark_consumed();
            let result = match (live.get(index).and_then(|t| t.as_ref()), backup.texture()) {
                (Some(target), Some(source)) => {
                    merge_one(device, backup.resolution(), target, source, depth_stencil, sentinel)
                }
                _ => Err(Error::InvalidResource(format!("target {} not available", backup.id()))),
            };
            match result {
                Ok(()) => report.processed += 1,
                Err(e) => {
                    crate::scope_warn!(SOURCE, "Merge of {} skipped: {}", backup.id(), e);
                    report.skipped += 1;
                }
            }
        }

        device.set_pipeline_state(&saved);
        report
    }

    /// Copy every backup holding this frame's content straight back over its target
    pub fn restore_from_backups(
        &mut self,
        device: &mut dyn GraphicsDevice,
        live: &[Option<Arc<dyn Texture>>],
    ) -> MergeReport {
        let mut report = MergeReport::default();
        for (index, backup) in self.backups.iter_mut().enumerate() {
            if !backup.is_current() {
                continue;
            }
            backup.mark_consumed();
            let result = match live.get(index).and_then(|t| t.as_ref()) {
                Some(target) => backup.restore(device, target),
                None => Err(Error::InvalidResource(format!("target {} not available", backup.id()))),
            };
            match result {
                Ok(()) => report.processed += 1,
                Err(e) => {
                    crate::scope_warn!(SOURCE, "Restore of {} skipped: {}", backup.id(), e);
                    report.skipped += 1;
                }
            }
        }
        report
    }

    /// Drop every backup texture
    pub fn release(&mut self) {
        self.backups.iter_mut().for_each(RTBackup::release);
        self.initialized = false;
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn enabled_count(&self) -> usize {
        self.backups.iter().filter(|b| b.is_enabled()).count()
    }

    pub fn backups(&self) -> &[RTBackup] {
        &self.backups
    }
}

fn merge_one(
    device: &mut dyn GraphicsDevice,
    resolution: TargetResolution,
    target: &Arc<dyn Texture>,
    backup: &Arc<dyn Texture>,
    depth_stencil: &Arc<dyn Texture>,
    sentinel: u8,
) -> Result<()> {
    let (width, height) = target.info().extent();
    let mut state = PipelineState {
        render_targets: vec![target.clone()],
        viewport: Viewport::full(width, height),
        blend: BlendState::Opaque,
        rasterizer: RasterizerState { cull_back_faces: false, scissor_enable: false },
        topology: PrimitiveTopology::TriangleList,
        ..PipelineState::default()
    };

    match resolution {
        TargetResolution::Full => {
            state.depth_stencil_view = Some(depth_stencil.clone());
            state.depth_stencil = DepthStencilState::stencil_not_equal(sentinel);
            state.program = Some(ShaderProgram::FullscreenCopy);
            state.shader_resources = vec![backup.clone()];
            device.set_pipeline_state(&state);
        }
        TargetResolution::Half => {
            state.program = Some(ShaderProgram::StencilResolveMerge);
            state.shader_resources = vec![backup.clone(), depth_stencil.clone()];
            device.set_pipeline_state(&state);
            let constants = StencilMergeConstants {
                sentinel: u32::from(sentinel),
                texel_scale: HALF_RES_TEXEL_SCALE,
                _pad: [0; 2],
            };
            device.push_constants(bytemuck::bytes_of(&constants))?;
        }
    }

    device.draw(3, 0)
}

#[cfg(test)]
#[path = "region_merger_tests.rs"]
mod tests;
