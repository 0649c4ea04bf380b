/// TemporaryFrameTextures — orchestrator-owned scratch copies of the live
/// back buffer and primary color/depth targets, plus the scope texture.
///
/// Each scratch texture follows the extent and format of its own live
/// resource and is recreated on its own when they change, so an upscaled
/// back buffer keeps a full-size copy. The scope texture follows the primary
/// color target scaled by the quality preset. A live resource whose extent
/// or format disagrees with its scratch copy at backup time is not copied
/// for the frame, and is not copied back either.

use std::sync::Arc;
use crate::error::{Error, Result};
use crate::host::{FrameTargets, GraphicsDevice, Texture, TextureDesc, TextureUsage};

const SOURCE: &str = "scope::TemporaryFrameTextures";

/// Live resources with a scratch copy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameTexture {
    BackBuffer,
    MainColor,
    MainDepth,
}

impl FrameTexture {
    pub const ALL: [FrameTexture; 3] = [FrameTexture::BackBuffer, FrameTexture::MainColor, FrameTexture::MainDepth];

    fn index(self) -> usize {
        self as usize
    }

    fn name(self) -> &'static str {
        match self {
            FrameTexture::BackBuffer => "back buffer",
            FrameTexture::MainColor => "main color",
            FrameTexture::MainDepth => "main depth-stencil",
        }
    }

    fn live(self, targets: &FrameTargets) -> &Arc<dyn Texture> {
        match self {
            FrameTexture::BackBuffer => &targets.back_buffer,
            FrameTexture::MainColor => &targets.main_color,
            FrameTexture::MainDepth => &targets.main_depth_stencil,
        }
    }
}

#[derive(Debug, Default)]
pub struct TemporaryFrameTextures {
    scratch: [Option<Arc<dyn Texture>>; 3],
    /// Scratch holds this frame's copy of the live resource
    valid: [bool; 3],
    scope: Option<Arc<dyn Texture>>,
}

/// Extent of the scope texture for a reference extent and a quality scale
pub fn scope_extent(reference: (u32, u32), scale: f32) -> (u32, u32) {
    let scale = scale.clamp(0.0, 1.0);
    (
        ((reference.0 as f32 * scale).round() as u32).max(1),
        ((reference.1 as f32 * scale).round() as u32).max(1),
    )
}

impl TemporaryFrameTextures {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make sure every scratch texture matches its live resource and the
    /// scope texture matches the scaled primary color extent.
    ///
    /// Only the textures that no longer match are recreated. Returns true
    /// when at least one texture was (re)created.
    ///
    /// # Errors
    ///
    /// The device error of the first texture that cannot be created. All
    /// textures are released in that case.
    pub fn prepare(&mut self, device: &mut dyn GraphicsDevice, targets: &FrameTargets, scope_scale: f32) -> Result<bool> {
        match self.allocate(device, targets, scope_scale) {
            Ok(reallocated) => Ok(reallocated),
            Err(e) => {
                self.release();
                Err(e)
            }
        }
    }

    fn allocate(&mut self, device: &mut dyn GraphicsDevice, targets: &FrameTargets, scope_scale: f32) -> Result<bool> {
        let mut reallocated = false;

        for which in FrameTexture::ALL {
            let live = which.live(targets).info();
            let matches = self.scratch[which.index()]
                .as_ref()
                .is_some_and(|scratch| scratch.info().copy_compatible(live));
            if matches {
                continue;
            }

            self.valid[which.index()] = false;
            self.scratch[which.index()] = Some(device.create_texture(TextureDesc {
                name: format!("scope_scratch_{}", which.name()),
                width: live.width,
                height: live.height,
                format: live.format,
                usage: TextureUsage::Sampled,
            })?);
            crate::scope_debug!(SOURCE, "Scratch {} allocated at {}x{}", which.name(), live.width, live.height);
            reallocated = true;
        }

        let reference = targets.main_color.info();
        let (width, height) = scope_extent(reference.extent(), scope_scale);
        let matches = self.scope.as_ref().is_some_and(|scope| {
            let info = scope.info();
            info.extent() == (width, height) && info.format == reference.format
        });
        if !matches {
            self.scope = Some(device.create_texture(TextureDesc {
                name: "scope_color".to_string(),
                width,
                height,
                format: reference.format,
                usage: TextureUsage::SampledAndRenderTarget,
            })?);
            crate::scope_debug!(SOURCE, "Scope texture allocated at {}x{}", width, height);
            reallocated = true;
        }

        Ok(reallocated)
    }

    /// Copy the live resources into their scratch textures.
    ///
    /// Returns the number of copies skipped, each already logged.
    pub fn backup(&mut self, device: &mut dyn GraphicsDevice, targets: &FrameTargets) -> usize {
        let mut skipped = 0;
        for which in FrameTexture::ALL {
            self.valid[which.index()] = false;
            let live = which.live(targets);
            let Some(scratch) = &self.scratch[which.index()] else {
                skipped += 1;
                continue;
            };
            if !scratch.info().copy_compatible(live.info()) {
                let e = Error::SizeMismatch {
                    resource: which.name().to_string(),
                    expected: scratch.info().extent(),
                    actual: live.info().extent(),
                };
                crate::scope_warn!(SOURCE, "Skipping {} copy: {}", which.name(), e);
                skipped += 1;
                continue;
            }
            match device.copy_texture(scratch, live) {
                Ok(()) => self.valid[which.index()] = true,
                Err(e) => {
                    crate::scope_warn!(SOURCE, "Skipping {} copy: {}", which.name(), e);
                    skipped += 1;
                }
            }
        }
        skipped
    }

    /// Copy a scratch texture back over its live resource.
    ///
    /// Returns `Ok(false)` when nothing was backed up this frame.
    pub fn copy_back(&self, device: &mut dyn GraphicsDevice, which: FrameTexture, targets: &FrameTargets) -> Result<bool> {
        match (&self.scratch[which.index()], self.valid[which.index()]) {
            (Some(scratch), true) => {
                device.copy_texture(which.live(targets), scratch)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    pub fn is_valid(&self, which: FrameTexture) -> bool {
        self.valid[which.index()]
    }

    /// Forget this frame's copies
    pub fn invalidate(&mut self) {
        self.valid = [false; 3];
    }

    pub fn scratch(&self, which: FrameTexture) -> Option<&Arc<dyn Texture>> {
        self.scratch[which.index()].as_ref()
    }

    /// Texture holding the scope pass output
    pub fn scope_texture(&self) -> Option<&Arc<dyn Texture>> {
        self.scope.as_ref()
    }

    /// Drop every texture
    pub fn release(&mut self) {
        self.scratch = [None, None, None];
        self.valid = [false; 3];
        self.scope = None;
    }
}

#[cfg(test)]
#[path = "frame_textures_tests.rs"]
mod tests;
