/// RTBackup — read-only copy of one shared render target
///
/// Holds the first-pass content of a target between the primary and the
/// scope pass. The copy follows the live target's extent and format: if the
/// host resized the target since the last frame, the backup is recreated
/// before the copy.

use std::sync::Arc;
use crate::config::{MergeTargetDesc, TargetResolution};
use crate::error::Result;
use crate::host::{GraphicsDevice, RenderTargetId, Texture, TextureDesc, TextureUsage};

#[derive(Debug)]
pub struct RTBackup {
    desc: MergeTargetDesc,
    texture: Option<Arc<dyn Texture>>,
    enabled: bool,
    /// Holds this frame's first-pass content
    current: bool,
}

impl RTBackup {
    pub fn new(desc: MergeTargetDesc) -> Self {
        Self { desc, texture: None, enabled: false, current: false }
    }

    pub fn id(&self) -> RenderTargetId {
        self.desc.id
    }

    pub fn resolution(&self) -> TargetResolution {
        self.desc.resolution
    }

    pub fn desc(&self) -> &MergeTargetDesc {
        &self.desc
    }

    pub fn texture(&self) -> Option<&Arc<dyn Texture>> {
        self.texture.as_ref()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_current(&self) -> bool {
        self.current
    }

    /// Create the backup texture matching `live` and enable the backup
    ///
    /// # Errors
    ///
    /// Whatever the device returns; the backup stays disabled.
    pub fn allocate(&mut self, device: &mut dyn GraphicsDevice, live: &Arc<dyn Texture>) -> Result<()> {
        self.texture = None;
        self.enabled = false;
        self.current = false;
        let desc = TextureDesc::matching(live.info(), format!("scope_backup_{}", self.desc.id), TextureUsage::Sampled);
        self.texture = Some(device.create_texture(desc)?);
        self.enabled = true;
        Ok(())
    }

    /// Whether the backup no longer matches `live`
    pub fn needs_reallocation(&self, live: &Arc<dyn Texture>) -> bool {
        match &self.texture {
            Some(texture) => !texture.info().copy_compatible(live.info()),
            None => true,
        }
    }

    /// Copy `live` into the backup, recreating the backup first if `live` changed shape.
    ///
    /// Returns true when the backup had to be recreated.
    pub fn capture(&mut self, device: &mut dyn GraphicsDevice, live: &Arc<dyn Texture>) -> Result<bool> {
        self.current = false;
        let reallocated = self.needs_reallocation(live);
        if reallocated {
            let previous = self.texture.as_ref().map(|t| t.info().extent());
            self.allocate(device, live)?;
            crate::scope_debug!("scope::RTBackup", "Reallocated backup of {} ({:?} -> {:?})",
                self.desc.id, previous, live.info().extent());
        }
        if let Some(texture) = &self.texture {
            device.copy_texture(texture, live)?;
            self.current = true;
        }
        Ok(reallocated)
    }

    /// Copy the backup over `live`
    pub fn restore(&self, device: &mut dyn GraphicsDevice, live: &Arc<dyn Texture>) -> Result<()> {
        match &self.texture {
            Some(texture) => device.copy_texture(live, texture),
            None => Ok(()),
        }
    }

    /// Mark the content as consumed for this frame
    pub fn mark_consumed(&mut self) {
        self.current = false;
    }

    /// Drop the backup texture and disable the backup
    pub fn release(&mut self) {
        self.texture = None;
        self.enabled = false;
        self.current = false;
    }
}
