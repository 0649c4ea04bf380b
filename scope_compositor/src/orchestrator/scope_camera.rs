/// ScopeCamera — the secondary camera, rebuilt from the primary one every frame.
///
/// The scope camera sits at a fixed offset from the primary camera,
/// expressed in the primary camera's local axes (right, forward, up). It
/// can hang below a chain of attachments (weapon, sight mount, ...), each
/// adding its own local offset and rotation to the parent's.

use glam::{Mat3, Vec3};
use crate::camera::{reconfigure_view_volume, CameraState};

/// One link of the attachment chain, relative to its parent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attachment {
    pub offset: Vec3,
    pub rotation: Mat3,
}

impl Attachment {
    pub fn new(offset: Vec3) -> Self {
        Self { offset, rotation: Mat3::IDENTITY }
    }

    pub fn with_rotation(mut self, rotation: Mat3) -> Self {
        self.rotation = rotation;
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScopeCamera {
    offset: Vec3,
    chain: Vec<Attachment>,
    state: Option<CameraState>,
}

impl ScopeCamera {
    pub fn new(offset: Vec3) -> Self {
        Self { offset, chain: Vec::new(), state: None }
    }

    /// Append a link at the end of the chain
    pub fn attach(&mut self, attachment: Attachment) {
        self.chain.push(attachment);
    }

    pub fn clear_attachments(&mut self) {
        self.chain.clear();
    }

    pub fn attachments(&self) -> &[Attachment] {
        &self.chain
    }

    /// Copy the primary transform, apply the offset and the attachment chain,
    /// then rebuild the view volume for `target_fov_degrees`.
    pub fn update(&mut self, primary: &CameraState, target_fov_degrees: f32) -> CameraState {
        let mut position = primary.position + primary.rotation * self.offset;
        let mut rotation = primary.rotation;
        for link in &self.chain {
            position += rotation * link.offset;
            rotation *= link.rotation;
        }

        let mut camera = CameraState {
            id: None,
            position,
            rotation,
            view_volume: primary.view_volume,
            fov_degrees: target_fov_degrees,
        };
        camera.view_volume = reconfigure_view_volume(
            &primary.view_volume,
            target_fov_degrees,
            camera.pitch_degrees(),
        );

        self.state = Some(camera);
        camera
    }

    /// State computed by the last `update()`
    pub fn state(&self) -> Option<&CameraState> {
        self.state.as_ref()
    }

    /// Forget the per-frame state
    pub fn release(&mut self) {
        self.state = None;
    }
}

#[cfg(test)]
#[path = "scope_camera_tests.rs"]
mod tests;
