/// CameraState — position, orientation, and view volume of a camera.
///
/// World space is Z-up. The rotation matrix stores the camera's world-space
/// axes as columns: `x_axis` = right, `y_axis` = forward, `z_axis` = up.
/// The view volume extents (left/right/top/bottom) are measured on the near
/// plane.

use glam::{Mat3, Mat4, Vec3, Vec4};
use crate::host::CameraId;

/// View volume of a perspective camera
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewVolume {
    pub near: f32,
    pub far: f32,
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl ViewVolume {
    /// Symmetric volume from a vertical field of view
    pub fn from_fov(fov_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        let top = near * (fov_degrees.to_radians() * 0.5).tan();
        let right = top * aspect;
        Self { near, far, left: -right, right, top, bottom: -top }
    }

    /// Width over height, 1.0 for a degenerate volume
    pub fn aspect(&self) -> f32 {
        if self.top.abs() <= f32::EPSILON {
            1.0
        } else {
            self.right / self.top
        }
    }

    /// Vertical field of view in degrees
    pub fn vertical_fov_degrees(&self) -> f32 {
        if self.near <= 0.0 {
            return 0.0;
        }
        ((self.top / self.near).atan() - (self.bottom / self.near).atan()).to_degrees()
    }

    /// Off-center right-handed perspective projection, depth range [0, 1]
    pub fn projection_matrix(&self) -> Mat4 {
        let width = self.right - self.left;
        let height = self.top - self.bottom;
        let depth = self.near - self.far;
        if width.abs() <= f32::EPSILON || height.abs() <= f32::EPSILON || depth.abs() <= f32::EPSILON {
            return Mat4::IDENTITY;
        }
        Mat4::from_cols(
            Vec4::new(2.0 * self.near / width, 0.0, 0.0, 0.0),
            Vec4::new(0.0, 2.0 * self.near / height, 0.0, 0.0),
            Vec4::new(
                (self.right + self.left) / width,
                (self.top + self.bottom) / height,
                self.far / depth,
                -1.0,
            ),
            Vec4::new(0.0, 0.0, self.near * self.far / depth, 0.0),
        )
    }
}

impl Default for ViewVolume {
    fn default() -> Self {
        Self::from_fov(70.0, 16.0 / 9.0, 5.0, 100_000.0)
    }
}

/// State of a camera for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    /// Host identity, if the state mirrors a host camera object
    pub id: Option<CameraId>,
    pub position: Vec3,
    pub rotation: Mat3,
    pub view_volume: ViewVolume,
    /// Field of view the camera is configured for, in degrees
    pub fov_degrees: f32,
}

impl CameraState {
    /// Camera at `position` looking along +Y
    pub fn new(position: Vec3, view_volume: ViewVolume) -> Self {
        Self {
            id: None,
            position,
            rotation: Mat3::IDENTITY,
            view_volume,
            fov_degrees: view_volume.vertical_fov_degrees(),
        }
    }

    /// Camera with the given yaw (around +Z) and pitch (positive = looking up), in degrees
    pub fn with_yaw_pitch(mut self, yaw_degrees: f32, pitch_degrees: f32) -> Self {
        self.rotation = Mat3::from_rotation_z(-yaw_degrees.to_radians())
            * Mat3::from_rotation_x(pitch_degrees.to_radians());
        self
    }

    /// World-space right axis
    pub fn right(&self) -> Vec3 {
        self.rotation.x_axis
    }

    /// World-space forward axis
    pub fn forward(&self) -> Vec3 {
        self.rotation.y_axis
    }

    /// World-space up axis
    pub fn up(&self) -> Vec3 {
        self.rotation.z_axis
    }

    /// Pitch derived from the world-space rotation, in degrees (±90 = straight up/down)
    pub fn pitch_degrees(&self) -> f32 {
        self.forward().normalize_or_zero().z.clamp(-1.0, 1.0).asin().to_degrees()
    }

    /// World-to-view matrix
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_to_rh(self.position, self.forward(), self.up())
    }

    /// Projection matrix of the view volume
    pub fn projection_matrix(&self) -> Mat4 {
        self.view_volume.projection_matrix()
    }

    /// Combined view-projection matrix (projection * view)
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

impl Default for CameraState {
    fn default() -> Self {
        Self::new(Vec3::ZERO, ViewVolume::default())
    }
}

#[cfg(test)]
#[path = "camera_state_tests.rs"]
mod tests;
