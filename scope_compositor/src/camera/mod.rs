//! Camera module — camera state and the scope view-volume reconfiguration.
//!
//! The primary camera belongs to the host. The scope camera is a
//! `CameraState` owned by the compositor and rebuilt from the primary one
//! every frame.

mod camera_state;
mod fov;

pub use camera_state::{CameraState, ViewVolume};
pub use fov::{
    fov_scale_for_pitch, reconfigure_view_volume,
    PITCH_CLAMP_START_DEGREES, PITCH_CLAMP_RANGE_DEGREES, MIN_FOV_SCALE,
};
