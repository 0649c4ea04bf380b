/// Scope view-volume reconfiguration.
///
/// The scope camera inherits the primary camera's aspect ratio and far
/// plane but renders with its own, usually much narrower, field of view.
/// Near-vertical views shrink the effective FOV so the projection never
/// degenerates.

use super::camera_state::ViewVolume;

/// Pitch magnitude above which the FOV starts shrinking
pub const PITCH_CLAMP_START_DEGREES: f32 = 70.0;

/// Pitch range over which the FOV shrinks to its floor (70° → 90°)
pub const PITCH_CLAMP_RANGE_DEGREES: f32 = 20.0;

/// Floor of the pitch scale factor
pub const MIN_FOV_SCALE: f32 = 0.3;

/// Effective-FOV scale for a camera pitch in degrees.
///
/// 1.0 up to |pitch| = 70°, then `clamp((90 - |pitch|) / 20, 0.3, 1.0)`.
pub fn fov_scale_for_pitch(pitch_degrees: f32) -> f32 {
    let pitch = pitch_degrees.abs();
    if pitch > PITCH_CLAMP_START_DEGREES {
        ((90.0 - pitch) / PITCH_CLAMP_RANGE_DEGREES).clamp(MIN_FOV_SCALE, 1.0)
    } else {
        1.0
    }
}

/// Build the scope view volume from the primary one.
///
/// Keeps `near` and `far`, keeps the aspect ratio `right / top`, and derives
/// the extents from `target_fov_degrees` scaled by the pitch clamp.
pub fn reconfigure_view_volume(
    primary: &ViewVolume,
    target_fov_degrees: f32,
    pitch_degrees: f32,
) -> ViewVolume {
    let aspect = primary.aspect();
    let effective_fov = target_fov_degrees * fov_scale_for_pitch(pitch_degrees);
    let half_fov_tan = (effective_fov.to_radians() * 0.5).tan();

    let top = primary.near * half_fov_tan;
    let right = top * aspect;

    ViewVolume {
        near: primary.near,
        far: primary.far,
        left: -right,
        right,
        top,
        bottom: -top,
    }
}

#[cfg(test)]
#[path = "fov_tests.rs"]
mod tests;
