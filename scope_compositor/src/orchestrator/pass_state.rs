/// States of the per-frame scope pass
///
/// Strictly linear. A failed transition aborts straight back to `Idle`.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PassState {
    #[default]
    Idle,
    TexturesBackedUp,
    CameraUpdated,
    TargetsCleared,
    LightingSynced,
    SecondaryDrawExecuted,
    PostProcessed,
    Restored,
}

impl PassState {
    /// State reached after this one completes. `Restored` wraps to `Idle`.
    pub fn next(&self) -> PassState {
        match self {
            PassState::Idle => PassState::TexturesBackedUp,
            PassState::TexturesBackedUp => PassState::CameraUpdated,
            PassState::CameraUpdated => PassState::TargetsCleared,
            PassState::TargetsCleared => PassState::LightingSynced,
            PassState::LightingSynced => PassState::SecondaryDrawExecuted,
            PassState::SecondaryDrawExecuted => PassState::PostProcessed,
            PassState::PostProcessed => PassState::Restored,
            PassState::Restored => PassState::Idle,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, PassState::Idle)
    }
}

impl fmt::Display for PassState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}
