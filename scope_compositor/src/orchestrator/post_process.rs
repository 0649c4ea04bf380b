/// Post-process collaborators applied to the scope pass output
///
/// Tonemap, thermal and night-vision recolor live outside the compositor.
/// Each pass consumes the scope color target and may hand back a
/// replacement; the compositor samples whatever the last pass produced.

use std::sync::Arc;
use crate::error::Result;
use crate::host::{GraphicsDevice, Texture};

pub trait PostProcessPass {
    /// Name used in log messages
    fn name(&self) -> &str;

    /// Process `input`.
    ///
    /// `Ok(None)` keeps `input` as the scope output. An error skips this
    /// pass for the frame; the following passes still run.
    fn apply(&mut self, device: &mut dyn GraphicsDevice, input: &Arc<dyn Texture>) -> Result<Option<Arc<dyn Texture>>>;
}
