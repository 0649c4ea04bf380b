//! Merge module — backups of the shared targets and the stencil-driven
//! region merge that stitches first-pass pixels back around the scope region.

mod region_merger;
mod rt_backup;

pub use region_merger::{MergeReport, RegionMerger, HALF_RES_TEXEL_SCALE};
pub use rt_backup::RTBackup;
