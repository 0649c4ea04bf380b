//! Setup module — delayed, cancellable setup work off the render thread.

mod deferred_setup;

pub use deferred_setup::DeferredSetup;
