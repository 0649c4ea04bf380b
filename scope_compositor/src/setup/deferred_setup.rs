/// DeferredSetup — runs a setup closure on a worker thread after a delay.
///
/// Collaborators that watch for equip or spawn events schedule scope setup
/// here so it happens once the host has settled. Scheduling again, calling
/// `cancel()`, or dropping the `DeferredSetup` cancels the pending closure
/// and joins the worker, so a stale setup never overlaps a new one.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use crossbeam_channel::{bounded, RecvTimeoutError, Sender};
use crate::error::{Error, Result};

const SOURCE: &str = "scope::DeferredSetup";

#[derive(Debug, Default)]
pub struct DeferredSetup {
    pending: Arc<AtomicBool>,
    cancel: Option<Sender<()>>,
    worker: Option<JoinHandle<()>>,
}

impl DeferredSetup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `setup` on a worker thread once `delay` has elapsed.
    ///
    /// A setup scheduled earlier is cancelled first.
    ///
    /// # Errors
    ///
    /// `InitializationFailed` if the worker thread cannot be spawned.
    pub fn schedule<F>(&mut self, delay: Duration, setup: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.cancel();

        let (sender, receiver) = bounded::<()>(1);
        let pending = Arc::clone(&self.pending);
        pending.store(true, Ordering::SeqCst);

        let worker = thread::Builder::new()
            .name("scope-deferred-setup".to_string())
            .spawn(move || {
                // A message or a dropped sender both mean "cancelled"
                if let Err(RecvTimeoutError::Timeout) = receiver.recv_timeout(delay) {
                    setup();
                }
                pending.store(false, Ordering::SeqCst);
            });

        match worker {
            Ok(handle) => {
                self.cancel = Some(sender);
                self.worker = Some(handle);
                crate::scope_debug!(SOURCE, "Setup scheduled in {} ms", delay.as_millis());
                Ok(())
            }
            Err(e) => {
                self.pending.store(false, Ordering::SeqCst);
                Err(Error::InitializationFailed(format!("cannot spawn setup worker: {}", e)))
            }
        }
    }

    /// Cancel the pending setup, if any, and join its worker
    pub fn cancel(&mut self) {
        if let Some(sender) = self.cancel.take() {
            let _ = sender.try_send(());
        }
        self.join();
    }

    /// Block until the pending setup has run
    pub fn wait(&mut self) {
        self.join();
        self.cancel = None;
    }

    /// A setup is scheduled and has not finished (or been cancelled) yet
    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::SeqCst)
    }

    fn join(&mut self) {
        if let Some(handle) = self.worker.take() {
            if handle.join().is_err() {
                crate::scope_error!(SOURCE, "Setup worker panicked");
            }
        }
        self.pending.store(false, Ordering::SeqCst);
    }
}

impl Drop for DeferredSetup {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
#[path = "deferred_setup_tests.rs"]
mod tests;
