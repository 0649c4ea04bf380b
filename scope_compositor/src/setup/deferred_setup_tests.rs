use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use super::*;

fn counter() -> Arc<AtomicU32> {
    Arc::new(AtomicU32::new(0))
}

fn bump(counter: &Arc<AtomicU32>) -> impl FnOnce() + Send + 'static {
    let counter = Arc::clone(counter);
    move || {
        counter.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn test_new_is_idle() {
    let setup = DeferredSetup::new();
    assert!(!setup.is_pending());
}

#[test]
fn test_setup_runs_after_delay() {
    let runs = counter();
    let mut setup = DeferredSetup::new();

    setup.schedule(Duration::from_millis(10), bump(&runs)).unwrap();
    setup.wait();

    assert_eq!(runs.load(Ordering::SeqCst), 1);
    assert!(!setup.is_pending());
}

#[test]
fn test_cancel_before_apply() {
    let runs = counter();
    let mut setup = DeferredSetup::new();

    setup.schedule(Duration::from_secs(30), bump(&runs)).unwrap();
    assert!(setup.is_pending());
    setup.cancel();

    assert_eq!(runs.load(Ordering::SeqCst), 0);
    assert!(!setup.is_pending());
}

#[test]
fn test_reschedule_cancels_previous() {
    let first = counter();
    let second = counter();
    let mut setup = DeferredSetup::new();

    setup.schedule(Duration::from_secs(30), bump(&first)).unwrap();
    setup.schedule(Duration::from_millis(5), bump(&second)).unwrap();
    setup.wait();

    assert_eq!(first.load(Ordering::SeqCst), 0);
    assert_eq!(second.load(Ordering::SeqCst), 1);
}

#[test]
fn test_drop_cancels() {
    let runs = counter();
    {
        let mut setup = DeferredSetup::new();
        setup.schedule(Duration::from_secs(30), bump(&runs)).unwrap();
    }
    assert_eq!(runs.load(Ordering::SeqCst), 0);
}

#[test]
fn test_cancel_without_schedule_is_noop() {
    let mut setup = DeferredSetup::new();
    setup.cancel();
    setup.wait();
    assert!(!setup.is_pending());
}
