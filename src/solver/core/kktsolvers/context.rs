// Process-wide backend context.
//
// Native CPU backends have no real device state, but the lifecycle
// contract matches accelerator-style backends: bring up once on first
// acquire, reference count across solver instances, release on the
// last drop.   Both acquire and release are idempotent and thread
// safe, so repeated initialization or teardown is harmless.

use lazy_static::lazy_static;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

#[derive(Debug, Default)]
struct BackendContext {
    refcount: AtomicUsize,
    live: AtomicBool,
}

impl BackendContext {
    fn acquire(&self) {
        if self.refcount.fetch_add(1, Ordering::SeqCst) == 0 {
            // first user brings the context up.   Repeats are no-ops.
            self.live.store(true, Ordering::SeqCst);
        }
    }

    fn release(&self) {
        // decrement without underflow so that spurious releases
        // remain harmless
        let prev = self
            .refcount
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |c| c.checked_sub(1))
            .unwrap_or(0);

        if prev == 1 {
            self.live.store(false, Ordering::SeqCst);
        }
    }

    fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }
}

lazy_static! {
    static ref CONTEXT: BackendContext = BackendContext::default();
}

/// RAII handle on the process-wide backend context.   Held by each
/// linear solver backend instance.
#[derive(Debug)]
pub(crate) struct BackendContextGuard;

impl BackendContextGuard {
    pub fn acquire() -> Self {
        CONTEXT.acquire();
        BackendContextGuard
    }
}

impl Drop for BackendContextGuard {
    fn drop(&mut self) {
        CONTEXT.release();
    }
}

#[allow(dead_code)]
pub(crate) fn context_is_live() -> bool {
    CONTEXT.is_live()
}

#[test]
fn test_context_refcounting() {
    let g1 = BackendContextGuard::acquire();
    assert!(context_is_live());

    let g2 = BackendContextGuard::acquire();
    drop(g1);
    assert!(context_is_live());

    drop(g2);
    // NB: other tests may hold guards concurrently, so only the
    // single-threaded nesting behaviour is asserted here
}
