//! Per-thread nesting depth for traced namespaces
//!
//! Each thread keeps its own map from namespace root to the number of traced
//! calls currently on its stack. Nothing here is shared between threads.

use std::cell::RefCell;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

thread_local! {
    static DEPTH: RefCell<HashMap<Arc<str>, usize>> = RefCell::new(HashMap::new());
}

/// Depth of traced calls for `root` on the current thread
pub(crate) fn current(root: &str) -> usize {
    DEPTH
        .try_with(|depth| depth.borrow().get(root).copied().unwrap_or(0))
        .unwrap_or(0)
}

fn push(root: &Arc<str>) {
    // Thread-local storage is gone during thread teardown; skip tracking then.
    let _ = DEPTH.try_with(|depth| {
        *depth.borrow_mut().entry(Arc::clone(root)).or_insert(0) += 1;
    });
}

fn pop(root: &str) {
    let _ = DEPTH.try_with(|depth| {
        let mut depth = depth.borrow_mut();
        if let Some(count) = depth.get_mut(root) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                depth.remove(root);
            }
        }
    });
}

/// Marks the current thread as inside a traced call until dropped
///
/// Returned by [`TraceInterceptor::enter`](crate::TraceInterceptor::enter).
/// The guard is tied to the thread that created it, so it is neither `Send`
/// nor `Sync`.
#[derive(Debug)]
#[must_use = "dropping the guard immediately ends the traced call"]
pub struct EntryGuard {
    root: Option<Arc<str>>,
    _thread_bound: PhantomData<*const ()>,
}

impl EntryGuard {
    /// Guard that tracks nothing, for calls outside the namespace
    pub(crate) const fn inert() -> Self {
        Self {
            root: None,
            _thread_bound: PhantomData,
        }
    }

    /// Increment the depth for `root` until the guard drops
    pub(crate) fn enter(root: &Arc<str>) -> Self {
        push(root);
        Self {
            root: Some(Arc::clone(root)),
            _thread_bound: PhantomData,
        }
    }

    /// Whether this guard holds a depth slot
    pub const fn is_tracking(&self) -> bool {
        self.root.is_some()
    }
}

impl Drop for EntryGuard {
    fn drop(&mut self) {
        if let Some(root) = self.root.take() {
            pop(&root);
        }
    }
}
