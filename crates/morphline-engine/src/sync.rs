//! Coarse exclusive-window synchronization between the editing thread
//! and the real-time thread. The editing thread owns the data for the
//! duration of a window; the real-time thread never blocks, it simply
//! skips its block (holding the last written values) while a window is
//! open or the lock is contended.

use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

struct Inner<T> {
    paused: AtomicBool,
    state: Mutex<T>,
}

/// Shared handle to the automation state. Clones refer to the same
/// underlying state; hand one clone to the editor and one to the
/// real-time driver.
pub struct Shared<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for Shared<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Shared<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(Inner {
                paused: AtomicBool::new(false),
                state: Mutex::new(value),
            }),
        }
    }

    /// Opens an exclusive window. Raises the pause flag so the next
    /// real-time invocation skips evaluation, then waits for the
    /// in-flight block (if any) to release the lock. Batch multiple
    /// mutations inside one window to bound the pause duration.
    pub fn edit(&self) -> ExclusiveWindow<'_, T> {
        self.inner.paused.store(true, Ordering::Release);
        let guard = self.inner.state.lock();
        ExclusiveWindow {
            guard,
            paused: &self.inner.paused,
        }
    }

    /// Runs `f` inside a single exclusive window.
    pub fn with_edit<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut T) -> R,
    {
        let mut window = self.edit();
        f(&mut window)
    }

    /// Real-time entry point. Returns `None` while an exclusive window
    /// is open; never blocks and never allocates.
    pub fn rt(&self) -> Option<RtGuard<'_, T>> {
        if self.inner.paused.load(Ordering::Acquire) {
            return None;
        }
        self.inner
            .state
            .try_lock()
            .map(|guard| RtGuard { guard })
    }
}

/// RAII window granting the editing thread exclusive access.
pub struct ExclusiveWindow<'a, T> {
    guard: MutexGuard<'a, T>,
    paused: &'a AtomicBool,
}

impl<T> Deref for ExclusiveWindow<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.guard
    }
}

impl<T> DerefMut for ExclusiveWindow<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.guard
    }
}

impl<T> Drop for ExclusiveWindow<'_, T> {
    fn drop(&mut self) {
        // The flag clears just before the mutex unlocks (field drop
        // order). A real-time attempt in that gap fails try_lock and
        // skips the block, which keeps the no-concurrent-access
        // contract intact.
        self.paused.store(false, Ordering::Release);
    }
}

/// Read-only access for the duration of one audio block.
pub struct RtGuard<'a, T> {
    guard: MutexGuard<'a, T>,
}

impl<T> Deref for RtGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.guard
    }
}
