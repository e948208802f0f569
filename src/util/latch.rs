//! Countdown latch for fan-out/fan-in of parallel test workers.
//!
//! Not part of the comparison core: the driver hands one clone per worker
//! and blocks on [`Watcher::wait`] until every worker has checked in.

use std::sync::{Arc, Condvar, Mutex};

/// A one-shot countdown latch.
///
/// Created with an initial count; [`Watcher::decrement`] is called once
/// per completed unit of work, and every [`Watcher::wait`] caller is
/// released when the count reaches zero. A latch created with a count of
/// zero starts released.
#[derive(Debug, Clone)]
pub struct Watcher {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    count: Mutex<usize>,
    released: Condvar,
}

impl Watcher {
    /// Create a latch that releases after `count` decrements.
    #[must_use]
    pub fn new(count: usize) -> Self {
        Self {
            inner: Arc::new(Inner {
                count: Mutex::new(count),
                released: Condvar::new(),
            }),
        }
    }

    /// Record one completed unit of work. Releases all waiters when the
    /// count reaches zero; further calls are no-ops.
    pub fn decrement(&self) {
        let mut count = self.inner.count.lock().expect("latch lock");
        *count = count.saturating_sub(1);
        if *count == 0 {
            self.inner.released.notify_all();
        }
    }

    /// Block until the count reaches zero. Returns immediately if the
    /// latch was created with a count of zero or has already released.
    pub fn wait(&self) {
        let mut count = self.inner.count.lock().expect("latch lock");
        while *count > 0 {
            count = self.inner.released.wait(count).expect("latch lock");
        }
    }
}
