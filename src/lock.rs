use std::sync::Mutex as StdMutex;
pub(crate) use std::sync::MutexGuard;

/// A [`std::sync::Mutex`] that surfaces poisoning as an absent guard.
///
/// The connection state must never panic a second thread just because a
/// first one panicked while holding a lock; callers decide what a
/// poisoned lock means for them (usually: proceed conservatively or
/// report an internal error).
#[derive(Debug)]
pub(crate) struct Mutex<T> {
    inner: StdMutex<T>,
}

impl<T> Mutex<T> {
    pub(crate) fn new(data: T) -> Self {
        Self {
            inner: StdMutex::new(data),
        }
    }

    /// Acquire the lock, or `None` if it is poisoned.
    #[inline]
    pub(crate) fn lock(&self) -> Option<MutexGuard<'_, T>> {
        self.inner.lock().ok()
    }
}
