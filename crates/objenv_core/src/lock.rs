//! Advisory lock handles.
//!
//! Handles are allocated locally and carry no backend state. They do not
//! exclude anyone: two handles for the same name can be held at once, in this
//! process or another. Real exclusion would need an exclusive-lock or
//! compare-and-swap primitive from the backend.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// An opaque lock handle returned by [`LockAllocator::lock`].
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct FileLock {
    id: u64,
    name: String,
}

impl FileLock {
    /// Returns the handle id, unique within its allocator.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Returns the name the handle was issued for.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Issues and releases [`FileLock`] handles.
#[derive(Debug, Default)]
pub struct LockAllocator {
    next_id: AtomicU64,
    held: AtomicUsize,
}

impl LockAllocator {
    /// Creates an allocator with no handles issued.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a fresh handle for `name`.
    pub fn lock(&self, name: &str) -> FileLock {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.held.fetch_add(1, Ordering::Relaxed);
        FileLock {
            id,
            name: name.to_string(),
        }
    }

    /// Releases a handle.
    ///
    /// The held count never drops below zero, even for a handle issued by a
    /// different allocator.
    pub fn unlock(&self, lock: FileLock) {
        let released = self
            .held
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |held| {
                held.checked_sub(1)
            });
        if released.is_err() {
            tracing::warn!(name = %lock.name, id = lock.id, "unlock with no handles held");
        }
    }

    /// Returns the number of handles issued and not yet released.
    #[must_use]
    pub fn held(&self) -> usize {
        self.held.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_are_unique() {
        let locks = LockAllocator::new();
        let a = locks.lock("db/LOCK");
        let b = locks.lock("db/LOCK");
        assert_ne!(a.id(), b.id());
        assert_eq!(a.name(), "db/LOCK");
        assert_eq!(locks.held(), 2);
    }

    #[test]
    fn foreign_unlock_keeps_count_at_zero() {
        let issuer = LockAllocator::new();
        let other = LockAllocator::new();
        let lock = issuer.lock("db/LOCK");
        other.unlock(lock);
        assert_eq!(other.held(), 0);
        assert_eq!(issuer.held(), 1);
    }

    #[test]
    fn unlock_releases() {
        let locks = LockAllocator::new();
        let lock = locks.lock("LOCK");
        locks.unlock(lock);
        assert_eq!(locks.held(), 0);
    }
}
