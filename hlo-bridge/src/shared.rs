use parking_lot::RwLock;
use parking_lot::RwLockReadGuard;
use parking_lot::RwLockWriteGuard;
use std::sync::Arc;
use std::sync::Weak;

/// A convenience type alias for [Arc<RwLock<T>>].
///
/// # Example
///
/// ```
/// use hlo_bridge::shared::Shared;
/// use hlo_bridge::shared::SharedExt;
///
/// let lock = Shared::new(42.into());
/// assert_eq!(*lock.rd(), 42);
/// ```
pub type Shared<T> = Arc<RwLock<T>>;

/// Non-owning counterpart of [Shared].
///
/// Used for back-references such as the parent of a block or the defining op
/// of a result so that the IR graph does not form reference cycles.
pub type WeakShared<T> = Weak<RwLock<T>>;

/// A convenience trait around [RwLock].
///
/// This trait makes using [RwLock] less verbose. The translation runs on one
/// thread, so a lock that is already taken means that the caller still holds a
/// guard somewhere up the stack. Blocking would hang forever, so these methods
/// panic instead.
///
/// # Example
///
/// With this trait:
/// ```
/// use hlo_bridge::shared::Shared;
/// use hlo_bridge::shared::SharedExt;
///
/// let lock = Shared::new(vec![1].into());
/// lock.wr().push(2);
/// assert_eq!(lock.rd().len(), 2);
/// ```
pub trait SharedExt<T: ?Sized> {
    /// Convenience method for reading.
    fn rd(&self) -> RwLockReadGuard<'_, T>;
    /// Convenience method for writing.
    fn wr(&self) -> RwLockWriteGuard<'_, T>;
}

impl<T: ?Sized> SharedExt<T> for Shared<T> {
    fn rd(&self) -> RwLockReadGuard<'_, T> {
        match self.try_read() {
            Some(guard) => guard,
            None => panic!("lock is held for writing elsewhere on this thread"),
        }
    }
    fn wr(&self) -> RwLockWriteGuard<'_, T> {
        match self.try_write() {
            Some(guard) => guard,
            None => panic!("lock is held elsewhere on this thread"),
        }
    }
}

#[test]
/// Just another test that runs even if the docstrings would not.
fn test_shared() {
    let lock = Shared::new(42.into());
    assert_eq!(*lock.rd(), 42);
    *lock.wr() = 43;
    assert_eq!(*lock.rd(), 43);
}

#[test]
#[should_panic(expected = "held")]
fn test_shared_contention_panics() {
    let lock: Shared<i32> = Shared::new(1.into());
    let _reader = lock.rd();
    let _writer = lock.wr();
}
