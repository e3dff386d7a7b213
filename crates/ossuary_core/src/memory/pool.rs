//! # Object Pool
//!
//! Fixed-capacity pool of pre-constructed instances for objects that are
//! spawned and retired many times per second.

use crate::error::{CoreError, CoreResult};

/// A pool of `capacity` pre-constructed instances of `T`.
///
/// Allocation hands out exclusive use of one instance until it is freed.
/// Instances are never dropped or rebuilt while the pool lives: the pool
/// does not know how to reset a `T`, so callers reset fields themselves
/// before or after reuse.
///
/// Freed slots go on a stack, so the next allocation returns the most
/// recently freed instance.
///
/// # Thread Safety
///
/// This pool is NOT thread-safe. It is owned and mutated by one simulation
/// tick.
///
/// # Example
///
/// ```rust,ignore
/// let mut pool: ObjectPool<Swipe> = ObjectPool::new(2, |_| Swipe::default());
///
/// // Allocate - O(1), no heap allocation
/// let handle = pool.alloc()?;
/// pool.get_mut(handle).unwrap().enabled = true;
///
/// // Free - O(1), instance stays constructed
/// pool.free(handle)?;
/// ```
pub struct ObjectPool<T> {
    /// The pre-constructed instances.
    storage: Box<[T]>,
    /// Which slots are currently handed out.
    live: Box<[bool]>,
    /// Free list - indices of available slots, top of stack is next out.
    free_list: Vec<usize>,
}

/// Handle to a live instance in an [`ObjectPool`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PoolHandle {
    /// Index into the pool.
    index: usize,
}

impl PoolHandle {
    /// Returns the slot index this handle refers to.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.index
    }
}

impl<T> ObjectPool<T> {
    /// Creates a pool of `capacity` instances built by `factory`.
    ///
    /// The factory receives the slot index.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn new(capacity: usize, factory: impl FnMut(usize) -> T) -> Self {
        assert!(capacity > 0, "Capacity must be greater than zero");

        let storage: Vec<T> = (0..capacity).map(factory).collect();

        // Reverse order so slot 0 is handed out first
        let free_list: Vec<usize> = (0..capacity).rev().collect();

        Self {
            storage: storage.into_boxed_slice(),
            live: vec![false; capacity].into_boxed_slice(),
            free_list,
        }
    }

    /// Returns the total capacity.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    /// Returns the number of instances currently handed out.
    #[inline]
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.capacity() - self.free_list.len()
    }

    /// Returns the number of free slots.
    #[inline]
    #[must_use]
    pub fn free_count(&self) -> usize {
        self.free_list.len()
    }

    /// Returns `true` when every instance is handed out.
    #[inline]
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.free_list.is_empty()
    }

    /// Hands out one free instance.
    ///
    /// This is a **O(1)** operation with **zero heap allocations**.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::PoolExhausted`] when every instance is in use.
    pub fn alloc(&mut self) -> CoreResult<PoolHandle> {
        let index = self.free_list.pop().ok_or(CoreError::PoolExhausted {
            capacity: self.capacity(),
        })?;
        self.live[index] = true;
        Ok(PoolHandle { index })
    }

    /// Returns an instance to the pool.
    ///
    /// The instance keeps whatever state it had; the next owner resets it.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::DoubleFree`] if the slot is already free and
    /// [`CoreError::InvalidHandle`] if the handle is out of range.
    pub fn free(&mut self, handle: PoolHandle) -> CoreResult<()> {
        let capacity = self.capacity();
        let live = self
            .live
            .get_mut(handle.index)
            .ok_or(CoreError::InvalidHandle {
                index: handle.index,
                capacity,
            })?;
        if !*live {
            return Err(CoreError::DoubleFree {
                index: handle.index,
            });
        }
        *live = false;
        self.free_list.push(handle.index);
        Ok(())
    }

    /// Returns `true` if the handle refers to a handed-out instance.
    #[inline]
    #[must_use]
    pub fn is_live(&self, handle: PoolHandle) -> bool {
        self.live.get(handle.index).copied().unwrap_or(false)
    }

    /// Returns the handle for slot `index` if that slot is live.
    ///
    /// Lets callers walk the pool by index while mutating other state.
    #[inline]
    #[must_use]
    pub fn handle_at(&self, index: usize) -> Option<PoolHandle> {
        self.is_live(PoolHandle { index }).then_some(PoolHandle { index })
    }

    /// Gets a reference to a live instance.
    #[inline]
    #[must_use]
    pub fn get(&self, handle: PoolHandle) -> Option<&T> {
        if self.is_live(handle) {
            self.storage.get(handle.index)
        } else {
            None
        }
    }

    /// Gets a mutable reference to a live instance.
    #[inline]
    pub fn get_mut(&mut self, handle: PoolHandle) -> Option<&mut T> {
        if self.is_live(handle) {
            self.storage.get_mut(handle.index)
        } else {
            None
        }
    }

    /// Returns every instance to the pool.
    ///
    /// This is a **zero-heap-allocation** operation - instances stay built.
    pub fn clear(&mut self) {
        self.live.fill(false);
        self.free_list.clear();
        self.free_list.extend((0..self.capacity()).rev());
    }

    /// Iterates over all live instances in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (PoolHandle, &T)> {
        self.storage
            .iter()
            .zip(self.live.iter())
            .enumerate()
            .filter_map(|(index, (value, live))| live.then_some((PoolHandle { index }, value)))
    }

    /// Handles of every live instance, in slot order.
    pub fn handles(&self) -> impl Iterator<Item = PoolHandle> + '_ {
        self.live
            .iter()
            .enumerate()
            .filter_map(|(index, live)| live.then_some(PoolHandle { index }))
    }

    /// Iterates mutably over all live instances in slot order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (PoolHandle, &mut T)> {
        self.storage
            .iter_mut()
            .zip(self.live.iter())
            .enumerate()
            .filter_map(|(index, (value, live))| live.then_some((PoolHandle { index }, value)))
    }
}

impl<T: Default> ObjectPool<T> {
    /// Creates a pool of default-constructed instances.
    #[must_use]
    pub fn with_default(capacity: usize) -> Self {
        Self::new(capacity, |_| T::default())
    }
}

impl<T> std::fmt::Debug for ObjectPool<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectPool")
            .field("capacity", &self.capacity())
            .field("live", &self.live_count())
            .finish()
    }
}
