//! Fixed-capacity ring FIFO with stack-allocated storage and an
//! overwrite-oldest push variant.
//!
//! # Invariants
//! - `N > 0` and `N <= 255` (validated at compile time).
//! - `head` is the next write slot, `tail` the oldest element; both are
//!   `< N`. `len` counts initialized elements, `len <= N`.
//! - Slots in the logical range `[tail, tail + len)` (wrapping by capacity)
//!   are initialized; all other slots are uninitialized.
//! - When `len == N`, `head == tail`.
//!
//! When `N` is a power of two the wrap uses a bitmask; otherwise a
//! compare-and-reset. The branch is on a const expression, so either way
//! there is no division in the hot path.
//!
//! # Threading
//! This type is not synchronized; it assumes single-threaded usage.

use std::mem::MaybeUninit;

/// Ring-buffer FIFO with compile-time capacity.
pub struct FixedQueue<T, const N: usize> {
    buf: [MaybeUninit<T>; N],
    /// Next write slot.
    head: u8,
    /// Oldest element.
    tail: u8,
    len: u8,
}

fn uninit_array<T, const N: usize>() -> [MaybeUninit<T>; N] {
    // SAFETY: An uninitialized MaybeUninit<T> is valid.
    unsafe { MaybeUninit::<[MaybeUninit<T>; N]>::uninit().assume_init() }
}

impl<T, const N: usize> FixedQueue<T, N> {
    const CAPACITY: u8 = {
        assert!(N > 0, "FixedQueue capacity must be > 0");
        assert!(N <= 255, "FixedQueue capacity must fit in a byte");
        N as u8
    };

    /// Constructs an empty queue without heap allocation.
    pub fn new() -> Self {
        Self {
            buf: uninit_array(),
            head: 0,
            tail: 0,
            len: 0,
        }
    }

    /// Advances a ring index by one slot.
    #[inline]
    fn advance(i: u8) -> u8 {
        if N.is_power_of_two() {
            (i + 1) & (Self::CAPACITY - 1)
        } else if i + 1 == Self::CAPACITY {
            0
        } else {
            i + 1
        }
    }

    #[inline]
    pub fn capacity(&self) -> u8 {
        Self::CAPACITY
    }

    /// Number of initialized elements currently stored.
    #[inline]
    pub fn len(&self) -> u8 {
        self.len
    }

    /// Returns true when no elements are stored.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns true when `len == capacity`.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.len == Self::CAPACITY
    }

    /// Attempts to append `value`, returning `Err(value)` if the queue is
    /// already full.
    ///
    /// This keeps ownership with the caller on overflow instead of dropping
    /// silently.
    #[inline]
    pub fn try_push(&mut self, value: T) -> Result<(), T> {
        if self.is_full() {
            return Err(value);
        }
        self.buf[usize::from(self.head)].write(value);
        self.head = Self::advance(self.head);
        self.len += 1;
        Ok(())
    }

    /// Appends `value`, dropping the oldest element first when full.
    ///
    /// Always succeeds; returns `true` for symmetry with `try_push` call
    /// sites that only care about "did the value land".
    pub fn push_overwrite(&mut self, value: T) -> bool {
        if self.is_full() {
            debug_assert!(self.head == self.tail);
            // SAFETY: full queue, so the slot at `head` (== `tail`) holds
            // the initialized oldest element; it is dropped before the
            // overwrite and both cursors advance so FIFO order holds.
            unsafe { self.buf[usize::from(self.head)].assume_init_drop() };
            self.buf[usize::from(self.head)].write(value);
            self.head = Self::advance(self.head);
            self.tail = Self::advance(self.tail);
            return true;
        }
        let _ = self.try_push(value);
        true
    }

    /// Removes and returns the oldest element, or `None` when empty.
    #[inline]
    pub fn try_pop(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        // SAFETY: `len > 0`, so the slot at `tail` is initialized; reading
        // it out and advancing `tail` marks the slot uninitialized again.
        let value = unsafe { self.buf[usize::from(self.tail)].as_ptr().read() };
        self.tail = Self::advance(self.tail);
        self.len -= 1;
        Some(value)
    }

    /// Borrows the oldest element without removal.
    #[inline]
    pub fn peek(&self) -> Option<&T> {
        if self.is_empty() {
            return None;
        }
        // SAFETY: `len > 0`, so the slot at `tail` is initialized.
        Some(unsafe { &*self.buf[usize::from(self.tail)].as_ptr() })
    }

    /// Removes all elements, dropping them in FIFO order.
    pub fn clear(&mut self) {
        let mut cursor = self.tail;
        for _ in 0..self.len {
            // SAFETY: walking exactly `len` slots from `tail` visits every
            // initialized element once.
            unsafe { self.buf[usize::from(cursor)].assume_init_drop() };
            cursor = Self::advance(cursor);
        }
        self.head = 0;
        self.tail = 0;
        self.len = 0;
    }
}

impl<T, const N: usize> Default for FixedQueue<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize> Drop for FixedQueue<T, N> {
    fn drop(&mut self) {
        self.clear();
    }
}
