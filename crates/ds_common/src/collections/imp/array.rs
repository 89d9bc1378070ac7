use std::{
    alloc::{self, Layout},
    marker::PhantomData,
    mem::{align_of, size_of},
    ptr::{self, NonNull},
};

use crate::collections::{ReserveStrategy, TryReserveError};

/// Low level utility for more ergonomically allocating, reallocating, and deallocating
/// a buffer of memory on the heap without having to worry about all the corner cases involved.
/// In particular:
///
/// - Produces `NonNull::dangling` on zero-sized types.
/// - Produces `NonNull::dangling` on zero-length allocations.
/// - Avoids freeing `NonNull::dangling`.
/// - Catches all overflows in capacity computations (promotes them to "capacity overflow" errors).
///
/// This type does not in any way inspect the memory it manages. When dropped it *will* free its memory, but it *won't* try to drop its contents.
/// It is up to the user of `RawArray` to handle the actual things *stored* inside of `RawArray`.
///
/// Zero-sized types never allocate, their capacity is only tracked as a number so it can be reported like any other capacity.
pub(crate) struct RawArray<T, R: ReserveStrategy> {
    ptr:      NonNull<T>,
    cap:      usize,
    _phantom: PhantomData<(T, fn() -> R)>,
}

// Safety: `RawArray` owns its buffer, so it is as thread-safe as `T` is
unsafe impl<T: Send, R: ReserveStrategy> Send for RawArray<T, R> {}
unsafe impl<T: Sync, R: ReserveStrategy> Sync for RawArray<T, R> {}

impl<T, R: ReserveStrategy> RawArray<T, R> {
    /// Creates an empty `RawArray` without allocating.
    #[must_use]
    pub const fn new() -> Self {
        Self { ptr: NonNull::dangling(), cap: 0, _phantom: PhantomData }
    }

    /// Creates a `RawArray` with exactly the capacity and alignment requirements for a `[T; capacity]`.
    /// This is equivalent to calling `RawArray::new` when `capacity` is `0`.
    ///
    /// # Panics
    ///
    /// Panics if the requested capacity exceeds `isize::MAX` bytes.
    ///
    /// # Aborts
    ///
    /// Aborts on OOM
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        match Self::try_with_capacity(capacity) {
            Ok(arr) => arr,
            Err(err) => handle_error(err),
        }
    }

    /// Tries to create a `RawArray` with exactly the capacity and alignment requirements for a `[T; capacity]`.
    pub fn try_with_capacity(capacity: usize) -> Result<Self, TryReserveError> {
        let mut arr = Self::new();
        arr.try_reallocate(capacity, 0)?;
        Ok(arr)
    }

    /// Get the capacity of the allocation.
    #[inline]
    pub const fn capacity(&self) -> usize {
        self.cap
    }

    /// Get a raw pointer to the start of the allocation.
    /// Note that this is a dangling pointer when either `capacity() == 0` or `T` is zero-sized.
    #[inline]
    pub const fn ptr(&self) -> *mut T {
        self.ptr.as_ptr()
    }

    /// Get a pointer to the allocation, or `None` when no buffer is held.
    #[inline]
    pub const fn data(&self) -> Option<NonNull<T>> {
        if self.cap == 0 {
            None
        } else {
            Some(self.ptr)
        }
    }

    fn current_memory(&self) -> Option<(NonNull<u8>, Layout)> {
        if size_of::<T>() == 0 || self.cap == 0 {
            None
        } else {
            // The memory has already been allocated with this layout, so it can't overflow
            debug_assert!(size_of::<T>() % align_of::<T>() == 0);
            unsafe {
                let layout = Layout::from_size_align_unchecked(size_of::<T>() * self.cap, align_of::<T>());
                Some((self.ptr.cast(), layout))
            }
        }
    }

    /// Grow the buffer to fit at least one more element, following the reserve strategy.
    ///
    /// The caller must ensure `len == self.capacity()`.
    ///
    /// # Panics
    ///
    /// Panics if the new capacity exceeds `isize::MAX` _bytes_.
    ///
    /// # Aborts
    ///
    /// Aborts on OOM.
    pub fn grow_one(&mut self, len: usize) {
        debug_assert_eq!(len, self.cap);
        if let Err(err) = self.try_grow_amortized(len, 1) {
            handle_error(err);
        }
    }

    /// Ensures that the buffer contains at least enough space to hold `len + additional` elements.
    /// If it doesn't already have enough capacity, will reallocate enough space plus slack space following the reserve strategy,
    /// to get amortized *O*(1) behavior.
    ///
    /// This is ideal for implementing a bulk-push operation like `extend`.
    ///
    /// # Panics
    ///
    /// Panics if the new capacity exceeds `isize::MAX` _bytes_.
    ///
    /// # Aborts
    ///
    /// Aborts on OOM.
    pub fn reserve(&mut self, len: usize, additional: usize) {
        // Keep the common case of enough capacity cheap, and move the error handling behind a cold call.
        #[cold]
        fn do_reserve_and_handle<T, R: ReserveStrategy>(slf: &mut RawArray<T, R>, len: usize, additional: usize) {
            if let Err(err) = slf.try_grow_amortized(len, additional) {
                handle_error(err);
            }
        }

        if self.needs_to_grow(len, additional) {
            do_reserve_and_handle(self, len, additional);
        }
    }

    /// The same as `reserve`, but returns on errors instead of panicking or aborting.
    pub fn try_grow_amortized(&mut self, len: usize, additional: usize) -> Result<(), TryReserveError> {
        if !self.needs_to_grow(len, additional) {
            return Ok(());
        }

        let required_cap = len.checked_add(additional).ok_or(TryReserveError::CapacityOverflow)?;
        let new_cap = R::calculate(self.cap, required_cap).ok_or(TryReserveError::CapacityOverflow)?;
        debug_assert!(new_cap >= required_cap);
        self.try_reallocate(new_cap, len)
    }

    /// Reallocate the buffer to exactly `new_cap` slots.
    ///
    /// # Panics
    ///
    /// Panics if the new capacity exceeds `isize::MAX` _bytes_.
    ///
    /// # Aborts
    ///
    /// Aborts on OOM.
    pub fn reallocate(&mut self, new_cap: usize, len: usize) {
        if let Err(err) = self.try_reallocate(new_cap, len) {
            handle_error(err);
        }
    }

    /// Reallocate the buffer to exactly `new_cap` slots, relocating the first `len` elements in index order.
    ///
    /// A `new_cap` equal to the current capacity does nothing, while a `new_cap` of 0 frees the buffer.
    /// On error, the buffer is left untouched.
    ///
    /// The caller must ensure that `len <= new_cap` and `len <= self.capacity()`.
    pub fn try_reallocate(&mut self, new_cap: usize, len: usize) -> Result<(), TryReserveError> {
        debug_assert!(len <= new_cap && len <= self.cap);

        if new_cap == self.cap {
            return Ok(());
        }

        if size_of::<T>() == 0 {
            if new_cap > isize::MAX as usize {
                return Err(TryReserveError::CapacityOverflow);
            }
            self.cap = new_cap;
            return Ok(());
        }

        let new_ptr = if new_cap == 0 {
            NonNull::dangling()
        } else {
            let layout = Layout::array::<T>(new_cap).map_err(|_| TryReserveError::CapacityOverflow)?;
            // Safety: `layout` has a non-zero size, as both `T` and `new_cap` are non-zero
            let raw = unsafe { alloc::alloc(layout) };
            let Some(new_ptr) = NonNull::new(raw.cast::<T>()) else {
                return Err(TryReserveError::AllocError(layout));
            };

            // Safety: the new buffer holds at least `len` slots and can't overlap with the old one
            unsafe { ptr::copy_nonoverlapping(self.ptr.as_ptr(), new_ptr.as_ptr(), len) };
            new_ptr
        };

        log_reallocation::<T>(self.cap, new_cap, len);

        if let Some((old_ptr, old_layout)) = self.current_memory() {
            unsafe { alloc::dealloc(old_ptr.as_ptr(), old_layout) };
        }
        self.ptr = new_ptr;
        self.cap = new_cap;
        Ok(())
    }

    /// Returns if the buffer needs to grow to fulfill the needed extra capacity.
    fn needs_to_grow(&self, len: usize, additional: usize) -> bool {
        additional > self.cap.wrapping_sub(len)
    }
}

impl<T, R: ReserveStrategy> Drop for RawArray<T, R> {
    fn drop(&mut self) {
        if let Some((ptr, layout)) = self.current_memory() {
            unsafe { alloc::dealloc(ptr.as_ptr(), layout) };
        }
    }
}

#[cfg(feature = "logging")]
const LOG_CAT: ds_logging::LogCategory = ds_logging::LogCategory::new_with_sub("Collections", "DynArr");

#[cfg(feature = "logging")]
fn log_reallocation<T>(old_cap: usize, new_cap: usize, len: usize) {
    ds_logging::log_debug!(LOG_CAT, "reallocating [{}] buffer: capacity {old_cap} -> {new_cap}, relocating {len} elements", core::any::type_name::<T>());
}

#[cfg(not(feature = "logging"))]
#[inline(always)]
fn log_reallocation<T>(_old_cap: usize, _new_cap: usize, _len: usize) {}

/// Central function for reserve error handling
#[cold]
#[track_caller]
fn handle_error(e: TryReserveError) -> ! {
    match e {
        TryReserveError::CapacityOverflow => capacity_overflow(),
        TryReserveError::AllocError(layout) => alloc::handle_alloc_error(layout),
    }
}

#[track_caller]
fn capacity_overflow() -> ! {
    panic!("capacity overflow");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collections::{DoubleOrMinReserveStrategy, Pow2ReserveStrategy};

    type Raw<T> = RawArray<T, DoubleOrMinReserveStrategy>;

    #[test]
    fn new_does_not_allocate() {
        let arr = Raw::<u32>::new();
        assert_eq!(arr.capacity(), 0);
        assert!(arr.data().is_none());
    }

    #[test]
    fn with_capacity_is_exact() {
        let arr = Raw::<u32>::with_capacity(13);
        assert_eq!(arr.capacity(), 13);
        assert!(arr.data().is_some());

        let arr = Raw::<u32>::with_capacity(0);
        assert!(arr.data().is_none());
    }

    #[test]
    fn capacity_overflow_is_reported() {
        assert_eq!(Raw::<u32>::try_with_capacity(usize::MAX).err(), Some(TryReserveError::CapacityOverflow));
        assert_eq!(Raw::<u64>::try_with_capacity(isize::MAX as usize / 4).err(), Some(TryReserveError::CapacityOverflow));
    }

    #[test]
    fn grow_one_doubles() {
        // Only the length bookkeeping matters here, nothing gets written
        let mut arr = Raw::<u8>::new();
        let mut len = 0;
        let mut caps = Vec::new();
        while len < 100 {
            if len == arr.capacity() {
                arr.grow_one(len);
                caps.push(arr.capacity());
            }
            len += 1;
        }
        assert_eq!(caps, [1, 2, 4, 8, 16, 32, 64, 128]);
    }

    #[test]
    fn grow_amortized_uses_strategy() {
        let mut arr = RawArray::<u16, Pow2ReserveStrategy>::new();
        arr.try_grow_amortized(0, 5).unwrap();
        assert_eq!(arr.capacity(), 8);

        // enough space, nothing happens
        arr.try_grow_amortized(3, 5).unwrap();
        assert_eq!(arr.capacity(), 8);

        arr.try_grow_amortized(8, 1).unwrap();
        assert_eq!(arr.capacity(), 16);

        assert_eq!(arr.try_grow_amortized(16, usize::MAX), Err(TryReserveError::CapacityOverflow));
        assert_eq!(arr.capacity(), 16);
    }

    #[test]
    fn reallocate_relocates_elements() {
        let mut arr = Raw::<u32>::with_capacity(4);
        unsafe {
            for i in 0..4 {
                arr.ptr().add(i).write(i as u32 * 10);
            }
        }
        let old = arr.data();

        arr.reallocate(10, 4);
        assert_eq!(arr.capacity(), 10);
        assert_ne!(arr.data(), old);
        let contents = unsafe { core::slice::from_raw_parts(arr.ptr(), 4) };
        assert_eq!(contents, [0, 10, 20, 30]);

        arr.reallocate(2, 2);
        assert_eq!(arr.capacity(), 2);
        let contents = unsafe { core::slice::from_raw_parts(arr.ptr(), 2) };
        assert_eq!(contents, [0, 10]);
    }

    #[test]
    fn reallocate_same_capacity_is_noop() {
        let mut arr = Raw::<u32>::with_capacity(4);
        let old = arr.data();
        arr.reallocate(4, 0);
        assert_eq!(arr.data(), old);
    }

    #[test]
    fn reallocate_to_zero_frees() {
        let mut arr = Raw::<u32>::with_capacity(4);
        arr.reallocate(0, 0);
        assert_eq!(arr.capacity(), 0);
        assert!(arr.data().is_none());
    }

    #[test]
    fn zero_sized() {
        let mut arr = Raw::<()>::new();
        assert!(arr.data().is_none());

        arr.grow_one(0);
        assert_eq!(arr.capacity(), 1);
        assert!(arr.data().is_some());

        arr.reallocate(1000, 1);
        assert_eq!(arr.capacity(), 1000);
        assert_eq!(arr.try_reallocate(usize::MAX, 0), Err(TryReserveError::CapacityOverflow));
    }
}
