use core::{
    fmt,
    hash::Hash,
    iter,
    mem::{self, ManuallyDrop},
    ops::{self, Index, IndexMut},
    ptr::{self, NonNull},
    slice::{self, SliceIndex},
};
use static_assertions as sa;

use super::{
    imp::array::RawArray,
    Cursor, CursorMut, DoubleOrMinReserveStrategy, DynArrError, ReserveStrategy, TryReserveError, impl_slice_partial_eq_generic,
};

mod into_iter;

pub use into_iter::IntoIter;

/// Creates a [`DynArr`] containing the arguments.
///
/// `dynarr!` allows `DynArr`s to be defined with the same syntax as array expressions.
/// There are two forms of this macro:
///
/// - Create a [`DynArr`] containing a given list of elements:
///
/// ```
/// use ds_common::dynarr;
///
/// let arr = dynarr![1, 2, 3];
/// assert_eq!(arr[0], 1);
/// assert_eq!(arr.capacity(), 3);
/// ```
///
/// - Create a [`DynArr`] from a given element and size:
///
/// ```
/// use ds_common::dynarr;
///
/// let arr = dynarr![1; 3];
/// assert_eq!(arr, [1, 1, 1]);
/// ```
///
/// The second form requires `T` to implement [`Clone`], and evaluates the element only once.
#[macro_export]
macro_rules! dynarr {
    () => {
        $crate::collections::DynArr::<_>::new()
    };
    ($elem:expr; $n:expr) => {
        $crate::collections::DynArr::<_>::from_elem($n, $elem)
    };
    ($($val:expr),+ $(,)?) => {
        {
            let mut arr = $crate::collections::DynArr::<_>::with_capacity($crate::count_exprs!($($val),+));
            $(
                arr.push($val);
            )+
            arr
        }
    };
}

/// A contiguous growable array type, also known as a dynamic array, or DynArr.
///
/// Dynamic arrays have *O*(1) indexing, amortized *O*(1) push (to the end), and *O*(1) pop (from the back).
///
/// _Note: It was decided to not name this `Vec` as in the standard library, as this is easily confusable with a math vector_
///
/// # Examples
///
/// ```
/// use ds_common::{dynarr, collections::DynArr};
///
/// let mut arr = DynArr::<i32>::new();
/// arr.push(1);
/// arr.push(2);
///
/// assert_eq!(arr.len(), 2);
/// assert_eq!(arr[0], 1);
///
/// arr[0] = 7;
/// assert_eq!(arr[0], 7);
///
/// arr.extend([1, 2, 3]);
/// assert_eq!(arr, [7, 2, 1, 2, 3]);
/// ```
///
/// # Indexing
///
/// Three tiers of element access are provided:
///
/// - [`at`] and [`at_mut`] return a [`DynArrError::IndexOutOfRange`] for an index outside of `[0, len)`.
/// - The [`Index`] trait (`arr[i]`) panics for an index outside of `[0, len)`.
/// - `get_unchecked` (through the slice the dynamic array dereferences to) skips the check completely, and is therefore `unsafe`.
///
/// # Capacity and reallocation
///
/// The capacity of a dynamic array is the amount of space allocated for any future elements that will be added onto the dynamic array.
/// This is not to be confused with the *length* of the dynamic array, which specifies the number of actual elements within the dynamic array.
/// If a dynamic array's length exceeds its capacity, its capacity will automatically be increased, but its elements will have to be reallocated.
///
/// Appending ([`push`], [`insert`] and `extend`) grows the buffer following the reserve strategy `R`,
/// by default doubling the capacity, starting at 1.
/// All explicitly sized operations ([`reserve`], [`with_capacity`], [`from_elem`], [`resize`] and the `assign` family)
/// allocate exactly the requested capacity.
///
/// `DynArr` will never automatically shrink itself, even if completely empty.
/// If you wish to free up unused memory use [`shrink_to_fit`] or [`shrink_to`].
///
/// Any reallocation moves the elements to a new buffer, invalidating all pointers into the old one.
/// [`Cursor`]s borrow the dynamic array, so they can't outlive such a reallocation.
///
/// [`at`]: DynArr::at
/// [`at_mut`]: DynArr::at_mut
/// [`push`]: DynArr::push
/// [`insert`]: DynArr::insert
/// [`reserve`]: DynArr::reserve
/// [`with_capacity`]: DynArr::with_capacity
/// [`from_elem`]: DynArr::from_elem
/// [`resize`]: DynArr::resize
/// [`shrink_to_fit`]: DynArr::shrink_to_fit
/// [`shrink_to`]: DynArr::shrink_to
pub struct DynArr<T, R: ReserveStrategy = DoubleOrMinReserveStrategy> {
    arr: RawArray<T, R>,
    len: usize,
}

sa::assert_impl_all!(DynArr<u32>: Send, Sync, Clone, Default, Eq, Ord, Hash, fmt::Debug);
sa::assert_not_impl_any!(DynArr<std::rc::Rc<u32>>: Send, Sync);

impl<T, R: ReserveStrategy> DynArr<T, R> {
    /// Maximum number of elements a `DynArr<T>` can hold, the largest element count whose size in bytes fits in an `isize`.
    pub const MAX_SIZE: usize = isize::MAX as usize / if mem::size_of::<T>() == 0 { 1 } else { mem::size_of::<T>() };

    /// Constructs a new, empty `DynArr<T, R>`.
    ///
    /// The dynamic array will not allocate until elements are pushed onto it.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self { arr: RawArray::new(), len: 0 }
    }

    /// Constructs a new `DynArr<T, R>` with exactly the specified capacity.
    ///
    /// If `capacity` is 0, the dynamic array will not allocate.
    ///
    /// # Panics
    ///
    /// Panics if the new capacity exceeds `isize::MAX` _bytes_.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self { arr: RawArray::with_capacity(capacity), len: 0 }
    }

    /// Tries to construct a new `DynArr<T, R>` with exactly the specified capacity.
    ///
    /// # Errors
    ///
    /// Returns an error if the capacity exceeds `isize::MAX` _bytes_, or if the allocator reports an allocation failure.
    pub fn try_with_capacity(capacity: usize) -> Result<Self, TryReserveError> {
        Ok(Self { arr: RawArray::try_with_capacity(capacity)?, len: 0 })
    }

    /// Returns the total number of elements the dynamic array can hold without reallocating.
    #[inline]
    pub const fn capacity(&self) -> usize {
        self.arr.capacity()
    }

    /// Returns the number of elements in the dynamic array, also referred to as the 'length'.
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the dynamic array contains no elements.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the maximum number of elements the dynamic array could ever hold, see [`DynArr::MAX_SIZE`].
    ///
    /// ```
    /// use ds_common::collections::DynArr;
    ///
    /// assert_eq!(DynArr::<u8>::new().max_size(), isize::MAX as usize);
    /// assert_eq!(DynArr::<i32>::new().max_size(), 2305843009213693951);
    /// ```
    #[inline]
    pub const fn max_size(&self) -> usize {
        Self::MAX_SIZE
    }

    fn invalid_size(&self, requested: usize) -> DynArrError {
        DynArrError::InvalidSize { requested, len: self.len, max: Self::MAX_SIZE }
    }

    /// Makes sure the capacity is exactly `new_capacity` if it is currently smaller.
    fn grow_exact_to(&mut self, new_capacity: usize) {
        if new_capacity > self.capacity() {
            self.arr.reallocate(new_capacity, self.len);
        }
    }

    /// Reserves capacity for a total of `new_capacity` elements.
    ///
    /// Unlike `Vec::reserve`, the argument is the absolute capacity, not the number of additional elements.
    /// Does nothing if the capacity is already sufficient, otherwise reallocates to exactly `new_capacity`.
    /// Never shrinks the dynamic array.
    ///
    /// # Errors
    ///
    /// Returns [`DynArrError::InvalidSize`] if `new_capacity` exceeds [`max_size`](DynArr::max_size), the dynamic array is left untouched.
    ///
    /// # Aborts
    ///
    /// Aborts on OOM.
    ///
    /// # Examples
    ///
    /// ```
    /// use ds_common::dynarr;
    ///
    /// let mut arr = dynarr![1];
    /// arr.reserve(10).unwrap();
    /// assert_eq!(arr.capacity(), 10);
    ///
    /// arr.reserve(5).unwrap();
    /// assert_eq!(arr.capacity(), 10);
    /// ```
    pub fn reserve(&mut self, new_capacity: usize) -> Result<(), DynArrError> {
        if new_capacity > Self::MAX_SIZE {
            return Err(self.invalid_size(new_capacity));
        }
        self.grow_exact_to(new_capacity);
        Ok(())
    }

    /// Shrinks the capacity of the dynamic array to exactly its length.
    ///
    /// An empty dynamic array releases its buffer completely.
    ///
    /// # Examples
    ///
    /// ```
    /// use ds_common::collections::DynArr;
    ///
    /// let mut arr = DynArr::<i32>::with_capacity(10);
    /// arr.extend([1, 2, 3]);
    /// assert_eq!(arr.capacity(), 10);
    /// arr.shrink_to_fit();
    /// assert_eq!(arr.capacity(), 3);
    /// ```
    pub fn shrink_to_fit(&mut self) {
        if self.capacity() > self.len {
            self.arr.reallocate(self.len, self.len);
        }
    }

    /// Shrinks the capacity of the dynamic array to exactly `capacity`.
    ///
    /// If the current capacity is already less or equal to `capacity`, this is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`DynArrError::InvalidSize`] when `capacity` is less than the length, the dynamic array is left untouched.
    ///
    /// # Examples
    ///
    /// ```
    /// use ds_common::collections::DynArr;
    ///
    /// let mut arr = DynArr::<i32>::with_capacity(10);
    /// arr.extend([1, 2, 3]);
    /// arr.shrink_to(4).unwrap();
    /// assert_eq!(arr.capacity(), 4);
    /// assert!(arr.shrink_to(2).is_err());
    /// assert_eq!(arr.capacity(), 4);
    /// ```
    pub fn shrink_to(&mut self, capacity: usize) -> Result<(), DynArrError> {
        if capacity < self.len {
            return Err(self.invalid_size(capacity));
        }
        if capacity < self.capacity() {
            self.arr.reallocate(capacity, self.len);
        }
        Ok(())
    }

    /// Shortens the dynamic array, keeping the first `len` elements and dropping the rest.
    ///
    /// If `len` is greater or equal to the dynamic array's current length, this has no effect.
    ///
    /// Note that this method has no effect on the allocated capacity of the dynamic array.
    pub fn truncate(&mut self, len: usize) {
        // Safety:
        // - The slice passed to `drop_in_place` is valid; the `len >= self.len` case avoids creating an invalid slice, and
        // - The `len` of the dynamic array is shrunk before calling `drop_in_place` such that no value will be dropped twice
        //   in case `drop_in_place` were to panic once (if it panics twice, the program aborts.)
        unsafe {
            if len >= self.len {
                return;
            }
            let remaining_len = self.len - len;
            let s = ptr::slice_from_raw_parts_mut(self.as_mut_ptr().add(len), remaining_len);
            self.len = len;
            ptr::drop_in_place(s);
        }
    }

    /// Extracts a slice containing the entire dynamic array.
    ///
    /// Equivalent to `&s[..]`.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        self
    }

    /// Extracts a mutable slice of the entire dynamic array.
    ///
    /// Equivalent to `&mut s[..]`.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        self
    }

    /// Returns a raw pointer to the dynamic array's buffer, or a dangling raw pointer valid for zero sized reads if the dynamic array didn't allocate.
    ///
    /// The caller must ensure that the dynamic array outlives the pointer this function returns, or else it will end up pointing to garbage.
    /// Modifying the dynamic array may cause its buffer to be reallocated, which would also make any pointer to it invalid.
    #[inline]
    pub fn as_ptr(&self) -> *const T {
        self.arr.ptr()
    }

    /// Returns an unsafe mutable pointer to the dynamic array's buffer, or a dangling raw pointer valid for zero sized reads if the dynamic array didn't allocate.
    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.arr.ptr()
    }

    /// Returns a pointer to the start of the buffer, or `None` when the dynamic array holds no buffer (`capacity() == 0`).
    ///
    /// ```
    /// use ds_common::collections::DynArr;
    ///
    /// let mut arr = DynArr::<u8>::new();
    /// assert!(arr.data().is_none());
    /// arr.push(1);
    /// assert!(arr.data().is_some());
    /// ```
    #[inline]
    pub fn data(&self) -> Option<NonNull<T>> {
        self.arr.data()
    }

    /// Forces the length of the dynamic array to `new_len`.
    ///
    /// # Safety
    ///
    /// - `new_len` must be less than or equal to [`capacity()`](DynArr::capacity).
    /// - The elements at `old_len..new_len` must be initialized.
    #[inline]
    pub unsafe fn set_len(&mut self, new_len: usize) {
        debug_assert!(new_len <= self.capacity());
        self.len = new_len;
    }

    /// Returns a reference to the element at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`DynArrError::IndexOutOfRange`] when `index >= len`.
    ///
    /// ```
    /// use ds_common::{dynarr, collections::DynArrError};
    ///
    /// let arr = dynarr![10, 40, 30];
    /// assert_eq!(arr.at(1), Ok(&40));
    /// assert_eq!(arr.at(3), Err(DynArrError::IndexOutOfRange { index: 3, len: 3 }));
    /// ```
    pub fn at(&self, index: usize) -> Result<&T, DynArrError> {
        let len = self.len;
        self.as_slice().get(index).ok_or(DynArrError::IndexOutOfRange { index, len })
    }

    /// Returns a mutable reference to the element at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`DynArrError::IndexOutOfRange`] when `index >= len`.
    pub fn at_mut(&mut self, index: usize) -> Result<&mut T, DynArrError> {
        let len = self.len;
        self.as_mut_slice().get_mut(index).ok_or(DynArrError::IndexOutOfRange { index, len })
    }

    /// Returns a reference to the first element.
    ///
    /// # Panics
    ///
    /// Panics if the dynamic array is empty.
    #[track_caller]
    pub fn front(&self) -> &T {
        match self.first() {
            Some(val) => val,
            None => empty_access("front"),
        }
    }

    /// Returns a mutable reference to the first element.
    ///
    /// # Panics
    ///
    /// Panics if the dynamic array is empty.
    #[track_caller]
    pub fn front_mut(&mut self) -> &mut T {
        match self.first_mut() {
            Some(val) => val,
            None => empty_access("front_mut"),
        }
    }

    /// Returns a reference to the last element.
    ///
    /// # Panics
    ///
    /// Panics if the dynamic array is empty.
    #[track_caller]
    pub fn back(&self) -> &T {
        match self.last() {
            Some(val) => val,
            None => empty_access("back"),
        }
    }

    /// Returns a mutable reference to the last element.
    ///
    /// # Panics
    ///
    /// Panics if the dynamic array is empty.
    #[track_caller]
    pub fn back_mut(&mut self) -> &mut T {
        match self.last_mut() {
            Some(val) => val,
            None => empty_access("back_mut"),
        }
    }

    /// Returns a cursor to the first element.
    ///
    /// For an empty dynamic array, this is equal to [`end`](DynArr::end).
    pub fn begin(&self) -> Cursor<'_, T> {
        Cursor::new(self.as_slice(), self.cursor_owner(), 0)
    }

    /// Returns a cursor one past the last element.
    pub fn end(&self) -> Cursor<'_, T> {
        Cursor::new(self.as_slice(), self.cursor_owner(), self.len as isize)
    }

    /// Same as [`begin`](DynArr::begin), [`Cursor`]s never allow mutation.
    pub fn cbegin(&self) -> Cursor<'_, T> {
        self.begin()
    }

    /// Same as [`end`](DynArr::end), [`Cursor`]s never allow mutation.
    pub fn cend(&self) -> Cursor<'_, T> {
        self.end()
    }

    /// Returns a mutable cursor to the first element.
    ///
    /// ```
    /// use ds_common::dynarr;
    ///
    /// let mut arr = dynarr![1, 2, 3, 4];
    /// let mut it = arr.begin_mut();
    /// *it = 10;
    /// it += 2;
    /// it[1] = 40;
    /// it -= 1;
    /// it.as_mut_slice_to(3).fill(0);
    /// assert_eq!(arr, [10, 0, 0, 40]);
    ///
    /// let len = arr.len() as isize;
    /// arr.begin_mut().as_mut_slice_to(len).fill(5);
    /// assert_eq!(arr, [5, 5, 5, 5]);
    /// ```
    pub fn begin_mut(&mut self) -> CursorMut<'_, T> {
        let owner = self.cursor_owner();
        CursorMut::new(self.as_mut_slice(), owner, 0)
    }

    /// Returns a mutable cursor one past the last element.
    pub fn end_mut(&mut self) -> CursorMut<'_, T> {
        let owner = self.cursor_owner();
        let len = self.len as isize;
        CursorMut::new(self.as_mut_slice(), owner, len)
    }

    /// Cursors identify their dynamic array by its address, it can't move while they borrow it
    fn cursor_owner(&self) -> usize {
        self as *const Self as usize
    }

    /// Appends an element to the back of the dynamic array.
    ///
    /// # Panics
    ///
    /// Panics if the new capacity exceeds `isize::MAX` _bytes_.
    ///
    /// # Examples
    ///
    /// ```
    /// use ds_common::dynarr;
    ///
    /// let mut arr = dynarr![1, 2];
    /// arr.push(3);
    /// assert_eq!(arr, [1, 2, 3]);
    /// ```
    ///
    /// # Time complexity
    ///
    /// Takes amortized *O*(1) time.
    /// If the dynamic array's length would exceed its capacity after the push, *O*(*capacity*) time is taken to copy the dynamic array's elements to a larger buffer.
    /// This expensive operation is offset by the *capacity* *O*(1) insertions it allows.
    #[inline]
    pub fn push(&mut self, value: T) {
        // Inform codegen that the length does not change across grow_one()
        let len = self.len;
        if len == self.arr.capacity() {
            self.arr.grow_one(len);
        }
        unsafe {
            let end = self.as_mut_ptr().add(len);
            ptr::write(end, value);
            self.len += 1;
        }
    }

    /// Removes the last element from a dynamic array and returns it, or [`None`] if it is empty.
    ///
    /// The capacity is never changed.
    ///
    /// # Time complexity
    ///
    /// Takes *O*(1) time.
    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            None
        } else {
            unsafe {
                self.len -= 1;
                Some(ptr::read(self.as_ptr().add(self.len)))
            }
        }
    }

    /// Clears the dynamic array, removing all values.
    ///
    /// Note that this method has no effect on the allocated capacity of the dynamic array.
    #[inline]
    pub fn clear(&mut self) {
        let elems: *mut [T] = self.as_mut_slice();

        // Safety
        // - `elems` comes directly from `as_mut_slice` and is therefore valid.
        // - Setting `self.len` before calling `drop_in_place` means that if an element's `Drop` impl panics,
        // the dynamic array's `Drop` impl will do nothing (leaking the rest of the elements) instead of dropping some twice.
        unsafe {
            self.len = 0;
            ptr::drop_in_place(elems);
        }
    }

    /// Removes an element from the dynamic array and returns it.
    ///
    /// The removed element is replaced by the last element of the dynamic array.
    ///
    /// This does not preserve ordering of the remaining elements, but is *O*(1).
    /// If you need to preserve the element order, use [`remove`](DynArr::remove) instead.
    ///
    /// # Panics
    ///
    /// Panics when `index` is out of bounds.
    #[track_caller]
    pub fn swap_remove(&mut self, index: usize) -> T {
        #[cold]
        #[track_caller]
        fn assert_failed(index: usize, len: usize) -> ! {
            panic!("swap_remove index (is {index}) should be < len (is {len})");
        }

        let len = self.len;
        if index >= len {
            assert_failed(index, len);
        }
        unsafe {
            // We replace self[index] with the last element.
            // Note that if the bounds check above succeeds there must be a last element (which can be self[index] itself).
            let value = ptr::read(self.as_ptr().add(index));
            let base_ptr = self.as_mut_ptr();
            ptr::copy(base_ptr.add(len - 1), base_ptr.add(index), 1);
            self.set_len(len - 1);
            value
        }
    }

    /// Inserts an element at position `index` within the dynamic array, shifting all elements after it to the right.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`
    ///
    /// # Time complexity
    ///
    /// Takes *O*([`DynArr::len`]) time.
    #[track_caller]
    pub fn insert(&mut self, index: usize, element: T) {
        #[cold]
        #[track_caller]
        fn assert_failed(index: usize, len: usize) -> ! {
            panic!("insertion index (is {index}) should be <= len (is {len})");
        }

        let len = self.len;
        if index > len {
            assert_failed(index, len);
        }

        // Space for the new element
        if len == self.arr.capacity() {
            self.arr.grow_one(len);
        }

        unsafe {
            let p = self.as_mut_ptr().add(index);
            if index < len {
                // Shift everything over to make space.
                // (Duplicating the `index`th element into two consecutive places.)
                ptr::copy(p, p.add(1), len - index);
            }
            // Write it in, overwriting the first copy of the `index`th element.
            ptr::write(p, element);
            self.set_len(len + 1);
        }
    }

    /// Removes and returns the element at position `index` within the dynamic array, shifting all elements after it to the left.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[track_caller]
    pub fn remove(&mut self, index: usize) -> T {
        #[cold]
        #[track_caller]
        fn assert_failed(index: usize, len: usize) -> ! {
            panic!("removal index (is {index}) should be < len (is {len})");
        }

        let len = self.len;
        if index >= len {
            assert_failed(index, len);
        }
        unsafe {
            // the place we are taking from
            let ptr = self.as_mut_ptr().add(index);
            // copy it out, unsafely having a copy of the value on the stack and in the dynamic array at the same time
            let ret = ptr::read(ptr);

            // Shift everything down to fill in that spot
            ptr::copy(ptr.add(1), ptr, len - index - 1);
            self.set_len(len - 1);
            ret
        }
    }

    /// Moves the contents out of `self` in *O*(1), leaving `self` empty and without a buffer.
    ///
    /// ```
    /// use ds_common::dynarr;
    ///
    /// let mut src = dynarr![1, 2, 3];
    /// let dst = src.take();
    /// assert_eq!(dst, [1, 2, 3]);
    /// assert_eq!(src.capacity(), 0);
    /// assert!(src.data().is_none());
    /// ```
    #[must_use]
    pub fn take(&mut self) -> Self {
        mem::replace(self, Self::new())
    }

    /// Releases the current buffer and takes over the buffer of `other`, leaving `other` empty and without a buffer.
    ///
    /// Returns `self` so calls can be chained.
    pub fn move_from(&mut self, other: &mut Self) -> &mut Self {
        *self = other.take();
        self
    }

    /// Replaces the contents with the elements of `iter`.
    ///
    /// When the iterator reports an exact size, the buffer grows to exactly that size if it is too small, it never shrinks.
    ///
    /// # Errors
    ///
    /// Returns [`DynArrError::InvalidSize`] if the iterator reports more than [`DynArr::MAX_SIZE`] elements, the dynamic array is left untouched.
    ///
    /// ```
    /// use ds_common::collections::DynArr;
    ///
    /// let mut arr = DynArr::<i32>::from([1, 2, 3]);
    /// arr.assign_iter(4..6).unwrap().push(6);
    /// assert_eq!(arr, [4, 5, 6]);
    ///
    /// assert!(arr.assign_iter(std::iter::repeat(0).take(usize::MAX)).is_err());
    /// assert_eq!(arr, [4, 5, 6]);
    /// ```
    pub fn assign_iter<I: IntoIterator<Item = T>>(&mut self, iter: I) -> Result<&mut Self, DynArrError> {
        let iter = iter.into_iter();
        let (lower, _) = iter.size_hint();
        if lower > Self::MAX_SIZE {
            return Err(self.invalid_size(lower));
        }
        self.clear();
        self.grow_exact_to(lower);
        self.extend_desugared(iter);
        Ok(self)
    }

    /// Appends the elements of `iter` to the back, the capacity must already fit all of them.
    ///
    /// When the iterator panics, the elements written so far are kept.
    unsafe fn extend_trusted<I: Iterator<Item = T>>(&mut self, iter: I) {
        let base = self.arr.ptr();
        let cap = self.arr.capacity();
        let mut len = scopeguard::guard(self.len, |len| self.len = len);
        for element in iter {
            debug_assert!(*len < cap);
            ptr::write(base.add(*len), element);
            *len += 1;
        }
    }

    /// leaf method to which iterator based extension delegates
    fn extend_desugared<I: Iterator<Item = T>>(&mut self, mut iter: I) {
        // This is the case for the general iterator
        //
        // This function should be the moral equivalent of:
        //
        //     for item in iter {
        //         self.push(item);
        //     }
        while let Some(element) = iter.next() {
            let len = self.len;
            if len == self.capacity() {
                let (lower, _) = iter.size_hint();
                self.arr.reserve(len, lower.saturating_add(1));
            }
            unsafe {
                ptr::write(self.as_mut_ptr().add(len), element);
                // Since next() executes user code which can panic we have to bump the length after each step
                self.set_len(len + 1);
            }
        }
    }
}

impl<T: Clone, R: ReserveStrategy> DynArr<T, R> {
    /// Creates a dynamic array holding `n` clones of `value`, with a capacity of exactly `n`.
    ///
    /// # Panics
    ///
    /// Panics if the capacity exceeds `isize::MAX` _bytes_.
    pub fn from_elem(n: usize, value: T) -> Self {
        let mut arr = Self::with_capacity(n);
        unsafe { arr.extend_trusted(iter::repeat(value).take(n)) };
        arr
    }

    /// Tries to create a dynamic array holding `n` clones of `value`, with a capacity of exactly `n`.
    ///
    /// # Errors
    ///
    /// Returns [`DynArrError::InvalidSize`] if `n` exceeds [`DynArr::MAX_SIZE`].
    ///
    /// ```
    /// use ds_common::collections::{DynArr, DynArrError};
    ///
    /// let arr = DynArr::<i32>::try_from_elem(4, 7).unwrap();
    /// assert_eq!(arr, [7, 7, 7, 7]);
    ///
    /// // e.g. a negative count that got converted to an unsigned one
    /// let err = DynArr::<i32>::try_from_elem(-1i64 as usize, 7);
    /// assert!(matches!(err, Err(DynArrError::InvalidSize { .. })));
    /// ```
    pub fn try_from_elem(n: usize, value: T) -> Result<Self, DynArrError> {
        if n > Self::MAX_SIZE {
            return Err(DynArrError::InvalidSize { requested: n, len: 0, max: Self::MAX_SIZE });
        }
        Ok(Self::from_elem(n, value))
    }

    /// Creates a dynamic array holding a copy of the elements in `[first, last)`.
    ///
    /// # Panics
    ///
    /// Panics if the cursors don't describe a valid range of the same dynamic array.
    #[track_caller]
    pub fn from_cursors(first: Cursor<'_, T>, last: Cursor<'_, T>) -> Self {
        Self::from(first.as_slice_to(last))
    }

    /// Replaces the contents with `count` clones of `value`.
    ///
    /// The buffer grows to exactly `count` if it is too small, it never shrinks.
    ///
    /// # Errors
    ///
    /// Returns [`DynArrError::InvalidSize`] if `count` exceeds [`DynArr::MAX_SIZE`], the dynamic array is left untouched.
    pub fn assign(&mut self, count: usize, value: T) -> Result<&mut Self, DynArrError> {
        if count > Self::MAX_SIZE {
            return Err(self.invalid_size(count));
        }
        self.clear();
        self.grow_exact_to(count);
        unsafe { self.extend_trusted(iter::repeat(value).take(count)) };
        Ok(self)
    }

    /// Replaces the contents with clones of the elements in `values`.
    ///
    /// The buffer grows to exactly `values.len()` if it is too small, it never shrinks.
    ///
    /// ```
    /// use ds_common::collections::DynArr;
    ///
    /// let mut arr = DynArr::<i32>::from_elem(100, 0);
    /// arr.assign_slice(&[1, 2, 3, 4]);
    /// assert_eq!(arr, [1, 2, 3, 4]);
    /// assert_eq!(arr.capacity(), 100);
    /// ```
    pub fn assign_slice(&mut self, values: &[T]) -> &mut Self {
        self.clear();
        self.grow_exact_to(values.len());
        unsafe { self.extend_trusted(values.iter().cloned()) };
        self
    }

    /// Replaces the contents with clones of the elements in `[first, last)`.
    ///
    /// # Panics
    ///
    /// Panics if the cursors don't describe a valid range of the same dynamic array.
    #[track_caller]
    pub fn assign_range(&mut self, first: Cursor<'_, T>, last: Cursor<'_, T>) -> &mut Self {
        self.assign_slice(first.as_slice_to(last))
    }

    /// Overwrites the contents with clones of the elements of `other`, reusing the current buffer when it is large enough.
    pub fn assign_from(&mut self, other: &Self) -> &mut Self {
        self.assign_slice(other.as_slice())
    }

    /// Resizes the `DynArr` in-place so that `len` is equal to `new_len`.
    ///
    /// If `new_len` is greater than `len`, the `DynArr` is extended by the difference, with each additional slot filled with `value`.
    /// The buffer grows to exactly `new_len` when it is too small.
    /// If `new_len` is less than `len`, the `DynArr` is simply truncated.
    ///
    /// # Examples
    ///
    /// ```
    /// use ds_common::dynarr;
    ///
    /// let mut arr = dynarr!["hello"];
    /// arr.resize(3, "world");
    /// assert_eq!(arr, ["hello", "world", "world"]);
    ///
    /// let mut arr = dynarr![1, 2, 3, 4];
    /// arr.resize(2, 0);
    /// assert_eq!(arr, [1, 2]);
    /// ```
    pub fn resize(&mut self, new_len: usize, value: T) {
        let len = self.len;

        if new_len > len {
            self.grow_exact_to(new_len);
            unsafe { self.extend_trusted(iter::repeat(value).take(new_len - len)) };
        } else {
            self.truncate(new_len);
        }
    }

    /// Clones and appends all elements in a slice to the `DynArr`.
    ///
    /// # Examples
    ///
    /// ```
    /// use ds_common::dynarr;
    ///
    /// let mut arr = dynarr![1];
    /// arr.extend_from_slice(&[2, 3, 4]);
    /// assert_eq!(arr, [1, 2, 3, 4]);
    /// ```
    pub fn extend_from_slice(&mut self, other: &[T]) {
        self.arr.reserve(self.len, other.len());
        unsafe { self.extend_trusted(other.iter().cloned()) };
    }
}

impl<T: Default, R: ReserveStrategy> DynArr<T, R> {
    /// Creates a dynamic array holding `n` default values, with a capacity of exactly `n`.
    ///
    /// # Panics
    ///
    /// Panics if the capacity exceeds `isize::MAX` _bytes_.
    pub fn with_len(n: usize) -> Self {
        let mut arr = Self::with_capacity(n);
        unsafe { arr.extend_trusted(iter::repeat_with(T::default).take(n)) };
        arr
    }

    /// Tries to create a dynamic array holding `n` default values, with a capacity of exactly `n`.
    ///
    /// # Errors
    ///
    /// Returns [`DynArrError::InvalidSize`] if `n` exceeds [`DynArr::MAX_SIZE`].
    pub fn try_with_len(n: usize) -> Result<Self, DynArrError> {
        if n > Self::MAX_SIZE {
            return Err(DynArrError::InvalidSize { requested: n, len: 0, max: Self::MAX_SIZE });
        }
        Ok(Self::with_len(n))
    }
}

#[cold]
#[track_caller]
fn empty_access(func: &str) -> ! {
    panic!("`{func}` called on an empty DynArr");
}

impl<T, R: ReserveStrategy> ops::Deref for DynArr<T, R> {
    type Target = [T];

    #[inline]
    fn deref(&self) -> &Self::Target {
        unsafe { slice::from_raw_parts(self.as_ptr(), self.len) }
    }
}

impl<T, R: ReserveStrategy> ops::DerefMut for DynArr<T, R> {
    #[inline]
    fn deref_mut(&mut self) -> &mut Self::Target {
        unsafe { slice::from_raw_parts_mut(self.as_mut_ptr(), self.len) }
    }
}

impl<T: Clone, R: ReserveStrategy> Clone for DynArr<T, R> {
    /// Creates a deep copy, the capacity of the copy is exactly its length.
    fn clone(&self) -> Self {
        Self::from(self.as_slice())
    }

    /// Overwrites the contents of `self` with a clone of the contents of `source`.
    ///
    /// This method is preferred over simply assigning `source.clone()` to `self`, as it avoids reallocation if possible.
    fn clone_from(&mut self, source: &Self) {
        self.assign_from(source);
    }
}

impl<T: Hash, R: ReserveStrategy> Hash for DynArr<T, R> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        Hash::hash(&**self, state)
    }
}

impl<T, I: SliceIndex<[T]>, R: ReserveStrategy> Index<I> for DynArr<T, R> {
    type Output = I::Output;

    #[track_caller]
    fn index(&self, index: I) -> &Self::Output {
        Index::index(&**self, index)
    }
}

impl<T, I: SliceIndex<[T]>, R: ReserveStrategy> IndexMut<I> for DynArr<T, R> {
    #[track_caller]
    fn index_mut(&mut self, index: I) -> &mut Self::Output {
        IndexMut::index_mut(&mut **self, index)
    }
}

impl<T, R: ReserveStrategy> FromIterator<T> for DynArr<T, R> {
    #[inline]
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut arr = Self::new();
        arr.extend(iter);
        arr
    }
}

impl<T, R: ReserveStrategy> IntoIterator for DynArr<T, R> {
    type Item = T;
    type IntoIter = IntoIter<T, R>;

    /// Creates a consuming iterator, that is, one that moves each value out of the dynamic array (from start to end).
    /// The dynamic array cannot be used after calling this
    ///
    /// # Examples
    ///
    /// ```
    /// use ds_common::dynarr;
    ///
    /// let arr = dynarr!["a".to_string(), "b".to_string()];
    /// let mut arr_iter = arr.into_iter();
    ///
    /// let first_elem: Option<String> = arr_iter.next();
    ///
    /// assert_eq!(first_elem, Some("a".to_string()));
    /// assert_eq!(arr_iter.next(), Some("b".to_string()));
    /// assert_eq!(arr_iter.next(), None);
    /// ```
    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        let me = ManuallyDrop::new(self);
        // `ptr::read` is required to work around partial moves, `me` is never dropped
        let arr = unsafe { ptr::read(&me.arr) };
        IntoIter { arr, start: 0, end: me.len }
    }
}

impl<'a, T, R: ReserveStrategy> IntoIterator for &'a DynArr<T, R> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T, R: ReserveStrategy> IntoIterator for &'a mut DynArr<T, R> {
    type Item = &'a mut T;
    type IntoIter = slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<T, R: ReserveStrategy> Extend<T> for DynArr<T, R> {
    #[inline]
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.extend_desugared(iter.into_iter())
    }
}

/// Extend implementation that copies elements out of references before pushing them onto the DynArr.
impl<'a, T: Copy + 'a, R: ReserveStrategy> Extend<&'a T> for DynArr<T, R> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend_desugared(iter.into_iter().copied())
    }
}

impl_slice_partial_eq_generic!([R0: ReserveStrategy, R1: ReserveStrategy] DynArr<T, R0>, DynArr<U, R1>);
impl_slice_partial_eq_generic!([R: ReserveStrategy] DynArr<T, R>, &[U]);
impl_slice_partial_eq_generic!([R: ReserveStrategy] DynArr<T, R>, &mut [U]);
impl_slice_partial_eq_generic!([R: ReserveStrategy] &[T], DynArr<U, R>);
impl_slice_partial_eq_generic!([R: ReserveStrategy] &mut [T], DynArr<U, R>);
impl_slice_partial_eq_generic!([R: ReserveStrategy] DynArr<T, R>, [U]);
impl_slice_partial_eq_generic!([R: ReserveStrategy] [T], DynArr<U, R>);
impl_slice_partial_eq_generic!([R: ReserveStrategy, const N: usize] DynArr<T, R>, [U; N]);
impl_slice_partial_eq_generic!([R: ReserveStrategy, const N: usize] [T; N], DynArr<U, R>);
impl_slice_partial_eq_generic!([R: ReserveStrategy] DynArr<T, R>, Vec<U>);
impl_slice_partial_eq_generic!([R: ReserveStrategy] Vec<T>, DynArr<U, R>);

impl<T, R0, R1> PartialOrd<DynArr<T, R1>> for DynArr<T, R0> where
    T: PartialOrd,
    R0: ReserveStrategy,
    R1: ReserveStrategy
{
    #[inline]
    fn partial_cmp(&self, other: &DynArr<T, R1>) -> Option<std::cmp::Ordering> {
        PartialOrd::partial_cmp(&**self, &**other)
    }
}

impl<T: Eq, R: ReserveStrategy> Eq for DynArr<T, R> {}

impl<T: Ord, R: ReserveStrategy> Ord for DynArr<T, R> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        Ord::cmp(&**self, &**other)
    }
}

impl<T, R: ReserveStrategy> Drop for DynArr<T, R> {
    fn drop(&mut self) {
        unsafe {
            // use drop for [T]
            // uses a raw slice to refer to the elements of the dynamic array as the weakest necessary type;
            // could avoid question of validity in certain cases
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(self.as_mut_ptr(), self.len))
        }
        // RawArray handles deallocation
    }
}

impl<T, R: ReserveStrategy> Default for DynArr<T, R> {
    /// Creates an empty `DynArr<T>`.
    ///
    /// The dynamic array will not allocate until elements are pushed onto it.
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug, R: ReserveStrategy> fmt::Debug for DynArr<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&**self, f)
    }
}

impl<T, R: ReserveStrategy> AsRef<[T]> for DynArr<T, R> {
    fn as_ref(&self) -> &[T] {
        self
    }
}

impl<T, R: ReserveStrategy> AsMut<[T]> for DynArr<T, R> {
    fn as_mut(&mut self) -> &mut [T] {
        self
    }
}

impl<T: Clone, R: ReserveStrategy> From<&[T]> for DynArr<T, R> {
    /// Allocate a `DynArr<T>` with a capacity of exactly `s.len()` and fill it by cloning `s`'s items.
    ///
    /// # Examples
    ///
    /// ```
    /// use ds_common::{dynarr, collections::DynArr};
    ///
    /// assert_eq!(DynArr::<i32>::from(&[1, 2, 3][..]), dynarr![1, 2, 3]);
    /// ```
    fn from(s: &[T]) -> Self {
        let mut arr = Self::with_capacity(s.len());
        arr.extend_from_slice(s);
        arr
    }
}

impl<T: Clone, R: ReserveStrategy, const N: usize> From<&[T; N]> for DynArr<T, R> {
    fn from(s: &[T; N]) -> Self {
        Self::from(s.as_slice())
    }
}

impl<T, R: ReserveStrategy, const N: usize> From<[T; N]> for DynArr<T, R> {
    /// Allocate a `DynArr<T>` and move `value`'s items into it.
    ///
    /// # Examples
    ///
    /// ```
    /// use ds_common::{dynarr, collections::DynArr};
    ///
    /// assert_eq!(DynArr::<i32>::from([1, 2, 3]), dynarr![1, 2, 3]);
    /// ```
    fn from(value: [T; N]) -> Self {
        let mut res = Self::with_capacity(N);
        unsafe {
            let value = ManuallyDrop::new(value);
            ptr::copy_nonoverlapping(value.as_ptr(), res.as_mut_ptr(), N);
            res.set_len(N);
        }
        res
    }
}
