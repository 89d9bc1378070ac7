use core::{
    cmp::Ordering,
    fmt,
    ops::{self, Add, AddAssign, Deref, DerefMut, Index, IndexMut, Sub, SubAssign},
    slice,
};
use static_assertions as sa;

/// A random-access position inside the live elements of a [`DynArr`](super::DynArr).
///
/// A cursor borrows the dynamic array it was created from, so the array can't be modified (and therefore can't reallocate) while a cursor is alive.
/// Cursors can be freely moved around, including before the first or past the last element,
/// but can only be dereferenced when they point at a live element.
///
/// # Examples
///
/// ```
/// use ds_common::dynarr;
///
/// let arr = dynarr![1, 2, 3, 4];
/// let mut it = arr.begin();
/// assert_eq!(*it, 1);
///
/// it += 2;
/// assert_eq!(*it, 3);
/// assert_eq!(it[-1], 2);
/// assert_eq!(arr.end() - it, 2);
///
/// let sum: i32 = arr.begin().iter_to(arr.end()).sum();
/// assert_eq!(sum, 10);
/// ```
pub struct Cursor<'a, T> {
    elems: &'a [T],
    /// Address of the dynamic array the cursor was created from, 0 when detached
    owner: usize,
    pos:   isize,
}

sa::assert_impl_all!(Cursor<'static, String>: Copy, Send, Sync, Default, fmt::Debug);
sa::assert_not_impl_any!(Cursor<'static, core::cell::Cell<u8>>: Send, Sync);

impl<'a, T> Cursor<'a, T> {
    pub(crate) const fn new(elems: &'a [T], owner: usize, pos: isize) -> Self {
        Self { elems, owner, pos }
    }

    /// Position of the cursor, relative to the first element of the dynamic array.
    #[inline]
    pub const fn offset(&self) -> isize {
        self.pos
    }

    /// Get the element the cursor points to, or `None` if it is outside of the live elements.
    #[inline]
    pub fn try_get(&self) -> Option<&'a T> {
        usize::try_from(self.pos).ok().and_then(|idx| self.elems.get(idx))
    }

    /// Get the element the cursor points to.
    ///
    /// # Panics
    ///
    /// Panics if the cursor is outside of the live elements.
    #[track_caller]
    pub fn get(&self) -> &'a T {
        match self.try_get() {
            Some(val) => val,
            None => out_of_range(self.pos, self.elems.len()),
        }
    }

    /// Move the cursor to the next element.
    #[inline]
    pub fn inc(&mut self) -> &mut Self {
        self.pos += 1;
        self
    }

    /// Move the cursor to the previous element.
    #[inline]
    pub fn dec(&mut self) -> &mut Self {
        self.pos -= 1;
        self
    }

    /// Get the elements in `[self, end)` as a slice.
    ///
    /// # Panics
    ///
    /// Panics if `end` belongs to a different dynamic array, or the range is not contained in the live elements.
    #[track_caller]
    pub fn as_slice_to(&self, end: Cursor<'a, T>) -> &'a [T] {
        assert!(self.same_array(&end), "cursors belong to different dynamic arrays");
        &self.elems[live_range(self.pos, end.pos, self.elems.len())]
    }

    /// Iterate over the elements in `[self, end)`.
    ///
    /// # Panics
    ///
    /// Panics if `end` belongs to a different dynamic array, or the range is not contained in the live elements.
    #[track_caller]
    pub fn iter_to(&self, end: Cursor<'a, T>) -> slice::Iter<'a, T> {
        self.as_slice_to(end).iter()
    }

    fn same_array(&self, other: &Self) -> bool {
        self.owner == other.owner
    }
}

/// Converts the cursor offsets `[start, end)` to an index range, panicking when it isn't inside `[0, len)`.
#[track_caller]
fn live_range(start: isize, end: isize, len: usize) -> ops::Range<usize> {
    let (Ok(start), Ok(end)) = (usize::try_from(start), usize::try_from(end)) else {
        panic!("cursor range [{start}, {end}) starts before the first element");
    };
    assert!(start <= end && end <= len, "invalid cursor range [{start}, {end}) for {len} elements");
    start..end
}

#[cold]
#[track_caller]
fn out_of_range(pos: isize, len: usize) -> ! {
    panic!("cursor at {pos} is outside of the live elements [0, {len})");
}

impl<T> Clone for Cursor<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Cursor<'_, T> {}

impl<T> Default for Cursor<'_, T> {
    /// Creates a cursor that isn't attached to any elements, it can never be dereferenced.
    fn default() -> Self {
        Self { elems: &[], owner: 0, pos: 0 }
    }
}

impl<T> fmt::Debug for Cursor<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("offset", &self.pos)
            .field("len", &self.elems.len())
            .finish()
    }
}

impl<T> Deref for Cursor<'_, T> {
    type Target = T;

    #[track_caller]
    fn deref(&self) -> &Self::Target {
        self.get()
    }
}

impl<T> Index<isize> for Cursor<'_, T> {
    type Output = T;

    /// `cursor[k]` is the same as `*(cursor + k)`.
    #[track_caller]
    fn index(&self, index: isize) -> &Self::Output {
        (*self + index).get()
    }
}

impl<'a, T> Add<isize> for Cursor<'a, T> {
    type Output = Cursor<'a, T>;

    fn add(self, rhs: isize) -> Self::Output {
        Self { pos: self.pos + rhs, ..self }
    }
}

impl<'a, T> Add<Cursor<'a, T>> for isize {
    type Output = Cursor<'a, T>;

    fn add(self, rhs: Cursor<'a, T>) -> Self::Output {
        rhs + self
    }
}

impl<'a, T> Sub<isize> for Cursor<'a, T> {
    type Output = Cursor<'a, T>;

    fn sub(self, rhs: isize) -> Self::Output {
        Self { pos: self.pos - rhs, ..self }
    }
}

impl<'a, T> Sub<Cursor<'a, T>> for Cursor<'a, T> {
    type Output = isize;

    /// Distance between two cursors, only meaningful for cursors into the same dynamic array.
    fn sub(self, rhs: Cursor<'a, T>) -> Self::Output {
        debug_assert!(self.same_array(&rhs), "subtracting cursors of different dynamic arrays");
        self.pos - rhs.pos
    }
}

impl<T> AddAssign<isize> for Cursor<'_, T> {
    fn add_assign(&mut self, rhs: isize) {
        self.pos += rhs;
    }
}

impl<T> SubAssign<isize> for Cursor<'_, T> {
    fn sub_assign(&mut self, rhs: isize) {
        self.pos -= rhs;
    }
}

/// Cursors into different dynamic arrays are ordered by the address of the arrays.
impl<T> PartialEq for Cursor<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        self.owner == other.owner && self.pos == other.pos
    }
}

impl<T> Eq for Cursor<'_, T> {}

impl<T> PartialOrd for Cursor<'_, T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Cursor<'_, T> {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.owner, self.pos).cmp(&(other.owner, other.pos))
    }
}

//--------------------------------------------------------------

/// A random-access position inside the live elements of a [`DynArr`](super::DynArr), allowing the elements to be modified.
///
/// A mutable cursor borrows the dynamic array exclusively, so only one can exist at a time.
/// Use [`as_cursor`](CursorMut::as_cursor) to get a read-only cursor at the same position.
pub struct CursorMut<'a, T> {
    elems: &'a mut [T],
    owner: usize,
    pos:   isize,
}

sa::assert_impl_all!(CursorMut<'static, String>: Send, Sync, Default, fmt::Debug);
sa::assert_not_impl_any!(CursorMut<'static, String>: Clone);

impl<'a, T> CursorMut<'a, T> {
    pub(crate) fn new(elems: &'a mut [T], owner: usize, pos: isize) -> Self {
        Self { elems, owner, pos }
    }

    /// Position of the cursor, relative to the first element of the dynamic array.
    #[inline]
    pub const fn offset(&self) -> isize {
        self.pos
    }

    /// Get the element the cursor points to, or `None` if it is outside of the live elements.
    #[inline]
    pub fn try_get(&self) -> Option<&T> {
        usize::try_from(self.pos).ok().and_then(|idx| self.elems.get(idx))
    }

    /// Get the element the cursor points to mutably, or `None` if it is outside of the live elements.
    #[inline]
    pub fn try_get_mut(&mut self) -> Option<&mut T> {
        usize::try_from(self.pos).ok().and_then(|idx| self.elems.get_mut(idx))
    }

    /// Get the element the cursor points to.
    ///
    /// # Panics
    ///
    /// Panics if the cursor is outside of the live elements.
    #[track_caller]
    pub fn get(&self) -> &T {
        let len = self.elems.len();
        match self.try_get() {
            Some(val) => val,
            None => out_of_range(self.pos, len),
        }
    }

    /// Get the element the cursor points to mutably.
    ///
    /// # Panics
    ///
    /// Panics if the cursor is outside of the live elements.
    #[track_caller]
    pub fn get_mut(&mut self) -> &mut T {
        let (pos, len) = (self.pos, self.elems.len());
        match self.try_get_mut() {
            Some(val) => val,
            None => out_of_range(pos, len),
        }
    }

    /// Move the cursor to the next element.
    #[inline]
    pub fn inc(&mut self) -> &mut Self {
        self.pos += 1;
        self
    }

    /// Move the cursor to the previous element.
    #[inline]
    pub fn dec(&mut self) -> &mut Self {
        self.pos -= 1;
        self
    }

    /// Read-only cursor at the same position, borrowing this cursor.
    pub fn as_cursor(&self) -> Cursor<'_, T> {
        Cursor::new(&*self.elems, self.owner, self.pos)
    }

    /// Get the elements from the cursor up to the element at offset `end` (exclusive) as a mutable slice.
    ///
    /// # Panics
    ///
    /// Panics if the range is not contained in the live elements.
    #[track_caller]
    pub fn as_mut_slice_to(&mut self, end: isize) -> &mut [T] {
        let range = live_range(self.pos, end, self.elems.len());
        &mut self.elems[range]
    }
}

impl<T> Default for CursorMut<'_, T> {
    /// Creates a cursor that isn't attached to any elements, it can never be dereferenced.
    fn default() -> Self {
        Self { elems: &mut [], owner: 0, pos: 0 }
    }
}

impl<T> fmt::Debug for CursorMut<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CursorMut")
            .field("offset", &self.pos)
            .field("len", &self.elems.len())
            .finish()
    }
}

impl<T> Deref for CursorMut<'_, T> {
    type Target = T;

    #[track_caller]
    fn deref(&self) -> &Self::Target {
        self.get()
    }
}

impl<T> DerefMut for CursorMut<'_, T> {
    #[track_caller]
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.get_mut()
    }
}

impl<T> Index<isize> for CursorMut<'_, T> {
    type Output = T;

    /// `cursor[k]` is the element `k` positions away from the cursor.
    #[track_caller]
    fn index(&self, index: isize) -> &Self::Output {
        let pos = self.pos + index;
        match usize::try_from(pos).ok().and_then(|idx| self.elems.get(idx)) {
            Some(val) => val,
            None => out_of_range(pos, self.elems.len()),
        }
    }
}

impl<T> IndexMut<isize> for CursorMut<'_, T> {
    #[track_caller]
    fn index_mut(&mut self, index: isize) -> &mut Self::Output {
        let (pos, len) = (self.pos + index, self.elems.len());
        match usize::try_from(pos).ok().and_then(|idx| self.elems.get_mut(idx)) {
            Some(val) => val,
            None => out_of_range(pos, len),
        }
    }
}

impl<'a, T> Add<isize> for CursorMut<'a, T> {
    type Output = CursorMut<'a, T>;

    fn add(self, rhs: isize) -> Self::Output {
        Self { pos: self.pos + rhs, ..self }
    }
}

impl<'a, T> Sub<isize> for CursorMut<'a, T> {
    type Output = CursorMut<'a, T>;

    fn sub(self, rhs: isize) -> Self::Output {
        Self { pos: self.pos - rhs, ..self }
    }
}

impl<T> AddAssign<isize> for CursorMut<'_, T> {
    fn add_assign(&mut self, rhs: isize) {
        self.pos += rhs;
    }
}

impl<T> SubAssign<isize> for CursorMut<'_, T> {
    fn sub_assign(&mut self, rhs: isize) {
        self.pos -= rhs;
    }
}
