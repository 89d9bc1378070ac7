use std::{
    iter::FusedIterator,
    fmt,
    ptr,
    slice,
};

use crate::collections::{imp::array::RawArray, ReserveStrategy, DoubleOrMinReserveStrategy};

/// An iterator that moves out of a dynamic array.
///
/// This `struct` is created by the `into_iter` method on [`DynArr`](super::DynArr) (provided by the [`IntoIterator`] trait).
///
/// # Example
///
/// ```
/// use ds_common::{dynarr, collections::IntoIter};
///
/// let arr = dynarr![0, 1, 2];
/// let iter: IntoIter<_> = arr.into_iter();
/// assert_eq!(iter.len(), 3);
/// ```
pub struct IntoIter<T, R: ReserveStrategy = DoubleOrMinReserveStrategy> {
    pub(super) arr:   RawArray<T, R>,
    /// Index of the next element returned from the front
    pub(super) start: usize,
    /// One past the index of the next element returned from the back
    pub(super) end:   usize,
}

impl<T, R: ReserveStrategy> IntoIter<T, R> {
    /// Returns the remaining items of this iterator as a slice.
    ///
    /// # Examples
    ///
    /// ```
    /// use ds_common::dynarr;
    ///
    /// let arr = dynarr!['a', 'b', 'c'];
    /// let mut into_iter = arr.into_iter();
    /// assert_eq!(into_iter.as_slice(), &['a', 'b', 'c']);
    /// let _ = into_iter.next().unwrap();
    /// assert_eq!(into_iter.as_slice(), &['b', 'c']);
    /// ```
    pub fn as_slice(&self) -> &[T] {
        unsafe { slice::from_raw_parts(self.arr.ptr().add(self.start), self.end - self.start) }
    }

    /// Returns the remaining items of this iterator as a mutable slice.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        unsafe { slice::from_raw_parts_mut(self.arr.ptr().add(self.start), self.end - self.start) }
    }

    fn as_raw_mut_slice(&mut self) -> *mut [T] {
        ptr::slice_from_raw_parts_mut(unsafe { self.arr.ptr().add(self.start) }, self.end - self.start)
    }
}

impl<T: fmt::Debug, R: ReserveStrategy> fmt::Debug for IntoIter<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.as_slice()).finish()
    }
}

impl<T, R: ReserveStrategy> AsRef<[T]> for IntoIter<T, R> {
    fn as_ref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T, R: ReserveStrategy> Iterator for IntoIter<T, R> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.start == self.end {
            return None;
        }
        let idx = self.start;
        self.start += 1;
        // Safety: `idx` is in the remaining range, and is never read again
        Some(unsafe { ptr::read(self.arr.ptr().add(idx)) })
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let exact = self.end - self.start;
        (exact, Some(exact))
    }

    #[inline]
    fn count(self) -> usize {
        self.len()
    }
}

impl<T, R: ReserveStrategy> DoubleEndedIterator for IntoIter<T, R> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.start == self.end {
            return None;
        }
        self.end -= 1;
        Some(unsafe { ptr::read(self.arr.ptr().add(self.end)) })
    }
}

impl<T, R: ReserveStrategy> ExactSizeIterator for IntoIter<T, R> {}

impl<T, R: ReserveStrategy> FusedIterator for IntoIter<T, R> {}

impl<T, R: ReserveStrategy> Default for IntoIter<T, R> {
    /// Creates an empty `IntoIter`.
    fn default() -> Self {
        Self { arr: RawArray::new(), start: 0, end: 0 }
    }
}

impl<T: Clone, R: ReserveStrategy> Clone for IntoIter<T, R> {
    fn clone(&self) -> Self {
        super::DynArr::<T, R>::from(self.as_slice()).into_iter()
    }
}

impl<T, R: ReserveStrategy> Drop for IntoIter<T, R> {
    fn drop(&mut self) {
        // destroy the remaining elements, `RawArray` frees the buffer afterwards
        unsafe {
            ptr::drop_in_place(self.as_raw_mut_slice());
        }
    }
}
