mod imp;

mod dynarr;
mod cursor;

use core::{alloc::Layout, fmt};

pub use dynarr::*;
pub use cursor::{Cursor, CursorMut};

//--------------------------------------------------------------

macro_rules! impl_slice_partial_eq_generic {
    ([$($vars:tt)*] $lhs:ty, $rhs:ty $(where $ty:ty: $bound:ident)?) => {
        impl<T, U, $($vars)*> PartialEq<$rhs> for $lhs  where
            T : PartialEq<U>,
            $($ty: $bound)?
        {
            #[inline]
            fn eq(&self, other: &$rhs) -> bool { self[..] == other[..] }
            #[allow(clippy::partialeq_ne_impl)]
            #[inline]
            fn ne(&self, other: &$rhs) -> bool { self[..] != other[..] }
        }
    };
}
use impl_slice_partial_eq_generic;

//--------------------------------------------------------------

/// Low level error returned when a buffer could not be (re)allocated.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum TryReserveError {
    /// The requested capacity exceeds `isize::MAX` bytes.
    CapacityOverflow,
    /// The allocator returned an error for the given layout.
    AllocError(Layout),
}

impl fmt::Display for TryReserveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TryReserveError::CapacityOverflow => f.write_str("capacity overflow"),
            TryReserveError::AllocError(layout) => f.write_fmt(format_args!("memory allocation of {} bytes failed", layout.size())),
        }
    }
}

impl std::error::Error for TryReserveError {}

/// Error returned by the checked operations of a [`DynArr`].
///
/// Every operation returning this error leaves the array untouched.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum DynArrError {
    /// A requested size or capacity is not valid for the array, either because it exceeds `max`
    /// or because it would drop below the current length `len`.
    InvalidSize {
        requested: usize,
        len:       usize,
        max:       usize,
    },
    /// An index was outside of the live range `[0, len)`.
    IndexOutOfRange {
        index: usize,
        len:   usize,
    },
}

impl fmt::Display for DynArrError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DynArrError::InvalidSize { requested, len, max } =>
                f.write_fmt(format_args!("invalid size {requested} (len: {len}, max size: {max})")),
            DynArrError::IndexOutOfRange { index, len } =>
                f.write_fmt(format_args!("index {index} is out of range for an array of length {len}")),
        }
    }
}

impl std::error::Error for DynArrError {}

//--------------------------------------------------------------

/// A trait used to define a strategy to reserve additional memory for containers.
pub trait ReserveStrategy {
    /// Calculate the new capacity for a container.
    ///
    /// `cur_capacity` represents the current capacity of the container.
    ///
    /// `min_capacity` represents the minimum required capacity to be able to resize.
    ///
    /// Returns `None` if the capacity were to overflow
    fn calculate(cur_capacity: usize, min_capacity: usize) -> Option<usize>;
}

/// A reserve strategy that will try to either return double the current capacity, or the minimum required capacity, whichever is bigger.
///
/// Growing by a single element therefore goes 1, 2, 4, 8, ...
pub struct DoubleOrMinReserveStrategy;

impl ReserveStrategy for DoubleOrMinReserveStrategy {
    fn calculate(cur_capacity: usize, min_capacity: usize) -> Option<usize> {
        let double_cap = cur_capacity.checked_mul(2)?;
        let new_cap = if double_cap > min_capacity { double_cap } else { min_capacity };
        if new_cap <= isize::MAX as usize {
            Some(new_cap)
        } else {
            None
        }
    }
}

/// A reserve strategy that will return a power of 2 capacity
pub struct Pow2ReserveStrategy;

impl ReserveStrategy for Pow2ReserveStrategy {
    fn calculate(_cur_capacity: usize, min_capacity: usize) -> Option<usize> {
        min_capacity.checked_next_power_of_two()
            .filter(|&cap| cap <= isize::MAX as usize)
    }
}

/// A reserve stategy that grows the capacity by 1.5
pub struct ThreeHalvesReserveStrategy;

impl ReserveStrategy for ThreeHalvesReserveStrategy {
    fn calculate(cur_capacity: usize, min_capacity: usize) -> Option<usize> {
        let mut cap = cur_capacity.max(1);
        while cap < min_capacity {
            // 1 * 1.5 rounds back down to 1
            cap = (cap + (cap >> 1)).max(cap + 1);
            if cap > isize::MAX as usize {
                return None;
            }
        }
        Some(cap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn double_or_min() {
        assert_eq!(DoubleOrMinReserveStrategy::calculate(0, 1), Some(1));
        assert_eq!(DoubleOrMinReserveStrategy::calculate(1, 2), Some(2));
        assert_eq!(DoubleOrMinReserveStrategy::calculate(64, 65), Some(128));
        assert_eq!(DoubleOrMinReserveStrategy::calculate(4, 100), Some(100));
        assert_eq!(DoubleOrMinReserveStrategy::calculate(usize::MAX / 2, usize::MAX / 2 + 1), None);
    }

    #[test]
    fn double_or_min_push_sequence() {
        let mut cap = 0;
        let mut seen = Vec::new();
        for len in 0..100usize {
            if len == cap {
                cap = DoubleOrMinReserveStrategy::calculate(cap, len + 1).unwrap();
                seen.push(cap);
            }
        }
        assert_eq!(seen, [1, 2, 4, 8, 16, 32, 64, 128]);
    }

    #[test]
    fn pow2() {
        assert_eq!(Pow2ReserveStrategy::calculate(0, 1), Some(1));
        assert_eq!(Pow2ReserveStrategy::calculate(4, 5), Some(8));
        assert_eq!(Pow2ReserveStrategy::calculate(0, 1000), Some(1024));
        assert_eq!(Pow2ReserveStrategy::calculate(0, usize::MAX), None);
    }

    #[test]
    fn three_halves() {
        assert_eq!(ThreeHalvesReserveStrategy::calculate(0, 1), Some(1));
        assert_eq!(ThreeHalvesReserveStrategy::calculate(1, 2), Some(2));
        assert_eq!(ThreeHalvesReserveStrategy::calculate(2, 3), Some(3));
        assert_eq!(ThreeHalvesReserveStrategy::calculate(4, 5), Some(6));
        assert_eq!(ThreeHalvesReserveStrategy::calculate(10, 11), Some(15));
        assert_eq!(ThreeHalvesReserveStrategy::calculate(0, usize::MAX), None);
    }

    #[test]
    fn error_display() {
        let err = DynArrError::IndexOutOfRange { index: 5, len: 3 };
        assert_eq!(err.to_string(), "index 5 is out of range for an array of length 3");

        let err = DynArrError::InvalidSize { requested: 2, len: 4, max: 10 };
        assert_eq!(err.to_string(), "invalid size 2 (len: 4, max size: 10)");

        assert_eq!(TryReserveError::CapacityOverflow.to_string(), "capacity overflow");
    }
}
