use proptest::prelude::*;

use ds_common::collections::{DynArr, DynArrError};

proptest! {
    #[test]
    fn from_elem_fills_exactly(n in 0usize..512, value: i64) {
        let arr = DynArr::<i64>::from_elem(n, value);
        prop_assert_eq!(arr.len(), n);
        prop_assert_eq!(arr.capacity(), n);
        prop_assert!(arr.iter().all(|v| *v == value));
    }

    #[test]
    fn from_slice_equals_source(src in prop::collection::vec(any::<u16>(), 0..256)) {
        let arr = DynArr::<u16>::from(&src[..]);
        prop_assert_eq!(arr.len(), src.len());
        prop_assert_eq!(arr.capacity(), src.len());
        prop_assert_eq!(arr, src);
    }

    #[test]
    fn push_grows_to_power_of_two(count in 1usize..1024) {
        let mut arr = DynArr::<usize>::new();
        for i in 0..count {
            arr.push(i);
            prop_assert!(arr.capacity() >= arr.len());
        }
        prop_assert_eq!(arr.len(), count);
        prop_assert_eq!(arr.capacity(), count.next_power_of_two());
        prop_assert!(arr.iter().copied().eq(0..count));
    }

    #[test]
    fn reserve_never_shrinks(src in prop::collection::vec(any::<u8>(), 0..64), target in 0usize..256) {
        let mut arr = DynArr::<u8>::from(&src[..]);
        let old_cap = arr.capacity();
        prop_assert_eq!(arr.reserve(target), Ok(()));
        prop_assert_eq!(arr.capacity(), old_cap.max(target));
        prop_assert_eq!(arr, src);
    }

    #[test]
    fn reserve_past_max_size_fails(src in prop::collection::vec(any::<u32>(), 0..16)) {
        let mut arr = DynArr::<u32>::from(&src[..]);
        let old_cap = arr.capacity();
        let requested = DynArr::<u32>::MAX_SIZE + 1;
        prop_assert_eq!(
            arr.reserve(requested),
            Err(DynArrError::InvalidSize { requested, len: src.len(), max: DynArr::<u32>::MAX_SIZE })
        );
        prop_assert_eq!(arr.capacity(), old_cap);
    }

    #[test]
    fn shrink_to_fit_matches_len(src in prop::collection::vec(any::<i32>(), 0..128), extra in 0usize..128) {
        let mut arr = DynArr::<i32>::from(&src[..]);
        arr.reserve(src.len() + extra).unwrap();
        arr.shrink_to_fit();
        prop_assert_eq!(arr.capacity(), src.len());
        prop_assert_eq!(arr.data().is_none(), src.is_empty());
        prop_assert_eq!(arr, src);
    }

    #[test]
    fn clone_is_independent(src in prop::collection::vec(any::<i32>(), 1..64), value: i32) {
        let orig = DynArr::<i32>::from(&src[..]);
        let mut copy = orig.clone();
        prop_assert_eq!(&copy, &orig);
        prop_assert_eq!(copy.capacity(), orig.len());

        copy[0] = value;
        copy.push(value);
        prop_assert_eq!(orig, src);
    }

    #[test]
    fn take_leaves_source_empty(src in prop::collection::vec(any::<u64>(), 0..64)) {
        let mut arr = DynArr::<u64>::from(&src[..]);
        let taken = arr.take();
        prop_assert_eq!(taken, src);
        prop_assert!(arr.is_empty());
        prop_assert_eq!(arr.capacity(), 0);
        prop_assert!(arr.data().is_none());
    }

    #[test]
    fn at_is_checked(src in prop::collection::vec(any::<i8>(), 0..64), index in 0usize..128) {
        let arr = DynArr::<i8>::from(&src[..]);
        match src.get(index) {
            Some(val) => prop_assert_eq!(arr.at(index), Ok(val)),
            None => prop_assert_eq!(arr.at(index), Err(DynArrError::IndexOutOfRange { index, len: src.len() })),
        }
    }

    #[test]
    fn clear_keeps_capacity(src in prop::collection::vec(any::<i32>(), 0..64)) {
        let mut arr = DynArr::<i32>::from(&src[..]);
        let old_cap = arr.capacity();
        arr.clear();
        prop_assert!(arr.is_empty());
        prop_assert_eq!(arr.capacity(), old_cap);
        prop_assert_eq!(arr.pop(), None);
    }

    #[test]
    fn pop_returns_in_reverse(src in prop::collection::vec(any::<i32>(), 0..64)) {
        let mut arr = DynArr::<i32>::from(&src[..]);
        let mut popped = Vec::new();
        while let Some(val) = arr.pop() {
            popped.push(val);
        }
        popped.reverse();
        prop_assert_eq!(popped, src);
        prop_assert_eq!(arr.pop(), None);
    }

    #[test]
    fn equality_follows_elements(a in prop::collection::vec(0u8..4, 0..8), b in prop::collection::vec(0u8..4, 0..8)) {
        let arr_a = DynArr::<u8>::from(&a[..]);
        let arr_b = DynArr::<u8>::from(&b[..]);
        prop_assert_eq!(arr_a == arr_b, a == b);
        prop_assert_eq!(arr_a.cmp(&arr_b), a.cmp(&b));
    }

    #[test]
    fn cursor_distance_is_len(src in prop::collection::vec(any::<u32>(), 0..64)) {
        let arr = DynArr::<u32>::from(&src[..]);
        prop_assert_eq!(arr.end() - arr.begin(), src.len() as isize);
        let walked: Vec<u32> = arr.begin().iter_to(arr.end()).copied().collect();
        prop_assert_eq!(walked, src);
    }
}
