// Slot arithmetic for array-backed binary heaps.
//
// The heap is a complete binary tree stored level by level, so every slot has
// a fixed parent and two fixed children.
//
// ```text
//                           0
//              1                         2
//       3            4            5             6
//   7      8      9     10    11     12     13     14
// 15 16  17 18  19 20  21 22 23 24  25
// ```
//
// The last level will often be incomplete.

/// The slot of the parent of `i`. The root has no parent.
///
/// ```
/// use waypath::heap_primitives::parent;
/// assert_eq!(parent(1), 0);
/// assert_eq!(parent(2), 0);
/// assert_eq!(parent(3), 1);
/// assert_eq!(parent(4), 1);
/// assert_eq!(parent(5), 2);
/// assert_eq!(parent(6), 2);
/// assert_eq!(parent(25), 12);
/// ```
#[inline(always)]
#[must_use]
pub fn parent(i: usize) -> usize {
    debug_assert!(i != 0, "The root has no parent");
    (i - 1) >> 1
}

/// The left child of `i`.
///
/// ```
/// use waypath::heap_primitives::left_child;
/// assert_eq!(left_child(0), 1);
/// assert_eq!(left_child(1), 3);
/// assert_eq!(left_child(3), 7);
/// assert_eq!(left_child(11), 23);
/// ```
#[inline(always)]
#[must_use]
pub fn left_child(i: usize) -> usize {
    (i << 1) + 1
}

/// The right child of `i`.
///
/// ```
/// use waypath::heap_primitives::right_child;
/// assert_eq!(right_child(0), 2);
/// assert_eq!(right_child(1), 4);
/// assert_eq!(right_child(2), 6);
/// assert_eq!(right_child(4), 10);
/// assert_eq!(right_child(6), 14);
/// ```
#[inline(always)]
#[must_use]
pub fn right_child(i: usize) -> usize {
    (i + 1) << 1
}

/// The better of the children of `i` within `heap`, if any.
///
/// Prefers the left child when both compare equal.
#[inline(always)]
#[must_use]
pub fn best_child<T: PartialOrd>(heap: &[T], i: usize) -> Option<usize> {
    let l = left_child(i);
    let r = right_child(i);
    if l >= heap.len() {
        return None;
    }
    if r < heap.len() && heap[r] < heap[l] {
        return Some(r);
    }
    Some(l)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn children_point_back_to_parent() {
        for i in 0..1000usize {
            assert_eq!(parent(left_child(i)), i);
            assert_eq!(parent(right_child(i)), i);
            assert_eq!(left_child(i) + 1, right_child(i));
        }
    }

    #[test]
    fn best_child_of_leaves() {
        let heap = [0u8, 5u8, 3u8, 9u8];
        assert_eq!(best_child(&heap, 0), Some(2));
        assert_eq!(best_child(&heap, 1), Some(3));
        assert_eq!(best_child(&heap, 2), None);
        assert_eq!(best_child(&heap, 3), None);
    }

    #[test]
    fn best_child_prefers_left_on_ties() {
        let heap = [0u8, 4u8, 4u8];
        assert_eq!(best_child(&heap, 0), Some(1));
    }
}
