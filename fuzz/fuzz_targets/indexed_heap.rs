#![no_main]

use libfuzzer_sys::fuzz_target;

use waypath::data_structures::indexed_heap::IndexedHeap;

// Each pair of bytes is an operation on a small key space, so keys collide
// and updates happen often.
fuzz_target!(|data: &[u8]| {
    let mut heap = IndexedHeap::<u8, u8>::new();
    for op in data.chunks_exact(2) {
        let (key, rank) = (op[0] % 32, op[1]);
        match op[0] >> 6 {
            0 => {
                let popped = heap.pop();
                if let (Some((k, r)), Some((_, next))) = (popped, heap.peek()) {
                    assert!(r <= *next);
                    assert!(!heap.contains(&k));
                }
            }
            _ if heap.contains(&key) => {
                heap.update(key, rank);
            }
            _ => {
                heap.push(key, rank);
            }
        }
        assert!(heap.is_valid());
    }

    let mut previous = None;
    while let Some((_, rank)) = heap.pop() {
        assert!(previous.is_none_or(|p| p <= rank));
        previous = Some(rank);
    }
});
