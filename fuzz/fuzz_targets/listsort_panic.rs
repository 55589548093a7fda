#![no_main]

use std::panic::{self, AssertUnwindSafe};

use libfuzzer_sys::fuzz_target;

use sort_test_tools::{Node, NodeList};

// The first byte picks the comparison that panics, the rest is the input.
fuzz_target!(|data: &[u8]| {
    let Some((&panic_after, input)) = data.split_first() else {
        return;
    };

    let sum_before: u64 = input.iter().map(|&val| val as u64).sum();

    let mut list = NodeList::from_vec(input.to_vec());
    let mut comp_count = 0;
    let _ = panic::catch_unwind(AssertUnwindSafe(|| unsafe {
        listsort::sort_by(list.head(), |a: &Node<u8>, b: &Node<u8>| {
            if comp_count == panic_after as usize {
                panic!("comparison {comp_count}");
            }
            comp_count += 1;
            a.value().cmp(b.value())
        })
    }));

    list.assert_valid();
    let sum_after: u64 = list.iter().map(|&val| val as u64).sum();
    assert_eq!(sum_before, sum_after);
});
