#![no_main]

use libfuzzer_sys::fuzz_target;

use sort_test_tools::{Node, NodeList};

fuzz_target!(|data: &[u8]| {
    let mut expected = data.to_vec();
    expected.sort();

    let mut list = NodeList::from_vec(data.to_vec());
    unsafe {
        listsort::sort_by(list.head(), |a: &Node<u8>, b: &Node<u8>| {
            a.value().cmp(b.value())
        })
    };

    list.assert_valid();
    let sorted = list.to_vec();
    assert_eq!(sorted, expected);

    // Equal bytes keep their input order.
    let positions = list.input_positions();
    for i in 1..sorted.len() {
        if sorted[i - 1] == sorted[i] {
            assert!(positions[i - 1] < positions[i]);
        }
    }
});
