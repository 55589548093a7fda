//! Heap allocated lists of tagged integers for the unit tests.

use core::ptr::NonNull;

use crate::list::{self, Link, ListHead, Linked};

#[repr(C)]
pub(crate) struct TestNode {
    links: ListHead,
    pub val: i32,
    /// Position in the input, used to check stability.
    pub tag: usize,
}

unsafe impl Linked for TestNode {
    unsafe fn links(ptr: NonNull<Self>) -> NonNull<ListHead> {
        // `links` is the first field of a `repr(C)` struct.
        ptr.cast()
    }

    unsafe fn from_links(links: NonNull<ListHead>) -> NonNull<Self> {
        links.cast()
    }
}

pub(crate) struct TestList {
    head: NonNull<ListHead>,
    nodes: Vec<NonNull<TestNode>>,
}

impl TestList {
    /// A circular list holding `vals` in order.
    pub fn new(vals: &[i32]) -> Self {
        let list = Self::detached(vals);
        for i in 0..vals.len() {
            unsafe { ListHead::push_back(list.head, list.node(i)) };
        }

        list
    }

    /// An empty list, plus unlinked nodes holding `vals`.
    pub fn detached(vals: &[i32]) -> Self {
        let head = NonNull::from(Box::leak(Box::new(ListHead::new())));
        unsafe { ListHead::init(head) };

        let nodes = vals
            .iter()
            .enumerate()
            .map(|(tag, &val)| {
                NonNull::from(Box::leak(Box::new(TestNode {
                    links: ListHead::new(),
                    val,
                    tag,
                })))
            })
            .collect();

        Self { head, nodes }
    }

    pub fn head(&self) -> NonNull<ListHead> {
        self.head
    }

    /// The links of the `i`-th node in input order.
    pub fn node(&self, i: usize) -> NonNull<ListHead> {
        unsafe { TestNode::links(self.nodes[i]) }
    }

    /// Links the detached nodes into a null-terminated, next-only chain in input order.
    pub fn chain(&self) -> NonNull<ListHead> {
        assert!(!self.nodes.is_empty());
        for i in 0..self.nodes.len() {
            let next_node = (i + 1 < self.nodes.len()).then(|| self.node(i + 1));
            unsafe { list::set_next(self.node(i), next_node) };
        }

        self.node(0)
    }

    pub fn values(&self) -> Vec<i32> {
        unsafe {
            ListHead::iter(self.head)
                .map(|node| TestNode::from_links(node).as_ref().val)
                .collect()
        }
    }

    pub fn tags(&self) -> Vec<usize> {
        unsafe {
            ListHead::iter(self.head)
                .map(|node| TestNode::from_links(node).as_ref().tag)
                .collect()
        }
    }

    pub fn assert_valid(&self) {
        let mut count = 0;
        let mut curr = self.head;
        loop {
            let next_node = unsafe { list::next(curr) }.expect("broken next link");
            let back = unsafe { (*next_node.as_ptr()).prev() };
            assert_eq!(back, Some(curr), "prev does not mirror next");
            if next_node == self.head {
                break;
            }
            assert!(count < self.nodes.len(), "list is longer than the node set");
            count += 1;
            curr = next_node;
        }

        assert_eq!(count, self.nodes.len());
    }
}

impl Drop for TestList {
    fn drop(&mut self) {
        unsafe {
            for node in self.nodes.drain(..) {
                drop(Box::from_raw(node.as_ptr()));
            }
            drop(Box::from_raw(self.head.as_ptr()));
        }
    }
}

/// Values of a null-terminated chain.
pub(crate) fn chain_values(mut chain: Link) -> Vec<i32> {
    let mut vals = Vec::new();
    while let Some(node) = chain {
        unsafe {
            vals.push(TestNode::from_links(node).as_ref().val);
            chain = list::next(node);
        }
    }

    vals
}

/// Values of a null-terminated chain, paired with their tags.
pub(crate) fn chain_tagged(mut chain: Link) -> Vec<(i32, usize)> {
    let mut vals = Vec::new();
    while let Some(node) = chain {
        unsafe {
            let test_node = TestNode::from_links(node).as_ref();
            vals.push((test_node.val, test_node.tag));
            chain = list::next(node);
        }
    }

    vals
}

/// Comparison function on the values of test nodes, counting how often it is called.
pub(crate) fn counting_is_less(
    count: &mut usize,
) -> impl FnMut(NonNull<ListHead>, NonNull<ListHead>) -> bool + '_ {
    move |a, b| {
        *count += 1;
        unsafe { TestNode::from_links(a).as_ref().val < TestNode::from_links(b).as_ref().val }
    }
}
