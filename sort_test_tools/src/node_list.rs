use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::ptr::NonNull;

use listsort::{Linked, ListHead};

/// List member holding a single value.
#[repr(C)]
pub struct Node<T> {
    links: ListHead,
    value: T,
}

impl<T> Node<T> {
    pub fn value(&self) -> &T {
        &self.value
    }
}

// Members compare by value, so `listsort::sort` can be used on a `NodeList` directly.
impl<T: PartialEq> PartialEq for Node<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T: Eq> Eq for Node<T> {}

impl<T: PartialOrd> PartialOrd for Node<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.value.partial_cmp(&other.value)
    }
}

impl<T: Ord> Ord for Node<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value.cmp(&other.value)
    }
}

// SAFETY: `links` is the first field of a `repr(C)` struct, so both pointers share an address.
unsafe impl<T> Linked for Node<T> {
    #[inline]
    unsafe fn links(ptr: NonNull<Self>) -> NonNull<ListHead> {
        ptr.cast()
    }

    #[inline]
    unsafe fn from_links(links: NonNull<ListHead>) -> NonNull<Self> {
        links.cast()
    }
}

/// Heap allocated intrusive list that owns its members.
///
/// Members are freed based on the order they were allocated in, not on the links. So a list that
/// was left in a broken state by a faulty sort still frees everything exactly once, and tests can
/// inspect the damage with [`NodeList::assert_valid`].
pub struct NodeList<T> {
    head: NonNull<ListHead>,
    /// All members, in input order.
    nodes: Vec<NonNull<Node<T>>>,
    _owns: PhantomData<Box<Node<T>>>,
}

impl<T> NodeList<T> {
    pub fn new() -> Self {
        let head = NonNull::from(Box::leak(Box::new(ListHead::new())));
        // SAFETY: Freshly allocated and never moved until `drop`.
        unsafe { ListHead::init(head) };

        Self {
            head,
            nodes: Vec::new(),
            _owns: PhantomData,
        }
    }

    pub fn from_vec(values: Vec<T>) -> Self {
        values.into_iter().collect()
    }

    pub fn push_back(&mut self, value: T) {
        let node = NonNull::from(Box::leak(Box::new(Node {
            links: ListHead::new(),
            value,
        })));

        // SAFETY: The list is well formed and the node is owned by it from here on.
        unsafe { ListHead::push_back(self.head, Node::links(node)) };
        self.nodes.push(node);
    }

    /// Sentinel of the list, to be passed on to the sort functions.
    pub fn head(&self) -> NonNull<ListHead> {
        self.head
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterates the values in link order.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        // SAFETY: The list is only modified through `&mut self`.
        unsafe {
            ListHead::iter(self.head).map(|links| &Node::<T>::from_links(links).as_ref().value)
        }
    }

    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.iter().cloned().collect()
    }

    /// For every member in link order, the position it had in the input.
    pub fn input_positions(&self) -> Vec<usize> {
        let positions: HashMap<NonNull<ListHead>, usize> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, &node)| (unsafe { Node::links(node) }, i))
            .collect();

        unsafe { ListHead::iter(self.head) }
            .map(|links| positions[&links])
            .collect()
    }

    /// Asserts that the links form a circular doubly-linked list that holds every member exactly
    /// once.
    pub fn assert_valid(&self) {
        let mut seen: HashMap<NonNull<ListHead>, bool> = self
            .nodes
            .iter()
            .map(|&node| (unsafe { Node::links(node) }, false))
            .collect();

        let mut curr = self.head;
        loop {
            // SAFETY: Only ever follows links that point to the sentinel or an owned member.
            let links = unsafe { curr.as_ref() };
            let next_node = links.next().expect("broken next link");
            let back = unsafe { next_node.as_ref() }.prev();
            assert_eq!(back, Some(curr), "prev link does not mirror next link");

            if next_node == self.head {
                break;
            }

            let visited = seen
                .get_mut(&next_node)
                .expect("link points outside of the list");
            assert!(!*visited, "member linked twice");
            *visited = true;

            curr = next_node;
        }

        assert!(seen.values().all(|&visited| visited), "member lost");
    }
}

impl<T> Default for NodeList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FromIterator<T> for NodeList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = Self::new();
        for value in iter {
            list.push_back(value);
        }

        list
    }
}

impl<T> From<Vec<T>> for NodeList<T> {
    fn from(values: Vec<T>) -> Self {
        Self::from_vec(values)
    }
}

impl<T: fmt::Debug> fmt::Debug for NodeList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T> Drop for NodeList<T> {
    fn drop(&mut self) {
        // SAFETY: Every member and the sentinel were leaked from a `Box` and are freed once.
        unsafe {
            for node in self.nodes.drain(..) {
                drop(Box::from_raw(node.as_ptr()));
            }
            drop(Box::from_raw(self.head.as_ptr()));
        }
    }
}
