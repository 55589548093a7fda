//! Reference implementation built on the standard library slice sort.

use std::cmp::Ordering;
use std::ptr::NonNull;

use listsort::{Linked, ListHead};

use crate::{Node, NodeList, Sort};

/// Collects the members into a `Vec`, sorts it with `slice::sort_by` and relinks the members in
/// the resulting order. Stable, and a useful yardstick for the link based sorts.
pub struct StdVecSort;

impl Sort for StdVecSort {
    fn name() -> String {
        "rust_std_vec_stable".into()
    }

    fn sort<T>(list: &mut NodeList<T>)
    where
        T: Ord,
    {
        Self::sort_by(list, T::cmp);
    }

    fn sort_by<T, F>(list: &mut NodeList<T>, mut compare: F)
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        let head = list.head();

        // SAFETY: `list` is well formed and exclusively borrowed.
        unsafe {
            let mut members: Vec<NonNull<Node<T>>> =
                ListHead::iter(head).map(|links| Node::from_links(links)).collect();

            members.sort_by(|a, b| compare(a.as_ref().value(), b.as_ref().value()));

            ListHead::init(head);
            for node in members {
                ListHead::push_back(head, Node::links(node));
            }
        }
    }
}
