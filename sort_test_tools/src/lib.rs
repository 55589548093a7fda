//! Shared test and benchmark tooling for list sorts.
//!
//! Sort implementations are tested through the [`Sort`] trait. Implement it for a marker type and
//! call [`instantiate_sort_tests!`] with it from an integration test to get the full suite.

use std::cmp::Ordering;

pub mod baseline;
pub mod node_list;
pub mod patterns;

pub use node_list::{Node, NodeList};

pub trait Sort {
    fn name() -> String;

    fn sort<T>(list: &mut NodeList<T>)
    where
        T: Ord;

    fn sort_by<T, F>(list: &mut NodeList<T>, compare: F)
    where
        F: FnMut(&T, &T) -> Ordering;
}
