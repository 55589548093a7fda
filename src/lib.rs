//! Stable, adaptive TimSort for intrusive circular doubly-linked lists.
//!
//! The sort rearranges the links of the list members in place, records are never moved or
//! copied. It detects presorted runs in the input, reverses strictly descending ones, extends
//! short runs with binary insertion and merges the runs on a stack that keeps their lengths
//! balanced. Sorted and strictly descending inputs take `n - 1` comparisons.
//!
//! While the sort is running, the lists it works on are singly linked and null-terminated, the
//! `prev` links are only rebuilt during the final merge. If the comparison function panics, the
//! list is relinked into a valid circular list that holds every member exactly once, in
//! unspecified order.

use core::cmp::Ordering;
use core::iter;
use core::ptr::NonNull;

mod collapse;
mod list;
mod merge;
mod run;

#[cfg(test)]
mod test_util;

pub use list::{Iter, Linked, ListHead};

use list::{build_prev_link, last, link, next, set_next, Link};
use run::{min_run_len, Run};

/// State of a single sort call.
///
/// Every member of the list is reachable from exactly one of `runs`, `in_flight` and `rest`
/// whenever `is_less` is called. Each of them is a null-terminated chain linked through `next`.
pub(crate) struct MergeState<F> {
    /// Sentinel of the list being sorted.
    head: NonNull<ListHead>,
    is_less: F,
    min_run: usize,
    /// Sorted runs waiting to be merged, oldest first.
    runs: Vec<Run>,
    /// Unconsumed input.
    rest: Link,
    /// Chains that are being built by the current operation.
    in_flight: [Link; 2],
}

impl<F> MergeState<F>
where
    F: FnMut(NonNull<ListHead>, NonNull<ListHead>) -> bool,
{
    pub(crate) fn new(head: NonNull<ListHead>, is_less: F, min_run: usize, rest: Link) -> Self {
        Self {
            head,
            is_less,
            min_run,
            runs: Vec::new(),
            rest,
            in_flight: [None, None],
        }
    }

    /// Consumes the whole input and links the sorted result back into the list.
    unsafe fn sort(mut self) {
        let mut len = 0;
        while let Some(first) = self.rest {
            let run = self.find_run(first);
            debug_assert!(run.len >= 1);
            len += run.len;

            self.runs.push(run);
            self.merge_collapse();
        }

        self.merge_force_collapse();
        debug_assert!(self.runs.len() <= 2);
        debug_assert_eq!(self.runs.iter().map(|run| run.len).sum::<usize>(), len);

        let Some(upper) = self.runs.pop() else {
            return;
        };

        match self.runs.pop() {
            Some(lower) => self.merge_final(lower.head, upper.head),
            // The whole input was a single run.
            None => build_prev_link(self.head, self.head, Some(upper.head)),
        }
    }
}

impl<F> Drop for MergeState<F> {
    // Only does work if the comparison function panicked, a completed sort leaves nothing behind.
    fn drop(&mut self) {
        let head = self.head;
        let mut tail = head;

        let chains = self
            .runs
            .drain(..)
            .map(|run| Some(run.head))
            .chain(self.in_flight.iter_mut().map(Option::take))
            .chain(iter::once(self.rest.take()));

        for mut chain in chains {
            // SAFETY: All chains are disjoint, null-terminated and hold live members of the list.
            unsafe {
                while let Some(node) = chain {
                    link(tail, node);
                    tail = node;
                    chain = next(node);
                }
            }
        }

        if tail != head {
            // SAFETY: See above.
            unsafe { link(tail, head) };
        }
    }
}

unsafe fn list_sort<F>(head: NonNull<ListHead>, is_less: F)
where
    F: FnMut(NonNull<ListHead>, NonNull<ListHead>) -> bool,
{
    if ListHead::is_empty(head) {
        return;
    }

    let len = ListHead::len(head);

    // Break the circle, from here on the members form a null-terminated chain.
    set_next(last(head), None);

    MergeState::new(head, is_less, min_run_len(len), next(head)).sort();
}

/// Sorts the list anchored at `head` with a comparison function that receives `ctx`.
///
/// The sort is stable, members that compare equal keep their relative order. `compare` is only
/// ever called with two distinct members of the list. Consistent results are required for a sorted
/// result. An inconsistent comparison function, or one that panics, still leaves a valid list
/// holding every member exactly once.
///
/// The first argument of `compare` always comes later in the input than the second one, so
/// `compare(later, earlier)` must return [`Ordering::Less`] for `later` to move in front.
///
/// # Safety
///
/// `head` must be the initialized sentinel of a well-formed circular list whose members are all
/// embedded in live `T` records. Nothing else may access the list while it is sorted.
pub unsafe fn sort_with_context<T, C, F>(ctx: &mut C, head: NonNull<ListHead>, mut compare: F)
where
    T: Linked,
    C: ?Sized,
    F: FnMut(&mut C, &T, &T) -> Ordering,
{
    list_sort(head, |a, b| {
        compare(ctx, T::from_links(a).as_ref(), T::from_links(b).as_ref()) == Ordering::Less
    });
}

/// Sorts the list anchored at `head` with a comparison function.
///
/// # Safety
///
/// See [`sort_with_context`].
pub unsafe fn sort_by<T, F>(head: NonNull<ListHead>, mut compare: F)
where
    T: Linked,
    F: FnMut(&T, &T) -> Ordering,
{
    sort_with_context(&mut (), head, |_, a: &T, b: &T| compare(a, b));
}

/// Sorts the list anchored at `head` in ascending order.
///
/// # Safety
///
/// See [`sort_with_context`].
pub unsafe fn sort<T>(head: NonNull<ListHead>)
where
    T: Linked + Ord,
{
    sort_by::<T, _>(head, T::cmp);
}
