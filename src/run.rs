use core::ptr::NonNull;

use crate::list::{next, next_unchecked, set_next, ListHead};
use crate::MergeState;

/// A sorted, null-terminated chain of `len` nodes waiting on the run stack.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Run {
    pub head: NonNull<ListHead>,
    pub len: usize,
}

/// Returns the minimum run length for a list of `len` elements.
///
/// Shorter lists are sorted as a single run. Otherwise the result is picked from the six most
/// significant bits of `len` such that `len / min_run` is a power of two or slightly less than
/// one, which keeps the final merges balanced.
#[cfg_attr(feature = "no_inline_sub_functions", inline(never))]
pub(crate) fn min_run_len(len: usize) -> usize {
    if len < 64 {
        return len;
    }

    let shift = (usize::BITS - len.leading_zeros()) - 6;
    let remain = (len & ((1 << shift) - 1) != 0) as usize;

    (len >> shift) + remain
}

/// Returns the middle node of the segment `left..=right`, leaning towards `left`.
///
/// # Safety
///
/// `left` and `right` must be different and `right` must be reachable from `left`.
#[inline]
pub(crate) unsafe fn list_mid(
    left: NonNull<ListHead>,
    right: NonNull<ListHead>,
) -> NonNull<ListHead> {
    debug_assert!(left != right);

    let mut slow = left;
    let mut fast = next_unchecked(left);
    while fast != right && next(fast) != Some(right) {
        fast = next_unchecked(next_unchecked(fast));
        slow = next_unchecked(slow);
    }

    slow
}

/// Inserts the detached `node` into the sorted run `head..=tail`, after every element it is not
/// less than. Returns the new head and tail of the run.
///
/// The search takes *O*(log *n*) comparisons, but *O*(*n*) steps since every midpoint has to be
/// found by walking the run.
///
/// # Safety
///
/// `head..=tail` must be a null-terminated chain of at least two nodes.
#[cfg_attr(feature = "no_inline_sub_functions", inline(never))]
pub(crate) unsafe fn binary_insert<F>(
    head: NonNull<ListHead>,
    tail: NonNull<ListHead>,
    node: NonNull<ListHead>,
    is_less: &mut F,
) -> (NonNull<ListHead>, NonNull<ListHead>)
where
    F: FnMut(NonNull<ListHead>, NonNull<ListHead>) -> bool,
{
    debug_assert!(head != tail && next(tail).is_none());

    let mut left = head;
    let mut right = tail;
    // Last node known to be not greater than `node`.
    let mut anchor = head;

    while left != right {
        let mid = list_mid(left, right);
        if is_less(node, mid) {
            right = mid;
        } else {
            anchor = mid;
            left = next_unchecked(mid);
        }
    }

    if left == head {
        // Less than every element of the run.
        set_next(node, Some(head));
        return (node, tail);
    }

    if left == tail && !is_less(node, tail) {
        // Not less than any element of the run.
        set_next(node, None);
        set_next(tail, Some(node));
        return (head, node);
    }

    set_next(node, next(anchor));
    set_next(anchor, Some(node));

    (head, tail)
}

impl<F> MergeState<F>
where
    F: FnMut(NonNull<ListHead>, NonNull<ListHead>) -> bool,
{
    /// Carves the next run off the front of the unconsumed input, which must start at `first`.
    ///
    /// Strictly descending runs are reversed while walking them. Runs shorter than the minimum run
    /// length are extended with [`binary_insert`] until they reach it or the input is exhausted.
    ///
    /// All nodes stay reachable from `self.rest` and `self.in_flight` at every comparison, see
    /// the `Drop` impl of [`MergeState`].
    #[cfg_attr(feature = "no_inline_sub_functions", inline(never))]
    pub(crate) unsafe fn find_run(&mut self, first: NonNull<ListHead>) -> Run {
        debug_assert!(self.rest == Some(first));
        debug_assert!(self.in_flight == [None, None]);

        let Some(second) = next(first) else {
            self.rest = None;
            return Run {
                head: first,
                len: 1,
            };
        };

        let mut head;
        let mut tail;
        let mut len;

        if (self.is_less)(second, first) {
            // Strictly descending, reverse the links while walking forward. The first node ends
            // up as the tail.
            set_next(first, None);
            self.in_flight[0] = Some(first);
            self.rest = Some(second);

            head = first;
            tail = first;
            len = 1;

            let mut curr = second;
            loop {
                let following = next(curr);
                set_next(curr, Some(head));
                head = curr;
                len += 1;

                self.in_flight[0] = Some(head);
                self.rest = following;

                match following {
                    Some(following) if (self.is_less)(following, curr) => curr = following,
                    _ => break,
                }
            }
        } else {
            // Non-decreasing. Nothing is relinked until the end of the run is known.
            head = first;
            tail = second;
            len = 2;

            while let Some(following) = next(tail) {
                if (self.is_less)(following, tail) {
                    break;
                }
                tail = following;
                len += 1;
            }

            self.rest = next(tail);
            set_next(tail, None);
            self.in_flight[0] = Some(head);
        }

        while len < self.min_run {
            let Some(node) = self.rest else {
                break;
            };

            self.rest = next(node);
            set_next(node, None);
            self.in_flight[1] = Some(node);

            (head, tail) = binary_insert(head, tail, node, &mut self.is_less);
            len += 1;

            self.in_flight = [Some(head), None];
        }

        self.in_flight[0] = None;

        Run { head, len }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::test_util::{chain_tagged, chain_values, counting_is_less, TestList};

    #[test]
    fn min_run_short() {
        for len in 0..64 {
            assert_eq!(min_run_len(len), len);
        }
    }

    #[test]
    fn min_run_long() {
        assert_eq!(min_run_len(64), 32);
        assert_eq!(min_run_len(65), 33);
        assert_eq!(min_run_len(127), 64);
        assert_eq!(min_run_len(128), 32);
        assert_eq!(min_run_len(1_000), 63);
        assert_eq!(min_run_len(1 << 20), 32);
        assert_eq!(min_run_len((1 << 20) + 1), 33);

        for len in 64..10_000 {
            let min_run = min_run_len(len);
            assert!((32..=64).contains(&min_run), "len: {len} min_run: {min_run}");
        }
    }

    #[test]
    fn mid_of_segment() {
        let list = TestList::detached(&[0, 1, 2, 3, 4, 5, 6, 7]);
        list.chain();

        let mid = |l: usize, r: usize| -> i32 {
            let node = unsafe { list_mid(list.node(l), list.node(r)) };
            chain_values(Some(node))[0]
        };

        assert_eq!(mid(0, 1), 0);
        assert_eq!(mid(0, 2), 0);
        assert_eq!(mid(0, 3), 1);
        assert_eq!(mid(0, 4), 1);
        assert_eq!(mid(0, 7), 3);
        assert_eq!(mid(3, 7), 4);
        assert_eq!(mid(6, 7), 6);
    }

    fn insert_into(run: &[i32], val: i32) -> Vec<(i32, usize)> {
        let mut vals = run.to_vec();
        vals.push(val);
        let list = TestList::detached(&vals);

        // Build the run without the last node.
        let head = list.node(0);
        let tail = list.node(run.len() - 1);
        for i in 0..run.len() - 1 {
            unsafe { set_next(list.node(i), Some(list.node(i + 1))) };
        }
        unsafe { set_next(tail, None) };

        let new_node = list.node(run.len());
        let mut comp_count = 0;
        let (new_head, new_tail) = unsafe {
            binary_insert(head, tail, new_node, &mut counting_is_less(&mut comp_count))
        };

        let result = chain_tagged(Some(new_head));
        assert_eq!(unsafe { next(new_tail) }, None);
        assert_eq!(chain_tagged(Some(new_tail)).len(), 1);
        assert_eq!(result.len(), vals.len());

        result
    }

    #[test]
    fn insert_new_min() {
        let result = insert_into(&[2, 4, 6, 8], 1);
        assert_eq!(result[0], (1, 4));
    }

    #[test]
    fn insert_new_max() {
        let result = insert_into(&[2, 4, 6, 8], 9);
        assert_eq!(result[4], (9, 4));
    }

    #[test]
    fn insert_inside() {
        let result = insert_into(&[2, 4, 6, 8], 5);
        let vals: Vec<i32> = result.iter().map(|(val, _)| *val).collect();
        assert_eq!(vals, [2, 4, 5, 6, 8]);
    }

    #[test]
    fn insert_after_equal() {
        // Equal elements that are already part of the run stay in front.
        for run in [&[3, 3][..], &[1, 3, 3], &[3, 3, 5], &[1, 3, 3, 3, 5, 7]] {
            let result = insert_into(run, 3);
            let last_three = result.iter().rposition(|(val, _)| *val == 3).unwrap();
            assert_eq!(result[last_three].1, run.len());
        }

        let result = insert_into(&[3, 4], 3);
        assert_eq!(result, [(3, 0), (3, 2), (4, 1)]);
    }

    #[test]
    fn insert_every_position() {
        let run = [10, 20, 30, 40, 50, 60, 70];
        for val in 5..=75 {
            let result = insert_into(&run, val);
            let vals: Vec<i32> = result.iter().map(|(val, _)| *val).collect();

            let mut expected = run.to_vec();
            expected.push(val);
            expected.sort();
            assert_eq!(vals, expected);
        }
    }

    fn find_runs(vals: &[i32], min_run: usize) -> (Vec<Vec<i32>>, usize) {
        let list = TestList::detached(vals);
        let first = list.chain();

        let mut comp_count = 0;
        let mut state = MergeState::new(
            list.head(),
            counting_is_less(&mut comp_count),
            min_run,
            Some(first),
        );

        let mut runs = Vec::new();
        while let Some(first) = state.rest {
            let run = unsafe { state.find_run(first) };
            let run_vals = chain_values(Some(run.head));
            assert_eq!(run_vals.len(), run.len);
            runs.push(run_vals);
        }
        drop(state);

        (runs, comp_count)
    }

    #[test]
    fn natural_runs() {
        let (runs, comp_count) = find_runs(&[1, 2, 2, 5, 3, 0, 4, 4], 0);
        assert_eq!(runs, [vec![1, 2, 2, 5], vec![0, 3], vec![4, 4]]);
        assert_eq!(comp_count, 7);
    }

    #[test]
    fn descending_run_is_reversed() {
        let (runs, comp_count) = find_runs(&[9, 7, 5, 3, 3, 1], 0);
        assert_eq!(runs, [vec![3, 5, 7, 9], vec![1, 3]]);
        assert_eq!(comp_count, 5);
    }

    #[test]
    fn descending_equal_not_reversed() {
        // Equal elements would swap places if they were reversed.
        let (runs, _) = find_runs(&[5, 5, 4], 0);
        assert_eq!(runs, [vec![5, 5], vec![4]]);
    }

    #[test]
    fn short_runs_are_extended() {
        let (runs, _) = find_runs(&[1, 5, 3, 2, 9, 8, 0, 7], 5);
        assert_eq!(runs, [vec![1, 2, 3, 5, 9], vec![0, 7, 8]]);

        let (runs, _) = find_runs(&[6, 4, 5, 1, 2, 3], 4);
        assert_eq!(runs, [vec![1, 4, 5, 6], vec![2, 3]]);
    }

    #[test]
    fn single_trailing_node() {
        let (runs, comp_count) = find_runs(&[4, 2, 7], 0);
        assert_eq!(runs, [vec![2, 4], vec![7]]);
        assert_eq!(comp_count, 2);
    }
}
