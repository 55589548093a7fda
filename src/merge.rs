use core::ptr::NonNull;

use crate::list::{build_prev_link, link, next, set_next, ListHead};
use crate::MergeState;

impl<F> MergeState<F>
where
    F: FnMut(NonNull<ListHead>, NonNull<ListHead>) -> bool,
{
    /// Merges the sorted, null-terminated chains `a` and `b` into one sorted, null-terminated
    /// chain and returns its head.
    ///
    /// `a` must hold elements that came before the elements of `b` in the input. Equal elements
    /// are taken from `a` first, which is what makes the sort stable.
    #[cfg_attr(feature = "no_inline_sub_functions", inline(never))]
    pub(crate) unsafe fn merge(
        &mut self,
        mut a: NonNull<ListHead>,
        mut b: NonNull<ListHead>,
    ) -> NonNull<ListHead> {
        // The merged prefix always ends in the side it was last extended from. So the merged
        // prefix plus the other side cover every node, which is what `in_flight` tracks.
        self.in_flight = [Some(a), Some(b)];

        let mut head = a;
        let mut tail: Option<NonNull<ListHead>> = None;

        loop {
            // If equal, take 'a' -- important for sort stability.
            let take_a = !(self.is_less)(b, a);
            let node = if take_a { a } else { b };

            match tail {
                Some(tail) => set_next(tail, Some(node)),
                None => head = node,
            }
            tail = Some(node);

            if take_a {
                match next(a) {
                    Some(next_a) => a = next_a,
                    None => {
                        set_next(node, Some(b));
                        break;
                    }
                }
                self.in_flight = [Some(head), Some(b)];
            } else {
                match next(b) {
                    Some(next_b) => b = next_b,
                    None => {
                        set_next(node, Some(a));
                        break;
                    }
                }
                self.in_flight = [Some(head), Some(a)];
            }
        }

        self.in_flight = [None, None];

        head
    }

    /// Merges the last two runs like [`MergeState::merge`], while restoring every `prev` link,
    /// and closes the result into the circular list anchored at `self.head`.
    #[cfg_attr(feature = "no_inline_sub_functions", inline(never))]
    pub(crate) unsafe fn merge_final(&mut self, mut a: NonNull<ListHead>, mut b: NonNull<ListHead>) {
        let head = self.head;
        let mut tail = head;

        self.in_flight = [Some(a), Some(b)];

        let rest = loop {
            // If equal, take 'a' -- important for sort stability.
            if !(self.is_less)(b, a) {
                link(tail, a);
                tail = a;
                match next(a) {
                    Some(next_a) => a = next_a,
                    None => break b,
                }
                self.in_flight = [next(head), Some(b)];
            } else {
                link(tail, b);
                tail = b;
                match next(b) {
                    Some(next_b) => b = next_b,
                    None => break a,
                }
                self.in_flight = [next(head), Some(a)];
            }
        };

        self.in_flight = [None, None];

        // Finish linking the remainder of the other side on to tail.
        build_prev_link(head, tail, Some(rest));
    }
}
