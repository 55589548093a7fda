//! Run stack maintenance.
//!
//! Runs are pushed in input order, so `runs[i]` always holds elements that came before those of
//! `runs[i + 1]`. Only adjacent runs are ever merged, which keeps the merges stable.

use core::ptr::NonNull;

use crate::list::ListHead;
use crate::run::Run;
use crate::MergeState;

// Examines the stack of runs waiting to be merged and determines which pair of runs should be
// merged next, if any. Returns `Some(i)` if `runs[i]` and `runs[i + 1]` should be merged.
//
// The rules keep the run lengths on the stack decreasing faster than the fibonacci numbers from
// bottom to top, so the stack stays logarithmic in the input length. Only the top four runs are
// checked.
#[inline]
fn collapse(runs: &[Run]) -> Option<usize> {
    let n = runs.len();
    if n < 2 {
        return None;
    }

    if (n >= 3 && runs[n - 3].len <= runs[n - 2].len + runs[n - 1].len)
        || (n >= 4 && runs[n - 4].len <= runs[n - 3].len + runs[n - 2].len)
    {
        if runs[n - 3].len < runs[n - 1].len {
            Some(n - 3)
        } else {
            Some(n - 2)
        }
    } else if runs[n - 2].len <= runs[n - 1].len {
        Some(n - 2)
    } else {
        None
    }
}

// Like `collapse`, but merges unconditionally until at most two runs are left. The last two are
// left for the final merge, which also restores the `prev` links.
#[inline]
fn force_collapse(runs: &[Run]) -> Option<usize> {
    let n = runs.len();
    if n < 3 {
        return None;
    }

    if runs[n - 3].len < runs[n - 1].len {
        Some(n - 3)
    } else {
        Some(n - 2)
    }
}

impl<F> MergeState<F>
where
    F: FnMut(NonNull<ListHead>, NonNull<ListHead>) -> bool,
{
    /// Merges `runs[at]` and `runs[at + 1]` into a single run at `at`.
    #[cfg_attr(feature = "no_inline_sub_functions", inline(never))]
    unsafe fn merge_at(&mut self, at: usize) {
        // Both runs leave the stack before any comparison, they are tracked by the merge itself.
        let right = self.runs.remove(at + 1);
        let left = self.runs.remove(at);

        let head = self.merge(left.head, right.head);
        self.runs.insert(
            at,
            Run {
                head,
                len: left.len + right.len,
            },
        );
    }

    /// Restores the stack invariants after a new run was pushed.
    pub(crate) unsafe fn merge_collapse(&mut self) {
        while let Some(at) = collapse(&self.runs) {
            self.merge_at(at);
        }
    }

    /// Reduces the stack to at most two runs once the input is exhausted.
    pub(crate) unsafe fn merge_force_collapse(&mut self) {
        while let Some(at) = force_collapse(&self.runs) {
            self.merge_at(at);
        }
    }
}
