//! Intrusive circular doubly-linked list links.
//!
//! A list is anchored at a sentinel [`ListHead`] that is not part of any record. Every member
//! record embeds its own [`ListHead`], and [`Linked`] maps between the two. An empty list is a
//! sentinel whose `next` and `prev` both point to itself.
//!
//! Nothing in here allocates. The caller owns every record and the sentinel, and must keep them
//! in place for as long as they are linked.

use core::marker::PhantomPinned;
use core::ptr::NonNull;

pub(crate) type Link = Option<NonNull<ListHead>>;

/// The `next` and `prev` links of a list member, or of the list sentinel.
#[derive(Debug)]
pub struct ListHead {
    next: Link,
    prev: Link,
    /// Links must never move while they are part of a list, and must never receive LLVM `noalias`
    /// annotations, see https://github.com/rust-lang/rust/issues/63818.
    _pin: PhantomPinned,
}

/// Types that embed a [`ListHead`] and can be sorted as members of a list.
///
/// # Safety
///
/// `links` and `from_links` must be inverse to each other, and the returned pointers must stay
/// within the allocation of the record they were derived from.
pub unsafe trait Linked {
    /// Returns the links embedded in the record `ptr`.
    ///
    /// # Safety
    ///
    /// `ptr` must point to a live `Self`.
    unsafe fn links(ptr: NonNull<Self>) -> NonNull<ListHead>;

    /// Returns the record that embeds `links`.
    ///
    /// # Safety
    ///
    /// `links` must be embedded in a live `Self`.
    unsafe fn from_links(links: NonNull<ListHead>) -> NonNull<Self>;
}

// A bare `ListHead` is its own record, the comparison function gets to see the raw links.
unsafe impl Linked for ListHead {
    #[inline]
    unsafe fn links(ptr: NonNull<Self>) -> NonNull<ListHead> {
        ptr
    }

    #[inline]
    unsafe fn from_links(links: NonNull<ListHead>) -> NonNull<Self> {
        links
    }
}

impl ListHead {
    /// Returns unlinked links. Call [`ListHead::init`] before using it as a sentinel.
    pub const fn new() -> Self {
        Self {
            next: None,
            prev: None,
            _pin: PhantomPinned,
        }
    }

    /// The node after this one, `None` if these links were never linked.
    pub fn next(&self) -> Option<NonNull<ListHead>> {
        self.next
    }

    /// The node before this one, `None` if these links were never linked.
    pub fn prev(&self) -> Option<NonNull<ListHead>> {
        self.prev
    }

    /// Turns `head` into the sentinel of an empty list.
    ///
    /// # Safety
    ///
    /// `head` must be valid for writes and must not move while the list is in use.
    pub unsafe fn init(head: NonNull<ListHead>) {
        link(head, head);
    }

    /// Returns `true` if the list anchored at `head` has no members.
    ///
    /// Links that were never initialized are considered empty.
    ///
    /// # Safety
    ///
    /// `head` must be valid for reads.
    pub unsafe fn is_empty(head: NonNull<ListHead>) -> bool {
        match next(head) {
            Some(first) => first == head,
            None => true,
        }
    }

    /// Counts the members of the list anchored at `head`, *O*(*n*).
    ///
    /// # Safety
    ///
    /// `head` must be the sentinel of a well-formed circular list.
    pub unsafe fn len(head: NonNull<ListHead>) -> usize {
        ListHead::iter(head).count()
    }

    /// Links `node` in as the last member of the list anchored at `head`.
    ///
    /// # Safety
    ///
    /// `head` must be the sentinel of a well-formed circular list. `node` must not be a member of
    /// any list, and must stay alive and in place for as long as it is linked.
    pub unsafe fn push_back(head: NonNull<ListHead>, node: NonNull<ListHead>) {
        let last = prev_unchecked(head);
        link(last, node);
        link(node, head);
    }

    /// Links `node` in as the first member of the list anchored at `head`.
    ///
    /// # Safety
    ///
    /// Same as [`ListHead::push_back`].
    pub unsafe fn push_front(head: NonNull<ListHead>, node: NonNull<ListHead>) {
        let first = next_unchecked(head);
        link(node, first);
        link(head, node);
    }

    /// Iterates the members of the list anchored at `head`, front to back.
    ///
    /// # Safety
    ///
    /// `head` must be the sentinel of a well-formed circular list, that is not modified while the
    /// iterator is in use.
    pub unsafe fn iter(head: NonNull<ListHead>) -> Iter {
        Iter {
            head,
            curr: next(head).filter(|&first| first != head),
        }
    }
}

impl Default for ListHead {
    fn default() -> Self {
        Self::new()
    }
}

/// Forward iterator over the members of a list, see [`ListHead::iter`].
pub struct Iter {
    head: NonNull<ListHead>,
    curr: Link,
}

impl Iterator for Iter {
    type Item = NonNull<ListHead>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.curr?;
        // SAFETY: The creator of the iterator guarantees that the list is well formed.
        self.curr = unsafe { next(node) }.filter(|&next_node| next_node != self.head);

        Some(node)
    }
}

// --- Raw link access ---
//
// All link rewiring in the sort goes through these. They read and write the fields through the
// raw pointer, no references to a `ListHead` are created while the list is being rearranged.

#[inline(always)]
pub(crate) unsafe fn next(node: NonNull<ListHead>) -> Link {
    (*node.as_ptr()).next
}

#[inline(always)]
pub(crate) unsafe fn set_next(node: NonNull<ListHead>, next: Link) {
    (*node.as_ptr()).next = next;
}

/// `next` for nodes that are known to have a successor.
#[inline(always)]
pub(crate) unsafe fn next_unchecked(node: NonNull<ListHead>) -> NonNull<ListHead> {
    let next_node = next(node);
    debug_assert!(next_node.is_some());
    next_node.unwrap_unchecked()
}

#[inline(always)]
unsafe fn prev_unchecked(node: NonNull<ListHead>) -> NonNull<ListHead> {
    let prev_node = (*node.as_ptr()).prev;
    debug_assert!(prev_node.is_some());
    prev_node.unwrap_unchecked()
}

/// Makes `b` the successor of `a`, in both directions.
#[inline(always)]
pub(crate) unsafe fn link(a: NonNull<ListHead>, b: NonNull<ListHead>) {
    (*a.as_ptr()).next = Some(b);
    (*b.as_ptr()).prev = Some(a);
}

/// Returns the last node of the list anchored at `head`.
#[inline(always)]
pub(crate) unsafe fn last(head: NonNull<ListHead>) -> NonNull<ListHead> {
    prev_unchecked(head)
}

/// Appends the null-terminated chain `list` after `tail`, restoring every `prev` link on the way,
/// and closes the circle at `head`.
pub(crate) unsafe fn build_prev_link(
    head: NonNull<ListHead>,
    mut tail: NonNull<ListHead>,
    mut list: Link,
) {
    while let Some(node) = list {
        link(tail, node);
        tail = node;
        list = next(node);
    }

    // The final links to make a circular doubly-linked list.
    link(tail, head);
}
