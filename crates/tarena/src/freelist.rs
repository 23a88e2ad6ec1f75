//! Address-ordered free list with pairwise coalescing.
//!
//! Freed blocks are threaded through the `next` link of their own headers,
//! ordered by chunk and then by address. The list is kept fully coalesced
//! after every insertion: no two entries are ever byte-adjacent. That
//! makes one merge check in each direction sufficient when a block is
//! inserted.
//!
//! Reuse is first-fit and whole-block: a block larger than the request is
//! handed out as is, never split.

use crate::raw::{HeaderPtr, HEADER_SIZE};

pub(crate) struct FreeList {
    head: Option<HeaderPtr>,
}

impl FreeList {
    pub(crate) const fn new() -> Self {
        Self { head: None }
    }

    /// Unlink and return the first block (in address order) whose size is
    /// at least `size`. The returned block is marked in use.
    pub(crate) fn take_first_fit(&mut self, size: usize) -> Option<HeaderPtr> {
        let mut prev = None;
        let mut cursor = self.head;
        while let Some(block) = cursor {
            if block.size() >= size {
                self.relink(prev, block.next());
                block.set_freed(false);
                block.set_next(None);
                return Some(block);
            }
            prev = Some(block);
            cursor = block.next();
        }
        None
    }

    /// Mark `block` freed and insert it at its sorted position, merging it
    /// with the following and then the preceding entry when adjacent.
    pub(crate) fn insert(&mut self, block: HeaderPtr) {
        debug_assert!(!block.is_freed());
        block.set_freed(true);

        let key = block.sort_key();
        let mut prev = None;
        let mut cursor = self.head;
        while let Some(entry) = cursor {
            if entry.sort_key() > key {
                break;
            }
            prev = Some(entry);
            cursor = entry.next();
        }

        self.relink(prev, Some(block));
        block.set_next(cursor);

        if let Some(next) = cursor {
            if block.adjoins(next) {
                block.set_size(block.size() + HEADER_SIZE + next.size());
                block.set_next(next.next());
            }
        }

        if let Some(prev) = prev {
            if prev.adjoins(block) {
                prev.set_size(prev.size() + HEADER_SIZE + block.size());
                prev.set_next(block.next());
            }
        }
    }

    /// Forget every entry. The blocks themselves are left untouched.
    pub(crate) fn clear(&mut self) {
        self.head = None;
    }

    /// Iterate entries in list (address) order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = HeaderPtr> + '_ {
        std::iter::successors(self.head, |block| block.next())
    }

    /// Point `prev` (or the head, when `prev` is `None`) at `next`.
    fn relink(&mut self, prev: Option<HeaderPtr>, next: Option<HeaderPtr>) {
        match prev {
            Some(prev) => prev.set_next(next),
            None => self.head = next,
        }
    }
}
