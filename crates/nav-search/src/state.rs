//! Per-corner search records and the open list.
//!
//! # Arena
//!
//! Records live in a hash map keyed by `CornerPos` and are created lazily the
//! first time a corner is reached.  Parent links are plain `CornerPos` keys,
//! so reconstruction walks keys through the map and no record ever borrows
//! another.
//!
//! # Open list ordering
//!
//! The open list is a `BTreeSet` of `(f, seq, corner)`.  `seq` is a
//! per-search insertion counter, so equal-`f` entries pop in insertion order.
//! Each record remembers the key of its live open entry; an improved corner
//! has that entry removed before the new one goes in, so a corner is never
//! present twice.

use std::collections::BTreeSet;

use nav_core::CornerPos;

/// Which list a corner currently belongs to.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum ListTag {
    None,
    Open,
    Closed,
}

/// Mutable per-corner search record.
#[derive(Clone, Debug)]
pub struct SearchState {
    /// Best known cost from the start.  `i64::MAX` until first reached.
    pub g: i64,
    /// Straight-line estimate to the goal.
    pub h: i64,
    /// Parent corner in the search tree.  The start is its own parent.
    pub parent: CornerPos,
    pub list: ListTag,
    /// `(f, seq)` of this corner's live open-list entry.
    pub(crate) open_key: Option<(i64, u64)>,
}

impl SearchState {
    pub(crate) fn unvisited(corner: CornerPos, h: i64) -> Self {
        Self { g: i64::MAX, h, parent: corner, list: ListTag::None, open_key: None }
    }

    #[inline]
    pub fn f(&self) -> i64 {
        self.g.saturating_add(self.h)
    }
}

// ── OpenList ──────────────────────────────────────────────────────────────────

#[derive(Default)]
pub(crate) struct OpenList {
    entries: BTreeSet<(i64, u64, CornerPos)>,
    next_seq: u64,
}

impl OpenList {
    /// Insert `corner` with priority `f`, replacing its previous entry (if
    /// any) recorded in `state`.
    pub(crate) fn push(&mut self, corner: CornerPos, f: i64, state: &mut SearchState) {
        if let Some((old_f, old_seq)) = state.open_key.take() {
            self.entries.remove(&(old_f, old_seq, corner));
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.insert((f, seq, corner));
        state.open_key = Some((f, seq));
        state.list = ListTag::Open;
    }

    /// Remove and return the lowest `(f, seq)` entry.
    pub(crate) fn pop(&mut self) -> Option<(i64, CornerPos)> {
        self.entries.pop_first().map(|(f, _, c)| (f, c))
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
