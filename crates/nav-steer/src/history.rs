//! Rolling window of recent positions for stall detection.

use std::collections::VecDeque;

use nav_core::WorldPos;

pub struct PositionHistory {
    buf: VecDeque<WorldPos>,
    cap: usize,
}

impl PositionHistory {
    pub fn new(cap: usize) -> Self {
        Self { buf: VecDeque::with_capacity(cap), cap }
    }

    /// Append `pos`, evicting the oldest entry once the window is full.
    pub fn push(&mut self, pos: WorldPos) {
        if self.buf.len() == self.cap {
            self.buf.pop_front();
        }
        self.buf.push_back(pos);
    }

    pub fn clear(&mut self) {
        self.buf.clear();
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.buf.len() == self.cap
    }

    /// Distance between the oldest and newest entry once the window is full.
    pub fn net_displacement(&self) -> Option<i32> {
        if !self.is_full() {
            return None;
        }
        let (first, last) = (self.buf.front()?, self.buf.back()?);
        Some(first.distance_2d(*last))
    }
}
