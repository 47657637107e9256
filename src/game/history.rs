use super::types::Point;
use std::collections::VecDeque;

/// Bounded FIFO of recent head positions, oldest at the front.
#[derive(Debug, Clone)]
pub struct PositionHistory {
    entries: VecDeque<Point>,
    capacity: usize,
}

impl PositionHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn record(&mut self, p: Point) {
        self.entries.push_back(p);
        self.evict();
    }

    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity.max(1);
        self.evict();
    }

    fn evict(&mut self) {
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    /// Position recorded `index * spacing` ticks ago; index 0 is the latest record.
    /// Lookbacks past the oldest entry clamp to it. `None` until something is recorded.
    pub fn sample(&self, index: usize, spacing: usize) -> Option<Point> {
        let newest = self.entries.len().checked_sub(1)?;
        let lookback = index.saturating_mul(spacing).min(newest);
        self.entries.get(newest - lookback).copied()
    }

    pub fn latest(&self) -> Option<Point> {
        self.entries.back().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Point> + '_ {
        self.entries.iter()
    }

    pub fn offset_all(&mut self, offset: Point) {
        for entry in self.entries.iter_mut() {
            *entry += offset;
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
