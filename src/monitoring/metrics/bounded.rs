//! Bounded sample windows

use std::collections::VecDeque;

/// Latency samples retained per dependency
pub(super) const MAX_LATENCY_SAMPLES: usize = 1_000;

pub(super) trait BoundedPush<T> {
    fn push_bounded(&mut self, value: T, max_size: usize);
}

impl<T> BoundedPush<T> for VecDeque<T> {
    /// Push, evicting the oldest value once `max_size` is reached
    #[inline]
    fn push_bounded(&mut self, value: T, max_size: usize) {
        if max_size == 0 {
            return;
        }
        while self.len() >= max_size {
            self.pop_front();
        }
        self.push_back(value);
    }
}
