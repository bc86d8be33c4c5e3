use crate::error::SequencerError;
use std::collections::VecDeque;

/// Trial indices still to run, consumed front to back. Never reordered.
#[derive(Debug, Clone, Default)]
pub struct TrialQueue {
    remaining: VecDeque<usize>,
}

impl TrialQueue {
    pub fn initialize(n: usize) -> Self {
        Self {
            remaining: (0..n).collect(),
        }
    }

    pub fn pop_front(&mut self) -> Result<usize, SequencerError> {
        self.remaining
            .pop_front()
            .ok_or(SequencerError::EmptyQueuePop)
    }

    pub fn remaining_count(&self) -> usize {
        self.remaining.len()
    }

    pub fn is_empty(&self) -> bool {
        self.remaining.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pops_in_index_order_then_fails() {
        let mut queue = TrialQueue::initialize(3);
        assert_eq!(queue.remaining_count(), 3);
        assert_eq!(queue.pop_front(), Ok(0));
        assert_eq!(queue.pop_front(), Ok(1));
        assert_eq!(queue.pop_front(), Ok(2));
        assert!(queue.is_empty());
        assert_eq!(queue.pop_front(), Err(SequencerError::EmptyQueuePop));
    }

    #[test]
    fn empty_queue_from_zero() {
        let mut queue = TrialQueue::initialize(0);
        assert_eq!(queue.remaining_count(), 0);
        assert!(queue.pop_front().is_err());
    }
}
