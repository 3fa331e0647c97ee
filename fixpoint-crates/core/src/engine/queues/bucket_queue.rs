use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::collections::VecDeque;

use crate::fixpoint_assert_moderate;

/// A fixed number of FIFO buckets, where bucket `0` is the most urgent one.
///
/// The indices of the non-empty buckets are kept in a heap so that the most urgent non-empty
/// bucket can be found without scanning all buckets. The queue does not deduplicate entries;
/// callers track membership themselves.
#[derive(Debug, Clone)]
pub(crate) struct BucketQueue<T> {
    buckets: Vec<VecDeque<T>>,
    num_enqueued: usize,
    present_buckets: BinaryHeap<Reverse<usize>>,
}

impl<T> BucketQueue<T> {
    pub(crate) fn new(num_buckets: usize) -> BucketQueue<T> {
        BucketQueue {
            buckets: (0..num_buckets).map(|_| VecDeque::new()).collect(),
            num_enqueued: 0,
            present_buckets: BinaryHeap::new(),
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.num_enqueued == 0
    }

    pub(crate) fn len(&self) -> usize {
        self.num_enqueued
    }

    pub(crate) fn is_bucket_empty(&self, bucket: usize) -> bool {
        self.buckets[bucket].is_empty()
    }

    /// Appends `item` to the back of `bucket`.
    pub(crate) fn push(&mut self, bucket: usize, item: T) {
        fixpoint_assert_moderate!(bucket < self.buckets.len());

        if self.buckets[bucket].is_empty() {
            self.present_buckets.push(Reverse(bucket));
        }
        self.buckets[bucket].push_back(item);
        self.num_enqueued += 1;
    }

    /// The most urgent bucket which contains at least one entry.
    pub(crate) fn first_non_empty(&self) -> Option<usize> {
        self.present_buckets.peek().map(|bucket| bucket.0)
    }

    /// Removes the head of the most urgent non-empty bucket.
    pub(crate) fn pop(&mut self) -> Option<(usize, T)> {
        let bucket = self.first_non_empty()?;
        self.pop_from(bucket).map(|item| (bucket, item))
    }

    /// Removes the head of `bucket`.
    pub(crate) fn pop_from(&mut self, bucket: usize) -> Option<T> {
        let item = self.buckets[bucket].pop_front()?;
        self.num_enqueued -= 1;

        if self.buckets[bucket].is_empty() {
            if self.first_non_empty() == Some(bucket) {
                let _ = self.present_buckets.pop();
            } else {
                self.present_buckets.retain(|present| present.0 != bucket);
            }
        }

        Some(item)
    }

    /// Removes all entries, returning them from the most to the least urgent bucket.
    pub(crate) fn drain(&mut self) -> Vec<T> {
        let mut drained = Vec::with_capacity(self.num_enqueued);
        while let Some((_, item)) = self.pop() {
            drained.push(item);
        }
        drained
    }
}

#[cfg(test)]
mod tests {
    use super::BucketQueue;

    #[test]
    fn most_urgent_bucket_is_served_first() {
        let mut queue = BucketQueue::new(4);

        queue.push(2, 'a');
        queue.push(0, 'b');
        queue.push(3, 'c');
        queue.push(1, 'd');

        assert_eq!(Some((0, 'b')), queue.pop());
        assert_eq!(Some((1, 'd')), queue.pop());
        assert_eq!(Some((2, 'a')), queue.pop());
        assert_eq!(Some((3, 'c')), queue.pop());
        assert_eq!(None, queue.pop());
    }

    #[test]
    fn buckets_are_fifo() {
        let mut queue = BucketQueue::new(2);

        queue.push(1, 1);
        queue.push(1, 2);
        queue.push(1, 3);

        assert_eq!(Some(1), queue.pop_from(1));
        queue.push(1, 4);
        assert_eq!(vec![2, 3, 4], queue.drain());
        assert!(queue.is_empty());
    }

    #[test]
    fn refilled_bucket_is_found_again() {
        let mut queue = BucketQueue::new(3);

        queue.push(1, 'a');
        assert_eq!(Some((1, 'a')), queue.pop());
        assert_eq!(None, queue.first_non_empty());

        queue.push(2, 'b');
        queue.push(1, 'c');
        assert_eq!(Some(1), queue.first_non_empty());
        assert_eq!(2, queue.len());
    }

    #[test]
    fn drain_empties_all_buckets() {
        let mut queue = BucketQueue::new(3);
        queue.push(2, 'b');
        queue.push(0, 'a');

        assert_eq!(vec!['a', 'b'], queue.drain());

        assert!(queue.is_empty());
        assert!(queue.is_bucket_empty(0));
        assert!(queue.is_bucket_empty(2));
        assert_eq!(None, queue.pop());
    }
}
