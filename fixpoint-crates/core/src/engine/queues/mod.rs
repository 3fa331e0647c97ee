//! The queueing disciplines which decide in which order scheduled propagators are served.
//!
//! A propagator can be in the queues at most twice: once for fine events (changes to its
//! arguments which have not been delivered yet) and once for a coarse, delayed, propagation it
//! requested itself. Membership is tracked by the engine, a policy never deduplicates.
mod bucket_queue;
mod seven_queues;
mod two_bucket;

use std::fmt::Debug;

pub(crate) use bucket_queue::BucketQueue;
pub use seven_queues::SevenQueuePolicy;
pub use two_bucket::TwoBucketPolicy;

use super::EngineOptions;
use crate::propagation::Priority;
use crate::propagation::PropagatorId;

/// Whether a queue entry is for fine events or for a coarse propagation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueueKind {
    Fine,
    Coarse,
}

/// A propagator waiting in one of the queues of a [`QueueingPolicy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QueueEntry {
    pub propagator: PropagatorId,
    pub kind: QueueKind,
}

impl QueueEntry {
    pub fn fine(propagator: PropagatorId) -> QueueEntry {
        QueueEntry {
            propagator,
            kind: QueueKind::Fine,
        }
    }

    pub fn coarse(propagator: PropagatorId) -> QueueEntry {
        QueueEntry {
            propagator,
            kind: QueueKind::Coarse,
        }
    }
}

/// A queueing discipline of the [`PropagationEngine`](super::PropagationEngine).
///
/// Entries of the same bucket are always served in FIFO order; policies differ in how buckets
/// are laid out and in when the next bucket is selected.
pub trait QueueingPolicy: Debug {
    /// Creates the policy from the bucket tables in the `options`.
    fn new(options: &EngineOptions) -> Self
    where
        Self: Sized;

    /// The bucket which receives fine entries of propagators with the given priority; [`None`]
    /// if propagators of this priority cannot be added.
    fn fine_bucket(&self, priority: Priority) -> Option<usize>;

    /// The bucket which receives coarse entries of propagators with the given priority; [`None`]
    /// if propagators of this priority cannot delay their propagation.
    fn coarse_bucket(&self, priority: Priority) -> Option<usize>;

    /// Appends the entry to the bucket of its kind for the given priority.
    ///
    /// The bucket must exist.
    fn enqueue(&mut self, entry: QueueEntry, priority: Priority);

    /// Removes the next entry to be served.
    fn pop(&mut self) -> Option<QueueEntry>;

    fn is_empty(&self) -> bool;

    fn len(&self) -> usize;

    /// Removes all entries, returning them.
    fn drain(&mut self) -> Vec<QueueEntry>;
}

/// Converts a table of bucket numbers into bucket indices, placing the first bucket of the table
/// at `first_bucket`. Returns the resulting table together with the number of buckets it uses.
fn layout_buckets(
    table: &[Option<u8>; Priority::NUM_PRIORITIES],
    first_bucket: usize,
) -> ([Option<usize>; Priority::NUM_PRIORITIES], usize) {
    let num_buckets = table
        .iter()
        .flatten()
        .map(|&bucket| bucket as usize + 1)
        .max()
        .unwrap_or(0);

    let mut buckets = [None; Priority::NUM_PRIORITIES];
    for (target, bucket) in buckets.iter_mut().zip(table) {
        *target = bucket.map(|bucket| first_bucket + bucket as usize);
    }

    (buckets, num_buckets)
}

#[cfg(test)]
mod tests {
    use super::layout_buckets;

    #[test]
    fn layout_is_shifted_by_the_first_bucket() {
        let table = [None, None, None, Some(0), Some(1), Some(2), Some(3)];

        let (buckets, num_buckets) = layout_buckets(&table, 3);

        assert_eq!(4, num_buckets);
        assert_eq!(
            [None, None, None, Some(3), Some(4), Some(5), Some(6)],
            buckets
        );
    }

    #[test]
    fn empty_table_uses_no_buckets() {
        let (buckets, num_buckets) = layout_buckets(&[None; 7], 0);

        assert_eq!(0, num_buckets);
        assert!(buckets.iter().all(Option::is_none));
    }
}
