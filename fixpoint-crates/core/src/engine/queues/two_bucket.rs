use super::layout_buckets;
use super::BucketQueue;
use super::QueueEntry;
use super::QueueKind;
use super::QueueingPolicy;
use crate::engine::EngineOptions;
use crate::fixpoint_assert_simple;
use crate::propagation::Priority;

/// The default queueing discipline.
///
/// All fine buckets come before all coarse buckets, so delayed propagations only happen once no
/// fine event is left. Every pop serves the head of the most urgent non-empty bucket; the most
/// urgent bucket is therefore emptied completely, whereas any other bucket only yields a single
/// entry before the more urgent buckets are looked at again.
#[derive(Debug, Clone)]
pub struct TwoBucketPolicy {
    queue: BucketQueue<QueueEntry>,
    fine_buckets: [Option<usize>; Priority::NUM_PRIORITIES],
    coarse_buckets: [Option<usize>; Priority::NUM_PRIORITIES],
}

impl Default for TwoBucketPolicy {
    fn default() -> Self {
        TwoBucketPolicy::new(&EngineOptions::default())
    }
}

impl QueueingPolicy for TwoBucketPolicy {
    fn new(options: &EngineOptions) -> Self {
        let (fine_buckets, num_fine) = layout_buckets(&options.fine_event_buckets, 0);
        let (coarse_buckets, num_coarse) =
            layout_buckets(&options.coarse_event_buckets, num_fine);

        TwoBucketPolicy {
            queue: BucketQueue::new(num_fine + num_coarse),
            fine_buckets,
            coarse_buckets,
        }
    }

    fn fine_bucket(&self, priority: Priority) -> Option<usize> {
        self.fine_buckets[priority.index()]
    }

    fn coarse_bucket(&self, priority: Priority) -> Option<usize> {
        self.coarse_buckets[priority.index()]
    }

    fn enqueue(&mut self, entry: QueueEntry, priority: Priority) {
        let bucket = match entry.kind {
            QueueKind::Fine => self.fine_bucket(priority),
            QueueKind::Coarse => self.coarse_bucket(priority),
        };
        fixpoint_assert_simple!(
            bucket.is_some(),
            "{entry:?} cannot be queued with priority {priority:?}"
        );

        if let Some(bucket) = bucket {
            self.queue.push(bucket, entry);
        }
    }

    fn pop(&mut self) -> Option<QueueEntry> {
        self.queue.pop().map(|(_, entry)| entry)
    }

    fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    fn len(&self) -> usize {
        self.queue.len()
    }

    fn drain(&mut self) -> Vec<QueueEntry> {
        self.queue.drain()
    }
}

#[cfg(test)]
mod tests {
    use super::TwoBucketPolicy;
    use crate::engine::queues::QueueEntry;
    use crate::engine::queues::QueueingPolicy;
    use crate::propagation::Priority;
    use crate::propagation::PropagatorId;

    #[test]
    fn default_tables() {
        let policy = TwoBucketPolicy::default();

        assert_eq!(Some(0), policy.fine_bucket(Priority::Unary));
        assert_eq!(Some(0), policy.fine_bucket(Priority::Ternary));
        assert_eq!(Some(1), policy.fine_bucket(Priority::Linear));
        assert_eq!(Some(2), policy.fine_bucket(Priority::VerySlow));

        assert_eq!(None, policy.coarse_bucket(Priority::Binary));
        assert_eq!(Some(3), policy.coarse_bucket(Priority::Linear));
        assert_eq!(Some(6), policy.coarse_bucket(Priority::VerySlow));
    }

    #[test]
    fn coarse_entries_wait_for_all_fine_entries() {
        let mut policy = TwoBucketPolicy::default();

        policy.enqueue(QueueEntry::coarse(PropagatorId(0)), Priority::Linear);
        policy.enqueue(QueueEntry::fine(PropagatorId(1)), Priority::VerySlow);
        policy.enqueue(QueueEntry::fine(PropagatorId(2)), Priority::Unary);

        assert_eq!(Some(QueueEntry::fine(PropagatorId(2))), policy.pop());
        assert_eq!(Some(QueueEntry::fine(PropagatorId(1))), policy.pop());
        assert_eq!(Some(QueueEntry::coarse(PropagatorId(0))), policy.pop());
        assert_eq!(None, policy.pop());
    }

    #[test]
    fn cheaper_bucket_preempts_after_a_single_entry() {
        let mut policy = TwoBucketPolicy::default();

        policy.enqueue(QueueEntry::fine(PropagatorId(0)), Priority::Linear);
        policy.enqueue(QueueEntry::fine(PropagatorId(1)), Priority::Linear);

        assert_eq!(Some(QueueEntry::fine(PropagatorId(0))), policy.pop());
        policy.enqueue(QueueEntry::fine(PropagatorId(2)), Priority::Binary);

        assert_eq!(Some(QueueEntry::fine(PropagatorId(2))), policy.pop());
        assert_eq!(Some(QueueEntry::fine(PropagatorId(1))), policy.pop());
        assert!(policy.is_empty());
    }
}
