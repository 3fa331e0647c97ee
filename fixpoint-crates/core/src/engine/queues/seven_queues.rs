use super::BucketQueue;
use super::QueueEntry;
use super::QueueKind;
use super::QueueingPolicy;
use crate::engine::EngineOptions;
use crate::fixpoint_assert_simple;
use crate::propagation::Priority;

/// One fine and one coarse queue per priority tier, served cheapest tier first with the fine
/// queue of a tier before its coarse queue.
///
/// Once a queue has been selected it is emptied completely, including entries which are added
/// while it is being served, before the cheapest non-empty queue is selected again.
///
/// The bucket tables of the [`EngineOptions`] only determine which tiers have a fine and which
/// have a coarse queue; the grouping of tiers is ignored.
#[derive(Debug, Clone)]
pub struct SevenQueuePolicy {
    queue: BucketQueue<QueueEntry>,
    has_fine: [bool; Priority::NUM_PRIORITIES],
    has_coarse: [bool; Priority::NUM_PRIORITIES],
    current: Option<usize>,
}

impl Default for SevenQueuePolicy {
    fn default() -> Self {
        SevenQueuePolicy::new(&EngineOptions::default())
    }
}

impl QueueingPolicy for SevenQueuePolicy {
    fn new(options: &EngineOptions) -> Self {
        SevenQueuePolicy {
            queue: BucketQueue::new(2 * Priority::NUM_PRIORITIES),
            has_fine: options.fine_event_buckets.map(|bucket| bucket.is_some()),
            has_coarse: options.coarse_event_buckets.map(|bucket| bucket.is_some()),
            current: None,
        }
    }

    fn fine_bucket(&self, priority: Priority) -> Option<usize> {
        self.has_fine[priority.index()].then_some(2 * priority.index())
    }

    fn coarse_bucket(&self, priority: Priority) -> Option<usize> {
        self.has_coarse[priority.index()].then_some(2 * priority.index() + 1)
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
        let bucket = match self.current {
            Some(current) if !self.queue.is_bucket_empty(current) => current,
            _ => self.queue.first_non_empty()?,
        };

        self.current = Some(bucket);
        self.queue.pop_from(bucket)
    }

    fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    fn len(&self) -> usize {
        self.queue.len()
    }

    fn drain(&mut self) -> Vec<QueueEntry> {
        self.current = None;
        self.queue.drain()
    }
}
