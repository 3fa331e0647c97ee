use std::collections::VecDeque;

use super::PropagatorSlot;
use crate::containers::KeyedVec;
use crate::fixpoint_assert_moderate;
use crate::propagation::DomainEvents;
use crate::propagation::LocalId;
use crate::propagation::PropagatorEvent;

/// The events which have not yet been delivered to a single propagator.
#[derive(Debug, Clone, Default)]
pub(crate) struct PendingEvents {
    /// Whether the propagator is in a fine queue.
    pub(crate) scheduled_fine: bool,
    /// Whether the propagator is in a coarse queue.
    pub(crate) scheduled_coarse: bool,
    /// The delayed propagation requested by the propagator, set iff `scheduled_coarse`.
    coarse_event: Option<PropagatorEvent>,
    /// The union of undelivered events, per argument.
    masks: KeyedVec<LocalId, DomainEvents>,
    /// The arguments with a non-empty mask, in the order in which they were first changed.
    modified: VecDeque<LocalId>,
}

impl PendingEvents {
    pub(crate) fn new(argument_count: usize) -> PendingEvents {
        let mut masks = KeyedVec::default();
        masks.resize(argument_count, DomainEvents::NONE);

        PendingEvents {
            masks,
            ..Default::default()
        }
    }

    /// Merges `events` into the mask of `local_id`.
    pub(crate) fn record(&mut self, local_id: LocalId, events: DomainEvents) {
        fixpoint_assert_moderate!(!events.is_empty());

        self.masks.accomodate(local_id, DomainEvents::NONE);
        if self.masks[local_id].is_empty() {
            self.modified.push_back(local_id);
        }
        self.masks[local_id] |= events;
    }

    /// Removes the argument which was changed first, together with its accumulated events.
    pub(crate) fn take_next(&mut self) -> Option<(LocalId, DomainEvents)> {
        let local_id = self.modified.pop_front()?;
        let events = std::mem::take(&mut self.masks[local_id]);
        Some((local_id, events))
    }

    pub(crate) fn has_fine_events(&self) -> bool {
        !self.modified.is_empty()
    }

    /// Whether anything is waiting to be delivered.
    pub(crate) fn is_pending(&self) -> bool {
        self.scheduled_fine || self.scheduled_coarse || self.has_fine_events()
    }

    /// Merges a request for delayed propagation; returns `true` if no delayed propagation was
    /// pending yet, in which case the propagator still has to be put in a coarse queue.
    pub(crate) fn request_coarse(&mut self, event: PropagatorEvent) -> bool {
        let newly_scheduled = !self.scheduled_coarse;
        self.coarse_event = Some(match self.coarse_event {
            Some(pending) => pending.merge(event),
            None => event,
        });
        self.scheduled_coarse = true;
        newly_scheduled
    }

    pub(crate) fn take_coarse(&mut self) -> Option<PropagatorEvent> {
        self.scheduled_coarse = false;
        self.coarse_event.take()
    }

    pub(crate) fn coarse_event(&self) -> Option<PropagatorEvent> {
        self.coarse_event
    }

    /// The arguments with undelivered events, in delivery order.
    pub(crate) fn pending_arguments(&self) -> impl Iterator<Item = (LocalId, DomainEvents)> + '_ {
        self.modified
            .iter()
            .map(|&local_id| (local_id, self.masks[local_id]))
    }

    pub(crate) fn clear_fine(&mut self) {
        while let Some(local_id) = self.modified.pop_back() {
            self.masks[local_id] = DomainEvents::NONE;
        }
        self.scheduled_fine = false;
    }

    pub(crate) fn clear_coarse(&mut self) {
        self.scheduled_coarse = false;
        self.coarse_event = None;
    }

    pub(crate) fn clear(&mut self) {
        self.clear_fine();
        self.clear_coarse();
    }
}

/// The [`PendingEvents`] of every propagator, stored by slot.
#[derive(Debug, Clone, Default)]
pub(crate) struct PendingEventStore {
    pending: KeyedVec<PropagatorSlot, PendingEvents>,
}

impl PendingEventStore {
    pub(crate) fn push(&mut self, argument_count: usize) -> PropagatorSlot {
        self.pending.push(PendingEvents::new(argument_count))
    }

    pub(crate) fn swap_remove(&mut self, slot: PropagatorSlot) -> PendingEvents {
        self.pending.swap_remove(slot).0
    }

    /// Replaces the events of `slot` by an empty record for `argument_count` arguments.
    pub(crate) fn reset(&mut self, slot: PropagatorSlot, argument_count: usize) {
        self.pending[slot] = PendingEvents::new(argument_count);
    }

    pub(crate) fn is_any_pending(&self) -> bool {
        self.pending.iter().any(PendingEvents::is_pending)
    }
}

impl std::ops::Index<PropagatorSlot> for PendingEventStore {
    type Output = PendingEvents;

    fn index(&self, slot: PropagatorSlot) -> &Self::Output {
        &self.pending[slot]
    }
}

impl std::ops::IndexMut<PropagatorSlot> for PendingEventStore {
    fn index_mut(&mut self, slot: PropagatorSlot) -> &mut Self::Output {
        &mut self.pending[slot]
    }
}

#[cfg(test)]
mod tests {
    use super::PendingEvents;
    use crate::propagation::DomainEvents;
    use crate::propagation::LocalId;
    use crate::propagation::PropagatorEvent;

    #[test]
    fn events_on_the_same_argument_are_merged() {
        let mut pending = PendingEvents::new(2);

        pending.record(LocalId::from(1), DomainEvents::LOWER_BOUND);
        pending.record(LocalId::from(0), DomainEvents::REMOVAL);
        pending.record(LocalId::from(1), DomainEvents::UPPER_BOUND);

        assert_eq!(
            Some((LocalId::from(1), DomainEvents::BOUNDS)),
            pending.take_next()
        );
        assert_eq!(
            Some((LocalId::from(0), DomainEvents::REMOVAL)),
            pending.take_next()
        );
        assert_eq!(None, pending.take_next());
    }

    #[test]
    fn delivered_argument_is_queued_again_after_a_new_event() {
        let mut pending = PendingEvents::new(1);

        pending.record(LocalId::from(0), DomainEvents::ASSIGN);
        let _ = pending.take_next();
        pending.record(LocalId::from(0), DomainEvents::REMOVAL);

        assert_eq!(
            vec![(LocalId::from(0), DomainEvents::REMOVAL)],
            pending.pending_arguments().collect::<Vec<_>>()
        );
    }

    #[test]
    fn coarse_requests_are_merged() {
        let mut pending = PendingEvents::new(0);

        assert!(pending.request_coarse(PropagatorEvent::Custom));
        assert!(!pending.request_coarse(PropagatorEvent::Full));
        assert!(!pending.request_coarse(PropagatorEvent::Custom));

        assert_eq!(Some(PropagatorEvent::Full), pending.take_coarse());
        assert!(!pending.is_pending());
    }

    #[test]
    fn clear_discards_everything() {
        let mut pending = PendingEvents::new(3);
        pending.record(LocalId::from(2), DomainEvents::ASSIGN);
        pending.scheduled_fine = true;
        let _ = pending.request_coarse(PropagatorEvent::Full);

        pending.clear();

        assert!(!pending.is_pending());
        assert_eq!(None, pending.take_next());
        assert_eq!(None, pending.coarse_event());
    }
}
