use std::collections::VecDeque;

use crate::containers::HashSet;
use crate::propagation::PropagatorId;

/// The propagators whose full filter has to run before the queues are served, e.g. because they
/// were never propagated or their scope changed.
///
/// Each propagator occurs at most once; propagators are handed out in the order in which they
/// were added.
#[derive(Debug, Clone, Default)]
pub(crate) struct PropagationTrigger {
    order: VecDeque<PropagatorId>,
    members: HashSet<PropagatorId>,
}

impl PropagationTrigger {
    pub(crate) fn needs_to_run(&self) -> bool {
        !self.order.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns `false` if the propagator was already waiting.
    pub(crate) fn add(&mut self, propagator: PropagatorId) -> bool {
        let is_new = self.members.insert(propagator);
        if is_new {
            self.order.push_back(propagator);
        }
        is_new
    }

    pub(crate) fn remove(&mut self, propagator: PropagatorId) {
        if self.members.remove(&propagator) {
            self.order.retain(|&waiting| waiting != propagator);
        }
    }

    /// Removes the propagator which was added first.
    pub(crate) fn pop(&mut self) -> Option<PropagatorId> {
        let propagator = self.order.pop_front()?;
        let _ = self.members.remove(&propagator);
        Some(propagator)
    }

    pub(crate) fn clear(&mut self) {
        self.order.clear();
        self.members.clear();
    }
}
