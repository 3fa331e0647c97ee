use crate::containers::SlotIndex;
use crate::containers::SlotIndexKind;
use crate::propagation::DomainEvents;
use crate::propagation::LocalId;
use crate::propagation::PropagatorId;
use crate::propagation::PropagatorVarId;
use crate::propagation::VariableId;

/// A propagator reading a variable at a specific argument position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Watcher {
    pub(crate) handle: PropagatorVarId,
    /// The events on the variable the propagator is interested in.
    pub(crate) conditions: DomainEvents,
}

/// For every variable, the propagators which read it, in the order in which they were attached.
#[derive(Debug, Clone)]
pub(crate) struct VariableRegistry {
    slots: SlotIndex<VariableId, u32>,
    watchers: Vec<Vec<Watcher>>,
}

impl VariableRegistry {
    pub(crate) fn new(kind: SlotIndexKind) -> Self {
        VariableRegistry {
            slots: SlotIndex::new(kind),
            watchers: Vec::new(),
        }
    }

    pub(crate) fn num_variables(&self) -> usize {
        self.watchers.len()
    }

    pub(crate) fn watch(&mut self, variable: VariableId, watcher: Watcher) {
        let slot = match self.slots.get(variable) {
            Some(slot) => slot,
            None => {
                let slot = self.watchers.len() as u32;
                self.watchers.push(Vec::new());
                let _ = self.slots.set(variable, slot);
                slot
            }
        };

        self.watchers[slot as usize].push(watcher);
    }

    /// Removes all watchers of `propagator` from the given variables.
    pub(crate) fn unwatch(&mut self, propagator: PropagatorId, variables: &[VariableId]) {
        for &variable in variables {
            if let Some(slot) = self.slots.get(variable) {
                self.watchers[slot as usize]
                    .retain(|watcher| watcher.handle.propagator != propagator);
            }
        }
    }

    pub(crate) fn watchers(&self, variable: VariableId) -> &[Watcher] {
        self.slots
            .get(variable)
            .map(|slot| self.watchers[slot as usize].as_slice())
            .unwrap_or_default()
    }

    /// The first position at which `propagator` reads `variable`.
    pub(crate) fn argument_index_in(
        &self,
        variable: VariableId,
        propagator: PropagatorId,
    ) -> Option<LocalId> {
        self.watchers(variable)
            .iter()
            .find(|watcher| watcher.handle.propagator == propagator)
            .map(|watcher| watcher.handle.variable)
    }
}
