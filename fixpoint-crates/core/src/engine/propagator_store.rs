use std::fmt::Debug;
use std::ops::Index;
use std::ops::IndexMut;

use crate::containers::KeyedVec;
use crate::containers::SlotIndex;
use crate::containers::SlotIndexKind;
use crate::containers::StorageKey;
use crate::propagation::Priority;
use crate::propagation::Propagator;
use crate::propagation::PropagatorId;
use crate::propagation::VariableId;

/// The position of a propagator in the compacted storage of the engine.
///
/// Unlike a [`PropagatorId`], the slot of a propagator changes when another propagator is
/// removed.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct PropagatorSlot(u32);

impl StorageKey for PropagatorSlot {
    fn index(&self) -> usize {
        self.0 as usize
    }

    fn create_from_index(index: usize) -> Self {
        PropagatorSlot(index as u32)
    }
}

/// The properties of a propagator which are read once, when it is added to the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct PropagatorInfo {
    pub(crate) id: PropagatorId,
    pub(crate) priority: Priority,
    pub(crate) reacts_to_fine_events: bool,
}

/// A central store for propagators.
///
/// Propagators are stored contiguously; removing one moves the last propagator into its slot.
pub(crate) struct PropagatorStore<Store> {
    propagators: KeyedVec<PropagatorSlot, Box<dyn Propagator<Store>>>,
    info: KeyedVec<PropagatorSlot, PropagatorInfo>,
    /// The variables each propagator was attached to.
    scopes: KeyedVec<PropagatorSlot, Vec<VariableId>>,
    slots: SlotIndex<PropagatorId, PropagatorSlot>,
}

impl<Store: 'static> PropagatorStore<Store> {
    pub(crate) fn new(kind: SlotIndexKind) -> Self {
        PropagatorStore {
            propagators: KeyedVec::default(),
            info: KeyedVec::default(),
            scopes: KeyedVec::default(),
            slots: SlotIndex::new(kind),
        }
    }

    pub(crate) fn num_propagators(&self) -> usize {
        self.propagators.len()
    }

    pub(crate) fn slot(&self, id: PropagatorId) -> Option<PropagatorSlot> {
        self.slots.get(id)
    }

    pub(crate) fn contains(&self, id: PropagatorId) -> bool {
        self.slots.contains(id)
    }

    pub(crate) fn info(&self, slot: PropagatorSlot) -> PropagatorInfo {
        self.info[slot]
    }

    pub(crate) fn scope(&self, slot: PropagatorSlot) -> &[VariableId] {
        &self.scopes[slot]
    }

    /// Replaces the stored scope of `slot` by the current arguments of its propagator, returning
    /// the previous scope.
    pub(crate) fn refresh_scope(&mut self, slot: PropagatorSlot) -> Vec<VariableId> {
        let current = self.propagators[slot].variables().to_vec();
        std::mem::replace(&mut self.scopes[slot], current)
    }

    /// The ids of all propagators, in slot order.
    pub(crate) fn ids(&self) -> impl Iterator<Item = PropagatorId> + '_ {
        self.info.iter().map(|info| info.id)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &dyn Propagator<Store>> + '_ {
        self.propagators.iter().map(|propagator| propagator.as_ref())
    }

    pub(crate) fn push(
        &mut self,
        info: PropagatorInfo,
        propagator: Box<dyn Propagator<Store>>,
    ) -> PropagatorSlot {
        let _ = self.scopes.push(propagator.variables().to_vec());
        let slot = self.propagators.push(propagator);
        let _ = self.info.push(info);
        let _ = self.slots.set(info.id, slot);
        slot
    }

    /// Removes the propagator in `slot`, moving the last propagator into its place.
    ///
    /// Returns the removed propagator together with the variables it was attached to.
    pub(crate) fn swap_remove(
        &mut self,
        slot: PropagatorSlot,
    ) -> (Box<dyn Propagator<Store>>, Vec<VariableId>) {
        let (propagator, moved) = self.propagators.swap_remove(slot);
        let (info, _) = self.info.swap_remove(slot);
        let (scope, _) = self.scopes.swap_remove(slot);

        let _ = self.slots.remove(info.id);
        if moved.is_some() {
            let _ = self.slots.set(self.info[slot].id, slot);
        }

        (propagator, scope)
    }
}

impl<Store: 'static> Index<PropagatorSlot> for PropagatorStore<Store> {
    type Output = dyn Propagator<Store>;

    fn index(&self, index: PropagatorSlot) -> &Self::Output {
        self.propagators[index].as_ref()
    }
}

impl<Store: 'static> IndexMut<PropagatorSlot> for PropagatorStore<Store> {
    fn index_mut(&mut self, index: PropagatorSlot) -> &mut Self::Output {
        self.propagators[index].as_mut()
    }
}

impl<Store: 'static> Debug for PropagatorStore<Store> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<_> = self.propagators.iter().map(|p| p.name()).collect();

        f.debug_struct("PropagatorStore")
            .field("propagators", &names)
            .field("info", &self.info)
            .field("scopes", &self.scopes)
            .field("slots", &self.slots)
            .finish()
    }
}
