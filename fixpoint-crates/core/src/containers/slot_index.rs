//! Maps external identifiers onto compact slot numbers.
//!
//! Identifiers handed out to propagators and variables are stable but may become sparse, e.g.
//! after propagators have been removed or when the variables of a model are numbered globally.
//! The engine stores its per-entry data in contiguous vectors, and uses a [`SlotIndex`] to find
//! the slot of an identifier in constant time.
use std::fmt::Debug;
use std::marker::PhantomData;

use super::HashMap;
use super::StorageKey;

/// An id range spanning at most this many entries is always stored densely.
const MIN_DENSE_RANGE: usize = 64;
/// In [`SlotIndexKind::Auto`] mode, the dense representation tolerates this many unused entries
/// per stored identifier before switching to the hashed representation.
const MAX_HOLES_PER_ENTRY: usize = 4;

/// The representation used by a [`SlotIndex`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum SlotIndexKind {
    /// Starts array-backed and switches to hashing once the identifiers become too sparse.
    #[default]
    Auto,
    /// Always array-backed, indexed by `id - smallest_id`.
    Dense,
    /// Always hash-backed.
    Sparse,
}

/// Maps identifiers of type `Id` to slots of type `Slot`.
///
/// Querying an identifier that was never set (or was removed) returns [`None`].
#[derive(Clone)]
pub struct SlotIndex<Id, Slot> {
    kind: SlotIndexKind,
    representation: Representation<Slot>,
    len: usize,
    id: PhantomData<Id>,
}

#[derive(Clone, Debug)]
enum Representation<Slot> {
    Dense {
        offset: usize,
        slots: Vec<Option<Slot>>,
    },
    Sparse(HashMap<usize, Slot>),
}

impl<Id, Slot> Default for SlotIndex<Id, Slot> {
    fn default() -> Self {
        SlotIndex {
            kind: SlotIndexKind::Auto,
            representation: Representation::Dense {
                offset: 0,
                slots: Vec::new(),
            },
            len: 0,
            id: PhantomData,
        }
    }
}

impl<Id: StorageKey, Slot: Copy> SlotIndex<Id, Slot> {
    pub fn new(kind: SlotIndexKind) -> Self {
        let representation = match kind {
            SlotIndexKind::Auto | SlotIndexKind::Dense => Representation::Dense {
                offset: 0,
                slots: Vec::new(),
            },
            SlotIndexKind::Sparse => Representation::Sparse(HashMap::default()),
        };

        SlotIndex {
            kind,
            representation,
            len: 0,
            id: PhantomData,
        }
    }

    /// The number of identifiers which currently have a slot.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether the identifiers are currently stored in an array.
    pub fn is_dense(&self) -> bool {
        matches!(self.representation, Representation::Dense { .. })
    }

    /// Returns the slot of `id`, or [`None`] if it has no slot.
    pub fn get(&self, id: Id) -> Option<Slot> {
        let id = id.index();
        match &self.representation {
            Representation::Dense { offset, slots } => id
                .checked_sub(*offset)
                .and_then(|position| slots.get(position))
                .copied()
                .flatten(),
            Representation::Sparse(slots) => slots.get(&id).copied(),
        }
    }

    pub fn contains(&self, id: Id) -> bool {
        self.get(id).is_some()
    }

    /// Assigns `slot` to `id`, returning the previous slot of `id` if there was one.
    pub fn set(&mut self, id: Id, slot: Slot) -> Option<Slot> {
        let id = id.index();
        if self.kind == SlotIndexKind::Auto && !self.fits_densely(id) {
            self.convert_to_sparse();
        }

        let previous = match &mut self.representation {
            Representation::Dense { offset, slots } => {
                if slots.is_empty() {
                    *offset = id;
                } else if id < *offset {
                    let shift = *offset - id;
                    let _ = slots.splice(0..0, std::iter::repeat(None).take(shift));
                    *offset = id;
                }

                let position = id - *offset;
                if position >= slots.len() {
                    slots.resize(position + 1, None);
                }
                slots[position].replace(slot)
            }
            Representation::Sparse(slots) => slots.insert(id, slot),
        };

        if previous.is_none() {
            self.len += 1;
        }
        previous
    }

    /// Removes the slot of `id`, returning it if there was one.
    pub fn remove(&mut self, id: Id) -> Option<Slot> {
        let id = id.index();
        let removed = match &mut self.representation {
            Representation::Dense { offset, slots } => id
                .checked_sub(*offset)
                .and_then(|position| slots.get_mut(position))
                .and_then(Option::take),
            Representation::Sparse(slots) => slots.remove(&id),
        };

        if removed.is_some() {
            self.len -= 1;
        }
        removed
    }

    /// Whether storing `id` keeps the dense representation within its density bound.
    fn fits_densely(&self, id: usize) -> bool {
        match &self.representation {
            Representation::Dense { offset, slots } => {
                if slots.is_empty() {
                    return true;
                }
                let low = id.min(*offset);
                let high = id.max(*offset + slots.len() - 1);
                is_dense_enough(high - low + 1, self.len + 1)
            }
            Representation::Sparse(_) => true,
        }
    }

    fn convert_to_sparse(&mut self) {
        if let Representation::Dense { offset, slots } = &self.representation {
            let sparse = slots
                .iter()
                .enumerate()
                .filter_map(|(position, slot)| slot.map(|slot| (offset + position, slot)))
                .collect();
            self.representation = Representation::Sparse(sparse);
        }
    }
}

fn is_dense_enough(range: usize, count: usize) -> bool {
    range <= MIN_DENSE_RANGE + MAX_HOLES_PER_ENTRY * count
}

impl<Id, Slot: Debug> Debug for SlotIndex<Id, Slot> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlotIndex")
            .field("kind", &self.kind)
            .field("len", &self.len)
            .field("representation", &self.representation)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::SlotIndex;
    use super::SlotIndexKind;

    #[test]
    fn unset_ids_map_to_none() {
        let index: SlotIndex<usize, u32> = SlotIndex::new(SlotIndexKind::Dense);

        assert_eq!(None, index.get(0));
        assert_eq!(None, index.get(1000));
    }

    #[test]
    fn dense_index_handles_ids_below_the_offset() {
        let mut index: SlotIndex<usize, u32> = SlotIndex::new(SlotIndexKind::Dense);
        let _ = index.set(10, 0);
        let _ = index.set(3, 1);

        assert_eq!(Some(0), index.get(10));
        assert_eq!(Some(1), index.get(3));
        assert_eq!(None, index.get(4));
        assert_eq!(2, index.len());
    }

    #[test]
    fn set_returns_previous_slot() {
        let mut index: SlotIndex<usize, u32> = SlotIndex::new(SlotIndexKind::Sparse);

        assert_eq!(None, index.set(42, 0));
        assert_eq!(Some(0), index.set(42, 5));
        assert_eq!(Some(5), index.get(42));
        assert_eq!(1, index.len());
    }

    #[test]
    fn remove_clears_the_slot() {
        let mut index: SlotIndex<usize, u32> = SlotIndex::new(SlotIndexKind::Dense);
        let _ = index.set(1, 0);
        let _ = index.set(2, 1);

        assert_eq!(Some(0), index.remove(1));
        assert_eq!(None, index.remove(1));
        assert_eq!(None, index.get(1));
        assert_eq!(Some(1), index.get(2));
        assert_eq!(1, index.len());
    }

    #[test]
    fn auto_index_switches_to_hashing_for_sparse_ids() {
        let mut index: SlotIndex<usize, u32> = SlotIndex::new(SlotIndexKind::Auto);
        let _ = index.set(0, 0);
        let _ = index.set(1, 1);
        assert!(index.is_dense());

        let _ = index.set(1_000_000, 2);

        assert!(!index.is_dense());
        assert_eq!(Some(0), index.get(0));
        assert_eq!(Some(1), index.get(1));
        assert_eq!(Some(2), index.get(1_000_000));
    }
}
