//! The identifiers which connect propagators to the engine and to their variables.
//!
//! All identifiers are plain `u32` indices; [`StorageKey`] lets them index a
//! [`KeyedVec`](crate::containers::KeyedVec) directly.
use std::fmt::Display;

use crate::containers::StorageKey;

macro_rules! index_key {
    ($name:ident) => {
        impl StorageKey for $name {
            fn index(&self) -> usize {
                self.0 as usize
            }

            fn create_from_index(index: usize) -> Self {
                $name(index as u32)
            }
        }
    };
}

/// Handed out by the engine when a propagator is added. The id of a removed propagator is never
/// handed out again.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct PropagatorId(pub(crate) u32);

index_key!(PropagatorId);

impl Display for PropagatorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "p{}", self.0)
    }
}

/// A decision variable, numbered by the owner of the domains. The numbering may contain gaps.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct VariableId(u32);

index_key!(VariableId);

impl VariableId {
    pub const fn new(id: u32) -> Self {
        VariableId(id)
    }

    pub fn id(self) -> u32 {
        self.0
    }
}

impl Display for VariableId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "x{}", self.0)
    }
}

/// The position of a variable in the argument list of one propagator, see
/// [`Propagator::variables`](super::Propagator::variables).
///
/// Pending events are kept per argument position, so a variable which occurs twice in the same
/// argument list has two local ids.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct LocalId(u32);

index_key!(LocalId);

impl LocalId {
    pub const fn from(position: u32) -> Self {
        LocalId(position)
    }

    pub fn unpack(self) -> u32 {
        self.0
    }
}

impl Display for LocalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An entry in the watch list of a variable: the propagator and the argument position at which
/// it reads the variable.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub struct PropagatorVarId {
    pub propagator: PropagatorId,
    pub variable: LocalId,
}

impl Display for PropagatorVarId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.propagator, self.variable)
    }
}

#[cfg(test)]
mod tests {
    use super::LocalId;
    use super::PropagatorId;
    use super::PropagatorVarId;
    use super::VariableId;
    use crate::containers::StorageKey;

    #[test]
    fn ids_index_by_their_number() {
        assert_eq!(7, VariableId::new(7).index());
        assert_eq!(LocalId::from(3), LocalId::create_from_index(3));
        assert_eq!(PropagatorId(2), PropagatorId::create_from_index(2));
    }

    #[test]
    fn watch_entries_display_propagator_and_position() {
        let handle = PropagatorVarId {
            propagator: PropagatorId(4),
            variable: LocalId::from(1),
        };

        assert_eq!("p4#1", handle.to_string());
        assert_eq!("x9", VariableId::new(9).to_string());
    }
}
