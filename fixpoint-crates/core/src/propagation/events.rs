use std::fmt::Display;

use enumset::enum_set;
use enumset::EnumSet;
use enumset::EnumSetType;

/// A description of the kinds of events that can happen on a domain variable.
#[derive(Debug, EnumSetType, Hash)]
pub enum DomainEvent {
    /// Event where an (integer) variable domain collapses to a single value.
    Assign,
    /// Event where an (integer) variable domain tightens the lower bound.
    LowerBound,
    /// Event where an (integer) variable domain tightens the upper bound.
    UpperBound,
    /// Event where an (integer) variable domain removes an inner value within the domain.
    Removal,
}

impl Display for DomainEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DomainEvent::Assign => write!(f, "[Event:Assign]"),
            DomainEvent::LowerBound => write!(f, "[Event:LB]"),
            DomainEvent::UpperBound => write!(f, "[Event:UB]"),
            DomainEvent::Removal => write!(f, "[Event:Remove]"),
        }
    }
}

/// A set of [`DomainEvent`]s, used both to describe what happened to a variable and to describe
/// which changes a propagator is interested in.
#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq)]
pub struct DomainEvents {
    int_events: EnumSet<DomainEvent>,
}

impl DomainEvents {
    /// The empty set of events.
    pub const NONE: DomainEvents = DomainEvents::create_with_int_events(EnumSet::empty());
    /// DomainEvents with only assigning to a single value.
    pub const ASSIGN: DomainEvents =
        DomainEvents::create_with_int_events(enum_set!(DomainEvent::Assign));
    /// DomainEvents with only lower bound tightening.
    pub const LOWER_BOUND: DomainEvents =
        DomainEvents::create_with_int_events(enum_set!(DomainEvent::LowerBound));
    /// DomainEvents with only upper bound tightening.
    pub const UPPER_BOUND: DomainEvents =
        DomainEvents::create_with_int_events(enum_set!(DomainEvent::UpperBound));
    /// DomainEvents with both lower and upper bound tightening (but not other value removal).
    pub const BOUNDS: DomainEvents = DomainEvents::create_with_int_events(enum_set!(
        DomainEvent::LowerBound | DomainEvent::UpperBound
    ));
    /// DomainEvents with only inner value removal.
    pub const REMOVAL: DomainEvents =
        DomainEvents::create_with_int_events(enum_set!(DomainEvent::Removal));
    /// DomainEvents with lower and upper bound tightening, assigning to a single value, and
    /// single value removal.
    pub const ANY_INT: DomainEvents = DomainEvents::create_with_int_events(enum_set!(
        DomainEvent::Assign
            | DomainEvent::LowerBound
            | DomainEvent::UpperBound
            | DomainEvent::Removal
    ));

    pub const fn create_with_int_events(int_events: EnumSet<DomainEvent>) -> DomainEvents {
        DomainEvents { int_events }
    }

    pub fn get_int_events(&self) -> EnumSet<DomainEvent> {
        self.int_events
    }

    pub fn is_empty(&self) -> bool {
        self.int_events.is_empty()
    }

    pub fn contains(&self, event: DomainEvent) -> bool {
        self.int_events.contains(event)
    }

    /// Whether at least one event is present in both sets.
    pub fn intersects(&self, other: DomainEvents) -> bool {
        !self.int_events.is_disjoint(other.int_events)
    }

    #[must_use]
    pub fn union(self, other: DomainEvents) -> DomainEvents {
        DomainEvents::create_with_int_events(self.int_events | other.int_events)
    }

    #[must_use]
    pub fn intersection(self, other: DomainEvents) -> DomainEvents {
        DomainEvents::create_with_int_events(self.int_events & other.int_events)
    }

    /// Whether one of the bounds was tightened, which includes the variable becoming fixed.
    pub fn is_bound_change(&self) -> bool {
        self.int_events.contains(DomainEvent::LowerBound)
            || self.int_events.contains(DomainEvent::UpperBound)
            || self.int_events.contains(DomainEvent::Assign)
    }

    /// Adds the events which are implied by the events in the set: a variable which became fixed
    /// also had its bounds tightened, and tightening a bound removes values.
    #[must_use]
    pub fn strengthened(self) -> DomainEvents {
        let mut int_events = self.int_events;
        if int_events.contains(DomainEvent::Assign) {
            int_events |= DomainEvent::LowerBound | DomainEvent::UpperBound;
        }
        if int_events.contains(DomainEvent::LowerBound) || int_events.contains(DomainEvent::UpperBound)
        {
            int_events |= DomainEvent::Removal;
        }
        DomainEvents::create_with_int_events(int_events)
    }

    pub fn iter(&self) -> impl Iterator<Item = DomainEvent> {
        self.int_events.iter()
    }
}

impl From<DomainEvent> for DomainEvents {
    fn from(event: DomainEvent) -> Self {
        DomainEvents::create_with_int_events(EnumSet::only(event))
    }
}

impl From<EnumSet<DomainEvent>> for DomainEvents {
    fn from(int_events: EnumSet<DomainEvent>) -> Self {
        DomainEvents::create_with_int_events(int_events)
    }
}

impl std::ops::BitOr for DomainEvents {
    type Output = DomainEvents;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.union(rhs)
    }
}

impl std::ops::BitOrAssign for DomainEvents {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = self.union(rhs);
    }
}

impl Display for DomainEvents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for event in self.iter() {
            write!(f, "{event}")?;
        }
        Ok(())
    }
}

/// The event delivered to a propagator when it is reactivated as a whole, rather than for a
/// change to one specific argument.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum PropagatorEvent {
    /// A propagation whose meaning is defined by the propagator itself, e.g. finishing work that
    /// was accumulated while processing fine events.
    Custom,
    /// The propagator should filter all of its arguments.
    Full,
}

impl PropagatorEvent {
    /// Combines two pending reactivation requests, keeping the strongest one.
    #[must_use]
    pub fn merge(self, other: PropagatorEvent) -> PropagatorEvent {
        self.max(other)
    }
}

#[cfg(test)]
mod tests {
    use super::DomainEvent;
    use super::DomainEvents;
    use super::PropagatorEvent;

    #[test]
    fn union_of_bounds_is_bounds() {
        let events = DomainEvents::LOWER_BOUND | DomainEvents::UPPER_BOUND;

        assert_eq!(DomainEvents::BOUNDS, events);
        assert!(events.is_bound_change());
        assert!(!events.contains(DomainEvent::Removal));
    }

    #[test]
    fn removal_is_not_a_bound_change() {
        assert!(!DomainEvents::REMOVAL.is_bound_change());
        assert!(DomainEvents::ASSIGN.is_bound_change());
    }

    #[test]
    fn intersection_with_conditions() {
        let conditions = DomainEvents::BOUNDS;

        assert!(conditions.intersects(DomainEvent::LowerBound.into()));
        assert!(!conditions.intersects(DomainEvents::REMOVAL));
        assert!(conditions.intersection(DomainEvents::REMOVAL).is_empty());
        assert!(DomainEvents::NONE.is_empty());
    }

    #[test]
    fn assignment_implies_every_other_event() {
        assert_eq!(DomainEvents::ANY_INT, DomainEvents::ASSIGN.strengthened());
        assert_eq!(
            DomainEvents::LOWER_BOUND | DomainEvents::REMOVAL,
            DomainEvents::LOWER_BOUND.strengthened()
        );
        assert_eq!(
            DomainEvents::BOUNDS | DomainEvents::REMOVAL,
            DomainEvents::BOUNDS.strengthened()
        );
        assert_eq!(DomainEvents::REMOVAL, DomainEvents::REMOVAL.strengthened());
        assert!(DomainEvents::NONE.strengthened().is_empty());
    }

    #[test]
    fn full_propagation_dominates_custom() {
        assert_eq!(
            PropagatorEvent::Full,
            PropagatorEvent::Custom.merge(PropagatorEvent::Full)
        );
        assert_eq!(
            PropagatorEvent::Custom,
            PropagatorEvent::Custom.merge(PropagatorEvent::Custom)
        );
    }
}
