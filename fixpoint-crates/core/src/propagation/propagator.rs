use downcast_rs::impl_downcast;
use downcast_rs::Downcast;

use super::DomainEvents;
use super::LocalId;
use super::PropagationContext;
use super::PropagatorEvent;
use super::VariableId;
use crate::basic_types::PropagationStatus;
#[cfg(doc)]
use crate::create_statistics_struct;
#[cfg(doc)]
use crate::engine::PropagationEngine;
use crate::statistics::StatisticLogger;

// We need this to retrieve a concrete propagator from the `Box<dyn Propagator<Store>>` stored in
// the engine; rust inherently does not allow downcasting from the trait definition to its
// concrete type.
impl_downcast!(Propagator<Store>);

/// A propagator removes values from domains which will never be in any solution, or raises
/// explicit contradictions.
///
/// The engine treats a propagator as an opaque filter: it only decides *when* the propagator runs
/// and *which* changes it is told about. The domains themselves live in the `Store`, which is
/// handed to the propagator through the [`PropagationContext`].
///
/// The only required functions are [`Propagator::name`], [`Propagator::variables`] and
/// [`Propagator::propagate`]; all other functions have default implementations.
pub trait Propagator<Store>: Downcast {
    /// Return the name of the propagator.
    ///
    /// This is a convenience method that is used for printing.
    fn name(&self) -> &str;

    /// The arguments of the propagator. The position of a variable in this slice is its
    /// [`LocalId`].
    ///
    /// A variable may occur at several positions; the propagator is then told about a change
    /// once for every position.
    fn variables(&self) -> &[VariableId];

    /// The number of arguments of the propagator.
    fn argument_count(&self) -> usize {
        self.variables().len()
    }

    /// Returns the [`Priority`] of the propagator, used for determining the order in which
    /// propagators are called.
    ///
    /// The priority is read once, when the propagator is added to the engine.
    ///
    /// By default the priority is set to [`Priority::VerySlow`]. It is expected that propagator
    /// implementations would set this value to some appropriate value.
    fn priority(&self) -> Priority {
        Priority::VerySlow
    }

    /// Whether the propagator wants to be told about individual argument changes through
    /// [`Propagator::propagate_event`].
    ///
    /// Propagators which return `false` are reactivated as a whole through
    /// [`Propagator::propagate`] with [`PropagatorEvent::Full`] whenever one of their arguments
    /// changes. Read once, when the propagator is added to the engine.
    fn reacts_to_fine_events(&self) -> bool {
        false
    }

    /// The events on the argument at `local_id` which are relevant to this propagator. Events
    /// outside of this set never reach [`Propagator::advise`].
    fn propagation_conditions(&self, _local_id: LocalId) -> DomainEvents {
        DomainEvents::ANY_INT
    }

    /// Whether the propagator currently takes part in propagation. Inactive propagators (e.g.
    /// entailed ones) are not scheduled.
    fn is_active(&self) -> bool {
        true
    }

    /// Decides whether the `events` which happened to the argument at `local_id` should be
    /// delivered to this propagator.
    ///
    /// This should only be used for computationally cheap logic. Expensive computation should be
    /// performed in [`Propagator::propagate_event`] or [`Propagator::propagate`].
    fn advise(&mut self, _local_id: LocalId, _events: DomainEvents) -> EnqueueDecision {
        EnqueueDecision::Enqueue
    }

    /// Filters the domains of all arguments.
    ///
    /// Called once for every propagator before the first fixpoint computation (with
    /// [`PropagatorEvent::Full`]), for coarse reactivations, and for the delayed propagations the
    /// propagator requested through [`PropagationContext::schedule`].
    ///
    /// Every domain change must be reported through [`PropagationContext::notify`]. In case an
    /// inconsistency is detected, a [`Contradiction`] is returned.
    ///
    /// [`Contradiction`]: crate::basic_types::Contradiction
    fn propagate(
        &mut self,
        context: PropagationContext<'_, Store>,
        event: PropagatorEvent,
    ) -> PropagationStatus;

    /// Incremental filtering after `events` happened to the argument at `local_id`.
    ///
    /// Only called for propagators which react to fine events. The events for a single argument
    /// are merged until they are delivered, and the arguments are delivered in the order in which
    /// they were first changed.
    ///
    /// By default, this function calls [`Propagator::propagate`] with [`PropagatorEvent::Full`].
    fn propagate_event(
        &mut self,
        context: PropagationContext<'_, Store>,
        _local_id: LocalId,
        _events: DomainEvents,
    ) -> PropagationStatus {
        self.propagate(context, PropagatorEvent::Full)
    }

    /// Logs statistics of the propagator using the provided [`StatisticLogger`].
    ///
    /// It is recommended to create a struct through the [`create_statistics_struct!`] macro!
    fn log_statistics(&self, _statistic_logger: StatisticLogger) {}
}

/// Indicator of what to do when a propagator is advised of an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnqueueDecision {
    /// The propagator should be enqueued.
    Enqueue,
    /// The propagator should not be enqueued.
    Skip,
}

/// The priority of a propagator, an ordinal cost class used for determining the order in which
/// propagators will be called.
///
/// Cheaper propagators are propagated before more expensive ones. Propagators of the same
/// priority are propagated in the order in which they were scheduled, although queueing policies
/// may group several priorities into one queue (see [`PropagationEngine`]).
#[derive(Default, Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[repr(u8)]
pub enum Priority {
    Unary = 0,
    Binary = 1,
    Ternary = 2,
    Linear = 3,
    Quadratic = 4,
    Cubic = 5,
    #[default]
    VerySlow = 6,
}

impl Priority {
    /// The number of priority tiers.
    pub const NUM_PRIORITIES: usize = 7;

    /// All priorities, cheapest first.
    pub const ALL: [Priority; Priority::NUM_PRIORITIES] = [
        Priority::Unary,
        Priority::Binary,
        Priority::Ternary,
        Priority::Linear,
        Priority::Quadratic,
        Priority::Cubic,
        Priority::VerySlow,
    ];

    pub fn index(self) -> usize {
        self as usize
    }
}
