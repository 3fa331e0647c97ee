use thiserror::Error;

use crate::propagation::Priority;
use crate::propagation::PropagatorId;

/// Errors caused by misusing the [`PropagationEngine`].
///
/// Unlike a [`Contradiction`], these indicate a bug in how the solver is set up. Operations which
/// return this error leave the engine untouched.
///
/// [`PropagationEngine`]: crate::engine::PropagationEngine
/// [`Contradiction`]: crate::basic_types::Contradiction
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum UsageError {
    /// Delayed (coarse) propagation was requested for a propagator whose priority does not allow
    /// it; such propagators should act immediately.
    #[error("propagator {propagator} with priority {priority:?} cannot be scheduled for delayed propagation")]
    CoarseSchedulingForbidden {
        propagator: PropagatorId,
        priority: Priority,
    },
    /// A propagator was added with a priority which has no queue for fine events.
    #[error("priority {0:?} only has a coarse queue, propagators with this priority cannot be added")]
    CoarseOnlyPriority(Priority),
    /// A propagator still has events waiting to be delivered, removing or re-scoping it would
    /// silently lose them.
    #[error("propagator {0} still has pending events")]
    PropagatorScheduled(PropagatorId),
    /// The propagator is not known to the engine.
    #[error("propagator {0} is not registered in the engine")]
    UnknownPropagator(PropagatorId),
    /// The same propagator occurs more than once in a single request.
    #[error("propagator {0} occurs more than once in the request")]
    DuplicatePropagator(PropagatorId),
}
