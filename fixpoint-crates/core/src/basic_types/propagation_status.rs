use thiserror::Error;

use crate::propagation::PropagatorId;
use crate::propagation::VariableId;

/// The result of invoking a propagator. The propagation can either succeed or detect a
/// [`Contradiction`].
pub type PropagationStatus = Result<(), Contradiction>;

/// A domain inconsistency detected during propagation, e.g. the bounds of a variable crossed.
///
/// A contradiction is the normal way for a propagator to report that the current search branch
/// is infeasible. It aborts the ongoing [`PropagationEngine::run`] immediately; the engine must be
/// flushed before it is used again.
///
/// [`PropagationEngine::run`]: crate::engine::PropagationEngine::run
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("contradiction: {message} (propagator: {propagator:?}, variable: {variable:?})")]
pub struct Contradiction {
    /// The propagator which detected the contradiction, [`None`] if it was raised outside of
    /// propagation.
    pub propagator: Option<PropagatorId>,
    /// The variable whose domain became inconsistent, if known.
    pub variable: Option<VariableId>,
    /// A human-readable description.
    pub message: String,
}

impl Contradiction {
    pub fn new(
        propagator: Option<PropagatorId>,
        variable: Option<VariableId>,
        message: impl Into<String>,
    ) -> Self {
        Contradiction {
            propagator,
            variable,
            message: message.into(),
        }
    }
}
