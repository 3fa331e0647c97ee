use std::fmt::Display;

use log::warn;

use super::IdempotencyStrategy;
use crate::propagation::DomainEvents;
use crate::propagation::PropagatorId;
use crate::propagation::VariableId;
#[cfg(any(test, feature = "debug-checks"))]
use crate::basic_types::Contradiction;
#[cfg(any(test, feature = "debug-checks"))]
use crate::basic_types::UsageError;
#[cfg(any(test, feature = "debug-checks"))]
use crate::fixpoint_assert_simple;
#[cfg(any(test, feature = "debug-checks"))]
use crate::propagation::EventSink;
#[cfg(any(test, feature = "debug-checks"))]
use crate::propagation::PropagationContext;
#[cfg(any(test, feature = "debug-checks"))]
use crate::propagation::Propagator;
#[cfg(any(test, feature = "debug-checks"))]
use crate::propagation::PropagatorEvent;

/// A propagator which changed domains when its full filter was applied right after it had been
/// propagated, i.e. it did not reach its fixpoint in a single call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdempotencyViolation {
    pub propagator: PropagatorId,
    pub name: String,
    /// The changes made by the second call.
    pub events: Vec<(VariableId, DomainEvents)>,
}

impl Display for IdempotencyViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}) is not idempotent, it changed", self.name, self.propagator)?;
        for (variable, events) in &self.events {
            write!(f, " {variable}{events}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub(crate) struct IdempotencyChecker {
    #[cfg(any(test, feature = "debug-checks"))]
    strategy: IdempotencyStrategy,
    violations: Vec<IdempotencyViolation>,
}

impl IdempotencyChecker {
    pub(crate) fn new(strategy: IdempotencyStrategy) -> Self {
        if strategy.is_enabled() && !cfg!(any(test, feature = "debug-checks")) {
            warn!(
                "Idempotency strategy {strategy:?} is ignored, the `debug-checks` feature is not enabled"
            );
        }

        IdempotencyChecker {
            #[cfg(any(test, feature = "debug-checks"))]
            strategy,
            violations: Vec::new(),
        }
    }

    #[cfg(any(test, feature = "debug-checks"))]
    pub(crate) fn is_enabled(&self) -> bool {
        self.strategy.is_enabled()
    }

    pub(crate) fn violations(&self) -> &[IdempotencyViolation] {
        &self.violations
    }

    pub(crate) fn take_violations(&mut self) -> Vec<IdempotencyViolation> {
        std::mem::take(&mut self.violations)
    }

    /// Applies the full filter of `propagator` once more.
    ///
    /// The changes it makes are left in the `sink`; if there are any, a violation is reported and
    /// returned.
    #[cfg(any(test, feature = "debug-checks"))]
    pub(crate) fn check<Store: 'static>(
        &mut self,
        propagator: &mut dyn Propagator<Store>,
        propagator_id: PropagatorId,
        delayed_propagation_error: Option<UsageError>,
        store: &mut Store,
        sink: &mut EventSink,
    ) -> Result<Option<IdempotencyViolation>, Contradiction> {
        fixpoint_assert_simple!(sink.is_empty());

        let context = PropagationContext::new(store, sink, propagator_id, delayed_propagation_error);
        propagator.propagate(context, PropagatorEvent::Full)?;

        if sink.is_empty() {
            return Ok(None);
        }

        let violation = IdempotencyViolation {
            propagator: propagator_id,
            name: propagator.name().to_owned(),
            events: sink.events().to_vec(),
        };
        warn!("{violation}");

        if self.strategy == IdempotencyStrategy::Collect {
            self.violations.push(violation.clone());
        }

        Ok(Some(violation))
    }
}
