use std::fmt::Debug;

use super::DomainEvents;
use super::PropagatorEvent;
use super::PropagatorId;
use super::VariableId;
use crate::basic_types::Contradiction;
use crate::basic_types::UsageError;
#[cfg(doc)]
use crate::propagation::Propagator;

/// Collects the domain changes a propagator reports while it is running, together with its
/// request for delayed propagation.
///
/// The engine dispatches the collected events as soon as the propagator returns.
#[derive(Debug, Default)]
pub(crate) struct EventSink {
    events: Vec<(VariableId, DomainEvents)>,
    delayed: Option<PropagatorEvent>,
}

impl EventSink {
    pub(crate) fn push(&mut self, variable: VariableId, events: DomainEvents) {
        if !events.is_empty() {
            self.events.push((variable, events));
        }
    }

    #[cfg(any(test, feature = "debug-checks"))]
    pub(crate) fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    #[cfg(any(test, feature = "debug-checks"))]
    pub(crate) fn events(&self) -> &[(VariableId, DomainEvents)] {
        &self.events
    }

    pub(crate) fn drain(&mut self) -> impl Iterator<Item = (VariableId, DomainEvents)> + '_ {
        self.events.drain(..)
    }

    pub(crate) fn request_delayed(&mut self, event: PropagatorEvent) {
        self.delayed = Some(match self.delayed {
            Some(pending) => pending.merge(event),
            None => event,
        });
    }

    pub(crate) fn take_delayed(&mut self) -> Option<PropagatorEvent> {
        self.delayed.take()
    }

    pub(crate) fn clear(&mut self) {
        self.events.clear();
        self.delayed = None;
    }
}

/// Provided to a propagator when it is invoked.
///
/// It gives access to the domains in the `Store`, and it is the only way for a propagator to
/// interact with the scheduling of the engine: changes are reported through [`Self::notify`] and
/// delayed propagation is requested through [`Self::schedule`].
pub struct PropagationContext<'a, Store> {
    store: &'a mut Store,
    sink: &'a mut EventSink,
    propagator_id: PropagatorId,
    delayed_propagation_error: Option<UsageError>,
}

impl<'a, Store> PropagationContext<'a, Store> {
    /// `delayed_propagation_error` is the error returned by [`Self::schedule`]; [`None`] if the
    /// propagator is allowed to delay its propagation.
    pub(crate) fn new(
        store: &'a mut Store,
        sink: &'a mut EventSink,
        propagator_id: PropagatorId,
        delayed_propagation_error: Option<UsageError>,
    ) -> Self {
        PropagationContext {
            store,
            sink,
            propagator_id,
            delayed_propagation_error,
        }
    }

    /// The id of the propagator which is being propagated.
    pub fn propagator_id(&self) -> PropagatorId {
        self.propagator_id
    }

    pub fn store(&self) -> &Store {
        self.store
    }

    pub fn store_mut(&mut self) -> &mut Store {
        self.store
    }

    /// Report that `events` happened to `variable`.
    ///
    /// All propagators watching `variable`, except the one that is running, will be advised of the
    /// change once the running propagator returns.
    pub fn notify(&mut self, variable: VariableId, events: impl Into<DomainEvents>) {
        self.sink.push(variable, events.into());
    }

    /// Request a delayed call to [`Propagator::propagate`] with `event`, once the pending fine
    /// events have been processed.
    ///
    /// Several requests made before the delayed propagation happens are merged into one. Cheap
    /// propagators (see [`UsageError::CoarseSchedulingForbidden`]) cannot delay their
    /// propagation and should act immediately instead.
    pub fn schedule(&mut self, event: PropagatorEvent) -> Result<(), UsageError> {
        if let Some(error) = self.delayed_propagation_error {
            return Err(error);
        }

        self.sink.request_delayed(event);
        Ok(())
    }

    /// Create a [`Contradiction`] raised by the running propagator.
    pub fn contradiction(
        &self,
        variable: Option<VariableId>,
        message: impl Into<String>,
    ) -> Contradiction {
        Contradiction::new(Some(self.propagator_id), variable, message)
    }

    pub fn reborrow(&mut self) -> PropagationContext<'_, Store> {
        PropagationContext {
            store: self.store,
            sink: self.sink,
            propagator_id: self.propagator_id,
            delayed_propagation_error: self.delayed_propagation_error,
        }
    }
}

impl<Store> Debug for PropagationContext<'_, Store> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropagationContext")
            .field("propagator_id", &self.propagator_id)
            .field("sink", &self.sink)
            .finish_non_exhaustive()
    }
}
