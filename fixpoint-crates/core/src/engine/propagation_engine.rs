use log::debug;
use log::trace;

use super::engine_statistics::EngineStatistics;
use super::idempotency::IdempotencyChecker;
use super::pending_events::PendingEventStore;
use super::propagation_trigger::PropagationTrigger;
use super::propagator_store::PropagatorInfo;
use super::propagator_store::PropagatorSlot;
use super::propagator_store::PropagatorStore;
use super::queues::QueueEntry;
use super::queues::QueueKind;
use super::queues::QueueingPolicy;
use super::queues::TwoBucketPolicy;
use super::variable_registry::VariableRegistry;
use super::variable_registry::Watcher;
use super::EngineOptions;
use super::IdempotencyViolation;
use crate::basic_types::Contradiction;
use crate::basic_types::PropagationStatus;
use crate::basic_types::UsageError;
use crate::containers::HashSet;
use crate::containers::KeyGenerator;
use crate::fixpoint_assert_advanced;
use crate::fixpoint_assert_moderate;
use crate::fixpoint_assert_simple;
use crate::propagation::DomainEvents;
use crate::propagation::EnqueueDecision;
use crate::propagation::EventSink;
use crate::propagation::LocalId;
use crate::propagation::PropagationContext;
use crate::propagation::Propagator;
use crate::propagation::PropagatorEvent;
use crate::propagation::PropagatorId;
use crate::propagation::PropagatorVarId;
use crate::propagation::VariableId;
use crate::statistics::log_statistic_postfix;
use crate::statistics::should_log_statistics;
use crate::statistics::Statistic;
use crate::statistics::StatisticLogger;

/// Computes the fixpoint of a set of propagators over the domains in a `Store`.
///
/// Changes to domains are reported through [`PropagationEngine::notify`], either by the owner of
/// the domains or (through the [`PropagationContext`]) by the propagators themselves. The engine
/// records which propagators are affected by a change, and [`PropagationEngine::run`] invokes
/// them until no change is left to process.
///
/// The order in which scheduled propagators are served is determined by the `Policy`, see
/// [`TwoBucketPolicy`] and [`SevenQueuePolicy`](super::SevenQueuePolicy).
///
/// When a propagator raises a [`Contradiction`], propagation stops immediately. The owner of the
/// domains is expected to restore them and then to call [`PropagationEngine::flush`] before
/// the engine is used again.
pub struct PropagationEngine<Store, Policy = TwoBucketPolicy> {
    options: EngineOptions,
    propagators: PropagatorStore<Store>,
    pending: PendingEventStore,
    variables: VariableRegistry,
    queue: Policy,
    trigger: PropagationTrigger,
    id_generator: KeyGenerator<PropagatorId>,
    /// Collects the changes reported by the propagator which is being invoked.
    sink: EventSink,
    /// The propagator which was invoked last; it may hold undelivered events after a
    /// contradiction.
    last_propagator: Option<PropagatorId>,
    is_initialized: bool,
    requires_flush: bool,
    idempotency: IdempotencyChecker,
    statistics: EngineStatistics,
}

/// How a propagator is invoked.
#[derive(Clone, Copy, Debug)]
#[allow(
    variant_size_differences,
    reason = "only lives for the duration of a single call"
)]
enum Invocation {
    Propagator(PropagatorEvent),
    Argument(LocalId, DomainEvents),
}

impl<Store: 'static, Policy: QueueingPolicy> Default for PropagationEngine<Store, Policy> {
    fn default() -> Self {
        PropagationEngine::new(EngineOptions::default())
    }
}

impl<Store: 'static, Policy: QueueingPolicy> PropagationEngine<Store, Policy> {
    pub fn new(options: EngineOptions) -> Self {
        PropagationEngine {
            propagators: PropagatorStore::new(options.slot_index),
            pending: PendingEventStore::default(),
            variables: VariableRegistry::new(options.slot_index),
            queue: Policy::new(&options),
            trigger: PropagationTrigger::default(),
            id_generator: KeyGenerator::default(),
            sink: EventSink::default(),
            last_propagator: None,
            is_initialized: false,
            requires_flush: false,
            idempotency: IdempotencyChecker::new(options.idempotency),
            statistics: EngineStatistics::default(),
            options,
        }
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Adds a single propagator, see [`PropagationEngine::add_propagators`].
    pub fn add_propagator(
        &mut self,
        propagator: impl Propagator<Store>,
    ) -> Result<PropagatorId, UsageError> {
        let ids = self.add_propagators(vec![Box::new(propagator)])?;
        Ok(ids[0])
    }

    /// Attaches the propagators to the variables they read, and returns the identifiers they
    /// were assigned, in the same order.
    ///
    /// If the engine is already initialized, the new propagators are propagated at the start of
    /// the next [`PropagationEngine::run`].
    ///
    /// Fails without adding anything if one of the propagators has a priority without a fine
    /// queue.
    pub fn add_propagators(
        &mut self,
        propagators: Vec<Box<dyn Propagator<Store>>>,
    ) -> Result<Vec<PropagatorId>, UsageError> {
        if let Some(propagator) = propagators
            .iter()
            .find(|propagator| self.queue.fine_bucket(propagator.priority()).is_none())
        {
            return Err(UsageError::CoarseOnlyPriority(propagator.priority()));
        }

        let mut ids = Vec::with_capacity(propagators.len());
        for propagator in propagators {
            let id = self.id_generator.next_key();
            let info = PropagatorInfo {
                id,
                priority: propagator.priority(),
                reacts_to_fine_events: propagator.reacts_to_fine_events(),
            };

            watch_arguments(&mut self.variables, id, propagator.as_ref());
            let _ = self.pending.push(propagator.argument_count());
            debug!(
                "Adding propagator {} as {id} with priority {:?}",
                propagator.name(),
                info.priority
            );
            let _ = self.propagators.push(info, propagator);

            if self.is_initialized {
                let _ = self.trigger.add(id);
            }
            ids.push(id);
        }

        Ok(ids)
    }

    /// Detaches the propagators from the engine.
    ///
    /// Fails without removing anything if one of the propagators is unknown, occurs twice, or
    /// still has undelivered events.
    pub fn remove_propagators(&mut self, ids: &[PropagatorId]) -> Result<(), UsageError> {
        let mut seen: HashSet<PropagatorId> = HashSet::default();
        for &id in ids {
            if !seen.insert(id) {
                return Err(UsageError::DuplicatePropagator(id));
            }
            let slot = self.slot(id)?;
            if self.pending[slot].is_pending() {
                return Err(UsageError::PropagatorScheduled(id));
            }
        }

        for &id in ids {
            let slot = self.slot(id)?;
            let (propagator, scope) = self.propagators.swap_remove(slot);
            let _ = self.pending.swap_remove(slot);
            self.variables.unwatch(id, &scope);
            self.trigger.remove(id);
            if self.last_propagator == Some(id) {
                self.last_propagator = None;
            }
            debug!("Removed propagator {} ({id})", propagator.name());
        }

        Ok(())
    }

    /// Re-reads the arguments of a propagator after they changed, and propagates it at the start
    /// of the next [`PropagationEngine::run`].
    ///
    /// Fails if the propagator still has undelivered events.
    pub fn update_scope(&mut self, id: PropagatorId) -> Result<(), UsageError> {
        let slot = self.slot(id)?;
        if self.pending[slot].is_pending() {
            return Err(UsageError::PropagatorScheduled(id));
        }

        let previous_scope = self.propagators.refresh_scope(slot);
        self.variables.unwatch(id, &previous_scope);
        watch_arguments(&mut self.variables, id, &self.propagators[slot]);
        self.pending
            .reset(slot, self.propagators[slot].argument_count());
        let _ = self.trigger.add(id);

        debug!(
            "Updated the scope of {id} from {} to {} variables",
            previous_scope.len(),
            self.propagators.scope(slot).len()
        );
        Ok(())
    }

    /// Propagates the full filter of the propagator at the start of the next
    /// [`PropagationEngine::run`].
    pub fn propagate_on_backtrack(&mut self, id: PropagatorId) -> Result<(), UsageError> {
        let _ = self.slot(id)?;
        let _ = self.trigger.add(id);
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.is_initialized
    }

    /// Propagates the full filter of every propagator once, in the order in which they were
    /// added (or ordered by priority and arity, see [`EngineOptions::sort_initial_propagation`]).
    ///
    /// Does nothing if the engine is already initialized. The changes made by the propagators are
    /// processed by the next [`PropagationEngine::run`].
    pub fn initialize(&mut self, store: &mut Store) -> PropagationStatus {
        if self.is_initialized {
            return Ok(());
        }
        fixpoint_assert_simple!(
            !self.requires_flush,
            "The engine has to be flushed after a contradiction"
        );

        let mut ids: Vec<PropagatorId> = self.propagators.ids().collect();
        ids.sort();
        if self.options.sort_initial_propagation {
            ids.sort_by_key(|&id| {
                let slot = self.propagators.slot(id);
                slot.map(|slot| {
                    (
                        self.propagators.info(slot).priority,
                        self.propagators[slot].argument_count(),
                    )
                })
            });
        }

        debug!("Initializing the engine with {} propagators", ids.len());
        for id in ids {
            let _ = self.trigger.add(id);
        }
        self.is_initialized = true;

        self.propagate_trigger(store)
    }

    /// Reports that `events` happened to `variable`.
    ///
    /// Every active propagator attached to `variable`, except for the `cause`, which is
    /// interested in the events and accepts them through [`Propagator::advise`], is scheduled.
    pub fn notify(
        &mut self,
        variable: VariableId,
        events: impl Into<DomainEvents>,
        cause: Option<PropagatorId>,
    ) {
        self.enqueue_watchers(variable, events.into(), cause);
    }

    /// Requests a delayed propagation of the given propagator, which happens after the pending
    /// fine events have been processed.
    ///
    /// Fails if the priority of the propagator does not allow delayed propagation.
    pub fn schedule(&mut self, id: PropagatorId, event: PropagatorEvent) -> Result<(), UsageError> {
        let slot = self.slot(id)?;
        let info = self.propagators.info(slot);
        if let Some(error) = self.delayed_propagation_error(info) {
            return Err(error);
        }

        self.enqueue_coarse(slot, event);
        Ok(())
    }

    /// Propagates until no scheduled propagator is left.
    ///
    /// Initializes the engine first if needed, and propagates the propagators which were added or
    /// requested through [`PropagationEngine::propagate_on_backtrack`] before serving the queues.
    ///
    /// Returns the first [`Contradiction`] raised by a propagator; everything which was not
    /// delivered yet stays pending until [`PropagationEngine::flush`] is called.
    pub fn run(&mut self, store: &mut Store) -> PropagationStatus {
        fixpoint_assert_simple!(
            !self.requires_flush,
            "The engine has to be flushed after a contradiction"
        );

        self.initialize(store)?;
        if self.trigger.needs_to_run() {
            debug!("Propagating {} triggered propagators", self.trigger.len());
            self.propagate_trigger(store)?;
        }

        while let Some(entry) = self.queue.pop() {
            let Some(slot) = self.propagators.slot(entry.propagator) else {
                fixpoint_assert_simple!(false, "{} was queued but not found", entry.propagator);
                continue;
            };

            match entry.kind {
                QueueKind::Fine => self.propagate_fine(store, slot)?,
                QueueKind::Coarse => self.propagate_coarse(store, slot)?,
            }

            #[cfg(any(test, feature = "debug-checks"))]
            {
                self.check_idempotency(store, slot)?;
            }
        }

        fixpoint_assert_advanced!(!self.pending.is_any_pending());
        Ok(())
    }

    /// Discards all pending events without invoking any propagator.
    ///
    /// Has to be called after a contradiction, and whenever the domains were restored to an
    /// earlier state.
    pub fn flush(&mut self) {
        let mut discarded = self.requires_flush;

        if let Some(slot) = self
            .last_propagator
            .take()
            .and_then(|id| self.propagators.slot(id))
        {
            discarded |= self.pending[slot].is_pending();
            self.pending[slot].clear();
        }

        for entry in self.queue.drain() {
            discarded = true;
            let Some(slot) = self.propagators.slot(entry.propagator) else {
                continue;
            };
            match entry.kind {
                QueueKind::Fine => self.pending[slot].clear_fine(),
                QueueKind::Coarse => self.pending[slot].clear_coarse(),
            }
        }

        self.sink.clear();
        self.requires_flush = false;

        if discarded {
            self.statistics.num_flushes += 1;
            debug!("Flushed the pending events");
        }
        fixpoint_assert_advanced!(!self.pending.is_any_pending());
    }

    /// Flushes the engine and forgets that it was initialized; the next
    /// [`PropagationEngine::run`] propagates every propagator again.
    pub fn reset(&mut self) {
        self.flush();
        self.trigger.clear();
        self.is_initialized = false;
        debug!("Reset the engine");
    }

    /// Whether the propagator is waiting in one of the queues.
    pub fn is_scheduled(&self, id: PropagatorId) -> bool {
        self.propagators
            .slot(id)
            .is_some_and(|slot| self.pending[slot].scheduled_fine || self.pending[slot].scheduled_coarse)
    }

    /// The undelivered events of the propagator per argument, in the order in which they will be
    /// delivered.
    pub fn pending_events(&self, id: PropagatorId) -> Vec<(LocalId, DomainEvents)> {
        self.propagators
            .slot(id)
            .map(|slot| self.pending[slot].pending_arguments().collect())
            .unwrap_or_default()
    }

    /// The delayed propagation requested by the propagator, if it has not happened yet.
    pub fn pending_propagator_event(&self, id: PropagatorId) -> Option<PropagatorEvent> {
        self.propagators
            .slot(id)
            .and_then(|slot| self.pending[slot].coarse_event())
    }

    /// The number of propagators which will be propagated before the queues are served by the
    /// next [`PropagationEngine::run`].
    pub fn num_triggered(&self) -> usize {
        self.trigger.len()
    }

    pub fn num_propagators(&self) -> usize {
        self.propagators.num_propagators()
    }

    /// The identifiers of all propagators, in the order in which they were added.
    pub fn propagator_ids(&self) -> Vec<PropagatorId> {
        let mut ids: Vec<_> = self.propagators.ids().collect();
        ids.sort();
        ids
    }

    pub fn contains(&self, id: PropagatorId) -> bool {
        self.propagators.contains(id)
    }

    /// The propagators reading `variable`, in the order in which they were attached. A
    /// propagator reading the variable at several positions occurs several times.
    pub fn attached_propagators(
        &self,
        variable: VariableId,
    ) -> impl Iterator<Item = PropagatorId> + '_ {
        self.variables
            .watchers(variable)
            .iter()
            .map(|watcher| watcher.handle.propagator)
    }

    /// The position of `variable` in the arguments of `propagator`.
    pub fn argument_index_in(
        &self,
        variable: VariableId,
        propagator: PropagatorId,
    ) -> Option<LocalId> {
        self.variables.argument_index_in(variable, propagator)
    }

    /// The number of distinct variables read by at least one propagator since the engine was
    /// created.
    pub fn num_variables(&self) -> usize {
        self.variables.num_variables()
    }

    /// Get a reference to the propagator with the given id, if it is of type `P`.
    pub fn get_propagator<P: Propagator<Store>>(&self, id: PropagatorId) -> Option<&P> {
        let slot = self.propagators.slot(id)?;
        self.propagators[slot].downcast_ref()
    }

    /// Get an exclusive reference to the propagator with the given id, if it is of type `P`.
    pub fn get_propagator_mut<P: Propagator<Store>>(&mut self, id: PropagatorId) -> Option<&mut P> {
        let slot = self.propagators.slot(id)?;
        self.propagators[slot].downcast_mut()
    }

    pub fn statistics(&self) -> &EngineStatistics {
        &self.statistics
    }

    /// The idempotency violations found so far with [`IdempotencyStrategy::Collect`].
    ///
    /// [`IdempotencyStrategy::Collect`]: super::IdempotencyStrategy::Collect
    pub fn idempotency_violations(&self) -> &[IdempotencyViolation] {
        self.idempotency.violations()
    }

    pub fn take_idempotency_violations(&mut self) -> Vec<IdempotencyViolation> {
        self.idempotency.take_violations()
    }

    /// Logs the statistics of the engine; if `verbose`, also logs the statistics of every
    /// propagator.
    pub fn log_statistics(&self, verbose: bool) {
        if !should_log_statistics() {
            return;
        }

        self.statistics.log(StatisticLogger::new(["engine"]));
        if verbose {
            for (propagator, id) in self.propagators.iter().zip(self.propagators.ids()) {
                propagator.log_statistics(StatisticLogger::new([
                    propagator.name().to_owned(),
                    id.0.to_string(),
                ]));
            }
        }
        log_statistic_postfix();
    }

    fn slot(&self, id: PropagatorId) -> Result<PropagatorSlot, UsageError> {
        self.propagators
            .slot(id)
            .ok_or(UsageError::UnknownPropagator(id))
    }

    fn delayed_propagation_error(&self, info: PropagatorInfo) -> Option<UsageError> {
        self.queue.coarse_bucket(info.priority).is_none().then_some(
            UsageError::CoarseSchedulingForbidden {
                propagator: info.id,
                priority: info.priority,
            },
        )
    }

    fn enqueue_watchers(
        &mut self,
        variable: VariableId,
        events: DomainEvents,
        cause: Option<PropagatorId>,
    ) {
        if events.is_empty() {
            return;
        }
        self.statistics.num_notifications += 1;
        trace!("{variable} changed: {events} (cause: {cause:?})");
        let events = events.strengthened();

        let PropagationEngine {
            propagators,
            pending,
            variables,
            queue,
            statistics,
            ..
        } = self;

        for watcher in variables.watchers(variable) {
            let id = watcher.handle.propagator;
            if cause == Some(id) {
                continue;
            }

            let relevant = watcher.conditions.intersection(events);
            if relevant.is_empty() {
                continue;
            }

            let Some(slot) = propagators.slot(id) else {
                fixpoint_assert_simple!(false, "{id} is attached to {variable} but not found");
                continue;
            };
            let info = propagators.info(slot);

            let propagator = &mut propagators[slot];
            if !propagator.is_active()
                || propagator.advise(watcher.handle.variable, relevant) == EnqueueDecision::Skip
            {
                continue;
            }

            pending[slot].record(watcher.handle.variable, relevant);
            if !pending[slot].scheduled_fine {
                pending[slot].scheduled_fine = true;
                queue.enqueue(QueueEntry::fine(id), info.priority);
                statistics.num_schedules += 1;
                trace!("Scheduled {} ({id})", propagator.name());
            }
        }
    }

    fn enqueue_coarse(&mut self, slot: PropagatorSlot, event: PropagatorEvent) {
        let info = self.propagators.info(slot);
        if self.pending[slot].request_coarse(event) {
            self.queue.enqueue(QueueEntry::coarse(info.id), info.priority);
            self.statistics.num_schedules += 1;
            trace!("Scheduled {} for {event:?} propagation", info.id);
        }
    }

    fn propagate_trigger(&mut self, store: &mut Store) -> PropagationStatus {
        while let Some(id) = self.trigger.pop() {
            let Some(slot) = self.propagators.slot(id) else {
                continue;
            };

            self.statistics.num_initial_propagations += 1;
            self.invoke(store, slot, Invocation::Propagator(PropagatorEvent::Full))?;
        }

        Ok(())
    }

    fn propagate_fine(&mut self, store: &mut Store, slot: PropagatorSlot) -> PropagationStatus {
        let info = self.propagators.info(slot);
        fixpoint_assert_moderate!(self.pending[slot].scheduled_fine);
        self.pending[slot].scheduled_fine = false;

        if info.reacts_to_fine_events {
            while let Some((local_id, events)) = self.pending[slot].take_next() {
                self.statistics.num_fine_calls += 1;
                if let Err(contradiction) =
                    self.invoke(store, slot, Invocation::Argument(local_id, events))
                {
                    // The undelivered arguments stay pending until the engine is flushed.
                    self.pending[slot].scheduled_fine = self.pending[slot].has_fine_events();
                    return Err(contradiction);
                }
            }
        } else {
            self.pending[slot].clear_fine();
            if self.propagators[slot].is_active() {
                self.invoke(store, slot, Invocation::Propagator(PropagatorEvent::Full))?;
            }
        }

        Ok(())
    }

    fn propagate_coarse(&mut self, store: &mut Store, slot: PropagatorSlot) -> PropagationStatus {
        let Some(event) = self.pending[slot].take_coarse() else {
            fixpoint_assert_simple!(false, "coarse entry without a requested propagation");
            return Ok(());
        };

        self.statistics.num_coarse_calls += 1;
        self.invoke(store, slot, Invocation::Propagator(event))
    }

    /// Invokes the propagator in `slot` and processes the changes it reported.
    fn invoke(
        &mut self,
        store: &mut Store,
        slot: PropagatorSlot,
        invocation: Invocation,
    ) -> PropagationStatus {
        let info = self.propagators.info(slot);
        let delayed_propagation_error = self.delayed_propagation_error(info);
        self.last_propagator = Some(info.id);
        self.statistics.num_propagator_calls += 1;

        let propagator = &mut self.propagators[slot];
        trace!("Propagating {} ({}) with {invocation:?}", propagator.name(), info.id);

        let context =
            PropagationContext::new(store, &mut self.sink, info.id, delayed_propagation_error);
        let result = match invocation {
            Invocation::Propagator(event) => propagator.propagate(context, event),
            Invocation::Argument(local_id, events) => {
                propagator.propagate_event(context, local_id, events)
            }
        };

        match result {
            Ok(()) => {
                self.dispatch_events(slot);
                Ok(())
            }
            Err(contradiction) => Err(self.fail(contradiction)),
        }
    }

    /// Notifies the changes collected from the propagator in `slot`, and handles its request for
    /// delayed propagation.
    fn dispatch_events(&mut self, slot: PropagatorSlot) {
        let cause = self.propagators.info(slot).id;

        let mut sink = std::mem::take(&mut self.sink);
        for (variable, events) in sink.drain() {
            self.enqueue_watchers(variable, events, Some(cause));
        }
        let delayed = sink.take_delayed();
        self.sink = sink;

        if let Some(event) = delayed {
            self.enqueue_coarse(slot, event);
        }
    }

    fn fail(&mut self, contradiction: Contradiction) -> Contradiction {
        self.sink.clear();
        self.requires_flush = true;
        self.statistics.num_contradictions += 1;
        debug!("{contradiction}");
        contradiction
    }

    #[cfg(any(test, feature = "debug-checks"))]
    fn check_idempotency(&mut self, store: &mut Store, slot: PropagatorSlot) -> PropagationStatus {
        if !self.idempotency.is_enabled()
            || self.pending[slot].scheduled_coarse
            || !self.propagators[slot].is_active()
        {
            return Ok(());
        }

        let info = self.propagators.info(slot);
        let delayed_propagation_error = self.delayed_propagation_error(info);
        let result = self.idempotency.check(
            &mut self.propagators[slot],
            info.id,
            delayed_propagation_error,
            store,
            &mut self.sink,
        );

        match result {
            Ok(violation) => {
                if violation.is_some() {
                    self.statistics.num_idempotency_violations += 1;
                }
                self.dispatch_events(slot);
                Ok(())
            }
            Err(contradiction) => Err(self.fail(contradiction)),
        }
    }
}

/// Attaches the propagator with the given id to each of its arguments.
fn watch_arguments<Store: 'static>(
    variables: &mut VariableRegistry,
    id: PropagatorId,
    propagator: &dyn Propagator<Store>,
) {
    for (index, &variable) in propagator.variables().iter().enumerate() {
        let local_id = LocalId::from(index as u32);
        variables.watch(
            variable,
            Watcher {
                handle: PropagatorVarId {
                    propagator: id,
                    variable: local_id,
                },
                conditions: propagator.propagation_conditions(local_id),
            },
        );
    }
}

impl<Store: 'static, Policy: std::fmt::Debug> std::fmt::Debug
    for PropagationEngine<Store, Policy> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropagationEngine")
            .field("options", &self.options)
            .field("propagators", &self.propagators)
            .field("queue", &self.queue)
            .field("trigger", &self.trigger)
            .field("is_initialized", &self.is_initialized)
            .field("requires_flush", &self.requires_flush)
            .field("statistics", &self.statistics)
            .finish_non_exhaustive()
    }
}
