//! Domains and propagators which are used to test the engine.
use std::cell::RefCell;
use std::rc::Rc;

use crate::basic_types::PropagationStatus;
use crate::propagation::DomainEvents;
use crate::propagation::EnqueueDecision;
use crate::propagation::LocalId;
use crate::propagation::Priority;
use crate::propagation::PropagationContext;
use crate::propagation::Propagator;
use crate::propagation::PropagatorEvent;
use crate::propagation::VariableId;

/// Integer variables represented by their bounds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct IntervalStore {
    domains: Vec<(i32, i32)>,
}

impl IntervalStore {
    pub(crate) fn new_variable(&mut self, lower_bound: i32, upper_bound: i32) -> VariableId {
        self.domains.push((lower_bound, upper_bound));
        VariableId::new(self.domains.len() as u32 - 1)
    }

    pub(crate) fn lower_bound(&self, variable: VariableId) -> i32 {
        self.domains[variable.id() as usize].0
    }

    pub(crate) fn upper_bound(&self, variable: VariableId) -> i32 {
        self.domains[variable.id() as usize].1
    }

    /// Tightens the lower bound from outside of propagation, returning the events which
    /// happened.
    pub(crate) fn tighten_lower_bound(&mut self, variable: VariableId, bound: i32) -> DomainEvents {
        let (lower_bound, upper_bound) = &mut self.domains[variable.id() as usize];
        if bound <= *lower_bound {
            return DomainEvents::NONE;
        }

        *lower_bound = bound;
        if *lower_bound == *upper_bound {
            DomainEvents::LOWER_BOUND | DomainEvents::ASSIGN
        } else {
            DomainEvents::LOWER_BOUND
        }
    }

    pub(crate) fn tighten_upper_bound(&mut self, variable: VariableId, bound: i32) -> DomainEvents {
        let (lower_bound, upper_bound) = &mut self.domains[variable.id() as usize];
        if bound >= *upper_bound {
            return DomainEvents::NONE;
        }

        *upper_bound = bound;
        if *lower_bound == *upper_bound {
            DomainEvents::UPPER_BOUND | DomainEvents::ASSIGN
        } else {
            DomainEvents::UPPER_BOUND
        }
    }
}

pub(crate) fn set_lower_bound(
    context: &mut PropagationContext<'_, IntervalStore>,
    variable: VariableId,
    bound: i32,
) -> PropagationStatus {
    if bound > context.store().upper_bound(variable) {
        return Err(context.contradiction(Some(variable), "lower bound exceeds upper bound"));
    }

    let events = context.store_mut().tighten_lower_bound(variable, bound);
    context.notify(variable, events);
    Ok(())
}

pub(crate) fn set_upper_bound(
    context: &mut PropagationContext<'_, IntervalStore>,
    variable: VariableId,
    bound: i32,
) -> PropagationStatus {
    if bound < context.store().lower_bound(variable) {
        return Err(context.contradiction(Some(variable), "upper bound below lower bound"));
    }

    let events = context.store_mut().tighten_upper_bound(variable, bound);
    context.notify(variable, events);
    Ok(())
}

/// `x < y`
#[derive(Debug, Clone)]
pub(crate) struct LessThan {
    variables: [VariableId; 2],
}

impl LessThan {
    pub(crate) fn new(x: VariableId, y: VariableId) -> Self {
        LessThan { variables: [x, y] }
    }
}

impl Propagator<IntervalStore> for LessThan {
    fn name(&self) -> &str {
        "LessThan"
    }

    fn variables(&self) -> &[VariableId] {
        &self.variables
    }

    fn priority(&self) -> Priority {
        Priority::Binary
    }

    fn propagation_conditions(&self, local_id: LocalId) -> DomainEvents {
        match local_id.unpack() {
            0 => DomainEvents::LOWER_BOUND,
            _ => DomainEvents::UPPER_BOUND,
        }
    }

    fn propagate(
        &mut self,
        mut context: PropagationContext<'_, IntervalStore>,
        _event: PropagatorEvent,
    ) -> PropagationStatus {
        let [x, y] = self.variables;
        let y_upper_bound = context.store().upper_bound(y);
        set_upper_bound(&mut context, x, y_upper_bound - 1)?;
        let x_lower_bound = context.store().lower_bound(x);
        set_lower_bound(&mut context, y, x_lower_bound + 1)
    }
}

/// `sum(variables) <= bound`, propagated incrementally on lower bound changes.
#[derive(Debug, Clone)]
pub(crate) struct LinearLessOrEqual {
    variables: Vec<VariableId>,
    bound: i32,
    pub(crate) num_fine_calls: usize,
}

impl LinearLessOrEqual {
    pub(crate) fn new(variables: Vec<VariableId>, bound: i32) -> Self {
        LinearLessOrEqual {
            variables,
            bound,
            num_fine_calls: 0,
        }
    }
}

impl Propagator<IntervalStore> for LinearLessOrEqual {
    fn name(&self) -> &str {
        "LinearLessOrEqual"
    }

    fn variables(&self) -> &[VariableId] {
        &self.variables
    }

    fn priority(&self) -> Priority {
        Priority::Linear
    }

    fn reacts_to_fine_events(&self) -> bool {
        true
    }

    fn propagation_conditions(&self, _local_id: LocalId) -> DomainEvents {
        DomainEvents::LOWER_BOUND
    }

    fn propagate(
        &mut self,
        mut context: PropagationContext<'_, IntervalStore>,
        _event: PropagatorEvent,
    ) -> PropagationStatus {
        let lower_bounds: i32 = self
            .variables
            .iter()
            .map(|&variable| context.store().lower_bound(variable))
            .sum();
        if lower_bounds > self.bound {
            return Err(context.contradiction(None, "sum of lower bounds exceeds the bound"));
        }

        for &variable in &self.variables {
            let slack = self.bound - lower_bounds + context.store().lower_bound(variable);
            set_upper_bound(&mut context, variable, slack)?;
        }
        Ok(())
    }

    fn propagate_event(
        &mut self,
        context: PropagationContext<'_, IntervalStore>,
        _local_id: LocalId,
        _events: DomainEvents,
    ) -> PropagationStatus {
        self.num_fine_calls += 1;
        self.propagate(context, PropagatorEvent::Full)
    }
}

/// A call made to a [`RecordingPropagator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Call {
    Propagate(PropagatorEvent),
    Event(LocalId, DomainEvents),
}

/// The calls made to a group of [`RecordingPropagator`]s, in order.
pub(crate) type CallLog = Rc<RefCell<Vec<(&'static str, Call)>>>;

type Action = Box<dyn FnMut(&mut PropagationContext<'_, IntervalStore>, Call) -> PropagationStatus>;

/// A propagator which records how it is called and otherwise runs a configurable action.
pub(crate) struct RecordingPropagator {
    name: &'static str,
    variables: Vec<VariableId>,
    priority: Priority,
    fine: bool,
    pub(crate) active: bool,
    pub(crate) skip_advice: bool,
    log: CallLog,
    action: Action,
}

impl RecordingPropagator {
    pub(crate) fn new(
        name: &'static str,
        variables: Vec<VariableId>,
        priority: Priority,
        log: &CallLog,
    ) -> Self {
        RecordingPropagator {
            name,
            variables,
            priority,
            fine: false,
            active: true,
            skip_advice: false,
            log: Rc::clone(log),
            action: Box::new(|_, _| Ok(())),
        }
    }

    pub(crate) fn with_fine_events(mut self) -> Self {
        self.fine = true;
        self
    }

    pub(crate) fn with_action(
        mut self,
        action: impl FnMut(&mut PropagationContext<'_, IntervalStore>, Call) -> PropagationStatus
            + 'static,
    ) -> Self {
        self.action = Box::new(action);
        self
    }

    pub(crate) fn set_variables(&mut self, variables: Vec<VariableId>) {
        self.variables = variables;
    }

    fn record(
        &mut self,
        mut context: PropagationContext<'_, IntervalStore>,
        call: Call,
    ) -> PropagationStatus {
        self.log.borrow_mut().push((self.name, call));
        (self.action)(&mut context, call)
    }
}

impl Propagator<IntervalStore> for RecordingPropagator {
    fn name(&self) -> &str {
        self.name
    }

    fn variables(&self) -> &[VariableId] {
        &self.variables
    }

    fn priority(&self) -> Priority {
        self.priority
    }

    fn reacts_to_fine_events(&self) -> bool {
        self.fine
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn advise(&mut self, _local_id: LocalId, _events: DomainEvents) -> EnqueueDecision {
        if self.skip_advice {
            EnqueueDecision::Skip
        } else {
            EnqueueDecision::Enqueue
        }
    }

    fn propagate(
        &mut self,
        context: PropagationContext<'_, IntervalStore>,
        event: PropagatorEvent,
    ) -> PropagationStatus {
        self.record(context, Call::Propagate(event))
    }

    fn propagate_event(
        &mut self,
        context: PropagationContext<'_, IntervalStore>,
        local_id: LocalId,
        events: DomainEvents,
    ) -> PropagationStatus {
        self.record(context, Call::Event(local_id, events))
    }
}

/// The names of the recorded propagators, in call order.
pub(crate) fn call_order(log: &CallLog) -> Vec<&'static str> {
    log.borrow().iter().map(|(name, _)| *name).collect()
}
