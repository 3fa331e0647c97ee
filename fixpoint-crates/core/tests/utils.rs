#![allow(
    dead_code,
    reason = "it is used in other test files, but somehow compiler can't see it"
)]
#![cfg(test)]

use std::cell::RefCell;
use std::rc::Rc;

use fixpoint_core::basic_types::PropagationStatus;
use fixpoint_core::propagation::DomainEvents;
use fixpoint_core::propagation::LocalId;
use fixpoint_core::propagation::Priority;
use fixpoint_core::propagation::PropagationContext;
use fixpoint_core::propagation::Propagator;
use fixpoint_core::propagation::PropagatorEvent;
use fixpoint_core::propagation::VariableId;

pub(crate) fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Bounds of integer variables.
#[derive(Debug, Default)]
pub(crate) struct Domains {
    bounds: Vec<(i32, i32)>,
}

impl Domains {
    pub(crate) fn new_variable(&mut self, lower_bound: i32, upper_bound: i32) -> VariableId {
        self.bounds.push((lower_bound, upper_bound));
        VariableId::new(self.bounds.len() as u32 - 1)
    }

    pub(crate) fn bounds(&self, variable: VariableId) -> (i32, i32) {
        self.bounds[variable.id() as usize]
    }

    /// Lowers the upper bound; returns [`None`] if the domain became empty.
    pub(crate) fn lower_upper_bound(
        &mut self,
        variable: VariableId,
        bound: i32,
    ) -> Option<DomainEvents> {
        let (lower_bound, upper_bound) = &mut self.bounds[variable.id() as usize];
        if bound < *lower_bound {
            return None;
        }
        if bound >= *upper_bound {
            return Some(DomainEvents::NONE);
        }

        *upper_bound = bound;
        if *upper_bound == *lower_bound {
            Some(DomainEvents::UPPER_BOUND | DomainEvents::ASSIGN)
        } else {
            Some(DomainEvents::UPPER_BOUND)
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Invocation {
    Full(PropagatorEvent),
    Argument(LocalId, DomainEvents),
}

pub(crate) type Trace = Rc<RefCell<Vec<(&'static str, Invocation)>>>;

/// Records its invocations; optionally requests a full delayed propagation from its first fine
/// invocation.
pub(crate) struct Spy {
    pub(crate) name: &'static str,
    pub(crate) variables: Vec<VariableId>,
    pub(crate) priority: Priority,
    pub(crate) fine: bool,
    pub(crate) delay_once: bool,
    pub(crate) trace: Trace,
}

impl Spy {
    pub(crate) fn new(
        name: &'static str,
        variables: Vec<VariableId>,
        priority: Priority,
        trace: &Trace,
    ) -> Spy {
        Spy {
            name,
            variables,
            priority,
            fine: false,
            delay_once: false,
            trace: Rc::clone(trace),
        }
    }
}

impl Propagator<Domains> for Spy {
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

    fn propagate(
        &mut self,
        _context: PropagationContext<'_, Domains>,
        event: PropagatorEvent,
    ) -> PropagationStatus {
        self.trace
            .borrow_mut()
            .push((self.name, Invocation::Full(event)));
        Ok(())
    }

    fn propagate_event(
        &mut self,
        mut context: PropagationContext<'_, Domains>,
        local_id: LocalId,
        events: DomainEvents,
    ) -> PropagationStatus {
        self.trace
            .borrow_mut()
            .push((self.name, Invocation::Argument(local_id, events)));
        if self.delay_once {
            self.delay_once = false;
            if let Err(error) = context.schedule(PropagatorEvent::Full) {
                panic!("{error}");
            }
        }
        Ok(())
    }
}

/// `x <= y - offset` on the upper bounds.
#[derive(Debug)]
pub(crate) struct UpperBoundBelow {
    pub(crate) variables: [VariableId; 2],
    pub(crate) offset: i32,
}

impl Propagator<Domains> for UpperBoundBelow {
    fn name(&self) -> &str {
        "UpperBoundBelow"
    }

    fn variables(&self) -> &[VariableId] {
        &self.variables
    }

    fn priority(&self) -> Priority {
        Priority::Binary
    }

    fn propagation_conditions(&self, local_id: LocalId) -> DomainEvents {
        if local_id.unpack() == 1 {
            DomainEvents::UPPER_BOUND
        } else {
            DomainEvents::NONE
        }
    }

    fn propagate(
        &mut self,
        mut context: PropagationContext<'_, Domains>,
        _event: PropagatorEvent,
    ) -> PropagationStatus {
        let [x, y] = self.variables;
        let bound = context.store().bounds(y).1 - self.offset;
        match context.store_mut().lower_upper_bound(x, bound) {
            Some(events) => {
                context.notify(x, events);
                Ok(())
            }
            None => Err(context.contradiction(Some(x), "empty domain")),
        }
    }
}

pub(crate) fn names(trace: &Trace) -> Vec<&'static str> {
    trace.borrow().iter().map(|(name, _)| *name).collect()
}
