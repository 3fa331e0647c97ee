//! # Fixpoint
//! The propagation core of a finite-domain constraint solver.
//!
//! The crate contains the [`PropagationEngine`](engine::PropagationEngine), which repeatedly
//! invokes [`Propagator`](propagation::Propagator)s that are affected by changes to the domains
//! of their variables, until a fixpoint is reached or a propagator detects a
//! [`Contradiction`](basic_types::Contradiction).
//!
//! The engine does not own the domains. They live in a store chosen by the user of the crate,
//! which is handed to the engine whenever it propagates and which propagators access through
//! their [`PropagationContext`](propagation::PropagationContext).
//!
//! # Example
//! ```rust
//! use fixpoint_core::basic_types::PropagationStatus;
//! use fixpoint_core::engine::PropagationEngine;
//! use fixpoint_core::engine::TwoBucketPolicy;
//! use fixpoint_core::propagation::DomainEvents;
//! use fixpoint_core::propagation::PropagationContext;
//! use fixpoint_core::propagation::Propagator;
//! use fixpoint_core::propagation::PropagatorEvent;
//! use fixpoint_core::propagation::VariableId;
//!
//! /// Upper bounds of the variables.
//! struct Bounds(Vec<i32>);
//!
//! /// Enforces `x <= y` on the upper bounds.
//! struct LessOrEqual([VariableId; 2]);
//!
//! impl Propagator<Bounds> for LessOrEqual {
//!     fn name(&self) -> &str {
//!         "LessOrEqual"
//!     }
//!
//!     fn variables(&self) -> &[VariableId] {
//!         &self.0
//!     }
//!
//!     fn propagate(
//!         &mut self,
//!         mut context: PropagationContext<'_, Bounds>,
//!         _event: PropagatorEvent,
//!     ) -> PropagationStatus {
//!         let [x, y] = self.0;
//!         let bound = context.store().0[y.id() as usize];
//!         if context.store().0[x.id() as usize] > bound {
//!             context.store_mut().0[x.id() as usize] = bound;
//!             context.notify(x, DomainEvents::UPPER_BOUND);
//!         }
//!         Ok(())
//!     }
//! }
//!
//! let [x, y, z] = [0, 1, 2].map(VariableId::new);
//! let mut bounds = Bounds(vec![10, 10, 10]);
//! let mut engine: PropagationEngine<Bounds, TwoBucketPolicy> = PropagationEngine::default();
//! engine.add_propagator(LessOrEqual([x, y])).unwrap();
//! engine.add_propagator(LessOrEqual([y, z])).unwrap();
//! engine.run(&mut bounds).unwrap();
//!
//! bounds.0[2] = 3;
//! engine.notify(z, DomainEvents::UPPER_BOUND, None);
//! engine.run(&mut bounds).unwrap();
//!
//! assert_eq!(vec![3, 3, 3], bounds.0);
//! ```
#[doc(hidden)]
pub mod asserts;
pub mod basic_types;
pub mod containers;
pub mod engine;
pub mod propagation;
pub mod statistics;
