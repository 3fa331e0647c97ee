//! Contains the main building blocks for propagators.
//!
//! # Background
//!
//! A propagator takes as input a set of variables (<code>x<sub>i</sub> ∈ X</code>) and for each
//! variable a corresponding domain (<code>D<sub>i</sub> ∈ D</code>); it can then be seen as a
//! function which maps `D ↦ D'` such that <code>D'<sub>i</sub> ⊆ D<sub>i</sub></code> for all
//! variables.
//!
//! A propagator is said to be at fix-point if applying it again does not change any domain. A
//! propagator is said to be "idempotent" if a single call to it will result in it being at
//! fix-point. The engine can check this in debug builds, see
//! [`IdempotencyStrategy`](crate::engine::IdempotencyStrategy).
//!
//! # Practical
//!
//! Each concrete propagator implements the [`Propagator`] trait. Whenever a propagator narrows a
//! domain, it reports the change through [`PropagationContext::notify`]; the engine then
//! determines which other propagators need to run.
//!
//! Changes are described by [`DomainEvents`]. Propagators that react to fine events receive the
//! merged events per argument ([`LocalId`]); all other propagators are reactivated as a whole with
//! a [`PropagatorEvent`].
//!
//! # Bibliography
//!
//! \[1\] C. Schulte and P. J. Stuckey, ‘Efficient constraint propagation engines’, ACM Transactions
//! on Programming Languages and Systems (TOPLAS), vol. 31, no. 1, pp. 1–43, 2008.

mod context;
mod events;
mod ids;
mod propagator;

pub(crate) use context::EventSink;
pub use context::PropagationContext;
pub use events::*;
pub use ids::*;
pub use propagator::*;
