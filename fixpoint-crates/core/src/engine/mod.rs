//! The [`PropagationEngine`] and the structures it uses to decide when propagators run.
mod engine_statistics;
mod idempotency;
mod options;
mod pending_events;
mod propagation_engine;
mod propagation_trigger;
mod propagator_store;
pub mod queues;
#[cfg(test)]
pub(crate) mod test_helpers;
mod variable_registry;

pub use engine_statistics::EngineStatistics;
pub use idempotency::IdempotencyViolation;
pub use options::EngineOptions;
pub use options::IdempotencyStrategy;
pub(crate) use propagator_store::PropagatorSlot;
pub use propagation_engine::PropagationEngine;
pub use queues::QueueingPolicy;
pub use queues::SevenQueuePolicy;
pub use queues::TwoBucketPolicy;
