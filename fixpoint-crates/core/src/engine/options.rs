use crate::containers::SlotIndexKind;
use crate::propagation::Priority;
#[cfg(doc)]
use crate::engine::PropagationEngine;
#[cfg(doc)]
use crate::engine::TwoBucketPolicy;

/// Options which influence the behaviour of the [`PropagationEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    /// For every [`Priority`] (cheapest first), the bucket receiving fine events of propagators
    /// with that priority. A priority without a bucket is coarse-only; propagators with such a
    /// priority cannot be added.
    pub fine_event_buckets: [Option<u8>; Priority::NUM_PRIORITIES],
    /// For every [`Priority`], the bucket receiving delayed propagations. Propagators with a
    /// priority without a bucket cannot delay their propagation.
    ///
    /// With the [`TwoBucketPolicy`], coarse buckets are placed after all fine buckets.
    pub coarse_event_buckets: [Option<u8>; Priority::NUM_PRIORITIES],
    /// Whether propagators are checked for idempotency after they have been propagated.
    pub idempotency: IdempotencyStrategy,
    /// Run the initial propagation ordered by priority and arity instead of by registration
    /// order.
    pub sort_initial_propagation: bool,
    /// How propagator and variable identifiers are mapped onto internal slots.
    pub slot_index: SlotIndexKind,
}

impl Default for EngineOptions {
    fn default() -> Self {
        EngineOptions {
            fine_event_buckets: [Some(0), Some(0), Some(0), Some(1), Some(2), Some(2), Some(2)],
            coarse_event_buckets: [None, None, None, Some(0), Some(1), Some(2), Some(3)],
            idempotency: IdempotencyStrategy::default(),
            sort_initial_propagation: false,
            slot_index: SlotIndexKind::default(),
        }
    }
}

/// What to do with propagators which do not reach their fixpoint in a single call.
///
/// The check is only performed when the crate is built with the `debug-checks` feature.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum IdempotencyStrategy {
    /// Propagators are not checked.
    #[default]
    Disabled,
    /// Violations are reported with [`log::warn!`].
    Log,
    /// Violations are reported with [`log::warn!`] and stored in the engine.
    Collect,
}

impl IdempotencyStrategy {
    pub fn is_enabled(self) -> bool {
        self != IdempotencyStrategy::Disabled
    }
}
