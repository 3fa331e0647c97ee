use crate::create_statistics_struct;

create_statistics_struct!(
    /// Counters of the [`PropagationEngine`](super::PropagationEngine).
    pub EngineStatistics {
        /// The number of times a propagator was invoked
        num_propagator_calls: u64,
        /// The number of calls which delivered the events of a single argument
        num_fine_calls: u64,
        /// The number of delayed propagations
        num_coarse_calls: u64,
        /// The number of full propagations run before serving the queues
        num_initial_propagations: u64,
        /// The number of domain changes reported to the engine
        num_notifications: u64,
        /// The number of times a propagator was put in a queue
        num_schedules: u64,
        /// The number of contradictions raised by propagators
        num_contradictions: u64,
        /// The number of times the pending events were discarded
        num_flushes: u64,
        /// The number of propagators found not to be idempotent
        num_idempotency_violations: u64,
});
