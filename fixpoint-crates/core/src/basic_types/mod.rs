mod propagation_status;
mod usage_error;

pub use propagation_status::*;
pub use usage_error::UsageError;
