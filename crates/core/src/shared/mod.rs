pub mod constants;
pub mod model_resolver;

/// Error type for values that cross worker-thread boundaries.
pub type SendError = Box<dyn std::error::Error + Send + Sync>;
