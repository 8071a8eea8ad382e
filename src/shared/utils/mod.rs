pub mod logger;
pub mod proxy_rotator;
pub mod rate_limiter;
pub mod retry_policy;
pub mod validation;

pub use logger::{init_logger, LogContext, TimedOperation};
pub use proxy_rotator::{ProxyEntry, ProxyRotator};
pub use rate_limiter::RateLimiter;
pub use retry_policy::RetryPolicy;
pub use validation::Validator;
