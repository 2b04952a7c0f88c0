//! API middleware components

pub mod identity;
pub mod logging;

pub use identity::CallerIdentity;
pub use logging::logging_middleware;
