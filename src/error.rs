use thiserror::Error;

/// Failure taxonomy for the portal core. `Validation` and
/// `MissingDependency` are raised before any network call is made;
/// `Request` wraps any rejected external call uniformly, without
/// branching on status codes beyond success/failure.
#[derive(Debug, Error)]
pub enum PortalError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    MissingDependency(String),

    #[error("{0}")]
    Request(String),

    #[error("Configuration error: {0}")]
    Config(String),
}
