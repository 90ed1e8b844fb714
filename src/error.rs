use thiserror::Error;

/// Failure of direct (non-safe) access into a map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("key not found")]
    KeyNotFound,
}
