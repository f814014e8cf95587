use crate::core::handler::{HandlerError, Hook};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures surfaced by cache operations.
///
/// None of these roll back work that already happened: a failed handler runs
/// after its mutation was committed, and evictions performed before an
/// [`Error::EvictionExhausted`] stay evicted.
#[derive(Debug, Error)]
pub enum Error {
    /// A user-supplied handler returned an error.
    #[error("{hook} handler failed for key '{key}'")]
    Handler {
        hook: Hook,
        key: String,
        #[source]
        source: HandlerError,
    },

    /// The eviction predicate kept requesting evictions after the cache ran dry.
    #[error("cannot evict for '{key}': cache is empty")]
    EvictionExhausted { key: String },

    /// A typed lookup found a value of a different type.
    #[error("value stored under '{key}' is not a {expected}")]
    TypeMismatch { key: String, expected: &'static str },
}
