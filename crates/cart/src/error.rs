//! Unified error handling for the cart store.
//!
//! Mutations and totals never return errors to their callers: hydration and
//! write-through faults are recovered internally and logged. The two failure
//! modes that do surface are a misused provider scope and an explicit
//! [`flush`](crate::store::CartStore::flush) that cannot reach storage.

use thiserror::Error;

use crate::storage::StorageError;

/// Cart-level error type.
#[derive(Debug, Error)]
pub enum CartError {
    /// A cart accessor was invoked outside an active provider scope.
    ///
    /// This signals an integration error, not a runtime condition: the
    /// caller must be nested within a [`CartScope`](crate::provider::CartScope).
    #[error("cart accessed outside an active CartScope; enter a scope before calling use_cart")]
    MissingProvider,

    /// The storage backend failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Result type alias for `CartError`.
pub type Result<T> = std::result::Result<T, CartError>;
