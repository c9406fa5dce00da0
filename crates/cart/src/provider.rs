//! Provider-scope access to a shared cart store.
//!
//! UI code reaches the cart through an ambient scope rather than threading a
//! [`CartStore`] handle through every layer: the integrator enters a
//! [`CartScope`] near the top of the UI tree, and any code running inside it
//! calls [`use_cart`] to get a handle. Calling [`use_cart`] with no active
//! scope is an integration error and fails with
//! [`CartError::MissingProvider`].
//!
//! The scope is thread-local, matching the single-threaded UI event loop the
//! store is designed for. Scopes nest; dropping a guard restores the outer
//! scope. Code that can take a `CartStore` parameter directly should prefer
//! that over the ambient lookup.

use std::cell::RefCell;

use crate::error::{CartError, Result};
use crate::store::CartStore;

thread_local! {
    static ACTIVE_SCOPES: RefCell<Vec<CartStore>> = const { RefCell::new(Vec::new()) };
}

/// Guard marking a region of code where a cart store is available.
///
/// The store stays available on the current thread until the guard is
/// dropped.
///
/// # Example
///
/// ```rust,ignore
/// let store = CartStore::from_config(CartConfig::from_env()?);
/// store.hydrate().await;
///
/// let _scope = CartScope::enter(store);
/// render_cart_screen().await; // may call use_cart() anywhere inside
/// ```
#[must_use = "the cart is only available while the scope guard is alive"]
pub struct CartScope {
    _not_send: std::marker::PhantomData<*const ()>,
}

impl CartScope {
    /// Make `store` the active cart for the current thread.
    pub fn enter(store: CartStore) -> Self {
        ACTIVE_SCOPES.with(|scopes| scopes.borrow_mut().push(store));
        Self {
            _not_send: std::marker::PhantomData,
        }
    }
}

impl Drop for CartScope {
    fn drop(&mut self) {
        ACTIVE_SCOPES.with(|scopes| {
            scopes.borrow_mut().pop();
        });
    }
}

/// Get a handle to the active cart store.
///
/// # Errors
///
/// Returns [`CartError::MissingProvider`] when called outside an active
/// [`CartScope`] on this thread.
pub fn use_cart() -> Result<CartStore> {
    ACTIVE_SCOPES
        .with(|scopes| scopes.borrow().last().cloned())
        .ok_or(CartError::MissingProvider)
}
