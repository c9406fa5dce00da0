//! Marketplace Cart - client-side cart store with local persistence.
//!
//! # Architecture
//!
//! - [`model`] holds the pure cart state machine: an ordered, id-unique list
//!   of line items with add/increment/decrement semantics and derived totals
//! - [`storage`] abstracts the device-local key-value store the cart is
//!   persisted to, as a single JSON blob under one fixed namespace key
//! - [`store`] ties them together: one-shot hydration on startup, then
//!   write-through persistence after every mutation
//! - [`provider`] gives UI code ambient access to a shared store through a
//!   thread-local scope
//!
//! # Example
//!
//! ```rust,ignore
//! use marketplace_cart::{CartConfig, CartScope, CartStore, use_cart};
//!
//! let store = CartStore::from_config(CartConfig::from_env()?);
//! store.hydrate().await;
//!
//! let _scope = CartScope::enter(store);
//!
//! // Anywhere inside the scope:
//! let cart = use_cart()?;
//! cart.add_to_cart(item).await;
//! let subtotal = cart.total();
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod model;
pub mod provider;
pub mod storage;
pub mod store;

pub use config::{CartConfig, ConfigError, PersistPolicy};
pub use error::{CartError, Result};
pub use model::{Cart, LineItem, NewLineItem};
pub use provider::{CartScope, use_cart};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};
pub use store::CartStore;
