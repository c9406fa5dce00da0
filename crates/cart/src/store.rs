//! The cart store: hydration, mutations, and write-through persistence.
//!
//! [`CartStore`] owns the in-memory [`Cart`] and is its sole mutator. Every
//! mutation updates the in-memory state synchronously, then writes the whole
//! serialized cart back to storage under the configured namespace key. With
//! the default [`PersistPolicy::BestEffort`] the write runs as a detached
//! background task; see [`PersistPolicy`] for the durability trade-off.
//!
//! The store is cheaply cloneable; all clones share the same state. Methods
//! must be called from within a tokio runtime.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use rust_decimal::Decimal;
use tracing::{debug, instrument, warn};

use marketplace_core::ProductId;

use crate::config::{CartConfig, PersistPolicy};
use crate::error::Result;
use crate::model::{Cart, LineItem, NewLineItem};
use crate::storage::{FileStore, KeyValueStore, MemoryStore, StorageError};

/// Client-side cart store with write-through persistence.
///
/// This struct is cheaply cloneable via `Arc`; clones share the cart state,
/// the storage backend, and the hydration flag.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<CartStoreInner>,
}

struct CartStoreInner {
    config: CartConfig,
    storage: Arc<dyn KeyValueStore>,
    cart: RwLock<Cart>,
    hydrated: AtomicBool,
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("storage_key", &self.inner.config.storage_key)
            .field("persist_policy", &self.inner.config.persist_policy)
            .field("hydrated", &self.inner.hydrated.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl CartStore {
    /// Create a store over an explicit storage backend.
    ///
    /// The cart starts empty; call [`hydrate`](Self::hydrate) once to load
    /// any previously persisted state.
    #[must_use]
    pub fn new(config: CartConfig, storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            inner: Arc::new(CartStoreInner {
                config,
                storage,
                cart: RwLock::new(Cart::new()),
                hydrated: AtomicBool::new(false),
            }),
        }
    }

    /// Create a store with the backend selected by the configuration:
    /// file-backed when `storage_dir` is set, in-memory otherwise.
    #[must_use]
    pub fn from_config(config: CartConfig) -> Self {
        let storage: Arc<dyn KeyValueStore> = match &config.storage_dir {
            Some(dir) => Arc::new(FileStore::new(dir.clone())),
            None => Arc::new(MemoryStore::new()),
        };
        Self::new(config, storage)
    }

    /// Create a store with default configuration and in-memory storage.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_config(CartConfig::default())
    }

    /// Get a reference to the store configuration.
    #[must_use]
    pub fn config(&self) -> &CartConfig {
        &self.inner.config
    }

    /// Load the persisted cart, once per store lifetime.
    ///
    /// A missing blob leaves the cart empty. A malformed blob or a storage
    /// read failure is recovered by discarding it and starting empty, with a
    /// logged warning; hydration never panics and never surfaces an error.
    /// Later calls are no-ops and never clobber mutated state.
    #[instrument(skip(self))]
    pub async fn hydrate(&self) {
        if self.inner.hydrated.swap(true, Ordering::SeqCst) {
            debug!("cart already hydrated, skipping");
            return;
        }

        match self.inner.storage.get(&self.inner.config.storage_key).await {
            Ok(Some(blob)) => match serde_json::from_str::<Cart>(&blob) {
                Ok(cart) => {
                    debug!(items = cart.len(), "hydrated cart from storage");
                    *self.cart_write() = cart;
                }
                Err(err) => {
                    warn!(error = %err, "discarding malformed persisted cart, starting empty");
                }
            },
            Ok(None) => debug!("no persisted cart found, starting empty"),
            Err(err) => {
                warn!(error = %err, "failed to read persisted cart, starting empty");
            }
        }
    }

    /// Add a product to the cart.
    ///
    /// An existing entry with the same ID gets its quantity incremented by 1
    /// and its title, image, and price refreshed to the descriptor's values;
    /// otherwise a new entry is appended with quantity 1. The updated cart is
    /// written through to storage.
    #[instrument(skip(self, item), fields(product_id = %item.id))]
    pub async fn add_to_cart(&self, item: NewLineItem) {
        let snapshot = {
            let mut cart = self.cart_write();
            cart.add(item);
            cart.clone()
        };
        self.persist(snapshot).await;
    }

    /// Increase the quantity of an existing entry by 1.
    ///
    /// A non-matching ID is a no-op: no entry is created and nothing is
    /// written to storage.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn increment(&self, id: &ProductId) {
        let snapshot = {
            let mut cart = self.cart_write();
            cart.increment(id).then(|| cart.clone())
        };
        match snapshot {
            Some(snapshot) => self.persist(snapshot).await,
            None => debug!("increment on absent product, no-op"),
        }
    }

    /// Decrease the quantity of an existing entry by 1, removing the entry
    /// when its quantity would reach 0.
    ///
    /// A non-matching ID is a no-op: nothing is written to storage.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn decrement(&self, id: &ProductId) {
        let snapshot = {
            let mut cart = self.cart_write();
            cart.decrement(id).then(|| cart.clone())
        };
        match snapshot {
            Some(snapshot) => self.persist(snapshot).await,
            None => debug!("decrement on absent product, no-op"),
        }
    }

    /// Snapshot of the current line items in insertion order.
    #[must_use]
    pub fn items(&self) -> Vec<LineItem> {
        self.cart_read().items().to_vec()
    }

    /// Sum of `price * quantity` over all entries.
    ///
    /// Pure derived value, recomputed from current state on every call.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.cart_read().total()
    }

    /// Sum of quantities over all entries.
    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.cart_read().total_items()
    }

    /// Whether the cart holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cart_read().is_empty()
    }

    /// Write the current cart to storage and wait for the write to finish.
    ///
    /// This is the durable checkpoint for callers that need one regardless
    /// of the configured persistence policy.
    ///
    /// # Errors
    ///
    /// Returns the storage or serialization failure, unlike the mutation
    /// write-throughs which only log it.
    pub async fn flush(&self) -> Result<()> {
        let snapshot = self.cart_read().clone();
        write_blob(
            self.inner.storage.as_ref(),
            &self.inner.config.storage_key,
            &snapshot,
        )
        .await?;
        Ok(())
    }

    /// Write-through after a mutation, per the configured policy.
    ///
    /// The in-memory mutation has already completed by the time this runs;
    /// a failed write is logged and never propagated, so the in-memory state
    /// stays authoritative for the session.
    async fn persist(&self, snapshot: Cart) {
        match self.inner.config.persist_policy {
            PersistPolicy::BestEffort => {
                let storage = Arc::clone(&self.inner.storage);
                let key = self.inner.config.storage_key.clone();
                tokio::spawn(async move {
                    if let Err(err) = write_blob(storage.as_ref(), &key, &snapshot).await {
                        warn!(error = %err, "cart write-through failed");
                    }
                });
            }
            PersistPolicy::Durable => {
                if let Err(err) = write_blob(
                    self.inner.storage.as_ref(),
                    &self.inner.config.storage_key,
                    &snapshot,
                )
                .await
                {
                    warn!(error = %err, "cart write-through failed");
                }
            }
        }
    }

    fn cart_read(&self) -> RwLockReadGuard<'_, Cart> {
        self.inner.cart.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn cart_write(&self) -> RwLockWriteGuard<'_, Cart> {
        self.inner
            .cart
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Serialize the cart and overwrite the blob stored under `key`.
async fn write_blob(
    storage: &dyn KeyValueStore,
    key: &str,
    cart: &Cart,
) -> std::result::Result<(), StorageError> {
    let blob = serde_json::to_string(cart)?;
    storage.set(key, blob).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn durable_config() -> CartConfig {
        CartConfig {
            persist_policy: PersistPolicy::Durable,
            ..CartConfig::default()
        }
    }

    fn descriptor(id: &str, price: Decimal) -> NewLineItem {
        NewLineItem {
            id: ProductId::new(id),
            title: format!("Product {id}"),
            image_url: format!("https://cdn.example.com/{id}.png"),
            price,
        }
    }

    #[tokio::test]
    async fn test_hydrate_restores_persisted_cart() {
        let blob = r#"[{"id":"sku-1","title":"Mug","image_url":"mug.png","price":4.5,"quantity":2}]"#;
        let storage = Arc::new(MemoryStore::with_entry("@Marketplace:Products", blob));
        let store = CartStore::new(CartConfig::default(), storage);

        store.hydrate().await;

        assert_eq!(store.total_items(), 2);
        assert_eq!(store.total(), dec!(9));
    }

    #[tokio::test]
    async fn test_hydrate_with_empty_storage_leaves_cart_empty() {
        let store = CartStore::in_memory();
        store.hydrate().await;
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_hydrate_recovers_from_malformed_blob() {
        let storage = Arc::new(MemoryStore::with_entry(
            "@Marketplace:Products",
            "not json at all",
        ));
        let store = CartStore::new(CartConfig::default(), storage);

        store.hydrate().await;

        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_hydrate_runs_once_and_never_clobbers_mutations() {
        let blob = r#"[{"id":"sku-1","title":"Mug","image_url":"mug.png","price":4.5,"quantity":2}]"#;
        let storage = Arc::new(MemoryStore::with_entry("@Marketplace:Products", blob));
        let store = CartStore::new(durable_config(), storage);

        store.hydrate().await;
        store.add_to_cart(descriptor("sku-2", dec!(1))).await;

        // A second hydration must not re-read storage over the mutated state.
        store.hydrate().await;
        assert_eq!(store.items().len(), 2);
    }

    #[tokio::test]
    async fn test_mutations_write_through_to_storage() {
        let storage = Arc::new(MemoryStore::new());
        let store = CartStore::new(durable_config(), Arc::clone(&storage) as Arc<dyn KeyValueStore>);

        store.add_to_cart(descriptor("sku-1", dec!(10))).await;
        store.increment(&ProductId::new("sku-1")).await;

        let blob = storage
            .get("@Marketplace:Products")
            .await
            .unwrap()
            .expect("write-through stored a blob");
        let persisted: Cart = serde_json::from_str(&blob).unwrap();
        assert_eq!(persisted.total_items(), 2);
    }

    #[tokio::test]
    async fn test_noop_mutations_do_not_write() {
        let storage = Arc::new(MemoryStore::new());
        let store = CartStore::new(durable_config(), Arc::clone(&storage) as Arc<dyn KeyValueStore>);

        store.increment(&ProductId::new("missing")).await;
        store.decrement(&ProductId::new("missing")).await;

        assert_eq!(storage.get("@Marketplace:Products").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_decrement_to_zero_removes_entry_from_persisted_blob() {
        let storage = Arc::new(MemoryStore::new());
        let store = CartStore::new(durable_config(), Arc::clone(&storage) as Arc<dyn KeyValueStore>);

        store.add_to_cart(descriptor("sku-1", dec!(10))).await;
        store.decrement(&ProductId::new("sku-1")).await;

        assert!(store.is_empty());
        let blob = storage
            .get("@Marketplace:Products")
            .await
            .unwrap()
            .expect("removal is persisted too");
        let persisted: Cart = serde_json::from_str(&blob).unwrap();
        assert!(persisted.is_empty());
    }

    #[tokio::test]
    async fn test_flush_writes_current_state() {
        let storage = Arc::new(MemoryStore::new());
        // Best-effort policy: flush is the deterministic checkpoint.
        let store = CartStore::new(
            CartConfig::default(),
            Arc::clone(&storage) as Arc<dyn KeyValueStore>,
        );

        store.add_to_cart(descriptor("sku-1", dec!(2.50))).await;
        store.flush().await.unwrap();

        let blob = storage.get("@Marketplace:Products").await.unwrap().unwrap();
        let persisted: Cart = serde_json::from_str(&blob).unwrap();
        assert_eq!(persisted.total(), dec!(2.50));
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let store = CartStore::in_memory();
        let clone = store.clone();

        store.add_to_cart(descriptor("sku-1", dec!(1))).await;

        assert_eq!(clone.total_items(), 1);
    }
}
