//! Cart data model and pure state machine.
//!
//! The [`Cart`] type owns the ordered, id-unique list of line items and
//! implements the mutation semantics without any I/O. Persistence and
//! provider access live in [`crate::store`] and [`crate::provider`].

use marketplace_core::ProductId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One product entry in the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Opaque unique identifier assigned by the product catalog.
    pub id: ProductId,
    /// Display name.
    pub title: String,
    /// Display image reference.
    pub image_url: String,
    /// Unit price. Non-negative.
    pub price: Decimal,
    /// Count of this product in the cart. Always >= 1 while the item is
    /// present; an item reaching quantity 0 is removed, never retained.
    pub quantity: u32,
}

/// Descriptor for a product being added to the cart.
///
/// Carries everything a [`LineItem`] does except the quantity, which is
/// managed by the cart itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewLineItem {
    /// Opaque unique identifier assigned by the product catalog.
    pub id: ProductId,
    /// Display name.
    pub title: String,
    /// Display image reference.
    pub image_url: String,
    /// Unit price. Non-negative.
    pub price: Decimal,
}

impl NewLineItem {
    fn into_line_item(self) -> LineItem {
        LineItem {
            id: self.id,
            title: self.title,
            image_url: self.image_url,
            price: self.price,
            quantity: 1,
        }
    }
}

/// The ordered, id-unique collection of line items for the current session.
///
/// Insertion order is not semantically meaningful but is preserved for UI
/// stability. Serializes as a plain JSON array of line items, matching the
/// persisted blob format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// The current line items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Number of distinct products in the cart.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the cart holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Look up a line item by product ID.
    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&LineItem> {
        self.items.iter().find(|item| &item.id == id)
    }

    /// Add a product to the cart.
    ///
    /// If an entry with the same ID already exists, its quantity is
    /// incremented by 1 and its title, image, and price are refreshed to the
    /// incoming descriptor's values. Otherwise a new entry is appended with
    /// quantity 1.
    pub fn add(&mut self, item: NewLineItem) {
        if let Some(existing) = self.items.iter_mut().find(|entry| entry.id == item.id) {
            existing.quantity += 1;
            existing.title = item.title;
            existing.image_url = item.image_url;
            existing.price = item.price;
        } else {
            self.items.push(item.into_line_item());
        }
    }

    /// Increase the quantity of an existing entry by 1.
    ///
    /// A non-matching ID is a no-op; no entry is created. Returns `true` if
    /// the cart changed.
    pub fn increment(&mut self, id: &ProductId) -> bool {
        match self.items.iter_mut().find(|entry| &entry.id == id) {
            Some(entry) => {
                entry.quantity += 1;
                true
            }
            None => false,
        }
    }

    /// Decrease the quantity of an existing entry by 1.
    ///
    /// An entry reaching quantity 0 is removed entirely, keeping the
    /// quantity >= 1 invariant. A non-matching ID is a no-op. Returns `true`
    /// if the cart changed.
    pub fn decrement(&mut self, id: &ProductId) -> bool {
        let Some(index) = self.items.iter().position(|entry| &entry.id == id) else {
            return false;
        };

        // position() above guarantees the index is valid.
        #[allow(clippy::indexing_slicing)]
        let entry = &mut self.items[index];
        if entry.quantity > 1 {
            entry.quantity -= 1;
        } else {
            self.items.remove(index);
        }

        true
    }

    /// Sum of `price * quantity` over all entries.
    ///
    /// Pure derived value, recomputed from current state on every call.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.items
            .iter()
            .map(|item| item.price * Decimal::from(item.quantity))
            .sum()
    }

    /// Sum of quantities over all entries.
    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }
}
