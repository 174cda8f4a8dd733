//! Durable cart store.
//!
//! The store owns the canonical list of cart lines and writes the whole list
//! to local storage after every mutation. Lines keep insertion order.

use shelf_cache::Cache;
use shelf_core::CartConfig;

use crate::cart::{item_count, CartItem, PricingPolicy, PricingResult};
use crate::error::CommerceError;
use crate::ids::ProductId;
use crate::session::UserType;

/// Per-line quantity limits enforced by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartLimits {
    /// Hard cap on any single line.
    pub max_quantity_per_item: u32,
}

impl Default for CartLimits {
    fn default() -> Self {
        Self {
            max_quantity_per_item: 10,
        }
    }
}

impl CartLimits {
    /// Build limits from the `[cart]` configuration section.
    pub fn from_config(config: &CartConfig) -> Self {
        Self {
            max_quantity_per_item: config.max_quantity_per_item,
        }
    }

    /// Effective cap for a line: the global cap, lowered to known stock.
    pub fn limit_for(&self, max_quantity: Option<u32>) -> u32 {
        match max_quantity {
            Some(stock) => stock.min(self.max_quantity_per_item),
            None => self.max_quantity_per_item,
        }
    }
}

/// The session's cart, mirrored to local storage.
#[derive(Debug)]
pub struct CartStore {
    cache: Cache,
    key: String,
    limits: CartLimits,
    items: Vec<CartItem>,
}

impl CartStore {
    /// Load the cart stored under `key`.
    ///
    /// Never fails: a missing snapshot gives an empty cart, and a snapshot
    /// that does not parse is logged and removed.
    pub fn load(cache: Cache, key: impl Into<String>, limits: CartLimits) -> Self {
        let key = key.into();
        let items = match cache.get::<Vec<CartItem>>(&key) {
            Ok(Some(items)) => normalize(items, limits),
            Ok(None) => Vec::new(),
            Err(e) if e.is_corrupt() => {
                tracing::warn!(key = %key, error = %e, "discarding corrupt cart snapshot");
                if let Err(e) = cache.delete(&key) {
                    tracing::warn!(key = %key, error = %e, "failed to remove corrupt cart snapshot");
                }
                Vec::new()
            }
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "cart snapshot unreadable, starting empty");
                Vec::new()
            }
        };

        tracing::debug!(key = %key, lines = items.len(), "cart loaded");
        Self {
            cache,
            key,
            limits,
            items,
        }
    }

    /// Write the full cart to local storage, replacing the previous snapshot.
    pub fn persist(&self) -> Result<(), CommerceError> {
        self.cache.set(&self.key, &self.items)?;
        Ok(())
    }

    /// Add `item.quantity` copies of a product.
    ///
    /// If the product is already in the cart its quantity is increased and
    /// its position kept; otherwise the line is appended. Returns an error,
    /// leaving the cart unchanged, if the quantity is zero or the resulting
    /// quantity would exceed the line's limit.
    pub fn add_item(&mut self, item: CartItem) -> Result<(), CommerceError> {
        if item.quantity == 0 {
            return Err(CommerceError::InvalidQuantity(0));
        }
        if item.unit_price.is_negative() {
            return Err(CommerceError::InvalidPrice(item.product_id));
        }

        if let Some(existing) = self
            .items
            .iter_mut()
            .find(|i| i.product_id == item.product_id)
        {
            // Newer stock information wins
            let max_quantity = item.max_quantity.or(existing.max_quantity);
            let limit = self.limits.limit_for(max_quantity);
            let new_quantity = existing.quantity.saturating_add(item.quantity);
            if new_quantity > limit {
                return Err(CommerceError::QuantityExceedsLimit {
                    product_id: item.product_id,
                    requested: i64::from(new_quantity),
                    limit,
                });
            }

            existing.quantity = new_quantity;
            existing.max_quantity = max_quantity;
        } else {
            let limit = self.limits.limit_for(item.max_quantity);
            if item.quantity > limit {
                return Err(CommerceError::QuantityExceedsLimit {
                    product_id: item.product_id,
                    requested: i64::from(item.quantity),
                    limit,
                });
            }
            self.items.push(item);
        }

        self.persist()
    }

    /// Remove a product's line. Returns false if it wasn't in the cart.
    pub fn remove_item(&mut self, product_id: &ProductId) -> Result<bool, CommerceError> {
        let len_before = self.items.len();
        self.items.retain(|i| &i.product_id != product_id);
        if self.items.len() == len_before {
            return Ok(false);
        }
        self.persist()?;
        Ok(true)
    }

    /// Set a line's quantity.
    ///
    /// A quantity of zero or less removes the line. Returns false if the
    /// product isn't in the cart.
    pub fn update_quantity(
        &mut self,
        product_id: &ProductId,
        quantity: i64,
    ) -> Result<bool, CommerceError> {
        if quantity <= 0 {
            return self.remove_item(product_id);
        }

        let limits = self.limits;
        let Some(item) = self.items.iter_mut().find(|i| &i.product_id == product_id) else {
            return Ok(false);
        };

        let limit = limits.limit_for(item.max_quantity);
        let new_quantity = u32::try_from(quantity)
            .ok()
            .filter(|q| *q <= limit)
            .ok_or_else(|| CommerceError::QuantityExceedsLimit {
                product_id: product_id.clone(),
                requested: quantity,
                limit,
            })?;

        item.quantity = new_quantity;
        self.persist()?;
        Ok(true)
    }

    /// Empty the cart and persist the empty state.
    pub fn clear(&mut self) -> Result<(), CommerceError> {
        self.items.clear();
        self.persist()
    }

    /// Lines in insertion order.
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Get a line by product.
    pub fn get(&self, product_id: &ProductId) -> Option<&CartItem> {
        self.items.iter().find(|i| &i.product_id == product_id)
    }

    /// Number of distinct lines.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total copies across all lines.
    pub fn item_count(&self) -> u32 {
        item_count(&self.items)
    }

    /// Price the current contents.
    pub fn pricing(&self, policy: &PricingPolicy, user_type: UserType) -> PricingResult {
        policy.price(&self.items, user_type)
    }

    /// Limits this store enforces.
    pub fn limits(&self) -> CartLimits {
        self.limits
    }
}

/// Repair snapshots written by older versions or edited by hand: drop empty
/// and negatively priced lines, merge duplicate products into the first
/// occurrence, and clamp each line to its limit.
fn normalize(items: Vec<CartItem>, limits: CartLimits) -> Vec<CartItem> {
    let mut merged: Vec<CartItem> = Vec::with_capacity(items.len());
    for item in items {
        if item.quantity == 0 {
            continue;
        }
        if item.unit_price.is_negative() {
            tracing::warn!(product_id = %item.product_id, price = %item.unit_price, "dropping stored line with negative price");
            continue;
        }
        match merged.iter_mut().find(|i| i.product_id == item.product_id) {
            Some(existing) => {
                existing.quantity = existing.quantity.saturating_add(item.quantity);
            }
            None => merged.push(item),
        }
    }

    merged.retain_mut(|item| {
        let limit = limits.limit_for(item.max_quantity);
        if item.quantity > limit {
            tracing::warn!(
                product_id = %item.product_id,
                quantity = item.quantity,
                limit,
                "clamping stored line to its limit"
            );
            item.quantity = limit;
        }
        item.quantity > 0
    });
    merged
}
