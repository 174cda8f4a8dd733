//! Per-session storefront context.
//!
//! Owns everything one shopper's session needs: the durable cart, the local
//! order ledger, the checkout submitter and the backend handle.

use shelf_cache::Cache;
use shelf_core::StorefrontConfig;

use crate::api::{HttpStorefrontApi, StorefrontApi};
use crate::cart::{CartItem, CartLimits, CartStore, PricingPolicy, PricingResult};
use crate::catalog::{Book, CatalogQuery};
use crate::checkout::{CheckoutOutcome, CheckoutSubmitter, OrderLedger};
use crate::error::CommerceError;
use crate::ids::UserId;
use crate::orders::{load_order_history, OrderHistory};
use crate::session::{SessionUser, UserType};

/// A shopper's session against one backend.
pub struct Storefront<A: StorefrontApi> {
    api: A,
    cart: CartStore,
    ledger: OrderLedger,
    submitter: CheckoutSubmitter,
}

impl Storefront<HttpStorefrontApi> {
    /// Open a session from configuration: REST backend, file-backed storage.
    pub fn open(config: &StorefrontConfig) -> Result<Self, CommerceError> {
        let cache = Cache::open(&config.storage.dir)?;
        let api = HttpStorefrontApi::from_config(&config.api)?;
        tracing::debug!(
            base_url = %config.api.base_url,
            dir = %config.storage.dir.display(),
            "storefront opened"
        );
        Ok(Self::new(api, cache, config))
    }
}

impl<A: StorefrontApi> Storefront<A> {
    pub fn new(api: A, cache: Cache, config: &StorefrontConfig) -> Self {
        let policy = PricingPolicy::from_config(&config.pricing);
        Self {
            cart: CartStore::load(
                cache.clone(),
                config.storage.cart_key.clone(),
                CartLimits::from_config(&config.cart),
            ),
            ledger: OrderLedger::new(cache, config.storage.orders_key.clone()),
            submitter: CheckoutSubmitter::from_config(policy, &config.checkout),
            api,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn cart(&self) -> &CartStore {
        &self.cart
    }

    pub fn cart_mut(&mut self) -> &mut CartStore {
        &mut self.cart
    }

    pub fn ledger(&self) -> &OrderLedger {
        &self.ledger
    }

    pub fn policy(&self) -> &PricingPolicy {
        self.submitter.policy()
    }

    /// Price the current cart for a shopper of `user_type`.
    pub fn pricing(&self, user_type: UserType) -> PricingResult {
        self.cart.pricing(self.submitter.policy(), user_type)
    }

    /// Add `quantity` copies of `book`, capped by its current stock.
    pub fn add_book(&mut self, book: &Book, quantity: u32) -> Result<(), CommerceError> {
        let item = CartItem::from_book(book)?.with_quantity(quantity);
        self.cart.add_item(item)
    }

    /// Fetch the catalog and run it through `query`.
    pub async fn browse(&self, query: &CatalogQuery) -> Result<Vec<Book>, CommerceError> {
        let books = self.api.books().await?;
        Ok(query.apply(&books))
    }

    pub async fn checkout(&mut self, user: &SessionUser) -> Result<CheckoutOutcome, CommerceError> {
        self.submitter
            .submit(&self.api, user, &mut self.cart, &self.ledger)
            .await
    }

    pub async fn order_history(&self, user_id: &UserId) -> OrderHistory {
        load_order_history(&self.api, &self.ledger, user_id).await
    }
}
