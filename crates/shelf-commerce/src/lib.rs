//! Bookstore storefront domain for Shelf.
//!
//! This crate provides the client-side commerce logic of the storefront:
//!
//! - **Catalog**: Books, genre filter, search and sort
//! - **Cart**: Durable cart store, quantity limits, pricing with student
//!   discount and shipping
//! - **Checkout**: Order submission with a local fallback ledger when the
//!   backend is unreachable
//! - **Orders**: Order history reconciled between the backend and the ledger
//!
//! # Example
//!
//! ```rust,ignore
//! use shelf_commerce::prelude::*;
//! use shelf_core::StorefrontConfig;
//!
//! let config = StorefrontConfig::load("shelf.toml")?;
//! let mut store = Storefront::open(&config)?;
//!
//! // Browse and add to cart
//! let books = store.browse(&CatalogQuery::new().with_search("calculus")).await?;
//! store.add_book(&books[0], 1)?;
//!
//! // Check out
//! let user = SessionUser::new("12", UserType::Customer).with_shipping_address("Res 4");
//! match store.checkout(&user).await? {
//!     CheckoutOutcome::Rejected { message } => println!("{message}"),
//!     outcome => println!("placed: {}", outcome.is_placed()),
//! }
//! ```

pub mod api;
pub mod error;
pub mod ids;
pub mod money;
pub mod session;

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod orders;
pub mod storefront;

#[cfg(test)]
mod testing;

pub use error::CommerceError;
pub use ids::*;
pub use money::{Currency, Money};
pub use storefront::Storefront;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::CommerceError;
    pub use crate::ids::*;
    pub use crate::money::{Currency, Money};
    pub use crate::session::{SessionUser, UserType};
    pub use crate::storefront::Storefront;

    // Backend
    pub use crate::api::{HttpStorefrontApi, StorefrontApi, SubmissionResult};

    // Catalog
    pub use crate::catalog::{Book, CatalogQuery, SortOption, GENRES};

    // Cart
    pub use crate::cart::{CartItem, CartLimits, CartStore, PricingPolicy, PricingResult};

    // Checkout
    pub use crate::checkout::{
        CheckoutOutcome, CheckoutSubmitter, OrderLedger, OrderPayload, OrderRecord, OrderStatus,
        View,
    };

    // Orders
    pub use crate::orders::{
        load_order_history, HistoryEntry, HistorySource, OrderHistory, RemoteOrder,
    };
}
