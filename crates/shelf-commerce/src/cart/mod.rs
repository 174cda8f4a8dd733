//! Shopping cart module.
//!
//! Contains the cart line type, the durable cart store and the pricing
//! engine.

mod item;
mod pricing;
mod store;

pub use item::CartItem;
pub use pricing::{item_count, PricingPolicy, PricingResult};
pub use store::{CartLimits, CartStore};
