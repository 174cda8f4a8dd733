//! Cart pricing calculations.
//!
//! Every function here is pure: it reads the cart lines and returns a value,
//! and summing in any order gives the same result.

use crate::cart::CartItem;
use crate::money::{Currency, Money};
use crate::session::UserType;
use serde::{Deserialize, Serialize};
use shelf_core::PricingConfig;

/// Discount and shipping rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingPolicy {
    /// Student discount for customer accounts, in percent.
    pub student_discount_percent: u32,
    /// Discounted total at or above which shipping is free.
    pub free_shipping_threshold: Money,
    /// Shipping charged below the threshold.
    pub flat_shipping: Money,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            student_discount_percent: 5,
            free_shipping_threshold: Money::rand(50_000),
            flat_shipping: Money::rand(5_000),
        }
    }
}

impl PricingPolicy {
    /// Build a policy from the `[pricing]` configuration section.
    pub fn from_config(config: &PricingConfig) -> Self {
        Self {
            student_discount_percent: config.student_discount_percent,
            free_shipping_threshold: Money::from_decimal(
                config.free_shipping_threshold,
                Currency::default(),
            ),
            flat_shipping: Money::from_decimal(config.flat_shipping, Currency::default()),
        }
    }

    fn currency(&self) -> Currency {
        self.flat_shipping.currency
    }

    /// Sum of unit price times quantity over all lines.
    pub fn subtotal(&self, items: &[CartItem]) -> Money {
        let cents = items
            .iter()
            .map(|i| i.line_total().amount_cents)
            .fold(0i64, i64::saturating_add);
        Money::new(cents, self.currency())
    }

    /// Student discount, computed per line and summed.
    ///
    /// Rounding happens on each line, so this can differ from a percentage
    /// of the subtotal by a cent per line.
    pub fn student_discount(&self, items: &[CartItem]) -> Money {
        let cents = items
            .iter()
            .map(|i| i.line_total().percentage(self.student_discount_percent).amount_cents)
            .fold(0i64, i64::saturating_add);
        Money::new(cents, self.currency())
    }

    /// Discount that applies to `user_type`.
    pub fn discount(&self, items: &[CartItem], user_type: UserType) -> Money {
        if user_type.is_discount_eligible() {
            self.student_discount(items)
        } else {
            Money::zero(self.currency())
        }
    }

    /// Subtotal minus the applicable discount.
    pub fn discounted_total(&self, items: &[CartItem], user_type: UserType) -> Money {
        let subtotal = self.subtotal(items).amount_cents;
        let discount = self.discount(items, user_type).amount_cents;
        Money::new(subtotal.saturating_sub(discount), self.currency())
    }

    /// Free at or above the threshold, flat rate below it.
    pub fn shipping_cost(&self, items: &[CartItem], user_type: UserType) -> Money {
        self.shipping_for(self.discounted_total(items, user_type))
    }

    fn shipping_for(&self, discounted_total: Money) -> Money {
        if discounted_total.amount_cents >= self.free_shipping_threshold.amount_cents {
            Money::zero(self.currency())
        } else {
            self.flat_shipping
        }
    }

    /// Discounted total plus shipping.
    pub fn final_total(&self, items: &[CartItem], user_type: UserType) -> Money {
        self.price(items, user_type).final_total
    }

    /// Full pricing breakdown.
    pub fn price(&self, items: &[CartItem], user_type: UserType) -> PricingResult {
        let subtotal = self.subtotal(items);
        let discount_amount = self.discount(items, user_type);
        let discounted_total = Money::new(
            subtotal.amount_cents.saturating_sub(discount_amount.amount_cents),
            self.currency(),
        );
        let shipping_cost = self.shipping_for(discounted_total);
        let final_total = Money::new(
            discounted_total
                .amount_cents
                .saturating_add(shipping_cost.amount_cents),
            self.currency(),
        );

        PricingResult {
            subtotal,
            discount_amount,
            discounted_total,
            shipping_cost,
            final_total,
            item_count: item_count(items),
        }
    }
}

/// Sum of quantities over all lines.
pub fn item_count(items: &[CartItem]) -> u32 {
    items.iter().map(|i| i.quantity).fold(0u32, u32::saturating_add)
}

/// Complete pricing breakdown for a cart. Derived, never stored.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PricingResult {
    /// Subtotal before discounts.
    pub subtotal: Money,
    /// Student discount (zero for non-customers).
    pub discount_amount: Money,
    /// Subtotal minus discount.
    pub discounted_total: Money,
    /// Shipping cost.
    pub shipping_cost: Money,
    /// Final total (discounted total + shipping).
    pub final_total: Money,
    /// Number of copies across all lines.
    pub item_count: u32,
}

impl PricingResult {
    /// Check if any discount is applied.
    pub fn has_discount(&self) -> bool {
        self.discount_amount.is_positive()
    }

    /// Check if shipping is free.
    pub fn free_shipping(&self) -> bool {
        self.shipping_cost.is_zero()
    }
}
