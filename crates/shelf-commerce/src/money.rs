//! Money type for representing monetary values.
//!
//! Uses cents-based integer representation to avoid floating-point
//! precision issues. The backend and the persisted snapshots speak decimal
//! numbers (`599.99`); [`decimal`] converts at the serde boundary.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Currency of an amount. The storefront trades in rand only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Currency {
    #[default]
    ZAR,
}

impl Currency {
    /// Get the currency symbol (e.g., "R").
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::ZAR => "R",
        }
    }

    /// Get the number of decimal places for this currency.
    pub fn decimal_places(&self) -> u32 {
        2
    }
}

/// A monetary value with currency.
///
/// Amounts are stored in the smallest unit of the currency (cents).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Money {
    /// Amount in smallest currency unit (e.g., cents).
    pub amount_cents: i64,
    /// The currency.
    pub currency: Currency,
}

impl Money {
    /// Create a new Money value from cents.
    pub fn new(amount_cents: i64, currency: Currency) -> Self {
        Self {
            amount_cents,
            currency,
        }
    }

    /// Create a rand amount from cents.
    pub fn rand(amount_cents: i64) -> Self {
        Self::new(amount_cents, Currency::ZAR)
    }

    /// Create a Money value from a decimal amount.
    ///
    /// ```
    /// use shelf_commerce::money::{Money, Currency};
    /// let price = Money::from_decimal(599.99, Currency::ZAR);
    /// assert_eq!(price.amount_cents, 59999);
    /// ```
    pub fn from_decimal(amount: f64, currency: Currency) -> Self {
        let multiplier = 10_i64.pow(currency.decimal_places());
        let amount_cents = (amount * multiplier as f64).round() as i64;
        Self::new(amount_cents, currency)
    }

    /// Create a zero amount in the given currency.
    pub fn zero(currency: Currency) -> Self {
        Self::new(0, currency)
    }

    /// Check if this is zero.
    pub fn is_zero(&self) -> bool {
        self.amount_cents == 0
    }

    /// Check if this is positive.
    pub fn is_positive(&self) -> bool {
        self.amount_cents > 0
    }

    /// Check if this is negative.
    pub fn is_negative(&self) -> bool {
        self.amount_cents < 0
    }

    /// Convert to a decimal value.
    pub fn to_decimal(&self) -> f64 {
        let divisor = 10_i64.pow(self.currency.decimal_places());
        self.amount_cents as f64 / divisor as f64
    }

    /// Format as a display string (e.g., "R599.99").
    pub fn display(&self) -> String {
        let places = self.currency.decimal_places() as usize;
        format!("{}{:.places$}", self.currency.symbol(), self.to_decimal())
    }

    /// Calculate `percent`% of this amount, rounding half away from zero.
    pub fn percentage(&self, percent: u32) -> Money {
        let scaled = self.amount_cents.saturating_mul(i64::from(percent));
        let rounded = if scaled >= 0 {
            scaled.saturating_add(50) / 100
        } else {
            scaled.saturating_sub(50) / 100
        };
        Money::new(rounded, self.currency)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

/// Serde adapter that writes [`Money`] as a bare decimal number in the
/// default currency.
///
/// ```rust,ignore
/// #[serde(with = "crate::money::decimal")]
/// pub price: Money,
/// ```
pub mod decimal {
    use super::{Currency, Money};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(money: &Money, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(money.to_decimal())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Money, D::Error> {
        let amount = f64::deserialize(deserializer)?;
        Ok(Money::from_decimal(amount, Currency::default()))
    }

    /// Same as the parent module, for optional amounts.
    pub mod option {
        use super::{Currency, Money};
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            money: &Option<Money>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match money {
                Some(m) => serializer.serialize_some(&m.to_decimal()),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<Money>, D::Error> {
            let amount = Option::<f64>::deserialize(deserializer)?;
            Ok(amount.map(|a| Money::from_decimal(a, Currency::default())))
        }
    }
}
