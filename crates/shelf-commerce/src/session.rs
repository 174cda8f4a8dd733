//! Signed-in user identity as seen by the cart and checkout.

use serde::{Deserialize, Serialize};

use crate::ids::UserId;

/// Kind of account, which decides discount eligibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum UserType {
    /// A student customer; gets the student discount.
    #[default]
    Customer,
    /// Store administrator.
    Admin,
    /// Anyone else, including unknown account kinds.
    Guest,
}

impl UserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::Customer => "customer",
            UserType::Admin => "admin",
            UserType::Guest => "guest",
        }
    }

    /// Only customers receive the student discount.
    pub fn is_discount_eligible(&self) -> bool {
        matches!(self, UserType::Customer)
    }
}

impl From<String> for UserType {
    fn from(s: String) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "customer" => UserType::Customer,
            "admin" => UserType::Admin,
            _ => UserType::Guest,
        }
    }
}

/// The user a checkout or order history request is made for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub user_id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub user_type: UserType,
    /// Delivery address from the user's contact details.
    #[serde(default)]
    pub shipping_address: String,
}

impl SessionUser {
    /// Create a session user with no email or address.
    pub fn new(user_id: impl Into<UserId>, user_type: UserType) -> Self {
        Self {
            user_id: user_id.into(),
            email: None,
            user_type,
            shipping_address: String::new(),
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_shipping_address(mut self, address: impl Into<String>) -> Self {
        self.shipping_address = address.into();
        self
    }
}
