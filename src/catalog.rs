//! Catalog of purchasable items.
//!
//! The catalog is a fixed, in-memory table built once at startup and never
//! mutated afterwards. Insertion order is presentation order and is
//! user-visible, so `list_all` must be stable for the process lifetime.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Exact fixed-point currency amount stored as integer minor units (paise).
///
/// Prices are never represented as floating point; a value like 100.00 must
/// render as "100.00", not pick up binary-representation artifacts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    minor: i64,
}

impl Price {
    pub const fn from_minor(minor: i64) -> Self {
        Self { minor }
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.minor < 0 { "-" } else { "" };
        let minor = self.minor.unsigned_abs();
        write!(f, "{sign}{}.{:02}", minor / 100, minor % 100)
    }
}

/// A single offerable item with its display metadata.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub name: String,
    pub price: Price,
    pub description: String,
    pub features: Vec<String>,
}

/// Immutable item table. Lookup by id or iteration in insertion order.
#[derive(Clone, Debug)]
pub struct Catalog {
    items: Vec<Item>,
}

impl Catalog {
    pub fn new(items: Vec<Item>) -> Self {
        Self { items }
    }

    /// The fixed set of groups offered by this bot.
    pub fn standard() -> Self {
        Self::new(vec![
            Item {
                id: "course_a".to_string(),
                name: "Ordinary Group".to_string(),
                price: Price::from_minor(30_00),
                description: "Get Leaked content, daily updates ✅".to_string(),
                features: vec![
                    "Basic content access".to_string(),
                    "Daily updates".to_string(),
                ],
            },
            Item {
                id: "course_b".to_string(),
                name: "Standard Group".to_string(),
                price: Price::from_minor(50_00),
                description: "Get premium content, daily updates ✅".to_string(),
                features: vec![
                    "Premium content access".to_string(),
                    "Daily updates".to_string(),
                    "Priority support".to_string(),
                ],
            },
            Item {
                id: "course_c".to_string(),
                name: "Premium Group 👑".to_string(),
                price: Price::from_minor(100_00),
                description: "Get unlimited premium content, daily updates ✅".to_string(),
                features: vec![
                    "Unlimited content access".to_string(),
                    "Daily updates".to_string(),
                    "24/7 support".to_string(),
                    "Exclusive materials".to_string(),
                ],
            },
        ])
    }

    /// Look up an item by its stable id. `None` means NotFound.
    pub fn get(&self, id: &str) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    /// All items in insertion order.
    pub fn list_all(&self) -> &[Item] {
        &self.items
    }
}
