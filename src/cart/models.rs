//! Shopping Cart Domain Models
//!
//! This module contains the data structures shared by the cart controller,
//! the local store and the remote collection API.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use thiserror::Error;

// =============================================================================
// Identifiers
// =============================================================================

/// Identifier of an adoptable cat in the catalog.
///
/// Collection backends hand out either numeric ids or opaque strings, so the
/// id keeps whichever JSON form it arrived in and serializes back the same
/// way. A numeric string and the equal number name the same cat, since both
/// address the same `/cart/{id}` resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CatId {
    Number(i64),
    Text(String),
}

impl CatId {
    /// Create a numeric ID.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self::Number(id)
    }

    /// The numeric value, if this id is a number or a numeric string.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.parse().ok(),
        }
    }
}

impl PartialEq for CatId {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Number(n), Self::Text(s)) | (Self::Text(s), Self::Number(n)) => {
                *s == n.to_string()
            }
        }
    }
}

impl Eq for CatId {}

impl Hash for CatId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Must agree with `eq`: hash the textual form.
        match self {
            Self::Number(n) => n.to_string().hash(state),
            Self::Text(s) => s.hash(state),
        }
    }
}

impl fmt::Display for CatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => fmt::Display::fmt(n, f),
            Self::Text(s) => f.pad(s),
        }
    }
}

impl From<i64> for CatId {
    fn from(id: i64) -> Self {
        Self::Number(id)
    }
}

impl From<&str> for CatId {
    fn from(id: &str) -> Self {
        Self::Text(id.to_string())
    }
}

impl From<String> for CatId {
    fn from(id: String) -> Self {
        Self::Text(id)
    }
}

/// A blank string is not a usable cat id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cat id must not be blank")]
pub struct BlankCatId;

impl std::str::FromStr for CatId {
    type Err = BlankCatId;

    /// Integers become [`CatId::Number`], anything else [`CatId::Text`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(BlankCatId);
        }
        Ok(s.parse::<i64>()
            .map(Self::Number)
            .unwrap_or_else(|_| Self::Text(s.to_string())))
    }
}

// =============================================================================
// Catalog and Cart Models
// =============================================================================

/// Returns the default quantity (1) for cart lines
fn default_quantity() -> u32 {
    1
}

/// An adoptable cat as listed in the catalog. Never mutated by the cart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogItem {
    pub id: CatId,
    pub name: String,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub price: Decimal,
}

/// One entry in the cart. At most one line exists per catalog id and its
/// quantity is always at least 1.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartLine {
    /// Catalog id this line refers to
    pub id: CatId,

    /// Name copied from the catalog when the line was created
    pub name: String,

    /// Unit price copied from the catalog when the line was created
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub price: Decimal,

    /// Quantity of this line (defaults to 1)
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

impl CartLine {
    /// Starts a new line for `item` with quantity 1.
    pub fn from_catalog(item: &CatalogItem) -> Self {
        Self {
            id: item.id.clone(),
            name: item.name.clone(),
            price: item.price,
            quantity: 1,
        }
    }

    /// Price of the line, `price * quantity`, saturating at the largest
    /// representable amount.
    pub fn subtotal(&self) -> Decimal {
        let bound = if self.price.is_sign_negative() {
            Decimal::MIN
        } else {
            Decimal::MAX
        };
        self.price
            .checked_mul(Decimal::from(self.quantity))
            .unwrap_or(bound)
    }
}

/// Body of `PATCH /cart/{id}`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuantityPatch {
    pub quantity: u32,
}

// =============================================================================
// Operation Outcomes
// =============================================================================

/// What a cart mutation ended up doing.
///
/// Mutations never fail towards the caller; remote errors are logged and
/// turned into one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    /// Applied locally; no remote store is configured
    Applied,
    /// Applied locally and confirmed by the remote store
    Synced,
    /// The remote store rejected the change and the local mutation was undone
    RolledBack,
    /// The catalog item or cart line did not exist; nothing changed
    NotFound,
    /// The user declined the confirmation gate; nothing changed
    Declined,
}

/// Result of reconciling the local cart against the remote snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadCartOutcome {
    /// The remote snapshot replaced the local cart; holds its line count
    Replaced(usize),
    /// The remote snapshot was empty so the local cart was kept
    KeptLocal,
    /// No remote store is configured
    LocalOnly,
    /// The remote call failed so the local cart was kept
    Failed,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn cat_id_keeps_the_form_it_arrived_in() {
        let from_number: CatId = serde_json::from_value(json!(7)).unwrap();
        let from_text: CatId = serde_json::from_value(json!("a1b2")).unwrap();
        assert_eq!(from_number, CatId::Number(7));
        assert_eq!(from_text, CatId::Text("a1b2".into()));
        assert_eq!(serde_json::to_value(&from_number).unwrap(), json!(7));
        assert_eq!(serde_json::to_value(&from_text).unwrap(), json!("a1b2"));
    }

    #[test]
    fn numeric_string_and_number_name_the_same_cat() {
        use std::collections::hash_map::DefaultHasher;

        let hash = |id: &CatId| {
            let mut hasher = DefaultHasher::new();
            id.hash(&mut hasher);
            hasher.finish()
        };
        let text = CatId::from("7");
        assert_eq!(text, CatId::new(7));
        assert_eq!(hash(&text), hash(&CatId::new(7)));
        assert_ne!(CatId::from("07"), CatId::new(7));
        assert_eq!(text.as_i64(), Some(7));
        assert_eq!(CatId::from("tabby").as_i64(), None);
    }

    #[test]
    fn cat_id_parses_numbers_and_text() {
        assert_eq!("12".parse::<CatId>(), Ok(CatId::Number(12)));
        assert_eq!(" a1b2 ".parse::<CatId>(), Ok(CatId::Text("a1b2".into())));
        assert_eq!("  ".parse::<CatId>(), Err(BlankCatId));
        assert_eq!(format!("{:>4}", CatId::from("ab")), "  ab");
    }

    #[test]
    fn string_id_catalog_decodes() {
        let items: Vec<CatalogItem> =
            serde_json::from_value(json!([{ "id": "a1b2", "name": "Mochi", "price": 19.5 }]))
                .unwrap();
        assert_eq!(items[0].id, CatId::from("a1b2"));
    }

    #[test]
    fn cart_line_serializes_price_as_number() {
        let line = CartLine {
            id: CatId::new(3),
            name: "Mochi".into(),
            price: Decimal::new(195, 1),
            quantity: 2,
        };
        let value = serde_json::to_value(&line).unwrap();
        assert_eq!(
            value,
            json!({ "id": 3, "name": "Mochi", "price": 19.5, "quantity": 2 })
        );
    }

    #[test]
    fn cart_line_defaults_missing_quantity_to_one() {
        let line: CartLine =
            serde_json::from_value(json!({ "id": 1, "name": "Tofu", "price": "12.00" })).unwrap();
        assert_eq!(line.quantity, 1);
        assert_eq!(line.price, Decimal::new(1200, 2));
    }

    #[test]
    fn subtotal_saturates_instead_of_overflowing() {
        let line = CartLine {
            id: CatId::new(1),
            name: "Tofu".into(),
            price: Decimal::new(50_000_000_000_000_000, 0) * Decimal::from(1000),
            quantity: u32::MAX,
        };
        assert_eq!(line.subtotal(), Decimal::MAX);
    }

    #[test]
    fn subtotal_multiplies_price_by_quantity() {
        let line = CartLine {
            id: CatId::new(1),
            name: "Tofu".into(),
            price: Decimal::new(195, 1),
            quantity: 2,
        };
        assert_eq!(line.subtotal(), Decimal::new(39, 0));
    }
}
