//! Cart line items.

use serde::{Deserialize, Serialize};

use super::{Price, ProductId, Quantity};

/// A product as offered to the cart, before it has a quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCartItem {
    /// Catalog product identifier.
    pub id: ProductId,
    /// Display name.
    pub title: String,
    /// Product image reference.
    #[serde(alias = "imageUrl")]
    pub image_url: String,
    /// Unit price.
    pub price: Price,
}

impl NewCartItem {
    /// Turn the item into a cart line holding a single unit.
    #[must_use]
    pub fn into_entry(self) -> CartEntry {
        CartEntry {
            id: self.id,
            title: self.title,
            image_url: self.image_url,
            price: self.price,
            quantity: Quantity::ONE,
        }
    }
}

/// One line of the cart.
///
/// Serialized field names are part of the persisted format and are shared
/// with other clients of the same storage key. `imageUrl` is accepted when
/// reading for compatibility with camel-cased writers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartEntry {
    /// Catalog product identifier. Unique within a cart.
    pub id: ProductId,
    /// Display name.
    pub title: String,
    /// Product image reference.
    #[serde(alias = "imageUrl")]
    pub image_url: String,
    /// Unit price.
    pub price: Price,
    /// Units of this product in the cart.
    pub quantity: Quantity,
}

impl CartEntry {
    /// Price of the whole line.
    #[must_use]
    pub fn line_price(&self) -> Price {
        self.price.times(self.quantity)
    }
}

/// Totals over a cart's lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CartSummary {
    /// Sum of all line quantities.
    pub item_count: u64,
    /// Sum of all line prices.
    pub subtotal: Price,
}

impl CartSummary {
    /// Compute the summary of a list of cart lines.
    #[must_use]
    pub fn from_entries(entries: &[CartEntry]) -> Self {
        Self {
            item_count: entries.iter().map(|e| u64::from(e.quantity.get())).sum(),
            subtotal: entries.iter().map(CartEntry::line_price).sum(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn shirt() -> NewCartItem {
        NewCartItem {
            id: ProductId::new("p1"),
            title: "Shirt".to_string(),
            image_url: "u".to_string(),
            price: Price::from_cents(1000),
        }
    }

    #[test]
    fn test_into_entry_starts_at_one() {
        let entry = shirt().into_entry();
        assert_eq!(entry.quantity, Quantity::ONE);
        assert_eq!(entry.id.as_str(), "p1");
        assert_eq!(entry.title, "Shirt");
        assert_eq!(entry.image_url, "u");
        assert_eq!(entry.price, Price::from_cents(1000));
    }

    #[test]
    fn test_entry_wire_format() {
        let json = r#"{"id":"p1","title":"Shirt","image_url":"u","price":10,"quantity":2}"#;
        let entry: CartEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.quantity.get(), 2);
        assert_eq!(entry.price, Price::from_cents(1000));

        let value = serde_json::to_value(&entry).unwrap();
        let keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys.len(), 5);
        assert!(keys.contains(&"image_url"));
    }

    #[test]
    fn test_entry_accepts_camel_case_image_url() {
        let json = r#"{"id":"p1","title":"Shirt","imageUrl":"u","price":10,"quantity":1}"#;
        let entry: CartEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.image_url, "u");
    }

    #[test]
    fn test_entry_rejects_zero_quantity() {
        let json = r#"{"id":"p1","title":"Shirt","image_url":"u","price":10,"quantity":0}"#;
        assert!(serde_json::from_str::<CartEntry>(json).is_err());
    }

    #[test]
    fn test_summary() {
        let mut a = shirt().into_entry();
        a.quantity = Quantity::new(2).unwrap();
        let mut b = shirt().into_entry();
        b.id = ProductId::new("p2");
        b.price = Price::from_cents(250);

        let summary = CartSummary::from_entries(&[a, b]);
        assert_eq!(summary.item_count, 3);
        assert_eq!(summary.subtotal, Price::from_cents(2250));
    }

    #[test]
    fn test_summary_empty() {
        assert_eq!(CartSummary::from_entries(&[]), CartSummary::default());
    }
}
