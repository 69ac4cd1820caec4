// Wire model for the inventory service.
//
// The JSON shape is shared by the CRUD API and the live channel: both
// carry the same product records, camelCase on the wire.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single product record.
///
/// `id` is unique within a snapshot. The client may submit an id on
/// create, but the server is authoritative and validates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
    pub brand: String,
    pub category: String,
    pub quantity: i64,
    pub price: f64,

    /// Server-assigned; absent on create payloads.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    /// Server-assigned; absent on create payloads.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_full_record() {
        let json = r#"{
            "id": 7,
            "brand": "Acme",
            "category": "tools",
            "quantity": 3,
            "price": 19.5,
            "createdAt": "2026-01-05T09:00:00Z",
            "updatedAt": "2026-01-06T10:30:00Z"
        }"#;

        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.id, 7);
        assert_eq!(product.brand, "Acme");
        assert_eq!(product.category, "tools");
        assert_eq!(product.quantity, 3);
        assert!((product.price - 19.5).abs() < f64::EPSILON);
        assert!(product.created_at.is_some());
        assert!(product.updated_at.is_some());
    }

    #[test]
    fn deserialize_without_timestamps() {
        let json = r#"{"id":1,"brand":"A","category":"C","quantity":5,"price":10}"#;

        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.quantity, 5);
        assert!(product.created_at.is_none());
    }

    #[test]
    fn serialize_skips_absent_timestamps() {
        let product = Product {
            id: 1,
            brand: "A".into(),
            category: "C".into(),
            quantity: 5,
            price: 10.0,
            created_at: None,
            updated_at: None,
        };

        let json = serde_json::to_value(&product).unwrap();
        assert!(json.get("createdAt").is_none());
        assert!(json.get("updatedAt").is_none());
        assert_eq!(json["brand"], "A");
    }
}
