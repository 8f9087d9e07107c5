use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub category: Option<String>,
    pub pricing: ProductPricing,
    pub stock: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductPricing {
    pub unit_price: f64,
    pub member_discount: f64,
}

impl Product {
    pub fn new(id: String, name: String, pricing: ProductPricing) -> Self {
        let now = Utc::now();
        Self {
            id,
            name,
            category: None,
            pricing,
            stock: 0,
            created_at: now,
            updated_at: now,
        }
    }
}
