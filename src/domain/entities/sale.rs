use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: String,
    pub member_id: Option<String>,
    pub items: Vec<SaleItem>,
    pub totals: SaleTotals,
    pub sold_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SaleItem {
    pub product_id: String,
    pub quantity: u32,
    pub unit_price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SaleTotals {
    pub gross: f64,
    pub discount: f64,
    pub net: f64,
}

impl Sale {
    pub fn new(id: String, items: Vec<SaleItem>, totals: SaleTotals) -> Self {
        let now = Utc::now();
        Self {
            id,
            member_id: None,
            items,
            totals,
            sold_at: now,
            created_at: now,
            updated_at: now,
        }
    }
}
