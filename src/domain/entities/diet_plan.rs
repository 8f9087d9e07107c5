use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DietPlan {
    pub id: String,
    pub name: String,
    pub member_id: Option<String>,
    pub meals: Vec<Meal>,
    pub targets: NutritionTargets,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Meal {
    pub name: String,
    pub calories: u32,
    pub protein_grams: u32,
    pub carbs_grams: u32,
    pub fat_grams: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NutritionTargets {
    pub daily_calories: u32,
    pub protein_grams: u32,
    pub carbs_grams: u32,
    pub fat_grams: u32,
}

impl DietPlan {
    pub fn new(id: String, name: String, targets: NutritionTargets) -> Self {
        let now = Utc::now();
        Self {
            id,
            name,
            member_id: None,
            meals: Vec::new(),
            targets,
            created_at: now,
            updated_at: now,
        }
    }
}
