use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// The closed set of entity tables this subsystem mirrors. Every variant has
/// a field translation defined in both directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityTable {
    Members,
    Courses,
    DietPlans,
    Products,
    Sales,
}

impl EntityTable {
    pub const ALL: [EntityTable; 5] = [
        EntityTable::Members,
        EntityTable::Courses,
        EntityTable::DietPlans,
        EntityTable::Products,
        EntityTable::Sales,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityTable::Members => "members",
            EntityTable::Courses => "courses",
            EntityTable::DietPlans => "diet_plans",
            EntityTable::Products => "products",
            EntityTable::Sales => "sales",
        }
    }
}

impl fmt::Display for EntityTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityTable {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "members" => Ok(EntityTable::Members),
            "courses" => Ok(EntityTable::Courses),
            "diet_plans" => Ok(EntityTable::DietPlans),
            "products" => Ok(EntityTable::Products),
            "sales" => Ok(EntityTable::Sales),
            other => Err(format!("Unknown entity table: {other}")),
        }
    }
}
