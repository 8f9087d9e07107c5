use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub schedule: CourseSchedule,
    pub coach: Option<String>,
    pub capacity: u32,
    pub price: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CourseSchedule {
    pub weekdays: Vec<String>,
    pub start_time: String,
    pub duration_minutes: u32,
}

impl Course {
    pub fn new(id: String, title: String, schedule: CourseSchedule) -> Self {
        let now = Utc::now();
        Self {
            id,
            title,
            description: None,
            schedule,
            coach: None,
            capacity: 0,
            price: 0.0,
            created_at: now,
            updated_at: now,
        }
    }
}
