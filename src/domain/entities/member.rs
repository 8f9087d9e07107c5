use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Gym member as stored locally. Contact and membership details are grouped;
/// the remote row flattens them (see the remote translation layer).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: String,
    pub profile: MemberProfile,
    pub membership: Membership,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MemberProfile {
    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    pub plan: String,
    pub started_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub active: bool,
}

impl Member {
    pub fn new(id: String, profile: MemberProfile, membership: Membership) -> Self {
        let now = Utc::now();
        Self {
            id,
            profile,
            membership,
            created_at: now,
            updated_at: now,
        }
    }
}
