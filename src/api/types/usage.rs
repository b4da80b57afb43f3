use super::timestamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Counterparts of a Number (Places) or of a Place (Numbers), split by usage.
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UsageResponse<T> {
    #[serde(default = "Vec::new")]
    pub used: Vec<T>,
    #[serde(default = "Vec::new")]
    pub unused: Vec<T>,
    #[serde(default, deserialize_with = "timestamp::deserialize_opt")]
    pub last_event_at: Option<DateTime<Utc>>,
}

// Body of POST /usage
#[derive(Debug, Serialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UsageSet {
    pub number_id: Uuid,
    pub place_id: Uuid,
    pub used: bool,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Ack {
    #[serde(default)]
    pub ok: bool,
}
