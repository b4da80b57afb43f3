use super::timestamp;
use crate::catalog::OperatorKey;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PhoneNumber {
    pub id: Uuid,
    pub phone: String,
    pub operator_key: OperatorKey,
    #[serde(default, deserialize_with = "timestamp::deserialize_opt")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "timestamp::deserialize_opt")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "timestamp::deserialize_opt")]
    pub last_action_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub used_count: u32,
    // Only present inside usage lists
    #[serde(default, deserialize_with = "timestamp::deserialize_opt")]
    pub used_at: Option<DateTime<Utc>>,
}

// Body of POST/PUT /numbers
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NumberForm {
    pub phone: String,
    pub operator_key: OperatorKey,
}

impl NumberForm {
    pub fn new(phone: &str, operator_key: OperatorKey) -> Self {
        Self {
            phone: crate::phone::format_ru_phone(phone),
            operator_key,
        }
    }

    // Re-formats the phone on every edit
    pub fn set_phone(&mut self, raw: &str) {
        self.phone = crate::phone::format_ru_phone(raw);
    }
}

impl From<&PhoneNumber> for NumberForm {
    fn from(number: &PhoneNumber) -> Self {
        Self {
            phone: number.phone.clone(),
            operator_key: number.operator_key,
        }
    }
}
