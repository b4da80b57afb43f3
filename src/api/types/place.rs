use super::timestamp;
use crate::catalog::Category;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    pub id: Uuid,
    pub name: String,
    pub category: Category,
    #[serde(default)]
    pub promo_code: Option<String>,
    #[serde(default)]
    pub promo_code2: Option<String>,
    #[serde(default)]
    pub promo_url: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub has_logo: bool,
    #[serde(default, deserialize_with = "timestamp::deserialize_opt")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "timestamp::deserialize_opt")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "timestamp::deserialize_opt")]
    pub last_action_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub used_count: u32,
    #[serde(default, deserialize_with = "timestamp::deserialize_opt")]
    pub used_at: Option<DateTime<Utc>>,
}

impl Place {
    /// Promo details shown in the promo dialog; `None` when the place has neither
    /// a code nor a link.
    pub fn promo(&self) -> Option<Promo<'_>> {
        fn non_empty(v: &Option<String>) -> Option<&str> {
            v.as_deref().filter(|s| !s.trim().is_empty())
        }
        let promo = Promo {
            code: non_empty(&self.promo_code),
            extra_code: non_empty(&self.promo_code2),
            url: non_empty(&self.promo_url),
        };
        if promo.code.is_none() && promo.extra_code.is_none() && promo.url.is_none() {
            None
        } else {
            Some(promo)
        }
    }
}

#[derive(Debug, PartialEq)]
pub struct Promo<'a> {
    pub code: Option<&'a str>,
    pub extra_code: Option<&'a str>,
    pub url: Option<&'a str>,
}

/// Multipart form for POST/PUT /places.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaceForm {
    pub name: String,
    pub category: Category,
    pub promo_code: String,
    pub promo_code2: String,
    pub promo_url: String,
    pub comment: String,
    pub logo: Option<PathBuf>,
    pub remove_logo: bool,
}

impl PlaceForm {
    pub fn new(name: &str, category: Category) -> Self {
        Self {
            name: name.trim().to_string(),
            category,
            ..Default::default()
        }
    }
}

impl From<&Place> for PlaceForm {
    fn from(place: &Place) -> Self {
        Self {
            name: place.name.clone(),
            category: place.category,
            promo_code: place.promo_code.clone().unwrap_or_default(),
            promo_code2: place.promo_code2.clone().unwrap_or_default(),
            promo_url: place.promo_url.clone().unwrap_or_default(),
            comment: place.comment.clone().unwrap_or_default(),
            logo: None,
            remove_logo: false,
        }
    }
}

// Server-side list parameters for GET /places
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaceListSort {
    New,
    Old,
    #[default]
    Popular,
    Least,
}

impl PlaceListSort {
    pub const ALL: [PlaceListSort; 4] = [
        PlaceListSort::New,
        PlaceListSort::Old,
        PlaceListSort::Popular,
        PlaceListSort::Least,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            PlaceListSort::New => "new",
            PlaceListSort::Old => "old",
            PlaceListSort::Popular => "popular",
            PlaceListSort::Least => "least",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PlaceListSort::New => "Сначала новые",
            PlaceListSort::Old => "Сначала старые",
            PlaceListSort::Popular => "Наиболее используемые",
            PlaceListSort::Least => "Наименее используемые",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.key() == key)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaceFilter {
    pub category: Option<Category>,
    pub sort: PlaceListSort,
}

impl PlaceFilter {
    pub fn query(&self) -> Vec<(&'static str, String)> {
        let category = self.category.map(|c| c.label().to_string()).unwrap_or_default();
        vec![("category", category), ("sort", self.sort.key().to_string())]
    }
}
