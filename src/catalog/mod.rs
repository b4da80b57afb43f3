use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum CatalogError {
    #[error("Unknown operator: {0}")]
    UnknownOperator(String),
    #[error("Category is not allowed: {0}")]
    UnknownCategory(String),
}

/// Mobile carriers known to the client. Mirrors the server's operator keys and
/// serves as the fallback catalog when `/operators` is unavailable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OperatorKey {
    Megafon,
    Beeline,
    #[default]
    Mts,
    T2,
    T,
    Sber,
    Alfa,
    Gazprom,
    Yota,
    Motiv,
    Rt,
}

impl OperatorKey {
    pub const ALL: [OperatorKey; 11] = [
        OperatorKey::Megafon,
        OperatorKey::Beeline,
        OperatorKey::Mts,
        OperatorKey::T2,
        OperatorKey::T,
        OperatorKey::Sber,
        OperatorKey::Alfa,
        OperatorKey::Gazprom,
        OperatorKey::Yota,
        OperatorKey::Motiv,
        OperatorKey::Rt,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            OperatorKey::Megafon => "megafon",
            OperatorKey::Beeline => "beeline",
            OperatorKey::Mts => "mts",
            OperatorKey::T2 => "t2",
            OperatorKey::T => "t",
            OperatorKey::Sber => "sber",
            OperatorKey::Alfa => "alfa",
            OperatorKey::Gazprom => "gazprom",
            OperatorKey::Yota => "yota",
            OperatorKey::Motiv => "motiv",
            OperatorKey::Rt => "rt",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            OperatorKey::Megafon => "МегаФон",
            OperatorKey::Beeline => "Билайн",
            OperatorKey::Mts => "МТС",
            OperatorKey::T2 => "T2",
            OperatorKey::T => "T-Mobile",
            OperatorKey::Sber => "СБЕР-Mobile",
            OperatorKey::Alfa => "Альфа-Mobile",
            OperatorKey::Gazprom => "Газпром-Mobile",
            OperatorKey::Yota => "YOTA",
            OperatorKey::Motiv => "Мотив",
            OperatorKey::Rt => "Ростелеком",
        }
    }

    // Bundled icon, relative to the web root
    pub fn icon_path(&self) -> String {
        let file = match self {
            OperatorKey::T => "tmobile",
            other => other.key(),
        };
        format!("/operators/{}.png", file)
    }
}

impl fmt::Display for OperatorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for OperatorKey {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        OperatorKey::ALL
            .into_iter()
            .find(|op| op.key() == needle)
            .ok_or_else(|| CatalogError::UnknownOperator(s.to_string()))
    }
}

/// Place categories. The wire value is the Russian label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Category {
    #[default]
    #[serde(rename = "Магазины")]
    Shops,
    #[serde(rename = "Аптеки")]
    Pharmacies,
    #[serde(rename = "Заправки")]
    GasStations,
    #[serde(rename = "Соц. сети")]
    SocialNetworks,
    #[serde(rename = "CashBack")]
    CashBack,
    #[serde(rename = "Прочее")]
    Other,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Shops,
        Category::Pharmacies,
        Category::GasStations,
        Category::SocialNetworks,
        Category::CashBack,
        Category::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Category::Shops => "Магазины",
            Category::Pharmacies => "Аптеки",
            Category::GasStations => "Заправки",
            Category::SocialNetworks => "Соц. сети",
            Category::CashBack => "CashBack",
            Category::Other => "Прочее",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(needle))
            .ok_or_else(|| CatalogError::UnknownCategory(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_keys_round_trip_through_str() {
        for op in OperatorKey::ALL {
            assert_eq!(op.key().parse::<OperatorKey>(), Ok(op));
        }
        assert_eq!(" MTS ".parse::<OperatorKey>(), Ok(OperatorKey::Mts));
        assert!("vodafone".parse::<OperatorKey>().is_err());
    }

    #[test]
    fn test_operator_wire_format() {
        assert_eq!(serde_json::to_string(&OperatorKey::T2).unwrap(), "\"t2\"");
        let op: OperatorKey = serde_json::from_str("\"gazprom\"").unwrap();
        assert_eq!(op, OperatorKey::Gazprom);
        assert_eq!(OperatorKey::T.icon_path(), "/operators/tmobile.png");
        assert_eq!(OperatorKey::Rt.display_name(), "Ростелеком");
    }

    #[test]
    fn test_category_validation() {
        assert_eq!("Аптеки".parse::<Category>(), Ok(Category::Pharmacies));
        assert_eq!("cashback".parse::<Category>(), Ok(Category::CashBack));
        assert_eq!(
            "Кафе".parse::<Category>(),
            Err(CatalogError::UnknownCategory("Кафе".to_string()))
        );
        let cat: Category = serde_json::from_str("\"Соц. сети\"").unwrap();
        assert_eq!(cat, Category::SocialNetworks);
    }
}
