use super::{Place, PhoneNumber};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct SearchResult {
    #[serde(default)]
    pub numbers: Vec<PhoneNumber>,
    #[serde(default)]
    pub places: Vec<Place>,
}

impl SearchResult {
    pub fn is_empty(&self) -> bool {
        self.numbers.is_empty() && self.places.is_empty()
    }
}
