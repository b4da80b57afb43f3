mod number;
mod operator;
mod place;
mod search;
pub mod timestamp;
mod usage;

pub use number::{NumberForm, PhoneNumber};
pub use operator::{Operator, OperatorForm};
pub use place::{Place, PlaceFilter, PlaceForm, PlaceListSort, Promo};
pub use search::SearchResult;
pub use usage::{Ack, UsageResponse, UsageSet};
