pub mod errors;
pub mod services;
pub mod types;

pub use errors::ApiError;
pub use services::ApiClient;
pub use types::*;
