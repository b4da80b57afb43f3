pub mod api;
pub mod catalog;
pub mod configuration;
pub mod pages;
pub mod phone;
pub mod search;
pub mod shell;
pub mod terminal;
pub mod usage;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Config Error:{0}")]
    ConfigError(String),

    #[error("Api Error:{0}")]
    ApiError(#[from] api::ApiError),

    #[error("Terminal Error:{0}")]
    TerminalError(#[from] terminal::TerminalError),
}
