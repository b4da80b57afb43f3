use dotenvy::dotenv;
use phonetrack::api::ApiClient;
use phonetrack::configuration::Context;
use phonetrack::shell::Shell;
use phonetrack::terminal::{self, Console};
use phonetrack::AppError;
use std::str::FromStr;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenv().ok();
    let context = Context::new("config.json").map_err(|e| AppError::ConfigError(e.to_string()))?;

    let log_level = Level::from_str(&context.config.log_level).unwrap_or(Level::INFO);
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::new(log_level.to_string()))
        .init();
    tracing::info!(backend = %context.config.api.base_url, "Starting phonetrack");

    let api = Arc::new(ApiClient::new(&context.config.api.base_url)?);
    let mut shell = Shell::new(api, context.config);
    let console = Console::stdio();

    terminal::run(&mut shell, &console).await?;
    tracing::info!("Bye");
    Ok(())
}
