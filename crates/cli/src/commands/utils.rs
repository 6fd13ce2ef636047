use scout_core::{config::AppConfig, dispatch::BuilderError, DispatchError, Dispatcher, DispatcherBuilder};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    #[error("Setup error: {0}")]
    Setup(#[from] BuilderError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Error: {0}")]
    General(String),
}

impl From<serde_json::Error> for CliError {
    fn from(error: serde_json::Error) -> Self {
        Self::General(error.to_string())
    }
}

pub type CliResult<T> = Result<T, CliError>;

/// Validates `config` and assembles a dispatcher from it.
pub fn build_dispatcher(config: &AppConfig) -> CliResult<Dispatcher> {
    config.validate().map_err(CliError::Config)?;
    Ok(DispatcherBuilder::from_config(config)?.build()?)
}

pub fn print_success(message: &str) {
    println!("[SUCCESS] {message}");
}

pub fn print_error(message: &str) {
    eprintln!("[ERROR] {message}");
}

pub fn print_info(message: &str) {
    println!("[INFO] {message}");
}
