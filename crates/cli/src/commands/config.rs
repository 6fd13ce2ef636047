use clap::Subcommand;
use scout_core::config::{AppConfig, StoreBackend};
use std::path::Path;

use super::utils::{print_error, print_info, print_success, CliError, CliResult};

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Validate the configuration file
    Validate,

    /// Show the effective configuration (defaults, file and environment merged)
    Show,
}

pub fn handle_config_command(command: ConfigCommands, file: &str) -> CliResult<()> {
    match command {
        ConfigCommands::Validate => validate_config(file),
        ConfigCommands::Show => show_config(file),
    }
}

fn load(file: &str) -> CliResult<AppConfig> {
    AppConfig::from_file(file).map_err(|e| CliError::Config(e.to_string()))
}

fn validate_config(file: &str) -> CliResult<()> {
    if !Path::new(file).exists() {
        print_error(&format!("Configuration file not found: {file}"));
        return Err(CliError::Config(format!("File not found: {file}")));
    }

    print_info(&format!("Loading configuration from {file}..."));
    let config = load(file)?;

    print_info("Validating configuration...");
    config.validate().map_err(CliError::Config)?;

    print_success("Configuration is valid!");

    println!("Configuration Summary:");
    println!(
        "  Directory: {}{}",
        if config.directory.include_builtin { "built-in" } else { "file only" },
        config.directory.path.as_ref().map(|p| format!(" + {}", p.display())).unwrap_or_default()
    );
    println!("  Store: {}", describe_store(&config));
    println!(
        "  Timeouts: probe {}ms, request {}ms",
        config.dispatch.probe_timeout_ms, config.dispatch.request_timeout_ms
    );

    Ok(())
}

fn describe_store(config: &AppConfig) -> String {
    match config.store.backend {
        StoreBackend::Memory => "memory".to_string(),
        StoreBackend::File => format!("file ({})", config.store.path.display()),
    }
}

fn show_config(file: &str) -> CliResult<()> {
    let config = load(file)?;

    println!("Configuration from {file}:");

    println!("\n[Directory]");
    println!("  Include Built-in: {}", config.directory.include_builtin);
    match &config.directory.path {
        Some(path) => println!("  Registry File: {}", path.display()),
        None => println!("  Registry File: (none)"),
    }

    println!("\n[Store]");
    println!("  Backend: {}", describe_store(&config));

    println!("\n[Dispatch]");
    println!("  Probe Timeout: {}ms", config.dispatch.probe_timeout_ms);
    println!("  Request Timeout: {}ms", config.dispatch.request_timeout_ms);

    println!("\n[HTTP]");
    println!("  Connect Timeout: {}ms", config.http.connect_timeout_ms);
    println!("  Pool Idle Timeout: {}s", config.http.pool_idle_timeout_seconds);
    println!("  Pool Max Idle Per Host: {}", config.http.pool_max_idle_per_host);
    println!("  User Agent: {}", config.http.user_agent);

    println!("\n[Logging]");
    println!("  Level: {}", config.logging.level);
    println!("  Format: {}", config.logging.format);

    Ok(())
}
