use clap::Subcommand;
use prettytable::{row, Table};
use scout_core::{config::AppConfig, types::ChainId};

use super::utils::{build_dispatcher, print_info, print_success, CliResult};

#[derive(Subcommand)]
pub enum CacheCommands {
    /// Show cached fastest endpoints
    Show,

    /// Remove every cached endpoint
    Clear,

    /// Remove the cached endpoint of one chain
    Evict {
        #[arg(long)]
        chain_id: ChainId,
    },
}

pub fn handle_cache_command(command: CacheCommands, config: &AppConfig) -> CliResult<()> {
    let dispatcher = build_dispatcher(config)?;
    let cache = dispatcher.cache();

    match command {
        CacheCommands::Show => {
            let entries = cache.snapshot();
            if entries.is_empty() {
                print_info("Cache is empty");
                return Ok(());
            }

            let mut table = Table::new();
            table.add_row(row!["Chain ID", "Name", "Endpoint"]);
            for (chain_id, uri) in &entries {
                let name = dispatcher.directory().chain(*chain_id).map(|c| c.name.as_str()).unwrap_or("-");
                table.add_row(row![chain_id, name, uri]);
            }
            table.printstd();
        }
        CacheCommands::Clear => {
            let count = cache.len();
            cache.clear();
            print_success(&format!("Cleared {count} cached endpoints"));
        }
        CacheCommands::Evict { chain_id } => match cache.evict(chain_id) {
            Some(uri) => print_success(&format!("Evicted {uri} for chain {chain_id}")),
            None => print_info(&format!("No cached endpoint for chain {chain_id}")),
        },
    }

    Ok(())
}
