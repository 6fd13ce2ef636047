use prettytable::{row, Table};
use scout_core::{config::AppConfig, directory::ChainEndpoints};

use super::utils::{build_dispatcher, print_info, CliResult};

/// Chains whose name contains `filter` (case insensitive); all chains without a filter.
pub fn matching<'a>(
    chains: impl Iterator<Item = &'a ChainEndpoints>,
    filter: Option<&str>,
) -> Vec<&'a ChainEndpoints> {
    let filter = filter.map(str::to_lowercase);
    chains
        .filter(|chain| filter.as_deref().map_or(true, |f| chain.name.to_lowercase().contains(f)))
        .collect()
}

/// Lists directory chains with their usable endpoint counts.
pub fn list_chains(config: &AppConfig, name: Option<&str>) -> CliResult<()> {
    let dispatcher = build_dispatcher(config)?;
    let chains = matching(dispatcher.directory().chains(), name);

    if chains.is_empty() {
        print_info("No matching chains");
        return Ok(());
    }

    let mut table = Table::new();
    table.add_row(row!["Chain ID", "Name", "RPC Count", "Cached"]);
    for chain in &chains {
        let cached = dispatcher.cache().get(chain.chain_id).unwrap_or_default();
        table.add_row(row![chain.chain_id, chain.name, chain.uris.len(), cached]);
    }
    table.printstd();

    print_info(&format!("{} chains", chains.len()));
    Ok(())
}
