use prettytable::{row, Table};
use scout_core::{config::AppConfig, types::ChainId, upstream::ProbeResult};

use super::utils::{build_dispatcher, print_info, CliError, CliResult};

/// Orders results fastest first; invalid probes go last, keeping candidate order.
#[must_use]
pub fn rank(mut results: Vec<ProbeResult>) -> Vec<ProbeResult> {
    results.sort_by_key(|r| r.latency_ms.unwrap_or(u64::MAX));
    results
}

/// Probes every candidate of `chain_id` and prints a latency table.
pub async fn probe(config: &AppConfig, chain_id: ChainId) -> CliResult<()> {
    if chain_id == 0 {
        return Err(CliError::Dispatch(scout_core::DispatchError::InvalidChainId));
    }

    let dispatcher = build_dispatcher(config)?;
    let candidates = dispatcher
        .directory()
        .endpoints_for(chain_id)
        .map_err(|_| CliError::Dispatch(scout_core::DispatchError::NoEndpoints { chain_id }))?;

    print_info(&format!("Probing {} endpoints for chain {chain_id}...", candidates.len()));

    let results = rank(dispatcher.selector().probe_all(&candidates).await);
    let valid = results.iter().filter(|r| r.is_valid()).count();

    let mut table = Table::new();
    table.add_row(row!["#", "Latency", "Status", "URL"]);
    for (index, result) in results.iter().enumerate() {
        let (latency, status) = match result.latency_ms {
            Some(ms) => (format!("{ms}ms"), "OK"),
            None => ("-".to_string(), "INVALID"),
        };
        table.add_row(row![index + 1, latency, status, result.uri]);
    }
    table.printstd();

    print_info(&format!("{valid}/{} endpoints valid", results.len()));
    Ok(())
}
