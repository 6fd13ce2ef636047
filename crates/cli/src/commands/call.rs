use scout_core::{config::AppConfig, types::ChainId};

use super::utils::{build_dispatcher, CliError, CliResult};

/// Parses `--params` as a JSON array of positional parameters.
pub fn parse_params(raw: &str) -> CliResult<Vec<serde_json::Value>> {
    match serde_json::from_str::<serde_json::Value>(raw)? {
        serde_json::Value::Array(params) => Ok(params),
        other => Err(CliError::InvalidArgument(format!("--params must be a JSON array, got {other}"))),
    }
}

/// Dispatches one call and prints the response envelope as JSON.
pub async fn call(config: &AppConfig, chain_id: ChainId, method: &str, params: &str) -> CliResult<()> {
    let params = parse_params(params)?;
    let dispatcher = build_dispatcher(config)?;

    let response = dispatcher.dispatch(chain_id, method, params).await?;

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

/// Prints the endpoint requests for `chain_id` would go to.
pub async fn resolve(config: &AppConfig, chain_id: ChainId) -> CliResult<()> {
    let dispatcher = build_dispatcher(config)?;
    let cached = dispatcher.cache().get(chain_id).is_some();

    let uri = dispatcher.resolve(chain_id).await?;

    println!("{uri}");
    tracing::info!(chain_id = chain_id, uri = %uri, cached = cached, "resolved endpoint");
    Ok(())
}
