use crate::types::ChainId;
use thiserror::Error;

/// Terminal outcome of a failed dispatch.
///
/// Single-endpoint failures never appear here: they are absorbed by failover. A failed
/// dispatch reports exactly one of these variants and nothing about which endpoints were tried.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DispatchError {
    /// The caller passed chain id `0`.
    #[error("Invalid chain id")]
    InvalidChainId,

    /// The directory has no usable endpoint for the chain, and none to fall back to.
    #[error("No RPC endpoints found for chain {chain_id}")]
    NoEndpoints { chain_id: ChainId },

    /// Every probe of the selection round was invalid.
    #[error("No valid RPC endpoints found for chain {chain_id}")]
    NoValidEndpoints { chain_id: ChainId },

    /// The cached endpoint and every alternate failed.
    #[error("All RPC endpoints failed for chain {chain_id}")]
    AllEndpointsFailed { chain_id: ChainId },
}

impl DispatchError {
    /// Chain the error refers to, if any.
    #[must_use]
    pub fn chain_id(&self) -> Option<ChainId> {
        match self {
            Self::InvalidChainId => None,
            Self::NoEndpoints { chain_id } |
            Self::NoValidEndpoints { chain_id } |
            Self::AllEndpointsFailed { chain_id } => Some(*chain_id),
        }
    }
}
