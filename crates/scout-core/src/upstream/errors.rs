use thiserror::Error;

/// Classification of JSON-RPC error objects, used as a log label.
///
/// RPC-level errors are returned to the caller as-is; the category only tells an operator
/// whether the endpoint or the request is the likely culprit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RpcErrorCategory {
    /// Invalid request, method not found, invalid params.
    ClientError,
    /// Internal error or a non-execution server error.
    ProviderError,
    /// Rate limiting at JSON-RPC level (-32005).
    RateLimit,
    /// The endpoint could not parse the request (-32700).
    ParseError,
    /// Reverts, out of gas, nonce problems. Caused by the call itself.
    ExecutionError,
}

impl RpcErrorCategory {
    /// Classifies a JSON-RPC error code and message.
    ///
    /// Standard JSON-RPC error codes:
    /// - -32700: Parse error
    /// - -32600: Invalid Request
    /// - -32601: Method not found
    /// - -32602: Invalid params
    /// - -32603: Internal error
    /// - -32000 to -32099: Server errors (varies by message content)
    /// - -32005: Limit exceeded (rate limiting)
    ///
    /// Code `3` is what geth returns for `eth_call` reverts carrying revert data.
    #[must_use]
    pub fn from_code_and_message(code: i64, message: &str) -> Self {
        match code {
            -32700 => Self::ParseError,
            -32602..=-32600 => Self::ClientError,
            -32603 => Self::ProviderError,
            -32005 => Self::RateLimit,
            3 => Self::ExecutionError,
            -32099..=-32000 => {
                let message_lower = message.to_lowercase();
                if message_lower.contains("revert") ||
                    message_lower.contains("out of gas") ||
                    message_lower.contains("insufficient funds") ||
                    message_lower.contains("nonce too low") ||
                    message_lower.contains("gas too low")
                {
                    Self::ExecutionError
                } else {
                    Self::ProviderError
                }
            }
            _ => Self::ProviderError,
        }
    }

    /// Returns a static string for log fields.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ClientError => "client_error",
            Self::ProviderError => "provider_error",
            Self::RateLimit => "rate_limit",
            Self::ParseError => "parse_error",
            Self::ExecutionError => "execution_error",
        }
    }
}

/// Failure of a single call against a single endpoint.
///
/// The dispatcher never surfaces these to its caller: they are logged and turned into
/// "try the next endpoint".
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EndpointError {
    /// The call did not complete before its deadline and was cancelled.
    #[error("Request timeout")]
    Timeout,

    /// The endpoint could not be reached or the connection broke mid-flight.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Non-2xx HTTP status. Second field is the (truncated) response body.
    #[error("HTTP error {0}: {1}")]
    HttpError(u16, String),

    /// The body was not a JSON-RPC response envelope.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The request could not be built or serialized.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The endpoint answered with a JSON-RPC `error` object.
    #[error("RPC error {0}: {1}")]
    RpcError(i64, String),

    /// The endpoint answered, but not with the known-good canary result.
    #[error("Canary mismatch: {0}")]
    CanaryMismatch(String),
}

impl EndpointError {
    /// Returns the RPC error category if this is an RPC error.
    #[must_use]
    pub fn rpc_category(&self) -> Option<RpcErrorCategory> {
        match self {
            Self::RpcError(code, message) => Some(RpcErrorCategory::from_code_and_message(*code, message)),
            _ => None,
        }
    }

    /// Short label for log fields.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::ConnectionFailed(_) => "connection_failed",
            Self::HttpError(_, _) => "http_error",
            Self::InvalidResponse(_) => "invalid_response",
            Self::InvalidRequest(_) => "invalid_request",
            Self::RpcError(_, _) => "rpc_error",
            Self::CanaryMismatch(_) => "canary_mismatch",
        }
    }
}

/// Failure of a fastest-endpoint selection round.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SelectionError {
    /// No candidate produced a valid probe. `probed` is the number of candidates tried.
    #[error("No valid endpoints among {probed} candidates")]
    NoValidEndpoints { probed: usize },
}
