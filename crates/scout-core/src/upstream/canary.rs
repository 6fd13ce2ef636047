//! Known-answer canary calls used to judge whether an endpoint is both alive and correct.
//!
//! A reachable endpoint is not necessarily a useful one: it may be stuck on an old block, serve
//! a different chain, or return an empty result for every call. A canary sends a read-only call
//! whose correct answer is known up front and checks the `result` against a
//! [`ResultPredicate`].

use serde_json::{json, Value};

/// Address of the Permit2 contract, deployed at the same address on every major EVM chain.
pub const PERMIT2_ADDRESS: &str = "0x000000000022D473030F116dDEE9F6B43aC78BA3";

/// Leading bytes of the Permit2 runtime bytecode: the via-IR preamble followed by the selector
/// dispatch up to `lockdown((address,address)[])` (`0x0d58b1db`).
pub const PERMIT2_CODE_PREFIX: &str = "0x6040608081526004908136101561001557600080fd5b600090813560e01c80630d58b1db";

/// 4-byte selector of `balanceOf(address)`.
pub const BALANCE_OF_SELECTOR: &str = "0x70a08231";

/// Condition a canary `result` must satisfy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultPredicate {
    /// Result is a string equal to this literal (hex compared case-insensitively).
    Exact(String),
    /// Result starts with this prefix (case-insensitive) and continues with hex digits only.
    HexPrefix(String),
    /// Result is a hex quantity greater than or equal to this bound.
    HexAtLeast(u128),
}

impl ResultPredicate {
    /// Checks `result`, returning a short reason on mismatch.
    ///
    /// # Errors
    ///
    /// Returns a human-readable description of why `result` was rejected.
    pub fn check(&self, result: &Value) -> Result<(), String> {
        let Some(text) = result.as_str() else {
            return Err(format!("expected a string result, got {}", value_kind(result)));
        };

        match self {
            Self::Exact(expected) => {
                if text.eq_ignore_ascii_case(expected) {
                    Ok(())
                } else {
                    Err(format!("expected {expected}, got {}", abbreviate(text)))
                }
            }
            Self::HexPrefix(prefix) => {
                let head_matches = text.get(..prefix.len()).is_some_and(|head| head.eq_ignore_ascii_case(prefix));
                if !head_matches {
                    return Err(format!("expected prefix {}, got {}", abbreviate(prefix), abbreviate(text)));
                }

                let tail = &text[prefix.len()..];
                if tail.is_empty() || !tail.bytes().all(|b| b.is_ascii_hexdigit()) {
                    return Err(format!("expected hex digits after prefix, got {}", abbreviate(tail)));
                }
                Ok(())
            }
            Self::HexAtLeast(bound) => {
                if hex_at_least(text, *bound)? {
                    Ok(())
                } else {
                    Err(format!("expected at least {bound}, got {}", abbreviate(text)))
                }
            }
        }
    }
}

/// Compares a `0x`-prefixed hex quantity of arbitrary width against `bound`.
fn hex_at_least(text: &str, bound: u128) -> Result<bool, String> {
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .ok_or_else(|| format!("not a hex quantity: {}", abbreviate(text)))?;

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(format!("not a hex quantity: {}", abbreviate(text)));
    }

    let significant = digits.trim_start_matches('0');
    if significant.len() > 32 {
        return Ok(true);
    }
    if significant.is_empty() {
        return Ok(bound == 0);
    }

    u128::from_str_radix(significant, 16)
        .map(|value| value >= bound)
        .map_err(|e| format!("not a hex quantity: {e}"))
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn abbreviate(text: &str) -> String {
    if text.len() > 18 {
        format!("{}...", text.get(..18).unwrap_or(text))
    } else {
        text.to_string()
    }
}

/// A read-only JSON-RPC call with a known-good answer.
#[derive(Debug, Clone, PartialEq)]
pub struct Canary {
    pub method: String,
    pub params: Vec<Value>,
    pub predicate: ResultPredicate,
}

impl Canary {
    #[must_use]
    pub fn new(method: impl Into<String>, params: Vec<Value>, predicate: ResultPredicate) -> Self {
        Self { method: method.into(), params, predicate }
    }

    /// `eth_getCode` of the Permit2 contract; valid when the Permit2 runtime bytecode comes back.
    ///
    /// Nodes that are not synced or prune state return `0x`; nodes serving a chain with some other
    /// contract at that address return code that fails the prefix check.
    #[must_use]
    pub fn permit2_code() -> Self {
        Self::new(
            "eth_getCode",
            vec![json!(PERMIT2_ADDRESS), json!("latest")],
            ResultPredicate::HexPrefix(PERMIT2_CODE_PREFIX.to_string()),
        )
    }

    /// `eth_call` of `balanceOf(holder)` on `token`; valid when the balance is non-zero.
    #[must_use]
    pub fn erc20_balance(token: &str, holder: &str) -> Self {
        let holder = holder.trim_start_matches("0x").trim_start_matches("0X");
        let data = format!("{BALANCE_OF_SELECTOR}{holder:0>64}");

        Self::new(
            "eth_call",
            vec![json!({"to": token, "data": data}), json!("latest")],
            ResultPredicate::HexAtLeast(1),
        )
    }

    /// `eth_blockNumber`; valid when the node reports any block past genesis.
    #[must_use]
    pub fn block_number() -> Self {
        Self::new("eth_blockNumber", vec![], ResultPredicate::HexAtLeast(1))
    }

    /// Validates a canary `result`.
    ///
    /// # Errors
    ///
    /// Returns the mismatch reason from [`ResultPredicate::check`].
    pub fn check(&self, result: &Value) -> Result<(), String> {
        self.predicate.check(result)
    }
}

impl Default for Canary {
    fn default() -> Self {
        Self::permit2_code()
    }
}
