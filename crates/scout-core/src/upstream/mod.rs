//! Talking to individual endpoints: transport, canary probing, and fastest-endpoint selection.
//!
//! # Layers
//!
//! ```text
//! FastestSelector   probe_all / select_fastest (concurrent, wait-all)
//!       │
//!       ▼
//!    Prober         one canary call + ResultPredicate, bounded by a timeout
//!       │
//!       ▼
//! EndpointClient    JSON-RPC envelope, request ids, latency measurement
//!       │
//!       ▼
//!  HttpClient       pooled reqwest POST, per-call deadline, no retries
//! ```
//!
//! Live requests from the dispatcher use [`EndpointClient`] directly; probes go through the
//! [`Prober`] so both share one id sequence and one connection pool.

pub mod canary;
pub mod endpoint;
pub mod errors;
pub mod http_client;
pub mod prober;
pub mod selector;

pub use canary::{Canary, ResultPredicate, PERMIT2_ADDRESS, PERMIT2_CODE_PREFIX};
pub use endpoint::{EndpointClient, TimedResponse};
pub use errors::{EndpointError, RpcErrorCategory, SelectionError};
pub use http_client::{HttpClient, HttpClientConfig};
pub use prober::{ProbeResult, Prober, DEFAULT_PROBE_TIMEOUT};
pub use selector::{pick_fastest, FastestSelector};
