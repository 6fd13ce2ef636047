//! # Scout Core
//!
//! Fastest-endpoint discovery, caching and failover for JSON-RPC chains.
//!
//! Given a chain id, Scout probes every known endpoint of that chain with a known-answer canary
//! call, remembers the fastest one that answered correctly, and routes requests there. When the
//! remembered endpoint stops answering, the entry is dropped and the remaining endpoints are
//! tried one after another.
//!
//! - **[`directory`]**: chain id → ordered candidate URIs, filtered to usable HTTP endpoints.
//!
//! - **[`store`]**: string-keyed persistence backends (in-memory, JSON file).
//!
//! - **[`cache`]**: the persistent chain → fastest-endpoint map.
//!
//! - **[`upstream`]**: HTTP transport, canary probing, and concurrent fastest-endpoint selection.
//!
//! - **[`dispatch`]**: the [`Dispatcher`](dispatch::Dispatcher) tying it all together.
//!
//! - **[`config`]**: layered application configuration.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         Dispatcher                          │
//! │  ┌──────────────────┐  ┌─────────────────┐  ┌────────────┐  │
//! │  │ FastestEndpoint  │  │ FastestSelector │  │  Endpoint  │  │
//! │  │      Cache       │  │                 │  │ Directory  │  │
//! │  └────────┬─────────┘  └────────┬────────┘  └────────────┘  │
//! │           │                     │                           │
//! │  ┌────────▼─────────┐  ┌────────▼────────┐                  │
//! │  │  KeyValueStore   │  │     Prober      │                  │
//! │  │ (memory / file)  │  │  + Canary       │                  │
//! │  └──────────────────┘  └────────┬────────┘                  │
//! │                                 │                           │
//! │                        ┌────────▼────────┐                  │
//! │                        │ EndpointClient  │◄── live requests │
//! │                        │   HttpClient    │                  │
//! │                        └─────────────────┘                  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use scout_core::dispatch::DispatcherBuilder;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let dispatcher = DispatcherBuilder::new().build()?;
//! let response = dispatcher.dispatch(1, "eth_blockNumber", vec![]).await?;
//! println!("{:?}", response.result);
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod directory;
pub mod dispatch;
pub mod store;
pub mod types;
pub mod upstream;

pub use dispatch::{DispatchError, Dispatcher, DispatcherBuilder};
