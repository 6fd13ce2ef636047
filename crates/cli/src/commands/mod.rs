pub mod cache;
pub mod call;
pub mod chains;
pub mod config;
pub mod probe;
pub mod utils;

pub use cache::{handle_cache_command, CacheCommands};
pub use call::{call, resolve};
pub use chains::list_chains;
pub use config::{handle_config_command, ConfigCommands};
pub use probe::probe;
