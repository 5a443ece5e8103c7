pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::git::GitPublisher;
pub use config::{cli::LocalStorage, toml_config::SyncConfig};
pub use core::{etl::EtlEngine, pipeline::SyncPipeline};
pub use utils::error::{Result, SyncError};
