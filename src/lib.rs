pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{cli::LocalStorage, CliConfig};

pub use config::toml_config::TomlConfig;
pub use core::{engine::LinkEngine, BulkPipeline};
pub use domain::model::{
    BatchResult, BatchSummary, CanonicalPhone, ContactTable, LinkRecord, LoadReport, Provider,
    RawContact, Region,
};
pub use utils::error::{LinkGenError, Result};
