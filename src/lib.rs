pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;

pub use crate::config::{cli::LocalStorage, toml_config::TomlConfig};
pub use crate::core::aggregation::{
    average_metric, derive, derive_request, group_by, GroupedTable, IndexedRecord,
};
pub use crate::core::engine::{ChartEngine, RunSummary};
pub use crate::core::session::{ChartSession, SelectionEvent};
pub use crate::core::sink::FileSink;
pub use crate::utils::error::{Result, SeriesError};
