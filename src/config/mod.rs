pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::domain::model::{ChartKind, ChartSpec, Dimension, Metric, OutputFormat};
#[cfg(feature = "cli")]
use crate::domain::ports::ConfigProvider;
#[cfg(feature = "cli")]
use crate::utils::error::{Result, SeriesError};
#[cfg(feature = "cli")]
use crate::utils::validation::{self, Validate};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "region-series")]
#[command(about = "Derive per-region average chart series from a transactions CSV")]
pub struct CliConfig {
    #[arg(long, default_value = "data/superstore.csv")]
    pub data: String,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, value_enum, default_value_t = Dimension::Category)]
    pub dimension: Dimension,

    #[arg(long, value_enum, default_value_t = Metric::Profit)]
    pub metric: Metric,

    #[arg(long, help = "Group key to select (defaults to the first one in the data)")]
    pub key: Option<String>,

    #[arg(long, value_enum, default_value_t = ChartKind::Bar)]
    pub kind: ChartKind,

    #[arg(long, value_enum, value_delimiter = ',', default_value = "json")]
    pub formats: Vec<OutputFormat>,

    #[arg(long, help = "Render one series per available group key")]
    pub all_keys: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,

    #[arg(long, help = "Log CPU and memory usage per phase")]
    pub monitor: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    pub fn chart(&self) -> ChartSpec {
        let mut chart = ChartSpec::new(
            format!("average-{}-by-{}", self.metric, self.dimension),
            self.kind,
            self.dimension,
            self.metric,
        );
        chart.selected = self.key.clone();
        chart
    }
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn data_path(&self) -> &str {
        &self.data
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn output_formats(&self) -> &[OutputFormat] {
        &self.formats
    }

    fn charts(&self) -> Vec<ChartSpec> {
        vec![self.chart()]
    }

    fn render_all_keys(&self) -> bool {
        self.all_keys
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("data", &self.data)?;
        validation::validate_file_extensions("data", std::slice::from_ref(&self.data), &["csv", "tsv"])?;
        validation::validate_path("output_path", &self.output_path)?;

        if self.formats.is_empty() {
            return Err(SeriesError::MissingConfigError {
                field: "formats".to_string(),
            });
        }

        if let Some(key) = &self.key {
            validation::validate_non_empty_string("key", key)?;
            validation::validate_group_key("key", self.dimension, key)?;
        }

        Ok(())
    }
}
