use crate::core::sink::encode_component;
use crate::domain::model::{ChartSpec, OutputFormat};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{Result, SeriesError};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub source: SourceConfig,
    pub output: OutputConfig,
    pub monitoring: Option<MonitoringConfig>,
    #[serde(default)]
    pub charts: Vec<ChartSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub path: String,
    #[serde(default = "default_formats")]
    pub formats: Vec<OutputFormat>,
    pub all_keys: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub log_level: Option<String>,
}

fn default_formats() -> Vec<OutputFormat> {
    vec![OutputFormat::Json]
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(SeriesError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| SeriesError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${DATA_DIR})；未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| SeriesError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_path("source.path", &self.source.path)?;
        validation::validate_file_extensions(
            "source.path",
            std::slice::from_ref(&self.source.path),
            &["csv", "tsv"],
        )?;
        validation::validate_path("output.path", &self.output.path)?;

        if self.output.formats.is_empty() {
            return Err(SeriesError::MissingConfigError {
                field: "output.formats".to_string(),
            });
        }

        for chart in &self.charts {
            validation::validate_non_empty_string("charts.name", &chart.name)?;
            if let Some(selected) = &chart.selected {
                validation::validate_group_key(
                    &format!("charts.{}.selected", chart.name),
                    chart.dimension,
                    selected,
                )?;
            }
        }
        // names become file name prefixes, so compare them in that form
        let stems: Vec<String> = self.charts.iter().map(|c| encode_component(&c.name)).collect();
        validation::validate_unique_names("charts.name", stems.iter().map(String::as_str))?;

        Ok(())
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    pub fn log_level(&self) -> Option<&str> {
        self.monitoring.as_ref().and_then(|m| m.log_level.as_deref())
    }
}

impl ConfigProvider for TomlConfig {
    fn data_path(&self) -> &str {
        &self.source.path
    }

    fn output_path(&self) -> &str {
        &self.output.path
    }

    fn output_formats(&self) -> &[OutputFormat] {
        &self.output.formats
    }

    /// 未設定任何圖表時使用內建的三個圖表
    fn charts(&self) -> Vec<ChartSpec> {
        if self.charts.is_empty() {
            ChartSpec::presets()
        } else {
            self.charts.clone()
        }
    }

    fn render_all_keys(&self) -> bool {
        self.output.all_keys.unwrap_or(false)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{ChartKind, Dimension, Metric};
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_basic_toml_config() {
        let toml_content = r#"
[source]
path = "data/superstore.csv"

[output]
path = "./charts"
formats = ["json", "csv"]
all_keys = true

[monitoring]
enabled = true
log_level = "debug"

[[charts]]
name = "profit-by-year"
kind = "bar"
dimension = "year"
metric = "profit"
selected = 2015
x_label = "STATES"
y_label = "AVERAGE PROFIT ($)"

[[charts]]
name = "sales-by-category"
kind = "circular_bar"
dimension = "category"
metric = "sales"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_ok());

        assert_eq!(config.data_path(), "data/superstore.csv");
        assert_eq!(config.output_formats(), &[OutputFormat::Json, OutputFormat::Csv]);
        assert!(config.render_all_keys());
        assert!(config.monitoring_enabled());
        assert_eq!(config.log_level(), Some("debug"));

        let charts = config.charts();
        assert_eq!(charts.len(), 2);
        assert_eq!(charts[0].dimension, Dimension::Year);
        assert_eq!(charts[0].selected.as_deref(), Some("2015"));
        assert_eq!(charts[1].kind, ChartKind::CircularBar);
        assert_eq!(charts[1].metric, Metric::Sales);
        assert_eq!(charts[1].selected, None);
    }

    #[test]
    fn test_defaults_to_presets_and_json() {
        let toml_content = r#"
[source]
path = "superstore.csv"

[output]
path = "out"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.output_formats(), &[OutputFormat::Json]);
        assert!(!config.render_all_keys());
        assert!(!config.monitoring_enabled());
        assert_eq!(config.charts(), ChartSpec::presets());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("REGION_SERIES_TEST_DATA_DIR", "/srv/data");
        let toml_content = r#"
[source]
path = "${REGION_SERIES_TEST_DATA_DIR}/superstore.csv"

[output]
path = "${REGION_SERIES_TEST_UNSET_VAR}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.source.path, "/srv/data/superstore.csv");
        assert_eq!(config.output.path, "${REGION_SERIES_TEST_UNSET_VAR}");
    }

    #[test]
    fn test_rejects_duplicate_chart_names() {
        let toml_content = r#"
[source]
path = "superstore.csv"

[output]
path = "out"

[[charts]]
name = "dup"
kind = "bar"
dimension = "category"
metric = "profit"

[[charts]]
name = "dup"
kind = "area"
dimension = "category"
metric = "sales"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_accepts_names_differing_only_in_punctuation() {
        let toml_content = r#"
[source]
path = "superstore.csv"

[output]
path = "out"

[[charts]]
name = "by year"
kind = "bar"
dimension = "year"
metric = "profit"

[[charts]]
name = "by_year"
kind = "area"
dimension = "year"
metric = "sales"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_ok());

        let prefixes: Vec<String> = config.charts().iter().map(|c| encode_component(&c.name)).collect();
        assert_ne!(prefixes[0], prefixes[1]);
    }

    #[test]
    fn test_rejects_bad_year_selection() {
        let toml_content = r#"
[source]
path = "superstore.csv"

[output]
path = "out"

[[charts]]
name = "by-year"
kind = "bar"
dimension = "year"
metric = "profit"
selected = "Furniture"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = TomlConfig::from_toml_str("[source\npath = 1").unwrap_err();
        assert!(matches!(err, SeriesError::ConfigValidationError { .. }));
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[source]\npath = \"superstore.tsv\"\n\n[output]\npath = \"out\"").unwrap();

        let config = TomlConfig::from_file(file.path()).unwrap();
        assert_eq!(config.data_path(), "superstore.tsv");
        assert!(config.validate().is_ok());
    }
}
