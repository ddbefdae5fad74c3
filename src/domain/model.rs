use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use thiserror::Error;

/// One transaction row of the dataset.
///
/// Values are kept exactly as read; date and number coercion happens in the
/// aggregation pipeline so that a bad cell degrades a single derivation
/// instead of failing the load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "Region")]
    pub region: String,
    #[serde(rename = "Category")]
    pub category: String,
    #[serde(rename = "Order Date")]
    pub order_date: String,
    #[serde(rename = "Profit")]
    pub profit: String,
    #[serde(rename = "Sales")]
    pub sales: String,
}

impl Record {
    pub fn new(
        region: impl Into<String>,
        category: impl Into<String>,
        order_date: impl Into<String>,
        profit: impl Into<String>,
        sales: impl Into<String>,
    ) -> Self {
        Self {
            region: region.into(),
            category: category.into(),
            order_date: order_date.into(),
            profit: profit.into(),
            sales: sales.into(),
        }
    }

    /// Raw cell for the given metric.
    pub fn metric_value(&self, metric: Metric) -> &str {
        match metric {
            Metric::Profit => &self.profit,
            Metric::Sales => &self.sales,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Year,
    Category,
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dimension::Year => write!(f, "year"),
            Dimension::Category => write!(f, "category"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Profit,
    Sales,
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::Profit => write!(f, "profit"),
            Metric::Sales => write!(f, "sales"),
        }
    }
}

/// A concrete value of a [`Dimension`]: a calendar year or a category name.
///
/// Serializes as a bare number or string so the key list can be fed straight
/// into a dropdown.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GroupKey {
    Year(i32),
    Category(String),
}

impl GroupKey {
    /// Interpret a dropdown value as a key of `dimension`.
    pub fn parse(dimension: Dimension, raw: &str) -> Option<Self> {
        match dimension {
            Dimension::Year => raw.trim().parse::<i32>().ok().map(GroupKey::Year),
            Dimension::Category => Some(GroupKey::Category(raw.to_string())),
        }
    }

    pub fn dimension(&self) -> Dimension {
        match self {
            GroupKey::Year(_) => Dimension::Year,
            GroupKey::Category(_) => Dimension::Category,
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::Year(year) => write!(f, "{}", year),
            GroupKey::Category(category) => write!(f, "{}", category),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionAverage {
    #[serde(rename = "Region")]
    pub region: String,
    pub value: f64,
}

/// What a rendering surface receives: the dropdown options and the points to draw.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedSeries {
    pub available_keys: Vec<GroupKey>,
    pub points: Vec<RegionAverage>,
}

impl DerivedSeries {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Recoverable problems met while deriving a series. None of them abort a
/// derivation; they only shrink or zero parts of the output.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DeriveIssue {
    #[error("record {index}: unparseable order date '{value}', skipped from year grouping")]
    Parse { index: usize, value: String },

    #[error("record {index}: region '{region}': non-numeric {metric} value '{value}', counted as 0")]
    InvalidMetric {
        index: usize,
        region: String,
        metric: Metric,
        value: String,
    },

    #[error("no {dimension} group matches selected key '{key}'")]
    UnknownKey { dimension: Dimension, key: String },
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Derivation {
    pub series: DerivedSeries,
    pub issues: Vec<DeriveIssue>,
}

/// Explicit request for one derivation, as produced by a selection change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesRequest {
    pub dimension: Dimension,
    pub selected_key: String,
    pub metric: Metric,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Area,
    Bar,
    CircularBar,
}

/// A named chart: which slice of the data it shows and how it is labelled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub name: String,
    pub kind: ChartKind,
    pub dimension: Dimension,
    pub metric: Metric,
    #[serde(default, deserialize_with = "deserialize_selected")]
    pub selected: Option<String>,
    #[serde(default)]
    pub x_label: Option<String>,
    #[serde(default)]
    pub y_label: Option<String>,
}

impl ChartSpec {
    pub fn new(name: impl Into<String>, kind: ChartKind, dimension: Dimension, metric: Metric) -> Self {
        Self {
            name: name.into(),
            kind,
            dimension,
            metric,
            selected: None,
            x_label: None,
            y_label: None,
        }
    }

    pub fn with_selected(mut self, key: impl Into<String>) -> Self {
        self.selected = Some(key.into());
        self
    }

    pub fn with_labels(mut self, x_label: impl Into<String>, y_label: impl Into<String>) -> Self {
        self.x_label = Some(x_label.into());
        self.y_label = Some(y_label.into());
        self
    }

    pub fn x_label(&self) -> String {
        self.x_label.clone().unwrap_or_else(|| "Region".to_string())
    }

    pub fn y_label(&self) -> String {
        self.y_label
            .clone()
            .unwrap_or_else(|| format!("AVERAGE {} ($)", self.metric.to_string().to_uppercase()))
    }

    /// The three charts of the superstore dashboard.
    pub fn presets() -> Vec<ChartSpec> {
        vec![
            ChartSpec::new(
                "average-sales-by-category",
                ChartKind::Area,
                Dimension::Category,
                Metric::Sales,
            )
            .with_selected("Furniture")
            .with_labels("States", "AVERAGE SALES ($)"),
            ChartSpec::new(
                "average-profit-by-year",
                ChartKind::Bar,
                Dimension::Year,
                Metric::Profit,
            )
            .with_selected("2014")
            .with_labels("STATES", "AVERAGE PROFIT ($)"),
            ChartSpec::new(
                "average-profit-by-category",
                ChartKind::CircularBar,
                Dimension::Category,
                Metric::Profit,
            )
            .with_selected("Furniture")
            .with_labels("STATES", "AVERAGE PROFIT ($)"),
        ]
    }
}

// TOML users write `selected = 2014` as often as `selected = "2014"`.
fn deserialize_selected<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawKey {
        Text(String),
        Number(i64),
    }

    Ok(Option::<RawKey>::deserialize(deserializer)?.map(|raw| match raw {
        RawKey::Text(text) => text,
        RawKey::Number(number) => number.to_string(),
    }))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Json,
    Csv,
    Tsv,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Tsv => "tsv",
        }
    }
}
