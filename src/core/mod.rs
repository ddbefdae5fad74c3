pub mod aggregation;
pub mod engine;
pub mod ingest;
pub mod session;
pub mod sink;

pub use crate::domain::model::{
    ChartSpec, Derivation, DerivedSeries, DeriveIssue, Dimension, GroupKey, Metric, Record,
    RegionAverage, SeriesRequest,
};
pub use crate::domain::ports::{ConfigProvider, SeriesSink, Storage};
pub use crate::utils::error::Result;
