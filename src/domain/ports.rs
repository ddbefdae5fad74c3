use crate::domain::model::{ChartSpec, DerivedSeries, OutputFormat, SeriesRequest};
use crate::utils::error::Result;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn data_path(&self) -> &str;
    fn output_path(&self) -> &str;
    fn output_formats(&self) -> &[OutputFormat];
    fn charts(&self) -> Vec<ChartSpec>;
    /// Render every dropdown option up front instead of only the initial selection.
    fn render_all_keys(&self) -> bool;
}

/// Rendering surface for derived series.
///
/// Returns the identifiers of whatever the sink produced (file names for the
/// file sink).
pub trait SeriesSink: Send + Sync {
    fn render(
        &self,
        chart: &ChartSpec,
        request: &SeriesRequest,
        series: &DerivedSeries,
    ) -> impl std::future::Future<Output = Result<Vec<String>>> + Send;
}
