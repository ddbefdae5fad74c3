use crate::domain::model::{ChartKind, ChartSpec, DerivedSeries, GroupKey, OutputFormat, RegionAverage, SeriesRequest};
use crate::domain::ports::{SeriesSink, Storage};
use crate::utils::error::{Result, SeriesError};
use serde::Serialize;

/// Everything a front end needs to draw one chart state.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartPayload<'a> {
    pub chart: &'a str,
    pub kind: ChartKind,
    pub x_label: String,
    pub y_label: String,
    pub request: &'a SeriesRequest,
    pub available_keys: &'a [GroupKey],
    pub points: &'a [RegionAverage],
}

impl<'a> ChartPayload<'a> {
    pub fn new(chart: &'a ChartSpec, request: &'a SeriesRequest, series: &'a DerivedSeries) -> Self {
        Self {
            chart: &chart.name,
            kind: chart.kind,
            x_label: chart.x_label(),
            y_label: chart.y_label(),
            request,
            available_keys: &series.available_keys,
            points: &series.points,
        }
    }
}

/// Writes each rendered series as chart payload files through a [`Storage`].
pub struct FileSink<S: Storage> {
    storage: S,
    formats: Vec<OutputFormat>,
}

impl<S: Storage> FileSink<S> {
    pub fn new(storage: S, formats: Vec<OutputFormat>) -> Self {
        Self { storage, formats }
    }

    pub fn formats(&self) -> &[OutputFormat] {
        &self.formats
    }
}

impl<S: Storage> SeriesSink for FileSink<S> {
    async fn render(
        &self,
        chart: &ChartSpec,
        request: &SeriesRequest,
        series: &DerivedSeries,
    ) -> Result<Vec<String>> {
        let stem = file_stem(&chart.name, &request.selected_key);
        let mut written = Vec::with_capacity(self.formats.len());

        for format in &self.formats {
            let body = match format {
                OutputFormat::Json => render_json(chart, request, series)?,
                OutputFormat::Csv => render_delimited(series, b',')?,
                OutputFormat::Tsv => render_delimited(series, b'\t')?,
            };

            let file_name = format!("{}.{}", stem, format.extension());
            tracing::debug!("Writing {} ({} bytes)", file_name, body.len());
            self.storage.write_file(&file_name, &body).await?;
            written.push(file_name);
        }

        Ok(written)
    }
}

pub fn render_json(chart: &ChartSpec, request: &SeriesRequest, series: &DerivedSeries) -> Result<Vec<u8>> {
    let payload = ChartPayload::new(chart, request, series);
    Ok(serde_json::to_vec_pretty(&payload)?)
}

/// `Region,value` table, one row per point.
pub fn render_delimited(series: &DerivedSeries, delimiter: u8) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());

    if series.points.is_empty() {
        writer.write_record(["Region", "value"])?;
    }
    for point in &series.points {
        writer.serialize(point)?;
    }

    writer.into_inner().map_err(|e| SeriesError::RenderError {
        message: format!("failed to flush table output: {}", e),
    })
}

/// Encode one file name component: `[A-Za-z0-9-]` is kept, every other
/// UTF-8 byte becomes `~XX`. Distinct inputs give distinct outputs, and the
/// result never contains `_`.
pub fn encode_component(raw: &str) -> String {
    let mut encoded = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' {
            encoded.push(byte as char);
        } else {
            encoded.push_str(&format!("~{:02X}", byte));
        }
    }
    encoded
}

/// `<chart>_<key>`, both parts run through [`encode_component`].
pub fn file_stem(chart: &str, key: &str) -> String {
    format!("{}_{}", encode_component(chart), encode_component(key))
}
