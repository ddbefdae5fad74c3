use crate::domain::model::Record;
use crate::utils::error::{Result, SeriesError};
use csv::{ByteRecord, ReaderBuilder, StringRecord, Trim};
use std::path::Path;

pub const REQUIRED_COLUMNS: [&str; 5] = ["Region", "Category", "Order Date", "Profit", "Sales"];

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Column positions of the required fields within one file's header.
struct ColumnPositions {
    region: usize,
    category: usize,
    order_date: usize,
    profit: usize,
    sales: usize,
}

impl ColumnPositions {
    fn locate(headers: &StringRecord) -> Result<Self> {
        let find = |column: &str| {
            headers
                .iter()
                .position(|header| header == column)
                .ok_or_else(|| SeriesError::MissingColumnError {
                    column: column.to_string(),
                })
        };

        Ok(Self {
            region: find("Region")?,
            category: find("Category")?,
            order_date: find("Order Date")?,
            profit: find("Profit")?,
            sales: find("Sales")?,
        })
    }

    fn extract(&self, row: &ByteRecord) -> Record {
        let field = |index: usize| {
            row.get(index)
                .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
                .unwrap_or_default()
        };

        Record {
            region: field(self.region),
            category: field(self.category),
            order_date: field(self.order_date),
            profit: field(self.profit),
            sales: field(self.sales),
        }
    }
}

/// Field delimiter for a dataset path: tab for `.tsv`, comma otherwise.
pub fn delimiter_for(path: &str) -> u8 {
    match Path::new(path).extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => b'\t',
        _ => b',',
    }
}

/// Parse a delimited dataset into records.
///
/// Extra columns are ignored and column order does not matter. Cells that
/// are not valid UTF-8 (older spreadsheet exports) are decoded lossily.
pub fn read_records(data: &[u8], delimiter: u8) -> Result<Vec<Record>> {
    let data = data.strip_prefix(UTF8_BOM).unwrap_or(data);

    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(Trim::Headers)
        .from_reader(data);

    let headers = reader.headers()?.clone();
    let positions = ColumnPositions::locate(&headers)?;

    let mut records = Vec::new();
    for row in reader.byte_records() {
        records.push(positions.extract(&row?));
    }

    tracing::debug!(
        "Parsed {} records ({} columns, {} ignored)",
        records.len(),
        headers.len(),
        headers.len().saturating_sub(REQUIRED_COLUMNS.len())
    );

    Ok(records)
}
