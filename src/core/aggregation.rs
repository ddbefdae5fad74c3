//! Grouping and per-region averaging behind every chart.
//!
//! ```text
//! records ──group_by(dimension)──▶ GroupedTable ──[selected key]──▶ slice
//!                                      │                              │
//!                                      ▼                              ▼
//!                               available keys            average_metric(metric)
//!                                      └──────────── DerivedSeries ◀──┘
//! ```
//!
//! Everything here is pure: the same inputs always give the same
//! [`Derivation`], and problems in individual cells come back as
//! [`DeriveIssue`]s instead of errors.

use crate::domain::model::{
    Derivation, DerivedSeries, DeriveIssue, Dimension, GroupKey, Metric, Record, RegionAverage,
    SeriesRequest,
};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use std::collections::HashMap;

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// A record paired with its position in the source dataset.
pub type IndexedRecord<'a> = (usize, &'a Record);

/// Records partitioned by group key, keys kept in first-seen order.
#[derive(Debug, Clone)]
pub struct GroupedTable<'a> {
    dimension: Dimension,
    keys: Vec<GroupKey>,
    groups: HashMap<GroupKey, Vec<IndexedRecord<'a>>>,
}

impl<'a> GroupedTable<'a> {
    fn new(dimension: Dimension) -> Self {
        Self {
            dimension,
            keys: Vec::new(),
            groups: HashMap::new(),
        }
    }

    fn insert(&mut self, key: GroupKey, record: IndexedRecord<'a>) {
        match self.groups.get_mut(&key) {
            Some(group) => group.push(record),
            None => {
                self.keys.push(key.clone());
                self.groups.insert(key, vec![record]);
            }
        }
    }

    pub fn dimension(&self) -> Dimension {
        self.dimension
    }

    pub fn keys(&self) -> &[GroupKey] {
        &self.keys
    }

    pub fn get(&self, key: &GroupKey) -> Option<&[IndexedRecord<'a>]> {
        self.groups.get(key).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Groups in first-seen key order.
    pub fn iter(&self) -> impl Iterator<Item = (&GroupKey, &[IndexedRecord<'a>])> + '_ {
        self.keys
            .iter()
            .filter_map(move |key| self.groups.get(key).map(|group| (key, group.as_slice())))
    }
}

/// Extract the calendar year of an order date.
///
/// Accepts ISO dates, the `M/D/YYYY` form of spreadsheet exports, RFC 3339
/// timestamps and plain `date time` strings. Only four-digit years count.
pub fn parse_order_year(raw: &str) -> Option<i32> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let year = DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.year())
        .ok()
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
                .map(|date| date.year())
        })
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
                .map(|dt| dt.year())
        })?;

    (1000..=9999).contains(&year).then_some(year)
}

/// Parse a metric cell. Empty, non-numeric and non-finite values are rejected.
pub fn parse_metric(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Partition `records` by `dimension`.
///
/// Under [`Dimension::Year`] a record whose order date does not parse is left
/// out of every group and reported as [`DeriveIssue::Parse`].
pub fn group_by(records: &[Record], dimension: Dimension) -> (GroupedTable<'_>, Vec<DeriveIssue>) {
    let mut table = GroupedTable::new(dimension);
    let mut issues = Vec::new();

    for (index, record) in records.iter().enumerate() {
        let key = match dimension {
            Dimension::Year => match parse_order_year(&record.order_date) {
                Some(year) => GroupKey::Year(year),
                None => {
                    issues.push(DeriveIssue::Parse {
                        index,
                        value: record.order_date.clone(),
                    });
                    continue;
                }
            },
            Dimension::Category => GroupKey::Category(record.category.clone()),
        };
        table.insert(key, (index, record));
    }

    tracing::debug!(
        "Grouped {} records by {} into {} groups ({} skipped)",
        records.len(),
        dimension,
        table.len(),
        issues.len()
    );

    (table, issues)
}

/// Distinct keys of `dimension` in first-seen order.
pub fn available_keys(records: &[Record], dimension: Dimension) -> Vec<GroupKey> {
    let (table, _) = group_by(records, dimension);
    table.keys
}

/// Average `metric` per region over one group slice.
///
/// Regions come out in first-seen order. A cell that is not a number adds 0
/// to its region's sum but still counts toward the region's record count.
/// Issues carry the dataset index paired with each record.
pub fn average_metric(
    slice: &[IndexedRecord<'_>],
    metric: Metric,
) -> (Vec<RegionAverage>, Vec<DeriveIssue>) {
    let mut order: Vec<&str> = Vec::new();
    let mut totals: HashMap<&str, (f64, usize)> = HashMap::new();
    let mut issues = Vec::new();

    for &(index, record) in slice {
        let raw = record.metric_value(metric);
        let value = match parse_metric(raw) {
            Some(value) => value,
            None => {
                issues.push(DeriveIssue::InvalidMetric {
                    index,
                    region: record.region.clone(),
                    metric,
                    value: raw.to_string(),
                });
                0.0
            }
        };

        let region = record.region.as_str();
        let entry = totals.entry(region).or_insert_with(|| {
            order.push(region);
            (0.0, 0)
        });
        entry.0 += value;
        entry.1 += 1;
    }

    let points = order
        .into_iter()
        .filter_map(|region| {
            totals.get(region).map(|(sum, count)| RegionAverage {
                region: region.to_string(),
                value: sum / *count as f64,
            })
        })
        .collect();

    (points, issues)
}

/// Group, select one slice and average it.
///
/// A key with no group yields empty points and a [`DeriveIssue::UnknownKey`];
/// an empty dataset yields an empty series and no issues at all.
pub fn derive(
    records: &[Record],
    dimension: Dimension,
    selected_key: &GroupKey,
    metric: Metric,
) -> Derivation {
    let (table, mut issues) = group_by(records, dimension);

    let points = match table.get(selected_key) {
        Some(slice) => {
            let (points, metric_issues) = average_metric(slice, metric);
            issues.extend(metric_issues);
            points
        }
        None => {
            if !records.is_empty() {
                issues.push(DeriveIssue::UnknownKey {
                    dimension,
                    key: selected_key.to_string(),
                });
            }
            Vec::new()
        }
    };

    Derivation {
        series: DerivedSeries {
            available_keys: table.keys,
            points,
        },
        issues,
    }
}

/// [`derive`] driven by a request whose key is still the raw dropdown value.
pub fn derive_request(records: &[Record], request: &SeriesRequest) -> Derivation {
    match GroupKey::parse(request.dimension, &request.selected_key) {
        Some(key) => derive(records, request.dimension, &key, request.metric),
        None => {
            let (table, mut issues) = group_by(records, request.dimension);
            if !records.is_empty() {
                issues.push(DeriveIssue::UnknownKey {
                    dimension: request.dimension,
                    key: request.selected_key.clone(),
                });
            }
            Derivation {
                series: DerivedSeries {
                    available_keys: table.keys,
                    points: Vec::new(),
                },
                issues,
            }
        }
    }
}
