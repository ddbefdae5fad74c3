use crate::core::aggregation::{available_keys, derive_request};
use crate::domain::model::{ChartSpec, Derivation, Record, SeriesRequest};
use serde::{Deserialize, Serialize};

/// A viewer picked another dropdown option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionEvent {
    pub key: String,
}

impl SelectionEvent {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

/// Chart context owned by the UI layer: one chart definition over the loaded
/// records plus whatever key is currently selected.
#[derive(Debug, Clone)]
pub struct ChartSession<'a> {
    spec: ChartSpec,
    records: &'a [Record],
    selected: String,
}

impl<'a> ChartSession<'a> {
    /// Starts on the chart's configured selection, or on the first available
    /// key when it has none.
    pub fn new(spec: ChartSpec, records: &'a [Record]) -> Self {
        let selected = match &spec.selected {
            Some(key) => key.clone(),
            None => available_keys(records, spec.dimension)
                .first()
                .map(ToString::to_string)
                .unwrap_or_default(),
        };

        Self {
            spec,
            records,
            selected,
        }
    }

    pub fn spec(&self) -> &ChartSpec {
        &self.spec
    }

    pub fn selected(&self) -> &str {
        &self.selected
    }

    pub fn request(&self) -> SeriesRequest {
        SeriesRequest {
            dimension: self.spec.dimension,
            selected_key: self.selected.clone(),
            metric: self.spec.metric,
        }
    }

    /// Series for the current selection.
    pub fn current(&self) -> Derivation {
        derive_request(self.records, &self.request())
    }

    /// Apply a selection change and derive the series it asks for.
    pub fn select(&mut self, event: SelectionEvent) -> Derivation {
        tracing::debug!(
            "Chart '{}': selection {} -> {}",
            self.spec.name,
            self.selected,
            event.key
        );
        self.selected = event.key;
        self.current()
    }
}
