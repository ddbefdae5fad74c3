use crate::core::ingest;
use crate::core::session::{ChartSession, SelectionEvent};
use crate::domain::model::{ChartSpec, Derivation, DeriveIssue, Record};
use crate::domain::ports::{ConfigProvider, SeriesSink, Storage};
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

/// Outcome of one engine run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub records: usize,
    pub charts: usize,
    pub rendered: usize,
    pub issues: usize,
    pub outputs: Vec<String>,
}

/// Loads the dataset once, then derives and renders every configured chart.
pub struct ChartEngine<S: Storage, K: SeriesSink, C: ConfigProvider> {
    storage: S,
    sink: K,
    config: C,
    monitor: SystemMonitor,
}

impl<S: Storage, K: SeriesSink, C: ConfigProvider> ChartEngine<S, K, C> {
    pub fn new(storage: S, sink: K, config: C) -> Self {
        Self::new_with_monitoring(storage, sink, config, false)
    }

    pub fn new_with_monitoring(storage: S, sink: K, config: C, monitor_enabled: bool) -> Self {
        Self {
            storage,
            sink,
            config,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn load_records(&self) -> Result<Vec<Record>> {
        let path = self.config.data_path();
        tracing::info!("📥 Loading dataset from {}", path);

        let data = self.storage.read_file(path).await?;
        let records = ingest::read_records(&data, ingest::delimiter_for(path))?;

        tracing::info!("Loaded {} records", records.len());
        Ok(records)
    }

    pub async fn run(&self) -> Result<RunSummary> {
        tracing::info!("Starting chart derivation");
        self.monitor.log_stats("Start");

        let records = self.load_records().await?;
        self.monitor.log_stats("Load");

        let charts = self.config.charts();
        let mut summary = RunSummary {
            records: records.len(),
            charts: charts.len(),
            ..RunSummary::default()
        };

        for chart in charts {
            self.render_chart(chart, &records, &mut summary).await?;
        }
        self.monitor.log_stats("Render");

        tracing::info!(
            "✅ Rendered {} series for {} charts ({} issues)",
            summary.rendered,
            summary.charts,
            summary.issues
        );
        self.monitor.log_final_stats();

        Ok(summary)
    }

    async fn render_chart(
        &self,
        chart: ChartSpec,
        records: &[Record],
        summary: &mut RunSummary,
    ) -> Result<()> {
        let mut session = ChartSession::new(chart, records);
        tracing::info!(
            "📈 Chart '{}': average {} by {}, selected '{}'",
            session.spec().name,
            session.spec().metric,
            session.spec().dimension,
            session.selected()
        );

        let initial = session.current();
        self.emit(&session, &initial, &initial.issues, summary).await?;

        if !self.config.render_all_keys() {
            return Ok(());
        }

        let remaining: Vec<String> = initial
            .series
            .available_keys
            .iter()
            .map(ToString::to_string)
            .filter(|key| key != session.selected())
            .collect();

        // Every reselection regroups the whole dataset; its unparseable
        // dates were already reported with the initial selection.
        for key in remaining {
            let derivation = session.select(SelectionEvent::new(key));
            let slice_issues: Vec<DeriveIssue> = derivation
                .issues
                .iter()
                .filter(|issue| !matches!(issue, DeriveIssue::Parse { .. }))
                .cloned()
                .collect();
            self.emit(&session, &derivation, &slice_issues, summary).await?;
        }

        Ok(())
    }

    async fn emit(
        &self,
        session: &ChartSession<'_>,
        derivation: &Derivation,
        issues: &[DeriveIssue],
        summary: &mut RunSummary,
    ) -> Result<()> {
        report_issues(&session.spec().name, issues);

        let request = session.request();
        let outputs = self
            .sink
            .render(session.spec(), &request, &derivation.series)
            .await?;

        tracing::debug!(
            "Chart '{}' [{}]: {} points -> {:?}",
            session.spec().name,
            request.selected_key,
            derivation.series.points.len(),
            outputs
        );

        summary.rendered += 1;
        summary.issues += issues.len();
        summary.outputs.extend(outputs);
        Ok(())
    }
}

// Unknown keys are worth a line each; cell-level problems are summarized so a
// dirty column does not flood the log.
fn report_issues(chart: &str, issues: &[DeriveIssue]) {
    let mut bad_dates = 0;
    let mut bad_metrics = 0;

    for issue in issues {
        match issue {
            DeriveIssue::UnknownKey { .. } => tracing::warn!("⚠️ Chart '{}': {}", chart, issue),
            DeriveIssue::Parse { .. } => {
                bad_dates += 1;
                tracing::debug!("Chart '{}': {}", chart, issue);
            }
            DeriveIssue::InvalidMetric { .. } => {
                bad_metrics += 1;
                tracing::debug!("Chart '{}': {}", chart, issue);
            }
        }
    }

    if bad_dates > 0 {
        tracing::warn!(
            "⚠️ Chart '{}': {} records skipped for unparseable order dates",
            chart,
            bad_dates
        );
    }
    if bad_metrics > 0 {
        tracing::warn!(
            "⚠️ Chart '{}': {} non-numeric metric values counted as 0",
            chart,
            bad_metrics
        );
    }
}
