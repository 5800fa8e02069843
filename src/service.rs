use crate::aggregate::aggregate;
use crate::config::{AppConfig, FilterPolicy};
use crate::error::Result;
use crate::export::{write_dashboard_to_timestamped_dir, ExportFormat};
use crate::kpi::{summarize, KpiSummary};
use crate::loader;
use crate::logging::OperationTimer;
use crate::metrics::MetricsCollector;
use crate::models::{AggregateBundle, Dataset, FilterOptions, FilterSpec, PreviewPage};
use crate::validation::InputValidator;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, warn};

/// The dashboard backend: one loaded dataset serving every filter change
pub struct DashboardService {
    dataset: Dataset,
    kpis: KpiSummary,
    options: FilterOptions,
    policy: FilterPolicy,
    page_size: usize,
    metrics: MetricsCollector,
}

impl DashboardService {
    /// Load the dataset named by `config` and compute the KPI cards
    pub fn load(config: &AppConfig) -> Result<Self> {
        let path = Path::new(&config.data.path);
        InputValidator::validate_data_path(path)?;

        let started = Instant::now();
        let dataset = loader::load(path)?;
        let elapsed = started.elapsed();

        let mut service = Self::new(dataset, config);
        service.metrics.record_load(service.dataset.len(), elapsed);
        Ok(service)
    }

    /// Serve an already-loaded dataset
    #[must_use]
    pub fn new(dataset: Dataset, config: &AppConfig) -> Self {
        let kpis = summarize(dataset.records(), config.dashboard.top_categories);
        let options = dataset.filter_options();
        Self {
            dataset,
            kpis,
            options,
            policy: config.dashboard.filter_policy,
            page_size: config.dashboard.page_size,
            metrics: MetricsCollector::default(),
        }
    }

    /// The loaded table
    #[must_use]
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// KPI cards over the full dataset
    #[must_use]
    pub fn kpis(&self) -> &KpiSummary {
        &self.kpis
    }

    /// Dropdown options for the two filters
    #[must_use]
    pub fn filter_options(&self) -> &FilterOptions {
        &self.options
    }

    /// Local metric totals
    #[must_use]
    pub fn metrics(&self) -> &MetricsCollector {
        &self.metrics
    }

    /// Recompute every aggregate for a filter change
    pub fn refresh(&mut self, filter: &FilterSpec) -> Result<AggregateBundle> {
        if let Err(err) = InputValidator::validate_filter(filter, &self.options, self.policy) {
            warn!(error = %err, "Rejected dashboard filter");
            self.metrics.record_error(err.kind(), "refresh");
            return Err(err);
        }

        let timer = OperationTimer::new("aggregate");
        match aggregate(&self.dataset, filter) {
            Ok(bundle) => {
                self.metrics
                    .record_aggregation(bundle.preview.matched_rows, timer.elapsed());
                debug!(
                    matched_rows = bundle.preview.matched_rows,
                    months = bundle.monthly_sales.len(),
                    "Dashboard refreshed"
                );
                timer.finish();
                Ok(bundle)
            }
            Err(err) => {
                warn!(error = %err, "Dashboard aggregation failed");
                self.metrics.record_error(err.kind(), "refresh");
                Err(err)
            }
        }
    }

    /// Refresh for `filter` and return one page of the preview table
    pub fn preview_page(&mut self, filter: &FilterSpec, page: usize) -> Result<PreviewPage> {
        let bundle = self.refresh(filter)?;
        let page_count = bundle.preview.page_count(self.page_size);
        if let Err(err) = InputValidator::validate_page(page, page_count) {
            self.metrics.record_error(err.kind(), "preview_page");
            return Err(err);
        }

        Ok(PreviewPage {
            page,
            page_count,
            matched_rows: bundle.preview.matched_rows,
            rows: bundle.preview.page(page, self.page_size).to_vec(),
        })
    }

    /// Refresh for `filter` and write the result under `output_dir/timestamp/`
    pub fn export(
        &mut self,
        filter: &FilterSpec,
        format: ExportFormat,
        output_dir: &Path,
        timestamp: &str,
    ) -> Result<Vec<PathBuf>> {
        let bundle = self.refresh(filter)?;
        match write_dashboard_to_timestamped_dir(&self.kpis, &bundle, format, output_dir, timestamp)
        {
            Ok(files) => {
                self.metrics.record_export(format.as_str(), files.len());
                Ok(files)
            }
            Err(err) => {
                self.metrics.record_error(err.kind(), "export");
                Err(err)
            }
        }
    }
}
