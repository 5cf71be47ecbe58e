use std::{path::Path, time::Instant};

use serde::Serialize;

use crate::{
    classify::{self, Category},
    config::ReconConfig,
    dataset::{Dataset, Table},
    error::{ConfigError, ReconError},
    events::{RunReport, Stage, StageEvent},
    finalize, merge,
};

/// The four finalized category tables of one run plus what happened on the way.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResultSet {
    pub matched: Table,
    pub only_internal: Table,
    pub only_provider: Table,
    pub mismatched: Table,
    #[serde(skip)]
    pub report: RunReport,
}

impl ResultSet {
    pub fn get(&self, category: Category) -> &Table {
        match category {
            Category::Matched => &self.matched,
            Category::OnlyInternal => &self.only_internal,
            Category::OnlyProvider => &self.only_provider,
            Category::Mismatched => &self.mismatched,
        }
    }

    /// Category tables in fixed order: matched, only_internal, only_provider, mismatched.
    pub fn iter(&self) -> impl Iterator<Item = (Category, &Table)> {
        Category::ALL.into_iter().map(move |c| (c, self.get(c)))
    }
}

/// Runs merge, classify and finalize against one immutable configuration.
///
/// Holds no state between calls, so a single instance can serve concurrent
/// callers with independent inputs.
#[derive(Debug, Clone)]
pub struct Reconciler {
    config: ReconConfig,
}

impl Reconciler {
    pub fn new(config: ReconConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Loads configuration from `path`, `RECONCILE_CONFIG_PATH` or the default location.
    pub fn from_config_path(path: Option<&Path>) -> Result<Self, ConfigError> {
        Ok(Self {
            config: ReconConfig::locate(path)?,
        })
    }

    pub fn config(&self) -> &ReconConfig {
        &self.config
    }

    pub fn reconcile(
        &self,
        internal: &Dataset,
        provider: &Dataset,
    ) -> Result<ResultSet, ReconError> {
        let mut report = RunReport {
            internal_rows: internal.len(),
            provider_rows: provider.len(),
            ..RunReport::default()
        };

        let started = Instant::now();
        let merged = merge::merge(internal, provider, &self.config)?;
        report.events.push(StageEvent {
            stage: Stage::Merge,
            rows_in: internal.len() + provider.len(),
            rows_out: merged.len(),
            elapsed: started.elapsed(),
        });

        let started = Instant::now();
        let classified = classify::classify(&merged, &self.config)?;
        report.events.push(StageEvent {
            stage: Stage::Classify,
            rows_in: merged.len(),
            rows_out: classified.total_rows(),
            elapsed: started.elapsed(),
        });
        drop(merged);

        let started = Instant::now();
        let finalized = finalize::finalize(classified, &self.config);
        report.events.push(StageEvent {
            stage: Stage::Finalize,
            rows_in: finalized.total_rows(),
            rows_out: finalized.total_rows(),
            elapsed: started.elapsed(),
        });

        for category in Category::ALL {
            report.counts.insert(category, finalized.get(category).len());
        }
        report.differing_fields = finalized.differing_fields;

        Ok(ResultSet {
            matched: finalized.matched,
            only_internal: finalized.only_internal,
            only_provider: finalized.only_provider,
            mismatched: finalized.mismatched,
            report,
        })
    }
}

/// One-shot reconciliation with an already validated configuration.
pub fn reconcile(
    internal: &Dataset,
    provider: &Dataset,
    config: &ReconConfig,
) -> Result<ResultSet, ReconError> {
    Reconciler::new(config.clone())?.reconcile(internal, provider)
}
