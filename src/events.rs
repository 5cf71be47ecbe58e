//! Structured records of what each pipeline stage did.
//!
//! The pipeline itself never logs; callers decide what to do with these.

use std::{collections::BTreeMap, fmt, time::Duration};

use serde::{Serialize, Serializer};

use crate::classify::Category;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Merge,
    Classify,
    Finalize,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Merge => f.write_str("merge"),
            Stage::Classify => f.write_str("classify"),
            Stage::Finalize => f.write_str("finalize"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageEvent {
    pub stage: Stage,
    pub rows_in: usize,
    pub rows_out: usize,
    #[serde(rename = "elapsed_ms", serialize_with = "duration_millis")]
    pub elapsed: Duration,
}

impl fmt::Display for StageEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} row(s) in, {} row(s) out ({:.3} ms)",
            self.stage,
            self.rows_in,
            self.rows_out,
            millis(&self.elapsed)
        )
    }
}

fn millis(value: &Duration) -> f64 {
    value.as_nanos() as f64 / 1_000_000.0
}

fn duration_millis<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(millis(value))
}

/// Everything observable about one reconciliation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunReport {
    pub internal_rows: usize,
    pub provider_rows: usize,
    pub events: Vec<StageEvent>,
    pub counts: BTreeMap<Category, usize>,
    pub differing_fields: BTreeMap<String, usize>,
}

impl RunReport {
    pub fn count(&self, category: Category) -> usize {
        self.counts.get(&category).copied().unwrap_or_default()
    }

    pub fn event(&self, stage: Stage) -> Option<&StageEvent> {
        self.events.iter().find(|event| event.stage == stage)
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts = Category::ALL
            .iter()
            .map(|category| format!("{category}={}", self.count(*category)))
            .collect::<Vec<_>>();
        write!(f, "{}", parts.join(", "))
    }
}
