//! Four-way partition of merged rows.
//!
//! Origin decides the one-sided categories. Rows present on both sides are
//! `matched` when every comparison pair agrees and `mismatched` otherwise, so
//! the two always split the `both` rows exactly.

use std::{collections::BTreeMap, fmt};

use serde::Serialize;

use crate::{
    config::{RESULT_COLUMN, ReconConfig},
    data::{Cell, Value, values_equal},
    dataset::Table,
    error::ReconError,
    merge::Origin,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Matched,
    OnlyInternal,
    OnlyProvider,
    Mismatched,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Matched,
        Category::OnlyInternal,
        Category::OnlyProvider,
        Category::Mismatched,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Category::Matched => "matched",
            Category::OnlyInternal => "only_internal",
            Category::OnlyProvider => "only_provider",
            Category::Mismatched => "mismatched",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

static NULL_CELL: Cell = None;

/// Comparison pairs resolved to column positions of one merged table.
#[derive(Debug, Clone)]
pub struct RowClassifier<'a> {
    config: &'a ReconConfig,
    indicator: usize,
    pairs: Vec<(String, usize, usize)>,
}

impl<'a> RowClassifier<'a> {
    pub fn new(columns: &[String], config: &'a ReconConfig) -> Result<Self, ReconError> {
        let find = |name: &str| {
            columns
                .iter()
                .position(|c| c == name)
                .ok_or_else(|| ReconError::MissingColumn {
                    column: name.to_string(),
                    stage: "classification",
                })
        };
        let indicator = find(&config.merge_indicator)?;
        let pairs = config
            .comparison_pairs
            .iter()
            .map(|pair| {
                let (left, right) = pair.columns(&config.merge_suffixes);
                Ok((pair.base.clone(), find(&left)?, find(&right)?))
            })
            .collect::<Result<Vec<_>, ReconError>>()?;
        Ok(Self {
            config,
            indicator,
            pairs,
        })
    }

    pub fn origin(&self, row: &[Cell], row_idx: usize) -> Result<Origin, ReconError> {
        let marker = match row.get(self.indicator) {
            Some(Some(Value::String(marker))) => marker.as_str(),
            other => {
                return Err(ReconError::UnknownOrigin {
                    value: other
                        .and_then(|cell| cell.as_ref())
                        .map(Value::as_display)
                        .unwrap_or_default(),
                    row: row_idx,
                });
            }
        };
        self.config
            .merge_status
            .origin_of(marker)
            .ok_or_else(|| ReconError::UnknownOrigin {
                value: marker.to_string(),
                row: row_idx,
            })
    }

    /// Base names of the comparison pairs that disagree on this row. A cell
    /// beyond the end of the row counts as null.
    pub fn differing_fields<'r>(&'r self, row: &'r [Cell]) -> impl Iterator<Item = &'r str> + 'r {
        let cell = move |idx: usize| row.get(idx).unwrap_or(&NULL_CELL);
        self.pairs
            .iter()
            .filter(move |(_, left, right)| !values_equal(cell(*left), cell(*right)))
            .map(|(base, _, _)| base.as_str())
    }

    pub fn category(&self, row: &[Cell], row_idx: usize) -> Result<Category, ReconError> {
        Ok(match self.origin(row, row_idx)? {
            Origin::LeftOnly => Category::OnlyInternal,
            Origin::RightOnly => Category::OnlyProvider,
            Origin::Both if self.differing_fields(row).next().is_none() => Category::Matched,
            Origin::Both => Category::Mismatched,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Classification {
    pub matched: Table,
    pub only_internal: Table,
    pub only_provider: Table,
    pub mismatched: Table,
    /// How many `both` rows disagree on each comparison field.
    pub differing_fields: BTreeMap<String, usize>,
}

impl Classification {
    pub fn get(&self, category: Category) -> &Table {
        match category {
            Category::Matched => &self.matched,
            Category::OnlyInternal => &self.only_internal,
            Category::OnlyProvider => &self.only_provider,
            Category::Mismatched => &self.mismatched,
        }
    }

    fn get_mut(&mut self, category: Category) -> &mut Table {
        match category {
            Category::Matched => &mut self.matched,
            Category::OnlyInternal => &mut self.only_internal,
            Category::OnlyProvider => &mut self.only_provider,
            Category::Mismatched => &mut self.mismatched,
        }
    }

    pub fn total_rows(&self) -> usize {
        Category::ALL.iter().map(|c| self.get(*c).len()).sum()
    }
}

/// Splits `merged` into the four categories, tagging each row with its label
/// in the `result` column. Row order within a category follows `merged`.
pub fn classify(merged: &Table, config: &ReconConfig) -> Result<Classification, ReconError> {
    let classifier = RowClassifier::new(&merged.columns, config)?;

    let result_idx = merged.column_index(RESULT_COLUMN);
    let mut columns = merged.columns.clone();
    if result_idx.is_none() {
        columns.push(RESULT_COLUMN.to_string());
    }

    let mut classification = Classification {
        matched: Table::new(columns.clone()),
        only_internal: Table::new(columns.clone()),
        only_provider: Table::new(columns.clone()),
        mismatched: Table::new(columns),
        differing_fields: config
            .comparison_pairs
            .iter()
            .map(|pair| (pair.base.clone(), 0))
            .collect(),
    };

    let width = merged.columns.len();
    for (row_idx, row) in merged.rows.iter().enumerate() {
        if row.len() != width {
            return Err(ReconError::RowWidth {
                row: row_idx,
                found: row.len(),
                expected: width,
            });
        }
        let category = classifier.category(row, row_idx)?;
        if category == Category::Mismatched {
            for field in classifier.differing_fields(row) {
                if let Some(count) = classification.differing_fields.get_mut(field) {
                    *count += 1;
                }
            }
        }

        let label = Some(Value::String(config.result_labels.get(category).to_string()));
        let mut tagged = row.clone();
        match result_idx.and_then(|idx| tagged.get_mut(idx)) {
            Some(slot) => *slot = label,
            None => tagged.push(label),
        }
        classification.get_mut(category).rows.push(tagged);
    }

    Ok(classification)
}
