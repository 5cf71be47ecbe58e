use std::collections::{HashMap, HashSet};

use itertools::Itertools;
use serde::Serialize;

use crate::{
    config::{DuplicateKeyPolicy, ReconConfig},
    data::{Cell, Value},
    dataset::{Dataset, Table},
    error::ReconError,
};

const KEY_SEPARATOR: &str = "\u{1f}";

/// Which inputs contributed to a merged row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    Both,
    LeftOnly,
    RightOnly,
}

#[derive(Debug, Clone, Copy)]
enum Slot {
    Key(usize),
    Left(usize),
    Right(usize),
}

struct ProviderRow<'a> {
    cells: &'a [Cell],
    matched: bool,
}

/// Full outer join of `internal` (left) and `provider` (right) on the configured key.
///
/// Output columns follow the left column order, then the provider's non-key
/// columns, then the origin marker. Non-key columns present on both sides are
/// split using `merge_suffixes`. Rows come out in internal order, each followed
/// by its provider matches, then unmatched provider rows in provider order.
pub fn merge(
    internal: &Dataset,
    provider: &Dataset,
    config: &ReconConfig,
) -> Result<Table, ReconError> {
    let left_keys = key_indices(internal, &config.merge_key)?;
    let right_keys = key_indices(provider, &config.merge_key)?;

    let (columns, plan) =
        build_output_layout(internal, provider, &left_keys, &right_keys, config)?;
    let mut table = Table::new(columns);

    if config.duplicate_keys == DuplicateKeyPolicy::Reject {
        reject_duplicates(internal, &left_keys)?;
    }
    let (lookup, mut right_rows) =
        build_right_lookup(provider, &right_keys, config.duplicate_keys)?;

    for left in &internal.rows {
        let left = left.as_slice();
        let key = build_key(left, &left_keys);
        match lookup.get(&key) {
            Some(bucket) => {
                for &right_idx in bucket.iter() {
                    let right = &mut right_rows[right_idx];
                    right.matched = true;
                    table.rows.push(combine(
                        &plan,
                        Some(left),
                        Some(right.cells),
                        &left_keys,
                        &right_keys,
                        config.merge_status.marker(Origin::Both),
                    ));
                }
            }
            None => table.rows.push(combine(
                &plan,
                Some(left),
                None,
                &left_keys,
                &right_keys,
                config.merge_status.marker(Origin::LeftOnly),
            )),
        }
    }

    for right in right_rows.iter().filter(|row| !row.matched) {
        table.rows.push(combine(
            &plan,
            None,
            Some(right.cells),
            &left_keys,
            &right_keys,
            config.merge_status.marker(Origin::RightOnly),
        ));
    }

    Ok(table)
}

fn key_indices(dataset: &Dataset, keys: &[String]) -> Result<Vec<usize>, ReconError> {
    keys.iter()
        .map(|key| {
            dataset
                .column_index(key)
                .ok_or_else(|| ReconError::MissingMergeKey {
                    key: key.clone(),
                    side: dataset.source,
                })
        })
        .collect()
}

/// Join key from the source text of each key cell. Typed cells print back to
/// exactly what was read, so both sides agree whatever their column types.
fn build_key(cells: &[Cell], key_indices: &[usize]) -> String {
    key_indices
        .iter()
        .map(|&idx| {
            cells
                .get(idx)
                .and_then(|cell| cell.as_ref())
                .map(Value::as_display)
                .unwrap_or_default()
        })
        .join(KEY_SEPARATOR)
}

fn printable_key(key: &str) -> String {
    key.replace(KEY_SEPARATOR, ", ")
}

fn reject_duplicates(dataset: &Dataset, key_indices: &[usize]) -> Result<(), ReconError> {
    let mut seen = HashSet::with_capacity(dataset.len());
    for row in &dataset.rows {
        let key = build_key(row, key_indices);
        if !seen.insert(key.clone()) {
            return Err(ReconError::DuplicateKey {
                key: printable_key(&key),
                side: dataset.source,
            });
        }
    }
    Ok(())
}

fn build_right_lookup<'a>(
    provider: &'a Dataset,
    key_indices: &[usize],
    policy: DuplicateKeyPolicy,
) -> Result<(HashMap<String, Vec<usize>>, Vec<ProviderRow<'a>>), ReconError> {
    let mut map: HashMap<String, Vec<usize>> = HashMap::with_capacity(provider.len());
    let mut rows = Vec::with_capacity(provider.len());
    for (idx, cells) in provider.rows.iter().enumerate() {
        let key = build_key(cells, key_indices);
        let bucket = map.entry(key).or_default();
        if policy == DuplicateKeyPolicy::Reject && !bucket.is_empty() {
            return Err(ReconError::DuplicateKey {
                key: printable_key(&build_key(cells, key_indices)),
                side: provider.source,
            });
        }
        bucket.push(idx);
        rows.push(ProviderRow {
            cells,
            matched: false,
        });
    }
    Ok((map, rows))
}

fn build_output_layout(
    internal: &Dataset,
    provider: &Dataset,
    left_keys: &[usize],
    right_keys: &[usize],
    config: &ReconConfig,
) -> Result<(Vec<String>, Vec<Slot>), ReconError> {
    let (left_suffix, right_suffix) = &config.merge_suffixes;
    let left_values: HashSet<&str> = internal
        .headers
        .iter()
        .enumerate()
        .filter(|(idx, _)| !left_keys.contains(idx))
        .map(|(_, name)| name.as_str())
        .collect();
    let right_values: HashSet<&str> = provider
        .headers
        .iter()
        .enumerate()
        .filter(|(idx, _)| !right_keys.contains(idx))
        .map(|(_, name)| name.as_str())
        .collect();

    let mut columns = Vec::with_capacity(internal.headers.len() + provider.headers.len() + 1);
    let mut plan = Vec::with_capacity(columns.capacity());

    for (idx, name) in internal.headers.iter().enumerate() {
        if let Some(key_pos) = left_keys.iter().position(|k| *k == idx) {
            columns.push(name.clone());
            plan.push(Slot::Key(key_pos));
        } else if right_values.contains(name.as_str()) {
            columns.push(format!("{name}{left_suffix}"));
            plan.push(Slot::Left(idx));
        } else {
            columns.push(name.clone());
            plan.push(Slot::Left(idx));
        }
    }
    for (idx, name) in provider.headers.iter().enumerate() {
        if right_keys.contains(&idx) {
            continue;
        }
        if left_values.contains(name.as_str()) {
            columns.push(format!("{name}{right_suffix}"));
        } else {
            columns.push(name.clone());
        }
        plan.push(Slot::Right(idx));
    }
    columns.push(config.merge_indicator.clone());

    let mut seen = HashSet::with_capacity(columns.len());
    if let Some(dup) = columns.iter().find(|c| !seen.insert(c.as_str())) {
        return Err(ReconError::ColumnCollision {
            column: dup.clone(),
        });
    }
    Ok((columns, plan))
}

fn combine(
    plan: &[Slot],
    left: Option<&[Cell]>,
    right: Option<&[Cell]>,
    left_keys: &[usize],
    right_keys: &[usize],
    marker: &str,
) -> Vec<Cell> {
    let pick = |side: Option<&[Cell]>, idx: usize| {
        side.and_then(|cells| cells.get(idx).cloned().flatten())
    };
    let mut row = Vec::with_capacity(plan.len() + 1);
    for slot in plan {
        let cell = match *slot {
            Slot::Key(pos) => match left {
                Some(_) => pick(left, left_keys[pos]),
                None => pick(right, right_keys[pos]),
            },
            Slot::Left(idx) => pick(left, idx),
            Slot::Right(idx) => pick(right, idx),
        };
        row.push(cell);
    }
    row.push(Some(Value::String(marker.to_string())));
    row
}
