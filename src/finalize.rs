//! Column-level cleanup of classified tables: drop the origin marker, make
//! sure `result` is present, then apply the configured renames. Rows are
//! never filtered or reordered here.

use crate::{
    classify::Classification,
    config::{RESULT_COLUMN, ReconConfig},
    dataset::Table,
};

pub fn finalize(classification: Classification, config: &ReconConfig) -> Classification {
    let Classification {
        matched,
        only_internal,
        only_provider,
        mismatched,
        differing_fields,
    } = classification;
    Classification {
        matched: finalize_table(matched, config),
        only_internal: finalize_table(only_internal, config),
        only_provider: finalize_table(only_provider, config),
        mismatched: finalize_table(mismatched, config),
        differing_fields,
    }
}

pub fn finalize_table(mut table: Table, config: &ReconConfig) -> Table {
    if let Some(idx) = table.column_index(&config.merge_indicator) {
        table.columns.remove(idx);
        for row in &mut table.rows {
            if idx < row.len() {
                row.remove(idx);
            }
        }
    }

    if table.column_index(RESULT_COLUMN).is_none() {
        table.columns.push(RESULT_COLUMN.to_string());
        for row in &mut table.rows {
            row.push(None);
        }
    }

    for column in &mut table.columns {
        if let Some(renamed) = config.rename_columns.get(column.as_str()) {
            *column = renamed.clone();
        }
    }
    table
}
