use std::{fmt, str::FromStr};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single typed cell. Missing cells are represented as `Option::None` by callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Value {
    Integer(i64),
    Decimal(Decimal),
    Boolean(bool),
    String(String),
}

pub type Cell = Option<Value>;

impl Value {
    pub fn as_display(&self) -> String {
        match self {
            Value::Integer(i) => i.to_string(),
            Value::Decimal(d) => d.to_string(),
            Value::Boolean(b) => b.to_string(),
            Value::String(s) => s.clone(),
        }
    }

    fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Value::Integer(i) => Some(Decimal::from(*i)),
            Value::Decimal(d) => Some(*d),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_display())
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<Decimal> for Value {
    fn from(value: Decimal) -> Self {
        Value::Decimal(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

pub fn display_cell(cell: &Cell) -> String {
    cell.as_ref().map(Value::as_display).unwrap_or_default()
}

/// Equality used by comparison pairs.
///
/// Numbers compare numerically across integer and decimal columns, text with
/// text, booleans with booleans. A null on either side never equals anything.
pub fn values_equal(left: &Cell, right: &Cell) -> bool {
    match (left, right) {
        (Some(Value::String(a)), Some(Value::String(b))) => a == b,
        (Some(Value::Boolean(a)), Some(Value::Boolean(b))) => a == b,
        (Some(a), Some(b)) => match (a.as_decimal(), b.as_decimal()) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        },
        _ => false,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnType {
    Integer,
    Decimal,
    Boolean,
    String,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnType::Integer => "integer",
            ColumnType::Decimal => "decimal",
            ColumnType::Boolean => "boolean",
            ColumnType::String => "string",
        };
        f.write_str(name)
    }
}

/// Field contents read as missing, matching the usual spreadsheet and
/// dataframe exports. Compared exactly, without trimming.
pub const NULL_MARKERS: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

pub fn is_null_marker(raw: &str) -> bool {
    NULL_MARKERS.contains(&raw)
}

#[derive(Debug, Clone)]
struct TypeCandidate {
    possible_integer: bool,
    possible_decimal: bool,
    possible_boolean: bool,
}

impl TypeCandidate {
    fn new() -> Self {
        Self {
            possible_integer: true,
            possible_decimal: true,
            possible_boolean: true,
        }
    }

    // A type only survives if every cell prints back to exactly its source text.
    fn observe(&mut self, raw: &str) {
        if self.possible_integer && parse_integer(raw).is_none() {
            self.possible_integer = false;
        }
        if self.possible_decimal && parse_decimal(raw).is_none() {
            self.possible_decimal = false;
        }
        if self.possible_boolean && parse_boolean(raw).is_none() {
            self.possible_boolean = false;
        }
    }

    fn decide(&self) -> ColumnType {
        if self.possible_integer {
            ColumnType::Integer
        } else if self.possible_decimal {
            ColumnType::Decimal
        } else if self.possible_boolean {
            ColumnType::Boolean
        } else {
            ColumnType::String
        }
    }
}

fn parse_integer(raw: &str) -> Option<i64> {
    raw.parse::<i64>().ok().filter(|value| value.to_string() == raw)
}

fn parse_decimal(raw: &str) -> Option<Decimal> {
    Decimal::from_str(raw).ok().filter(|value| value.to_string() == raw)
}

fn parse_boolean(raw: &str) -> Option<bool> {
    match raw {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

/// Infers one type for a whole column from its non-null cells.
///
/// Numbers and booleans are only chosen when no cell would print differently
/// from its source text, so `0012`, `+5` or `True` keep the column textual.
/// A column with no non-null cells is typed as text.
pub fn infer_column_type<'a, I>(values: I) -> ColumnType
where
    I: IntoIterator<Item = &'a str>,
{
    let mut candidate = TypeCandidate::new();
    let mut seen_any = false;
    for raw in values {
        if is_null_marker(raw) {
            continue;
        }
        seen_any = true;
        candidate.observe(raw);
    }
    if seen_any {
        candidate.decide()
    } else {
        ColumnType::String
    }
}

/// Converts a raw field into a cell of the given column type.
///
/// Null markers become `None`. Callers infer `ty` from the same column first,
/// so a failed parse falls back to text rather than erroring.
pub fn parse_typed_value(raw: &str, ty: ColumnType) -> Cell {
    if is_null_marker(raw) {
        return None;
    }
    let parsed = match ty {
        ColumnType::Integer => parse_integer(raw).map(Value::Integer),
        ColumnType::Decimal => parse_decimal(raw).map(Value::Decimal),
        ColumnType::Boolean => parse_boolean(raw).map(Value::Boolean),
        ColumnType::String => None,
    };
    Some(parsed.unwrap_or_else(|| Value::String(raw.to_string())))
}
