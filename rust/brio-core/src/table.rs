//! Tabular values: fixed named/typed columns over variable rows.
//!
//! Column metadata is shared between a table and its copies through an
//! explicit `Arc` handle; rows are owned outright. Every write into a row
//! coerces the incoming value to its column's declared kind, so a table
//! never holds a cell of the wrong kind.

use crate::array::ArrayValue;
use crate::error::RuntimeError;
use crate::record::RecordValue;
use crate::value::{Value, ValueKind, CMP_UNORDERED};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub kind: ValueKind,
}

impl Column {
    /// Parses a `NAME` or `NAME@TYPE` spec. The name is case-normalized;
    /// a missing type declares a string column.
    pub fn parse(spec: &str) -> Result<Column, RuntimeError> {
        let spec = spec.trim();
        let (name, kind) = match spec.split_once('@') {
            Some((name, ty)) => {
                let kind = ValueKind::from_str(ty.trim()).map_err(|_| {
                    RuntimeError::InvalidObjectOperation(format!("bad column spec: {spec}"))
                })?;
                (name, kind)
            }
            None => (spec, ValueKind::String),
        };
        let name = RecordValue::normalize_key(name);
        if name.is_empty() {
            return Err(RuntimeError::InvalidObjectOperation(format!(
                "bad column spec: {spec}"
            )));
        }
        Ok(Column { name, kind })
    }

    pub fn spec(&self) -> String {
        format!("{}@{}", self.name, self.kind)
    }
}

#[derive(Debug, Clone, Default)]
pub struct TableValue {
    columns: Arc<Vec<Column>>,
    rows: Vec<Vec<Value>>,
}

impl TableValue {
    pub fn empty() -> Self {
        TableValue::default()
    }

    /// Builds a table from column specs. A spec whose normalized name is
    /// already present updates that column in place instead of appending.
    pub fn from_specs<S: AsRef<str>>(specs: &[S]) -> Result<Self, RuntimeError> {
        let mut columns: Vec<Column> = Vec::with_capacity(specs.len());
        for spec in specs {
            let column = Column::parse(spec.as_ref())?;
            match columns.iter_mut().find(|c| c.name == column.name) {
                Some(existing) => *existing = column,
                None => columns.push(column),
            }
        }
        Ok(TableValue {
            columns: Arc::new(columns),
            rows: Vec::new(),
        })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn find_column(&self, name: &str) -> Option<usize> {
        let name = RecordValue::normalize_key(name);
        self.columns.iter().position(|c| c.name == name)
    }

    /// Appends a row, coercing each value to its column's declared kind.
    pub fn push_row(&mut self, values: Vec<Value>) -> Result<(), RuntimeError> {
        if values.len() != self.columns.len() {
            return Err(RuntimeError::InvalidObjectOperation(format!(
                "row has {} values, table has {} columns",
                values.len(),
                self.columns.len()
            )));
        }
        let mut row = Vec::with_capacity(values.len());
        for (value, column) in values.into_iter().zip(self.columns.iter()) {
            row.push(coerce_to_column(value, column)?);
        }
        self.rows.push(row);
        Ok(())
    }

    /// Appends a record as a row: fields are re-projected into column order,
    /// coerced to the column kinds, with a zero-value for absent fields.
    pub fn push_record(&mut self, record: &RecordValue) -> Result<(), RuntimeError> {
        let row = self.project_record(record)?;
        self.rows.push(row);
        Ok(())
    }

    /// Replaces the 1-based row with a re-projected record.
    pub fn set_row_record(&mut self, index: usize, record: &RecordValue) -> Result<(), RuntimeError> {
        let i = index
            .checked_sub(1)
            .filter(|i| *i < self.rows.len())
            .ok_or_else(|| RuntimeError::NoSuchMember(format!("row {index}")))?;
        self.rows[i] = self.project_record(record)?;
        Ok(())
    }

    fn project_record(&self, record: &RecordValue) -> Result<Vec<Value>, RuntimeError> {
        let mut row = Vec::with_capacity(self.columns.len());
        for column in self.columns.iter() {
            match record.get(&column.name) {
                Some(value) => row.push(coerce_to_column(value.clone(), column)?),
                None => row.push(Value::zero_of(column.kind)),
            }
        }
        Ok(row)
    }

    pub fn row(&self, index: usize) -> Option<&[Value]> {
        index
            .checked_sub(1)
            .and_then(|i| self.rows.get(i))
            .map(|r| r.as_slice())
    }

    /// Reads the 1-based row back as a record keyed by column name.
    pub fn row_record(&self, index: usize) -> Option<RecordValue> {
        let row = self.row(index)?;
        let mut rec = RecordValue::new();
        for (column, value) in self.columns.iter().zip(row) {
            rec.set(&column.name, value.clone());
        }
        Some(rec)
    }

    pub fn rows_as_records(&self) -> ArrayValue {
        (1..=self.rows.len())
            .filter_map(|i| self.row_record(i))
            .map(Value::from)
            .collect()
    }

    pub fn cell(&self, row: usize, column: &str) -> Result<&Value, RuntimeError> {
        let c = self
            .find_column(column)
            .ok_or_else(|| RuntimeError::NoSuchColumn(RecordValue::normalize_key(column)))?;
        self.row(row)
            .map(|r| &r[c])
            .ok_or_else(|| RuntimeError::NoSuchMember(format!("row {row}")))
    }

    pub fn set_cell(&mut self, row: usize, column: &str, value: Value) -> Result<(), RuntimeError> {
        let c = self
            .find_column(column)
            .ok_or_else(|| RuntimeError::NoSuchColumn(RecordValue::normalize_key(column)))?;
        let coerced = coerce_to_column(value, &self.columns[c])?;
        let i = row
            .checked_sub(1)
            .filter(|i| *i < self.rows.len())
            .ok_or_else(|| RuntimeError::NoSuchMember(format!("row {row}")))?;
        self.rows[i][c] = coerced;
        Ok(())
    }

    /// Stable sort of the rows by one column's values.
    pub fn sort(&mut self, column: &str) -> Result<(), RuntimeError> {
        let c = self
            .find_column(column)
            .ok_or_else(|| RuntimeError::NoSuchColumn(RecordValue::normalize_key(column)))?;
        self.rows.sort_by(|a, b| match a[c].compare(&b[c]) {
            -1 => std::cmp::Ordering::Less,
            1 => std::cmp::Ordering::Greater,
            _ => std::cmp::Ordering::Equal,
        });
        Ok(())
    }

    /// Projects a subset of columns. Requested names match stored columns by
    /// prefix on the name portion; `"*"` short-circuits to a full copy.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<TableValue, RuntimeError> {
        if names.iter().any(|n| n.as_ref().trim() == "*") {
            return Ok(self.clone());
        }
        let mut picked = Vec::with_capacity(names.len());
        for requested in names {
            let name_part = requested
                .as_ref()
                .split('@')
                .next()
                .unwrap_or_default()
                .trim();
            let wanted = RecordValue::normalize_key(name_part);
            if wanted.is_empty() {
                return Err(RuntimeError::InvalidObjectOperation(format!(
                    "bad column spec: {}",
                    requested.as_ref().trim()
                )));
            }
            let index = self
                .columns
                .iter()
                .position(|c| c.name.starts_with(&wanted))
                .ok_or_else(|| RuntimeError::NoSuchColumn(wanted.clone()))?;
            picked.push(index);
        }
        let columns: Vec<Column> = picked.iter().map(|&i| self.columns[i].clone()).collect();
        let rows = self
            .rows
            .iter()
            .map(|row| picked.iter().map(|&i| row[i].clone()).collect())
            .collect();
        Ok(TableValue {
            columns: Arc::new(columns),
            rows,
        })
    }

    /// Inner join by linear merge over a shared key column. Both tables must
    /// already be sorted on the key; one output row is emitted per matching
    /// pair, keys present on only one side are dropped. Output columns are
    /// this table's columns followed by the other's minus its key column.
    pub fn join(&self, other: &TableValue, key: &str) -> Result<TableValue, RuntimeError> {
        let lk = self
            .find_column(key)
            .ok_or_else(|| RuntimeError::NoSuchColumn(RecordValue::normalize_key(key)))?;
        let rk = other
            .find_column(key)
            .ok_or_else(|| RuntimeError::NoSuchColumn(RecordValue::normalize_key(key)))?;

        let mut columns: Vec<Column> = self.columns.to_vec();
        columns.extend(
            other
                .columns
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != rk)
                .map(|(_, c)| c.clone()),
        );

        let mut rows = Vec::new();
        let (mut i, mut j) = (0, 0);
        while i < self.rows.len() && j < other.rows.len() {
            match self.rows[i][lk].compare(&other.rows[j][rk]) {
                0 => {
                    // Emit the cross product of the two equal-key runs.
                    let i_end = run_end(&self.rows, i, lk);
                    let j_end = run_end(&other.rows, j, rk);
                    for left in &self.rows[i..i_end] {
                        for right in &other.rows[j..j_end] {
                            let mut row = left.clone();
                            row.extend(
                                right
                                    .iter()
                                    .enumerate()
                                    .filter(|(c, _)| *c != rk)
                                    .map(|(_, v)| v.clone()),
                            );
                            rows.push(row);
                        }
                    }
                    i = i_end;
                    j = j_end;
                }
                ord if ord < 0 => i += 1,
                _ => j += 1,
            }
        }
        Ok(TableValue {
            columns: Arc::new(columns),
            rows,
        })
    }

    pub fn matches(&self, other: &TableValue) -> bool {
        *self.columns == *other.columns
            && self.rows.len() == other.rows.len()
            && self
                .rows
                .iter()
                .zip(&other.rows)
                .all(|(a, b)| a.iter().zip(b).all(|(x, y)| x.matches(y)))
    }

    /// Orders by column count, then row count, then cell by cell.
    pub fn compare(&self, other: &TableValue) -> i32 {
        match self.columns.len().cmp(&other.columns.len()) {
            std::cmp::Ordering::Less => return -1,
            std::cmp::Ordering::Greater => return 1,
            std::cmp::Ordering::Equal => {}
        }
        match self.rows.len().cmp(&other.rows.len()) {
            std::cmp::Ordering::Less => return -1,
            std::cmp::Ordering::Greater => return 1,
            std::cmp::Ordering::Equal => {}
        }
        for (a, b) in self.rows.iter().zip(&other.rows) {
            for (x, y) in a.iter().zip(b) {
                match x.compare(y) {
                    0 => continue,
                    CMP_UNORDERED => return CMP_UNORDERED,
                    ord => return ord,
                }
            }
        }
        0
    }

    /// Rows copy recursively; the column handle stays shared.
    pub(crate) fn copy_at_depth(&self, depth: usize) -> TableValue {
        TableValue {
            columns: Arc::clone(&self.columns),
            rows: self
                .rows
                .iter()
                .map(|row| row.iter().map(|v| v.copy_at_depth(depth + 1)).collect())
                .collect(),
        }
    }
}

fn coerce_to_column(mut value: Value, column: &Column) -> Result<Value, RuntimeError> {
    value.coerce(column.kind)?;
    Ok(value)
}

fn run_end(rows: &[Vec<Value>], start: usize, key: usize) -> usize {
    let mut end = start + 1;
    while end < rows.len() && rows[end][key].compare(&rows[start][key]) == 0 {
        end += 1;
    }
    end
}

impl fmt::Display for TableValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.rows_as_records())
    }
}
