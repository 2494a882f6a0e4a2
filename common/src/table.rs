//! Extraction of pipe-delimited numeric rows from human-readable reports.
//!
//! A table starts after the first line containing its marker. From there on
//! every line is classified on its own by [`classify`]; only [`LineKind::Data`]
//! lines become rows, everything else is skipped without stopping the scan.

use std::str::Lines;

use thiserror::Error;
use tracing::trace;

/// When a table is considered finished
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Keep scanning until the end of the text
    EndOfInput,
    /// Stop at the first blank line once at least one row has been produced
    #[default]
    BlankLine,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSpec {
    /// Substring identifying the header line right above the rows
    pub marker: String,
    /// Minimum number of `|` separated fields for a row
    pub min_fields: usize,
    /// Lines containing this text are treated as headers
    pub exclude: Option<String>,
    pub termination: Termination,
}

impl TableSpec {
    pub fn new(marker: impl Into<String>, min_fields: usize) -> Self {
        Self {
            marker: marker.into(),
            min_fields,
            exclude: None,
            termination: Termination::default(),
        }
    }

    pub fn with_exclude(mut self, exclude: impl Into<String>) -> Self {
        self.exclude = Some(exclude.into());
        self
    }

    pub fn with_termination(mut self, termination: Termination) -> Self {
        self.termination = termination;
        self
    }

    pub fn scan<'t>(&self, text: &'t str) -> TableScanner<'t, '_> {
        TableScanner {
            lines: text.lines(),
            spec: self,
            state: ScanState::BeforeMarker,
            rows: 0,
        }
    }
}

/// One measurement: an integer key (thread count, CS size) and the values
/// measured for the candidate and the reference implementation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Row {
    pub key: u64,
    pub candidate: f64,
    pub reference: f64,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RowError {
    #[error("expected at least {expected} fields, found {found}")]
    TooFewFields { found: usize, expected: usize },
    #[error("field {column} is empty")]
    EmptyField { column: usize },
    #[error("field {column} is not numeric: {token:?}")]
    NotNumeric { column: usize, token: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum LineKind {
    Blank,
    Header,
    Separator,
    Data(Row),
    Noise(RowError),
}

/// Classifies a single line of a table body.
pub fn classify(line: &str, spec: &TableSpec) -> LineKind {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return LineKind::Blank;
    }
    if trimmed.contains(spec.marker.as_str())
        || spec
            .exclude
            .as_deref()
            .is_some_and(|exclude| trimmed.contains(exclude))
    {
        return LineKind::Header;
    }
    if is_separator(trimmed) {
        return LineKind::Separator;
    }
    match parse_row(trimmed, spec.min_fields) {
        Ok(row) => LineKind::Data(row),
        Err(err) => LineKind::Noise(err),
    }
}

/// A run of dashes, optionally broken up by `|` or `+` column joints
fn is_separator(line: &str) -> bool {
    line.contains("---")
        && line
            .chars()
            .all(|c| matches!(c, '-' | '|' | '+') || c.is_whitespace())
}

fn first_token<'a>(fields: &[&'a str], column: usize) -> Result<&'a str, RowError> {
    fields[column]
        .split_whitespace()
        .next()
        .ok_or(RowError::EmptyField { column })
}

fn parse_column<T: std::str::FromStr>(fields: &[&str], column: usize) -> Result<T, RowError> {
    let token = first_token(fields, column)?;
    token.parse().map_err(|_| RowError::NotNumeric {
        column,
        token: token.to_owned(),
    })
}

/// Parses the first three fields of a `|` separated line. Only the first
/// token of each field is used, so trailing units like `ops` are ignored.
pub fn parse_row(line: &str, min_fields: usize) -> Result<Row, RowError> {
    let fields: Vec<&str> = line.split('|').map(str::trim).collect();
    let expected = min_fields.max(3);
    if fields.len() < expected {
        return Err(RowError::TooFewFields {
            found: fields.len(),
            expected,
        });
    }

    Ok(Row {
        key: parse_column(&fields, 0)?,
        candidate: parse_column(&fields, 1)?,
        reference: parse_column(&fields, 2)?,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    BeforeMarker,
    InTable,
    Done,
}

/// Lazy iterator over the data rows of one table
pub struct TableScanner<'t, 's> {
    lines: Lines<'t>,
    spec: &'s TableSpec,
    state: ScanState,
    rows: usize,
}

impl Iterator for TableScanner<'_, '_> {
    type Item = Row;

    fn next(&mut self) -> Option<Row> {
        for line in self.lines.by_ref() {
            match self.state {
                ScanState::BeforeMarker => {
                    if line.contains(self.spec.marker.as_str()) {
                        self.state = ScanState::InTable;
                    }
                }
                ScanState::InTable => match classify(line, self.spec) {
                    LineKind::Data(row) => {
                        self.rows += 1;
                        return Some(row);
                    }
                    LineKind::Blank
                        if self.rows > 0 && self.spec.termination == Termination::BlankLine =>
                    {
                        self.state = ScanState::Done;
                        return None;
                    }
                    LineKind::Noise(err) => trace!("Discarding row {line:?}: {err}"),
                    _ => {}
                },
                ScanState::Done => return None,
            }
        }
        None
    }
}
