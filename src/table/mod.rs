// src/table/mod.rs

pub mod parse;

pub use parse::parse_projection_table;

use anyhow::{bail, Result};
use once_cell::sync::Lazy;
use regex::Regex;

pub const DISTRICT_COLUMN: &str = "Electoral district";
pub const PROJECTION_COLUMN: &str = "Latest projection";
/// Appended column holding the projection cell's background color.
pub const BG_COLOR_COLUMN: &str = "BgColor_LatestProjection";

static DISTRICT_CODE_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+\s+").expect("district code pattern should compile"));

/// One scraped row: cells in header order, `None` where the source had none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTableRow {
    cells: Vec<(String, Option<String>)>,
}

impl RawTableRow {
    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(name, _)| name == column)
            .and_then(|(_, value)| value.as_deref())
    }

    pub fn district(&self) -> Option<&str> {
        self.get(DISTRICT_COLUMN)
    }

    pub fn projection(&self) -> Option<&str> {
        self.get(PROJECTION_COLUMN)
    }

    pub fn bg_color(&self) -> Option<&str> {
        self.get(BG_COLOR_COLUMN)
    }

    pub fn cells(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.cells
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_deref()))
    }

    fn set(&mut self, column: &str, value: Option<String>) {
        if let Some(slot) = self.cells.iter_mut().find(|(name, _)| name == column) {
            slot.1 = value;
        }
    }
}

/// The scraped projection table, rectangular by construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectionTable {
    headers: Vec<String>,
    rows: Vec<RawTableRow>,
}

impl ProjectionTable {
    /// Build from header names and positional records. Short records are
    /// padded with `None`, long ones truncated to the header width.
    pub fn new(headers: Vec<String>, records: Vec<Vec<Option<String>>>) -> Self {
        let rows = records
            .into_iter()
            .map(|mut record| {
                record.resize(headers.len(), None);
                RawTableRow {
                    cells: headers.iter().cloned().zip(record).collect(),
                }
            })
            .collect();
        Self { headers, rows }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[RawTableRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.headers.iter().any(|h| h == column)
    }

    /// Fail unless every column the join reads is present. A missing header
    /// means the page layout changed; carrying on would paint an all-grey map.
    pub fn ensure_join_columns(&self) -> Result<()> {
        for column in [DISTRICT_COLUMN, PROJECTION_COLUMN] {
            if !self.has_column(column) {
                bail!(
                    "projection table has no {:?} column (headers: {:?})",
                    column,
                    self.headers
                );
            }
        }
        Ok(())
    }

    /// Drop the leading numeric district code (`"10001 Avalon"` → `"Avalon"`)
    /// from every district cell, then trim.
    pub fn strip_district_codes(&mut self) {
        for row in &mut self.rows {
            let stripped = row
                .district()
                .map(|name| DISTRICT_CODE_PREFIX.replace(name, "").trim().to_string());
            row.set(DISTRICT_COLUMN, stripped);
        }
    }
}
