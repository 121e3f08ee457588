// src/table/parse.rs

use anyhow::{anyhow, bail, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use super::{ProjectionTable, BG_COLOR_COLUMN, PROJECTION_COLUMN};

static BACKGROUND_COLOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"background-color:\s*(#[0-9a-fA-F]+|rgb\([^)]+\))")
        .expect("background-color pattern should compile")
});

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector should parse")
}

/// Concatenated text of an element with each text node trimmed and blank
/// nodes skipped, so `<td> 12 <b>x</b></td>` reads `"12x"`.
fn cell_text(el: ElementRef<'_>) -> String {
    el.text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect()
}

/// Background color of a cell: its `bgcolor` attribute, else the first
/// `background-color:` declaration in `style`.
fn background_hint(td: ElementRef<'_>) -> Option<String> {
    let el = td.value();
    if let Some(bg) = el.attr("bgcolor").filter(|v| !v.is_empty()) {
        return Some(bg.to_string());
    }
    el.attr("style")
        .and_then(|style| BACKGROUND_COLOR.captures(style))
        .map(|caps| caps[1].to_string())
}

/// Parse the `<table id=table_id>` projection table out of a page.
///
/// Headers come from `<thead>` when present, else from the first row. Body
/// rows without `<td>` cells (header rows repeated in the body) are skipped.
/// A trailing [`BG_COLOR_COLUMN`] column carries the projection cell's
/// background color.
pub fn parse_projection_table(html: &str, table_id: &str) -> Result<ProjectionTable> {
    let document = Html::parse_document(html);
    let table = document
        .select(&selector("table"))
        .find(|t| t.value().id() == Some(table_id))
        .ok_or_else(|| anyhow!("no <table id={:?}> in page", table_id))?;

    let header_row = table
        .select(&selector("thead"))
        .next()
        .or_else(|| table.select(&selector("tr")).next())
        .ok_or_else(|| anyhow!("table {:?} has no header row", table_id))?;

    let mut headers: Vec<String> = header_row
        .select(&selector("th, td"))
        .map(cell_text)
        .collect();
    let data_width = headers.len();
    let projection_idx = headers.iter().position(|h| h == PROJECTION_COLUMN);
    if projection_idx.is_none() {
        warn!(table = %table_id, "no {:?} header; background hints will be empty", PROJECTION_COLUMN);
    }
    headers.push(BG_COLOR_COLUMN.to_string());

    let Some(tbody) = table.select(&selector("tbody")).next() else {
        bail!("table {:?} has no <tbody>", table_id);
    };

    let td_sel = selector("td");
    let mut records = Vec::new();
    for tr in tbody.select(&selector("tr")) {
        let tds: Vec<ElementRef<'_>> = tr.select(&td_sel).collect();
        if tds.is_empty() {
            continue;
        }

        let bg = projection_idx
            .and_then(|i| tds.get(i))
            .and_then(|td| background_hint(*td));

        let mut record: Vec<Option<String>> = tds.iter().map(|td| Some(cell_text(*td))).collect();
        if record.len() != data_width {
            debug!(
                cells = record.len(),
                headers = data_width,
                "row width differs from header"
            );
        }
        record.resize(data_width, None);
        record.push(bg);
        records.push(record);
    }

    debug!(table = %table_id, columns = headers.len(), rows = records.len(), "parsed projection table");
    Ok(ProjectionTable::new(headers, records))
}
