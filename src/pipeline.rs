// src/pipeline.rs

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use tracing::info;

use crate::{
    boundary::GeographicDistrict,
    config::Config,
    join::{join_districts, JoinOutcome, JoinReport},
    map::ElectoralMap,
    projection::PartyPalette,
    table::parse_projection_table,
};

#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub map: ElectoralMap,
    pub report: JoinReport,
}

/// Page HTML + boundaries → colored map, with no I/O.
pub fn build_map(
    html: &str,
    boundaries: Vec<GeographicDistrict>,
    palette: &PartyPalette,
    config: &Config,
    queried_at: DateTime<Local>,
) -> Result<PipelineOutput> {
    let mut table = parse_projection_table(html, &config.table_id)
        .context("parsing projection table")?;
    info!(rows = table.len(), "scraped projection table");
    table.ensure_join_columns()?;
    table.strip_district_codes();

    let JoinOutcome { districts, report } = join_districts(boundaries, &table, palette)?;
    let map = ElectoralMap::assemble(districts, palette, &config.title, queried_at);
    Ok(PipelineOutput { map, report })
}
