// src/map/legend.rs

use serde::Serialize;
use std::collections::HashSet;

use crate::{
    join::EnrichedDistrict,
    projection::{resolve_projection_color, PartyPalette, ResolvedColor, Tier, TOSS_UP_MARKER},
};

pub const NO_DATA_LABEL: &str = "No data";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegendEntry {
    pub label: String,
    pub color: ResolvedColor,
}

/// Legend rows: every party × tier in palette order, then each distinct
/// toss-up label seen on the map (first appearance first), then "No data".
pub fn build_legend(palette: &PartyPalette, districts: &[EnrichedDistrict]) -> Vec<LegendEntry> {
    let mut entries: Vec<LegendEntry> = palette
        .parties()
        .iter()
        .flat_map(|p| {
            Tier::ALL.into_iter().map(move |tier| LegendEntry {
                label: format!("{} {}", p.party, tier.as_str()),
                color: ResolvedColor::Rgb(p.color(tier)),
            })
        })
        .collect();

    let mut seen = HashSet::new();
    for label in districts.iter().filter_map(|d| d.projection.as_deref()) {
        if label.contains(TOSS_UP_MARKER) && seen.insert(label) {
            entries.push(LegendEntry {
                label: label.to_string(),
                color: resolve_projection_color(Some(label), palette),
            });
        }
    }

    entries.push(LegendEntry {
        label: NO_DATA_LABEL.to_string(),
        color: ResolvedColor::NoData,
    });
    entries
}
