// src/map/mod.rs

pub mod geojson;
pub mod legend;

pub use geojson::GeoJsonRenderer;
pub use legend::{build_legend, LegendEntry, NO_DATA_LABEL};

use anyhow::Result;
use chrono::{DateTime, Local};
use std::path::PathBuf;

use crate::{join::EnrichedDistrict, projection::PartyPalette};

/// Everything a renderer needs to draw one map.
#[derive(Debug, Clone)]
pub struct ElectoralMap {
    pub title: String,
    pub queried_at: DateTime<Local>,
    pub districts: Vec<EnrichedDistrict>,
    pub legend: Vec<LegendEntry>,
}

impl ElectoralMap {
    /// Build the legend and the timestamped title around joined districts.
    pub fn assemble(
        districts: Vec<EnrichedDistrict>,
        palette: &PartyPalette,
        title: &str,
        queried_at: DateTime<Local>,
    ) -> Self {
        let legend = build_legend(palette, &districts);
        Self {
            title: format!(
                "{}\nData queried at {}",
                title,
                queried_at.format("%Y-%m-%d %H:%M:%S")
            ),
            queried_at,
            districts,
            legend,
        }
    }
}

/// Turns an assembled map into output files.
pub trait Renderer {
    /// Write the map and return the paths written.
    fn render(&self, map: &ElectoralMap) -> Result<Vec<PathBuf>>;
}
