// src/map/geojson.rs

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::{json, Value};
use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};
use tracing::info;

use super::{ElectoralMap, LegendEntry, Renderer};

/// Writes `<stem>.geojson` (one feature per district with `district`,
/// `projection` and `fill` properties) and `<stem>.legend.json`.
#[derive(Debug, Clone)]
pub struct GeoJsonRenderer {
    out_dir: PathBuf,
    stem: String,
}

#[derive(Serialize)]
struct LegendDocument<'a> {
    title: &'a str,
    queried_at: String,
    entries: &'a [LegendEntry],
}

impl GeoJsonRenderer {
    pub fn new(out_dir: impl Into<PathBuf>, stem: impl Into<String>) -> Self {
        Self {
            out_dir: out_dir.into(),
            stem: stem.into(),
        }
    }

    fn feature_collection(map: &ElectoralMap) -> Value {
        let features: Vec<Value> = map
            .districts
            .iter()
            .map(|d| {
                let mut properties = d.district.properties.clone();
                properties.insert("district".into(), json!(d.district.name));
                properties.insert("projection".into(), json!(d.projection));
                properties.insert("fill".into(), json!(d.color.to_string()));
                json!({
                    "type": "Feature",
                    "geometry": d.district.geometry,
                    "properties": properties,
                })
            })
            .collect();
        json!({
            "type": "FeatureCollection",
            "features": features,
        })
    }

    fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
        let tmp = path.with_extension("tmp");
        let file = File::create(&tmp).with_context(|| format!("creating {}", tmp.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, value)
            .with_context(|| format!("writing {}", tmp.display()))?;
        writer.flush()?;
        fs::rename(&tmp, path)
            .with_context(|| format!("renaming {} to {}", tmp.display(), path.display()))?;
        Ok(())
    }
}

impl Renderer for GeoJsonRenderer {
    fn render(&self, map: &ElectoralMap) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(&self.out_dir)
            .with_context(|| format!("creating output directory {}", self.out_dir.display()))?;

        let map_path = self.out_dir.join(format!("{}.geojson", self.stem));
        Self::write_json(&map_path, &Self::feature_collection(map))?;

        let legend_path = self.out_dir.join(format!("{}.legend.json", self.stem));
        let legend = LegendDocument {
            title: &map.title,
            queried_at: map.queried_at.to_rfc3339(),
            entries: &map.legend,
        };
        Self::write_json(&legend_path, &legend)?;

        info!(
            map = %map_path.display(),
            legend = %legend_path.display(),
            features = map.districts.len(),
            "wrote map"
        );
        Ok(vec![map_path, legend_path])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        boundary::GeographicDistrict,
        join::EnrichedDistrict,
        normalize::normalize_district_name,
        projection::{PartyPalette, ResolvedColor, Rgb},
    };
    use chrono::Local;
    use serde_json::Map;
    use tempfile::tempdir;

    fn sample_map() -> ElectoralMap {
        let mut properties = Map::new();
        properties.insert("CF_NOMAN".into(), json!("Avalon"));
        let districts = vec![
            EnrichedDistrict {
                district: GeographicDistrict {
                    name: Some("Avalon".into()),
                    geometry: json!({"type": "Point", "coordinates": [1.5, 2.5]}),
                    properties,
                },
                key: normalize_district_name("Avalon"),
                projection: Some("LPC safe".into()),
                color: ResolvedColor::Rgb(Rgb::new(0xe3, 0x1a, 0x1c)),
            },
            EnrichedDistrict {
                district: GeographicDistrict {
                    name: None,
                    geometry: Value::Null,
                    properties: Map::new(),
                },
                key: normalize_district_name(""),
                projection: None,
                color: ResolvedColor::NoData,
            },
        ];
        ElectoralMap::assemble(districts, &PartyPalette::default(), "Test", Local::now())
    }

    #[test]
    fn test_render_writes_map_and_legend() -> Result<()> {
        let tmp = tempdir()?;
        let out = tmp.path().join("docs");
        let renderer = GeoJsonRenderer::new(&out, "canada");
        let paths = renderer.render(&sample_map())?;
        assert_eq!(paths, [out.join("canada.geojson"), out.join("canada.legend.json")]);

        let map: Value = serde_json::from_reader(File::open(&paths[0])?)?;
        assert_eq!(map["type"], "FeatureCollection");
        let features = map["features"].as_array().unwrap();
        assert_eq!(features.len(), 2);
        assert_eq!(features[0]["properties"]["fill"], "#e31a1c");
        assert_eq!(features[0]["properties"]["projection"], "LPC safe");
        assert_eq!(features[0]["properties"]["CF_NOMAN"], "Avalon");
        assert_eq!(features[0]["geometry"]["coordinates"][0], 1.5);
        assert_eq!(features[1]["properties"]["fill"], "grey");
        assert!(features[1]["properties"]["projection"].is_null());

        let legend: Value = serde_json::from_reader(File::open(&paths[1])?)?;
        let entries = legend["entries"].as_array().unwrap();
        assert_eq!(entries.last().unwrap()["label"], "No data");
        assert_eq!(entries.last().unwrap()["color"], "grey");
        assert!(legend["title"].as_str().unwrap().starts_with("Test\nData queried at "));

        // no temp files left behind
        let leftovers = fs::read_dir(&out)?
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().map_or(false, |x| x == "tmp"))
            .count();
        assert_eq!(leftovers, 0);
        Ok(())
    }
}
