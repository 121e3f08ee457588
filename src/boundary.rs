// src/boundary.rs

use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::{fs::File, io::BufReader, path::Path};
use tracing::{debug, info};

/// Attribute holding the official district name in the federal boundary files.
pub const DEFAULT_NAME_FIELD: &str = "CF_NOMAN";

/// One district polygon. The geometry and remaining attributes are passed
/// through to the output untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct GeographicDistrict {
    /// `None` when the attribute is null or not a string.
    pub name: Option<String>,
    pub geometry: Value,
    pub properties: Map<String, Value>,
}

#[derive(Deserialize)]
struct FeatureCollection {
    #[serde(rename = "type")]
    kind: String,
    features: Vec<Feature>,
}

#[derive(Deserialize)]
struct Feature {
    #[serde(default)]
    geometry: Value,
    #[serde(default)]
    properties: Option<Map<String, Value>>,
}

/// Read every feature of a GeoJSON FeatureCollection, keeping file order.
pub fn load_boundaries(path: impl AsRef<Path>, name_field: &str) -> Result<Vec<GeographicDistrict>> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("opening boundaries {}", path.display()))?;
    let reader = BufReader::new(file);
    let districts = parse_boundaries(reader, name_field)
        .with_context(|| format!("reading boundaries {}", path.display()))?;
    info!(path = %path.display(), districts = districts.len(), "loaded boundaries");
    Ok(districts)
}

/// Parse a FeatureCollection from any reader. Every feature must carry
/// `name_field` among its properties.
pub fn parse_boundaries<R: std::io::Read>(
    reader: R,
    name_field: &str,
) -> Result<Vec<GeographicDistrict>> {
    let collection: FeatureCollection =
        serde_json::from_reader(reader).context("parsing GeoJSON")?;
    if collection.kind != "FeatureCollection" {
        bail!("expected a FeatureCollection, found {:?}", collection.kind);
    }

    collection
        .features
        .into_iter()
        .enumerate()
        .map(|(i, feature)| {
            let properties = feature.properties.unwrap_or_default();
            let name = match properties.get(name_field) {
                Some(Value::String(s)) => Some(s.clone()),
                Some(other) => {
                    debug!(feature = i, value = %other, "non-string district name");
                    None
                }
                None => {
                    return Err(anyhow!(
                        "feature {} has no {:?} property",
                        i,
                        name_field
                    ))
                }
            };
            Ok(GeographicDistrict {
                name,
                geometry: feature.geometry,
                properties,
            })
        })
        .collect()
}
