// src/join.rs

use anyhow::Result;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};

use crate::{
    boundary::GeographicDistrict,
    normalize::{key_for, CanonicalKey},
    projection::{resolve_projection_color, PartyPalette, ResolvedColor},
    table::ProjectionTable,
};

/// A boundary polygon with its projection attached.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedDistrict {
    pub district: GeographicDistrict,
    pub key: CanonicalKey,
    /// Raw label from the matched row; `None` when no row matched or the
    /// row had no projection cell.
    pub projection: Option<String>,
    pub color: ResolvedColor,
}

/// Counts describing how well the two sources lined up.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JoinReport {
    pub districts: usize,
    pub matched: usize,
    /// Table rows whose key repeated an earlier row's; the later row won.
    pub duplicate_keys: usize,
    /// District names of table rows that matched no boundary.
    pub unmatched_rows: Vec<String>,
}

impl JoinReport {
    pub fn unmatched_districts(&self) -> usize {
        self.districts - self.matched
    }
}

#[derive(Debug, Clone)]
pub struct JoinOutcome {
    pub districts: Vec<EnrichedDistrict>,
    pub report: JoinReport,
}

struct TableEntry<'a> {
    name: &'a str,
    projection: Option<&'a str>,
}

/// Left-join boundaries to projection rows on normalized district names.
///
/// The output has exactly one entry per boundary, in boundary order. When two
/// rows normalize to the same key the later row wins. Rows matching no
/// boundary are dropped with a warning. Fails only when the table lacks the
/// district or projection column.
pub fn join_districts(
    boundaries: Vec<GeographicDistrict>,
    table: &ProjectionTable,
    palette: &PartyPalette,
) -> Result<JoinOutcome> {
    table.ensure_join_columns()?;

    let mut report = JoinReport {
        districts: boundaries.len(),
        ..JoinReport::default()
    };

    let mut by_key: HashMap<CanonicalKey, TableEntry<'_>> = HashMap::with_capacity(table.len());
    for row in table.rows() {
        let name = row.district().unwrap_or_default();
        let key = key_for(row.district());
        if key.is_empty() {
            report.unmatched_rows.push(name.to_string());
            continue;
        }
        let entry = TableEntry {
            name,
            projection: row.projection(),
        };
        if let Some(previous) = by_key.insert(key.clone(), entry) {
            report.duplicate_keys += 1;
            debug!(%key, replaced = %previous.name, "duplicate district key, keeping later row");
        }
    }

    let mut used: HashSet<CanonicalKey> = HashSet::with_capacity(by_key.len());
    let districts: Vec<EnrichedDistrict> = boundaries
        .into_iter()
        .map(|district| {
            let key = key_for(district.name.as_deref());
            let entry = if key.is_empty() {
                None
            } else {
                by_key.get(&key)
            };
            if entry.is_some() {
                used.insert(key.clone());
                report.matched += 1;
            }
            let projection = entry.and_then(|e| e.projection).map(String::from);
            let color = resolve_projection_color(projection.as_deref(), palette);
            EnrichedDistrict {
                district,
                key,
                projection,
                color,
            }
        })
        .collect();

    let mut unmatched: Vec<(&CanonicalKey, &TableEntry<'_>)> = by_key
        .iter()
        .filter(|(key, _)| !used.contains(*key))
        .collect();
    unmatched.sort_by(|a, b| a.0.cmp(b.0));
    for (key, entry) in unmatched {
        warn!(district = %entry.name, %key, "projection row matches no boundary");
        report.unmatched_rows.push(entry.name.to_string());
    }

    info!(
        districts = report.districts,
        matched = report.matched,
        unmatched_districts = report.unmatched_districts(),
        unmatched_rows = report.unmatched_rows.len(),
        duplicate_keys = report.duplicate_keys,
        "joined projections to boundaries"
    );

    Ok(JoinOutcome { districts, report })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{DISTRICT_COLUMN, PROJECTION_COLUMN};
    use serde_json::{json, Map, Value};

    fn district(name: Option<&str>) -> GeographicDistrict {
        let mut properties = Map::new();
        properties.insert(
            "CF_NOMAN".into(),
            name.map_or(Value::Null, |n| Value::String(n.into())),
        );
        GeographicDistrict {
            name: name.map(String::from),
            geometry: json!({"type": "Point", "coordinates": [0, 0]}),
            properties,
        }
    }

    fn table(rows: &[(&str, Option<&str>)]) -> ProjectionTable {
        ProjectionTable::new(
            vec![DISTRICT_COLUMN.into(), PROJECTION_COLUMN.into()],
            rows.iter()
                .map(|(d, p)| vec![Some(d.to_string()), p.map(String::from)])
                .collect(),
        )
    }

    #[test]
    fn test_all_rows_match() -> Result<()> {
        let palette = PartyPalette::default();
        let geo = vec![
            district(Some("Avalon")),
            district(Some("Québec-Centre")),
            district(Some("Nunavut")),
        ];
        let rows = table(&[
            ("NUNAVUT", Some("NDP likely")),
            ("Avalon", Some("LPC safe")),
            ("Québec—Centre", Some("Toss up LPC/BQ")),
        ]);

        let outcome = join_districts(geo, &rows, &palette)?;
        assert_eq!(outcome.districts.len(), 3);
        assert!(outcome.districts.iter().all(|d| !d.color.is_no_data()));
        // boundary order is kept
        let names: Vec<_> = outcome
            .districts
            .iter()
            .map(|d| d.district.name.as_deref())
            .collect();
        assert_eq!(names, [Some("Avalon"), Some("Québec-Centre"), Some("Nunavut")]);
        assert_eq!(outcome.districts[0].color.to_string(), "#e31a1c");
        assert_eq!(outcome.report.matched, 3);
        assert_eq!(outcome.report.unmatched_districts(), 0);
        assert!(outcome.report.unmatched_rows.is_empty());
        Ok(())
    }

    #[test]
    fn test_unmatched_district_is_grey() -> Result<()> {
        let palette = PartyPalette::default();
        let geo = vec![district(Some("Avalon")), district(Some("Labrador")), district(None)];
        let rows = table(&[("Avalon", Some("LPC safe"))]);

        let outcome = join_districts(geo, &rows, &palette)?;
        assert_eq!(outcome.districts.len(), 3);
        for d in &outcome.districts[1..] {
            assert_eq!(d.projection, None);
            assert_eq!(d.color, ResolvedColor::NoData);
        }
        assert_eq!(outcome.report.unmatched_districts(), 2);
        Ok(())
    }

    #[test]
    fn test_duplicate_keys_last_write_wins() -> Result<()> {
        let palette = PartyPalette::default();
        let geo = vec![district(Some("Avalon"))];
        let rows = table(&[
            ("Avalon", Some("LPC safe")),
            ("AVALON", Some("CPC leaning")),
        ]);

        let outcome = join_districts(geo, &rows, &palette)?;
        assert_eq!(outcome.districts[0].projection.as_deref(), Some("CPC leaning"));
        assert_eq!(outcome.districts[0].color.to_string(), "#c6dbef");
        assert_eq!(outcome.report.duplicate_keys, 1);
        Ok(())
    }

    #[test]
    fn test_output_length_follows_boundaries() -> Result<()> {
        let palette = PartyPalette::default();
        let many_rows = table(&[
            ("Avalon", Some("LPC safe")),
            ("Nowhere", Some("CPC safe")),
            ("", Some("NDP safe")),
        ]);
        for n in [0, 1, 4] {
            let geo = (0..n).map(|_| district(Some("Avalon"))).collect();
            let outcome = join_districts(geo, &many_rows, &palette)?;
            assert_eq!(outcome.districts.len(), n);
        }

        let geo = vec![district(Some("Avalon")), district(Some("Labrador"))];
        let outcome = join_districts(geo, &table(&[]), &palette)?;
        assert_eq!(outcome.districts.len(), 2);
        assert!(outcome.districts.iter().all(|d| d.color.is_no_data()));
        Ok(())
    }

    #[test]
    fn test_unmatched_rows_are_reported() -> Result<()> {
        let palette = PartyPalette::default();
        let rows = table(&[
            ("Avalon", Some("LPC safe")),
            ("Nowhere", Some("CPC safe")),
            ("", Some("NDP safe")),
        ]);
        let outcome = join_districts(vec![district(Some("Avalon"))], &rows, &palette)?;
        assert_eq!(outcome.report.unmatched_rows, ["", "Nowhere"]);
        Ok(())
    }

    #[test]
    fn test_matched_row_without_label() -> Result<()> {
        let palette = PartyPalette::default();
        let rows = table(&[("Avalon", None), ("Labrador", Some("garbage"))]);
        let geo = vec![district(Some("Avalon")), district(Some("Labrador"))];
        let outcome = join_districts(geo, &rows, &palette)?;
        assert_eq!(outcome.districts[0].projection, None);
        assert!(outcome.districts[0].color.is_no_data());
        assert_eq!(outcome.districts[1].projection.as_deref(), Some("garbage"));
        assert!(outcome.districts[1].color.is_no_data());
        assert_eq!(outcome.report.matched, 2);
        Ok(())
    }

    #[test]
    fn test_missing_projection_column_fails_fast() {
        let rows = ProjectionTable::new(
            vec![DISTRICT_COLUMN.into()],
            vec![vec![Some("Avalon".into())]],
        );
        let result = join_districts(vec![district(Some("Avalon"))], &rows, &PartyPalette::default());
        assert!(result.is_err());
    }
}
