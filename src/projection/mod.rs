// src/projection/mod.rs

pub mod color;
pub mod label;
pub mod palette;

pub use color::{mix_colors, ResolvedColor, Rgb, NO_DATA_COLOR};
pub use label::{Projection, TOSS_UP_MARKER};
pub use palette::{PartyColors, PartyPalette, Tier};

use tracing::{debug, trace};

/// Map a raw projection label to the district's fill color.
///
/// Never fails: absent, empty and unparsable labels, and toss-ups naming no
/// known party, all come back as [`ResolvedColor::NoData`].
pub fn resolve_projection_color(label: Option<&str>, palette: &PartyPalette) -> ResolvedColor {
    let Some(label) = label.filter(|l| !l.is_empty()) else {
        return ResolvedColor::NoData;
    };

    match Projection::parse(label, palette) {
        Projection::Single { party, tier } => palette.color(&party, tier).into(),
        Projection::TossUp { parties } => {
            let safe: Vec<Rgb> = parties
                .iter()
                .filter_map(|party| {
                    let color = palette.color(party, Tier::Safe);
                    if color.is_none() {
                        debug!(%party, %label, "dropping unknown party from toss-up");
                    }
                    color
                })
                .collect();
            mix_colors(&safe).into()
        }
        Projection::Unrecognized => {
            trace!(%label, "unrecognized projection");
            ResolvedColor::NoData
        }
    }
}
