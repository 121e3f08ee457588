// src/projection/label.rs

use super::palette::{PartyPalette, Tier};

/// Prefix of a multi-party projection, e.g. `"Toss up LPC/CPC"`. Case-sensitive.
pub const TOSS_UP_MARKER: &str = "Toss up";

/// What a projection label says, once parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Projection {
    /// One party at a confidence tier, e.g. `"NDP leaning"`.
    Single { party: String, tier: Tier },
    /// Uppercased party tokens in label order. Tokens are not checked
    /// against the palette here.
    TossUp { parties: Vec<String> },
    Unrecognized,
}

impl Projection {
    pub fn parse(label: &str, palette: &PartyPalette) -> Self {
        let label = label.trim();
        if label.starts_with(TOSS_UP_MARKER) {
            let parties = label
                .replace(TOSS_UP_MARKER, "")
                .trim()
                .split('/')
                .map(|token| token.trim().to_uppercase())
                .filter(|token| !token.is_empty())
                .collect();
            return Projection::TossUp { parties };
        }

        let Some(caps) = palette.single_pattern().captures(label) else {
            return Projection::Unrecognized;
        };
        match Tier::from_str(&caps[2]) {
            Some(tier) => Projection::Single {
                party: caps[1].to_uppercase(),
                tier,
            },
            None => Projection::Unrecognized,
        }
    }

    pub fn is_toss_up(&self) -> bool {
        matches!(self, Projection::TossUp { .. })
    }
}
