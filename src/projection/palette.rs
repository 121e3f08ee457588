// src/projection/palette.rs

use anyhow::{bail, Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fs, path::Path};

use super::color::Rgb;

/// Confidence tier of a single-party projection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Safe,
    Likely,
    Leaning,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Safe, Tier::Likely, Tier::Leaning];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Safe => "safe",
            Tier::Likely => "likely",
            Tier::Leaning => "leaning",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "safe" => Some(Tier::Safe),
            "likely" => Some(Tier::Likely),
            "leaning" => Some(Tier::Leaning),
            _ => None,
        }
    }
}

/// One party's colors, one per tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyColors {
    pub party: String,
    pub safe: Rgb,
    pub likely: Rgb,
    pub leaning: Rgb,
}

impl PartyColors {
    pub fn color(&self, tier: Tier) -> Rgb {
        match tier {
            Tier::Safe => self.safe,
            Tier::Likely => self.likely,
            Tier::Leaning => self.leaning,
        }
    }
}

/// Ordered party → tier → color table.
///
/// The single-projection pattern is derived from the party codes, so the set
/// of parties the parser recognizes is always exactly the palette's key set.
#[derive(Debug, Clone)]
pub struct PartyPalette {
    parties: Vec<PartyColors>,
    index: HashMap<String, usize>,
    single: Regex,
}

impl PartyPalette {
    /// Validate and index `parties`. Codes are stored uppercase.
    pub fn new(parties: Vec<PartyColors>) -> Result<Self> {
        if parties.is_empty() {
            bail!("palette must name at least one party");
        }

        let mut index = HashMap::with_capacity(parties.len());
        let mut normalized = Vec::with_capacity(parties.len());
        for (i, mut entry) in parties.into_iter().enumerate() {
            let code = entry.party.trim().to_uppercase();
            if code.is_empty() || !code.chars().all(|c| c.is_alphanumeric()) {
                bail!("invalid party code {:?} in palette", entry.party);
            }
            if index.insert(code.clone(), i).is_some() {
                bail!("party {} appears twice in palette", code);
            }
            entry.party = code;
            normalized.push(entry);
        }

        let alternation = normalized
            .iter()
            .map(|p| regex::escape(&p.party))
            .collect::<Vec<_>>()
            .join("|");
        let tiers = Tier::ALL.map(|t| t.as_str()).join("|");
        let pattern = format!(r"(?i)^({})\s+({})$", alternation, tiers);
        let single = Regex::new(&pattern)
            .with_context(|| format!("building projection pattern {}", pattern))?;

        Ok(Self {
            parties: normalized,
            index,
            single,
        })
    }

    /// Load a palette list from YAML, or JSON when the extension is `.json`.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading palette {}", path.display()))?;
        let parties: Vec<PartyColors> = match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => serde_json::from_str(&text)
                .with_context(|| format!("parsing palette {}", path.display()))?,
            _ => serde_yaml::from_str(&text)
                .with_context(|| format!("parsing palette {}", path.display()))?,
        };
        Self::new(parties).with_context(|| format!("validating palette {}", path.display()))
    }

    /// Color for an exact (uppercase) party code and tier.
    pub fn color(&self, party: &str, tier: Tier) -> Option<Rgb> {
        self.index
            .get(party)
            .map(|&i| self.parties[i].color(tier))
    }

    pub fn contains(&self, party: &str) -> bool {
        self.index.contains_key(party)
    }

    /// Parties in configuration order.
    pub fn parties(&self) -> &[PartyColors] {
        &self.parties
    }

    pub(crate) fn single_pattern(&self) -> &Regex {
        &self.single
    }
}

/// Built-in palette for the federal parties: safe, likely, leaning.
const DEFAULT_PARTIES: [(&str, [Rgb; 3]); 5] = [
    (
        "LPC",
        [Rgb::new(0xe3, 0x1a, 0x1c), Rgb::new(0xfc, 0x92, 0x72), Rgb::new(0xfc, 0xbb, 0xa1)],
    ),
    (
        "CPC",
        [Rgb::new(0x31, 0x82, 0xbd), Rgb::new(0x9e, 0xca, 0xe1), Rgb::new(0xc6, 0xdb, 0xef)],
    ),
    (
        "NDP",
        [Rgb::new(0x31, 0xa3, 0x54), Rgb::new(0xa1, 0xd9, 0x9b), Rgb::new(0xc7, 0xe9, 0xc0)],
    ),
    (
        "BQ",
        [Rgb::new(0x76, 0x2a, 0x83), Rgb::new(0xd7, 0xb5, 0xd8), Rgb::new(0xe7, 0xd4, 0xe8)],
    ),
    (
        "GPC",
        [Rgb::new(0x00, 0x64, 0x00), Rgb::new(0x90, 0xee, 0x90), Rgb::new(0xa1, 0xe3, 0xa1)],
    ),
];

impl Default for PartyPalette {
    fn default() -> Self {
        let parties = DEFAULT_PARTIES
            .iter()
            .map(|&(code, [safe, likely, leaning])| PartyColors {
                party: code.to_string(),
                safe,
                likely,
                leaning,
            })
            .collect();
        Self::new(parties).expect("built-in palette should be valid")
    }
}
