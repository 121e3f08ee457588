// src/projection/color.rs

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize, Serializer};
use std::{fmt, str::FromStr};

/// Sentinel shown for districts with no usable projection.
pub const NO_DATA_COLOR: &str = "grey";

/// 8-bit RGB color, written as lowercase `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` (either case). Anything else is rejected.
    pub fn from_hex(s: &str) -> Result<Self> {
        let hex = s
            .strip_prefix('#')
            .with_context(|| format!("color {:?} must start with '#'", s))?;
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            bail!("color {:?} must be '#' followed by 6 hex digits", s);
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16);
        Ok(Self {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
        })
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Rgb {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl TryFrom<String> for Rgb {
    type Error = anyhow::Error;

    fn try_from(s: String) -> Result<Self> {
        Self::from_hex(&s)
    }
}

impl From<Rgb> for String {
    fn from(c: Rgb) -> Self {
        c.to_hex()
    }
}

/// Fill color for one district: a real color or the "no data" grey.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolvedColor {
    Rgb(Rgb),
    NoData,
}

impl ResolvedColor {
    pub fn is_no_data(&self) -> bool {
        matches!(self, ResolvedColor::NoData)
    }

    pub fn rgb(&self) -> Option<Rgb> {
        match self {
            ResolvedColor::Rgb(c) => Some(*c),
            ResolvedColor::NoData => None,
        }
    }
}

impl From<Option<Rgb>> for ResolvedColor {
    fn from(c: Option<Rgb>) -> Self {
        c.map_or(ResolvedColor::NoData, ResolvedColor::Rgb)
    }
}

impl fmt::Display for ResolvedColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolvedColor::Rgb(c) => fmt::Display::fmt(c, f),
            ResolvedColor::NoData => f.write_str(NO_DATA_COLOR),
        }
    }
}

impl Serialize for ResolvedColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Average colors channel by channel, truncating toward zero.
///
/// Truncation means a blend of two colors whose channel sum is odd loses
/// half a step on that channel; this matches the published maps and is kept.
/// Returns `None` for an empty slice.
pub fn mix_colors(colors: &[Rgb]) -> Option<Rgb> {
    if colors.is_empty() {
        return None;
    }
    let n = colors.len() as u32;
    let (r, g, b) = colors.iter().fold((0u32, 0u32, 0u32), |(r, g, b), c| {
        (r + u32::from(c.r), g + u32::from(c.g), b + u32::from(c.b))
    });
    // each average is at most 255
    Some(Rgb::new((r / n) as u8, (g / n) as u8, (b / n) as u8))
}
