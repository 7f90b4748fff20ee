//! The closed set of sketch variants the external program can run.

use std::fmt;
use std::str::FromStr;

use plotters::style::RGBColor;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SketchKind {
    Cms,
    Cs,
    Mg,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown sketch variant `{0}` (expected cms, cs or mg)")]
pub struct UnknownVariant(pub String);

impl SketchKind {
    /// Plot order; also the order curves appear in legends.
    pub const ALL: [SketchKind; 3] = [SketchKind::Cms, SketchKind::Cs, SketchKind::Mg];

    /// Identifier passed as the last argument of the external program.
    pub fn id(self) -> &'static str {
        match self {
            SketchKind::Cms => "cms",
            SketchKind::Cs => "cs",
            SketchKind::Mg => "mg",
        }
    }

    /// Upper-case name used in legends.
    pub fn label(self) -> &'static str {
        match self {
            SketchKind::Cms => "CMS",
            SketchKind::Cs => "CS",
            SketchKind::Mg => "MG",
        }
    }

    /// Compile-time definition that sets the memory budget for this variant.
    /// CMS and CS take a bucket count, MG takes a multiplier factor.
    pub fn build_define(self, budget: u32) -> String {
        match self {
            SketchKind::Cms => format!("-DNUM_BUCKETS={budget}"),
            SketchKind::Cs => format!("-DCS_NUM_BUCKETS={budget}"),
            SketchKind::Mg => format!("-DMG_MULT_FACTOR={budget}"),
        }
    }

    pub fn color(self) -> RGBColor {
        match self {
            SketchKind::Cms => RGBColor(31, 119, 180),
            SketchKind::Cs => RGBColor(255, 127, 14),
            SketchKind::Mg => RGBColor(44, 160, 44),
        }
    }
}

impl FromStr for SketchKind {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cms" => Ok(SketchKind::Cms),
            "cs" => Ok(SketchKind::Cs),
            "mg" => Ok(SketchKind::Mg),
            _ => Err(UnknownVariant(s.to_string())),
        }
    }
}

impl fmt::Display for SketchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}
