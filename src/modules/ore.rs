use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// A small integer tag read from a node's definition. Nodes of the same
/// kind can carry different signatures depending on their current state,
/// so each kind owns a set of values that count as "resource present".
pub type Signature = i16;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OreKind {
    Clay,
    Tin,
    Copper,
    Iron,
    Coal,
}

impl OreKind {
    pub const fn label(self) -> &'static str {
        match self {
            OreKind::Clay => "clay",
            OreKind::Tin => "tin",
            OreKind::Copper => "copper",
            OreKind::Iron => "iron",
            OreKind::Coal => "coal",
        }
    }

    /// Inventory item name produced by this kind, used when discarding.
    pub const fn item_name(self) -> &'static str {
        match self {
            OreKind::Clay => "Clay",
            OreKind::Tin => "Tin ore",
            OreKind::Copper => "Copper ore",
            OreKind::Iron => "Iron ore",
            OreKind::Coal => "Coal",
        }
    }

    /// Signatures a node may expose while this kind's resource is still
    /// available. A depleted node drops back to a neutral signature that
    /// is in no kind's set.
    pub const fn signatures(self) -> &'static [Signature] {
        match self {
            OreKind::Clay => &[6705],
            OreKind::Tin => &[53, 7164],
            OreKind::Copper => &[4645, 4510],
            OreKind::Iron => &[2576, 4704],
            OreKind::Coal => &[10508],
        }
    }
}

impl Default for OreKind {
    fn default() -> Self {
        OreKind::Tin
    }
}

impl fmt::Display for OreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for OreKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "clay" => Ok(OreKind::Clay),
            "tin" => Ok(OreKind::Tin),
            "copper" => Ok(OreKind::Copper),
            "iron" => Ok(OreKind::Iron),
            "coal" => Ok(OreKind::Coal),
            other => Err(format!("unknown ore kind: {}", other)),
        }
    }
}
