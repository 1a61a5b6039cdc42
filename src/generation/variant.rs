//! Structure placement variants

use serde::{Deserialize, Serialize};
use std::fmt;

/// Placement policy family a template belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructureVariant {
    Sky,
    Surface,
    LiquidSurface,
    UndergroundShallow,
    UndergroundDeep,
    Dungeon,
}

impl StructureVariant {
    pub const ALL: [StructureVariant; 6] = [
        StructureVariant::Sky,
        StructureVariant::Surface,
        StructureVariant::LiquidSurface,
        StructureVariant::UndergroundShallow,
        StructureVariant::UndergroundDeep,
        StructureVariant::Dungeon,
    ];

    /// Upper snake case name, used for hashing and operator messages
    pub fn name(self) -> &'static str {
        match self {
            StructureVariant::Sky => "SKY",
            StructureVariant::Surface => "SURFACE",
            StructureVariant::LiquidSurface => "LIQUID_SURFACE",
            StructureVariant::UndergroundShallow => "UNDERGROUND_SHALLOW",
            StructureVariant::UndergroundDeep => "UNDERGROUND_DEEP",
            StructureVariant::Dungeon => "DUNGEON",
        }
    }

    /// Human readable name, e.g. "liquid surface"
    pub fn display_name(self) -> String {
        self.name().to_ascii_lowercase().replace('_', " ")
    }

    /// Per-variant salt mixed into the world seed by the eligibility hash.
    ///
    /// This is the 31-multiplier string hash of [`name`](Self::name) times
    /// 7919, computed with 32-bit wrapping and then widened.
    pub fn salt(self) -> i64 {
        let hash = self
            .name()
            .bytes()
            .fold(0i32, |h, b| h.wrapping_mul(31).wrapping_add(b as i32));
        (hash as i64).wrapping_mul(7919)
    }
}

impl fmt::Display for StructureVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
