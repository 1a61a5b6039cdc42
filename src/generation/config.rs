//! Placement configuration.
//!
//! Everything here is plain data with serde derives so a deployment can ship
//! a JSON file and override only the fields it cares about.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::variant::StructureVariant;
use crate::core::types::Result;
use crate::voxel::Environment;

/// Grid spacing and jitter for one variant
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct VariantSpacing {
    /// Grid cell side, in chunks
    pub grid_distance: i32,
    /// Maximum jitter applied to the cell base, in chunks
    pub max_offset: i32,
    /// Whether chunk loads attempt this variant at all
    pub enabled: bool,
}

impl VariantSpacing {
    pub const fn new(grid_distance: i32, max_offset: i32, enabled: bool) -> Self {
        Self { grid_distance, max_offset, enabled }
    }
}

/// Per-variant spacing table
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpacingTable {
    pub sky: VariantSpacing,
    pub surface: VariantSpacing,
    pub liquid_surface: VariantSpacing,
    pub underground_shallow: VariantSpacing,
    pub underground_deep: VariantSpacing,
    pub dungeon: VariantSpacing,
}

impl Default for SpacingTable {
    fn default() -> Self {
        Self {
            sky: VariantSpacing::new(95, 10, false),
            surface: VariantSpacing::new(31, 8, true),
            liquid_surface: VariantSpacing::new(65, 10, false),
            underground_shallow: VariantSpacing::new(22, 5, true),
            underground_deep: VariantSpacing::new(21, 5, true),
            dungeon: VariantSpacing::new(80, 10, false),
        }
    }
}

impl SpacingTable {
    pub fn get(&self, variant: StructureVariant) -> VariantSpacing {
        match variant {
            StructureVariant::Sky => self.sky,
            StructureVariant::Surface => self.surface,
            StructureVariant::LiquidSurface => self.liquid_surface,
            StructureVariant::UndergroundShallow => self.underground_shallow,
            StructureVariant::UndergroundDeep => self.underground_deep,
            StructureVariant::Dungeon => self.dungeon,
        }
    }

    pub fn get_mut(&mut self, variant: StructureVariant) -> &mut VariantSpacing {
        match variant {
            StructureVariant::Sky => &mut self.sky,
            StructureVariant::Surface => &mut self.surface,
            StructureVariant::LiquidSurface => &mut self.liquid_surface,
            StructureVariant::UndergroundShallow => &mut self.underground_shallow,
            StructureVariant::UndergroundDeep => &mut self.underground_deep,
            StructureVariant::Dungeon => &mut self.dungeon,
        }
    }
}

/// Inclusive-exclusive height band `[low, high)`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeightBand {
    pub low: i32,
    pub high: i32,
}

impl HeightBand {
    pub const fn new(low: i32, high: i32) -> Self {
        Self { low, high }
    }
}

/// A value per environment kind. Overworld and Custom share `overworld`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerEnvironment<T> {
    pub overworld: T,
    pub nether: T,
    pub end: T,
}

impl<T: Copy> PerEnvironment<T> {
    pub fn get(&self, env: Environment) -> T {
        match env {
            Environment::Overworld | Environment::Custom => self.overworld,
            Environment::Nether => self.nether,
            Environment::End => self.end,
        }
    }
}

/// Sky placement altitudes above the terrain
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkyAltitudes {
    /// Overworld/Custom minimum altitude (inclusive)
    pub min: i32,
    /// Overworld/Custom maximum altitude (inclusive)
    pub max: i32,
    /// Fixed End altitude
    pub end_min: i32,
}

impl Default for SkyAltitudes {
    fn default() -> Self {
        Self { min: 80, max: 120, end_min: 30 }
    }
}

/// Dungeon generator description handed to the external builder
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DungeonGeneratorConfig {
    pub name: String,
    /// World names this generator is restricted to; empty allows all
    #[serde(default)]
    pub valid_worlds: Vec<String>,
    /// Environments this generator is restricted to; empty allows all
    #[serde(default)]
    pub valid_environments: Vec<Environment>,
}

impl DungeonGeneratorConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            valid_worlds: Vec::new(),
            valid_environments: Vec::new(),
        }
    }

    /// Whether the generator may run in the named world
    pub fn allows(&self, world_name: &str, env: Environment) -> bool {
        (self.valid_worlds.is_empty() || self.valid_worlds.iter().any(|w| w == world_name))
            && (self.valid_environments.is_empty() || self.valid_environments.contains(&env))
    }
}

/// Full placement configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    /// Grid spacing, jitter and enabled flag per variant
    pub spacing: SpacingTable,
    /// World vertical bounds used to clamp underground placements
    pub vertical_bounds: PerEnvironment<HeightBand>,
    /// Shallow underground search band
    pub shallow_band: PerEnvironment<HeightBand>,
    /// Deep underground search band
    pub deep_band: PerEnvironment<HeightBand>,
    pub sky_altitudes: SkyAltitudes,
    /// Neighbour chunk radius searched around the anchor chunk
    pub search_radius: i32,
    /// Sampling stride for terrain and topology scans
    pub scan_stride: i32,
    /// Nominal simulation step length in milliseconds
    pub step_duration_ms: u64,
    /// Fraction of each step that paste work may use (0-1)
    pub paste_fraction: f64,
    /// Optional hard cap on block writes per step
    pub max_writes_per_step: Option<usize>,
    /// Steps during which a loaded chunk is not evaluated again
    pub settle_window_steps: u64,
    /// Notify operators when a structure is placed
    pub notify_operators: bool,
    /// Claim protected regions around third-party spawns
    pub protect_arenas: bool,
    pub dungeon_generators: Vec<DungeonGeneratorConfig>,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            spacing: SpacingTable::default(),
            vertical_bounds: PerEnvironment {
                overworld: HeightBand::new(-60, 320),
                nether: HeightBand::new(4, 120),
                end: HeightBand::new(0, 255),
            },
            shallow_band: PerEnvironment {
                overworld: HeightBand::new(0, 60),
                nether: HeightBand::new(30, 110),
                end: HeightBand::new(20, 80),
            },
            deep_band: PerEnvironment {
                overworld: HeightBand::new(-55, 0),
                nether: HeightBand::new(5, 60),
                end: HeightBand::new(0, 50),
            },
            sky_altitudes: SkyAltitudes::default(),
            search_radius: 1,
            scan_stride: 3,
            step_duration_ms: 50,
            paste_fraction: 0.2,
            max_writes_per_step: None,
            settle_window_steps: 20,
            notify_operators: true,
            protect_arenas: true,
            dungeon_generators: Vec::new(),
        }
    }
}

impl PlacementConfig {
    /// Load configuration from a JSON file. Missing fields take defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&json)?;
        Ok(config)
    }

    /// Write configuration as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Underground band for a variant (shallow or deep)
    pub fn underground_band(&self, variant: StructureVariant, env: Environment) -> HeightBand {
        match variant {
            StructureVariant::UndergroundDeep => self.deep_band.get(env),
            _ => self.shallow_band.get(env),
        }
    }

    pub fn step_duration(&self) -> Duration {
        Duration::from_millis(self.step_duration_ms)
    }

    /// Time each step may spend writing blocks
    pub fn paste_allowance(&self) -> Duration {
        self.step_duration().mul_f64(self.paste_fraction.clamp(0.0, 1.0))
    }
}
