//! Block materials and their classification predicates

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Closed set of block materials understood by the placement engine.
///
/// `VoidAir` marks unloaded or out-of-world positions and is never a valid
/// placement target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Material {
    // --- Gases ---
    Air,
    CaveAir,
    VoidAir,

    // --- Liquids ---
    Water,
    Lava,

    // --- Terrain ---
    Stone,
    Deepslate,
    Dirt,
    GrassBlock,
    Sand,
    Gravel,
    Netherrack,
    EndStone,
    Bedrock,
    Obsidian,

    // --- Surface decoration ---
    ShortGrass,
    TallGrass,
    Fern,
    Dandelion,
    Poppy,
    Snow,
    OakLog,
    SpruceLog,
    BirchLog,
    OakLeaves,
    SpruceLeaves,
    BirchLeaves,
    Vine,

    // --- Building ---
    Cobblestone,
    StoneBricks,
    OakPlanks,
    Glass,
    Torch,
    Barrier,

    // --- Complex writes ---
    Chest,
    TrappedChest,
    Barrel,
    OakSign,
    OakStairs,
    StoneBrickStairs,
    Rail,
    Spawner,
    Furnace,
    Hopper,
    Lever,
    Anvil,
    ShulkerBox,
    Campfire,
    PottedPoppy,
}

impl Material {
    /// Every material, in declaration order
    pub const ALL: [Material; 49] = [
        Material::Air,
        Material::CaveAir,
        Material::VoidAir,
        Material::Water,
        Material::Lava,
        Material::Stone,
        Material::Deepslate,
        Material::Dirt,
        Material::GrassBlock,
        Material::Sand,
        Material::Gravel,
        Material::Netherrack,
        Material::EndStone,
        Material::Bedrock,
        Material::Obsidian,
        Material::ShortGrass,
        Material::TallGrass,
        Material::Fern,
        Material::Dandelion,
        Material::Poppy,
        Material::Snow,
        Material::OakLog,
        Material::SpruceLog,
        Material::BirchLog,
        Material::OakLeaves,
        Material::SpruceLeaves,
        Material::BirchLeaves,
        Material::Vine,
        Material::Cobblestone,
        Material::StoneBricks,
        Material::OakPlanks,
        Material::Glass,
        Material::Torch,
        Material::Barrier,
        Material::Chest,
        Material::TrappedChest,
        Material::Barrel,
        Material::OakSign,
        Material::OakStairs,
        Material::StoneBrickStairs,
        Material::Rail,
        Material::Spawner,
        Material::Furnace,
        Material::Hopper,
        Material::Lever,
        Material::Anvil,
        Material::ShulkerBox,
        Material::Campfire,
        Material::PottedPoppy,
    ];

    /// Lowercase snake_case name, identical to the serialized form
    pub fn name(self) -> &'static str {
        match self {
            Material::Air => "air",
            Material::CaveAir => "cave_air",
            Material::VoidAir => "void_air",
            Material::Water => "water",
            Material::Lava => "lava",
            Material::Stone => "stone",
            Material::Deepslate => "deepslate",
            Material::Dirt => "dirt",
            Material::GrassBlock => "grass_block",
            Material::Sand => "sand",
            Material::Gravel => "gravel",
            Material::Netherrack => "netherrack",
            Material::EndStone => "end_stone",
            Material::Bedrock => "bedrock",
            Material::Obsidian => "obsidian",
            Material::ShortGrass => "short_grass",
            Material::TallGrass => "tall_grass",
            Material::Fern => "fern",
            Material::Dandelion => "dandelion",
            Material::Poppy => "poppy",
            Material::Snow => "snow",
            Material::OakLog => "oak_log",
            Material::SpruceLog => "spruce_log",
            Material::BirchLog => "birch_log",
            Material::OakLeaves => "oak_leaves",
            Material::SpruceLeaves => "spruce_leaves",
            Material::BirchLeaves => "birch_leaves",
            Material::Vine => "vine",
            Material::Cobblestone => "cobblestone",
            Material::StoneBricks => "stone_bricks",
            Material::OakPlanks => "oak_planks",
            Material::Glass => "glass",
            Material::Torch => "torch",
            Material::Barrier => "barrier",
            Material::Chest => "chest",
            Material::TrappedChest => "trapped_chest",
            Material::Barrel => "barrel",
            Material::OakSign => "oak_sign",
            Material::OakStairs => "oak_stairs",
            Material::StoneBrickStairs => "stone_brick_stairs",
            Material::Rail => "rail",
            Material::Spawner => "spawner",
            Material::Furnace => "furnace",
            Material::Hopper => "hopper",
            Material::Lever => "lever",
            Material::Anvil => "anvil",
            Material::ShulkerBox => "shulker_box",
            Material::Campfire => "campfire",
            Material::PottedPoppy => "potted_poppy",
        }
    }

    // --- Classification ---

    /// Any of the air variants, including the void sentinel
    pub fn is_air(self) -> bool {
        matches!(self, Material::Air | Material::CaveAir | Material::VoidAir)
    }

    pub fn is_liquid(self) -> bool {
        matches!(self, Material::Water | Material::Lava)
    }

    /// Whether the block occupies its full cell for collision purposes
    pub fn is_solid(self) -> bool {
        !(self.is_air()
            || self.is_liquid()
            || matches!(
                self,
                Material::ShortGrass
                    | Material::TallGrass
                    | Material::Fern
                    | Material::Dandelion
                    | Material::Poppy
                    | Material::Snow
                    | Material::Vine
                    | Material::Torch
                    | Material::OakSign
                    | Material::Rail
                    | Material::Lever
            ))
    }

    /// Part of a tree: logs and leaves
    pub fn is_tree_element(self) -> bool {
        matches!(
            self,
            Material::OakLog
                | Material::SpruceLog
                | Material::BirchLog
                | Material::OakLeaves
                | Material::SpruceLeaves
                | Material::BirchLeaves
        )
    }

    /// Surface decoration that may be built over: air, vegetation, trees, snow layers
    pub fn is_ignorable(self) -> bool {
        self.is_air()
            || self.is_tree_element()
            || matches!(
                self,
                Material::ShortGrass
                    | Material::TallGrass
                    | Material::Fern
                    | Material::Dandelion
                    | Material::Poppy
                    | Material::Snow
                    | Material::Vine
            )
    }

    /// Blocks holding an inventory that loot can be rolled into
    pub fn is_container(self) -> bool {
        matches!(
            self,
            Material::Chest
                | Material::TrappedChest
                | Material::Barrel
                | Material::Furnace
                | Material::Hopper
                | Material::ShulkerBox
        )
    }

    /// Blocks that carry orientation or tile data and need the complex write path
    pub fn requires_complex_write(self) -> bool {
        let name = self.name();
        name.ends_with("sign")
            || name.ends_with("stairs")
            || name.ends_with("box")
            || name.contains("chest")
            || name.contains("spawner")
            || name.contains("campfire")
            || name.contains("rail")
            || name.starts_with("potted")
            || matches!(
                self,
                Material::Barrel | Material::Furnace | Material::Hopper | Material::Lever | Material::Anvil
            )
    }
}

impl fmt::Display for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Material {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        let wanted = wanted.strip_prefix("minecraft:").unwrap_or(&wanted);
        Material::ALL
            .iter()
            .copied()
            .find(|m| m.name() == wanted)
            .ok_or_else(|| format!("unknown material '{}'", s))
    }
}

/// One template cell: a material plus optional block-state data such as
/// `facing=north`
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockState {
    pub material: Material,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

impl BlockState {
    pub fn new(material: Material) -> Self {
        Self { material, state: None }
    }

    pub fn with_state(material: Material, state: impl Into<String>) -> Self {
        Self {
            material,
            state: Some(state.into()),
        }
    }
}

impl From<Material> for BlockState {
    fn from(material: Material) -> Self {
        Self::new(material)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_name_matches() {
        for material in Material::ALL {
            let json = serde_json::to_string(&material).unwrap();
            assert_eq!(json, format!("\"{}\"", material.name()));
        }
    }

    #[test]
    fn test_from_str() {
        assert_eq!("stone".parse::<Material>(), Ok(Material::Stone));
        assert_eq!("minecraft:OAK_STAIRS".parse::<Material>(), Ok(Material::OakStairs));
        assert!("unobtainium".parse::<Material>().is_err());
    }

    #[test]
    fn test_classification() {
        assert!(Material::VoidAir.is_air());
        assert!(!Material::VoidAir.is_solid());
        assert!(Material::Water.is_liquid());
        assert!(!Material::Water.is_solid());
        assert!(Material::Stone.is_solid());
        assert!(Material::OakLeaves.is_solid());
        assert!(Material::OakLeaves.is_ignorable());
        assert!(Material::ShortGrass.is_ignorable());
        assert!(!Material::ShortGrass.is_solid());
        assert!(!Material::Dirt.is_ignorable());
        assert!(!Material::Water.is_ignorable());
    }

    #[test]
    fn test_complex_writes() {
        for m in [
            Material::Chest,
            Material::TrappedChest,
            Material::OakSign,
            Material::OakStairs,
            Material::StoneBrickStairs,
            Material::ShulkerBox,
            Material::Rail,
            Material::Spawner,
            Material::PottedPoppy,
            Material::Barrel,
        ] {
            assert!(m.requires_complex_write(), "{} should be complex", m);
        }
        assert!(!Material::Stone.requires_complex_write());
        assert!(!Material::Bedrock.requires_complex_write());
        assert!(Material::Chest.is_container());
        assert!(!Material::OakSign.is_container());
    }
}
