//! Immutable structure templates

use crate::core::error::Error;
use crate::core::types::{IVec3, Result};
use crate::generation::variant::StructureVariant;
use crate::math::BlockBox;
use crate::voxel::{BlockState, Environment, Location, Material};
use serde::{Deserialize, Serialize};

/// Built-in entity kinds a template can request
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Zombie,
    Skeleton,
    Spider,
    Creeper,
    Witch,
    Villager,
    IronGolem,
    Blaze,
    WitherSkeleton,
    Enderman,
    EndCrystal,
    ArmorStand,
}

/// Built-in entity spawn request at a template-local position
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMarker {
    pub pos: IVec3,
    pub kind: EntityKind,
}

/// Third-party entity spawn request, identified by an opaque id
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThirdPartyMarker {
    pub pos: IVec3,
    pub id: String,
}

/// Pre-authored 3D block grid with its placement metadata.
///
/// Cells are stored x-major within y within z (`x + width * (z + depth * y)`).
/// All marker positions are local to the lowest grid corner.
#[derive(Clone, Debug)]
pub struct Template {
    name: String,
    size: IVec3,
    blocks: Vec<BlockState>,
    anchor: IVec3,
    chests: Vec<IVec3>,
    entities: Vec<EntityMarker>,
    third_party: Vec<ThirdPartyMarker>,
    weight: f64,
    pedestal: Option<Material>,
    environments: Vec<Environment>,
    variants: Vec<StructureVariant>,
}

impl Template {
    /// Create a template from a flat block list.
    ///
    /// Chest markers are collected from container blocks in x, y, z order.
    pub fn new(name: impl Into<String>, size: IVec3, blocks: Vec<BlockState>, anchor: IVec3) -> Result<Self> {
        let name = name.into();
        if size.cmplt(IVec3::ZERO).any() {
            return Err(Error::Template(format!("{}: negative size {}", name, size)));
        }
        let volume = size.x as usize * size.y as usize * size.z as usize;
        if blocks.len() != volume {
            return Err(Error::Template(format!(
                "{}: expected {} blocks for size {}, got {}",
                name,
                volume,
                size,
                blocks.len()
            )));
        }

        let mut template = Self {
            name,
            size,
            blocks,
            anchor,
            chests: Vec::new(),
            entities: Vec::new(),
            third_party: Vec::new(),
            weight: 1.0,
            pedestal: None,
            environments: Vec::new(),
            variants: Vec::new(),
        };
        template.chests = template
            .cells()
            .filter(|(_, b)| b.material.is_container())
            .map(|(p, _)| p)
            .collect();
        Ok(template)
    }

    /// Create a template by evaluating `f` for every local position
    pub fn from_fn(
        name: impl Into<String>,
        size: IVec3,
        anchor: IVec3,
        mut f: impl FnMut(IVec3) -> BlockState,
    ) -> Result<Self> {
        let size = size.max(IVec3::ZERO);
        let mut blocks = Vec::with_capacity((size.x * size.y * size.z) as usize);
        for y in 0..size.y {
            for z in 0..size.z {
                for x in 0..size.x {
                    blocks.push(f(IVec3::new(x, y, z)));
                }
            }
        }
        Self::new(name, size, blocks, anchor)
    }

    /// Template made of a single material
    pub fn solid(name: impl Into<String>, size: IVec3, anchor: IVec3, material: Material) -> Result<Self> {
        Self::from_fn(name, size, anchor, |_| BlockState::new(material))
    }

    // --- Builder-style setters ---

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_pedestal(mut self, material: Material) -> Self {
        self.pedestal = Some(material);
        self
    }

    pub fn with_environments(mut self, environments: Vec<Environment>) -> Self {
        self.environments = environments;
        self
    }

    pub fn with_variants(mut self, variants: Vec<StructureVariant>) -> Self {
        self.variants = variants;
        self
    }

    pub fn with_entities(mut self, entities: Vec<EntityMarker>) -> Self {
        self.entities = entities;
        self
    }

    pub fn with_third_party(mut self, markers: Vec<ThirdPartyMarker>) -> Self {
        self.third_party = markers;
        self
    }

    /// Replace the automatically collected chest markers
    pub fn with_chests(mut self, chests: Vec<IVec3>) -> Self {
        self.chests = chests;
        self
    }

    // --- Accessors ---

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Grid dimensions (width, height, depth)
    pub fn size(&self) -> IVec3 {
        self.size
    }

    pub fn width(&self) -> i32 {
        self.size.x
    }

    pub fn height(&self) -> i32 {
        self.size.y
    }

    pub fn depth(&self) -> i32 {
        self.size.z
    }

    /// Vector from the lowest grid corner to the logical ground anchor
    pub fn anchor(&self) -> IVec3 {
        self.anchor
    }

    /// Offset applied to a placement location to reach the lowest grid corner
    pub fn origin_offset(&self) -> IVec3 {
        -self.anchor
    }

    pub fn chest_markers(&self) -> &[IVec3] {
        &self.chests
    }

    pub fn entity_markers(&self) -> &[EntityMarker] {
        &self.entities
    }

    pub fn third_party_markers(&self) -> &[ThirdPartyMarker] {
        &self.third_party
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn pedestal(&self) -> Option<Material> {
        self.pedestal
    }

    pub fn environments(&self) -> &[Environment] {
        &self.environments
    }

    pub fn variants(&self) -> &[StructureVariant] {
        &self.variants
    }

    /// Whether this template may be placed in the given environment.
    /// An empty list allows every environment.
    pub fn allows_environment(&self, env: Environment) -> bool {
        self.environments.is_empty()
            || self
                .environments
                .iter()
                .any(|&e| e == env || (e.is_overworld_like() && env.is_overworld_like()))
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    fn index(&self, p: IVec3) -> Option<usize> {
        if p.cmplt(IVec3::ZERO).any() || p.cmpge(self.size).any() {
            return None;
        }
        Some((p.x + self.size.x * (p.z + self.size.z * p.y)) as usize)
    }

    /// Cell at a local position
    pub fn get(&self, p: IVec3) -> Option<&BlockState> {
        self.index(p).map(|i| &self.blocks[i])
    }

    /// Material at a local position; outside the grid reads as air
    pub fn material(&self, p: IVec3) -> Material {
        self.get(p).map_or(Material::Air, |b| b.material)
    }

    /// All cells in x, then y, then z order
    pub fn cells(&self) -> impl Iterator<Item = (IVec3, &BlockState)> + '_ {
        let size = self.size;
        (0..size.x).flat_map(move |x| {
            (0..size.y).flat_map(move |y| {
                (0..size.z).filter_map(move |z| {
                    let p = IVec3::new(x, y, z);
                    self.get(p).map(|b| (p, b))
                })
            })
        })
    }

    /// World position of the lowest grid corner when anchored at `location`
    pub fn lowest_corner(&self, location: &Location) -> IVec3 {
        location.block_pos() + self.origin_offset()
    }

    /// World box covered by the template when anchored at `location`
    pub fn footprint(&self, location: &Location) -> BlockBox {
        BlockBox::from_corner_size(self.lowest_corner(location), self.size)
    }
}
