//! Post-placement work run once a paste task has written every block.
//!
//! Steps run in a fixed order and never undo each other: operator notice,
//! pedestal fill, tree clearing, chest loot, entity spawns, props. Each step
//! reports its own outcome.

use std::sync::Arc;

use rand::RngCore;
use rand_chacha::ChaCha8Rng;

use super::collaborators::{report_outcomes, Collaborators, PlacementNotice};
use super::decompose::PedestalPalette;
use crate::core::error::Error;
use crate::core::types::{IVec3, Result};
use crate::generation::variant::StructureVariant;
use crate::template::Template;
use crate::voxel::{Location, Material, VoxelWorld};

/// Deepest pedestal column below the template
const PEDESTAL_DEPTH: i32 = 10;

/// Tallest column cleared above a surface structure
const TREE_CLEAR_HEIGHT: i32 = 31;

/// Blocks written by a per-column edit and the columns it could not finish
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ColumnEdit {
    pub written: usize,
    pub unfinished: usize,
}

impl ColumnEdit {
    fn into_result(self, step: &'static str, problem: &str) -> Result<()> {
        if self.unfinished > 0 {
            return Err(Error::collaborator(step, format!("{} columns {}", self.unfinished, problem)));
        }
        Ok(())
    }
}

/// Fill the ground under a template with pedestal material.
///
/// For every footprint column whose bottom block is not air, ignorable
/// blocks below it are replaced, up to 10 deep, until the first
/// non-ignorable block. Columns that run into unloaded terrain are left
/// unfinished.
pub fn fill_pedestal(
    world: &mut dyn VoxelWorld,
    template: &Template,
    location: &Location,
    palette: &PedestalPalette,
    rng: &mut dyn RngCore,
) -> ColumnEdit {
    let base = template.lowest_corner(location);
    let mut edit = ColumnEdit::default();

    for x in 0..template.width() {
        for z in 0..template.depth() {
            let column = base + IVec3::new(x, 0, z);
            if world.block(column).is_air() {
                continue;
            }
            for depth in 1..=PEDESTAL_DEPTH {
                let pos = column - IVec3::new(0, depth, 0);
                let material = world.block(pos);
                if material == Material::VoidAir {
                    edit.unfinished += 1;
                    break;
                }
                if !material.is_ignorable() {
                    break;
                }
                let surface = !world.block(pos + IVec3::Y).is_solid();
                world.set_block(pos, palette.pick(surface, rng));
                edit.written += 1;
            }
        }
    }
    edit
}

/// Clear vegetation stacked on top of a template.
///
/// Each footprint column is cleared upward from one block above the
/// template's top, for at most 31 blocks, while the blocks are ignorable
/// and not air. A column still topped by vegetation past that height is
/// unfinished.
pub fn clear_trees(world: &mut dyn VoxelWorld, template: &Template, location: &Location) -> ColumnEdit {
    let base = template.lowest_corner(location) + IVec3::new(0, template.height() + 1, 0);
    let mut edit = ColumnEdit::default();
    let is_tree = |m: Material| m.is_ignorable() && !m.is_air();

    for x in 0..template.width() {
        for z in 0..template.depth() {
            let mut dy = 0;
            while dy < TREE_CLEAR_HEIGHT {
                let pos = base + IVec3::new(x, dy, z);
                if !is_tree(world.block(pos)) {
                    break;
                }
                world.set_block(pos, Material::Air);
                edit.written += 1;
                dy += 1;
            }
            if dy == TREE_CLEAR_HEIGHT && is_tree(world.block(base + IVec3::new(x, dy, z))) {
                edit.unfinished += 1;
            }
        }
    }
    edit
}

/// Everything needed to finish a placement after its blocks are written
pub struct PostPlacement {
    pub variant: StructureVariant,
    pub template: Arc<Template>,
    pub location: Location,
    pub palette: PedestalPalette,
    pub collaborators: Collaborators,
    pub notify_operators: bool,
    pub protect_arenas: bool,
    pub rng: ChaCha8Rng,
}

impl PostPlacement {
    /// Run every step in order. Returns the number of failed steps.
    pub fn run(mut self, world: &mut dyn VoxelWorld) -> usize {
        let notify = self.notify(world);
        let pedestal = self.fill_pedestal(world);
        let trees = self.clear_trees(world);
        let chests = self.fill_chests(world);
        let entities = self.spawn_entities(world);
        let third_party = self.spawn_third_party(world);
        let props = self.place_props(world);

        report_outcomes(&[
            ("notify", notify),
            ("pedestal", pedestal),
            ("trees", trees),
            ("chests", chests),
            ("entities", entities),
            ("third_party_entities", third_party),
            ("props", props),
        ])
    }

    fn lowest_corner(&self) -> IVec3 {
        self.template.lowest_corner(&self.location)
    }

    /// Spawn location centered on a template-local block
    fn spawn_location(&self, local: IVec3) -> Location {
        let pos = self.lowest_corner() + local;
        Location::new(self.location.world, pos.x as f64 + 0.5, pos.y, pos.z as f64 + 0.5)
    }

    fn notify(&self, world: &dyn VoxelWorld) -> Result<()> {
        if !self.notify_operators {
            return Ok(());
        }
        let notice = PlacementNotice {
            variant: self.variant,
            template: self.template.name().to_string(),
            world_name: world.name().to_string(),
            location: self.location,
        };
        log::info!("{}", notice.message());
        match &self.collaborators.notifier {
            Some(notifier) => notifier.notify(&notice),
            None => Ok(()),
        }
    }

    fn fill_pedestal(&mut self, world: &mut dyn VoxelWorld) -> Result<()> {
        if matches!(self.variant, StructureVariant::Sky | StructureVariant::LiquidSurface) {
            return Ok(());
        }
        let edit = fill_pedestal(world, &self.template, &self.location, &self.palette, &mut self.rng);
        log::debug!("Pedestal for '{}': {} blocks", self.template.name(), edit.written);
        edit.into_result("pedestal", "reached unloaded terrain")
    }

    fn clear_trees(&self, world: &mut dyn VoxelWorld) -> Result<()> {
        if self.variant != StructureVariant::Surface {
            return Ok(());
        }
        let edit = clear_trees(world, &self.template, &self.location);
        log::debug!("Cleared {} tree blocks above '{}'", edit.written, self.template.name());
        edit.into_result("trees", "still covered after the clearing limit")
    }

    fn fill_chests(&self, world: &mut dyn VoxelWorld) -> Result<()> {
        let Some(loot) = &self.collaborators.loot else {
            return Ok(());
        };
        let base = self.lowest_corner();
        let markers = self.template.chest_markers();
        let mut failed = 0;

        for &local in markers {
            let pos = base + local;
            let found = world.block(pos);
            if !found.is_container() {
                log::warn!(
                    "Chest marker of '{}' at {} landed on {}, skipping",
                    self.template.name(),
                    pos,
                    found
                );
                failed += 1;
                continue;
            }
            if let Err(e) = loot.roll_into(world, pos, &self.template) {
                log::warn!("Loot for chest at {} failed: {}", pos, e);
                failed += 1;
            }
        }

        if failed > 0 {
            return Err(Error::collaborator(
                "loot",
                format!("{} of {} chests not filled", failed, markers.len()),
            ));
        }
        Ok(())
    }

    fn spawn_entities(&self, world: &mut dyn VoxelWorld) -> Result<()> {
        let markers = self.template.entity_markers();
        if markers.is_empty() {
            return Ok(());
        }
        let Some(spawner) = &self.collaborators.entities else {
            return Err(Error::collaborator(
                "entities",
                format!("no spawner for {} markers", markers.len()),
            ));
        };

        for marker in markers {
            world.set_block(self.lowest_corner() + marker.pos, Material::Air);
            spawner.spawn(marker.kind, &self.spawn_location(marker.pos))?;
        }
        Ok(())
    }

    fn spawn_third_party(&self, world: &mut dyn VoxelWorld) -> Result<()> {
        let markers = self.template.third_party_markers();
        if markers.is_empty() {
            return Ok(());
        }
        let Some(spawner) = &self.collaborators.third_party else {
            return Err(Error::collaborator(
                "third_party",
                format!("no spawner for {} markers", markers.len()),
            ));
        };

        for marker in markers {
            world.set_block(self.lowest_corner() + marker.pos, Material::Air);
            spawner.spawn(&marker.id, &self.spawn_location(marker.pos))?;
            self.protect_arena()?;
        }
        Ok(())
    }

    /// Protect the structure's volume plus one block of headroom
    fn protect_arena(&self) -> Result<()> {
        if !self.protect_arenas {
            return Ok(());
        }
        let Some(protector) = &self.collaborators.protector else {
            if self.collaborators.first_missing_protector() {
                log::warn!("Arena protection is enabled but no region protector is available");
            }
            return Ok(());
        };
        let mut region = self.template.footprint(&self.location);
        region.max.y += 1;
        protector.protect(self.location.world, region)
    }

    fn place_props(&self, world: &mut dyn VoxelWorld) -> Result<()> {
        match &self.collaborators.props {
            Some(props) => props.place_props(world, &self.template, self.lowest_corner()),
            None => Ok(()),
        }
    }
}
