//! External collaborators used once a structure has been written.
//!
//! Loot tables, mob plugins, region protection and the rest live outside
//! this crate. Each one is a narrow trait; a [`Collaborators`] bundle holds
//! whichever of them the host provides.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::core::types::{IVec3, Result};
use crate::generation::config::DungeonGeneratorConfig;
use crate::generation::variant::StructureVariant;
use crate::math::BlockBox;
use crate::template::{EntityKind, Template};
use crate::voxel::{Location, VoxelWorld, WorldId};

/// Fills a placed container with loot
pub trait LootRoller {
    fn roll_into(&self, world: &mut dyn VoxelWorld, pos: IVec3, template: &Template) -> Result<()>;
}

/// Spawns built-in entities
pub trait EntitySpawner {
    fn spawn(&self, kind: EntityKind, location: &Location) -> Result<()>;
}

/// Spawns entities owned by a third-party plugin, identified by an opaque id
pub trait ThirdPartySpawner {
    fn spawn(&self, id: &str, location: &Location) -> Result<()>;
}

/// Claims a protected region around a placed arena
pub trait RegionProtector {
    fn protect(&self, world: WorldId, region: BlockBox) -> Result<()>;
}

/// Places decorative props (armor stands, item frames...) for a template
pub trait PropPlacer {
    fn place_props(&self, world: &mut dyn VoxelWorld, template: &Template, lowest_corner: IVec3) -> Result<()>;
}

/// Summary sent to operators when a structure is placed
#[derive(Clone, Debug, PartialEq)]
pub struct PlacementNotice {
    pub variant: StructureVariant,
    pub template: String,
    pub world_name: String,
    pub location: Location,
}

impl PlacementNotice {
    /// One-line human-readable message
    pub fn message(&self) -> String {
        let pos = self.location.block_pos();
        format!(
            "New {} building generated: '{}' in {} at {} {} {}",
            self.variant.display_name(),
            self.template,
            self.world_name,
            pos.x,
            pos.y,
            pos.z
        )
    }
}

/// Tells operators about new placements
pub trait OperatorNotifier {
    fn notify(&self, notice: &PlacementNotice) -> Result<()>;
}

/// Builds a procedural dungeon from a generator description
pub trait DungeonBuilder {
    fn build(&self, generator: &DungeonGeneratorConfig, world: &mut dyn VoxelWorld, origin: IVec3) -> Result<()>;
}

/// Optional collaborators supplied by the host
#[derive(Clone, Default)]
pub struct Collaborators {
    pub loot: Option<Arc<dyn LootRoller>>,
    pub entities: Option<Arc<dyn EntitySpawner>>,
    pub third_party: Option<Arc<dyn ThirdPartySpawner>>,
    pub protector: Option<Arc<dyn RegionProtector>>,
    pub props: Option<Arc<dyn PropPlacer>>,
    pub notifier: Option<Arc<dyn OperatorNotifier>>,
    pub dungeons: Option<Arc<dyn DungeonBuilder>>,
    /// Shared by clones so the missing-protector warning is logged once
    protector_warned: Arc<AtomicBool>,
}

impl Collaborators {
    /// Bundle with no collaborators
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_loot(mut self, loot: Arc<dyn LootRoller>) -> Self {
        self.loot = Some(loot);
        self
    }

    pub fn with_entities(mut self, spawner: Arc<dyn EntitySpawner>) -> Self {
        self.entities = Some(spawner);
        self
    }

    pub fn with_third_party(mut self, spawner: Arc<dyn ThirdPartySpawner>) -> Self {
        self.third_party = Some(spawner);
        self
    }

    pub fn with_protector(mut self, protector: Arc<dyn RegionProtector>) -> Self {
        self.protector = Some(protector);
        self
    }

    pub fn with_props(mut self, props: Arc<dyn PropPlacer>) -> Self {
        self.props = Some(props);
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn OperatorNotifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn with_dungeons(mut self, builder: Arc<dyn DungeonBuilder>) -> Self {
        self.dungeons = Some(builder);
        self
    }

    /// True only the first time this bundle, or any clone of it, asks
    pub(crate) fn first_missing_protector(&self) -> bool {
        !self.protector_warned.swap(true, Ordering::Relaxed)
    }
}

/// Log every failed outcome at warn level. Returns the number of failures.
pub fn report_outcomes(outcomes: &[(&str, Result<()>)]) -> usize {
    let mut failures = 0;
    for (name, outcome) in outcomes {
        if let Err(e) = outcome {
            log::warn!("Post-placement step '{}' failed: {}", name, e);
            failures += 1;
        }
    }
    failures
}
