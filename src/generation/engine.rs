//! Chunk-load entry point of structure placement.
//!
//! The engine ties eligibility, placement search and the paste scheduler
//! together. Searches run synchronously inside [`StructureEngine::on_chunk_load`];
//! only block writes are spread over later steps through
//! [`StructureEngine::tick`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::config::{DungeonGeneratorConfig, PlacementConfig};
use super::eligibility::is_eligible;
use super::fit::{find_placement, FitContext, Placement, PlacementPolicy};
use super::variant::StructureVariant;
use crate::core::time::StepTimer;
use crate::paste::{
    decompose, Collaborators, PasteScheduler, PasteTask, PedestalPalette, PostPlacement, StepBudget, StepReport,
};
use crate::template::{Template, TemplateRegistry};
use crate::voxel::{ChunkCoord, Environment, Location, VoxelWorld, WorldId};

/// Order in which variants are attempted for a loaded chunk
const SCAN_ORDER: [StructureVariant; 6] = [
    StructureVariant::Surface,
    StructureVariant::UndergroundShallow,
    StructureVariant::UndergroundDeep,
    StructureVariant::Sky,
    StructureVariant::LiquidSurface,
    StructureVariant::Dungeon,
];

/// Rejects chunks that were already handled within a settling window.
///
/// Hosts may report the same chunk load more than once in quick succession;
/// only the first report in the window is evaluated.
#[derive(Debug)]
pub struct ChunkLoadGuard {
    seen: Mutex<HashMap<(WorldId, ChunkCoord), u64>>,
    settle_window: u64,
}

impl ChunkLoadGuard {
    pub fn new(settle_window: u64) -> Self {
        Self {
            seen: Mutex::new(HashMap::new()),
            settle_window,
        }
    }

    /// Record a chunk load at `step`. Returns false if the chunk was seen
    /// within the settling window.
    pub fn try_enter(&self, world: WorldId, chunk: ChunkCoord, step: u64) -> bool {
        let mut seen = self.seen.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(&at) = seen.get(&(world, chunk)) {
            if step.saturating_sub(at) < self.settle_window {
                return false;
            }
        }
        seen.insert((world, chunk), step);
        true
    }

    /// Forget entries older than the settling window. Returns how many were removed.
    pub fn expire(&self, step: u64) -> usize {
        let mut seen = self.seen.lock().unwrap_or_else(|e| e.into_inner());
        let before = seen.len();
        seen.retain(|_, &mut at| step.saturating_sub(at) < self.settle_window);
        before - seen.len()
    }

    /// Number of chunks currently settling
    pub fn len(&self) -> usize {
        self.seen.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Something the engine placed or handed to a dungeon builder
#[derive(Clone, Debug, PartialEq)]
pub struct PlacementRecord {
    pub variant: StructureVariant,
    /// Template name, or generator name for dungeons
    pub name: String,
    pub location: Location,
}

/// Lookup tables filled on first use
#[derive(Debug, Default)]
struct MemoTables {
    has_templates: HashMap<StructureVariant, bool>,
    dungeon_generators: HashMap<(String, Environment), Vec<DungeonGeneratorConfig>>,
}

/// Places structures into newly loaded chunks and pastes them over time
pub struct StructureEngine {
    config: PlacementConfig,
    registry: Arc<dyn TemplateRegistry>,
    collaborators: Collaborators,
    memo: MemoTables,
    guard: ChunkLoadGuard,
    scheduler: PasteScheduler,
    timer: StepTimer,
    budget: StepBudget,
    rng: ChaCha8Rng,
}

impl StructureEngine {
    /// Create a new engine
    ///
    /// # Arguments
    /// * `config` - Placement configuration
    /// * `registry` - Source of templates
    pub fn new(config: PlacementConfig, registry: Arc<dyn TemplateRegistry>) -> Self {
        let guard = ChunkLoadGuard::new(config.settle_window_steps);
        let timer = StepTimer::new(config.step_duration());
        let budget = StepBudget::from_config(&config);
        Self {
            config,
            registry,
            collaborators: Collaborators::new(),
            memo: MemoTables::default(),
            guard,
            scheduler: PasteScheduler::new(),
            timer,
            budget,
            rng: ChaCha8Rng::from_entropy(),
        }
    }

    /// Use a fixed seed so that placements are reproducible
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
        self
    }

    pub fn with_collaborators(mut self, collaborators: Collaborators) -> Self {
        self.collaborators = collaborators;
        self
    }

    /// Replace the per-step write budget
    pub fn with_budget(mut self, budget: StepBudget) -> Self {
        self.budget = budget;
        self
    }

    pub fn config(&self) -> &PlacementConfig {
        &self.config
    }

    pub fn scheduler(&self) -> &PasteScheduler {
        &self.scheduler
    }

    /// Current simulation step
    pub fn step(&self) -> u64 {
        self.timer.step()
    }

    /// Average time recent steps spent on paste work
    pub fn average_step_work(&self) -> Duration {
        self.timer.average_work()
    }

    /// Forget memoized template and dungeon generator lookups.
    ///
    /// Call after the registry contents or the generator list change.
    pub fn invalidate_caches(&mut self) {
        self.memo = MemoTables::default();
        log::debug!("Placement caches invalidated");
    }

    /// Evaluate a newly loaded chunk.
    ///
    /// Every enabled variant with templates whose eligibility hash selects
    /// this chunk runs a placement search; found placements are queued for
    /// pasting. Returns what was queued or handed to a dungeon builder.
    pub fn on_chunk_load(&mut self, world: &mut dyn VoxelWorld, chunk: ChunkCoord) -> Vec<PlacementRecord> {
        let mut records = Vec::new();
        if !self.guard.try_enter(world.id(), chunk, self.timer.step()) {
            log::debug!("Chunk {:?} still settling, skipped", chunk);
            return records;
        }

        for variant in SCAN_ORDER {
            let spacing = self.config.spacing.get(variant);
            if !spacing.enabled || !is_eligible(world.seed(), variant, chunk, spacing.grid_distance, spacing.max_offset) {
                continue;
            }

            if variant == StructureVariant::Dungeon {
                records.extend(self.build_dungeon(world, chunk));
                continue;
            }
            if !self.has_templates(variant) {
                continue;
            }

            let registry = Arc::clone(&self.registry);
            let environment = world.environment();
            let placement = self.search(&*world, variant, chunk, |location, rng| {
                registry.lookup(variant, location, environment, rng)
            });
            if let Some(placement) = placement {
                records.push(self.schedule(&*world, placement));
            }
        }
        records
    }

    /// Place a specific template around `chunk`, skipping eligibility.
    ///
    /// Returns `None` if the variant has no placement policy or no adequate
    /// location was found.
    pub fn place(
        &mut self,
        world: &dyn VoxelWorld,
        variant: StructureVariant,
        template: Arc<Template>,
        chunk: ChunkCoord,
    ) -> Option<PlacementRecord> {
        let placement = self.search(world, variant, chunk, move |_, _| Some(template))?;
        Some(self.schedule(world, placement))
    }

    /// Advance one simulation step and run paste work under the budget
    pub fn tick(&mut self, world: &mut dyn VoxelWorld) -> StepReport {
        let step = self.timer.tick();
        let expired = self.guard.expire(step);
        if expired > 0 {
            log::trace!("Step {}: {} chunks finished settling", step, expired);
        }
        let report = self.scheduler.step(world, &mut self.budget);
        self.timer.finish_step();
        report
    }

    /// Tick until the paste queue is empty. Returns the number of steps.
    pub fn drain(&mut self, world: &mut dyn VoxelWorld) -> usize {
        let mut steps = 0;
        while self.scheduler.has_work() {
            self.tick(world);
            steps += 1;
        }
        steps
    }

    // --- Internals ---

    fn has_templates(&mut self, variant: StructureVariant) -> bool {
        let registry = &self.registry;
        *self
            .memo
            .has_templates
            .entry(variant)
            .or_insert_with(|| registry.has_templates(variant))
    }

    fn search(
        &mut self,
        world: &dyn VoxelWorld,
        variant: StructureVariant,
        chunk: ChunkCoord,
        choose: impl FnOnce(&Location, &mut dyn RngCore) -> Option<Arc<Template>>,
    ) -> Option<Placement> {
        let policy = PlacementPolicy::for_variant(variant)?;
        let ctx = FitContext::new(world, &self.config);
        find_placement(&policy, &ctx, chunk, &mut self.rng, choose)
    }

    /// Decompose a placement and queue it for pasting
    fn schedule(&mut self, world: &dyn VoxelWorld, placement: Placement) -> PlacementRecord {
        let location = *placement.location();
        let template = placement.template;
        let palette = PedestalPalette::sample(world, &template, &location, placement.variant);
        let writes = decompose(world, &template, &location, &palette, &mut self.rng);

        let finish = PostPlacement {
            variant: placement.variant,
            template: Arc::clone(&template),
            location,
            palette,
            collaborators: self.collaborators.clone(),
            notify_operators: self.config.notify_operators,
            protect_arenas: self.config.protect_arenas,
            rng: ChaCha8Rng::seed_from_u64(self.rng.next_u64()),
        };

        log::info!(
            "Placing {} '{}' at {} (score {:.1})",
            placement.variant,
            template.name(),
            location,
            placement.candidate.score
        );
        let record = PlacementRecord {
            variant: placement.variant,
            name: template.name().to_string(),
            location,
        };
        let task = PasteTask::new(template, location, writes).with_completion(move |world| {
            finish.run(world);
        });
        self.scheduler.enqueue(task);
        record
    }

    /// Generators allowed in this world, memoized per world name and environment
    fn dungeon_generators(&mut self, world: &dyn VoxelWorld) -> &[DungeonGeneratorConfig] {
        let key = (world.name().to_string(), world.environment());
        let generators = &self.config.dungeon_generators;
        self.memo.dungeon_generators.entry(key).or_insert_with_key(|(name, env)| {
            generators.iter().filter(|g| g.allows(name, *env)).cloned().collect()
        })
    }

    fn build_dungeon(&mut self, world: &mut dyn VoxelWorld, chunk: ChunkCoord) -> Option<PlacementRecord> {
        let builder = self.collaborators.dungeons.clone()?;
        let generators = self.dungeon_generators(&*world).to_vec();
        if generators.is_empty() {
            return None;
        }
        let generator = &generators[self.rng.gen_range(0..generators.len())];

        let origin = chunk.block_at(8, 0, 8);
        let location = Location::new(world.id(), origin.x as f64, origin.y, origin.z as f64);
        if let Err(e) = builder.build(generator, world, origin) {
            log::warn!("Dungeon '{}' at {} failed: {}", generator.name, location, e);
            return None;
        }
        log::info!("Built dungeon '{}' at {}", generator.name, location);
        Some(PlacementRecord {
            variant: StructureVariant::Dungeon,
            name: generator.name.clone(),
            location,
        })
    }
}
