//! Placement demo: runs the structure engine over a synthetic world.
//!
//! Usage: cargo run --release --bin place_structures -- [OPTIONS]
//!
//! Options:
//!   --radius <CHUNKS>     Half-width of the loaded chunk square (default: 12)
//!   --seed <SEED>         World seed (default: 12345)
//!   --config <PATH>       Placement config JSON (default: built-in defaults)
//!   --templates <DIR>     Template directory (default: built-in templates)
//!   --writes <N>          Max block writes per step (default: time budget only)

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

use terrafit::core::logging;
use terrafit::core::types::{IVec3, Result};
use terrafit::generation::{PlacementConfig, StructureEngine, StructureVariant};
use terrafit::paste::{Collaborators, EntitySpawner, LootRoller, StepBudget};
use terrafit::template::{EntityKind, EntityMarker, Template, TemplateLibrary, TemplateRegistry};
use terrafit::voxel::{BlockState, ChunkCoord, GridWorld, Location, Material, VoxelWorld, CHUNK_SIZE};

const SEA_LEVEL: i32 = 62;

fn main() {
    logging::init();

    if let Err(e) = run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let radius: i32 = parse_arg(&args, "--radius").unwrap_or(12);
    let seed: i64 = parse_arg(&args, "--seed").unwrap_or(12345);
    let config_path: Option<PathBuf> = parse_arg(&args, "--config");
    let template_dir: Option<PathBuf> = parse_arg(&args, "--templates");
    let max_writes: Option<usize> = parse_arg(&args, "--writes");

    let mut config = match &config_path {
        Some(path) => PlacementConfig::load(path)?,
        None => PlacementConfig::default(),
    };
    if max_writes.is_some() {
        config.max_writes_per_step = max_writes;
    }

    let registry: Arc<dyn TemplateRegistry> = match &template_dir {
        Some(dir) => Arc::new(TemplateLibrary::load_dir(dir)?),
        None => Arc::new(builtin_templates()?),
    };

    println!("=== Terrafit Placement Demo ===");
    println!("Seed:   {}", seed);
    println!("Chunks: {}x{}", radius * 2 + 1, radius * 2 + 1);
    println!();

    let start = Instant::now();
    let mut world = GridWorld::overworld(seed).with_name("demo");
    build_terrain(&mut world, radius);
    world.take_modified();
    log::info!("Built {} chunks in {:.2}s", world.chunk_count(), start.elapsed().as_secs_f64());

    let budget = StepBudget::from_config(&config);
    let collaborators = Collaborators::new()
        .with_loot(Arc::new(LoggingLoot))
        .with_entities(Arc::new(LoggingSpawner));
    let mut engine = StructureEngine::new(config, registry)
        .with_seed(seed as u64)
        .with_collaborators(collaborators)
        .with_budget(budget);

    let start = Instant::now();
    let mut placements = Vec::new();
    for x in -radius..=radius {
        for z in -radius..=radius {
            placements.extend(engine.on_chunk_load(&mut world, ChunkCoord::new(x, z)));
        }
    }
    log::info!(
        "Evaluated chunks in {:.2}s, {} tasks queued",
        start.elapsed().as_secs_f64(),
        engine.scheduler().pending()
    );

    let start = Instant::now();
    let steps = engine.drain(&mut world);
    log::info!(
        "Pasted in {} steps ({:.2}s, {:.2}ms work per step), {} chunks touched",
        steps,
        start.elapsed().as_secs_f64(),
        engine.average_step_work().as_secs_f64() * 1000.0,
        world.take_modified().len()
    );

    println!();
    println!("{:<22} {:<16} location", "variant", "template");
    for record in &placements {
        println!("{:<22} {:<16} {}", record.variant.display_name(), record.name, record.location);
    }
    println!();
    println!("{} structures placed, {} steps", placements.len(), steps);
    Ok(())
}

/// Rolling hills with a sea, bedrock floor and dirt over stone
fn build_terrain(world: &mut GridWorld, radius: i32) {
    let min_y = world.min_height();
    let blocks = (radius + 1) * CHUNK_SIZE;
    for x in -radius * CHUNK_SIZE..blocks {
        for z in -radius * CHUNK_SIZE..blocks {
            let fx = x as f64;
            let fz = z as f64;
            let height = 64.0 + 10.0 * (fx / 47.0).sin() * (fz / 61.0).cos() + 4.0 * ((fx + fz) / 23.0).sin();
            let top = height.round() as i32;

            world.fill_column(x, z, min_y, min_y + 3, Material::Bedrock);
            world.fill_column(x, z, min_y + 4, top - 4, Material::Stone);
            world.fill_column(x, z, top - 3, top - 1, Material::Dirt);
            if top < SEA_LEVEL {
                world.set_block(IVec3::new(x, top, z), Material::Sand);
                world.fill_column(x, z, top + 1, SEA_LEVEL, Material::Water);
            } else {
                world.set_block(IVec3::new(x, top, z), Material::GrassBlock);
            }
        }
    }
}

fn builtin_templates() -> Result<TemplateLibrary> {
    let mut library = TemplateLibrary::new();

    let hut = Template::from_fn("hut", IVec3::new(7, 5, 7), IVec3::new(3, 1, 3), |p| {
        let wall = p.x == 0 || p.x == 6 || p.z == 0 || p.z == 6;
        match p.y {
            0 => BlockState::new(Material::Cobblestone),
            4 => BlockState::new(Material::OakPlanks),
            _ if p == IVec3::new(3, 1, 0) || p == IVec3::new(3, 2, 0) => BlockState::new(Material::Air),
            _ if wall => BlockState::new(Material::OakPlanks),
            1 if p.x == 1 && p.z == 1 => BlockState::with_state(Material::Chest, "facing=south"),
            _ => BlockState::new(Material::Air),
        }
    })?
    .with_variants(vec![StructureVariant::Surface]);
    library.insert(hut);

    let crypt = Template::from_fn("crypt", IVec3::new(9, 5, 9), IVec3::new(4, 0, 4), |p| {
        let shell = p.x == 0 || p.x == 8 || p.z == 0 || p.z == 8 || p.y == 0 || p.y == 4;
        if shell {
            BlockState::new(Material::StoneBricks)
        } else if p == IVec3::new(4, 1, 4) {
            BlockState::new(Material::Spawner)
        } else if p.y == 1 && p.x == 7 && p.z == 7 {
            BlockState::new(Material::Barrel)
        } else {
            BlockState::new(Material::CaveAir)
        }
    })?
    .with_variants(vec![StructureVariant::UndergroundShallow, StructureVariant::UndergroundDeep])
    .with_entities(vec![EntityMarker {
        pos: IVec3::new(2, 1, 2),
        kind: EntityKind::Skeleton,
    }]);
    library.insert(crypt);

    Ok(library)
}

/// Loot roller that only reports what it would fill
struct LoggingLoot;

impl LootRoller for LoggingLoot {
    fn roll_into(&self, world: &mut dyn VoxelWorld, pos: IVec3, template: &Template) -> Result<()> {
        log::info!("Loot for '{}' rolled into {} at {}", template.name(), world.block(pos), pos);
        Ok(())
    }
}

/// Entity spawner that only reports spawn requests
struct LoggingSpawner;

impl EntitySpawner for LoggingSpawner {
    fn spawn(&self, kind: EntityKind, location: &Location) -> Result<()> {
        log::info!("Spawn {:?} at {:.1} {} {:.1}", kind, location.x, location.y, location.z);
        Ok(())
    }
}

fn parse_arg<T: FromStr>(args: &[String], flag: &str) -> Option<T> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}
