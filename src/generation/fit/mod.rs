//! Placement search.
//!
//! Each variant decides where a template may go in four steps: a base
//! location in the loaded chunk, a vertical placement rule, a search over
//! nearby candidates and an acceptance threshold. [`PlacementPolicy`] picks
//! the strategy for a variant and [`find_placement`] runs the steps in order.

pub mod liquid;
pub mod sky;
pub mod streak;
pub mod surface;
pub mod underground;

use std::sync::Arc;

use rand::RngCore;

use super::config::PlacementConfig;
use super::variant::StructureVariant;
use crate::template::Template;
use crate::voxel::{ChunkCoord, Environment, Location, VoxelWorld, CHUNK_SIZE};

pub use liquid::LiquidFit;
pub use sky::SkyFit;
pub use surface::SurfaceFit;
pub use underground::UndergroundFit;

/// Score a candidate must beat before it is kept at all
pub const MIN_SCORE: f64 = 10.0;

/// Shared read-only inputs of a placement search
#[derive(Clone, Copy)]
pub struct FitContext<'a> {
    pub world: &'a dyn VoxelWorld,
    pub config: &'a PlacementConfig,
}

impl<'a> FitContext<'a> {
    pub fn new(world: &'a dyn VoxelWorld, config: &'a PlacementConfig) -> Self {
        Self { world, config }
    }

    pub fn environment(&self) -> Environment {
        self.world.environment()
    }

    /// Sampling stride for terrain and topology scans
    pub fn stride(&self) -> i32 {
        self.config.scan_stride.max(1)
    }

    /// Neighbour radius, in chunks
    pub fn search_radius(&self) -> i32 {
        self.config.search_radius.max(0)
    }
}

/// One scored location
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacementCandidate {
    pub location: Location,
    /// Terrain adequacy in `[0, 100]`
    pub adequacy: f64,
    /// Topology score, 0 for variants that don't use it
    pub topology: f64,
    /// Variant-specific combined score used for ranking
    pub score: f64,
}

impl PlacementCandidate {
    /// Candidate ranked by adequacy alone
    pub fn from_adequacy(location: Location, adequacy: f64) -> Self {
        Self {
            location,
            adequacy,
            topology: 0.0,
            score: adequacy,
        }
    }
}

/// Best-so-far tracker. A candidate replaces the current best only when its
/// score is strictly higher, starting from [`MIN_SCORE`].
pub(crate) struct BestCandidate {
    best: Option<PlacementCandidate>,
    highest: f64,
}

impl BestCandidate {
    pub fn new() -> Self {
        Self { best: None, highest: MIN_SCORE }
    }

    /// Keep `candidate` if it beats the current best. Returns whether it did.
    pub fn offer(&mut self, candidate: PlacementCandidate) -> bool {
        if candidate.score > self.highest {
            self.highest = candidate.score;
            self.best = Some(candidate);
            true
        } else {
            false
        }
    }

    pub fn score(&self) -> f64 {
        self.highest
    }

    pub fn into_inner(self) -> Option<PlacementCandidate> {
        self.best
    }
}

/// Chunk offsets in ring order: the center, then each ring of Chebyshev
/// radius 1 through `radius`, x-major within a ring.
pub fn ring_offsets(radius: i32) -> impl Iterator<Item = (i32, i32)> {
    std::iter::once((0, 0)).chain((1..=radius).flat_map(|r| {
        (-r..=r).flat_map(move |x| {
            (-r..=r)
                .filter(move |&z| x.abs() == r || z.abs() == r)
                .map(move |z| (x, z))
        })
    }))
}

/// Chunk offsets of the full square of `radius`: the center first, then the
/// rest x-major.
pub fn square_offsets(radius: i32) -> impl Iterator<Item = (i32, i32)> {
    std::iter::once((0, 0)).chain(
        (-radius..=radius)
            .flat_map(move |x| (-radius..=radius).map(move |z| (x, z)))
            .filter(|&offset| offset != (0, 0)),
    )
}

/// Location shifted by whole chunks
pub(crate) fn chunk_shift(location: &Location, (dx, dz): (i32, i32)) -> Location {
    location.offset_xz((dx * CHUNK_SIZE) as f64, (dz * CHUNK_SIZE) as f64)
}

/// Center of a chunk at the given height
pub(crate) fn chunk_center(world: &dyn VoxelWorld, chunk: ChunkCoord, y: i32) -> Location {
    let (x, z) = chunk.center_block();
    Location::new(world.id(), x as f64, y, z as f64)
}

/// Per-variant placement rules
pub trait FitStrategy {
    /// Starting location for the loaded chunk
    fn base_location(&self, ctx: &FitContext<'_>, chunk: ChunkCoord) -> Location {
        let (x, z) = chunk.center_block();
        let y = ctx.world.highest_block_y(x, z).unwrap_or(ctx.world.min_height());
        chunk_center(ctx.world, chunk, y)
    }

    /// Height the search starts from, or `None` to abort the attempt
    fn vertical_placement(&self, ctx: &FitContext<'_>, base: Location, rng: &mut dyn RngCore) -> Option<Location>;

    /// Best accepted candidate around `start`
    fn search(&self, ctx: &FitContext<'_>, template: &Template, start: Location) -> Option<PlacementCandidate>;

    /// Whether a candidate is good enough to place
    fn accepts(&self, ctx: &FitContext<'_>, candidate: &PlacementCandidate) -> bool;
}

/// Placement strategy for each searchable variant
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlacementPolicy {
    Sky(SkyFit),
    Surface(SurfaceFit),
    LiquidSurface(LiquidFit),
    Underground(UndergroundFit),
}

impl PlacementPolicy {
    /// Policy for a variant. Dungeons are built externally and have none.
    pub fn for_variant(variant: StructureVariant) -> Option<Self> {
        match variant {
            StructureVariant::Sky => Some(Self::Sky(SkyFit)),
            StructureVariant::Surface => Some(Self::Surface(SurfaceFit)),
            StructureVariant::LiquidSurface => Some(Self::LiquidSurface(LiquidFit)),
            StructureVariant::UndergroundShallow => Some(Self::Underground(UndergroundFit::shallow())),
            StructureVariant::UndergroundDeep => Some(Self::Underground(UndergroundFit::deep())),
            StructureVariant::Dungeon => None,
        }
    }

    pub fn variant(&self) -> StructureVariant {
        match self {
            Self::Sky(_) => StructureVariant::Sky,
            Self::Surface(_) => StructureVariant::Surface,
            Self::LiquidSurface(_) => StructureVariant::LiquidSurface,
            Self::Underground(fit) => fit.variant(),
        }
    }

    fn strategy(&self) -> &dyn FitStrategy {
        match self {
            Self::Sky(fit) => fit,
            Self::Surface(fit) => fit,
            Self::LiquidSurface(fit) => fit,
            Self::Underground(fit) => fit,
        }
    }
}

impl FitStrategy for PlacementPolicy {
    fn base_location(&self, ctx: &FitContext<'_>, chunk: ChunkCoord) -> Location {
        self.strategy().base_location(ctx, chunk)
    }

    fn vertical_placement(&self, ctx: &FitContext<'_>, base: Location, rng: &mut dyn RngCore) -> Option<Location> {
        self.strategy().vertical_placement(ctx, base, rng)
    }

    fn search(&self, ctx: &FitContext<'_>, template: &Template, start: Location) -> Option<PlacementCandidate> {
        self.strategy().search(ctx, template, start)
    }

    fn accepts(&self, ctx: &FitContext<'_>, candidate: &PlacementCandidate) -> bool {
        self.strategy().accepts(ctx, candidate)
    }
}

/// A successful search
#[derive(Clone, Debug)]
pub struct Placement {
    pub variant: StructureVariant,
    pub template: Arc<Template>,
    pub candidate: PlacementCandidate,
}

impl Placement {
    pub fn location(&self) -> &Location {
        &self.candidate.location
    }
}

/// Run a full placement attempt for one chunk.
///
/// `choose` picks the template once the starting height is known; it
/// receives the same generator so the whole attempt stays reproducible.
/// Every failure is a silent `None` with a debug log line.
pub fn find_placement(
    policy: &PlacementPolicy,
    ctx: &FitContext<'_>,
    chunk: ChunkCoord,
    rng: &mut dyn RngCore,
    choose: impl FnOnce(&Location, &mut dyn RngCore) -> Option<Arc<Template>>,
) -> Option<Placement> {
    let variant = policy.variant();
    let base = policy.base_location(ctx, chunk);

    let Some(start) = policy.vertical_placement(ctx, base, rng) else {
        log::debug!("{} in chunk {:?}: no valid starting height", variant, chunk);
        return None;
    };

    let Some(template) = choose(&start, rng) else {
        log::debug!("{} in chunk {:?}: no template", variant, chunk);
        return None;
    };

    let Some(candidate) = policy.search(ctx, &template, start) else {
        log::debug!(
            "{} in chunk {:?}: no adequate location for '{}'",
            variant,
            chunk,
            template.name()
        );
        return None;
    };

    Some(Placement {
        variant,
        template,
        candidate,
    })
}
