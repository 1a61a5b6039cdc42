//! Structure placement: where templates go and when.
//!
//! 1. Eligibility hashing picks at most one anchor chunk per grid cell
//! 2. Placement search scans terrain and topology around the anchor
//! 3. The engine hands accepted placements to the paste scheduler

pub mod config;
pub mod eligibility;
pub mod engine;
pub mod fit;
pub mod terrain_scan;
pub mod topology;
pub mod variant;

pub use config::{DungeonGeneratorConfig, HeightBand, PlacementConfig, SpacingTable, VariantSpacing};
pub use eligibility::is_eligible;
pub use engine::{ChunkLoadGuard, PlacementRecord, StructureEngine};
pub use fit::{find_placement, FitContext, Placement, PlacementCandidate, PlacementPolicy};
pub use terrain_scan::ScanKind;
pub use topology::Topology;
pub use variant::StructureVariant;
