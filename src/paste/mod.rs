//! Incremental paste of placed templates.
//!
//! A placed template is decomposed into block writes, queued as a
//! [`PasteTask`] and drained by the [`PasteScheduler`] under a per-step
//! [`StepBudget`]. Once the last write lands, [`PostPlacement`] runs the
//! pedestal, tree clearing, loot and spawn collaborators.

pub mod budget;
pub mod collaborators;
pub mod decompose;
pub mod finish;
pub mod scheduler;

pub use budget::StepBudget;
pub use collaborators::{
    report_outcomes, Collaborators, DungeonBuilder, EntitySpawner, LootRoller, OperatorNotifier,
    PlacementNotice, PropPlacer, RegionProtector, ThirdPartySpawner,
};
pub use decompose::{decompose, PedestalPalette, SubWrite};
pub use finish::{clear_trees, fill_pedestal, ColumnEdit, PostPlacement};
pub use scheduler::{Completion, PasteScheduler, PasteTask, SchedulerState, StepReport};
