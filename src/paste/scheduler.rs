//! Budgeted incremental paste queue
//!
//! Placed templates are turned into [`PasteTask`]s and drained across
//! simulation steps so that large structures never stall a step. Exactly one
//! task drains at a time, in FIFO order. When a task runs out of writes its
//! completion runs and the scheduler goes back to idle; the next task starts
//! on the following step.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use super::budget::StepBudget;
use super::decompose::SubWrite;
use crate::template::Template;
use crate::voxel::{Location, VoxelWorld};

/// Work run once every write of a task has been applied
pub type Completion = Box<dyn FnOnce(&mut dyn VoxelWorld)>;

/// One template paste spread over several steps
pub struct PasteTask {
    template: Arc<Template>,
    location: Location,
    writes: Vec<SubWrite>,
    /// Index of the next write to apply
    cursor: usize,
    completion: Option<Completion>,
}

impl PasteTask {
    /// Create a new task
    ///
    /// # Arguments
    /// * `template` - Template being pasted
    /// * `location` - Placement location of the template
    /// * `writes` - Block writes, applied in order
    pub fn new(template: Arc<Template>, location: Location, writes: Vec<SubWrite>) -> Self {
        Self {
            template,
            location,
            writes,
            cursor: 0,
            completion: None,
        }
    }

    /// Attach work to run after the last write
    pub fn with_completion(mut self, completion: impl FnOnce(&mut dyn VoxelWorld) + 'static) -> Self {
        self.completion = Some(Box::new(completion));
        self
    }

    pub fn template(&self) -> &Arc<Template> {
        &self.template
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Total number of writes
    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    /// Writes not yet applied
    pub fn remaining(&self) -> usize {
        self.writes.len() - self.cursor
    }

    fn is_finished(&self) -> bool {
        self.cursor >= self.writes.len()
    }
}

impl fmt::Debug for PasteTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasteTask")
            .field("template", &self.template.name())
            .field("location", &self.location)
            .field("writes", &self.writes.len())
            .field("cursor", &self.cursor)
            .field("has_completion", &self.completion.is_some())
            .finish()
    }
}

/// Scheduler state between steps
#[derive(Debug, Default)]
pub enum SchedulerState {
    /// Nothing is draining
    #[default]
    Idle,
    /// A task is partway through its writes
    Draining(PasteTask),
}

/// What happened during one step
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StepReport {
    /// Writes applied, including failed complex writes
    pub writes: usize,
    /// Complex writes the world refused
    pub failed_writes: usize,
    /// Template whose task started this step
    pub started: Option<String>,
    /// Template whose task finished this step
    pub completed: Option<String>,
}

/// FIFO queue of paste tasks
#[derive(Debug, Default)]
pub struct PasteScheduler {
    queue: VecDeque<PasteTask>,
    state: SchedulerState,
    completed: u64,
}

impl PasteScheduler {
    /// Create a new idle scheduler
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a task behind every task already waiting
    pub fn enqueue(&mut self, task: PasteTask) {
        log::debug!(
            "Queued paste of '{}' at {} ({} writes, {} waiting)",
            task.template.name(),
            task.location,
            task.len(),
            self.queue.len()
        );
        self.queue.push_back(task);
    }

    pub fn state(&self) -> &SchedulerState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, SchedulerState::Idle)
    }

    /// Tasks waiting behind the draining one
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Whether any task is draining or waiting
    pub fn has_work(&self) -> bool {
        !self.is_idle() || !self.queue.is_empty()
    }

    /// Task currently draining
    pub fn current(&self) -> Option<&PasteTask> {
        match &self.state {
            SchedulerState::Draining(task) => Some(task),
            SchedulerState::Idle => None,
        }
    }

    /// Number of tasks completed so far
    pub fn completed(&self) -> u64 {
        self.completed
    }

    /// Run one step of paste work.
    ///
    /// Starts the next queued task when idle, applies writes while the
    /// budget allows (always at least one) and runs the completion once the
    /// task is out of writes.
    pub fn step(&mut self, world: &mut dyn VoxelWorld, budget: &mut StepBudget) -> StepReport {
        budget.start_step();
        let mut report = StepReport::default();

        if self.is_idle() {
            let Some(task) = self.queue.pop_front() else {
                return report;
            };
            report.started = Some(task.template.name().to_string());
            self.state = SchedulerState::Draining(task);
        }

        let SchedulerState::Draining(task) = &mut self.state else {
            return report;
        };

        while !task.is_finished() && budget.can_write() {
            let write = &task.writes[task.cursor];
            task.cursor += 1;
            if !apply(world, write) {
                report.failed_writes += 1;
            }
            budget.record_write();
            report.writes += 1;
        }

        if task.is_finished() {
            if let SchedulerState::Draining(mut task) = std::mem::take(&mut self.state) {
                log::info!("Finished pasting '{}' at {}", task.template.name(), task.location);
                if let Some(completion) = task.completion.take() {
                    completion(world);
                }
                report.completed = Some(task.template.name().to_string());
                self.completed += 1;
            }
        }

        report
    }

    /// Step until every queued task has completed. Returns the step count.
    pub fn drain(&mut self, world: &mut dyn VoxelWorld, budget: &mut StepBudget) -> usize {
        let mut steps = 0;
        while self.has_work() {
            self.step(world, budget);
            steps += 1;
        }
        steps
    }
}

/// Apply one write. Returns false if a complex write was refused.
fn apply(world: &mut dyn VoxelWorld, write: &SubWrite) -> bool {
    match write {
        SubWrite::Direct { pos, material } => {
            world.set_block(*pos, *material);
            true
        }
        SubWrite::Complex { pos, block } => match world.write_complex(*pos, block) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Failed pasting {} at {}: {}", block.material, pos, e);
                false
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::IVec3;
    use crate::voxel::{BlockState, GridWorld, Material, WorldId};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn task(name: &str, count: i32) -> PasteTask {
        let template = Arc::new(Template::solid(name, IVec3::new(count, 1, 1), IVec3::ZERO, Material::Stone).unwrap());
        let writes = (0..count)
            .map(|x| SubWrite::Direct {
                pos: IVec3::new(x, 70, 0),
                material: Material::Stone,
            })
            .collect();
        PasteTask::new(template, Location::new(WorldId(0), 0.0, 70, 0.0), writes)
    }

    #[test]
    fn test_steps_to_drain() {
        let mut world = GridWorld::overworld(0);
        let mut scheduler = PasteScheduler::new();
        scheduler.enqueue(task("wall", 10));
        let mut budget = StepBudget::writes_per_step(3);

        // ceil(10 / 3) = 4
        assert_eq!(scheduler.drain(&mut world, &mut budget), 4);
        assert_eq!(world.block(IVec3::new(9, 70, 0)), Material::Stone);
        assert_eq!(scheduler.completed(), 1);
        assert!(scheduler.is_idle());
    }

    #[test]
    fn test_fifo_one_task_per_step() {
        let mut world = GridWorld::overworld(0);
        let mut scheduler = PasteScheduler::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        for name in ["first", "second", "third"] {
            let order = Rc::clone(&order);
            scheduler.enqueue(task(name, 2).with_completion(move |_| order.borrow_mut().push(name)));
        }
        let mut budget = StepBudget::unlimited();

        let report = scheduler.step(&mut world, &mut budget);
        assert_eq!(report.started.as_deref(), Some("first"));
        assert_eq!(report.completed.as_deref(), Some("first"));
        assert_eq!(report.writes, 2);
        // The next task waits for the next step
        assert!(scheduler.is_idle());
        assert_eq!(scheduler.pending(), 2);

        assert_eq!(scheduler.drain(&mut world, &mut budget), 2);
        assert_eq!(*order.borrow(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_completion_runs_once_after_last_write() {
        let mut world = GridWorld::overworld(0);
        let mut scheduler = PasteScheduler::new();
        let calls = Rc::new(RefCell::new(0));
        let seen = Rc::clone(&calls);
        scheduler.enqueue(task("tower", 5).with_completion(move |w| {
            assert_eq!(w.block(IVec3::new(4, 70, 0)), Material::Stone);
            *seen.borrow_mut() += 1;
        }));
        let mut budget = StepBudget::writes_per_step(2);

        for _ in 0..2 {
            scheduler.step(&mut world, &mut budget);
            assert_eq!(*calls.borrow(), 0);
        }
        let report = scheduler.step(&mut world, &mut budget);
        assert_eq!(report.writes, 1);
        assert_eq!(*calls.borrow(), 1);

        scheduler.step(&mut world, &mut budget);
        assert_eq!(*calls.borrow(), 1);
        assert!(!scheduler.has_work());
    }

    #[test]
    fn test_zero_budget_still_progresses() {
        let mut world = GridWorld::overworld(0);
        let mut scheduler = PasteScheduler::new();
        scheduler.enqueue(task("post", 3));
        let mut budget = StepBudget::new(std::time::Duration::ZERO, Some(0));
        assert_eq!(scheduler.drain(&mut world, &mut budget), 3);
    }

    #[test]
    fn test_complex_failure_continues() {
        crate::core::logging::init_for_tests();
        let mut world = GridWorld::overworld(0);
        world.lock_block(IVec3::new(0, 70, 0));
        let template = Arc::new(Template::solid("cache", IVec3::new(2, 1, 1), IVec3::ZERO, Material::Chest).unwrap());
        let writes = vec![
            SubWrite::Complex {
                pos: IVec3::new(0, 70, 0),
                block: BlockState::new(Material::Chest),
            },
            SubWrite::Complex {
                pos: IVec3::new(1, 70, 0),
                block: BlockState::with_state(Material::Chest, "facing=east"),
            },
        ];
        let mut scheduler = PasteScheduler::new();
        scheduler.enqueue(PasteTask::new(template, Location::new(WorldId(0), 0.0, 70, 0.0), writes));

        let report = scheduler.step(&mut world, &mut StepBudget::unlimited());
        assert_eq!(report.writes, 2);
        assert_eq!(report.failed_writes, 1);
        assert_eq!(report.completed.as_deref(), Some("cache"));
        assert_eq!(world.block(IVec3::new(1, 70, 0)), Material::Chest);
        assert_eq!(world.state_at(IVec3::new(1, 70, 0)), Some("facing=east"));
    }

    #[test]
    fn test_empty_task_completes_on_start() {
        let mut world = GridWorld::overworld(0);
        let mut scheduler = PasteScheduler::new();
        scheduler.enqueue(task("nothing", 0));
        let report = scheduler.step(&mut world, &mut StepBudget::unlimited());
        assert_eq!(report.writes, 0);
        assert_eq!(report.completed.as_deref(), Some("nothing"));
    }
}
