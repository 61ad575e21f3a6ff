//! Cancellable discrete motion tasks
//!
//! Distinct from the continuous per-tick mapper: a motion task moves one
//! fixture to a target height at bounded speed and then finishes. The
//! registry enforces a single owner per fixture index: starting a new task
//! cancels and deregisters any existing task for that index first, so two
//! tasks can never race on the same DMX address. Cancellation is a token
//! handed out at spawn; a cancelled task stops writing on its next tick.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::debug;

use crate::dmx::fixture::FixtureBank;

/// Caller-side handle to a running motion task
#[derive(Debug, Clone)]
pub struct MotionHandle {
    cancelled: Arc<AtomicBool>,
    finished: Arc<AtomicBool>,
}

impl MotionHandle {
    /// Request cancellation; the task stops writing on its next tick
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// True once cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// True once the task reached its target (not set on cancellation)
    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Acquire)
    }
}

#[derive(Debug)]
struct MotionTask {
    position: f32,
    target: f32,
    speed: f32,
    cancelled: Arc<AtomicBool>,
    finished: Arc<AtomicBool>,
}

/// Registry of live motion tasks, keyed by fixture index
#[derive(Debug, Default)]
pub struct MotionRegistry {
    tasks: HashMap<usize, MotionTask>,
}

impl MotionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a move for `index` from `from` to `target` (heights, 0..=100
    /// scale) at `max_speed` units per second. Any task already owning the
    /// index is cancelled and deregistered first.
    pub fn start(&mut self, index: usize, from: f32, target: f32, max_speed: f32) -> MotionHandle {
        if let Some(old) = self.tasks.remove(&index) {
            old.cancelled.store(true, Ordering::Release);
            debug!(index, "superseded running motion task");
        }
        let task = MotionTask {
            position: from,
            target,
            speed: max_speed.max(0.0),
            cancelled: Arc::new(AtomicBool::new(false)),
            finished: Arc::new(AtomicBool::new(false)),
        };
        let handle = MotionHandle {
            cancelled: Arc::clone(&task.cancelled),
            finished: Arc::clone(&task.finished),
        };
        self.tasks.insert(index, task);
        handle
    }

    /// True while a task owns the fixture index
    pub fn owns(&self, index: usize) -> bool {
        self.tasks.contains_key(&index)
    }

    /// Number of live tasks
    pub fn active_count(&self) -> usize {
        self.tasks.len()
    }

    /// Advance every live task by `dt` seconds, writing heights through
    /// the bank. Cancelled tasks are dropped without writing.
    pub fn tick(&mut self, dt: f32, bank: &mut FixtureBank) {
        if dt <= 0.0 {
            return;
        }
        self.tasks.retain(|&index, task| {
            if task.cancelled.load(Ordering::Acquire) {
                return false;
            }
            let step = task.speed * dt;
            let delta = task.target - task.position;
            if delta.abs() <= step {
                task.position = task.target;
            } else {
                task.position += step.copysign(delta);
            }
            bank.set_height(index, task.position.round().clamp(0.0, 255.0) as u8);
            if task.position == task.target {
                task.finished.store(true, Ordering::Release);
                debug!(index, target = task.target, "motion task finished");
                return false;
            }
            true
        });
    }

    /// Cancel and deregister every task
    pub fn cancel_all(&mut self) {
        for task in self.tasks.values() {
            task.cancelled.store(true, Ordering::Release);
        }
        self.tasks.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dmx::fixture::KineticFixture;

    fn bank() -> FixtureBank {
        FixtureBank::new(vec![KineticFixture::at(1), KineticFixture::at(5)])
    }

    #[test]
    fn task_moves_at_bounded_speed_and_finishes() {
        let mut bank = bank();
        let mut registry = MotionRegistry::new();
        let handle = registry.start(0, 100.0, 0.0, 50.0);

        registry.tick(1.0, &mut bank); // 100 -> 50
        assert_eq!(bank.universe().channel(1), 128);
        assert!(!handle.is_finished());

        registry.tick(1.0, &mut bank); // 50 -> 0, reached
        assert_eq!(bank.universe().channel(1), 0);
        assert!(handle.is_finished());
        assert_eq!(registry.active_count(), 0);
    }

    #[test]
    fn starting_a_new_task_cancels_the_old_owner() {
        let mut registry = MotionRegistry::new();
        let first = registry.start(0, 100.0, 0.0, 10.0);
        let second = registry.start(0, 100.0, 40.0, 10.0);

        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());
        assert_eq!(registry.active_count(), 1);
    }

    #[test]
    fn cancelled_task_stops_writing_immediately() {
        let mut bank = bank();
        let mut registry = MotionRegistry::new();
        let handle = registry.start(0, 100.0, 0.0, 50.0);
        registry.tick(1.0, &mut bank);
        let written = bank.universe().channel(1);

        handle.cancel();
        registry.tick(1.0, &mut bank);
        assert_eq!(bank.universe().channel(1), written);
        assert_eq!(registry.active_count(), 0);
        assert!(!handle.is_finished());
    }

    #[test]
    fn cancel_all_clears_every_task() {
        let mut bank = bank();
        let mut registry = MotionRegistry::new();
        let a = registry.start(0, 0.0, 100.0, 10.0);
        let b = registry.start(1, 0.0, 100.0, 10.0);
        registry.cancel_all();
        assert!(a.is_cancelled() && b.is_cancelled());
        assert_eq!(registry.active_count(), 0);
        registry.tick(1.0, &mut bank);
        assert!(bank.universe().data().iter().all(|&c| c == 0));
    }
}
