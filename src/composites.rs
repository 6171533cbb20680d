//! Composite tasks: nodes that aggregate the statuses of multiple children
//! under a fixed combination rule.
//!
//! The plain `Sequence`/`Selector` remember the running child and resume
//! there on the next tick. The `Random*` variants do the same over an order
//! shuffled once per entry. The `Dynamic*` variants restart evaluation from
//! the first child every tick, so a higher-priority child becoming eligible
//! preempts a running lower-priority one.

use crate::context::Context;
use crate::error::AddChildResult;
use crate::task::{NumChildren, Task, TaskNode};
use crate::Status;
use rand::seq::SliceRandom;

macro_rules! child_list_impl {
    () => {
        fn children(&self) -> &[TaskNode] {
            &self.children
        }

        fn children_mut(&mut self) -> &mut [TaskNode] {
            &mut self.children
        }

        fn add_child(&mut self, child: TaskNode) -> AddChildResult {
            self.children.push(child);
            Ok(())
        }

        fn max_children(&self) -> NumChildren {
            NumChildren::Infinite
        }
    };
}

/// Ticks children in order. A child failure fails the whole composite
/// immediately; all children succeeding succeeds it. A running child is
/// remembered and resumed first on the next tick.
#[derive(Default)]
pub struct Sequence {
    children: Vec<TaskNode>,
    current: usize,
}

impl Task for Sequence {
    fn enter(&mut self, _ctx: &mut Context) {
        self.current = 0;
    }

    fn tick(&mut self, ctx: &mut Context) -> Status {
        while self.current < self.children.len() {
            match self.children[self.current].execute(ctx) {
                Status::Success => self.current += 1,
                status => return status,
            }
        }
        Status::Success
    }

    child_list_impl!();
}

/// Mirror of [`Sequence`]: the first child success wins immediately, and
/// the composite fails only when every child has failed.
#[derive(Default)]
pub struct Selector {
    children: Vec<TaskNode>,
    current: usize,
}

impl Task for Selector {
    fn enter(&mut self, _ctx: &mut Context) {
        self.current = 0;
    }

    fn tick(&mut self, ctx: &mut Context) -> Status {
        while self.current < self.children.len() {
            match self.children[self.current].execute(ctx) {
                Status::Failure => self.current += 1,
                status => return status,
            }
        }
        Status::Failure
    }

    child_list_impl!();
}

/// Ticks every child each tick and completes once enough children have
/// succeeded or failed, aborting any still running.
///
/// "Parallel" means simultaneous logical evaluation within one tick, not
/// threads; children are still ticked one after another in declared order.
pub struct Parallel {
    children: Vec<TaskNode>,
    successes_required: usize,
    failures_required: usize,
    repeat: bool,
}

impl Parallel {
    pub fn new(successes_required: usize, failures_required: usize) -> Self {
        Self {
            children: Vec::new(),
            successes_required,
            failures_required,
            repeat: false,
        }
    }

    /// Re-enter completed children on subsequent ticks instead of keeping
    /// their terminal status until the composite completes.
    pub fn with_repeat(mut self, repeat: bool) -> Self {
        self.repeat = repeat;
        self
    }
}

impl Default for Parallel {
    fn default() -> Self {
        Self::new(1, 1)
    }
}

impl Task for Parallel {
    fn tick(&mut self, ctx: &mut Context) -> Status {
        let mut succeeded = 0;
        let mut failed = 0;
        let mut result = Status::Running;
        let repeat = self.repeat;
        for child in &mut self.children {
            let status = if !repeat && child.status().is_terminal() {
                child.status()
            } else {
                child.execute(ctx)
            };
            match status {
                Status::Success => {
                    succeeded += 1;
                    if succeeded >= self.successes_required && result == Status::Running {
                        result = Status::Success;
                    }
                }
                Status::Failure => {
                    failed += 1;
                    if failed >= self.failures_required && result == Status::Running {
                        result = Status::Failure;
                    }
                }
                _ => (),
            }
        }
        if result != Status::Running {
            for child in &mut self.children {
                child.abort(ctx);
            }
        }
        result
    }

    child_list_impl!();
}

/// [`Sequence`] semantics over a child order shuffled anew on every entry.
/// The order is fixed for the whole activation, not re-shuffled mid-run.
#[derive(Default)]
pub struct RandomSequence {
    children: Vec<TaskNode>,
    order: Vec<usize>,
    current: usize,
}

impl Task for RandomSequence {
    fn enter(&mut self, ctx: &mut Context) {
        self.current = 0;
        self.order = (0..self.children.len()).collect();
        self.order.shuffle(ctx.rng());
    }

    fn tick(&mut self, ctx: &mut Context) -> Status {
        while self.current < self.order.len() {
            let index = self.order[self.current];
            match self.children[index].execute(ctx) {
                Status::Success => self.current += 1,
                status => return status,
            }
        }
        Status::Success
    }

    child_list_impl!();
}

/// [`Selector`] semantics over a child order shuffled anew on every entry.
#[derive(Default)]
pub struct RandomSelector {
    children: Vec<TaskNode>,
    order: Vec<usize>,
    current: usize,
}

impl Task for RandomSelector {
    fn enter(&mut self, ctx: &mut Context) {
        self.current = 0;
        self.order = (0..self.children.len()).collect();
        self.order.shuffle(ctx.rng());
    }

    fn tick(&mut self, ctx: &mut Context) -> Status {
        while self.current < self.order.len() {
            let index = self.order[self.current];
            match self.children[index].execute(ctx) {
                Status::Failure => self.current += 1,
                status => return status,
            }
        }
        Status::Failure
    }

    child_list_impl!();
}

/// [`Sequence`] that re-evaluates children from the first one on every
/// tick. A child before the previously running one returning a non-success
/// preempts it: the running child is aborted.
#[derive(Default)]
pub struct DynamicSequence {
    children: Vec<TaskNode>,
    last_running: Option<usize>,
}

impl Task for DynamicSequence {
    fn enter(&mut self, _ctx: &mut Context) {
        self.last_running = None;
    }

    fn tick(&mut self, ctx: &mut Context) -> Status {
        let mut status = Status::Success;
        let mut index = self.children.len();
        for (i, child) in self.children.iter_mut().enumerate() {
            status = child.execute(ctx);
            if status != Status::Success {
                index = i;
                break;
            }
        }
        if let Some(prev) = self.last_running {
            if prev != index && self.children[prev].is_running() {
                self.children[prev].abort(ctx);
            }
        }
        self.last_running = if status == Status::Running {
            Some(index)
        } else {
            None
        };
        status
    }

    child_list_impl!();
}

/// [`Selector`] that re-evaluates children from the first one on every
/// tick, aborting a running lower-priority child when a higher-priority
/// one takes over.
#[derive(Default)]
pub struct DynamicSelector {
    children: Vec<TaskNode>,
    last_running: Option<usize>,
}

impl Task for DynamicSelector {
    fn enter(&mut self, _ctx: &mut Context) {
        self.last_running = None;
    }

    fn tick(&mut self, ctx: &mut Context) -> Status {
        let mut status = Status::Failure;
        let mut index = self.children.len();
        for (i, child) in self.children.iter_mut().enumerate() {
            status = child.execute(ctx);
            if status != Status::Failure {
                index = i;
                break;
            }
        }
        if let Some(prev) = self.last_running {
            if prev != index && self.children[prev].is_running() {
                self.children[prev].abort(ctx);
            }
        }
        self.last_running = if status == Status::Running {
            Some(index)
        } else {
            None
        };
        status
    }

    child_list_impl!();
}
