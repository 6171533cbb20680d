//! Decorator tasks: single-child nodes that transform their child's
//! status, timing or repetition.
//!
//! Timed decorators accumulate the delta passed into each tick; they never
//! sample a clock. Abort propagation to the child happens through the
//! shared recursion in [`TaskNode::abort`].

use crate::blackboard::BlackboardPlan;
use crate::context::Context;
use crate::error::{AddChildError, AddChildResult};
use crate::task::{NumChildren, Task, TaskNode};
use crate::Status;
use rand::Rng;

macro_rules! child_slot_impl {
    () => {
        fn children(&self) -> &[TaskNode] {
            self.child.as_ref().map(std::slice::from_ref).unwrap_or(&[])
        }

        fn children_mut(&mut self) -> &mut [TaskNode] {
            self.child
                .as_mut()
                .map(std::slice::from_mut)
                .unwrap_or(&mut [])
        }

        fn add_child(&mut self, child: TaskNode) -> AddChildResult {
            if self.child.is_some() {
                return Err(AddChildError::TooManyChildren);
            }
            self.child = Some(child);
            Ok(())
        }

        fn max_children(&self) -> NumChildren {
            NumChildren::Finite(1)
        }
    };
}

/// Swaps the child's success and failure; running passes through.
#[derive(Default)]
pub struct Invert {
    child: Option<TaskNode>,
}

impl Task for Invert {
    fn tick(&mut self, ctx: &mut Context) -> Status {
        let Some(child) = self.child.as_mut() else {
            return Status::Failure;
        };
        match child.execute(ctx) {
            Status::Success => Status::Failure,
            Status::Failure => Status::Success,
            status => status,
        }
    }

    child_slot_impl!();
}

/// Succeeds whatever the child's result is; the child is still ticked for
/// its side effects, and running passes through.
#[derive(Default)]
pub struct AlwaysSucceed {
    child: Option<TaskNode>,
}

impl Task for AlwaysSucceed {
    fn tick(&mut self, ctx: &mut Context) -> Status {
        if let Some(child) = self.child.as_mut() {
            if child.execute(ctx) == Status::Running {
                return Status::Running;
            }
        }
        Status::Success
    }

    child_slot_impl!();
}

/// Fails whatever the child's result is; running passes through.
#[derive(Default)]
pub struct AlwaysFail {
    child: Option<TaskNode>,
}

impl Task for AlwaysFail {
    fn tick(&mut self, ctx: &mut Context) -> Status {
        if let Some(child) = self.child.as_mut() {
            if child.execute(ctx) == Status::Running {
                return Status::Running;
            }
        }
        Status::Failure
    }

    child_slot_impl!();
}

/// Runs for the configured number of seconds, then ticks the child and
/// returns its status. The countdown restarts on every entry.
pub struct Delay {
    duration: f64,
    time_passed: f64,
    child: Option<TaskNode>,
}

impl Delay {
    pub fn new(duration: f64) -> Self {
        Self {
            duration,
            time_passed: 0.0,
            child: None,
        }
    }
}

impl Task for Delay {
    fn enter(&mut self, _ctx: &mut Context) {
        self.time_passed = 0.0;
    }

    fn tick(&mut self, ctx: &mut Context) -> Status {
        let Some(child) = self.child.as_mut() else {
            return Status::Failure;
        };
        self.time_passed += ctx.delta();
        if self.time_passed < self.duration {
            return Status::Running;
        }
        child.execute(ctx)
    }

    child_slot_impl!();
}

/// Ticks the child normally, but aborts it and fails once it has been
/// running for longer than the configured duration.
pub struct TimeLimit {
    duration: f64,
    time_passed: f64,
    child: Option<TaskNode>,
}

impl TimeLimit {
    pub fn new(duration: f64) -> Self {
        Self {
            duration,
            time_passed: 0.0,
            child: None,
        }
    }
}

impl Task for TimeLimit {
    fn enter(&mut self, _ctx: &mut Context) {
        self.time_passed = 0.0;
    }

    fn tick(&mut self, ctx: &mut Context) -> Status {
        let Some(child) = self.child.as_mut() else {
            return Status::Failure;
        };
        self.time_passed += ctx.delta();
        if self.time_passed < self.duration {
            return child.execute(ctx);
        }
        child.abort(ctx);
        Status::Failure
    }

    child_slot_impl!();
}

/// After the child completes, fails unconditionally for the configured
/// duration before letting the child run again. The window persists across
/// re-entries of the decorator itself.
pub struct Cooldown {
    duration: f64,
    remaining: f64,
    child: Option<TaskNode>,
}

impl Cooldown {
    pub fn new(duration: f64) -> Self {
        Self {
            duration,
            remaining: 0.0,
            child: None,
        }
    }
}

impl Task for Cooldown {
    fn tick(&mut self, ctx: &mut Context) -> Status {
        let Some(child) = self.child.as_mut() else {
            return Status::Failure;
        };
        if self.remaining > 0.0 {
            self.remaining -= ctx.delta();
            if self.remaining > 0.0 {
                return Status::Failure;
            }
        }
        let status = child.execute(ctx);
        if status.is_terminal() {
            self.remaining = self.duration;
        }
        status
    }

    child_slot_impl!();
}

/// Re-ticks the child for a fixed number of iterations, or forever,
/// returning `Running` between iterations.
pub struct Repeat {
    times: usize,
    forever: bool,
    abort_on_failure: bool,
    iteration: usize,
    child: Option<TaskNode>,
}

impl Repeat {
    pub fn new(times: usize) -> Self {
        Self {
            times,
            forever: false,
            abort_on_failure: false,
            iteration: 1,
            child: None,
        }
    }

    pub fn forever(mut self, forever: bool) -> Self {
        self.forever = forever;
        self
    }

    /// Stop iterating and fail as soon as the child fails.
    pub fn abort_on_failure(mut self, abort_on_failure: bool) -> Self {
        self.abort_on_failure = abort_on_failure;
        self
    }
}

impl Task for Repeat {
    fn enter(&mut self, _ctx: &mut Context) {
        self.iteration = 1;
    }

    fn tick(&mut self, ctx: &mut Context) -> Status {
        let Some(child) = self.child.as_mut() else {
            return Status::Failure;
        };
        let status = child.execute(ctx);
        if status == Status::Running {
            return Status::Running;
        }
        if status == Status::Failure && self.abort_on_failure {
            return Status::Failure;
        }
        if !self.forever && self.iteration >= self.times {
            return status;
        }
        self.iteration += 1;
        Status::Running
    }

    child_slot_impl!();
}

/// Re-ticks the child until it succeeds, returning `Running` in between.
#[derive(Default)]
pub struct RepeatUntilSuccess {
    child: Option<TaskNode>,
}

impl Task for RepeatUntilSuccess {
    fn tick(&mut self, ctx: &mut Context) -> Status {
        let Some(child) = self.child.as_mut() else {
            return Status::Failure;
        };
        if child.execute(ctx) == Status::Success {
            return Status::Success;
        }
        Status::Running
    }

    child_slot_impl!();
}

/// Re-ticks the child until it fails, then succeeds.
#[derive(Default)]
pub struct RepeatUntilFailure {
    child: Option<TaskNode>,
}

impl Task for RepeatUntilFailure {
    fn tick(&mut self, ctx: &mut Context) -> Status {
        let Some(child) = self.child.as_mut() else {
            return Status::Failure;
        };
        if child.execute(ctx) == Status::Failure {
            return Status::Success;
        }
        Status::Running
    }

    child_slot_impl!();
}

/// Lets the child complete only a limited number of times; fails
/// unconditionally afterwards. The count persists across re-entries.
pub struct RunLimit {
    run_limit: usize,
    num_runs: usize,
    child: Option<TaskNode>,
}

impl RunLimit {
    pub fn new(run_limit: usize) -> Self {
        Self {
            run_limit,
            num_runs: 0,
            child: None,
        }
    }
}

impl Task for RunLimit {
    fn tick(&mut self, ctx: &mut Context) -> Status {
        let Some(child) = self.child.as_mut() else {
            return Status::Failure;
        };
        if self.num_runs >= self.run_limit {
            return Status::Failure;
        }
        let status = child.execute(ctx);
        if status.is_terminal() {
            self.num_runs += 1;
        }
        status
    }

    child_slot_impl!();
}

/// Gates the child behind a random draw made once on entry: a failed draw
/// fails immediately without ticking the child.
pub struct Probability {
    run_chance: f64,
    passed: bool,
    child: Option<TaskNode>,
}

impl Probability {
    pub fn new(run_chance: f64) -> Self {
        Self {
            run_chance,
            passed: false,
            child: None,
        }
    }
}

impl Task for Probability {
    fn enter(&mut self, ctx: &mut Context) {
        self.passed = ctx.rng().gen::<f64>() < self.run_chance;
    }

    fn tick(&mut self, ctx: &mut Context) -> Status {
        if !self.passed {
            return Status::Failure;
        }
        let Some(child) = self.child.as_mut() else {
            return Status::Failure;
        };
        child.execute(ctx)
    }

    child_slot_impl!();
}

/// Runs the child against a fresh blackboard scope chained to the current
/// one, giving the subtree isolated bindings. The scope is created from
/// the decorator's plan the first time it runs and kept for the lifetime
/// of the node; variables declared with a share mode resolve through the
/// outer blackboard by name.
pub struct NewScope {
    plan: BlackboardPlan,
    scope: Option<crate::Blackboard>,
    child: Option<TaskNode>,
}

impl NewScope {
    pub fn new(plan: BlackboardPlan) -> Self {
        Self {
            plan,
            scope: None,
            child: None,
        }
    }
}

impl Task for NewScope {
    fn tick(&mut self, ctx: &mut Context) -> Status {
        if self.scope.is_none() {
            self.scope = Some(self.plan.create_blackboard());
        }
        let (Some(child), Some(scope)) = (self.child.as_mut(), self.scope.as_mut()) else {
            return Status::Failure;
        };
        // Chain the outer blackboard behind the scope for the duration of
        // the child tick, then hand it back.
        let outer = std::mem::take(ctx.blackboard_mut());
        scope.attach_parent(outer);
        std::mem::swap(ctx.blackboard_mut(), scope);
        let status = child.execute(ctx);
        std::mem::swap(ctx.blackboard_mut(), scope);
        if let Some(outer) = scope.detach_parent() {
            *ctx.blackboard_mut() = outer;
        }
        status
    }

    child_slot_impl!();
}

#[cfg(test)]
mod test;
