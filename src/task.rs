//! The task trait and the per-node state machine driving it.

use crate::context::Context;
use crate::error::{AddChildError, AddChildResult};
use crate::Status;
use std::fmt::{self, Debug, Formatter};

/// How many children a task kind accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NumChildren {
    Finite(usize),
    Infinite,
}

/// The behavior every node kind implements: lifecycle hooks plus child
/// bookkeeping. Composites and decorators own their children; leaves keep
/// the defaults.
///
/// `tick` must return `Running`, `Success` or `Failure`, never `Fresh`.
/// A leaf whose work cannot complete (lookup error, target gone) returns
/// `Failure`; the tick path never panics past the tree boundary.
pub trait Task {
    /// Called when the task is ticked while not `Running`, before `tick`.
    fn enter(&mut self, _ctx: &mut Context) {}

    /// Produce this tick's status.
    fn tick(&mut self, ctx: &mut Context) -> Status;

    /// Called when the task completes, or when it is aborted while running.
    fn exit(&mut self, _ctx: &mut Context) {}

    fn children(&self) -> &[TaskNode] {
        &[]
    }

    fn children_mut(&mut self) -> &mut [TaskNode] {
        &mut []
    }

    fn add_child(&mut self, _child: TaskNode) -> AddChildResult {
        Err(AddChildError::TooManyChildren)
    }

    fn max_children(&self) -> NumChildren {
        NumChildren::Finite(0)
    }
}

/// A node of an instantiated tree: a task plus the status bookkeeping the
/// engine keeps for it. The node exclusively owns its task, and the task
/// owns its child nodes.
pub struct TaskNode {
    kind: String,
    name: String,
    status: Status,
    task: Box<dyn Task>,
}

impl TaskNode {
    pub fn new(kind: impl Into<String>, task: impl Task + 'static) -> Self {
        Self::from_boxed(kind.into(), String::new(), Box::new(task))
    }

    pub(crate) fn from_boxed(kind: String, name: String, task: Box<dyn Task>) -> Self {
        Self {
            kind,
            name,
            status: Status::Fresh,
            task,
        }
    }

    /// Set the custom display name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// The kind identifier this node was built from.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The display name: the custom name if set, the kind otherwise.
    pub fn name(&self) -> &str {
        if self.name.is_empty() {
            &self.kind
        } else {
            &self.name
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_running(&self) -> bool {
        self.status == Status::Running
    }

    pub fn add_child(&mut self, child: TaskNode) -> AddChildResult {
        self.task.add_child(child)
    }

    pub fn children(&self) -> &[TaskNode] {
        self.task.children()
    }

    pub fn max_children(&self) -> NumChildren {
        self.task.max_children()
    }

    /// Drive one tick of this node.
    ///
    /// Coming from a non-running status the enter hook runs first; coming
    /// from a terminal status the descendants are reset beforehand, so the
    /// activation starts from a conceptually fresh subtree. The exit hook
    /// runs as soon as the tick hook returns a terminal status.
    pub fn execute(&mut self, ctx: &mut Context) -> Status {
        if self.status != Status::Running {
            if self.status != Status::Fresh {
                for child in self.task.children_mut() {
                    child.abort(ctx);
                }
            }
            self.task.enter(ctx);
        }
        self.status = self.task.tick(ctx);
        debug_assert!(self.status != Status::Fresh, "tick returned Fresh");
        if self.status.is_terminal() {
            self.task.exit(ctx);
        }
        self.status
    }

    /// Force the node and any running descendants out of `Running`,
    /// invoking exit hooks children-first. Idempotent, and always completes
    /// synchronously within the calling tick.
    pub fn abort(&mut self, ctx: &mut Context) {
        for child in self.task.children_mut() {
            child.abort(ctx);
        }
        if self.status == Status::Running {
            tracing::trace!(task = %self.name(), "aborted while running");
            self.task.exit(ctx);
        }
        self.status = Status::Fresh;
    }
}

impl Debug for TaskNode {
    fn fmt(&self, fmt: &mut Formatter) -> fmt::Result {
        fmt.debug_struct("TaskNode")
            .field("kind", &self.kind)
            .field("name", &self.name)
            .field("status", &self.status)
            .field("children", &self.task.children())
            .finish()
    }
}

#[cfg(test)]
mod test;
