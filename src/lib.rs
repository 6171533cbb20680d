//! # ticktree
//!
//! A behavior tree execution engine for agent AI, with a scoped, typed
//! blackboard.
//!
//! A behavior tree is a hierarchical task scheduler: a tree of composable
//! nodes (composites, decorators, conditions, actions) is evaluated once per
//! tick to decide what an agent does right now. Tasks communicate through a
//! blackboard, a typed key-value store that can be chained into scopes with
//! per-variable opt-in inheritance.
//!
//!
//! ## Ticking a tree
//!
//! Every node implements the [`Task`] trait and is wrapped in a [`TaskNode`]
//! that drives its lifecycle: an `enter` hook when the task starts, a `tick`
//! hook every evaluation, an `exit` hook when it completes or is aborted.
//! A tick returns a [`Status`]; `Running` keeps the task's state for the
//! next tick, `Success` and `Failure` complete the activation.
//!
//! The driver (a per-agent player, a game loop) calls
//! [`TreeInstance::tick`] once per scheduling interval with the elapsed
//! delta. Timed tasks count those deltas; the engine never reads a clock,
//! so runs are deterministic and easy to test.
//!
//! ```rust
//! use ticktree::{ActionFn, Blackboard, Sequence, Status, Task, TaskNode, TreeInstance};
//!
//! let mut root = Sequence::default();
//! root.add_child(TaskNode::new(
//!     "Greet",
//!     ActionFn::new(|_ctx| {
//!         println!("hello");
//!         Status::Success
//!     }),
//! ))
//! .unwrap();
//!
//! let mut tree = TreeInstance::new(TaskNode::new("Root", root), Blackboard::new());
//! assert_eq!(tree.tick(0.1), Status::Success);
//! ```
//!
//!
//! ## How to define your own leaf
//!
//! Implement [`Task`] for your own type, or wrap a closure in [`ActionFn`] /
//! [`ConditionFn`]. Leaves read and write blackboard variables through the
//! [`Context`] passed to every hook; a failed lookup is reported as a value,
//! and a leaf maps it to `Failure` rather than panicking.
//!
//! ```rust
//! use ticktree::{Blackboard, ConditionFn, Context, Status, Task, Value, Variable};
//!
//! let mut bb = Blackboard::new();
//! bb.add_var("health", Variable::with_value(40i64)).unwrap();
//! let mut ctx = Context::new(bb);
//!
//! let mut low_health = ConditionFn::new(|ctx: &Context| {
//!     matches!(ctx.blackboard().get_var("health"), Ok(Value::Int(v)) if *v < 50)
//! });
//! assert_eq!(low_health.tick(&mut ctx), Status::Success);
//! ```
//!
//!
//! ## Loading a tree from a definition
//!
//! A tree definition ([`BehaviorTree`]) is plain data: a blackboard plan,
//! a root task definition and optional named subtrees. It round-trips
//! through YAML and is instantiated as many times as needed through a
//! [`Registry`] of task constructors. Configuration mistakes (unknown
//! kinds, missing parameters, references to undeclared variables) fail
//! the instantiation, never a tick.
//!
//! ```rust
//! use ticktree::{load_yaml, Registry, Status};
//!
//! let tree = load_yaml(
//!     r#"
//! blackboard:
//!   vars:
//!     - name: alarm
//!       var:
//!         ty: Bool
//!         value: { Bool: true }
//! root:
//!   type: Sequence
//!   children:
//!     - type: CheckTrigger
//!       params:
//!         variable: { Var: alarm }
//! "#,
//! )
//! .unwrap();
//!
//! let mut instance = tree.instantiate(&Registry::default()).unwrap();
//! assert_eq!(instance.tick(0.0), Status::Success);
//! assert_eq!(instance.tick(0.0), Status::Failure);
//! ```
//!
//!
//! ## Blackboard scopes
//!
//! A blackboard may be chained to a parent scope, but lookups never fall
//! through implicitly: a variable declared `Local` (the default) is
//! invisible to child scopes, and a child scope sees a parent variable only
//! by declaring it with [`ShareMode::Inherit`] or [`ShareMode::InheritAs`].
//! The [`NewScope`] decorator and subtree embedding use this to give a
//! subtree isolated bindings with explicit, named links to the outside.
//!
//! Variable names are interned ([`Name`]), so the frequent lookups in a hot
//! tick path compare pointers, not bytes. You can cache names in statics
//! with the re-exported [`Lazy`]:
//!
//! ```rust
//! use ticktree::{Lazy, Name};
//!
//! static HEALTH: Lazy<Name> = Lazy::new(|| "health".into());
//! assert_eq!(*HEALTH, Name::from("health"));
//! ```

mod blackboard;
mod composites;
mod context;
mod decorators;
pub mod error;
mod leaves;
mod name;
mod param;
mod registry;
mod task;
mod tree;
mod variable;

pub use crate::blackboard::{Blackboard, BlackboardPlan, ShareMode, VarDecl};
pub use crate::composites::{
    DynamicSelector, DynamicSequence, Parallel, RandomSelector, RandomSequence, Selector, Sequence,
};
pub use crate::context::Context;
pub use crate::decorators::{
    AlwaysFail, AlwaysSucceed, Cooldown, Delay, Invert, NewScope, Probability, Repeat,
    RepeatUntilFailure, RepeatUntilSuccess, RunLimit, TimeLimit,
};
pub use crate::leaves::{
    ActionFn, CheckOp, CheckTrigger, CheckVar, ConditionFn, Fail, PrintMessage, RandomWait, SetVar,
    Wait, WaitTicks,
};
pub use crate::name::Name;
pub use crate::param::Param;
pub use crate::registry::{constructor, Registry};
pub use crate::task::{NumChildren, Task, TaskNode};
pub use crate::tree::{load_yaml, save_yaml, BehaviorTree, SubtreeDef, TaskDef, TreeInstance};
pub use crate::variable::{Value, VarHint, VarType, Variable};
pub use ::once_cell::sync::Lazy;

use std::fmt::{self, Display, Formatter};

/// Outcome of one tick of a task.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    /// Never ticked, or reset since the last completion.
    Fresh,
    /// In progress; the task keeps its state until the next tick.
    Running,
    /// Completed successfully. Terminal for this activation.
    Success,
    /// Completed unsuccessfully. Terminal for this activation.
    Failure,
}

impl Status {
    pub fn is_terminal(self) -> bool {
        matches!(self, Status::Success | Status::Failure)
    }
}

impl Display for Status {
    fn fmt(&self, fmt: &mut Formatter) -> fmt::Result {
        let name = match self {
            Status::Fresh => "FRESH",
            Status::Running => "RUNNING",
            Status::Success => "SUCCESS",
            Status::Failure => "FAILURE",
        };
        fmt.write_str(name)
    }
}
