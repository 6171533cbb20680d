//! The mapping from kind identifiers to task constructors, used when
//! instantiating a tree from its definition.

use crate::composites::{
    DynamicSelector, DynamicSequence, Parallel, RandomSelector, RandomSequence, Selector, Sequence,
};
use crate::decorators::{
    AlwaysFail, AlwaysSucceed, Cooldown, Delay, Invert, NewScope, Probability, Repeat,
    RepeatUntilFailure, RepeatUntilSuccess, RunLimit, TimeLimit,
};
use crate::error::InstantiateError;
use crate::leaves::{CheckOp, CheckTrigger, CheckVar, Fail, PrintMessage, RandomWait, SetVar, Wait, WaitTicks};
use crate::task::Task;
use crate::tree::TaskDef;
use std::collections::HashMap;

type Constructor = Box<dyn Fn(&TaskDef) -> Result<Box<dyn Task>, InstantiateError>>;

/// Wrap a plain constructor as a registry entry for tasks that take no
/// parameters.
pub fn constructor<T>(
    ctor: impl Fn() -> T + 'static,
) -> impl Fn(&TaskDef) -> Result<Box<dyn Task>, InstantiateError> + 'static
where
    T: Task + 'static,
{
    move |_| Ok(Box::new(ctor()))
}

/// Registry of task kinds. All built-in composites, decorators and leaves
/// are registered by default; downstream leaves are added with
/// [`Registry::register`].
pub struct Registry {
    node_types: HashMap<String, Constructor>,
}

impl Default for Registry {
    fn default() -> Self {
        let mut ret = Self {
            node_types: HashMap::new(),
        };

        ret.register("Sequence", constructor(Sequence::default));
        ret.register("Selector", constructor(Selector::default));
        ret.register("RandomSequence", constructor(RandomSequence::default));
        ret.register("RandomSelector", constructor(RandomSelector::default));
        ret.register("DynamicSequence", constructor(DynamicSequence::default));
        ret.register("DynamicSelector", constructor(DynamicSelector::default));
        ret.register("Parallel", |def: &TaskDef| {
            Ok(Box::new(
                Parallel::new(
                    def.usize_or("successes_required", 1)?,
                    def.usize_or("failures_required", 1)?,
                )
                .with_repeat(def.bool_or("repeat", false)?),
            ))
        });

        ret.register("Invert", constructor(Invert::default));
        ret.register("AlwaysSucceed", constructor(AlwaysSucceed::default));
        ret.register("AlwaysFail", constructor(AlwaysFail::default));
        ret.register("Delay", |def: &TaskDef| {
            Ok(Box::new(Delay::new(def.require_float("duration")?)))
        });
        ret.register("TimeLimit", |def: &TaskDef| {
            Ok(Box::new(TimeLimit::new(def.require_float("duration")?)))
        });
        ret.register("Cooldown", |def: &TaskDef| {
            Ok(Box::new(Cooldown::new(def.require_float("duration")?)))
        });
        ret.register("Repeat", |def: &TaskDef| {
            Ok(Box::new(
                Repeat::new(def.usize_or("times", 1)?)
                    .forever(def.bool_or("forever", false)?)
                    .abort_on_failure(def.bool_or("abort_on_failure", false)?),
            ))
        });
        ret.register("RepeatUntilSuccess", constructor(RepeatUntilSuccess::default));
        ret.register("RepeatUntilFailure", constructor(RepeatUntilFailure::default));
        ret.register("RunLimit", |def: &TaskDef| {
            Ok(Box::new(RunLimit::new(def.usize_or("run_limit", 1)?)))
        });
        ret.register("Probability", |def: &TaskDef| {
            Ok(Box::new(Probability::new(def.require_float("run_chance")?)))
        });
        ret.register("NewScope", |def: &TaskDef| {
            Ok(Box::new(NewScope::new(
                def.blackboard.clone().unwrap_or_default(),
            )))
        });

        ret.register("Wait", |def: &TaskDef| {
            Ok(Box::new(Wait::new(def.float_or("duration", 1.0)?)))
        });
        ret.register("RandomWait", |def: &TaskDef| {
            Ok(Box::new(RandomWait::new(
                def.float_or("min_duration", 1.0)?,
                def.float_or("max_duration", 2.0)?,
            )))
        });
        ret.register("WaitTicks", |def: &TaskDef| {
            Ok(Box::new(WaitTicks::new(def.usize_or("num_ticks", 1)?)))
        });
        ret.register("Fail", constructor(|| Fail));
        ret.register("PrintMessage", |def: &TaskDef| {
            Ok(Box::new(PrintMessage::new(def.require("text")?)))
        });
        ret.register("SetVar", |def: &TaskDef| {
            Ok(Box::new(SetVar::new(
                def.require_var("variable")?,
                def.require("value")?,
            )))
        });
        ret.register("CheckVar", |def: &TaskDef| {
            let op = def.str_or("check", "==")?;
            let check = CheckOp::parse(&op).ok_or_else(|| InstantiateError::BadParam {
                node: def.kind.clone(),
                param: "check",
            })?;
            Ok(Box::new(CheckVar::new(
                def.require_var("variable")?,
                check,
                def.require("value")?,
            )))
        });
        ret.register("CheckTrigger", |def: &TaskDef| {
            Ok(Box::new(CheckTrigger::new(def.require_var("variable")?)))
        });

        ret
    }
}

impl Registry {
    pub fn register(
        &mut self,
        kind: impl ToString,
        ctor: impl Fn(&TaskDef) -> Result<Box<dyn Task>, InstantiateError> + 'static,
    ) {
        self.node_types.insert(kind.to_string(), Box::new(ctor));
    }

    /// Construct a task for the definition, or `None` when the kind is not
    /// registered (the loader then tries subtree names).
    pub fn build(&self, def: &TaskDef) -> Option<Result<Box<dyn Task>, InstantiateError>> {
        self.node_types.get(&def.kind).map(|ctor| ctor(def))
    }
}
