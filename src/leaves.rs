//! Built-in leaf tasks: actions and conditions.
//!
//! A leaf is any [`Task`] with zero children; it supplies the base status
//! each tick. The leaves here cover timing, variable manipulation and
//! variable checks; game-specific leaves are implemented downstream against
//! the same trait (or wrapped in [`ActionFn`] / [`ConditionFn`]).

use crate::context::Context;
use crate::name::Name;
use crate::param::Param;
use crate::task::Task;
use crate::variable::Value;
use crate::Status;
use rand::Rng;
use std::cmp::Ordering;
use std::fmt::{self, Display, Formatter};

/// Leaf action driven by a closure.
pub struct ActionFn<F>(F);

impl<F> ActionFn<F>
where
    F: FnMut(&mut Context) -> Status,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> Task for ActionFn<F>
where
    F: FnMut(&mut Context) -> Status,
{
    fn tick(&mut self, ctx: &mut Context) -> Status {
        (self.0)(ctx)
    }
}

/// Leaf condition driven by a closure; succeeds when it returns true.
pub struct ConditionFn<F>(F);

impl<F> ConditionFn<F>
where
    F: FnMut(&Context) -> bool,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> Task for ConditionFn<F>
where
    F: FnMut(&Context) -> bool,
{
    fn tick(&mut self, ctx: &mut Context) -> Status {
        if (self.0)(ctx) {
            Status::Success
        } else {
            Status::Failure
        }
    }
}

/// Returns `Running` until the configured number of seconds has elapsed,
/// then succeeds.
pub struct Wait {
    duration: f64,
    time_passed: f64,
}

impl Wait {
    pub fn new(duration: f64) -> Self {
        Self {
            duration,
            time_passed: 0.0,
        }
    }
}

impl Task for Wait {
    fn enter(&mut self, _ctx: &mut Context) {
        self.time_passed = 0.0;
    }

    fn tick(&mut self, ctx: &mut Context) -> Status {
        self.time_passed += ctx.delta();
        if self.time_passed < self.duration {
            Status::Running
        } else {
            Status::Success
        }
    }
}

/// Waits for a duration drawn uniformly from a range on each entry.
pub struct RandomWait {
    min_duration: f64,
    max_duration: f64,
    duration: f64,
    time_passed: f64,
}

impl RandomWait {
    pub fn new(min_duration: f64, max_duration: f64) -> Self {
        Self {
            min_duration,
            max_duration,
            duration: 0.0,
            time_passed: 0.0,
        }
    }
}

impl Task for RandomWait {
    fn enter(&mut self, ctx: &mut Context) {
        self.time_passed = 0.0;
        self.duration = if self.max_duration > self.min_duration {
            ctx.rng().gen_range(self.min_duration..self.max_duration)
        } else {
            self.min_duration
        };
    }

    fn tick(&mut self, ctx: &mut Context) -> Status {
        self.time_passed += ctx.delta();
        if self.time_passed < self.duration {
            Status::Running
        } else {
            Status::Success
        }
    }
}

/// Returns `Running` for a number of ticks, then succeeds.
pub struct WaitTicks {
    num_ticks: usize,
    elapsed: usize,
}

impl WaitTicks {
    pub fn new(num_ticks: usize) -> Self {
        Self {
            num_ticks,
            elapsed: 0,
        }
    }
}

impl Task for WaitTicks {
    fn enter(&mut self, _ctx: &mut Context) {
        self.elapsed = 0;
    }

    fn tick(&mut self, _ctx: &mut Context) -> Status {
        self.elapsed += 1;
        if self.elapsed < self.num_ticks {
            Status::Running
        } else {
            Status::Success
        }
    }
}

/// Always fails. Useful to terminate a selector branch explicitly.
pub struct Fail;

impl Task for Fail {
    fn tick(&mut self, _ctx: &mut Context) -> Status {
        Status::Failure
    }
}

/// Prints a message to standard output and succeeds. The text may be a
/// literal or bound to a blackboard variable.
pub struct PrintMessage {
    text: Param,
}

impl PrintMessage {
    pub fn new(text: impl Into<Param>) -> Self {
        Self { text: text.into() }
    }
}

impl Task for PrintMessage {
    fn tick(&mut self, ctx: &mut Context) -> Status {
        match self.text.resolve(ctx.blackboard()) {
            Ok(value) => {
                println!("{}", value);
                Status::Success
            }
            Err(_) => Status::Failure,
        }
    }
}

/// Assigns a value (literal or another variable) to a blackboard variable.
pub struct SetVar {
    variable: Name,
    value: Param,
}

impl SetVar {
    pub fn new(variable: impl Into<Name>, value: impl Into<Param>) -> Self {
        Self {
            variable: variable.into(),
            value: value.into(),
        }
    }
}

impl Task for SetVar {
    fn tick(&mut self, ctx: &mut Context) -> Status {
        let value = match self.value.resolve(ctx.blackboard()) {
            Ok(value) => value.clone(),
            Err(_) => return Status::Failure,
        };
        match ctx.blackboard_mut().set_var(self.variable, value) {
            Ok(()) => Status::Success,
            Err(_) => Status::Failure,
        }
    }
}

/// Comparison operator used by [`CheckVar`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CheckOp {
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
}

impl CheckOp {
    /// Parse from the operator's usual spelling (`"=="`, `"<"`, ...).
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "==" => Some(CheckOp::Eq),
            "!=" => Some(CheckOp::Neq),
            "<" => Some(CheckOp::Lt),
            "<=" => Some(CheckOp::Lte),
            ">" => Some(CheckOp::Gt),
            ">=" => Some(CheckOp::Gte),
            _ => None,
        }
    }

    /// Evaluate the check. Values of kinds with no meaningful order fail
    /// every ordered comparison; equality falls back to structural equality.
    pub fn eval(self, left: &Value, right: &Value) -> bool {
        let ord = left.compare(right);
        match self {
            CheckOp::Eq => match ord {
                Some(ord) => ord == Ordering::Equal,
                None => left == right,
            },
            CheckOp::Neq => match ord {
                Some(ord) => ord != Ordering::Equal,
                None => left != right,
            },
            CheckOp::Lt => ord == Some(Ordering::Less),
            CheckOp::Lte => matches!(ord, Some(Ordering::Less | Ordering::Equal)),
            CheckOp::Gt => ord == Some(Ordering::Greater),
            CheckOp::Gte => matches!(ord, Some(Ordering::Greater | Ordering::Equal)),
        }
    }
}

impl Display for CheckOp {
    fn fmt(&self, fmt: &mut Formatter) -> fmt::Result {
        let op = match self {
            CheckOp::Eq => "==",
            CheckOp::Neq => "!=",
            CheckOp::Lt => "<",
            CheckOp::Lte => "<=",
            CheckOp::Gt => ">",
            CheckOp::Gte => ">=",
        };
        fmt.write_str(op)
    }
}

/// Compares a blackboard variable against a value. A failed lookup is a
/// failed check, not an error.
pub struct CheckVar {
    variable: Name,
    check: CheckOp,
    value: Param,
}

impl CheckVar {
    pub fn new(variable: impl Into<Name>, check: CheckOp, value: impl Into<Param>) -> Self {
        Self {
            variable: variable.into(),
            check,
            value: value.into(),
        }
    }
}

impl Task for CheckVar {
    fn tick(&mut self, ctx: &mut Context) -> Status {
        let bb = ctx.blackboard();
        let (Ok(left), Ok(right)) = (bb.get_var(self.variable), self.value.resolve(bb)) else {
            return Status::Failure;
        };
        if self.check.eval(left, right) {
            Status::Success
        } else {
            Status::Failure
        }
    }
}

/// Succeeds when the variable is truthy, resetting it to false so the
/// trigger fires once per setting.
pub struct CheckTrigger {
    variable: Name,
}

impl CheckTrigger {
    pub fn new(variable: impl Into<Name>) -> Self {
        Self {
            variable: variable.into(),
        }
    }
}

impl Task for CheckTrigger {
    fn tick(&mut self, ctx: &mut Context) -> Status {
        let set = matches!(ctx.blackboard().get_var(self.variable), Ok(value) if value.is_truthy());
        if !set {
            return Status::Failure;
        }
        match ctx.blackboard_mut().set_var(self.variable, Value::Bool(false)) {
            Ok(()) => Status::Success,
            Err(_) => Status::Failure,
        }
    }
}
