use super::*;
use crate::blackboard::ShareMode;
use crate::leaves::ActionFn;
use crate::variable::{Value, VarType, Variable};
use crate::Blackboard;
use std::cell::RefCell;
use std::rc::Rc;

type Log = Rc<RefCell<Vec<&'static str>>>;

struct Scripted {
    label: &'static str,
    script: Vec<Status>,
    cursor: usize,
    log: Log,
}

impl Scripted {
    fn node(label: &'static str, script: Vec<Status>, log: &Log) -> TaskNode {
        TaskNode::new(
            label,
            Self {
                label,
                script,
                cursor: 0,
                log: log.clone(),
            },
        )
    }
}

impl Task for Scripted {
    fn tick(&mut self, _ctx: &mut Context) -> Status {
        self.log.borrow_mut().push(self.label);
        let status = self.script[self.cursor.min(self.script.len() - 1)];
        self.cursor += 1;
        status
    }

    fn exit(&mut self, _ctx: &mut Context) {
        self.log.borrow_mut().push("exit");
    }
}

fn drain(log: &Log) -> Vec<&'static str> {
    log.borrow_mut().drain(..).collect()
}

fn decorated(task: impl Task + 'static, child: TaskNode) -> TaskNode {
    let mut node = TaskNode::new("decorator", task);
    node.add_child(child).unwrap();
    node
}

use crate::Status::{Failure, Running, Success};

#[test]
fn invert_swaps_terminal_statuses() {
    let log = Log::default();
    let mut node = decorated(
        Invert::default(),
        Scripted::node("c", vec![Success, Failure, Running], &log),
    );
    let mut ctx = Context::default();

    assert_eq!(node.execute(&mut ctx), Failure);
    assert_eq!(node.execute(&mut ctx), Success);
    assert_eq!(node.execute(&mut ctx), Running);
}

#[test]
fn force_status_still_ticks_child() {
    let log = Log::default();
    let mut node = decorated(
        AlwaysSucceed::default(),
        Scripted::node("c", vec![Failure], &log),
    );
    let mut ctx = Context::default();
    assert_eq!(node.execute(&mut ctx), Success);
    assert!(drain(&log).contains(&"c"));

    let log = Log::default();
    let mut node = decorated(
        AlwaysFail::default(),
        Scripted::node("c", vec![Success], &log),
    );
    assert_eq!(node.execute(&mut ctx), Failure);
    assert!(drain(&log).contains(&"c"));
}

#[test]
fn force_status_passes_running_through() {
    let log = Log::default();
    let mut node = decorated(
        AlwaysSucceed::default(),
        Scripted::node("c", vec![Running, Success], &log),
    );
    let mut ctx = Context::default();
    assert_eq!(node.execute(&mut ctx), Running);
    assert_eq!(node.execute(&mut ctx), Success);
}

#[test]
fn delay_holds_then_runs_child() {
    let log = Log::default();
    let mut node = decorated(
        Delay::new(1.0),
        Scripted::node("c", vec![Success], &log),
    );
    let mut ctx = Context::default();

    ctx.set_delta(0.4);
    assert_eq!(node.execute(&mut ctx), Running);
    assert_eq!(node.execute(&mut ctx), Running);
    assert!(drain(&log).is_empty());

    assert_eq!(node.execute(&mut ctx), Success);
    assert_eq!(drain(&log), vec!["c", "exit"]);
}

#[test]
fn time_limit_aborts_overrunning_child() {
    let log = Log::default();
    let mut node = decorated(
        TimeLimit::new(1.0),
        Scripted::node("c", vec![Running], &log),
    );
    let mut ctx = Context::default();

    ctx.set_delta(0.5);
    assert_eq!(node.execute(&mut ctx), Running);
    assert_eq!(drain(&log), vec!["c"]);

    ctx.set_delta(0.6);
    assert_eq!(node.execute(&mut ctx), Failure);
    // The child is aborted, not ticked: only its exit hook runs.
    assert_eq!(drain(&log), vec!["exit"]);
    assert_eq!(node.children()[0].status(), Status::Fresh);
}

#[test]
fn cooldown_window() {
    let log = Log::default();
    let mut node = decorated(
        Cooldown::new(1.0),
        Scripted::node("c", vec![Success], &log),
    );
    let mut ctx = Context::default();

    ctx.set_delta(0.1);
    assert_eq!(node.execute(&mut ctx), Success);
    assert_eq!(drain(&log), vec!["c", "exit"]);

    // Inside the window the child is never ticked.
    ctx.set_delta(0.5);
    assert_eq!(node.execute(&mut ctx), Failure);
    ctx.set_delta(0.4);
    assert_eq!(node.execute(&mut ctx), Failure);
    assert!(drain(&log).is_empty());

    // The accumulated deltas reach the duration: the child runs again.
    ctx.set_delta(0.1);
    assert_eq!(node.execute(&mut ctx), Success);
    assert_eq!(drain(&log), vec!["c", "exit"]);
}

#[test]
fn repeat_counts_iterations() {
    let log = Log::default();
    let mut node = decorated(
        Repeat::new(3),
        Scripted::node("c", vec![Success], &log),
    );
    let mut ctx = Context::default();

    assert_eq!(node.execute(&mut ctx), Running);
    assert_eq!(node.execute(&mut ctx), Running);
    assert_eq!(node.execute(&mut ctx), Success);
    assert_eq!(drain(&log).iter().filter(|s| **s == "c").count(), 3);
}

#[test]
fn repeat_abort_on_failure() {
    let log = Log::default();
    let mut node = decorated(
        Repeat::new(3).abort_on_failure(true),
        Scripted::node("c", vec![Success, Failure], &log),
    );
    let mut ctx = Context::default();

    assert_eq!(node.execute(&mut ctx), Running);
    assert_eq!(node.execute(&mut ctx), Failure);
}

#[test]
fn repeat_until_success() {
    let log = Log::default();
    let mut node = decorated(
        RepeatUntilSuccess::default(),
        Scripted::node("c", vec![Failure, Failure, Success], &log),
    );
    let mut ctx = Context::default();

    assert_eq!(node.execute(&mut ctx), Running);
    assert_eq!(node.execute(&mut ctx), Running);
    assert_eq!(node.execute(&mut ctx), Success);
}

#[test]
fn repeat_until_failure() {
    let log = Log::default();
    let mut node = decorated(
        RepeatUntilFailure::default(),
        Scripted::node("c", vec![Success, Failure], &log),
    );
    let mut ctx = Context::default();

    assert_eq!(node.execute(&mut ctx), Running);
    assert_eq!(node.execute(&mut ctx), Success);
}

#[test]
fn run_limit_stops_after_enough_runs() {
    let log = Log::default();
    let mut node = decorated(
        RunLimit::new(2),
        Scripted::node("c", vec![Success], &log),
    );
    let mut ctx = Context::default();

    assert_eq!(node.execute(&mut ctx), Success);
    assert_eq!(node.execute(&mut ctx), Success);
    assert_eq!(node.execute(&mut ctx), Failure);
    assert_eq!(node.execute(&mut ctx), Failure);
    assert_eq!(drain(&log).iter().filter(|s| **s == "c").count(), 2);
}

#[test]
fn probability_extremes() {
    let log = Log::default();
    let mut node = decorated(
        Probability::new(1.0),
        Scripted::node("c", vec![Success], &log),
    );
    let mut ctx = Context::default();
    assert_eq!(node.execute(&mut ctx), Success);
    assert_eq!(drain(&log), vec!["c", "exit"]);

    let log = Log::default();
    let mut node = decorated(
        Probability::new(0.0),
        Scripted::node("c", vec![Success], &log),
    );
    assert_eq!(node.execute(&mut ctx), Failure);
    // A failed draw never ticks the child.
    assert!(drain(&log).is_empty());
}

#[test]
fn new_scope_isolates_and_redirects() {
    let plan = crate::BlackboardPlan::new()
        .declare("x", Variable::with_value(0i64))
        .declare_shared("speed", Variable::new(VarType::Float), ShareMode::Inherit);
    let mut scope = NewScope::new(plan);
    scope
        .add_child(TaskNode::new(
            "Probe",
            ActionFn::new(|ctx: &mut Context| {
                let bb = ctx.blackboard_mut();
                let x = match bb.get_var("x") {
                    Ok(Value::Int(v)) => *v,
                    _ => return Status::Failure,
                };
                bb.set_var("x", Value::Int(x + 5)).unwrap();
                bb.set_var("speed", Value::Float(2.0)).unwrap();
                Status::Success
            }),
        ))
        .unwrap();
    let mut node = TaskNode::new("NewScope", scope);

    let mut bb = Blackboard::new();
    bb.add_var("x", Variable::with_value(42i64)).unwrap();
    bb.add_var("speed", Variable::with_value(1.0)).unwrap();
    let mut ctx = Context::new(bb);

    assert_eq!(node.execute(&mut ctx), Status::Success);
    // The scope's local "x" shadows the outer one...
    assert_eq!(ctx.blackboard().get_var("x"), Ok(&Value::Int(42)));
    // ...while the shared "speed" wrote through to the outer scope.
    assert_eq!(ctx.blackboard().get_var("speed"), Ok(&Value::Float(2.0)));

    // The scope persists between activations.
    assert_eq!(node.execute(&mut ctx), Status::Success);
    assert_eq!(ctx.blackboard().get_var("x"), Ok(&Value::Int(42)));
}
