use super::*;
use crate::composites::Sequence;
use std::cell::RefCell;
use std::rc::Rc;

type Log = Rc<RefCell<Vec<String>>>;

/// Records every lifecycle hook invocation and ticks a fixed result.
struct Hooked {
    label: &'static str,
    result: Status,
    log: Log,
}

impl Hooked {
    fn node(label: &'static str, result: Status, log: &Log) -> TaskNode {
        TaskNode::new(
            label,
            Self {
                label,
                result,
                log: log.clone(),
            },
        )
    }
}

impl Task for Hooked {
    fn enter(&mut self, _ctx: &mut Context) {
        self.log.borrow_mut().push(format!("enter {}", self.label));
    }

    fn tick(&mut self, _ctx: &mut Context) -> Status {
        self.log.borrow_mut().push(format!("tick {}", self.label));
        self.result
    }

    fn exit(&mut self, _ctx: &mut Context) {
        self.log.borrow_mut().push(format!("exit {}", self.label));
    }
}

fn drain(log: &Log) -> Vec<String> {
    log.borrow_mut().drain(..).collect()
}

#[test]
fn hooks_on_completion() {
    let log: Log = Log::default();
    let mut node = Hooked::node("a", Status::Success, &log);
    let mut ctx = Context::default();

    assert_eq!(node.execute(&mut ctx), Status::Success);
    assert_eq!(drain(&log), vec!["enter a", "tick a", "exit a"]);

    // A tick after a terminal status re-enters.
    assert_eq!(node.execute(&mut ctx), Status::Success);
    assert_eq!(drain(&log), vec!["enter a", "tick a", "exit a"]);
}

#[test]
fn no_reenter_while_running() {
    let log: Log = Log::default();
    let mut node = Hooked::node("a", Status::Running, &log);
    let mut ctx = Context::default();

    assert_eq!(node.execute(&mut ctx), Status::Running);
    assert_eq!(drain(&log), vec!["enter a", "tick a"]);

    assert_eq!(node.execute(&mut ctx), Status::Running);
    assert_eq!(drain(&log), vec!["tick a"]);
}

#[test]
fn abort_is_recursive_and_idempotent() {
    let log: Log = Log::default();
    let mut seq = Sequence::default();
    seq.add_child(Hooked::node("child", Status::Running, &log))
        .unwrap();
    let mut node = TaskNode::new("Sequence", seq);
    let mut ctx = Context::default();

    assert_eq!(node.execute(&mut ctx), Status::Running);
    drain(&log);

    node.abort(&mut ctx);
    assert_eq!(node.status(), Status::Fresh);
    assert_eq!(node.children()[0].status(), Status::Fresh);
    assert_eq!(drain(&log), vec!["exit child"]);

    // A second abort exits nothing.
    node.abort(&mut ctx);
    assert!(drain(&log).is_empty());
}

#[test]
fn abort_skips_exit_when_not_running() {
    let log: Log = Log::default();
    let mut node = Hooked::node("a", Status::Success, &log);
    let mut ctx = Context::default();

    assert_eq!(node.execute(&mut ctx), Status::Success);
    drain(&log);

    node.abort(&mut ctx);
    assert_eq!(node.status(), Status::Fresh);
    assert!(drain(&log).is_empty());
}

#[test]
fn display_name_falls_back_to_kind() {
    let node = TaskNode::new("Wait", crate::leaves::Wait::new(1.0));
    assert_eq!(node.name(), "Wait");
    let node = node.named("cool off");
    assert_eq!(node.name(), "cool off");
    assert_eq!(node.kind(), "Wait");
}
