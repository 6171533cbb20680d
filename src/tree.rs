//! Tree definitions and their instantiation.
//!
//! A [`BehaviorTree`] is plain data: the blackboard plan, a root [`TaskDef`]
//! and optional named subtrees. It serializes losslessly (YAML here, any
//! serde format in principle) and can be instantiated into as many running
//! [`TreeInstance`]s as needed. All configuration errors are caught during
//! instantiation; a tree that instantiates cleanly never errors out of a
//! tick.

use crate::blackboard::{Blackboard, BlackboardPlan, ShareMode};
use crate::context::Context;
use crate::decorators::NewScope;
use crate::error::{InstantiateError, LoadYamlError};
use crate::name::Name;
use crate::param::Param;
use crate::registry::Registry;
use crate::task::{NumChildren, Task, TaskNode};
use crate::variable::{Value, VarType};
use crate::Status;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Persisted form of one task: kind identifier, display name, bound
/// parameters and ordered children.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TaskDef {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, Param>,
    /// Scope plan for kinds that open a new blackboard scope (`NewScope`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blackboard: Option<BlackboardPlan>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TaskDef>,
}

impl TaskDef {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            name: String::new(),
            params: BTreeMap::new(),
            blackboard: None,
            children: Vec::new(),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, param: impl Into<Param>) -> Self {
        self.params.insert(key.into(), param.into());
        self
    }

    pub fn with_blackboard(mut self, plan: BlackboardPlan) -> Self {
        self.blackboard = Some(plan);
        self
    }

    pub fn with_child(mut self, child: TaskDef) -> Self {
        self.children.push(child);
        self
    }

    pub fn param(&self, key: &str) -> Option<&Param> {
        self.params.get(key)
    }

    fn missing(&self, param: &'static str) -> InstantiateError {
        InstantiateError::MissingParam {
            node: self.kind.clone(),
            param,
        }
    }

    fn bad(&self, param: &'static str) -> InstantiateError {
        InstantiateError::BadParam {
            node: self.kind.clone(),
            param,
        }
    }

    /// The parameter as given, literal or bound.
    pub fn require(&self, key: &'static str) -> Result<Param, InstantiateError> {
        self.param(key).cloned().ok_or_else(|| self.missing(key))
    }

    /// The parameter as a variable reference.
    pub fn require_var(&self, key: &'static str) -> Result<Name, InstantiateError> {
        match self.param(key) {
            Some(Param::Var(name)) => Ok(*name),
            Some(Param::Value(_)) => Err(self.bad(key)),
            None => Err(self.missing(key)),
        }
    }

    fn literal(&self, key: &'static str) -> Result<Option<&Value>, InstantiateError> {
        match self.param(key) {
            Some(Param::Value(value)) => Ok(Some(value)),
            // Plain configuration scalars cannot be bound to variables.
            Some(Param::Var(_)) => Err(self.bad(key)),
            None => Ok(None),
        }
    }

    pub fn require_float(&self, key: &'static str) -> Result<f64, InstantiateError> {
        match self.literal(key)? {
            Some(value) => match value.coerce(VarType::Float) {
                Some(Value::Float(v)) => Ok(v),
                _ => Err(self.bad(key)),
            },
            None => Err(self.missing(key)),
        }
    }

    pub fn float_or(&self, key: &'static str, default: f64) -> Result<f64, InstantiateError> {
        match self.literal(key)? {
            Some(value) => match value.coerce(VarType::Float) {
                Some(Value::Float(v)) => Ok(v),
                _ => Err(self.bad(key)),
            },
            None => Ok(default),
        }
    }

    pub fn usize_or(&self, key: &'static str, default: usize) -> Result<usize, InstantiateError> {
        match self.literal(key)? {
            Some(value) => match value.coerce(VarType::Int) {
                Some(Value::Int(v)) if v >= 0 => Ok(v as usize),
                _ => Err(self.bad(key)),
            },
            None => Ok(default),
        }
    }

    pub fn bool_or(&self, key: &'static str, default: bool) -> Result<bool, InstantiateError> {
        match self.literal(key)? {
            Some(value) => match value.coerce(VarType::Bool) {
                Some(Value::Bool(v)) => Ok(v),
                _ => Err(self.bad(key)),
            },
            None => Ok(default),
        }
    }

    pub fn str_or(&self, key: &'static str, default: &str) -> Result<String, InstantiateError> {
        match self.literal(key)? {
            Some(Value::String(s)) => Ok(s.clone()),
            Some(_) => Err(self.bad(key)),
            None => Ok(default.to_owned()),
        }
    }
}

/// A separately defined tree embeddable by name: its own scope plan plus a
/// root task.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SubtreeDef {
    #[serde(default, skip_serializing_if = "BlackboardPlan::is_empty")]
    pub blackboard: BlackboardPlan,
    pub root: TaskDef,
}

/// A complete tree definition: the root task, the blackboard template
/// instantiated for every running copy, and the subtrees the definition
/// embeds by name.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BehaviorTree {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "BlackboardPlan::is_empty")]
    pub blackboard: BlackboardPlan,
    pub root: TaskDef,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub subtrees: BTreeMap<String, SubtreeDef>,
}

impl BehaviorTree {
    pub fn new(root: TaskDef) -> Self {
        Self {
            description: String::new(),
            blackboard: BlackboardPlan::new(),
            root,
            subtrees: BTreeMap::new(),
        }
    }

    pub fn with_blackboard(mut self, plan: BlackboardPlan) -> Self {
        self.blackboard = plan;
        self
    }

    pub fn with_subtree(mut self, name: impl Into<String>, subtree: SubtreeDef) -> Self {
        self.subtrees.insert(name.into(), subtree);
        self
    }

    /// Build a running instance: every task constructed through the
    /// registry, every parameter binding checked against the scope plans,
    /// and a fresh blackboard created from the template.
    ///
    /// A kind identifier not found in the registry is looked up in
    /// [`BehaviorTree::subtrees`] and embedded behind its own scope.
    pub fn instantiate(&self, registry: &Registry) -> Result<TreeInstance, InstantiateError> {
        check_plan(&self.blackboard)?;
        let top = TreeStack {
            name: "",
            parent: None,
        };
        let chain = [&self.blackboard];
        let root = build_recurse(&self.root, registry, self, &chain, &top)?;
        tracing::debug!(nodes = count_nodes(&root), "instantiated behavior tree");
        Ok(TreeInstance::new(root, self.blackboard.create_blackboard()))
    }
}

/// Detects subtrees that include themselves. It is a linked list in the
/// call stack: walking the parent links enumerates the subtree names
/// currently being expanded.
struct TreeStack<'a, 'src> {
    name: &'src str,
    parent: Option<&'a TreeStack<'a, 'src>>,
}

impl<'a, 'src> TreeStack<'a, 'src> {
    fn find(&self, name: &str) -> bool {
        if self.name == name {
            true
        } else if let Some(parent) = self.parent {
            parent.find(name)
        } else {
            false
        }
    }
}

fn check_plan(plan: &BlackboardPlan) -> Result<(), InstantiateError> {
    let mut seen: Vec<Name> = Vec::new();
    for decl in plan.iter() {
        if seen.contains(&decl.name) {
            return Err(InstantiateError::DuplicateVar(decl.name));
        }
        seen.push(decl.name);
    }
    Ok(())
}

/// Whether a variable reference resolves somewhere in the scope chain,
/// following the same redirect rules the runtime blackboards use.
fn plan_resolves(chain: &[&BlackboardPlan], name: Name) -> bool {
    let Some((plan, outer)) = chain.split_last() else {
        return false;
    };
    match plan.get(name) {
        Some(decl) => match decl.share {
            ShareMode::Local => true,
            ShareMode::Inherit => plan_resolves(outer, name),
            ShareMode::InheritAs(remote) => plan_resolves(outer, remote),
        },
        None => false,
    }
}

fn build_recurse<'a>(
    def: &'a TaskDef,
    registry: &Registry,
    tree: &'a BehaviorTree,
    chain: &[&'a BlackboardPlan],
    stack: &TreeStack,
) -> Result<TaskNode, InstantiateError> {
    for param in def.params.values() {
        if let Param::Var(name) = param {
            if !plan_resolves(chain, *name) {
                return Err(InstantiateError::UnknownVar {
                    node: def.kind.clone(),
                    var: *name,
                });
            }
        }
    }

    let mut child_chain: Vec<&BlackboardPlan> = chain.to_vec();
    if let Some(plan) = &def.blackboard {
        check_plan(plan)?;
        child_chain.push(plan);
    }

    let task: Box<dyn Task> = match registry.build(def) {
        Some(task) => task?,
        None => {
            // Not a registered kind; embed the subtree of that name behind
            // its own scope.
            let sub = tree
                .subtrees
                .get(&def.kind)
                .ok_or_else(|| InstantiateError::UnknownKind(def.kind.clone()))?;
            if stack.find(&def.kind) {
                return Err(InstantiateError::InfiniteRecursion {
                    tree: def.kind.clone(),
                });
            }
            let substack = TreeStack {
                name: &def.kind,
                parent: Some(stack),
            };
            check_plan(&sub.blackboard)?;
            let mut subchain = chain.to_vec();
            subchain.push(&sub.blackboard);
            let subroot = build_recurse(&sub.root, registry, tree, &subchain, &substack)?;
            let mut scope = NewScope::new(sub.blackboard.clone());
            scope
                .add_child(subroot)
                .map_err(|e| InstantiateError::AddChild(e, def.kind.clone()))?;
            Box::new(scope)
        }
    };

    let mut node = TaskNode::from_boxed(def.kind.clone(), def.name.clone(), task);
    for child_def in &def.children {
        let child = build_recurse(child_def, registry, tree, &child_chain, stack)?;
        node.add_child(child)
            .map_err(|e| InstantiateError::AddChild(e, def.kind.clone()))?;
    }
    if node.max_children() == NumChildren::Finite(1) && node.children().len() != 1 {
        return Err(InstantiateError::ChildCount {
            node: def.kind.clone(),
            expected: 1,
            got: node.children().len(),
        });
    }
    Ok(node)
}

fn count_nodes(node: &TaskNode) -> usize {
    1 + node.children().iter().map(count_nodes).sum::<usize>()
}

/// A running copy of a behavior tree: the instantiated root task plus the
/// blackboard scope and random source it owns.
///
/// The driver calls [`TreeInstance::tick`] once per scheduling interval;
/// one tick fully completes before the next begins, and the driver only
/// ever observes a [`Status`].
pub struct TreeInstance {
    root: TaskNode,
    ctx: Context,
}

impl TreeInstance {
    pub fn new(root: TaskNode, blackboard: Blackboard) -> Self {
        Self {
            root,
            ctx: Context::new(blackboard),
        }
    }

    /// Seed the instance's random source for reproducible runs.
    pub fn reseed(&mut self, seed: u64) {
        self.ctx.reseed(seed);
    }

    /// Tick the root with the elapsed interval in seconds.
    pub fn tick(&mut self, delta: f64) -> Status {
        self.ctx.set_delta(delta);
        let prev = self.root.status();
        let status = self.root.execute(&mut self.ctx);
        if status != prev {
            tracing::debug!(root = %self.root.name(), status = %status, "root status changed");
        }
        status
    }

    /// Abort the whole tree, recursively exiting any running tasks.
    pub fn abort(&mut self) {
        self.root.abort(&mut self.ctx);
    }

    pub fn status(&self) -> Status {
        self.root.status()
    }

    pub fn root(&self) -> &TaskNode {
        &self.root
    }

    pub fn blackboard(&self) -> &Blackboard {
        self.ctx.blackboard()
    }

    pub fn blackboard_mut(&mut self) -> &mut Blackboard {
        self.ctx.blackboard_mut()
    }
}

/// Read a tree definition from YAML.
pub fn load_yaml(yaml: &str) -> Result<BehaviorTree, LoadYamlError> {
    Ok(serde_yaml::from_str(yaml)?)
}

/// Write a tree definition as YAML.
pub fn save_yaml(tree: &BehaviorTree) -> Result<String, LoadYamlError> {
    Ok(serde_yaml::to_string(tree)?)
}
