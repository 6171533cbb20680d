//! The shared memory tasks read and write during ticks.
//!
//! A [`Blackboard`] is an insertion-ordered mapping from variable name to
//! [`Variable`], optionally chained to a parent blackboard. Lookups never
//! fall through to the parent implicitly: a variable crosses scopes only
//! when its declaration opts in with a [`ShareMode`] redirect.

use crate::error::BlackboardError;
use crate::name::Name;
use crate::variable::{Value, Variable};
use serde::{Deserialize, Serialize};

/// How a declared variable binds to the enclosing scope.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShareMode {
    /// The variable lives in its own blackboard. This is the default: name
    /// shadowing alone never links scopes.
    #[default]
    Local,
    /// Reads and writes redirect to the parent scope's variable of the
    /// same name.
    Inherit,
    /// Reads and writes redirect to the parent scope under a mapped name.
    InheritAs(Name),
}

/// One variable declaration in a [`BlackboardPlan`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VarDecl {
    pub name: Name,
    pub var: Variable,
    #[serde(default, skip_serializing_if = "is_local")]
    pub share: ShareMode,
}

fn is_local(share: &ShareMode) -> bool {
    *share == ShareMode::Local
}

/// The variable-declaration template a tree instantiates a fresh
/// blackboard (or scope) from.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BlackboardPlan {
    vars: Vec<VarDecl>,
}

impl BlackboardPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a declaration, rejecting duplicate names.
    pub fn add(&mut self, decl: VarDecl) -> Result<(), BlackboardError> {
        if self.get(decl.name).is_some() {
            return Err(BlackboardError::Duplicate(decl.name));
        }
        self.vars.push(decl);
        Ok(())
    }

    /// Convenience for building plans in code.
    pub fn declare(mut self, name: impl Into<Name>, var: Variable) -> Self {
        let name = name.into();
        // Silently keeps the first declaration; definition files go through
        // `add` which reports the duplicate instead.
        let _ = self.add(VarDecl {
            name,
            var,
            share: ShareMode::Local,
        });
        self
    }

    pub fn declare_shared(mut self, name: impl Into<Name>, var: Variable, share: ShareMode) -> Self {
        let _ = self.add(VarDecl {
            name: name.into(),
            var,
            share,
        });
        self
    }

    pub fn get(&self, name: impl Into<Name>) -> Option<&VarDecl> {
        let name = name.into();
        self.vars.iter().find(|decl| decl.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &VarDecl> {
        self.vars.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Instantiate a fresh blackboard: deep copies of local declarations,
    /// redirect slots for shared ones.
    pub fn create_blackboard(&self) -> Blackboard {
        let mut bb = Blackboard::new();
        for decl in &self.vars {
            let slot = match decl.share {
                ShareMode::Local => Slot::Owned(decl.var.clone()),
                ShareMode::Inherit => Slot::Inherit(decl.name),
                ShareMode::InheritAs(remote) => Slot::Inherit(remote),
            };
            bb.push_slot(decl.name, slot);
        }
        bb
    }

    /// Add this plan's variables to an existing blackboard. Present names
    /// are replaced when `overwrite` is set and kept otherwise.
    pub fn populate(&self, bb: &mut Blackboard, overwrite: bool) {
        for decl in &self.vars {
            if bb.has_var(decl.name) {
                if !overwrite {
                    continue;
                }
                bb.slots.retain(|(name, _)| *name != decl.name);
            }
            let slot = match decl.share {
                ShareMode::Local => Slot::Owned(decl.var.clone()),
                ShareMode::Inherit => Slot::Inherit(decl.name),
                ShareMode::InheritAs(remote) => Slot::Inherit(remote),
            };
            bb.push_slot(decl.name, slot);
        }
    }
}

enum Slot {
    Owned(Variable),
    /// Redirects reads and writes to the parent scope under the stored name.
    Inherit(Name),
}

/// Shared typed key-value store read and written by tasks during ticks.
///
/// Structural changes (`add_var`/`remove_var`) must not happen while a tick
/// is in progress; the `&mut` discipline of the tick path enforces this.
#[derive(Default)]
pub struct Blackboard {
    // Insertion-ordered; lookups scan, but names are interned so each
    // comparison is a pointer check.
    slots: Vec<(Name, Slot)>,
    parent: Option<Box<Blackboard>>,
}

impl Blackboard {
    pub fn new() -> Self {
        Self::default()
    }

    fn push_slot(&mut self, name: Name, slot: Slot) {
        self.slots.push((name, slot));
    }

    fn find(&self, name: Name) -> Option<&Slot> {
        self.slots
            .iter()
            .find(|(slot_name, _)| *slot_name == name)
            .map(|(_, slot)| slot)
    }

    fn find_mut(&mut self, name: Name) -> Option<&mut Slot> {
        self.slots
            .iter_mut()
            .find(|(slot_name, _)| *slot_name == name)
            .map(|(_, slot)| slot)
    }

    /// Whether the local mapping declares `name`. Does not consult the parent.
    pub fn has_var(&self, name: impl Into<Name>) -> bool {
        self.find(name.into()).is_some()
    }

    /// Declare a new local variable. Duplicate names are an error.
    pub fn add_var(&mut self, name: impl Into<Name>, var: Variable) -> Result<(), BlackboardError> {
        let name = name.into();
        if self.has_var(name) {
            return Err(BlackboardError::Duplicate(name));
        }
        self.push_slot(name, Slot::Owned(var));
        Ok(())
    }

    /// Remove a local variable. Absent names are an error.
    pub fn remove_var(&mut self, name: impl Into<Name>) -> Result<(), BlackboardError> {
        let name = name.into();
        let len = self.slots.len();
        self.slots.retain(|(slot_name, _)| *slot_name != name);
        if self.slots.len() == len {
            return Err(BlackboardError::NotFound(name));
        }
        Ok(())
    }

    /// Read a variable's value. Fails with `NotFound` when the local scope
    /// does not declare the name; shared declarations redirect to the parent.
    pub fn get_var(&self, name: impl Into<Name>) -> Result<&Value, BlackboardError> {
        let name = name.into();
        match self.find(name) {
            Some(Slot::Owned(var)) => Ok(var.value()),
            Some(Slot::Inherit(remote)) => match &self.parent {
                Some(parent) => parent.get_var(*remote),
                None => Err(BlackboardError::NoParentScope(name)),
            },
            None => Err(BlackboardError::NotFound(name)),
        }
    }

    /// Write a variable's value, coercing to its declared type. Fails with
    /// `NotFound` when the local scope does not declare the name.
    pub fn set_var(&mut self, name: impl Into<Name>, value: Value) -> Result<(), BlackboardError> {
        let name = name.into();
        match self.find_mut(name) {
            Some(Slot::Owned(var)) => var
                .assign(value)
                .map_err(|(expected, got)| BlackboardError::TypeMismatch { expected, got }),
            Some(Slot::Inherit(remote)) => {
                let remote = *remote;
                match &mut self.parent {
                    Some(parent) => parent.set_var(remote, value),
                    None => Err(BlackboardError::NoParentScope(name)),
                }
            }
            None => Err(BlackboardError::NotFound(name)),
        }
    }

    /// Inspect a local variable's full cell (type, value and hints).
    /// Shared declarations resolve through the parent.
    pub fn var(&self, name: impl Into<Name>) -> Result<&Variable, BlackboardError> {
        let name = name.into();
        match self.find(name) {
            Some(Slot::Owned(var)) => Ok(var),
            Some(Slot::Inherit(remote)) => match &self.parent {
                Some(parent) => parent.var(*remote),
                None => Err(BlackboardError::NoParentScope(name)),
            },
            None => Err(BlackboardError::NotFound(name)),
        }
    }

    /// Local variable names in insertion order.
    pub fn list_vars(&self) -> impl Iterator<Item = Name> + '_ {
        self.slots.iter().map(|(name, _)| *name)
    }

    pub fn parent(&self) -> Option<&Blackboard> {
        self.parent.as_deref()
    }

    pub(crate) fn attach_parent(&mut self, parent: Blackboard) {
        self.parent = Some(Box::new(parent));
    }

    pub(crate) fn detach_parent(&mut self) -> Option<Blackboard> {
        self.parent.take().map(|parent| *parent)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::variable::VarType;

    #[test]
    fn round_trip() {
        let mut bb = Blackboard::new();
        bb.add_var("x", Variable::with_value(5i64)).unwrap();
        assert_eq!(bb.get_var("x"), Ok(&Value::Int(5)));

        assert_eq!(
            bb.add_var("x", Variable::new(VarType::Int)),
            Err(BlackboardError::Duplicate("x".into()))
        );

        bb.remove_var("x").unwrap();
        assert_eq!(bb.get_var("x"), Err(BlackboardError::NotFound("x".into())));
        assert_eq!(bb.remove_var("x"), Err(BlackboardError::NotFound("x".into())));
    }

    #[test]
    fn set_coerces_to_declared_type() {
        let mut bb = Blackboard::new();
        bb.add_var("count", Variable::new(VarType::Int)).unwrap();
        bb.set_var("count", Value::Float(3.9)).unwrap();
        assert_eq!(bb.get_var("count"), Ok(&Value::Int(3)));
        assert_eq!(
            bb.set_var("count", Value::List(vec![])),
            Err(BlackboardError::TypeMismatch {
                expected: VarType::Int,
                got: VarType::List
            })
        );
    }

    #[test]
    fn no_implicit_parent_fallback() {
        let mut scope = BlackboardPlan::new()
            .declare("local_only", Variable::new(VarType::Int))
            .create_blackboard();
        let mut parent = Blackboard::new();
        parent.add_var("speed", Variable::with_value(2.5)).unwrap();
        scope.attach_parent(parent);

        assert_eq!(
            scope.get_var("speed"),
            Err(BlackboardError::NotFound("speed".into()))
        );
        assert_eq!(scope.get_var("local_only"), Ok(&Value::Int(0)));
    }

    #[test]
    fn shared_var_redirects_to_parent() {
        let plan = BlackboardPlan::new()
            .declare("local", Variable::new(VarType::Int))
            .declare_shared("speed", Variable::new(VarType::Float), ShareMode::Inherit)
            .declare_shared(
                "target",
                Variable::new(VarType::Int),
                ShareMode::InheritAs("goal".into()),
            );
        let mut scope = plan.create_blackboard();

        // Without a parent the redirect is an error, not a silent miss.
        assert_eq!(
            scope.get_var("speed"),
            Err(BlackboardError::NoParentScope("speed".into()))
        );

        let mut parent = Blackboard::new();
        parent.add_var("speed", Variable::with_value(2.5)).unwrap();
        parent.add_var("goal", Variable::with_value(7i64)).unwrap();
        scope.attach_parent(parent);

        assert_eq!(scope.get_var("speed"), Ok(&Value::Float(2.5)));
        scope.set_var("speed", Value::Float(4.0)).unwrap();
        scope.set_var("target", Value::Int(9)).unwrap();

        let parent = scope.detach_parent().unwrap();
        assert_eq!(parent.get_var("speed"), Ok(&Value::Float(4.0)));
        assert_eq!(parent.get_var("goal"), Ok(&Value::Int(9)));
    }

    #[test]
    fn template_instances_are_independent() {
        let plan = BlackboardPlan::new().declare("x", Variable::with_value(5i64));
        let mut a = plan.create_blackboard();
        let b = plan.create_blackboard();
        a.set_var("x", Value::Int(99)).unwrap();
        assert_eq!(b.get_var("x"), Ok(&Value::Int(5)));
        assert_eq!(plan.get("x").unwrap().var.value(), &Value::Int(5));
    }

    #[test]
    fn list_vars_in_insertion_order() {
        let mut bb = Blackboard::new();
        bb.add_var("b", Variable::new(VarType::Int)).unwrap();
        bb.add_var("a", Variable::new(VarType::Int)).unwrap();
        bb.add_var("c", Variable::new(VarType::Int)).unwrap();
        let names: Vec<&str> = bb.list_vars().map(|n| n.as_str()).collect();
        assert_eq!(names, vec!["b", "a", "c"]);
    }

    #[test]
    fn populate_respects_overwrite() {
        let plan = BlackboardPlan::new().declare("x", Variable::with_value(1i64));
        let mut bb = Blackboard::new();
        bb.add_var("x", Variable::with_value(42i64)).unwrap();
        plan.populate(&mut bb, false);
        assert_eq!(bb.get_var("x"), Ok(&Value::Int(42)));
        plan.populate(&mut bb, true);
        assert_eq!(bb.get_var("x"), Ok(&Value::Int(1)));
    }
}
