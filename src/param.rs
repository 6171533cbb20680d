//! Task configuration fields that are either literal values or bound to a
//! named blackboard variable.

use crate::blackboard::Blackboard;
use crate::error::BlackboardError;
use crate::name::Name;
use crate::variable::{Value, VarType};
use serde::{Deserialize, Serialize};

/// A task parameter: a literal [`Value`] or a reference to a blackboard
/// variable resolved at tick time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Param {
    Value(Value),
    Var(Name),
}

impl Param {
    pub fn value(value: impl Into<Value>) -> Self {
        Param::Value(value.into())
    }

    pub fn var(name: impl Into<Name>) -> Self {
        Param::Var(name.into())
    }

    /// Resolve against a blackboard. Literals resolve to themselves;
    /// variable references go through [`Blackboard::get_var`].
    pub fn resolve<'a>(&'a self, bb: &'a Blackboard) -> Result<&'a Value, BlackboardError> {
        match self {
            Param::Value(value) => Ok(value),
            Param::Var(name) => bb.get_var(*name),
        }
    }

    /// Resolve and coerce to a float.
    pub fn as_float(&self, bb: &Blackboard) -> Result<f64, BlackboardError> {
        let value = self.resolve(bb)?;
        match value.coerce(VarType::Float) {
            Some(Value::Float(v)) => Ok(v),
            _ => Err(BlackboardError::TypeMismatch {
                expected: VarType::Float,
                got: value.var_type(),
            }),
        }
    }

    /// Resolve and coerce to a bool.
    pub fn as_bool(&self, bb: &Blackboard) -> Result<bool, BlackboardError> {
        let value = self.resolve(bb)?;
        match value.coerce(VarType::Bool) {
            Some(Value::Bool(v)) => Ok(v),
            _ => Err(BlackboardError::TypeMismatch {
                expected: VarType::Bool,
                got: value.var_type(),
            }),
        }
    }
}

impl From<Value> for Param {
    fn from(value: Value) -> Self {
        Param::Value(value)
    }
}
