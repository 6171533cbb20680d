//! Typed value cells stored in a blackboard.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt::{self, Display, Formatter};

/// The closed set of value kinds a blackboard variable can hold.
///
/// `Nil` declares an untyped cell that accepts any value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum VarType {
    Nil,
    Bool,
    Int,
    Float,
    Vec2,
    Vec3,
    String,
    List,
    Object,
}

impl VarType {
    /// The value a freshly declared variable of this type starts with.
    pub fn default_value(self) -> Value {
        match self {
            VarType::Nil => Value::Nil,
            VarType::Bool => Value::Bool(false),
            VarType::Int => Value::Int(0),
            VarType::Float => Value::Float(0.0),
            VarType::Vec2 => Value::Vec2([0.0; 2]),
            VarType::Vec3 => Value::Vec3([0.0; 3]),
            VarType::String => Value::String(String::new()),
            VarType::List => Value::List(Vec::new()),
            VarType::Object => Value::Object(0),
        }
    }
}

/// A dynamically typed value. `Clone` is a deep copy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    Vec2([f64; 2]),
    Vec3([f64; 3]),
    String(String),
    List(Vec<Value>),
    /// Opaque handle to a host-engine object.
    Object(u64),
}

impl Value {
    pub fn var_type(&self) -> VarType {
        match self {
            Value::Nil => VarType::Nil,
            Value::Bool(_) => VarType::Bool,
            Value::Int(_) => VarType::Int,
            Value::Float(_) => VarType::Float,
            Value::Vec2(_) => VarType::Vec2,
            Value::Vec3(_) => VarType::Vec3,
            Value::String(_) => VarType::String,
            Value::List(_) => VarType::List,
            Value::Object(_) => VarType::Object,
        }
    }

    /// Convert this value to the given type, or `None` if the kinds are
    /// incompatible. Numbers convert between each other, strings parse into
    /// scalars, and any scalar stringifies.
    pub fn coerce(&self, ty: VarType) -> Option<Value> {
        if self.var_type() == ty || ty == VarType::Nil {
            return Some(self.clone());
        }
        match (self, ty) {
            (Value::Int(v), VarType::Float) => Some(Value::Float(*v as f64)),
            (Value::Float(v), VarType::Int) => Some(Value::Int(*v as i64)),
            (Value::Bool(v), VarType::Int) => Some(Value::Int(*v as i64)),
            (Value::Int(v), VarType::Bool) => Some(Value::Bool(*v != 0)),
            (Value::String(s), VarType::Int) => s.trim().parse().ok().map(Value::Int),
            (Value::String(s), VarType::Float) => s.trim().parse().ok().map(Value::Float),
            (Value::String(s), VarType::Bool) => s.trim().parse().ok().map(Value::Bool),
            (other, VarType::String) => Some(Value::String(other.to_string())),
            _ => None,
        }
    }

    /// Loose truthiness used by condition leaves: zero, empty and nil are
    /// false, everything else is true.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Nil => false,
            Value::Bool(v) => *v,
            Value::Int(v) => *v != 0,
            Value::Float(v) => *v != 0.0,
            Value::Vec2(_) | Value::Vec3(_) => true,
            Value::String(s) => !s.is_empty(),
            Value::List(items) => !items.is_empty(),
            Value::Object(id) => *id != 0,
        }
    }

    /// Ordered comparison across numeric kinds, strings and bools.
    /// Returns `None` for kinds with no meaningful order.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::Int(a), Value::Float(b)) => (*a as f64).partial_cmp(b),
            (Value::Float(a), Value::Int(b)) => a.partial_cmp(&(*b as f64)),
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl Display for Value {
    fn fmt(&self, fmt: &mut Formatter) -> fmt::Result {
        match self {
            Value::Nil => write!(fmt, "nil"),
            Value::Bool(v) => write!(fmt, "{}", v),
            Value::Int(v) => write!(fmt, "{}", v),
            Value::Float(v) => write!(fmt, "{}", v),
            Value::Vec2([x, y]) => write!(fmt, "({}, {})", x, y),
            Value::Vec3([x, y, z]) => write!(fmt, "({}, {}, {})", x, y, z),
            Value::String(s) => write!(fmt, "{}", s),
            Value::List(items) => {
                write!(fmt, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(fmt, ", ")?;
                    }
                    write!(fmt, "{}", item)?;
                }
                write!(fmt, "]")
            }
            Value::Object(id) => write!(fmt, "object#{}", id),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

/// Editor-facing hint describing how a variable's value should be edited.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum VarHint {
    #[default]
    None,
    /// Numeric range with a step.
    Range { min: f64, max: f64, step: f64 },
    /// Multiline text editing.
    Multiline,
    /// Fixed set of allowed string values.
    Enum(Vec<String>),
}

fn is_default_hint(hint: &VarHint) -> bool {
    *hint == VarHint::None
}

/// A single typed value cell with optional editing hints.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    ty: VarType,
    value: Value,
    #[serde(default, skip_serializing_if = "is_default_hint")]
    hint: VarHint,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    hint_text: String,
}

impl Variable {
    /// A fresh variable holding the type's default value.
    pub fn new(ty: VarType) -> Self {
        Self {
            ty,
            value: ty.default_value(),
            hint: VarHint::None,
            hint_text: String::new(),
        }
    }

    /// A variable whose declared type is taken from the initial value.
    pub fn with_value(value: impl Into<Value>) -> Self {
        let value = value.into();
        Self {
            ty: value.var_type(),
            value,
            hint: VarHint::None,
            hint_text: String::new(),
        }
    }

    pub fn with_hint(mut self, hint: VarHint, hint_text: impl Into<String>) -> Self {
        self.hint = hint;
        self.hint_text = hint_text.into();
        self
    }

    pub fn var_type(&self) -> VarType {
        self.ty
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn hint(&self) -> &VarHint {
        &self.hint
    }

    pub fn hint_text(&self) -> &str {
        &self.hint_text
    }

    /// Assign a new value, coercing to the declared type when possible.
    /// Rejects values that cannot be represented as the declared type.
    pub fn assign(&mut self, value: Value) -> Result<(), (VarType, VarType)> {
        let got = value.var_type();
        match value.coerce(self.ty) {
            Some(value) => {
                self.value = value;
                Ok(())
            }
            None => Err((self.ty, got)),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn coerce_numeric() {
        assert_eq!(Value::Int(3).coerce(VarType::Float), Some(Value::Float(3.0)));
        assert_eq!(Value::Float(2.7).coerce(VarType::Int), Some(Value::Int(2)));
        assert_eq!(Value::String("42".into()).coerce(VarType::Int), Some(Value::Int(42)));
        assert_eq!(Value::Vec2([1.0, 2.0]).coerce(VarType::Int), None);
    }

    #[test]
    fn assign_rejects_incompatible() {
        let mut var = Variable::new(VarType::Int);
        var.assign(Value::Float(1.5)).unwrap();
        assert_eq!(var.value(), &Value::Int(1));
        assert_eq!(
            var.assign(Value::List(vec![])),
            Err((VarType::Int, VarType::List))
        );
    }

    #[test]
    fn untyped_cell_accepts_anything() {
        let mut var = Variable::new(VarType::Nil);
        var.assign(Value::String("hi".into())).unwrap();
        assert_eq!(var.value(), &Value::String("hi".into()));
        var.assign(Value::Int(7)).unwrap();
        assert_eq!(var.value(), &Value::Int(7));
    }

    #[test]
    fn compare_across_kinds() {
        use std::cmp::Ordering::*;
        assert_eq!(Value::Int(1).compare(&Value::Float(1.5)), Some(Less));
        assert_eq!(Value::Float(2.0).compare(&Value::Int(2)), Some(Equal));
        assert_eq!(Value::String("b".into()).compare(&Value::String("a".into())), Some(Greater));
        assert_eq!(Value::Int(1).compare(&Value::String("1".into())), None);
    }

    #[test]
    fn truthiness() {
        assert!(!Value::Nil.is_truthy());
        assert!(!Value::Int(0).is_truthy());
        assert!(Value::Int(-1).is_truthy());
        assert!(!Value::String(String::new()).is_truthy());
        assert!(Value::Bool(true).is_truthy());
    }
}
