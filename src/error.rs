use crate::name::Name;
use crate::variable::VarType;
use std::fmt::{self, Display, Formatter};

/// Errors from blackboard variable operations.
///
/// These are reported to the calling task as failed operations; tasks are
/// expected to map them to a `Failure` status rather than propagate them
/// past the tree boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum BlackboardError {
    /// The name is not declared in the local scope.
    NotFound(Name),
    /// A variable of that name is already declared in the local scope.
    Duplicate(Name),
    /// The name redirects to a parent scope, but the blackboard has none.
    NoParentScope(Name),
    /// The assigned value cannot be coerced to the variable's declared type.
    TypeMismatch { expected: VarType, got: VarType },
}

impl Display for BlackboardError {
    fn fmt(&self, fmt: &mut Formatter) -> fmt::Result {
        match self {
            Self::NotFound(name) => write!(fmt, "Variable {:?} not found", name),
            Self::Duplicate(name) => write!(fmt, "Variable {:?} is already declared", name),
            Self::NoParentScope(name) => {
                write!(fmt, "Variable {:?} binds to a parent scope that does not exist", name)
            }
            Self::TypeMismatch { expected, got } => {
                write!(fmt, "Expected a {:?} value but got {:?}", expected, got)
            }
        }
    }
}

impl std::error::Error for BlackboardError {}

#[derive(Debug)]
#[non_exhaustive]
pub enum AddChildError {
    TooManyChildren,
}

impl Display for AddChildError {
    fn fmt(&self, fmt: &mut Formatter) -> fmt::Result {
        match self {
            Self::TooManyChildren => write!(fmt, "Attempted to add too many children"),
        }
    }
}

impl std::error::Error for AddChildError {}

pub type AddChildResult = Result<(), AddChildError>;

/// Configuration errors detected while instantiating a tree from its
/// definition. These are fatal to the instantiation (the tree does not run)
/// but never to the host process.
#[derive(Debug)]
#[non_exhaustive]
pub enum InstantiateError {
    /// The kind identifier matches neither a registered task nor a subtree.
    UnknownKind(String),
    /// A required parameter is absent from the task definition.
    MissingParam { node: String, param: &'static str },
    /// A parameter is present but not of the shape the task expects.
    BadParam { node: String, param: &'static str },
    /// A parameter binds to a variable no enclosing scope plan declares.
    UnknownVar { node: String, var: Name },
    /// A blackboard plan declares the same variable twice.
    DuplicateVar(Name),
    /// A decorator definition does not have exactly one child.
    ChildCount { node: String, expected: usize, got: usize },
    AddChild(AddChildError, String),
    /// A subtree references itself, directly or through other subtrees.
    InfiniteRecursion { tree: String },
}

impl Display for InstantiateError {
    fn fmt(&self, fmt: &mut Formatter) -> fmt::Result {
        match self {
            Self::UnknownKind(kind) => {
                write!(fmt, "Task kind or subtree name not found {:?}", kind)
            }
            Self::MissingParam { node, param } => {
                write!(fmt, "{} is missing the required parameter {:?}", node, param)
            }
            Self::BadParam { node, param } => {
                write!(fmt, "{} cannot use the given value for parameter {:?}", node, param)
            }
            Self::UnknownVar { node, var } => {
                write!(fmt, "{} binds to variable {:?} which no scope declares", node, var)
            }
            Self::DuplicateVar(name) => {
                write!(fmt, "Blackboard plan declares variable {:?} twice", name)
            }
            Self::ChildCount { node, expected, got } => {
                write!(fmt, "{} expects {} child(ren) but has {}", node, expected, got)
            }
            Self::AddChild(e, node) => {
                e.fmt(fmt)?;
                write!(fmt, " to {}", node)
            }
            Self::InfiniteRecursion { tree } => {
                write!(fmt, "Subtree {:?} includes itself", tree)
            }
        }
    }
}

impl std::error::Error for InstantiateError {}

/// Errors from reading or writing a tree definition as YAML.
#[derive(Debug)]
pub enum LoadYamlError {
    Yaml(serde_yaml::Error),
    Instantiate(InstantiateError),
}

impl Display for LoadYamlError {
    fn fmt(&self, fmt: &mut Formatter) -> fmt::Result {
        match self {
            Self::Yaml(e) => e.fmt(fmt),
            Self::Instantiate(e) => e.fmt(fmt),
        }
    }
}

impl std::error::Error for LoadYamlError {}

impl From<serde_yaml::Error> for LoadYamlError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Yaml(err)
    }
}

impl From<InstantiateError> for LoadYamlError {
    fn from(err: InstantiateError) -> Self {
        Self::Instantiate(err)
    }
}
