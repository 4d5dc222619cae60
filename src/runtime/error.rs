use thiserror::Error;

use crate::runtime::{types::TypeId, value::Value};

/// Failures raised while the runtime executes.
///
/// These never cross the embedding boundary as-is: the runtime turns each
/// one into a managed exception value first.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    #[error("{0}")]
    Message(String),
    #[error("{0} not defined")]
    Undefined(String),
    #[error("{0}")]
    Method(String),
    #[error("type {type_name} has no field {field}")]
    Field {
        ty: TypeId,
        type_name: String,
        field: String,
    },
    #[error("attempt to access index {0}")]
    Bounds(i64),
    #[error("{0}")]
    Argument(String),
    #[error("{0}")]
    Parse(String),
    #[error("{0}")]
    Type(String),
    #[error("integer division error")]
    DivideByZero,
    #[error("interrupted")]
    Interrupted,
    #[error("stack overflow")]
    StackOverflow,
    #[error("thrown value")]
    Thrown(Value),
}
