use crate::runtime::{gc::GcHandle, types::TypeId};

/// Index into the builtin table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BuiltinId(pub(crate) u16);

impl BuiltinId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A managed value handle.
///
/// Scalars are stored inline; everything else lives on the [`crate::runtime::gc::GcHeap`]
/// and is only valid while something keeps it reachable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Bool(bool),
    Nothing,
    Type(TypeId),
    Builtin(BuiltinId),
    Gc(GcHandle),
}

impl Value {
    pub fn as_int(self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_handle(self) -> Option<GcHandle> {
        match self {
            Value::Gc(handle) => Some(handle),
            _ => None,
        }
    }

    pub fn is_nothing(self) -> bool {
        matches!(self, Value::Nothing)
    }
}
