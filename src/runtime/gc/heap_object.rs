use std::{collections::HashMap, rc::Rc};

use crate::{
    runtime::{types::TypeId, value::Value},
    syntax::ast::{Expr, Program},
};

/// Objects that live on the GC-managed heap.
#[derive(Debug, Clone)]
pub enum HeapObject {
    Str(Rc<str>),
    /// Column-major element storage; `dims` holds one extent per axis.
    Array {
        elem: TypeId,
        dims: Vec<usize>,
        data: Vec<Value>,
    },
    Tuple(Vec<Value>),
    Struct {
        ty: TypeId,
        fields: Vec<Value>,
    },
    Module {
        name: Rc<str>,
        bindings: HashMap<Rc<str>, Value>,
    },
    Function {
        name: Rc<str>,
        params: Rc<[Rc<str>]>,
        body: Rc<Expr>,
    },
    /// Parsed top-level source, ready for evaluation.
    Code(Rc<Program>),
}

impl HeapObject {
    /// Calls `visit` for every value this object references.
    pub fn for_each_child(&self, mut visit: impl FnMut(Value)) {
        match self {
            HeapObject::Array { data, .. } => data.iter().copied().for_each(visit),
            HeapObject::Tuple(items) => items.iter().copied().for_each(visit),
            HeapObject::Struct { fields, .. } => fields.iter().copied().for_each(visit),
            HeapObject::Module { bindings, .. } => {
                for value in bindings.values() {
                    visit(*value);
                }
            }
            HeapObject::Str(_) | HeapObject::Function { .. } | HeapObject::Code(_) => {}
        }
    }
}
