use crate::runtime::{FluxRuntime, error::RuntimeError, gc::HeapObject, value::Value};

use super::helpers::{arg_int, check_arity, check_arity_range, joined_display, type_error};

pub(super) fn builtin_typeof(rt: &mut FluxRuntime, args: Vec<Value>) -> Result<Value, RuntimeError> {
    check_arity(&args, 1, "typeof", "typeof(x)")?;
    Ok(Value::Type(rt.type_id_of(args[0])))
}

pub(super) fn builtin_string(rt: &mut FluxRuntime, args: Vec<Value>) -> Result<Value, RuntimeError> {
    let text = joined_display(rt, &args);
    Ok(rt.alloc_string(text))
}

pub(super) fn builtin_println(rt: &mut FluxRuntime, args: Vec<Value>) -> Result<Value, RuntimeError> {
    let line = joined_display(rt, &args);
    rt.write_line(line);
    Ok(Value::Nothing)
}

pub(super) fn builtin_error(rt: &mut FluxRuntime, args: Vec<Value>) -> Result<Value, RuntimeError> {
    check_arity_range(&args, 1, usize::MAX, "error", "error(msg...)")?;
    Err(RuntimeError::Message(joined_display(rt, &args)))
}

pub(super) fn builtin_throw(_rt: &mut FluxRuntime, args: Vec<Value>) -> Result<Value, RuntimeError> {
    check_arity(&args, 1, "throw", "throw(exception)")?;
    Err(RuntimeError::Thrown(args[0]))
}

/// `getfield(x, name)` or `getfield(x, i)` with a one-based position.
pub(super) fn builtin_getfield(rt: &mut FluxRuntime, args: Vec<Value>) -> Result<Value, RuntimeError> {
    check_arity(&args, 2, "getfield", "getfield(x, name)")?;
    if let Some(name) = rt.string_ref(args[1]).map(str::to_string) {
        return rt.field_of(args[0], &name);
    }
    let position = arg_int(rt, &args, 1, "getfield", "field", "getfield(x, name)")?;
    let index = usize::try_from(position)
        .ok()
        .and_then(|p| p.checked_sub(1))
        .ok_or(RuntimeError::Bounds(position))?;
    rt.nth_field(args[0], index)
}

pub(super) fn builtin_fieldnames(rt: &mut FluxRuntime, args: Vec<Value>) -> Result<Value, RuntimeError> {
    check_arity(&args, 1, "fieldnames", "fieldnames(T)")?;
    let Value::Type(ty) = args[0] else {
        return Err(type_error(
            "fieldnames",
            "argument",
            "DataType",
            &rt.type_label(args[0]),
            "fieldnames(T)",
        ));
    };
    let fields = rt
        .types
        .get(ty)
        .map(|info| info.fields().to_vec())
        .unwrap_or_default();
    let names: Vec<Value> = fields
        .into_iter()
        .map(|field| rt.alloc_string(field))
        .collect();
    Ok(Value::Gc(rt.heap.alloc(HeapObject::Tuple(names))))
}

/// Integer division truncating toward zero.
pub(super) fn builtin_div(rt: &mut FluxRuntime, args: Vec<Value>) -> Result<Value, RuntimeError> {
    check_arity(&args, 2, "div", "div(a, b)")?;
    let a = arg_int(rt, &args, 0, "div", "first argument", "div(a, b)")?;
    let b = arg_int(rt, &args, 1, "div", "second argument", "div(a, b)")?;
    a.checked_div(b).map(Value::Int).ok_or(RuntimeError::DivideByZero)
}
