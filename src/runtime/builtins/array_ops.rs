use crate::runtime::{
    FluxRuntime,
    error::RuntimeError,
    gc::HeapObject,
    types::builtin,
    value::Value,
};

use super::helpers::{
    arg_array, arg_dims, arg_int, check_arity, check_arity_range, type_error,
};

pub(super) fn builtin_length(rt: &mut FluxRuntime, args: Vec<Value>) -> Result<Value, RuntimeError> {
    check_arity(&args, 1, "length", "length(collection)")?;
    let length = match args[0].as_handle().and_then(|h| rt.heap.get(h)) {
        Some(HeapObject::Array { data, .. }) => data.len(),
        Some(HeapObject::Tuple(items)) => items.len(),
        Some(HeapObject::Str(text)) => text.chars().count(),
        _ => {
            return Err(type_error(
                "length",
                "argument",
                "Array, Tuple or String",
                &rt.type_label(args[0]),
                "length(collection)",
            ));
        }
    };
    Ok(Value::Int(length as i64))
}

/// `size(a)` is the tuple of extents; `size(a, d)` the extent along the
/// one-based axis `d`, which is 1 past the array's rank.
pub(super) fn builtin_size(rt: &mut FluxRuntime, args: Vec<Value>) -> Result<Value, RuntimeError> {
    check_arity_range(&args, 1, 2, "size", "size(a[, dim])")?;
    let (_, dims) = arg_array(rt, &args, 0, "size", "size(a[, dim])")?;
    if args.len() == 2 {
        let axis = arg_int(rt, &args, 1, "size", "dimension", "size(a[, dim])")?;
        if axis < 1 {
            return Err(RuntimeError::Argument(format!(
                "dimension out of range: {}",
                axis
            )));
        }
        let extent = dims.get(axis as usize - 1).copied().unwrap_or(1);
        return Ok(Value::Int(extent as i64));
    }
    let extents = dims.into_iter().map(|d| Value::Int(d as i64)).collect();
    Ok(Value::Gc(rt.heap.alloc(HeapObject::Tuple(extents))))
}

pub(super) fn builtin_ndims(rt: &mut FluxRuntime, args: Vec<Value>) -> Result<Value, RuntimeError> {
    check_arity(&args, 1, "ndims", "ndims(a)")?;
    let (_, dims) = arg_array(rt, &args, 0, "ndims", "ndims(a)")?;
    Ok(Value::Int(dims.len() as i64))
}

pub(super) fn builtin_eltype(rt: &mut FluxRuntime, args: Vec<Value>) -> Result<Value, RuntimeError> {
    check_arity(&args, 1, "eltype", "eltype(a)")?;
    match args[0].as_handle().and_then(|h| rt.heap.get(h)) {
        Some(HeapObject::Array { elem, .. }) => Ok(Value::Type(*elem)),
        _ => Err(type_error(
            "eltype",
            "argument",
            "Array",
            &rt.type_label(args[0]),
            "eltype(a)",
        )),
    }
}

pub(super) fn builtin_zeros(rt: &mut FluxRuntime, args: Vec<Value>) -> Result<Value, RuntimeError> {
    check_arity_range(&args, 1, usize::MAX, "zeros", "zeros(dims...)")?;
    let dims = arg_dims(rt, &args, "zeros", "zeros(dims...)")?;
    let count = element_count(&dims)?;
    Ok(rt.alloc_array(builtin::FLOAT64, dims, vec![Value::Float(0.0); count]))
}

pub(super) fn builtin_fill(rt: &mut FluxRuntime, args: Vec<Value>) -> Result<Value, RuntimeError> {
    check_arity_range(&args, 2, usize::MAX, "fill", "fill(value, dims...)")?;
    let dims = arg_dims(rt, &args[1..], "fill", "fill(value, dims...)")?;
    let count = element_count(&dims)?;
    let elem = rt.type_id_of(args[0]);
    Ok(rt.alloc_array(elem, dims, vec![args[0]; count]))
}

/// Sum of a numeric array. Integers wrap on overflow.
pub(super) fn builtin_sum(rt: &mut FluxRuntime, args: Vec<Value>) -> Result<Value, RuntimeError> {
    check_arity(&args, 1, "sum", "sum(a)")?;
    let (data, _) = arg_array(rt, &args, 0, "sum", "sum(a)")?;
    let mut int_total: i64 = 0;
    let mut float_total: Option<f64> = None;
    for item in data {
        match item {
            Value::Int(v) => int_total = int_total.wrapping_add(v),
            Value::Float(v) => *float_total.get_or_insert(0.0) += v,
            other => {
                return Err(type_error(
                    "sum",
                    "element",
                    "a number",
                    &rt.type_label(other),
                    "sum(a)",
                ));
            }
        }
    }
    Ok(match float_total {
        Some(total) => Value::Float(total + int_total as f64),
        None => Value::Int(int_total),
    })
}

fn element_count(dims: &[usize]) -> Result<usize, RuntimeError> {
    dims.iter()
        .try_fold(1usize, |acc, d| acc.checked_mul(*d))
        .filter(|count| *count <= MAX_ELEMENTS)
        .ok_or_else(|| RuntimeError::Argument("array is too large".to_string()))
}

const MAX_ELEMENTS: usize = 1 << 24;
