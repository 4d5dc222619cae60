use crate::runtime::{FluxRuntime, error::RuntimeError, gc::HeapObject, value::Value};

pub(super) fn arity_error(name: &str, expected: &str, got: usize, signature: &str) -> RuntimeError {
    RuntimeError::Method(format!(
        "wrong number of arguments to {}: expected {}, got {} (usage: {})",
        name, expected, got, signature
    ))
}

pub(super) fn type_error(
    name: &str,
    label: &str,
    expected: &str,
    got: &str,
    signature: &str,
) -> RuntimeError {
    RuntimeError::Type(format!(
        "{} expected {} to be {}, got {} (usage: {})",
        name, label, expected, got, signature
    ))
}

pub(super) fn check_arity(
    args: &[Value],
    expected: usize,
    name: &str,
    signature: &str,
) -> Result<(), RuntimeError> {
    if args.len() != expected {
        return Err(arity_error(
            name,
            &expected.to_string(),
            args.len(),
            signature,
        ));
    }
    Ok(())
}

pub(super) fn check_arity_range(
    args: &[Value],
    min: usize,
    max: usize,
    name: &str,
    signature: &str,
) -> Result<(), RuntimeError> {
    if args.len() < min || args.len() > max {
        let expected = if max == usize::MAX {
            format!("at least {}", min)
        } else {
            format!("{}..{}", min, max)
        };
        return Err(arity_error(name, &expected, args.len(), signature));
    }
    Ok(())
}

pub(super) fn arg_int(
    rt: &mut FluxRuntime,
    args: &[Value],
    index: usize,
    name: &str,
    label: &str,
    signature: &str,
) -> Result<i64, RuntimeError> {
    match args[index] {
        Value::Int(value) => Ok(value),
        other => Err(type_error(
            name,
            label,
            "Int64",
            &rt.type_label(other),
            signature,
        )),
    }
}

/// Element storage and extents of an array argument.
pub(super) fn arg_array(
    rt: &mut FluxRuntime,
    args: &[Value],
    index: usize,
    name: &str,
    signature: &str,
) -> Result<(Vec<Value>, Vec<usize>), RuntimeError> {
    match args[index].as_handle().and_then(|h| rt.heap.get(h)) {
        Some(HeapObject::Array { data, dims, .. }) => Ok((data.clone(), dims.clone())),
        _ => Err(type_error(
            name,
            "argument",
            "Array",
            &rt.type_label(args[index]),
            signature,
        )),
    }
}

/// Array extents from integer arguments; negative extents are rejected.
pub(super) fn arg_dims(
    rt: &mut FluxRuntime,
    args: &[Value],
    name: &str,
    signature: &str,
) -> Result<Vec<usize>, RuntimeError> {
    let mut dims = Vec::with_capacity(args.len());
    for index in 0..args.len() {
        let extent = arg_int(rt, args, index, name, "dimension", signature)?;
        let extent = usize::try_from(extent).map_err(|_| {
            RuntimeError::Argument(format!("invalid array dimension {}", extent))
        })?;
        dims.push(extent);
    }
    Ok(dims)
}

/// Concatenated display form of every argument.
pub(super) fn joined_display(rt: &FluxRuntime, args: &[Value]) -> String {
    args.iter().map(|arg| rt.display(*arg)).collect()
}

/// Strings of an array of strings, such as `ARGS`.
pub(super) fn arg_string_array(
    rt: &mut FluxRuntime,
    args: &[Value],
    index: usize,
    name: &str,
    signature: &str,
) -> Result<Vec<String>, RuntimeError> {
    let (data, _) = arg_array(rt, args, index, name, signature)?;
    data.into_iter()
        .map(|item| {
            rt.string_ref(item).map(str::to_string).ok_or_else(|| {
                type_error(name, "element", "String", &rt.type_label(item), signature)
            })
        })
        .collect()
}
