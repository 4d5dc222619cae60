use crate::runtime::{
    FluxRuntime,
    error::RuntimeError,
    gc::HeapObject,
    types::builtin,
    value::Value,
};

use super::array_ops::{
    builtin_eltype, builtin_fill, builtin_length, builtin_ndims, builtin_size, builtin_sum,
    builtin_zeros,
};

fn int_array(rt: &mut FluxRuntime, items: &[i64]) -> Value {
    let data = items.iter().map(|v| Value::Int(*v)).collect();
    rt.alloc_array(builtin::INT64, vec![items.len()], data)
}

#[test]
fn length_counts_arrays_tuples_and_strings() {
    let mut rt = FluxRuntime::new();
    let array = int_array(&mut rt, &[1, 2, 3]);
    assert_eq!(builtin_length(&mut rt, vec![array]).unwrap(), Value::Int(3));

    let text = rt.alloc_string("héllo");
    assert_eq!(builtin_length(&mut rt, vec![text]).unwrap(), Value::Int(5));

    let err = builtin_length(&mut rt, vec![Value::Int(1)]).unwrap_err();
    assert!(matches!(err, RuntimeError::Type(msg) if msg.starts_with("length expected argument to be Array")));
}

#[test]
fn zeros_builds_float_matrix() {
    let mut rt = FluxRuntime::new();
    let matrix = builtin_zeros(&mut rt, vec![Value::Int(2), Value::Int(3)]).unwrap();
    assert_eq!(builtin_ndims(&mut rt, vec![matrix]).unwrap(), Value::Int(2));
    assert_eq!(builtin_length(&mut rt, vec![matrix]).unwrap(), Value::Int(6));
    assert_eq!(
        builtin_eltype(&mut rt, vec![matrix]).unwrap(),
        Value::Type(builtin::FLOAT64)
    );
    assert_eq!(
        builtin_size(&mut rt, vec![matrix, Value::Int(2)]).unwrap(),
        Value::Int(3)
    );
    assert_eq!(
        builtin_size(&mut rt, vec![matrix, Value::Int(5)]).unwrap(),
        Value::Int(1)
    );
}

#[test]
fn size_without_axis_is_a_tuple() {
    let mut rt = FluxRuntime::new();
    let matrix = builtin_zeros(&mut rt, vec![Value::Int(2), Value::Int(3)]).unwrap();
    let size = builtin_size(&mut rt, vec![matrix]).unwrap();
    match size.as_handle().and_then(|h| rt.heap().get(h)) {
        Some(HeapObject::Tuple(items)) => assert_eq!(items, &vec![Value::Int(2), Value::Int(3)]),
        other => panic!("expected tuple, got {:?}", other),
    }
}

#[test]
fn zeros_rejects_negative_dimension() {
    let mut rt = FluxRuntime::new();
    let err = builtin_zeros(&mut rt, vec![Value::Int(-1)]).unwrap_err();
    assert_eq!(err, RuntimeError::Argument("invalid array dimension -1".to_string()));
}

#[test]
fn fill_uses_value_type() {
    let mut rt = FluxRuntime::new();
    let filled = builtin_fill(&mut rt, vec![Value::Bool(true), Value::Int(4)]).unwrap();
    assert_eq!(
        builtin_eltype(&mut rt, vec![filled]).unwrap(),
        Value::Type(builtin::BOOL)
    );
    assert_eq!(builtin_length(&mut rt, vec![filled]).unwrap(), Value::Int(4));
}

#[test]
fn sum_promotes_to_float() {
    let mut rt = FluxRuntime::new();
    let ints = int_array(&mut rt, &[1, 2, 3]);
    assert_eq!(builtin_sum(&mut rt, vec![ints]).unwrap(), Value::Int(6));

    let mixed = rt.alloc_array(
        builtin::ANY,
        vec![2],
        vec![Value::Int(1), Value::Float(0.5)],
    );
    assert_eq!(builtin_sum(&mut rt, vec![mixed]).unwrap(), Value::Float(1.5));

    let empty = int_array(&mut rt, &[]);
    assert_eq!(builtin_sum(&mut rt, vec![empty]).unwrap(), Value::Int(0));
}
