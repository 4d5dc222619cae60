use crate::runtime::{FluxRuntime, error::RuntimeError, value::Value};

use super::helpers::{arg_string_array, check_arity};

pub(super) fn builtin_yield(rt: &mut FluxRuntime, args: Vec<Value>) -> Result<Value, RuntimeError> {
    check_arity(&args, 0, "yield", "yield()")?;
    rt.scheduler.record_yield();
    Ok(Value::Nothing)
}

pub(super) fn builtin_nprocs(rt: &mut FluxRuntime, args: Vec<Value>) -> Result<Value, RuntimeError> {
    check_arity(&args, 0, "nprocs", "nprocs()")?;
    Ok(Value::Int(rt.scheduler.nprocs().unwrap_or(1) as i64))
}

pub(super) fn builtin_bind_addr(rt: &mut FluxRuntime, args: Vec<Value>) -> Result<Value, RuntimeError> {
    check_arity(&args, 0, "bind_addr", "bind_addr()")?;
    match rt.scheduler.bind_addr().map(str::to_string) {
        Some(addr) => Ok(rt.alloc_string(addr)),
        None => Ok(Value::Nothing),
    }
}

pub(super) fn builtin_init_parallel(rt: &mut FluxRuntime, args: Vec<Value>) -> Result<Value, RuntimeError> {
    check_arity(&args, 0, "init_parallel", "init_parallel()")?;
    let configured = rt.config.nprocs;
    Ok(Value::Int(rt.scheduler.init_parallel(configured) as i64))
}

pub(super) fn builtin_init_bind_addr(rt: &mut FluxRuntime, args: Vec<Value>) -> Result<Value, RuntimeError> {
    check_arity(&args, 1, "init_bind_addr", "init_bind_addr(ARGS)")?;
    let argv = arg_string_array(rt, &args, 0, "init_bind_addr", "init_bind_addr(ARGS)")?;
    let configured = rt.config.bind_addr.clone();
    let addr = rt.scheduler.init_bind_addr(&argv, configured.as_deref());
    Ok(rt.alloc_string(addr))
}

pub(super) fn builtin_init_head_sched(rt: &mut FluxRuntime, args: Vec<Value>) -> Result<Value, RuntimeError> {
    check_arity(&args, 0, "init_head_sched", "init_head_sched()")?;
    rt.scheduler.init_head_sched();
    Ok(Value::Nothing)
}
