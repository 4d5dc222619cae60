use crate::runtime::{builtin_function::BuiltinFunction, value::BuiltinId};

mod array_ops;
mod core_ops;
mod helpers;
mod sched_ops;

use array_ops::{
    builtin_eltype, builtin_fill, builtin_length, builtin_ndims, builtin_size, builtin_sum,
    builtin_zeros,
};
use core_ops::{
    builtin_div, builtin_error, builtin_fieldnames, builtin_getfield, builtin_println,
    builtin_string, builtin_throw, builtin_typeof,
};
use sched_ops::{
    builtin_bind_addr, builtin_init_bind_addr, builtin_init_head_sched, builtin_init_parallel,
    builtin_nprocs, builtin_yield,
};

/// All built-in functions, bound by name in `Base`. The index is the
/// [`BuiltinId`].
pub static BUILTINS: &[BuiltinFunction] = &[
    BuiltinFunction {
        name: "length",
        func: builtin_length,
    },
    BuiltinFunction {
        name: "size",
        func: builtin_size,
    },
    BuiltinFunction {
        name: "ndims",
        func: builtin_ndims,
    },
    BuiltinFunction {
        name: "eltype",
        func: builtin_eltype,
    },
    BuiltinFunction {
        name: "typeof",
        func: builtin_typeof,
    },
    BuiltinFunction {
        name: "zeros",
        func: builtin_zeros,
    },
    BuiltinFunction {
        name: "fill",
        func: builtin_fill,
    },
    BuiltinFunction {
        name: "sum",
        func: builtin_sum,
    },
    BuiltinFunction {
        name: "div",
        func: builtin_div,
    },
    BuiltinFunction {
        name: "string",
        func: builtin_string,
    },
    BuiltinFunction {
        name: "println",
        func: builtin_println,
    },
    BuiltinFunction {
        name: "error",
        func: builtin_error,
    },
    BuiltinFunction {
        name: "throw",
        func: builtin_throw,
    },
    BuiltinFunction {
        name: "getfield",
        func: builtin_getfield,
    },
    BuiltinFunction {
        name: "fieldnames",
        func: builtin_fieldnames,
    },
    BuiltinFunction {
        name: "yield",
        func: builtin_yield,
    },
    BuiltinFunction {
        name: "nprocs",
        func: builtin_nprocs,
    },
    BuiltinFunction {
        name: "bind_addr",
        func: builtin_bind_addr,
    },
    BuiltinFunction {
        name: "init_parallel",
        func: builtin_init_parallel,
    },
    BuiltinFunction {
        name: "init_bind_addr",
        func: builtin_init_bind_addr,
    },
    BuiltinFunction {
        name: "init_head_sched",
        func: builtin_init_head_sched,
    },
];

pub fn get(id: BuiltinId) -> Option<&'static BuiltinFunction> {
    BUILTINS.get(id.index())
}

pub fn get_builtin_index(name: &str) -> Option<usize> {
    BUILTINS.iter().position(|b| b.name == name)
}

#[cfg(test)]
mod array_ops_test;
