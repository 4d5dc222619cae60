//! Tree-walking evaluation of parsed programs.
//!
//! Every `eval` leaves exactly one value on the value stack. Call arguments
//! stay on the stack for the duration of the call and double as the callee's
//! locals.

use std::rc::Rc;

use crate::{
    embed::BoundaryView,
    runtime::{
        FluxRuntime, builtins,
        error::RuntimeError,
        gc::{GcHandle, HeapObject},
        types::{TypeId, builtin},
        value::Value,
    },
    syntax::ast::{Expr, Program, Stmt},
};

mod binary_ops;

/// Deepest chain of user-function calls before `stack overflow` is raised.
pub const MAX_CALL_DEPTH: usize = 256;

/// Locals of the running function: `params[i]` lives at `stack[base + i]`.
#[derive(Clone, Copy)]
struct Env<'a> {
    params: &'a [Rc<str>],
    base: usize,
}

impl FluxRuntime {
    /// Runs every statement of `program` and returns the last value.
    pub(crate) fn run_program(
        &mut self,
        boundary: &BoundaryView<'_, Value>,
        program: &Program,
    ) -> Result<Value, RuntimeError> {
        let slot = self.stack.len();
        self.stack.push(Value::Nothing);
        for statement in &program.statements {
            self.safepoint(boundary)?;
            self.exec(boundary, &statement.stmt)?;
            let value = self.pop();
            self.stack[slot] = value;
        }
        Ok(self.pop())
    }

    fn exec(&mut self, boundary: &BoundaryView<'_, Value>, stmt: &Stmt) -> Result<(), RuntimeError> {
        match stmt {
            Stmt::Expr(expr) => self.eval(boundary, expr, None),
            Stmt::Assign { name, value } => {
                self.eval(boundary, value, None)?;
                let value = self.stack.last().copied().unwrap_or(Value::Nothing);
                self.bind_global(name, value)
            }
            Stmt::Function { name, params, body } => {
                let function = Value::Gc(self.heap.alloc(HeapObject::Function {
                    name: name.clone(),
                    params: params.clone(),
                    body: body.clone(),
                }));
                self.stack.push(function);
                self.bind_global(name, function)
            }
            Stmt::Struct { name, fields } => {
                let ty = self.types.declare_struct(name, fields)?;
                self.bind_global(name, Value::Type(ty))?;
                self.stack.push(Value::Nothing);
                Ok(())
            }
        }
    }

    fn eval(
        &mut self,
        boundary: &BoundaryView<'_, Value>,
        expr: &Expr,
        env: Option<Env<'_>>,
    ) -> Result<(), RuntimeError> {
        match expr {
            Expr::Int(v) => self.stack.push(Value::Int(*v)),
            Expr::Float(v) => self.stack.push(Value::Float(*v)),
            Expr::Bool(v) => self.stack.push(Value::Bool(*v)),
            Expr::Nothing => self.stack.push(Value::Nothing),
            Expr::Str(text) => {
                let value = self.alloc_string(text.clone());
                self.stack.push(value);
            }
            Expr::Ident(name) => {
                let value = self
                    .lookup_name(name, env)
                    .ok_or_else(|| RuntimeError::Undefined(name.to_string()))?;
                self.stack.push(value);
            }
            Expr::Field { target, name } => {
                self.eval(boundary, target, env)?;
                let target = self.pop();
                let value = self.field_of(target, name)?;
                self.stack.push(value);
            }
            Expr::Call { callee, args } => {
                let at = self.stack.len();
                self.eval(boundary, callee, env)?;
                for arg in args {
                    self.eval(boundary, arg, env)?;
                }
                let value = self.invoke(boundary, at, args.len())?;
                self.stack.truncate(at);
                self.stack.push(value);
            }
            Expr::Index { target, index } => {
                self.eval(boundary, target, env)?;
                self.eval(boundary, index, env)?;
                let index = self.pop();
                let target = self.pop();
                let value = self.index_value(target, index)?;
                self.stack.push(value);
            }
            Expr::Prefix { op, operand } => {
                self.eval(boundary, operand, env)?;
                let operand = self.pop();
                let value = self.prefix(*op, operand)?;
                self.stack.push(value);
            }
            Expr::Infix { op, left, right } => {
                let at = self.stack.len();
                self.eval(boundary, left, env)?;
                self.eval(boundary, right, env)?;
                let (left, right) = (self.stack[at], self.stack[at + 1]);
                let value = self.infix(*op, left, right)?;
                self.stack.truncate(at);
                self.stack.push(value);
            }
            Expr::Array(items) => {
                let at = self.stack.len();
                for item in items {
                    self.eval(boundary, item, env)?;
                }
                let data = self.stack.split_off(at);
                let elem = self.common_type(&data);
                let array = self.alloc_array(elem, vec![data.len()], data);
                self.stack.push(array);
            }
            Expr::Tuple(items) => {
                let at = self.stack.len();
                for item in items {
                    self.eval(boundary, item, env)?;
                }
                let items = self.stack.split_off(at);
                let tuple = Value::Gc(self.heap.alloc(HeapObject::Tuple(items)));
                self.stack.push(tuple);
            }
        }
        Ok(())
    }

    /// Calls `stack[callee_at]` with the `argc` values above it.
    pub(crate) fn invoke(
        &mut self,
        boundary: &BoundaryView<'_, Value>,
        callee_at: usize,
        argc: usize,
    ) -> Result<Value, RuntimeError> {
        self.safepoint(boundary)?;
        let args_at = callee_at + 1;
        let callee = self.stack[callee_at];

        match callee {
            Value::Builtin(id) => {
                let builtin = builtins::get(id)
                    .ok_or_else(|| RuntimeError::Method(format!("unknown builtin {}", id.index())))?;
                let args = self.stack[args_at..args_at + argc].to_vec();
                (builtin.func)(self, args)
            }
            Value::Type(ty) => self.construct(ty, args_at, argc),
            Value::Gc(handle) => {
                let Some(HeapObject::Function { name, params, body }) = self.heap.get(handle) else {
                    return Err(self.not_callable(callee));
                };
                let (name, params, body) = (name.clone(), params.clone(), body.clone());
                if params.len() != argc {
                    return Err(self.no_method(&name, args_at, argc));
                }
                if self.depth >= MAX_CALL_DEPTH {
                    return Err(RuntimeError::StackOverflow);
                }

                self.depth += 1;
                let env = Env {
                    params: &params,
                    base: args_at,
                };
                let result = self.eval(boundary, &body, Some(env));
                self.depth -= 1;
                result?;
                Ok(self.pop())
            }
            _ => Err(self.not_callable(callee)),
        }
    }

    fn construct(&mut self, ty: TypeId, args_at: usize, argc: usize) -> Result<Value, RuntimeError> {
        let Some(info) = self.types.get(ty) else {
            return Err(RuntimeError::Method(format!("unknown type {}", ty)));
        };
        let name = info.name.clone();
        let arity_matches = info.fields().len() == argc;
        if !self.types.is_struct(ty) || !arity_matches {
            return Err(self.no_method(&name, args_at, argc));
        }
        let fields = self.stack[args_at..args_at + argc].to_vec();
        Ok(Value::Gc(self.heap.alloc(HeapObject::Struct { ty, fields })))
    }

    fn not_callable(&mut self, callee: Value) -> RuntimeError {
        RuntimeError::Method(format!(
            "objects of type {} are not callable",
            self.type_label(callee)
        ))
    }

    fn no_method(&mut self, name: &str, args_at: usize, argc: usize) -> RuntimeError {
        let args = self.stack[args_at..args_at + argc].to_vec();
        let signature: Vec<String> = args
            .into_iter()
            .map(|arg| format!("::{}", self.type_label(arg)))
            .collect();
        RuntimeError::Method(format!(
            "no method matching {}({})",
            name,
            signature.join(", ")
        ))
    }

    /// Polls for a pending interrupt and collects if the heap asks for it.
    pub(crate) fn safepoint(&mut self, boundary: &BoundaryView<'_, Value>) -> Result<(), RuntimeError> {
        if boundary.take_interrupt() {
            return Err(RuntimeError::Interrupted);
        }
        if self.heap.should_collect() {
            self.collect(boundary);
        }
        Ok(())
    }

    pub(crate) fn collect(&mut self, boundary: &BoundaryView<'_, Value>) {
        let mut roots = self.stack.clone();
        roots.extend(self.base.map(Value::Gc));
        roots.extend(self.main.map(Value::Gc));
        boundary.visit_roots(&mut |value: &Value| roots.push(*value));
        self.heap.collect(&roots);
    }

    /// Builds the managed exception object for `err`.
    pub(crate) fn exception_value(&mut self, err: RuntimeError) -> Value {
        let (ty, fields) = match err {
            RuntimeError::Thrown(value) => return value,
            RuntimeError::Message(msg) => (builtin::ERROR_EXCEPTION, vec![self.alloc_string(msg)]),
            RuntimeError::StackOverflow => (
                builtin::ERROR_EXCEPTION,
                vec![self.alloc_string("stack overflow")],
            ),
            RuntimeError::Undefined(name) => (builtin::UNDEF_VAR_ERROR, vec![self.alloc_string(name)]),
            RuntimeError::Method(msg) => (builtin::METHOD_ERROR, vec![self.alloc_string(msg)]),
            RuntimeError::Field { ty, field, .. } => (
                builtin::FIELD_ERROR,
                vec![Value::Type(ty), self.alloc_string(field)],
            ),
            RuntimeError::Bounds(index) => (builtin::BOUNDS_ERROR, vec![Value::Int(index)]),
            RuntimeError::Argument(msg) => (builtin::ARGUMENT_ERROR, vec![self.alloc_string(msg)]),
            RuntimeError::Parse(msg) => (builtin::PARSE_ERROR, vec![self.alloc_string(msg)]),
            RuntimeError::Type(msg) => (builtin::TYPE_ERROR, vec![self.alloc_string(msg)]),
            RuntimeError::DivideByZero => (builtin::DIVIDE_ERROR, Vec::new()),
            RuntimeError::Interrupted => (builtin::INTERRUPT_EXCEPTION, Vec::new()),
        };
        Value::Gc(self.heap.alloc(HeapObject::Struct { ty, fields }))
    }

    fn lookup_name(&self, name: &str, env: Option<Env<'_>>) -> Option<Value> {
        if let Some(env) = env {
            if let Some(i) = env.params.iter().position(|p| &**p == name) {
                return self.stack.get(env.base + i).copied();
            }
        }
        self.lookup_global_name(name)
    }

    /// Global lookup: `Main` first, then `Base`.
    pub(crate) fn lookup_global_name(&self, name: &str) -> Option<Value> {
        [self.main, self.base]
            .into_iter()
            .flatten()
            .find_map(|module| self.module_binding(module, name))
    }

    pub(crate) fn module_binding(&self, module: GcHandle, name: &str) -> Option<Value> {
        match self.heap.get(module)? {
            HeapObject::Module { bindings, .. } => bindings.get(name).copied(),
            _ => None,
        }
    }

    /// Binds `name` in the module receiving definitions.
    pub(crate) fn bind_global(&mut self, name: &str, value: Value) -> Result<(), RuntimeError> {
        let module = self
            .current
            .ok_or_else(|| RuntimeError::Message("runtime is not bootstrapped".to_string()))?;
        match self.heap.get_mut(module) {
            Some(HeapObject::Module { bindings, .. }) => {
                bindings.insert(name.into(), value);
                Ok(())
            }
            _ => Err(RuntimeError::Message("definition module was freed".to_string())),
        }
    }

    /// `value.name`: a module binding or a struct field.
    pub(crate) fn field_of(&mut self, value: Value, name: &str) -> Result<Value, RuntimeError> {
        if let Some(handle) = value.as_handle() {
            if let Some(HeapObject::Module { .. }) = self.heap.get(handle) {
                return self
                    .module_binding(handle, name)
                    .ok_or_else(|| RuntimeError::Undefined(name.to_string()));
            }
        }

        let ty = self.type_id_of(value);
        let index = self
            .types
            .field_index(ty, name)
            .ok_or_else(|| RuntimeError::Field {
                ty,
                type_name: self.types.name(ty).to_string(),
                field: name.to_string(),
            })?;
        self.nth_field(value, index)
    }

    /// Zero-based positional field read on structs and tuples.
    pub(crate) fn nth_field(&mut self, value: Value, index: usize) -> Result<Value, RuntimeError> {
        let fields = match value.as_handle().and_then(|h| self.heap.get(h)) {
            Some(HeapObject::Struct { fields, .. }) => fields,
            Some(HeapObject::Tuple(items)) => items,
            _ => {
                return Err(RuntimeError::Type(format!(
                    "{} has no fields",
                    self.type_label(value)
                )));
            }
        };
        fields
            .get(index)
            .copied()
            .ok_or(RuntimeError::Bounds(index as i64 + 1))
    }

    /// One-based element read on arrays and tuples.
    fn index_value(&mut self, target: Value, index: Value) -> Result<Value, RuntimeError> {
        let Value::Int(i) = index else {
            return Err(RuntimeError::Type(format!(
                "index must be Int64, got {}",
                self.type_label(index)
            )));
        };
        let items = match target.as_handle().and_then(|h| self.heap.get(h)) {
            Some(HeapObject::Array { data, .. }) => data,
            Some(HeapObject::Tuple(items)) => items,
            _ => {
                return Err(RuntimeError::Method(format!(
                    "no method matching getindex(::{}, ::Int64)",
                    self.type_label(target)
                )));
            }
        };
        usize::try_from(i)
            .ok()
            .and_then(|i| i.checked_sub(1))
            .and_then(|i| items.get(i).copied())
            .ok_or(RuntimeError::Bounds(i))
    }

    /// Element type shared by every value, or `Any`.
    pub(crate) fn common_type(&mut self, values: &[Value]) -> TypeId {
        let mut common = None;
        for value in values {
            let ty = self.type_id_of(*value);
            match common {
                None => common = Some(ty),
                Some(seen) if seen == ty => {}
                Some(_) => return builtin::ANY,
            }
        }
        common.unwrap_or(builtin::ANY)
    }
}

#[cfg(test)]
mod interp_test;
