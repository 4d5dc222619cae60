//! Reference managed runtime.
//!
//! `FluxRuntime` is a small tree-walking interpreter with a mark-and-sweep
//! heap. It implements [`ManagedRuntime`] so the embedding boundary can be
//! driven end to end.
//!
//! # Rooting
//! Collection only happens at safe points (statement starts and call
//! entries). At a safe point every live value is in one of three places: the
//! interpreter's value stack, the `Base`/`Main` modules, or a root reported by
//! the [`BoundaryView`]. Intermediate results are therefore kept on the value
//! stack, never only in Rust locals, across anything that may reach a safe
//! point.

use std::rc::Rc;

use crate::{
    embed::{BoundaryView, ManagedError, ManagedResult, ManagedRuntime, RuntimeConfig},
    runtime::{
        builtin_function::BuiltinFunction,
        error::RuntimeError,
        gc::{GcHandle, GcHeap, HeapObject},
        scheduler::Scheduler,
        types::{TypeId, TypeRegistry, builtin},
        value::{BuiltinId, Value},
    },
    syntax,
};

pub mod builtin_function;
pub mod builtins;
pub mod error;
pub mod gc;
mod image;
pub mod interp;
mod render;
pub mod scheduler;
pub mod types;
pub mod value;

pub type BuiltinFn = fn(&mut FluxRuntime, Vec<Value>) -> Result<Value, RuntimeError>;

pub struct FluxRuntime {
    pub(crate) heap: GcHeap,
    pub(crate) types: TypeRegistry,
    pub(crate) stack: Vec<Value>,
    pub(crate) base: Option<GcHandle>,
    pub(crate) main: Option<GcHandle>,
    /// Module that receives top-level definitions.
    pub(crate) current: Option<GcHandle>,
    pub(crate) scheduler: Scheduler,
    pub(crate) config: RuntimeConfig,
    pub(crate) depth: usize,
    image_digest: Option<[u8; 32]>,
    output: Option<Vec<String>>,
}

impl Default for FluxRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl FluxRuntime {
    pub fn new() -> Self {
        Self {
            heap: GcHeap::new(),
            types: TypeRegistry::new(),
            stack: Vec::with_capacity(256),
            base: None,
            main: None,
            current: None,
            scheduler: Scheduler::new(),
            config: RuntimeConfig::default(),
            depth: 0,
            image_digest: None,
            output: None,
        }
    }

    pub fn is_bootstrapped(&self) -> bool {
        self.base.is_some()
    }

    /// SHA-256 of the system image that was loaded, as lowercase hex.
    pub fn image_digest(&self) -> Option<String> {
        self.image_digest.as_ref().map(image::to_hex)
    }

    pub fn heap(&self) -> &GcHeap {
        &self.heap
    }

    pub fn heap_mut(&mut self) -> &mut GcHeap {
        &mut self.heap
    }

    pub fn heap_live_count(&self) -> usize {
        self.heap.live_count()
    }

    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Makes `println` collect lines instead of writing to stdout.
    pub fn capture_output(&mut self) {
        self.output.get_or_insert_with(Vec::new);
    }

    pub fn take_output(&mut self) -> Vec<String> {
        self.output.as_mut().map(std::mem::take).unwrap_or_default()
    }

    pub(crate) fn write_line(&mut self, line: String) {
        match &mut self.output {
            Some(lines) => lines.push(line),
            None => println!("{}", line),
        }
    }

    pub(crate) fn pop(&mut self) -> Value {
        self.stack.pop().unwrap_or(Value::Nothing)
    }

    pub(crate) fn alloc_string(&mut self, text: impl Into<Rc<str>>) -> Value {
        Value::Gc(self.heap.alloc(HeapObject::Str(text.into())))
    }

    pub(crate) fn alloc_array(&mut self, elem: TypeId, dims: Vec<usize>, data: Vec<Value>) -> Value {
        Value::Gc(self.heap.alloc(HeapObject::Array { elem, dims, data }))
    }

    pub(crate) fn string_ref(&self, value: Value) -> Option<&str> {
        match self.heap.get(value.as_handle()?) {
            Some(HeapObject::Str(text)) => Some(text),
            _ => None,
        }
    }

    /// The runtime type of `value`. Array and tuple types are interned on
    /// first use.
    pub fn type_id_of(&mut self, value: Value) -> TypeId {
        match value {
            Value::Int(_) => builtin::INT64,
            Value::Float(_) => builtin::FLOAT64,
            Value::Bool(_) => builtin::BOOL,
            Value::Nothing => builtin::NOTHING,
            Value::Type(_) => builtin::DATATYPE,
            Value::Builtin(_) => builtin::FUNCTION,
            Value::Gc(handle) => match self.heap.get(handle) {
                Some(HeapObject::Str(_)) => builtin::STRING,
                Some(HeapObject::Array { elem, dims, .. }) => {
                    let (elem, rank) = (*elem, dims.len());
                    self.types.array_type(elem, rank)
                }
                Some(HeapObject::Tuple(items)) => {
                    let items = items.clone();
                    let elems: Vec<TypeId> = items.iter().map(|v| self.type_id_of(*v)).collect();
                    self.types.tuple_type(&elems)
                }
                Some(HeapObject::Struct { ty, .. }) => *ty,
                Some(HeapObject::Module { .. }) => builtin::MODULE,
                Some(HeapObject::Function { .. }) => builtin::FUNCTION,
                Some(HeapObject::Code(_)) => builtin::CODE,
                None => builtin::ANY,
            },
        }
    }

    pub(crate) fn type_label(&mut self, value: Value) -> String {
        let ty = self.type_id_of(value);
        self.types.name(ty).to_string()
    }

    fn resolve_module(&self, name: &str) -> Option<GcHandle> {
        match name {
            "Base" => self.base,
            "Main" => self.main,
            _ => self
                .lookup_global_name(name)
                .and_then(Value::as_handle)
                .filter(|h| matches!(self.heap.get(*h), Some(HeapObject::Module { .. }))),
        }
    }

    /// Clears interpreter state left by a boundary operation and converts a
    /// failure into the managed exception.
    fn finish<T>(
        &mut self,
        mark: usize,
        depth: usize,
        result: Result<T, RuntimeError>,
    ) -> Result<T, ManagedError<Value>> {
        self.stack.truncate(mark);
        self.depth = depth;
        result.map_err(|err| ManagedError::new(self.exception_value(err)))
    }

    fn bind_builtins(&mut self) -> Result<(), RuntimeError> {
        for (index, BuiltinFunction { name, .. }) in builtins::BUILTINS.iter().enumerate() {
            self.bind_global(name, Value::Builtin(BuiltinId(index as u16)))?;
        }
        let named: Vec<(TypeId, Rc<str>)> = self
            .types
            .named()
            .map(|(id, info)| (id, info.name.clone()))
            .collect();
        for (id, name) in named {
            self.bind_global(&name, Value::Type(id))?;
        }
        Ok(())
    }

    fn bind_args(&mut self, args: &[String]) -> Result<(), RuntimeError> {
        let data: Vec<Value> = args.iter().map(|arg| self.alloc_string(arg.as_str())).collect();
        let argv = self.alloc_array(builtin::STRING, vec![data.len()], data);
        self.bind_global("ARGS", argv)
    }
}

impl ManagedRuntime for FluxRuntime {
    type Value = Value;

    fn bootstrap(
        &mut self,
        boundary: &BoundaryView<'_, Value>,
        config: &RuntimeConfig,
    ) -> Result<(), String> {
        if self.is_bootstrapped() {
            return Ok(());
        }
        let types = self.types.clone();
        let previous = std::mem::replace(&mut self.config, config.clone());
        if let Some(threshold) = config.gc_threshold {
            self.heap.set_threshold(threshold);
        }

        let base = self.heap.alloc(HeapObject::Module {
            name: "Base".into(),
            bindings: Default::default(),
        });
        let main = self.heap.alloc(HeapObject::Module {
            name: "Main".into(),
            bindings: Default::default(),
        });
        self.base = Some(base);
        self.main = Some(main);
        self.current = Some(base);

        let setup = self
            .bind_builtins()
            .and_then(|_| self.bind_global("Base", Value::Gc(base)))
            .and_then(|_| self.bind_global("Main", Value::Gc(main)))
            .and_then(|_| self.bind_args(&config.args));
        let loaded = setup
            .map_err(|err| err.to_string())
            .and_then(|_| self.load_image(boundary));
        if let Err(err) = loaded {
            // Nothing survives a failed bootstrap; the modules become garbage.
            self.base = None;
            self.main = None;
            self.current = None;
            self.types = types;
            self.config = previous;
            self.image_digest = None;
            return Err(err);
        }
        self.current = Some(main);
        Ok(())
    }

    fn parse(&mut self, _boundary: &BoundaryView<'_, Value>, source: &str) -> ManagedResult<Value> {
        match syntax::parse(source) {
            Ok(program) => Ok(Value::Gc(self.heap.alloc(HeapObject::Code(Rc::new(program))))),
            Err(err) => {
                let exception = self.exception_value(RuntimeError::Parse(err.to_string()));
                Err(ManagedError::new(exception))
            }
        }
    }

    fn eval_toplevel(
        &mut self,
        boundary: &BoundaryView<'_, Value>,
        form: &Value,
    ) -> ManagedResult<Value> {
        let (mark, depth) = (self.stack.len(), self.depth);
        let program = match form.as_handle().and_then(|h| self.heap.get(h)) {
            Some(HeapObject::Code(program)) => Ok(program.clone()),
            _ => Err(RuntimeError::Type(format!(
                "expected Code, got {}",
                self.type_label(*form)
            ))),
        };
        let result = program.and_then(|program| self.run_program(boundary, &program));
        self.finish(mark, depth, result)
    }

    fn apply(
        &mut self,
        boundary: &BoundaryView<'_, Value>,
        target: &Value,
        args: &[Value],
    ) -> ManagedResult<Value> {
        let (mark, depth) = (self.stack.len(), self.depth);
        self.stack.push(*target);
        self.stack.extend_from_slice(args);
        let result = self.invoke(boundary, mark, args.len());
        self.finish(mark, depth, result)
    }

    fn resolve_field(
        &mut self,
        _boundary: &BoundaryView<'_, Value>,
        ty: &Value,
        name: &str,
    ) -> Result<usize, ManagedError<Value>> {
        let (mark, depth) = (self.stack.len(), self.depth);
        let result = match ty {
            Value::Type(id) => self.types.field_index(*id, name).ok_or_else(|| {
                RuntimeError::Field {
                    ty: *id,
                    type_name: self.types.name(*id).to_string(),
                    field: name.to_string(),
                }
            }),
            other => Err(RuntimeError::Type(format!(
                "expected DataType, got {}",
                self.type_label(*other)
            ))),
        };
        self.finish(mark, depth, result)
    }

    fn get_nth_field(
        &mut self,
        _boundary: &BoundaryView<'_, Value>,
        value: &Value,
        index: usize,
    ) -> ManagedResult<Value> {
        let (mark, depth) = (self.stack.len(), self.depth);
        let result = self.nth_field(*value, index);
        self.finish(mark, depth, result)
    }

    fn type_of(&mut self, value: &Value) -> Value {
        Value::Type(self.type_id_of(*value))
    }

    fn type_name(&self, ty: &Value) -> Option<String> {
        match ty {
            Value::Type(id) => self.types.get(*id).map(|info| info.base_name().to_string()),
            Value::Gc(handle) => match self.heap.get(*handle) {
                Some(HeapObject::Tuple(_)) => Some("Tuple".to_string()),
                _ => None,
            },
            _ => None,
        }
    }

    fn array_eltype(&self, array: &Value) -> Option<Value> {
        match self.heap.get(array.as_handle()?)? {
            HeapObject::Array { elem, .. } => Some(Value::Type(*elem)),
            _ => None,
        }
    }

    fn array_rank(&self, array: &Value) -> Option<usize> {
        match self.heap.get(array.as_handle()?)? {
            HeapObject::Array { dims, .. } => Some(dims.len()),
            _ => None,
        }
    }

    fn array_dim(&self, array: &Value, axis: usize) -> Option<usize> {
        match self.heap.get(array.as_handle()?)? {
            HeapObject::Array { dims, .. } => dims.get(axis).copied(),
            _ => None,
        }
    }

    fn string_data(&self, value: &Value) -> Option<&str> {
        self.string_ref(*value)
    }

    fn lookup_global(&self, module: &str, name: &str) -> Option<Value> {
        self.module_binding(self.resolve_module(module)?, name)
    }

    fn is_callable(&self, value: &Value) -> bool {
        match value {
            Value::Builtin(id) => builtins::get(*id).is_some(),
            Value::Type(id) => self.types.is_struct(*id),
            Value::Gc(handle) => matches!(self.heap.get(*handle), Some(HeapObject::Function { .. })),
            _ => false,
        }
    }

    fn render(&self, value: &Value) -> String {
        self.repr(*value)
    }

    fn collect_garbage(&mut self, boundary: &BoundaryView<'_, Value>) {
        self.collect(boundary);
    }
}
