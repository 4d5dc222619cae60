//! The runtime-side interface consumed by the embedding boundary.

use std::fmt;

use crate::embed::{
    config::RuntimeConfig, error::ManagedError, exception::ExceptionChannel,
    root_stack::RootStack, sigatomic::SignalGate,
};

pub type ManagedResult<V> = Result<V, ManagedError<V>>;

/// What the runtime sees of the boundary while it runs.
///
/// The collector must treat everything reported by [`Self::visit_roots`] as
/// live. Evaluation should poll [`Self::take_interrupt`] at safe points.
pub struct BoundaryView<'a, V> {
    roots: &'a RootStack<V>,
    exception: &'a ExceptionChannel<V>,
    signals: &'a SignalGate,
}

impl<'a, V> BoundaryView<'a, V> {
    pub fn new(
        roots: &'a RootStack<V>,
        exception: &'a ExceptionChannel<V>,
        signals: &'a SignalGate,
    ) -> Self {
        Self {
            roots,
            exception,
            signals,
        }
    }

    /// Reports every rooted handle plus the in-transit exception.
    pub fn visit_roots(&self, visit: &mut dyn FnMut(&V)) {
        self.roots.visit(visit);
        self.exception.visit(visit);
    }

    pub fn take_interrupt(&self) -> bool {
        self.signals.take_interrupt()
    }

    pub fn sigatomic_depth(&self) -> u32 {
        self.signals.depth()
    }
}

/// A managed runtime that can be driven through an [`crate::embed::Embedding`].
///
/// Fallible operations report managed exceptions as [`ManagedError`]; they
/// must never panic on bad managed input.
pub trait ManagedRuntime {
    type Value: Clone + fmt::Debug;

    /// Sets up heap, types and evaluator, and loads the system image.
    fn bootstrap(
        &mut self,
        boundary: &BoundaryView<'_, Self::Value>,
        config: &RuntimeConfig,
    ) -> Result<(), String>;

    /// Turns source text into a managed, evaluable form.
    fn parse(
        &mut self,
        boundary: &BoundaryView<'_, Self::Value>,
        source: &str,
    ) -> ManagedResult<Self::Value>;

    fn eval_toplevel(
        &mut self,
        boundary: &BoundaryView<'_, Self::Value>,
        form: &Self::Value,
    ) -> ManagedResult<Self::Value>;

    fn apply(
        &mut self,
        boundary: &BoundaryView<'_, Self::Value>,
        target: &Self::Value,
        args: &[Self::Value],
    ) -> ManagedResult<Self::Value>;

    fn resolve_field(
        &mut self,
        boundary: &BoundaryView<'_, Self::Value>,
        ty: &Self::Value,
        name: &str,
    ) -> Result<usize, ManagedError<Self::Value>>;

    fn get_nth_field(
        &mut self,
        boundary: &BoundaryView<'_, Self::Value>,
        value: &Self::Value,
        index: usize,
    ) -> ManagedResult<Self::Value>;

    fn type_of(&mut self, value: &Self::Value) -> Self::Value;

    /// Declared name of a type value. Tuples report a generic `"Tuple"`.
    fn type_name(&self, ty: &Self::Value) -> Option<String>;

    fn array_eltype(&self, array: &Self::Value) -> Option<Self::Value>;

    fn array_rank(&self, array: &Self::Value) -> Option<usize>;

    /// Extent along zero-based `axis`.
    fn array_dim(&self, array: &Self::Value, axis: usize) -> Option<usize>;

    fn string_data(&self, value: &Self::Value) -> Option<&str>;

    fn lookup_global(&self, module: &str, name: &str) -> Option<Self::Value>;

    fn is_callable(&self, value: &Self::Value) -> bool;

    /// Display form used by tracing and host tools.
    fn render(&self, value: &Self::Value) -> String;

    /// Runs a full collection now.
    fn collect_garbage(&mut self, boundary: &BoundaryView<'_, Self::Value>);
}
