//! Host-facing embedding boundary.
//!
//! An [`Embedding`] owns everything the host and the managed runtime share
//! across the native/managed frontier: the root stack, the exception in
//! transit, the signal-atomic gate and the process configuration. Every
//! boundary operation is a method on it, implemented in the submodules:
//!
//! - [`lifecycle`]: one-shot initialization
//! - [`eval`]: source evaluation and cooperative yield
//! - [`dispatch`]: generic and fixed-arity calls
//! - [`introspect`]: field, array, string and type-name queries
//!
//! Operations that can raise come in two shapes. `try_*` methods return a
//! [`ManagedError`]; the plain forms return `Option` and leave the exception
//! readable through [`Embedding::exception_occurred`]. Both shapes deposit the
//! exception into the channel, so the next successful call clears it.
//!
//! `Embedding` is neither `Send` nor `Sync`: one native thread drives it.

use std::cell::{Cell, OnceCell, Ref, RefCell, RefMut};

pub mod collaborator;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod eval;
pub mod exception;
pub mod introspect;
pub mod leak_detector;
pub mod lifecycle;
pub mod root_stack;
pub mod sigatomic;
mod trace;
pub mod version;

pub use collaborator::{BoundaryView, ManagedResult, ManagedRuntime};
pub use config::RuntimeConfig;
pub use error::{ConfigError, InitError, ManagedError, UsageError};
pub use exception::ExceptionChannel;
pub use root_stack::{FrameGuard, FrameId, RootStack};
pub use sigatomic::{InterruptHandle, SigatomicScope, SignalGate};

use trace::Operation;

pub struct Embedding<R: ManagedRuntime> {
    runtime: RefCell<R>,
    roots: RootStack<R::Value>,
    exception: ExceptionChannel<R::Value>,
    signals: SignalGate,
    config: OnceCell<RuntimeConfig>,
    trace: Cell<bool>,
}

impl<R: ManagedRuntime> Embedding<R> {
    /// Wraps an uninitialized runtime. Call one of the `initialize` methods
    /// before evaluating anything.
    pub fn new(runtime: R) -> Self {
        Self {
            runtime: RefCell::new(runtime),
            roots: RootStack::new(),
            exception: ExceptionChannel::new(),
            signals: SignalGate::new(),
            config: OnceCell::new(),
            trace: Cell::new(false),
        }
    }

    pub fn set_trace(&self, enabled: bool) {
        self.trace.set(enabled);
    }

    pub fn trace_enabled(&self) -> bool {
        self.trace.get()
    }

    pub fn roots(&self) -> &RootStack<R::Value> {
        &self.roots
    }

    /// Roots up to `capacity` host-held handles until the guard drops.
    pub fn push_frame(&self, capacity: usize) -> FrameGuard<'_, R::Value> {
        self.roots.push_frame(capacity)
    }

    pub fn exception_occurred(&self) -> Option<R::Value> {
        self.exception.occurred()
    }

    pub fn exception_clear(&self) {
        self.exception.clear();
    }

    pub fn signals(&self) -> &SignalGate {
        &self.signals
    }

    pub fn sigatomic_begin(&self) {
        self.signals.begin();
    }

    /// Ends a signal-atomic region; an unmatched end is fatal.
    #[track_caller]
    pub fn sigatomic_end(&self) {
        self.signals.end();
    }

    pub fn try_sigatomic_end(&self) -> Result<(), UsageError> {
        self.signals.try_end()
    }

    pub fn sigatomic_depth(&self) -> u32 {
        self.signals.depth()
    }

    pub fn interrupt_handle(&self) -> InterruptHandle {
        self.signals.interrupt_handle()
    }

    pub fn runtime(&self) -> Ref<'_, R> {
        self.runtime.borrow()
    }

    pub fn runtime_mut(&self) -> RefMut<'_, R> {
        self.runtime.borrow_mut()
    }

    pub fn into_runtime(self) -> R {
        self.runtime.into_inner()
    }

    /// Forces a collection; every rooted handle survives it.
    pub fn collect_garbage(&self) {
        self.with_runtime(|runtime, boundary| runtime.collect_garbage(boundary));
    }

    /// Human-readable rendering of a managed value.
    pub fn render(&self, value: &R::Value) -> String {
        self.runtime.borrow().render(value)
    }

    fn with_runtime<T>(&self, f: impl FnOnce(&mut R, &BoundaryView<'_, R::Value>) -> T) -> T {
        let boundary = BoundaryView::new(&self.roots, &self.exception, &self.signals);
        let mut runtime = self.runtime.borrow_mut();
        f(&mut runtime, &boundary)
    }

    /// Applies the channel protocol to the outcome of one boundary operation.
    fn settle<T>(
        &self,
        op: Operation<'_>,
        result: Result<T, ManagedError<R::Value>>,
    ) -> Result<T, ManagedError<R::Value>> {
        leak_detector::record_boundary_call();
        match &result {
            Ok(_) => self.exception.clear(),
            Err(err) => {
                leak_detector::record_managed_error();
                self.exception.set(err.exception.clone());
            }
        }

        if self.trace.get() {
            let outcome = match &result {
                Ok(_) => String::from("ok"),
                Err(err) => format!("raised {}", self.render(&err.exception)),
            };
            trace::boundary_event(&op, self.roots.depth(), &outcome);
        }
        result
    }
}

#[cfg(test)]
mod test_runtime;
