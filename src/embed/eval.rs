use crate::embed::{Embedding, ManagedResult, ManagedRuntime, trace::Operation};

/// Module and name of the scheduler's cooperative yield function.
pub const YIELD_FUNCTION: (&str, &str) = ("Base", "yield");

impl<R: ManagedRuntime> Embedding<R> {
    /// Parses and evaluates one snippet of source text.
    ///
    /// The parsed form is rooted while it is evaluated. Parse and evaluation
    /// failures both come back as the managed exception.
    pub fn try_evaluate(&self, source: &str) -> ManagedResult<R::Value> {
        let result = {
            let frame = self.roots.push_frame(1);
            self.with_runtime(|runtime, boundary| {
                let form = runtime.parse(boundary, source)?;
                frame.write(0, form.clone());
                runtime.eval_toplevel(boundary, &form)
            })
        };
        self.settle(Operation::Evaluate(source), result)
    }

    /// Evaluates `source`; on failure returns `None` and leaves the exception
    /// in the channel.
    pub fn evaluate(&self, source: &str) -> Option<R::Value> {
        self.try_evaluate(source).ok()
    }

    /// Gives the managed scheduler a chance to run other tasks.
    ///
    /// A no-op until the yield function is bound.
    pub fn yield_now(&self) {
        let (module, name) = YIELD_FUNCTION;
        let yield_fn = {
            let runtime = self.runtime.borrow();
            runtime
                .lookup_global(module, name)
                .filter(|f| runtime.is_callable(f))
        };
        if let Some(f) = yield_fn {
            self.call0(&f);
        }
    }
}
