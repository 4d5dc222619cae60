use std::slice;

use crate::embed::{Embedding, ManagedResult, ManagedRuntime, trace::Operation};

impl<R: ManagedRuntime> Embedding<R> {
    /// Calls `target` with `args`.
    ///
    /// The target and every argument stay rooted in one frame of
    /// `args.len() + 1` slots for the whole call; the frame is popped on the
    /// success and the error path alike.
    pub fn try_call(&self, target: &R::Value, args: &[R::Value]) -> ManagedResult<R::Value> {
        #[cfg(debug_assertions)]
        let depth_before = self.roots.depth();

        let result = {
            let frame = self.roots.push_frame(args.len() + 1);
            frame.write(0, target.clone());
            for (i, arg) in args.iter().enumerate() {
                frame.write(i + 1, arg.clone());
            }
            self.with_runtime(|runtime, boundary| runtime.apply(boundary, target, args))
        };

        #[cfg(debug_assertions)]
        debug_assert_eq!(self.roots.depth(), depth_before, "unbalanced root frames");

        self.settle(Operation::Call { arity: args.len() }, result)
    }

    /// Calls `target`; on failure returns `None` and leaves the exception in
    /// the channel.
    pub fn call(&self, target: &R::Value, args: &[R::Value]) -> Option<R::Value> {
        self.try_call(target, args).ok()
    }

    pub fn call0(&self, f: &R::Value) -> Option<R::Value> {
        self.call(f, &[])
    }

    pub fn call1(&self, f: &R::Value, a: &R::Value) -> Option<R::Value> {
        self.call(f, slice::from_ref(a))
    }

    pub fn call2(&self, f: &R::Value, a: &R::Value, b: &R::Value) -> Option<R::Value> {
        self.call(f, &[a.clone(), b.clone()])
    }

    pub fn call3(
        &self,
        f: &R::Value,
        a: &R::Value,
        b: &R::Value,
        c: &R::Value,
    ) -> Option<R::Value> {
        self.call(f, &[a.clone(), b.clone(), c.clone()])
    }
}
