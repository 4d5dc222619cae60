use crate::embed::{Embedding, ManagedResult, ManagedRuntime, trace::Operation};

impl<R: ManagedRuntime> Embedding<R> {
    pub fn type_of(&self, value: &R::Value) -> R::Value {
        self.runtime.borrow_mut().type_of(value)
    }

    /// Declared name of the type `ty`; a tuple value reports `"Tuple"`.
    pub fn type_name(&self, ty: &R::Value) -> Option<String> {
        self.runtime.borrow().type_name(ty)
    }

    /// Name of `value`'s runtime type.
    pub fn typeof_name(&self, value: &R::Value) -> Option<String> {
        let mut runtime = self.runtime.borrow_mut();
        let ty = runtime.type_of(value);
        runtime.type_name(&ty)
    }

    pub fn array_eltype(&self, array: &R::Value) -> Option<R::Value> {
        self.runtime.borrow().array_eltype(array)
    }

    pub fn array_rank(&self, array: &R::Value) -> Option<usize> {
        self.runtime.borrow().array_rank(array)
    }

    /// Extent of `array` along the zero-based `axis`. The axis is checked by
    /// the runtime, not here.
    pub fn array_dimension(&self, array: &R::Value, axis: usize) -> Option<usize> {
        self.runtime.borrow().array_dim(array, axis)
    }

    pub fn string_data(&self, value: &R::Value) -> Option<String> {
        self.runtime.borrow().string_data(value).map(str::to_owned)
    }

    /// Reads the field called `name`, resolved against `value`'s type.
    pub fn try_get_field(&self, value: &R::Value, name: &str) -> ManagedResult<R::Value> {
        let result = {
            let frame = self.roots.push_frame(2);
            frame.write(0, value.clone());
            self.with_runtime(|runtime, boundary| {
                let ty = runtime.type_of(value);
                frame.write(1, ty.clone());
                let index = runtime.resolve_field(boundary, &ty, name)?;
                runtime.get_nth_field(boundary, value, index)
            })
        };
        self.settle(Operation::GetField(name), result)
    }

    /// Reads a field; an unknown field or non-struct value returns `None`
    /// and leaves the exception in the channel.
    pub fn get_field(&self, value: &R::Value, name: &str) -> Option<R::Value> {
        self.try_get_field(value, name).ok()
    }
}
