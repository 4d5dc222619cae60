pub mod embed;
pub mod runtime;
pub mod syntax;

pub use embed::{Embedding, InitError, ManagedError, ManagedRuntime, RuntimeConfig};
pub use runtime::{FluxRuntime, value::Value};

/// An embedding driving the reference runtime.
pub type FluxEmbedding = Embedding<FluxRuntime>;
