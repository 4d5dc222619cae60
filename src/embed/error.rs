use std::{fmt, io, path::PathBuf};

use thiserror::Error;

use crate::embed::root_stack::FrameId;

/// A managed exception that unwound out of the runtime.
///
/// Carries the exception value itself; the boundary deposits it into the
/// exception channel before handing control back to the host.
#[derive(Clone, PartialEq)]
pub struct ManagedError<V> {
    pub exception: V,
}

impl<V> ManagedError<V> {
    pub fn new(exception: V) -> Self {
        Self { exception }
    }

    pub fn into_exception(self) -> V {
        self.exception
    }
}

impl<V: fmt::Debug> fmt::Debug for ManagedError<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ManagedError({:?})", self.exception)
    }
}

impl<V: fmt::Debug> fmt::Display for ManagedError<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "managed exception in transit: {:?}", self.exception)
    }
}

impl<V: fmt::Debug> std::error::Error for ManagedError<V> {}

/// Protocol violations committed by the native caller.
///
/// These indicate a bug in the host, never a managed-side failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UsageError {
    #[error("sigatomic_end called in non-sigatomic region")]
    SigatomicUnderflow,
    #[error("root frame {popped} popped while frame {top} is on top of the root stack")]
    FrameOutOfOrder { popped: FrameId, top: FrameId },
    #[error("root frame {0} popped from an empty root stack")]
    EmptyRootStack(FrameId),
    #[error("root frame {0} is not live")]
    StaleFrame(FrameId),
    #[error("root slot {index} out of range for frame with {capacity} slots")]
    SlotOutOfRange { index: usize, capacity: usize },
}

/// Reports a usage error as a fatal condition.
#[cold]
#[track_caller]
pub fn fatal_usage(err: UsageError) -> ! {
    panic!("flux-embed: fatal usage error: {err}")
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read runtime config `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid runtime config: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum InitError {
    #[error("could not determine the runtime home directory (pass one or set FLUX_HOME)")]
    HomeNotFound,
    #[error("system image not found: {}", .0.display())]
    ImageNotFound(PathBuf),
    #[error("runtime bootstrap failed: {0}")]
    Bootstrap(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
}
