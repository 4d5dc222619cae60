/// Handle into the GC heap.
///
/// A `GcHandle` is a copyable slot index. It says nothing about liveness:
/// once the object behind it is collected the slot may be reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GcHandle(pub(crate) u32);

impl GcHandle {
    /// Returns the raw heap slot index backing this handle.
    pub fn index(self) -> u32 {
        self.0
    }
}
