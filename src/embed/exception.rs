use std::cell::RefCell;

/// Single-slot holder for the exception currently in transit.
///
/// A new exception overwrites the previous one; hosts that need every error
/// must read and clear between calls.
pub struct ExceptionChannel<V> {
    slot: RefCell<Option<V>>,
}

impl<V> Default for ExceptionChannel<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> ExceptionChannel<V> {
    pub fn new() -> Self {
        Self {
            slot: RefCell::new(None),
        }
    }

    pub fn clear(&self) {
        self.slot.borrow_mut().take();
    }

    pub fn is_set(&self) -> bool {
        self.slot.borrow().is_some()
    }

    pub(crate) fn set(&self, exception: V) {
        *self.slot.borrow_mut() = Some(exception);
    }

    /// Removes and returns the in-transit exception.
    pub fn take(&self) -> Option<V> {
        self.slot.borrow_mut().take()
    }

    /// The in-transit exception is a collector root while it sits here.
    pub(crate) fn visit(&self, visit: &mut dyn FnMut(&V)) {
        if let Some(exception) = self.slot.borrow().as_ref() {
            visit(exception);
        }
    }
}

impl<V: Clone> ExceptionChannel<V> {
    pub fn occurred(&self) -> Option<V> {
        self.slot.borrow().clone()
    }
}
