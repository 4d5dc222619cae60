//! Signal-atomic regions.
//!
//! While the depth is non-zero, asynchronous interrupts requested through an
//! [`InterruptHandle`] stay pending; the runtime only observes them at a safe
//! point once the outermost region has ended.

use std::{
    cell::Cell,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use crate::embed::error::{UsageError, fatal_usage};

pub struct SignalGate {
    depth: Cell<u32>,
    pending: Arc<AtomicBool>,
}

impl Default for SignalGate {
    fn default() -> Self {
        Self::new()
    }
}

impl SignalGate {
    pub fn new() -> Self {
        Self {
            depth: Cell::new(0),
            pending: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn begin(&self) {
        self.depth.set(self.depth.get() + 1);
    }

    pub fn try_end(&self) -> Result<(), UsageError> {
        match self.depth.get() {
            0 => Err(UsageError::SigatomicUnderflow),
            depth => {
                self.depth.set(depth - 1);
                Ok(())
            }
        }
    }

    /// Ends the innermost region. An unmatched `end` is fatal.
    #[track_caller]
    pub fn end(&self) {
        if let Err(err) = self.try_end() {
            fatal_usage(err);
        }
    }

    pub fn depth(&self) -> u32 {
        self.depth.get()
    }

    pub fn is_deferring(&self) -> bool {
        self.depth.get() > 0
    }

    /// Opens a region that ends when the returned guard drops.
    pub fn scoped(&self) -> SigatomicScope<'_> {
        self.begin();
        SigatomicScope { gate: self }
    }

    pub fn interrupt_handle(&self) -> InterruptHandle {
        InterruptHandle {
            pending: Arc::clone(&self.pending),
        }
    }

    pub fn interrupt_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    /// Consumes a pending interrupt, unless a region is deferring it.
    pub fn take_interrupt(&self) -> bool {
        if self.is_deferring() {
            return false;
        }
        self.pending.swap(false, Ordering::AcqRel)
    }
}

pub struct SigatomicScope<'a> {
    gate: &'a SignalGate,
}

impl Drop for SigatomicScope<'_> {
    fn drop(&mut self) {
        if self.gate.try_end().is_err() && !std::thread::panicking() {
            fatal_usage(UsageError::SigatomicUnderflow);
        }
    }
}

/// Thread-safe handle for requesting an interrupt of the running evaluation.
///
/// `request` only stores a flag, so it is safe to call from a signal handler.
#[derive(Debug, Clone)]
pub struct InterruptHandle {
    pending: Arc<AtomicBool>,
}

impl InterruptHandle {
    pub fn request(&self) {
        self.pending.store(true, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_regions_balance_to_zero() {
        let gate = SignalGate::new();
        gate.begin();
        gate.begin();
        assert_eq!(gate.depth(), 2);
        gate.end();
        assert!(gate.is_deferring());
        gate.end();
        assert_eq!(gate.depth(), 0);
    }

    #[test]
    fn lone_end_is_usage_error() {
        let gate = SignalGate::new();
        assert_eq!(gate.try_end(), Err(UsageError::SigatomicUnderflow));
        assert_eq!(gate.depth(), 0);
    }

    #[test]
    #[should_panic(expected = "sigatomic_end called in non-sigatomic region")]
    fn lone_end_is_fatal() {
        SignalGate::new().end();
    }

    #[test]
    fn interrupt_waits_for_outermost_region() {
        let gate = SignalGate::new();
        let handle = gate.interrupt_handle();

        gate.begin();
        gate.begin();
        handle.request();
        assert!(!gate.take_interrupt());
        gate.end();
        assert!(!gate.take_interrupt());
        gate.end();

        assert!(gate.take_interrupt());
        assert!(!gate.take_interrupt());
    }

    #[test]
    fn scoped_region_ends_on_drop() {
        let gate = SignalGate::new();
        {
            let _outer = gate.scoped();
            let _inner = gate.scoped();
            assert_eq!(gate.depth(), 2);
        }
        assert_eq!(gate.depth(), 0);
    }

    #[test]
    fn handle_can_be_sent_to_another_thread() {
        let gate = SignalGate::new();
        let handle = gate.interrupt_handle();
        std::thread::spawn(move || handle.request())
            .join()
            .expect("interrupt thread panicked");
        assert!(gate.interrupt_pending());
        assert!(gate.take_interrupt());
    }
}
