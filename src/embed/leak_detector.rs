use std::sync::atomic::{AtomicUsize, Ordering};

/// Process-wide counters of boundary and heap activity.
///
/// Pushed and popped root frames must match once the host has unwound; a
/// difference is a frame that was never released.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LeakStats {
    pub frames_pushed: usize,
    pub frames_popped: usize,
    pub boundary_calls: usize,
    pub managed_errors: usize,
    pub gc_allocations: usize,
}

impl LeakStats {
    pub fn open_frames(&self) -> usize {
        self.frames_pushed.saturating_sub(self.frames_popped)
    }
}

static FRAMES_PUSHED: AtomicUsize = AtomicUsize::new(0);
static FRAMES_POPPED: AtomicUsize = AtomicUsize::new(0);
static BOUNDARY_CALLS: AtomicUsize = AtomicUsize::new(0);
static MANAGED_ERRORS: AtomicUsize = AtomicUsize::new(0);
static GC_ALLOCATIONS: AtomicUsize = AtomicUsize::new(0);

pub fn record_frame_push() {
    FRAMES_PUSHED.fetch_add(1, Ordering::Relaxed);
}

pub fn record_frame_pop() {
    FRAMES_POPPED.fetch_add(1, Ordering::Relaxed);
}

pub fn record_boundary_call() {
    BOUNDARY_CALLS.fetch_add(1, Ordering::Relaxed);
}

pub fn record_managed_error() {
    MANAGED_ERRORS.fetch_add(1, Ordering::Relaxed);
}

pub fn record_gc_alloc() {
    GC_ALLOCATIONS.fetch_add(1, Ordering::Relaxed);
}

pub fn snapshot() -> LeakStats {
    LeakStats {
        frames_pushed: FRAMES_PUSHED.load(Ordering::Relaxed),
        frames_popped: FRAMES_POPPED.load(Ordering::Relaxed),
        boundary_calls: BOUNDARY_CALLS.load(Ordering::Relaxed),
        managed_errors: MANAGED_ERRORS.load(Ordering::Relaxed),
        gc_allocations: GC_ALLOCATIONS.load(Ordering::Relaxed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embed::RootStack;

    #[test]
    fn root_frames_are_counted_without_a_runtime() {
        let before = snapshot();
        let stack: RootStack<u8> = RootStack::new();
        drop(stack.push_frame(1));
        let id = stack.push_frame_manual(0);
        stack.pop_frame(id).unwrap();

        let after = snapshot();
        assert!(after.frames_pushed >= before.frames_pushed + 2);
        assert!(after.frames_popped >= before.frames_popped + 2);
    }

    #[test]
    fn open_frames_never_underflows() {
        let stats = LeakStats {
            frames_pushed: 1,
            frames_popped: 3,
            ..LeakStats::default()
        };
        assert_eq!(stats.open_frames(), 0);
    }
}
