use crate::{
    embed::leak_detector,
    runtime::{
        gc::{gc_handle::GcHandle, heap_entry::HeapEntry, heap_object::HeapObject},
        value::Value,
    },
};

const DEFAULT_GC_THRESHOLD: usize = 10_000;
pub(crate) const MIN_GC_THRESHOLD: usize = 1024;

/// Stop-the-world mark-and-sweep garbage collector heap.
///
/// Every non-scalar value is allocated here. Allocation never collects; the
/// runtime checks [`Self::should_collect`] at safe points, where all live
/// values are reachable from the roots it passes to [`Self::collect`].
pub struct GcHeap {
    entries: Vec<Option<HeapEntry>>,
    free_list: Vec<u32>,
    allocation_count: usize,
    gc_threshold: usize,
    gc_enabled: bool,
    stress: bool,
    total_collections: usize,
    total_allocations: usize,
}

impl Default for GcHeap {
    fn default() -> Self {
        Self::new()
    }
}

impl GcHeap {
    /// Creates a new GC heap with default collection settings.
    ///
    /// Defaults:
    /// - threshold: `10_000` allocations
    /// - GC enabled: `true`
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            free_list: Vec::new(),
            allocation_count: 0,
            gc_threshold: DEFAULT_GC_THRESHOLD,
            gc_enabled: true,
            stress: false,
            total_collections: 0,
            total_allocations: 0,
        }
    }

    /// Creates a new heap with a custom GC allocation threshold.
    ///
    /// Unlike [`Self::set_threshold`], this does not clamp to `MIN_GC_THRESHOLD`.
    pub fn with_threshold(threshold: usize) -> Self {
        let mut heap = Self::new();
        heap.gc_threshold = threshold;
        heap
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.gc_enabled = enabled
    }

    /// With stress on, every safe point collects regardless of the threshold.
    pub fn set_stress(&mut self, stress: bool) {
        self.stress = stress
    }

    /// Sets the allocation threshold that triggers collection.
    ///
    /// Values below `MIN_GC_THRESHOLD` are clamped upward.
    pub fn set_threshold(&mut self, threshold: usize) {
        self.gc_threshold = threshold.max(MIN_GC_THRESHOLD)
    }

    pub fn threshold(&self) -> usize {
        self.gc_threshold
    }

    /// Returns `true` when GC is enabled and the threshold was reached.
    pub fn should_collect(&self) -> bool {
        self.gc_enabled && (self.stress || self.allocation_count >= self.gc_threshold)
    }

    /// Allocates a new heap object and returns a stable handle to it.
    ///
    /// Freed slots are reused through the internal free-list before growing
    /// the storage vector.
    pub fn alloc(&mut self, object: HeapObject) -> GcHandle {
        leak_detector::record_gc_alloc();
        self.allocation_count += 1;
        self.total_allocations += 1;

        let entry = HeapEntry {
            object,
            marked: false,
        };

        if let Some(idx) = self.free_list.pop() {
            self.entries[idx as usize] = Some(entry);
            GcHandle(idx)
        } else {
            let idx = self.entries.len() as u32;
            self.entries.push(Some(entry));
            GcHandle(idx)
        }
    }

    /// The live object behind `handle`, or `None` for a freed slot.
    pub fn get(&self, handle: GcHandle) -> Option<&HeapObject> {
        self.entries
            .get(handle.0 as usize)?
            .as_ref()
            .map(|entry| &entry.object)
    }

    pub fn get_mut(&mut self, handle: GcHandle) -> Option<&mut HeapObject> {
        self.entries
            .get_mut(handle.0 as usize)?
            .as_mut()
            .map(|entry| &mut entry.object)
    }

    pub fn is_live(&self, handle: GcHandle) -> bool {
        self.get(handle).is_some()
    }

    pub fn live_count(&self) -> usize {
        self.entries.iter().filter(|entry| entry.is_some()).count()
    }

    pub fn total_allocations(&self) -> usize {
        self.total_allocations
    }

    pub fn total_collections(&self) -> usize {
        self.total_collections
    }

    /// Runs a full stop-the-world mark-and-sweep collection. Everything not
    /// reachable from `roots` is freed.
    pub fn collect(&mut self, roots: &[Value]) {
        let mut worklist: Vec<GcHandle> = Vec::with_capacity(16);
        for root in roots {
            if let Value::Gc(handle) = root {
                worklist.push(*handle);
            }
        }
        self.mark(worklist);

        let live_before = self.live_count();
        self.sweep();
        let live_after = self.live_count();
        let collected = live_before.saturating_sub(live_after);

        self.total_collections += 1;
        self.allocation_count = 0;

        self.adapt_threshold(collected, live_before);
    }

    fn mark(&mut self, mut worklist: Vec<GcHandle>) {
        while let Some(handle) = worklist.pop() {
            let Some(Some(entry)) = self.entries.get_mut(handle.index() as usize) else {
                continue;
            };
            // Mark first so shared nodes are visited once.
            if entry.marked {
                continue;
            }
            entry.marked = true;

            entry.object.for_each_child(|child| {
                if let Value::Gc(child) = child {
                    worklist.push(child);
                }
            });
        }
    }

    fn sweep(&mut self) {
        for (i, slot) in self.entries.iter_mut().enumerate() {
            if let Some(entry) = slot {
                if entry.marked {
                    entry.marked = false;
                } else {
                    *slot = None;
                    self.free_list.push(i as u32);
                }
            }
        }
    }

    fn adapt_threshold(&mut self, collected: usize, total_before: usize) {
        if total_before == 0 {
            return;
        }

        let ratio = collected as f64 / total_before as f64;
        if ratio < 0.25 {
            self.gc_threshold = (self.gc_threshold * 2).min(1_000_000);
        } else if ratio > 0.75 {
            self.gc_threshold = (self.gc_threshold / 2).max(MIN_GC_THRESHOLD)
        }
    }
}
