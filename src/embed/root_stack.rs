//! Root frames for managed handles held by native code.
//!
//! Native stack frames are opaque to the collector, so every handle the host
//! (or the boundary itself) keeps across a managed call is registered here.
//! Frames nest in strict stack order and are normally owned by a
//! [`FrameGuard`], which pops its frame when it goes out of scope, on the
//! error path included.

use std::{
    cell::{Cell, RefCell},
    fmt,
};

use crate::embed::{
    error::{UsageError, fatal_usage},
    leak_detector,
};

/// Identity of one pushed root frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameId(u64);

impl FrameId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

struct RootFrame<V> {
    id: FrameId,
    slots: Box<[Option<V>]>,
}

pub struct RootStack<V> {
    frames: RefCell<Vec<RootFrame<V>>>,
    next_id: Cell<u64>,
}

impl<V> Default for RootStack<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> RootStack<V> {
    pub fn new() -> Self {
        Self {
            frames: RefCell::new(Vec::new()),
            next_id: Cell::new(0),
        }
    }

    /// Pushes a frame of `capacity` empty slots, popped when the guard drops.
    pub fn push_frame(&self, capacity: usize) -> FrameGuard<'_, V> {
        let id = self.push_frame_manual(capacity);
        FrameGuard {
            stack: self,
            id,
            capacity,
        }
    }

    /// Pushes a frame that the caller must pop with [`Self::pop_frame`].
    pub fn push_frame_manual(&self, capacity: usize) -> FrameId {
        let id = FrameId(self.next_id.get());
        self.next_id.set(id.0 + 1);

        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);
        self.frames.borrow_mut().push(RootFrame {
            id,
            slots: slots.into_boxed_slice(),
        });
        leak_detector::record_frame_push();
        id
    }

    /// Stores `handle` in slot `index` of a live frame.
    pub fn write_slot(&self, id: FrameId, index: usize, handle: V) -> Result<(), UsageError> {
        let mut frames = self.frames.borrow_mut();
        // Almost always the top frame; search downwards for hosts rooting into an outer frame.
        let frame = frames
            .iter_mut()
            .rev()
            .find(|frame| frame.id == id)
            .ok_or(UsageError::StaleFrame(id))?;
        let capacity = frame.slots.len();
        match frame.slots.get_mut(index) {
            Some(slot) => {
                *slot = Some(handle);
                Ok(())
            }
            None => Err(UsageError::SlotOutOfRange { index, capacity }),
        }
    }

    /// Pops the top frame, which must be `id`.
    pub fn pop_frame(&self, id: FrameId) -> Result<(), UsageError> {
        let mut frames = self.frames.borrow_mut();
        let top = match frames.last() {
            Some(frame) => frame.id,
            None => return Err(UsageError::EmptyRootStack(id)),
        };
        if top != id {
            if frames.iter().any(|frame| frame.id == id) {
                return Err(UsageError::FrameOutOfOrder { popped: id, top });
            }
            return Err(UsageError::StaleFrame(id));
        }
        frames.pop();
        leak_detector::record_frame_pop();
        Ok(())
    }

    /// Number of live frames.
    pub fn depth(&self) -> usize {
        self.frames.borrow().len()
    }

    /// Number of occupied slots across all live frames.
    pub fn live_slots(&self) -> usize {
        self.frames
            .borrow()
            .iter()
            .map(|frame| frame.slots.iter().filter(|slot| slot.is_some()).count())
            .sum()
    }

    /// Calls `visit` for every occupied slot, outermost frame first.
    pub fn visit(&self, visit: &mut dyn FnMut(&V)) {
        let frames = self.frames.borrow();
        for frame in frames.iter() {
            for handle in frame.slots.iter().flatten() {
                visit(handle);
            }
        }
    }
}

impl<V: Clone> RootStack<V> {
    /// Reads slot `index` of a live frame; `None` for an empty slot.
    pub fn read_slot(&self, id: FrameId, index: usize) -> Result<Option<V>, UsageError> {
        let frames = self.frames.borrow();
        let frame = frames
            .iter()
            .rev()
            .find(|frame| frame.id == id)
            .ok_or(UsageError::StaleFrame(id))?;
        match frame.slots.get(index) {
            Some(slot) => Ok(slot.clone()),
            None => Err(UsageError::SlotOutOfRange {
                index,
                capacity: frame.slots.len(),
            }),
        }
    }
}

/// Scoped ownership of one root frame.
///
/// Guards drop in reverse lexical order, which keeps pops in stack order. A
/// guard moved out of its scope and dropped late is caught as
/// [`UsageError::FrameOutOfOrder`] and treated as fatal.
#[must_use = "dropping the guard pops the frame immediately"]
pub struct FrameGuard<'a, V> {
    stack: &'a RootStack<V>,
    id: FrameId,
    capacity: usize,
}

impl<V> FrameGuard<'_, V> {
    pub fn id(&self) -> FrameId {
        self.id
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn try_write(&self, index: usize, handle: V) -> Result<(), UsageError> {
        self.stack.write_slot(self.id, index, handle)
    }

    /// Roots `handle` in slot `index`. Out-of-range indices are fatal.
    #[track_caller]
    pub fn write(&self, index: usize, handle: V) {
        if let Err(err) = self.try_write(index, handle) {
            fatal_usage(err);
        }
    }
}

impl<V: Clone> FrameGuard<'_, V> {
    pub fn read(&self, index: usize) -> Option<V> {
        self.stack.read_slot(self.id, index).ok().flatten()
    }
}

impl<V> Drop for FrameGuard<'_, V> {
    fn drop(&mut self) {
        if let Err(err) = self.stack.pop_frame(self.id) {
            // Never double-panic while already unwinding.
            if !std::thread::panicking() {
                fatal_usage(err);
            }
        }
    }
}
