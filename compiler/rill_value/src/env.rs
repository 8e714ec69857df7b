//! Environment chains.
//!
//! An [`Env`] is a persistent linked list of `Arc` frames: pushing a frame
//! never copies or mutates the parent, so closures can hold on to any
//! prefix of the chain. Value frames hold parameters, loop variables and
//! pattern captures; group frames hold the lazily initialized slots of a
//! `let` block.

use std::sync::Arc;
use std::thread::{self, ThreadId};

use parking_lot::Mutex;
use rill_ir::ops::OpId;
use smallvec::SmallVec;

use crate::{Captured, Value};

#[derive(Clone, Default)]
pub struct Env(Option<Arc<Frame>>);

pub struct Frame {
    pub parent: Env,
    pub kind: FrameKind,
}

pub enum FrameKind {
    Values(SmallVec<[Value; 4]>),
    Group(GroupFrame),
}

impl Env {
    pub fn empty() -> Env {
        Env(None)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    #[must_use]
    pub fn push_values(&self, values: SmallVec<[Value; 4]>) -> Env {
        self.push(FrameKind::Values(values))
    }

    /// Push the group frame of a `let` op. `captures` are those of the
    /// activation creating it; slot initializers run against them.
    #[must_use]
    pub fn push_group(&self, op: OpId, slots: usize, captures: Arc<[Captured]>) -> Env {
        self.push(FrameKind::Group(GroupFrame::new(op, slots, captures)))
    }

    fn push(&self, kind: FrameKind) -> Env {
        Env(Some(Arc::new(Frame {
            parent: self.clone(),
            kind,
        })))
    }

    /// The frame `depth` levels above the innermost one.
    pub fn frame(&self, depth: u32) -> Option<&Arc<Frame>> {
        let mut frame = self.0.as_ref()?;
        for _ in 0..depth {
            frame = frame.parent.0.as_ref()?;
        }
        Some(frame)
    }

    /// Slot of a value frame.
    pub fn value(&self, depth: u32, slot: u32) -> Option<&Value> {
        match &self.frame(depth)?.kind {
            FrameKind::Values(values) => values.get(slot as usize),
            FrameKind::Group(_) => None,
        }
    }

    /// The chain whose innermost frame is `frame`.
    pub fn from_frame(frame: Arc<Frame>) -> Env {
        Env(Some(frame))
    }

    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut current = &self.0;
        while let Some(frame) = current {
            depth += 1;
            current = &frame.parent.0;
        }
        depth
    }
}

impl Frame {
    pub fn group(&self) -> Option<&GroupFrame> {
        match &self.kind {
            FrameKind::Group(group) => Some(group),
            FrameKind::Values(_) => None,
        }
    }
}

/// Slots of one `let` block, initialized on first read.
pub struct GroupFrame {
    op: OpId,
    slots: Box<[SlotCell]>,
    captures: Arc<[Captured]>,
}

impl GroupFrame {
    pub fn new(op: OpId, slots: usize, captures: Arc<[Captured]>) -> Self {
        GroupFrame {
            op,
            slots: (0..slots).map(|_| SlotCell::new()).collect(),
            captures,
        }
    }

    /// The `let` op whose slots this frame holds.
    pub fn op(&self) -> OpId {
        self.op
    }

    pub fn captures(&self) -> &Arc<[Captured]> {
        &self.captures
    }

    pub fn slot(&self, slot: u32) -> Option<&SlotCell> {
        self.slots.get(slot as usize)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum SlotState {
    Pending,
    Running(ThreadId),
    Ready(Value),
}

/// Outcome of [`SlotCell::claim`].
#[derive(Debug, PartialEq)]
pub enum Claim {
    Ready(Value),
    /// The caller must evaluate the initializer and [`SlotCell::fill`] the
    /// slot. `owner` is false when another thread is already evaluating
    /// it; the caller then evaluates independently.
    Evaluate { owner: bool },
    /// The current thread is already evaluating this slot.
    Cycle,
}

/// A write-once cell. The lock is never held while evaluating.
pub struct SlotCell {
    state: Mutex<SlotState>,
}

impl SlotCell {
    pub fn new() -> Self {
        SlotCell {
            state: Mutex::new(SlotState::Pending),
        }
    }

    pub fn claim(&self) -> Claim {
        let me = thread::current().id();
        let mut state = self.state.lock();
        match &*state {
            SlotState::Ready(value) => Claim::Ready(value.clone()),
            SlotState::Running(owner) if *owner == me => Claim::Cycle,
            SlotState::Running(_) => Claim::Evaluate { owner: false },
            SlotState::Pending => {
                *state = SlotState::Running(me);
                Claim::Evaluate { owner: true }
            }
        }
    }

    /// Store `value` unless another evaluation got there first, and return
    /// the stored value.
    pub fn fill(&self, value: Value) -> Value {
        let mut state = self.state.lock();
        if let SlotState::Ready(existing) = &*state {
            return existing.clone();
        }
        *state = SlotState::Ready(value.clone());
        value
    }

    /// Give up a claim after a failed evaluation so the next read retries.
    pub fn release(&self) {
        let me = thread::current().id();
        let mut state = self.state.lock();
        if matches!(&*state, SlotState::Running(owner) if *owner == me) {
            *state = SlotState::Pending;
        }
    }

    pub fn state(&self) -> SlotState {
        self.state.lock().clone()
    }
}

impl Default for SlotCell {
    fn default() -> Self {
        SlotCell::new()
    }
}

#[cfg(test)]
mod tests;
