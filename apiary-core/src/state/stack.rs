//! Bounded state stack
//!
//! Invariants:
//! - never empty: the bottom frame is `ACCEPT_COMMANDS` after construction
//! - at most [`MAX_STACK_DEPTH`] ordinary frames; a push past the bound
//!   becomes a forced `ERROR_STATE` frame instead
//! - popping the last frame leaves a single `ERROR_STATE` frame
//!
//! Frames are stamped with the interrupt epoch current when they were
//! pushed. The controller bumps the epoch on every interrupting command, so
//! a handler can tell whether its frame has been overtaken.

use core::fmt::Debug;

use heapless::Vec;

use super::argument::Argument;

/// Maximum number of ordinary frames
pub const MAX_STACK_DEPTH: usize = 10;

/// One slot above the bound is reserved for the forced error frame
const STACK_CAPACITY: usize = MAX_STACK_DEPTH + 1;

/// Per-variant closed set of states
pub trait StateTag: Copy + Eq + Debug + 'static {
    /// Idle state that reads and dispatches commands
    const ACCEPT_COMMANDS: Self;
    /// Permanent fault state
    const ERROR_STATE: Self;
    /// Every state, used to validate handler tables
    const ALL: &'static [Self];

    /// Human readable name for status reports and logs
    fn name(self) -> &'static str;
}

/// Why the stack was forced into `ERROR_STATE`
///
/// Stored as the integer argument of the error frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(i32)]
pub enum ErrorCause {
    Overflow = 1,
    Underflow = 2,
    BadArgument = 3,
    UnknownCommand = 4,
    MissingHandler = 5,
}

/// Stack entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Frame<S> {
    pub state: S,
    pub arg: Argument,
    epoch: u32,
}

impl<S> Frame<S> {
    /// Interrupt epoch this frame was pushed in
    pub fn epoch(&self) -> u32 {
        self.epoch
    }
}

/// LIFO of [`Frame`]s owned by one controller
#[derive(Debug, Clone)]
pub struct StateStack<S: StateTag> {
    frames: Vec<Frame<S>, STACK_CAPACITY>,
    epoch: u32,
}

impl<S: StateTag> Default for StateStack<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: StateTag> StateStack<S> {
    /// Create a stack holding a single `ACCEPT_COMMANDS` frame
    pub fn new() -> Self {
        let mut stack = Self {
            frames: Vec::new(),
            epoch: 0,
        };
        stack.push(S::ACCEPT_COMMANDS, Argument::None);
        stack
    }

    /// Push a frame, or force `ERROR_STATE` if the stack is full
    pub fn push(&mut self, state: S, arg: Argument) {
        if self.frames.len() >= MAX_STACK_DEPTH {
            self.push_error(ErrorCause::Overflow);
            return;
        }
        let frame = self.frame(state, arg);
        // Cannot fail below MAX_STACK_DEPTH
        let _ = self.frames.push(frame);
    }

    /// Pop the top frame; an emptied stack gets an `ERROR_STATE` frame
    pub fn pop(&mut self) {
        self.frames.pop();
        if self.frames.is_empty() {
            self.push_error(ErrorCause::Underflow);
        }
    }

    /// Swap the top frame for another, keeping its epoch
    ///
    /// Used when a task turns itself into its polling variant.
    pub fn replace_top(&mut self, state: S, arg: Argument) {
        match self.frames.last_mut() {
            Some(top) => {
                top.state = state;
                top.arg = arg;
            }
            None => self.push(state, arg),
        }
    }

    /// Pop every frame above the bottom one
    pub fn reset(&mut self) {
        self.frames.truncate(1);
    }

    /// Force an `ERROR_STATE` frame on top
    ///
    /// Uses the reserved slot above the bound; if even that is taken the
    /// top frame is overwritten.
    pub fn push_error(&mut self, cause: ErrorCause) {
        let frame = self.frame(S::ERROR_STATE, Argument::Int(cause as i32));
        if self.frames.is_full() {
            if let Some(top) = self.frames.last_mut() {
                *top = frame;
            }
        } else {
            let _ = self.frames.push(frame);
        }
    }

    /// Top frame
    pub fn top(&self) -> Frame<S> {
        match self.frames.last() {
            Some(frame) => *frame,
            None => self.frame(S::ERROR_STATE, Argument::None),
        }
    }

    pub fn top_state(&self) -> S {
        self.top().state
    }

    pub fn top_arg(&self) -> Argument {
        self.top().arg
    }

    /// Overwrite the top frame's argument
    pub fn set_top_arg(&mut self, arg: Argument) {
        if let Some(top) = self.frames.last_mut() {
            top.arg = arg;
        }
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Frames from bottom to top
    pub fn iter(&self) -> impl Iterator<Item = &Frame<S>> {
        self.frames.iter()
    }

    /// Check if the stack has been forced into `ERROR_STATE`
    pub fn in_error(&self) -> bool {
        self.top_state() == S::ERROR_STATE
    }

    /// Record that an interrupting command arrived
    pub fn mark_interrupt(&mut self) {
        self.epoch = self.epoch.wrapping_add(1);
    }

    /// Current interrupt epoch
    pub fn epoch(&self) -> u32 {
        self.epoch
    }

    /// Check if an interrupting command arrived after the top frame was pushed
    pub fn top_cancelled(&self) -> bool {
        self.top().epoch != self.epoch
    }

    fn frame(&self, state: S, arg: Argument) -> Frame<S> {
        Frame {
            state,
            arg,
            epoch: self.epoch,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::vec::Vec as StdVec;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum TestState {
        Accept,
        Work,
        Error,
    }

    impl StateTag for TestState {
        const ACCEPT_COMMANDS: Self = TestState::Accept;
        const ERROR_STATE: Self = TestState::Error;
        const ALL: &'static [Self] = &[TestState::Accept, TestState::Work, TestState::Error];

        fn name(self) -> &'static str {
            match self {
                TestState::Accept => "ACCEPT",
                TestState::Work => "WORK",
                TestState::Error => "ERROR",
            }
        }
    }

    #[test]
    fn test_new_stack_holds_accept_commands() {
        let stack: StateStack<TestState> = StateStack::new();
        assert_eq!(stack.depth(), 1);
        assert_eq!(stack.top_state(), TestState::Accept);
        assert_eq!(stack.top_arg(), Argument::None);
    }

    #[test]
    fn test_pop_single_frame_yields_error() {
        let mut stack: StateStack<TestState> = StateStack::new();
        stack.pop();
        assert_eq!(stack.depth(), 1);
        assert_eq!(stack.top_state(), TestState::Error);
        assert_eq!(stack.top_arg(), Argument::Int(ErrorCause::Underflow as i32));
    }

    #[test]
    fn test_push_past_bound_forces_error() {
        let mut stack: StateStack<TestState> = StateStack::new();
        for i in 1..MAX_STACK_DEPTH {
            stack.push(TestState::Work, Argument::Int(i as i32));
        }
        assert_eq!(stack.depth(), MAX_STACK_DEPTH);
        assert_eq!(stack.top_state(), TestState::Work);

        stack.push(TestState::Work, Argument::None);
        assert_eq!(stack.depth(), MAX_STACK_DEPTH + 1);
        assert_eq!(stack.top_state(), TestState::Error);
        assert_eq!(stack.top_arg(), Argument::Int(ErrorCause::Overflow as i32));

        // Further pushes keep the stack pinned in error
        stack.push(TestState::Work, Argument::None);
        assert_eq!(stack.depth(), MAX_STACK_DEPTH + 1);
        assert!(stack.in_error());
    }

    #[test]
    fn test_reset_keeps_bottom_frame() {
        let mut stack: StateStack<TestState> = StateStack::new();
        stack.push(TestState::Work, Argument::Int(1));
        stack.push(TestState::Work, Argument::Int(2));
        stack.reset();
        assert_eq!(stack.depth(), 1);
        assert_eq!(stack.top_state(), TestState::Accept);
    }

    #[test]
    fn test_replace_top_keeps_epoch() {
        let mut stack: StateStack<TestState> = StateStack::new();
        stack.push(TestState::Work, Argument::Int(1));
        let epoch = stack.top().epoch();
        stack.mark_interrupt();
        stack.replace_top(TestState::Work, Argument::Int(2));
        assert_eq!(stack.top().epoch(), epoch);
        assert_eq!(stack.top_arg(), Argument::Int(2));
        assert!(stack.top_cancelled());
    }

    #[test]
    fn test_cancellation_tracks_epoch() {
        let mut stack: StateStack<TestState> = StateStack::new();
        stack.push(TestState::Work, Argument::None);
        assert!(!stack.top_cancelled());

        stack.mark_interrupt();
        assert!(stack.top_cancelled());

        // A frame pushed after the interrupt is not cancelled
        stack.push(TestState::Work, Argument::None);
        assert!(!stack.top_cancelled());
        stack.pop();
        assert!(stack.top_cancelled());
    }

    #[derive(Debug, Clone)]
    enum Op {
        Push,
        Pop,
        Reset,
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![Just(Op::Push), Just(Op::Pop), Just(Op::Reset)]
    }

    proptest! {
        #[test]
        fn test_depth_never_exceeds_bound(ops in proptest::collection::vec(op_strategy(), 0..64)) {
            let mut stack: StateStack<TestState> = StateStack::new();
            for op in ops {
                match op {
                    Op::Push => stack.push(TestState::Work, Argument::None),
                    Op::Pop => stack.pop(),
                    Op::Reset => stack.reset(),
                }
                prop_assert!(stack.depth() >= 1);
                if stack.depth() > MAX_STACK_DEPTH {
                    prop_assert_eq!(stack.depth(), MAX_STACK_DEPTH + 1);
                    prop_assert_eq!(stack.top_state(), TestState::Error);
                }
                let ordinary: StdVec<_> = stack
                    .iter()
                    .filter(|f| f.state != TestState::Error)
                    .collect();
                prop_assert!(ordinary.len() <= MAX_STACK_DEPTH);
            }
        }
    }
}
