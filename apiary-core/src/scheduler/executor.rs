//! Action polling loop

use core::fmt;

use heapless::Vec;

/// Default scheduler capacity
pub const MAX_ACTIONS: usize = 8;

/// Delay reported by a scheduler with nothing registered (1 s)
pub const IDLE_DELAY_US: u32 = 1_000_000;

/// An independently polled subsystem
pub trait Action {
    /// Do one bounded slice of work
    ///
    /// Returns the number of microseconds until this action next wants to
    /// be polled; 0 asks to be called again immediately.
    fn poll(&mut self) -> u32;

    /// Short name for logs
    fn name(&self) -> &'static str;
}

impl<T: Action + ?Sized> Action for &mut T {
    fn poll(&mut self) -> u32 {
        (**self).poll()
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// Scheduler registration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SchedulerError {
    /// Every slot is taken
    Full,
}

impl fmt::Display for SchedulerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchedulerError::Full => f.write_str("scheduler has no room for another action"),
        }
    }
}

/// Fixed-order action scheduler
///
/// Holds exclusive borrows of every registered action for its lifetime.
/// Actions are never removed.
pub struct Scheduler<'a, const N: usize = MAX_ACTIONS> {
    actions: Vec<&'a mut dyn Action, N>,
}

impl<'a, const N: usize> Default for Scheduler<'a, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, const N: usize> Scheduler<'a, N> {
    /// Create an empty scheduler
    pub const fn new() -> Self {
        Self {
            actions: Vec::new(),
        }
    }

    /// Append an action to the polling order
    pub fn register(&mut self, action: &'a mut dyn Action) -> Result<(), SchedulerError> {
        self.actions
            .push(action)
            .map_err(|_| SchedulerError::Full)
    }

    /// Poll every action once, in registration order
    ///
    /// Returns the smallest requested delay, or [`IDLE_DELAY_US`] when
    /// nothing is registered.
    pub fn tick(&mut self) -> u32 {
        if self.actions.is_empty() {
            return IDLE_DELAY_US;
        }
        self.actions
            .iter_mut()
            .map(|action| action.poll())
            .fold(u32::MAX, u32::min)
    }

    /// Number of registered actions
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Registered action names, in polling order
    pub fn names(&self) -> impl Iterator<Item = &'static str> + use<'_, 'a, N> {
        self.actions.iter().map(|action| action.name())
    }
}
