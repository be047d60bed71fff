//! Shared single-threaded handle
//!
//! The scheduler polls the multiplexer for housekeeping while the
//! controller reads and writes lines through it. Both hold a [`Shared`]
//! copy of one `RefCell`. Polls never nest, so borrows never overlap; a
//! clashing borrow is treated as "nothing to do" instead of a panic.

use core::cell::RefCell;

use apiary_protocol::Line;

use crate::net::LineChannel;
use crate::scheduler::Action;

/// Copyable handle to a `RefCell`-guarded component
pub struct Shared<'a, T>(&'a RefCell<T>);

impl<T> Clone for Shared<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Shared<'_, T> {}

impl<'a, T> Shared<'a, T> {
    pub fn new(cell: &'a RefCell<T>) -> Self {
        Self(cell)
    }

    /// Run `f` with exclusive access, or return `None` if already borrowed
    pub fn with<R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        self.0.try_borrow_mut().ok().map(|mut inner| f(&mut *inner))
    }
}

impl<T: LineChannel> LineChannel for Shared<'_, T> {
    fn read_line(&mut self, line: &mut Line) -> bool {
        self.with(|inner| inner.read_line(line)).unwrap_or(false)
    }

    fn write(&mut self, bytes: &[u8]) -> usize {
        self.with(|inner| inner.write(bytes)).unwrap_or(0)
    }

    fn flush(&mut self) {
        self.with(|inner| inner.flush());
    }
}

impl<T: Action> Action for Shared<'_, T> {
    fn poll(&mut self) -> u32 {
        self.with(|inner| inner.poll()).unwrap_or(0)
    }

    fn name(&self) -> &'static str {
        self.0.try_borrow().map(|inner| inner.name()).unwrap_or("shared")
    }
}
