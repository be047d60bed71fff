//! Handler tables and interrupt policy

use core::fmt;

use apiary_protocol::Command;
use heapless::Vec;

/// Capacity of one handler table
pub const MAX_HANDLERS: usize = 16;

/// Which table a [`TableError`] refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TableKind {
    States,
    Commands,
}

/// Handler table defects found at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TableError {
    /// No handler for this tag
    Missing { table: TableKind, tag: &'static str },
    /// More than one handler for this tag
    Duplicate { table: TableKind, tag: &'static str },
    /// Handler registered for a tag outside the variant's set
    Unknown { table: TableKind, tag: &'static str },
    /// More entries than [`MAX_HANDLERS`]
    Overflow { table: TableKind },
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableKind::States => f.write_str("state"),
            TableKind::Commands => f.write_str("command"),
        }
    }
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableError::Missing { table, tag } => write!(f, "no {} handler for {}", table, tag),
            TableError::Duplicate { table, tag } => {
                write!(f, "duplicate {} handler for {}", table, tag)
            }
            TableError::Unknown { table, tag } => {
                write!(f, "{} handler for unlisted tag {}", table, tag)
            }
            TableError::Overflow { table } => write!(f, "too many {} handlers", table),
        }
    }
}

/// Tag to handler mapping
///
/// Built with [`HandlerTable::with`] and checked once with
/// [`HandlerTable::validate`]. Duplicates are kept at build time so that
/// validation can report them.
#[derive(Clone)]
pub struct HandlerTable<K, F> {
    entries: Vec<(K, F), MAX_HANDLERS>,
    overflowed: bool,
}

impl<K: Copy + Eq, F: Copy> Default for HandlerTable<K, F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Copy + Eq, F: Copy> HandlerTable<K, F> {
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            overflowed: false,
        }
    }

    /// Add an entry
    pub fn with(mut self, key: K, handler: F) -> Self {
        if self.entries.push((key, handler)).is_err() {
            self.overflowed = true;
        }
        self
    }

    /// Handler for `key`
    pub fn get(&self, key: K) -> Option<F> {
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, handler)| *handler)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check that every key in `all` has exactly one handler and nothing
    /// else is present
    pub fn validate(
        &self,
        table: TableKind,
        all: &[K],
        name: impl Fn(K) -> &'static str,
    ) -> Result<(), TableError> {
        if self.overflowed {
            return Err(TableError::Overflow { table });
        }
        for &key in all {
            match self.entries.iter().filter(|(k, _)| *k == key).count() {
                0 => return Err(TableError::Missing { table, tag: name(key) }),
                1 => {}
                _ => return Err(TableError::Duplicate { table, tag: name(key) }),
            }
        }
        if let Some((key, _)) = self.entries.iter().find(|(k, _)| !all.contains(k)) {
            return Err(TableError::Unknown { table, tag: name(*key) });
        }
        Ok(())
    }
}

/// Debug name of a command tag
pub fn command_name(command: Command) -> &'static str {
    match command {
        Command::NoCommand => "NOCOMMAND",
        other => other.token(),
    }
}

/// Which commands interrupt long-running work
///
/// An interrupting command stamps the controller's "last interrupt" time
/// and advances the interrupt epoch, which cancels every frame pushed
/// before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InterruptPolicy {
    mask: u16,
}

impl InterruptPolicy {
    /// Policy where nothing interrupts
    pub const fn none() -> Self {
        Self { mask: 0 }
    }

    /// Mark `command` as interrupting
    pub const fn with(self, command: Command) -> Self {
        Self {
            mask: self.mask | (1 << command as u16),
        }
    }

    pub const fn interrupts(&self, command: Command) -> bool {
        self.mask & (1 << command as u16) != 0
    }
}
