//! Line channel abstraction used by device handlers

use core::fmt;

use apiary_protocol::Line;

/// Bidirectional line-oriented text channel
///
/// Writes never fail from the caller's point of view; transport loss is
/// discovered lazily by the implementation.
pub trait LineChannel {
    /// Fetch the next complete inbound line, if any
    fn read_line(&mut self, line: &mut Line) -> bool;

    /// Queue bytes for every listener; returns the number accepted
    fn write(&mut self, bytes: &[u8]) -> usize;

    /// Push queued output to the transport
    fn flush(&mut self);

    fn write_str(&mut self, text: &str) {
        self.write(text.as_bytes());
    }

    /// Formatted write, so `write!`/`writeln!` work on any channel
    fn write_fmt(&mut self, args: fmt::Arguments<'_>) {
        let _ = fmt::write(&mut FmtAdapter(self), args);
    }
}

struct FmtAdapter<'a, C: ?Sized>(&'a mut C);

impl<C: LineChannel + ?Sized> fmt::Write for FmtAdapter<'_, C> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0.write(s.as_bytes());
        Ok(())
    }
}

impl<T: LineChannel + ?Sized> LineChannel for &mut T {
    fn read_line(&mut self, line: &mut Line) -> bool {
        (**self).read_line(line)
    }

    fn write(&mut self, bytes: &[u8]) -> usize {
        (**self).write(bytes)
    }

    fn flush(&mut self) {
        (**self).flush()
    }
}
