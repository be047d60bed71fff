//! Debug sink that forwards device text to `tracing`

use std::fmt;

use apiary_hal::DebugSink;

/// Line-buffered [`DebugSink`]
///
/// Text is collected until a newline and each complete line becomes one
/// `debug` event with target `device`. After [`disable`](DebugSink::disable)
/// everything is dropped.
pub struct TracingSink {
    source: &'static str,
    pending: String,
    enabled: bool,
}

impl TracingSink {
    /// `source` tags every event so interleaved components stay apart
    pub fn new(source: &'static str) -> Self {
        Self {
            source,
            pending: String::new(),
            enabled: true,
        }
    }

    fn emit_complete_lines(&mut self) {
        while let Some(end) = self.pending.find('\n') {
            let line: String = self.pending.drain(..=end).collect();
            let line = line.trim_end_matches(['\r', '\n']);
            if !line.is_empty() {
                tracing::debug!(target: "device", source = self.source, "{}", line);
            }
        }
    }

    #[cfg(test)]
    fn pending(&self) -> &str {
        &self.pending
    }
}

impl fmt::Write for TracingSink {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        if self.enabled {
            self.pending.push_str(s);
            self.emit_complete_lines();
        }
        Ok(())
    }
}

impl DebugSink for TracingSink {
    fn disable(&mut self) {
        self.enabled = false;
        self.pending.clear();
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}
