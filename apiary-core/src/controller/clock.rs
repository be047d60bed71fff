//! Tick-driven millisecond clock
//!
//! The controller has no time source of its own. Each tick it adds the
//! delay its handler asked for, so handler deadlines are measured in the
//! time the device believes has passed.

/// Millisecond clock advanced by handler delays
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickClock {
    now_ms: u32,
    /// Microseconds not yet folded into `now_ms` (always < 1000)
    us_remainder: u32,
}

impl TickClock {
    pub const fn new() -> Self {
        Self {
            now_ms: 0,
            us_remainder: 0,
        }
    }

    /// Current time in milliseconds since start (wraps after ~49 days)
    pub const fn now_ms(&self) -> u32 {
        self.now_ms
    }

    /// Add elapsed microseconds, carrying whole milliseconds
    pub fn advance(&mut self, us: u32) {
        self.us_remainder += us % 1000;
        let mut whole_ms = us / 1000;
        if self.us_remainder >= 1000 {
            self.us_remainder -= 1000;
            whole_ms += 1;
        }
        self.now_ms = self.now_ms.wrapping_add(whole_ms);
    }
}

/// Check if `now` has reached `deadline`, tolerating clock wrap
pub const fn deadline_reached(now: u32, deadline: u32) -> bool {
    (now.wrapping_sub(deadline) as i32) >= 0
}
