//! Amplitude histogram

/// Number of buckets; one per 10-bit ADC delta
pub const HISTOGRAM_BUCKETS: usize = 1024;

/// Count of one-second peak-to-peak amplitudes
///
/// Deltas above the last bucket are counted in it.
#[derive(Debug, Clone)]
pub struct Histogram {
    buckets: [u32; HISTOGRAM_BUCKETS],
    total: u32,
}

impl Default for Histogram {
    fn default() -> Self {
        Self::new()
    }
}

impl Histogram {
    pub const fn new() -> Self {
        Self {
            buckets: [0; HISTOGRAM_BUCKETS],
            total: 0,
        }
    }

    /// Clear every bucket
    pub fn reset(&mut self) {
        self.buckets = [0; HISTOGRAM_BUCKETS];
        self.total = 0;
    }

    /// Record one amplitude
    pub fn insert(&mut self, delta: u16) {
        let index = usize::from(delta).min(HISTOGRAM_BUCKETS - 1);
        self.buckets[index] = self.buckets[index].saturating_add(1);
        self.total = self.total.saturating_add(1);
    }

    /// Count recorded at `delta`
    pub fn count(&self, delta: u16) -> u32 {
        self.buckets
            .get(usize::from(delta))
            .copied()
            .unwrap_or(0)
    }

    /// Number of amplitudes recorded since the last reset
    pub fn total(&self) -> u32 {
        self.total
    }

    /// `(delta, count)` for every non-empty bucket, ascending
    pub fn non_empty(&self) -> impl Iterator<Item = (u16, u32)> + '_ {
        self.buckets
            .iter()
            .enumerate()
            .filter(|&(_, &count)| count > 0)
            .map(|(delta, &count)| (delta as u16, count))
    }
}
