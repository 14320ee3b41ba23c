/// Rain accumulator → per-packet delta.
///
/// The IP-100 reports a daily cumulative rain total that resets at
/// midnight. The engine wants rain fallen since the previous packet, so the
/// driver remembers the last total it saw and differences against it.

use log::info;

const LOG_TARGET: &str = "ip100::rain";

/// Previous day-rain-total seen by one driver instance.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RainState {
    previous_total: Option<f64>,
}

impl RainState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn previous_total(&self) -> Option<f64> {
        self.previous_total
    }

    /// Delta between `current_total` and the remembered total, without
    /// touching state.
    pub fn delta(&self, current_total: f64) -> Option<f64> {
        rain_total_to_delta(current_total, self.previous_total)
    }

    /// Records `current_total` as the baseline for the next packet.
    /// Call only once the packet carrying it has been fully assembled.
    pub fn advance(&mut self, current_total: f64) {
        self.previous_total = Some(current_total);
    }
}

/// Rain fallen between two readings of a daily cumulative counter.
///
/// - No previous total: `None`, there is nothing to difference against.
/// - Counter went down: it rolled over at midnight. `None` for this step,
///   the new total only becomes the baseline for the next one.
pub fn rain_total_to_delta(current_total: f64, previous_total: Option<f64>) -> Option<f64> {
    let previous = previous_total?;
    if current_total >= previous {
        Some(current_total - previous)
    } else {
        info!(
            target: LOG_TARGET,
            "rain counter reset detected: new={} old={}",
            current_total,
            previous
        );
        None
    }
}
