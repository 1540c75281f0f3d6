//! Monotonic tick clock with a capped, normalized delta.
//!
//! All per-tick quantities are "per nominal frame"; scaling them by the
//! normalized delta makes the simulation frame-rate independent within the
//! capped range.

use crate::consts::{DELTA_CAP, NOMINAL_FRAME_MS};

#[derive(Debug, Clone)]
pub struct Clock {
    last_ms: Option<f64>,
    nominal_ms: f64,
    cap: f32,
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock {
    pub fn new() -> Self {
        Self {
            last_ms: None,
            nominal_ms: NOMINAL_FRAME_MS,
            cap: DELTA_CAP,
        }
    }

    /// Advance to `now_ms` and return the normalized delta:
    /// `min((now - last) / nominal, cap)`. The cap keeps one stalled frame
    /// (tab backgrounding) from becoming seconds of simulated time; the
    /// real gap is handled by offline reconciliation instead.
    pub fn tick(&mut self, now_ms: f64) -> f32 {
        let delta = match self.last_ms {
            None => 1.0,
            Some(last) if now_ms < last => {
                log::debug!("clock regression: {now_ms} < {last}, delta forced to 0");
                0.0
            }
            Some(last) => (((now_ms - last) / self.nominal_ms) as f32).min(self.cap),
        };
        self.last_ms = Some(now_ms);
        delta
    }
}

/// Wall-clock milliseconds since the Unix epoch, for save timestamps.
#[cfg(target_arch = "wasm32")]
pub fn wall_clock_ms() -> f64 {
    js_sys::Date::now()
}

#[cfg(not(target_arch = "wasm32"))]
pub fn wall_clock_ms() -> f64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}
