//! Keyed, cancellable timers driven from the engine loop.
//!
//! Timers never fire callbacks; `advance` returns the keys that expired and
//! the caller dispatches. That keeps all effects on the engine's single
//! thread and makes teardown a plain `cancel_all`.

/// Identity of a scheduled timer. Scheduling an already-present key
/// replaces the earlier timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKey {
    Autosave,
    /// Free slot for variant-specific clocks.
    Custom(u32),
}

#[derive(Debug, Clone)]
struct Timer {
    key: TimerKey,
    remaining: f64,
    /// Some(period) reschedules on fire.
    period: Option<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    timers: Vec<Timer>,
    paused: bool,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// One-shot timer firing after `secs`.
    pub fn schedule(&mut self, key: TimerKey, secs: f64) {
        self.cancel(key);
        self.timers.push(Timer {
            key,
            remaining: secs,
            period: None,
        });
    }

    /// Repeating timer firing every `secs`.
    pub fn schedule_repeating(&mut self, key: TimerKey, secs: f64) {
        self.cancel(key);
        self.timers.push(Timer {
            key,
            remaining: secs,
            period: Some(secs),
        });
    }

    /// Returns true if a timer with the key existed.
    pub fn cancel(&mut self, key: TimerKey) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.key != key);
        before != self.timers.len()
    }

    pub fn cancel_all(&mut self) {
        self.timers.clear();
    }

    /// Paused timers hold their remaining time.
    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    /// Advance all timers by `dt_secs`; returns the keys that fired, in
    /// scheduling order. Repeating timers are rescheduled, one-shots are
    /// removed.
    pub fn advance(&mut self, dt_secs: f64) -> Vec<TimerKey> {
        if self.paused || dt_secs <= 0.0 {
            return Vec::new();
        }
        let mut fired = Vec::new();
        self.timers.retain_mut(|timer| {
            timer.remaining -= dt_secs;
            if timer.remaining > 0.0 {
                return true;
            }
            fired.push(timer.key);
            match timer.period {
                Some(period) => {
                    timer.remaining = period;
                    true
                }
                None => false,
            }
        });
        fired
    }
}
