//! Offline catch-up: one-shot credited production for time spent away.

use super::ledger::{Currency, Ledger};
use crate::tuning::OfflineTuning;

/// What happened while the player was away. Pure output for the
/// presentation layer; never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct OfflineSummary {
    /// Elapsed wall time actually credited, after clamping, in seconds.
    pub elapsed_secs: f64,
    /// Shards credited.
    pub credited: f64,
}

/// Credit production for an elapsed real-time gap in one atomic step.
///
/// Returns `None` when the gap is below the reporting threshold or the
/// restored passive rate is zero. `rate_per_sec` is the online production
/// rate evaluated against the restored state; the efficiency discount
/// models that only automated systems ran.
pub fn reconcile(
    ledger: &mut Ledger,
    rate_per_sec: f64,
    elapsed_secs: f64,
    tuning: &OfflineTuning,
) -> Option<OfflineSummary> {
    if elapsed_secs < tuning.min_elapsed_secs {
        return None;
    }
    let clamped = elapsed_secs.min(tuning.max_elapsed_secs);
    let credited = rate_per_sec * tuning.efficiency * clamped;
    if credited <= 0.0 {
        return None;
    }
    ledger.credit(Currency::Shards, credited);
    Some(OfflineSummary {
        elapsed_secs: clamped,
        credited,
    })
}
