//! Incremental resource economy: balances, geometric upgrade costs,
//! tier/milestone/prestige progression, and offline catch-up.

pub mod ledger;
pub mod offline;
pub mod progression;
pub mod upgrades;

pub use ledger::{Currency, Ledger};
pub use offline::{OfflineSummary, reconcile};
pub use progression::Progression;
pub use upgrades::{BULK_LIMIT, UpgradeId, Upgrades, cost, unit_cost};
