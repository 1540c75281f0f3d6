//! Save/load persistence behind an abstract key-value store.
//!
//! The store is deliberately dumb (get/set/remove strings by key); what gets
//! stored is the `SaveRecord` projection, never transient simulation bodies.
//! Every record field merges against a default so legacy saves load with
//! whatever fields they have.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::economy::{Ledger, Upgrades};
use crate::error::{ImportError, StoreError};
use crate::sim::state::GameState;
use crate::sim::weapons;

pub const SAVE_VERSION: u32 = 1;

/// Durable string store. Implementations must not panic; backends report
/// through `StoreError` and callers decide how loud to be.
pub trait SaveStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
    /// Keys currently present, for export bundling.
    fn keys(&self) -> Result<Vec<String>, StoreError>;
}

/// In-memory store for native runs and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SaveStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.entries.keys().cloned().collect())
    }
}

/// Browser LocalStorage store.
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Default)]
pub struct LocalStorageStore;

#[cfg(target_arch = "wasm32")]
impl LocalStorageStore {
    pub fn new() -> Self {
        Self
    }

    fn storage() -> Result<web_sys::Storage, StoreError> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or(StoreError::Unavailable)
    }
}

#[cfg(target_arch = "wasm32")]
impl SaveStore for LocalStorageStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Self::storage()?
            .get_item(key)
            .map_err(|_| StoreError::Backend(format!("get_item({key})")))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        Self::storage()?
            .set_item(key, value)
            .map_err(|_| StoreError::Backend(format!("set_item({key})")))
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        Self::storage()?
            .remove_item(key)
            .map_err(|_| StoreError::Backend(format!("remove_item({key})")))
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        let storage = Self::storage()?;
        let len = storage
            .length()
            .map_err(|_| StoreError::Backend("length".into()))?;
        let mut keys = Vec::with_capacity(len as usize);
        for i in 0..len {
            if let Ok(Some(key)) = storage.key(i) {
                keys.push(key);
            }
        }
        Ok(keys)
    }
}

/// The serializable projection of a run. Bodies, traces and cooldowns are
/// ephemeral and deliberately absent; a restored run re-simulates from the
/// seeded RNG.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveRecord {
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub shards: f64,
    #[serde(default)]
    pub singularity: f64,
    #[serde(default)]
    pub lifetime_shards: f64,
    #[serde(default)]
    pub upgrades: Upgrades,
    #[serde(default)]
    pub wave: u32,
    #[serde(default)]
    pub time_ticks: u64,
    #[serde(default)]
    pub tier: u32,
    #[serde(default)]
    pub prestige_count: u32,
    #[serde(default)]
    pub seed: u64,
    /// Wall-clock ms at save time; drives offline reconciliation.
    #[serde(default)]
    pub last_save_ms: f64,
}

impl Default for SaveRecord {
    fn default() -> Self {
        Self {
            version: SAVE_VERSION,
            shards: 0.0,
            singularity: 0.0,
            lifetime_shards: 0.0,
            upgrades: Upgrades::default(),
            wave: 0,
            time_ticks: 0,
            tier: 0,
            prestige_count: 0,
            seed: 0,
            last_save_ms: 0.0,
        }
    }
}

impl SaveRecord {
    pub fn from_state(state: &GameState, now_ms: f64) -> Self {
        Self {
            version: SAVE_VERSION,
            shards: state.ledger.balance(crate::economy::Currency::Shards),
            singularity: state.ledger.balance(crate::economy::Currency::Singularity),
            lifetime_shards: state.ledger.lifetime_shards(),
            upgrades: state.upgrades.clone(),
            wave: state.wave,
            time_ticks: state.time_ticks,
            tier: state.progression.tier,
            prestige_count: state.progression.prestige_count,
            seed: state.seed,
            last_save_ms: now_ms,
        }
    }

    /// Apply this record onto a fresh state built with the variant tuning.
    pub fn restore(&self, state: &mut GameState) {
        state.ledger = Ledger::restore(self.shards, self.singularity, self.lifetime_shards);
        state.upgrades = self.upgrades.clone();
        state.wave = self.wave;
        state.time_ticks = self.time_ticks;
        state.progression.tier = self.tier;
        state.progression.prestige_count = self.prestige_count;
        state.progression.recompute_milestones(&state.upgrades);
        weapons::sync_weapons(state);
    }
}

/// Load and parse the record under `key`. Corruption falls back to a fresh
/// default so the run always starts; the parse failure is logged.
pub fn load_record(store: &dyn SaveStore, key: &str) -> SaveRecord {
    match store.get(key) {
        Ok(Some(json)) => match serde_json::from_str(&json) {
            Ok(record) => {
                log::info!("loaded save '{key}'");
                record
            }
            Err(err) => {
                log::warn!("save '{key}' is corrupt ({err}), starting fresh");
                SaveRecord::default()
            }
        },
        Ok(None) => SaveRecord::default(),
        Err(err) => {
            log::warn!("save store unavailable ({err}), starting fresh");
            SaveRecord::default()
        }
    }
}

pub fn save_record(
    store: &mut dyn SaveStore,
    key: &str,
    record: &SaveRecord,
) -> Result<(), StoreError> {
    let json = serde_json::to_string(record).map_err(|e| StoreError::Serialize(e.to_string()))?;
    store.set(key, &json)
}

/// Bundle every stored record into one opaque text token. The token is the
/// serialized key->record map, reversed so it reads as gibberish rather
/// than obviously editable JSON.
pub fn export_token(store: &dyn SaveStore) -> Result<String, StoreError> {
    let mut bundle: BTreeMap<String, SaveRecord> = BTreeMap::new();
    for key in store.keys()? {
        if let Some(json) = store.get(&key)? {
            match serde_json::from_str(&json) {
                Ok(record) => {
                    bundle.insert(key, record);
                }
                Err(err) => {
                    log::warn!("skipping unparseable save '{key}' in export: {err}");
                }
            }
        }
    }
    let json = serde_json::to_string(&bundle).map_err(|e| StoreError::Serialize(e.to_string()))?;
    Ok(json.chars().rev().collect())
}

/// Parse a token and replace the stored records. Every record is validated
/// before anything is written; a failed import leaves the store untouched.
pub fn import_token(store: &mut dyn SaveStore, token: &str) -> Result<usize, ImportError> {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return Err(ImportError::Empty);
    }
    let json: String = trimmed.chars().rev().collect();
    let bundle: BTreeMap<String, SaveRecord> =
        serde_json::from_str(&json).map_err(|e| ImportError::Malformed(e.to_string()))?;

    for (key, record) in &bundle {
        if !record.shards.is_finite() || record.shards < 0.0 {
            return Err(ImportError::BadRecord {
                key: key.clone(),
                reason: "negative or non-finite shard balance".to_string(),
            });
        }
        if !record.singularity.is_finite() || record.singularity < 0.0 {
            return Err(ImportError::BadRecord {
                key: key.clone(),
                reason: "negative or non-finite singularity balance".to_string(),
            });
        }
        if record.lifetime_shards + 1e-9 < record.shards {
            return Err(ImportError::BadRecord {
                key: key.clone(),
                reason: "lifetime earnings below current balance".to_string(),
            });
        }
    }

    for (key, record) in &bundle {
        save_record(store, key, record).map_err(ImportError::Store)?;
    }
    log::info!("imported {} save record(s)", bundle.len());
    Ok(bundle.len())
}
