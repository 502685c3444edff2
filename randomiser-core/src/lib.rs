use thiserror::Error;

mod ammo;
pub mod catalog;
pub mod items;
mod ledger;
mod pool;
mod session;
mod settings;
mod swap;
mod weapons;

#[cfg(test)]
mod fixtures;

pub use catalog::{
    Catalog, CatalogView, Character, Difficulty, ItemDefinition, ItemType, LocationRecord,
    LocationSource, RegionDefinition, Scenario, Tier,
};
pub use ledger::{LedgerEntry, SwapLedger};
pub use pool::{
    CandidatePool, Classification, ClampedOption, GenerationWarning, PoolItem, PoolOutcome,
    PoolSynthesizer,
};
pub use session::{generate, Generation, SessionState, SlotData};
pub use settings::{OopsAll, RandomiserSettings, WeaponMode};
pub use weapons::WeaponRandomiser;

#[derive(Debug, Error)]
pub enum RandomiserError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("catalog error: {0}")]
    Catalog(String),
    #[error("unknown item '{name}' for {character:?}")]
    UnknownItem { name: String, character: Character },
    #[error("nothing left to draw from {pool}")]
    PoolExhausted { pool: String },
}

pub type Result<T> = std::result::Result<T, RandomiserError>;
