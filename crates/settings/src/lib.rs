pub mod config;
mod error;
mod storage;
pub mod substitutions;

pub use config::{ExportSettings, ProofingConfig, ResolvedPaths, CONFIG_DIR, CONFIG_FILE};
pub use error::SettingsError;
pub use substitutions::SubstitutionsStore;
