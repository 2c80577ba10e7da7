use std::fs;
use std::path::{Path, PathBuf};

use scriptproof_core::{MismatchPolicy, PipelineOptions};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::storage::store;
use crate::SettingsError;

const CONFIG_VERSION: u32 = 1;

/// Directory under the workspace root that holds `config.json`.
pub const CONFIG_DIR: &str = ".scriptproof";
pub const CONFIG_FILE: &str = "config.json";

/// Workspace-level proofing configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofingConfig {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default = "default_findings_log")]
    pub findings_log: PathBuf,
    #[serde(default = "default_corrected_log")]
    pub corrected_log: PathBuf,
    #[serde(default = "default_substitutions")]
    pub substitutions: PathBuf,
    #[serde(default)]
    pub mismatch: MismatchPolicy,
    #[serde(default)]
    pub export: ExportSettings,
}

fn default_version() -> u32 {
    CONFIG_VERSION
}

fn default_findings_log() -> PathBuf {
    PathBuf::from("language_check.log")
}

fn default_corrected_log() -> PathBuf {
    PathBuf::from("language_proof_translated.log")
}

fn default_substitutions() -> PathBuf {
    PathBuf::from("replacements.json")
}

impl Default for ProofingConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            findings_log: default_findings_log(),
            corrected_log: default_corrected_log(),
            substitutions: default_substitutions(),
            mismatch: MismatchPolicy::default(),
            export: ExportSettings::default(),
        }
    }
}

impl ProofingConfig {
    /// Location of the config file for `workspace`.
    pub fn path_in(workspace: &Path) -> PathBuf {
        workspace.join(CONFIG_DIR).join(CONFIG_FILE)
    }

    /// Loads `path`, returning defaults when the file does not exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(path = %path.display(), "no proofing config; using defaults");
            let mut config = Self::default();
            config.sanitize();
            return Ok(config);
        }

        let contents = fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Self =
            serde_json::from_str(&contents).map_err(|source| SettingsError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.sanitize();
        info!(path = %path.display(), "loaded proofing config");
        Ok(config)
    }

    pub fn load_from_workspace(workspace: &Path) -> Result<Self, SettingsError> {
        Self::load(Self::path_in(workspace))
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        let path = path.as_ref();
        let payload =
            serde_json::to_string_pretty(self).map_err(|source| SettingsError::Serialize {
                path: path.to_path_buf(),
                source,
            })?;
        store(path, payload.as_bytes())
    }

    pub fn sanitize(&mut self) {
        if self.version == 0 {
            self.version = CONFIG_VERSION;
        }
        if self.findings_log.as_os_str().is_empty() {
            self.findings_log = default_findings_log();
        }
        if self.corrected_log.as_os_str().is_empty() {
            self.corrected_log = default_corrected_log();
        }
        if self.substitutions.as_os_str().is_empty() {
            self.substitutions = default_substitutions();
        }
        self.export.sanitize();
    }

    /// Configured paths with relative entries anchored at `workspace`.
    pub fn resolve(&self, workspace: &Path) -> ResolvedPaths {
        ResolvedPaths {
            findings_log: anchor(workspace, &self.findings_log),
            corrected_log: anchor(workspace, &self.corrected_log),
            substitutions: anchor(workspace, &self.substitutions),
        }
    }

    pub fn pipeline_options(&self, workspace: &Path) -> PipelineOptions {
        let paths = self.resolve(workspace);
        PipelineOptions {
            findings_log: paths.findings_log,
            corrected_log: paths.corrected_log,
            mismatch: self.mismatch,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPaths {
    pub findings_log: PathBuf,
    pub corrected_log: PathBuf,
    pub substitutions: PathBuf,
}

fn anchor(workspace: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        workspace.join(path)
    }
}

/// Defaults for the log export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportSettings {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_author")]
    pub author: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_lines_per_page")]
    pub lines_per_page: usize,
    #[serde(default = "default_header")]
    pub header: String,
    #[serde(default = "default_footer")]
    pub footer: String,
}

fn default_title() -> String {
    "Log Export".to_string()
}

fn default_author() -> String {
    "Unknown".to_string()
}

fn default_language() -> String {
    "ko".to_string()
}

fn default_lines_per_page() -> usize {
    40
}

fn default_header() -> String {
    "&l&t&r&a".to_string()
}

fn default_footer() -> String {
    "&c&p / &P".to_string()
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            title: default_title(),
            author: default_author(),
            language: default_language(),
            lines_per_page: default_lines_per_page(),
            header: default_header(),
            footer: default_footer(),
        }
    }
}

impl ExportSettings {
    fn sanitize(&mut self) {
        if self.title.trim().is_empty() {
            self.title = default_title();
        }
        if self.author.trim().is_empty() {
            self.author = default_author();
        }
        if self.language.trim().is_empty() {
            self.language = default_language();
        }
        if self.lines_per_page == 0 {
            self.lines_per_page = default_lines_per_page();
        }
        self.lines_per_page = self.lines_per_page.clamp(1, 10_000);
    }
}
