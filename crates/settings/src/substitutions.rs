use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use scriptproof_core::ReplacementMap;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::storage::store;
use crate::SettingsError;

/// Persistent table of configured substitutions, stored as a JSON object.
///
/// Key order in the file is the order rules are applied in.
#[derive(Debug, Clone)]
pub struct SubstitutionsStore {
    path: PathBuf,
    table: ReplacementMap,
}

impl SubstitutionsStore {
    /// Loads the store, falling back to an empty table when the file is
    /// missing or cannot be parsed. The fallback is logged, never fatal.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::try_load(path) {
            Ok(store) => store,
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "could not load substitutions; continuing with an empty table"
                );
                Self::empty(path)
            }
        }
    }

    /// Loads the store; a missing file yields an empty table.
    pub fn try_load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                info!(path = %path.display(), "no substitutions file; using an empty table");
                return Ok(Self::empty(path));
            }
            Err(source) => {
                return Err(SettingsError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let table = parse_table(&contents).map_err(|reason| SettingsError::Malformed {
            path: path.to_path_buf(),
            reason,
        })?;
        info!(path = %path.display(), rules = table.len(), "loaded substitutions");
        Ok(Self {
            path: path.to_path_buf(),
            table,
        })
    }

    fn empty(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            table: ReplacementMap::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn table(&self) -> &ReplacementMap {
        &self.table
    }

    pub fn into_table(self) -> ReplacementMap {
        self.table
    }

    /// Adds or updates a rule and persists the table.
    pub fn set(
        &mut self,
        pattern: impl Into<String>,
        replacement: impl Into<String>,
    ) -> Result<Option<String>, SettingsError> {
        let pattern = pattern.into();
        if pattern.is_empty() {
            return Err(SettingsError::EmptyPattern);
        }
        let previous = self.table.insert(pattern, replacement);
        self.persist()?;
        Ok(previous)
    }

    /// Removes a rule, persisting only when something changed.
    pub fn remove(&mut self, pattern: &str) -> Result<bool, SettingsError> {
        if self.table.remove(pattern).is_none() {
            return Ok(false);
        }
        self.persist()?;
        Ok(true)
    }

    fn persist(&self) -> Result<(), SettingsError> {
        let mut object = Map::new();
        for rule in &self.table {
            if rule.pattern.is_empty() {
                continue;
            }
            object.insert(rule.pattern.clone(), Value::String(rule.replacement.clone()));
        }

        let mut payload = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut payload, formatter);
        Value::Object(object)
            .serialize(&mut serializer)
            .map_err(|source| SettingsError::Serialize {
                path: self.path.clone(),
                source,
            })?;

        store(&self.path, &payload)?;
        info!(path = %self.path.display(), rules = self.table.len(), "saved substitutions");
        Ok(())
    }
}

fn parse_table(contents: &str) -> Result<ReplacementMap, String> {
    let value: Value = serde_json::from_str(contents).map_err(|err| err.to_string())?;
    let Value::Object(object) = value else {
        return Err("expected a JSON object of string replacements".to_string());
    };

    let mut table = ReplacementMap::new();
    for (pattern, replacement) in object {
        let Value::String(replacement) = replacement else {
            return Err(format!("replacement for '{pattern}' is not a string"));
        };
        table.insert(pattern, replacement);
    }
    Ok(table)
}
