use std::path::Path;

use scriptproof_search::ReplacementMap;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::error::ProofError;
use crate::log_reader::read_lines;

/// How to pair a findings log with a corrected log of a different length.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MismatchPolicy {
    /// Pair up to the shorter length and warn about the dropped entries.
    #[default]
    Truncate,
    /// Refuse to build a map.
    Strict,
}

/// Zips findings with corrections positionally into an ordered map.
///
/// A finding that appears twice keeps its first position but takes the later
/// correction.
pub fn pair_lines<F, C>(
    findings: &[F],
    corrected: &[C],
    policy: MismatchPolicy,
) -> Result<ReplacementMap, ProofError>
where
    F: AsRef<str>,
    C: AsRef<str>,
{
    if findings.len() != corrected.len() {
        match policy {
            MismatchPolicy::Strict => {
                error!(
                    findings = findings.len(),
                    corrected = corrected.len(),
                    "entry count mismatch between findings and corrections"
                );
                return Err(ProofError::CountMismatch {
                    findings: findings.len(),
                    corrected: corrected.len(),
                });
            }
            MismatchPolicy::Truncate => {
                warn!(
                    findings = findings.len(),
                    corrected = corrected.len(),
                    paired = findings.len().min(corrected.len()),
                    "entry count mismatch; extra entries are ignored"
                );
            }
        }
    }

    let mut map = ReplacementMap::new();
    for (original, correction) in findings.iter().zip(corrected) {
        let (original, correction) = (original.as_ref(), correction.as_ref());
        if let Some(previous) = map.insert(original, correction) {
            if previous != correction {
                warn!(
                    finding = original,
                    discarded = %previous,
                    kept = correction,
                    "duplicate finding; the later correction wins"
                );
            }
        }
    }
    Ok(map)
}

/// Loads both logs and pairs them into a replacement map.
pub fn build_map(
    findings_log: impl AsRef<Path>,
    corrected_log: impl AsRef<Path>,
    policy: MismatchPolicy,
) -> Result<ReplacementMap, ProofError> {
    let findings_log = findings_log.as_ref();
    let corrected_log = corrected_log.as_ref();
    info!("parsing logs to create replacement map");

    let findings = read_lines(findings_log);
    if findings.is_empty() {
        error!(log = %findings_log.display(), "findings log could not be parsed or is empty");
        return Err(ProofError::EmptyLog {
            path: findings_log.to_path_buf(),
        });
    }
    let corrected = read_lines(corrected_log);
    if corrected.is_empty() {
        error!(log = %corrected_log.display(), "corrected log could not be parsed or is empty");
        return Err(ProofError::EmptyLog {
            path: corrected_log.to_path_buf(),
        });
    }

    pair_lines(&findings, &corrected, policy)
}
