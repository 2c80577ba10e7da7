//! In-process orchestration of the three proofing stages.
//!
//! Stages run strictly in sequence and every stage reads and rewrites its
//! files from scratch; the first failing stage stops the run.

use std::path::{Path, PathBuf};

use scriptproof_search::ReplacementMap;
use tracing::info;

use crate::apply::{apply, ApplyReport};
use crate::detector::{scan, ScanReport};
use crate::error::ProofError;
use crate::log_reader::{try_read_lines, write_lines};
use crate::pairing::{build_map, MismatchPolicy};

/// Supplies corrected text for a list of findings, one correction per finding.
pub trait Corrector {
    fn correct(&mut self, findings: &[String]) -> Result<Vec<String>, ProofError>;
}

impl<F> Corrector for F
where
    F: FnMut(&[String]) -> Result<Vec<String>, ProofError>,
{
    fn correct(&mut self, findings: &[String]) -> Result<Vec<String>, ProofError> {
        self(findings)
    }
}

/// Corrector backed by a corrected log edited outside of the tool.
#[derive(Debug, Clone)]
pub struct CorrectedLogFile {
    path: PathBuf,
}

impl CorrectedLogFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Corrector for CorrectedLogFile {
    fn correct(&mut self, _findings: &[String]) -> Result<Vec<String>, ProofError> {
        let lines = try_read_lines(&self.path)?;
        if lines.is_empty() {
            return Err(ProofError::EmptyLog {
                path: self.path.clone(),
            });
        }
        Ok(lines)
    }
}

/// Where the pipeline keeps its logs and how it pairs them.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub findings_log: PathBuf,
    pub corrected_log: PathBuf,
    pub mismatch: MismatchPolicy,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            findings_log: PathBuf::from("language_check.log"),
            corrected_log: PathBuf::from("language_proof_translated.log"),
            mismatch: MismatchPolicy::Truncate,
        }
    }
}

/// Summary of a full pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub scan: ScanReport,
    pub corrections: usize,
    /// `None` when the scan found nothing to correct.
    pub apply: Option<ApplyReport>,
}

#[derive(Debug, Clone)]
pub struct ProofingPipeline {
    options: PipelineOptions,
    substitutions: ReplacementMap,
}

impl ProofingPipeline {
    pub fn new(options: PipelineOptions, substitutions: ReplacementMap) -> Self {
        Self {
            options,
            substitutions,
        }
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    pub fn substitutions(&self) -> &ReplacementMap {
        &self.substitutions
    }

    /// Stage 1: applies configured substitutions and writes the findings log.
    pub fn scan(&self, document: impl AsRef<Path>) -> Result<ScanReport, ProofError> {
        scan(document, &self.substitutions, &self.options.findings_log)
    }

    /// Stage 2: asks `corrector` for corrections and writes the corrected log.
    ///
    /// Blank corrections are rejected because the log reader would drop them
    /// and shift every later pair.
    pub fn record_corrections(
        &self,
        findings: &[String],
        corrector: &mut dyn Corrector,
    ) -> Result<Vec<String>, ProofError> {
        let corrections: Vec<String> = corrector
            .correct(findings)?
            .into_iter()
            .map(|line| line.trim().to_string())
            .collect();
        if let Some(position) = corrections.iter().position(|line| line.is_empty()) {
            return Err(ProofError::EmptyCorrection {
                ordinal: position + 1,
            });
        }
        write_lines(&self.options.corrected_log, &corrections)?;
        info!(
            corrections = corrections.len(),
            log = %self.options.corrected_log.display(),
            "corrected log saved"
        );
        Ok(corrections)
    }

    /// Stage 3: pairs the two logs and applies the result to `document`.
    pub fn apply_corrections(&self, document: impl AsRef<Path>) -> Result<ApplyReport, ProofError> {
        let map = build_map(
            &self.options.findings_log,
            &self.options.corrected_log,
            self.options.mismatch,
        )?;
        apply(document, &map)
    }

    /// Runs scan, correction and substitution back to back.
    pub fn run(
        &self,
        document: impl AsRef<Path>,
        corrector: &mut dyn Corrector,
    ) -> Result<PipelineReport, ProofError> {
        let document = document.as_ref();
        let scan = self.scan(document)?;
        if !scan.found_any() {
            return Ok(PipelineReport {
                scan,
                corrections: 0,
                apply: None,
            });
        }

        let corrections = self.record_corrections(&scan.finding_texts(), corrector)?;
        let apply = self.apply_corrections(document)?;
        Ok(PipelineReport {
            scan,
            corrections: corrections.len(),
            apply: Some(apply),
        })
    }
}
