//! Script detection over whole documents.
//!
//! A scan first applies the configured substitutions to the document and
//! persists the result, then flags every line whose text (outside of
//! parenthesised spans) contains Kana or Han characters.

use std::fmt;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use scriptproof_search::{ReplacementMap, SubstitutionEngine};
use tracing::{debug, info, warn};

use crate::document::Document;
use crate::error::ProofError;
use crate::log_reader::write_lines;

static PARENTHETICAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(.*?\)").expect("parenthetical pattern is valid"));

/// Character blocks the detector flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Script {
    /// Hiragana (U+3040–U+309F) and Katakana (U+30A0–U+30FF).
    Kana,
    /// CJK Unified Ideographs (U+4E00–U+9FFF).
    Han,
}

impl Script {
    pub fn of(ch: char) -> Option<Script> {
        match ch {
            '\u{3040}'..='\u{309F}' | '\u{30A0}'..='\u{30FF}' => Some(Script::Kana),
            '\u{4E00}'..='\u{9FFF}' => Some(Script::Han),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Script::Kana => "kana",
            Script::Han => "han",
        }
    }
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A flagged line as it appears in the findings log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    /// 1-based position within the findings log; pairing follows this order.
    pub ordinal: usize,
    /// 1-based line number in the scanned document.
    pub line_number: usize,
    /// Line text, trimmed, exactly as written to the log.
    pub text: String,
    pub scripts: Vec<Script>,
}

/// Outcome of a scan.
#[derive(Debug, Clone)]
pub struct ScanReport {
    pub findings: Vec<Finding>,
    pub findings_log: PathBuf,
    /// Configured substitution rules whose pattern occurred in the document.
    pub substitutions_fired: usize,
    pub document_rewritten: bool,
}

impl ScanReport {
    pub fn found_any(&self) -> bool {
        !self.findings.is_empty()
    }

    pub fn finding_texts(&self) -> Vec<String> {
        self.findings.iter().map(|f| f.text.clone()).collect()
    }
}

/// Removes every `(...)` span, shortest match first, without nesting.
pub fn strip_parentheticals(line: &str) -> std::borrow::Cow<'_, str> {
    PARENTHETICAL.replace_all(line, "")
}

/// Returns the scripts present in `line` outside of parenthesised spans.
pub fn detect_scripts(line: &str) -> Vec<Script> {
    let check_view = strip_parentheticals(line);
    let mut scripts: Vec<Script> = check_view.chars().filter_map(Script::of).collect();
    scripts.sort_unstable();
    scripts.dedup();
    scripts
}

/// Flags lines of `text` in document order.
pub fn detect_findings(text: &str) -> Vec<Finding> {
    let mut findings = Vec::new();
    for (idx, line) in text.split('\n').enumerate() {
        let scripts = detect_scripts(line);
        if scripts.is_empty() {
            continue;
        }
        findings.push(Finding {
            ordinal: findings.len() + 1,
            line_number: idx + 1,
            text: line.trim().to_string(),
            scripts,
        });
    }
    findings
}

/// Applies configured substitutions, each replacement followed by a single space.
///
/// Returns the rewritten text and how many rules matched. Empty patterns are
/// skipped.
pub fn apply_configured_substitutions(text: &str, substitutions: &ReplacementMap) -> (String, usize) {
    let mut current = text.to_string();
    let mut fired = 0usize;
    for rule in substitutions {
        if rule.pattern.is_empty() {
            warn!(replacement = %rule.replacement, "skipping configured substitution with an empty pattern");
            continue;
        }
        let engine = SubstitutionEngine::new(&current);
        if !engine.contains(&rule.pattern) {
            continue;
        }
        let padded = format!("{} ", rule.replacement);
        let replaced = match engine.replace_all(&rule.pattern, &padded) {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(pattern = %rule.pattern, error = %err, "configured substitution rejected");
                continue;
            }
        };
        debug!(
            pattern = %rule.pattern,
            occurrences = replaced.replacements,
            "applied configured substitution"
        );
        fired += 1;
        current = replaced.replaced_text;
    }
    (current, fired)
}

/// Runs the detector over `document_path` and overwrites `findings_log`.
pub fn scan(
    document_path: impl AsRef<Path>,
    substitutions: &ReplacementMap,
    findings_log: impl AsRef<Path>,
) -> Result<ScanReport, ProofError> {
    let document_path = document_path.as_ref();
    let findings_log = findings_log.as_ref();
    info!(document = %document_path.display(), "starting language check");

    let mut document =
        Document::open(document_path).map_err(|err| ProofError::read(document_path, err))?;

    let (rewritten, substitutions_fired) =
        apply_configured_substitutions(document.text(), substitutions);
    let document_rewritten = rewritten != document.text();
    if document_rewritten {
        document.replace_text(rewritten);
        document
            .save()
            .map_err(|err| ProofError::write(document_path, err))?;
        info!(
            rules = substitutions_fired,
            "document content has been modified with configured substitutions"
        );
    }

    let findings = detect_findings(document.text());
    write_lines(findings_log, findings.iter().map(|finding| finding.text.as_str()))?;

    if findings.is_empty() {
        info!("no Japanese or Chinese characters were found in the document");
    } else {
        info!(
            findings = findings.len(),
            log = %findings_log.display(),
            "language check finished"
        );
    }

    Ok(ScanReport {
        findings,
        findings_log: findings_log.to_path_buf(),
        substitutions_fired,
        document_rewritten,
    })
}
