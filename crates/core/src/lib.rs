//! Proofing pipeline: script detection, correction pairing and literal
//! substitution over whole text documents.

pub mod apply;
pub mod detector;
pub mod document;
pub mod error;
pub mod log_reader;
pub mod pairing;
pub mod pipeline;

pub use apply::{apply, ApplyReport};
pub use detector::{
    apply_configured_substitutions, detect_findings, detect_scripts, scan, strip_parentheticals,
    Finding, ScanReport, Script,
};
pub use document::{write_atomic, Document, DocumentError, LineEnding, TextFormat};
pub use error::ProofError;
pub use log_reader::{read_lines, split_log_lines, try_read_lines, write_lines};
pub use pairing::{build_map, pair_lines, MismatchPolicy};
pub use pipeline::{
    CorrectedLogFile, Corrector, PipelineOptions, PipelineReport, ProofingPipeline,
};
pub use scriptproof_search::{ReplacementMap, ReplacementRule, RuleOutcome};
