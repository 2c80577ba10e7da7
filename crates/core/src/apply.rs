use std::path::Path;

use scriptproof_search::{apply_map, ReplacementMap, RuleOutcome};
use tracing::{debug, info};

use crate::document::Document;
use crate::error::ProofError;

/// Outcome of applying a replacement map to a document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyReport {
    /// Whether the document bytes changed (and were written back).
    pub changed: bool,
    /// Number of rules whose pattern was present when applied.
    pub applied_count: usize,
    pub rules: Vec<RuleOutcome>,
}

/// Applies `map` to the document at `target_path`, in map order.
///
/// The file is only rewritten when the resulting text differs from what was
/// read.
pub fn apply(
    target_path: impl AsRef<Path>,
    map: &ReplacementMap,
) -> Result<ApplyReport, ProofError> {
    let target_path = target_path.as_ref();
    info!(target = %target_path.display(), rules = map.len(), "starting replacement process");

    let mut document =
        Document::open(target_path).map_err(|err| ProofError::read(target_path, err))?;
    let outcome = apply_map(document.text(), map)?;

    for rule in &outcome.rules {
        debug!(
            pattern = %rule.pattern,
            replacement = %rule.replacement,
            occurrences = rule.occurrences,
            line = rule.first_match.line,
            column = rule.first_match.column,
            "replacement rule fired"
        );
    }

    let changed = outcome.text != document.text();
    let applied_count = outcome.applied_count();
    if changed {
        document.replace_text(outcome.text);
        document
            .save()
            .map_err(|err| ProofError::write(target_path, err))?;
        info!(
            replacements = applied_count,
            "file modification successful"
        );
    } else {
        info!("no changes were made; the file content might already be up to date");
    }

    Ok(ApplyReport {
        changed,
        applied_count,
        rules: outcome.rules,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn cascading_rules_apply_in_order() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("target.txt");
        fs::write(&target, "foo").unwrap();

        let map: ReplacementMap = [("foo", "bar"), ("bar", "baz")].into_iter().collect();
        let report = apply(&target, &map).unwrap();

        assert!(report.changed);
        assert_eq!(report.applied_count, 2);
        assert_eq!(fs::read_to_string(&target).unwrap(), "baz");
    }

    #[test]
    fn absent_patterns_leave_file_untouched() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("target.txt");
        fs::write(&target, "unrelated text\n").unwrap();
        let before = fs::metadata(&target).unwrap().modified().unwrap();

        let map: ReplacementMap = [("日本語", "Japanese")].into_iter().collect();
        let report = apply(&target, &map).unwrap();

        assert_eq!(report, ApplyReport::default());
        assert_eq!(fs::read_to_string(&target).unwrap(), "unrelated text\n");
        assert_eq!(fs::metadata(&target).unwrap().modified().unwrap(), before);
    }

    #[test]
    fn identity_rules_fire_without_changing_the_file() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("target.txt");
        fs::write(&target, "同じ\n").unwrap();

        let map: ReplacementMap = [("同じ", "同じ")].into_iter().collect();
        let report = apply(&target, &map).unwrap();

        assert!(!report.changed);
        assert_eq!(report.applied_count, 1);
    }

    #[test]
    fn replaces_every_occurrence_and_reports_location() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("target.txt");
        fs::write(&target, "intro\n猫が好き\nまた猫が好き\n").unwrap();

        let map: ReplacementMap = [("猫が好き", "likes cats")].into_iter().collect();
        let report = apply(&target, &map).unwrap();

        assert_eq!(
            fs::read_to_string(&target).unwrap(),
            "intro\nlikes cats\nまたlikes cats\n"
        );
        assert_eq!(report.rules[0].occurrences, 2);
        assert_eq!(report.rules[0].first_match.line, 2);
    }

    #[test]
    fn missing_target_is_not_found() {
        let dir = tempdir().unwrap();
        let map: ReplacementMap = [("a", "b")].into_iter().collect();
        let err = apply(dir.path().join("missing.txt"), &map).unwrap_err();
        assert!(matches!(err, ProofError::NotFound { .. }));
    }
}
