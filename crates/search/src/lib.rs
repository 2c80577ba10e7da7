//! Literal substitution engine shared by the proofing stages.
//!
//! Patterns are matched as exact substrings; nothing is interpreted as a
//! regular expression. `ReplacementMap` keeps its rules in insertion order so
//! that applying the same map to the same text always produces the same
//! result, and rules run one after another so a later rule sees the text an
//! earlier rule produced.

use std::collections::HashMap;

use thiserror::Error;

/// Error conditions raised by the substitution engine.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubstitutionError {
    #[error("substitution pattern cannot be empty")]
    EmptyPattern,
}

/// A single literal `pattern -> replacement` rule.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReplacementRule {
    pub pattern: String,
    pub replacement: String,
}

impl ReplacementRule {
    pub fn new(pattern: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            replacement: replacement.into(),
        }
    }

    pub fn validate(&self) -> Result<(), SubstitutionError> {
        if self.pattern.is_empty() {
            return Err(SubstitutionError::EmptyPattern);
        }
        Ok(())
    }
}

/// Ordered mapping from pattern to replacement.
///
/// Inserting a pattern that is already present overwrites its replacement but
/// keeps the rule at its original position.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReplacementMap {
    rules: Vec<ReplacementRule>,
    index: HashMap<String, usize>,
}

impl ReplacementMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Inserts a rule, returning the replacement it displaced if the pattern was already mapped.
    pub fn insert(
        &mut self,
        pattern: impl Into<String>,
        replacement: impl Into<String>,
    ) -> Option<String> {
        let pattern = pattern.into();
        let replacement = replacement.into();
        if let Some(&position) = self.index.get(&pattern) {
            let previous = std::mem::replace(&mut self.rules[position].replacement, replacement);
            return Some(previous);
        }
        self.index.insert(pattern.clone(), self.rules.len());
        self.rules.push(ReplacementRule::new(pattern, replacement));
        None
    }

    pub fn get(&self, pattern: &str) -> Option<&str> {
        self.index
            .get(pattern)
            .map(|&position| self.rules[position].replacement.as_str())
    }

    pub fn contains(&self, pattern: &str) -> bool {
        self.index.contains_key(pattern)
    }

    /// Removes a rule and returns its replacement. Remaining rules keep their relative order.
    pub fn remove(&mut self, pattern: &str) -> Option<String> {
        let position = self.index.remove(pattern)?;
        let removed = self.rules.remove(position);
        for slot in self.index.values_mut() {
            if *slot > position {
                *slot -= 1;
            }
        }
        Some(removed.replacement)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReplacementRule> {
        self.rules.iter()
    }

    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|rule| rule.pattern.as_str())
    }
}

impl<K, V> FromIterator<(K, V)> for ReplacementMap
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = ReplacementMap::new();
        map.extend(iter);
        map
    }
}

impl<K, V> Extend<(K, V)> for ReplacementMap
where
    K: Into<String>,
    V: Into<String>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (pattern, replacement) in iter {
            self.insert(pattern, replacement);
        }
    }
}

impl<'a> IntoIterator for &'a ReplacementMap {
    type Item = &'a ReplacementRule;
    type IntoIter = std::slice::Iter<'a, ReplacementRule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

/// Location of a literal match.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchMatch {
    pub start: usize,
    pub end: usize,
    /// 1-based line number.
    pub line: usize,
    /// 1-based column, counted in characters.
    pub column: usize,
}

/// Captures the outcome of a `replace_all` call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReplaceAllOutcome {
    pub replaced_text: String,
    pub replacements: usize,
    /// Leftmost match in the original text, if any.
    pub first_match: Option<SearchMatch>,
}

/// Report for a rule that matched while applying a map.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuleOutcome {
    pub pattern: String,
    pub replacement: String,
    pub occurrences: usize,
    /// First match, located in the text the rule was applied to.
    pub first_match: SearchMatch,
}

/// Result of applying a whole `ReplacementMap`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MapOutcome {
    pub text: String,
    pub rules: Vec<RuleOutcome>,
}

impl MapOutcome {
    /// Number of rules whose pattern was present when their turn came.
    pub fn applied_count(&self) -> usize {
        self.rules.len()
    }

    pub fn total_occurrences(&self) -> usize {
        self.rules.iter().map(|rule| rule.occurrences).sum()
    }
}

/// Substitution engine bound to a particular text buffer.
///
/// Every operation is a single left-to-right pass over the text; only the
/// first match of a pattern is ever resolved to a line and column.
#[derive(Clone, Copy, Debug)]
pub struct SubstitutionEngine<'a> {
    text: &'a str,
}

impl<'a> SubstitutionEngine<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text }
    }

    pub fn contains(&self, pattern: &str) -> bool {
        !pattern.is_empty() && self.text.contains(pattern)
    }

    /// Replaces every non-overlapping occurrence of `pattern` with `replacement`.
    pub fn replace_all(
        &self,
        pattern: &str,
        replacement: &str,
    ) -> Result<ReplaceAllOutcome, SubstitutionError> {
        if pattern.is_empty() {
            return Err(SubstitutionError::EmptyPattern);
        }

        let mut replaced = String::new();
        let mut replacements = 0usize;
        let mut first_start = None;
        let mut last = 0usize;
        for (start, matched) in self.text.match_indices(pattern) {
            if first_start.is_none() {
                first_start = Some(start);
                replaced.reserve(self.text.len());
            }
            replaced.push_str(&self.text[last..start]);
            replaced.push_str(replacement);
            last = start + matched.len();
            replacements += 1;
        }

        let Some(first_start) = first_start else {
            return Ok(ReplaceAllOutcome {
                replaced_text: self.text.to_string(),
                replacements: 0,
                first_match: None,
            });
        };
        replaced.push_str(&self.text[last..]);

        Ok(ReplaceAllOutcome {
            replaced_text: replaced,
            replacements,
            first_match: Some(self.locate(first_start, first_start + pattern.len())),
        })
    }

    fn locate(&self, start: usize, end: usize) -> SearchMatch {
        let before = &self.text[..start];
        let (line, line_start) = match before.rfind('\n') {
            Some(newline) => (before.matches('\n').count() + 1, newline + 1),
            None => (1, 0),
        };
        SearchMatch {
            start,
            end,
            line,
            column: self.text[line_start..start].chars().count() + 1,
        }
    }
}

/// Applies every rule of `map` in order against the progressively rewritten text.
///
/// A rule fires when its pattern is present at the time it is applied; rules
/// whose pattern is absent are skipped and not reported.
pub fn apply_map(text: &str, map: &ReplacementMap) -> Result<MapOutcome, SubstitutionError> {
    let mut current = text.to_string();
    let mut fired = Vec::new();
    for rule in map {
        rule.validate()?;
        let outcome = SubstitutionEngine::new(&current).replace_all(&rule.pattern, &rule.replacement)?;
        let Some(first_match) = outcome.first_match else {
            continue;
        };
        fired.push(RuleOutcome {
            pattern: rule.pattern.clone(),
            replacement: rule.replacement.clone(),
            occurrences: outcome.replacements,
            first_match,
        });
        current = outcome.replaced_text;
    }
    Ok(MapOutcome {
        text: current,
        rules: fired,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replace_all_is_literal_and_non_overlapping() {
        let engine = SubstitutionEngine::new("a.b a.b aaa");
        let outcome = engine.replace_all("a.b", "X").unwrap();
        assert_eq!(outcome.replaced_text, "X X aaa");
        assert_eq!(outcome.replacements, 2);

        let engine = SubstitutionEngine::new("aaa");
        let outcome = engine.replace_all("aa", "b").unwrap();
        assert_eq!(outcome.replaced_text, "ba");
        assert_eq!(outcome.replacements, 1);
    }

    #[test]
    fn replace_all_without_match_returns_original_text() {
        let engine = SubstitutionEngine::new("nothing here");
        let outcome = engine.replace_all("absent", "x").unwrap();
        assert_eq!(outcome.replaced_text, "nothing here");
        assert_eq!(outcome.replacements, 0);
        assert_eq!(outcome.first_match, None);
    }

    #[test]
    fn empty_pattern_is_rejected() {
        let engine = SubstitutionEngine::new("text");
        assert_eq!(
            engine.replace_all("", "x").unwrap_err(),
            SubstitutionError::EmptyPattern
        );
        assert!(!engine.contains(""));
    }

    #[test]
    fn matches_report_line_and_character_column() {
        let engine = SubstitutionEngine::new("first line\n日本語のテスト\n");
        let outcome = engine.replace_all("テスト", "test").unwrap();
        let found = outcome.first_match.unwrap();
        assert_eq!(found.line, 2);
        assert_eq!(found.column, 5);
        assert_eq!(&"first line\n日本語のテスト\n"[found.start..found.end], "テスト");
    }

    #[test]
    fn replace_all_reports_only_the_leftmost_match() {
        let engine = SubstitutionEngine::new("ab\ncd ab\nab");
        let outcome = engine.replace_all("ab", "xy").unwrap();
        assert_eq!(outcome.replaced_text, "xy\ncd xy\nxy");
        assert_eq!(outcome.replacements, 3);
        let first = outcome.first_match.unwrap();
        assert_eq!((first.start, first.line, first.column), (0, 1, 1));
    }

    #[test]
    fn map_keeps_insertion_order_and_overwrites_in_place() {
        let mut map = ReplacementMap::new();
        assert_eq!(map.insert("A", "A2"), None);
        assert_eq!(map.insert("B", "B2"), None);
        assert_eq!(map.insert("A", "A3"), Some("A2".to_string()));

        let rules: Vec<_> = map
            .iter()
            .map(|rule| (rule.pattern.as_str(), rule.replacement.as_str()))
            .collect();
        assert_eq!(rules, vec![("A", "A3"), ("B", "B2")]);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn map_remove_reindexes_remaining_rules() {
        let mut map: ReplacementMap = [("a", "1"), ("b", "2"), ("c", "3")].into_iter().collect();
        assert_eq!(map.remove("a"), Some("1".to_string()));
        assert_eq!(map.get("c"), Some("3"));
        map.insert("c", "33");
        assert_eq!(map.patterns().collect::<Vec<_>>(), vec!["b", "c"]);
        assert_eq!(map.get("c"), Some("33"));
        assert_eq!(map.remove("missing"), None);
    }

    #[test]
    fn apply_map_cascades_in_order() {
        let map: ReplacementMap = [("foo", "bar"), ("bar", "baz")].into_iter().collect();
        let outcome = apply_map("foo", &map).unwrap();
        assert_eq!(outcome.text, "baz");
        assert_eq!(outcome.applied_count(), 2);
    }

    #[test]
    fn apply_map_order_is_observable() {
        let map: ReplacementMap = [("bar", "baz"), ("foo", "bar")].into_iter().collect();
        let outcome = apply_map("foo", &map).unwrap();
        assert_eq!(outcome.text, "bar");
        assert_eq!(outcome.applied_count(), 1);
        assert_eq!(outcome.rules[0].pattern, "foo");
    }

    #[test]
    fn apply_map_skips_absent_patterns() {
        let map: ReplacementMap = [("missing", "x"), ("two", "2")].into_iter().collect();
        let outcome = apply_map("one two two", &map).unwrap();
        assert_eq!(outcome.text, "one 2 2");
        assert_eq!(outcome.applied_count(), 1);
        assert_eq!(outcome.total_occurrences(), 2);
        assert_eq!(outcome.rules[0].first_match.column, 5);
    }

    #[test]
    fn apply_map_handles_one_very_long_line() {
        let text = "あいう。".repeat(50_000);
        let map: ReplacementMap = [("。", ". ")].into_iter().collect();
        let outcome = apply_map(&text, &map).unwrap();

        assert_eq!(outcome.text, "あいう. ".repeat(50_000));
        assert_eq!(outcome.total_occurrences(), 50_000);
        let first = outcome.rules[0].first_match;
        assert_eq!((first.line, first.column), (1, 4));
    }

    #[test]
    fn apply_map_rejects_empty_pattern() {
        let map: ReplacementMap = [("", "x")].into_iter().collect();
        assert_eq!(
            apply_map("text", &map).unwrap_err(),
            SubstitutionError::EmptyPattern
        );
    }
}
