// WHY: the engine owns no pattern content; a provider hands it two ordered rule lists
// Validation happens once here so a broken library fails at startup, never mid-corpus

pub mod library;

use std::collections::HashSet;
use std::fmt;

use regex_automata::meta::Regex;
use regex_automata::util::captures::Captures;
use regex_automata::{Input, PatternID};
use tracing::debug;

use crate::error::PatternError;
use crate::text::Span;

/// Capture group reported instead of the whole match when present
pub const HIT_GROUP: &str = "hit";

/// Capture group that rejects the match whenever it participates
pub const REJECT_GROUP: &str = "reject";

/// Find-all contract every configured pattern satisfies
pub trait Pattern: Send + Sync + fmt::Debug {
    /// All non-overlapping, non-empty matches, left to right
    fn find_spans(&self, haystack: &str) -> Vec<Span>;

    /// Longest span this pattern can report, when bounded
    fn max_span_hint(&self) -> Option<usize> {
        None
    }
}

/// Compile an expression, naming the rule in the error
pub(crate) fn compile(name: &str, expr: &str) -> Result<Regex, PatternError> {
    Regex::new(expr).map_err(|e| PatternError::InvalidExpression {
        name: name.to_string(),
        message: e.to_string(),
    })
}

/// Leftmost-first matches judged one at a time
///
/// `judge` returns the span to report, or `None` to reject. An accepted match resumes the search at
/// its end; a rejected or empty one resumes one char past its start, so a match anchored inside
/// the rejected text is still found.
pub(crate) fn find_judged<F>(regex: &Regex, haystack: &str, mut judge: F) -> Vec<Span>
where
    F: FnMut(&Captures) -> Option<Span>,
{
    let mut caps = regex.create_captures();
    let mut spans = Vec::new();
    let mut pos = 0;

    while pos <= haystack.len() {
        regex.search_captures(&Input::new(haystack).range(pos..), &mut caps);
        let Some(found) = caps.get_match() else {
            break;
        };
        match judge(&caps) {
            Some(span) if !span.is_empty() => {
                spans.push(span);
                pos = found.end();
            }
            _ => {
                let step = haystack[found.start()..].chars().next().map_or(1, char::len_utf8);
                pos = found.start() + step;
            }
        }
    }
    spans
}

/// Regex-backed pattern
///
/// When the expression defines a `(?P<hit>...)` group, that group's span is reported, which lets
/// a pattern consume leading context (e.g. the previous terminator) without reporting it. A
/// `(?P<reject>...)` group that participates in a match rejects it, which stands in for a trailing
/// negative look-ahead. An optional guard discards matches whose reported text it matches.
#[derive(Debug)]
pub struct RegexPattern {
    regex: Regex,
    hit_group: Option<usize>,
    reject_group: Option<usize>,
    guard: Option<Regex>,
    max_span: Option<usize>,
}

impl RegexPattern {
    pub fn new(name: &str, expr: &str) -> Result<Self, PatternError> {
        let regex = compile(name, expr)?;
        let hit_group = regex.group_info().to_index(PatternID::ZERO, HIT_GROUP);
        let reject_group = regex.group_info().to_index(PatternID::ZERO, REJECT_GROUP);
        debug!(
            rule = name,
            has_hit_group = hit_group.is_some(),
            has_reject_group = reject_group.is_some(),
            "compiled pattern"
        );
        Ok(Self {
            regex,
            hit_group,
            reject_group,
            guard: None,
            max_span: None,
        })
    }

    /// Reject matches whose reported text matches `expr`
    pub fn with_guard(mut self, name: &str, expr: &str) -> Result<Self, PatternError> {
        self.guard = Some(compile(name, expr)?);
        Ok(self)
    }

    pub fn with_max_span(mut self, max_span: usize) -> Self {
        self.max_span = Some(max_span);
        self
    }

    fn judge(&self, haystack: &str, caps: &Captures) -> Option<Span> {
        if self.reject_group.is_some_and(|group| caps.get_group(group).is_some()) {
            return None;
        }
        let reported = match self.hit_group {
            Some(group) => caps.get_group(group)?,
            None => caps.get_match()?.span(),
        };
        let span = Span::new(reported.start, reported.end);
        match &self.guard {
            Some(guard) if guard.is_match(span.slice(haystack)) => None,
            _ => Some(span),
        }
    }
}

impl Pattern for RegexPattern {
    fn find_spans(&self, haystack: &str) -> Vec<Span> {
        find_judged(&self.regex, haystack, |caps| self.judge(haystack, caps))
    }

    fn max_span_hint(&self) -> Option<usize> {
        self.max_span
    }
}

/// Matching stage; fixes the rule identifier prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Surface patterns over normalized raw text
    Surface,
    /// Patterns over the tagger's abstracted stream
    Abstracted,
}

impl Stage {
    pub fn number(self) -> u8 {
        match self {
            Stage::Surface => 1,
            Stage::Abstracted => 2,
        }
    }

    /// Stable rule identifier, e.g. `S1_NOT_BUT`
    pub fn rule_id(self, name: &str) -> String {
        format!("S{}_{}", self.number(), name)
    }
}

/// A configured rule with its precomputed identifier
#[derive(Debug)]
pub struct NamedPattern {
    pub name: String,
    pub rule_id: String,
    pub pattern: Box<dyn Pattern>,
}

/// Ordered rules of one stage
#[derive(Debug)]
pub struct PatternSet {
    stage: Stage,
    rules: Vec<NamedPattern>,
}

impl PatternSet {
    pub fn new(stage: Stage, rules: Vec<(String, Box<dyn Pattern>)>) -> Result<Self, PatternError> {
        let mut seen = HashSet::new();
        let mut named = Vec::with_capacity(rules.len());

        for (name, pattern) in rules {
            if name.trim().is_empty() {
                return Err(PatternError::EmptyName { stage: stage.number() });
            }
            if !seen.insert(name.clone()) {
                return Err(PatternError::DuplicateName { stage: stage.number(), name });
            }
            named.push(NamedPattern {
                rule_id: stage.rule_id(&name),
                name,
                pattern,
            });
        }

        Ok(Self { stage, rules: named })
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NamedPattern> {
        self.rules.iter()
    }

    pub fn max_span_hint(&self) -> Option<usize> {
        self.rules.iter().filter_map(|r| r.pattern.max_span_hint()).max()
    }
}

/// Immutable two-stage pattern configuration handed to the detector
#[derive(Debug)]
pub struct PatternConfig {
    surface: PatternSet,
    abstracted: PatternSet,
}

impl PatternConfig {
    pub fn new(
        surface: Vec<(String, Box<dyn Pattern>)>,
        abstracted: Vec<(String, Box<dyn Pattern>)>,
    ) -> Result<Self, PatternError> {
        let surface = PatternSet::new(Stage::Surface, surface)?;
        let abstracted = PatternSet::new(Stage::Abstracted, abstracted)?;
        if surface.is_empty() && abstracted.is_empty() {
            return Err(PatternError::Empty);
        }
        Ok(Self { surface, abstracted })
    }

    /// Fail when either stage does not hold the promised number of rules
    pub fn expect_counts(self, surface: usize, abstracted: usize) -> Result<Self, PatternError> {
        for (set, expected) in [(&self.surface, surface), (&self.abstracted, abstracted)] {
            if set.len() != expected {
                return Err(PatternError::CountMismatch {
                    stage: set.stage().number(),
                    expected,
                    actual: set.len(),
                });
            }
        }
        Ok(self)
    }

    pub fn surface(&self) -> &PatternSet {
        &self.surface
    }

    pub fn abstracted(&self) -> &PatternSet {
        &self.abstracted
    }

    pub fn max_span_hint(&self) -> Option<usize> {
        self.surface.max_span_hint().max(self.abstracted.max_span_hint())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boxed(name: &str, expr: &str) -> (String, Box<dyn Pattern>) {
        (name.to_string(), Box::new(RegexPattern::new(name, expr).unwrap()))
    }

    #[test]
    fn test_find_spans_whole_match() {
        let pattern = RegexPattern::new("not", r"(?i)\bnot\b").unwrap();
        let spans = pattern.find_spans("Not this, not that.");
        assert_eq!(spans, vec![Span::new(0, 3), Span::new(10, 13)]);
    }

    #[test]
    fn test_find_spans_reports_hit_group() {
        let pattern = RegexPattern::new("start", r"(?:^|[.?!]\s)(?P<hit>It\s+\w+)").unwrap();
        let text = "It was. It is.";
        let spans: Vec<&str> = pattern.find_spans(text).iter().map(|s| s.slice(text)).collect();
        assert_eq!(spans, vec!["It was", "It is"]);
    }

    #[test]
    fn test_guard_discards_matches() {
        let pattern = RegexPattern::new("not", r"(?i)\bnot\s+\w+")
            .unwrap()
            .with_guard("not", r"(?i)^not\s+only\b")
            .unwrap();
        let text = "not only this but not that";
        let spans: Vec<&str> = pattern.find_spans(text).iter().map(|s| s.slice(text)).collect();
        assert_eq!(spans, vec!["not that"]);
    }

    #[test]
    fn test_rejected_match_retries_inside_its_span() {
        let pattern = RegexPattern::new("start", r"(?:^|[.?!]\s)(?P<hit>\w+\s+\w+\.\s+\w+)")
            .unwrap()
            .with_guard("start", r"^She\b")
            .unwrap();
        // the rejected "She ran. It" overlaps the anchor of the valid match
        let text = "She ran. It fell. Done";
        let spans: Vec<&str> = pattern.find_spans(text).iter().map(|s| s.slice(text)).collect();
        assert_eq!(spans, vec!["It fell. Done"]);
    }

    #[test]
    fn test_reject_group_discards_matches() {
        let pattern = RegexPattern::new("was", r"(?i)(?P<hit>\bit\s+was\b)(?P<reject>\s+not\b)?").unwrap();
        let text = "It was not. It was. it was";
        let spans: Vec<&str> = pattern.find_spans(text).iter().map(|s| s.slice(text)).collect();
        assert_eq!(spans, vec!["It was", "it was"]);
    }

    #[test]
    fn test_retry_steps_over_multibyte_chars() {
        let pattern = RegexPattern::new("word", r"\w+").unwrap().with_guard("word", r"^é").unwrap();
        let text = "éa b";
        let spans: Vec<&str> = pattern.find_spans(text).iter().map(|s| s.slice(text)).collect();
        assert_eq!(spans, vec!["a", "b"]);
    }

    #[test]
    fn test_empty_matches_are_skipped() {
        let pattern = RegexPattern::new("empty", r"x*").unwrap();
        assert_eq!(pattern.find_spans("abxxc"), vec![Span::new(2, 4)]);
    }

    #[test]
    fn test_invalid_expression_fails_fast() {
        let err = RegexPattern::new("broken", r"(unclosed").unwrap_err();
        assert!(matches!(err, PatternError::InvalidExpression { ref name, .. } if name == "broken"));
    }

    #[test]
    fn test_rule_ids_are_stage_prefixed() {
        let config = PatternConfig::new(vec![boxed("A", "a")], vec![boxed("B", "b")]).unwrap();
        let s1: Vec<&str> = config.surface().iter().map(|r| r.rule_id.as_str()).collect();
        let s2: Vec<&str> = config.abstracted().iter().map(|r| r.rule_id.as_str()).collect();
        assert_eq!(s1, vec!["S1_A"]);
        assert_eq!(s2, vec!["S2_B"]);
    }

    #[test]
    fn test_config_validation() {
        assert!(matches!(PatternConfig::new(Vec::new(), Vec::new()), Err(PatternError::Empty)));
        assert!(matches!(
            PatternConfig::new(vec![boxed("A", "a"), boxed("A", "b")], Vec::new()),
            Err(PatternError::DuplicateName { stage: 1, .. })
        ));
        assert!(matches!(
            PatternConfig::new(Vec::new(), vec![boxed(" ", "a")]),
            Err(PatternError::EmptyName { stage: 2 })
        ));
        let config = PatternConfig::new(vec![boxed("A", "a")], Vec::new()).unwrap();
        assert!(matches!(
            config.expect_counts(1, 3),
            Err(PatternError::CountMismatch { stage: 2, expected: 3, actual: 0 })
        ));
    }

    #[test]
    fn test_max_span_hint_is_largest_declared() {
        let short: Box<dyn Pattern> = Box::new(RegexPattern::new("a", "a").unwrap().with_max_span(10));
        let long: Box<dyn Pattern> = Box::new(RegexPattern::new("b", "b").unwrap().with_max_span(90));
        let config = PatternConfig::new(
            vec![("a".to_string(), short)],
            vec![("b".to_string(), long), boxed("c", "c")],
        )
        .unwrap();
        assert_eq!(config.max_span_hint(), Some(90));
    }
}
