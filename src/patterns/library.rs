//! Built-in contrastive-phrasing rules.
//!
//! Stage-1 rules run over normalized surface text; stage-2 rules run over the lexicon tagger's
//! stream, where lexical verbs appear as `VERB`. The engine has no look-around and no
//! back-references, so sentence anchoring uses the `hit` group, leading negative conditions use
//! guards, a trailing "not" is caught by the `reject` group, and the one back-reference rule is the
//! custom [`SameVerbEcho`] pattern.
//!
//! Templates use `{PRON}`, `{BE}` and `{BE_NEG}` placeholders expanded before compilation.

use regex_automata::meta::Regex;

use super::{compile, find_judged, Pattern, PatternConfig, RegexPattern};
use crate::error::PatternError;
use crate::text::Span;

/// Rule counts the built-in library promises
pub const SURFACE_RULES: usize = 10;
pub const ABSTRACTED_RULES: usize = 10;

const PRON: &str = r"(?:it|they|this|that)";
const BE: &str = r"(?:is|are|was|were)";
const BE_NEG: &str = r"(?:is\s+not|are\s+not|was\s+not|were\s+not|isn't|aren't|wasn't|weren't|ain't)";

/// Previous terminator (or chunk start) consumed outside the reported span
const SENTENCE_START: &str = r"(?:^|[.?!]\s)\s*";

/// A second "not" right after the closing verb turns the echo into another denial
const NOT_AFTER: &str = r"(?P<reject>\s+not\b)?";

/// Reporting frames such as "everyone knew that ..."
const REPORTED_SPEECH: &str =
    r"^[^.?!]{0,80}?\b(?:knew|know|thought|think|said|says|told|heard|learned)\b[^.?!]{0,40}?\bthat\b";

fn expand(template: &str) -> String {
    template
        .replace("{SENTENCE_START}", SENTENCE_START)
        .replace("{NOT_AFTER}", NOT_AFTER)
        .replace("{REPORTED_SPEECH}", REPORTED_SPEECH)
        .replace("{BE_NEG}", BE_NEG)
        .replace("{PRON}", PRON)
        .replace("{BE}", BE)
}

fn rule(
    name: &str,
    template: &str,
    max_span: Option<usize>,
) -> Result<(String, Box<dyn Pattern>), PatternError> {
    let mut pattern = RegexPattern::new(name, &expand(template))?;
    if let Some(max_span) = max_span {
        pattern = pattern.with_max_span(max_span);
    }
    Ok((name.to_string(), Box::new(pattern)))
}

fn guarded_rule(
    name: &str,
    template: &str,
    guard: &str,
    max_span: usize,
) -> Result<(String, Box<dyn Pattern>), PatternError> {
    let pattern = RegexPattern::new(name, &expand(template))?
        .with_guard(name, &expand(guard))?
        .with_max_span(max_span);
    Ok((name.to_string(), Box::new(pattern)))
}

/// "It didn't move. It moved." style echo of the negated verb
///
/// Captures up to three words after `do/does/did n't` and accepts the match when the word after
/// the next sentence's pronoun repeats one of them, optionally inflected.
#[derive(Debug)]
pub struct SameVerbEcho {
    regex: Regex,
}

const ECHO_SUFFIXES: [&str; 4] = ["ed", "es", "s", "ing"];

impl SameVerbEcho {
    pub const NAME: &'static str = "NOT_PERIOD_SAMEVERB";

    const TEMPLATE: &'static str = r"(?ix)
        (?:^|[.?!]\s)
        (?P<hit>
            [^.?!]{0,160}?\b(?:do|does|did)n't
            \s+(?P<w1>[a-z]+)(?:\s+(?P<w2>[a-z]+))?(?:\s+(?P<w3>[a-z]+))?\b
            [^.?!]{0,160}[.?!]\s*
            {PRON}\s+(?P<echo>[a-z]+)\b
        )";

    pub fn new() -> Result<Self, PatternError> {
        Ok(Self {
            regex: compile(Self::NAME, &expand(Self::TEMPLATE))?,
        })
    }

    fn echoes(verb: &str, echo: &str) -> bool {
        if verb.chars().count() < 3 {
            return false;
        }
        let verb = verb.to_lowercase();
        let echo = echo.to_lowercase();
        echo == verb
            || echo
                .strip_prefix(verb.as_str())
                .is_some_and(|suffix| ECHO_SUFFIXES.contains(&suffix))
    }
}

impl Pattern for SameVerbEcho {
    fn find_spans(&self, haystack: &str) -> Vec<Span> {
        find_judged(&self.regex, haystack, |caps| {
            let hit = caps.get_group_by_name("hit")?;
            let echo = &haystack[caps.get_group_by_name("echo")?.range()];
            ["w1", "w2", "w3"]
                .iter()
                .filter_map(|group| caps.get_group_by_name(group))
                .any(|word| Self::echoes(&haystack[word.range()], echo))
                .then(|| Span::new(hit.start, hit.end))
        })
    }

    fn max_span_hint(&self) -> Option<usize> {
        Some(380)
    }
}

/// Stage-1 rules, in evaluation order
pub fn surface_rules() -> Result<Vec<(String, Box<dyn Pattern>)>, PatternError> {
    Ok(vec![
        // "only"/"that" after a bare "not" is a different construction; "was not only" still counts
        guarded_rule(
            "NOT_BUT",
            r"(?ix) \b(?:{BE_NEG}|not)\s+ [^.?!]{1,100}? [,;:]\s*but\s+ (?:it\b(?P<reject>\s+(?:seems|appears|felt|looks?)\b)?|\w+)",
            r"(?i)^not\s+(?:that|only)\b|but\s+(?:when|while|which|who|whom|whose|where|if|that|as|because|although|though|till|until|unless|here|there|then|my|we|i|you|anything)$",
            140,
        )?,
        rule(
            "NOT_DASH",
            r"(?ix) \b(?:\w+n't|not)\s+(?:(?:just|only|merely)\s+)?[^.?!]{1,160}?(?:\s-\s|-)\s*{PRON}(?:'re|'s|\s+[*_~]*[a-z]\w*)",
            Some(220),
        )?,
        rule(
            "PRON_BE_NOT_SEP_BE",
            r#"(?ix) {SENTENCE_START}
            (?P<hit>
                ["']?(?:{PRON}\s+{BE}\s+not|{PRON}\s+{BE}n't|(?:it's|they're|that's)\s+not)\b
                [^.?!]{0,160}[.;:?!]\s*["']?
                {PRON}(?:\s+{BE}|'s|'re)\b
            ){NOT_AFTER}"#,
            Some(200),
        )?,
        guarded_rule(
            "NP_BE_NOT_SEP_THEY_BE",
            r#"(?ix) {SENTENCE_START}
            (?P<hit>
                [^.?!]{0,160}?\b{BE_NEG}\b[^.?!]{0,160}[.;:?!]\s*
                ["']?{PRON}(?:'re|\s+{BE})\b
            ){NOT_AFTER}"#,
            r"(?i){REPORTED_SPEECH}|^not\s+without\b|^[^.?!]{0,50}\bnot\s+put\b",
            360,
        )?,
        rule(
            "NO_LONGER",
            r"(?ix) {SENTENCE_START}
            (?P<hit>
                [^.?!]{0,160}?\bno\s+longer\b[^.;:?!]{0,160}[.;:?!]\s*{PRON}\s+{BE}\b
            ){NOT_AFTER}",
            Some(350),
        )?,
        rule(
            "NOT_JUST_SEP",
            r#"(?ix) {SENTENCE_START}
            (?P<hit>
                ["']?{PRON}(?:'s|'re|\s+{BE})?\s+not\s+just\b
                [^.?!]{0,160}[.?!]\s*["']?
                {PRON}(?:'s|'re|\s+{BE})\b
            ){NOT_AFTER}"#,
            Some(220),
        )?,
        (SameVerbEcho::NAME.to_string(), Box::new(SameVerbEcho::new()?) as Box<dyn Pattern>),
        guarded_rule(
            "SIMPLE_BE_NOT_IT_BE",
            r#"(?ix) {SENTENCE_START}
            (?P<hit>
                ["']?[^.?!]{0,160}?\b{BE_NEG}\b[^.?!]{0,160}[.;:?!]\s*["']?it(?:'s|\s+{BE})\b
            )"#,
            r#"(?i)^["']?(?:he|she|i|you|we)\b|{REPORTED_SPEECH}"#,
            360,
        )?,
        // lead-in allowed, e.g. "That means it's not just ..."
        rule(
            "EMBEDDED_NOT_JUST_SEP",
            r"(?ix) (?:^|[.?!]\s)
            (?P<hit>
                [^.?!]{0,80}?\b(?:(?:it|they)\s+(?:is|are)|it's|they're)\s+not\s+just\b
                [^.?!]{0,160}[.?!]\s*
                (?:(?:it|they)\s+(?:is|are)|it's|they're)\b
            )",
            Some(260),
        )?,
        rule(
            "DIALOGUE_NOT_JUST",
            r#"(?ix)
            ["']?{PRON}(?:'re|'s|\s+{BE})\s+not\s+just\b[^"']{0,160}["']?\s*
            (?:[^.?!]{0,80}\b(?:said|asked|whispered|muttered|replied|added|shouted|cried)\b[^.?!]{0,80}[.?!]\s*)?
            ["']?{PRON}(?:'re|'s|\s+{BE})\s+[*_~]?[a-z]\w*"#,
            Some(380),
        )?,
    ])
}

/// Stage-2 rules over the `VERB`-tagged stream, in evaluation order
pub fn abstracted_rules() -> Result<Vec<(String, Box<dyn Pattern>)>, PatternError> {
    Ok(vec![
        rule(
            "POS_DOESNT_VERB",
            r#"(?ix) ["']\s*(?:the\s+\w+|it|they|you)\s+doesn't\s+VERB[^.!?]*?[.!?]\s*(?:it|they|you|that)\s+[*_~]?(?:VERB|whispers?|reminds?|signals?|tests?|speaks?)"#,
            None,
        )?,
        rule(
            "POS_DONT_JUST_VERB",
            r#"(?ix) ["']\s*(?:they|you|it)\s+don't\s+just\s+VERB[^.!?]*?-\s*they\s+[*_~]?VERB"#,
            None,
        )?,
        // case-sensitive: the fragment must open with a capital "Not"
        rule(
            "POS_GERUND_FRAGMENT",
            r#"(?x) ["']\s*Not\s+just\s+VERB[.!?]\s+[*_~]?VERB[.!?]"#,
            Some(40),
        )?,
        rule(
            "POS_DASH_VERB",
            r"(?ix) \b(?:wasn't|weren't|isn't|aren't)\s+just\s+(?:VERB|a\s+\w+)[^-]{0,30}?-\s*(?:it|they)\s+(?:was|were|is|are|'s|'re)\s+[*_~]?(?:VERB|a\s+[*_~]?\w+)",
            Some(120),
        )?,
        rule(
            "POS_NOT_JUST_VERB_PAST",
            r"(?ix) \b(?:was|were)\s+not\s+just\s+(?:VERB|a\s+\w+)[.!?]\s+(?:it|they)\s+(?:was|were)\s+[*_~]?(?:VERB|a\s+[*_~]?\w+)",
            Some(100),
        )?,
        rule(
            "POS_COLON_VERB",
            r"(?ix) :\s+(?:the\s+\w+|it|they)\s+(?:was|were)\s+not\s+just\s+VERB[.!?]\s+(?:it|they)\s+(?:was|were)\s+[*_~]?VERB",
            Some(120),
        )?,
        rule(
            "POS_DASH_VERB_BROAD",
            r"(?ix) \b(?:wasn't|weren't|isn't|aren't|don't|doesn't)\s+just\s+(?:VERB|(?:the|a)\s+\w+)[^-]{0,40}?-\s*(?:it|they)\s+(?:(?:was|were|is|are|'s|'re)\s*)?[*_~]?(?:VERB|(?:the|a)\s+[*_~]?\w+)",
            Some(140),
        )?,
        rule(
            "POS_NOT_BECAUSE",
            r"(?ix) \bit's\s+not\s+because\s+[^.!?]{5,60}?[.!?]\s+(?:it's|that's)\s+because\s+[^.!?]{5,60}",
            Some(170),
        )?,
        rule(
            "POS_I_AM_NOT_SEMI",
            r"(?ix) \bI\s+am\s+not\s+VERB[^;]{5,80}?;\s*it\s+is\b",
            Some(120),
        )?,
        rule(
            "POS_SEMI_NOUN",
            r"(?ix) \b(?:were|was|are|is)\s+not\s+just\s+\w+;\s+(?:they|it)\s+(?:were|was|are|is)\s+a\s+\w+",
            None,
        )?,
    ])
}

impl PatternConfig {
    /// Built-in library, checked against its promised rule counts
    pub fn builtin() -> Result<Self, PatternError> {
        PatternConfig::new(surface_rules()?, abstracted_rules()?)?
            .expect_counts(SURFACE_RULES, ABSTRACTED_RULES)
    }
}
