// WHY: a deterministic, dependency-free verb tagger so stage 2 runs without an external model
// Tokens are words (contractions kept whole), single punctuation chars and whitespace runs

use std::collections::HashSet;

use super::{TaggedStream, Tagger};
use crate::error::TaggerError;
use crate::text::Span;

/// Class tag substituted for lexical verbs
pub const VERB_TAG: &str = "VERB";

/// Regular lexical verbs; inflections are generated
const REGULAR_VERBS: &[&str] = &[
    "amplify", "answer", "arrive", "ask", "believe", "breathe", "call", "care", "carry", "change",
    "decide", "decode", "die", "disappear", "dream", "echo", "emit", "end", "explain", "fade",
    "fail", "help", "hope", "hunt", "ignore", "interpret", "jump", "laugh", "learn", "listen",
    "live", "look", "love", "matter", "move", "need", "notice", "open", "pause", "play", "pray",
    "pretend", "promise", "protect", "pull", "push", "react", "realize", "remember", "remind",
    "reply", "rest", "return", "scream", "search", "seem", "shatter", "shout", "signal", "smile",
    "start", "stay", "stop", "survive", "talk", "test", "touch", "translate", "try", "turn",
    "use", "wait", "walk", "want", "warn", "watch", "whisper", "wonder", "work", "worry",
];

/// Irregular verb forms listed explicitly
const IRREGULAR_FORMS: &[&str] = &[
    "begin", "began", "begun", "beginning", "begins", "break", "broke", "broken", "breaking",
    "bring", "brought", "bringing", "build", "built", "building", "buy", "bought", "catch",
    "caught", "choose", "chose", "chosen", "come", "came", "coming", "comes", "feel", "felt",
    "feeling", "feels", "fight", "fought", "find", "found", "finding", "finds", "forget",
    "forgot", "forgotten", "give", "gave", "given", "giving", "gives", "go", "went", "gone",
    "going", "goes", "grow", "grew", "grown", "growing", "hear", "heard", "hearing", "hears",
    "hide", "hid", "hidden", "hold", "held", "holding", "keep", "kept", "keeping", "know",
    "knew", "known", "knowing", "knows", "leave", "left", "leaving", "lose", "lost", "losing",
    "make", "made", "making", "makes", "mean", "meant", "meaning", "means", "run", "ran",
    "running", "runs", "say", "said", "saying", "says", "see", "saw", "seen", "seeing", "sees",
    "sing", "sang", "sung", "sit", "sat", "sleep", "slept", "speak", "spoke", "spoken",
    "speaking", "speaks", "stand", "stood", "standing", "take", "took", "taken", "taking",
    "takes", "teach", "taught", "teaching", "teaches", "tell", "told", "telling", "tells",
    "think", "thought", "thinking", "thinks", "understand", "understood", "wake", "woke",
    "write", "wrote", "written", "writing", "writes",
];

/// Words ending in -ing that are not gerunds
const ING_EXCEPTIONS: &[&str] = &[
    "anything", "ceiling", "darling", "during", "evening", "everything", "king", "morning",
    "nothing", "something", "spring", "string", "thing", "wedding", "wing",
];

fn is_vowel(ch: u8) -> bool {
    matches!(ch, b'a' | b'e' | b'i' | b'o' | b'u')
}

/// Regular inflections: base, third person, past, gerund
fn inflect(base: &str) -> [String; 4] {
    let bytes = base.as_bytes();
    let last = bytes[bytes.len() - 1];
    let before_last = bytes.len().checked_sub(2).map(|i| bytes[i]);
    let consonant_y = last == b'y' && before_last.is_some_and(|b| !is_vowel(b));
    let stem = &base[..base.len() - 1];

    let third = if consonant_y {
        format!("{stem}ies")
    } else if base.ends_with('s') || base.ends_with("sh") || base.ends_with("ch") || base.ends_with('x') || base.ends_with('o') {
        format!("{base}es")
    } else {
        format!("{base}s")
    };

    let past = if consonant_y {
        format!("{stem}ied")
    } else if last == b'e' {
        format!("{base}d")
    } else {
        format!("{base}ed")
    };

    let gerund = if base.ends_with("ie") {
        format!("{}ying", &base[..base.len() - 2])
    } else if last == b'e' && !base.ends_with("ee") && base.len() > 2 {
        format!("{stem}ing")
    } else {
        format!("{base}ing")
    };

    [base.to_string(), third, past, gerund]
}

/// Character class of the current scan position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenKind {
    Word,
    Space,
    Other,
}

fn classify(ch: char) -> TokenKind {
    if ch.is_whitespace() {
        TokenKind::Space
    } else if ch.is_alphanumeric() {
        TokenKind::Word
    } else {
        TokenKind::Other
    }
}

/// Rule-based verb tagger
#[derive(Debug, Clone)]
pub struct LexiconTagger {
    verbs: HashSet<String>,
    ing_exceptions: HashSet<&'static str>,
    gerund_heuristic: bool,
}

impl LexiconTagger {
    /// Tagger over an explicit set of (lowercase) verb forms
    pub fn new(verbs: impl IntoIterator<Item = String>) -> Self {
        Self {
            verbs: verbs.into_iter().map(|v| v.to_lowercase()).collect(),
            ing_exceptions: ING_EXCEPTIONS.iter().copied().collect(),
            gerund_heuristic: false,
        }
    }

    /// Built-in lexicon with gerund detection enabled
    pub fn with_default_lexicon() -> Self {
        let verbs = REGULAR_VERBS
            .iter()
            .flat_map(|base| inflect(base))
            .chain(IRREGULAR_FORMS.iter().map(|form| form.to_string()));
        Self::new(verbs).with_gerund_heuristic(true)
    }

    /// Treat unknown words ending in -ing (6+ chars) as verbs
    pub fn with_gerund_heuristic(mut self, enabled: bool) -> Self {
        self.gerund_heuristic = enabled;
        self
    }

    pub fn is_verb(&self, word: &str) -> bool {
        let lower = word.to_lowercase();
        if self.verbs.contains(&lower) {
            return true;
        }
        self.gerund_heuristic
            && lower.len() >= 6
            && lower.ends_with("ing")
            && !self.ing_exceptions.contains(lower.as_str())
    }

    fn emit_token(&self, tagged: &mut TaggedStream, text: &str, span: Span, kind: TokenKind) {
        let raw = span.slice(text);
        if kind == TokenKind::Word && self.is_verb(raw) {
            tagged.emit(VERB_TAG, span);
        } else {
            tagged.emit(raw, span);
        }
    }
}

impl Tagger for LexiconTagger {
    fn name(&self) -> &'static str {
        "lexicon"
    }

    fn tag(&self, text: &str) -> Result<TaggedStream, TaggerError> {
        let mut tagged = TaggedStream {
            stream: String::with_capacity(text.len()),
            pieces: Vec::new(),
        };

        let mut chars = text.char_indices().peekable();
        while let Some((start, ch)) = chars.next() {
            let kind = classify(ch);
            let mut end = start + ch.len_utf8();

            match kind {
                TokenKind::Other => {}
                TokenKind::Space => {
                    while let Some(&(idx, next)) = chars.peek() {
                        if classify(next) != TokenKind::Space {
                            break;
                        }
                        end = idx + next.len_utf8();
                        chars.next();
                    }
                }
                TokenKind::Word => {
                    while let Some(&(idx, next)) = chars.peek() {
                        if classify(next) == TokenKind::Word {
                            end = idx + next.len_utf8();
                            chars.next();
                            continue;
                        }
                        // WHY: "doesn't" and "they're" stay one word so patterns can name them
                        let after = text[idx + next.len_utf8()..].chars().next();
                        if next == '\'' && after.is_some_and(char::is_alphabetic) {
                            end = idx + next.len_utf8();
                            chars.next();
                            continue;
                        }
                        break;
                    }
                }
            }

            self.emit_token(&mut tagged, text, Span::new(start, end), kind);
        }

        Ok(tagged)
    }
}
