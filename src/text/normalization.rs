// WHY: standalone normalization so every offset is computed on one canonical text
// Punctuation folding is one char → one char, so char counts survive normalization

/// Map typographic punctuation to the ASCII form the pattern library expects
fn fold_punctuation(ch: char) -> char {
    match ch {
        '\u{201C}' | '\u{201D}' => '"',
        '\u{2018}' | '\u{2019}' => '\'',
        '\u{2014}' | '\u{2013}' => '-',
        _ => ch,
    }
}

/// Canonicalize smart quotes and em/en dashes to ASCII
pub fn normalize_text(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    normalize_text_into(text, &mut result);
    result
}

/// Normalize into supplied buffer to avoid allocation
/// WHY: enables buffer reuse when a batch scores many short passages
pub fn normalize_text_into(text: &str, buffer: &mut String) {
    buffer.clear();
    buffer.reserve(text.len());
    buffer.extend(text.chars().map(fold_punctuation));
}

/// Collapse every whitespace run (line breaks included) into one space and trim the ends
/// Used to print sampled hits on a single line
pub fn collapse_whitespace(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    collapse_whitespace_into(text, &mut result);
    result
}

pub fn collapse_whitespace_into(text: &str, buffer: &mut String) {
    buffer.clear();
    buffer.reserve(text.len());

    let mut prev_was_space = true; // swallows leading whitespace
    for ch in text.chars() {
        if ch.is_whitespace() {
            if !prev_was_space {
                buffer.push(' ');
                prev_was_space = true;
            }
        } else {
            buffer.push(ch);
            prev_was_space = false;
        }
    }

    if buffer.ends_with(' ') {
        buffer.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_smart_quotes_and_dashes() {
        let input = "\u{201C}It wasn\u{2019}t loud\u{2014}it was deafening\u{2013}really.\u{201D}";
        assert_eq!(normalize_text(input), "\"It wasn't loud-it was deafening-really.\"");
    }

    #[test]
    fn test_normalize_preserves_char_count() {
        let input = "\u{2018}a\u{2019} \u{2014} b \u{2013} \u{201C}c\u{201D} ü 世";
        let output = normalize_text(input);
        assert_eq!(input.chars().count(), output.chars().count());
    }

    #[test]
    fn test_normalize_into_buffer_reuse() {
        let mut buffer = String::new();
        normalize_text_into("don\u{2019}t", &mut buffer);
        assert_eq!(buffer, "don't");
        normalize_text_into("plain", &mut buffer);
        assert_eq!(buffer, "plain");
    }

    #[test]
    fn test_normalize_empty() {
        assert_eq!(normalize_text(""), "");
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  It wasn't\n\nloud.\r\n\tIt was.  "), "It wasn't loud. It was.");
        assert_eq!(collapse_whitespace("   "), "");
        assert_eq!(collapse_whitespace(""), "");
    }
}
