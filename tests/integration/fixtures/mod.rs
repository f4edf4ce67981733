// Test fixtures with known contrastive passages and expected counts
// WHY: corpus-level assertions need inputs whose hit counts are fixed by hand

/// Two contrast constructions separated by plain sentences
pub const TWO_HIT_TEXT: &str = "The lamp stood on the table. It wasn't loud. It was deafening. \
Rain fell all night. They were not afraid; they were furious. The morning came.";

/// Character count of TWO_HIT_TEXT
pub const TWO_HIT_CHARS: u64 = 142;

/// Plain narration without any contrastive framing
pub const NO_HIT_TEXT: &str = "Nothing to see here. The river ran on.";

/// Character count of NO_HIT_TEXT
pub const NO_HIT_CHARS: u64 = 38;

/// Single contrast written with a typographic apostrophe
pub const SMART_QUOTE_TEXT: &str = "It wasn\u{2019}t loud. It was deafening.";

/// Character count of SMART_QUOTE_TEXT (normalization keeps char counts)
pub const SMART_QUOTE_CHARS: u64 = 33;

/// Long document made of repeated paragraphs, each with one hit
pub fn generate_repeated_text(paragraphs: usize) -> String {
    let mut result = String::new();
    for i in 0..paragraphs {
        result.push_str(&format!(
            "Paragraph {i} opens quietly and the clock keeps time. It wasn't loud. It was deafening. \
The lamp burned low.\n\n"
        ));
    }
    result
}
