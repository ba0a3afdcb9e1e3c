//! Segmentation of long bodies into chunks, and the noise filter

use crate::normalize::char_len;

/// Abbreviations that end with a period but do not end a sentence
const ABBREVIATIONS: &[&str] = &[
    "e.g.", "i.e.", "etc.", "vs.", "approx.", "no.", "nr.", "fig.", "ref.", "ver.", "rel.",
    "dr.", "mr.", "mrs.", "ms.", "max.", "min.", "avg.", "incl.", "excl.",
];

/// Splits normalized text into an ordered, non-overlapping chunk sequence
///
/// Sentences (or paragraphs, when sentence splitting is degenerate) are
/// packed greedily up to `max_chunk_size` characters and joined with a
/// single space. A unit is never split across two chunks, so one sentence
/// longer than `max_chunk_size` becomes its own oversized chunk.
#[derive(Debug, Clone, Copy)]
pub struct TextChunker {
    max_chunk_size: usize,
    coverage_ratio: f64,
}

impl TextChunker {
    /// Create a new text chunker
    pub fn new(max_chunk_size: usize, coverage_ratio: f64) -> Self {
        Self {
            max_chunk_size,
            coverage_ratio,
        }
    }

    /// Chunk the given text
    pub fn chunk(&self, text: &str) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut current = String::new();
        let mut current_len = 0;

        for unit in self.units(text) {
            let unit = unit.trim();
            if unit.is_empty() {
                continue;
            }
            let unit_len = char_len(unit);

            if current.is_empty() {
                current.push_str(unit);
                current_len = unit_len;
            } else if current_len + unit_len + 1 <= self.max_chunk_size {
                current.push(' ');
                current.push_str(unit);
                current_len += unit_len + 1;
            } else {
                chunks.push(std::mem::take(&mut current));
                current.push_str(unit);
                current_len = unit_len;
            }
        }

        if !current.is_empty() {
            chunks.push(current);
        }

        chunks
    }

    /// Sentences, or blank-line paragraphs when sentences cover too little
    fn units<'a>(&self, text: &'a str) -> Vec<&'a str> {
        let sentences = split_sentences(text);
        let covered: usize = sentences.iter().map(|s| char_len(s)).sum::<usize>()
            + sentences.len().saturating_sub(1);

        if sentences.is_empty() || (covered as f64) < char_len(text) as f64 * self.coverage_ratio {
            split_paragraphs(text)
        } else {
            sentences
        }
    }
}

/// Split text into sentences
///
/// A sentence ends at `.`, `!` or `?` (plus trailing quotes or brackets)
/// followed by whitespace, unless the next word starts lowercase on the same
/// line, or the period closes an abbreviation or a short section number
/// such as `1.`.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if !matches!(c, '.' | '!' | '?') {
            continue;
        }

        let mut end = i + c.len_utf8();
        while let Some(&(j, next)) = chars.peek() {
            if matches!(next, '.' | '!' | '?' | '"' | '\'' | ')' | ']') {
                end = j + next.len_utf8();
                chars.next();
            } else {
                break;
            }
        }

        let rest = &text[end..];
        match rest.chars().next() {
            Some(next) if next.is_whitespace() => {}
            _ => continue,
        }
        if c == '.' && ends_with_abbreviation(&text[start..end]) {
            continue;
        }

        let same_line = !rest.trim_start_matches([' ', '\t']).starts_with('\n');
        let next_visible = rest.trim_start().chars().next();
        if same_line && next_visible.is_some_and(char::is_lowercase) {
            continue;
        }

        let sentence = text[start..end].trim();
        if !sentence.is_empty() {
            sentences.push(sentence);
        }
        start = end;
    }

    let tail = text[start..].trim();
    if !tail.is_empty() {
        sentences.push(tail);
    }

    sentences
}

fn ends_with_abbreviation(candidate: &str) -> bool {
    let last_word = candidate
        .rsplit(|c: char| c.is_whitespace() || c == '(' || c == '[')
        .next()
        .unwrap_or("");

    let digits = last_word.trim_end_matches('.');
    if !digits.is_empty() && digits.len() <= 2 && digits.chars().all(|c| c.is_ascii_digit()) {
        return true;
    }

    let lower = last_word.to_lowercase();
    ABBREVIATIONS.iter().any(|abbr| lower == *abbr)
}

/// Split on blank lines
fn split_paragraphs(text: &str) -> Vec<&str> {
    text.split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect()
}

/// Drops chunks too short to carry signal
#[derive(Debug, Clone, Copy)]
pub struct NoiseFilter {
    min_chunk_length: usize,
}

impl NoiseFilter {
    /// Keep chunks with at least `min_chunk_length` characters once trimmed
    pub fn new(min_chunk_length: usize) -> Self {
        Self { min_chunk_length }
    }

    /// Filter chunks, preserving order
    pub fn filter(&self, chunks: Vec<String>) -> Vec<String> {
        chunks
            .into_iter()
            .filter(|c| char_len(c.trim()) >= self.min_chunk_length)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_split_sentences_basic() {
        let text = "The node rebooted. Alarms were raised! Was the fix applied? Yes.";
        assert_eq!(
            split_sentences(text),
            vec![
                "The node rebooted.",
                "Alarms were raised!",
                "Was the fix applied?",
                "Yes."
            ]
        );
    }

    #[test]
    fn test_split_sentences_keeps_abbreviations_and_numbers() {
        let text = "Use a tool, e.g. Wireshark. See section 3.2 for details. Run v1.4 again.";
        assert_eq!(
            split_sentences(text),
            vec![
                "Use a tool, e.g. Wireshark.",
                "See section 3.2 for details.",
                "Run v1.4 again."
            ]
        );
    }

    #[test]
    fn test_split_sentences_keeps_section_numbers() {
        let text = "[1. Detail Test Steps:] Attach the UE. Then detach it.";
        assert_eq!(
            split_sentences(text),
            vec!["[1. Detail Test Steps:] Attach the UE.", "Then detach it."]
        );
    }

    #[test]
    fn test_split_sentences_on_line_break_before_lowercase() {
        let text = "Step one done.\nnext step pending";
        assert_eq!(split_sentences(text), vec!["Step one done.", "next step pending"]);
    }

    #[test]
    fn test_packs_sentences_under_limit() {
        let chunker = TextChunker::new(45, 0.5);
        let text = "First sentence here. Second sentence here. Third sentence here.";
        let chunks = chunker.chunk(text);

        assert_eq!(
            chunks,
            vec![
                "First sentence here. Second sentence here.".to_string(),
                "Third sentence here.".to_string(),
            ]
        );
        assert_eq!(chunks.join(" "), text);
    }

    #[test]
    fn test_oversized_sentence_becomes_own_chunk() {
        let chunker = TextChunker::new(20, 0.5);
        let long = format!("{}.", "A".repeat(50));
        let text = format!("Short one. {} Tail end.", long);
        let chunks = chunker.chunk(&text);

        assert_eq!(chunks, vec!["Short one.".to_string(), long, "Tail end.".to_string()]);
    }

    #[test]
    fn test_paragraph_fallback_when_sentences_degenerate() {
        // A coverage ratio above 1 forces the paragraph path
        let chunker = TextChunker::new(1_000, 1.1);
        let text = "alpha one. beta two\n\ngamma three";
        assert_eq!(
            chunker.chunk(text),
            vec!["alpha one. beta two gamma three".to_string()]
        );

        let chunker = TextChunker::new(15, 1.1);
        assert_eq!(
            chunker.chunk(text),
            vec!["alpha one. beta two".to_string(), "gamma three".to_string()]
        );
    }

    #[test]
    fn test_empty_text() {
        let chunker = TextChunker::new(100, 0.5);
        assert!(chunker.chunk("").is_empty());
        assert!(chunker.chunk("   \n ").is_empty());
    }

    #[test]
    fn test_noise_filter() {
        let filter = NoiseFilter::new(30);
        let chunks = vec![
            "ok".to_string(),
            "This chunk is long enough to be kept.".to_string(),
            format!("   {}   ", "x".repeat(29)),
            "Another chunk that clearly carries signal.".to_string(),
        ];
        assert_eq!(
            filter.filter(chunks),
            vec![
                "This chunk is long enough to be kept.".to_string(),
                "Another chunk that clearly carries signal.".to_string(),
            ]
        );
    }

    proptest! {
        #[test]
        fn prop_chunks_preserve_order_and_bound(
            words in prop::collection::vec("[A-Z][a-z]{1,12}\\.", 1..80),
            max in 10usize..200,
        ) {
            let text = words.join(" ");
            let chunker = TextChunker::new(max, 0.5);
            let chunks = chunker.chunk(&text);

            prop_assert_eq!(chunks.join(" "), text);
            for chunk in &chunks {
                // Only a single indivisible sentence may exceed the bound
                prop_assert!(char_len(chunk) <= max || split_sentences(chunk).len() == 1);
            }
        }
    }
}
