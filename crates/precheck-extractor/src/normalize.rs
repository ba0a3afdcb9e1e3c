//! Boilerplate stripping for raw extracted text

use crate::config::ExtractorConfig;
use crate::error::ExtractorError;
use regex::Regex;

/// Removes mail headers, greetings/sign-offs and separator lines
///
/// Works line by line: every kept line is trimmed, and the kept lines are
/// joined with `\n`. Technical content is never dropped for being long.
#[derive(Debug, Clone)]
pub struct TextNormalizer {
    header: Option<Regex>,
    boilerplate: Vec<String>,
    separator: String,
}

impl TextNormalizer {
    /// Build a normalizer from explicit rules
    pub fn new(
        header_fields: &[String],
        boilerplate_phrases: &[String],
        separator_min_dashes: usize,
    ) -> Result<Self, ExtractorError> {
        let fields: Vec<String> = header_fields
            .iter()
            .map(|f| f.trim())
            .filter(|f| !f.is_empty())
            .map(regex::escape)
            .collect();

        let header = if fields.is_empty() {
            None
        } else {
            let pattern = format!("(?i)^(?:{}):", fields.join("|"));
            Some(Regex::new(&pattern).map_err(|e| {
                ExtractorError::Config(format!("Invalid header pattern: {}", e))
            })?)
        };

        Ok(Self {
            header,
            boilerplate: boilerplate_phrases
                .iter()
                .map(|p| p.trim().to_lowercase())
                .filter(|p| !p.is_empty())
                .collect(),
            separator: "-".repeat(separator_min_dashes.max(1)),
        })
    }

    /// Build a normalizer from the extractor configuration
    pub fn from_config(config: &ExtractorConfig) -> Result<Self, ExtractorError> {
        Self::new(
            &config.header_fields,
            &config.boilerplate_phrases,
            config.separator_min_dashes,
        )
    }

    /// Normalize `text`; empty input yields empty output
    pub fn normalize(&self, text: &str) -> String {
        text.lines()
            .map(str::trim)
            .filter(|line| self.keep(line))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn keep(&self, line: &str) -> bool {
        if line.is_empty() {
            return false;
        }
        if self.header.as_ref().is_some_and(|re| re.is_match(line)) {
            return false;
        }
        if !self.boilerplate.is_empty() {
            let lower = line.to_lowercase();
            if self.boilerplate.iter().any(|p| lower.contains(p.as_str())) {
                return false;
            }
        }
        !line.starts_with(&self.separator)
    }
}

/// Length in characters
pub(crate) fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// The first `max_chars` characters of `text`
pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn normalizer() -> TextNormalizer {
        TextNormalizer::from_config(&ExtractorConfig::default()).unwrap()
    }

    #[test]
    fn test_strips_headers_case_insensitively() {
        let text = "From: alice@example.com\nSUBJECT: Link down\nsent: Monday\nThe S1 link dropped.";
        assert_eq!(normalizer().normalize(text), "The S1 link dropped.");
    }

    #[test]
    fn test_header_must_be_at_line_start() {
        let text = "Traffic sent: 10 Mbps";
        assert_eq!(normalizer().normalize(text), "Traffic sent: 10 Mbps");
    }

    #[test]
    fn test_strips_boilerplate_and_separators() {
        let text = "Hi team,\n\nCell 3 fails attach.\nThanks,\nBest Regards\n----- Forwarded message -----\n-----Original-----\nBob";
        assert_eq!(normalizer().normalize(text), "Hi team,\nCell 3 fails attach.\nBob");
    }

    #[test]
    fn test_short_dash_runs_are_kept() {
        let text = "--- trace.txt ---\n-- retry";
        assert_eq!(normalizer().normalize(text), "--- trace.txt ---\n-- retry");
    }

    #[test]
    fn test_trims_and_drops_blank_lines() {
        let text = "   step one   \n\n\t\n  step two";
        assert_eq!(normalizer().normalize(text), "step one\nstep two");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(normalizer().normalize(""), "");
    }

    #[test]
    fn test_custom_rules() {
        let n = TextNormalizer::new(&["reply-to".to_string()], &["cheers".to_string()], 3).unwrap();
        let text = "Reply-To: x\nCheers mate\n--- cut\nThanks for the logs";
        assert_eq!(n.normalize(text), "Thanks for the logs");
    }

    #[test]
    fn test_truncate_chars_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(char_len("héllo"), 5);
    }

    proptest! {
        #[test]
        fn prop_normalize_is_idempotent(text in "[a-zA-Z:\\- \\n]{0,200}") {
            let n = normalizer();
            let once = n.normalize(&text);
            prop_assert_eq!(n.normalize(&once), once.clone());
        }
    }
}
