//! Prompt construction for triplet extraction

use crate::normalize::truncate_chars;
use precheck_domain::FieldGroup;

/// Opening delimiter around the embedded text
pub const INPUT_START: &str = "========= TEXT INPUT =========";

/// Closing delimiter around the embedded text
pub const INPUT_END: &str = "========= END =========";

const DEFAULT_MAX_CHARS: usize = 9_000;

/// Builds the single extraction prompt for one field group
pub struct PromptBuilder<'a> {
    text: &'a str,
    group: FieldGroup,
    max_chars: usize,
}

impl<'a> PromptBuilder<'a> {
    /// Create a new prompt builder
    pub fn new(text: &'a str, group: FieldGroup) -> Self {
        Self {
            text,
            group,
            max_chars: DEFAULT_MAX_CHARS,
        }
    }

    /// Bound on the characters of `text` embedded in the prompt
    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = max_chars;
        self
    }

    /// Build the complete extraction prompt
    pub fn build(&self) -> String {
        let markers = self.group.markers();
        let mut prompt = String::new();

        // 1. Header naming the target sections
        prompt.push_str("You are a telecom test engineer. Extract these three sections: ");
        prompt.push_str(&markers.join(", "));
        prompt.push_str("\n\n");

        // 2. Rules, with the literal template
        prompt.push_str("Rules:\n");
        prompt.push_str("- Output MUST be EXACTLY the following template:\n");
        prompt.push_str(&template_skeleton(self.group));
        prompt.push('\n');
        prompt.push_str(focus_rule(self.group));
        prompt.push('\n');
        prompt.push_str(COMMON_RULES);
        prompt.push_str("\n\n");

        // 3. The text, truncated
        prompt.push_str(INPUT_START);
        prompt.push('\n');
        prompt.push_str(truncate_chars(self.text, self.max_chars));
        prompt.push('\n');
        prompt.push_str(INPUT_END);

        prompt
    }
}

/// The three markers, each followed by a content placeholder
fn template_skeleton(group: FieldGroup) -> String {
    group
        .markers()
        .iter()
        .map(|marker| format!("{}\n<content>", marker))
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn focus_rule(group: FieldGroup) -> &'static str {
    match group {
        FieldGroup::Description => {
            "- Focus ONLY on test steps, expected behavior, and actual observed results."
        }
        FieldGroup::Resolution => {
            "- Focus ONLY on workaround logic, the implemented correction, and how it was tested/validated."
        }
    }
}

const COMMON_RULES: &str = "- Keep the headers exactly as written and in this order, with one blank line between sections.
- Remove names, email headers, signatures, and non-technical fluff.
- Do not add greetings, commentary, or markdown code fences.
- Be concise and technical. Use bullet points only if they add technical value.";

#[cfg(test)]
mod tests {
    use super::*;

    /// Text between the input delimiters
    fn embedded_text(prompt: &str) -> &str {
        let start = prompt.find(INPUT_START).unwrap() + INPUT_START.len() + 1;
        let end = prompt.rfind(INPUT_END).unwrap() - 1;
        &prompt[start..end]
    }

    #[test]
    fn test_prompt_names_description_sections() {
        let prompt = PromptBuilder::new("Cell 7 drops calls", FieldGroup::Description).build();
        assert!(prompt.starts_with("You are a telecom test engineer."));
        assert!(prompt.contains(
            "[1. Detail Test Steps:]\n<content>\n\n[2. Expected Result:]\n<content>\n\n[3. Actual Result:]\n<content>"
        ));
        assert!(prompt.contains("actual observed results"));
        assert!(!prompt.contains("[1. Workaround:]"));
    }

    #[test]
    fn test_prompt_names_resolution_sections() {
        let prompt = PromptBuilder::new("Patched the timer", FieldGroup::Resolution).build();
        assert!(prompt.contains(
            "Extract these three sections: [1. Workaround:], [2. Description of the correction:], [3. Test requirements:]"
        ));
        assert!(prompt.contains("tested/validated"));
    }

    #[test]
    fn test_prompt_wraps_text_in_delimiters() {
        let prompt = PromptBuilder::new("Alarm 1234 raised", FieldGroup::Description).build();
        assert!(prompt.contains("========= TEXT INPUT =========\nAlarm 1234 raised\n========= END ========="));
        assert!(prompt.ends_with(INPUT_END));
        assert_eq!(embedded_text(&prompt), "Alarm 1234 raised");
    }

    #[test]
    fn test_prompt_truncates_text() {
        let text = "é".repeat(50);
        let prompt = PromptBuilder::new(&text, FieldGroup::Resolution)
            .with_max_chars(10)
            .build();
        assert_eq!(embedded_text(&prompt), "é".repeat(10));
    }

    #[test]
    fn test_prompt_forbids_fences() {
        let prompt = PromptBuilder::new("x", FieldGroup::Description).build();
        assert!(prompt.contains("markdown code fences"));
    }
}
