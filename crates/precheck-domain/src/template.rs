//! The three-section output template shared by the structured parser and the LLM contract

use crate::FieldGroup;

/// Content of the three sections of one field group, in marker order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionTriplet {
    /// Section 1 (test steps / workaround)
    pub first: String,

    /// Section 2 (expected result / description of the correction)
    pub second: String,

    /// Section 3 (actual result / test requirements)
    pub third: String,
}

impl SectionTriplet {
    /// Create a triplet from three section bodies
    pub fn new(
        first: impl Into<String>,
        second: impl Into<String>,
        third: impl Into<String>,
    ) -> Self {
        Self {
            first: first.into(),
            second: second.into(),
            third: third.into(),
        }
    }

    /// True when every section body is empty
    pub fn is_empty(&self) -> bool {
        self.first.is_empty() && self.second.is_empty() && self.third.is_empty()
    }

    /// Render the canonical template for `group`
    ///
    /// Each marker is followed by a newline and its content; sections are
    /// separated by one blank line.
    ///
    /// ```
    /// use precheck_domain::{FieldGroup, SectionTriplet};
    ///
    /// let text = SectionTriplet::new("Did X", "Y happens", "Y happened")
    ///     .render(FieldGroup::Description);
    /// assert_eq!(
    ///     text,
    ///     "[1. Detail Test Steps:]\nDid X\n\n[2. Expected Result:]\nY happens\n\n[3. Actual Result:]\nY happened"
    /// );
    /// ```
    pub fn render(&self, group: FieldGroup) -> String {
        let [m1, m2, m3] = group.markers();
        format!(
            "{}\n{}\n\n{}\n{}\n\n{}\n{}",
            m1, self.first, m2, self.second, m3, self.third
        )
    }
}

/// Render the template with empty section bodies
pub fn empty_template(group: FieldGroup) -> String {
    SectionTriplet::default().render(group)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_resolution_template() {
        assert_eq!(
            empty_template(FieldGroup::Resolution),
            "[1. Workaround:]\n\n\n[2. Description of the correction:]\n\n\n[3. Test requirements:]\n"
        );
    }

    #[test]
    fn test_render_keeps_marker_order() {
        let text = SectionTriplet::new("a", "b", "c").render(FieldGroup::Resolution);
        let w = text.find("[1. Workaround:]").unwrap();
        let c = text.find("[2. Description of the correction:]").unwrap();
        let t = text.find("[3. Test requirements:]").unwrap();
        assert!(w < c && c < t);
        assert!(text.ends_with("[3. Test requirements:]\nc"));
    }

    #[test]
    fn test_is_empty() {
        assert!(SectionTriplet::default().is_empty());
        assert!(!SectionTriplet::new("", "", "x").is_empty());
    }
}
