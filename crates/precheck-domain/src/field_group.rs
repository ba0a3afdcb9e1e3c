//! Field groups - the two section triplets extracted from support artifacts

use std::fmt;

/// Section markers for the description triplet
pub const DESCRIPTION_MARKERS: [&str; 3] = [
    "[1. Detail Test Steps:]",
    "[2. Expected Result:]",
    "[3. Actual Result:]",
];

/// Section markers for the resolution triplet
pub const RESOLUTION_MARKERS: [&str; 3] = [
    "[1. Workaround:]",
    "[2. Description of the correction:]",
    "[3. Test requirements:]",
];

/// Intent queries used to score chunk relevance for the description triplet
pub const DESCRIPTION_QUERIES: [&str; 3] = [
    "What are the test actions performed?",
    "What should happen if everything works correctly?",
    "What actually happened during the test?",
];

/// Intent queries used to score chunk relevance for the resolution triplet
pub const RESOLUTION_QUERIES: [&str; 3] = [
    "What workaround was used before applying a full fix?",
    "What correction or change was implemented to fix the issue?",
    "How was the correction tested or validated?",
];

/// One of the two triplets extracted from a document
///
/// - Description: test steps / expected result / actual result
/// - Resolution: workaround / correction / test requirements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldGroup {
    /// Test steps, expected result, actual result
    Description,

    /// Workaround, description of the correction, test requirements
    Resolution,
}

impl FieldGroup {
    /// Both groups, in the order they are usually extracted
    pub const ALL: [FieldGroup; 2] = [FieldGroup::Description, FieldGroup::Resolution];

    /// Short group code ("desc" or "reso")
    pub fn code(&self) -> &'static str {
        match self {
            FieldGroup::Description => "desc",
            FieldGroup::Resolution => "reso",
        }
    }

    /// Key under which the group's result is returned
    pub fn result_key(&self) -> &'static str {
        match self {
            FieldGroup::Description => "description",
            FieldGroup::Resolution => "resolution",
        }
    }

    /// The three literal, case-sensitive section markers, in order
    pub fn markers(&self) -> [&'static str; 3] {
        match self {
            FieldGroup::Description => DESCRIPTION_MARKERS,
            FieldGroup::Resolution => RESOLUTION_MARKERS,
        }
    }

    /// The three fixed intent queries, in order
    pub fn intent_queries(&self) -> [&'static str; 3] {
        match self {
            FieldGroup::Description => DESCRIPTION_QUERIES,
            FieldGroup::Resolution => RESOLUTION_QUERIES,
        }
    }

    /// Parse a group from its code or result key
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "desc" | "description" => Some(FieldGroup::Description),
            "reso" | "resolution" => Some(FieldGroup::Resolution),
            _ => None,
        }
    }
}

impl fmt::Display for FieldGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for FieldGroup {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid field group: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_codes_and_keys() {
        assert_eq!(FieldGroup::Description.code(), "desc");
        assert_eq!(FieldGroup::Resolution.code(), "reso");
        assert_eq!(FieldGroup::Description.result_key(), "description");
        assert_eq!(FieldGroup::Resolution.result_key(), "resolution");
    }

    #[test]
    fn test_parse_accepts_code_and_key() {
        assert_eq!(FieldGroup::parse("desc"), Some(FieldGroup::Description));
        assert_eq!(FieldGroup::parse("Resolution"), Some(FieldGroup::Resolution));
        assert_eq!(FieldGroup::parse("summary"), None);
        assert!("bogus".parse::<FieldGroup>().is_err());
    }

    #[test]
    fn test_markers_and_queries_are_distinct_per_group() {
        for group in FieldGroup::ALL {
            let markers = group.markers();
            assert!(markers[0].starts_with("[1."));
            assert!(markers[1].starts_with("[2."));
            assert!(markers[2].starts_with("[3."));
        }
        assert_ne!(
            FieldGroup::Description.intent_queries(),
            FieldGroup::Resolution.intent_queries()
        );
    }
}
