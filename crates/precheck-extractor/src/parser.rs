//! Structured-template parsing and LLM output cleanup

use crate::error::ExtractorError;
use precheck_domain::{empty_template, FieldGroup, SectionTriplet};
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

static FIRST_SECTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\[1\..*?:\](.*?)\[2\.").expect("valid regex"));
static SECOND_SECTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\[2\..*?:\](.*?)\[3\.").expect("valid regex"));
static THIRD_SECTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\[3\..*?:\](.*)").expect("valid regex"));

/// True when all three markers of `group` occur literally in `text`
pub fn has_all_markers(group: FieldGroup, text: &str) -> bool {
    group.markers().iter().all(|marker| text.contains(marker))
}

/// Parse a body that already carries the group's bracketed sections
///
/// Returns `Ok(None)` when any marker is missing. The span examined runs
/// from the first `[1.` to a following `[4.` or the end of text; each
/// section's content is what lies between its marker and the next one,
/// trimmed. Markers in the wrong order give `TemplateParse`.
pub fn parse_structured(
    group: FieldGroup,
    body: &str,
) -> Result<Option<SectionTriplet>, ExtractorError> {
    if !has_all_markers(group, body) {
        return Ok(None);
    }

    let start = body
        .find("[1.")
        .ok_or_else(|| ExtractorError::TemplateParse("No first section".to_string()))?;
    let span = &body[start..];
    let span = match span.find("[4.") {
        Some(end) => &span[..end],
        None => span,
    };

    let first = capture(&FIRST_SECTION, span, 1)?;
    let second = capture(&SECOND_SECTION, span, 2)?;
    let third = capture(&THIRD_SECTION, span, 3)?;

    Ok(Some(SectionTriplet::new(first, second, third)))
}

fn capture<'a>(re: &Regex, span: &'a str, section: u8) -> Result<&'a str, ExtractorError> {
    re.captures(span)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .ok_or_else(|| {
            ExtractorError::TemplateParse(format!("Section {} could not be isolated", section))
        })
}

/// Turn a raw completion into the text returned for `group`
///
/// Blank output becomes the empty template. A surrounding markdown fence is
/// removed. Output carrying all three markers is re-rendered canonically,
/// unless it has text before the first section or a `[4.` section, which a
/// re-render would drop; such output and anything else is returned trimmed.
pub fn finalize_completion(group: FieldGroup, raw: &str) -> String {
    let text = strip_code_fence(raw);
    if text.is_empty() {
        return empty_template(group);
    }
    if has_text_outside_sections(text) {
        debug!("Completion has text outside the three sections, kept as-is");
        return text.to_string();
    }

    match parse_structured(group, text) {
        Ok(Some(triplet)) => triplet.render(group),
        Ok(None) => text.to_string(),
        Err(e) => {
            debug!("Completion kept as-is: {}", e);
            text.to_string()
        }
    }
}

/// Text before the first `[1.` or from a `[4.` onwards
fn has_text_outside_sections(text: &str) -> bool {
    match text.find("[1.") {
        Some(start) => !text[..start].trim().is_empty() || text[start..].contains("[4."),
        None => false,
    }
}

/// Remove a markdown code block wrapper, if any
fn strip_code_fence(response: &str) -> &str {
    let trimmed = response.trim();
    if !trimmed.starts_with("```") {
        return trimmed;
    }

    // Drop the opening line (``` or ```text) and a closing fence
    let body = match trimmed.find('\n') {
        Some(newline) => &trimmed[newline + 1..],
        None => return "",
    };
    let body = body.trim_end();
    body.strip_suffix("```").unwrap_or(body).trim()
}
