//! Source file intake: format dispatch, readers and multi-file merge.

use crate::error::{CliError, Result};
use precheck_extractor::TextNormalizer;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Input formats, chosen purely by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// RFC 822 mail (`.eml`)
    Email,
    /// Outlook message (`.msg`)
    OutlookMessage,
    /// Screenshot (`.jpg`, `.jpeg`, `.png`)
    Image,
    /// Plain text (`.txt`)
    PlainText,
}

impl SourceFormat {
    /// Format for `path`, or `None` when the extension is not supported.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "eml" => Some(SourceFormat::Email),
            "msg" => Some(SourceFormat::OutlookMessage),
            "jpg" | "jpeg" | "png" => Some(SourceFormat::Image),
            "txt" => Some(SourceFormat::PlainText),
            _ => None,
        }
    }

    /// Whether a file of this format can name the merged document.
    pub fn names_document(&self) -> bool {
        !matches!(self, SourceFormat::Image)
    }

    /// Read `path` as text.
    pub fn read(&self, path: &Path, normalizer: &TextNormalizer) -> Result<String> {
        match self {
            SourceFormat::PlainText => {
                let bytes = fs::read(path)?;
                Ok(String::from_utf8_lossy(&bytes).into_owned())
            }
            SourceFormat::Email => {
                let bytes = fs::read(path)?;
                let raw = String::from_utf8_lossy(&bytes);
                Ok(parse_email(&raw).to_text(normalizer))
            }
            SourceFormat::OutlookMessage => Err(CliError::UnsupportedFormat {
                file: display_name(path),
                reason: "Outlook .msg decoding needs an external parser".to_string(),
            }),
            SourceFormat::Image => Err(CliError::UnsupportedFormat {
                file: display_name(path),
                reason: "image text needs an OCR engine".to_string(),
            }),
        }
    }
}

/// Subject and text body of a mail message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmailMessage {
    /// Unfolded `Subject` header
    pub subject: String,
    /// Body text: plain parts as-is, HTML parts rendered to text, joined
    pub body: String,
}

impl EmailMessage {
    /// Subject, a blank line, then the normalized body.
    pub fn to_text(&self, normalizer: &TextNormalizer) -> String {
        format!("{}\n\n{}", self.subject.trim(), normalizer.normalize(&self.body))
            .trim()
            .to_string()
    }
}

/// Wrap width for text rendered from HTML parts
const HTML_WIDTH: usize = 120;

/// Parse an RFC 822 message.
///
/// Headers end at the first blank line and folded header lines are
/// unfolded. `multipart/*` bodies are walked depth first: `text/plain`
/// parts are kept, `text/html` parts are rendered to text, and other parts
/// such as attachments are skipped. Transfer encodings are not decoded.
pub fn parse_email(raw: &str) -> EmailMessage {
    let (headers, body) = split_headers(raw);
    let subject = header_value(&headers, "subject").unwrap_or_default();

    EmailMessage {
        subject,
        body: entity_text(&headers, body),
    }
}

/// Split into unfolded `(lower-cased name, value)` headers and the body.
fn split_headers(raw: &str) -> (Vec<(String, String)>, &str) {
    let mut headers: Vec<(String, String)> = Vec::new();
    let mut offset = 0;

    for line in raw.split_inclusive('\n') {
        offset += line.len();
        let line = line.trim_end_matches(['\r', '\n']);
        if line.is_empty() {
            return (headers, &raw[offset..]);
        }

        if line.starts_with([' ', '\t']) {
            if let Some((_, value)) = headers.last_mut() {
                value.push(' ');
                value.push_str(line.trim());
            }
        } else if let Some((name, value)) = line.split_once(':') {
            headers.push((name.trim().to_lowercase(), value.trim().to_string()));
        }
    }

    // No blank line: headers only
    (headers, "")
}

fn header_value(headers: &[(String, String)], name: &str) -> Option<String> {
    headers
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.clone())
}

/// Text carried by one MIME entity
fn entity_text(headers: &[(String, String)], body: &str) -> String {
    // No content type means text/plain
    let Some(content_type) = header_value(headers, "content-type") else {
        return body.trim().to_string();
    };
    let media_type = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase();

    match media_type.as_str() {
        "text/html" => html_to_text(body),
        m if m.starts_with("multipart/") => match boundary(&content_type) {
            Some(boundary) => multipart_text(body, &boundary),
            None => {
                debug!("Multipart entity without a boundary, keeping it as text");
                body.trim().to_string()
            }
        },
        m if m.starts_with("text/") => body.trim().to_string(),
        other => {
            debug!("Skipping {} part", other);
            String::new()
        }
    }
}

/// The `boundary` parameter of a content type.
fn boundary(content_type: &str) -> Option<String> {
    content_type
        .split(';')
        .skip(1)
        .filter_map(|param| param.trim().split_once('='))
        .find(|(key, _)| key.trim().eq_ignore_ascii_case("boundary"))
        .map(|(_, value)| value.trim().trim_matches('"').to_string())
        .filter(|value| !value.is_empty())
}

fn multipart_text(body: &str, boundary: &str) -> String {
    let delimiter = format!("--{}", boundary);
    let mut texts = Vec::new();

    // The preamble before the first delimiter is not content
    for part in body.split(delimiter.as_str()).skip(1) {
        if part.starts_with("--") {
            break;
        }
        // Drop the rest of the delimiter line; a part may have no headers
        let part = part
            .strip_prefix("\r\n")
            .or_else(|| part.strip_prefix('\n'))
            .unwrap_or(part);
        let (headers, content) = split_headers(part);
        let text = entity_text(&headers, content);
        if !text.is_empty() {
            texts.push(text);
        }
    }

    texts.join("\n")
}

fn html_to_text(html: &str) -> String {
    html2text::from_read(html.as_bytes(), HTML_WIDTH)
        .unwrap_or_else(|_| html.to_string())
        .trim()
        .to_string()
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// All inputs combined into one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedInput {
    /// Identifier used for the document
    pub filename: String,
    /// Each file's text under a `--- name ---` banner, blank-line separated
    pub text: String,
}

/// Banner label for text that did not come from a file
pub const INLINE_LABEL: &str = "stdin";

/// Read, tag and merge `paths` in the order given, then `inline` text.
///
/// Unsupported extensions and formats this build cannot read are skipped
/// with a warning. The document is named after the first mail or text
/// file, or `manual_entry_<id>.eml` when there is none.
pub fn merge_sources(
    paths: &[PathBuf],
    inline: Option<&str>,
    normalizer: &TextNormalizer,
) -> Result<MergedInput> {
    let mut texts = Vec::new();
    let mut primary: Option<String> = None;

    for path in paths {
        let name = display_name(path);
        let Some(format) = SourceFormat::from_path(path) else {
            warn!("Skipping {}: unsupported extension", name);
            continue;
        };

        if primary.is_none() && format.names_document() {
            primary = Some(name.clone());
        }

        match format.read(path, normalizer) {
            Ok(text) if !text.trim().is_empty() => {
                debug!("Read {} chars from {}", text.chars().count(), name);
                texts.push(format!("--- {} ---\n{}", name, text));
            }
            Ok(_) => warn!("Skipping {}: no text", name),
            Err(e @ CliError::UnsupportedFormat { .. }) => warn!("Skipping {}: {}", name, e),
            Err(e) => return Err(e),
        }
    }

    if let Some(text) = inline.filter(|t| !t.trim().is_empty()) {
        texts.push(format!("--- {} ---\n{}", INLINE_LABEL, text));
    }

    if texts.is_empty() {
        return Err(CliError::NoContent);
    }

    let filename = primary.unwrap_or_else(|| {
        let id = uuid::Uuid::new_v4().simple().to_string();
        format!("manual_entry_{}.eml", &id[..8])
    });

    Ok(MergedInput {
        filename,
        text: texts.join("\n\n"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use precheck_extractor::ExtractorConfig;

    fn normalizer() -> TextNormalizer {
        TextNormalizer::from_config(&ExtractorConfig::default()).unwrap()
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(SourceFormat::from_path(Path::new("a.EML")), Some(SourceFormat::Email));
        assert_eq!(SourceFormat::from_path(Path::new("a.msg")), Some(SourceFormat::OutlookMessage));
        assert_eq!(SourceFormat::from_path(Path::new("shot.JPeG")), Some(SourceFormat::Image));
        assert_eq!(SourceFormat::from_path(Path::new("notes.txt")), Some(SourceFormat::PlainText));
        assert_eq!(SourceFormat::from_path(Path::new("report.pdf")), None);
        assert_eq!(SourceFormat::from_path(Path::new("README")), None);
    }

    #[test]
    fn test_parse_simple_email() {
        let raw = "From: a@example.com\r\nSubject: Cell 4\r\n  outage\r\n\r\nThe cell is down.\r\nThanks\r\n";
        let message = parse_email(raw);
        assert_eq!(message.subject, "Cell 4 outage");
        assert_eq!(message.to_text(&normalizer()), "Cell 4 outage\n\nThe cell is down.");
    }

    #[test]
    fn test_parse_multipart_keeps_plain_and_html_parts() {
        let raw = concat!(
            "Subject: Upgrade\n",
            "Content-Type: multipart/alternative; boundary=\"XYZ\"\n",
            "\n",
            "preamble\n",
            "--XYZ\n",
            "Content-Type: text/plain; charset=utf-8\n",
            "\n",
            "Upgrade to R23 failed.\n",
            "--XYZ\n",
            "Content-Type: text/html\n",
            "\n",
            "<p>Upgrade to R23 failed.</p>\n",
            "--XYZ--\n",
        );
        let message = parse_email(raw);
        assert_eq!(message.subject, "Upgrade");
        assert!(message.body.starts_with("Upgrade to R23 failed.\n"));
        assert_eq!(message.body.matches("Upgrade to R23 failed.").count(), 2);
        assert!(!message.body.contains("<p>"));
    }

    #[test]
    fn test_parse_nested_multipart_skips_attachments() {
        let raw = concat!(
            "Subject: Attach failure\n",
            "Content-Type: multipart/mixed; boundary=\"outer\"\n",
            "\n",
            "--outer\n",
            "Content-Type: multipart/alternative; boundary=\"inner\"\n",
            "\n",
            "--inner\n",
            "Content-Type: text/plain; charset=utf-8\n",
            "\n",
            "UE attach rejected with cause 15.\n",
            "--inner--\n",
            "\n",
            "--outer\n",
            "Content-Type: application/octet-stream\n",
            "Content-Disposition: attachment; filename=\"trace.pcap\"\n",
            "\n",
            "AAECAwQF\n",
            "--outer--\n",
        );
        let message = parse_email(raw);
        assert_eq!(message.body, "UE attach rejected with cause 15.");
    }

    #[test]
    fn test_parse_html_only_mail() {
        let alternative = concat!(
            "Subject: Paging\n",
            "Content-Type: multipart/alternative; boundary=b1\n",
            "\n",
            "--b1\n",
            "Content-Type: text/html; charset=utf-8\n",
            "\n",
            "<html><body><p>Paging fails on <b>TAC 7</b>.</p></body></html>\n",
            "--b1--\n",
        );
        let message = parse_email(alternative);
        assert!(message.body.contains("Paging fails on"));
        assert!(message.body.contains("TAC 7"));
        assert!(!message.body.contains('<'));

        let single = "Subject: Paging\nContent-Type: text/html\n\n<div>Cell 4 is barred.</div>\n";
        let message = parse_email(single);
        assert!(message.body.contains("Cell 4 is barred."));
        assert!(!message.body.contains("<div>"));
    }

    #[test]
    fn test_part_without_headers_is_plain_text() {
        let raw = "Content-Type: multipart/mixed; boundary=zz\n\n--zz\n\nBare part body.\n--zz--\n";
        assert_eq!(parse_email(raw).body, "Bare part body.");
    }

    #[test]
    fn test_email_without_subject_or_body() {
        assert_eq!(parse_email("X-Mailer: test"), EmailMessage::default());
        assert_eq!(parse_email("Subject: only\n").to_text(&normalizer()), "only");
    }

    #[test]
    fn test_unsupported_formats_report_error() {
        let result = SourceFormat::Image.read(Path::new("shot.png"), &normalizer());
        assert!(matches!(result, Err(CliError::UnsupportedFormat { .. })));
    }
}
