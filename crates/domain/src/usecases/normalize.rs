//! Title extraction and markdown cleanup for free-text generation output

use regex::Regex;
use std::sync::LazyLock;

/// Run of two or more spaces after a list marker at line start
static LIST_SPACING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([*\-+]) {2,}").expect("valid list-spacing pattern"));

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum NormalizeError {
    /// The generated text yields no usable title line. Surfaced, never
    /// silently defaulted.
    #[error("Generated text has no usable title line")]
    EmptyTitle,
}

/// A free-text draft split into title and repaired body
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedPost {
    pub title: String,
    pub content: String,
}

/// Extract the title and body from raw generated markdown.
///
/// The first non-blank line is the title source; `#` and `*` are stripped
/// from it. The body is everything after that line, trimmed and passed
/// through [`repair_markdown`]. Normalization is deterministic and
/// idempotent.
pub fn normalize(raw: &str) -> Result<NormalizedPost, NormalizeError> {
    let lines: Vec<&str> = raw.split('\n').collect();

    let title_index = lines
        .iter()
        .position(|l| !l.trim().is_empty())
        .ok_or(NormalizeError::EmptyTitle)?;

    let title = lines[title_index]
        .replace(['#', '*'], "")
        .trim()
        .to_string();
    if title.is_empty() {
        return Err(NormalizeError::EmptyTitle);
    }

    let body = lines[title_index + 1..].join("\n").trim().to_string();

    Ok(NormalizedPost {
        title,
        content: repair_markdown(&body),
    })
}

/// Cosmetic repair pass over generated markdown:
/// - collapses runs of spaces after a leading list marker to one space
/// - ensures a blank line follows every `###` heading
///
/// Applying this twice yields the same text as applying it once.
pub fn repair_markdown(text: &str) -> String {
    let lines: Vec<&str> = text.split('\n').collect();
    let mut out: Vec<String> = Vec::with_capacity(lines.len());

    for (i, line) in lines.iter().enumerate() {
        out.push(LIST_SPACING.replace(line, "$1 ").into_owned());

        if line.trim_start().starts_with("###") {
            if let Some(next) = lines.get(i + 1) {
                if !next.trim().is_empty() {
                    out.push(String::new());
                }
            }
        }
    }

    out.join("\n")
}
