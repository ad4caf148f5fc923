//! Projection of raw doc-comment blobs into rendered comment blocks.
//!
//! The discovery pass hands over the raw structured documentation attached
//! to an interface or method (`<summary>`, `<param name="...">`,
//! `<returns>`). This module parses that blob and renders `/** ... */`
//! blocks; it knows nothing about the type pipeline.

/// Structured documentation extracted from a raw blob.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocComment {
    pub summary: Option<String>,
    /// `(parameter name, description)` pairs in source order.
    pub params: Vec<(String, String)>,
    pub returns: Option<String>,
}

impl DocComment {
    /// Description for the named parameter, if the blob carried one.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(param, _)| param == name)
            .map(|(_, description)| description.as_str())
    }
}

/// Parse a raw doc-comment blob.
pub fn parse_doc(raw: &str) -> DocComment {
    let mut params = Vec::new();
    let mut rest = raw;
    while let Some((name, description, consumed)) = next_param(rest) {
        params.push((name, description));
        rest = &rest[consumed..];
    }
    DocComment {
        summary: tag_body(raw, "summary"),
        params,
        returns: tag_body(raw, "returns"),
    }
}

fn tag_body(text: &str, tag: &str) -> Option<String> {
    let open = format!("<{tag}>");
    let close = format!("</{tag}>");
    let start = text.find(&open)? + open.len();
    let end = text[start..].find(&close)? + start;
    let body = clean_text(&text[start..end]);
    (!body.is_empty()).then_some(body)
}

fn next_param(text: &str) -> Option<(String, String, usize)> {
    const OPEN: &str = "<param name=\"";
    const CLOSE: &str = "</param>";
    let start = text.find(OPEN)? + OPEN.len();
    let name_end = text[start..].find('"')? + start;
    let name = text[start..name_end].to_string();
    let body_start = text[name_end..].find('>')? + name_end + 1;
    let end = text[body_start..].find(CLOSE)? + body_start;
    let description = clean_text(&text[body_start..end]);
    Some((name, description, end + CLOSE.len()))
}

/// Collapse a tag body into a single line, stripping comment-marker residue.
fn clean_text(text: &str) -> String {
    text.lines()
        .map(|line| line.trim().trim_start_matches("///").trim())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Render a `/** ... */` block from assembled lines at the given indent
/// level (2 spaces per level). No trailing newline.
pub fn comment_block(lines: &[String], indent: usize) -> String {
    let prefix = "  ".repeat(indent);
    let mut out = format!("{prefix}/**\n");
    for line in lines {
        if line.is_empty() {
            out.push_str(&format!("{prefix} *\n"));
        } else {
            out.push_str(&format!("{prefix} * {line}\n"));
        }
    }
    out.push_str(&format!("{prefix} */"));
    out
}
