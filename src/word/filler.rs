//! Fills `{placeholder}` tags and `{#section}...{/section}` conditional
//! regions inside a `.docx` package.
//!
//! A `.docx` file is a ZIP archive; the visible text lives in
//! `word/document.xml` plus the header and footer parts. Word frequently
//! splits a placeholder across several runs (`{tenant1` and `_name}` end up
//! in separate `<w:t>` elements), so the XML is normalized first by
//! collapsing markup that falls between a `{` and its matching `}`.

use std::io::{Cursor, Read, Write};

use regex::Regex;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

use crate::core::data::{is_truthy, stringify};
use crate::core::{AssemblyError, AssemblyResult, LeaseData};

/// Fill a `.docx` template with lease data, substituting the empty string
/// for missing or null keys. Returns the filled package bytes.
pub fn fill_docx(template: &[u8], data: &LeaseData) -> AssemblyResult<Vec<u8>> {
    let mut archive = ZipArchive::new(Cursor::new(template))
        .map_err(|e| AssemblyError::Document(format!("malformed .docx package: {e}")))?;

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

    for index in 0..archive.len() {
        let fillable = {
            let entry = archive
                .by_index_raw(index)
                .map_err(|e| AssemblyError::Document(format!("malformed .docx entry: {e}")))?;
            is_fillable_part(entry.name())
        };

        if fillable {
            let mut entry = archive
                .by_index(index)
                .map_err(|e| AssemblyError::Document(format!("malformed .docx entry: {e}")))?;
            let name = entry.name().to_string();
            let mut xml = String::new();
            entry
                .read_to_string(&mut xml)
                .map_err(|e| AssemblyError::Document(format!("unreadable part {name}: {e}")))?;

            let rendered = render_part(&xml, data)?;

            writer
                .start_file(name.as_str(), SimpleFileOptions::default())
                .map_err(|e| AssemblyError::Document(e.to_string()))?;
            writer
                .write_all(rendered.as_bytes())
                .map_err(|e| AssemblyError::Document(e.to_string()))?;
        } else {
            let entry = archive
                .by_index_raw(index)
                .map_err(|e| AssemblyError::Document(format!("malformed .docx entry: {e}")))?;
            writer
                .raw_copy_file(entry)
                .map_err(|e| AssemblyError::Document(e.to_string()))?;
        }
    }

    let cursor = writer
        .finish()
        .map_err(|e| AssemblyError::Document(format!("failed to finish .docx package: {e}")))?;
    Ok(cursor.into_inner())
}

/// Parts whose text content carries placeholders.
fn is_fillable_part(name: &str) -> bool {
    name == "word/document.xml"
        || (name.starts_with("word/header") && name.ends_with(".xml"))
        || (name.starts_with("word/footer") && name.ends_with(".xml"))
}

fn render_part(xml: &str, data: &LeaseData) -> AssemblyResult<String> {
    let normalized = normalize_split_placeholders(xml);
    let sectioned = apply_sections(&normalized, data)?;
    Ok(substitute_placeholders(&sectioned, data))
}

/// Visible characters a placeholder name may contain.
fn is_tag_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '.' | '-' | '#' | '/')
}

const MAX_PLACEHOLDER_LEN: usize = 64;

/// Collapse XML markup that Word inserted in the middle of a placeholder, so
/// `{ten</w:t></w:r><w:r><w:t>ant1_name}` becomes `{tenant1_name}` inside the
/// first run. Only spans whose visible characters form a plausible
/// placeholder are collapsed; a stray `{` in document prose is left alone.
fn normalize_split_placeholders(xml: &str) -> String {
    let bytes = xml.as_bytes();
    let mut out = String::with_capacity(xml.len());
    let mut pos = 0;

    while pos < bytes.len() {
        if bytes[pos] != b'{' {
            // Copy through whole XML tags so a '{' inside an attribute value
            // is never mistaken for a placeholder start.
            if bytes[pos] == b'<' {
                let end = xml[pos..].find('>').map(|i| pos + i + 1).unwrap_or(xml.len());
                out.push_str(&xml[pos..end]);
                pos = end;
            } else {
                let c = xml[pos..].chars().next().expect("in-bounds char");
                out.push(c);
                pos += c.len_utf8();
            }
            continue;
        }

        match scan_placeholder(xml, pos) {
            Some((name, end)) => {
                out.push('{');
                out.push_str(&name);
                out.push('}');
                pos = end;
            }
            None => {
                out.push('{');
                pos += 1;
            }
        }
    }
    out
}

/// Starting at a `{`, collect visible characters across any intervening XML
/// tags until the matching `}`. Returns the collapsed name and the byte
/// offset just past the `}`, or `None` when the span is not a placeholder.
fn scan_placeholder(xml: &str, open_at: usize) -> Option<(String, usize)> {
    let mut name = String::new();
    let mut pos = open_at + 1;
    let bytes = xml.as_bytes();

    while pos < bytes.len() {
        match bytes[pos] {
            b'}' => return Some((name, pos + 1)),
            b'{' => return None,
            b'<' => {
                let close = xml[pos..].find('>')?;
                pos += close + 1;
            }
            _ => {
                let c = xml[pos..].chars().next().expect("in-bounds char");
                if !is_tag_char(c) {
                    return None;
                }
                if name.len() >= MAX_PLACEHOLDER_LEN {
                    return None;
                }
                name.push(c);
                pos += c.len_utf8();
            }
        }
    }
    None
}

/// Resolve `{#tag}...{/tag}` conditional regions. A truthy, non-empty value
/// keeps the body (delimiters removed); anything else removes the whole
/// region. Outer sections are resolved first, so nesting works naturally.
fn apply_sections(xml: &str, data: &LeaseData) -> AssemblyResult<String> {
    let open = Regex::new(r"\{#([\w.\-]+)\}").expect("static regex");

    let mut current = xml.to_string();
    while let Some((start, body_start, tag)) = open.captures(&current).map(|caps| {
        let whole = caps.get(0).expect("group 0 always present");
        (whole.start(), whole.end(), caps[1].to_string())
    }) {
        let close = format!("{{/{tag}}}");
        let Some(close_at) = current[body_start..].find(&close) else {
            return Err(AssemblyError::Document(format!(
                "unterminated section {{#{tag}}} in template"
            )));
        };
        let body_end = body_start + close_at;
        let region_end = body_end + close.len();

        let keep = data.get(&tag).map(is_truthy).unwrap_or(false);
        if keep {
            let body = current[body_start..body_end].to_string();
            current.replace_range(start..region_end, &body);
        } else {
            current.replace_range(start..region_end, "");
        }
    }
    Ok(current)
}

fn substitute_placeholders(xml: &str, data: &LeaseData) -> String {
    let placeholder = Regex::new(r"\{([\w.\-]+)\}").expect("static regex");
    placeholder
        .replace_all(xml, |caps: &regex::Captures<'_>| {
            let key = &caps[1];
            data.get(key).map(stringify).map(xml_escape).unwrap_or_default()
        })
        .into_owned()
}

fn xml_escape(raw: String) -> String {
    if !raw.contains(['&', '<', '>', '"', '\'']) {
        return raw;
    }
    let mut escaped = String::with_capacity(raw.len() + 8);
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}
