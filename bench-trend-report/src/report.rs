//! HTML report assembly
//!
//! The report is a flat document: a preamble, one block per chart in input
//! order, an optional failure list, and a postamble.

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use std::fs::Permissions;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{ReportError, Result};

/// Bytes that change the meaning of a relative URL or end the attribute value
const IMAGE_SRC: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'\'')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'\\');

/// Accumulates HTML fragments for one report
#[derive(Debug, Clone)]
pub struct ReportBuilder {
    buffer: String,
    fragments: usize,
}

impl ReportBuilder {
    /// Start a document, emitting the preamble
    pub fn new(title: &str) -> Self {
        let mut buffer = String::new();
        buffer.push_str("<!DOCTYPE html>\n");
        buffer.push_str("<html>\n");
        buffer.push_str("<head>\n");
        buffer.push_str("    <meta charset=\"UTF-8\">\n");
        buffer.push_str(&format!("    <title>{}</title>\n", escape_html(title)));
        buffer.push_str("</head>\n");
        buffer.push_str("<body>\n");
        buffer.push_str("    <h1>Notes</h1>\n");
        buffer.push_str("    <div style=\"width:100%; text-align:center\">\n");

        Self {
            buffer,
            fragments: 0,
        }
    }

    /// Append a raw HTML fragment
    pub fn append(&mut self, fragment: &str) -> &mut Self {
        self.buffer.push_str(fragment);
        self.fragments += 1;
        self
    }

    /// Append the heading, caption and image block for one chart
    pub fn append_chart(&mut self, image_name: &str, caption: &str) -> &mut Self {
        let fragment = chart_fragment(image_name, caption);
        self.append(&fragment)
    }

    /// Append a section listing inputs that could not be charted
    pub fn append_failures<'a, I>(&mut self, failures: I) -> &mut Self
    where
        I: IntoIterator<Item = (&'a Path, &'a str)>,
    {
        let items: Vec<String> = failures
            .into_iter()
            .map(|(source, error)| {
                format!(
                    "            <li><code>{}</code>: {}</li>\n",
                    escape_html(&source.display().to_string()),
                    escape_html(error)
                )
            })
            .collect();
        if items.is_empty() {
            return self;
        }

        let mut fragment = String::from("        <h1>Failures</h1>\n");
        fragment.push_str("        <ul style=\"text-align:left\">\n");
        for item in items {
            fragment.push_str(&item);
        }
        fragment.push_str("        </ul>\n");
        self.append(&fragment)
    }

    /// Number of fragments appended so far
    pub fn fragment_count(&self) -> usize {
        self.fragments
    }

    /// Close the document, emitting the postamble
    pub fn finalize(mut self) -> String {
        self.buffer.push_str("    </div>\n");
        self.buffer.push_str("</body>\n");
        self.buffer.push_str("</html>\n");
        self.buffer
    }
}

/// HTML block embedding one chart image
pub fn chart_fragment(image_name: &str, caption: &str) -> String {
    format!(
        "        <h1>{}</h1>\n        <p>{}</p>\n        <img align=\"middle\" src=\"{}\"/>\n",
        escape_html(image_name),
        escape_html(caption),
        image_src(image_name)
    )
}

/// Relative URL of an image file in the report directory
pub fn image_src(image_name: &str) -> String {
    utf8_percent_encode(image_name, IMAGE_SRC).to_string()
}

/// Write the finished report to `path`
pub fn write_report(path: &Path, content: &str) -> Result<PathBuf> {
    write_file_atomic(path, content)?;
    log::info!("Report written to {}", path.display());
    Ok(path.to_path_buf())
}

/// Write `content` to `path`, replacing any previous file in one rename
///
/// The content goes to a temporary file in the same directory first, so a
/// failed write leaves an existing file untouched.
pub fn write_file_atomic(path: &Path, content: &str) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    // temp files are created owner-only; keep what the replaced file had
    let permissions = match std::fs::metadata(path) {
        Ok(metadata) => Some(metadata.permissions()),
        Err(_) => default_permissions(),
    };

    let mut file = tempfile::NamedTempFile::new_in(dir).map_err(|e| ReportError::write(path, e))?;
    file.write_all(content.as_bytes())
        .map_err(|e| ReportError::write(path, e))?;
    if let Some(permissions) = permissions {
        file.as_file()
            .set_permissions(permissions)
            .map_err(|e| ReportError::write(path, e))?;
    }
    file.persist(path)
        .map_err(|e| ReportError::write(path, e.error))?;
    Ok(())
}

#[cfg(unix)]
fn default_permissions() -> Option<Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn default_permissions() -> Option<Permissions> {
    None
}

/// Escape text for HTML element content and attribute values
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
