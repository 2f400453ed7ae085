
use pulldown_cmark::{Event, Parser, TagEnd};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::{RagError, Result};

/// Formats the loader knows how to turn into plain text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Text,
    Markdown,
    Pdf,
}

impl DocumentFormat {
    /// Detect the format from the file extension
    #[inline]
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            None | Some("txt" | "text") => Ok(Self::Text),
            Some("md" | "markdown") => Ok(Self::Markdown),
            Some("pdf") => Ok(Self::Pdf),
            Some(other) => Err(RagError::Document(format!(
                "Unsupported document format '.{}' for {}",
                other,
                path.display()
            ))),
        }
    }
}

/// A loaded source document
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub source: PathBuf,
    pub format: DocumentFormat,
    pub text: String,
}

impl Document {
    #[inline]
    pub fn load(path: &Path) -> Result<Self> {
        let format = DocumentFormat::from_path(path)?;
        let raw = match format {
            DocumentFormat::Pdf => {
                let bytes = fs::read(path).map_err(|e| {
                    RagError::Document(format!("Failed to read {}: {}", path.display(), e))
                })?;
                pdf_to_text(&bytes).map_err(|e| {
                    RagError::Document(format!(
                        "Failed to extract text from {}: {}",
                        path.display(),
                        e
                    ))
                })?
            }
            DocumentFormat::Text | DocumentFormat::Markdown => fs::read_to_string(path)
                .map_err(|e| {
                    RagError::Document(format!("Failed to read {}: {}", path.display(), e))
                })?,
        };

        let document = Self::from_text(path, format, &raw);
        if document.text.trim().is_empty() {
            warn!("Document {} has no text content", path.display());
        }

        debug!(
            "Loaded {} ({:?}, {} chars)",
            path.display(),
            format,
            document.text.chars().count()
        );
        Ok(document)
    }

    /// Build a document from already decoded text; PDF text is taken as extracted
    #[inline]
    pub fn from_text(source: &Path, format: DocumentFormat, raw: &str) -> Self {
        let text = match format {
            DocumentFormat::Text | DocumentFormat::Pdf => raw.to_string(),
            DocumentFormat::Markdown => markdown_to_text(raw),
        };

        Self {
            source: source.to_path_buf(),
            format,
            text,
        }
    }

    /// Short name used to tag segments and log lines
    #[inline]
    pub fn name(&self) -> String {
        self.source
            .file_name()
            .map_or_else(|| self.source.display().to_string(), |name| {
                name.to_string_lossy().into_owned()
            })
    }
}

/// Flatten Markdown into paragraphs of plain text
fn markdown_to_text(markdown: &str) -> String {
    let mut text = String::with_capacity(markdown.len());

    for event in Parser::new(markdown) {
        match event {
            Event::Text(value) | Event::Code(value) => text.push_str(&value),
            Event::SoftBreak => text.push(' '),
            Event::HardBreak => text.push('\n'),
            Event::End(
                TagEnd::Paragraph | TagEnd::Heading(_) | TagEnd::Item | TagEnd::CodeBlock,
            ) => text.push_str("\n\n"),
            _ => {}
        }
    }

    text.trim().to_string()
}

/// Extracted text of every page, trimmed
fn pdf_to_text(bytes: &[u8]) -> std::result::Result<String, pdf_extract::OutputError> {
    let text = pdf_extract::extract_text_from_mem(bytes)?;
    Ok(text.trim().to_string())
}
