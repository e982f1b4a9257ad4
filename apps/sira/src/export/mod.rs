//! Word export — serializes generated CV text into a `.docx` byte buffer.
//!
//! Two layouts:
//! - `SingleRun`: one section, one paragraph, one run holding the whole text.
//! - `Paragraphs` (default): one paragraph per non-blank line, with Markdown
//!   headings, bullets and `**bold**` spans mapped to run formatting.
//!
//! Right-to-left languages get bidi paragraphs so Word lays them out from the
//! right margin.
//!
//! The bytes are handed to a `FileSink`; nothing is retained here.

use std::io::Cursor;
use std::str::FromStr;

use bytes::Bytes;
use docx_rs::{Docx, Paragraph, Run};
use thiserror::Error;
use tracing::debug;

use crate::models::language::Language;

pub mod file_save;
mod markdown;

pub use file_save::{DirectorySink, FileSink};

/// Name every export is saved under.
pub const EXPORT_FILENAME: &str = "CV.docx";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("there is no generated content to export")]
    NothingToExport,

    #[error("failed to build document: {0}")]
    Pack(String),

    #[error("failed to save file: {0}")]
    Save(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExportLayout {
    SingleRun,
    #[default]
    Paragraphs,
}

impl FromStr for ExportLayout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single_run" => Ok(ExportLayout::SingleRun),
            "paragraphs" => Ok(ExportLayout::Paragraphs),
            other => Err(format!(
                "unsupported layout '{other}' (expected 'paragraphs' or 'single_run')"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentExporter {
    layout: ExportLayout,
    rtl: bool,
}

impl DocumentExporter {
    pub fn new(layout: ExportLayout) -> Self {
        Self { layout, rtl: false }
    }

    /// Lays paragraphs out in the direction `language` is written.
    pub fn with_language(mut self, language: Language) -> Self {
        self.rtl = language.is_rtl();
        self
    }

    /// Serializes `text` into a `.docx` file. Blank text is refused.
    pub fn export(&self, text: &str) -> Result<Bytes, ExportError> {
        let text = xml_safe(text);
        if text.trim().is_empty() {
            return Err(ExportError::NothingToExport);
        }

        let mut buffer = Cursor::new(Vec::new());
        self.document(&text)
            .build()
            .pack(&mut buffer)
            .map_err(|e| ExportError::Pack(e.to_string()))?;

        let bytes = Bytes::from(buffer.into_inner());
        debug!("Exported {:?} document: {} bytes", self.layout, bytes.len());
        Ok(bytes)
    }

    fn document(&self, text: &str) -> Docx {
        let paragraphs = match self.layout {
            ExportLayout::SingleRun => {
                vec![Paragraph::new().add_run(Run::new().add_text(text))]
            }
            ExportLayout::Paragraphs => markdown::parse_blocks(text)
                .iter()
                .map(markdown::Block::to_paragraph)
                .collect(),
        };

        paragraphs
            .into_iter()
            .map(|paragraph| self.directed(paragraph))
            .fold(Docx::new(), |docx, paragraph| docx.add_paragraph(paragraph))
    }

    fn directed(&self, mut paragraph: Paragraph) -> Paragraph {
        if self.rtl {
            paragraph.property = paragraph.property.bidi(true);
        }
        paragraph
    }
}

/// Drops characters XML 1.0 cannot carry; a document containing them will not open.
fn xml_safe(text: &str) -> String {
    text.chars()
        .filter(|&c| {
            matches!(c, '\t' | '\n' | '\r')
                || ('\u{20}'..='\u{D7FF}').contains(&c)
                || ('\u{E000}'..='\u{FFFD}').contains(&c)
                || c >= '\u{10000}'
        })
        .collect()
}
