//! Line-level Markdown → paragraph mapping for the `Paragraphs` layout.
//!
//! Only what generated CVs use: ATX headings, bullet items and `**bold**`
//! spans. Anything else is body text, markers left as written.

use docx_rs::{Paragraph, Run};

/// Run sizes in half-points.
const HEADING_SIZES: [usize; 3] = [36, 32, 28];

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum BlockKind {
    Heading(u8),
    Bullet,
    Body,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Span {
    pub text: String,
    pub bold: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Block {
    pub kind: BlockKind,
    pub spans: Vec<Span>,
}

impl Block {
    pub(crate) fn to_paragraph(&self) -> Paragraph {
        let mut paragraph = Paragraph::new();
        if self.kind == BlockKind::Bullet {
            paragraph = paragraph.add_run(Run::new().add_text("• "));
        }
        for span in &self.spans {
            let mut run = Run::new().add_text(span.text.as_str());
            if let BlockKind::Heading(level) = self.kind {
                let idx = usize::from(level.clamp(1, 3)) - 1;
                run = run.bold().size(HEADING_SIZES[idx]);
            } else if span.bold {
                run = run.bold();
            }
            paragraph = paragraph.add_run(run);
        }
        paragraph
    }
}

pub(crate) fn parse_blocks(text: &str) -> Vec<Block> {
    text.lines()
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty())
        .map(parse_line)
        .collect()
}

fn parse_line(line: &str) -> Block {
    let trimmed = line.trim_start();

    let hashes = trimmed.chars().take_while(|c| *c == '#').count();
    if (1..=6).contains(&hashes) {
        if let Some(rest) = trimmed[hashes..].strip_prefix(' ') {
            return Block {
                kind: BlockKind::Heading(hashes as u8),
                spans: parse_spans(rest.trim()),
            };
        }
    }

    for marker in ["- ", "* ", "+ "] {
        if let Some(rest) = trimmed.strip_prefix(marker) {
            return Block {
                kind: BlockKind::Bullet,
                spans: parse_spans(rest.trim_start()),
            };
        }
    }

    Block {
        kind: BlockKind::Body,
        spans: parse_spans(line),
    }
}

/// Splits on `**` pairs. An unpaired trailing `**` stays literal.
fn parse_spans(text: &str) -> Vec<Span> {
    let mut parts: Vec<String> = text.split("**").map(str::to_string).collect();
    if parts.len() % 2 == 0 {
        if let Some(last) = parts.pop() {
            if let Some(prev) = parts.last_mut() {
                prev.push_str("**");
                prev.push_str(&last);
            }
        }
    }

    parts
        .into_iter()
        .enumerate()
        .filter(|(_, part)| !part.is_empty())
        .map(|(i, part)| Span {
            text: part,
            bold: i % 2 == 1,
        })
        .collect()
}
