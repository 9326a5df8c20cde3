#![deny(missing_docs)]

//! # Text Renderer
//!
//! A deterministic fixed-width plain-text implementation of
//! [`RenderBackend`]: the reference backend used by the CLI and the test
//! suite. Every block renders to exactly its layout height in lines, so the
//! artifact reproduces page geometry; pages end with a numbered footer and
//! are separated by a form feed.

use crate::error::AppResult;
use crate::layout::{Block, Span};
use crate::render::backend::RenderBackend;

const INDENT: &str = "  ";

/// Plain-text pager.
#[derive(Debug)]
pub struct TextRenderer {
    width: usize,
    buffer: String,
    current_page: Option<usize>,
    title: Option<String>,
}

impl TextRenderer {
    /// Creates a renderer with the default page width.
    pub fn new() -> Self {
        Self::with_width(72)
    }

    /// Creates a renderer with an explicit page width (columns).
    pub fn with_width(width: usize) -> Self {
        Self {
            width,
            buffer: String::new(),
            current_page: None,
            title: None,
        }
    }

    fn close_page(&mut self, number: usize) {
        self.buffer.push('\n');
        self.push_line(&self.centered(&format!("- page {} -", number)));
        self.buffer.push('\u{c}');
        self.buffer.push('\n');
    }

    fn push_line(&mut self, line: &str) {
        self.buffer.push_str(line.trim_end());
        self.buffer.push('\n');
    }

    fn centered(&self, text: &str) -> String {
        if text.len() >= self.width {
            return text.to_string();
        }
        let pad = (self.width - text.len()) / 2;
        format!("{}{}", " ".repeat(pad), text)
    }

    fn spans_to_string(spans: &[Span]) -> String {
        spans.iter().map(render_span).collect()
    }

    fn toc_line(&self, indent: usize, text: &str, page: Option<usize>) -> String {
        let left = format!("{}{}", INDENT.repeat(indent), text);
        let page_text = match page {
            Some(page) => page.to_string(),
            None => "?".to_string(),
        };
        let fill = self
            .width
            .saturating_sub(left.len() + page_text.len() + 2)
            .max(2);
        format!("{} {} {}", left, ".".repeat(fill), page_text)
    }
}

impl Default for TextRenderer {
    fn default() -> Self {
        Self::new()
    }
}

fn render_span(span: &Span) -> String {
    match span {
        Span::Text(text) => text.clone(),
        Span::PageRef { page: Some(page), .. } => format!("p. {}", page),
        Span::PageRef { page: None, .. } => "p. ?".to_string(),
    }
}

impl RenderBackend for TextRenderer {
    fn add_title_page(&mut self, title: &str, _subtitle: Option<&str>) -> AppResult<()> {
        // Document metadata only; the visible title page arrives as blocks.
        self.title = Some(title.to_string());
        Ok(())
    }

    fn register_anchor(&mut self, _id: &str, _page: usize, _line: usize) -> AppResult<()> {
        // Plain text has no link targets; printed page numbers suffice.
        Ok(())
    }

    fn begin_page(&mut self, number: usize) -> AppResult<()> {
        if let Some(previous) = self.current_page.take() {
            self.close_page(previous);
        }
        self.current_page = Some(number);
        Ok(())
    }

    fn emit(&mut self, block: &Block) -> AppResult<()> {
        match block {
            Block::Title(text) => {
                self.push_line(&self.centered(text));
                self.push_line("");
            }
            Block::Subtitle(text) | Block::Meta(text) => {
                self.push_line(&self.centered(text));
            }
            Block::Heading {
                level,
                text,
                anchor: _,
            } => {
                self.push_line(text);
                match *level {
                    1 => self.push_line(&"=".repeat(text.len())),
                    2 => self.push_line(&"-".repeat(text.len())),
                    _ => self.push_line(""),
                }
            }
            Block::TocEntry {
                indent,
                text,
                target: _,
                page,
            } => {
                let line = self.toc_line(*indent, text, *page);
                self.push_line(&line);
            }
            Block::TableHeader { columns } => {
                let line = columns.join(" | ");
                self.push_line(&line);
                self.push_line(&"-".repeat(line.len()));
            }
            Block::Row { cells } => {
                let line = cells
                    .iter()
                    .map(|cell| Self::spans_to_string(cell))
                    .collect::<Vec<_>>()
                    .join(" | ");
                self.push_line(&line);
            }
            Block::Text { indent, spans } => {
                let line = format!("{}{}", INDENT.repeat(*indent), Self::spans_to_string(spans));
                self.push_line(&line);
            }
            Block::Spacer => self.push_line(""),
        }
        Ok(())
    }

    fn finish(&mut self) -> AppResult<Vec<u8>> {
        if let Some(previous) = self.current_page.take() {
            self.close_page(previous);
        }
        Ok(std::mem::take(&mut self.buffer).into_bytes())
    }
}
