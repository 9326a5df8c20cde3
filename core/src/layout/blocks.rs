#![deny(missing_docs)]

//! # Layout Blocks
//!
//! The atomic content units the layout engine emits.
//!
//! A block is never split: pagination distributes whole blocks across pages,
//! which is what limits page breaks to row/line granularity (a table row's
//! name and type always stay together). Multi-line blocks have a fixed
//! height so a render backend can reproduce page geometry exactly.

/// One fragment of a line: literal text, or a cross-reference slot that is
/// rewritten to its final page number after pagination (pass 2).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Span {
    /// Literal text.
    Text(String),
    /// A "see page N" slot pointing at an anchor. `page` is `None` until
    /// pass 2 fills it in.
    PageRef {
        /// Logical anchor id (e.g. `schema:Pet`).
        anchor: String,
        /// Final page number, assigned in pass 2.
        page: Option<usize>,
    },
}

impl Span {
    /// Shorthand for a literal text span.
    pub fn text(text: impl Into<String>) -> Self {
        Span::Text(text.into())
    }

    /// Shorthand for an unresolved page reference slot.
    pub fn page_ref(anchor: impl Into<String>) -> Self {
        Span::PageRef {
            anchor: anchor.into(),
            page: None,
        }
    }
}

/// An atomic content block.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    /// Document title on the title page.
    Title(String),
    /// Subtitle line on the title page.
    Subtitle(String),
    /// Centered metadata line on the title page (version, servers).
    Meta(String),
    /// A section/operation/schema heading, optionally carrying an anchor.
    Heading {
        /// Heading level (1 = section, 2 = operation/schema, 3 = sub-label).
        level: u8,
        /// Heading text.
        text: String,
        /// Anchor id recorded when the block is placed.
        anchor: Option<String>,
    },
    /// One table-of-contents line; `page` is rewritten in pass 2.
    TocEntry {
        /// Indentation level.
        indent: usize,
        /// Entry text.
        text: String,
        /// Anchor id the entry points at.
        target: String,
        /// Final page number, assigned in pass 2.
        page: Option<usize>,
    },
    /// Column captions of a table; re-emitted when a table resumes after a
    /// page break.
    TableHeader {
        /// Column captions.
        columns: Vec<String>,
    },
    /// One single-line table row.
    Row {
        /// Cell contents, one span list per column.
        cells: Vec<Vec<Span>>,
    },
    /// One line of flowing text.
    Text {
        /// Indentation level.
        indent: usize,
        /// Line content.
        spans: Vec<Span>,
    },
    /// One blank line.
    Spacer,
}

impl Block {
    /// Height of the block in lines. Fixed per variant so pagination is
    /// independent of pass-2 rewriting.
    pub fn height(&self) -> usize {
        match self {
            Block::Title(_) => 2,
            Block::Heading { .. } => 2,
            Block::TableHeader { .. } => 2,
            Block::Subtitle(_)
            | Block::Meta(_)
            | Block::TocEntry { .. }
            | Block::Row { .. }
            | Block::Text { .. }
            | Block::Spacer => 1,
        }
    }

    /// Whether the block must stay on the same page as the block after it.
    pub fn keep_with_next(&self) -> bool {
        matches!(self, Block::Heading { .. } | Block::TableHeader { .. })
    }

    /// A short description used in structural error messages.
    pub fn describe(&self) -> String {
        match self {
            Block::Title(text) => format!("title '{}'", text),
            Block::Subtitle(text) => format!("subtitle '{}'", text),
            Block::Meta(text) => format!("metadata line '{}'", text),
            Block::Heading { text, .. } => format!("heading '{}'", text),
            Block::TocEntry { text, .. } => format!("contents entry '{}'", text),
            Block::TableHeader { .. } => "table header".to_string(),
            Block::Row { .. } => "table row".to_string(),
            Block::Text { .. } => "text line".to_string(),
            Block::Spacer => "spacer".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heights_are_fixed() {
        assert_eq!(Block::Title("T".into()).height(), 2);
        assert_eq!(Block::Spacer.height(), 1);
        assert_eq!(
            Block::Row {
                cells: vec![vec![Span::text("a")], vec![Span::page_ref("schema:A")]]
            }
            .height(),
            1
        );
    }

    #[test]
    fn test_keep_with_next() {
        let heading = Block::Heading {
            level: 1,
            text: "Pets".into(),
            anchor: None,
        };
        assert!(heading.keep_with_next());
        assert!(!Block::Spacer.keep_with_next());
    }
}
