#![deny(missing_docs)]

//! # Layout Engine
//!
//! Walks the read-only [`Document`] model and produces an ordered sequence
//! of page-sized blocks plus an anchor table.
//!
//! The walk is a strictly linear state machine: title page, table of
//! contents, one group per section, schema appendix. Pagination operates on
//! atomic blocks only; pass 1 records a provisional anchor for every
//! heading, pass 2 rewrites every cross-reference slot to its final page
//! number once the page count is fixed. Layout never fails on malformed
//! model data: an unresolved schema renders as a visible placeholder row.

use crate::error::{AppError, AppResult};
use crate::layout::blocks::{Block, Span};
use crate::model::{Document, Operation, SchemaKind, SchemaNode, SchemaRef, Section};
use indexmap::IndexMap;

/// Page geometry. Heights are abstract lines; widths are the render
/// backend's concern.
#[derive(Debug, Clone, Copy)]
pub struct LayoutOptions {
    /// Number of content lines per page.
    pub lines_per_page: usize,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self { lines_per_page: 48 }
    }
}

/// Final position of an anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnchorPos {
    /// 1-based page number.
    pub page: usize,
    /// 0-based line offset within the page.
    pub line: usize,
}

/// One laid-out page.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// 1-based page number.
    pub number: usize,
    /// Blocks in emission order.
    pub blocks: Vec<Block>,
}

/// The complete layout: pages plus resolved anchors.
#[derive(Debug, Clone)]
pub struct LayoutResult {
    /// Pages in order.
    pub pages: Vec<Page>,
    /// Anchor table, in anchor-creation order.
    pub anchors: IndexMap<String, AnchorPos>,
}

/// Single-use engine over one document.
pub struct LayoutEngine<'a> {
    doc: &'a Document,
    options: LayoutOptions,
    pages: Vec<Page>,
    current: Vec<Block>,
    used: usize,
    pending: Vec<Block>,
    table_columns: Option<Vec<String>>,
    anchors: IndexMap<String, AnchorPos>,
    context: String,
}

impl<'a> LayoutEngine<'a> {
    /// Creates an engine for one document.
    pub fn new(doc: &'a Document, options: LayoutOptions) -> Self {
        Self {
            doc,
            options,
            pages: Vec::new(),
            current: Vec::new(),
            used: 0,
            pending: Vec::new(),
            table_columns: None,
            anchors: IndexMap::new(),
            context: String::new(),
        }
    }

    /// Runs the full layout pass over the document.
    pub fn layout(mut self) -> AppResult<LayoutResult> {
        self.title_page()?;
        self.break_page()?;
        self.toc()?;
        self.break_page()?;
        for (section_idx, section) in self.doc.sections.iter().enumerate() {
            self.section(section_idx, section)?;
        }
        self.appendix()?;
        self.commit_pending()?;
        self.flush_page();
        self.resolve_references();
        Ok(LayoutResult {
            pages: self.pages,
            anchors: self.anchors,
        })
    }

    // ----- content walk -------------------------------------------------

    fn title_page(&mut self) -> AppResult<()> {
        self.context = "title page".to_string();
        self.push(Block::Title(self.doc.title.clone()))?;
        if let Some(subtitle) = &self.doc.subtitle {
            self.push(Block::Subtitle(subtitle.clone()))?;
        }
        if let Some(version) = &self.doc.version {
            self.push(Block::Meta(format!("Version {}", version)))?;
        }
        for server in &self.doc.servers {
            self.push(Block::Meta(format!("Server: {}", server.url)))?;
        }
        if let Some(description) = &self.doc.description {
            self.push(Block::Spacer)?;
            for line in description.lines() {
                self.push(Block::Text {
                    indent: 0,
                    spans: vec![Span::text(line)],
                })?;
            }
        }
        Ok(())
    }

    fn toc(&mut self) -> AppResult<()> {
        self.context = "table of contents".to_string();
        self.push(Block::Heading {
            level: 1,
            text: "Contents".to_string(),
            anchor: None,
        })?;
        for (section_idx, section) in self.doc.sections.iter().enumerate() {
            self.push(Block::TocEntry {
                indent: 0,
                text: section.heading.clone(),
                target: section_anchor(section),
                page: None,
            })?;
            for (op_idx, op) in section.operations.iter().enumerate() {
                self.push(Block::TocEntry {
                    indent: 1,
                    text: format!("{} {}", op.method, op.path),
                    target: operation_anchor(section_idx, op_idx),
                    page: None,
                })?;
            }
        }
        for (group_idx, group) in self.doc.appendix.iter().enumerate() {
            self.push(Block::TocEntry {
                indent: 0,
                text: group.heading.clone(),
                target: appendix_anchor(group_idx),
                page: None,
            })?;
            for key in &group.keys {
                self.push(Block::TocEntry {
                    indent: 1,
                    text: self.doc.registry.display_name(key).to_string(),
                    target: schema_anchor(key),
                    page: None,
                })?;
            }
        }
        Ok(())
    }

    fn section(&mut self, section_idx: usize, section: &Section) -> AppResult<()> {
        self.context = format!("section '{}'", section.heading);
        self.push(Block::Heading {
            level: 1,
            text: section.heading.clone(),
            anchor: Some(section_anchor(section)),
        })?;
        if let Some(description) = &section.description {
            for line in description.lines() {
                self.push(Block::Text {
                    indent: 0,
                    spans: vec![Span::text(line)],
                })?;
            }
            self.push(Block::Spacer)?;
        }
        for (op_idx, op) in section.operations.iter().enumerate() {
            self.operation(section_idx, op_idx, op)?;
        }
        Ok(())
    }

    fn operation(&mut self, section_idx: usize, op_idx: usize, op: &Operation) -> AppResult<()> {
        self.context = format!("operation {} {}", op.method, op.path);
        let suffix = if op.deprecated { " (deprecated)" } else { "" };
        self.push(Block::Heading {
            level: 2,
            text: format!("{} {}{}", op.method, op.path, suffix),
            anchor: Some(operation_anchor(section_idx, op_idx)),
        })?;

        if let Some(summary) = &op.summary {
            self.push(Block::Text {
                indent: 0,
                spans: vec![Span::text(summary)],
            })?;
        }
        if let Some(description) = &op.description {
            for line in description.lines() {
                self.push(Block::Text {
                    indent: 0,
                    spans: vec![Span::text(line)],
                })?;
            }
        }
        if let Some(operation_id) = &op.operation_id {
            self.push(Block::Text {
                indent: 0,
                spans: vec![Span::text(format!("Operation ID: {}", operation_id))],
            })?;
        }

        if !op.parameters.is_empty() {
            self.push(Block::Heading {
                level: 3,
                text: "Parameters".to_string(),
                anchor: None,
            })?;
            self.push(Block::TableHeader {
                columns: ["Name", "In", "Required", "Type", "Description"]
                    .map(String::from)
                    .to_vec(),
            })?;
            for param in &op.parameters {
                let type_spans = param
                    .schema
                    .as_ref()
                    .map(|s| self.type_spans(s))
                    .unwrap_or_else(|| vec![Span::text("-")]);
                self.push(Block::Row {
                    cells: vec![
                        vec![Span::text(&param.name)],
                        vec![Span::text(param.location.as_str())],
                        vec![Span::text(if param.required { "yes" } else { "no" })],
                        type_spans,
                        vec![Span::text(first_line(param.description.as_deref()))],
                    ],
                })?;
            }
        }

        if !op.request_body.is_empty() {
            self.push(Block::Heading {
                level: 3,
                text: "Request body".to_string(),
                anchor: None,
            })?;
            self.push(Block::TableHeader {
                columns: ["Media type", "Schema"].map(String::from).to_vec(),
            })?;
            for content in &op.request_body {
                let schema_spans = content
                    .schema
                    .as_ref()
                    .map(|s| self.type_spans(s))
                    .unwrap_or_else(|| vec![Span::text("-")]);
                self.push(Block::Row {
                    cells: vec![vec![Span::text(&content.media_type)], schema_spans],
                })?;
            }
        }

        if !op.responses.is_empty() {
            self.push(Block::Heading {
                level: 3,
                text: "Responses".to_string(),
                anchor: None,
            })?;
            self.push(Block::TableHeader {
                columns: ["Status", "Media type", "Schema", "Description"]
                    .map(String::from)
                    .to_vec(),
            })?;
            for response in &op.responses {
                let description = first_line(response.description.as_deref());
                if response.content.is_empty() {
                    self.push(Block::Row {
                        cells: vec![
                            vec![Span::text(&response.status)],
                            vec![Span::text("-")],
                            vec![Span::text("-")],
                            vec![Span::text(&description)],
                        ],
                    })?;
                    continue;
                }
                for content in &response.content {
                    let schema_spans = content
                        .schema
                        .as_ref()
                        .map(|s| self.type_spans(s))
                        .unwrap_or_else(|| vec![Span::text("-")]);
                    self.push(Block::Row {
                        cells: vec![
                            vec![Span::text(&response.status)],
                            vec![Span::text(&content.media_type)],
                            schema_spans,
                            vec![Span::text(&description)],
                        ],
                    })?;
                }
            }
        }

        self.push(Block::Spacer)
    }

    fn appendix(&mut self) -> AppResult<()> {
        for (group_idx, group) in self.doc.appendix.iter().enumerate() {
            self.context = format!("appendix '{}'", group.heading);
            self.push(Block::Heading {
                level: 1,
                text: group.heading.clone(),
                anchor: Some(appendix_anchor(group_idx)),
            })?;
            for key in &group.keys {
                self.schema_entry(key)?;
            }
        }
        Ok(())
    }

    /// Emits the single full expansion of one registry entry. Named
    /// references inside the body (recursive ones included) render as
    /// back-references, never as a second expansion.
    fn schema_entry(&mut self, key: &str) -> AppResult<()> {
        let Some(entry) = self.doc.registry.get(key) else {
            return Ok(());
        };
        self.context = format!("schema '{}'", entry.display_name);
        self.push(Block::Heading {
            level: 2,
            text: entry.display_name.clone(),
            anchor: Some(schema_anchor(key)),
        })?;
        if let Some(description) = &entry.node.description {
            for line in description.lines() {
                self.push(Block::Text {
                    indent: 0,
                    spans: vec![Span::text(line)],
                })?;
            }
        }
        let node = entry.node.clone();
        self.schema_body(&node, 0)?;
        self.push(Block::Spacer)
    }

    fn schema_body(&mut self, node: &SchemaNode, indent: usize) -> AppResult<()> {
        match &node.kind {
            SchemaKind::Object => {
                if node.properties.is_empty() {
                    return self.push(Block::Text {
                        indent,
                        spans: vec![Span::text("object")],
                    });
                }
                let properties = node.properties.clone();
                for (name, value) in &properties {
                    let marker = if node.is_required(name) { "*" } else { "" };
                    let mut spans = vec![Span::text(format!("{}{}: ", name, marker))];
                    spans.extend(self.type_spans(value));
                    self.push(Block::Text { indent, spans })?;
                    self.expand_inline(value, indent + 1)?;
                }
                Ok(())
            }
            SchemaKind::Array => {
                let mut spans = vec![Span::text("array of ")];
                match &node.items {
                    Some(items) => spans.extend(self.type_spans(items)),
                    None => spans.push(Span::text("any")),
                }
                self.push(Block::Text { indent, spans })?;
                if let Some(items) = &node.items {
                    self.expand_inline(items, indent + 1)?;
                }
                Ok(())
            }
            SchemaKind::Composite(kind) => {
                self.push(Block::Text {
                    indent,
                    spans: vec![Span::text(format!("{}:", kind.keyword()))],
                })?;
                let children = node.children.clone();
                for child in &children {
                    let mut spans = vec![Span::text("- ")];
                    spans.extend(self.type_spans(child));
                    self.push(Block::Text {
                        indent: indent + 1,
                        spans,
                    })?;
                    self.expand_inline(child, indent + 2)?;
                }
                Ok(())
            }
            SchemaKind::Primitive | SchemaKind::Unresolved => self.push(Block::Text {
                indent,
                spans: vec![Span::text(node.type_label())],
            }),
        }
    }

    /// Expands an inline (anonymous) subtree in place. Named references are
    /// left as the back-reference the caller already printed, so no node is
    /// expanded more than once along any traversal path.
    fn expand_inline(&mut self, schema: &SchemaRef, indent: usize) -> AppResult<()> {
        let SchemaRef::Inline(node) = schema else {
            return Ok(());
        };
        match &node.kind {
            SchemaKind::Object if !node.properties.is_empty() => self.schema_body(node, indent),
            SchemaKind::Composite(_) => self.schema_body(node, indent),
            SchemaKind::Array => {
                if let Some(items) = node.items.as_ref() {
                    if let SchemaRef::Inline(inner) = items {
                        if matches!(inner.kind, SchemaKind::Object | SchemaKind::Composite(_)) {
                            return self.expand_inline(items, indent);
                        }
                    }
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// A short, single-row type rendering with a page cross-reference for
    /// named schemas.
    fn type_spans(&self, schema: &SchemaRef) -> Vec<Span> {
        match schema {
            SchemaRef::Named(key) => self.named_spans(key),
            SchemaRef::Inline(node) => match &node.kind {
                SchemaKind::Array => {
                    let mut spans = vec![Span::text("array of ")];
                    match &node.items {
                        Some(SchemaRef::Named(key)) => spans.extend(self.named_spans(key)),
                        Some(SchemaRef::Inline(inner)) => {
                            spans.push(Span::text(inner.type_label()))
                        }
                        None => spans.push(Span::text("any")),
                    }
                    spans
                }
                _ => vec![Span::text(node.type_label())],
            },
        }
    }

    fn named_spans(&self, key: &str) -> Vec<Span> {
        vec![
            Span::text(self.doc.registry.display_name(key)),
            Span::text(" (see "),
            Span::page_ref(schema_anchor(key)),
            Span::text(")"),
        ]
    }

    // ----- pagination ---------------------------------------------------

    fn push(&mut self, block: Block) -> AppResult<()> {
        if block.keep_with_next() {
            self.pending.push(block);
            return Ok(());
        }
        let mut group = std::mem::take(&mut self.pending);
        group.push(block);
        self.place_group(group)
    }

    /// Flushes a trailing keep-with-next run (end of document, or before a
    /// forced page break).
    fn commit_pending(&mut self) -> AppResult<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let group = std::mem::take(&mut self.pending);
        self.place_group(group)
    }

    fn place_group(&mut self, group: Vec<Block>) -> AppResult<()> {
        let capacity = self.options.lines_per_page;
        let height: usize = group.iter().map(Block::height).sum();
        if height > capacity {
            let first = group
                .first()
                .map(Block::describe)
                .unwrap_or_else(|| "empty block".to_string());
            return Err(AppError::Layout(format!(
                "{} in {} needs {} lines but a page holds {}",
                first, self.context, height, capacity
            )));
        }

        if self.used + height > capacity {
            // The group starts on a fresh page; a table that continues
            // across the break gets its column captions again.
            let resume = self.resume_header(&group);
            self.flush_page();
            if let Some(header) = resume {
                self.place(header);
            }
        }
        for block in group {
            self.place(block);
        }
        Ok(())
    }

    fn resume_header(&self, group: &[Block]) -> Option<Block> {
        if group.iter().all(|b| matches!(b, Block::Row { .. })) {
            self.table_columns
                .clone()
                .map(|columns| Block::TableHeader { columns })
        } else {
            None
        }
    }

    fn place(&mut self, block: Block) {
        if let Block::Heading {
            anchor: Some(id), ..
        } = &block
        {
            self.anchors.insert(
                id.clone(),
                AnchorPos {
                    page: self.pages.len() + 1,
                    line: self.used,
                },
            );
        }
        match &block {
            Block::TableHeader { columns } => self.table_columns = Some(columns.clone()),
            Block::Row { .. } => {}
            _ => self.table_columns = None,
        }
        self.used += block.height();
        self.current.push(block);
    }

    fn break_page(&mut self) -> AppResult<()> {
        self.commit_pending()?;
        self.flush_page();
        Ok(())
    }

    fn flush_page(&mut self) {
        if self.current.is_empty() {
            return;
        }
        self.pages.push(Page {
            number: self.pages.len() + 1,
            blocks: std::mem::take(&mut self.current),
        });
        self.used = 0;
        self.table_columns = None;
    }

    // ----- pass 2 -------------------------------------------------------

    /// Rewrites every cross-reference mention to its final page number.
    /// Runs after pagination, so mentions are never stale even when earlier
    /// content shifted later anchors.
    fn resolve_references(&mut self) {
        let anchors = &self.anchors;
        for page in &mut self.pages {
            for block in &mut page.blocks {
                match block {
                    Block::TocEntry { target, page, .. } => {
                        *page = anchors.get(target).map(|pos| pos.page);
                    }
                    Block::Row { cells } => {
                        for cell in cells {
                            rewrite_spans(cell, anchors);
                        }
                    }
                    Block::Text { spans, .. } => rewrite_spans(spans, anchors),
                    _ => {}
                }
            }
        }
    }
}

fn rewrite_spans(spans: &mut [Span], anchors: &IndexMap<String, AnchorPos>) {
    for span in spans {
        if let Span::PageRef { anchor, page } = span {
            *page = anchors.get(anchor).map(|pos| pos.page);
        }
    }
}

fn first_line(text: Option<&str>) -> String {
    text.and_then(|t| t.lines().next())
        .unwrap_or("")
        .to_string()
}

fn section_anchor(section: &Section) -> String {
    format!("section:{}", section.heading)
}

fn operation_anchor(section_idx: usize, op_idx: usize) -> String {
    format!("op:{}.{}", section_idx + 1, op_idx + 1)
}

fn appendix_anchor(group_idx: usize) -> String {
    format!("appendix:{}", group_idx + 1)
}

fn schema_anchor(key: &str) -> String {
    format!("schema:{}", key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SchemaRegistry;
    use pretty_assertions::assert_eq;

    fn empty_doc() -> Document {
        Document {
            title: "T".to_string(),
            subtitle: None,
            version: None,
            description: None,
            servers: Vec::new(),
            sections: Vec::new(),
            registry: SchemaRegistry::new(),
            appendix: Vec::new(),
        }
    }

    fn row(label: &str) -> Block {
        Block::Row {
            cells: vec![vec![Span::text(label)]],
        }
    }

    #[test]
    fn test_table_splits_at_row_granularity_with_resumed_header() {
        let doc = empty_doc();
        let mut engine = LayoutEngine::new(&doc, LayoutOptions { lines_per_page: 5 });

        engine
            .push(Block::TableHeader {
                columns: vec!["Name".into()],
            })
            .unwrap();
        for i in 0..6 {
            engine.push(row(&format!("r{}", i))).unwrap();
        }
        engine.flush_page();

        // Page 1: header (2) + first row grouped with it + 2 more rows.
        assert_eq!(engine.pages.len(), 2);
        assert_eq!(engine.pages[0].blocks.len(), 4);
        // Page 2 resumes with a re-emitted header before the remaining rows.
        assert!(matches!(
            engine.pages[1].blocks[0],
            Block::TableHeader { .. }
        ));
        assert_eq!(engine.pages[1].blocks.len(), 4);
    }

    #[test]
    fn test_heading_never_strands_at_page_bottom() {
        let doc = empty_doc();
        let mut engine = LayoutEngine::new(&doc, LayoutOptions { lines_per_page: 4 });

        engine
            .push(Block::Text {
                indent: 0,
                spans: vec![Span::text("filler")],
            })
            .unwrap();
        engine
            .push(Block::Text {
                indent: 0,
                spans: vec![Span::text("filler")],
            })
            .unwrap();
        // Heading (2 lines) + text (1 line) exceed the 1 remaining line; the
        // whole group moves to page 2.
        engine
            .push(Block::Heading {
                level: 1,
                text: "Pets".into(),
                anchor: Some("section:Pets".into()),
            })
            .unwrap();
        engine
            .push(Block::Text {
                indent: 0,
                spans: vec![Span::text("body")],
            })
            .unwrap();
        engine.flush_page();

        assert_eq!(engine.pages.len(), 2);
        assert!(matches!(engine.pages[1].blocks[0], Block::Heading { .. }));
        assert_eq!(
            engine.anchors.get("section:Pets"),
            Some(&AnchorPos { page: 2, line: 0 })
        );
    }

    #[test]
    fn test_atomic_block_taller_than_page_is_structural_error() {
        let doc = empty_doc();
        let mut engine = LayoutEngine::new(&doc, LayoutOptions { lines_per_page: 1 });
        engine.context = "operation GET /pets".to_string();

        engine
            .push(Block::Heading {
                level: 2,
                text: "GET /pets".into(),
                anchor: None,
            })
            .unwrap();
        let err = engine.push(row("r")).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("GET /pets"), "got: {}", message);
        assert!(matches!(err, AppError::Layout(_)));
    }

    #[test]
    fn test_pass_two_rewrites_page_refs() {
        let doc = empty_doc();
        let mut engine = LayoutEngine::new(&doc, LayoutOptions { lines_per_page: 10 });

        engine
            .push(Block::Row {
                cells: vec![vec![
                    Span::text("Pet"),
                    Span::page_ref("schema:Pet"),
                ]],
            })
            .unwrap();
        engine.break_page().unwrap();
        engine
            .push(Block::Heading {
                level: 2,
                text: "Pet".into(),
                anchor: Some("schema:Pet".into()),
            })
            .unwrap();
        engine.commit_pending().unwrap();
        engine.flush_page();
        engine.resolve_references();

        let Block::Row { cells } = &engine.pages[0].blocks[0] else {
            panic!("expected row");
        };
        assert_eq!(
            cells[0][1],
            Span::PageRef {
                anchor: "schema:Pet".into(),
                page: Some(2),
            }
        );
    }

    #[test]
    fn test_empty_document_still_produces_title_and_toc() {
        let doc = empty_doc();
        let result = LayoutEngine::new(&doc, LayoutOptions::default())
            .layout()
            .unwrap();
        assert_eq!(result.pages.len(), 2);
        assert!(matches!(result.pages[0].blocks[0], Block::Title(_)));
    }
}
