#![deny(missing_docs)]

//! # Generator Facade
//!
//! The two-phase entry point the CLI collaborator drives: `parse` once per
//! input file, then a single `done` that builds the model, runs layout, and
//! flushes everything through the render backend.

use crate::error::{AppError, AppResult};
use crate::layout::{LayoutEngine, LayoutOptions};
use crate::model::Diagnostic;
use crate::oas::{BuildOptions, DocumentBuilder};
use crate::render::RenderBackend;

/// Options controlling one run.
#[derive(Debug, Clone, Default)]
pub struct GeneratorOptions {
    /// Title override; defaults to the first parsed file's `info.title`.
    pub title: Option<String>,
    /// Subtitle rendered on the title page.
    pub subtitle: Option<String>,
    /// Share one schema namespace across all input files.
    pub merge_schemas: bool,
    /// Page geometry for the layout engine.
    pub layout: LayoutOptions,
}

/// Everything a caller needs to report on a finished run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// The rendered artifact bytes.
    pub artifact: Vec<u8>,
    /// Non-fatal findings, in occurrence order.
    pub diagnostics: Vec<Diagnostic>,
    /// Number of pages in the artifact.
    pub pages: usize,
}

/// Accumulates spec texts and renders them in one finalize step.
pub struct Generator<B: RenderBackend> {
    builder: DocumentBuilder,
    backend: B,
    layout: LayoutOptions,
}

impl<B: RenderBackend> Generator<B> {
    /// Creates a generator over the given backend.
    pub fn new(options: GeneratorOptions, backend: B) -> Self {
        let layout = options.layout;
        let build = BuildOptions {
            title: options.title,
            subtitle: options.subtitle,
            merge_schemas: options.merge_schemas,
        };
        Self {
            builder: DocumentBuilder::new(build),
            backend,
            layout,
        }
    }

    /// Ingests one spec text under a source label. Parse failures surface as
    /// diagnostics from [`Self::done`], never here.
    pub fn parse(&mut self, raw_text: &str, label: &str) {
        self.builder.add_spec(label, raw_text);
    }

    /// Finalizes the run: builds the model, lays it out, drives the backend.
    ///
    /// The run always produces an artifact if at least one input file parsed
    /// successfully; zero parsed files is the one fatal outcome.
    pub fn done(mut self) -> AppResult<RunSummary> {
        let output = self.builder.build();
        if output.parsed_files == 0 {
            let detail: Vec<String> =
                output.diagnostics.iter().map(|d| d.to_string()).collect();
            return Err(AppError::General(format!(
                "no input files could be parsed: {}",
                if detail.is_empty() {
                    "no inputs given".to_string()
                } else {
                    detail.join("; ")
                }
            )));
        }

        let layout = LayoutEngine::new(&output.document, self.layout).layout()?;

        self.backend.add_title_page(
            &output.document.title,
            output.document.subtitle.as_deref(),
        )?;
        for (id, pos) in &layout.anchors {
            self.backend.register_anchor(id, pos.page, pos.line)?;
        }
        for page in &layout.pages {
            self.backend.begin_page(page.number)?;
            for block in &page.blocks {
                self.backend.emit(block)?;
            }
        }
        let artifact = self.backend.finish()?;

        Ok(RunSummary {
            artifact,
            diagnostics: output.diagnostics,
            pages: layout.pages.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::TextRenderer;

    const MINIMAL: &str = r#"
openapi: 3.0.0
info: {title: Minimal, version: "1.0"}
paths:
  /health:
    get:
      responses:
        '200': {description: ok}
"#;

    #[test]
    fn test_done_without_inputs_is_fatal() {
        let generator = Generator::new(GeneratorOptions::default(), TextRenderer::new());
        let err = generator.done().unwrap_err();
        assert!(err.to_string().contains("no input files could be parsed"));
    }

    #[test]
    fn test_done_with_only_unparsable_inputs_is_fatal() {
        let mut generator = Generator::new(GeneratorOptions::default(), TextRenderer::new());
        generator.parse("{ broken", "bad.json");
        let err = generator.done().unwrap_err();
        assert!(err.to_string().contains("bad.json"));
    }

    #[test]
    fn test_single_file_produces_artifact() {
        let mut generator = Generator::new(GeneratorOptions::default(), TextRenderer::new());
        generator.parse(MINIMAL, "minimal.yaml");
        let summary = generator.done().unwrap();
        assert!(summary.diagnostics.is_empty());
        assert!(summary.pages >= 3);
        let text = String::from_utf8(summary.artifact).unwrap();
        assert!(text.contains("Minimal"));
        assert!(text.contains("GET /health"));
    }
}
