//! End-to-end pipeline tests: build, layout, render.

use oasdoc_core::{
    Block, BuildOptions, Diagnostic, DocumentBuilder, Generator, GeneratorOptions, LayoutEngine,
    LayoutOptions, LayoutResult, SchemaKind, SchemaRef, Span, TextRenderer,
};
use pretty_assertions::assert_eq;

const PETS: &str = r#"
openapi: 3.0.0
info: {title: Pet Store, version: "1.0"}
paths:
  /pets:
    get:
      responses:
        '200':
          description: ok
          content:
            application/json:
              schema: {$ref: '#/components/schemas/Pet'}
components:
  schemas:
    Pet:
      type: object
      properties:
        name: {type: string}
"#;

const ERRORS_A: &str = r#"
openapi: 3.0.0
info: {title: Service A, version: "1.0"}
paths:
  /a:
    get:
      responses:
        '500':
          description: failure
          content:
            application/json:
              schema: {$ref: '#/components/schemas/Error'}
components:
  schemas:
    Error:
      type: object
      properties:
        message: {type: string}
"#;

const ERRORS_B: &str = r#"
openapi: 3.0.0
info: {title: Service B, version: "1.0"}
paths:
  /b:
    get:
      responses:
        '500':
          description: failure
          content:
            application/json:
              schema: {$ref: '#/components/schemas/Error'}
components:
  schemas:
    Error:
      type: object
      properties:
        message: {type: string}
"#;

fn render(merge_schemas: bool, specs: &[(&str, &str)]) -> (Vec<u8>, Vec<Diagnostic>) {
    let options = GeneratorOptions {
        merge_schemas,
        ..Default::default()
    };
    let mut generator = Generator::new(options, TextRenderer::new());
    for (label, text) in specs {
        generator.parse(text, label);
    }
    let summary = generator.done().unwrap();
    (summary.artifact, summary.diagnostics)
}

fn lay_out(merge_schemas: bool, specs: &[(&str, &str)]) -> LayoutResult {
    let options = BuildOptions {
        merge_schemas,
        ..Default::default()
    };
    let mut builder = DocumentBuilder::new(options);
    for (label, text) in specs {
        builder.add_spec(label, text);
    }
    let output = builder.build();
    LayoutEngine::new(&output.document, LayoutOptions::default())
        .layout()
        .unwrap()
}

#[test]
fn pet_scenario_renders_one_operation_and_one_appendix_entry() {
    let (artifact, diagnostics) = render(false, &[("pets.yaml", PETS)]);
    assert!(diagnostics.is_empty());

    let text = String::from_utf8(artifact).unwrap();
    assert!(text.contains("Pet Store"));
    assert!(text.contains("GET /pets"));
    // The response row cross-references the appendix entry.
    assert!(text.contains("Pet (see p. "));
    // Exactly one appendix expansion of Pet: one schema heading underline.
    assert_eq!(text.matches("\nPet\n---\n").count(), 1);
}

#[test]
fn identical_error_schemas_merge_into_single_entry() {
    let options = BuildOptions {
        merge_schemas: true,
        ..Default::default()
    };
    let mut builder = DocumentBuilder::new(options);
    builder.add_spec("a.yaml", ERRORS_A);
    builder.add_spec("b.yaml", ERRORS_B);
    let output = builder.build();

    assert_eq!(output.document.registry.len(), 1);
    assert!(output.diagnostics.is_empty());

    // Both files' operations reference the same node.
    let refs: Vec<&SchemaRef> = output
        .document
        .sections
        .iter()
        .flat_map(|s| &s.operations)
        .filter_map(|op| op.responses[0].content[0].schema.as_ref())
        .collect();
    assert_eq!(refs.len(), 2);
    assert_eq!(refs[0], refs[1]);
    assert_eq!(refs[0], &SchemaRef::Named("Error".to_string()));
}

#[test]
fn merge_is_idempotent_over_identical_files() {
    let single = {
        let mut builder = DocumentBuilder::new(BuildOptions {
            merge_schemas: true,
            ..Default::default()
        });
        builder.add_spec("a.yaml", PETS);
        builder.build()
    };
    let double = {
        let mut builder = DocumentBuilder::new(BuildOptions {
            merge_schemas: true,
            ..Default::default()
        });
        builder.add_spec("a.yaml", PETS);
        builder.add_spec("b.yaml", PETS);
        builder.build()
    };
    assert_eq!(
        single.document.registry.len(),
        double.document.registry.len()
    );
}

#[test]
fn invalid_file_alongside_valid_still_produces_artifact() {
    let (artifact, diagnostics) = render(false, &[("bad.json", "{ not json"), ("pets.yaml", PETS)]);

    let text = String::from_utf8(artifact).unwrap();
    assert!(text.contains("GET /pets"));
    assert_eq!(diagnostics.len(), 1);
    assert!(matches!(
        &diagnostics[0],
        Diagnostic::ParseFailure { label, .. } if label == "bad.json"
    ));
}

#[test]
fn runs_are_byte_identical() {
    let first = render(true, &[("a.yaml", ERRORS_A), ("b.yaml", ERRORS_B)]);
    let second = render(true, &[("a.yaml", ERRORS_A), ("b.yaml", ERRORS_B)]);
    assert_eq!(first.0, second.0);
    assert_eq!(first.1, second.1);
}

#[test]
fn self_referential_schema_expands_once_with_back_reference() {
    let spec = r#"
openapi: 3.0.0
info: {title: Trees, version: "1.0"}
paths:
  /nodes:
    get:
      responses:
        '200':
          description: ok
          content:
            application/json:
              schema: {$ref: '#/components/schemas/Node'}
components:
  schemas:
    Node:
      type: object
      properties:
        value: {type: string}
        children:
          type: array
          items: {$ref: '#/components/schemas/Node'}
"#;
    let (artifact, diagnostics) = render(false, &[("trees.yaml", spec)]);
    assert!(diagnostics.is_empty());

    let text = String::from_utf8(artifact).unwrap();
    // Exactly one full expansion of Node in the appendix.
    assert_eq!(text.matches("\nNode\n----\n").count(), 1);
    // The recursive property renders as a back-reference, not a re-expansion.
    assert!(text.contains("children: array of Node (see p. "));
}

#[test]
fn unresolved_reference_renders_placeholder_and_reports_once() {
    let spec = r#"
openapi: 3.0.0
info: {title: Ghosts, version: "1.0"}
paths:
  /a:
    get:
      responses:
        '200':
          description: ok
          content:
            application/json:
              schema: {$ref: '#/components/schemas/Ghost'}
  /b:
    get:
      responses:
        '200':
          description: ok
          content:
            application/json:
              schema: {$ref: '#/components/schemas/Ghost'}
"#;
    let (artifact, diagnostics) = render(false, &[("ghosts.yaml", spec)]);

    let text = String::from_utf8(artifact).unwrap();
    assert!(text.contains("Schema not found: #/components/schemas/Ghost"));
    // One diagnostic per distinct pointer, not per mention.
    assert_eq!(
        diagnostics,
        vec![Diagnostic::UnresolvedReference {
            label: "ghosts.yaml".into(),
            pointer: "#/components/schemas/Ghost".into(),
        }]
    );
}

#[test]
fn cross_references_are_sound_after_pagination() {
    let layout = lay_out(true, &[("a.yaml", ERRORS_A), ("b.yaml", ERRORS_B)]);

    let mut mentions = 0;
    for page in &layout.pages {
        for block in &page.blocks {
            let spans: Vec<&Span> = match block {
                Block::Row { cells } => cells.iter().flatten().collect(),
                Block::Text { spans, .. } => spans.iter().collect(),
                _ => Vec::new(),
            };
            for span in spans {
                if let Span::PageRef { anchor, page } = span {
                    mentions += 1;
                    let pos = layout
                        .anchors
                        .get(anchor)
                        .unwrap_or_else(|| panic!("dangling anchor '{}'", anchor));
                    assert_eq!(Some(pos.page), *page, "stale mention of '{}'", anchor);
                    // The referent heading really sits on that page.
                    let target_page = &layout.pages[pos.page - 1];
                    assert!(target_page.blocks.iter().any(|b| matches!(
                        b,
                        Block::Heading { anchor: Some(a), .. } if a == anchor
                    )));
                }
            }
            if let Block::TocEntry { target, page, .. } = block {
                let pos = layout
                    .anchors
                    .get(target)
                    .unwrap_or_else(|| panic!("dangling contents target '{}'", target));
                assert_eq!(Some(pos.page), *page);
            }
        }
    }
    assert!(mentions > 0, "expected at least one cross-reference");
}

#[test]
fn unmerged_files_render_separate_appendix_groups() {
    let (artifact, diagnostics) = render(false, &[("a.yaml", ERRORS_A), ("b.yaml", ERRORS_B)]);
    assert!(diagnostics.is_empty());

    let text = String::from_utf8(artifact).unwrap();
    assert!(text.contains("Schemas (a.yaml)"));
    assert!(text.contains("Schemas (b.yaml)"));
}

#[test]
fn colliding_bodies_are_renamed_and_reported() {
    let other = r#"
openapi: 3.0.0
info: {title: Other, version: "1.0"}
paths: {}
components:
  schemas:
    Pet:
      type: object
      properties:
        tag: {type: string}
"#;
    let options = BuildOptions {
        merge_schemas: true,
        ..Default::default()
    };
    let mut builder = DocumentBuilder::new(options);
    builder.add_spec("a.yaml", PETS);
    builder.add_spec("b.yaml", other);
    let output = builder.build();

    assert_eq!(output.document.registry.len(), 2);
    let renamed = output.document.registry.get("Pet (b.yaml)").unwrap();
    assert_eq!(renamed.node.kind, SchemaKind::Object);
    assert!(matches!(
        &output.diagnostics[..],
        [Diagnostic::NameCollision { renamed_to, .. }] if renamed_to == "Pet (b.yaml)"
    ));
}

#[test]
fn acyclic_re_resolution_is_stable() {
    // Building the same input twice yields pointer-identical (structurally
    // equal) registries and documents.
    let build = |label: &str| {
        let mut builder = DocumentBuilder::new(BuildOptions::default());
        builder.add_spec(label, PETS);
        builder.build()
    };
    let first = build("pets.yaml");
    let second = build("pets.yaml");
    assert_eq!(first.document, second.document);
}
