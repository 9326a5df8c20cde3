#![deny(missing_docs)]

//! # Document Builder
//!
//! Logic that transforms parsed spec shims into the canonical [`Document`]
//! model, one run at a time.
//!
//! The builder implements the two-phase protocol: [`DocumentBuilder::add_spec`]
//! accumulates raw inputs, and the single [`DocumentBuilder::build`] call
//! parses, resolves, and merges them atomically; no partially-built state is
//! observable. A malformed input file is skipped with a diagnostic; the run
//! continues with the remaining files.

use crate::model::{
    AppendixGroup, BodyContent, Diagnostic, Document, HttpMethod, Operation, ParamLocation,
    ParameterRow, ResponseRow, SchemaRegistry, Section, ServerInfo,
};
use crate::oas::pointer::extract_component_name;
use crate::oas::resolver::{KeyPlan, ReferenceResolver};
use crate::oas::shims::{
    parse_spec, ShimComponents, ShimOpenApi, ShimOperation, ShimParameter, ShimPathItem,
    ShimRequestBody, ShimResponse,
};
use indexmap::IndexMap;
use serde_json::Value;
use std::collections::HashSet;

/// Options controlling model construction.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Title override; defaults to the first parsed file's `info.title`.
    pub title: Option<String>,
    /// Subtitle rendered under the title.
    pub subtitle: Option<String>,
    /// When true, all files share one schema namespace: structurally equal
    /// bodies deduplicate, differing bodies are renamed deterministically.
    /// When false, each file's schemas stay scoped to that file.
    pub merge_schemas: bool,
}

/// The result of a build: the immutable document plus everything the caller
/// needs to report on the run.
#[derive(Debug, Clone)]
pub struct BuildOutput {
    /// The canonical document model.
    pub document: Document,
    /// Non-fatal findings accumulated across all files.
    pub diagnostics: Vec<Diagnostic>,
    /// Number of input files that parsed successfully.
    pub parsed_files: usize,
}

/// Accumulates raw spec texts and builds the document model in one step.
#[derive(Debug, Default)]
pub struct DocumentBuilder {
    options: BuildOptions,
    specs: Vec<(String, String)>,
}

impl DocumentBuilder {
    /// Creates a builder with the given options.
    pub fn new(options: BuildOptions) -> Self {
        Self {
            options,
            specs: Vec::new(),
        }
    }

    /// Accumulates one raw spec text under a source label.
    ///
    /// Parsing is deferred to [`Self::build`] so that the model is
    /// constructed in a single atomic step.
    pub fn add_spec(&mut self, label: &str, raw_text: &str) {
        self.specs.push((label.to_string(), raw_text.to_string()));
    }

    /// Parses, resolves, and merges all accumulated specs.
    pub fn build(self) -> BuildOutput {
        let mut diagnostics = Vec::new();

        let mut parsed: Vec<(String, ShimOpenApi, Value)> = Vec::new();
        for (label, raw_text) in &self.specs {
            match parse_spec(raw_text) {
                Ok((shim, raw)) => parsed.push((label.clone(), shim, raw)),
                Err(err) => diagnostics.push(Diagnostic::ParseFailure {
                    label: label.clone(),
                    message: err.to_string(),
                }),
            }
        }

        let mut state = BuildState::new(&self.options);
        for (label, shim, raw) in &parsed {
            state.ingest(label, shim, raw, &mut diagnostics);
        }

        BuildOutput {
            document: state.into_document(&self.options),
            diagnostics,
            parsed_files: parsed.len(),
        }
    }
}

/// Mutable working set threaded through per-file ingestion.
struct BuildState {
    merge_schemas: bool,
    registry: SchemaRegistry,
    reported: HashSet<(String, String)>,
    /// Merge mode: schema name -> (canonical key, raw body, first source).
    merged_bodies: IndexMap<String, (String, Value, String)>,
    sections: Vec<Section>,
    section_lookup: IndexMap<String, usize>,
    appendix: Vec<AppendixGroup>,
    servers: Vec<ServerInfo>,
    title: Option<String>,
    version: Option<String>,
    description: Option<String>,
}

impl BuildState {
    fn new(options: &BuildOptions) -> Self {
        Self {
            merge_schemas: options.merge_schemas,
            registry: SchemaRegistry::new(),
            reported: HashSet::new(),
            merged_bodies: IndexMap::new(),
            sections: Vec::new(),
            section_lookup: IndexMap::new(),
            appendix: Vec::new(),
            servers: Vec::new(),
            title: None,
            version: None,
            description: None,
        }
    }

    fn ingest(
        &mut self,
        label: &str,
        shim: &ShimOpenApi,
        raw: &Value,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        if let Some(info) = &shim.info {
            if self.title.is_none() {
                self.title = info.title.clone();
            }
            if self.version.is_none() {
                self.version = info.version.clone();
            }
            if self.description.is_none() {
                self.description = info.description.clone();
            }
        }
        for server in &shim.servers {
            if !self.servers.iter().any(|s| s.url == server.url) {
                self.servers.push(ServerInfo {
                    url: server.url.clone(),
                    description: server.description.clone(),
                });
            }
        }

        let raw_schemas = shim
            .components
            .as_ref()
            .and_then(|c| c.schemas.clone())
            .unwrap_or_default();
        let key_map = self.plan_keys(label, &raw_schemas, diagnostics);
        let file_keys: Vec<String> = key_map
            .values()
            .filter_map(|plan| match plan {
                KeyPlan::New { key, .. } => Some(key.clone()),
                KeyPlan::Alias { .. } => None,
            })
            .collect();

        let mut resolver = ReferenceResolver::new(
            &mut self.registry,
            diagnostics,
            &mut self.reported,
            label,
            raw,
            raw_schemas,
            key_map,
        );
        resolver.resolve_components();

        let tag_descriptions: IndexMap<&str, &str> = shim
            .tags
            .iter()
            .filter_map(|t| t.description.as_deref().map(|d| (t.name.as_str(), d)))
            .collect();

        if let Some(paths) = &shim.paths {
            for (path, item) in &paths.items {
                ingest_path_item(
                    &mut self.sections,
                    &mut self.section_lookup,
                    path,
                    item,
                    shim.components.as_ref(),
                    &tag_descriptions,
                    &mut resolver,
                );
            }
        }
        drop(resolver);

        if !self.merge_schemas && !file_keys.is_empty() {
            self.appendix.push(AppendixGroup {
                heading: format!("Schemas ({})", label),
                keys: file_keys,
            });
        }
    }

    /// Decides, before resolution, how each of this file's schema names maps
    /// into the registry. File order defines the tie-break; the decision is
    /// a serialized, ordered step even though it only matters under merges.
    fn plan_keys(
        &mut self,
        label: &str,
        raw_schemas: &IndexMap<String, Value>,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> IndexMap<String, KeyPlan> {
        let mut plans = IndexMap::new();
        let mut planned: HashSet<String> = HashSet::new();

        for (name, body) in raw_schemas {
            let plan = if !self.merge_schemas {
                let key = self.unique_key(format!("{}::{}", label, name), &planned);
                KeyPlan::New {
                    key,
                    display: name.clone(),
                }
            } else {
                match self.merged_bodies.get(name) {
                    None => {
                        let key = self.unique_key(name.clone(), &planned);
                        self.merged_bodies.insert(
                            name.clone(),
                            (key.clone(), body.clone(), label.to_string()),
                        );
                        KeyPlan::New {
                            key,
                            display: name.clone(),
                        }
                    }
                    Some((key, existing_body, _)) if existing_body == body => {
                        // Identical bodies under the same name deduplicate.
                        KeyPlan::Alias { key: key.clone() }
                    }
                    Some((_, _, first_source)) => {
                        let renamed =
                            self.unique_key(format!("{} ({})", name, label), &planned);
                        diagnostics.push(Diagnostic::NameCollision {
                            name: name.clone(),
                            existing_source: first_source.clone(),
                            new_source: label.to_string(),
                            renamed_to: renamed.clone(),
                        });
                        KeyPlan::New {
                            key: renamed.clone(),
                            display: renamed,
                        }
                    }
                }
            };
            planned.insert(plan.key().to_string());
            plans.insert(name.clone(), plan);
        }
        plans
    }

    fn unique_key(&self, base: String, planned: &HashSet<String>) -> String {
        if !self.registry.contains(&base) && !planned.contains(&base) {
            return base;
        }
        let mut counter = 2;
        loop {
            let candidate = format!("{} #{}", base, counter);
            if !self.registry.contains(&candidate) && !planned.contains(&candidate) {
                return candidate;
            }
            counter += 1;
        }
    }

    fn into_document(mut self, options: &BuildOptions) -> Document {
        if self.merge_schemas && !self.registry.is_empty() {
            self.appendix.push(AppendixGroup {
                heading: "Schemas".to_string(),
                keys: self.registry.keys().cloned().collect(),
            });
        }

        Document {
            title: options
                .title
                .clone()
                .or(self.title)
                .unwrap_or_else(|| "API Reference".to_string()),
            subtitle: options.subtitle.clone(),
            version: self.version,
            description: self.description,
            servers: self.servers,
            sections: self.sections,
            registry: self.registry,
            appendix: self.appendix,
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn ingest_path_item(
    sections: &mut Vec<Section>,
    section_lookup: &mut IndexMap<String, usize>,
    path: &str,
    item: &ShimPathItem,
    components: Option<&ShimComponents>,
    tag_descriptions: &IndexMap<&str, &str>,
    resolver: &mut ReferenceResolver<'_>,
) {
    let common_params =
        resolve_parameters(item.parameters.as_deref().unwrap_or(&[]), components, resolver);

    // Fixed method order for cross-run determinism regardless of input
    // key ordering.
    for method in HttpMethod::ORDER {
        let Some(op) = operation_of(item, method) else {
            continue;
        };
        let operation = build_operation(method, path, op, &common_params, components, resolver);

        let heading = section_heading(&op.tags, path);
        let section_idx = match section_lookup.get(&heading) {
            Some(idx) => *idx,
            None => {
                sections.push(Section {
                    heading: heading.clone(),
                    description: None,
                    operations: Vec::new(),
                });
                let idx = sections.len() - 1;
                section_lookup.insert(heading.clone(), idx);
                idx
            }
        };
        let section = &mut sections[section_idx];
        if section.description.is_none() {
            section.description = tag_descriptions
                .get(heading.as_str())
                .map(|d| d.to_string());
        }
        section.operations.push(operation);
    }
}

/// The section an operation belongs to: first tag, else first path segment.
fn section_heading(tags: &[String], path: &str) -> String {
    if let Some(tag) = tags.first() {
        return tag.clone();
    }
    path.trim_start_matches('/')
        .split('/')
        .next()
        .filter(|segment| !segment.is_empty())
        .unwrap_or("default")
        .to_string()
}

fn operation_of(item: &ShimPathItem, method: HttpMethod) -> Option<&ShimOperation> {
    match method {
        HttpMethod::Get => item.get.as_ref(),
        HttpMethod::Put => item.put.as_ref(),
        HttpMethod::Post => item.post.as_ref(),
        HttpMethod::Delete => item.delete.as_ref(),
        HttpMethod::Options => item.options.as_ref(),
        HttpMethod::Head => item.head.as_ref(),
        HttpMethod::Patch => item.patch.as_ref(),
        HttpMethod::Trace => item.trace.as_ref(),
    }
}

fn build_operation(
    method: HttpMethod,
    path: &str,
    op: &ShimOperation,
    common_params: &[ParameterRow],
    components: Option<&ShimComponents>,
    resolver: &mut ReferenceResolver<'_>,
) -> Operation {
    // Operation-level parameters override path-item parameters that share
    // both name and location.
    let mut parameters = common_params.to_vec();
    let own = resolve_parameters(op.parameters.as_deref().unwrap_or(&[]), components, resolver);
    for param in own {
        match parameters
            .iter_mut()
            .find(|p| p.name == param.name && p.location == param.location)
        {
            Some(existing) => *existing = param,
            None => parameters.push(param),
        }
    }

    let request_body = op
        .request_body
        .as_ref()
        .map(|raw| resolve_request_body(raw, components, resolver))
        .unwrap_or_default();

    let mut responses = Vec::new();
    if let Some(raw_responses) = &op.responses {
        for (status, raw) in raw_responses {
            responses.push(resolve_response(status, raw, components, resolver));
        }
    }

    Operation {
        method,
        path: path.to_string(),
        operation_id: op.operation_id.clone(),
        summary: op.summary.clone(),
        description: op.description.clone(),
        deprecated: op.deprecated,
        parameters,
        request_body,
        responses,
    }
}

/// Resolves a raw parameter list; entries may be inline objects or `$ref`s
/// into `components/parameters`. An unresolvable entry becomes a visible
/// placeholder row rather than silently disappearing.
fn resolve_parameters(
    raw_params: &[Value],
    components: Option<&ShimComponents>,
    resolver: &mut ReferenceResolver<'_>,
) -> Vec<ParameterRow> {
    let mut result = Vec::new();
    for raw in raw_params {
        let peeled = peel_component_ref(raw, components, "parameters", |c| c.parameters.as_ref());
        let parsed = peeled
            .as_ref()
            .and_then(|value| serde_json::from_value::<ShimParameter>(value.clone()).ok());

        match parsed {
            Some(param) => {
                let schema = param.schema.as_ref().map(|s| resolver.resolve_value(s));
                result.push(ParameterRow {
                    name: param.name,
                    location: ParamLocation::parse(&param.location),
                    required: param.required,
                    description: param.description,
                    schema,
                });
            }
            None => {
                let pointer = raw
                    .get("$ref")
                    .and_then(Value::as_str)
                    .unwrap_or("<malformed parameter>");
                let schema = resolver.resolve_ref(pointer);
                result.push(ParameterRow {
                    name: pointer
                        .rsplit('/')
                        .next()
                        .unwrap_or(pointer)
                        .to_string(),
                    location: ParamLocation::Query,
                    required: false,
                    description: None,
                    schema: Some(schema),
                });
            }
        }
    }
    result
}

fn resolve_request_body(
    raw: &Value,
    components: Option<&ShimComponents>,
    resolver: &mut ReferenceResolver<'_>,
) -> Vec<BodyContent> {
    let peeled =
        peel_component_ref(raw, components, "requestBodies", |c| c.request_bodies.as_ref());
    let Some(body) = peeled
        .as_ref()
        .and_then(|value| serde_json::from_value::<ShimRequestBody>(value.clone()).ok())
    else {
        let pointer = raw
            .get("$ref")
            .and_then(Value::as_str)
            .unwrap_or("<malformed request body>");
        return vec![BodyContent {
            media_type: "*/*".to_string(),
            schema: Some(resolver.resolve_ref(pointer)),
        }];
    };

    body.content
        .iter()
        .map(|(media_type, media)| BodyContent {
            media_type: media_type.clone(),
            schema: media.schema.as_ref().map(|s| resolver.resolve_value(s)),
        })
        .collect()
}

fn resolve_response(
    status: &str,
    raw: &Value,
    components: Option<&ShimComponents>,
    resolver: &mut ReferenceResolver<'_>,
) -> ResponseRow {
    let peeled = peel_component_ref(raw, components, "responses", |c| c.responses.as_ref());
    let Some(response) = peeled
        .as_ref()
        .and_then(|value| serde_json::from_value::<ShimResponse>(value.clone()).ok())
    else {
        let pointer = raw
            .get("$ref")
            .and_then(Value::as_str)
            .unwrap_or("<malformed response>");
        return ResponseRow {
            status: status.to_string(),
            description: None,
            content: vec![BodyContent {
                media_type: "*/*".to_string(),
                schema: Some(resolver.resolve_ref(pointer)),
            }],
        };
    };

    ResponseRow {
        status: status.to_string(),
        description: response.description.clone(),
        content: response
            .content
            .iter()
            .map(|(media_type, media)| BodyContent {
                media_type: media_type.clone(),
                schema: media.schema.as_ref().map(|s| resolver.resolve_value(s)),
            })
            .collect(),
    }
}

/// Peels one level of `$ref` indirection into the named components section.
/// Returns the target value, the original inline value, or `None` when the
/// ref misses (the caller substitutes a placeholder).
fn peel_component_ref<'c>(
    raw: &Value,
    components: Option<&'c ShimComponents>,
    section: &str,
    accessor: impl Fn(&'c ShimComponents) -> Option<&'c IndexMap<String, Value>>,
) -> Option<Value> {
    let Some(ref_str) = raw.get("$ref").and_then(Value::as_str) else {
        return Some(raw.clone());
    };
    let name = extract_component_name(ref_str, section)?;
    components
        .and_then(accessor)
        .and_then(|map| map.get(&name))
        .cloned()
}
