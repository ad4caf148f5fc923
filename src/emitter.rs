//! Declaration emission.
//!
//! Groups discovered interfaces by originating module, resolves the imports
//! each group needs through the source link resolver, and renders one
//! TypeScript module per group: preamble, aggregated imports, then a
//! `export type Name = { ... }` block per interface with one method-shaped
//! member per signature.

use tracing::{debug, info};

use crate::cancel::CancelToken;
use crate::config::TranspileOptions;
use crate::descriptor::{GeneratedModule, InterfaceDeclaration, MethodSignature, NamedType, TypeDescriptor};
use crate::docs;
use crate::error::TranspileError;
use crate::links::SourceLinkResolver;
use crate::mapper::{rewrite_parameter_type, rewrite_return_type};

const GENERATION_BANNER: &str = "/* THIS FILE IS AUTO GENERATED BY hublink */";
const LINT_SUPPRESSIONS: [&str; 2] = ["/* eslint-disable */", "/* tslint:disable */"];
const RUNTIME_IMPORT: &str = "import { IStreamResult, ISubject } from '@microsoft/signalr';";

/// Build the resolver, render every module, and write the output files.
///
/// Convenience entry point composing [`SourceLinkResolver::build`],
/// [`transpile`], and [`write_modules`].
pub async fn generate(
    interfaces: &[InterfaceDeclaration],
    options: &TranspileOptions,
    cancel: &CancelToken,
) -> Result<Vec<GeneratedModule>, TranspileError> {
    let resolver = SourceLinkResolver::build(options, cancel).await?;
    let modules = transpile(interfaces, options, &resolver, cancel)?;
    write_modules(&modules, cancel).await?;
    info!(modules = modules.len(), "generated client modules");
    Ok(modules)
}

/// Render one `GeneratedModule` per distinct originating module identifier,
/// in discovery order. Pure computation; cancellation is checked between
/// module groups.
pub fn transpile(
    interfaces: &[InterfaceDeclaration],
    options: &TranspileOptions,
    resolver: &SourceLinkResolver,
    cancel: &CancelToken,
) -> Result<Vec<GeneratedModule>, TranspileError> {
    let groups = group_by_module(interfaces);
    let mut modules = Vec::with_capacity(groups.len());
    for (module_name, members) in groups {
        if cancel.is_cancelled() {
            return Err(TranspileError::Cancelled);
        }
        modules.push(emit_module(&module_name, &members, options, resolver)?);
    }
    Ok(modules)
}

/// Write every module's assembled contents below the client output
/// directory. Each file is written in a single operation, only after the
/// whole module has been rendered; cancellation between files leaves no
/// partially written file behind.
pub async fn write_modules(
    modules: &[GeneratedModule],
    cancel: &CancelToken,
) -> Result<(), TranspileError> {
    for module in modules {
        if cancel.is_cancelled() {
            return Err(TranspileError::Cancelled);
        }
        if let Some(parent) = module.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| TranspileError::Write {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }
        tokio::fs::write(&module.path, module.contents())
            .await
            .map_err(|source| TranspileError::Write {
                path: module.path.clone(),
                source,
            })?;
        debug!(path = %module.path.display(), "wrote generated module");
    }
    Ok(())
}

impl GeneratedModule {
    /// Assemble the final file text: preamble, imports, a separating blank
    /// line, then the declarations, each followed by a blank line. Newlines
    /// are normalized to `\n`.
    pub fn contents(&self) -> String {
        let mut out = String::new();
        out.push_str(GENERATION_BANNER);
        out.push('\n');
        for line in LINT_SUPPRESSIONS {
            out.push_str(line);
            out.push('\n');
        }
        out.push_str(RUNTIME_IMPORT);
        out.push('\n');
        for import in &self.imports {
            out.push_str(import);
            out.push('\n');
        }
        out.push('\n');
        for declaration in &self.declarations {
            out.push_str(declaration);
            out.push('\n');
        }
        normalize_newlines(&out)
    }
}

fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

fn group_by_module(interfaces: &[InterfaceDeclaration]) -> Vec<(String, Vec<&InterfaceDeclaration>)> {
    let mut groups: Vec<(String, Vec<&InterfaceDeclaration>)> = Vec::new();
    for interface in interfaces {
        match groups.iter_mut().find(|(module, _)| module == &interface.module) {
            Some((_, members)) => members.push(interface),
            None => groups.push((interface.module.clone(), vec![interface])),
        }
    }
    groups
}

fn emit_module(
    module_name: &str,
    members: &[&InterfaceDeclaration],
    options: &TranspileOptions,
    resolver: &SourceLinkResolver,
) -> Result<GeneratedModule, TranspileError> {
    let imports = emit_imports(members, options, resolver);
    let mut declarations = Vec::with_capacity(members.len());
    for interface in members {
        declarations.push(emit_interface(interface, options)?);
    }
    Ok(GeneratedModule {
        path: options.client_dir().join(format!("{module_name}.ts")),
        imports,
        declarations,
    })
}

/// One aggregated import statement per linked source directory, covering
/// every externally defined type the group references. Types without a
/// resolvable link are left to the ambient scope; no import is emitted for
/// them.
fn emit_imports(
    members: &[&InterfaceDeclaration],
    options: &TranspileOptions,
    resolver: &SourceLinkResolver,
) -> Vec<String> {
    let mut external: Vec<&NamedType> = Vec::new();
    for interface in members {
        for method in &interface.methods {
            collect_external(&method.return_type, &mut external);
            for (_, parameter) in &method.parameters {
                collect_external(parameter, &mut external);
            }
        }
    }

    let mut grouped: Vec<(String, Vec<String>)> = Vec::new();
    for named in external {
        let Some(link) = resolver.get_link(&named.name) else {
            debug!(
                type_name = %named.name,
                "no source link for externally defined type, skipping import"
            );
            continue;
        };
        let path = import_path(&link);
        let rendered = options.type_style.apply(&named.name);
        match grouped.iter_mut().find(|(existing, _)| existing == &path) {
            Some((_, names)) => {
                if !names.contains(&rendered) {
                    names.push(rendered);
                }
            }
            None => grouped.push((path, vec![rendered])),
        }
    }

    grouped
        .into_iter()
        .map(|(path, names)| format!("import {{ {} }} from '{}';", names.join(", "), path))
        .collect()
}

/// Every `Named` descriptor reachable from `descriptor` that is annotated as
/// externally defined, including inside arrays, wrappers, and generic
/// arguments.
fn collect_external<'a>(descriptor: &'a TypeDescriptor, out: &mut Vec<&'a NamedType>) {
    match descriptor {
        TypeDescriptor::Named(named) => {
            if named.external {
                out.push(named);
            }
            for arg in &named.type_args {
                collect_external(arg, out);
            }
        }
        TypeDescriptor::Array(element) | TypeDescriptor::Task(element) => {
            collect_external(element, out);
        }
        TypeDescriptor::Stream { element, .. } => collect_external(element, out),
        TypeDescriptor::Primitive(_) | TypeDescriptor::Cancellation => {}
    }
}

fn import_path(link: &str) -> String {
    if link.starts_with('.') || link.starts_with('/') {
        link.to_string()
    } else {
        format!("./{link}")
    }
}

fn emit_interface(
    interface: &InterfaceDeclaration,
    options: &TranspileOptions,
) -> Result<String, TranspileError> {
    let mut out = String::new();
    if let Some(raw) = &interface.docs {
        if let Some(summary) = docs::parse_doc(raw).summary {
            out.push_str(&docs::comment_block(&[summary], 0));
            out.push('\n');
        }
    }
    out.push_str(&format!("export type {} = {{\n", interface.name));
    for method in &interface.methods {
        out.push_str(&emit_method(method, options)?);
    }
    out.push_str("};\n");
    Ok(out)
}

fn emit_method(
    method: &MethodSignature,
    options: &TranspileOptions,
) -> Result<String, TranspileError> {
    let doc = method.docs.as_deref().map(docs::parse_doc).unwrap_or_default();

    let mut doc_lines = Vec::new();
    if let Some(summary) = &doc.summary {
        doc_lines.push(summary.clone());
    }

    let mut rendered_params = Vec::new();
    for (name, descriptor) in &method.parameters {
        let Some(mapped) = rewrite_parameter_type(descriptor, options)? else {
            continue;
        };
        let description = doc
            .param(name)
            .map(str::to_string)
            .unwrap_or_else(|| format!("Transpiled from {}", descriptor.source_name()));
        doc_lines.push(format!("@param {name} {description}"));
        rendered_params.push(format!("{name}: {mapped}"));
    }

    let returns = doc
        .returns
        .clone()
        .unwrap_or_else(|| format!("Transpiled from {}", method.return_type.source_name()));
    doc_lines.push(format!("@returns {returns}"));

    let return_type = rewrite_return_type(&method.return_type, options)?;
    let method_name = options.method_style.apply(&method.name);

    let mut out = docs::comment_block(&doc_lines, 1);
    out.push('\n');
    out.push_str(&format!(
        "  {method_name}({}): {return_type};\n",
        rendered_params.join(", ")
    ));
    Ok(out)
}
