//! Mapping of type descriptors into TypeScript type expressions.
//!
//! `map_type` handles the structural recursion (primitives, arrays, named
//! generics). Streaming and task wrappers are resolved before it runs, by
//! two direction-sensitive rewrite functions: the same "sequence over time"
//! shape means "the server streams to me" on a return type and "I stream to
//! the server" on a parameter type, so return position rewrites to the
//! pull-oriented `IStreamResult` and parameter position to the push-oriented
//! `ISubject`.

use tracing::warn;

use crate::config::TranspileOptions;
use crate::descriptor::{NamedType, TypeDescriptor};
use crate::error::TranspileError;

/// Fallback rendering for types with no known mapping.
pub const UNKNOWN_TYPE: &str = "unknown";

fn builtin_primitive(name: &str) -> Option<&'static str> {
    match name {
        "string" | "char" | "Guid" | "DateTime" | "DateTimeOffset" | "TimeSpan" | "Uri" => {
            Some("string")
        }
        "byte" | "sbyte" | "short" | "ushort" | "int" | "uint" | "long" | "ulong" | "float"
        | "double" | "decimal" => Some("number"),
        "bool" => Some("boolean"),
        "void" => Some("void"),
        "object" => Some("unknown"),
        _ => None,
    }
}

/// Render a descriptor as a TypeScript type expression.
///
/// Total over the descriptor grammar except for `Stream` and `Task`, which
/// must be resolved by the rewrite functions first; one reaching this
/// function is a bug in the caller and fails hard rather than degrading.
pub fn map_type(
    descriptor: &TypeDescriptor,
    options: &TranspileOptions,
) -> Result<String, TranspileError> {
    match descriptor {
        TypeDescriptor::Primitive(name) => Ok(map_primitive(name, options)),
        TypeDescriptor::Array(element) => Ok(format!("{}[]", map_type(element, options)?)),
        TypeDescriptor::Named(named) => map_named(named, options),
        TypeDescriptor::Cancellation => {
            warn!("cancellation token has no TypeScript representation, rendering `unknown`");
            Ok(UNKNOWN_TYPE.to_string())
        }
        TypeDescriptor::Stream { .. } | TypeDescriptor::Task(_) => {
            Err(TranspileError::InvariantViolation(format!(
                "unrewritten wrapper reached the type mapper: {}",
                descriptor.source_name()
            )))
        }
    }
}

fn map_primitive(name: &str, options: &TranspileOptions) -> String {
    if let Some(mapped) = options.primitive_overrides.get(name) {
        return mapped.clone();
    }
    match builtin_primitive(name) {
        Some(mapped) => mapped.to_string(),
        None => {
            warn!(type_name = %name, "no TypeScript mapping, rendering `unknown`");
            UNKNOWN_TYPE.to_string()
        }
    }
}

fn map_named(named: &NamedType, options: &TranspileOptions) -> Result<String, TranspileError> {
    let ident = options.type_style.apply(&named.name);
    if named.type_args.is_empty() {
        return Ok(ident);
    }
    let args = named
        .type_args
        .iter()
        .map(|arg| map_type(arg, options))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(format!("{}<{}>", ident, args.join(", ")))
}

/// Rewrite a method's return type.
///
/// Stream shapes become `IStreamResult<T>`; a task wrapping a stream rewrites
/// identically, since stream results are inherently asynchronous. Any other
/// task becomes `Promise<T>`, the uniform asynchronous call convention of the
/// client runtime.
pub fn rewrite_return_type(
    return_type: &TypeDescriptor,
    options: &TranspileOptions,
) -> Result<String, TranspileError> {
    match return_type {
        TypeDescriptor::Stream { element, .. } => {
            Ok(format!("IStreamResult<{}>", map_type(element, options)?))
        }
        TypeDescriptor::Task(inner) => match inner.as_ref() {
            TypeDescriptor::Stream { element, .. } => {
                Ok(format!("IStreamResult<{}>", map_type(element, options)?))
            }
            other => Ok(format!("Promise<{}>", map_type(other, options)?)),
        },
        other => map_type(other, options),
    }
}

/// Rewrite a single parameter type.
///
/// Returns `None` for cancellation tokens, which have no client-side
/// representation and are dropped from the parameter list entirely.
pub fn rewrite_parameter_type(
    parameter_type: &TypeDescriptor,
    options: &TranspileOptions,
) -> Result<Option<String>, TranspileError> {
    match parameter_type {
        TypeDescriptor::Cancellation => Ok(None),
        TypeDescriptor::Stream { element, .. } => {
            Ok(Some(format!("ISubject<{}>", map_type(element, options)?)))
        }
        other => map_type(other, options).map(Some),
    }
}
