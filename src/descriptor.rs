//! Descriptor model for RPC hub interfaces.
//!
//! This module defines the normalized representation of everything the
//! transpiler consumes and produces:
//! - `TypeDescriptor`: the type a method parameter or return value can have
//! - `MethodSignature` / `InterfaceDeclaration`: the interface surface
//! - `GeneratedModule`: one rendered TypeScript output module

use std::path::PathBuf;

/// How a streaming sequence is surfaced by the source interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    /// An asynchronously enumerated sequence.
    AsyncSequence,
    /// The read side of a channel.
    ChannelReader,
}

/// Normalized representation of a parameter or return type.
///
/// `Stream` and `Task` are structural wrappers that are only meaningful at
/// the top level of a signature type; the discovery pass never nests them
/// inside a `Named` type's arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDescriptor {
    /// Built-in scalar type, keyed by its source-language name.
    Primitive(String),
    /// Element type repeated zero or more times: `T[]`.
    Array(Box<TypeDescriptor>),
    /// User-defined named type, possibly generic.
    Named(NamedType),
    /// A sequence produced over time rather than a single value.
    Stream {
        kind: StreamKind,
        element: Box<TypeDescriptor>,
    },
    /// Asynchronous wrapper around a value. A source-level `Task` with no
    /// type argument is normalized to `Task(Primitive("void"))`.
    Task(Box<TypeDescriptor>),
    /// Cooperative-cancellation token parameter.
    Cancellation,
}

/// A user-defined named type reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedType {
    pub name: String,
    /// Originating module (namespace) of the type's definition.
    pub module: String,
    /// Ordered generic arguments, empty for non-generic types.
    pub type_args: Vec<TypeDescriptor>,
    /// Whether the type's definition is produced by the earlier data-type
    /// generation pass (and may therefore need a source-linked import).
    pub external: bool,
}

impl TypeDescriptor {
    pub fn primitive(name: impl Into<String>) -> Self {
        Self::Primitive(name.into())
    }

    pub fn array(element: Self) -> Self {
        Self::Array(Box::new(element))
    }

    pub fn stream(kind: StreamKind, element: Self) -> Self {
        Self::Stream {
            kind,
            element: Box::new(element),
        }
    }

    pub fn task(inner: Self) -> Self {
        Self::Task(Box::new(inner))
    }

    /// A source-level `Task` with no type argument.
    pub fn task_void() -> Self {
        Self::task(Self::primitive("void"))
    }

    /// Render the descriptor in the notation of the originating interface
    /// language. Used for synthesized documentation fallbacks.
    pub fn source_name(&self) -> String {
        match self {
            Self::Primitive(name) => name.clone(),
            Self::Array(element) => format!("{}[]", element.source_name()),
            Self::Named(named) => named.source_name(),
            Self::Stream { kind, element } => {
                let wrapper = match kind {
                    StreamKind::AsyncSequence => "IAsyncEnumerable",
                    StreamKind::ChannelReader => "ChannelReader",
                };
                format!("{}<{}>", wrapper, element.source_name())
            }
            Self::Task(inner) => {
                if matches!(inner.as_ref(), Self::Primitive(name) if name == "void") {
                    "Task".to_string()
                } else {
                    format!("Task<{}>", inner.source_name())
                }
            }
            Self::Cancellation => "CancellationToken".to_string(),
        }
    }
}

impl NamedType {
    fn source_name(&self) -> String {
        let qualified = if self.module.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.module, self.name)
        };
        if self.type_args.is_empty() {
            qualified
        } else {
            let args: Vec<_> = self.type_args.iter().map(TypeDescriptor::source_name).collect();
            format!("{}<{}>", qualified, args.join(", "))
        }
    }
}

/// A single method of an interface. Parameter names are unique within a
/// signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSignature {
    pub name: String,
    /// Ordered `(parameter name, type)` pairs.
    pub parameters: Vec<(String, TypeDescriptor)>,
    pub return_type: TypeDescriptor,
    /// Raw structured documentation blob, if the source carried one.
    pub docs: Option<String>,
}

/// An interface discovered in the host program, in discovery order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceDeclaration {
    pub name: String,
    /// Originating module (namespace) identifier; interfaces sharing it are
    /// emitted into the same output module.
    pub module: String,
    pub methods: Vec<MethodSignature>,
    pub docs: Option<String>,
}

/// One rendered output module. Exactly one exists per distinct originating
/// module identifier in a run; declaration order equals discovery order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedModule {
    /// Output file path, derived 1:1 from the originating module identifier.
    pub path: PathBuf,
    /// Cross-module import statements, one per linked source directory.
    pub imports: Vec<String>,
    /// Rendered interface declarations.
    pub declarations: Vec<String>,
}
