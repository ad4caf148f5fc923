#![forbid(unsafe_code)]
#![deny(unused_must_use, missing_debug_implementations)]
#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro
)]

//! Transpiles strongly-typed RPC hub interface definitions into TypeScript
//! type declarations, cross-linked to data-type definitions produced by an
//! earlier generation pass sharing the same output root.
//!
//! The pipeline, leaf-first:
//! - [`descriptor`]: the normalized type algebra and interface model
//! - [`naming`]: identifier casing transforms
//! - [`mapper`]: descriptor to TypeScript type expression mapping, with
//!   direction-sensitive rewriting of streaming shapes
//! - [`links`]: resolution of imports against upstream generator output
//! - [`docs`]: doc-comment projection
//! - [`emitter`]: per-module declaration emission and output writing
//!
//! [`generate`] is the composed entry point; [`transpile`] renders without
//! touching the filesystem.

pub mod cancel;
pub mod config;
pub mod descriptor;
pub mod docs;
pub mod emitter;
pub mod error;
pub mod links;
pub mod mapper;
pub mod naming;

pub use cancel::{CancelHandle, CancelToken, cancel_pair};
pub use config::TranspileOptions;
pub use descriptor::{
    GeneratedModule, InterfaceDeclaration, MethodSignature, NamedType, StreamKind, TypeDescriptor,
};
pub use emitter::{generate, transpile, write_modules};
pub use error::TranspileError;
pub use links::SourceLinkResolver;
pub use naming::NamingStyle;
