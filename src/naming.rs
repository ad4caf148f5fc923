//! Identifier casing transforms.
//!
//! One `NamingStyle` value serves two jobs: rendering identifiers in emitted
//! declarations, and predicting the generated spelling of a type name when
//! matching it against upstream output during source-link resolution.

use serde::{Deserialize, Serialize};

/// A deterministic text-casing transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamingStyle {
    /// Identifiers pass through unchanged.
    #[default]
    None,
    /// First letter lower-cased: `SendAsync` becomes `sendAsync`.
    CamelCase,
    /// First letter upper-cased: `sendAsync` becomes `SendAsync`.
    PascalCase,
}

impl NamingStyle {
    pub fn apply(&self, ident: &str) -> String {
        match self {
            Self::None => ident.to_string(),
            Self::CamelCase => lower_first(ident),
            Self::PascalCase => capitalize_first(ident),
        }
    }
}

/// Capitalize the first letter of a string.
pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}

/// Lower-case the first letter of a string.
pub fn lower_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_lowercase().chain(chars).collect(),
    }
}
