//! Resolution of links to type definitions produced by an earlier
//! generation pass.
//!
//! The upstream generator writes its output under the shared output root
//! using one of two layouts, detected per directory without being told which
//! is in use:
//! - index convention: a barrel file re-exports every type name in one
//!   aggregated statement; only that file is parsed
//! - loose convention: many per-type files, each scanned for top-level
//!   exported declarations
//!
//! The two conventions are mutually exclusive per directory; a present
//! barrel file always wins. Results accumulate into one flat map keyed by
//! directory, built fully before any lookup is served and read-only for the
//! rest of the run.

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

use futures_util::stream::{self, StreamExt};
use tracing::{debug, warn};

use crate::cancel::CancelToken;
use crate::config::TranspileOptions;
use crate::error::TranspileError;
use crate::naming::NamingStyle;

/// Canonical barrel file name, matched case-insensitively.
const BARREL_FILE_NAME: &str = "index.ts";

/// Upper bound on concurrently open files during a loose-convention scan.
const SCAN_CONCURRENCY: usize = 8;

/// Directory identifier to exported-type-name mapping, in scan order.
#[derive(Debug, Default)]
pub struct SourceLinkMap {
    directories: Vec<(PathBuf, HashSet<String>)>,
}

impl SourceLinkMap {
    fn insert(&mut self, directory: PathBuf, exports: HashSet<String>) {
        if exports.is_empty() {
            return;
        }
        match self.directories.iter_mut().find(|(dir, _)| dir == &directory) {
            Some((_, existing)) => existing.extend(exports),
            None => self.directories.push((directory, exports)),
        }
    }

    /// First directory (in scan order) exporting `name`.
    fn find(&self, name: &str) -> Option<&Path> {
        self.directories
            .iter()
            .find(|(_, exports)| exports.contains(name))
            .map(|(dir, _)| dir.as_path())
    }

    pub fn len(&self) -> usize {
        self.directories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.directories.is_empty()
    }
}

/// Run-scoped resolver over upstream generator output.
#[derive(Debug)]
pub struct SourceLinkResolver {
    map: SourceLinkMap,
    consumer_dir: PathBuf,
    type_style: NamingStyle,
}

impl SourceLinkResolver {
    /// Scan the output root and its immediate subdirectories (excluding this
    /// transpiler's own output directory) and build the link map.
    ///
    /// A missing or unreadable root is not an error: it yields an empty map
    /// and every lookup reports "no link available".
    pub async fn build(
        options: &TranspileOptions,
        cancel: &CancelToken,
    ) -> Result<Self, TranspileError> {
        let consumer_dir = options.client_dir();
        let mut map = SourceLinkMap::default();
        for directory in candidate_directories(&options.output_root, &consumer_dir).await {
            if cancel.is_cancelled() {
                return Err(TranspileError::Cancelled);
            }
            let exports = scan_directory(&directory, cancel).await?;
            map.insert(directory, exports);
        }
        debug!(directories = map.len(), "source link map built");
        Ok(Self {
            map,
            consumer_dir,
            type_style: options.type_style,
        })
    }

    /// Whether any scanned directory exports `type_name` (after naming-style
    /// transformation).
    pub fn has_link(&self, type_name: &str) -> bool {
        self.map.find(&self.type_style.apply(type_name)).is_some()
    }

    /// Relative import path from the consumer output directory to the first
    /// directory exporting `type_name`, or `None` when no directory does.
    ///
    /// The generated counterpart of a type may differ in casing from the
    /// original name, so the lookup transforms the name through the
    /// configured naming style before the exact-string match.
    pub fn get_link(&self, type_name: &str) -> Option<String> {
        let transformed = self.type_style.apply(type_name);
        let target = self.map.find(&transformed)?;
        Some(relative_dir(&self.consumer_dir, target))
    }
}

async fn candidate_directories(root: &Path, consumer_dir: &Path) -> Vec<PathBuf> {
    let mut entries = match tokio::fs::read_dir(root).await {
        Ok(entries) => entries,
        Err(err) => {
            warn!(
                root = %root.display(),
                error = %err,
                "link source root is unreadable, proceeding without source links"
            );
            return Vec::new();
        }
    };

    let mut subdirs = Vec::new();
    loop {
        match entries.next_entry().await {
            Ok(Some(entry)) => {
                let path = entry.path();
                let is_dir = entry.file_type().await.map(|ft| ft.is_dir()).unwrap_or(false);
                if is_dir && path != consumer_dir {
                    subdirs.push(path);
                }
            }
            Ok(None) => break,
            Err(err) => {
                warn!(root = %root.display(), error = %err, "directory listing failed mid-scan");
                break;
            }
        }
    }
    subdirs.sort();

    let mut directories = vec![root.to_path_buf()];
    directories.extend(subdirs);
    directories
}

async fn scan_directory(
    directory: &Path,
    cancel: &CancelToken,
) -> Result<HashSet<String>, TranspileError> {
    let mut entries = match tokio::fs::read_dir(directory).await {
        Ok(entries) => entries,
        Err(err) => {
            warn!(
                directory = %directory.display(),
                error = %err,
                "skipping unreadable link source directory"
            );
            return Ok(HashSet::new());
        }
    };

    let mut files = Vec::new();
    loop {
        match entries.next_entry().await {
            Ok(Some(entry)) => {
                let is_file = entry.file_type().await.map(|ft| ft.is_file()).unwrap_or(false);
                if is_file {
                    files.push(entry.path());
                }
            }
            Ok(None) => break,
            Err(err) => {
                warn!(directory = %directory.display(), error = %err, "file listing failed mid-scan");
                break;
            }
        }
    }
    files.sort();

    let names: Vec<String> = files
        .iter()
        .map(|path| {
            path.file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default()
        })
        .collect();

    match detect_convention(&names) {
        Convention::Barrel(index) => {
            if cancel.is_cancelled() {
                return Err(TranspileError::Cancelled);
            }
            match tokio::fs::read_to_string(&files[index]).await {
                Ok(contents) => Ok(barrel_exports(&contents)),
                Err(err) => {
                    warn!(
                        file = %files[index].display(),
                        error = %err,
                        "barrel file is unreadable, treating directory as empty"
                    );
                    Ok(HashSet::new())
                }
            }
        }
        Convention::Loose => {
            let declaration_files: Vec<PathBuf> = files
                .into_iter()
                .filter(|path| {
                    path.extension()
                        .is_some_and(|ext| ext.eq_ignore_ascii_case("ts"))
                })
                .collect();

            let mut reads = stream::iter(declaration_files)
                .map(|path| {
                    let cancel = cancel.clone();
                    async move {
                        if cancel.is_cancelled() {
                            return Err(TranspileError::Cancelled);
                        }
                        match tokio::fs::read_to_string(&path).await {
                            Ok(contents) => Ok(loose_exports(&contents)),
                            Err(err) => {
                                warn!(
                                    file = %path.display(),
                                    error = %err,
                                    "skipping unreadable file in link source directory"
                                );
                                Ok(HashSet::new())
                            }
                        }
                    }
                })
                .buffer_unordered(SCAN_CONCURRENCY);

            let mut exports = HashSet::new();
            while let Some(result) = reads.next().await {
                exports.extend(result?);
            }
            Ok(exports)
        }
    }
}

/// Which file-layout convention a directory follows. Pure over the injected
/// file list so it can be tested without touching the filesystem.
#[derive(Debug, PartialEq, Eq)]
enum Convention {
    /// Barrel file present at the given index; parse only that file.
    Barrel(usize),
    /// No barrel file; scan every declaration file individually.
    Loose,
}

fn detect_convention(file_names: &[String]) -> Convention {
    match file_names
        .iter()
        .position(|name| name.eq_ignore_ascii_case(BARREL_FILE_NAME))
    {
        Some(index) => Convention::Barrel(index),
        None => Convention::Loose,
    }
}

/// Extract every re-exported identifier from a barrel file's aggregated
/// `export { ... }` statement. An `as` alias exposes the alias, not the
/// internal name.
fn barrel_exports(contents: &str) -> HashSet<String> {
    let Some(export) = contents.find("export") else {
        return HashSet::new();
    };
    let rest = &contents[export..];
    let Some(open) = rest.find('{') else {
        return HashSet::new();
    };
    let Some(close) = rest[open..].find('}') else {
        return HashSet::new();
    };
    rest[open + 1..open + close]
        .split(',')
        .filter_map(|item| item.split_whitespace().last())
        .map(str::to_string)
        .collect()
}

/// Extract every top-level exported named declaration from a loose file.
fn loose_exports(contents: &str) -> HashSet<String> {
    contents
        .lines()
        .filter_map(exported_declaration)
        .map(str::to_string)
        .collect()
}

fn exported_declaration(line: &str) -> Option<&str> {
    let rest = line.trim_start().strip_prefix("export ")?;
    let rest = rest.trim_start();
    let rest = ["interface ", "enum ", "type ", "const "]
        .iter()
        .find_map(|keyword| rest.strip_prefix(keyword))?;
    let name = rest
        .trim_start()
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '$'))
        .next()?;
    (!name.is_empty()).then_some(name)
}

/// Path of `target` relative to the directory containing the `from` file.
///
/// Longest common leading segment prefix, compared case-insensitively, then
/// one `..` per remaining `from` directory segment followed by the remaining
/// `target` segments. With no common prefix at all (different filesystem
/// roots), the absolute target path is returned unchanged as a last resort.
/// Separators in the result are normalized to `/`.
pub fn relative_path(from: &Path, target: &Path) -> String {
    let mut base = path_segments(from);
    base.pop();
    relative_segments(&base, target)
}

fn relative_dir(from_dir: &Path, target: &Path) -> String {
    relative_segments(&path_segments(from_dir), target)
}

fn path_segments(path: &Path) -> Vec<String> {
    path.components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect()
}

fn relative_segments(base: &[String], target: &Path) -> String {
    let target_segments = path_segments(target);
    let common = base
        .iter()
        .zip(&target_segments)
        .take_while(|(a, b)| a.eq_ignore_ascii_case(b))
        .count();
    if common == 0 {
        return target.to_string_lossy().replace('\\', "/");
    }

    let mut parts: Vec<String> = Vec::new();
    for _ in common..base.len() {
        parts.push("..".to_string());
    }
    parts.extend(target_segments[common..].iter().cloned());
    if parts.is_empty() {
        ".".to_string()
    } else {
        parts.join("/")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::cancel::cancel_pair;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn barrel_detection_is_case_insensitive() {
        assert_eq!(
            detect_convention(&names(&["A.ts", "Index.TS", "B.ts"])),
            Convention::Barrel(1)
        );
        assert_eq!(detect_convention(&names(&["A.ts", "B.ts"])), Convention::Loose);
        assert_eq!(detect_convention(&[]), Convention::Loose);
    }

    #[test]
    fn barrel_extraction_handles_multiline_and_aliases() {
        let contents = "export {\n  Message,\n  UserId as UserIdentifier,\n};\n";
        let exports = barrel_exports(contents);
        assert!(exports.contains("Message"));
        assert!(exports.contains("UserIdentifier"));
        assert!(!exports.contains("UserId"));
        assert_eq!(exports.len(), 2);
    }

    #[test]
    fn barrel_without_export_statement_is_empty() {
        assert!(barrel_exports("// nothing here\n").is_empty());
    }

    #[test]
    fn loose_extraction_matches_top_level_declarations() {
        let contents = concat!(
            "export interface Message {\n",
            "  text: string;\n",
            "}\n",
            "export enum Color { Red, Green }\n",
            "export type UserId = string;\n",
            "export const Status = {\n",
            "  Active: \"active\",\n",
            "} as const;\n",
            "interface Hidden {}\n",
        );
        let exports = loose_exports(contents);
        let expected: HashSet<String> = ["Message", "Color", "UserId", "Status"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(exports, expected);
    }

    #[test]
    fn relative_path_with_shared_root() {
        assert_eq!(
            relative_path(Path::new("/out/pkg/Foo.ts"), Path::new("/out/dto")),
            "../dto"
        );
    }

    #[test]
    fn relative_path_prefix_match_is_case_insensitive() {
        assert_eq!(
            relative_path(Path::new("/Out/pkg/Foo.ts"), Path::new("/out/dto")),
            "../dto"
        );
    }

    #[test]
    fn relative_path_without_common_prefix_is_absolute_target() {
        assert_eq!(
            relative_path(Path::new("/out/pkg/Foo.ts"), Path::new("/elsewhere/dto")),
            "/elsewhere/dto"
        );
    }

    #[test]
    fn relative_path_to_containing_directory() {
        assert_eq!(
            relative_path(Path::new("/out/hublink/Foo.ts"), Path::new("/out")),
            ".."
        );
        assert_eq!(
            relative_path(Path::new("/out/Foo.ts"), Path::new("/out")),
            "."
        );
    }

    async fn build_resolver(options: &TranspileOptions) -> SourceLinkResolver {
        SourceLinkResolver::build(options, &CancelToken::never())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn barrel_convention_overrides_loose_files() {
        let tmp = tempfile::tempdir().unwrap();
        let dto = tmp.path().join("dto");
        std::fs::create_dir_all(&dto).unwrap();
        std::fs::write(dto.join("index.ts"), "export { A, B };\n").unwrap();
        std::fs::write(dto.join("a.ts"), "export interface A {}\n").unwrap();
        std::fs::write(dto.join("b.ts"), "export interface B {}\n").unwrap();
        std::fs::write(dto.join("c.ts"), "export interface C {}\n").unwrap();

        let options = TranspileOptions {
            output_root: tmp.path().to_path_buf(),
            ..Default::default()
        };
        let resolver = build_resolver(&options).await;
        assert!(resolver.has_link("A"));
        assert!(resolver.has_link("B"));
        assert!(!resolver.has_link("C"));
    }

    #[tokio::test]
    async fn loose_convention_unions_across_files() {
        let tmp = tempfile::tempdir().unwrap();
        let dto = tmp.path().join("dto");
        std::fs::create_dir_all(&dto).unwrap();
        std::fs::write(dto.join("message.ts"), "export interface Message {}\n").unwrap();
        std::fs::write(dto.join("color.ts"), "export enum Color {}\n").unwrap();

        let options = TranspileOptions {
            output_root: tmp.path().to_path_buf(),
            ..Default::default()
        };
        let resolver = build_resolver(&options).await;
        assert_eq!(resolver.get_link("Message"), Some("../dto".to_string()));
        assert_eq!(resolver.get_link("Color"), Some("../dto".to_string()));
    }

    #[tokio::test]
    async fn missing_root_yields_empty_map() {
        let tmp = tempfile::tempdir().unwrap();
        let options = TranspileOptions {
            output_root: tmp.path().join("does-not-exist"),
            ..Default::default()
        };
        let resolver = build_resolver(&options).await;
        assert!(resolver.map.is_empty());
        assert_eq!(resolver.get_link("Message"), None);
        assert!(!resolver.has_link("Message"));
    }

    #[tokio::test]
    async fn unknown_name_is_no_link_not_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("a.ts"), "export interface A {}\n").unwrap();
        let options = TranspileOptions {
            output_root: tmp.path().to_path_buf(),
            ..Default::default()
        };
        let resolver = build_resolver(&options).await;
        assert_eq!(resolver.get_link("Nope"), None);
    }

    #[tokio::test]
    async fn lookup_transforms_through_naming_style() {
        let tmp = tempfile::tempdir().unwrap();
        let dto = tmp.path().join("dto");
        std::fs::create_dir_all(&dto).unwrap();
        std::fs::write(dto.join("message.ts"), "export interface message {}\n").unwrap();

        let options = TranspileOptions {
            output_root: tmp.path().to_path_buf(),
            type_style: NamingStyle::CamelCase,
            ..Default::default()
        };
        let resolver = build_resolver(&options).await;
        assert!(resolver.has_link("Message"));
    }

    #[tokio::test]
    async fn own_output_directory_is_not_scanned() {
        let tmp = tempfile::tempdir().unwrap();
        let own = tmp.path().join("hublink");
        std::fs::create_dir_all(&own).unwrap();
        std::fs::write(own.join("N.ts"), "export type Own = {};\n").unwrap();

        let options = TranspileOptions {
            output_root: tmp.path().to_path_buf(),
            ..Default::default()
        };
        let resolver = build_resolver(&options).await;
        assert!(!resolver.has_link("Own"));
    }

    #[tokio::test]
    async fn cancelled_scan_returns_cancelled() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("a.ts"), "export interface A {}\n").unwrap();
        let options = TranspileOptions {
            output_root: tmp.path().to_path_buf(),
            ..Default::default()
        };
        let (handle, token) = cancel_pair();
        handle.cancel();
        let result = SourceLinkResolver::build(&options, &token).await;
        assert!(matches!(result, Err(TranspileError::Cancelled)));
    }
}
