use crate::error::{Error, Result};
use crate::parser::{node_text, AstParser, ParsedFile};
use log::{debug, warn};
use std::collections::{HashSet, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};
use tree_sitter::Node;
use walkdir::WalkDir;

/// Extensions tried, in order, when an import specifier names no existing file.
const RESOLVE_EXTENSIONS: &[&str] = &[".ts", ".tsx", ".d.ts", ".js", ".jsx"];

/// Extensions collected when scanning a whole directory.
const SOURCE_EXTENSIONS: &[&str] = &["ts", "tsx", "js", "jsx", "mts", "cts"];

/// Directories never descended into.
const SKIPPED_DIRECTORIES: &[&str] = &["node_modules", "dist", "build"];

/// Source discovery for an analysis run.
///
/// Given an entry file, the `FileScanner` parses it and follows every relative
/// module specifier (`import ... from`, `export ... from`, `import("...")`,
/// `require("...")`) breadth-first, visiting each file once. Bare specifiers
/// name packages and are skipped. Given a directory, it parses every
/// TypeScript/JavaScript file below it instead.
///
/// # Example
///
/// ```no_run
/// use react_docs_from_source::scanner::FileScanner;
/// use std::path::PathBuf;
///
/// let scanner = FileScanner::new(PathBuf::from("./src/index.ts"));
/// let result = scanner.scan().unwrap();
/// println!("Loaded {} source files", result.files.len());
/// ```
pub struct FileScanner {
    entry: PathBuf,
}

/// Result of a scan: the parsed files in discovery order (entry first) and any
/// warnings for files that could not be loaded.
pub struct ScanResult {
    pub files: Vec<ParsedFile>,
    pub warnings: Vec<String>,
}

impl FileScanner {
    pub fn new(entry: PathBuf) -> Self {
        Self { entry }
    }

    /// Loads the entry point and everything reachable from it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EntryNotFound`] when the entry does not exist,
    /// [`Error::InvalidArgument`] when it is a file of another language, and an
    /// I/O or parse error when the entry file itself cannot be loaded. Other
    /// files that fail to load become warnings.
    pub fn scan(&self) -> Result<ScanResult> {
        if !self.entry.exists() {
            return Err(Error::EntryNotFound(self.entry.clone()));
        }
        if self.entry.is_dir() {
            return Ok(self.scan_directory());
        }
        if !has_source_extension(&self.entry) {
            return Err(Error::InvalidArgument(format!(
                "{} is not a TypeScript or JavaScript file",
                self.entry.display()
            )));
        }
        self.scan_imports()
    }

    fn scan_imports(&self) -> Result<ScanResult> {
        let mut files = Vec::new();
        let mut warnings = Vec::new();

        let source = fs::read_to_string(&self.entry)?;
        let entry = AstParser::parse_source(&self.entry, source).map_err(|e| Error::ParseError {
            file: self.entry.clone(),
            message: e.to_string(),
        })?;

        let mut visited: HashSet<PathBuf> = HashSet::new();
        visited.insert(canonical(&self.entry));
        let mut queue: VecDeque<PathBuf> = VecDeque::new();
        queue.extend(self.follow(&entry, &mut visited, &mut warnings));
        files.push(entry);

        while let Some(path) = queue.pop_front() {
            match AstParser::parse_file(&path) {
                Ok(parsed) => {
                    queue.extend(self.follow(&parsed, &mut visited, &mut warnings));
                    files.push(parsed);
                }
                Err(e) => {
                    let warning = format!("Failed to load {}: {:#}", path.display(), e);
                    warn!("{}", warning);
                    warnings.push(warning);
                }
            }
        }

        debug!("Import graph from {} covers {} files", self.entry.display(), files.len());
        Ok(ScanResult { files, warnings })
    }

    /// Unvisited files imported by `file`, marked visited.
    fn follow(&self, file: &ParsedFile, visited: &mut HashSet<PathBuf>, warnings: &mut Vec<String>) -> Vec<PathBuf> {
        let base = file.path.parent().unwrap_or_else(|| Path::new(""));
        let mut next = Vec::new();

        for specifier in module_specifiers(file) {
            if !is_relative(&specifier) {
                debug!("Skipping package import {}", specifier);
                continue;
            }
            match resolve_module(base, &specifier) {
                Some(path) => {
                    if visited.insert(canonical(&path)) {
                        debug!("{} imports {}", file.path.display(), path.display());
                        next.push(path);
                    }
                }
                None => {
                    let warning = format!(
                        "Cannot resolve import \"{}\" from {}",
                        specifier,
                        file.path.display()
                    );
                    warn!("{}", warning);
                    warnings.push(warning);
                }
            }
        }
        next
    }

    fn scan_directory(&self) -> ScanResult {
        let mut paths = Vec::new();
        let mut warnings = Vec::new();

        let walker = WalkDir::new(&self.entry)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                if e.path() == self.entry {
                    return true;
                }
                let file_name = e.file_name().to_string_lossy();
                let is_hidden = file_name.starts_with('.');
                let is_skipped = e.file_type().is_dir() && SKIPPED_DIRECTORIES.contains(&file_name.as_ref());
                !is_hidden && !is_skipped
            });

        for entry in walker {
            match entry {
                Ok(entry) => {
                    let path = entry.path();
                    if path.is_file() && has_source_extension(path) {
                        paths.push(path.to_path_buf());
                    }
                }
                Err(e) => {
                    let warning = format!("Failed to access path: {}", e);
                    warn!("{}", warning);
                    warnings.push(warning);
                }
            }
        }

        let mut files = Vec::new();
        for (path, result) in paths.iter().zip(AstParser::parse_files(&paths)) {
            match result {
                Ok(parsed) => files.push(parsed),
                Err(e) => warnings.push(format!("Failed to load {}: {:#}", path.display(), e)),
            }
        }

        ScanResult { files, warnings }
    }
}

fn canonical(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

fn has_source_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| SOURCE_EXTENSIONS.contains(&e))
        .unwrap_or(false)
}

fn is_relative(specifier: &str) -> bool {
    specifier.starts_with("./") || specifier.starts_with("../") || specifier == "." || specifier == ".."
}

/// Resolves a relative specifier against the importing file's directory: the
/// literal path, then each known extension, then an `index` file inside it.
/// A `.js` specifier also matches the TypeScript file it is compiled from.
pub fn resolve_module(base: &Path, specifier: &str) -> Option<PathBuf> {
    let target = base.join(specifier);
    if target.is_file() {
        return Some(target);
    }

    let target_text = target.to_string_lossy().to_string();
    for extension in RESOLVE_EXTENSIONS {
        let candidate = PathBuf::from(format!("{}{}", target_text, extension));
        if candidate.is_file() {
            return Some(candidate);
        }
    }

    if let Some(stem) = target_text.strip_suffix(".js").or_else(|| target_text.strip_suffix(".jsx")) {
        for extension in [".ts", ".tsx"] {
            let candidate = PathBuf::from(format!("{}{}", stem, extension));
            if candidate.is_file() {
                return Some(candidate);
            }
        }
    }

    if target.is_dir() {
        for extension in RESOLVE_EXTENSIONS {
            let candidate = target.join(format!("index{}", extension));
            if candidate.is_file() {
                return Some(candidate);
            }
        }
    }
    None
}

fn string_value(node: Node<'_>, source: &str) -> Option<String> {
    if node.kind() != "string" {
        return None;
    }
    let text = node_text(node, source);
    Some(text.trim_matches(|c| c == '"' || c == '\'' || c == '`').to_string())
}

/// Every module specifier in `file`, in source order.
pub fn module_specifiers(file: &ParsedFile) -> Vec<String> {
    let source = file.source.as_str();
    let mut specifiers = Vec::new();
    let mut stack = vec![file.root()];

    while let Some(node) = stack.pop() {
        match node.kind() {
            "import_statement" | "export_statement" => {
                if let Some(value) = node
                    .child_by_field_name("source")
                    .and_then(|s| string_value(s, source))
                {
                    specifiers.push(value);
                }
            }
            "call_expression" => {
                let is_loader = node
                    .child_by_field_name("function")
                    .map(|f| f.kind() == "import" || node_text(f, source) == "require")
                    .unwrap_or(false);
                if is_loader {
                    let first = node
                        .child_by_field_name("arguments")
                        .and_then(|a| a.named_child(0))
                        .and_then(|a| string_value(a, source));
                    specifiers.extend(first);
                }
            }
            _ => {}
        }

        let mut cursor = node.walk();
        let mut kids: Vec<Node<'_>> = node.named_children(&mut cursor).collect();
        kids.reverse();
        stack.extend(kids);
    }

    specifiers
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn names(result: &ScanResult) -> Vec<String> {
        result
            .files
            .iter()
            .map(|f| f.path.file_name().unwrap().to_string_lossy().to_string())
            .collect()
    }

    #[test]
    fn test_follows_relative_imports_breadth_first() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir(root.join("button")).unwrap();

        fs::write(
            root.join("index.ts"),
            "export * from \"./button\";\nexport { Card } from './Card';\nimport React from \"react\";\n",
        )
        .unwrap();
        fs::write(root.join("button/index.ts"), "export { Button } from \"./Button.js\";").unwrap();
        fs::write(root.join("button/Button.tsx"), "import { Card } from \"../Card\";\nexport const Button = () => null;").unwrap();
        fs::write(root.join("Card.tsx"), "export const Card = () => null;").unwrap();
        fs::write(root.join("Unused.tsx"), "export const Unused = 1;").unwrap();

        let result = FileScanner::new(root.join("index.ts")).scan().unwrap();
        assert_eq!(names(&result), vec!["index.ts", "index.ts", "Card.tsx", "Button.tsx"]);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_unresolvable_import_is_a_warning() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::write(root.join("index.ts"), "import { x } from \"./missing\";").unwrap();

        let result = FileScanner::new(root.join("index.ts")).scan().unwrap();
        assert_eq!(result.files.len(), 1);
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("./missing"));
    }

    #[test]
    fn test_missing_entry_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let result = FileScanner::new(temp_dir.path().join("nope.ts")).scan();
        assert!(matches!(result, Err(Error::EntryNotFound(_))));

        fs::write(temp_dir.path().join("notes.md"), "# notes").unwrap();
        let result = FileScanner::new(temp_dir.path().join("notes.md")).scan();
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_directory_scan_skips_vendored_and_hidden() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("node_modules/react")).unwrap();
        fs::create_dir(root.join(".cache")).unwrap();
        fs::create_dir(root.join("dist")).unwrap();
        fs::create_dir(root.join("src")).unwrap();

        fs::write(root.join("node_modules/react/index.js"), "module.exports = {};").unwrap();
        fs::write(root.join(".cache/a.ts"), "export {};").unwrap();
        fs::write(root.join("dist/out.js"), "export {};").unwrap();
        fs::write(root.join("src/App.tsx"), "export const App = () => null;").unwrap();
        fs::write(root.join("src/util.ts"), "export const one = 1;").unwrap();
        fs::write(root.join("src/readme.md"), "# App").unwrap();

        let result = FileScanner::new(root.to_path_buf()).scan().unwrap();
        assert_eq!(names(&result), vec!["App.tsx", "util.ts"]);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_module_specifiers() {
        let file = AstParser::parse_source(
            Path::new("x.ts"),
            r#"
import a from "./a";
export { b } from './b';
const c = await import("./c");
const d = require("./d");
import "./styles.css";
"#
            .to_string(),
        )
        .unwrap();
        assert_eq!(module_specifiers(&file), vec!["./a", "./b", "./c", "./d", "./styles.css"]);
    }
}
