use anyhow::{Context, Result};
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};
use tree_sitter::{Node, Parser, Tree};

/// AST (Abstract Syntax Tree) parser for TypeScript and TSX source files.
///
/// The `AstParser` uses tree-sitter's TypeScript grammars to turn source text into a
/// concrete syntax tree that the classifier walks. The TSX grammar is selected for
/// `.tsx`, `.jsx` and `.js` files so JSX bodies parse; plain `.ts` files use the
/// TypeScript grammar so angle-bracket type assertions keep working.
///
/// # Example
///
/// ```no_run
/// use react_docs_from_source::parser::AstParser;
/// use std::path::Path;
///
/// let parsed = AstParser::parse_file(Path::new("src/index.ts")).unwrap();
/// println!("Root node: {}", parsed.root().kind());
/// ```
pub struct AstParser;

/// A successfully parsed source file with its syntax tree.
///
/// The tree borrows nothing; node text is sliced out of `source` on demand.
pub struct ParsedFile {
    /// Path to the source file
    pub path: PathBuf,
    /// The full source text the tree was built from
    pub source: String,
    /// The parsed syntax tree
    pub tree: Tree,
}

impl std::fmt::Debug for ParsedFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParsedFile")
            .field("path", &self.path)
            .field("bytes", &self.source.len())
            .finish()
    }
}

impl ParsedFile {
    /// Root `program` node of the tree.
    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    /// Source text covered by `node`.
    pub fn text(&self, node: Node<'_>) -> &str {
        node_text(node, &self.source)
    }
}

/// Slices the text of `node` out of `source`, or returns an empty string when
/// the node range does not fall on character boundaries.
pub fn node_text<'s>(node: Node<'_>, source: &'s str) -> &'s str {
    source.get(node.byte_range()).unwrap_or("")
}

/// Collects the named children of `node`.
pub fn named_children<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).collect()
}

/// Collects every child of `node`, including anonymous tokens such as `?`.
pub fn children<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.children(&mut cursor).collect()
}

/// Whether the file at `path` should be parsed with the TSX grammar.
fn uses_tsx_grammar(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("tsx") | Some("jsx") | Some("js") | Some("mjs") | Some("cjs")
    )
}

impl AstParser {
    /// Parses a single source file into a syntax tree.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the TypeScript/TSX source file to parse
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the grammar cannot be loaded.
    /// Syntax errors inside the file are not errors: tree-sitter recovers and the
    /// problem is logged as a diagnostic.
    pub fn parse_file(path: &Path) -> Result<ParsedFile> {
        debug!("Parsing file: {}", path.display());

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;

        Self::parse_source(path, content)
    }

    /// Parses in-memory source text as if it had been read from `path`.
    ///
    /// The path only selects the grammar and labels diagnostics.
    pub fn parse_source(path: &Path, source: String) -> Result<ParsedFile> {
        let mut parser = Parser::new();
        let language = if uses_tsx_grammar(path) {
            tree_sitter_typescript::LANGUAGE_TSX.into()
        } else {
            tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into()
        };
        parser
            .set_language(&language)
            .map_err(crate::error::Error::from)
            .with_context(|| format!("Failed to load grammar for {}", path.display()))?;

        let tree = parser
            .parse(&source, None)
            .with_context(|| format!("Failed to parse TypeScript syntax in file: {}", path.display()))?;

        let parsed = ParsedFile {
            path: path.to_path_buf(),
            source,
            tree,
        };
        Self::report_diagnostics(&parsed);

        debug!("Successfully parsed file: {}", path.display());
        Ok(parsed)
    }

    /// Parses multiple source files, continuing even if some fail.
    ///
    /// Files that fail to read are logged as warnings, but parsing continues for
    /// the remaining files.
    pub fn parse_files(paths: &[PathBuf]) -> Vec<Result<ParsedFile>> {
        debug!("Parsing {} files", paths.len());

        let results: Vec<Result<ParsedFile>> = paths
            .iter()
            .map(|path| match Self::parse_file(path) {
                Ok(parsed) => Ok(parsed),
                Err(e) => {
                    warn!("Failed to parse {}: {}", path.display(), e);
                    Err(e)
                }
            })
            .collect();

        let success_count = results.iter().filter(|r| r.is_ok()).count();
        debug!(
            "Parsing complete: {} succeeded, {} failed",
            success_count,
            results.len() - success_count
        );

        results
    }

    /// Logs the first syntax error of a tree, if any. Informational only.
    fn report_diagnostics(parsed: &ParsedFile) {
        let root = parsed.root();
        if !root.has_error() {
            return;
        }

        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            if node.is_error() || node.is_missing() {
                let position = node.start_position();
                warn!(
                    "Syntax error in {} at line {}, column {}",
                    parsed.path.display(),
                    position.row + 1,
                    position.column + 1
                );
                return;
            }
            if node.has_error() {
                let mut kids = children(node);
                kids.reverse();
                stack.extend(kids);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    /// Helper function to create a temporary file with content
    fn create_temp_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let file_path = dir.path().join(name);
        let mut file = fs::File::create(&file_path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file_path
    }

    #[test]
    fn test_parse_valid_typescript_file() {
        let temp_dir = TempDir::new().unwrap();
        let code = r#"
            export interface User {
                id: number;
                name: string;
            }

            export function getUser(id: number): User | undefined {
                return undefined;
            }
        "#;

        let file_path = create_temp_file(&temp_dir, "valid.ts", code);
        let parsed = AstParser::parse_file(&file_path).unwrap();

        assert_eq!(parsed.path, file_path);
        assert_eq!(parsed.root().kind(), "program");
        assert!(!parsed.root().has_error());
        assert!(named_children(parsed.root()).len() >= 2);
    }

    #[test]
    fn test_parse_tsx_file_with_jsx() {
        let temp_dir = TempDir::new().unwrap();
        let code = "export const Box = () => <div className=\"box\">it's here</div>;";

        let file_path = create_temp_file(&temp_dir, "Box.tsx", code);
        let parsed = AstParser::parse_file(&file_path).unwrap();

        assert!(!parsed.root().has_error());
    }

    #[test]
    fn test_parse_broken_file_still_yields_tree() {
        let temp_dir = TempDir::new().unwrap();
        let code = "export interface Broken { a: string\n function (( {";

        let file_path = create_temp_file(&temp_dir, "broken.ts", code);
        let parsed = AstParser::parse_file(&file_path).unwrap();

        assert!(parsed.root().has_error());
    }

    #[test]
    fn test_parse_nonexistent_file() {
        let result = AstParser::parse_file(Path::new("/nonexistent/file.ts"));

        assert!(result.is_err());
        let err_msg = result.unwrap_err().to_string();
        assert!(err_msg.contains("Failed to read file"));
    }

    #[test]
    fn test_parse_empty_file() {
        let parsed = AstParser::parse_source(Path::new("empty.ts"), String::new()).unwrap();
        assert!(named_children(parsed.root()).is_empty());
    }

    #[test]
    fn test_node_text_slices_source() {
        let parsed =
            AstParser::parse_source(Path::new("a.ts"), "type A = string;".to_string()).unwrap();
        let alias = named_children(parsed.root())[0];
        assert_eq!(alias.kind(), "type_alias_declaration");
        let name = alias.child_by_field_name("name").unwrap();
        assert_eq!(parsed.text(name), "A");
    }

    #[test]
    fn test_parse_files_batch() {
        let temp_dir = TempDir::new().unwrap();

        let file1 = create_temp_file(&temp_dir, "a.ts", "export const a = 1;");
        let file2 = create_temp_file(&temp_dir, "b.tsx", "export const B = () => <b />;");
        let missing = temp_dir.path().join("missing.ts");

        let results = AstParser::parse_files(&[file1.clone(), file2, missing]);

        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(results[1].is_ok());
        assert!(results[2].is_err());
        assert_eq!(results[0].as_ref().unwrap().path, file1);
    }
}
