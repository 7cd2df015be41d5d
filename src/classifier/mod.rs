//! Declaration classification.
//!
//! Walks every node of every parsed file and turns the declarations it finds
//! into normalized Document Model records. The per-category logic lives in
//! the sub-modules:
//!
//! - [`declarations`] - interfaces, type aliases (object, union and function
//!   shapes) and enums
//! - [`components`] - class components, annotated component constants and
//!   wrapper chains such as `memo(forwardRef(...))`
//! - [`functions`] - hooks and plain function signatures
//!
//! Every node is visited whether or not it is exported in source; whether a
//! record ends up public is decided later from its doc comment.
//!
//! # Example
//!
//! ```no_run
//! use react_docs_from_source::classifier::classify_files;
//! use react_docs_from_source::parser::AstParser;
//! use std::path::Path;
//!
//! let parsed = AstParser::parse_file(Path::new("src/Button.tsx")).unwrap();
//! let model = classify_files(&[parsed]);
//! println!("Found {} components", model.components().len());
//! ```

pub mod components;
pub mod declarations;
pub mod functions;

use crate::model::{
    Component, DocModel, DocModelBuilder, EnumDefinition, FunctionSignature, Hook, TypeAlias,
    TypeDefinition, UnionDefinition,
};
use crate::oracle::{SyntacticOracle, TypeOracle};
use crate::parser::{node_text, ParsedFile};
use anyhow::{bail, Result};
use log::{debug, info, warn};
use tree_sitter::Node;

/// A fully built record produced by classifying one node.
#[derive(Debug, Clone, PartialEq)]
pub enum Classified {
    Type(TypeDefinition),
    Union(UnionDefinition),
    Enum(EnumDefinition),
    Alias(TypeAlias),
    Function(FunctionSignature),
    Hook(Hook),
    Component(Component),
}

/// What a classification step can see: the file being walked, the oracle and
/// the records registered so far.
pub struct ClassifyContext<'a> {
    pub file: &'a ParsedFile,
    pub oracle: &'a dyn TypeOracle,
    pub model: &'a DocModel,
}

impl<'a> ClassifyContext<'a> {
    pub fn text(&self, node: Node<'_>) -> &'a str {
        node_text(node, &self.file.source)
    }

    pub fn source(&self) -> &'a str {
        &self.file.source
    }

    /// Text of the `name` field of `node`.
    pub fn name_of(&self, node: Node<'_>) -> Option<String> {
        node.child_by_field_name("name")
            .map(|n| self.text(n).to_string())
    }

    /// Nearest preceding `/** */` comment of the declaration or of the
    /// statements wrapping it (`export`, `const`, `declare`). Line comments
    /// between the doc comment and the declaration are skipped.
    pub fn leading_comment(&self, node: Node<'_>) -> String {
        let mut levels = vec![node];
        let mut current = node;
        while let Some(parent) = current.parent() {
            if !matches!(
                parent.kind(),
                "export_statement" | "lexical_declaration" | "variable_declaration" | "ambient_declaration"
            ) {
                break;
            }
            levels.push(parent);
            current = parent;
        }

        for level in levels.iter().rev() {
            let mut sibling = level.prev_sibling();
            while let Some(candidate) = sibling {
                if candidate.kind() != "comment" {
                    break;
                }
                let text = self.text(candidate);
                if text.starts_with("/**") {
                    return text.to_string();
                }
                sibling = candidate.prev_sibling();
            }
        }
        String::new()
    }
}

/// Classifies declarations into a [`DocModelBuilder`], one file at a time.
pub struct DeclarationClassifier<'o> {
    builder: DocModelBuilder,
    oracle: &'o dyn TypeOracle,
}

impl<'o> DeclarationClassifier<'o> {
    pub fn new(oracle: &'o dyn TypeOracle) -> Self {
        Self {
            builder: DocModelBuilder::new(),
            oracle,
        }
    }

    /// Classifies every declaration in `file`.
    ///
    /// A node that fails to classify is logged and skipped; the walk goes on.
    ///
    /// # Returns
    ///
    /// The number of records registered from this file.
    ///
    /// # Errors
    ///
    /// Returns an error when the file does not hold a program tree.
    pub fn classify_file(&mut self, file: &ParsedFile) -> Result<usize> {
        let root = file.root();
        if root.kind() != "program" {
            bail!("{} is not a program (root node is {})", file.path.display(), root.kind());
        }
        debug!("Classifying {}", file.path.display());

        let mut registered = 0;
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            match self.classify_node(file, node) {
                Ok(records) => {
                    registered += records.len();
                    for record in records {
                        self.register(record);
                    }
                }
                Err(e) => {
                    let position = node.start_position();
                    debug!(
                        "Skipping {} at {}:{}: {}",
                        node.kind(),
                        file.path.display(),
                        position.row + 1,
                        e
                    );
                }
            }

            let mut cursor = node.walk();
            let mut kids: Vec<Node<'_>> = node.named_children(&mut cursor).collect();
            kids.reverse();
            stack.extend(kids);
        }

        Ok(registered)
    }

    fn classify_node(&self, file: &ParsedFile, node: Node<'_>) -> Result<Vec<Classified>> {
        let ctx = ClassifyContext {
            file,
            oracle: self.oracle,
            model: self.builder.current(),
        };

        match node.kind() {
            "interface_declaration" => declarations::classify_interface(&ctx, node),
            "type_alias_declaration" => declarations::classify_type_alias(&ctx, node),
            "enum_declaration" => declarations::classify_enum(&ctx, node),
            "class_declaration" | "abstract_class_declaration" => {
                components::classify_class_declaration(&ctx, node)
            }
            "function_declaration" | "generator_function_declaration" => {
                functions::classify_function_declaration(&ctx, node)
            }
            "variable_declarator" => classify_variable(&ctx, node),
            _ => Ok(Vec::new()),
        }
    }

    fn register(&mut self, record: Classified) {
        match record {
            Classified::Type(r) => self.builder.register_type(r),
            Classified::Union(r) => self.builder.register_union(r),
            Classified::Enum(r) => self.builder.register_enum(r),
            Classified::Alias(r) => self.builder.register_alias(r),
            Classified::Function(r) => self.builder.register_function(r),
            Classified::Hook(r) => self.builder.register_hook(r),
            Classified::Component(r) => self.builder.register_component(r),
        }
    }

    /// Freezes everything registered so far.
    pub fn finish(self) -> DocModel {
        self.builder.build()
    }
}

/// The variable-declaration path: component patterns first, then hooks, then
/// plain function expressions.
fn classify_variable(ctx: &ClassifyContext<'_>, declarator: Node<'_>) -> Result<Vec<Classified>> {
    let Some(name_node) = declarator.child_by_field_name("name") else {
        return Ok(Vec::new());
    };
    if name_node.kind() != "identifier" {
        return Ok(Vec::new());
    }

    if let Some(component) = components::classify_component_variable(ctx, declarator)? {
        return Ok(vec![Classified::Component(component)]);
    }
    functions::classify_function_variable(ctx, declarator)
}

/// Classifies every file against one shared oracle and returns the frozen
/// model.
///
/// Files are classified in reverse discovery order so that imported modules
/// are registered before the files that import them.
pub fn classify_files(files: &[ParsedFile]) -> DocModel {
    let oracle = SyntacticOracle::new(files);
    let mut classifier = DeclarationClassifier::new(&oracle);

    for file in files.iter().rev() {
        match classifier.classify_file(file) {
            Ok(count) => debug!("Registered {} records from {}", count, file.path.display()),
            Err(e) => warn!("Failed to classify {}: {}", file.path.display(), e),
        }
    }

    let model = classifier.finish();
    info!(
        "Classified {} declarations ({} components, {} hooks, {} functions)",
        model.len(),
        model.components().len(),
        model.hooks().len(),
        model.functions().len()
    );
    model
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::model::DocModel;
    use crate::parser::{AstParser, ParsedFile};
    use std::path::Path;

    pub fn parse(name: &str, code: &str) -> ParsedFile {
        AstParser::parse_source(Path::new(name), code.to_string()).unwrap()
    }

    /// Classifies one in-memory TSX source.
    pub fn classify(code: &str) -> DocModel {
        super::classify_files(&[parse("test.tsx", code)])
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::{classify, parse};
    use super::*;

    #[test]
    fn test_leading_comment_through_export_and_line_comments() {
        let model = classify(
            r#"
/** The id type. @export */
// eslint-disable-next-line
export type Id = string;

/** Not attached */
const spacer = 1;
type Bare = number;
"#,
        );
        assert_eq!(model.aliases()["Id"].comment, "/** The id type. @export */");
        assert_eq!(model.aliases()["Bare"].comment, "");
    }

    #[test]
    fn test_traversal_ignores_export_keywords() {
        let model = classify(
            r#"
interface Hidden { a: string }
export interface Shown { b: number }
function outer() {
  type Inner = boolean;
}
"#,
        );
        assert!(model.types().contains_key("Hidden"));
        assert!(model.types().contains_key("Shown"));
        assert!(model.aliases().contains_key("Inner"));
        assert!(model.functions().contains_key("outer"));
    }

    #[test]
    fn test_broken_syntax_does_not_stop_classification() {
        let model = classify(
            r#"
export interface Good { a: string }
export type AlsoGood = "x" | "y";
const broken = (;
"#,
        );
        assert!(model.types().contains_key("Good"));
        assert!(model.unions().contains_key("AlsoGood"));
    }

    #[test]
    fn test_local_binding_does_not_replace_exported_function() {
        let model = classify(
            r#"
/** Formats a count. @export */
export function format(count: number): string { return String(count); }

export const Badge = ({ count }: { count: number }) => {
  const format = (value: number) => value.toFixed(1);
  return <span>{format(count)}</span>;
};
"#,
        );
        let format = &model.functions()["format"];
        assert_eq!(format.origin, crate::model::FunctionOrigin::Declaration);
        assert!(format.comment.contains("@export"));
        assert_eq!(format.parameters[0].name, "count");
    }

    #[test]
    fn test_imported_files_are_registered_first() {
        let button = parse(
            "Button.tsx",
            "export const Button: React.FC<ButtonProps> = (props) => <button />;",
        );
        let index = parse("index.ts", "export const PrimaryButton = Button;");
        let model = classify_files(&[index, button]);

        let alias = &model.components()["PrimaryButton"];
        assert_eq!(alias.alias_of.as_deref(), Some("Button"));
    }
}
