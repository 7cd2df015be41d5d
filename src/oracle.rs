//! Type-checking oracle.
//!
//! The classifier needs two things a compiler front-end would normally answer:
//! what an identifier is bound to, and what type an expression has. Both are
//! exposed through the [`TypeOracle`] capability. [`SyntacticOracle`] answers
//! them from the syntax trees alone: a global index of top-level bindings plus
//! scoped lookups and a small set of inference rules.

use crate::model::{parameter_list_text, Parameter, VOID_TYPE};
use crate::parser::{children, named_children, node_text, ParsedFile};
use crate::type_syntax::{
    base_name, normalize_whitespace, parenthesize_compound, split_top_level, strip_annotation,
    union_of, CallSignature, TypeShape,
};
use log::debug;
use std::collections::HashMap;
use tree_sitter::Node;

/// Inference gives up past this many nested steps.
const MAX_INFERENCE_DEPTH: usize = 12;

/// Type text used for values whose type cannot be determined.
const UNKNOWN_TYPE: &str = "unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    Variable,
    Function,
    Class,
}

/// What an identifier resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub name: String,
    pub kind: BindingKind,
    /// Type annotation written on the binding, if any
    pub declared_type: Option<String>,
    /// Type inferred from the initializer when there is no annotation
    pub inferred_type: Option<String>,
    pub type_parameters: Option<String>,
    /// Parameters, for function bindings
    pub parameters: Vec<Parameter>,
    /// Declared or inferred return type, for function bindings
    pub return_type: Option<String>,
}

impl Binding {
    /// The binding's type when used as a value.
    pub fn value_type(&self) -> Option<String> {
        if let Some(declared) = &self.declared_type {
            return Some(declared.clone());
        }
        match self.kind {
            BindingKind::Function => Some(format!(
                "{}{} => {}",
                self.type_parameters.as_deref().unwrap_or(""),
                parameter_list_text(&self.parameters),
                self.return_type.as_deref().unwrap_or(UNKNOWN_TYPE)
            )),
            BindingKind::Class => Some(format!("typeof {}", self.name)),
            BindingKind::Variable => self.inferred_type.clone(),
        }
    }
}

/// Outcome of an identifier lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Found(Binding),
    NotFound,
}

impl Resolution {
    pub fn found(self) -> Option<Binding> {
        match self {
            Resolution::Found(binding) => Some(binding),
            Resolution::NotFound => None,
        }
    }
}

/// Symbol and type queries the classifier relies on.
pub trait TypeOracle {
    /// Resolves a top-level identifier to its originating declaration.
    fn resolve_identifier(&self, name: &str) -> Resolution;

    /// Display string for the statically inferred type of an expression.
    fn type_of_expression(&self, node: Node<'_>, source: &str) -> Option<String>;
}

/// Whether nodes of this kind introduce a function body.
pub fn is_function_like(kind: &str) -> bool {
    matches!(
        kind,
        "arrow_function"
            | "function_expression"
            | "function"
            | "generator_function"
            | "function_declaration"
            | "generator_function_declaration"
            | "method_definition"
    )
}

/// Whether nodes of this kind are function-valued expressions.
pub fn is_function_expression(kind: &str) -> bool {
    matches!(kind, "arrow_function" | "function_expression" | "function" | "generator_function")
}

/// The declaration inside an `export` statement, or the node itself.
pub fn unwrap_export(node: Node<'_>) -> Node<'_> {
    if node.kind() == "export_statement" {
        node.child_by_field_name("declaration").unwrap_or(node)
    } else {
        node
    }
}

/// Parameters of a function-like node or a function type.
pub fn parameters_of(function: Node<'_>, source: &str) -> Vec<Parameter> {
    if let Some(single) = function.child_by_field_name("parameter") {
        return vec![Parameter {
            name: node_text(single, source).to_string(),
            type_text: None,
            default_value: None,
            optional: false,
        }];
    }
    let Some(list) = function.child_by_field_name("parameters") else {
        return Vec::new();
    };
    named_children(list)
        .into_iter()
        .filter(|p| matches!(p.kind(), "required_parameter" | "optional_parameter"))
        .map(|p| parameter_from(p, source))
        .collect()
}

fn parameter_from(param: Node<'_>, source: &str) -> Parameter {
    let name = param
        .child_by_field_name("pattern")
        .map(|n| normalize_whitespace(node_text(n, source)))
        .unwrap_or_default();
    let type_text = param
        .child_by_field_name("type")
        .map(|t| normalize_whitespace(strip_annotation(node_text(t, source))));
    let default_value = param
        .child_by_field_name("value")
        .map(|v| normalize_whitespace(node_text(v, source)));
    let optional = param.kind() == "optional_parameter" || default_value.is_some();

    Parameter {
        name,
        type_text,
        default_value,
        optional,
    }
}

/// Return type annotation of a function-like node or function type.
pub fn declared_return_type(function: Node<'_>, source: &str) -> Option<String> {
    function
        .child_by_field_name("return_type")
        .map(|t| normalize_whitespace(strip_annotation(node_text(t, source))))
        .filter(|t| !t.is_empty())
}

/// Type parameter list including its angle brackets.
pub fn type_parameters_of(node: Node<'_>, source: &str) -> Option<String> {
    node.child_by_field_name("type_parameters")
        .map(|t| normalize_whitespace(node_text(t, source)))
}

pub fn is_async(function: Node<'_>) -> bool {
    children(function).iter().any(|c| c.kind() == "async")
}

/// Expression of the last `return` statement in a function body, or the body
/// itself for concise arrow functions. Nested functions are not searched.
pub fn final_return_expression(function: Node<'_>) -> Option<Node<'_>> {
    let body = function.child_by_field_name("body")?;
    if body.kind() != "statement_block" {
        return Some(body);
    }
    let mut last = None;
    collect_returns(body, &mut last);
    last
}

fn collect_returns<'t>(node: Node<'t>, last: &mut Option<Node<'t>>) {
    for child in named_children(node) {
        if is_function_like(child.kind()) || matches!(child.kind(), "class" | "class_declaration") {
            continue;
        }
        if child.kind() == "return_statement" {
            if let Some(expression) = named_children(child).into_iter().find(|n| n.kind() != "comment") {
                *last = Some(expression);
            }
        } else {
            collect_returns(child, last);
        }
    }
}

/// Whether a block-bodied function returns no value anywhere.
fn returns_nothing(function: Node<'_>) -> bool {
    function
        .child_by_field_name("body")
        .map(|b| b.kind() == "statement_block")
        .unwrap_or(false)
        && final_return_expression(function).is_none()
}

/// Text inside a `<...>` type-argument node, split into arguments.
pub fn type_arguments_of(node: Node<'_>, source: &str) -> Vec<String> {
    let Some(args) = node.child_by_field_name("type_arguments") else {
        return Vec::new();
    };
    let text = node_text(args, source).trim();
    let inner = text
        .strip_prefix('<')
        .and_then(|t| t.strip_suffix('>'))
        .unwrap_or(text);
    split_top_level(inner, ',')
}

/// One step into a destructuring pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
enum PatternStep {
    Index(usize),
    Key(String),
}

/// Path from the root of a binding pattern to `name`, if the pattern binds it.
fn locate_in_pattern(pattern: Node<'_>, name: &str, source: &str) -> Option<Vec<PatternStep>> {
    match pattern.kind() {
        "identifier" | "shorthand_property_identifier_pattern" => {
            (node_text(pattern, source) == name).then(Vec::new)
        }
        "rest_pattern" => named_children(pattern)
            .into_iter()
            .next()
            .and_then(|inner| locate_in_pattern(inner, name, source)),
        "assignment_pattern" => pattern
            .child_by_field_name("left")
            .and_then(|left| locate_in_pattern(left, name, source)),
        "object_pattern" => {
            for entry in named_children(pattern) {
                match entry.kind() {
                    "shorthand_property_identifier_pattern" if node_text(entry, source) == name => {
                        return Some(vec![PatternStep::Key(name.to_string())]);
                    }
                    "object_assignment_pattern" => {
                        let Some(left) = entry.child_by_field_name("left") else {
                            continue;
                        };
                        if node_text(left, source) == name {
                            return Some(vec![PatternStep::Key(name.to_string())]);
                        }
                    }
                    "pair_pattern" => {
                        let (Some(key), Some(value)) =
                            (entry.child_by_field_name("key"), entry.child_by_field_name("value"))
                        else {
                            continue;
                        };
                        if let Some(mut path) = locate_in_pattern(value, name, source) {
                            let key = node_text(key, source).trim_matches(|c| c == '"' || c == '\'');
                            path.insert(0, PatternStep::Key(key.to_string()));
                            return Some(path);
                        }
                    }
                    _ => {}
                }
            }
            None
        }
        "array_pattern" => {
            let mut index = 0;
            for child in children(pattern) {
                if child.kind() == "," {
                    index += 1;
                } else if child.is_named() {
                    if let Some(mut path) = locate_in_pattern(child, name, source) {
                        path.insert(0, PatternStep::Index(index));
                        return Some(path);
                    }
                }
            }
            None
        }
        _ => None,
    }
}

/// Type of a member inside an object type literal `{ a: A; b?: B }`.
fn object_member_type(type_text: &str, key: &str) -> Option<String> {
    let inner = type_text.trim().strip_prefix('{')?.strip_suffix('}')?;
    split_top_level(inner, ';')
        .into_iter()
        .flat_map(|part| split_top_level(&part, ','))
        .find_map(|member| {
            let (name, member_type) = member.split_once(':')?;
            let name = name.trim().trim_end_matches('?').trim();
            (name == key).then(|| member_type.trim().to_string())
        })
}

/// Narrows a whole type along a destructuring path.
fn project(type_text: &str, path: &[PatternStep]) -> Option<String> {
    let mut current = type_text.trim().to_string();
    for step in path {
        current = match step {
            PatternStep::Index(index) => {
                if let Some(inner) = current.strip_prefix('[').and_then(|t| t.strip_suffix(']')) {
                    split_top_level(inner, ',').get(*index)?.clone()
                } else if let Some(element) = current.strip_suffix("[]") {
                    element.trim_matches(|c| c == '(' || c == ')').to_string()
                } else {
                    let shape = TypeShape::parse(&current)?;
                    if !matches!(shape.base_name(), "Array" | "ReadonlyArray") {
                        return None;
                    }
                    shape.arg(0)?
                }
            }
            PatternStep::Key(key) => object_member_type(&current, key)
                .unwrap_or_else(|| format!("{}[\"{}\"]", parenthesize_compound(&current), key)),
        };
    }
    Some(current)
}

#[derive(Clone, Copy)]
struct IndexedBinding<'t> {
    node: Node<'t>,
    source: &'t str,
}

/// Oracle built from the syntax trees of every analysed file.
pub struct SyntacticOracle<'t> {
    index: HashMap<String, IndexedBinding<'t>>,
}

fn top_level_bindings<'t>(statement: Node<'t>, source: &str) -> Vec<(String, Node<'t>)> {
    let statement = unwrap_export(statement);
    let named = |node: Node<'t>| {
        node.child_by_field_name("name")
            .map(|n| vec![(node_text(n, source).to_string(), node)])
            .unwrap_or_default()
    };

    match statement.kind() {
        "function_declaration"
        | "generator_function_declaration"
        | "function_signature"
        | "class_declaration"
        | "abstract_class_declaration" => named(statement),
        "ambient_declaration" => named_children(statement)
            .into_iter()
            .flat_map(|child| top_level_bindings(child, source))
            .collect(),
        "lexical_declaration" | "variable_declaration" => named_children(statement)
            .into_iter()
            .filter(|d| d.kind() == "variable_declarator")
            .filter(|d| {
                d.child_by_field_name("name")
                    .map(|n| n.kind() == "identifier")
                    .unwrap_or(false)
            })
            .flat_map(named)
            .collect(),
        _ => Vec::new(),
    }
}

impl<'t> SyntacticOracle<'t> {
    /// Indexes the top-level bindings of `files`. When a name is bound in
    /// several files the first file wins.
    pub fn new(files: &'t [ParsedFile]) -> Self {
        let mut index = HashMap::new();
        for file in files {
            for statement in named_children(file.root()) {
                for (name, node) in top_level_bindings(statement, &file.source) {
                    index.entry(name).or_insert(IndexedBinding {
                        node,
                        source: file.source.as_str(),
                    });
                }
            }
        }
        debug!("Indexed {} top-level bindings across {} files", index.len(), files.len());
        Self { index }
    }

    fn global_binding(&self, name: &str, depth: usize) -> Option<Binding> {
        let entry = self.index.get(name)?;
        self.binding_from(entry.node, entry.source, depth + 1)
    }

    fn binding_from(&self, node: Node<'_>, source: &str, depth: usize) -> Option<Binding> {
        if depth > MAX_INFERENCE_DEPTH {
            return None;
        }
        let name = node_text(node.child_by_field_name("name")?, source).to_string();

        match node.kind() {
            "function_declaration" | "generator_function_declaration" | "function_signature" => {
                Some(self.function_binding(name, None, node, source, depth))
            }
            "class_declaration" | "abstract_class_declaration" => Some(Binding {
                name,
                kind: BindingKind::Class,
                declared_type: None,
                inferred_type: None,
                type_parameters: type_parameters_of(node, source),
                parameters: Vec::new(),
                return_type: None,
            }),
            "variable_declarator" => {
                let declared = node
                    .child_by_field_name("type")
                    .map(|t| normalize_whitespace(strip_annotation(node_text(t, source))));
                let value = node.child_by_field_name("value");

                if let Some(function) = value.filter(|v| is_function_expression(v.kind())) {
                    return Some(self.function_binding(name, declared, function, source, depth));
                }
                if let Some(signature) = declared.as_deref().and_then(CallSignature::parse) {
                    return Some(Binding {
                        name,
                        kind: BindingKind::Function,
                        declared_type: declared,
                        inferred_type: None,
                        type_parameters: signature.type_parameters,
                        parameters: signature.parameters,
                        return_type: Some(signature.return_type),
                    });
                }
                let inferred_type = match (&declared, value) {
                    (None, Some(value)) => self.infer(value, source, depth + 1),
                    _ => None,
                };
                Some(Binding {
                    name,
                    kind: BindingKind::Variable,
                    declared_type: declared,
                    inferred_type,
                    type_parameters: None,
                    parameters: Vec::new(),
                    return_type: None,
                })
            }
            _ => None,
        }
    }

    fn function_binding(
        &self,
        name: String,
        declared_type: Option<String>,
        function: Node<'_>,
        source: &str,
        depth: usize,
    ) -> Binding {
        Binding {
            name,
            kind: BindingKind::Function,
            declared_type,
            inferred_type: None,
            type_parameters: type_parameters_of(function, source),
            parameters: parameters_of(function, source),
            return_type: self.return_type_of(function, source, depth),
        }
    }

    /// Declared return type, else the inferred type of the final return
    /// expression (wrapped in `Promise` for async functions).
    pub fn return_type_of(&self, function: Node<'_>, source: &str, depth: usize) -> Option<String> {
        if let Some(declared) = declared_return_type(function, source) {
            return Some(declared);
        }
        let inferred = if returns_nothing(function) {
            Some(VOID_TYPE.to_string())
        } else {
            final_return_expression(function).and_then(|e| self.infer(e, source, depth + 1))
        }?;
        if is_async(function) && TypeShape::parse(&inferred).map(|s| s.base_name() != "Promise").unwrap_or(true) {
            Some(format!("Promise<{}>", inferred))
        } else {
            Some(inferred)
        }
    }

    fn function_type_text(&self, function: Node<'_>, source: &str, depth: usize) -> String {
        format!(
            "{}{} => {}",
            type_parameters_of(function, source).unwrap_or_default(),
            parameter_list_text(&parameters_of(function, source)),
            self.return_type_of(function, source, depth)
                .unwrap_or_else(|| UNKNOWN_TYPE.to_string())
        )
    }

    fn infer(&self, node: Node<'_>, source: &str, depth: usize) -> Option<String> {
        if depth > MAX_INFERENCE_DEPTH {
            debug!("Inference depth exceeded at {}", node.kind());
            return None;
        }
        let next = depth + 1;

        match node.kind() {
            "string" | "template_string" => Some("string".to_string()),
            "number" => Some("number".to_string()),
            "true" | "false" => Some("boolean".to_string()),
            "null" => Some("null".to_string()),
            "undefined" => Some("undefined".to_string()),
            "regex" => Some("RegExp".to_string()),
            "jsx_element" | "jsx_self_closing_element" | "jsx_fragment" => {
                Some("JSX.Element".to_string())
            }
            "parenthesized_expression" => named_children(node)
                .into_iter()
                .find(|n| n.kind() != "comment")
                .and_then(|inner| self.infer(inner, source, next)),
            "as_expression" => {
                let parts = named_children(node);
                match parts.as_slice() {
                    [_, asserted, ..] => Some(normalize_whitespace(node_text(*asserted, source))),
                    [expression] => self.infer(*expression, source, next),
                    [] => None,
                }
            }
            "satisfies_expression" => {
                let parts = named_children(node);
                let expression = parts.first()?;
                self.infer(*expression, source, next).or_else(|| {
                    parts.get(1).map(|t| normalize_whitespace(node_text(*t, source)))
                })
            }
            "non_null_expression" => {
                let inner = self.infer(*named_children(node).first()?, source, next)?;
                let kept: Vec<String> = split_top_level(&inner, '|')
                    .into_iter()
                    .filter(|p| p != "null" && p != "undefined")
                    .collect();
                Some(kept.join(" | "))
            }
            "arrow_function" | "function_expression" | "function" | "generator_function" => {
                Some(self.function_type_text(node, source, next))
            }
            "array" => {
                let elements: Vec<String> = named_children(node)
                    .into_iter()
                    .filter(|n| n.kind() != "comment")
                    .filter_map(|n| self.infer(n, source, next))
                    .collect();
                if elements.is_empty() {
                    return Some(format!("{}[]", UNKNOWN_TYPE));
                }
                Some(format!("{}[]", parenthesize_compound(&union_of(&elements))))
            }
            "object" => Some(self.object_type(node, source, next)),
            "new_expression" => {
                let constructor = node.child_by_field_name("constructor")?;
                let args = type_arguments_of(node, source);
                let name = node_text(constructor, source);
                if args.is_empty() {
                    Some(name.to_string())
                } else {
                    Some(format!("{}<{}>", name, args.join(", ")))
                }
            }
            "await_expression" => {
                let inner = self.infer(*named_children(node).first()?, source, next)?;
                match TypeShape::parse(&inner) {
                    Some(shape) if shape.base_name() == "Promise" => shape.arg(0),
                    _ => Some(inner),
                }
            }
            "unary_expression" => {
                let operator = node.child_by_field_name("operator").map(|o| node_text(o, source))?;
                match operator {
                    "!" => Some("boolean".to_string()),
                    "typeof" => Some("string".to_string()),
                    "void" => Some("undefined".to_string()),
                    _ => Some("number".to_string()),
                }
            }
            "update_expression" => Some("number".to_string()),
            "binary_expression" => self.binary_type(node, source, next),
            "ternary_expression" => {
                let consequence = self.infer(node.child_by_field_name("consequence")?, source, next)?;
                let alternative = self.infer(node.child_by_field_name("alternative")?, source, next)?;
                Some(union_of(&[consequence, alternative]))
            }
            "call_expression" => self.call_type(node, source, next),
            "identifier" => self.identifier_type(node, source, next),
            "member_expression" => {
                let property = node.child_by_field_name("property").map(|p| node_text(p, source))?;
                if property == "length" {
                    return Some("number".to_string());
                }
                let object_type = self.infer(node.child_by_field_name("object")?, source, next)?;
                object_member_type(&object_type, property)
            }
            _ => None,
        }
    }

    fn object_type(&self, node: Node<'_>, source: &str, depth: usize) -> String {
        let mut members = Vec::new();
        for entry in named_children(node) {
            match entry.kind() {
                "pair" => {
                    let (Some(key), Some(value)) =
                        (entry.child_by_field_name("key"), entry.child_by_field_name("value"))
                    else {
                        continue;
                    };
                    let key = node_text(key, source);
                    let value_type = self
                        .infer(value, source, depth)
                        .unwrap_or_else(|| UNKNOWN_TYPE.to_string());
                    members.push(format!("{}: {}", key, value_type));
                }
                "shorthand_property_identifier" => {
                    let key = node_text(entry, source);
                    let value_type = self
                        .identifier_type(entry, source, depth)
                        .unwrap_or_else(|| UNKNOWN_TYPE.to_string());
                    members.push(format!("{}: {}", key, value_type));
                }
                "method_definition" => {
                    let Some(key) = entry.child_by_field_name("name") else {
                        continue;
                    };
                    members.push(format!(
                        "{}: {}",
                        node_text(key, source),
                        self.function_type_text(entry, source, depth)
                    ));
                }
                _ => {}
            }
        }
        if members.is_empty() {
            "{}".to_string()
        } else {
            format!("{{ {} }}", members.join("; "))
        }
    }

    fn binary_type(&self, node: Node<'_>, source: &str, depth: usize) -> Option<String> {
        let operator = node.child_by_field_name("operator").map(|o| node_text(o, source))?;
        let left = node.child_by_field_name("left")?;
        let right = node.child_by_field_name("right")?;

        match operator {
            "==" | "===" | "!=" | "!==" | "<" | ">" | "<=" | ">=" | "instanceof" | "in" => {
                Some("boolean".to_string())
            }
            "&&" => self.infer(right, source, depth),
            "||" | "??" => {
                let left_type = self.infer(left, source, depth)?;
                let right_type = self.infer(right, source, depth)?;
                let left_type = if operator == "??" {
                    split_top_level(&left_type, '|')
                        .into_iter()
                        .filter(|p| p != "null" && p != "undefined")
                        .collect::<Vec<_>>()
                        .join(" | ")
                } else {
                    left_type
                };
                Some(union_of(&[left_type, right_type]))
            }
            "+" => {
                let is_string = |n| self.infer(n, source, depth).as_deref() == Some("string");
                if is_string(left) || is_string(right) {
                    Some("string".to_string())
                } else {
                    Some("number".to_string())
                }
            }
            _ => Some("number".to_string()),
        }
    }

    fn call_type(&self, call: Node<'_>, source: &str, depth: usize) -> Option<String> {
        let callee = call.child_by_field_name("function")?;
        let callee_text = node_text(callee, source);
        let type_args = type_arguments_of(call, source);
        let args: Vec<Node<'_>> = call
            .child_by_field_name("arguments")
            .map(named_children)
            .unwrap_or_default()
            .into_iter()
            .filter(|n| n.kind() != "comment")
            .collect();
        let arg_type = |index: usize| args.get(index).and_then(|a| self.infer(*a, source, depth));
        let returned = |index: usize| {
            args.get(index)
                .filter(|a| is_function_expression(a.kind()))
                .and_then(|a| self.return_type_of(*a, source, depth))
        };

        match base_name(callee_text) {
            "useState" => {
                let state = type_args
                    .first()
                    .cloned()
                    .or_else(|| returned(0))
                    .or_else(|| arg_type(0))
                    .unwrap_or_else(|| "undefined".to_string());
                return Some(format!(
                    "[{}, React.Dispatch<React.SetStateAction<{}>>]",
                    state, state
                ));
            }
            "useReducer" => {
                let state = arg_type(1).unwrap_or_else(|| UNKNOWN_TYPE.to_string());
                let action = args
                    .first()
                    .and_then(|reducer| self.second_parameter_type(*reducer, source, depth))
                    .unwrap_or_else(|| "any".to_string());
                return Some(format!("[{}, React.Dispatch<{}>]", state, action));
            }
            "useRef" => {
                let starts_null = args.first().map(|a| a.kind() == "null").unwrap_or(false);
                return Some(match type_args.first() {
                    Some(target) if starts_null => format!("React.RefObject<{}>", target),
                    Some(target) => format!("React.MutableRefObject<{}>", target),
                    None => format!(
                        "React.MutableRefObject<{}>",
                        arg_type(0).unwrap_or_else(|| "undefined".to_string())
                    ),
                });
            }
            "useMemo" => return returned(0),
            "useCallback" => return arg_type(0),
            "useContext" => {
                let context = arg_type(0)?;
                return match TypeShape::parse(&context) {
                    Some(shape) if shape.base_name() == "Context" => shape.arg(0),
                    _ => None,
                };
            }
            "createContext" => {
                let value = type_args.first().cloned().or_else(|| arg_type(0))?;
                return Some(format!("React.Context<{}>", value));
            }
            _ => {}
        }

        if callee.kind() != "identifier" {
            return None;
        }
        if let Some(local) = self.local_type(callee_text, callee, source, depth) {
            if let Some(signature) = CallSignature::parse(&local) {
                return Some(signature.return_type);
            }
            if let Some(shape) = TypeShape::parse(&local) {
                if shape.base_name() == "Dispatch" {
                    return Some(VOID_TYPE.to_string());
                }
            }
            return None;
        }
        self.global_binding(callee_text, depth)
            .filter(|b| b.kind == BindingKind::Function)
            .and_then(|b| b.return_type)
    }

    fn second_parameter_type(&self, reducer: Node<'_>, source: &str, depth: usize) -> Option<String> {
        if is_function_expression(reducer.kind()) {
            return parameters_of(reducer, source).get(1).and_then(|p| p.type_text.clone());
        }
        if reducer.kind() == "identifier" {
            let binding = self.global_binding(node_text(reducer, source), depth)?;
            return binding.parameters.get(1).and_then(|p| p.type_text.clone());
        }
        None
    }

    fn identifier_type(&self, identifier: Node<'_>, source: &str, depth: usize) -> Option<String> {
        let name = node_text(identifier, source);
        match name {
            "undefined" => return Some("undefined".to_string()),
            "NaN" | "Infinity" => return Some("number".to_string()),
            _ => {}
        }
        if let Some(found) = self.local_type(name, identifier, source, depth) {
            return Some(found);
        }
        self.global_binding(name, depth).and_then(|b| b.value_type())
    }

    /// Looks `name` up in the scopes enclosing `from`, innermost first.
    fn local_type(&self, name: &str, from: Node<'_>, source: &str, depth: usize) -> Option<String> {
        if depth > MAX_INFERENCE_DEPTH {
            return None;
        }
        let mut current = from.parent();
        while let Some(scope) = current {
            if is_function_like(scope.kind()) {
                if let Some(found) = self.parameter_type(scope, name, source, depth) {
                    return Some(found);
                }
            }
            if matches!(scope.kind(), "statement_block" | "program") {
                for statement in named_children(scope) {
                    if let Some(found) = self.declared_in_statement(statement, name, from, source, depth) {
                        return Some(found);
                    }
                }
            }
            current = scope.parent();
        }
        None
    }

    fn parameter_type(&self, function: Node<'_>, name: &str, source: &str, depth: usize) -> Option<String> {
        let list = function.child_by_field_name("parameters")?;
        for param in named_children(list) {
            if !matches!(param.kind(), "required_parameter" | "optional_parameter") {
                continue;
            }
            let Some(pattern) = param.child_by_field_name("pattern") else {
                continue;
            };
            let Some(path) = locate_in_pattern(pattern, name, source) else {
                continue;
            };
            let whole = param
                .child_by_field_name("type")
                .map(|t| normalize_whitespace(strip_annotation(node_text(t, source))))
                .or_else(|| {
                    param
                        .child_by_field_name("value")
                        .and_then(|v| self.infer(v, source, depth + 1))
                })?;
            return project(&whole, &path);
        }
        None
    }

    fn declared_in_statement(
        &self,
        statement: Node<'_>,
        name: &str,
        from: Node<'_>,
        source: &str,
        depth: usize,
    ) -> Option<String> {
        let statement = unwrap_export(statement);
        match statement.kind() {
            "lexical_declaration" | "variable_declaration" => {
                for declarator in named_children(statement) {
                    if declarator.kind() != "variable_declarator"
                        || declarator.byte_range().contains(&from.start_byte())
                    {
                        continue;
                    }
                    let Some(pattern) = declarator.child_by_field_name("name") else {
                        continue;
                    };
                    let Some(path) = locate_in_pattern(pattern, name, source) else {
                        continue;
                    };
                    if path.is_empty() {
                        return self
                            .binding_from(declarator, source, depth + 1)
                            .and_then(|b| b.value_type());
                    }
                    let whole = declarator
                        .child_by_field_name("type")
                        .map(|t| normalize_whitespace(strip_annotation(node_text(t, source))))
                        .or_else(|| {
                            declarator
                                .child_by_field_name("value")
                                .and_then(|v| self.infer(v, source, depth + 1))
                        })?;
                    return project(&whole, &path);
                }
                None
            }
            "function_declaration" | "generator_function_declaration" | "class_declaration" => {
                let declared_name = statement.child_by_field_name("name").map(|n| node_text(n, source))?;
                if declared_name != name || statement.byte_range().contains(&from.start_byte()) {
                    return None;
                }
                self.binding_from(statement, source, depth + 1).and_then(|b| b.value_type())
            }
            _ => None,
        }
    }
}

impl TypeOracle for SyntacticOracle<'_> {
    fn resolve_identifier(&self, name: &str) -> Resolution {
        match self.global_binding(name, 0) {
            Some(binding) => Resolution::Found(binding),
            None => Resolution::NotFound,
        }
    }

    fn type_of_expression(&self, node: Node<'_>, source: &str) -> Option<String> {
        self.infer(node, source, 0)
    }
}
