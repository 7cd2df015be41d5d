//! Document Model: normalized declaration records keyed by name.
//!
//! The classifier fills a [`DocModelBuilder`] during its single traversal pass;
//! [`DocModelBuilder::build`] freezes it into a read-only [`DocModel`] that the
//! resolver and renderers share.

use crate::comment::{interpret, CommentInfo};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Return type recorded when none can be determined.
pub const VOID_TYPE: &str = "void";

/// A member of an interface-like type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub name: String,
    pub type_text: String,
    /// Raw leading comment, empty when there is none
    pub comment: String,
    pub optional: bool,
    /// `@default` value from the member comment
    pub default_value: Option<String>,
    /// First `@example` body from the member comment
    pub example: Option<String>,
}

/// Interface, or type alias of an object-literal shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDefinition {
    pub name: String,
    /// Type parameter list including brackets, e.g. `<T extends Base>`
    pub type_parameters: Option<String>,
    pub comment: String,
    /// Members in source order
    pub members: Vec<Member>,
    /// Heritage clause entries (`extends A, B<C>`)
    pub extends: Vec<String>,
    pub source_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnionDefinition {
    pub name: String,
    pub type_parameters: Option<String>,
    pub members: Vec<String>,
    pub comment: String,
    pub source_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumMember {
    pub name: String,
    pub value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumDefinition {
    pub name: String,
    pub members: Vec<EnumMember>,
    pub comment: String,
    pub source_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeAlias {
    pub name: String,
    pub type_parameters: Option<String>,
    pub type_text: String,
    pub comment: String,
    pub source_text: String,
}

/// A function or hook parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub type_text: Option<String>,
    pub default_value: Option<String>,
    pub optional: bool,
}

impl Parameter {
    /// `name?: Type` as written in a declaration signature.
    pub fn signature_text(&self) -> String {
        let marker = if self.optional && !self.name.starts_with("...") { "?" } else { "" };
        let type_text = self.type_text.as_deref().unwrap_or("any");
        format!("{}{}: {}", self.name, marker, type_text)
    }
}

/// Renders `(a: A, b?: B)`.
pub fn parameter_list_text(parameters: &[Parameter]) -> String {
    let rendered: Vec<String> = parameters.iter().map(Parameter::signature_text).collect();
    format!("({})", rendered.join(", "))
}

/// Syntactic path a function signature was captured from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FunctionOrigin {
    /// `type F = (x: X) => Y`
    TypeAlias,
    /// `function f(x: X): Y {}`
    Declaration,
    /// `const f = (x: X): Y => ...`
    Expression,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionSignature {
    pub name: String,
    /// Type parameter list including brackets, e.g. `<T extends Item>`
    pub type_parameters: Option<String>,
    pub parameters: Vec<Parameter>,
    pub return_type: String,
    pub comment: String,
    pub source_text: String,
    pub origin: FunctionOrigin,
}

impl FunctionSignature {
    /// `<T>(a: A) => R`
    pub fn arrow_text(&self) -> String {
        format!(
            "{}{} => {}",
            self.type_parameters.as_deref().unwrap_or(""),
            parameter_list_text(&self.parameters),
            self.return_type
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hook {
    pub name: String,
    pub type_parameters: Option<String>,
    pub parameters: Vec<Parameter>,
    /// Return type text, [`VOID_TYPE`] when undeterminable
    pub return_type: String,
    pub comment: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ComponentKind {
    Functional,
    Class,
    ForwardRef,
}

impl std::fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ComponentKind::Functional => write!(f, "functional"),
            ComponentKind::Class => write!(f, "class"),
            ComponentKind::ForwardRef => write!(f, "forwardRef"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    pub name: String,
    pub kind: ComponentKind,
    pub prop_type: Option<String>,
    /// Class components only
    pub state_type: Option<String>,
    /// Ref-forwarding components only
    pub ref_type: Option<String>,
    pub comment: String,
    /// Wrapper call names, outermost first
    pub wrappers: Vec<String>,
    /// Canonical component this one is a renamed alias of
    pub alias_of: Option<String>,
}

impl Component {
    pub fn is_memoized(&self) -> bool {
        self.wrappers.iter().any(|w| crate::type_syntax::is_memo_wrapper(w))
    }
}

/// The semantic kind of a declaration record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DeclarationKind {
    Type,
    Union,
    Enum,
    Alias,
    Function,
    Hook,
    Component,
}

impl DeclarationKind {
    /// Lookup priority for names registered under several kinds.
    pub const PRIORITY: [DeclarationKind; 7] = [
        DeclarationKind::Type,
        DeclarationKind::Union,
        DeclarationKind::Enum,
        DeclarationKind::Alias,
        DeclarationKind::Function,
        DeclarationKind::Hook,
        DeclarationKind::Component,
    ];

    /// Documentation bucket (output folder) for this kind.
    pub fn bucket(&self) -> &'static str {
        match self {
            DeclarationKind::Type
            | DeclarationKind::Union
            | DeclarationKind::Enum
            | DeclarationKind::Alias => "types",
            DeclarationKind::Function => "functions",
            DeclarationKind::Hook => "hooks",
            DeclarationKind::Component => "components",
        }
    }

    /// Whether declarations of this kind are type-level declarations.
    pub fn is_type_level(&self) -> bool {
        matches!(
            self,
            DeclarationKind::Type | DeclarationKind::Union | DeclarationKind::Enum | DeclarationKind::Alias
        )
    }
}

/// A borrowed view of any declaration record.
#[derive(Debug, Clone, Copy)]
pub enum Declaration<'m> {
    Type(&'m TypeDefinition),
    Union(&'m UnionDefinition),
    Enum(&'m EnumDefinition),
    Alias(&'m TypeAlias),
    Function(&'m FunctionSignature),
    Hook(&'m Hook),
    Component(&'m Component),
}

impl<'m> Declaration<'m> {
    pub fn name(&self) -> &'m str {
        match *self {
            Declaration::Type(d) => &d.name,
            Declaration::Union(d) => &d.name,
            Declaration::Enum(d) => &d.name,
            Declaration::Alias(d) => &d.name,
            Declaration::Function(d) => &d.name,
            Declaration::Hook(d) => &d.name,
            Declaration::Component(d) => &d.name,
        }
    }

    /// Raw leading comment.
    pub fn comment(&self) -> &'m str {
        match *self {
            Declaration::Type(d) => &d.comment,
            Declaration::Union(d) => &d.comment,
            Declaration::Enum(d) => &d.comment,
            Declaration::Alias(d) => &d.comment,
            Declaration::Function(d) => &d.comment,
            Declaration::Hook(d) => &d.comment,
            Declaration::Component(d) => &d.comment,
        }
    }

    pub fn kind(&self) -> DeclarationKind {
        match *self {
            Declaration::Type(_) => DeclarationKind::Type,
            Declaration::Union(_) => DeclarationKind::Union,
            Declaration::Enum(_) => DeclarationKind::Enum,
            Declaration::Alias(_) => DeclarationKind::Alias,
            Declaration::Function(_) => DeclarationKind::Function,
            Declaration::Hook(_) => DeclarationKind::Hook,
            Declaration::Component(_) => DeclarationKind::Component,
        }
    }

    /// Literal source text, for the kinds that keep it.
    pub fn source_text(&self) -> Option<&'m str> {
        match *self {
            Declaration::Type(d) => Some(&d.source_text),
            Declaration::Union(d) => Some(&d.source_text),
            Declaration::Enum(d) => Some(&d.source_text),
            Declaration::Alias(d) => Some(&d.source_text),
            Declaration::Function(d) => Some(&d.source_text),
            Declaration::Hook(_) | Declaration::Component(_) => None,
        }
    }

    /// Interpreted doc comment.
    pub fn doc(&self) -> CommentInfo {
        interpret(self.comment())
    }

    /// Whether the declaration's comment carries the export-eligibility flag.
    pub fn is_public(&self) -> bool {
        self.doc().is_export_eligible()
    }

    /// All type-bearing text of the record. Components contribute the fields of
    /// their canonical record.
    pub fn type_texts(&self, model: &'m DocModel) -> Vec<String> {
        let mut texts = Vec::new();
        match *self {
            Declaration::Type(d) => {
                texts.extend(d.type_parameters.iter().cloned());
                texts.extend(d.members.iter().map(|m| m.type_text.clone()));
                texts.extend(d.extends.iter().cloned());
            }
            Declaration::Union(d) => {
                texts.extend(d.type_parameters.iter().cloned());
                texts.extend(d.members.iter().cloned());
            }
            Declaration::Enum(_) => {}
            Declaration::Alias(d) => {
                texts.extend(d.type_parameters.iter().cloned());
                texts.push(d.type_text.clone());
            }
            Declaration::Function(d) => {
                texts.extend(d.type_parameters.iter().cloned());
                texts.extend(d.parameters.iter().filter_map(|p| p.type_text.clone()));
                texts.push(d.return_type.clone());
            }
            Declaration::Hook(d) => {
                texts.extend(d.type_parameters.iter().cloned());
                texts.extend(d.parameters.iter().filter_map(|p| p.type_text.clone()));
                texts.push(d.return_type.clone());
            }
            Declaration::Component(d) => {
                let canonical = model.canonical_component(d);
                texts.extend(canonical.prop_type.iter().cloned());
                texts.extend(canonical.state_type.iter().cloned());
                texts.extend(canonical.ref_type.iter().cloned());
            }
        }
        texts
    }
}

/// Frozen registry of every declaration found in one analysis run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocModel {
    types: BTreeMap<String, TypeDefinition>,
    unions: BTreeMap<String, UnionDefinition>,
    enums: BTreeMap<String, EnumDefinition>,
    aliases: BTreeMap<String, TypeAlias>,
    functions: BTreeMap<String, FunctionSignature>,
    hooks: BTreeMap<String, Hook>,
    components: BTreeMap<String, Component>,
}

impl DocModel {
    pub fn types(&self) -> &BTreeMap<String, TypeDefinition> {
        &self.types
    }

    pub fn unions(&self) -> &BTreeMap<String, UnionDefinition> {
        &self.unions
    }

    pub fn enums(&self) -> &BTreeMap<String, EnumDefinition> {
        &self.enums
    }

    pub fn aliases(&self) -> &BTreeMap<String, TypeAlias> {
        &self.aliases
    }

    pub fn functions(&self) -> &BTreeMap<String, FunctionSignature> {
        &self.functions
    }

    pub fn hooks(&self) -> &BTreeMap<String, Hook> {
        &self.hooks
    }

    pub fn components(&self) -> &BTreeMap<String, Component> {
        &self.components
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of records across all kinds.
    pub fn len(&self) -> usize {
        self.types.len()
            + self.unions.len()
            + self.enums.len()
            + self.aliases.len()
            + self.functions.len()
            + self.hooks.len()
            + self.components.len()
    }

    /// The record registered under `name` for one specific kind.
    pub fn get(&self, kind: DeclarationKind, name: &str) -> Option<Declaration<'_>> {
        match kind {
            DeclarationKind::Type => self.types.get(name).map(Declaration::Type),
            DeclarationKind::Union => self.unions.get(name).map(Declaration::Union),
            DeclarationKind::Enum => self.enums.get(name).map(Declaration::Enum),
            DeclarationKind::Alias => self.aliases.get(name).map(Declaration::Alias),
            DeclarationKind::Function => self.functions.get(name).map(Declaration::Function),
            DeclarationKind::Hook => self.hooks.get(name).map(Declaration::Hook),
            DeclarationKind::Component => self.components.get(name).map(Declaration::Component),
        }
    }

    /// The record for `name` in the highest-priority kind that has one.
    pub fn lookup(&self, name: &str) -> Option<Declaration<'_>> {
        DeclarationKind::PRIORITY
            .iter()
            .find_map(|kind| self.get(*kind, name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// Every record of every kind, in priority order then by name.
    pub fn declarations(&self) -> Vec<Declaration<'_>> {
        let mut all: Vec<Declaration<'_>> = Vec::with_capacity(self.len());
        all.extend(self.types.values().map(Declaration::Type));
        all.extend(self.unions.values().map(Declaration::Union));
        all.extend(self.enums.values().map(Declaration::Enum));
        all.extend(self.aliases.values().map(Declaration::Alias));
        all.extend(self.functions.values().map(Declaration::Function));
        all.extend(self.hooks.values().map(Declaration::Hook));
        all.extend(self.components.values().map(Declaration::Component));
        all
    }

    /// Follows `alias_of` back-references to the canonical record.
    ///
    /// A dangling back-reference or a cycle stops at the last record reached.
    pub fn canonical_component<'a>(&'a self, component: &'a Component) -> &'a Component {
        let mut current = component;
        let mut seen: HashSet<&str> = HashSet::new();
        seen.insert(current.name.as_str());

        while let Some(target) = current.alias_of.as_deref() {
            if !seen.insert(target) {
                debug!("Component alias cycle at {}", target);
                break;
            }
            match self.components.get(target) {
                Some(next) => current = next,
                None => break,
            }
        }
        current
    }
}

/// Mutable registry filled during classification.
#[derive(Debug, Default)]
pub struct DocModelBuilder {
    model: DocModel,
}

/// Later declarations replace earlier ones, except that a record marked
/// `@export` is never replaced by one that is not.
fn insert_logged<T>(map: &mut BTreeMap<String, T>, kind: &str, record: T, fields: fn(&T) -> (&str, &str)) {
    let (name, comment) = fields(&record);
    let key = name.to_string();
    if let Some(existing) = map.get(&key) {
        let (_, existing_comment) = fields(existing);
        if interpret(existing_comment).is_export_eligible() && !interpret(comment).is_export_eligible() {
            warn!(
                "{} {} re-declared without @export, keeping the exported declaration",
                kind, name
            );
            return;
        }
        debug!("{} {} re-declared, keeping the later declaration", kind, name);
    }
    map.insert(key, record);
}

impl DocModelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read access to what has been registered so far.
    pub fn current(&self) -> &DocModel {
        &self.model
    }

    pub fn register_type(&mut self, record: TypeDefinition) {
        insert_logged(&mut self.model.types, "Type", record, |r| (r.name.as_str(), r.comment.as_str()));
    }

    pub fn register_union(&mut self, record: UnionDefinition) {
        insert_logged(&mut self.model.unions, "Union", record, |r| (r.name.as_str(), r.comment.as_str()));
    }

    pub fn register_enum(&mut self, record: EnumDefinition) {
        insert_logged(&mut self.model.enums, "Enum", record, |r| (r.name.as_str(), r.comment.as_str()));
    }

    pub fn register_alias(&mut self, record: TypeAlias) {
        insert_logged(&mut self.model.aliases, "Alias", record, |r| (r.name.as_str(), r.comment.as_str()));
    }

    pub fn register_function(&mut self, record: FunctionSignature) {
        insert_logged(&mut self.model.functions, "Function", record, |r| (r.name.as_str(), r.comment.as_str()));
    }

    pub fn register_hook(&mut self, record: Hook) {
        insert_logged(&mut self.model.hooks, "Hook", record, |r| (r.name.as_str(), r.comment.as_str()));
    }

    pub fn register_component(&mut self, record: Component) {
        insert_logged(&mut self.model.components, "Component", record, |r| (r.name.as_str(), r.comment.as_str()));
    }

    /// Freezes the registry.
    pub fn build(self) -> DocModel {
        self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn component(name: &str, alias_of: Option<&str>) -> Component {
        Component {
            name: name.to_string(),
            kind: ComponentKind::Functional,
            prop_type: alias_of.is_none().then(|| format!("{}Props", name)),
            state_type: None,
            ref_type: None,
            comment: String::new(),
            wrappers: Vec::new(),
            alias_of: alias_of.map(str::to_string),
        }
    }

    fn alias(name: &str, comment: &str) -> TypeAlias {
        TypeAlias {
            name: name.to_string(),
            type_parameters: None,
            type_text: "string".to_string(),
            comment: comment.to_string(),
            source_text: format!("type {} = string;", name),
        }
    }

    #[test]
    fn test_last_write_wins() {
        let mut builder = DocModelBuilder::new();
        builder.register_alias(alias("Id", "/** first */"));
        builder.register_alias(alias("Id", "/** second */"));
        let model = builder.build();

        assert_eq!(model.aliases().len(), 1);
        assert_eq!(model.aliases()["Id"].comment, "/** second */");
    }

    #[test]
    fn test_exported_record_survives_unexported_redeclaration() {
        let mut builder = DocModelBuilder::new();
        builder.register_alias(alias("Id", "/** Public id. @export */"));
        builder.register_alias(alias("Id", ""));
        assert_eq!(builder.current().aliases()["Id"].comment, "/** Public id. @export */");

        builder.register_alias(alias("Id", "/** Newer id. @export */"));
        let model = builder.build();
        assert_eq!(model.aliases()["Id"].comment, "/** Newer id. @export */");
    }

    #[test]
    fn test_lookup_follows_kind_priority() {
        let mut builder = DocModelBuilder::new();
        builder.register_function(FunctionSignature {
            name: "Foo".to_string(),
            type_parameters: None,
            parameters: Vec::new(),
            return_type: VOID_TYPE.to_string(),
            comment: String::new(),
            source_text: String::new(),
            origin: FunctionOrigin::Declaration,
        });
        builder.register_alias(alias("Foo", ""));
        let model = builder.build();

        assert_eq!(model.lookup("Foo").unwrap().kind(), DeclarationKind::Alias);
        assert_eq!(model.declarations().len(), 2);
        assert!(model.lookup("Bar").is_none());
    }

    #[test]
    fn test_canonical_component_follows_chain_and_cycles() {
        let mut builder = DocModelBuilder::new();
        builder.register_component(component("Button", None));
        builder.register_component(component("Btn", Some("Button")));
        builder.register_component(component("B", Some("Btn")));
        builder.register_component(component("Loop", Some("Loop")));
        let model = builder.build();

        let b = &model.components()["B"];
        assert_eq!(model.canonical_component(b).name, "Button");
        let looping = &model.components()["Loop"];
        assert_eq!(model.canonical_component(looping).name, "Loop");
    }

    #[test]
    fn test_component_type_texts_use_canonical() {
        let mut builder = DocModelBuilder::new();
        builder.register_component(component("Button", None));
        builder.register_component(component("Btn", Some("Button")));
        let model = builder.build();

        let alias = model.get(DeclarationKind::Component, "Btn").unwrap();
        assert_eq!(alias.type_texts(&model), vec!["ButtonProps".to_string()]);
    }

    #[test]
    fn test_is_public_reads_export_flag() {
        let mut builder = DocModelBuilder::new();
        builder.register_alias(alias("A", "/** Public one. @export */"));
        builder.register_alias(alias("B", "// @export"));
        let model = builder.build();

        assert!(model.lookup("A").unwrap().is_public());
        assert!(!model.lookup("B").unwrap().is_public());
    }

    #[test]
    fn test_parameter_signature_text() {
        let param = Parameter {
            name: "size".to_string(),
            type_text: Some("number".to_string()),
            default_value: Some("3".to_string()),
            optional: true,
        };
        assert_eq!(param.signature_text(), "size?: number");
        assert_eq!(parameter_list_text(&[param]), "(size?: number)");
    }

    #[test]
    fn test_buckets() {
        assert_eq!(DeclarationKind::Union.bucket(), "types");
        assert_eq!(DeclarationKind::Hook.bucket(), "hooks");
        assert_eq!(ComponentKind::ForwardRef.to_string(), "forwardRef");
    }
}
