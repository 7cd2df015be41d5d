use crate::model::{Declaration, DeclarationKind, DocModel};
use crate::type_syntax::referenced_type_names;
use log::debug;
use std::collections::{BTreeSet, HashSet, VecDeque};

/// Ambient and library names that never resolve to a documented declaration.
pub const BUILTIN_TYPES: &[&str] = &[
    "Array",
    "ReadonlyArray",
    "Promise",
    "PromiseLike",
    "Date",
    "Error",
    "RegExp",
    "Map",
    "Set",
    "WeakMap",
    "WeakSet",
    "Record",
    "Partial",
    "Required",
    "Readonly",
    "Pick",
    "Omit",
    "Exclude",
    "Extract",
    "NonNullable",
    "ReturnType",
    "Parameters",
    "InstanceType",
    "Awaited",
    "Function",
    "Object",
    "String",
    "Number",
    "Boolean",
    "Symbol",
    "BigInt",
    "Iterable",
    "Iterator",
    "JSX",
    "React",
    "Element",
    "HTMLElement",
    "SVGElement",
    "Node",
    "Event",
    "MouseEvent",
    "KeyboardEvent",
    "FocusEvent",
    "Window",
    "Document",
];

/// Whether `name` is a built-in or DOM global (`HTMLInputElement` and friends).
pub fn is_builtin(name: &str) -> bool {
    BUILTIN_TYPES.contains(&name)
        || (name.starts_with("HTML") && name.ends_with("Element"))
        || (name.starts_with("SVG") && name.ends_with("Element"))
}

/// Dependency resolver - computes which declarations a public surface pulls in
pub struct DependencyResolver<'m> {
    model: &'m DocModel,
}

impl<'m> DependencyResolver<'m> {
    pub fn new(model: &'m DocModel) -> Self {
        Self { model }
    }

    /// Every record registered under `name`, across kinds.
    fn records_named(&self, name: &str) -> Vec<Declaration<'m>> {
        DeclarationKind::PRIORITY
            .iter()
            .filter_map(|kind| self.model.get(*kind, name))
            .collect()
    }

    /// Candidate type names mentioned by a record's type-bearing text, minus
    /// built-ins and the record's own name.
    pub fn referenced_names(&self, declaration: &Declaration<'m>) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for text in declaration.type_texts(self.model) {
            for name in referenced_type_names(&text) {
                if is_builtin(&name) || name == declaration.name() || names.contains(&name) {
                    continue;
                }
                names.push(name);
            }
        }
        names
    }

    /// Names of the declarations matching `is_public` plus every declaration
    /// they reference, transitively.
    ///
    /// Candidate names that resolve to nothing (type parameters, external
    /// library types) are dropped. Once a name is in the set, the records of
    /// every kind registered under it are expanded, which makes the result a
    /// fixed point: seeding again from the result yields the same set.
    pub fn closure<F>(&self, is_public: F) -> BTreeSet<String>
    where
        F: Fn(&Declaration<'m>) -> bool,
    {
        let mut visited: BTreeSet<String> = BTreeSet::new();
        let mut worklist: VecDeque<String> = VecDeque::new();

        for declaration in self.model.declarations() {
            if is_public(&declaration) && visited.insert(declaration.name().to_string()) {
                worklist.push_back(declaration.name().to_string());
            }
        }
        debug!("Closure seeded with {} public declarations", visited.len());

        while let Some(name) = worklist.pop_front() {
            for declaration in self.records_named(&name) {
                for candidate in self.referenced_names(&declaration) {
                    if visited.contains(&candidate) {
                        continue;
                    }
                    if self.model.contains(&candidate) {
                        debug!("{} pulls in {}", name, candidate);
                        visited.insert(candidate.clone());
                        worklist.push_back(candidate);
                    } else {
                        debug!("Dropping unresolved name {} referenced by {}", candidate, name);
                    }
                }
            }
        }

        debug!("Closure contains {} declarations", visited.len());
        visited
    }

    /// Closure members reachable from one record's own type-bearing fields,
    /// in discovery order, never including the record itself.
    pub fn related_types(&self, declaration: &Declaration<'m>, closure: &BTreeSet<String>) -> Vec<String> {
        let subject = declaration.name();
        let mut related: Vec<String> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        seen.insert(subject.to_string());

        let mut worklist: VecDeque<String> = self.referenced_names(declaration).into();
        while let Some(name) = worklist.pop_front() {
            if !seen.insert(name.clone()) || !closure.contains(&name) {
                continue;
            }
            for record in self.records_named(&name) {
                worklist.extend(self.referenced_names(&record));
            }
            related.push(name);
        }
        related
    }
}

/// Closure of every declaration flagged export-eligible in its doc comment.
pub fn public_closure(model: &DocModel) -> BTreeSet<String> {
    DependencyResolver::new(model).closure(|declaration| declaration.is_public())
}
