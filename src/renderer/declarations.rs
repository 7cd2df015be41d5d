//! The merged declaration module.
//!
//! Output order: closure members that carry their own type-level source text,
//! then components, then functions, then hooks. A name is emitted at most once.

use super::{component_type, strip_visibility};
use crate::model::{parameter_list_text, Declaration, DocModel, FunctionOrigin};
use log::debug;
use std::collections::{BTreeSet, HashSet};

const REACT_IMPORT: &str = "import * as React from \"react\";";

/// Whether a record is rendered from its literal source text.
fn is_source_rendered(declaration: &Declaration<'_>) -> bool {
    match *declaration {
        Declaration::Function(f) => f.origin == FunctionOrigin::TypeAlias,
        _ => declaration.kind().is_type_level(),
    }
}

fn with_comment(comment: &str, body: String) -> String {
    if comment.trim().is_empty() {
        body
    } else {
        format!("{}\n{}", comment.trim(), body)
    }
}

struct ModuleWriter<'m> {
    model: &'m DocModel,
    /// `declare` is implied inside an ambient module block
    declare: &'static str,
    emitted: HashSet<&'m str>,
    entries: Vec<String>,
    uses_react: bool,
}

impl<'m> ModuleWriter<'m> {
    fn new(model: &'m DocModel, wrapped: bool) -> Self {
        Self {
            model,
            declare: if wrapped { "" } else { "declare " },
            emitted: HashSet::new(),
            entries: Vec::new(),
            uses_react: false,
        }
    }

    fn claim(&mut self, name: &'m str) -> bool {
        if self.emitted.insert(name) {
            true
        } else {
            debug!("{} already emitted, skipping", name);
            false
        }
    }

    fn emit_source(&mut self, declaration: &Declaration<'m>) {
        let Some(source) = declaration.source_text() else {
            return;
        };
        if !self.claim(declaration.name()) {
            return;
        }
        let body = format!("export {}", strip_visibility(source).trim());
        self.entries.push(with_comment(declaration.comment(), body));
    }

    fn emit_component(&mut self, declaration: &Declaration<'m>) {
        let Declaration::Component(component) = *declaration else {
            return;
        };
        if !self.claim(&component.name) {
            return;
        }
        self.uses_react = true;
        let body = format!(
            "export {}const {}: {};",
            self.declare,
            component.name,
            component_type(component, self.model)
        );
        self.entries.push(with_comment(&component.comment, body));
    }

    fn emit_function(&mut self, declaration: &Declaration<'m>) {
        let (name, type_parameters, parameters, return_type) = match *declaration {
            Declaration::Function(f) => (&f.name, &f.type_parameters, &f.parameters, &f.return_type),
            Declaration::Hook(h) => (&h.name, &h.type_parameters, &h.parameters, &h.return_type),
            _ => return,
        };
        if !self.claim(name) {
            return;
        }
        let body = format!(
            "export {}function {}{}{}: {};",
            self.declare,
            name,
            type_parameters.as_deref().unwrap_or(""),
            parameter_list_text(parameters),
            return_type
        );
        self.entries.push(with_comment(declaration.comment(), body));
    }
}

/// Renders the declaration module for every public record and its closure.
///
/// With `module_name`, the whole text is wrapped in
/// `declare module "<name>" { ... }`.
pub fn render_module(model: &DocModel, closure: &BTreeSet<String>, module_name: Option<&str>) -> String {
    let mut writer = ModuleWriter::new(model, module_name.is_some());

    for name in closure {
        if let Some(declaration) = model.lookup(name) {
            if is_source_rendered(&declaration) {
                writer.emit_source(&declaration);
            }
        }
    }

    let wanted = |d: &Declaration<'_>| closure.contains(d.name()) || d.is_public();
    for component in model.components().values() {
        let declaration = Declaration::Component(component);
        if wanted(&declaration) {
            writer.emit_component(&declaration);
        }
    }
    for function in model.functions().values() {
        let declaration = Declaration::Function(function);
        if wanted(&declaration) {
            if is_source_rendered(&declaration) {
                writer.emit_source(&declaration);
            } else {
                writer.emit_function(&declaration);
            }
        }
    }
    for hook in model.hooks().values() {
        let declaration = Declaration::Hook(hook);
        if wanted(&declaration) {
            writer.emit_function(&declaration);
        }
    }

    debug!("Declaration module has {} entries", writer.entries.len());

    let mut sections: Vec<String> = Vec::new();
    if writer.uses_react {
        sections.push(REACT_IMPORT.to_string());
    }
    sections.extend(writer.entries);
    let body = sections.join("\n\n");

    match module_name {
        Some(name) => {
            let indented: Vec<String> = body
                .lines()
                .map(|line| if line.is_empty() { String::new() } else { format!("  {}", line) })
                .collect();
            format!("declare module \"{}\" {{\n{}\n}}\n", name, indented.join("\n"))
        }
        None => format!("{}\n", body),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::test_support::classify;
    use crate::resolver::public_closure;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_closure_members_come_first() {
        let model = classify(
            r#"
/** Props. */
export interface CardProps { tone: Tone }
export type Tone = "calm" | "loud";

/** A card. @export */
export const Card: React.FC<CardProps> = () => null;
"#,
        );
        let closure = public_closure(&model);
        let output = render_module(&model, &closure, None);
        assert_eq!(
            output,
            "import * as React from \"react\";\n\n\
             /** Props. */\nexport interface CardProps { tone: Tone }\n\n\
             export type Tone = \"calm\" | \"loud\";\n\n\
             /** A card. @export */\nexport declare const Card: React.FC<CardProps>;\n"
        );
    }

    #[test]
    fn test_public_function_and_hook_entries() {
        let model = classify(
            r#"
/** @export */
export function useCounter(start: number): Counter { return make(start); }
interface Counter { value: number }
/** @export */
export const clamp = (value: number, max = 10): number => Math.min(value, max);
"#,
        );
        let closure = public_closure(&model);
        let output = render_module(&model, &closure, None);

        assert!(output.contains("export interface Counter { value: number }"));
        assert!(output.contains("export declare function clamp(value: number, max?: any): number;"));
        assert_eq!(output.matches("function useCounter").count(), 1);
        assert!(output.contains("export declare function useCounter(start: number): Counter;"));
        assert!(!output.contains("React"));
    }

    #[test]
    fn test_wrapped_module_drops_declare() {
        let model = classify(
            r#"
/** @export */
export const Badge: React.FC<{}> = () => null;
"#,
        );
        let closure = public_closure(&model);
        let output = render_module(&model, &closure, Some("ui-kit"));
        assert_eq!(
            output,
            "declare module \"ui-kit\" {\n  import * as React from \"react\";\n\n  /** @export */\n  export const Badge: React.FC<{}>;\n}\n"
        );
    }

    #[test]
    fn test_shared_name_emitted_once_with_type_precedence() {
        let model = classify(
            r#"
/** @export */
export type Foo = string;
/** @export */
export function Foo(value: string): Foo { return value; }
"#,
        );
        let closure = public_closure(&model);
        let output = render_module(&model, &closure, None);
        assert_eq!(output.matches("Foo =").count(), 1);
        assert!(!output.contains("function Foo"));
        assert!(!output.contains("export export"));
    }

    #[test]
    fn test_nothing_public_renders_empty_module() {
        let model = classify(
            r#"
interface I { a: string }
function load(): I { return { a: "" }; }
"#,
        );
        let closure = public_closure(&model);
        let output = render_module(&model, &closure, None);
        assert!(!output.contains("interface I"));
        assert_eq!(output.trim(), "");
    }
}
