//! Text renderers over a frozen [`DocModel`].
//!
//! - [`docs`] renders one Markdown page per declaration plus an index
//! - [`declarations`] renders the merged declaration module (`.d.ts`)
//!
//! Renderers never mutate the model. Both share the signature reconstruction
//! in this module so a page's "Signature" section and the module entry for the
//! same record agree.

pub mod declarations;
pub mod docs;

use crate::model::{
    parameter_list_text, Component, ComponentKind, Declaration, DocModel, FunctionOrigin,
};
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Module name used in import snippets when none is given.
pub const DEFAULT_MODULE_NAME: &str = "my-library";

/// Synthesized React type for a component.
///
/// Alias records take kind, prop, state, ref and memoization from their
/// canonical component, so an alias and its target render identically.
pub fn component_type(component: &Component, model: &DocModel) -> String {
    let canonical = model.canonical_component(component);
    let props = canonical.prop_type.as_deref().unwrap_or("{}");

    let base = match canonical.kind {
        ComponentKind::Functional => format!("React.FC<{}>", props),
        ComponentKind::Class => match canonical.state_type.as_deref() {
            Some(state) => format!("React.ComponentClass<{}, {}>", props, state),
            None => format!("React.ComponentClass<{}>", props),
        },
        ComponentKind::ForwardRef => format!(
            "React.ForwardRefExoticComponent<React.PropsWithoutRef<{}> & React.RefAttributes<{}>>",
            props,
            canonical.ref_type.as_deref().unwrap_or("unknown")
        ),
    };

    if canonical.is_memoized() || component.is_memoized() {
        format!("React.MemoExoticComponent<{}>", base)
    } else {
        base
    }
}

/// `function name<T>(a: A): R`
fn function_head(name: &str, type_parameters: Option<&str>, parameters: &str, return_type: &str) -> String {
    format!(
        "function {}{}{}: {}",
        name,
        type_parameters.unwrap_or(""),
        parameters,
        return_type
    )
}

/// Signature of a record reconstructed from its normalized fields.
///
/// Interfaces and object-shaped aliases keep their literal source text.
pub fn signature_text(declaration: &Declaration<'_>, model: &DocModel) -> String {
    match *declaration {
        Declaration::Type(d) => d.source_text.trim().to_string(),
        Declaration::Union(d) => format!(
            "type {}{} = {};",
            d.name,
            d.type_parameters.as_deref().unwrap_or(""),
            d.members.join(" | ")
        ),
        Declaration::Enum(d) => {
            let mut text = format!("enum {} {{\n", d.name);
            for member in &d.members {
                match &member.value {
                    Some(value) => text.push_str(&format!("  {} = {},\n", member.name, value)),
                    None => text.push_str(&format!("  {},\n", member.name)),
                }
            }
            text.push('}');
            text
        }
        Declaration::Alias(d) => format!(
            "type {}{} = {};",
            d.name,
            d.type_parameters.as_deref().unwrap_or(""),
            d.type_text
        ),
        Declaration::Function(d) => match d.origin {
            FunctionOrigin::TypeAlias => format!("type {} = {};", d.name, d.arrow_text()),
            FunctionOrigin::Declaration | FunctionOrigin::Expression => format!(
                "{};",
                function_head(
                    &d.name,
                    d.type_parameters.as_deref(),
                    &parameter_list_text(&d.parameters),
                    &d.return_type
                )
            ),
        },
        Declaration::Hook(d) => format!(
            "{};",
            function_head(
                &d.name,
                d.type_parameters.as_deref(),
                &parameter_list_text(&d.parameters),
                &d.return_type
            )
        ),
        Declaration::Component(d) => format!("const {}: {};", d.name, component_type(d, model)),
    }
}

/// Drops leading `export`, `default` and `declare` keywords.
pub fn strip_visibility(text: &str) -> &str {
    let mut rest = text.trim_start();
    loop {
        let before = rest;
        for keyword in ["export", "default", "declare"] {
            if let Some(stripped) = rest.strip_prefix(keyword) {
                if stripped.starts_with(char::is_whitespace) {
                    rest = stripped.trim_start();
                }
            }
        }
        if rest == before {
            return rest;
        }
    }
}

/// Output path of a record's page, relative to the docs root.
pub fn page_path(declaration: &Declaration<'_>) -> PathBuf {
    PathBuf::from(declaration.kind().bucket()).join(format!("{}.md", declaration.name()))
}

/// Records that get their own page: every record whose name is in `names`,
/// except a function shadowed by a hook of the same name.
pub fn documented<'m>(model: &'m DocModel, names: &BTreeSet<String>) -> Vec<Declaration<'m>> {
    model
        .declarations()
        .into_iter()
        .filter(|d| names.contains(d.name()))
        .filter(|d| !(matches!(d, Declaration::Function(_)) && model.hooks().contains_key(d.name())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::test_support::classify;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_component_types_by_kind() {
        let model = classify(
            r#"
const Plain: React.FC<PlainProps> = () => null;
const Bare = memo((props: {}) => null);
class Panel extends React.Component<PanelProps, PanelState> {}
const Input = memo(forwardRef((props: InputProps, ref: Ref<HTMLInputElement>) => null));
"#,
        );
        let components = model.components();
        assert_eq!(component_type(&components["Plain"], &model), "React.FC<PlainProps>");
        assert_eq!(
            component_type(&components["Panel"], &model),
            "React.ComponentClass<PanelProps, PanelState>"
        );
        assert_eq!(
            component_type(&components["Input"], &model),
            "React.MemoExoticComponent<React.ForwardRefExoticComponent<React.PropsWithoutRef<InputProps> & React.RefAttributes<HTMLInputElement>>>"
        );
    }

    #[test]
    fn test_alias_component_renders_like_its_target() {
        let model = classify(
            r#"
const Button = forwardRef((props: ButtonProps, ref: Ref<HTMLButtonElement>) => null);
const Btn = Button;
"#,
        );
        let target = model.lookup("Button").unwrap();
        let alias = model.lookup("Btn").unwrap();
        assert_eq!(
            signature_text(&alias, &model).replacen("Btn", "Button", 1),
            signature_text(&target, &model)
        );
    }

    #[test]
    fn test_signatures_from_normalized_fields() {
        let model = classify(
            r#"
type Size = "sm" | "lg";
enum Tone { Calm, Loud = "loud" }
type OnPick = (id: string) => void;
function pick<T>(items: T[], index?: number): T { return items[0]; }
"#,
        );
        assert_eq!(
            signature_text(&model.lookup("Size").unwrap(), &model),
            "type Size = \"sm\" | \"lg\";"
        );
        assert_eq!(
            signature_text(&model.lookup("Tone").unwrap(), &model),
            "enum Tone {\n  Calm,\n  Loud = \"loud\",\n}"
        );
        assert_eq!(
            signature_text(&model.lookup("OnPick").unwrap(), &model),
            "type OnPick = (id: string) => void;"
        );
        assert_eq!(
            signature_text(&model.lookup("pick").unwrap(), &model),
            "function pick<T>(items: T[], index?: number): T;"
        );
    }

    #[test]
    fn test_generic_signatures_keep_type_parameters() {
        let model = classify(
            r#"
type Maybe<T> = T | null;
type Boxed<T = Theme> = Array<T>;
type Pick2<T> = T extends string ? Foo : Bar;
"#,
        );
        assert_eq!(
            signature_text(&model.lookup("Maybe").unwrap(), &model),
            "type Maybe<T> = T | null;"
        );
        assert_eq!(
            signature_text(&model.lookup("Boxed").unwrap(), &model),
            "type Boxed<T = Theme> = Array<T>;"
        );
        assert_eq!(
            signature_text(&model.lookup("Pick2").unwrap(), &model),
            "type Pick2<T> = T extends string ? Foo : Bar;"
        );
    }

    #[test]
    fn test_strip_visibility() {
        assert_eq!(strip_visibility("export declare interface A {}"), "interface A {}");
        assert_eq!(strip_visibility("export default function f() {}"), "function f() {}");
        assert_eq!(strip_visibility("exported = 1"), "exported = 1");
    }
}
