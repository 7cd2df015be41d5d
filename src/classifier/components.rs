//! Component classification.
//!
//! Components are recognized three ways, in order of precedence:
//!
//! 1. an explicit component type annotation (`const X: React.FC<P> = ...`)
//! 2. a wrapper chain containing `forwardRef` or `memo`
//! 3. a class whose heritage clause extends `Component` / `PureComponent`
//!
//! A bare identifier initializer naming a known component registers an alias
//! carrying a back-reference instead of copied fields.

use super::{ClassifyContext, Classified};
use crate::model::{Component, ComponentKind};
use crate::oracle::{is_function_expression, parameters_of, type_arguments_of, BindingKind, Resolution};
use crate::parser::named_children;
use crate::type_syntax::{
    is_component_base_class, is_memo_wrapper, is_ref_forwarding_wrapper, match_component_type,
    normalize_whitespace, strip_annotation, ComponentTypeMatch, TypeShape,
};
use anyhow::{Context, Result};
use log::debug;
use tree_sitter::Node;

/// A call-expression wrapper chain peeled off an initializer.
#[derive(Debug)]
pub struct Unwrapped<'t> {
    /// Callee names, outermost first
    pub wrappers: Vec<String>,
    /// Explicit type arguments of each wrapper call, parallel to `wrappers`
    pub type_arguments: Vec<Vec<String>>,
    /// The expression left after the last wrapper
    pub innermost: Node<'t>,
}

fn strip_parens(mut node: Node<'_>) -> Node<'_> {
    while node.kind() == "parenthesized_expression" {
        match named_children(node).into_iter().find(|n| n.kind() != "comment") {
            Some(inner) => node = inner,
            None => break,
        }
    }
    node
}

fn first_argument(call: Node<'_>) -> Option<Node<'_>> {
    let arguments = call.child_by_field_name("arguments")?;
    named_children(arguments)
        .into_iter()
        .find(|n| n.kind() != "comment")
}

fn is_unwrappable(kind: &str) -> bool {
    is_function_expression(kind) || matches!(kind, "class" | "identifier" | "call_expression")
}

/// Peels call wrappers off `initializer` while the first argument is a
/// function, class, identifier or further call.
pub fn unwrap_initializer<'t>(initializer: Node<'t>, source: &str) -> Unwrapped<'t> {
    let mut wrappers = Vec::new();
    let mut type_arguments = Vec::new();
    let mut current = strip_parens(initializer);

    while current.kind() == "call_expression" {
        let Some(argument) = first_argument(current).map(strip_parens) else {
            break;
        };
        if !is_unwrappable(argument.kind()) {
            break;
        }
        let Some(callee) = current.child_by_field_name("function") else {
            break;
        };
        wrappers.push(normalize_whitespace(crate::parser::node_text(callee, source)));
        type_arguments.push(type_arguments_of(current, source));
        current = argument;
    }

    Unwrapped {
        wrappers,
        type_arguments,
        innermost: current,
    }
}

/// `Ref<T>`, `ForwardedRef<T>` and friends name the referenced element `T`.
fn ref_target(text: &str) -> String {
    match TypeShape::parse(text) {
        Some(shape)
            if matches!(
                shape.base_name(),
                "Ref" | "ForwardedRef" | "RefObject" | "MutableRefObject" | "LegacyRef"
            ) =>
        {
            shape.arg(0).unwrap_or_else(|| text.to_string())
        }
        _ => text.to_string(),
    }
}

/// Component record from a class node with a component base class.
fn class_component(ctx: &ClassifyContext<'_>, class: Node<'_>, name: String, comment: String) -> Option<Component> {
    let heritage = named_children(class)
        .into_iter()
        .find(|c| c.kind() == "class_heritage")?;
    let extends = named_children(heritage)
        .into_iter()
        .find(|c| c.kind() == "extends_clause")?;

    let (base, args) = match extends.child_by_field_name("value") {
        Some(value) => {
            let text = ctx.text(value);
            let args = type_arguments_of(extends, ctx.source());
            match TypeShape::parse(text) {
                Some(shape) if args.is_empty() => (shape.name, shape.args),
                _ => (text.to_string(), args),
            }
        }
        None => {
            let text = ctx.text(extends).trim_start_matches("extends").trim();
            let shape = TypeShape::parse(text)?;
            (shape.name, shape.args)
        }
    };

    if !is_component_base_class(&base) {
        debug!("Class {} extends {}, not a component", name, base);
        return None;
    }

    Some(Component {
        name,
        kind: ComponentKind::Class,
        prop_type: args.first().cloned(),
        state_type: args.get(1).cloned(),
        ref_type: None,
        comment,
        wrappers: Vec::new(),
        alias_of: None,
    })
}

/// `class Name extends React.Component<P, S> { ... }`
pub fn classify_class_declaration(ctx: &ClassifyContext<'_>, node: Node<'_>) -> Result<Vec<Classified>> {
    let name = ctx.name_of(node).context("class without a name")?;
    let comment = ctx.leading_comment(node);
    Ok(class_component(ctx, node, name, comment)
        .map(Classified::Component)
        .into_iter()
        .collect())
}

fn from_type_match(name: String, comment: String, matched: ComponentTypeMatch) -> Component {
    Component {
        name,
        kind: matched.kind,
        prop_type: matched.prop_type,
        state_type: matched.state_type,
        ref_type: matched.ref_type,
        comment,
        wrappers: matched.wrappers,
        alias_of: None,
    }
}

/// Tries the component paths of a variable declarator. `Ok(None)` means the
/// declarator is not a component and the function paths should be tried.
pub fn classify_component_variable(
    ctx: &ClassifyContext<'_>,
    declarator: Node<'_>,
) -> Result<Option<Component>> {
    let name = ctx.name_of(declarator).context("declarator without a name")?;
    let comment = ctx.leading_comment(declarator);
    let declared = declarator
        .child_by_field_name("type")
        .map(|t| normalize_whitespace(strip_annotation(ctx.text(t))));

    if let Some(matched) = declared.as_deref().and_then(match_component_type) {
        debug!("Component {} from its type annotation", name);
        return Ok(Some(from_type_match(name, comment, matched)));
    }

    let Some(value) = declarator.child_by_field_name("value") else {
        return Ok(None);
    };
    let unwrapped = unwrap_initializer(value, ctx.source());
    let innermost = unwrapped.innermost;

    let forwards_ref = unwrapped.wrappers.iter().any(|w| is_ref_forwarding_wrapper(w));
    let memoized = unwrapped.wrappers.iter().any(|w| is_memo_wrapper(w));
    if forwards_ref || memoized {
        debug!("Component {} wrapped by {:?}", name, unwrapped.wrappers);
        return Ok(Some(wrapped_component(ctx, name, comment, &unwrapped, forwards_ref)));
    }

    if innermost.kind() == "identifier" {
        let target = ctx.text(innermost);
        if let Some(canonical) = ctx.model.components().get(target) {
            debug!("Component {} is an alias of {}", name, target);
            return Ok(Some(Component {
                name,
                kind: ctx.model.canonical_component(canonical).kind,
                prop_type: None,
                state_type: None,
                ref_type: None,
                comment,
                wrappers: unwrapped.wrappers,
                alias_of: Some(target.to_string()),
            }));
        }
        if let Resolution::Found(binding) = ctx.oracle.resolve_identifier(target) {
            if let Some(matched) = binding.declared_type.as_deref().and_then(match_component_type) {
                debug!("Component {} from the declared type of {}", name, target);
                let mut component = from_type_match(name, comment, matched);
                let mut wrappers = unwrapped.wrappers;
                wrappers.append(&mut component.wrappers);
                component.wrappers = wrappers;
                return Ok(Some(component));
            }
        }
        return Ok(None);
    }

    if innermost.kind() == "class" {
        if let Some(mut component) = class_component(ctx, innermost, name, comment) {
            component.wrappers = unwrapped.wrappers;
            return Ok(Some(component));
        }
    }

    Ok(None)
}

/// Fields of a component built with `forwardRef` and/or `memo`.
fn wrapped_component(
    ctx: &ClassifyContext<'_>,
    name: String,
    comment: String,
    unwrapped: &Unwrapped<'_>,
    forwards_ref: bool,
) -> Component {
    let innermost = unwrapped.innermost;
    let mut component = Component {
        name,
        kind: if forwards_ref { ComponentKind::ForwardRef } else { ComponentKind::Functional },
        prop_type: None,
        state_type: None,
        ref_type: None,
        comment,
        wrappers: unwrapped.wrappers.clone(),
        alias_of: None,
    };

    if is_function_expression(innermost.kind()) {
        let parameters = parameters_of(innermost, ctx.source());
        component.prop_type = parameters.first().and_then(|p| p.type_text.clone());
        if forwards_ref {
            component.ref_type = parameters.get(1).and_then(|p| p.type_text.as_deref().map(ref_target));
        }
    } else if innermost.kind() == "identifier" {
        let target = ctx.text(innermost);
        if let Some(existing) = ctx.model.components().get(target) {
            let canonical = ctx.model.canonical_component(existing);
            component.prop_type = canonical.prop_type.clone();
            component.state_type = canonical.state_type.clone();
            component.ref_type = canonical.ref_type.clone();
            if !forwards_ref {
                component.kind = canonical.kind;
            }
        } else if let Resolution::Found(binding) = ctx.oracle.resolve_identifier(target) {
            if let Some(matched) = binding.declared_type.as_deref().and_then(match_component_type) {
                component.prop_type = matched.prop_type;
                component.state_type = matched.state_type;
                component.ref_type = matched.ref_type;
                if !forwards_ref {
                    component.kind = matched.kind;
                }
            } else if binding.kind == BindingKind::Function {
                component.prop_type = binding.parameters.first().and_then(|p| p.type_text.clone());
                if forwards_ref {
                    component.ref_type = binding
                        .parameters
                        .get(1)
                        .and_then(|p| p.type_text.as_deref().map(ref_target));
                }
            }
        }
    } else if innermost.kind() == "class" {
        if let Some(class) = class_component(ctx, innermost, String::new(), String::new()) {
            component.prop_type = class.prop_type;
            component.state_type = class.state_type;
            if !forwards_ref {
                component.kind = ComponentKind::Class;
            }
        }
    }

    // Explicit call type arguments fill what parameter annotations left open:
    // forwardRef<R, P>(...) and memo<P>(...).
    for (wrapper, args) in unwrapped.wrappers.iter().zip(&unwrapped.type_arguments) {
        if is_ref_forwarding_wrapper(wrapper) {
            if component.ref_type.is_none() {
                component.ref_type = args.first().cloned();
            }
            if component.prop_type.is_none() {
                component.prop_type = args.get(1).cloned();
            }
        } else if is_memo_wrapper(wrapper) && component.prop_type.is_none() {
            component.prop_type = args.first().cloned();
        }
    }

    component
}

#[cfg(test)]
mod tests {
    use crate::classifier::test_support::classify;
    use crate::model::ComponentKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_memo_forward_ref_scenario() {
        let model = classify(
            r#"
const C = memo(forwardRef((props: P, ref: R) => <div ref={ref} />));
"#,
        );
        let c = &model.components()["C"];
        assert_eq!(c.kind, ComponentKind::ForwardRef);
        assert_eq!(c.prop_type.as_deref(), Some("P"));
        assert_eq!(c.ref_type.as_deref(), Some("R"));
        assert_eq!(c.wrappers, vec!["memo", "forwardRef"]);
        assert!(model.functions().get("C").is_none());
    }

    #[test]
    fn test_class_component_scenario() {
        let model = classify("class K extends React.Component<P, S> { render() { return null; } }");
        let k = &model.components()["K"];
        assert_eq!(k.kind, ComponentKind::Class);
        assert_eq!(k.prop_type.as_deref(), Some("P"));
        assert_eq!(k.state_type.as_deref(), Some("S"));
        assert_eq!(k.comment, "");
        assert_eq!(crate::comment::interpret(&k.comment).summary, "");
    }

    #[test]
    fn test_non_component_class_is_ignored() {
        let model = classify("class Store extends Base<State> {}\nclass Plain {}");
        assert!(model.components().is_empty());
    }

    #[test]
    fn test_annotation_takes_precedence() {
        let model = classify(
            r#"
/** Fancy input. @export */
export const Input: React.ForwardRefExoticComponent<React.PropsWithoutRef<InputProps> & React.RefAttributes<HTMLInputElement>> =
  React.forwardRef((props: OtherProps, ref) => <input />);
"#,
        );
        let input = &model.components()["Input"];
        assert_eq!(input.kind, ComponentKind::ForwardRef);
        assert_eq!(input.prop_type.as_deref(), Some("InputProps"));
        assert_eq!(input.ref_type.as_deref(), Some("HTMLInputElement"));
        assert!(input.comment.contains("@export"));
    }

    #[test]
    fn test_alias_and_memo_of_identifier() {
        let model = classify(
            r#"
const Button: FC<ButtonProps> = (props) => <button />;
const PrimaryButton = Button;
const FastButton = React.memo(Button);
"#,
        );
        let alias = &model.components()["PrimaryButton"];
        assert_eq!(alias.alias_of.as_deref(), Some("Button"));
        assert_eq!(alias.prop_type, None);

        let fast = &model.components()["FastButton"];
        assert_eq!(fast.alias_of, None);
        assert_eq!(fast.kind, ComponentKind::Functional);
        assert_eq!(fast.prop_type.as_deref(), Some("ButtonProps"));
        assert_eq!(fast.wrappers, vec!["React.memo"]);
    }

    #[test]
    fn test_call_type_arguments_fill_missing_annotations() {
        let model = classify(
            r#"
const Field = forwardRef<HTMLInputElement, FieldProps>((props, ref) => <input ref={ref} />);
const Row = memo<RowProps>(function Row(props) { return <tr />; });
"#,
        );
        let field = &model.components()["Field"];
        assert_eq!(field.ref_type.as_deref(), Some("HTMLInputElement"));
        assert_eq!(field.prop_type.as_deref(), Some("FieldProps"));

        let row = &model.components()["Row"];
        assert_eq!(row.kind, ComponentKind::Functional);
        assert_eq!(row.prop_type.as_deref(), Some("RowProps"));
    }

    #[test]
    fn test_ref_type_unwraps_ref_helpers() {
        let model = classify(
            "const Box = forwardRef((props: BoxProps, ref: React.ForwardedRef<HTMLDivElement>) => <div />);",
        );
        assert_eq!(model.components()["Box"].ref_type.as_deref(), Some("HTMLDivElement"));
    }

    #[test]
    fn test_class_expression_component() {
        let model = classify("const Panel = withTheme(class extends PureComponent<PanelProps> {});");
        let panel = &model.components()["Panel"];
        assert_eq!(panel.kind, ComponentKind::Class);
        assert_eq!(panel.prop_type.as_deref(), Some("PanelProps"));
        assert_eq!(panel.wrappers, vec!["withTheme"]);
    }
}
