//! Type-level declarations: interfaces, type aliases and enums.

use super::{ClassifyContext, Classified};
use crate::comment::interpret;
use crate::model::{
    parameter_list_text, EnumDefinition, EnumMember, FunctionOrigin, FunctionSignature, Member,
    TypeAlias, TypeDefinition, UnionDefinition, VOID_TYPE,
};
use crate::oracle::{declared_return_type, parameters_of, type_parameters_of};
use crate::parser::{children, named_children};
use crate::type_syntax::{normalize_whitespace, strip_annotation};
use anyhow::{Context, Result};
use log::debug;
use tree_sitter::Node;

/// `interface Name<T> extends A, B { ... }`
pub fn classify_interface(ctx: &ClassifyContext<'_>, node: Node<'_>) -> Result<Vec<Classified>> {
    let name = ctx.name_of(node).context("interface without a name")?;
    let body = node
        .child_by_field_name("body")
        .with_context(|| format!("interface {} has no body", name))?;

    let extends = named_children(node)
        .into_iter()
        .filter(|c| c.kind() == "extends_type_clause")
        .flat_map(named_children)
        .map(|t| normalize_whitespace(ctx.text(t)))
        .collect();

    debug!("Found interface {}", name);
    Ok(vec![Classified::Type(TypeDefinition {
        type_parameters: type_parameters_of(node, ctx.source()),
        members: members_of(ctx, body),
        comment: ctx.leading_comment(node),
        extends,
        source_text: ctx.text(node).to_string(),
        name,
    })])
}

/// `type Name = ...`, split by the shape of the right-hand side.
pub fn classify_type_alias(ctx: &ClassifyContext<'_>, node: Node<'_>) -> Result<Vec<Classified>> {
    let name = ctx.name_of(node).context("type alias without a name")?;
    let mut value = node
        .child_by_field_name("value")
        .with_context(|| format!("type alias {} has no value", name))?;
    while value.kind() == "parenthesized_type" {
        match named_children(value).into_iter().next() {
            Some(inner) => value = inner,
            None => break,
        }
    }

    let comment = ctx.leading_comment(node);
    let source_text = ctx.text(node).to_string();
    let type_parameters = type_parameters_of(node, ctx.source());

    let record = match value.kind() {
        "function_type" => Classified::Function(FunctionSignature {
            type_parameters: type_parameters_of(value, ctx.source()).or(type_parameters),
            parameters: parameters_of(value, ctx.source()),
            return_type: declared_return_type(value, ctx.source())
                .unwrap_or_else(|| VOID_TYPE.to_string()),
            comment,
            source_text,
            origin: FunctionOrigin::TypeAlias,
            name,
        }),
        "union_type" => {
            let mut members = Vec::new();
            flatten_union(ctx, value, &mut members);
            Classified::Union(UnionDefinition {
                name,
                type_parameters,
                members,
                comment,
                source_text,
            })
        }
        "object_type" => Classified::Type(TypeDefinition {
            members: members_of(ctx, value),
            extends: Vec::new(),
            type_parameters,
            name,
            comment,
            source_text,
        }),
        _ => Classified::Alias(TypeAlias {
            type_text: normalize_whitespace(ctx.text(value)),
            type_parameters,
            name,
            comment,
            source_text,
        }),
    };
    Ok(vec![record])
}

/// Collects the alternatives of a (left-nested) union type.
fn flatten_union(ctx: &ClassifyContext<'_>, node: Node<'_>, members: &mut Vec<String>) {
    for child in named_children(node) {
        if child.kind() == "union_type" {
            flatten_union(ctx, child, members);
        } else if child.kind() != "comment" {
            members.push(normalize_whitespace(ctx.text(child)));
        }
    }
}

/// `enum Name { A, B = 2, "C" = "c" }`
pub fn classify_enum(ctx: &ClassifyContext<'_>, node: Node<'_>) -> Result<Vec<Classified>> {
    let name = ctx.name_of(node).context("enum without a name")?;
    let body = node
        .child_by_field_name("body")
        .with_context(|| format!("enum {} has no body", name))?;

    let unquote = |text: &str| text.trim_matches(|c| c == '"' || c == '\'').to_string();
    let members = named_children(body)
        .into_iter()
        .filter_map(|entry| match entry.kind() {
            "enum_assignment" => Some(EnumMember {
                name: unquote(ctx.text(entry.child_by_field_name("name")?)),
                value: entry
                    .child_by_field_name("value")
                    .map(|v| normalize_whitespace(ctx.text(v))),
            }),
            "property_identifier" | "string" => Some(EnumMember {
                name: unquote(ctx.text(entry)),
                value: None,
            }),
            _ => None,
        })
        .collect();

    Ok(vec![Classified::Enum(EnumDefinition {
        members,
        comment: ctx.leading_comment(node),
        source_text: ctx.text(node).to_string(),
        name,
    })])
}

/// Members of an interface body or object type literal, in source order.
pub fn members_of(ctx: &ClassifyContext<'_>, body: Node<'_>) -> Vec<Member> {
    named_children(body)
        .into_iter()
        .filter_map(|entry| member_of(ctx, entry))
        .collect()
}

fn member_of(ctx: &ClassifyContext<'_>, entry: Node<'_>) -> Option<Member> {
    let optional = children(entry).iter().any(|c| c.kind() == "?");

    let (name, type_text) = match entry.kind() {
        "property_signature" => {
            let name = ctx.text(entry.child_by_field_name("name")?).to_string();
            let type_text = entry
                .child_by_field_name("type")
                .map(|t| normalize_whitespace(strip_annotation(ctx.text(t))))
                .unwrap_or_else(|| "any".to_string());
            (name, type_text)
        }
        "method_signature" => {
            let name = ctx.text(entry.child_by_field_name("name")?).to_string();
            let type_text = format!(
                "{}{} => {}",
                type_parameters_of(entry, ctx.source()).unwrap_or_default(),
                parameter_list_text(&parameters_of(entry, ctx.source())),
                declared_return_type(entry, ctx.source()).unwrap_or_else(|| VOID_TYPE.to_string())
            );
            (name, type_text)
        }
        "index_signature" => {
            let text = ctx.text(entry);
            let close = text.find(']')?;
            let name = normalize_whitespace(&text[..=close]);
            let type_text = entry
                .child_by_field_name("type")
                .map(|t| normalize_whitespace(strip_annotation(ctx.text(t))))
                .unwrap_or_else(|| "any".to_string());
            (name, type_text)
        }
        _ => return None,
    };

    let comment = ctx.leading_comment(entry);
    let info = interpret(&comment);
    Some(Member {
        name,
        type_text,
        optional,
        default_value: info.default_value.clone(),
        example: info.examples.first().map(|e| e.body.clone()),
        comment,
    })
}

#[cfg(test)]
mod tests {
    use crate::classifier::test_support::classify;
    use crate::model::FunctionOrigin;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_interface_members_in_order() {
        let model = classify(
            r#"
/** Button props. @export */
export interface ButtonProps extends BaseProps, Themed<Dark> {
  /** Visible text */
  label: string;
  /**
   * Size in pixels.
   * @default 12
   * @example
   * size={16}
   */
  size?: number;
  onClick(event: MouseEvent): void;
  [key: string]: unknown;
}
"#,
        );
        let props = &model.types()["ButtonProps"];
        assert_eq!(props.extends, vec!["BaseProps", "Themed<Dark>"]);
        let names: Vec<&str> = props.members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["label", "size", "onClick", "[key: string]"]);

        assert_eq!(props.members[0].type_text, "string");
        assert!(!props.members[0].optional);
        assert_eq!(props.members[0].comment, "/** Visible text */");

        assert!(props.members[1].optional);
        assert_eq!(props.members[1].default_value.as_deref(), Some("12"));
        assert_eq!(props.members[1].example.as_deref(), Some("size={16}"));

        assert_eq!(props.members[2].type_text, "(event: MouseEvent) => void");
        assert_eq!(props.members[3].type_text, "unknown");
        assert!(props.source_text.starts_with("interface ButtonProps"));
    }

    #[test]
    fn test_alias_shapes_are_exclusive() {
        let model = classify(
            r#"
type Handler = (id: string, force?: boolean) => Promise<void>;
type Size = "sm" | "md" | "lg";
type Point = { x: number; y: number };
type Id = string;
"#,
        );

        let handler = &model.functions()["Handler"];
        assert_eq!(handler.origin, FunctionOrigin::TypeAlias);
        assert_eq!(handler.return_type, "Promise<void>");
        assert_eq!(handler.parameters.len(), 2);
        assert!(handler.parameters[1].optional);
        assert!(!model.aliases().contains_key("Handler"));

        assert_eq!(model.unions()["Size"].members, vec!["\"sm\"", "\"md\"", "\"lg\""]);
        assert!(!model.aliases().contains_key("Size"));

        assert_eq!(model.types()["Point"].members.len(), 2);
        assert_eq!(model.aliases()["Id"].type_text, "string");
    }

    #[test]
    fn test_type_parameters_are_recorded() {
        let model = classify(
            r#"
interface Box<T extends Base> { value: T }
type Maybe<T> = T | null;
type Boxed<T = Theme> = Array<T>;
type Entry<K extends string> = { key: K };
"#,
        );
        assert_eq!(model.types()["Box"].type_parameters.as_deref(), Some("<T extends Base>"));
        assert_eq!(model.unions()["Maybe"].type_parameters.as_deref(), Some("<T>"));
        assert_eq!(model.aliases()["Boxed"].type_parameters.as_deref(), Some("<T = Theme>"));
        assert_eq!(model.types()["Entry"].type_parameters.as_deref(), Some("<K extends string>"));
    }

    #[test]
    fn test_enum_members() {
        let model = classify(r#"enum Color { Red, Green = "green", Blue = 4 }"#);
        let color = &model.enums()["Color"];
        let members: Vec<(&str, Option<&str>)> = color
            .members
            .iter()
            .map(|m| (m.name.as_str(), m.value.as_deref()))
            .collect();
        assert_eq!(
            members,
            vec![("Red", None), ("Green", Some("\"green\"")), ("Blue", Some("4"))]
        );
    }
}
