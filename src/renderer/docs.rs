//! Markdown documentation pages.

use super::{documented, page_path, signature_text, DEFAULT_MODULE_NAME};
use crate::comment::{interpret, CommentInfo};
use crate::markdown::{inline_code, link, MarkdownBuilder};
use crate::model::{Declaration, DeclarationKind, DocModel, Member, Parameter, TypeDefinition};
use crate::resolver::DependencyResolver;
use crate::type_syntax::TypeShape;
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Relative link from one page to another record's page.
fn page_link(model: &DocModel, name: &str) -> String {
    match model.lookup(name) {
        Some(target) => link(
            &inline_code(name),
            &format!("../{}/{}.md", target.kind().bucket(), name),
        ),
        None => inline_code(name),
    }
}

/// The Type Definition a prop or state type names directly, if any.
fn resolve_type<'m>(model: &'m DocModel, type_text: &str) -> Option<&'m TypeDefinition> {
    let shape = TypeShape::parse(type_text)?;
    model.types().get(&shape.name)
}

fn member_rows(members: &[Member]) -> Vec<Vec<String>> {
    members
        .iter()
        .map(|member| {
            vec![
                inline_code(&member.name),
                inline_code(&member.type_text),
                if member.optional { "No" } else { "Yes" }.to_string(),
                member
                    .default_value
                    .as_deref()
                    .map(inline_code)
                    .unwrap_or_default(),
                interpret(&member.comment).summary,
            ]
        })
        .collect()
}

fn member_table(md: &mut MarkdownBuilder, heading: &str, definition: &TypeDefinition) {
    if definition.members.is_empty() {
        return;
    }
    md.title(2, heading);
    md.table(
        &["Name", "Type", "Required", "Default", "Description"],
        &member_rows(&definition.members),
    );
}

fn parameter_table(md: &mut MarkdownBuilder, parameters: &[Parameter], info: &CommentInfo) {
    if parameters.is_empty() {
        return;
    }
    let rows: Vec<Vec<String>> = parameters
        .iter()
        .map(|parameter| {
            let name = if parameter.optional {
                format!("{}?", parameter.name)
            } else {
                parameter.name.clone()
            };
            vec![
                inline_code(&name),
                inline_code(parameter.type_text.as_deref().unwrap_or("any")),
                parameter
                    .default_value
                    .as_deref()
                    .map(inline_code)
                    .unwrap_or_default(),
                info.param_description(&parameter.name)
                    .unwrap_or_default()
                    .to_string(),
            ]
        })
        .collect();
    md.title(2, "Parameters");
    md.table(&["Name", "Type", "Default", "Description"], &rows);
}

fn returns_section(md: &mut MarkdownBuilder, return_type: &str, info: &CommentInfo) {
    md.title(2, "Returns");
    match info.returns.as_deref() {
        Some(text) if !text.is_empty() => md.paragraph(&format!("{} - {}", inline_code(return_type), text)),
        _ => md.paragraph(&inline_code(return_type)),
    };
}

/// Kind-specific tables between "Signature" and "Examples".
fn detail_sections(md: &mut MarkdownBuilder, declaration: &Declaration<'_>, model: &DocModel, info: &CommentInfo) {
    match *declaration {
        Declaration::Type(d) => {
            if !d.extends.is_empty() {
                let parents: Vec<String> = d.extends.iter().map(|e| inline_code(e)).collect();
                md.paragraph(&format!("Extends {}", parents.join(", ")));
            }
            member_table(md, "Properties", d);
        }
        Declaration::Union(d) => {
            md.title(2, "Members");
            md.list(d.members.iter().map(|m| inline_code(m)));
        }
        Declaration::Enum(d) => {
            let rows: Vec<Vec<String>> = d
                .members
                .iter()
                .map(|m| {
                    vec![
                        inline_code(&m.name),
                        m.value.as_deref().map(inline_code).unwrap_or_default(),
                    ]
                })
                .collect();
            if !rows.is_empty() {
                md.title(2, "Members");
                md.table(&["Name", "Value"], &rows);
            }
        }
        Declaration::Alias(_) => {}
        Declaration::Function(d) => {
            parameter_table(md, &d.parameters, info);
            returns_section(md, &d.return_type, info);
        }
        Declaration::Hook(d) => {
            parameter_table(md, &d.parameters, info);
            returns_section(md, &d.return_type, info);
        }
        Declaration::Component(d) => {
            let canonical = model.canonical_component(d);
            if let Some(target) = canonical.alias_of.as_deref().or(d.alias_of.as_deref()) {
                md.paragraph(&format!("Alias of {}.", page_link(model, target)));
            }
            if let Some(props) = canonical.prop_type.as_deref().and_then(|p| resolve_type(model, p)) {
                member_table(md, "Props", props);
            }
            if let Some(state) = canonical.state_type.as_deref().and_then(|s| resolve_type(model, s)) {
                member_table(md, "State", state);
            }
        }
    }
}

/// Renders one documentation page.
///
/// When `closure` is given, a "Related Types" section links every closure
/// member reachable from this record's type-bearing fields.
pub fn render_page(
    declaration: &Declaration<'_>,
    model: &DocModel,
    module_name: Option<&str>,
    closure: Option<&BTreeSet<String>>,
) -> String {
    let info = declaration.doc();
    let name = declaration.name();
    let module_name = module_name.unwrap_or(DEFAULT_MODULE_NAME);

    let mut md = MarkdownBuilder::new();
    md.title(1, name);
    md.paragraph(&info.summary);
    if let Some(deprecated) = &info.deprecated {
        if deprecated.is_empty() {
            md.quote("**Deprecated**");
        } else {
            md.quote(&format!("**Deprecated:** {}", deprecated));
        }
    }
    if let Some(remarks) = &info.remarks {
        md.paragraph(remarks);
    }

    md.title(2, "Installation");
    let import = if declaration.kind().is_type_level() {
        format!("import type {{ {} }} from \"{}\";", name, module_name)
    } else {
        format!("import {{ {} }} from \"{}\";", name, module_name)
    };
    md.code_block("tsx", &import);

    md.title(2, "Signature");
    md.code_block("tsx", &signature_text(declaration, model));

    detail_sections(&mut md, declaration, model, &info);

    if !info.examples.is_empty() {
        md.title(2, "Examples");
        for example in &info.examples {
            if example.body.trim_start().starts_with("```") {
                md.paragraph(&example.body);
            } else {
                md.code_block("tsx", &example.body);
            }
        }
    }

    if let Some(closure) = closure {
        let related = DependencyResolver::new(model).related_types(declaration, closure);
        if !related.is_empty() {
            md.title(2, "Related Types");
            md.list(related.iter().map(|n| page_link(model, n)));
        }
    }

    md.build()
}

fn bucket_title(kind: DeclarationKind) -> &'static str {
    match kind.bucket() {
        "components" => "Components",
        "hooks" => "Hooks",
        "functions" => "Functions",
        _ => "Types",
    }
}

/// Index page (`README.md`) listing every page per bucket.
pub fn render_index(model: &DocModel, names: &BTreeSet<String>, module_name: Option<&str>) -> String {
    let mut md = MarkdownBuilder::new();
    md.title(1, &format!("{} API", module_name.unwrap_or(DEFAULT_MODULE_NAME)));

    let pages = documented(model, names);
    for bucket in ["components", "hooks", "functions", "types"] {
        let entries: Vec<String> = pages
            .iter()
            .filter(|d| d.kind().bucket() == bucket)
            .map(|d| {
                let summary = d.doc().summary;
                let target = link(d.name(), &page_path(d).to_string_lossy().replace('\\', "/"));
                match summary.lines().next() {
                    Some(first) if !first.is_empty() => format!("{} - {}", target, first),
                    _ => target,
                }
            })
            .collect();
        if let Some(first) = pages.iter().find(|d| d.kind().bucket() == bucket) {
            md.title(2, bucket_title(first.kind()));
            md.list(entries);
        }
    }
    md.build()
}

/// Every page of a documentation run: `(relative path, content)` pairs for
/// each documented record in `closure`, plus `README.md`.
pub fn render_site(model: &DocModel, closure: &BTreeSet<String>, module_name: Option<&str>) -> Vec<(PathBuf, String)> {
    let mut pages: Vec<(PathBuf, String)> = documented(model, closure)
        .iter()
        .map(|d| (page_path(d), render_page(d, model, module_name, Some(closure))))
        .collect();
    pages.push((PathBuf::from("README.md"), render_index(model, closure, module_name)));
    pages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::test_support::classify;
    use crate::resolver::public_closure;
    use pretty_assertions::assert_eq;

    const SOURCE: &str = r#"
/**
 * A clickable button.
 *
 * @example
 * <Button size="sm" />
 * @export
 */
export const Button: React.FC<ButtonProps> = (props) => <button />;

/** Button props. */
export interface ButtonProps {
  /**
   * Button size.
   * @default "sm"
   */
  size?: Size;
  label: string;
}

type Size = "sm" | "lg";

/**
 * Formats a label.
 * @param text - Raw text
 * @returns The formatted label
 * @deprecated Use labels directly
 * @export
 */
export function formatLabel(text: string, upper = false): string { return text; }
"#;

    #[test]
    fn test_component_page_sections() {
        let model = classify(SOURCE);
        let closure = public_closure(&model);
        let button = model.lookup("Button").unwrap();
        let page = render_page(&button, &model, Some("ui-kit"), Some(&closure));

        assert!(page.starts_with("# Button\n\nA clickable button.\n\n## Installation"));
        assert!(page.contains("import { Button } from \"ui-kit\";"));
        assert!(page.contains("const Button: React.FC<ButtonProps>;"));
        assert!(page.contains("## Props"));
        assert!(page.contains("| `size` | `Size` | No | `\"sm\"` | Button size. |"));
        assert!(page.contains("| `label` | `string` | Yes |  |  |"));
        assert!(page.contains("## Examples\n\n```tsx\n<Button size=\"sm\" />\n```"));
        assert!(page.contains("## Related Types\n\n- [`ButtonProps`](../types/ButtonProps.md)\n- [`Size`](../types/Size.md)"));
    }

    #[test]
    fn test_function_page_sections() {
        let model = classify(SOURCE);
        let format = model.lookup("formatLabel").unwrap();
        let page = render_page(&format, &model, None, None);

        assert!(page.contains("> **Deprecated:** Use labels directly"));
        assert!(page.contains(&format!("from \"{}\";", DEFAULT_MODULE_NAME)));
        assert!(page.contains("| `text` | `string` |  | Raw text |"));
        assert!(page.contains("| `upper?` |"));
        assert!(page.contains("## Returns\n\n`string` - The formatted label"));
        assert!(!page.contains("## Examples"));
        assert!(!page.contains("## Related Types"));
    }

    #[test]
    fn test_type_page_uses_source_text_and_type_import() {
        let model = classify(SOURCE);
        let props = model.lookup("ButtonProps").unwrap();
        let page = render_page(&props, &model, Some("ui-kit"), None);

        assert!(page.contains("import type { ButtonProps } from \"ui-kit\";"));
        assert!(page.contains("```tsx\ninterface ButtonProps {"));
        assert!(page.contains("## Properties"));
    }

    #[test]
    fn test_generic_union_and_alias_pages_keep_type_parameters() {
        let model = classify(
            r#"
/** An optional value. @export */
export type Maybe<T> = T | null;

/** A boxed list. @export */
export type Boxed<T extends Theme> = Array<T>;

interface Theme { dark: boolean }
"#,
        );
        let closure = public_closure(&model);

        let maybe = model.lookup("Maybe").unwrap();
        let page = render_page(&maybe, &model, None, Some(&closure));
        assert!(page.contains("## Signature\n\n```tsx\ntype Maybe<T> = T | null;\n```"));

        let boxed = model.lookup("Boxed").unwrap();
        let page = render_page(&boxed, &model, None, Some(&closure));
        assert!(page.contains("## Signature\n\n```tsx\ntype Boxed<T extends Theme> = Array<T>;\n```"));
        assert!(page.contains("- [`Theme`](../types/Theme.md)"));
    }

    #[test]
    fn test_related_types_never_name_the_subject() {
        let model = classify(
            r#"
/** @export */
export interface Tree { children: Tree[]; leaf?: Leaf }
interface Leaf { value: string }
"#,
        );
        let closure = public_closure(&model);
        let tree = model.lookup("Tree").unwrap();
        let page = render_page(&tree, &model, None, Some(&closure));
        let related = page.split("## Related Types").nth(1).unwrap();
        assert!(related.contains("Leaf"));
        assert!(!related.contains("Tree"));
    }

    #[test]
    fn test_site_has_one_page_per_closure_member_and_index() {
        let model = classify(SOURCE);
        let closure = public_closure(&model);
        let site = render_site(&model, &closure, Some("ui-kit"));
        let paths: Vec<String> = site
            .iter()
            .map(|(p, _)| p.to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(
            paths,
            vec![
                "types/ButtonProps.md",
                "types/Size.md",
                "functions/formatLabel.md",
                "components/Button.md",
                "README.md"
            ]
        );

        let index = &site.last().unwrap().1;
        assert!(index.starts_with("# ui-kit API\n\n## Components\n\n- [Button](components/Button.md) - A clickable button."));
        assert!(index.contains("## Types"));
        assert!(!index.contains("## Hooks"));
    }
}
