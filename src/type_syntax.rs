//! Small tokenizer and parser for TypeScript type text.
//!
//! The classifier and the dependency resolver work on type text captured from
//! source (`React.FC<ButtonProps>`, `(id: string) => Promise<User>`). Instead of
//! matching that text with ad hoc patterns, it is tokenized once and parsed into
//! typed shapes ([`TypeShape`], [`CallSignature`], [`ComponentTypeMatch`]) that the
//! callers dispatch on.

use crate::model::{ComponentKind, Parameter};

/// A lexical token of type text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Ident(String),
    StringLit(String),
    Number(String),
    Arrow,
    Ellipsis,
    Punct(char),
}

/// A token with the byte offset where it starts in the tokenized text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spanned {
    pub token: Token,
    pub start: usize,
    pub end: usize,
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Splits type text into tokens. Whitespace and comments are dropped; unknown
/// characters become single-character punctuation tokens.
pub fn tokenize(text: &str) -> Vec<Spanned> {
    let mut tokens = Vec::new();
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let end_of = |i: usize| chars.get(i).map(|(o, _)| *o).unwrap_or(text.len());
    let mut i = 0;

    while i < chars.len() {
        let (start, c) = chars[i];

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        if c == '/' && matches!(chars.get(i + 1), Some((_, '/'))) {
            while i < chars.len() && chars[i].1 != '\n' {
                i += 1;
            }
            continue;
        }

        if c == '/' && matches!(chars.get(i + 1), Some((_, '*'))) {
            i += 2;
            while i < chars.len() && !(chars[i].1 == '*' && matches!(chars.get(i + 1), Some((_, '/')))) {
                i += 1;
            }
            i = (i + 2).min(chars.len());
            continue;
        }

        if is_ident_start(c) {
            let mut j = i + 1;
            while j < chars.len() && is_ident_continue(chars[j].1) {
                j += 1;
            }
            tokens.push(Spanned {
                token: Token::Ident(text[start..end_of(j)].to_string()),
                start,
                end: end_of(j),
            });
            i = j;
            continue;
        }

        if c.is_ascii_digit() {
            let mut j = i + 1;
            while j < chars.len() && (chars[j].1.is_ascii_alphanumeric() || chars[j].1 == '.' || chars[j].1 == '_') {
                j += 1;
            }
            tokens.push(Spanned {
                token: Token::Number(text[start..end_of(j)].to_string()),
                start,
                end: end_of(j),
            });
            i = j;
            continue;
        }

        if c == '"' || c == '\'' || c == '`' {
            let mut j = i + 1;
            while j < chars.len() && chars[j].1 != c {
                if chars[j].1 == '\\' {
                    j += 1;
                }
                j += 1;
            }
            let close = (j + 1).min(chars.len());
            tokens.push(Spanned {
                token: Token::StringLit(text[start..end_of(close)].to_string()),
                start,
                end: end_of(close),
            });
            i = close;
            continue;
        }

        if c == '=' && matches!(chars.get(i + 1), Some((_, '>'))) {
            tokens.push(Spanned { token: Token::Arrow, start, end: end_of(i + 2) });
            i += 2;
            continue;
        }

        if c == '.'
            && matches!(chars.get(i + 1), Some((_, '.')))
            && matches!(chars.get(i + 2), Some((_, '.')))
        {
            tokens.push(Spanned { token: Token::Ellipsis, start, end: end_of(i + 3) });
            i += 3;
            continue;
        }

        tokens.push(Spanned { token: Token::Punct(c), start, end: end_of(i + 1) });
        i += 1;
    }

    tokens
}

fn opens(token: &Token) -> bool {
    matches!(token, Token::Punct('<') | Token::Punct('(') | Token::Punct('[') | Token::Punct('{'))
}

fn closes(token: &Token) -> bool {
    matches!(token, Token::Punct('>') | Token::Punct(')') | Token::Punct(']') | Token::Punct('}'))
}

/// Splits `text` on `separator` wherever it occurs outside of any bracket pair.
///
/// Segments are trimmed and empty segments dropped, so a leading `|` in a union
/// or a trailing comma in an argument list produces no extra entries.
pub fn split_top_level(text: &str, separator: char) -> Vec<String> {
    let tokens = tokenize(text);
    let mut parts = Vec::new();
    let mut depth: i32 = 0;
    let mut segment_start = 0;

    for spanned in &tokens {
        if opens(&spanned.token) {
            depth += 1;
        } else if closes(&spanned.token) {
            depth = (depth - 1).max(0);
        } else if depth == 0 && spanned.token == Token::Punct(separator) {
            parts.push(text[segment_start..spanned.start].trim().to_string());
            segment_start = spanned.end;
        }
    }
    parts.push(text[segment_start..].trim().to_string());

    parts.into_iter().filter(|p| !p.is_empty()).collect()
}

/// Index of the token closing the bracket opened at `open_index`.
fn matching_close(tokens: &[Spanned], open_index: usize) -> Option<usize> {
    let mut depth = 0;
    for (index, spanned) in tokens.iter().enumerate().skip(open_index) {
        if opens(&spanned.token) {
            depth += 1;
        } else if closes(&spanned.token) {
            depth -= 1;
            if depth == 0 {
                return Some(index);
            }
        }
    }
    None
}

/// Removes a leading `:` left over from an annotation (`: Foo` → `Foo`).
pub fn strip_annotation(text: &str) -> &str {
    let trimmed = text.trim();
    trimmed.strip_prefix(':').map(str::trim).unwrap_or(trimmed)
}

/// Removes redundant outer parentheses: `((a: A) => B)` → `(a: A) => B`.
pub fn strip_outer_parens(text: &str) -> &str {
    let mut current = text.trim();
    loop {
        let tokens = tokenize(current);
        let wrapped = matches!(tokens.first(), Some(Spanned { token: Token::Punct('('), .. }))
            && matching_close(&tokens, 0) == Some(tokens.len() - 1);
        if !wrapped {
            return current;
        }
        current = current[tokens[0].end..tokens[tokens.len() - 1].start].trim();
    }
}

/// Collapses every run of whitespace (including newlines) into one space.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Wraps a union or function type in parentheses so it can take a `[]` suffix.
pub fn parenthesize_compound(text: &str) -> String {
    let compound = split_top_level(text, '|').len() > 1
        || split_top_level(text, '&').len() > 1
        || tokenize(text).iter().any(|s| s.token == Token::Arrow);
    if compound {
        format!("({})", text)
    } else {
        text.to_string()
    }
}

/// Joins alternative types into a union, dropping duplicates.
pub fn union_of(types: &[String]) -> String {
    let mut parts: Vec<String> = Vec::new();
    for text in types {
        for part in split_top_level(text, '|') {
            if !parts.contains(&part) {
                parts.push(part);
            }
        }
    }
    parts.join(" | ")
}

/// A generic type application: a (possibly dotted) name plus its type arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeShape {
    /// Full written name, e.g. `React.FC`
    pub name: String,
    /// Raw text of each type argument, in order
    pub args: Vec<String>,
}

impl TypeShape {
    /// Parses `Name`, `Ns.Name` or `Ns.Name<A, B>` covering the whole text.
    /// Returns `None` for anything else (unions, function types, literals).
    pub fn parse(text: &str) -> Option<TypeShape> {
        let text = strip_outer_parens(strip_annotation(text));
        let tokens = tokenize(text);
        let mut index = 0;
        let mut segments = Vec::new();

        loop {
            match tokens.get(index).map(|s| &s.token) {
                Some(Token::Ident(name)) => segments.push(name.clone()),
                _ => return None,
            }
            index += 1;
            if matches!(tokens.get(index).map(|s| &s.token), Some(Token::Punct('.'))) {
                index += 1;
                continue;
            }
            break;
        }

        let name = segments.join(".");
        match tokens.get(index).map(|s| &s.token) {
            None => Some(TypeShape { name, args: Vec::new() }),
            Some(Token::Punct('<')) => {
                let close = matching_close(&tokens, index)?;
                if close != tokens.len() - 1 {
                    return None;
                }
                let inner = &text[tokens[index].end..tokens[close].start];
                Some(TypeShape {
                    name,
                    args: split_top_level(inner, ','),
                })
            }
            Some(_) => None,
        }
    }

    /// Last dotted segment of the name: `React.FC` → `FC`.
    pub fn base_name(&self) -> &str {
        base_name(&self.name)
    }

    pub fn arg(&self, index: usize) -> Option<String> {
        self.args.get(index).cloned()
    }
}

/// Last dotted segment of a possibly qualified name.
pub fn base_name(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name).trim()
}

/// Parameters and return type of a function type `(a: A, b?: B) => R`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSignature {
    pub type_parameters: Option<String>,
    pub parameters: Vec<Parameter>,
    pub return_type: String,
}

impl CallSignature {
    /// Parses a call-signature type, optionally generic (`<T>(x: T) => T`).
    pub fn parse(text: &str) -> Option<CallSignature> {
        let text = strip_outer_parens(strip_annotation(text));
        let tokens = tokenize(text);
        let mut index = 0;
        let mut type_parameters = None;

        if matches!(tokens.first().map(|s| &s.token), Some(Token::Punct('<'))) {
            let close = matching_close(&tokens, 0)?;
            type_parameters = Some(text[tokens[0].start..tokens[close].end].to_string());
            index = close + 1;
        }

        if !matches!(tokens.get(index).map(|s| &s.token), Some(Token::Punct('('))) {
            return None;
        }
        let close = matching_close(&tokens, index)?;
        let arrow = tokens.get(close + 1)?;
        if arrow.token != Token::Arrow {
            return None;
        }

        let params_text = &text[tokens[index].end..tokens[close].start];
        let return_type = text[arrow.end..].trim().to_string();
        if return_type.is_empty() {
            return None;
        }

        Some(CallSignature {
            type_parameters,
            parameters: parse_parameter_list(params_text),
            return_type,
        })
    }
}

/// Parses the inside of a parameter list: `a: A, b?: B, ...rest: C[]`.
pub fn parse_parameter_list(text: &str) -> Vec<Parameter> {
    split_top_level(text, ',')
        .into_iter()
        .map(|part| parse_parameter(&part))
        .collect()
}

fn parse_parameter(text: &str) -> Parameter {
    let (binding, default_value) = match split_top_level_once(text, '=') {
        Some((left, right)) => (left, Some(right)),
        None => (text.to_string(), None),
    };
    let (name_part, type_text) = match split_top_level_once(&binding, ':') {
        Some((left, right)) => (left, Some(right)),
        None => (binding.clone(), None),
    };
    let optional = name_part.ends_with('?') || default_value.is_some();
    Parameter {
        name: name_part.trim_end_matches('?').trim().to_string(),
        type_text,
        default_value,
        optional,
    }
}

/// Splits at the first top-level `separator` (ignoring `=>` arrows).
fn split_top_level_once(text: &str, separator: char) -> Option<(String, String)> {
    let tokens = tokenize(text);
    let mut depth: i32 = 0;
    for spanned in &tokens {
        if opens(&spanned.token) {
            depth += 1;
        } else if closes(&spanned.token) {
            depth -= 1;
        } else if depth == 0 && spanned.token == Token::Punct(separator) {
            return Some((
                text[..spanned.start].trim().to_string(),
                text[spanned.end..].trim().to_string(),
            ));
        }
    }
    None
}

/// Capitalized identifiers in `text` that may name a declared type.
///
/// Skips members of qualified names (`React.ReactNode` yields only `React`),
/// string literal contents, and identifiers used as object keys or parameter
/// names (followed by `:` or `?:`). The true branch of a conditional type
/// (`? Foo :`) is a type, not a key. Order of first appearance is kept.
pub fn referenced_type_names(text: &str) -> Vec<String> {
    let tokens = tokenize(text);
    let mut names: Vec<String> = Vec::new();
    // Unclosed conditional `?` per bracket depth; a `:` at that depth ends a branch.
    let mut pending: Vec<usize> = vec![0];

    for (index, spanned) in tokens.iter().enumerate() {
        let next = tokens.get(index + 1).map(|s| &s.token);
        let after_next = tokens.get(index + 2).map(|s| &s.token);

        let name = match &spanned.token {
            Token::Ident(name) => name,
            token if opens(token) => {
                pending.push(0);
                continue;
            }
            token if closes(token) => {
                if pending.len() > 1 {
                    pending.pop();
                }
                continue;
            }
            Token::Punct('?') => {
                let is_marker = matches!(
                    next,
                    None | Some(Token::Punct(':' | ',' | ')' | ']' | '>' | '=' | ';'))
                );
                if !is_marker {
                    if let Some(open) = pending.last_mut() {
                        *open += 1;
                    }
                }
                continue;
            }
            Token::Punct(':') => {
                if let Some(open) = pending.last_mut() {
                    *open = open.saturating_sub(1);
                }
                continue;
            }
            _ => continue,
        };

        if !name.chars().next().map(|c| c.is_ascii_uppercase()).unwrap_or(false) {
            continue;
        }
        if index > 0 && tokens[index - 1].token == Token::Punct('.') {
            continue;
        }
        let in_conditional = pending.last().map(|open| *open > 0).unwrap_or(false);
        let is_key = !in_conditional
            && (matches!(next, Some(Token::Punct(':')))
                || (matches!(next, Some(Token::Punct('?'))) && matches!(after_next, Some(Token::Punct(':')))));
        if is_key {
            continue;
        }
        if !names.contains(name) {
            names.push(name.clone());
        }
    }

    names
}

/// What a component type annotation says about the component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentTypeMatch {
    pub kind: ComponentKind,
    pub prop_type: Option<String>,
    pub state_type: Option<String>,
    pub ref_type: Option<String>,
    /// Wrappers implied by the type itself (`MemoExoticComponent` → `memo`)
    pub wrappers: Vec<String>,
}

impl ComponentTypeMatch {
    fn new(kind: ComponentKind) -> Self {
        Self {
            kind,
            prop_type: None,
            state_type: None,
            ref_type: None,
            wrappers: Vec::new(),
        }
    }
}

/// Matches a declared type such as `React.FC<Props>` against the known React
/// component types.
pub fn match_component_type(text: &str) -> Option<ComponentTypeMatch> {
    let shape = TypeShape::parse(text)?;

    match shape.base_name() {
        "FC" | "FunctionComponent" | "VFC" | "VoidFunctionComponent" | "ComponentType" => {
            let mut matched = ComponentTypeMatch::new(ComponentKind::Functional);
            matched.prop_type = shape.arg(0);
            Some(matched)
        }
        "NamedExoticComponent" => {
            let mut matched = ComponentTypeMatch::new(ComponentKind::Functional);
            matched.prop_type = shape.arg(0);
            matched.wrappers.push("memo".to_string());
            Some(matched)
        }
        "ComponentClass" => {
            let mut matched = ComponentTypeMatch::new(ComponentKind::Class);
            matched.prop_type = shape.arg(0);
            matched.state_type = shape.arg(1);
            Some(matched)
        }
        "ForwardRefRenderFunction" => {
            let mut matched = ComponentTypeMatch::new(ComponentKind::ForwardRef);
            matched.ref_type = shape.arg(0);
            matched.prop_type = shape.arg(1);
            Some(matched)
        }
        "ForwardRefExoticComponent" => {
            let mut matched = ComponentTypeMatch::new(ComponentKind::ForwardRef);
            let inner = shape.arg(0).unwrap_or_default();
            let mut loose_parts = Vec::new();
            for part in split_top_level(&inner, '&') {
                match TypeShape::parse(&part) {
                    Some(p) if p.base_name() == "PropsWithoutRef" => matched.prop_type = p.arg(0),
                    Some(p) if p.base_name() == "RefAttributes" => matched.ref_type = p.arg(0),
                    _ => loose_parts.push(part),
                }
            }
            if matched.prop_type.is_none() && !loose_parts.is_empty() {
                matched.prop_type = Some(loose_parts.join(" & "));
            }
            Some(matched)
        }
        "MemoExoticComponent" => {
            let mut matched = match_component_type(&shape.arg(0)?)?;
            matched.wrappers.insert(0, "memo".to_string());
            Some(matched)
        }
        _ => None,
    }
}

/// Whether a class `extends` target names a React component base class.
pub fn is_component_base_class(text: &str) -> bool {
    matches!(base_name(text), "Component" | "PureComponent")
}

/// Whether a wrapper call name is a ref-forwarding wrapper.
pub fn is_ref_forwarding_wrapper(name: &str) -> bool {
    base_name(name) == "forwardRef"
}

/// Whether a wrapper call name is a memoization wrapper.
pub fn is_memo_wrapper(name: &str) -> bool {
    base_name(name) == "memo"
}

/// Whether `name` carries hook semantics: `use` followed by nothing or an
/// uppercase letter.
pub fn is_hook_name(name: &str) -> bool {
    match name.strip_prefix("use") {
        Some(rest) => rest.chars().next().map(|c| c.is_ascii_uppercase()).unwrap_or(true),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_arrow_and_generics() {
        let tokens: Vec<Token> = tokenize("(a: A<B>) => C").into_iter().map(|s| s.token).collect();
        assert_eq!(
            tokens,
            vec![
                Token::Punct('('),
                Token::Ident("a".into()),
                Token::Punct(':'),
                Token::Ident("A".into()),
                Token::Punct('<'),
                Token::Ident("B".into()),
                Token::Punct('>'),
                Token::Punct(')'),
                Token::Arrow,
                Token::Ident("C".into()),
            ]
        );
    }

    #[test]
    fn test_split_top_level_respects_nesting() {
        assert_eq!(
            split_top_level("Record<string, number>, (a: A, b: B) => void, [X, Y]", ','),
            vec!["Record<string, number>", "(a: A, b: B) => void", "[X, Y]"]
        );
        assert_eq!(split_top_level("| 'a' | 'b'", '|'), vec!["'a'", "'b'"]);
    }

    #[test]
    fn test_split_ignores_separators_inside_strings() {
        assert_eq!(split_top_level("'a,b', C", ','), vec!["'a,b'", "C"]);
    }

    #[test]
    fn test_type_shape_parse() {
        let shape = TypeShape::parse(": React.FC<ButtonProps>").unwrap();
        assert_eq!(shape.name, "React.FC");
        assert_eq!(shape.base_name(), "FC");
        assert_eq!(shape.args, vec!["ButtonProps"]);

        let nested = TypeShape::parse("Map<string, Array<User>>").unwrap();
        assert_eq!(nested.args, vec!["string", "Array<User>"]);

        assert!(TypeShape::parse("A | B").is_none());
        assert!(TypeShape::parse("(a: A) => B").is_none());
        assert_eq!(TypeShape::parse("Plain").unwrap().args.len(), 0);
    }

    #[test]
    fn test_call_signature_parse() {
        let sig = CallSignature::parse("(id: string, opts?: Options) => Promise<User>").unwrap();
        assert_eq!(sig.return_type, "Promise<User>");
        assert_eq!(sig.parameters.len(), 2);
        assert_eq!(sig.parameters[0].name, "id");
        assert_eq!(sig.parameters[0].type_text.as_deref(), Some("string"));
        assert!(sig.parameters[1].optional);
        assert_eq!(sig.parameters[1].name, "opts");

        let generic = CallSignature::parse("<T>(value: T) => T[]").unwrap();
        assert_eq!(generic.type_parameters.as_deref(), Some("<T>"));
        assert_eq!(generic.return_type, "T[]");

        let nested = CallSignature::parse("((cb: (x: number) => void) => () => void)").unwrap();
        assert_eq!(nested.parameters[0].type_text.as_deref(), Some("(x: number) => void"));
        assert_eq!(nested.return_type, "() => void");

        assert!(CallSignature::parse("React.FC<Props>").is_none());
    }

    #[test]
    fn test_parameter_defaults() {
        let params = parse_parameter_list("size: number = 3, label = 'x'");
        assert_eq!(params[0].default_value.as_deref(), Some("3"));
        assert!(params[0].optional);
        assert_eq!(params[1].type_text, None);
        assert_eq!(params[1].default_value.as_deref(), Some("'x'"));
    }

    #[test]
    fn test_referenced_type_names() {
        assert_eq!(
            referenced_type_names("{ Label: string; item?: Item; kind: 'Big' } & React.ReactNode"),
            vec!["Item", "React"]
        );
        assert_eq!(
            referenced_type_names("(Props: A, b: Array<B>) => Promise<C>"),
            vec!["A", "Array", "B", "Promise", "C"]
        );
        assert!(referenced_type_names("string | number").is_empty());
    }

    #[test]
    fn test_referenced_type_names_in_conditional_types() {
        assert_eq!(
            referenced_type_names("T extends string ? Foo : Bar"),
            vec!["T", "Foo", "Bar"]
        );
        assert_eq!(
            referenced_type_names("T extends A ? B extends C ? D : E : F"),
            vec!["T", "A", "B", "C", "D", "E", "F"]
        );
        assert_eq!(referenced_type_names("[First: Head, rest?: Tail]"), vec!["Head", "Tail"]);
    }

    #[test]
    fn test_match_component_type_functional() {
        let matched = match_component_type("React.FC<ButtonProps>").unwrap();
        assert_eq!(matched.kind, ComponentKind::Functional);
        assert_eq!(matched.prop_type.as_deref(), Some("ButtonProps"));
        assert!(matched.wrappers.is_empty());
        assert!(match_component_type("FC").unwrap().prop_type.is_none());
    }

    #[test]
    fn test_match_component_type_forward_ref() {
        let matched = match_component_type(
            "React.ForwardRefExoticComponent<React.PropsWithoutRef<InputProps> & React.RefAttributes<HTMLInputElement>>",
        )
        .unwrap();
        assert_eq!(matched.kind, ComponentKind::ForwardRef);
        assert_eq!(matched.prop_type.as_deref(), Some("InputProps"));
        assert_eq!(matched.ref_type.as_deref(), Some("HTMLInputElement"));
    }

    #[test]
    fn test_match_component_type_memo_and_class() {
        let memo = match_component_type("React.MemoExoticComponent<React.FC<P>>").unwrap();
        assert_eq!(memo.kind, ComponentKind::Functional);
        assert_eq!(memo.wrappers, vec!["memo"]);

        let class = match_component_type("ComponentClass<P, S>").unwrap();
        assert_eq!(class.kind, ComponentKind::Class);
        assert_eq!(class.state_type.as_deref(), Some("S"));

        assert!(match_component_type("Record<string, P>").is_none());
    }

    #[test]
    fn test_name_predicates() {
        assert!(is_hook_name("useToggle"));
        assert!(is_hook_name("use"));
        assert!(!is_hook_name("user"));
        assert!(!is_hook_name("fetchUser"));
        assert!(is_component_base_class("React.PureComponent"));
        assert!(!is_component_base_class("Base"));
        assert!(is_ref_forwarding_wrapper("React.forwardRef"));
        assert!(is_memo_wrapper("memo"));
    }

    #[test]
    fn test_union_and_parenthesize() {
        assert_eq!(
            union_of(&["string".to_string(), "number | string".to_string()]),
            "string | number"
        );
        assert_eq!(parenthesize_compound("A | B"), "(A | B)");
        assert_eq!(parenthesize_compound("() => void"), "(() => void)");
        assert_eq!(parenthesize_compound("Array<A | B>"), "Array<A | B>");
        assert_eq!(normalize_whitespace("{\n  a: string;\n}"), "{ a: string; }");
    }

    #[test]
    fn test_strip_helpers() {
        assert_eq!(strip_annotation(": Foo<Bar>"), "Foo<Bar>");
        assert_eq!(strip_outer_parens("((A | B))"), "A | B");
        assert_eq!(strip_outer_parens("(A) | (B)"), "(A) | (B)");
    }
}
