//! Structured doc-comment parsing.
//!
//! [`DocCommentParser`] understands the TSDoc-style subset used in annotated
//! sources: a summary section, block tags (`@example`, `@param`, `@returns`, ...),
//! modifier tags (`@export`, `@hook`, `@beta`, ...) and inline `{@link}` tags.
//! [`interpret`] wraps it with the fail-silent contract the rest of the crate
//! relies on: a comment that does not parse yields an empty [`CommentInfo`].

use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// Recognized boolean modifiers that drive classification and filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ModifierFlag {
    /// `@export`: the declaration is part of the public documented surface
    ExportEligible,
    /// `@hook`: classify the declaration as a hook regardless of its name
    HookMarker,
}

/// One `@example` block, in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Example {
    pub body: String,
}

/// `@param name - description`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamDoc {
    pub name: String,
    pub description: String,
}

/// Interpreted content of a doc comment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentInfo {
    pub summary: String,
    pub examples: Vec<Example>,
    pub flags: BTreeSet<ModifierFlag>,
    pub params: Vec<ParamDoc>,
    pub returns: Option<String>,
    pub default_value: Option<String>,
    pub deprecated: Option<String>,
    pub remarks: Option<String>,
}

impl CommentInfo {
    pub fn has_flag(&self, flag: ModifierFlag) -> bool {
        self.flags.contains(&flag)
    }

    pub fn is_export_eligible(&self) -> bool {
        self.has_flag(ModifierFlag::ExportEligible)
    }

    /// Description attached to a parameter through `@param`.
    pub fn param_description(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.description.as_str())
    }
}

/// Why a raw comment was rejected by the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommentError {
    NotADocComment,
    Unterminated,
    UnterminatedInlineTag,
}

impl std::fmt::Display for CommentError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            CommentError::NotADocComment => write!(f, "comment does not start with /**"),
            CommentError::Unterminated => write!(f, "comment is not terminated with */"),
            CommentError::UnterminatedInlineTag => write!(f, "inline tag is missing its closing brace"),
        }
    }
}

impl std::error::Error for CommentError {}

/// Tags the parser knows how to split on.
#[derive(Debug, Clone)]
pub struct TagRegistry {
    modifiers: HashSet<String>,
    blocks: HashSet<String>,
}

impl TagRegistry {
    /// Standard TSDoc tags.
    pub fn standard() -> Self {
        let modifiers = [
            "public",
            "internal",
            "alpha",
            "beta",
            "readonly",
            "sealed",
            "virtual",
            "override",
            "eventProperty",
            "packageDocumentation",
        ];
        let blocks = [
            "param",
            "typeParam",
            "returns",
            "remarks",
            "default",
            "defaultValue",
            "deprecated",
            "see",
            "throws",
        ];
        Self {
            modifiers: modifiers.iter().map(|s| s.to_string()).collect(),
            blocks: blocks.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn with_modifier(mut self, tag: &str) -> Self {
        self.modifiers.insert(tag.to_string());
        self
    }

    pub fn with_block(mut self, tag: &str) -> Self {
        self.blocks.insert(tag.to_string());
        self
    }

    pub fn is_modifier(&self, tag: &str) -> bool {
        self.modifiers.contains(tag)
    }

    pub fn is_block(&self, tag: &str) -> bool {
        self.blocks.contains(tag)
    }
}

/// A block section: the tag that opened it and its raw lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockSection {
    pub tag: String,
    pub lines: Vec<String>,
}

/// Structural parse of a doc comment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedComment {
    pub summary_lines: Vec<String>,
    pub blocks: Vec<BlockSection>,
    pub modifiers: Vec<String>,
}

enum Segment<'a> {
    Text(&'a str),
    Tag(&'a str),
}

/// Parser for `/** ... */` comments driven by a [`TagRegistry`].
pub struct DocCommentParser {
    registry: TagRegistry,
}

impl Default for DocCommentParser {
    fn default() -> Self {
        Self::new(
            TagRegistry::standard()
                .with_modifier("export")
                .with_modifier("hook")
                .with_block("example"),
        )
    }
}

impl DocCommentParser {
    pub fn new(registry: TagRegistry) -> Self {
        Self { registry }
    }

    /// Splits a raw comment into summary lines, block sections and modifiers.
    ///
    /// # Errors
    ///
    /// Returns an error when the text is not a terminated `/** */` comment.
    pub fn parse(&self, raw: &str) -> Result<ParsedComment, CommentError> {
        let trimmed = raw.trim();
        let body = trimmed
            .strip_prefix("/**")
            .ok_or(CommentError::NotADocComment)?;
        let body = body.strip_suffix("*/").ok_or(CommentError::Unterminated)?;

        let mut parsed = ParsedComment::default();
        let mut current: Option<BlockSection> = None;
        let mut in_fence = false;

        for raw_line in body.lines() {
            let line = strip_gutter(raw_line);

            if line.trim_start().starts_with("```") {
                in_fence = !in_fence;
                push_line(&mut parsed, &mut current, line.to_string());
                continue;
            }
            if in_fence {
                push_line(&mut parsed, &mut current, line.to_string());
                continue;
            }

            let mut buffer = String::new();
            for segment in scan_line(line) {
                match segment {
                    Segment::Text(text) => buffer.push_str(text),
                    Segment::Tag(tag) if self.registry.is_modifier(tag) => {
                        parsed.modifiers.push(tag.to_string());
                    }
                    Segment::Tag(tag) => {
                        if !self.registry.is_block(tag) {
                            debug!("Unknown block tag @{} treated as a block", tag);
                        }
                        if !buffer.trim().is_empty() {
                            push_line(&mut parsed, &mut current, std::mem::take(&mut buffer));
                        }
                        buffer.clear();
                        if let Some(done) = current.take() {
                            parsed.blocks.push(done);
                        }
                        current = Some(BlockSection {
                            tag: tag.to_string(),
                            lines: Vec::new(),
                        });
                    }
                }
            }
            let has_text = !buffer.trim().is_empty();
            let opened_block_on_line = current.as_ref().map(|c| c.lines.is_empty()).unwrap_or(false);
            if has_text || !opened_block_on_line {
                push_line(&mut parsed, &mut current, buffer);
            }
        }

        if let Some(done) = current.take() {
            parsed.blocks.push(done);
        }
        Ok(parsed)
    }
}

fn push_line(parsed: &mut ParsedComment, current: &mut Option<BlockSection>, line: String) {
    match current {
        Some(section) => section.lines.push(line),
        None => parsed.summary_lines.push(line),
    }
}

/// Removes leading whitespace and the `*` gutter (plus one following space).
fn strip_gutter(line: &str) -> &str {
    let trimmed = line.trim_start();
    match trimmed.strip_prefix('*') {
        Some(rest) => rest.strip_prefix(' ').unwrap_or(rest),
        None => trimmed,
    }
}

/// Splits one line into text and `@tag` segments. Tags inside backtick code
/// spans or inline `{@...}` tags are left as text.
fn scan_line(line: &str) -> Vec<Segment<'_>> {
    let bytes = line.as_bytes();
    let mut segments = Vec::new();
    let mut text_start = 0;
    let mut inline_depth = 0usize;
    let mut in_code = false;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'`' => in_code = !in_code,
            b'{' if bytes.get(i + 1) == Some(&b'@') => inline_depth += 1,
            b'}' if inline_depth > 0 => inline_depth -= 1,
            b'@' if !in_code
                && inline_depth == 0
                && (i == 0 || bytes[i - 1].is_ascii_whitespace())
                && bytes.get(i + 1).map(|b| b.is_ascii_alphabetic()).unwrap_or(false) =>
            {
                let mut j = i + 1;
                while j < bytes.len() && bytes[j].is_ascii_alphanumeric() {
                    j += 1;
                }
                segments.push(Segment::Text(&line[text_start..i]));
                segments.push(Segment::Tag(&line[i + 1..j]));
                text_start = j;
                i = j;
                continue;
            }
            _ => {}
        }
        i += 1;
    }
    segments.push(Segment::Text(&line[text_start..]));
    segments
}

/// Replaces inline tags with their display text: `{@link Foo | the foo}` → `the foo`.
fn render_inline(text: &str) -> Result<String, CommentError> {
    let mut out = String::new();
    let mut rest = text;

    while let Some(start) = rest.find("{@") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let end = after.find('}').ok_or(CommentError::UnterminatedInlineTag)?;
        let body = &after[..end];
        let (tag, content) = body.split_once(char::is_whitespace).unwrap_or((body, ""));
        let content = content.trim();
        match tag {
            "link" | "linkcode" | "linkplain" => {
                let shown = content
                    .split_once('|')
                    .map(|(_, label)| label.trim())
                    .unwrap_or(content);
                out.push_str(shown);
            }
            "inheritDoc" => {}
            _ => out.push_str(content),
        }
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

/// Joins lines into prose: lines of a paragraph with a space, paragraphs with a
/// blank line.
fn join_prose(lines: &[String]) -> String {
    let mut paragraphs: Vec<String> = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in lines {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            if !current.is_empty() {
                paragraphs.push(current.join(" "));
                current.clear();
            }
        } else {
            current.push(trimmed);
        }
    }
    if !current.is_empty() {
        paragraphs.push(current.join(" "));
    }
    paragraphs.join("\n\n")
}

/// Keeps line structure (code), dropping surrounding blank lines and common indentation.
fn join_verbatim(lines: &[String]) -> String {
    let start = lines.iter().position(|l| !l.trim().is_empty());
    let end = lines.iter().rposition(|l| !l.trim().is_empty());
    let (Some(start), Some(end)) = (start, end) else {
        return String::new();
    };
    let kept = &lines[start..=end];
    let indent = kept
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start().len())
        .min()
        .unwrap_or(0);

    kept.iter()
        .map(|l| if l.len() >= indent { l[indent..].trim_end() } else { l.trim() })
        .collect::<Vec<_>>()
        .join("\n")
}

fn build_info(parsed: &ParsedComment) -> Result<CommentInfo, CommentError> {
    let mut info = CommentInfo {
        summary: render_inline(&join_prose(&parsed.summary_lines))?,
        ..CommentInfo::default()
    };

    for modifier in &parsed.modifiers {
        match modifier.as_str() {
            "export" => {
                info.flags.insert(ModifierFlag::ExportEligible);
            }
            "hook" => {
                info.flags.insert(ModifierFlag::HookMarker);
            }
            _ => {}
        }
    }

    for block in &parsed.blocks {
        match block.tag.as_str() {
            "example" => info.examples.push(Example {
                body: join_verbatim(&block.lines),
            }),
            "param" => {
                let text = render_inline(&join_prose(&block.lines))?;
                let (name, rest) = text.split_once(char::is_whitespace).unwrap_or((text.as_str(), ""));
                let description = rest.trim_start();
                let description = description.strip_prefix('-').unwrap_or(description).trim();
                info.params.push(ParamDoc {
                    name: name.to_string(),
                    description: description.to_string(),
                });
            }
            "returns" | "return" => info.returns = Some(render_inline(&join_prose(&block.lines))?),
            "default" | "defaultValue" => info.default_value = Some(join_prose(&block.lines)),
            "deprecated" => info.deprecated = Some(render_inline(&join_prose(&block.lines))?),
            "remarks" => info.remarks = Some(render_inline(&join_prose(&block.lines))?),
            _ => {}
        }
    }

    Ok(info)
}

/// Interprets a raw comment string.
///
/// Never fails: any comment the structured parser rejects (plain `//` prose,
/// unterminated blocks, broken inline tags) yields an empty summary, no
/// examples and no flags.
pub fn interpret(raw: &str) -> CommentInfo {
    if raw.trim().is_empty() {
        return CommentInfo::default();
    }
    let parser = DocCommentParser::default();
    match parser.parse(raw).and_then(|parsed| build_info(&parsed)) {
        Ok(info) => info,
        Err(e) => {
            debug!("Ignoring unparseable comment: {}", e);
            CommentInfo::default()
        }
    }
}
