//! Minimal Markdown builder used by the documentation renderer.

/// Accumulates Markdown blocks separated by blank lines.
#[derive(Debug, Default, Clone)]
pub struct MarkdownBuilder {
    blocks: Vec<String>,
}

impl MarkdownBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// `# text` with `level` hashes (clamped to 1..=6).
    pub fn title(&mut self, level: usize, text: &str) -> &mut Self {
        let level = level.clamp(1, 6);
        self.blocks.push(format!("{} {}", "#".repeat(level), text.trim()));
        self
    }

    /// A prose paragraph. Empty text adds nothing.
    pub fn paragraph(&mut self, text: &str) -> &mut Self {
        let text = text.trim();
        if !text.is_empty() {
            self.blocks.push(text.to_string());
        }
        self
    }

    /// `> text`, one quote marker per line.
    pub fn quote(&mut self, text: &str) -> &mut Self {
        let quoted: Vec<String> = text
            .trim()
            .lines()
            .map(|line| if line.is_empty() { ">".to_string() } else { format!("> {}", line) })
            .collect();
        if !quoted.is_empty() {
            self.blocks.push(quoted.join("\n"));
        }
        self
    }

    /// Fenced code block. The fence grows when the code itself contains one.
    pub fn code_block(&mut self, language: &str, code: &str) -> &mut Self {
        let mut fence = "```".to_string();
        while code.contains(&fence) {
            fence.push('`');
        }
        self.blocks
            .push(format!("{}{}\n{}\n{}", fence, language, code.trim_end(), fence));
        self
    }

    /// Table with a header row. Cells are escaped for pipes and line breaks.
    pub fn table(&mut self, headers: &[&str], rows: &[Vec<String>]) -> &mut Self {
        if rows.is_empty() {
            return self;
        }
        let mut lines = Vec::with_capacity(rows.len() + 2);
        lines.push(format!("| {} |", headers.join(" | ")));
        lines.push(format!(
            "|{}|",
            headers.iter().map(|_| "---").collect::<Vec<_>>().join("|")
        ));
        for row in rows {
            let cells: Vec<String> = (0..headers.len())
                .map(|i| row.get(i).map(|c| escape_cell(c)).unwrap_or_default())
                .collect();
            lines.push(format!("| {} |", cells.join(" | ")));
        }
        self.blocks.push(lines.join("\n"));
        self
    }

    /// Bulleted list.
    pub fn list<I, S>(&mut self, items: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let lines: Vec<String> = items
            .into_iter()
            .map(|item| format!("- {}", item.as_ref()))
            .collect();
        if !lines.is_empty() {
            self.blocks.push(lines.join("\n"));
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// The document, ending in a single newline.
    pub fn build(&self) -> String {
        let mut out = self.blocks.join("\n\n");
        out.push('\n');
        out
    }
}

/// Escapes text for use inside a table cell.
pub fn escape_cell(text: &str) -> String {
    text.trim()
        .replace('|', "\\|")
        .replace("\r\n", "\n")
        .replace('\n', "<br>")
}

/// Inline code span, widening the backtick run when the text contains one.
pub fn inline_code(text: &str) -> String {
    if text.contains('`') {
        format!("`` {} ``", text)
    } else {
        format!("`{}`", text)
    }
}

/// `[text](target)`
pub fn link(text: &str, target: &str) -> String {
    format!("[{}]({})", text, target)
}
