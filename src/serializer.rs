//! Model dumps and artifact writing.
//!
//! The Document Model serializes through `serde` to YAML or JSON for the
//! `inspect` command; rendered artifacts (the declaration module and the
//! documentation pages) are written to disk here as well.

use crate::model::DocModel;
use anyhow::{Context, Result};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

/// Serializes a Document Model to YAML.
///
/// # Errors
///
/// Returns an error if serialization fails.
///
/// # Example
///
/// ```
/// use react_docs_from_source::model::DocModelBuilder;
/// use react_docs_from_source::serializer::serialize_yaml;
///
/// let model = DocModelBuilder::new().build();
/// let yaml = serialize_yaml(&model).unwrap();
/// assert!(yaml.contains("components: {}"));
/// ```
pub fn serialize_yaml(model: &DocModel) -> Result<String> {
    debug!("Serializing document model to YAML");
    serde_yaml::to_string(model).context("Failed to serialize document model to YAML")
}

/// Serializes a Document Model to pretty-printed JSON.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn serialize_json(model: &DocModel) -> Result<String> {
    debug!("Serializing document model to JSON");
    serde_json::to_string_pretty(model).context("Failed to serialize document model to JSON")
}

/// Writes string content to a file, creating parent directories as needed.
///
/// # Errors
///
/// Returns an error if a directory or the file cannot be written.
pub fn write_to_file(content: &str, path: &Path) -> Result<()> {
    debug!("Writing content to file: {}", path.display());

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    fs::write(path, content).with_context(|| format!("Failed to write to file: {}", path.display()))?;

    debug!("Successfully wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}

/// Writes rendered pages below `root`.
///
/// # Returns
///
/// The absolute paths written, in input order.
///
/// # Errors
///
/// Stops at the first page that cannot be written.
pub fn write_pages(root: &Path, pages: &[(PathBuf, String)]) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(pages.len());
    for (relative, content) in pages {
        let path = root.join(relative);
        write_to_file(content, &path)?;
        written.push(path);
    }
    debug!("Wrote {} pages under {}", written.len(), root.display());
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::test_support::classify;
    use tempfile::TempDir;

    #[test]
    fn test_model_dumps() {
        let model = classify(
            r#"
/** @export */
export const Button = memo((props: ButtonProps) => null);
type Size = "sm" | "lg";
"#,
        );

        let yaml = serialize_yaml(&model).unwrap();
        assert!(yaml.contains("Button:"));
        assert!(yaml.contains("kind: functional"));
        assert!(yaml.contains("- memo"));

        let json = serialize_json(&model).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["unions"]["Size"]["members"][1], "\"lg\"");
        assert_eq!(value["components"]["Button"]["prop_type"], "ButtonProps");

        let back: DocModel = serde_json::from_str(&json).unwrap();
        assert_eq!(back, model);
    }

    #[test]
    fn test_write_to_file_creates_parents() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out/types/index.d.ts");
        write_to_file("export {};\n", &path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "export {};\n");
    }

    #[test]
    fn test_write_pages() {
        let temp_dir = TempDir::new().unwrap();
        let pages = vec![
            (PathBuf::from("components/Button.md"), "# Button\n".to_string()),
            (PathBuf::from("README.md"), "# API\n".to_string()),
        ];
        let written = write_pages(temp_dir.path(), &pages).unwrap();
        assert_eq!(written.len(), 2);
        assert_eq!(
            fs::read_to_string(temp_dir.path().join("components/Button.md")).unwrap(),
            "# Button\n"
        );
    }
}
