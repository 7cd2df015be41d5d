use crate::classifier::classify_files;
use crate::model::DocModel;
use crate::parser::ParsedFile;
use crate::renderer::declarations::render_module;
use crate::renderer::docs::render_site;
use crate::resolver::public_closure;
use crate::scanner::FileScanner;
use crate::serializer::{serialize_json, serialize_yaml, write_pages, write_to_file};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};

/// React Docs Generator - Markdown reference docs and a public declaration module from annotated React sources
#[derive(Parser, Debug)]
#[command(name = "react-docs-from-source")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write the declaration module (.d.ts) for the public surface
    Types {
        /// Entry file (or source directory) of the library
        #[arg(value_name = "ENTRY")]
        entry: PathBuf,

        /// Output file
        #[arg(short = 'o', long = "output", value_name = "FILE")]
        output: PathBuf,

        /// Wrap the output in `declare module "<MODULE_NAME>"`
        #[arg(short = 'm', long = "module-name")]
        module_name: Option<String>,
    },

    /// Write one Markdown page per public declaration plus an index
    Docs {
        /// Entry file (or source directory) of the library
        #[arg(value_name = "ENTRY")]
        entry: PathBuf,

        /// Output directory
        #[arg(short = 'o', long = "output", value_name = "DIR")]
        output: PathBuf,

        /// Package name used in import snippets
        #[arg(short = 'm', long = "module-name")]
        module_name: Option<String>,
    },

    /// Dump the Document Model
    Inspect {
        /// Entry file (or source directory) of the library
        #[arg(value_name = "ENTRY")]
        entry: PathBuf,

        /// Output format (yaml or json)
        #[arg(short = 'f', long = "format", value_enum, default_value = "yaml")]
        format: OutputFormat,

        /// Output file path (if not specified, outputs to stdout)
        #[arg(short = 'o', long = "output", value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

impl Command {
    pub fn entry(&self) -> &Path {
        match self {
            Command::Types { entry, .. } | Command::Docs { entry, .. } | Command::Inspect { entry, .. } => entry,
        }
    }
}

/// Output format options
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    /// YAML format
    Yaml,
    /// JSON format
    Json,
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    let entry = args.command.entry();
    if !entry.exists() {
        anyhow::bail!("Entry point does not exist: {}", entry.display());
    }
    info!("Entry point: {}", entry.display());

    match &args.command {
        Command::Types { output, module_name, .. } => {
            info!("Declaration module: {}", output.display());
            match module_name {
                Some(name) => info!("Wrapped in module \"{}\"", name),
                None => info!("Module wrapper: none"),
            }
        }
        Command::Docs { output, module_name, .. } => {
            if output.is_file() {
                anyhow::bail!("Docs output must be a directory: {}", output.display());
            }
            info!("Docs directory: {}", output.display());
            if let Some(name) = module_name {
                info!("Module name: {}", name);
            }
        }
        Command::Inspect { format, output, .. } => {
            info!("Output format: {:?}", format);
            match output {
                Some(path) => info!("Output file: {}", path.display()),
                None => info!("Output: stdout"),
            }
        }
    }

    Ok(args)
}

/// Scans, parses and classifies everything reachable from `entry`.
pub fn load_model(entry: &Path) -> Result<DocModel> {
    info!("Scanning sources from {}...", entry.display());
    let scan_result = FileScanner::new(entry.to_path_buf())
        .scan()
        .with_context(|| format!("Failed to load {}", entry.display()))?;

    for warning in &scan_result.warnings {
        warn!("{}", warning);
    }
    let files: Vec<ParsedFile> = scan_result.files;
    info!("Loaded {} source files", files.len());
    if files.is_empty() {
        anyhow::bail!("No source files found under {}", entry.display());
    }

    Ok(classify_files(&files))
}

/// Run the main workflow
pub fn run(args: CliArgs) -> Result<()> {
    let model = load_model(args.command.entry())?;

    match args.command {
        Command::Types {
            output, module_name, ..
        } => {
            let closure = public_closure(&model);
            info!("Public surface pulls in {} declarations", closure.len());
            let content = render_module(&model, &closure, module_name.as_deref());
            write_to_file(&content, &output)?;
            info!("Successfully wrote declaration module to {}", output.display());
        }
        Command::Docs {
            output, module_name, ..
        } => {
            let closure = public_closure(&model);
            if closure.is_empty() {
                warn!("No declaration is marked @export; only the index page will be written");
            }
            let pages = render_site(&model, &closure, module_name.as_deref());
            let written = write_pages(&output, &pages)?;
            info!("Successfully wrote {} pages to {}", written.len(), output.display());
        }
        Command::Inspect { format, output, .. } => {
            info!("Serializing to {:?} format...", format);
            let content = match format {
                OutputFormat::Yaml => serialize_yaml(&model)?,
                OutputFormat::Json => serialize_json(&model)?,
            };
            match output {
                Some(path) => {
                    write_to_file(&content, &path)?;
                    info!("Successfully wrote document model to {}", path.display());
                }
                None => println!("{}", content),
            }
        }
    }

    info!("Summary:");
    info!("  - Components: {}", model.components().len());
    info!("  - Hooks: {}", model.hooks().len());
    info!("  - Functions: {}", model.functions().len());
    info!(
        "  - Types: {}",
        model.types().len() + model.unions().len() + model.enums().len() + model.aliases().len()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const ENTRY: &str = r#"
/** Props of the badge. */
export interface BadgeProps { count: number }

/** Shows a count. @export */
export const Badge: React.FC<BadgeProps> = ({ count }) => <span>{count}</span>;
"#;

    fn project() -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("index.tsx"), ENTRY).unwrap();
        temp_dir
    }

    #[test]
    fn test_parse_subcommands() {
        let args = CliArgs::try_parse_from(["react-docs-from-source", "-v", "types", "src/index.ts", "-o", "index.d.ts", "-m", "ui"]).unwrap();
        assert!(args.verbose);
        match args.command {
            Command::Types { output, module_name, .. } => {
                assert_eq!(output, PathBuf::from("index.d.ts"));
                assert_eq!(module_name.as_deref(), Some("ui"));
            }
            other => panic!("unexpected command {:?}", other),
        }

        let args = CliArgs::try_parse_from(["react-docs-from-source", "inspect", "src", "-f", "json"]).unwrap();
        assert!(matches!(args.command, Command::Inspect { format: OutputFormat::Json, output: None, .. }));

        assert!(CliArgs::try_parse_from(["react-docs-from-source", "docs", "src"]).is_err());
    }

    #[test]
    fn test_missing_entry_is_rejected() {
        let args = CliArgs::try_parse_from(["react-docs-from-source", "inspect", "/definitely/not/here.ts"]).unwrap();
        assert!(parse_args_from_parsed(args).is_err());
    }

    #[test]
    fn test_run_types_and_docs() {
        let temp_dir = project();
        let entry = temp_dir.path().join("index.tsx");
        let types_out = temp_dir.path().join("out/index.d.ts");
        let docs_out = temp_dir.path().join("docs");

        run(CliArgs {
            command: Command::Types {
                entry: entry.clone(),
                output: types_out.clone(),
                module_name: None,
            },
            verbose: false,
        })
        .unwrap();
        let module = fs::read_to_string(&types_out).unwrap();
        assert!(module.contains("export interface BadgeProps { count: number }"));
        assert!(module.contains("export declare const Badge: React.FC<BadgeProps>;"));

        run(CliArgs {
            command: Command::Docs {
                entry,
                output: docs_out.clone(),
                module_name: Some("badges".to_string()),
            },
            verbose: false,
        })
        .unwrap();
        assert!(docs_out.join("README.md").is_file());
        let page = fs::read_to_string(docs_out.join("components/Badge.md")).unwrap();
        assert!(page.contains("import { Badge } from \"badges\";"));
        assert!(docs_out.join("types/BadgeProps.md").is_file());
    }
}
