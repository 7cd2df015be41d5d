//! React Docs Generator - command-line tool for documenting annotated React libraries.
//!
//! Starting from an entry file, the tool follows relative imports, classifies
//! every component, hook, function and type it finds, and writes either a
//! Markdown reference or a single declaration module for the declarations
//! marked `@export` in their doc comments.
//!
//! # Usage
//!
//! ```bash
//! react-docs-from-source [-v] <COMMAND> <ENTRY> [OPTIONS]
//! ```
//!
//! # Examples
//!
//! Write the declaration module:
//! ```bash
//! react-docs-from-source types src/index.ts -o dist/index.d.ts -m my-ui
//! ```
//!
//! Write the Markdown reference:
//! ```bash
//! react-docs-from-source docs src/index.ts -o docs/api -m my-ui
//! ```
//!
//! Dump what was classified:
//! ```bash
//! react-docs-from-source -v inspect src/index.ts -f json
//! ```

use anyhow::Result;
use clap::Parser;
use log::info;
use react_docs_from_source::cli;

fn main() -> Result<()> {
    // The verbose flag decides the log level, so parse before the logger exists
    let args_for_verbose = cli::CliArgs::parse();

    let log_level = if args_for_verbose.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!("React docs generator starting...");

    let args = cli::parse_args_from_parsed(args_for_verbose)?;
    cli::run(args)?;

    info!("Generation completed successfully");

    Ok(())
}
