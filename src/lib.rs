//! React Docs Generator - reference docs and declaration modules from annotated React sources.
//!
//! This library statically analyzes a TypeScript/TSX code base that builds React
//! components and produces two artifacts for the declarations whose doc comments
//! carry the `@export` modifier: one Markdown page per declaration, and a single
//! self-contained declaration module (`.d.ts`) with every type those declarations
//! depend on.
//!
//! # Architecture
//!
//! The library is organized into several modules that work together:
//!
//! 1. [`scanner`] - Loads the entry file and every file it reaches through relative imports
//! 2. [`parser`] - Parses TypeScript/TSX sources into tree-sitter syntax trees
//! 3. [`oracle`] - Answers type questions (identifier resolution, inferred expression types)
//! 4. [`comment`] - Interprets doc comments: summary, examples, `@export`/`@hook` flags
//! 5. [`type_syntax`] - Tokenizes and parses type text into typed shapes
//! 6. [`classifier`] - Turns declarations into normalized records of the [`model`]
//! 7. [`resolver`] - Computes the dependency closure of the public surface
//! 8. [`renderer`] - Renders documentation pages and the declaration module
//! 9. [`serializer`] - Dumps the model to YAML or JSON and writes artifacts
//!
//! # Example Usage
//!
//! ```no_run
//! use react_docs_from_source::{
//!     classifier::classify_files,
//!     renderer::{declarations::render_module, docs::render_site},
//!     resolver::public_closure,
//!     scanner::FileScanner,
//!     serializer::write_pages,
//! };
//! use std::path::{Path, PathBuf};
//!
//! // Load everything reachable from the entry point
//! let scan_result = FileScanner::new(PathBuf::from("./src/index.ts")).scan().unwrap();
//!
//! // Classify declarations and compute the public closure
//! let model = classify_files(&scan_result.files);
//! let closure = public_closure(&model);
//!
//! // Render the declaration module
//! let module = render_module(&model, &closure, Some("my-ui"));
//! println!("{}", module);
//!
//! // Render and write the docs
//! let pages = render_site(&model, &closure, Some("my-ui"));
//! write_pages(Path::new("docs/api"), &pages).unwrap();
//! ```
//!
//! # Command-Line Interface
//!
//! For command-line usage, see the [`cli`] module which provides a complete CLI application.

pub mod cli;
pub mod scanner;
pub mod parser;
pub mod oracle;
pub mod comment;
pub mod type_syntax;
pub mod model;
pub mod classifier;
pub mod resolver;
pub mod markdown;
pub mod renderer;
pub mod serializer;
pub mod error;
