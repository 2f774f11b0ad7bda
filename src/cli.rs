// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// clap is a popular Rust library for parsing command-line arguments.
// We use the "derive" API which lets us define the CLI structure using
// Rust structs and attributes (the #[...] things).
//
// The interface is deliberately small:
//
//   mdfresh README.md docs/intro.md      # check individual files
//   mdfresh -r docs/                     # check every *.md under docs/
//
// Rust concepts:
// - Structs: Custom data types that group related data
// - Derive macros: Automatically generate code for our types
// =============================================================================

use clap::Parser;
use std::path::PathBuf;

// This struct represents our entire CLI application
//
// #[derive(Parser)] tells clap to automatically generate parsing code
// The #[command(...)] attributes configure how the CLI behaves
#[derive(Parser, Debug)]
#[command(
    name = "mdfresh",
    version = "0.1.0",
    about = "Check markdown links and verify embedded code snippets against their source",
    long_about = "mdfresh scans markdown files for hyperlinks and for code blocks that claim to \
                  mirror a line range of a remote source file, then fetches every link to confirm \
                  it still returns 200 and every mirrored snippet still matches the live source. \
                  It's perfect for keeping long-lived documentation honest."
)]
pub struct Cli {
    /// Validate every markdown file in the target directories recursively
    ///
    /// Without this flag, targets must be files; with it, targets must be
    /// directories.
    ///
    /// #[arg(short, long)] creates both -r and --recursive from the field name
    #[arg(short, long)]
    pub recursive: bool,

    /// Markdown file(s) or directories to validate
    ///
    /// These are positional arguments; at least one is required
    #[arg(required = true)]
    pub target: Vec<PathBuf>,
}
