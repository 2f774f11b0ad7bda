// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Reject bad flag/target combinations before touching anything
// 3. Collect the files to scan and extract their findings
// 4. Verify every finding over the network, printing diagnostics live
// 5. Print the closing summary
//
// Exit codes: 2 for usage errors and unexpected internal errors. A completed
// run always exits 0 - broken links and stale snippets are diagnostics on
// stdout, not failures of the tool itself.
//
// Rust concepts used:
// - async/await: Because we need to make many network requests concurrently
// - Result<T, E>: For error handling (T = success type, E = error type)
// =============================================================================

// Module declarations - tells Rust about our other source files
mod cli; // src/cli.rs - command-line parsing
mod scanner; // src/scanner/ - file selection and reference extraction
mod verifier; // src/verifier/ - fetching, line extraction, comparison

// Import items we need from our modules
use clap::Parser; // Parser trait enables the parse() method
use cli::Cli;
use scanner::Scanner;

// anyhow::Result is like std::result::Result but simpler for applications
// It lets us return any error type with the ? operator
use anyhow::Result;

// The #[tokio::main] attribute transforms our async main into a real main
// function. It creates a tokio runtime and runs our async code inside it.
#[tokio::main]
async fn main() {
    // Run our application logic and capture the exit code
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            // If an unexpected error occurred, print it and exit with code 2
            eprintln!("Error: {}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<i32> {
    // Parse command-line arguments into our Cli struct
    // This will automatically handle --help, --version, etc.
    let cli = Cli::parse();

    // Directories need -r, files must not have it. Checked before any
    // scanning so a bad invocation does nothing at all.
    if let Some(diagnostic) = scanner::check_usage(&cli.target, cli.recursive) {
        println!("{}", diagnostic);
        return Ok(2);
    }

    let files = scanner::collect_target_files(&cli.target, cli.recursive);

    // Scan every readable file; unreadable ones silently contribute nothing
    let scanner = Scanner::new();
    let mut findings = Vec::new();
    for path in &files {
        if let Some(text) = scanner::read_markdown(path) {
            findings.extend(scanner.scan(&text, path));
        }
    }

    let total = findings.len();
    let code_blocks = findings.iter().filter(|f| f.is_code_link()).count();
    println!("Found {} links, {} associated with code block\n\n", total, code_blocks);

    // Nothing to verify: stop here, before any client or fetch exists
    if total == 0 {
        return Ok(0);
    }

    println!("Fetching...\n\n\n");

    let (_outcomes, aggregate) = verifier::verify_findings(findings).await;

    // The confirmations only appear when there was something of that kind
    // to confirm and all of it passed
    if !aggregate.any_link_error {
        println!("Every link returned 200 (:");
    }
    if !aggregate.any_code_mismatch && code_blocks > 0 {
        println!("Every code block is up-to-date (:");
    }

    Ok(0)
}
