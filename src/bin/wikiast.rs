//! Command-line interface for wikitext-ast
//! Parses a wikitext document and prints its tree in one of several formats.
//!
//! Usage:
//!   wikiast `<path>`                          - Print the tree as treeviz
//!   wikiast - --format json                 - Read stdin, print JSON
//!   wikiast `<path>` --include --max-stage 5  - Transclusion mode, stages 0-4 only
//!   wikiast `<path>` --config `<file.json>`     - Use a custom parser configuration
//!
//! Set `RUST_LOG=wikitext_ast=debug` to trace stage transitions.

use clap::{Arg, ArgAction, Command};
use std::io::Read;
use tracing_subscriber::EnvFilter;
use wikitext_ast::wikitext::loader::DocumentLoader;
use wikitext_ast::wikitext::parsing::MAX_STAGE;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let matches = Command::new("wikiast")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Parse wikitext into a syntax tree")
        .arg_required_else_help(true)
        .arg(
            Arg::new("path")
                .help("Path to the wikitext file, or - for stdin")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("format")
                .long("format")
                .short('f')
                .help("Output format")
                .value_parser(["treeviz", "json", "roundtrip"])
                .default_value("treeviz"),
        )
        .arg(
            Arg::new("include")
                .long("include")
                .help("Parse as a transcluded page")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("max-stage")
                .long("max-stage")
                .help("Number of stages to run")
                .value_parser(clap::value_parser!(u8).range(0..=MAX_STAGE as i64))
                .default_value("11"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("Parser configuration JSON file"),
        )
        .get_matches();

    let path = matches
        .get_one::<String>("path")
        .map(String::as_str)
        .unwrap_or("-");
    let format = matches
        .get_one::<String>("format")
        .map(String::as_str)
        .unwrap_or("treeviz");
    let include = matches.get_flag("include");
    let max_stage = matches.get_one::<u8>("max-stage").copied().unwrap_or(MAX_STAGE);

    let mut loader = DocumentLoader::new().include(include).max_stage(max_stage);
    if let Some(config) = matches.get_one::<String>("config") {
        loader = loader.with_config_path(config).unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        });
    }

    let source = read_source(path).unwrap_or_else(|e| {
        eprintln!("Error reading {}: {}", path, e);
        std::process::exit(1);
    });

    let output = loader.render(&source, format).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });
    print!("{}", output);
}

fn read_source(path: &str) -> std::io::Result<String> {
    if path == "-" {
        let mut source = String::new();
        std::io::stdin().read_to_string(&mut source)?;
        Ok(source)
    } else {
        std::fs::read_to_string(path)
    }
}
