use clap::{Arg, Command};
use owo_colors::OwoColorize;
use std::path::Path;
use tracing::debug;
use tracing_subscriber::{self, EnvFilter};

use ipg::{checking, emitting, parsing};

mod problem;

fn main() {
    const VERSION: &str = concat!("v", env!("CARGO_PKG_VERSION"));

    // Initialize the tracing subscriber. This respects the RUST_LOG
    // environment variable if present, or sets Level::ERROR as a fallback.
    // Everything goes to stderr; stdout carries the generated parser.
    let filter = EnvFilter::from_default_env();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let matches = Command::new("ipg")
        .version(VERSION)
        .about("Generate a recursive-descent parser from an EBNF-like grammar.")
        .arg(
            Arg::new("filename")
                .required(true)
                .help("The file containing the grammar to generate a parser for."),
        )
        .get_matches();

    let filename = matches
        .get_one::<String>("filename")
        .unwrap(); // argument is required by definition so always present

    debug!(filename);

    let filename = Path::new(filename);
    let content = match parsing::load(&filename) {
        Ok(data) => data,
        Err(error) => {
            eprintln!("{}", problem::concise_loading_error(&error));
            std::process::exit(1);
        }
    };

    let grammar = match parsing::parse(&content) {
        Ok(grammar) => grammar,
        Err(error) => {
            eprintln!(
                "{}",
                problem::full_parsing_error(&error, &filename, &content)
            );
            std::process::exit(1);
        }
    };

    for rule in grammar.iter() {
        debug!("rule: {}", rule);
    }

    if let Err(errors) = checking::check(&grammar) {
        for error in &errors {
            eprintln!("{}", problem::concise_check_error(error, &filename));
        }
        std::process::exit(1);
    }

    let generated = emitting::emit(&grammar);
    print!("{}", generated);

    eprintln!("{}", "parsed successfully".bright_green());
}
