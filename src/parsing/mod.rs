// Parser for the grammar notation
use std::path::Path;
use tracing::debug;

pub mod decode;
pub mod parser;

pub use parser::{Cursor, Parser, ParsingError};

use crate::grammar::{Grammar, LoadingError};

/// Read a grammar file into memory in one go.
pub fn load(filename: &Path) -> Result<String, LoadingError<'_>> {
    match std::fs::read_to_string(filename) {
        Ok(content) => {
            debug!("read {} bytes", content.len());
            Ok(content)
        }
        Err(error) => Err(LoadingError {
            problem: "Unable to read grammar file".to_string(),
            details: error.to_string(),
            filename,
        }),
    }
}

/// Parse grammar text into the grammar model.
pub fn parse(content: &str) -> Result<Grammar<'_>, ParsingError<'_>> {
    let mut input = Parser::new(content);
    input.parse_grammar()
}
