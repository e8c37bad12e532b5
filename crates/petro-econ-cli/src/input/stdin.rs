use serde::de::DeserializeOwned;
use serde_json::Value;
use std::io::{self, Read};

use super::file;

/// Read the piped input document from stdin.
///
/// JSON and YAML are both accepted. Returns None when stdin is a TTY or
/// carries nothing but whitespace.
pub fn read_stdin() -> Result<Option<Value>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    parse_piped(&buffer)
}

/// The document at `path`, or the piped one when no path is given.
pub fn read_document(path: Option<&str>) -> Result<Value, Box<dyn std::error::Error>> {
    match path {
        Some(path) => file::read_value(path),
        None => read_stdin()?
            .ok_or_else(|| "--input <file.json|file.yaml> or stdin required".into()),
    }
}

/// Typed variant of [`read_document`].
pub fn read_document_as<T: DeserializeOwned>(
    path: Option<&str>,
) -> Result<T, Box<dyn std::error::Error>> {
    Ok(serde_json::from_value(read_document(path)?)?)
}

fn parse_piped(text: &str) -> Result<Option<Value>, Box<dyn std::error::Error>> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        return Ok(Some(serde_json::from_str(trimmed)?));
    }
    Ok(Some(serde_yaml::from_str(trimmed)?))
}
