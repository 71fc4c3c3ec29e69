use serde_json::Value;
use std::io::{self, Read};

/// JSON piped on stdin; `None` on an interactive terminal.
pub fn read_stdin() -> Result<Option<Value>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    parse_piped(&buffer)
}

/// Blank input means no document was piped, so flags apply instead.
fn parse_piped(buffer: &str) -> Result<Option<Value>, Box<dyn std::error::Error>> {
    let trimmed = buffer.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    serde_json::from_str(trimmed)
        .map(Some)
        .map_err(|e| format!("Failed to parse stdin as JSON: {e}").into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_blank_input_falls_back_to_flags() {
        assert!(parse_piped("").unwrap().is_none());
        assert!(parse_piped("  \n\t").unwrap().is_none());
    }

    #[test]
    fn test_piped_document_is_parsed() {
        let value = parse_piped("{\"gross_salary\": \"5000\"}\n").unwrap();
        assert_eq!(value, Some(json!({"gross_salary": "5000"})));
    }

    #[test]
    fn test_malformed_document_names_stdin() {
        let err = parse_piped("{gross_salary: 5000}").unwrap_err();
        assert!(err.to_string().starts_with("Failed to parse stdin as JSON"));
    }
}
