use std::path::PathBuf;

use clap::Subcommand;
use serde_json::Value;

#[derive(Subcommand)]
pub enum Commands {
    /// Split a text file into chunks with the configured chunking connector
    Chunk {
        path: PathBuf,

        #[arg(long)]
        chunk_size: Option<i64>,

        #[arg(long)]
        chunk_overlap: Option<i64>,

        /// Include index and token counts for each chunk
        #[arg(long)]
        annotate: bool,
    },

    /// Embed one or more texts with the configured embedding connector
    Embed {
        #[arg(required = true)]
        texts: Vec<String>,

        #[arg(long)]
        batch_size: Option<usize>,
    },

    /// Extract text from an image with the configured OCR connector
    Ocr {
        path: PathBuf,

        #[arg(short, long)]
        lang: Option<String>,

        #[arg(long)]
        psm: Option<u8>,
    },

    /// Probe configured connectors (all services when none is given)
    Health { service: Option<String> },

    /// Show the sanitized configuration of a service's connector
    Info { service: String },

    /// Build a throwaway connector and check that its service answers
    TestConnection {
        service: String,

        provider: String,

        /// Provider setting as key=value; repeatable
        #[arg(long = "set", value_parser = parse_setting)]
        settings: Vec<(String, Value)>,
    },
}

/// Parse `key=value`. Values that read as JSON scalars (numbers, booleans)
/// keep that type; everything else is a string.
pub fn parse_setting(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", raw))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in '{}'", raw));
    }

    let value = match serde_json::from_str::<Value>(value) {
        Ok(v @ (Value::Number(_) | Value::Bool(_))) => v,
        _ => Value::String(value.to_string()),
    };
    Ok((key.to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_setting() {
        assert_eq!(parse_setting("chunk_size=10").unwrap(), ("chunk_size".to_string(), json!(10)));
        assert_eq!(
            parse_setting("base_url=http://localhost:8080").unwrap(),
            ("base_url".to_string(), json!("http://localhost:8080"))
        );
        assert_eq!(parse_setting("api_key=a=b").unwrap().1, json!("a=b"));
        assert!(parse_setting("no-separator").is_err());
        assert!(parse_setting("=value").is_err());
    }
}
