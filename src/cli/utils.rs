use std::io::Read;
use std::path::Path;

use anyhow::Context;
use serde_json::Value;

use crate::api::Envelope;
use crate::cli::OutputFormat;

/// Print a response envelope. A failed envelope becomes an error so the
/// binary exits non-zero; in JSON mode the envelope is printed first.
pub fn output_envelope(output_format: &OutputFormat, envelope: &Envelope) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(envelope)?);
        }
        OutputFormat::Text if envelope.result => {
            println!("✓ {}", envelope.message);
            for (key, value) in &envelope.payload {
                output_field(key, value)?;
            }
        }
        OutputFormat::Text => {}
    }

    if envelope.result {
        Ok(())
    } else {
        Err(anyhow::anyhow!("{} (code {})", envelope.message, envelope.code))
    }
}

fn output_field(key: &str, value: &Value) -> anyhow::Result<()> {
    match value {
        Value::String(s) => println!("{}: {}", key, s),
        Value::Array(items) if items.iter().all(Value::is_string) => {
            let joined: Vec<&str> = items.iter().filter_map(Value::as_str).collect();
            println!("{}: {}", key, joined.join(", "));
        }
        other => println!("{}:\n{}", key, serde_json::to_string_pretty(other)?),
    }
    Ok(())
}

/// Read a JSON document from `file`, or from stdin when no file is given
pub fn read_document(file: Option<&Path>) -> anyhow::Result<Value> {
    let text = match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read JSON from stdin")?;
            buffer
        }
    };

    let value: Value = serde_json::from_str(&text).context("input is not valid JSON")?;
    if !value.is_object() {
        anyhow::bail!("input must be a JSON object");
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_documents_from_file() {
        let path = std::env::temp_dir().join(format!("feed-doc-{}.json", uuid::Uuid::new_v4()));
        std::fs::write(&path, r#"{"title": "Hello"}"#).unwrap();
        assert_eq!(read_document(Some(&path)).unwrap()["title"], "Hello");

        std::fs::write(&path, "[1, 2]").unwrap();
        assert!(read_document(Some(&path)).is_err());
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn failed_envelopes_are_errors() {
        let failed = Envelope::failure(404, "Article with id x not found");
        let err = output_envelope(&OutputFormat::Text, &failed).unwrap_err();
        assert_eq!(err.to_string(), "Article with id x not found (code 404)");

        assert!(output_envelope(&OutputFormat::Text, &Envelope::success("ok")).is_ok());
    }
}
