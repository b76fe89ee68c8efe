use serde_json::{json, Value};
use std::io::{self, BufRead, Write};

use crate::assets::Notice;
use crate::cli::OutputFormat;
use crate::forms::FieldErrors;

/// Output a success message in the appropriate format
pub fn output_success(
    output_format: &OutputFormat,
    message: &str,
    data: Option<Value>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            match data {
                Some(Value::Object(fields)) => {
                    if let Some(obj) = response.as_object_mut() {
                        obj.extend(fields);
                    }
                }
                Some(other) => response["data"] = other,
                None => {}
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output an error message in the appropriate format
pub fn output_error(
    output_format: &OutputFormat,
    message: &str,
    error_code: Option<&str>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": false,
                "error": message
            });

            if let Some(code) = error_code {
                response["error_code"] = json!(code);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            eprintln!("Error: {}", message);
        }
    }
    Ok(())
}

/// Output per-field validation messages
pub fn output_field_errors(output_format: &OutputFormat, errors: &FieldErrors) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let fields: serde_json::Map<String, Value> = errors
                .iter()
                .map(|(field, message)| (field.to_string(), json!(message)))
                .collect();
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "success": false,
                    "error": "Validation failed",
                    "error_code": "VALIDATION_ERROR",
                    "field_errors": fields
                }))?
            );
        }
        OutputFormat::Text => {
            eprintln!("Error: please fix the following fields");
            for (field, message) in errors.iter() {
                eprintln!("  {}: {}", field, message);
            }
        }
    }
    Ok(())
}

/// Non-fatal asset problems reported after a successful write
pub fn output_notices(output_format: &OutputFormat, notices: &[Notice]) -> anyhow::Result<()> {
    if notices.is_empty() {
        return Ok(());
    }
    match output_format {
        OutputFormat::Json => {
            let list: Vec<Value> = notices
                .iter()
                .map(|n| json!({ "subject": n.subject, "message": n.message }))
                .collect();
            println!("{}", serde_json::to_string_pretty(&json!({ "notices": list }))?);
        }
        OutputFormat::Text => {
            for notice in notices {
                eprintln!("! {}", notice);
            }
        }
    }
    Ok(())
}

/// Output an empty collection in the appropriate format
pub fn output_empty_collection(
    output_format: &OutputFormat,
    collection_name: &str,
    message: &str,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({
                collection_name: []
            }))?);
        }
        OutputFormat::Text => {
            println!("{}", message);
        }
    }
    Ok(())
}

/// Print data as pretty JSON, or the text rendering
pub fn output_value(output_format: &OutputFormat, data: &Value, text: &str) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(data)?),
        OutputFormat::Text => println!("{}", text),
    }
    Ok(())
}

/// Reads one line from stdin after printing `prompt`
pub fn prompt_line(prompt: &str) -> anyhow::Result<String> {
    print!("{}", prompt);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Uses the given value or asks for it
pub fn value_or_prompt(value: Option<String>, prompt: &str) -> anyhow::Result<String> {
    match value {
        Some(v) => Ok(v),
        None => prompt_line(prompt),
    }
}

/// Asks a yes/no question; anything but y/yes is no
pub fn confirm(prompt: &str) -> anyhow::Result<bool> {
    let answer = prompt_line(&format!("{} [y/N] ", prompt))?;
    Ok(is_yes(&answer))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Splits `key=value`
pub fn parse_assignment(raw: &str) -> anyhow::Result<(String, String)> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok((key.trim().to_string(), value.to_string())),
        _ => Err(anyhow::anyhow!("expected key=value, got '{}'", raw)),
    }
}
