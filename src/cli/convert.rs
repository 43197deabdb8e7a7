//! JSON input and output for the CLI

use crate::Value;

use super::CliError;

/// Parses JSON text into a datum.
pub fn parse_json_input(input: &str) -> Result<Value, CliError> {
    let json: serde_json::Value = serde_json::from_str(input)?;
    Ok(Value::from(json))
}

/// Renders a datum as JSON text; records use their names under `tag_name`.
pub fn render_json(value: &Value, tag_name: &str, pretty: bool) -> Result<String, CliError> {
    let json = value.to_json(tag_name);
    let text = if pretty {
        serde_json::to_string_pretty(&json)?
    } else {
        serde_json::to_string(&json)?
    };
    Ok(text)
}
