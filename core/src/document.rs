use crate::error::{Error, Result};
use serde_json::Value;

/// Parses document text into a tree.
pub fn parse(text: &str) -> Result<Value> {
    serde_json::from_str(text).map_err(|error| Error::MalformedDocument(error.to_string()))
}

/// Prints a document tree back to text. The pretty flag affects whitespace
/// only, never the logical tree.
pub fn print(document: &Value, pretty: bool) -> Result<String> {
    let result = if pretty {
        serde_json::to_string_pretty(document)
    } else {
        serde_json::to_string(document)
    };
    result.map_err(|error| Error::Message(error.to_string()))
}

pub fn kind_name(node: &Value) -> &'static str {
    match node {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
