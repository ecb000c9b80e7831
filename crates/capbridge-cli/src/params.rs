//! Request parameter assembly from command-line arguments.

use serde_json::{Map, Value};

use crate::errors::AppError;

/// Builds the request parameters from `--params` and `key=value` pairs.
pub(crate) fn build_params(
    json: Option<&str>,
    pairs: &[String],
) -> Result<Map<String, Value>, AppError> {
    let mut params = match json {
        None => Map::new(),
        Some(text) => match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(map)) => map,
            Ok(other) => {
                return Err(AppError::InvalidParamsJson {
                    reason: format!("got {}", kind(&other)),
                });
            }
            Err(error) => {
                return Err(AppError::InvalidParamsJson {
                    reason: error.to_string(),
                });
            }
        },
    };
    for pair in pairs {
        let (key, raw) = pair
            .split_once('=')
            .filter(|(key, _)| !key.is_empty())
            .ok_or_else(|| AppError::MalformedPair {
                argument: pair.clone(),
            })?;
        params.insert(key.to_owned(), parse_value(raw));
    }
    Ok(params)
}

fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_owned()))
}

const fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
