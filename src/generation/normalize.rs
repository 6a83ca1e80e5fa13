use super::MediaType;
use serde_json::Value;

/// Reshapes raw model output for the response.
///
/// Images keep only the first element (`null` when there is none), text
/// streams are joined without a separator, audio passes through.
pub fn normalize(media_type: MediaType, output: Value) -> Value {
    match media_type {
        MediaType::Image => match output {
            Value::Array(items) => items.into_iter().next().unwrap_or(Value::Null),
            _ => Value::Null,
        },
        MediaType::Text => match output {
            Value::Array(tokens) => Value::String(
                tokens
                    .iter()
                    .map(|token| match token {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect(),
            ),
            other => other,
        },
        MediaType::Audio => output,
    }
}
