//! Fixed per-type inference parameters.

use super::MediaType;
use serde_json::{Map, Value, json};

pub const IMAGE_WIDTH: u32 = 512;
pub const IMAGE_HEIGHT: u32 = 512;
pub const IMAGE_NEGATIVE_PROMPT: &str = "deformed, noisy, blurry, distorted";
pub const TEXT_MAX_NEW_TOKENS: u32 = 512;
pub const AUDIO_LENGTH_SECS: u32 = 30;

/// Builds the model input: `{prompt}` merged with the constants for `media_type`.
pub fn build_input(media_type: MediaType, prompt: &str) -> Value {
    let mut input = Map::new();
    input.insert("prompt".to_string(), Value::String(prompt.to_string()));

    let extra = match media_type {
        MediaType::Image => json!({
            "width": IMAGE_WIDTH,
            "height": IMAGE_HEIGHT,
            "negative_prompt": IMAGE_NEGATIVE_PROMPT,
        }),
        MediaType::Text => json!({ "max_new_tokens": TEXT_MAX_NEW_TOKENS }),
        MediaType::Audio => json!({ "length": AUDIO_LENGTH_SECS }),
    };

    if let Value::Object(extra) = extra {
        input.extend(extra);
    }

    Value::Object(input)
}
