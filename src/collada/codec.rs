//! Whitespace tokenization and bulk numeric parsing for array text.

use super::error::ColladaError;

/// Split element text on any run of whitespace, discarding empty tokens.
pub fn split(text: &str) -> Vec<&str> {
    text.split_whitespace().collect()
}

/// Parse every token as `f32`, failing on the first bad token.
pub fn to_f32(tokens: &[&str]) -> Result<Vec<f32>, ColladaError> {
    tokens
        .iter()
        .map(|t| {
            t.parse().map_err(|_| ColladaError::NumberFormat {
                token: t.to_string(),
            })
        })
        .collect()
}

/// Parse every token as `i32`, failing on the first bad token.
pub fn to_i32(tokens: &[&str]) -> Result<Vec<i32>, ColladaError> {
    tokens
        .iter()
        .map(|t| {
            t.parse().map_err(|_| ColladaError::NumberFormat {
                token: t.to_string(),
            })
        })
        .collect()
}
