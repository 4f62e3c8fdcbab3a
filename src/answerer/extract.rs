//! Isolating and decoding the JSON payload of a model reply.

use super::types::StructuredAnswer;

/// Extracts the JSON object span from a model reply.
///
/// Returns the slice from the first `{` through the last `}` inclusive, which
/// strips code fences and surrounding prose. Brace balance is not checked, so
/// two separate objects come back as one span. When either brace is missing,
/// or the last `}` comes before the first `{`, the input is returned unchanged.
///
/// # Examples
///
/// ```
/// use kbsearch::answerer::extract_json;
///
/// assert_eq!(extract_json("```json\n{\"key\": \"value\"}\n```"), "{\"key\": \"value\"}");
/// assert_eq!(extract_json("no braces here"), "no braces here");
/// ```
pub fn extract_json(raw: &str) -> &str {
    match (raw.find('{'), raw.rfind('}')) {
        (Some(start), Some(end)) if start <= end => &raw[start..=end],
        _ => raw,
    }
}

/// Decodes extracted JSON into a [`StructuredAnswer`].
///
/// Unknown fields are ignored and missing fields take their empty value;
/// a value of the wrong type is an error.
pub fn decode_answer(json_text: &str) -> Result<StructuredAnswer, serde_json::Error> {
    serde_json::from_str(json_text)
}
