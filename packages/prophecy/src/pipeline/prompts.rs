//! LLM prompts for structured extraction.

/// Sentinel the capability answers with when nothing is recognizable.
pub const NO_DATA_SENTINEL: &str = "N/A";

/// System instruction for the extraction capability.
///
/// `{columns}` is replaced with the comma-separated feature vocabulary.
pub const EXTRACT_SYSTEM_PROMPT: &str = r#"You are an extracting machine.
Focus on identifying structured data in the requests.

If an address is present, prioritize extracting its components (street, city, state, and zip) and return them as a JSON object. Include only the components that are explicitly present in the request; do not substitute or infer missing components. For example, if the city is not mentioned in the request, do not include anything about the city in the response. Return the object exactly like this:
{"street": "value", "city": "value", "state": "value", "zip": "value"}. Use two-letter abbreviations for the state.

If no address is found, attempt to find the following data in the requests: {columns}. Return the extracted values as a JSON object exactly like this:
{"col1": "value", "col2": "value", ...}.

Return only the object directly, without adding any prefixes like ```json or extra text.

If none of the relevant columns or address components are found, return only "N/A". Ensure you are 100% certain that none are present before returning "N/A"."#;

/// User prompt wrapping the property description.
pub const EXTRACT_USER_PROMPT: &str = "Extract data for this request: {description}";

/// Format the system instruction for a vocabulary.
pub fn format_system_prompt(vocabulary: &[&str]) -> String {
    EXTRACT_SYSTEM_PROMPT.replace("{columns}", &vocabulary.join(", "))
}

/// Format the user prompt for a description.
pub fn format_user_prompt(description: &str) -> String {
    EXTRACT_USER_PROMPT.replace("{description}", description)
}
