//! Request builder - validated parse requests and their wire payload

use crate::error::DomainError;
use crate::options::ParseOptions;
use crate::schema::SchemaDescriptor;
use serde_json::{Map, Value};

/// Maximum input length in characters
pub const MAX_INPUT_CHARS: usize = 100_000;

/// Non-failing check that `input` would be accepted by [`ParseRequest::build`].
pub fn validate_input(input: &str) -> bool {
    check_input(input).is_ok()
}

fn check_input(input: &str) -> Result<(), DomainError> {
    if input.trim().is_empty() {
        return Err(DomainError::InvalidInput("input text is empty".to_string()));
    }
    let chars = input.chars().count();
    if chars > MAX_INPUT_CHARS {
        return Err(DomainError::InvalidInput(format!(
            "input text too long: {} chars (max: {})",
            chars, MAX_INPUT_CHARS
        )));
    }
    Ok(())
}

/// One immutable parse request.
///
/// The request owns its own copy of the schema, so concurrent requests
/// never share a mutable schema.
///
/// # Examples
///
/// ```
/// use parserator_domain::{FieldType, ParseRequest, SchemaDescriptor};
///
/// let schema = SchemaDescriptor::new([("name", FieldType::String)]).unwrap();
/// let request = ParseRequest::build("Maria Garcia, CTO", schema, None, None).unwrap();
///
/// let wire = request.to_wire();
/// assert_eq!(wire["inputData"], "Maria Garcia, CTO");
/// assert!(wire.get("instructions").is_none());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ParseRequest {
    input: String,
    schema: SchemaDescriptor,
    instructions: Option<String>,
    options: Option<ParseOptions>,
}

impl ParseRequest {
    /// Validate and assemble a request.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` when `input` is blank or longer than [`MAX_INPUT_CHARS`]
    /// - `InvalidOptions` when `options` are out of range
    pub fn build(
        input: impl Into<String>,
        schema: SchemaDescriptor,
        instructions: Option<&str>,
        options: Option<ParseOptions>,
    ) -> Result<Self, DomainError> {
        let input = input.into();
        check_input(&input)?;
        if let Some(options) = &options {
            options.validate()?;
        }

        let instructions = instructions
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        Ok(Self {
            input,
            schema,
            instructions,
            options,
        })
    }

    /// The same request aimed at a different schema.
    pub fn with_schema(&self, schema: SchemaDescriptor) -> Self {
        Self {
            input: self.input.clone(),
            schema,
            instructions: self.instructions.clone(),
            options: self.options.clone(),
        }
    }

    /// Raw input text
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Requested output schema
    pub fn schema(&self) -> &SchemaDescriptor {
        &self.schema
    }

    /// Caller instructions, if any
    pub fn instructions(&self) -> Option<&str> {
        self.instructions.as_deref()
    }

    /// Parse options, if any
    pub fn options(&self) -> Option<&ParseOptions> {
        self.options.as_ref()
    }

    /// Instructions as sent: caller instructions followed by any
    /// `additional_instructions` from the options.
    pub fn effective_instructions(&self) -> Option<String> {
        let extra = self
            .options
            .as_ref()
            .and_then(|o| o.additional_instructions.as_deref())
            .map(str::trim)
            .filter(|s| !s.is_empty());

        match (self.instructions.as_deref(), extra) {
            (Some(own), Some(extra)) => Some(format!("{}\n\n{}", own, extra)),
            (Some(own), None) => Some(own.to_string()),
            (None, Some(extra)) => Some(extra.to_string()),
            (None, None) => None,
        }
    }

    /// Canonical `POST /v1/parse` body.
    ///
    /// Always carries `inputData` and `outputSchema`; `instructions`,
    /// `confidenceThreshold` and `options` appear only when set.
    pub fn to_wire(&self) -> Value {
        let mut body = Map::new();
        body.insert("inputData".to_string(), Value::String(self.input.clone()));
        body.insert("outputSchema".to_string(), self.schema.to_wire());

        if let Some(instructions) = self.effective_instructions() {
            body.insert("instructions".to_string(), Value::String(instructions));
        }
        if let Some(options) = &self.options {
            if let Some(threshold) = options.confidence_threshold {
                body.insert("confidenceThreshold".to_string(), Value::from(threshold));
            }
            if let Some(wire_options) = options.to_wire() {
                body.insert("options".to_string(), wire_options);
            }
        }

        Value::Object(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldType;
    use serde_json::json;
    use std::time::Duration;

    fn schema() -> SchemaDescriptor {
        SchemaDescriptor::new([("name", FieldType::String), ("email", FieldType::Email)]).unwrap()
    }

    #[test]
    fn test_minimal_wire_payload() {
        let request = ParseRequest::build("John Smith, john@example.com", schema(), None, None).unwrap();
        assert_eq!(
            request.to_wire(),
            json!({
                "inputData": "John Smith, john@example.com",
                "outputSchema": {"name": "string", "email": "email"}
            })
        );
    }

    #[test]
    fn test_full_wire_payload() {
        let options = ParseOptions::new()
            .with_confidence_threshold(0.85)
            .with_timeout(Duration::from_secs(20))
            .with_preserve_formatting(true)
            .with_additional_instructions("Dates as ISO-8601");
        let request =
            ParseRequest::build("text", schema(), Some("Business card"), Some(options)).unwrap();

        let wire = request.to_wire();
        assert_eq!(wire["instructions"], "Business card\n\nDates as ISO-8601");
        assert_eq!(wire["confidenceThreshold"], 0.85);
        assert_eq!(wire["options"], json!({"timeout": 20000, "preserveFormatting": true}));
    }

    #[test]
    fn test_blank_instructions_omitted() {
        let request = ParseRequest::build("text", schema(), Some("   "), Some(ParseOptions::new())).unwrap();
        let wire = request.to_wire();
        let keys: Vec<&String> = wire.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["inputData", "outputSchema"]);
    }

    #[test]
    fn test_input_length_limit() {
        let exact = "a".repeat(MAX_INPUT_CHARS);
        assert!(ParseRequest::build(exact, schema(), None, None).is_ok());

        let over = "a".repeat(MAX_INPUT_CHARS + 1);
        assert!(matches!(
            ParseRequest::build(over, schema(), None, None),
            Err(DomainError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        let exact = "é".repeat(MAX_INPUT_CHARS);
        assert!(exact.len() > MAX_INPUT_CHARS);
        assert!(validate_input(&exact));
    }

    #[test]
    fn test_blank_input_rejected() {
        assert!(matches!(
            ParseRequest::build("", schema(), None, None),
            Err(DomainError::InvalidInput(_))
        ));
        assert!(!validate_input(" \n\t "));
    }

    #[test]
    fn test_invalid_options_rejected() {
        let options = ParseOptions::new().with_confidence_threshold(2.0);
        assert!(matches!(
            ParseRequest::build("text", schema(), None, Some(options)),
            Err(DomainError::InvalidOptions(_))
        ));
    }

    #[test]
    fn test_with_schema_keeps_everything_else() {
        let request = ParseRequest::build("text", schema(), Some("hint"), None).unwrap();
        let fallback = SchemaDescriptor::new([("summary", FieldType::String)]).unwrap();
        let swapped = request.with_schema(fallback.clone());

        assert_eq!(swapped.input(), "text");
        assert_eq!(swapped.instructions(), Some("hint"));
        assert_eq!(swapped.schema(), &fallback);
        assert_eq!(request.schema(), &schema());
    }
}
