//! Preset registry - named schemas for common extraction jobs
//!
//! The registry is built once on first access and is read-only after
//! that. There is no way to add or modify presets at runtime; callers that
//! want a variant clone the schema and build their own request.

use crate::error::DomainError;
use crate::options::ParseOptions;
use crate::request::ParseRequest;
use crate::schema::{FieldSpec, FieldType as T, SchemaDescriptor};
use std::sync::OnceLock;
use std::time::Duration;

/// A named, immutable parsing configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Preset {
    name: &'static str,
    title: &'static str,
    description: &'static str,
    schema: SchemaDescriptor,
    instructions: &'static str,
    options: ParseOptions,
}

impl Preset {
    /// Registry key, e.g. `invoice`
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Display name, e.g. `Invoice Parser`
    pub fn title(&self) -> &'static str {
        self.title
    }

    /// What the preset extracts
    pub fn description(&self) -> &'static str {
        self.description
    }

    /// Output schema
    pub fn schema(&self) -> &SchemaDescriptor {
        &self.schema
    }

    /// Default instructions
    pub fn instructions(&self) -> &'static str {
        self.instructions
    }

    /// Default options
    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Build a request for `input` using this preset's schema, instructions
    /// and options. `overrides` win over the preset's own options.
    pub fn request(
        &self,
        input: impl Into<String>,
        overrides: Option<&ParseOptions>,
    ) -> Result<ParseRequest, DomainError> {
        let options = match overrides {
            Some(o) => self.options.merged_with(o),
            None => self.options.clone(),
        };
        ParseRequest::build(input, self.schema.clone(), Some(self.instructions), Some(options))
    }
}

static REGISTRY: OnceLock<Vec<Preset>> = OnceLock::new();

fn registry() -> &'static [Preset] {
    REGISTRY.get_or_init(build_registry)
}

/// All presets, in stable order
pub fn list_presets() -> &'static [Preset] {
    registry()
}

/// Look up a preset by name.
///
/// Case-insensitive; also accepts `EMAIL_PARSER` and `Email Parser` forms.
pub fn get_preset(name: &str) -> Option<&'static Preset> {
    let key = normalize_name(name);
    registry()
        .iter()
        .find(|p| p.name == key || p.title.eq_ignore_ascii_case(name.trim()))
}

/// Clone of a preset's schema, for adapters that only want the shape
pub fn preset_schema(name: &str) -> Option<SchemaDescriptor> {
    get_preset(name).map(|p| p.schema.clone())
}

fn normalize_name(name: &str) -> String {
    let lowered = name.trim().to_lowercase();
    lowered
        .strip_suffix("_parser")
        .or_else(|| lowered.strip_suffix(" parser"))
        .unwrap_or(lowered.as_str())
        .trim()
        .to_string()
}

fn schema(fields: Vec<(&str, FieldSpec)>) -> SchemaDescriptor {
    SchemaDescriptor::from_trusted(fields.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
}

fn options(confidence: f64, timeout_secs: u64) -> ParseOptions {
    ParseOptions::new()
        .with_confidence_threshold(confidence)
        .with_timeout(Duration::from_secs(timeout_secs))
}

fn build_registry() -> Vec<Preset> {
    vec![
        Preset {
            name: "email",
            title: "Email Parser",
            description: "Sender, subject, dates, recipients and action items from email content",
            schema: schema(vec![
                ("sender", FieldSpec::Nested(schema(vec![
                    ("name", T::String.into()),
                    ("email", T::Email.into()),
                ]))),
                ("subject", T::String.into()),
                ("date", T::IsoDate.into()),
                ("recipients", T::StringArray.into()),
                ("body", T::String.into()),
                ("attachments", T::StringArray.into()),
                ("action_items", T::StringArray.into()),
                ("mentioned_dates", T::StringArray.into()),
                ("priority", T::String.into()),
            ]),
            instructions: "Parse email content focusing on actionable information, dates and contacts. \
                           Rate priority as low, medium, high or urgent.",
            options: options(0.85, 30),
        },
        Preset {
            name: "invoice",
            title: "Invoice Parser",
            description: "Amounts, dates, vendor and customer details from invoices",
            schema: schema(vec![
                ("invoice_number", T::String.into()),
                ("date", T::IsoDate.into()),
                ("due_date", T::IsoDate.into()),
                ("vendor", T::Object.into()),
                ("customer", T::Object.into()),
                ("line_items", T::Object.into()),
                ("subtotal", T::Number.into()),
                ("tax_amount", T::Number.into()),
                ("total_amount", T::Number.into()),
                ("currency", T::String.into()),
                ("payment_terms", T::String.into()),
            ]),
            instructions: "Extract all financial and business information. Parse amounts as numbers and dates as ISO-8601.",
            options: options(0.9, 45),
        },
        Preset {
            name: "contact",
            title: "Contact Parser",
            description: "Contact details from business cards, signatures and directory listings",
            schema: schema(vec![
                ("name", T::String.into()),
                ("email", T::Email.into()),
                ("phone", T::Phone.into()),
                ("company", T::String.into()),
                ("title", T::String.into()),
                ("address", T::Object.into()),
                ("social_media", T::Object.into()),
                ("notes", T::String.into()),
            ]),
            instructions: "Extract comprehensive contact information regardless of layout.",
            options: options(0.8, 20),
        },
        Preset {
            name: "csv",
            title: "CSV Parser",
            description: "Headers and typed rows from delimited text",
            schema: schema(vec![
                ("headers", T::StringArray.into()),
                ("rows", T::Object.into()),
                ("metadata", T::Object.into()),
            ]),
            instructions: "Detect the delimiter and header row, and infer column types.",
            options: options(0.9, 30),
        },
        Preset {
            name: "log",
            title: "Log Parser",
            description: "Timestamps, levels, services and messages from application logs",
            schema: schema(vec![
                ("entries", T::Object.into()),
                ("summary", T::Object.into()),
            ]),
            instructions: "Extract timestamp, level, service and message for every entry, and count entries per level.",
            options: options(0.85, 40),
        },
        Preset {
            name: "document",
            title: "Document Parser",
            description: "Parties, dates, amounts and key terms from contracts, reports and forms",
            schema: schema(vec![
                ("title", T::String.into()),
                ("document_type", T::String.into()),
                ("date", T::IsoDate.into()),
                ("parties", T::StringArray.into()),
                ("key_terms", T::Object.into()),
                ("dates", T::Object.into()),
                ("amounts", T::Object.into()),
                ("summary", T::String.into()),
            ]),
            instructions: "Focus on parties, dates, amounts and important terms. Keep the summary concise.",
            options: options(0.8, 60),
        },
        Preset {
            name: "meeting",
            title: "Meeting Notes Parser",
            description: "Participants, decisions and action items from meeting notes",
            schema: schema(vec![
                ("meeting_info", FieldSpec::Nested(schema(vec![
                    ("title", T::String.into()),
                    ("date", T::IsoDate.into()),
                    ("duration", T::String.into()),
                ]))),
                ("participants", T::StringArray.into()),
                ("key_decisions", T::StringArray.into()),
                ("action_items", T::Object.into()),
                ("next_meeting", FieldSpec::Nested(schema(vec![
                    ("date", T::IsoDate.into()),
                    ("agenda", T::StringArray.into()),
                ]))),
                ("summary", T::String.into()),
            ]),
            instructions: "List each action item with task, assignee, due date and priority.",
            options: options(0.8, 30),
        },
        Preset {
            name: "feedback",
            title: "Customer Feedback Parser",
            description: "Sentiment, issues and suggested actions from customer feedback",
            schema: schema(vec![
                ("customer_info", FieldSpec::Nested(schema(vec![
                    ("name", T::String.into()),
                    ("email", T::Email.into()),
                    ("tier", T::String.into()),
                ]))),
                ("sentiment", T::String.into()),
                ("issues", T::Object.into()),
                ("priority", T::String.into()),
                ("suggested_actions", T::StringArray.into()),
                ("escalation_required", T::Boolean.into()),
                ("summary", T::String.into()),
            ]),
            instructions: "Classify sentiment as positive, neutral or negative and give each issue a type, description and severity.",
            options: options(0.8, 30),
        },
    ]
}
