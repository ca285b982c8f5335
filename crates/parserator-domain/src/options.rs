//! Per-request parse options

use crate::error::DomainError;
use serde_json::{Map, Value};
use std::time::Duration;

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default number of retries after the first attempt
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Optional knobs for a single parse.
///
/// Unset fields fall back to the client's defaults (30 s timeout,
/// 3 retries, no confidence floor).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseOptions {
    /// Minimum confidence the service should accept (0.0..=1.0)
    pub confidence_threshold: Option<f64>,
    /// Per-request timeout
    pub timeout: Option<Duration>,
    /// Retries after the first attempt
    pub max_retries: Option<u32>,
    /// Ask the service to keep original whitespace and casing
    pub preserve_formatting: Option<bool>,
    /// Free-form instructions appended to the request's own instructions
    pub additional_instructions: Option<String>,
}

impl ParseOptions {
    /// Options with nothing set
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the confidence floor
    pub fn with_confidence_threshold(mut self, threshold: f64) -> Self {
        self.confidence_threshold = Some(threshold);
        self
    }

    /// Set the per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the retry budget
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    /// Ask the service to preserve formatting
    pub fn with_preserve_formatting(mut self, preserve: bool) -> Self {
        self.preserve_formatting = Some(preserve);
        self
    }

    /// Append free-form instructions
    pub fn with_additional_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.additional_instructions = Some(instructions.into());
        self
    }

    /// Effective timeout
    pub fn timeout_or_default(&self) -> Duration {
        self.timeout.unwrap_or(DEFAULT_TIMEOUT)
    }

    /// Effective retry budget
    pub fn max_retries_or_default(&self) -> u32 {
        self.max_retries.unwrap_or(DEFAULT_MAX_RETRIES)
    }

    /// Check ranges
    pub fn validate(&self) -> Result<(), DomainError> {
        if let Some(threshold) = self.confidence_threshold {
            if !(0.0..=1.0).contains(&threshold) {
                return Err(DomainError::InvalidOptions(format!(
                    "confidence_threshold must be between 0.0 and 1.0, got {}",
                    threshold
                )));
            }
        }
        if let Some(timeout) = self.timeout {
            if timeout.is_zero() {
                return Err(DomainError::InvalidOptions("timeout must be positive".to_string()));
            }
        }
        Ok(())
    }

    /// Merge two option sets; fields set on `overrides` win.
    pub fn merged_with(&self, overrides: &ParseOptions) -> ParseOptions {
        ParseOptions {
            confidence_threshold: overrides.confidence_threshold.or(self.confidence_threshold),
            timeout: overrides.timeout.or(self.timeout),
            max_retries: overrides.max_retries.or(self.max_retries),
            preserve_formatting: overrides.preserve_formatting.or(self.preserve_formatting),
            additional_instructions: overrides
                .additional_instructions
                .clone()
                .or_else(|| self.additional_instructions.clone()),
        }
    }

    /// The `options` wire object, or `None` when nothing in it is set
    pub(crate) fn to_wire(&self) -> Option<Value> {
        let mut map = Map::new();
        if let Some(timeout) = self.timeout {
            map.insert("timeout".to_string(), Value::from(timeout.as_millis() as u64));
        }
        if let Some(retries) = self.max_retries {
            map.insert("retries".to_string(), Value::from(retries));
        }
        if let Some(preserve) = self.preserve_formatting {
            map.insert("preserveFormatting".to_string(), Value::from(preserve));
        }
        if map.is_empty() {
            None
        } else {
            Some(Value::Object(map))
        }
    }
}
