use crate::constants::limits::MIN_RESULTS;
use crate::errors::ToolError;
use serde_json::Value;

#[derive(Clone)]
pub struct Validation;

impl Validation {
    pub fn new() -> Self {
        Self
    }

    pub fn ensure_string(
        &self,
        value: Option<&Value>,
        label: &str,
        trim: bool,
    ) -> Result<String, ToolError> {
        let text = value.and_then(Value::as_str).ok_or_else(|| {
            ToolError::invalid_params(format!("{} must be a non-empty string", label))
        })?;
        let normalized = text.trim();
        if normalized.is_empty() {
            return Err(ToolError::invalid_params(format!(
                "{} must be a non-empty string",
                label
            )));
        }
        Ok(if trim {
            normalized.to_string()
        } else {
            text.to_string()
        })
    }

    pub fn ensure_optional_string(
        &self,
        value: Option<&Value>,
        label: &str,
        trim: bool,
    ) -> Result<Option<String>, ToolError> {
        match value {
            None => Ok(None),
            Some(val) if val.is_null() => Ok(None),
            Some(Value::String(text)) if text.trim().is_empty() => Ok(None),
            Some(val) => self.ensure_string(Some(val), label, trim).map(Some),
        }
    }

    /// Free text where an empty string is meaningful (e.g. a playlist description).
    pub fn text_or_default(
        &self,
        value: Option<&Value>,
        label: &str,
        fallback: &str,
    ) -> Result<String, ToolError> {
        match value {
            None | Some(Value::Null) => Ok(fallback.to_string()),
            Some(Value::String(text)) => Ok(text.clone()),
            Some(_) => Err(ToolError::invalid_params(format!(
                "{} must be a string",
                label
            ))),
        }
    }

    /// Result counts are clamped into `MIN_RESULTS..=max` instead of rejected.
    pub fn ensure_count(
        &self,
        value: Option<&Value>,
        label: &str,
        fallback: u64,
        max: u64,
    ) -> Result<u64, ToolError> {
        let Some(value) = value.filter(|v| !v.is_null()) else {
            return Ok(fallback.clamp(MIN_RESULTS, max));
        };
        // JSON Schema counts 10.0 as an integer, so whole floats are accepted too.
        let numeric = value
            .as_i64()
            .or_else(|| {
                value
                    .as_f64()
                    .filter(|n| n.is_finite() && n.fract() == 0.0)
                    .map(|n| n as i64)
            })
            .ok_or_else(|| ToolError::invalid_params(format!("{} must be an integer", label)))?;
        Ok((numeric.max(MIN_RESULTS as i64) as u64).min(max))
    }
}

impl Default for Validation {
    fn default() -> Self {
        Self::new()
    }
}
