//! Extraction prompts and AI response parsing.
//!
//! The prompt lists a provider's fields grouped in the fixed
//! [`FieldCategory::ORDER`](crate::fields::FieldCategory::ORDER), so the same
//! catalogue always yields byte-identical text. The parser is lenient per
//! item: one malformed element never discards the well-formed ones.

use crate::error::ParseError;
use crate::fields::FieldCatalog;
use crate::models::SuggestionDraft;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::fmt::Write;

static CODE_FENCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^\s*```[A-Za-z0-9_-]*[ \t]*\r?\n?(.*?)\r?\n?\s*```\s*$").unwrap());

/// Builds extraction prompts for one provider's field catalogue.
#[derive(Debug, Clone, Copy)]
pub struct PromptBuilder<'a> {
    catalog: &'a FieldCatalog,
}

impl<'a> PromptBuilder<'a> {
    pub fn new(catalog: &'a FieldCatalog) -> Self {
        Self { catalog }
    }

    /// Instruction prompt asking for explicitly stated facts only.
    pub fn build(&self) -> String {
        let provider = self.catalog.provider().display_name();
        let mut prompt = String::new();

        // Writing to a String cannot fail
        let _ = writeln!(
            prompt,
            "You are an assistant that reviews meeting transcripts and finds contact \
             information that should be updated in {}.",
            provider
        );
        prompt.push('\n');
        prompt.push_str(
            "Extract ONLY information that is explicitly stated in the transcript. \
             Do not infer, guess or complete partial information. \
             If a value is not clearly stated, leave it out.\n",
        );
        prompt.push('\n');
        prompt.push_str("Look for the following fields (use the field name exactly as written):\n");

        for (category, fields) in self.catalog.grouped() {
            let _ = writeln!(prompt, "\n{}:", category.heading());
            for field in fields {
                let _ = writeln!(prompt, "- {} ({})", field.name, field.label);
            }
        }

        prompt.push('\n');
        prompt.push_str(
            "Respond with a JSON array only, no prose. Each element must be an object:\n\
             {\"field\": \"<field name>\", \"value\": \"<new value>\", \
             \"context\": \"<short quote from the transcript>\", \
             \"timestamp\": \"<mm:ss where it was said, or null>\"}\n",
        );
        prompt.push_str("If nothing relevant is found, respond with [].\n");
        prompt
    }
}

/// Build the extraction prompt for a catalogue.
pub fn build_prompt(catalog: &FieldCatalog) -> String {
    PromptBuilder::new(catalog).build()
}

/// Remove one surrounding Markdown code fence, if present.
pub fn strip_code_fence(raw: &str) -> &str {
    match CODE_FENCE_RE.captures(raw).and_then(|c| c.get(1)) {
        Some(inner) => inner.as_str().trim(),
        None => raw.trim(),
    }
}

/// Parse the AI response into drafts.
///
/// Non-JSON text yields [`ParseError::InvalidJson`]; JSON that is not an
/// array yields [`ParseError::InvalidFormat`]. Elements that are not objects,
/// or lack a non-null `field` or `value`, are skipped.
pub fn parse_response(raw: &str) -> Result<Vec<SuggestionDraft>, ParseError> {
    let body = strip_code_fence(raw);
    let parsed: Value = serde_json::from_str(body).map_err(|_| ParseError::InvalidJson)?;

    let items = match parsed {
        Value::Array(items) => items,
        _ => return Err(ParseError::InvalidFormat),
    };

    let total = items.len();
    let drafts: Vec<SuggestionDraft> = items.iter().filter_map(parse_item).collect();

    if drafts.len() < total {
        tracing::debug!(
            "Dropped {} malformed item(s) from AI response",
            total - drafts.len()
        );
    }

    Ok(drafts)
}

fn parse_item(item: &Value) -> Option<SuggestionDraft> {
    let object = item.as_object()?;
    let field = object.get("field")?.as_str()?.trim();
    if field.is_empty() {
        return None;
    }
    let value = scalar_to_string(object.get("value")?)?;

    Some(SuggestionDraft {
        field: field.to_string(),
        value,
        context: object.get("context").and_then(scalar_to_string),
        timestamp: object.get("timestamp").and_then(scalar_to_string),
    })
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
