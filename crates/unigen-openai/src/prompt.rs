// SPDX-FileCopyrightText: 2026 Unigen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prompt builders for the two GPT query shapes the pipeline uses:
//! basic-info lookup (canonical name, abbreviation, website, wikipedia from
//! any alias) and attribute resolution (a formatted value plus the reference
//! URLs consulted).
//!
//! Both ask for JSON and seed the exchange with a worked example so the
//! model anchors on the expected shape.

use serde::Deserialize;
use unigen_core::{AttributeRequest, BasicInfo, UnigenError};

use crate::types::ChatMessage;

const BASIC_INFO_SYSTEM: &str = "\
You are an education advisor in Canada helping high school students apply to \
universities. Given any university name, abbreviation, official website, or \
wikipedia link, respond with a JSON object holding the fields \
<university_name>, <abbreviation>, <website>, and <wikipedia>. Check the \
university's Wikipedia page when unsure. Respond with the JSON only.";

const BASIC_INFO_EXAMPLE: &str = r#"{"university_name":"The University of British Columbia","abbreviation":"UBC","website":"https://www.ubc.ca","wikipedia":"https://en.wikipedia.org/wiki/University_of_British_Columbia"}"#;

/// Messages for a basic-info lookup of `alias`.
pub fn basic_info_messages(alias: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(BASIC_INFO_SYSTEM),
        ChatMessage::user("UBC"),
        ChatMessage::assistant(BASIC_INFO_EXAMPLE),
        ChatMessage::user(alias),
    ]
}

/// Messages for resolving one attribute of one university.
pub fn attribute_messages(request: &AttributeRequest) -> Vec<ChatMessage> {
    let spec = &request.spec;
    let extra_prompt = spec.extra_prompt.as_deref().unwrap_or_default();
    let example = spec.example.as_deref().unwrap_or_default();
    let reference = match spec.reference.as_deref() {
        Some(extra) => format!("{} {extra}", request.reference),
        None => request.reference.clone(),
    };

    let system = format!(
        "# Instruction\n\
         You are an education advisor in Canada helping high school students apply \
         to universities. Given a university_name and a target_attribute, collect \
         the requested knowledge and answer with a JSON object of the form\n\
         {{\"output\": <value in the output format>, \"reference\": [<urls you checked>]}}\n\
         Think through the procedure step by step, but respond with the JSON only.\n\
         If you cannot find the value, set output to \"not available\".\n\
         \n\
         # Suggestion\n\
         When an official website for the university is provided, value it heavily \
         and check it first. {extra_prompt}\n\
         \n\
         # Extra Reference\n\
         {reference}\n\
         These are websites you may consider checking during data collection.\n\
         \n\
         # Output Format\n\
         output: {format}\n\
         reference: a list of URLs you checked\n\
         \n\
         # Example\n\
         {university}, {attribute}, {example}",
        format = spec.format,
        university = request.university_name,
        attribute = spec.name,
    );

    vec![
        ChatMessage::system(system),
        ChatMessage::user(format!(
            "university_name: {}\ntarget_attribute: {}",
            request.university_name, spec.name
        )),
    ]
}

/// An attribute answer parsed from the model's JSON.
#[derive(Debug, Clone, Deserialize)]
pub struct AttributeAnswer {
    pub output: serde_json::Value,
    #[serde(default)]
    pub reference: Vec<String>,
}

impl AttributeAnswer {
    /// The output rendered as text (JSON lists joined by newline).
    pub fn output_text(&self) -> String {
        match &self.output {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Array(items) => items
                .iter()
                .map(|v| match v {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join("\n"),
            other => other.to_string(),
        }
    }
}

/// Strip a Markdown code fence (``` or ```json) wrapping, if present.
///
/// Models regularly fence their JSON despite being told not to.
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.trim_end_matches('`').trim()
}

/// Parse the model's basic-info JSON.
pub fn parse_basic_info(raw: &str) -> Result<BasicInfo, UnigenError> {
    serde_json::from_str(strip_code_fence(raw)).map_err(|e| UnigenError::Provider {
        message: format!("failed to parse basic-info JSON: {e}"),
        source: Some(Box::new(e)),
    })
}

/// Parse the model's attribute-answer JSON.
pub fn parse_attribute_answer(raw: &str) -> Result<AttributeAnswer, UnigenError> {
    serde_json::from_str(strip_code_fence(raw)).map_err(|e| UnigenError::Provider {
        message: format!("failed to parse attribute JSON: {e}"),
        source: Some(Box::new(e)),
    })
}
