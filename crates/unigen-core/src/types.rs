// SPDX-FileCopyrightText: 2026 Unigen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the unigen pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use strum::{Display, EnumString};

/// Identifies the resolution strategy a handler implements.
///
/// Order here reflects the usual chain priority: table lookups and
/// site-specific crawls first, search-augmented retrieval next, and the
/// general LLM as last resort.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum HandlerKind {
    RankingTable,
    TuitionCrawl,
    SearchRetrieval,
    GptGeneral,
}

/// Expected shape of a resolved attribute value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
pub enum AttributeFormat {
    /// Free text, kept verbatim.
    Text,
    /// A list of strings. A single newline-joined string is accepted and split.
    TextList,
    /// A single numeric value (parsed as f64, stored as text).
    Number,
    /// A numeric range such as `7179-12649` or `[7179, 12649]`.
    NumberRange,
    /// A single absolute URL.
    Url,
}

impl AttributeFormat {
    /// Parse a raw handler answer into a typed value, or explain the mismatch.
    ///
    /// Handlers (especially LLM-backed ones) return loosely shaped strings;
    /// this is where a list that arrived as one newline-joined string gets
    /// split, and where a non-numeric "number" gets rejected instead of
    /// leaking into the output record.
    pub fn parse(&self, raw: &str) -> Result<AttributeValue, String> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err("empty value".to_string());
        }
        match self {
            AttributeFormat::Text => Ok(AttributeValue::Text(trimmed.to_string())),
            AttributeFormat::TextList => {
                let items: Vec<String> = trimmed
                    .lines()
                    .map(|line| line.trim().trim_start_matches(['-', '*']).trim().to_string())
                    .filter(|line| !line.is_empty())
                    .collect();
                if items.is_empty() {
                    return Err("no list items".to_string());
                }
                Ok(AttributeValue::List(items))
            }
            AttributeFormat::Number => {
                let cleaned: String = trimmed
                    .chars()
                    .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
                    .collect();
                cleaned
                    .parse::<f64>()
                    .map_err(|_| format!("`{trimmed}` is not a number"))?;
                Ok(AttributeValue::Text(cleaned))
            }
            AttributeFormat::NumberRange => {
                let ungrouped = strip_grouping_commas(trimmed);
                let digits: Vec<String> = ungrouped
                    .split(|c: char| !(c.is_ascii_digit() || c == '.'))
                    .filter(|s| !s.is_empty() && s.parse::<f64>().is_ok())
                    .map(str::to_string)
                    .collect();
                match digits.len() {
                    1 => Ok(AttributeValue::Text(digits[0].clone())),
                    2 => Ok(AttributeValue::Text(format!("{} - {}", digits[0], digits[1]))),
                    n => Err(format!("expected 1 or 2 numbers in range, found {n}")),
                }
            }
            AttributeFormat::Url => {
                let parsed = url::Url::parse(trimmed)
                    .map_err(|e| format!("`{trimmed}` is not a valid URL: {e}"))?;
                Ok(AttributeValue::Text(parsed.to_string()))
            }
        }
    }
}

/// Remove digit-grouping commas so `$6,100` reads as one number, not two.
///
/// A comma is grouping when a digit precedes it and exactly three digits
/// follow it. `7179, 12649` and `[7179,12649]` keep their comma as a range
/// separator; `1,000,000` collapses to `1000000`.
fn strip_grouping_commas(raw: &str) -> String {
    let chars: Vec<char> = raw.chars().collect();
    let mut out = String::with_capacity(raw.len());
    for (i, &c) in chars.iter().enumerate() {
        if c == ',' {
            let after_digit = i > 0 && chars[i - 1].is_ascii_digit();
            let trailing = chars[i + 1..]
                .iter()
                .take_while(|c| c.is_ascii_digit())
                .count();
            if after_digit && trailing == 3 {
                continue;
            }
        }
        out.push(c);
    }
    out
}

/// A resolved attribute value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Text(String),
    List(Vec<String>),
}

impl AttributeValue {
    /// True when the value carries no content.
    pub fn is_empty(&self) -> bool {
        match self {
            AttributeValue::Text(s) => s.trim().is_empty(),
            AttributeValue::List(items) => items.is_empty(),
        }
    }

    /// Render as a single string (lists joined by newline).
    pub fn as_text(&self) -> String {
        match self {
            AttributeValue::Text(s) => s.clone(),
            AttributeValue::List(items) => items.join("\n"),
        }
    }

    /// Render as a list (text split on newlines).
    pub fn as_list(&self) -> Vec<String> {
        match self {
            AttributeValue::Text(s) => s
                .lines()
                .map(|l| l.trim().to_string())
                .filter(|l| !l.is_empty())
                .collect(),
            AttributeValue::List(items) => items.clone(),
        }
    }
}

/// Declares how one attribute is resolved: its expected format, the ordered
/// handler chain to try, and optional prompt/reference/example material
/// passed through to LLM-backed handlers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeSpec {
    /// Attribute name, e.g. `ranking_qs_news_2024` or `faculty`.
    pub name: String,
    /// Expected output shape; values failing this are rejected.
    pub format: AttributeFormat,
    /// Handlers to try in order; the first accepted result wins.
    pub handlers: Vec<HandlerKind>,
    /// Extra instructions appended to LLM prompts for this attribute.
    #[serde(default)]
    pub extra_prompt: Option<String>,
    /// Reference URLs worth checking for this attribute.
    #[serde(default)]
    pub reference: Option<String>,
    /// An example value, shown to LLM handlers to anchor the format.
    #[serde(default)]
    pub example: Option<String>,
}

/// One attribute-resolution request handed to a handler.
#[derive(Debug, Clone)]
pub struct AttributeRequest {
    /// Canonical university name.
    pub university_name: String,
    /// The attribute being resolved.
    pub spec: AttributeSpec,
    /// Reference URLs gathered so far (official website, wikipedia).
    pub reference: String,
}

/// The outcome of asking one handler for one attribute.
///
/// `Unavailable` means the handler has no answer for this input (not an
/// error); transport and configuration failures surface as `UnigenError`
/// from the handler instead.
#[derive(Debug, Clone, PartialEq)]
pub enum HandlerOutcome {
    /// The handler produced a value that passed format validation.
    Accepted {
        value: AttributeValue,
        references: Vec<String>,
    },
    /// The handler answered, but the value was refused (denylist token,
    /// format mismatch, empty).
    Rejected { reason: String },
    /// The handler has nothing for this university/attribute.
    Unavailable,
}

/// Records which handler produced an accepted value, and when.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Provenance {
    pub handler: HandlerKind,
    pub references: Vec<String>,
    pub resolved_at: DateTime<Utc>,
}

/// Identity facts resolved before the attribute chain runs: the canonical
/// name plus the two URLs every later handler uses as reference anchors.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BasicInfo {
    pub university_name: String,
    #[serde(default)]
    pub abbreviation: String,
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub wikipedia: String,
}

/// Deserialize a list field that may arrive as either a JSON array or a
/// single newline-joined string.
fn string_or_lines<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        List(Vec<String>),
        Joined(String),
    }
    match Raw::deserialize(deserializer)? {
        Raw::List(items) => Ok(items),
        Raw::Joined(s) => Ok(s
            .lines()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect()),
    }
}

/// A resolved university record.
///
/// Field set mirrors the attribute registry; unresolved attributes stay at
/// their defaults (empty string / empty list) rather than carrying filler.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct University {
    #[serde(default)]
    pub id: u32,
    pub university_name: String,
    #[serde(default)]
    pub abbreviation: String,
    #[serde(default)]
    pub university_type: String,
    #[serde(default)]
    pub graduation_year: String,
    #[serde(default, deserialize_with = "string_or_lines")]
    pub location: Vec<String>,
    #[serde(default)]
    pub graduation_rate: String,
    #[serde(default)]
    pub domestic_student_tuition: String,
    #[serde(default)]
    pub international_student_tuition: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "string_or_lines")]
    pub ranking: Vec<String>,
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub important_calendar: String,
    #[serde(default, deserialize_with = "string_or_lines")]
    pub statistics: Vec<String>,
    #[serde(default, deserialize_with = "string_or_lines")]
    pub faculty: Vec<String>,
    #[serde(default, deserialize_with = "string_or_lines")]
    pub popular_programs: Vec<String>,
    #[serde(default, deserialize_with = "string_or_lines")]
    pub characteristics: Vec<String>,
    #[serde(default)]
    pub wikipedia: String,
    #[serde(default)]
    pub others: String,
}

impl University {
    /// Create an otherwise-empty record for the given name.
    pub fn named(university_name: impl Into<String>) -> Self {
        Self {
            university_name: university_name.into(),
            ..Self::default()
        }
    }

    /// Assign a resolved value to the field matching `attribute`.
    ///
    /// Returns false when the attribute name is not a known field, so the
    /// caller can log and move on instead of panicking mid-run.
    pub fn set_attribute(&mut self, attribute: &str, value: &AttributeValue) -> bool {
        match attribute {
            "abbreviation" => self.abbreviation = value.as_text(),
            "university_type" => self.university_type = value.as_text(),
            "graduation_year" => self.graduation_year = value.as_text(),
            "location" => self.location = value.as_list(),
            "graduation_rate" => self.graduation_rate = value.as_text(),
            "domestic_student_tuition" => self.domestic_student_tuition = value.as_text(),
            "international_student_tuition" => {
                self.international_student_tuition = value.as_text()
            }
            "description" => self.description = value.as_text(),
            "ranking" => self.ranking = value.as_list(),
            "website" => self.website = value.as_text(),
            "important_calendar" => self.important_calendar = value.as_text(),
            "statistics" => self.statistics = value.as_list(),
            "faculty" => self.faculty = value.as_list(),
            "popular_programs" => self.popular_programs = value.as_list(),
            "characteristics" => self.characteristics = value.as_list(),
            "wikipedia" => self.wikipedia = value.as_text(),
            "others" => self.others = value.as_text(),
            _ => return false,
        }
        true
    }

    /// Read back the field matching `attribute`, if it is set.
    pub fn get_attribute(&self, attribute: &str) -> Option<AttributeValue> {
        let value = match attribute {
            "abbreviation" => AttributeValue::Text(self.abbreviation.clone()),
            "university_type" => AttributeValue::Text(self.university_type.clone()),
            "graduation_year" => AttributeValue::Text(self.graduation_year.clone()),
            "location" => AttributeValue::List(self.location.clone()),
            "graduation_rate" => AttributeValue::Text(self.graduation_rate.clone()),
            "domestic_student_tuition" => {
                AttributeValue::Text(self.domestic_student_tuition.clone())
            }
            "international_student_tuition" => {
                AttributeValue::Text(self.international_student_tuition.clone())
            }
            "description" => AttributeValue::Text(self.description.clone()),
            "ranking" => AttributeValue::List(self.ranking.clone()),
            "website" => AttributeValue::Text(self.website.clone()),
            "important_calendar" => AttributeValue::Text(self.important_calendar.clone()),
            "statistics" => AttributeValue::List(self.statistics.clone()),
            "faculty" => AttributeValue::List(self.faculty.clone()),
            "popular_programs" => AttributeValue::List(self.popular_programs.clone()),
            "characteristics" => AttributeValue::List(self.characteristics.clone()),
            "wikipedia" => AttributeValue::Text(self.wikipedia.clone()),
            "others" => AttributeValue::Text(self.others.clone()),
            _ => return None,
        };
        if value.is_empty() { None } else { Some(value) }
    }
}
