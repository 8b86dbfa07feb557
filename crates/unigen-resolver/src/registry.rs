// SPDX-FileCopyrightText: 2026 Unigen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The default attribute registry.
//!
//! One `AttributeSpec` per resolvable `University` field, carrying the
//! handler chain order and the prompt material LLM handlers need. Identity
//! fields (name, abbreviation, website, wikipedia) are resolved by the
//! basic-info step instead and do not appear here.

use unigen_core::{AttributeFormat, AttributeSpec, HandlerKind};

fn spec(
    name: &str,
    format: AttributeFormat,
    handlers: Vec<HandlerKind>,
) -> AttributeSpec {
    AttributeSpec {
        name: name.to_string(),
        format,
        handlers,
        extra_prompt: None,
        reference: None,
        example: None,
    }
}

/// Attribute specs in output order.
pub fn default_registry() -> Vec<AttributeSpec> {
    use AttributeFormat::{Number, NumberRange, Text, TextList};
    use HandlerKind::{GptGeneral, RankingTable, SearchRetrieval, TuitionCrawl};

    vec![
        AttributeSpec {
            example: Some("\"Public\"".into()),
            ..spec("university_type", Text, vec![SearchRetrieval, GptGeneral])
        },
        AttributeSpec {
            extra_prompt: Some(
                "Report the typical program length in years for an undergraduate degree.".into(),
            ),
            example: Some("\"4\"".into()),
            ..spec("graduation_year", Number, vec![SearchRetrieval, GptGeneral])
        },
        AttributeSpec {
            extra_prompt: Some(
                "List every campus city, one per line, most important first.".into(),
            ),
            ..spec("location", TextList, vec![SearchRetrieval, GptGeneral])
        },
        AttributeSpec {
            extra_prompt: Some("Report the rate as a percentage without the % sign.".into()),
            example: Some("\"91.5\"".into()),
            ..spec("graduation_rate", Number, vec![SearchRetrieval, GptGeneral])
        },
        AttributeSpec {
            extra_prompt: Some(
                "Report the annual undergraduate tuition for domestic students in CAD.".into(),
            ),
            ..spec(
                "domestic_student_tuition",
                NumberRange,
                vec![TuitionCrawl, SearchRetrieval, GptGeneral],
            )
        },
        AttributeSpec {
            extra_prompt: Some(
                "Report the annual undergraduate tuition for international students in CAD."
                    .into(),
            ),
            ..spec(
                "international_student_tuition",
                NumberRange,
                vec![TuitionCrawl, SearchRetrieval, GptGeneral],
            )
        },
        AttributeSpec {
            extra_prompt: Some(
                "Two or three sentences a prospective student would find useful.".into(),
            ),
            ..spec("description", Text, vec![GptGeneral])
        },
        AttributeSpec {
            extra_prompt: Some(
                "One line per ranking source, formatted as `<source> |<rank>`.".into(),
            ),
            example: Some("[\"2024 QS News |34\", \"2024 Times Higher Education |18\"]".into()),
            ..spec(
                "ranking",
                TextList,
                vec![RankingTable, SearchRetrieval, GptGeneral],
            )
        },
        AttributeSpec {
            extra_prompt: Some(
                "Report key application deadlines for undergraduate admission.".into(),
            ),
            ..spec("important_calendar", Text, vec![SearchRetrieval, GptGeneral])
        },
        AttributeSpec {
            extra_prompt: Some(
                "Admission statistics such as enrollment, acceptance rate, student-faculty ratio, one per line."
                    .into(),
            ),
            ..spec("statistics", TextList, vec![SearchRetrieval, GptGeneral])
        },
        spec("faculty", TextList, vec![SearchRetrieval, GptGeneral]),
        AttributeSpec {
            extra_prompt: Some("List the most popular undergraduate programs.".into()),
            ..spec(
                "popular_programs",
                TextList,
                vec![RankingTable, SearchRetrieval, GptGeneral],
            )
        },
        AttributeSpec {
            extra_prompt: Some(
                "Distinctive characteristics of the university, one per line.".into(),
            ),
            ..spec("characteristics", TextList, vec![SearchRetrieval, GptGeneral])
        },
        spec("others", Text, vec![GptGeneral]),
    ]
}
