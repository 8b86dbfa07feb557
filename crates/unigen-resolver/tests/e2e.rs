// SPDX-FileCopyrightText: 2026 Unigen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end resolution against a file-backed database and mock handlers.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use unigen_config::QuotaConfig;
use unigen_core::{
    AttributeFormat, AttributeHandler, AttributeSpec, AttributeValue, HandlerKind, HandlerOutcome,
};
use unigen_quota::QuotaTracker;
use unigen_resolver::{HandlerChain, Resolver};
use unigen_storage::Database;
use unigen_test_utils::MockHandler;

fn registry() -> Vec<AttributeSpec> {
    vec![
        AttributeSpec {
            name: "description".into(),
            format: AttributeFormat::Text,
            handlers: vec![HandlerKind::SearchRetrieval, HandlerKind::GptGeneral],
            extra_prompt: None,
            reference: None,
            example: None,
        },
        AttributeSpec {
            name: "popular_programs".into(),
            format: AttributeFormat::TextList,
            handlers: vec![HandlerKind::GptGeneral],
            extra_prompt: None,
            reference: None,
            example: None,
        },
    ]
}

fn resolver(db: &Database, handlers: Vec<Arc<dyn AttributeHandler>>) -> Resolver {
    let chain = Arc::new(HandlerChain::new(
        handlers,
        db.result_cache(),
        30,
        Duration::from_secs(5),
    ));
    Resolver::new(
        chain,
        registry(),
        None,
        Arc::new(Mutex::new(QuotaTracker::new(QuotaConfig::default()))),
        db.usage_ledger(),
        db.result_cache(),
        30,
        4,
    )
}

#[tokio::test]
async fn full_resolution_persists_and_replays_from_cache() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("unigen.db");

    let search = Arc::new(MockHandler::accepting(
        HandlerKind::SearchRetrieval,
        "A research-intensive public university in Toronto.",
    ));
    let general = Arc::new(MockHandler::with_outcomes(
        HandlerKind::GptGeneral,
        vec![Ok(HandlerOutcome::Accepted {
            value: AttributeValue::List(vec![
                "Computer Science".into(),
                "computer science".into(),
                "Engineering".into(),
            ]),
            references: vec!["https://mock.example".into()],
        })],
    ));

    // First run: both attributes resolve through handlers.
    {
        let db = Database::open(&db_path).await.unwrap();
        let resolver = resolver(&db, vec![search.clone(), general.clone()]);
        let resolved = resolver.resolve_university("University of Toronto").await.unwrap();

        assert!(resolved.university.description.contains("research-intensive"));
        // List dedup is case-insensitive, first occurrence wins.
        assert_eq!(
            resolved.university.popular_programs,
            vec!["Computer Science", "Engineering"]
        );
        assert_eq!(
            resolved.provenance["description"].handler,
            HandlerKind::SearchRetrieval
        );
        db.record_store().save(&resolved.university).await.unwrap();
    }

    // Second run against the same database file: with the handlers drained,
    // only the cache can answer. Same output means deterministic replay.
    {
        let db = Database::open(&db_path).await.unwrap();
        let drained: Vec<Arc<dyn AttributeHandler>> = vec![
            Arc::new(MockHandler::new(HandlerKind::SearchRetrieval)),
            Arc::new(MockHandler::new(HandlerKind::GptGeneral)),
        ];
        let resolver = resolver(&db, drained);
        let resolved = resolver.resolve_university("University of Toronto").await.unwrap();

        assert!(resolved.university.description.contains("research-intensive"));
        assert_eq!(
            resolved.university.popular_programs,
            vec!["Computer Science", "Engineering"]
        );

        // The record saved on the first run is still loadable.
        let saved = db
            .record_store()
            .load("University of Toronto")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(saved.university_name, "University of Toronto");
    }

    // Handlers from the first run were each called exactly once overall.
    assert_eq!(search.call_count().await, 1);
    assert_eq!(general.call_count().await, 1);
}
