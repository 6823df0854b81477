//! Router tests against the in-memory store.
//!
//! Covers search, occupation lookup, simulation, persistence of simulations,
//! comparison, admin authentication and import, and the system endpoints.

mod helpers;

use axum::http::StatusCode;
use serde_json::json;

use helpers::{app, get, post_json, post_json_with_token, send, state, InMemoryStore};
use metier_core::{ScoreSource, TaskKind};

/// Kitchen and software occupations with a mix of real and access tasks.
fn seeded() -> std::sync::Arc<InMemoryStore> {
    let store = InMemoryStore::new();
    store.add_occupation(
        "M1805",
        "Études et développement informatique",
        Some("developpeur"),
        Some("Informatique"),
    );
    store.add_occupation(
        "G1602",
        "Personnel de cuisine",
        Some("cuisinier"),
        Some("Hôtellerie restauration"),
    );
    store.add_occupation(
        "D1102",
        "Boulangerie - viennoiserie",
        Some("boulanger"),
        Some("Commerce alimentaire"),
    );
    store.add_occupation(
        "H2102",
        "Conduite d'équipement de production alimentaire",
        None,
        Some("Industrie"),
    );

    let dev_a = store.add_task("M1805", "Concevoir une application");
    let dev_b = store.add_task("M1805", "Tester le code");
    store.add_task("M1805", "Cet emploi est accessible avec un diplôme de niveau Bac+3");
    store.set_score(dev_a, 60.0, Some("Assistants de code."));
    store.set_score(dev_b, 20.0, Some("Revue humaine."));

    let cook_a = store.add_task("G1602", "Préparer les entrées");
    store.add_task("G1602", "Dresser les assiettes");
    store.set_score(cook_a, 30.0, None);

    store
}

// =============================================================================
// SEARCH
// =============================================================================

#[tokio::test]
async fn test_blank_search_returns_empty_list() {
    let app = app(state(&seeded()));

    for uri in ["/search?q=", "/search?q=%20%20", "/search"] {
        let (status, body) = send(&app, get(uri)).await;
        assert_eq!(status, StatusCode::OK, "{}", uri);
        assert_eq!(body, json!({"occupations": []}), "{}", uri);
    }
}

#[tokio::test]
async fn test_search_is_accent_and_case_insensitive() {
    let app = app(state(&seeded()));

    let (status, body) = send(&app, get("/search?q=%C3%89TUDES")).await;
    assert_eq!(status, StatusCode::OK);
    let hits = body["occupations"].as_array().unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0]["code"], "M1805");
    assert_eq!(hits[0]["slug"], "developpeur");
}

#[tokio::test]
async fn test_search_ranks_and_annotates() {
    let app = app(state(&seeded()));

    // Title substring and sector substring share a tier; ties go alphabetical.
    let (_, body) = send(&app, get("/search?q=alimentaire")).await;
    let codes: Vec<&str> = body["occupations"]
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["code"].as_str().unwrap())
        .collect();
    assert_eq!(codes, vec!["D1102", "H2102"]);

    // Exact code lookup, statistics exclude access-requirement rows.
    let (_, body) = send(&app, get("/search?q=m1805")).await;
    let hit = &body["occupations"][0];
    assert_eq!(hit["taskCount"], 2);
    assert_eq!(hit["avgAutomationScore"], 40.0);

    // Tasks without a score row count as 0 in the mean.
    let (_, body) = send(&app, get("/search?q=cuisine")).await;
    let hit = &body["occupations"][0];
    assert_eq!(hit["code"], "G1602");
    assert_eq!(hit["taskCount"], 2);
    assert_eq!(hit["avgAutomationScore"], 15.0);
}

#[tokio::test]
async fn test_search_prefers_title_prefix_over_substring() {
    let store = seeded();
    store.add_occupation(
        "K2111",
        "Formation professionnelle",
        None,
        Some("Services aux personnels"),
    );
    let app = app(state(&store));

    let (_, body) = send(&app, get("/search?q=personnel")).await;
    assert_eq!(body["occupations"][0]["code"], "G1602");
}

// =============================================================================
// OCCUPATION DETAILS
// =============================================================================

#[tokio::test]
async fn test_unknown_slug_is_not_found() {
    let app = app(state(&seeded()));

    let (status, body) = send(&app, get("/occupations/astronaute/details")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");

    let (status, _) = send(&app, get("/occupations/Z9999/details")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_details_by_code_and_by_slug() {
    let app = app(state(&seeded()));

    let (status, by_code) = send(&app, get("/occupations/M1805/details")).await;
    assert_eq!(status, StatusCode::OK);
    let (_, by_slug) = send(&app, get("/occupations/DEVELOPPEUR/details")).await;
    assert_eq!(by_code, by_slug);

    assert_eq!(by_code["occupation"]["code"], "M1805");
    let tasks = by_code["tasks"].as_array().unwrap();
    assert_eq!(tasks.len(), 2, "access-requirement task must be hidden");
    assert_eq!(tasks[0]["label"], "Concevoir une application");
    assert_eq!(tasks[0]["automationScore"], 60.0);
    assert_eq!(tasks[0]["analysis"], "Assistants de code.");
    assert!(by_code.get("llmAnalysis").is_none());
}

#[tokio::test]
async fn test_details_without_analyzer_serve_stored_and_zero() {
    let app = app(state(&seeded()));

    let (status, body) = send(&app, get("/occupations/cuisinier/details")).await;
    assert_eq!(status, StatusCode::OK);
    let tasks = body["tasks"].as_array().unwrap();
    assert_eq!(tasks[0]["automationScore"], 30.0);
    assert!(tasks[0].get("analysis").is_none());
    assert_eq!(tasks[1]["automationScore"], 0.0);
}

// =============================================================================
// SIMULATION
// =============================================================================

#[tokio::test]
async fn test_weighted_simulation() {
    let app = app(state(&seeded()));

    // 5h at 60% and 5h at 20%: overall 40, 4 hours automated.
    let (status, body) = send(
        &app,
        post_json(
            "/occupations/M1805/simulation",
            json!({"timeAllocation": {"1": 5, "2": 5}}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["overallAutomationScore"], 40.0);
    assert_eq!(body["totalTime"], 10.0);
    assert_eq!(body["automatedTime"], 4.0);
    assert_eq!(body["taskResults"]["1"]["timeAutomated"], 3.0);
    assert_eq!(body["taskResults"]["2"]["automationScore"], 20.0);
}

#[tokio::test]
async fn test_simulation_ignores_foreign_ids_and_missing_tasks() {
    let app = app(state(&seeded()));

    // Task 3 is an access requirement, 99 does not exist: both ignored.
    let (status, body) = send(
        &app,
        post_json(
            "/occupations/M1805/simulation",
            json!({"timeAllocation": {"1": 10, "3": 30, "99": 12}}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["overallAutomationScore"], 60.0);
    assert_eq!(body["totalTime"], 10.0);
    assert_eq!(body["taskResults"]["2"]["timeSpent"], 0.0);
    assert!(body["taskResults"].get("3").is_none());
}

#[tokio::test]
async fn test_empty_allocation_scores_zero() {
    let app = app(state(&seeded()));

    let (status, body) = send(
        &app,
        post_json("/occupations/M1805/simulation", json!({"timeAllocation": {}})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["overallAutomationScore"], 0.0);
    assert_eq!(body["automatedTime"], 0.0);
    assert_eq!(body["totalTime"], 0.0);
}

#[tokio::test]
async fn test_negative_or_null_hours_rejected() {
    let app = app(state(&seeded()));

    let (status, body) = send(
        &app,
        post_json(
            "/occupations/M1805/simulation",
            json!({"timeAllocation": {"1": 5, "2": -1}}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation_error");
    assert!(body["error"].as_str().unwrap().contains("task 2"));

    let (status, body) = send(
        &app,
        post_json(
            "/occupations/M1805/simulation",
            json!({"timeAllocation": {"1": null}}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("task 1"));
}

#[tokio::test]
async fn test_malformed_simulation_body_is_validation_error() {
    let app = app(state(&seeded()));

    for body in [
        json!({"timeAllocation": {"1": "five"}}),
        json!({"timeAllocation": {"abc": 3}}),
        json!({"timeAllocation": [1, 2]}),
    ] {
        let (status, response) = send(
            &app,
            post_json("/occupations/M1805/simulation", body.clone()),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);
        assert_eq!(response["code"], "validation_error", "{}", body);
        assert!(response["error"].is_string());
    }

    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/simulations")
        .header("content-type", "application/json")
        .body(axum::body::Body::from("{not json"))
        .unwrap();
    let (status, response) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["code"], "validation_error");
}

#[tokio::test]
async fn test_overflowing_hours_rejected() {
    let app = app(state(&seeded()));

    let (status, body) = send(
        &app,
        post_json(
            "/occupations/M1805/simulation",
            json!({"timeAllocation": {"1": 1e308, "2": 1e308}}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation_error");
}

#[tokio::test]
async fn test_simulation_view_has_default_week() {
    let app = app(state(&seeded()));

    let (status, body) = send(&app, get("/occupations/M1805/simulation")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tasks"].as_array().unwrap().len(), 2);
    let allocation = body["defaultAllocation"].as_object().unwrap();
    let total: u64 = allocation.values().map(|v| v.as_u64().unwrap()).sum();
    assert_eq!(total, 35);
    assert_eq!(allocation["1"], 18);
    assert_eq!(allocation["2"], 17);
}

#[tokio::test]
async fn test_redistribute_endpoint() {
    let store = seeded();
    store.add_task("G1602", "Nettoyer le poste de travail");
    let app = app(state(&store));

    let (status, body) = send(
        &app,
        post_json("/occupations/G1602/simulation/redistribute", json!({"totalHours": 10})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let allocation = body["timeAllocation"].as_object().unwrap();
    let hours: Vec<u64> = allocation.values().map(|v| v.as_u64().unwrap()).collect();
    assert_eq!(hours, vec![4, 3, 3]);

    let (_, body) = send(
        &app,
        post_json("/occupations/G1602/simulation/redistribute", json!({})),
    )
    .await;
    let total: u64 = body["timeAllocation"]
        .as_object()
        .unwrap()
        .values()
        .map(|v| v.as_u64().unwrap())
        .sum();
    assert_eq!(total, 35);
}

#[tokio::test]
async fn test_simulation_unknown_occupation() {
    let app = app(state(&seeded()));

    let (status, _) = send(
        &app,
        post_json("/occupations/Z0000/simulation", json!({"timeAllocation": {}})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// SAVED SIMULATIONS
// =============================================================================

#[tokio::test]
async fn test_save_simulation() {
    let store = seeded();
    let app = app(state(&store));

    let (status, body) = send(
        &app,
        post_json(
            "/simulations",
            json!({"occupationCode": "M1805", "timeAllocations": {"1": 20, "2": 15}, "globalScore": 42.86}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["occupationCode"], "M1805");
    assert_eq!(body["globalScore"], 42.86);
    assert_eq!(body["timeAllocation"]["1"], 20.0);

    let saved = store.simulations();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].time_allocation.get(&2), Some(&15.0));
}

#[tokio::test]
async fn test_save_simulation_validation() {
    let store = seeded();
    let app = app(state(&store));

    let (status, body) = send(
        &app,
        post_json(
            "/simulations",
            json!({"occupationCode": "M1805", "timeAllocations": {"1": 5}, "globalScore": 140}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation_error");

    let (status, _) = send(
        &app,
        post_json(
            "/simulations",
            json!({"occupationCode": "M1805", "timeAllocations": {"1": -5}, "globalScore": 10}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        post_json(
            "/simulations",
            json!({"occupationCode": "Z0000", "timeAllocations": {}, "globalScore": 10}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    assert!(store.simulations().is_empty());
}

// =============================================================================
// COMPARISON
// =============================================================================

#[tokio::test]
async fn test_compare_two_occupations() {
    let app = app(state(&seeded()));

    let (status, body) = send(&app, get("/compare?a=developpeur&b=G1602")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["a"]["occupation"]["code"], "M1805");
    assert_eq!(body["a"]["averageAutomationScore"], 40.0);
    assert_eq!(body["b"]["averageAutomationScore"], 15.0);
    assert_eq!(body["difference"], 25.0);
}

#[tokio::test]
async fn test_compare_requires_both_sides() {
    let app = app(state(&seeded()));

    let (status, body) = send(&app, get("/compare?a=M1805")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("'b'"));

    let (status, _) = send(&app, get("/compare?a=M1805&b=inconnu")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// ADMIN
// =============================================================================

#[tokio::test]
async fn test_admin_rejected_without_configured_token() {
    let app = app(state(&seeded()));

    let (status, body) = send(
        &app,
        post_json_with_token("/admin/tasks/reclassify", "anything", json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "unauthorized");
}

#[tokio::test]
async fn test_admin_token_checked() {
    let app = app(state(&seeded()).with_admin_token("s3cret"));

    let (status, _) = send(&app, post_json("/admin/tasks/reclassify", json!({}))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        post_json_with_token("/admin/tasks/reclassify", "wrong", json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        &app,
        post_json_with_token("/admin/tasks/reclassify", "s3cret", json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["definition"], 4);
    assert_eq!(body["accessRequirement"], 1);
}

#[tokio::test]
async fn test_reclassify_persists_kinds() {
    let store = seeded();
    let app = app(state(&store).with_admin_token("s3cret"));

    send(
        &app,
        post_json_with_token("/admin/tasks/reclassify", "s3cret", json!({})),
    )
    .await;
    let kinds: Vec<Option<TaskKind>> = store.tasks().iter().map(|t| t.kind).collect();
    assert!(kinds.iter().all(|k| k.is_some()));
    assert_eq!(store.tasks()[2].kind, Some(TaskKind::AccessRequirement));
}

#[tokio::test]
async fn test_import_then_search() {
    let store = InMemoryStore::new();
    let app = app(state(&store).with_admin_token("s3cret"));

    let payload = json!({
        "occupations": [
            {"code_rome": "A1203", "titre": "Aménagement et entretien des espaces verts", "secteur": "Agriculture", "slug": "Jardinier"},
            {"code": "C1502", "title": "Gestion locative immobilière"}
        ],
        "tasks": [
            {"occupation_code_rome": "A1203", "libelle": "Tailler les haies"},
            {"occupation_code_rome": "A1203", "libelle": "Tailler les haies"},
            {"occupationCode": "A1203", "label": "Cet emploi est accessible avec un CAPA"},
            {"occupationCode": "C1502", "label": "Gérer les dossiers administratifs des locataires", "description": "Saisie et suivi"},
            {"occupationCode": "C1502", "label": "   "}
        ]
    });

    let (status, stats) = send(
        &app,
        post_json_with_token("/admin/import", "s3cret", payload),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["occupationsWritten"], 2);
    assert_eq!(stats["tasksInserted"], 3);
    assert_eq!(stats["tasksSkipped"], 2);
    assert_eq!(stats["defaultScoresInserted"], 2);
    assert_eq!(stats["classification"]["definition"], 2);
    assert_eq!(stats["classification"]["accessRequirement"], 1);
    assert_eq!(stats["taskBatchesFailed"], 0);

    for score in store.scores() {
        assert_eq!(score.source, ScoreSource::Default);
        assert!((0.0..=100.0).contains(&score.score_pct));
        assert_eq!(score.score_pct, score.score_pct.round());
    }

    let (_, body) = send(&app, get("/search?q=espaces%20verts")).await;
    assert_eq!(body["occupations"][0]["code"], "A1203");
    assert_eq!(body["occupations"][0]["slug"], "jardinier");
    assert_eq!(body["occupations"][0]["taskCount"], 1);

    let (status, _) = send(&app, get("/occupations/jardinier/details")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_import_reimport_keeps_existing_scores() {
    let store = seeded();
    let app = app(state(&store).with_admin_token("s3cret"));

    let payload = json!({
        "tasks": [{"occupationCode": "M1805", "label": "Concevoir une application"}]
    });
    let (status, stats) = send(
        &app,
        post_json_with_token("/admin/import", "s3cret", payload),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["tasksInserted"], 0);
    assert_eq!(stats["tasksSkipped"], 1);
    assert_eq!(store.score(1).unwrap().score_pct, 60.0);
}

#[tokio::test]
async fn test_import_failed_batch_is_counted() {
    let store = InMemoryStore::new();
    store.fail_task_inserts();
    let app = app(state(&store).with_admin_token("s3cret"));

    let payload = json!({
        "occupations": [{"code": "A1203", "title": "Espaces verts"}],
        "tasks": [{"occupationCode": "A1203", "label": "Tailler les haies"}]
    });
    let (status, stats) = send(
        &app,
        post_json_with_token("/admin/import", "s3cret", payload),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["occupationsWritten"], 1);
    assert_eq!(stats["taskBatchesFailed"], 1);
    assert_eq!(stats["tasksInserted"], 0);
}

// =============================================================================
// SYSTEM
// =============================================================================

#[tokio::test]
async fn test_health_and_openapi() {
    let app = app(state(&seeded()));

    let (status, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = send(&app, get("/openapi.json")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"].get("/search").is_some());
    assert!(body["components"]["securitySchemes"].get("admin_token").is_some());
}

#[tokio::test]
async fn test_request_id_header_is_set() {
    let app = app(state(&seeded()));

    let response = tower::ServiceExt::oneshot(app, get("/health")).await.unwrap();
    let id = response.headers().get("x-request-id").unwrap();
    assert!(uuid::Uuid::parse_str(id.to_str().unwrap()).is_ok());
}

#[tokio::test]
async fn test_rate_limit_rejects_excess_requests() {
    let limiter = metier_api::config::RateLimitConfig {
        enabled: true,
        requests: 1,
        period_secs: 3600,
    }
    .build()
    .unwrap()
    .unwrap();
    let app = app(state(&seeded()).with_rate_limiter(limiter));

    let (status, _) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["code"], "rate_limit_exceeded");
}
