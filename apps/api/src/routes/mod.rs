pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::extraction::handlers as extraction;
use crate::matching::handlers as matching;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Match API
        .route(
            "/api/v1/matches",
            get(matching::handle_list_matches).post(matching::handle_create_match),
        )
        .route(
            "/api/v1/matches/:id",
            get(matching::handle_get_match)
                .patch(matching::handle_update_match)
                .delete(matching::handle_delete_match),
        )
        .route(
            "/api/v1/candidates/:id/matches/top",
            get(matching::handle_top_for_candidate),
        )
        .route(
            "/api/v1/jobs/:id/matches/top",
            get(matching::handle_top_for_job),
        )
        .route(
            "/api/v1/score/:candidate_id/:job_id",
            post(matching::handle_calculate_score),
        )
        .route(
            "/api/v1/details/:candidate_id/:job_id",
            post(matching::handle_generate_details),
        )
        // Extraction API
        .route(
            "/api/v1/extract/resume",
            post(extraction::handle_extract_resume),
        )
        .route("/api/v1/extract/job", post(extraction::handle_extract_job))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::testing::{InMemoryDirectory, InMemoryMatchStore, ScriptedCompletion};

    fn router(llm: ScriptedCompletion) -> Router {
        let directory = Arc::new(
            InMemoryDirectory::default()
                .with_candidate(1, Some(json!({"skills": ["java"]})))
                .with_candidate(2, None)
                .with_job(1, Some(json!({"skills": ["java", "python"]})))
                .with_job(2, None),
        );
        let state = AppState::new(
            Arc::new(llm),
            Duration::from_secs(5),
            Arc::new(InMemoryMatchStore::default()),
            directory.clone(),
            directory,
        );
        build_router(state)
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json");
        let request = match body {
            Some(body) => request.body(Body::from(body.to_string())).unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    #[tokio::test]
    async fn test_health() {
        let app = router(ScriptedCompletion::unreachable());
        let (status, body) = send(&app, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_create_then_duplicate_conflicts() {
        let app = router(ScriptedCompletion::unreachable());
        let (status, created) = send(
            &app,
            "POST",
            "/api/v1/matches",
            Some(json!({"candidate_id": 1, "job_id": 1})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["score"], json!(0.5));
        assert_eq!(created["details"]["match_score"], json!(0.5));
        assert!(created["details"]["error"].is_string());
        assert_eq!(created["status"], "NEW");

        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/matches",
            Some(json!({"candidate_id": 1, "job_id": 1, "score": 0.9})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn test_create_for_unknown_job_is_404() {
        let app = router(ScriptedCompletion::unreachable());
        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/matches",
            Some(json!({"candidate_id": 1, "job_id": 77})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"]["message"].as_str().unwrap().contains("Job 77"));
    }

    #[tokio::test]
    async fn test_create_with_invalid_score_is_400() {
        let app = router(ScriptedCompletion::unreachable());
        let (status, _) = send(
            &app,
            "POST",
            "/api/v1/matches",
            Some(json!({"candidate_id": 1, "job_id": 1, "score": 2.0})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_patch_and_delete_lifecycle() {
        let app = router(ScriptedCompletion::unreachable());
        let (_, created) = send(
            &app,
            "POST",
            "/api/v1/matches",
            Some(json!({"candidate_id": 1, "job_id": 1, "score": 0.7, "details": {"match_score": 0.7}})),
        )
        .await;
        let uri = format!("/api/v1/matches/{}", created["id"]);

        let (status, updated) = send(
            &app,
            "PATCH",
            &uri,
            Some(json!({"status": "INTERVIEWING", "job_id": 2})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["status"], "INTERVIEWING");
        assert_eq!(updated["job_id"], 1);
        assert_eq!(updated["score"], json!(0.7));

        let (status, _) = send(&app, "DELETE", &uri, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = send(&app, "DELETE", &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(&app, "PATCH", &uri, Some(json!({"feedback": "x"}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_query_dispatch() {
        let app = router(ScriptedCompletion::unreachable());
        for (candidate, job, score) in [(1, 1, 0.9), (1, 2, 0.6), (2, 1, 0.8)] {
            send(
                &app,
                "POST",
                "/api/v1/matches",
                Some(json!({"candidate_id": candidate, "job_id": job, "score": score, "details": {}})),
            )
            .await;
        }

        let (_, by_candidate) = send(&app, "GET", "/api/v1/matches?candidate_id=1", None).await;
        assert_eq!(by_candidate.as_array().unwrap().len(), 2);

        let (_, pair) = send(&app, "GET", "/api/v1/matches?candidate_id=2&job_id=1", None).await;
        assert_eq!(pair[0]["score"], json!(0.8));

        let (status, _) = send(&app, "GET", "/api/v1/matches?candidate_id=2&job_id=2", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, high) = send(&app, "GET", "/api/v1/matches?min_score=0.8", None).await;
        let scores: Vec<f64> = high
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m["score"].as_f64().unwrap())
            .collect();
        assert_eq!(scores, vec![0.9, 0.8]);

        let (status, _) = send(&app, "GET", "/api/v1/matches?job_id=1&min_score=0.5", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, top) = send(&app, "GET", "/api/v1/jobs/1/matches/top?limit=1", None).await;
        assert_eq!(top.as_array().unwrap().len(), 1);
        assert_eq!(top[0]["candidate_id"], 1);

        let (_, all) = send(&app, "GET", "/api/v1/matches", None).await;
        assert_eq!(all.as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_score_endpoint_never_fails_on_adapter_outage() {
        let app = router(ScriptedCompletion::unreachable());
        let (status, body) = send(&app, "POST", "/api/v1/score/1/1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["score"], json!(0.5));

        let (status, details) = send(&app, "POST", "/api/v1/details/1/1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(details["match_score"], json!(0.5));
    }

    #[tokio::test]
    async fn test_extract_resume_degrades_instead_of_failing() {
        let app = router(ScriptedCompletion::unreachable());
        let (status, profile) = send(
            &app,
            "POST",
            "/api/v1/extract/resume",
            Some(json!({"resume_text": "Rust developer, 6 years"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(profile["raw_text"], "Rust developer, 6 years");
        assert!(profile["parsing_error"].is_string());

        let (status, _) = send(
            &app,
            "POST",
            "/api/v1/extract/resume",
            Some(json!({"resume_text": "   "})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_extract_job_uses_model_reply() {
        let app = router(ScriptedCompletion::reply(
            r#"{"required_skills": ["rust"], "remote_options": "hybrid"}"#,
        ));
        let (status, requirements) = send(
            &app,
            "POST",
            "/api/v1/extract/job",
            Some(json!({
                "title": "Platform Engineer",
                "company": "Hooli",
                "description": "Own our Rust services."
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(requirements["remote_options"], "hybrid");
    }
}
