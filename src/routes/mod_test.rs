use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use super::*;
use crate::state::test_helpers::{MockLlm, test_app_state, test_app_state_with_llm};

async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response: Response<Body> = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, body)
}

fn get_req(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

// =============================================================================
// health
// =============================================================================

#[tokio::test]
async fn healthz_ok() {
    let response = app(test_app_state()).oneshot(get_req("/healthz")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

// =============================================================================
// analyze-meal check order
// =============================================================================

#[tokio::test]
async fn analyze_meal_without_llm_is_configuration_error() {
    let (status, body) = send(app(test_app_state()), post_json("/api/analyze-meal", &json!({ "meal": "" }))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Server configuration error. Missing environment variables.");
}

#[tokio::test]
async fn analyze_meal_blank_meal_is_400() {
    let llm = Arc::new(MockLlm::default());
    let state = test_app_state_with_llm(llm.clone());
    let (status, body) = send(app(state), post_json("/api/analyze-meal", &json!({ "meal": "   " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Meal description is required");
    assert!(llm.requests().is_empty());
}

#[tokio::test]
async fn analyze_meal_unparsable_body_is_400() {
    let state = test_app_state_with_llm(Arc::new(MockLlm::default()));
    let request = Request::builder()
        .method("POST")
        .uri("/api/analyze-meal")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(app(state), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Meal description is required");
}

#[tokio::test]
async fn analyze_meal_without_bearer_is_401_and_skips_llm() {
    let llm = Arc::new(MockLlm::default());
    let state = test_app_state_with_llm(llm.clone());
    let (status, body) = send(app(state), post_json("/api/analyze-meal", &json!({ "meal": "oatmeal" }))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized");
    assert!(llm.requests().is_empty());
}

#[tokio::test]
async fn analyze_meal_bearer_without_token_is_401() {
    let state = test_app_state_with_llm(Arc::new(MockLlm::default()));
    let request = Request::builder()
        .method("POST")
        .uri("/api/analyze-meal")
        .header("content-type", "application/json")
        .header("authorization", "Bearer")
        .body(Body::from(json!({ "meal": "oatmeal" }).to_string()))
        .unwrap();
    let (status, _) = send(app(state), request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// =============================================================================
// auth-required routes
// =============================================================================

#[tokio::test]
async fn me_requires_credentials() {
    let (status, body) = send(app(test_app_state()), get_req("/api/auth/me")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized");
}

#[tokio::test]
async fn meal_history_requires_credentials() {
    let (status, _) = send(app(test_app_state()), get_req("/api/meals?order=recent")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// =============================================================================
// content parameter validation
// =============================================================================

#[tokio::test]
async fn invalid_condition_is_400_before_db() {
    for uri in [
        "/api/glossary?condition=euthyroid",
        "/api/vitamins?condition=both",
        "/api/symptoms/graves/fatigue",
        "/api/quick-facts?condition=general",
        "/api/recipes?condition=general",
        "/api/articles?condition=both",
    ] {
        let (status, body) = send(app(test_app_state()), get_req(uri)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert!(body["error"].as_str().unwrap().starts_with("Invalid condition"), "{uri}");
    }
}

// =============================================================================
// menu scan
// =============================================================================

#[tokio::test]
async fn menu_scan_scores_lines() {
    let (status, body) = send(
        app(test_app_state()),
        post_json("/api/menu/scan", &json!({ "text": "Grilled salmon\nFrench fries" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["item"], "Grilled salmon");
    assert_eq!(body[0]["score"], 9);
    assert_eq!(body[1]["score"], 0);
}

#[tokio::test]
async fn menu_scan_empty_text_is_400() {
    let (status, body) = send(app(test_app_state()), post_json("/api/menu/scan", &json!({ "text": " \n " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Menu text is required");
}

// =============================================================================
// workouts
// =============================================================================

#[tokio::test]
async fn workout_types_listed() {
    let (status, body) = send(app(test_app_state()), get_req("/api/workouts")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 6);
    assert_eq!(body[5]["slug"], "custom");
    assert_eq!(body[5]["is_custom"], true);
}

#[tokio::test]
async fn strength_route_wins_over_kind_param() {
    let (status, body) = send(app(test_app_state()), get_req("/api/workouts/strength")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["slug"], "shoulders");
}

#[tokio::test]
async fn cardio_filters_apply() {
    let (status, body) = send(app(test_app_state()), get_req("/api/workouts/cardio?search=run&difficulty=3")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([{
        "id": 5,
        "name": "Running",
        "description": "Moving at a speed faster than a walk, never having both feet on the ground at the same time.",
        "image_url": "https://images.unsplash.com/photo-1483721274302-3f77f59f5dd0?auto=format&fit=crop&w=300&q=80",
        "difficulty": 3
    }]));
}

#[tokio::test]
async fn unknown_workout_kind_is_404() {
    let (status, body) = send(app(test_app_state()), get_req("/api/workouts/pilates")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Workout type not found");
}

// =============================================================================
// analyze-meal and history (live Postgres)
// =============================================================================

#[cfg(feature = "live-db-tests")]
mod live {
    use super::*;
    use crate::llm::{Completion, CompletionRequest, LlmChat, LlmError};
    use crate::state::test_helpers::{confirmed_user_with_session, integration_pool, live_app_state};

    fn authed(method: &str, uri: &str, token: &str, body: Option<&Value>) -> Request<Body> {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("authorization", format!("Bearer {token}"));
        match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn stored_meals(pool: &sqlx::PgPool, user_id: uuid::Uuid) -> Vec<(String, String, i32)> {
        sqlx::query_as("SELECT meal, analysis, rating FROM analyzed_meals WHERE user_id = $1 ORDER BY id")
            .bind(user_id)
            .fetch_all(pool)
            .await
            .unwrap()
    }

    /// Completes normally but removes its caller first, so the follow-up insert fails.
    struct DeletesCallerLlm {
        pool: sqlx::PgPool,
        user_id: uuid::Uuid,
    }

    #[async_trait::async_trait]
    impl LlmChat for DeletesCallerLlm {
        async fn complete(&self, _request: &CompletionRequest<'_>) -> Result<Completion, LlmError> {
            sqlx::query("DELETE FROM users WHERE id = $1")
                .bind(self.user_id)
                .execute(&self.pool)
                .await
                .expect("user delete should succeed");
            Ok(Completion {
                text: "***Rating: 50/100***\n\nBalanced.".into(),
                model: "mock".into(),
                input_tokens: 0,
                output_tokens: 0,
            })
        }
    }

    #[tokio::test]
    #[ignore = "requires TEST_DATABASE_URL/live Postgres"]
    async fn analyze_meal_stores_trimmed_meal_and_rating_for_caller() {
        let pool = integration_pool().await;
        let (user_id, token) = confirmed_user_with_session(&pool).await;
        let reply = "***Rating: 150/100***\n\nSalmon is excellent.";
        let llm = Arc::new(MockLlm::replying(reply));
        let state = live_app_state(pool.clone(), Some(llm.clone()));

        let (status, body) = send(
            app(state),
            authed("POST", "/api/analyze-meal", &token, Some(&json!({ "meal": "  grilled salmon  " }))),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "analysis": reply }));
        assert_eq!(llm.requests()[0].user, "Analyze this meal: grilled salmon");
        assert_eq!(stored_meals(&pool, user_id).await, vec![("grilled salmon".to_owned(), reply.to_owned(), 150)]);
    }

    #[tokio::test]
    #[ignore = "requires TEST_DATABASE_URL/live Postgres"]
    async fn analyze_meal_empty_reply_is_stored_with_zero_rating() {
        let pool = integration_pool().await;
        let (user_id, token) = confirmed_user_with_session(&pool).await;
        let state = live_app_state(pool.clone(), Some(Arc::new(MockLlm::replying(""))));

        let (status, body) =
            send(app(state), authed("POST", "/api/analyze-meal", &token, Some(&json!({ "meal": "water" })))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "analysis": "" }));
        assert_eq!(stored_meals(&pool, user_id).await, vec![("water".to_owned(), String::new(), 0)]);
    }

    #[tokio::test]
    #[ignore = "requires TEST_DATABASE_URL/live Postgres"]
    async fn analyze_meal_unknown_token_is_401_before_llm() {
        let pool = integration_pool().await;
        let llm = Arc::new(MockLlm::default());
        let state = live_app_state(pool, Some(llm.clone()));
        let token = crate::services::session::generate_token();

        let (status, body) =
            send(app(state), authed("POST", "/api/analyze-meal", &token, Some(&json!({ "meal": "oatmeal" })))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Unauthorized");
        assert!(llm.requests().is_empty());
    }

    #[tokio::test]
    #[ignore = "requires TEST_DATABASE_URL/live Postgres"]
    async fn analyze_meal_passes_provider_status_through() {
        let pool = integration_pool().await;
        let (user_id, token) = confirmed_user_with_session(&pool).await;
        let llm = Arc::new(MockLlm::failing(LlmError::ApiResponse {
            status: 429,
            body: r#"{"error":{"message":"slow down"}}"#.into(),
        }));
        let state = live_app_state(pool.clone(), Some(llm));

        let (status, body) =
            send(app(state), authed("POST", "/api/analyze-meal", &token, Some(&json!({ "meal": "toast" })))).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body, json!({ "error": "slow down" }));
        assert!(stored_meals(&pool, user_id).await.is_empty());
    }

    #[tokio::test]
    #[ignore = "requires TEST_DATABASE_URL/live Postgres"]
    async fn analyze_meal_succeeds_when_saving_fails() {
        let pool = integration_pool().await;
        let (user_id, token) = confirmed_user_with_session(&pool).await;
        let llm = Arc::new(DeletesCallerLlm { pool: pool.clone(), user_id });
        let state = live_app_state(pool.clone(), Some(llm));

        let (status, body) =
            send(app(state), authed("POST", "/api/analyze-meal", &token, Some(&json!({ "meal": "lentil soup" })))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["analysis"], "***Rating: 50/100***\n\nBalanced.");
        assert!(stored_meals(&pool, user_id).await.is_empty());
    }

    #[tokio::test]
    #[ignore = "requires TEST_DATABASE_URL/live Postgres"]
    async fn meal_history_round_trip_over_http() {
        let pool = integration_pool().await;
        let (_, token) = confirmed_user_with_session(&pool).await;
        let llm = Arc::new(MockLlm::default());
        llm.push(Ok("***Rating: 40/100*** meh".into()));
        llm.push(Ok("***Rating: 90/100*** great".into()));
        let state = live_app_state(pool, Some(llm));
        let router = app(state);

        for meal in ["White toast", "Grilled salmon"] {
            let (status, _) = send(
                router.clone(),
                authed("POST", "/api/analyze-meal", &token, Some(&json!({ "meal": meal }))),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
        }

        let (status, meals) = send(router.clone(), authed("GET", "/api/meals?order=rating", &token, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(meals[0]["meal"], "Grilled salmon");
        assert_eq!(meals[0]["rating"], 90);
        assert_eq!(meals[1]["meal"], "White toast");

        let (_, suggestions) =
            send(router.clone(), authed("GET", "/api/meals/suggestions?q=SALM", &token, None)).await;
        assert_eq!(suggestions, json!(["Grilled salmon"]));

        let (status, found) =
            send(router.clone(), authed("GET", "/api/meals/lookup?meal=grilled%20SALMON", &token, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(found["id"], meals[0]["id"]);

        let id = meals[1]["id"].as_i64().unwrap();
        let (status, _) = send(router.clone(), authed("DELETE", &format!("/api/meals/{id}"), &token, None)).await;
        assert!(status.is_success());
        let (status, _) = send(router.clone(), authed("GET", &format!("/api/meals/{id}"), &token, None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
