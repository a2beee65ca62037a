use std::any::Any;

use axum::{
    middleware::{from_fn, from_fn_with_state},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde_json::{json, Value};
use tower_http::{
    catch_panic::CatchPanicLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::error;

use super::health;
use super::middleware::{logging_middleware, request_deadline};
use super::state::AppState;
use super::types::{ApiError, Json};
use super::v1;

/// Create the full router with application state
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(banner))
        // Health endpoints
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .route("/live", get(health::live_check))
        // Catalog API
        .nest("/api/v1", v1::create_v1_router(&state))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(from_fn_with_state(state.clone(), request_deadline))
        .with_state(state)
        .layer(from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

async fn banner() -> Json<Value> {
    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!(panic = %detail, "Handler panicked");

    ApiError::internal("Internal server error").into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
    };
    use tokio_test::assert_ok;
    use tower::ServiceExt;

    use crate::api::state::test_support::{bearer, body_json, test_state};
    use crate::domain::{Login, NewMovie, Repository, RequestContext};
    use crate::infrastructure::user::{RegisterUserRequest, INVALID_CREDENTIALS_MESSAGE};

    fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, token);
        }
        match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn register(state: &AppState, login: &str, password: &str) {
        let ctx = RequestContext::with_timeout(Duration::from_secs(5));
        assert_ok!(
            state
                .user_service
                .register(
                    &ctx,
                    RegisterUserRequest {
                        login: login.to_string(),
                        password: password.to_string(),
                    },
                )
                .await
        );
    }

    #[tokio::test]
    async fn test_health_and_banner() {
        let app = create_router(test_state());

        let response = app
            .clone()
            .oneshot(request(Method::GET, "/health", None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(request(Method::GET, "/", None, None))
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["name"], env!("CARGO_PKG_NAME"));
    }

    #[tokio::test]
    async fn test_request_id_is_echoed() {
        let response = create_router(test_state())
            .oneshot(request(Method::GET, "/live", None, None))
            .await
            .unwrap();

        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_every_mutating_route_requires_token() {
        let app = create_router(test_state());
        let payloads = [
            ("/api/v1/movies", json!({ "title": "Heat", "year": 1995 })),
            ("/api/v1/directors", json!({ "name": "Michael Mann" })),
            ("/api/v1/users", json!({ "login": "mallory", "password": "password123" })),
        ];

        for (uri, body) in payloads {
            let response = app
                .clone()
                .oneshot(request(Method::POST, uri, None, Some(body)))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "POST {}", uri);
        }

        for uri in ["/api/v1/movies/1", "/api/v1/directors/1", "/api/v1/users/alice"] {
            let response = app
                .clone()
                .oneshot(request(Method::DELETE, uri, None, None))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "DELETE {}", uri);

            let response = app
                .clone()
                .oneshot(request(Method::DELETE, uri, Some("Bearer not-a-token"), None))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "DELETE {}", uri);
        }
    }

    #[tokio::test]
    async fn test_reads_are_public() {
        let app = create_router(test_state());

        for uri in ["/api/v1/movies", "/api/v1/directors", "/api/v1/users"] {
            let response = app
                .clone()
                .oneshot(request(Method::GET, uri, None, None))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK, "GET {}", uri);
            assert_eq!(body_json(response).await, json!([]));
        }
    }

    #[tokio::test]
    async fn test_alice_scenario() {
        let state = test_state();
        register(&state, "alice", "s3cret").await;

        let ctx = RequestContext::with_timeout(Duration::from_secs(5));
        let stored = state
            .repositories
            .users
            .get_by_id(&ctx, &Login::new("alice").unwrap())
            .await
            .unwrap();
        assert_ne!(stored.password_hash().as_str(), "s3cret");
        assert!(stored.password_hash().as_str().starts_with("$argon2id$"));

        let app = create_router(state);

        let response = app
            .clone()
            .oneshot(request(
                Method::POST,
                "/api/v1/login",
                None,
                Some(json!({ "login": "alice", "password": "wrong" })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(body["error"]["message"], INVALID_CREDENTIALS_MESSAGE);

        let response = app
            .clone()
            .oneshot(request(
                Method::POST,
                "/api/v1/login",
                None,
                Some(json!({ "login": "alice", "password": "s3cret" })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert!(body["expires_at"].is_string());
        let token = format!("Bearer {}", body["token"].as_str().unwrap());

        let response = app
            .clone()
            .oneshot(request(
                Method::POST,
                "/api/v1/directors",
                Some(&token),
                Some(json!({ "name": "Lana Wachowski" })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let director_id = body_json(response).await["id"].as_i64().unwrap();

        let response = app
            .clone()
            .oneshot(request(
                Method::POST,
                "/api/v1/movies",
                Some(&token),
                Some(json!({ "title": "The Matrix", "year": 1999, "director_id": director_id })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let movie_id = body_json(response).await["id"].as_i64().unwrap();
        let movie_uri = format!("/api/v1/movies/{}", movie_id);

        let response = app
            .clone()
            .oneshot(request(Method::GET, &movie_uri, None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let movie = body_json(response).await;
        assert_eq!(movie["title"], "The Matrix");
        assert_eq!(movie["director_id"], director_id);

        let response = app
            .clone()
            .oneshot(request(Method::GET, "/api/v1/movies", None, None))
            .await
            .unwrap();
        assert_eq!(body_json(response).await.as_array().unwrap().len(), 1);

        let response = app
            .clone()
            .oneshot(request(Method::DELETE, &movie_uri, Some(&token), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({ "deleted": true, "id": movie_id })
        );

        let response = app
            .oneshot(request(Method::GET, &movie_uri, None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let state = test_state();
        register(&state, "alice", "wonderland-1").await;
        let app = create_router(state);

        let wrong_password = app
            .clone()
            .oneshot(request(
                Method::POST,
                "/api/v1/login",
                None,
                Some(json!({ "login": "alice", "password": "not-the-password" })),
            ))
            .await
            .unwrap();
        let unknown_login = app
            .oneshot(request(
                Method::POST,
                "/api/v1/login",
                None,
                Some(json!({ "login": "bob", "password": "not-the-password" })),
            ))
            .await
            .unwrap();

        assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(unknown_login.status(), StatusCode::UNAUTHORIZED);

        let wrong_password = body_json(wrong_password).await;
        let unknown_login = body_json(unknown_login).await;
        assert_eq!(wrong_password, unknown_login);
        assert_eq!(wrong_password["error"]["message"], INVALID_CREDENTIALS_MESSAGE);
    }

    #[tokio::test]
    async fn test_user_routes_hide_password_hash() {
        let state = test_state();
        let token = bearer(&state, "admin");
        let app = create_router(state);

        let response = app
            .clone()
            .oneshot(request(
                Method::POST,
                "/api/v1/users",
                Some(&token),
                Some(json!({ "login": "carol", "password": "carol-password" })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let created = body_json(response).await;
        assert_eq!(created["login"], "carol");
        assert!(created.get("password_hash").is_none());

        let response = app
            .clone()
            .oneshot(request(Method::GET, "/api/v1/users/carol", None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_json(response).await.get("password_hash").is_none());

        let response = app
            .clone()
            .oneshot(request(
                Method::POST,
                "/api/v1/users",
                Some(&token),
                Some(json!({ "login": "carol", "password": "carol-password" })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let response = app
            .oneshot(request(Method::DELETE, "/api/v1/users/carol", Some(&token), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({ "deleted": true, "id": "carol" })
        );
    }

    #[tokio::test]
    async fn test_invalid_payloads_are_rejected() {
        let state = test_state();
        let token = bearer(&state, "alice");
        let app = create_router(state);

        let response = app
            .clone()
            .oneshot(request(
                Method::POST,
                "/api/v1/movies",
                Some(&token),
                Some(json!({ "title": "", "year": 1999 })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app
            .oneshot(request(
                Method::POST,
                "/api/v1/directors",
                Some(&token),
                Some(json!({ "nombre": "typo" })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "json_parse_error");
    }

    #[tokio::test]
    async fn test_unknown_items_are_not_found() {
        let app = create_router(test_state());

        for uri in ["/api/v1/movies/42", "/api/v1/directors/abc", "/api/v1/users/nobody"] {
            let response = app
                .clone()
                .oneshot(request(Method::GET, uri, None, None))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "GET {}", uri);
        }
    }

    #[tokio::test]
    async fn test_undecodable_id_is_not_found() {
        let app = create_router(test_state());

        let response = app
            .oneshot(request(Method::GET, "/api/v1/movies/%FF", None, None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["error"]["type"], "not_found_error");
    }

    #[tokio::test]
    async fn test_delete_unknown_movie_leaves_store_untouched() {
        let state = test_state();
        let token = bearer(&state, "alice");
        let ctx = RequestContext::with_timeout(Duration::from_secs(5));
        let movies = state.repositories.movies.clone();
        movies
            .create(
                &ctx,
                NewMovie {
                    title: "Stalker".to_string(),
                    year: 1979,
                    director_id: None,
                },
            )
            .await
            .unwrap();
        let app = create_router(state);

        let response = app
            .oneshot(request(Method::DELETE, "/api/v1/movies/999", Some(&token), None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["error"]["type"], "not_found_error");
        assert_eq!(movies.count(&ctx).await.unwrap(), 1);
    }
}
