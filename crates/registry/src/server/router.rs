//! Axum router construction.

use std::time::Duration;

use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{get, patch, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use super::{
    handlers::{self, auth, geolocations, health, households, programs},
    middleware,
    state::AppState,
};

const CORS_MAX_AGE: Duration = Duration::from_secs(300);

fn cors(trusted_origins: Vec<HeaderValue>, api_key_header: HeaderName) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(trusted_origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
        ])
        .allow_headers([
            header::ACCEPT,
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            HeaderName::from_static("x-csrf-token"),
            api_key_header,
        ])
        .expose_headers([header::LINK])
        .max_age(CORS_MAX_AGE)
}

/// Build the application [`Router`] with all routes and middleware attached.
///
/// Household routes run the API-key middleware; everything else is open.
pub fn build(state: AppState, trusted_origins: Vec<HeaderValue>) -> Router {
    let authenticated = Router::new()
        .route("/v1/house_holds", post(households::create_household))
        .route("/v1/house_holds/head", post(households::create_head))
        .route("/v1/house_holds/member", post(households::create_member))
        .route("/v1/house_holds/:id", get(households::get_household))
        .route_layer(from_fn_with_state(state.clone(), middleware::authenticate));

    Router::new()
        .route("/v1/programs", post(programs::create_program))
        .route("/v1/programs/:id", patch(programs::update_program))
        .route("/v1/geo_locations", post(geolocations::create_geolocation))
        .route("/v1/register", post(auth::register))
        .merge(authenticated)
        .route("/health", get(health::health))
        .fallback(handlers::not_found)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(middleware::REQUEST_TIMEOUT))
        .layer(CompressionLayer::new())
        .layer(cors(trusted_origins, state.api_key_header.clone()))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, http::StatusCode};
    use axum_test::TestServer;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    use crate::store::memory::MemoryStore;
    use crate::store::StoreError;

    fn server() -> (TestServer, Arc<MemoryStore>) {
        let (state, store) = AppState::for_tests();
        let app = build(state, vec![HeaderValue::from_static("https://aid.example.org")]);
        (TestServer::new(app).unwrap(), store)
    }

    fn api_key(value: &str) -> (HeaderName, HeaderValue) {
        (
            HeaderName::from_static("apikey"),
            HeaderValue::from_str(value).unwrap(),
        )
    }

    async fn register(server: &TestServer) -> String {
        let resp = server
            .post("/v1/register")
            .json(&json!({"email": "officer@example.org", "name": "Field Officer"}))
            .await;
        assert_eq!(resp.status_code(), StatusCode::CREATED);
        let body: Value = resp.json();
        assert!(body["user"].get("token_hash").is_none());
        body["api_key"]["token"].as_str().unwrap().to_owned()
    }

    /// Program 1 and geolocation 1.
    async fn seed(server: &TestServer) {
        let resp = server
            .post("/v1/programs")
            .json(&json!({
                "name": "Inua Jamii",
                "category": "cash transfer",
                "description": "Monthly stipend for older persons"
            }))
            .await;
        assert_eq!(resp.status_code(), StatusCode::CREATED);
        let resp = server
            .post("/v1/geo_locations")
            .json(&json!({
                "county": "Kisumu",
                "sub_county": "Nyando",
                "location": "Awasi",
                "sub_location": "Ogenya"
            }))
            .await;
        assert_eq!(resp.status_code(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn unknown_route_returns_404() {
        let (state, _) = AppState::for_tests();
        let app = build(state, Vec::new());
        let req = Request::builder()
            .uri("/unknown")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), 404);
    }

    #[tokio::test]
    async fn health_reflects_database() {
        let (server, store) = server();
        let resp = server.get("/health").await;
        assert_eq!(resp.status_code(), StatusCode::OK);
        assert_eq!(resp.json::<Value>()["database_ready"], true);

        store.fail_with(|| StoreError::Database("connection refused".into()));
        let resp = server.get("/health").await;
        assert_eq!(resp.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(resp.json::<Value>()["status"], "degraded");
    }

    #[tokio::test]
    async fn program_lifecycle() {
        let (server, _) = server();
        seed(&server).await;

        let resp = server
            .post("/v1/programs")
            .json(&json!({
                "name": "Inua Jamii",
                "category": "cash transfer",
                "description": "again"
            }))
            .await;
        assert_eq!(resp.status_code(), StatusCode::CONFLICT);
        assert!(resp.json::<Value>()["fields"]["name"].is_string());

        let resp = server
            .patch("/v1/programs/1")
            .json(&json!({"description": "Quarterly stipend"}))
            .await;
        assert_eq!(resp.status_code(), StatusCode::OK);
        let body: Value = resp.json();
        assert_eq!(body["program"]["description"], "Quarterly stipend");
        assert_eq!(body["program"]["name"], "Inua Jamii");

        let resp = server
            .patch("/v1/programs/77")
            .json(&json!({"name": "x"}))
            .await;
        assert_eq!(resp.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn invalid_program_is_422() {
        let (server, _) = server();
        let resp = server
            .post("/v1/programs")
            .json(&json!({"name": "", "category": "cash transfer"}))
            .await;
        assert_eq!(resp.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = resp.json();
        assert_eq!(body["fields"]["name"], "must be provided");
        assert_eq!(body["fields"]["description"], "must be provided");
    }

    #[tokio::test]
    async fn malformed_json_is_400() {
        let (server, _) = server();
        let resp = server
            .post("/v1/geo_locations")
            .content_type("application/json")
            .bytes("{\"county\":".into())
            .await;
        assert_eq!(resp.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(resp.json::<Value>()["code"], "bad_request");
    }

    #[tokio::test]
    async fn households_require_api_key() {
        let (server, _) = server();
        let resp = server
            .post("/v1/house_holds")
            .json(&json!({"program_id": 1, "geo_location_id": 1, "name": "Otieno"}))
            .await;
        assert_eq!(resp.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(resp.json::<Value>()["code"], "authentication_required");
        assert_eq!(resp.headers().get(header::VARY).unwrap(), "apikey");
    }

    #[tokio::test]
    async fn bad_api_key_is_rejected() {
        let (server, _) = server();
        for presented in ["garbage", "Y3LTQ5MIRXDIVU6NVNQ2RPZTAI"] {
            let (name, value) = api_key(presented);
            let resp = server
                .get("/v1/house_holds/1")
                .add_header(name, value)
                .await;
            assert_eq!(resp.status_code(), StatusCode::UNAUTHORIZED);
            assert_eq!(resp.json::<Value>()["code"], "invalid_credentials");
        }
    }

    #[tokio::test]
    async fn household_flow_end_to_end() {
        let (server, store) = server();
        seed(&server).await;
        let token = register(&server).await;

        let (name, value) = api_key(&token);
        let resp = server
            .post("/v1/house_holds")
            .add_header(name.clone(), value.clone())
            .json(&json!({"program_id": 1, "geo_location_id": 1, "name": "Otieno"}))
            .await;
        assert_eq!(resp.status_code(), StatusCode::CREATED);
        let id = resp.json::<Value>()["house_hold"]["id"].as_i64().unwrap();

        let resp = server
            .post("/v1/house_holds/member")
            .add_header(name.clone(), value.clone())
            .json(&json!({"house_hold_id": id, "name": "Baraka", "age": 9, "relation": "child"}))
            .await;
        assert_eq!(resp.status_code(), StatusCode::NOT_FOUND);
        assert!(resp.json::<Value>()["fields"]["house_hold_id"].is_string());

        let resp = server
            .post("/v1/house_holds/head")
            .add_header(name.clone(), value.clone())
            .json(&json!({
                "house_hold_id": id,
                "name": "Achieng Otieno",
                "national_id": "22334455",
                "phone_number": "+254712345678",
                "age": 41
            }))
            .await;
        assert_eq!(resp.status_code(), StatusCode::CREATED);
        assert_eq!(
            resp.json::<Value>()["house_hold_head"]["phone_number"],
            "+254712345678"
        );
        assert_ne!(store.stored_phone(1).as_deref(), Some("+254712345678"));

        let resp = server
            .post("/v1/house_holds/member")
            .add_header(name.clone(), value.clone())
            .json(&json!({"house_hold_id": id, "name": "Baraka", "age": 9, "relation": "child"}))
            .await;
        assert_eq!(resp.status_code(), StatusCode::CREATED);

        let resp = server
            .get(&format!("/v1/house_holds/{id}"))
            .add_header(name, value)
            .await;
        assert_eq!(resp.status_code(), StatusCode::OK);
        let body: Value = resp.json();
        assert_eq!(body["house_hold"]["phone_number"], "+254712345678");
        assert_eq!(body["house_hold"]["household_member_count"], 1);
        assert_eq!(body["house_hold"]["program_name"], "Inua Jamii");
    }

    #[tokio::test]
    async fn household_with_unknown_program_is_404() {
        let (server, _) = server();
        let token = register(&server).await;
        let (name, value) = api_key(&token);
        let resp = server
            .post("/v1/house_holds")
            .add_header(name, value)
            .json(&json!({"program_id": 5, "geo_location_id": 1, "name": "Otieno"}))
            .await;
        assert_eq!(resp.status_code(), StatusCode::NOT_FOUND);
        assert!(resp.json::<Value>()["fields"]["program_id"].is_string());
    }

    #[tokio::test]
    async fn duplicate_registration_conflicts() {
        let (server, _) = server();
        register(&server).await;
        let resp = server
            .post("/v1/register")
            .json(&json!({"email": "officer@example.org", "name": "Someone Else"}))
            .await;
        assert_eq!(resp.status_code(), StatusCode::CONFLICT);
    }
}
