// HTTP-level tests against the in-memory store

use std::sync::Arc;

use actix_web::{http::StatusCode, test, App};
use chrono::Utc;
use serde_json::{json, Value};

use companion_discovery::auth::{issue_token, JwtValidator};
use companion_discovery::core::DiscoveryFeed;
use companion_discovery::models::ProviderProfile;
use companion_discovery::services::{CacheManager, DiscoveryService, InMemoryStore, SubscriptionService};
use companion_discovery::{configure_app, AppState};

const SECRET: &str = "test-secret";

fn provider(id: &str, rating: f64) -> ProviderProfile {
    ProviderProfile {
        id: id.to_string(),
        user_id: format!("user-{}", id),
        display_name: format!("Provider {}", id),
        age: 27,
        gender: "female".to_string(),
        hourly_rate: 120.0,
        is_verified: true,
        rating,
        review_count: 3,
        latitude: None,
        longitude: None,
        bio: Some("hello".to_string()),
        photo_urls: vec![],
        services: vec![],
        is_active: true,
        created_at: Utc::now(),
    }
}

fn app_state(providers: Vec<ProviderProfile>) -> AppState {
    let store = Arc::new(InMemoryStore::with_providers(providers));
    let cache = Arc::new(CacheManager::in_memory(1_000, 60));

    AppState {
        discovery: DiscoveryService::new(store.clone(), cache.clone(), DiscoveryFeed::default(), 20),
        subscriptions: SubscriptionService::new(store, cache),
        jwt: Arc::new(JwtValidator::new(SECRET, 0)),
    }
}

fn bearer(user_id: &str) -> (&'static str, String) {
    let token = issue_token(SECRET, user_id, 3600).unwrap();
    ("Authorization", format!("Bearer {}", token))
}

fn card_ids(body: &Value) -> Vec<String> {
    body["providers"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["id"].as_str().unwrap().to_string())
        .collect()
}

#[actix_web::test]
async fn test_health_is_public() {
    let app = test::init_service(App::new().configure(configure_app(app_state(vec![])))).await;

    let req = test::TestRequest::get().uri("/api/v1/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["status"], "healthy");
}

#[actix_web::test]
async fn test_cards_require_bearer_token() {
    let app = test::init_service(App::new().configure(configure_app(app_state(vec![provider("p1", 4.0)])))).await;

    let req = test::TestRequest::get().uri("/api/v1/discovery/cards").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::get()
        .uri("/api/v1/discovery/cards")
        .insert_header(("Authorization", "Bearer not-a-jwt"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["detail"], "Could not validate credentials");
}

#[actix_web::test]
async fn test_blocked_provider_never_returned() {
    let state = app_state(vec![provider("p1", 4.9), provider("p2", 4.5), provider("p3", 4.0)]);
    let app = test::init_service(App::new().configure(configure_app(state))).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/discovery/interact")
        .insert_header(bearer("seeker"))
        .set_json(json!({ "provider_id": "p1", "interaction_type": "block" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["interaction_type"], "block");
    assert_eq!(body["value"], -1.0);

    let req = test::TestRequest::get()
        .uri("/api/v1/discovery/cards?limit=50")
        .insert_header(bearer("seeker"))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(card_ids(&body), vec!["p2", "p3"]);
    assert_eq!(body["has_more"], false);
    assert!(body["next_cursor"].is_null());
}

#[actix_web::test]
async fn test_repeated_interaction_updates_single_row() {
    let app = test::init_service(App::new().configure(configure_app(app_state(vec![provider("p1", 4.0)])))).await;

    for kind in ["like", "super_like"] {
        let req = test::TestRequest::post()
            .uri("/api/v1/discovery/interact")
            .insert_header(bearer("seeker"))
            .set_json(json!({ "provider_id": "p1", "interaction_type": kind }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let req = test::TestRequest::get()
        .uri("/api/v1/discovery/interactions")
        .insert_header(bearer("seeker"))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["count"], 1);
    assert_eq!(body["interactions"][0]["interaction_type"], "super_like");
    assert_eq!(body["interactions"][0]["value"], 2.0);
}

#[actix_web::test]
async fn test_invalid_interaction_type_rejected() {
    let app = test::init_service(App::new().configure(configure_app(app_state(vec![provider("p1", 4.0)])))).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/discovery/interact")
        .insert_header(bearer("seeker"))
        .set_json(json!({ "provider_id": "p1", "interaction_type": "love" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert!(body["detail"].as_str().unwrap().contains("Invalid interaction type"));
}

#[actix_web::test]
async fn test_interact_with_unknown_provider_is_404() {
    let app = test::init_service(App::new().configure(configure_app(app_state(vec![])))).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/discovery/interact")
        .insert_header(bearer("seeker"))
        .set_json(json!({ "provider_id": "ghost", "interaction_type": "like" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_limit_out_of_range_rejected() {
    let app = test::init_service(App::new().configure(configure_app(app_state(vec![provider("p1", 4.0)])))).await;

    for uri in ["/api/v1/discovery/cards?limit=0", "/api/v1/discovery/cards?limit=51"] {
        let req = test::TestRequest::get().uri(uri).insert_header(bearer("seeker")).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{}", uri);
    }

    let req = test::TestRequest::get()
        .uri("/api/v1/discovery/cards?limit=50")
        .insert_header(bearer("seeker"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_unknown_cursor_rejected() {
    let app = test::init_service(App::new().configure(configure_app(app_state(vec![provider("p1", 4.0)])))).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/discovery/cards?cursor=does-not-exist")
        .insert_header(bearer("seeker"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["detail"], "Invalid cursor");
}

#[actix_web::test]
async fn test_cursor_pages_do_not_overlap() {
    let providers = (0..5).map(|i| provider(&format!("p{}", i), 4.0)).collect();
    let app = test::init_service(App::new().configure(configure_app(app_state(providers)))).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/discovery/cards?limit=2")
        .insert_header(bearer("seeker"))
        .to_request();
    let first: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(card_ids(&first), vec!["p0", "p1"]);
    assert_eq!(first["has_more"], true);
    assert_eq!(first["next_cursor"], "p1");

    let req = test::TestRequest::get()
        .uri("/api/v1/discovery/cards?limit=2&cursor=p1")
        .insert_header(bearer("seeker"))
        .to_request();
    let second: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(card_ids(&second), vec!["p2", "p3"]);
}

#[actix_web::test]
async fn test_second_subscription_rejected() {
    let app = test::init_service(App::new().configure(configure_app(app_state(vec![])))).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/subscriptions")
        .insert_header(bearer("member"))
        .set_json(json!({ "package_id": "gold" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let req = test::TestRequest::post()
        .uri("/api/v1/subscriptions")
        .insert_header(bearer("member"))
        .set_json(json!({ "package_id": "silver" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["detail"], "User already has an active subscription");

    let req = test::TestRequest::get()
        .uri("/api/v1/subscriptions/current")
        .insert_header(bearer("member"))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["package_id"], "gold");
    assert_eq!(body["status"], "active");
}

#[actix_web::test]
async fn test_packages_listing() {
    let app = test::init_service(App::new().configure(configure_app(app_state(vec![])))).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/subscriptions/packages")
        .insert_header(bearer("member"))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    let ids: Vec<_> = body.as_array().unwrap().iter().map(|p| p["id"].as_str().unwrap()).collect();
    assert!(ids.contains(&"gold"));
    assert_eq!(ids.len(), 3);
}

#[actix_web::test]
async fn test_preferences_put_then_get() {
    let app = test::init_service(App::new().configure(configure_app(app_state(vec![])))).await;

    let req = test::TestRequest::put()
        .uri("/api/v1/discovery/preferences")
        .insert_header(bearer("seeker"))
        .set_json(json!({ "min_age": 25, "max_age": 40, "gender_preferences": ["Female"], "sort_by": "price_low" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri("/api/v1/discovery/preferences")
        .insert_header(bearer("seeker"))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["user_id"], "seeker");
    assert_eq!(body["min_age"], 25);
    assert_eq!(body["max_age"], 40);
    assert_eq!(body["gender_preferences"], json!(["female"]));
    assert_eq!(body["sort_by"], "price_low");
}

#[actix_web::test]
async fn test_malformed_json_is_400() {
    let app = test::init_service(App::new().configure(configure_app(app_state(vec![])))).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/discovery/interact")
        .insert_header(bearer("seeker"))
        .insert_header(("Content-Type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_unknown_route_is_404() {
    let app = test::init_service(App::new().configure(configure_app(app_state(vec![])))).await;

    let req = test::TestRequest::get().uri("/api/v1/nowhere").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["detail"], "Not Found");
}

#[actix_web::test]
async fn test_non_finite_origin_rejected() {
    let app = test::init_service(App::new().configure(configure_app(app_state(vec![provider("p1", 4.0)])))).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/discovery/cards?lat=NaN&lon=10&max_distance_km=5")
        .insert_header(bearer("seeker"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
