//! HTTP-level tests for the booking API, backed by the in-memory store.

use std::sync::Arc;

use aeroline_api::middleware::issue_token;
use aeroline_api::state::AuthConfig;
use aeroline_api::{app, AppState};
use aeroline_core::services::{ensure_admin, register_user, Registration};
use aeroline_core::{MemoryStore, Repository};
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

struct TestApp {
    router: Router,
    admin: String,
    user: String,
    other_user: String,
}

async fn test_app() -> TestApp {
    let repo: Arc<dyn Repository> = Arc::new(MemoryStore::new());
    let auth = AuthConfig {
        secret: "test-secret".into(),
        expiration: 3600,
    };

    let admin = ensure_admin(repo.as_ref(), "admin@example.com", "admin-pass").await.unwrap();
    let user = register_user(repo.as_ref(), &registration("user@example.com")).await.unwrap();
    let other = register_user(repo.as_ref(), &registration("other@example.com")).await.unwrap();

    TestApp {
        admin: issue_token(&auth, &admin).unwrap(),
        user: issue_token(&auth, &user).unwrap(),
        other_user: issue_token(&auth, &other).unwrap(),
        router: app(AppState::new(repo, auth)),
    }
}

fn registration(email: &str) -> Registration {
    Registration {
        email: email.into(),
        password: "secret-pass".into(),
        first_name: "Test".into(),
        last_name: "User".into(),
    }
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }
    let body = match body {
        Some(value) => {
            builder = builder.header("Content-Type", "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    let resp = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn post(app: &TestApp, uri: &str, body: Value) -> Value {
    let (status, value) = send(&app.router, Method::POST, uri, Some(&app.admin), Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "POST {} failed: {}", uri, value);
    value
}

/// Two airports, routes both ways, one airplane (40 x 6) and one crew member.
struct Catalog {
    krk: i64,
    pmi: i64,
    krk_pmi: i64,
    pmi_krk: i64,
    airplane: i64,
    crew: i64,
}

async fn seed_catalog(app: &TestApp) -> Catalog {
    let krk = post(app, "/api/airport/airports", json!({"name": "Balice", "closest_big_city": "Krakow"})).await;
    let pmi = post(app, "/api/airport/airports", json!({"name": "Son Sant Joan", "closest_big_city": "Palma"})).await;
    let krk = krk["id"].as_i64().unwrap();
    let pmi = pmi["id"].as_i64().unwrap();

    let krk_pmi = post(app, "/api/airport/routes", json!({"source": krk, "destination": pmi, "distance": 1900})).await;
    let pmi_krk = post(app, "/api/airport/routes", json!({"source": pmi, "destination": krk, "distance": 1900})).await;

    let airplane_type = post(app, "/api/airport/airplane-types", json!({"name": "Airbus A320"})).await;
    let airplane = post(
        app,
        "/api/airport/airplanes",
        json!({"name": "SP-LWA", "rows": 40, "seats_in_row": 6, "airplane_type": airplane_type["id"]}),
    )
    .await;
    let crew = post(app, "/api/airport/crew", json!({"first_name": "Anna", "last_name": "Nowak"})).await;

    Catalog {
        krk,
        pmi,
        krk_pmi: krk_pmi["id"].as_i64().unwrap(),
        pmi_krk: pmi_krk["id"].as_i64().unwrap(),
        airplane: airplane["id"].as_i64().unwrap(),
        crew: crew["id"].as_i64().unwrap(),
    }
}

fn flight_body(route: i64, airplane: i64, crew: i64, departure: &str, arrival: &str) -> Value {
    json!({
        "route": route,
        "airplane": airplane,
        "departure_time": departure,
        "arrival_time": arrival,
        "crew": [crew],
    })
}

#[tokio::test]
async fn test_requires_token() {
    let app = test_app().await;

    let (status, body) = send(&app.router, Method::GET, "/api/airport/flights", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Authentication credentials were not provided.");

    let (status, _) = send(&app.router, Method::GET, "/api/airport/flights", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app.router, Method::GET, "/api/user/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_only_admins_write_reference_data() {
    let app = test_app().await;
    let airport = json!({"name": "Balice", "closest_big_city": "Krakow"});

    let (status, body) = send(
        &app.router,
        Method::POST,
        "/api/airport/airports",
        Some(&app.user),
        Some(airport.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "You do not have permission to perform this action.");

    let created = post(&app, "/api/airport/airports", airport).await;
    assert_eq!(created["name"], "Balice");

    // Reads are open to any logged-in user.
    let (status, body) = send(&app.router, Method::GET, "/api/airport/airports", Some(&app.user), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["results"][0]["closest_big_city"], "Krakow");
}

#[tokio::test]
async fn test_reference_validation_errors() {
    let app = test_app().await;
    let catalog = seed_catalog(&app).await;

    let (status, body) = send(
        &app.router,
        Method::POST,
        "/api/airport/routes",
        Some(&app.admin),
        Some(json!({"source": catalog.krk, "destination": catalog.krk, "distance": 0})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["non_field_errors"].is_array());
    assert!(body["errors"]["distance"].is_array());

    let (status, body) = send(
        &app.router,
        Method::POST,
        "/api/airport/airports",
        Some(&app.admin),
        Some(json!({"name": "Balice"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["non_field_errors"].is_array());
}

#[tokio::test]
async fn test_route_listing_and_filters() {
    let app = test_app().await;
    let catalog = seed_catalog(&app).await;

    let (status, body) = send(&app.router, Method::GET, "/api/airport/routes", Some(&app.user), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);

    let uri = format!("/api/airport/routes?source={}", catalog.pmi);
    let (_, body) = send(&app.router, Method::GET, &uri, Some(&app.user), None).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["results"][0]["full_route"], "Son Sant Joan - Balice");

    let uri = format!("/api/airport/routes/{}", catalog.krk_pmi);
    let (_, body) = send(&app.router, Method::GET, &uri, Some(&app.user), None).await;
    assert_eq!(body["source"]["name"], "Balice");
    assert_eq!(body["destination"]["closest_big_city"], "Palma");

    let (status, body) = send(&app.router, Method::GET, "/api/airport/routes?source=abc", Some(&app.user), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["source"].is_array());
}

#[tokio::test]
async fn test_flight_scheduling_rules() {
    let app = test_app().await;
    let catalog = seed_catalog(&app).await;

    let first = post(
        &app,
        "/api/airport/flights",
        flight_body(catalog.krk_pmi, catalog.airplane, catalog.crew, "2099-01-10T08:00:00Z", "2099-01-10T11:00:00Z"),
    )
    .await;
    assert_eq!(first["crew"], json!([catalog.crew]));

    // Only two hours on the ground in Palma.
    let (status, body) = send(
        &app.router,
        Method::POST,
        "/api/airport/flights",
        Some(&app.admin),
        Some(flight_body(
            catalog.pmi_krk,
            catalog.airplane,
            catalog.crew,
            "2099-01-10T13:00:00Z",
            "2099-01-10T16:00:00Z",
        )),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = body["errors"]["non_field_errors"][0].as_str().unwrap();
    assert!(message.contains("3-hour rest"), "unexpected message: {}", message);

    // Leaving from the wrong airport.
    let (status, body) = send(
        &app.router,
        Method::POST,
        "/api/airport/flights",
        Some(&app.admin),
        Some(flight_body(
            catalog.krk_pmi,
            catalog.airplane,
            catalog.crew,
            "2099-01-10T15:00:00Z",
            "2099-01-10T18:00:00Z",
        )),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = body["errors"]["non_field_errors"][0].as_str().unwrap();
    assert!(message.contains("Son Sant Joan - Balice"), "unexpected message: {}", message);

    post(
        &app,
        "/api/airport/flights",
        flight_body(catalog.pmi_krk, catalog.airplane, catalog.crew, "2099-01-10T14:00:00Z", "2099-01-10T17:00:00Z"),
    )
    .await;

    let (status, body) = send(
        &app.router,
        Method::POST,
        "/api/airport/flights",
        Some(&app.admin),
        Some(flight_body(catalog.krk_pmi, 999, catalog.crew, "2099-02-10T14:00:00Z", "2099-02-10T17:00:00Z")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["airplane"].is_array());
}

#[tokio::test]
async fn test_flight_listing_filters() {
    let app = test_app().await;
    let catalog = seed_catalog(&app).await;

    post(
        &app,
        "/api/airport/flights",
        flight_body(catalog.krk_pmi, catalog.airplane, catalog.crew, "2099-01-10T08:00:00Z", "2099-01-10T11:00:00Z"),
    )
    .await;
    post(
        &app,
        "/api/airport/flights",
        flight_body(catalog.pmi_krk, catalog.airplane, catalog.crew, "2099-01-11T06:00:00Z", "2099-01-11T09:00:00Z"),
    )
    .await;

    let (_, body) = send(&app.router, Method::GET, "/api/airport/flights", Some(&app.user), None).await;
    assert_eq!(body["count"], 2);
    assert_eq!(body["results"][0]["crew"], json!(["Anna Nowak"]));

    let (_, body) = send(
        &app.router,
        Method::GET,
        "/api/airport/flights?date=2099-01-11",
        Some(&app.user),
        None,
    )
    .await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["results"][0]["route"], "Son Sant Joan - Balice");
    assert_eq!(body["results"][0]["departure_time"], "2099-01-11 06:00:00");

    let uri = format!("/api/airport/flights?source={}&destination={}", catalog.krk, catalog.pmi);
    let (_, body) = send(&app.router, Method::GET, &uri, Some(&app.user), None).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["results"][0]["route"], "Balice - Son Sant Joan");

    let (status, body) = send(
        &app.router,
        Method::GET,
        "/api/airport/flights?date=11-01-2099",
        Some(&app.user),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"]["date"][0], "Date has wrong format. Use YYYY-MM-DD.");
}

#[tokio::test]
async fn test_flights_are_not_editable() {
    let app = test_app().await;
    let catalog = seed_catalog(&app).await;
    let flight = post(
        &app,
        "/api/airport/flights",
        flight_body(catalog.krk_pmi, catalog.airplane, catalog.crew, "2099-01-10T08:00:00Z", "2099-01-10T11:00:00Z"),
    )
    .await;
    let uri = format!("/api/airport/flights/{}", flight["id"]);

    let (status, _) = send(&app.router, Method::PUT, &uri, Some(&app.admin), Some(json!({}))).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    let (status, _) = send(&app.router, Method::DELETE, &uri, Some(&app.admin), None).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_booking_flow() {
    let app = test_app().await;
    let catalog = seed_catalog(&app).await;
    let flight = post(
        &app,
        "/api/airport/flights",
        flight_body(catalog.krk_pmi, catalog.airplane, catalog.crew, "2099-01-10T08:00:00Z", "2099-01-10T11:00:00Z"),
    )
    .await;
    let flight_id = flight["id"].as_i64().unwrap();

    let (status, order) = send(
        &app.router,
        Method::POST,
        "/api/airport/orders",
        Some(&app.user),
        Some(json!({"tickets": [{"row": 1, "seat": 1, "flight": flight_id}, {"row": 1, "seat": 2, "flight": flight_id}]})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(order["tickets"].as_array().unwrap().len(), 2);

    let uri = format!("/api/airport/flights/{}", flight_id);
    let (_, detail) = send(&app.router, Method::GET, &uri, Some(&app.user), None).await;
    assert_eq!(detail["airplane_capacity"], 240);
    assert_eq!(detail["tickets_available"], 238);
    assert_eq!(detail["taken_places"], json!([{"row": 1, "seat": 1}, {"row": 1, "seat": 2}]));

    // The same seat cannot be sold twice.
    let (status, _) = send(
        &app.router,
        Method::POST,
        "/api/airport/orders",
        Some(&app.other_user),
        Some(json!({"tickets": [{"row": 1, "seat": 2, "flight": flight_id}]})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(
        &app.router,
        Method::POST,
        "/api/airport/orders",
        Some(&app.user),
        Some(json!({"tickets": [{"row": 41, "seat": 1, "flight": flight_id}]})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["row"][0].as_str().unwrap().contains("(1, 40)"));

    let (status, body) = send(
        &app.router,
        Method::POST,
        "/api/airport/orders",
        Some(&app.user),
        Some(json!({"tickets": []})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"].is_object());
}

#[tokio::test]
async fn test_orders_are_private() {
    let app = test_app().await;
    let catalog = seed_catalog(&app).await;
    let flight = post(
        &app,
        "/api/airport/flights",
        flight_body(catalog.krk_pmi, catalog.airplane, catalog.crew, "2099-01-10T08:00:00Z", "2099-01-10T11:00:00Z"),
    )
    .await;

    let (_, order) = send(
        &app.router,
        Method::POST,
        "/api/airport/orders",
        Some(&app.user),
        Some(json!({"tickets": [{"row": 5, "seat": 3, "flight": flight["id"]}]})),
    )
    .await;
    let uri = format!("/api/airport/orders/{}", order["id"]);

    let (status, detail) = send(&app.router, Method::GET, &uri, Some(&app.user), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["tickets"][0]["flight"]["route"], "Balice - Son Sant Joan");

    let (status, _) = send(&app.router, Method::GET, &uri, Some(&app.other_user), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, mine) = send(&app.router, Method::GET, "/api/airport/orders", Some(&app.user), None).await;
    assert_eq!(mine["count"], 1);
    let (_, theirs) = send(&app.router, Method::GET, "/api/airport/orders", Some(&app.other_user), None).await;
    assert_eq!(theirs["count"], 0);
}

#[tokio::test]
async fn test_crew_management() {
    let app = test_app().await;
    let crew = post(&app, "/api/airport/crew", json!({"first_name": "Anna", "last_name": "Nowak"})).await;
    let uri = format!("/api/airport/crew/{}", crew["id"]);

    let (status, body) = send(
        &app.router,
        Method::PATCH,
        &uri,
        Some(&app.admin),
        Some(json!({"last_name": "Kowalska"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["first_name"], "Anna");
    assert_eq!(body["last_name"], "Kowalska");

    let (status, _) = send(
        &app.router,
        Method::PUT,
        &uri,
        Some(&app.admin),
        Some(json!({"first_name": "Ewa"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app.router, Method::DELETE, &uri, Some(&app.user), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app.router, Method::DELETE, &uri, Some(&app.admin), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app.router, Method::GET, &uri, Some(&app.admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_pagination() {
    let app = test_app().await;
    for i in 0..3 {
        post(
            &app,
            "/api/airport/crew",
            json!({"first_name": format!("Pilot{}", i), "last_name": "Test"}),
        )
        .await;
    }

    let (status, body) = send(
        &app.router,
        Method::GET,
        "/api/airport/crew?page=2&page_size=2",
        Some(&app.user),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 3);
    assert_eq!(body["results"].as_array().unwrap().len(), 1);
    assert!(body["next"].is_null());
    assert!(!body["previous"].is_null());

    let (status, _) = send(
        &app.router,
        Method::GET,
        "/api/airport/crew?page=5&page_size=2",
        Some(&app.user),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_register_login_and_profile() {
    let app = test_app().await;

    let (status, body) = send(
        &app.router,
        Method::POST,
        "/api/user/register",
        None,
        Some(json!({"email": "new@example.com", "password": "hunter22"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["is_staff"], false);
    assert!(body.get("password").is_none());

    let (status, body) = send(
        &app.router,
        Method::POST,
        "/api/user/register",
        None,
        Some(json!({"email": "short@example.com", "password": "abc"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["password"].is_array());

    let (status, _) = send(
        &app.router,
        Method::POST,
        "/api/user/token",
        None,
        Some(json!({"email": "new@example.com", "password": "wrong"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        &app.router,
        Method::POST,
        "/api/user/token",
        None,
        Some(json!({"email": "new@example.com", "password": "hunter22"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["access"].as_str().unwrap().to_owned();

    let (status, body) = send(&app.router, Method::GET, "/api/user/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "new@example.com");

    let (status, body) = send(
        &app.router,
        Method::PATCH,
        "/api/user/me",
        Some(&token),
        Some(json!({"first_name": "Jan"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["first_name"], "Jan");
    assert_eq!(body["email"], "new@example.com");
}
