use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use chrono::NaiveDate;

use southcoast::models::{BookingRequest, PaymentStatus};
use southcoast::services::api::{ApiError, BookingApi, HttpBookingApi};

// ── Stub backend ──

#[derive(Default)]
struct Seen {
    bodies: Vec<serde_json::Value>,
    auth: Vec<String>,
    paths: Vec<String>,
}

type Shared = Arc<Mutex<Seen>>;

fn auth_of(headers: &HeaderMap) -> String {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string()
}

async fn create_booking(
    State(seen): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> (StatusCode, Json<serde_json::Value>) {
    let mut seen = seen.lock().unwrap();
    seen.auth.push(auth_of(&headers));
    seen.bodies.push(body.clone());

    if body["booking"]["room_type"] == "Penthouse" {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(serde_json::json!({"errors": ["Room type is not offered", "Adults is invalid"]})),
        );
    }
    (StatusCode::CREATED, Json(serde_json::json!({"id": 77})))
}

async fn update_status(
    State(seen): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<serde_json::Value>,
) -> (StatusCode, Json<serde_json::Value>) {
    let mut seen = seen.lock().unwrap();
    seen.auth.push(auth_of(&headers));
    seen.paths.push(id.clone());
    seen.bodies.push(body);

    if id == "404" {
        return (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": "Booking not found"})),
        );
    }
    (StatusCode::OK, Json(serde_json::json!({"id": id})))
}

async fn payments(headers: HeaderMap) -> (StatusCode, String) {
    match auth_of(&headers).as_str() {
        "Bearer nested" => (
            StatusCode::OK,
            r#"{"payments":[{"booking_id":5,"payment_status":"partial_paid","amount":"1200.00"}]}"#
                .to_string(),
        ),
        "Bearer data" => (
            StatusCode::OK,
            r#"{"data":[{"id":"6","status":"payment_made","total_amount":800}]}"#.to_string(),
        ),
        "Bearer broken" => (StatusCode::OK, "<html>oops</html>".to_string()),
        "Bearer odd" => (StatusCode::OK, r#"{"bookings":[]}"#.to_string()),
        _ => (
            StatusCode::OK,
            r#"[{"booking_id":"4","payment_status":"pending","amount":300}]"#.to_string(),
        ),
    }
}

async fn nationalities() -> Json<serde_json::Value> {
    Json(serde_json::json!([{"name": "Filipino"}, "Korean"]))
}

async fn room_types() -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, "upstream down".to_string())
}

async fn spawn_backend() -> (String, Shared) {
    let seen: Shared = Arc::new(Mutex::new(Seen::default()));
    let app = Router::new()
        .route("/bookings", post(create_booking))
        .route("/admin/bookings/:id/payment_status", patch(update_status))
        .route("/admin/payments", get(payments))
        .route("/nationalities", get(nationalities))
        .route("/room_types", get(room_types))
        .with_state(seen.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}/"), seen)
}

fn request(room_type: &str) -> BookingRequest {
    BookingRequest {
        nationality: "Filipino".to_string(),
        room_type: room_type.to_string(),
        check_in: NaiveDate::from_ymd_opt(2025, 6, 10).unwrap(),
        check_out: NaiveDate::from_ymd_opt(2025, 6, 11).unwrap(),
        adults: 1,
        children: 0,
        user_id: None,
        status: None,
    }
}

// ── Tests ──

#[tokio::test]
async fn test_create_booking_wire_shape() {
    let (base, seen) = spawn_backend().await;
    let api = HttpBookingApi::new(base);

    let created = api
        .create_booking(Some("guest-token"), &request("Deluxe"))
        .await
        .unwrap();
    assert_eq!(created["id"], 77);

    let seen = seen.lock().unwrap();
    assert_eq!(seen.auth[0], "Bearer guest-token");
    assert_eq!(
        seen.bodies[0],
        serde_json::json!({
            "booking": {
                "nationality": "Filipino",
                "room_type": "Deluxe",
                "check_in": "2025-06-10",
                "check_out": "2025-06-11",
                "adults": 1,
                "children": 0
            }
        })
    );
}

#[tokio::test]
async fn test_create_booking_error_list() {
    let (base, _) = spawn_backend().await;
    let api = HttpBookingApi::new(base);

    let err = api.create_booking(None, &request("Penthouse")).await.unwrap_err();
    match err {
        ApiError::Rejected { status, message } => {
            assert_eq!(status, 422);
            assert_eq!(message, "Room type is not offered, Adults is invalid");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_update_payment_status_wire_shape() {
    let (base, seen) = spawn_backend().await;
    let api = HttpBookingApi::new(base);

    api.update_payment_status("admin", "42", PaymentStatus::PartialPaid)
        .await
        .unwrap();

    let err = api
        .update_payment_status("admin", "404", PaymentStatus::Pending)
        .await
        .unwrap_err();
    assert!(err.is_transient());
    assert!(matches!(err, ApiError::Rejected { status: 404, ref message } if message == "Booking not found"));

    let seen = seen.lock().unwrap();
    assert_eq!(seen.paths, vec!["42", "404"]);
    assert_eq!(seen.auth[0], "Bearer admin");
    assert_eq!(seen.bodies[0], serde_json::json!({"payment_status": "partial_paid"}));
}

#[tokio::test]
async fn test_list_payments_shapes() {
    let (base, _) = spawn_backend().await;
    let api = HttpBookingApi::new(base);

    let top = api.list_payments("plain").await.unwrap();
    assert_eq!(top[0].booking_id, "4");
    assert_eq!(top[0].status, PaymentStatus::Pending);

    let nested = api.list_payments("nested").await.unwrap();
    assert_eq!(nested[0].booking_id, "5");
    assert_eq!(nested[0].amount, 1200.0);

    let data = api.list_payments("data").await.unwrap();
    assert_eq!(data[0].status, PaymentStatus::PaymentMade);

    assert!(matches!(
        api.list_payments("broken").await,
        Err(ApiError::MalformedResponse(_))
    ));
    assert!(matches!(
        api.list_payments("odd").await,
        Err(ApiError::MalformedResponse(_))
    ));
}

#[tokio::test]
async fn test_catalogs() {
    let (base, _) = spawn_backend().await;
    let api = HttpBookingApi::new(base);

    assert_eq!(api.nationalities().await.unwrap(), vec!["Filipino", "Korean"]);
    assert!(matches!(
        api.room_types().await,
        Err(ApiError::Rejected { status: 500, .. })
    ));
}

#[tokio::test]
async fn test_unreachable_backend_is_network_error() {
    let api = HttpBookingApi::new("http://127.0.0.1:9");
    let err = api.list_payments("tok").await.unwrap_err();
    assert!(matches!(err, ApiError::Network(_)));
    assert!(err.is_transient());
}
