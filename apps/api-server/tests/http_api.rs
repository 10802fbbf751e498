//! End-to-end tests driving the router in memory.

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use pos_api::{create_router, AppState, ServerConfig};
use pos_db::Database;

const BODY_LIMIT: usize = 1024 * 1024;

async fn app_with(config: ServerConfig) -> (Router, Database) {
    let db = Database::new(config.db_config()).await.unwrap();
    let router = create_router(AppState::new(db.clone(), config));
    (router, db)
}

async fn app() -> Router {
    app_with(ServerConfig::for_tests()).await.0
}

async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), BODY_LIMIT).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn create_customer(app: &Router, name: &str) -> Value {
    let response = send(
        app,
        json_request(
            "POST",
            "/api/v1/customers",
            json!({ "name": name, "phoneNumber": "0901234567" }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

async fn create_product(app: &Router, name: &str, price_cents: i64, quantity: i64) -> Value {
    let response = send(
        app,
        json_request(
            "POST",
            "/api/v1/products",
            json!({ "name": name, "priceCents": price_cents, "quantity": quantity }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

#[tokio::test]
async fn test_health() {
    let app = app().await;
    let response = send(&app, get("/health")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], true);
}

#[tokio::test]
async fn test_empty_customer_page_is_no_content() {
    let app = app().await;
    let response = send(&app, get("/api/v1/customers?page=0&size=10")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_customer_create_get_and_status() {
    let app = app().await;
    let created = create_customer(&app, "Jane Doe").await;
    let id = created["id"].as_str().unwrap();
    assert_eq!(created["status"], "Active");

    let response = send(&app, get(&format!("/api/v1/customers/{id}"))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["name"], "Jane Doe");

    let page = send(&app, get("/api/v1/customers")).await;
    assert_eq!(page.status(), StatusCode::OK);
    assert_eq!(body_json(page).await["totalElements"], 1);

    let same = send(
        &app,
        json_request(
            "PUT",
            &format!("/api/v1/customers/{id}/status?status=Active"),
            Value::Null,
        ),
    )
    .await;
    assert_eq!(same.status(), StatusCode::CONFLICT);

    let toggled = send(
        &app,
        json_request(
            "PUT",
            &format!("/api/v1/customers/{id}/status?status=Deactive"),
            Value::Null,
        ),
    )
    .await;
    assert_eq!(toggled.status(), StatusCode::OK);
    assert_eq!(body_json(toggled).await["status"], "Deactive");
}

#[tokio::test]
async fn test_missing_customer_is_not_found() {
    let app = app().await;
    let response = send(&app, get("/api/v1/customers/nobody")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_invalid_customer_reports_fields() {
    let app = app().await;
    let response = send(&app, json_request("POST", "/api/v1/customers", json!({}))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["code"], "VALIDATION_FAILED");
    assert_eq!(body["errors"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_excel_without_criteria_is_bad_request() {
    let app = app().await;
    let response = send(&app, get("/api/v1/invoices/export/excel")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["message"],
        "Please select at least one criterion: Customer ID, Month, or Year."
    );
}

#[tokio::test]
async fn test_excel_blank_params_count_as_absent() {
    let app = app().await;

    let response = send(&app, get("/api/v1/invoices/export/excel?customerId=&month=5&year=2024")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"invoice_report_5_2024.xlsx\""
    );

    let response = send(&app, get("/api/v1/invoices/export/excel?customerId=&month=&year=")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["message"],
        "Please select at least one criterion: Customer ID, Month, or Year."
    );
}

#[tokio::test]
async fn test_invoice_search_ignores_blank_params() {
    let app = app().await;
    let response = send(&app, get("/api/v1/invoices?customerId=&startDate=&endDate=&month=&year=")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["totalElements"], 0);
}

#[tokio::test]
async fn test_pdf_of_missing_invoice_is_no_content() {
    let app = app().await;
    let response = send(&app, get("/api/v1/invoices/missing/export")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_invoice_flow() {
    let app = app().await;
    let customer = create_customer(&app, "Jane Doe").await;
    let latte = create_product(&app, "Latte", 350, 10).await;

    let response = send(
        &app,
        json_request(
            "POST",
            "/api/v1/invoices",
            json!({
                "customerId": customer["id"],
                "invoiceDate": "2024-05-17",
                "items": [{ "productId": latte["id"], "quantity": 2 }]
            }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let invoice = body_json(response).await;
    assert_eq!(invoice["totalCents"], 700);
    let invoice_id = invoice["id"].as_str().unwrap();

    let listed = send(&app, get("/api/v1/invoices?month=5&year=2024")).await;
    assert_eq!(listed.status(), StatusCode::OK);
    assert_eq!(body_json(listed).await["totalElements"], 1);

    let pdf = send(&app, get(&format!("/api/v1/invoices/{invoice_id}/export"))).await;
    assert_eq!(pdf.status(), StatusCode::OK);
    assert_eq!(pdf.headers()[header::CONTENT_TYPE], "application/pdf");
    assert_eq!(
        pdf.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"invoice.pdf\""
    );
    let bytes = to_bytes(pdf.into_body(), BODY_LIMIT).await.unwrap();
    assert!(bytes.starts_with(b"%PDF"));

    let excel = send(
        &app,
        get(&format!(
            "/api/v1/invoices/export/excel?customerId={}&month=5&year=2024",
            customer["id"].as_str().unwrap()
        )),
    )
    .await;
    assert_eq!(excel.status(), StatusCode::OK);
    assert_eq!(
        excel.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"invoice_report_Jane_Doe_5_2024.xlsx\""
    );

    let revenue = send(
        &app,
        get("/api/v1/invoices/revenue?date=2024-05-01&revenueBy=month"),
    )
    .await;
    assert_eq!(revenue.status(), StatusCode::OK);
    assert_eq!(body_json(revenue).await["totalRevenueCents"], 700);
}

#[tokio::test]
async fn test_invoice_over_stock_is_rejected() {
    let app = app().await;
    let customer = create_customer(&app, "Jane Doe").await;
    let cake = create_product(&app, "Cake", 500, 2).await;

    let response = send(
        &app,
        json_request(
            "POST",
            "/api/v1/invoices",
            json!({
                "customerId": customer["id"],
                "items": [{ "productId": cake["id"], "quantity": 3 }]
            }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_csv_upload() {
    let app = app().await;
    let boundary = "pos-test-boundary";
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"products.csv\"\r\n\
         Content-Type: text/csv\r\n\r\n\
         name,price,quantity\nLatte,3.50,10\nMocha,4.25,5\n\r\n\
         --{boundary}--\r\n"
    );
    let request = Request::post("/api/v1/products/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap();

    let response = send(&app, request).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 2);

    let all = send(&app, get("/api/v1/products/all")).await;
    let products = body_json(all).await;
    assert_eq!(products.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_upload_rejects_non_csv_file() {
    let app = app().await;
    let boundary = "pos-test-boundary";
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"products.txt\"\r\n\r\n\
         name,price,quantity\n\r\n\
         --{boundary}--\r\n"
    );
    let request = Request::post("/api/v1/products/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap();

    let response = send(&app, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "INVALID_FORMAT");
}

#[tokio::test]
async fn test_api_key_required() {
    let config = ServerConfig {
        api_key_required: true,
        ..ServerConfig::for_tests()
    };
    let (app, db) = app_with(config).await;
    db.api_keys().insert("secret").await.unwrap();

    let missing = send(&app, get("/api/v1/products/all")).await;
    assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);

    let wrong = Request::get("/api/v1/products/all")
        .header("X-API-KEY", "nope")
        .body(Body::empty())
        .unwrap();
    assert_eq!(send(&app, wrong).await.status(), StatusCode::UNAUTHORIZED);

    let valid = Request::get("/api/v1/products/all")
        .header("X-API-KEY", "secret")
        .body(Body::empty())
        .unwrap();
    assert_eq!(send(&app, valid).await.status(), StatusCode::OK);

    // health stays open
    assert_eq!(send(&app, get("/health")).await.status(), StatusCode::OK);
}
