pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::services::ServeFile;

use crate::errors::AppError;
use crate::intake::handlers as intake;
use crate::presentation::handlers as presentation;
use crate::state::AppState;

pub const INTAKE_ROUTE: &str = "/";
pub const REGISTER_ROUTE: &str = "/register";
pub const NAVIGATE_ROUTE: &str = "/prepare-cv";
pub const SPREADSHEET_ROUTE: &str = "/export/cv_data.xlsx";
pub const PREVIEW_PDF_ROUTE: &str = "/export/cv_preview.pdf";
pub const DOCUMENT_ROUTE: &str = "/cv";
pub const DOCUMENT_PRINT_ROUTE: &str = "/cv/print";
pub const DOCUMENT_PDF_ROUTE: &str = "/cv/cv.pdf";
pub const LOGO_ROUTE: &str = "/logo.png";

async fn logo_not_configured() -> Result<(), AppError> {
    Err(AppError::NotFound("No logo configured".to_string()))
}

pub fn build_router(state: AppState) -> Router {
    let router = Router::new()
        .route("/health", get(health::health_handler))
        // Intake pages
        .route(INTAKE_ROUTE, get(intake::handle_form))
        .route(REGISTER_ROUTE, post(intake::handle_register))
        .route(NAVIGATE_ROUTE, get(intake::handle_navigate))
        .route(SPREADSHEET_ROUTE, get(intake::handle_export_spreadsheet))
        .route(PREVIEW_PDF_ROUTE, get(intake::handle_export_preview_pdf))
        // Document pages
        .route(DOCUMENT_ROUTE, get(presentation::handle_document))
        .route(DOCUMENT_PRINT_ROUTE, get(presentation::handle_print))
        .route(DOCUMENT_PDF_ROUTE, get(presentation::handle_document_pdf))
        // JSON API
        .route(
            "/api/v1/intake/images/:slot",
            post(intake::handle_upload_image),
        )
        .route("/api/v1/intake/submit", post(intake::handle_submit))
        .route("/api/v1/record", get(presentation::handle_get_record));

    let router = match &state.config.logo_path {
        Some(path) => router.route_service(LOGO_ROUTE, ServeFile::new(path)),
        None => router.route(LOGO_ROUTE, get(logo_not_configured)),
    };

    router
        .layer(DefaultBodyLimit::max(state.config.max_upload_bytes))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use axum::response::Response;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    use crate::config::Config;
    use crate::export::capture::tests::test_font;
    use crate::export::capture::Capturer;
    use crate::export::pdf::tests::{assert_a4, page_layout};
    use crate::intake::upload::tests::png_bytes;
    use crate::storage::{MemoryStore, RecordStore};

    const BOUNDARY: &str = "cvdesk-test-boundary";

    fn app() -> (Router, AppState) {
        app_with(Capturer::new(None, None))
    }

    fn app_with(capturer: Capturer) -> (Router, AppState) {
        let store: Arc<dyn RecordStore> = Arc::new(MemoryStore::new());
        let state = AppState::new(Config::default(), store, capturer);
        (build_router(state.clone()), state)
    }

    enum Part<'a> {
        Text(&'a str, &'a str),
        File(&'a str, &'a str, Vec<u8>),
    }

    fn multipart_body(parts: &[Part]) -> Vec<u8> {
        let mut body = Vec::new();
        for part in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match part {
                Part::Text(name, value) => {
                    body.extend_from_slice(
                        format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
                            .as_bytes(),
                    );
                }
                Part::File(name, filename, bytes) => {
                    body.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
                             Content-Type: application/octet-stream\r\n\r\n"
                        )
                        .as_bytes(),
                    );
                    body.extend_from_slice(bytes);
                    body.extend_from_slice(b"\r\n");
                }
            }
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn multipart_request(uri: &str, parts: &[Part]) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(multipart_body(parts)))
            .unwrap()
    }

    fn json_request(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn send(app: &Router, request: Request<Body>) -> Response {
        app.clone().oneshot(request).await.unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8_lossy(&bytes).into_owned()
    }

    async fn stored_record(app: &Router) -> Value {
        let response = send(app, get_request("/api/v1/record")).await;
        assert_eq!(response.status(), StatusCode::OK);
        serde_json::from_str(&body_text(response).await).unwrap()
    }

    fn amina_parts() -> Vec<Part<'static>> {
        vec![
            Part::Text("name", "Amina"),
            Part::Text("gender", "Female"),
            Part::Text("address", "Bole"),
            Part::Text("zone", "3"),
            Part::Text("woreda", "07"),
            Part::Text("phone", "0911000000"),
            Part::Text("familyId", "FAM-1"),
            Part::Text("maritalStatus", "Single"),
            Part::Text("experience", "Experienced"),
            Part::Text("country", "Lebanon"),
            Part::Text("years", "3"),
            Part::Text("code", "C-17"),
            Part::Text("date", "2024-05-01"),
            Part::Text("skills", "Cooking"),
            Part::Text("skills", "Cleaning"),
            Part::Text("documents", "Passport"),
            Part::File("largeImg", "large.png", png_bytes()),
            Part::File("smallImg", "small.png", png_bytes()),
            Part::Text("emergencyName", "Hawa"),
            Part::Text("emergencyPhone", "0922000000"),
            Part::Text("emergencyAddress", "Adama"),
            Part::Text("emergencyHouse", "12B"),
        ]
    }

    #[tokio::test]
    async fn test_register_then_view_round_trip() {
        let (app, _) = app();

        let response = send(&app, multipart_request(REGISTER_ROUTE, &amina_parts())).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/?registered=1");

        let record = stored_record(&app).await;
        assert_eq!(record["name"], "Amina");
        assert_eq!(record["familyId"], "FAM-1");
        assert_eq!(record["skills"], json!(["Cooking", "Cleaning"]));
        assert_eq!(record["documents"], json!(["Passport"]));
        assert_eq!(record["emergencyHouse"], "12B");
        assert!(record["largeImg"]
            .as_str()
            .unwrap()
            .starts_with("data:image/png;base64,"));
        assert!(record["smallImg"].is_string());

        let response = send(&app, get_request(DOCUMENT_ROUTE)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        for expected in ["Amina", "Female", "Lebanon — 3", "Cooking, Cleaning", "Bole, Zone 3, Woreda 07"] {
            assert!(html.contains(expected), "missing {expected}");
        }
        assert!(html.contains("class=\"portrait\""));
        assert!(html.contains("class=\"panel-image\""));
    }

    #[tokio::test]
    async fn test_registering_twice_is_idempotent() {
        let (app, _) = app();
        send(&app, multipart_request(REGISTER_ROUTE, &amina_parts())).await;
        let first = stored_record(&app).await;

        // No new files chosen the second time; the draft images are reused.
        let mut parts = amina_parts();
        parts.retain(|p| !matches!(p, Part::File(..)));
        parts.push(Part::File("largeImg", "", Vec::new()));
        parts.push(Part::File("smallImg", "", Vec::new()));
        send(&app, multipart_request(REGISTER_ROUTE, &parts)).await;

        assert_eq!(stored_record(&app).await, first);
    }

    #[tokio::test]
    async fn test_new_applicant_hides_country_line() {
        let (app, _) = app();
        let mut parts = amina_parts();
        parts.retain(|p| !matches!(p, Part::Text("experience", _)));
        parts.push(Part::Text("experience", "New"));
        send(&app, multipart_request(REGISTER_ROUTE, &parts)).await;

        let html = body_text(send(&app, get_request(DOCUMENT_ROUTE)).await).await;
        assert!(!html.contains("Lebanon"));
        assert!(!html.contains("Country — Years"));
    }

    #[tokio::test]
    async fn test_submit_overwrites_previous_record() {
        let (app, _) = app();
        send(
            &app,
            json_request("/api/v1/intake/submit", json!({"name": "A", "country": "Oman"})),
        )
        .await;
        let response = send(&app, json_request("/api/v1/intake/submit", json!({"name": "B"}))).await;
        assert_eq!(response.status(), StatusCode::OK);

        let record = stored_record(&app).await;
        assert_eq!(record, json!({"name": "B"}));
    }

    #[tokio::test]
    async fn test_missing_record_states() {
        let (app, _) = app();

        let response = send(&app, get_request(DOCUMENT_ROUTE)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(body_text(response).await.contains("No CV record found"));

        assert_eq!(send(&app, get_request("/api/v1/record")).await.status(), StatusCode::NOT_FOUND);
        assert_eq!(send(&app, get_request(DOCUMENT_PDF_ROUTE)).await.status(), StatusCode::NOT_FOUND);
        assert_eq!(send(&app, get_request(SPREADSHEET_ROUTE)).await.status(), StatusCode::NO_CONTENT);
        assert_eq!(send(&app, get_request(PREVIEW_PDF_ROUTE)).await.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_spreadsheet_download() {
        let (app, _) = app();
        send(&app, json_request("/api/v1/intake/submit", json!({"name": "Amina"}))).await;

        let response = send(&app, get_request(SPREADSHEET_ROUTE)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"cv_data.xlsx\""
        );
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[tokio::test]
    async fn test_pdf_exports_without_font_are_unavailable() {
        let (app, _) = app();
        send(&app, json_request("/api/v1/intake/submit", json!({"name": "Amina"}))).await;

        for uri in [DOCUMENT_PDF_ROUTE, PREVIEW_PDF_ROUTE] {
            let response = send(&app, get_request(uri)).await;
            assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE, "{uri}");
        }
    }

    #[tokio::test]
    async fn test_pdf_exports_are_single_a4_pages() {
        let font = test_font().expect("no font found; set CVDESK_TEST_FONT to a TTF file");
        let (app, _) = app_with(Capturer::new(Some(font), None));
        send(&app, multipart_request(REGISTER_ROUTE, &amina_parts())).await;

        for (uri, file_name) in [
            (DOCUMENT_PDF_ROUTE, "cv.pdf"),
            (PREVIEW_PDF_ROUTE, "cv_preview.pdf"),
        ] {
            let response = send(&app, get_request(uri)).await;
            assert_eq!(response.status(), StatusCode::OK, "{uri}");
            assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
            assert_eq!(
                response.headers()[header::CONTENT_DISPOSITION],
                format!("attachment; filename=\"{file_name}\"").as_str()
            );
            let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let (pages, media_box) = page_layout(&bytes);
            assert_eq!(pages, 1, "{uri}");
            assert_a4(&media_box);
        }
    }

    #[tokio::test]
    async fn test_fresh_form_visit_drops_pending_images() {
        let (app, state) = app();
        let upload = || {
            multipart_request(
                "/api/v1/intake/images/large",
                &[Part::File("file", "p.png", png_bytes())],
            )
        };

        send(&app, upload()).await;
        send(&app, json_request("/api/v1/intake/submit", json!({"name": "A"}))).await;
        assert!(stored_record(&app).await["largeImg"].is_string());

        // The post-register redirect keeps the form session.
        send(&app, get_request("/?registered=1")).await;
        assert!(state.draft.lock().await.large.is_some());

        send(&app, get_request(INTAKE_ROUTE)).await;
        send(&app, json_request("/api/v1/intake/submit", json!({"name": "B"}))).await;
        assert_eq!(stored_record(&app).await, json!({"name": "B"}));

        send(&app, upload()).await;
        send(&app, get_request(NAVIGATE_ROUTE)).await;
        assert_eq!(state.draft.lock().await.large, None);
    }

    #[tokio::test]
    async fn test_malformed_register_leaves_draft_untouched() {
        let (app, state) = app();

        let mut body = multipart_body(&[Part::File("largeImg", "large.png", png_bytes())]);
        // Drop the closing boundary and start a part that never ends.
        body.truncate(body.len() - format!("--{BOUNDARY}--\r\n").len());
        body.extend_from_slice(
            format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"name\"\r\n\r\nAmi")
                .as_bytes(),
        );
        let request = Request::builder()
            .method("POST")
            .uri(REGISTER_ROUTE)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();

        let response = send(&app, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(state.draft.lock().await.large, None);
        assert_eq!(send(&app, get_request("/api/v1/record")).await.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_image_upload_api() {
        let (app, state) = app();

        let response = send(
            &app,
            multipart_request(
                "/api/v1/intake/images/small",
                &[Part::File("file", "p.png", png_bytes())],
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(body, json!({"slot": "small", "accepted": true}));
        assert!(state.draft.lock().await.small.is_some());

        let response = send(
            &app,
            multipart_request(
                "/api/v1/intake/images/large",
                &[Part::File("file", "notes.txt", b"plain text".to_vec())],
            ),
        )
        .await;
        let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(body["accepted"], false);
        assert!(state.draft.lock().await.large.is_none());

        let response = send(
            &app,
            multipart_request("/api/v1/intake/images/medium", &[]),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_uploaded_image_flows_into_json_submit() {
        let (app, _) = app();
        send(
            &app,
            multipart_request(
                "/api/v1/intake/images/large",
                &[Part::File("file", "p.png", png_bytes())],
            ),
        )
        .await;
        send(&app, json_request("/api/v1/intake/submit", json!({"name": "Amina"}))).await;

        let record = stored_record(&app).await;
        assert!(record["largeImg"].is_string());
        assert!(record.get("smallImg").is_none());
    }

    #[tokio::test]
    async fn test_form_page_and_navigation() {
        let (app, _) = app();

        let html = body_text(send(&app, get_request("/?registered=1")).await).await;
        assert!(html.contains("Registered successfully!"));
        assert!(html.contains("Registration Form"));

        let response = send(&app, get_request(NAVIGATE_ROUTE)).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], DOCUMENT_ROUTE);
    }

    #[tokio::test]
    async fn test_print_mode_page() {
        let (app, _) = app();
        send(&app, json_request("/api/v1/intake/submit", json!({"name": "Amina"}))).await;

        let response = send(&app, get_request(DOCUMENT_PRINT_ROUTE)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("window.print()"));
        assert!(html.contains("id=\"cv-container\""));
    }

    #[tokio::test]
    async fn test_logo_and_health() {
        let (app, _) = app();
        assert_eq!(send(&app, get_request(LOGO_ROUTE)).await.status(), StatusCode::NOT_FOUND);

        send(&app, json_request("/api/v1/intake/submit", json!({"name": "Amina"}))).await;
        for uri in [INTAKE_ROUTE, DOCUMENT_ROUTE] {
            let html = body_text(send(&app, get_request(uri)).await).await;
            assert!(!html.contains("src=\"/logo.png\""), "{uri}");
            assert!(html.contains("logo-placeholder"), "{uri}");
        }

        let response = send(&app, get_request("/health")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["store"], "memory");
        assert_eq!(body["pdf_export"], false);
    }
}
