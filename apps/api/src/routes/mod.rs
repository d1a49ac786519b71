pub mod files;
pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::session::handlers as sessions;
use crate::state::AppState;
use crate::transform::handlers as documents;

/// Headroom over the file limit for multipart boundaries and headers.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes + MULTIPART_OVERHEAD_BYTES;

    Router::new()
        .route("/health", get(health::health_handler))
        // Stateless document API
        .route("/api/v1/extract", post(documents::handle_extract))
        .route("/api/v1/transform", post(documents::handle_transform))
        .route("/api/v1/render/:format", post(documents::handle_render))
        // Session workflow
        .route("/api/v1/sessions", post(sessions::handle_create))
        .route(
            "/api/v1/sessions/:id",
            get(sessions::handle_get).delete(sessions::handle_delete),
        )
        .route("/api/v1/sessions/:id/upload", post(sessions::handle_upload))
        .route("/api/v1/sessions/:id/submit", post(sessions::handle_submit))
        .route("/api/v1/sessions/:id/retry", post(sessions::handle_retry))
        .route("/api/v1/sessions/:id/back", post(sessions::handle_back))
        .route(
            "/api/v1/sessions/:id/edit",
            post(sessions::handle_begin_edit).patch(sessions::handle_apply_edits),
        )
        .route(
            "/api/v1/sessions/:id/edit/photo",
            post(sessions::handle_upload_photo).delete(sessions::handle_remove_photo),
        )
        .route(
            "/api/v1/sessions/:id/edit/save",
            post(sessions::handle_save_edit),
        )
        .route(
            "/api/v1/sessions/:id/edit/cancel",
            post(sessions::handle_cancel_edit),
        )
        .route(
            "/api/v1/sessions/:id/export/:format",
            get(sessions::handle_export),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::errors::{AppError, TRANSFORM_FAILED_MESSAGE};
    use crate::models::CvData;
    use crate::session::SessionStore;
    use crate::transform::CvTransformer;

    /// Returns a fixed record, or fails when the text contains "FAIL".
    struct StubTransformer;

    #[async_trait]
    impl CvTransformer for StubTransformer {
        async fn transform(&self, cv_text: &str) -> Result<CvData, AppError> {
            if cv_text.contains("FAIL") {
                return Err(AppError::Llm("stubbed upstream failure".into()));
            }
            Ok(CvData {
                full_name: "Jane Doe".into(),
                professional_title: "Sales Manager".into(),
                summary: cv_text.into(),
                skills: vec!["Negotiation".into()],
                ats_score: Some(90),
                ..Default::default()
            })
        }
    }

    fn app() -> Router {
        build_router(AppState {
            config: Config::default(),
            transformer: Arc::new(StubTransformer),
            sessions: SessionStore::new(),
        })
    }

    fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn empty_request(method: Method, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    fn multipart_request(uri: &str, file_name: &str, mime: &str, bytes: &[u8]) -> Request<Body> {
        let boundary = "cv-architect-test-boundary";
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; \
                 filename=\"{file_name}\"\r\nContent-Type: {mime}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn send(app: &Router, request: Request<Body>) -> Response {
        app.clone().oneshot(request).await.unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn new_session(app: &Router) -> String {
        let response = send(app, empty_request(Method::POST, "/api/v1/sessions")).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert_eq!(body["phase"], "input");
        body["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_health() {
        let response = send(&app(), empty_request(Method::GET, "/health")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_transform_returns_record() {
        let response = send(
            &app(),
            json_request(Method::POST, "/api/v1/transform", json!({"text": "  Jane, sales  "})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["fullName"], "Jane Doe");
        assert_eq!(body["summary"], "Jane, sales");
        assert_eq!(body["atsScore"], 90);
    }

    #[tokio::test]
    async fn test_transform_rejects_blank_text() {
        let response = send(
            &app(),
            json_request(Method::POST, "/api/v1/transform", json!({"text": "   "})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_transform_failure_shows_fixed_message() {
        let response = send(
            &app(),
            json_request(Method::POST, "/api/v1/transform", json!({"text": "FAIL"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            body_json(response).await["error"]["message"],
            TRANSFORM_FAILED_MESSAGE
        );
    }

    #[tokio::test]
    async fn test_extract_plain_text_upload() {
        let response = send(
            &app(),
            multipart_request(
                "/api/v1/extract",
                "cv.txt",
                "text/plain",
                b"Jane Doe\r\nSales Manager\r\n",
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["fileName"], "cv.txt");
        assert_eq!(body["kind"], "text");
        assert_eq!(body["text"], "Jane Doe\nSales Manager");
    }

    #[tokio::test]
    async fn test_extract_rejects_images() {
        let response = send(
            &app(),
            multipart_request("/api/v1/extract", "me.png", "image/png", b"\x89PNG\r\n\x1a\n"),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[tokio::test]
    async fn test_render_pdf_sets_download_headers() {
        let response = send(
            &app(),
            json_request(
                Method::POST,
                "/api/v1/render/pdf",
                json!({"fullName": "Jane Doe", "skills": ["Negotiation"]}),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"Jane_Doe_CV.pdf\""
        );
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
    }

    #[tokio::test]
    async fn test_render_clamps_out_of_range_ats_score() {
        for score in [json!(250), json!(1000), json!(87.6)] {
            let response = send(
                &app(),
                json_request(
                    Method::POST,
                    "/api/v1/render/html",
                    json!({"fullName": "Jane Doe", "atsScore": score}),
                ),
            )
            .await;
            assert_eq!(response.status(), StatusCode::OK);
            let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let html = String::from_utf8(bytes.to_vec()).unwrap();
            let expected = if score == json!(87.6) { "88/100" } else { "100/100" };
            assert!(html.contains(&format!("ATS Score: {expected}")), "score {score}");
            assert!(!html.contains("250/100"));
        }
    }

    #[tokio::test]
    async fn test_render_pdf_refuses_arabic_text() {
        let response = send(
            &app(),
            json_request(
                Method::POST,
                "/api/v1/render/pdf",
                json!({"fullName": "عائشة خان"}),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "UNSUPPORTED_TEXT");
        assert!(body["error"]["message"].as_str().unwrap().contains("fullName"));
    }

    #[tokio::test]
    async fn test_render_unknown_format_is_not_found() {
        let response = send(
            &app(),
            json_request(Method::POST, "/api/v1/render/png", json!({})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_session_happy_path_with_edit_and_export() {
        let app = app();
        let id = new_session(&app).await;

        let response = send(
            &app,
            multipart_request(
                &format!("/api/v1/sessions/{id}/upload"),
                "cv.txt",
                "text/plain",
                b"Jane Doe, Sales",
            ),
        )
        .await;
        assert_eq!(body_json(response).await["draftText"], "Jane Doe, Sales");

        // No text in the body: the uploaded draft is submitted.
        let response = send(
            &app,
            json_request(Method::POST, &format!("/api/v1/sessions/{id}/submit"), json!({})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["phase"], "preview");
        assert_eq!(body["cv"]["summary"], "Jane Doe, Sales");

        let response = send(
            &app,
            empty_request(Method::POST, &format!("/api/v1/sessions/{id}/edit")),
        )
        .await;
        assert_eq!(body_json(response).await["phase"], "editing");

        let response = send(
            &app,
            json_request(
                Method::PATCH,
                &format!("/api/v1/sessions/{id}/edit"),
                json!({"commands": [
                    {"op": "set_full_name", "value": "Jane A. Doe"},
                    {"op": "set_languages_text", "text": "English, Arabic"}
                ]}),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["draft"]["fullName"], "Jane A. Doe");

        let response = send(
            &app,
            empty_request(Method::POST, &format!("/api/v1/sessions/{id}/edit/save")),
        )
        .await;
        let body = body_json(response).await;
        assert_eq!(body["phase"], "preview");
        assert_eq!(body["cv"]["languages"], json!(["English", "Arabic"]));

        let response = send(
            &app,
            empty_request(Method::GET, &format!("/api/v1/sessions/{id}/export/docx")),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"Jane_A_Doe_CV.docx\""
        );
    }

    #[tokio::test]
    async fn test_session_failure_then_retry() {
        let app = app();
        let id = new_session(&app).await;

        let response = send(
            &app,
            json_request(
                Method::POST,
                &format!("/api/v1/sessions/{id}/submit"),
                json!({"text": "FAIL please"}),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["phase"], "error");
        assert_eq!(body["error"], TRANSFORM_FAILED_MESSAGE);

        let response = send(
            &app,
            empty_request(Method::POST, &format!("/api/v1/sessions/{id}/retry")),
        )
        .await;
        let body = body_json(response).await;
        assert_eq!(body["phase"], "input");
        assert_eq!(body["draftText"], "FAIL please");
    }

    #[tokio::test]
    async fn test_illegal_transition_is_conflict() {
        let app = app();
        let id = new_session(&app).await;
        let response = send(
            &app,
            empty_request(Method::POST, &format!("/api/v1/sessions/{id}/edit/save")),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let response = send(
            &app,
            empty_request(Method::GET, &format!("/api/v1/sessions/{id}/export/pdf")),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_photo_upload_rejects_oversized_image() {
        let app = build_router(AppState {
            config: Config {
                max_photo_bytes: 16,
                ..Config::default()
            },
            transformer: Arc::new(StubTransformer),
            sessions: SessionStore::new(),
        });
        let id = new_session(&app).await;
        send(
            &app,
            json_request(Method::POST, &format!("/api/v1/sessions/{id}/submit"), json!({"text": "cv"})),
        )
        .await;
        send(
            &app,
            empty_request(Method::POST, &format!("/api/v1/sessions/{id}/edit")),
        )
        .await;

        let response = send(
            &app,
            multipart_request(
                &format!("/api/v1/sessions/{id}/edit/photo"),
                "me.jpg",
                "image/jpeg",
                &[0xFF; 64],
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

        let response = send(
            &app,
            multipart_request(
                &format!("/api/v1/sessions/{id}/edit/photo"),
                "me.jpg",
                "image/jpeg",
                &[0xFF, 0xD8, 0xFF, 0xD9],
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert!(body["draft"]["photo"]
            .as_str()
            .unwrap()
            .starts_with("data:image/jpeg;base64,"));
    }

    #[tokio::test]
    async fn test_unknown_session_is_not_found() {
        let response = send(
            &app(),
            empty_request(
                Method::GET,
                "/api/v1/sessions/00000000-0000-0000-0000-000000000000",
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
