//! Client behaviour against an in-process backend.

use std::time::Duration;

use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use syllabot_client::{ask_classified, AssistantService, HttpAssistant, HttpClient};
use syllabot_core::{DocumentId, QueryFailure, QueryRequest, RequestId, NO_RESPONSE_FALLBACK};

const CHAT_PATH: &str = "/chatbot/chat_with_pdf_embeddings";

async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

fn request(message: &str) -> QueryRequest {
    QueryRequest {
        request_id: RequestId::generate(),
        message: message.to_string(),
        document_id: DocumentId::new("syllabus-42"),
        document_content: "Final exam: May 1".to_string(),
    }
}

#[tokio::test]
async fn test_ask_returns_response_text() {
    let router = Router::new().route(
        CHAT_PATH,
        post(|Json(body): Json<Value>| async move {
            assert_eq!(body["pdfId"], "syllabus-42");
            assert_eq!(body["pdfContent"], "Final exam: May 1");
            Json(json!({ "response": format!("You asked: {}", body["message"].as_str().unwrap_or("")) }))
        }),
    );
    let base = serve(router).await;

    let assistant = HttpAssistant::new(HttpClient::new(&base));
    let text = assistant.ask(&request("When is the final?")).await.unwrap();
    assert_eq!(text, "You asked: When is the final?");
}

#[tokio::test]
async fn test_missing_response_field_falls_back() {
    let router = Router::new().route(CHAT_PATH, post(|| async { Json(json!({})) }));
    let base = serve(router).await;

    let assistant = HttpAssistant::new(HttpClient::new(&base));
    let text = assistant.ask(&request("hi")).await.unwrap();
    assert_eq!(text, NO_RESPONSE_FALLBACK);
}

#[tokio::test]
async fn test_missing_route_is_not_found() {
    let router = Router::new().route("/chatbot/chat_with_pdf", post(|| async { Json(json!({})) }));
    let base = serve(router).await;

    let assistant = HttpAssistant::new(HttpClient::new(&base));
    let failure = ask_classified(&assistant, &request("hi")).await.unwrap_err();
    assert_eq!(failure, QueryFailure::NotFound);
}

#[tokio::test]
async fn test_custom_chat_path() {
    let router = Router::new().route(
        "/chatbot/chat_with_pdf",
        post(|| async { Json(json!({ "response": "ok" })) }),
    );
    let base = serve(router).await;

    let assistant =
        HttpAssistant::new(HttpClient::new(&base)).with_chat_path("/chatbot/chat_with_pdf");
    assert_eq!(assistant.ask(&request("hi")).await.unwrap(), "ok");
}

#[tokio::test]
async fn test_service_error_carries_server_message() {
    let router = Router::new().route(
        CHAT_PATH,
        post(|| async {
            (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Missing required parameters (message and pdfContent)." })),
            )
        }),
    );
    let base = serve(router).await;

    let assistant = HttpAssistant::new(HttpClient::new(&base));
    let failure = ask_classified(&assistant, &request("hi")).await.unwrap_err();
    assert_eq!(
        failure,
        QueryFailure::ServiceError(Some(
            "Missing required parameters (message and pdfContent).".to_string()
        ))
    );
}

#[tokio::test]
async fn test_service_error_without_json_body() {
    let router = Router::new().route(
        CHAT_PATH,
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    );
    let base = serve(router).await;

    let assistant = HttpAssistant::new(HttpClient::new(&base));
    let failure = ask_classified(&assistant, &request("hi")).await.unwrap_err();
    assert_eq!(failure, QueryFailure::ServiceError(None));
}

#[tokio::test]
async fn test_unreachable_backend_is_network_unavailable() {
    // Grab a free port, then close it so nothing is listening.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let assistant = HttpAssistant::new(HttpClient::new(&format!("http://{}", addr)));
    let failure = ask_classified(&assistant, &request("hi")).await.unwrap_err();
    assert_eq!(failure, QueryFailure::NetworkUnavailable);
}

#[tokio::test]
async fn test_slow_backend_times_out_as_network_unavailable() {
    let router = Router::new().route(
        CHAT_PATH,
        post(|| async {
            tokio::time::sleep(Duration::from_secs(2)).await;
            Json(json!({ "response": "too late" }))
        }),
    );
    let base = serve(router).await;

    let http = HttpClient::with_timeout(&base, Duration::from_millis(100)).unwrap();
    let assistant = HttpAssistant::new(http);
    let failure = ask_classified(&assistant, &request("hi")).await.unwrap_err();
    assert_eq!(failure, QueryFailure::NetworkUnavailable);
}

#[tokio::test]
async fn test_health() {
    let router = Router::new().route("/health", get(|| async { "OK" }));
    let base = serve(router).await;

    assert!(HttpClient::new(&base).health().await.unwrap());
}
