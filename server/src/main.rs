use std::net::SocketAddr;

use axum::{
    extract::{Query, State},
    http::{Method, StatusCode},
    routing::get,
    Json, Router,
};
use miette::{IntoDiagnostic, Result};
use seometa::{generate_meta, Config, OpenAiClient};
use shared::{ErrorResponse, MetaRequest, MetaResponse};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Clone)]
struct AppState {
    openai: Option<OpenAiClient>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("server=debug,tower_http=debug")),
        )
        .init();

    let openai = match Config::from_env() {
        Some(config) => Some(config.client()?),
        None => {
            info!("OPENAI_API_KEY is not set, serving fallback truncation only");
            None
        }
    };

    let app = app(AppState { openai });

    let port = std::env::var("PORT")
        .ok()
        .and_then(|port| port.parse().ok())
        .unwrap_or(3000);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("listening on {}", addr);

    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await
        .into_diagnostic()?;

    Ok(())
}

fn app(state: AppState) -> Router {
    // The original endpoints were public; keep CORS permissive for both verbs.
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_origin(Any);

    Router::new()
        .route("/health", get(health))
        .route(
            "/api/generate",
            get(generate_from_query).post(generate_from_json),
        )
        .layer(cors)
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

type GenerateResult = Result<Json<MetaResponse>, (StatusCode, Json<ErrorResponse>)>;

async fn generate_from_query(
    State(state): State<AppState>,
    Query(request): Query<MetaRequest>,
) -> GenerateResult {
    respond(&state, request).await
}

async fn generate_from_json(
    State(state): State<AppState>,
    Json(request): Json<MetaRequest>,
) -> GenerateResult {
    respond(&state, request).await
}

async fn respond(state: &AppState, request: MetaRequest) -> GenerateResult {
    match generate_meta(&request.title, &request.description, state.openai.as_ref()).await {
        Ok(meta) => Ok(Json(MetaResponse { meta })),
        Err(err) => Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: err.to_string(),
            }),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn test_app() -> Router {
        app(AppState { openai: None })
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn send(request: Request<Body>) -> (StatusCode, Value) {
        let response = test_app().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn short_description_is_returned_unchanged() {
        let (status, body) =
            send(get("/api/generate?title=Shop&description=Great%20deals%20today")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "meta": "Great deals today" }));
    }

    #[tokio::test]
    async fn long_description_is_truncated_with_ellipsis() {
        let uri = format!(
            "/api/generate?title=Best%20Coffee&description={}",
            "A".repeat(200)
        );
        let (status, body) = send(get(&uri)).await;
        assert_eq!(status, StatusCode::OK);

        let meta = body["meta"].as_str().unwrap();
        assert_eq!(meta, format!("{}...", "A".repeat(157)));
        assert_eq!(meta.chars().count(), 160);
    }

    #[tokio::test]
    async fn missing_title_is_rejected() {
        let (status, body) = send(get("/api/generate?description=x")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Missing title or description" }));
    }

    #[tokio::test]
    async fn empty_title_is_rejected() {
        let (status, body) = send(get("/api/generate?title=&description=x")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Missing title or description" }));
    }

    #[tokio::test]
    async fn missing_description_is_rejected() {
        let (status, body) = send(get("/api/generate?title=Only%20title")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Missing title or description" }));
    }

    #[tokio::test]
    async fn responses_are_json_on_both_paths() {
        let ok = test_app()
            .oneshot(get("/api/generate?title=Shop&description=x"))
            .await
            .unwrap();
        assert_eq!(ok.status(), StatusCode::OK);
        assert_eq!(ok.headers()[header::CONTENT_TYPE], "application/json");

        let rejected = test_app()
            .oneshot(get("/api/generate?title=&description="))
            .await
            .unwrap();
        assert_eq!(rejected.status(), StatusCode::BAD_REQUEST);
        assert_eq!(rejected.headers()[header::CONTENT_TYPE], "application/json");
    }

    #[tokio::test]
    async fn post_body_behaves_like_query_params() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/generate")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                r#"{"title":"Shop","description":"Great deals today"}"#,
            ))
            .unwrap();

        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "meta": "Great deals today" }));
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let (status, body) = send(get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "ok" }));
    }
}
