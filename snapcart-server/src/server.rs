//! Axum router and request handlers.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::HeaderMap;
use axum::response::{Html, IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde_json::json;
use snapcart_core::{AppConfig, ItemDescription, MatchMode};
use snapcart_pipeline::{
    CandidateMatcher, CatalogClient, MatchPipeline, OpenAiChat, OpenAiRanker, OpenAiVision,
    VisionModel,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::error::AppError;
use crate::protocol::{
    CandidateUploadResponse, CheckLoginResponse, SelectProductRequest, SelectProductResponse,
    UploadResponse,
};

/// Upload size cap.
const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// Timeout for the check-login proxy call.
const PROXY_TIMEOUT: Duration = Duration::from_secs(30);

/// Shared state handed to every handler. Read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    /// `None` when the vision key is not configured; uploads then fail
    /// fast with a "service not configured" error.
    pub vision: Option<Arc<dyn VisionModel>>,
    pub pipeline: Arc<MatchPipeline>,
    /// Client for the storefront login proxy.
    pub http: reqwest::Client,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}

impl AppState {
    /// Wire up the production state from configuration.
    pub fn from_config(config: Arc<AppConfig>) -> Result<Self, snapcart_pipeline::PipelineError> {
        let vision: Option<Arc<dyn VisionModel>> = config
            .openai_api_key
            .as_ref()
            .map(|key| Arc::new(OpenAiVision::new(OpenAiChat::new(key.clone()))) as Arc<dyn VisionModel>);

        // The ranker shares the vision key; without one it is never
        // reached because the upload handler fails first.
        let ranker_key = config.openai_api_key.clone().unwrap_or_default();
        let pipeline = MatchPipeline::builder()
            .catalog(CatalogClient::from_config(&config))
            .matcher(CandidateMatcher::new(Arc::new(OpenAiRanker::new(OpenAiChat::new(ranker_key)))))
            .allow_fallback_match(config.allow_fallback_match)
            .max_candidates(config.max_candidates)
            .build()?;

        let http = reqwest::Client::builder().timeout(PROXY_TIMEOUT).build().unwrap_or_default();

        Ok(Self { config, vision, pipeline: Arc::new(pipeline), http })
    }
}

/// Build the application router.
pub fn app_router(state: AppState) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/upload", post(upload_image))
        .route("/check-login", get(check_login))
        .route("/select_product", post(select_product))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Bind and serve until shutdown.
pub async fn run_server(port: u16, state: AppState) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("snapcart listening on http://{}", addr);
    axum::serve(listener, app_router(state)).await?;
    Ok(())
}

async fn index() -> impl IntoResponse {
    Html(include_str!("../assets/index.html"))
}

async fn health() -> impl IntoResponse {
    Json(json!({"status": "ok", "service": "snapcart"}))
}

/// Handle an image upload: identify the item, then find a product.
async fn upload_image(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Response, AppError> {
    if state.config.require_store_login && session_cookie(&headers).is_none() {
        return Err(AppError::Unauthorized);
    }

    let image = read_image_field(multipart).await?;

    let Some(vision) = &state.vision else {
        error!("vision API key not set; refusing upload");
        return Err(AppError::NotConfigured("AI service not configured".to_string()));
    };

    let identification = match vision.identify(&image).await {
        Ok(identification) => identification,
        Err(e) => {
            // Upstream model trouble is not the user's problem; report
            // an unidentified item instead of failing the upload.
            error!(error = %e, "vision identification failed");
            ItemDescription::not_found(format!("Identification failed: {e}"))
        }
    };

    let image_data = format!("data:image/jpeg;base64,{}", BASE64.encode(&image));

    match state.config.match_mode {
        MatchMode::Auto => {
            let product_url = if identification.is_identified() {
                state.pipeline.find_match(&identification.name).await.product.map(|p| p.url)
            } else {
                None
            };
            Ok(Json(UploadResponse { success: true, identification, product_url, image_data })
                .into_response())
        }
        MatchMode::Candidates => {
            let candidate_products = if identification.is_identified() {
                state.pipeline.find_candidates(&identification.name).await
            } else {
                Vec::new()
            };
            Ok(Json(CandidateUploadResponse { identification, candidate_products, image_data })
                .into_response())
        }
    }
}

/// Pull the bytes of the `image` form field out of the multipart body.
async fn read_image_field(mut multipart: Multipart) -> Result<Vec<u8>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("invalid upload body: {e}")))?
    {
        if field.name() != Some("image") {
            continue;
        }

        if field.file_name().map(str::trim).filter(|name| !name.is_empty()).is_none() {
            return Err(AppError::BadRequest("No image file selected".to_string()));
        }

        // A body that dies mid-read (disconnect, size cap) is not a
        // request-shape problem; report it as a processing failure.
        let bytes = field
            .bytes()
            .await
            .map_err(|e| anyhow::anyhow!("failed to read image upload: {e}"))?;
        return Ok(bytes.to_vec());
    }

    Err(AppError::BadRequest("No image file provided".to_string()))
}

/// Report whether the forwarded storefront session is logged in.
async fn check_login(State(state): State<AppState>, headers: HeaderMap) -> Json<CheckLoginResponse> {
    let Some(cookie) = session_cookie(&headers) else {
        return Json(CheckLoginResponse { logged_in: false });
    };

    let endpoint = format!("{}/storefront/api/v1/account", state.config.api_base);
    let logged_in = match state
        .http
        .get(&endpoint)
        .header("domain-name", &state.config.store_domain)
        .header("Cookie", cookie)
        .send()
        .await
    {
        Ok(response) => response.status().is_success(),
        Err(e) => {
            warn!(error = %e, "login check against storefront failed");
            false
        }
    };

    Json(CheckLoginResponse { logged_in })
}

/// Record the user's pick from a candidate list. No persistence; the
/// confirmation echo is all the frontend needs.
async fn select_product(
    Json(request): Json<SelectProductRequest>,
) -> Result<Json<SelectProductResponse>, AppError> {
    let product_url = request
        .product_url
        .filter(|url| !url.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("No product URL provided".to_string()))?;

    info!(%product_url, "user selected product");

    Ok(Json(SelectProductResponse {
        success: true,
        product_url,
        message: "Product selected successfully".to_string(),
    }))
}

/// The raw storefront session cookie header, forwarded as-is. Session
/// management beyond pass-through is out of scope.
fn session_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get(axum::http::header::COOKIE)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
