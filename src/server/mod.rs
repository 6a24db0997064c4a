//! HTTP front end
//!
//! Wires the provider clients into shared state, maps application errors
//! onto HTTP statuses, and exposes the four routes the game frontend uses.

pub mod handlers;

use crate::ai::{ChatService, ImageGenerationService, OpenAiChatClient, OpenAiImageClient};
use crate::archive::ImageArchive;
use crate::models::Config;
use crate::{Error, Result};
use axum::extract::Request;
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub chat: Arc<dyn ChatService>,
    pub image_gen: Arc<dyn ImageGenerationService>,
    pub archive: Arc<ImageArchive>,
}

impl AppState {
    /// Build state with concrete service dependencies.
    ///
    /// This is primarily useful for tests that need to inject mocks.
    pub fn with_services(
        config: Config,
        chat: Arc<dyn ChatService>,
        image_gen: Arc<dyn ImageGenerationService>,
        archive: Arc<ImageArchive>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            chat,
            image_gen,
            archive,
        }
    }

    /// Wire OpenAI-backed services from configuration.
    pub fn from_config(config: Config) -> Self {
        // Reuse one HTTP connection pool across provider clients.
        let http_client = reqwest::Client::new();

        let chat = Arc::new(OpenAiChatClient::new_with_client(
            config.openai_api_key.clone(),
            config.chat_model.clone(),
            config.turn_model.clone(),
            http_client.clone(),
        ));
        let image_gen = Arc::new(OpenAiImageClient::new_with_client(
            config.openai_api_key.clone(),
            config.image_model.clone(),
            http_client,
        ));
        let archive = Arc::new(ImageArchive::new(
            &config.output_dir,
            config.environment.is_development(),
        ));

        if config.environment.is_development() {
            info!(
                "Development mode: images will be saved to {}",
                config.output_dir.display()
            );
        }

        Self::with_services(config, chat, image_gen, archive)
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match self {
            Error::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Error::Schema(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        error!("Request failed ({}): {}", status, self);
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

async fn log_request(request: Request, next: Next) -> Response {
    info!("{} {}", request.method(), request.uri().path());
    next.run(request).await
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::home))
        .route("/generate-image", post(handlers::generate_image))
        .route("/generate-text", post(handlers::generate_text))
        .route(
            "/generate-text-and-image",
            post(handlers::generate_text_and_image),
        )
        .layer(middleware::from_fn(log_request))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn serve(state: AppState, addr: SocketAddr) -> Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
