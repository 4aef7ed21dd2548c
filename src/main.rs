use actix_cors::Cors;
use actix_web::{web, App, HttpServer, HttpResponse, middleware, error, http::StatusCode};
use homematch::config::Settings;
use homematch::core::Matcher;
use homematch::routes::{self, matches::AppState};
use homematch::services::{EnrichmentCache, ListingStore, PostgresStore, ReasoningClient, ReasoningProvider};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, error, warn};
use tracing_subscriber::EnvFilter;

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST))
            .json(self)
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

fn build_reasoning(settings: &homematch::config::ReasoningSettings) -> ReasoningProvider {
    let Some(api_key) = settings.credential() else {
        info!("No reasoning credential configured, using rule-based scoring");
        return ReasoningProvider::disabled();
    };

    let call_timeout = Duration::from_secs(settings.timeout_secs);
    match ReasoningClient::new(
        settings.endpoint.clone(),
        api_key.to_string(),
        settings.model.clone(),
        settings.max_tokens,
        call_timeout + Duration::from_secs(5),
    ) {
        Ok(client) => {
            info!("Reasoning service enabled (model: {}, timeout: {}s)", settings.model, settings.timeout_secs);
            ReasoningProvider::new(Arc::new(client), call_timeout)
        }
        Err(e) => {
            warn!("Failed to build reasoning client ({}), using rule-based scoring", e);
            ReasoningProvider::disabled()
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Initialize logging
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level)))
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.compact().init();
    }

    info!("Starting HomeMatch matching service...");

    let settings = Settings::load().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    info!("Configuration loaded successfully");

    let store: Arc<dyn ListingStore> = Arc::new(
        PostgresStore::from_settings(&settings.database)
            .await
            .map_err(|e| {
                error!("Failed to connect to PostgreSQL: {}", e);
                std::io::Error::new(std::io::ErrorKind::ConnectionRefused, e.to_string())
            })?,
    );

    info!(
        "PostgreSQL store initialized (max: {} connections)",
        settings.database.max_connections.unwrap_or(10)
    );

    let enrichment = EnrichmentCache::new(
        settings.cache.enrichment_entries,
        Duration::from_secs(settings.cache.enrichment_ttl_secs),
    );

    let limits = settings.matching.limits();
    let matcher = Matcher::new(store.clone(), build_reasoning(&settings.reasoning), enrichment, limits);

    info!("Matcher initialized with limits: {:?}", limits);

    let app_state = AppState { store, matcher };

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
