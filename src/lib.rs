use actix_cors::Cors;
use actix_web::middleware::Compress;
use actix_web::{http::header, web, App, HttpServer};
use actix_web_prometheus::PrometheusMetricsBuilder;
use serde::{Deserialize, Serialize};

pub mod config;
pub mod http;
pub mod mcp;
pub mod provider;
pub mod state;
pub mod store;

pub use crate::config::AppConfig;
pub use crate::state::AppState;

/// JSON error body for the plain-HTTP boundary (downloads, internal errors).
#[derive(Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error_type: &str, message: &str) -> Self {
        Self {
            error: error_type.to_string(),
            message: message.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn not_found(message: &str) -> Self {
        Self::new("NotFound", message)
    }

    pub fn internal_error(message: &str) -> Self {
        Self::new("InternalServerError", message)
    }
}

pub async fn run() -> std::io::Result<()> {
    dotenvy::dotenv().ok(); // Load .env file
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let app_config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!(
                "Invalid configuration: {}. Set NAPKIN_API_KEY in the environment or .env.",
                e
            );
            std::process::exit(1);
        }
    };
    let port = app_config.port;

    let prometheus = PrometheusMetricsBuilder::new("napkin_mcp_server")
        .endpoint("/metrics")
        .build()
        .expect("Failed to create Prometheus metrics middleware");

    let app_state = web::Data::new(AppState::new(app_config));

    log::info!("Starting MCP bridge at http://0.0.0.0:{port}");

    HttpServer::new(move || {
        let app_state = app_state.clone();
        let prometheus = prometheus.clone();
        // MCP clients connect from browsers and desktop agents alike.
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET", "POST", "OPTIONS"])
            .allowed_headers(vec![
                header::AUTHORIZATION,
                header::ACCEPT,
                header::CONTENT_TYPE,
            ])
            .allowed_header(http::SESSION_HEADER)
            .expose_headers(vec![http::SESSION_HEADER])
            .max_age(3600);

        App::new()
            .wrap(Compress::default())
            .wrap(prometheus)
            .wrap(cors)
            .app_data(app_state)
            .configure(http::config)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
