use actix_cors::Cors;
use actix_web::middleware::Compress;
use actix_web::{web, App, HttpServer};
use actix_web_prometheus::PrometheusMetricsBuilder;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

pub mod category;
pub mod config;
pub mod error;
pub mod google;
pub mod keep_warm;
pub mod notify;
pub mod receipt;
pub mod spreadsheet;
pub mod state;
pub mod storage;
pub mod voucher;

pub use crate::state::AppState;

use crate::config::AppConfig;
use crate::voucher::{handlers, models};

/// Body of every error response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: &str) -> Self {
        Self {
            error: message.to_string(),
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::voucher::handlers::ping,
        crate::voucher::handlers::get_voucher_no,
        crate::voucher::handlers::get_suggestions,
        crate::voucher::handlers::submit,
    ),
    components(
        schemas(
            models::VoucherForm,
            models::PingResponse,
            models::VoucherNoResponse,
            models::SuggestionsResponse,
            models::SubmitResponse,
            ErrorResponse,
        )
    ),
    tags(
        (name = "Voucher Service", description = "Voucher numbering, payee suggestions and submission.")
    )
)]
pub struct ApiDoc;

/// Voucher endpoints plus the OpenAPI document and Swagger UI.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(handlers::config).service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-doc/openapi.json", ApiDoc::openapi()),
    );
}

fn build_http_client() -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .pool_idle_timeout(std::time::Duration::from_secs(900))
        .user_agent(concat!("voucher-server/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("building HTTP client")
}

fn startup() -> anyhow::Result<(AppConfig, AppState, reqwest::Client)> {
    let config = AppConfig::from_env().context("reading configuration")?;
    if config.categories.is_empty() {
        log::warn!("No spreadsheet ids configured; every category will be rejected");
    }

    let http = build_http_client()?;
    let state = AppState::from_config(&config, http.clone())?;
    Ok((config, state, http))
}

pub async fn run() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let (config, state, http) = match startup() {
        Ok(parts) => parts,
        Err(e) => {
            log::error!("Failed to start voucher server: {:#}", e);
            std::process::exit(1);
        }
    };
    let app_state = web::Data::new(state);

    let prometheus = PrometheusMetricsBuilder::new("voucher_server")
        .endpoint("/metrics")
        .build()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;

    if let Some(period) = config.keep_warm_interval {
        keep_warm::spawn(http, keep_warm::ping_url(config.port), period);
    } else {
        log::info!("Keep-warm pinger disabled");
    }

    let public_dir = config.public_dir.clone();
    let serve_public = public_dir.is_dir();
    if !serve_public {
        log::warn!("Public dir {} not found; static files are not served", public_dir.display());
    }

    log::info!("Starting server at http://0.0.0.0:{}", config.port);

    HttpServer::new(move || {
        let app = App::new()
            .wrap(Compress::default())
            .wrap(prometheus.clone())
            .wrap(Cors::permissive())
            .app_data(app_state.clone())
            .configure(configure_routes);

        if serve_public {
            app.service(actix_files::Files::new("/", public_dir.clone()).index_file("index.html"))
        } else {
            app
        }
    })
    .keep_alive(actix_web::http::KeepAlive::Os)
    .bind(("0.0.0.0", config.port))?
    .run()
    .await
}
