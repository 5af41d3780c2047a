use axum::{Json, Router, extract::State, response::IntoResponse, routing::get};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use reefpoint_server::config::Config;
use reefpoint_server::export::export_routes;
use reefpoint_server::source::local::register_local_images;
use reefpoint_server::source::source_routes;
use reefpoint_server::state::AppState;
use reefpoint_server::upload::upload_routes;
use serde::Serialize;
use std::net::SocketAddr;
use std::path::Path;
use std::time::{Duration, Instant};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Application start time for uptime calculation
static START_TIME: std::sync::OnceLock<Instant> = std::sync::OnceLock::new();

/// Ensure a directory exists, creating it if necessary.
/// Returns true if directory exists and is empty.
fn ensure_directory(path: &Path, name: &str) -> std::io::Result<bool> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
        info!("Created {} directory: {:?}", name, path);
        Ok(true) // newly created, so empty
    } else if path.is_dir() {
        let is_empty = path.read_dir()?.next().is_none();
        Ok(is_empty)
    } else {
        Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("{} path {:?} exists but is not a directory", name, path),
        ))
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    images: usize,
    uptime_seconds: u64,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let uptime = START_TIME.get().map(|t| t.elapsed().as_secs()).unwrap_or(0);
    let stats = state.store.stats().await;

    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        images: stats.images,
        uptime_seconds: uptime,
    })
}

#[derive(Serialize)]
struct MetricsResponse {
    /// Server uptime in seconds
    uptime_seconds: u64,
    /// Server version
    version: &'static str,
    /// Registered images
    images: usize,
    /// Sample points across all images
    points: usize,
    /// Annotated points across all images
    annotations: usize,
}

async fn metrics(State(state): State<AppState>) -> Json<MetricsResponse> {
    let uptime = START_TIME.get().map(|t| t.elapsed().as_secs()).unwrap_or(0);
    let stats = state.store.stats().await;

    Json(MetricsResponse {
        uptime_seconds: uptime,
        version: env!("CARGO_PKG_VERSION"),
        images: stats.images,
        points: stats.points,
        annotations: stats.annotations,
    })
}

/// Prometheus metrics handle for exposing metrics in Prometheus format
static PROMETHEUS_HANDLE: std::sync::OnceLock<PrometheusHandle> = std::sync::OnceLock::new();

/// Initialize the Prometheus metrics recorder
fn setup_prometheus_metrics() -> PrometheusHandle {
    PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus recorder")
}

/// Endpoint to expose metrics in Prometheus format
async fn prometheus_metrics() -> impl IntoResponse {
    let handle = PROMETHEUS_HANDLE
        .get()
        .expect("Prometheus handle not initialized");
    handle.render()
}

/// Update gauge metrics for store contents (called periodically)
async fn update_gauge_metrics(state: &AppState) {
    let stats = state.store.stats().await;

    metrics::gauge!("reefpoint_images").set(stats.images as f64);
    metrics::gauge!("reefpoint_points").set(stats.points as f64);
    metrics::gauge!("reefpoint_annotations").set(stats.annotations as f64);

    let uptime = START_TIME.get().map(|t| t.elapsed().as_secs()).unwrap_or(0);
    metrics::gauge!("reefpoint_uptime_seconds").set(uptime as f64);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Record server start time
    START_TIME.set(Instant::now()).ok();

    // Initialize Prometheus metrics recorder (must be done before any metrics are recorded)
    let prometheus_handle = setup_prometheus_metrics();
    PROMETHEUS_HANDLE.set(prometheus_handle).ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reefpoint=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from environment
    let config = Config::from_env();
    info!(
        "Loaded configuration: host={}, port={}",
        config.host, config.port
    );

    // Ensure the images directory exists (auto-create for dev-friendly startup)
    match ensure_directory(&config.images_dir, "images") {
        Ok(is_empty) => {
            if is_empty {
                warn!(
                    "Images directory {:?} is empty - place survey photos here to serve them",
                    config.images_dir
                );
            }
        }
        Err(e) => {
            warn!(
                "Failed to create images directory {:?}: {}",
                config.images_dir, e
            );
        }
    }

    // Create shared application state and register local images
    let state = AppState::new(config.clone());
    let registered = register_local_images(&state.store, &config.images_dir).await;
    info!("Registered {} local images", registered);

    // Periodic update of gauge metrics (every 5 seconds)
    let metrics_state = state.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(5));
        loop {
            interval.tick().await;
            update_gauge_metrics(&metrics_state).await;
        }
    });

    // Build CORS layer
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build the router: health/metrics plus the per-module API routers
    let api = source_routes(state.clone())
        .merge(upload_routes(state.clone()))
        .merge(export_routes(state.clone()));

    let app = Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .route("/metrics/prometheus", get(prometheus_metrics))
        .with_state(state)
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start the server
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Reefpoint server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
