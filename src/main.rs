//! Staff Schedule Backend
//!
//! REST backend for the restaurant back office: staff directory, weekly
//! schedule templates, time clock and department rollups, persisted in SQLite.

mod api;
mod config;
mod db;
mod errors;
mod models;
mod schedule;

use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::Config;
use db::Repository;
use schedule::{ScheduleBoard, WeekNavigator};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub board: Arc<ScheduleBoard<Repository>>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(repo: Repository, config: Config) -> Self {
        let board = ScheduleBoard::new(
            repo.clone(),
            WeekNavigator::current_week().range(),
            config.overnight_policy,
        );

        Self {
            repo: Arc::new(repo),
            board: Arc::new(board),
            config: Arc::new(config),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let registry = tracing_subscriber::registry().with(env_filter);
    if config.log_json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Starting Staff Schedule Backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Bind address: {}", config.bind_addr);
    tracing::info!("Overnight shifts: {}", config.overnight_policy.as_str());

    // Initialize database
    let pool = db::init_database(&config.db_path).await?;
    let repo = Repository::new(pool);

    let bind_addr = config.bind_addr;
    let state = AppState::new(repo, config);

    // Initial fetch so the first view is not empty
    let this_week = WeekNavigator::current_week();
    state.board.refresh(this_week.range()).await?;
    tracing::info!(
        "Schedule loaded for {} staff, week {}",
        state.board.staff().await.len(),
        this_week.label()
    );
    tracing::debug!(
        "Rollups computed with {:?} overnight policy",
        state.board.policy()
    );

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Server listening on {}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/revision", get(api::get_revision))
        // Staff
        .route("/staff", get(api::list_staff).post(api::create_staff))
        .route("/staff/{id}", get(api::get_staff).put(api::update_staff))
        .route("/staff/{id}/schedule", get(api::get_staff_schedule))
        .route(
            "/staff/{id}/schedule/{day}",
            put(api::update_schedule_day).delete(api::set_day_off),
        )
        // Time clock
        .route("/staff/{id}/time-clock", get(api::list_time_clock))
        .route("/staff/{id}/clock-in", post(api::clock_in))
        .route("/staff/{id}/clock-out", post(api::clock_out))
        // Weekly schedule
        .route("/schedule", get(api::get_schedule))
        .route("/schedule/staff", get(api::get_schedule_staff))
        .route("/schedule/settings", get(api::get_schedule_settings))
        .route("/schedule/week", get(api::get_week))
        .route("/schedule/week/previous", post(api::previous_week))
        .route("/schedule/week/next", post(api::next_week))
        // Departments
        .route("/departments", get(api::get_departments));

    // Health check
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
