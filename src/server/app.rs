use anyhow::Result;
use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};
use sea_orm::DatabaseConnection;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};

use super::handlers::{auth, health, measurements, sensors, series};
use crate::auth::AuthService;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub auth: AuthService,
}

pub async fn create_app(
    db: DatabaseConnection,
    auth: AuthService,
    cors_origin: Option<&str>,
) -> Result<Router> {
    let state = AppState { db, auth };

    let cors = match cors_origin {
        Some(origin) => CorsLayer::new()
            .allow_origin(origin.parse::<axum::http::HeaderValue>()?)
            .allow_methods(Any)
            .allow_headers(Any),
        None => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    };

    let app = Router::new()
        // Health check endpoint
        .route("/health", get(health::health_check))
        // API v1 routes
        .nest("/api/v1", api_v1_routes())
        // Add middleware
        .layer(ServiceBuilder::new().layer(cors))
        .with_state(state);

    Ok(app)
}

fn api_v1_routes() -> Router<AppState> {
    Router::new()
        // Session routes
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        // Series routes
        .route("/series", get(series::list_series))
        .route("/series", post(series::create_series))
        .route("/series/:id", get(series::get_series))
        .route("/series/:id", put(series::update_series))
        .route("/series/:id", delete(series::delete_series))
        // Measurement routes
        .route("/measurements", get(measurements::list_measurements))
        .route("/measurements", post(measurements::create_measurement))
        .route("/measurements/:id", get(measurements::get_measurement))
        .route("/measurements/:id", put(measurements::update_measurement))
        .route("/measurements/:id", delete(measurements::delete_measurement))
        // Sensor routes
        .route("/sensors", get(sensors::list_sensors))
        .route("/sensors", post(sensors::create_sensor))
        .route("/sensors/:id", get(sensors::get_sensor))
        .route("/sensors/:id", patch(sensors::update_sensor))
        .route("/sensors/:id", delete(sensors::delete_sensor))
        .route("/sensors/:id/measurements", post(sensors::submit_sensor_data))
}
