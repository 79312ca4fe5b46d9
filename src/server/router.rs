use std::sync::Arc;
use std::time::Instant;

use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;

use super::response::ApiError;
use super::{account, health, stats};
use crate::auth::{JwtKeys, PasswordHasher};
use crate::store::Store;

pub struct AppState {
    /// `None` when the database could not be opened at startup.
    pub store: Option<Arc<dyn Store>>,
    pub jwt: JwtKeys,
    pub passwords: PasswordHasher,
}

impl AppState {
    pub fn new(store: Option<Arc<dyn Store>>, jwt: JwtKeys) -> Self {
        Self {
            store,
            jwt,
            passwords: PasswordHasher::new(),
        }
    }

    pub fn store(&self) -> Result<&Arc<dyn Store>, ApiError> {
        self.store.as_ref().ok_or_else(ApiError::database_unavailable)
    }
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let response = next.run(request).await;

    let latency = start.elapsed();
    let status = response.status();

    tracing::info!(
        "{} {} {} {}ms",
        method,
        uri.path(),
        status.as_u16(),
        latency.as_millis()
    );

    response
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/", get(health::root))
        .route("/test_db", get(health::test_db))
        // Accounts
        .route("/token", post(account::login))
        .route("/users", post(account::create_user))
        .route("/protected", get(account::protected))
        // Drivers
        .route("/driver_points", post(stats::driver_points))
        .route("/pole_position_annee", get(stats::pole_positions))
        .route("/nbr_win_driver", get(stats::driver_victories))
        .route("/detail_pilote", get(stats::driver_details))
        // Races
        .route("/abandon_annee", get(stats::retirements))
        .route("/info_gp", get(stats::grand_prix_info))
        .route("/result_year", post(stats::race_results))
        // Circuits
        .route("/nbr_course_circuit", get(stats::races_per_circuit))
        .route("/circuit_localisation", get(stats::circuit_locations))
        // Constructors
        .route("/constructor_victory", get(stats::constructor_victories))
        .route("/detail_constructor", get(stats::constructor_details))
        .route("/tout_constructeur", get(stats::constructors))
        .route(
            "/result_pilote_constructeur",
            post(stats::constructor_drivers),
        )
        .layer(middleware::from_fn(log_request))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
