//! Read-only statistics routes. Every route requires a bearer token.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};

use crate::auth::CurrentUser;
use crate::server::AppState;
use crate::server::dto::{ConstructorRequest, DriverRequest, PosRequest, VictoryParams};
use crate::server::response::{ApiError, ApiResponse, StoreResultExt};

const DEFAULT_VICTORY_LIMIT: u32 = 10;

pub async fn driver_points(
    _user: CurrentUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<DriverRequest>,
) -> impl IntoResponse {
    let rows = state
        .store()?
        .driver_points_by_year(&req.forename, &req.surname)
        .api_err("Failed to load driver points")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(rows)))
}

pub async fn retirements(
    _user: CurrentUser,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let rows = state
        .store()?
        .retirements_by_year()
        .api_err("Failed to load retirements")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(rows)))
}

pub async fn pole_positions(
    _user: CurrentUser,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let rows = state
        .store()?
        .pole_positions()
        .api_err("Failed to load pole positions")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(rows)))
}

pub async fn constructor_victories(
    _user: CurrentUser,
    State(state): State<Arc<AppState>>,
    Query(params): Query<VictoryParams>,
) -> impl IntoResponse {
    let limit = params.limit.unwrap_or(DEFAULT_VICTORY_LIMIT);

    let rows = state
        .store()?
        .constructor_victories(Some(limit))
        .api_err("Failed to load constructor victories")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(rows)))
}

pub async fn races_per_circuit(
    _user: CurrentUser,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let rows = state
        .store()?
        .races_per_circuit()
        .api_err("Failed to load circuit race counts")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(rows)))
}

pub async fn driver_victories(
    _user: CurrentUser,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let rows = state
        .store()?
        .driver_victories()
        .api_err("Failed to load driver victories")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(rows)))
}

pub async fn circuit_locations(
    _user: CurrentUser,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let rows = state
        .store()?
        .circuit_locations()
        .api_err("Failed to load circuits")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(rows)))
}

pub async fn driver_details(
    _user: CurrentUser,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let rows = state
        .store()?
        .driver_details()
        .api_err("Failed to load drivers")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(rows)))
}

pub async fn constructor_details(
    _user: CurrentUser,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let rows = state
        .store()?
        .constructor_details()
        .api_err("Failed to load constructors")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(rows)))
}

pub async fn grand_prix_info(
    _user: CurrentUser,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let rows = state
        .store()?
        .grand_prix_info()
        .api_err("Failed to load grand prix info")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(rows)))
}

pub async fn race_results(
    _user: CurrentUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<PosRequest>,
) -> impl IntoResponse {
    let rows = state
        .store()?
        .race_classifications(req.year, req.rank)
        .api_err("Failed to load race results")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(rows)))
}

pub async fn constructors(
    _user: CurrentUser,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let rows = state
        .store()?
        .constructors()
        .api_err("Failed to load constructors")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(rows)))
}

pub async fn constructor_drivers(
    _user: CurrentUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<ConstructorRequest>,
) -> impl IntoResponse {
    let rows = state
        .store()?
        .constructor_drivers(&req.constru)
        .api_err("Failed to load constructor drivers")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(rows)))
}
