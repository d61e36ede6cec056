use axum::{extract::Json, routing::get, Router};

use super::AppState;
use crate::{
    catalog::{catalog, Catalog},
    ApiResponse, ApiResult,
};

pub fn catalog_routes() -> Router<AppState> {
    Router::new().route("/", get(get_catalog))
}

/// Picker values for categories, locations and conditions
pub async fn get_catalog() -> ApiResult<Catalog> {
    Ok(Json(ApiResponse::success(catalog())))
}
