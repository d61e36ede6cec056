use axum::{
    extract::{Json, Path, State},
    routing::{get, post, put},
    Router,
};
use uuid::Uuid;

use super::{AppState, CurrentUser};
use crate::{
    models::{DecreaseQuantityForm, Item, StockSettingsForm},
    notifications::Notification,
    stock::{stock_overview, StockCard},
    ApiResponse, ApiResult,
};

/// Create the stock router
pub fn stock_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_stock))
        .route("/:id", put(update_stock_settings))
        .route("/:id/remove", post(remove_stock))
}

/// Items under stock management with their status
pub async fn list_stock(State(state): State<AppState>) -> ApiResult<Vec<StockCard>> {
    let snapshot = state.items.subscribe().first_or_empty().await;
    Ok(Json(ApiResponse::success(stock_overview(&snapshot))))
}

pub async fn update_stock_settings(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(form): Json<StockSettingsForm>,
) -> ApiResult<StockCard> {
    let item = state.items.update_stock_settings(&user, id, form).await?;
    Ok(Json(ApiResponse::notify(
        StockCard::from_item(&item),
        Notification::success("Success", "Stock settings updated."),
    )))
}

pub async fn remove_stock(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(form): Json<DecreaseQuantityForm>,
) -> ApiResult<Item> {
    let item = state.items.remove_stock(&user, id, form).await?;
    Ok(Json(ApiResponse::notify(
        item,
        Notification::success("Success", "Units removed from stock."),
    )))
}
