use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AppState, CurrentUser};
use crate::{
    errors::ServiceError,
    models::{DecreaseQuantityForm, EditItemForm, Item, NewItemForm},
    notifications::Notification,
    stock::{assess, StockLevel},
    views::{group_by_location, history_rows, HistoryRow, LocationFilter, LocationGroup},
    ApiResponse, ApiResult,
};

#[derive(Debug, Default, Deserialize)]
pub struct ItemFilters {
    pub location: Option<String>,
}

/// Grouped item list plus the locations available to filter on.
#[derive(Debug, Serialize, Deserialize)]
pub struct ItemListView {
    pub total: usize,
    pub locations: Vec<String>,
    pub groups: Vec<LocationGroup>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ItemDetail {
    pub item: Item,
    /// Present when stock management is enabled.
    pub stock: Option<StockLevel>,
    pub history: Vec<HistoryRow>,
}

/// Create the item router
pub fn item_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_items).post(create_item))
        .route(
            "/:id",
            get(get_item).put(update_item).delete(delete_item),
        )
        .route("/:id/decrease", post(decrease_quantity))
}

/// List items grouped by location
pub async fn list_items(
    State(state): State<AppState>,
    Query(filters): Query<ItemFilters>,
) -> ApiResult<ItemListView> {
    let snapshot = state.items.subscribe().first_or_empty().await;
    let filter = LocationFilter::from_query(filters.location.as_deref());

    let locations = group_by_location(&snapshot, &LocationFilter::All)
        .into_iter()
        .map(|group| group.location)
        .collect();

    Ok(Json(ApiResponse::success(ItemListView {
        total: snapshot.len(),
        locations,
        groups: group_by_location(&snapshot, &filter),
    })))
}

pub async fn create_item(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(form): Json<NewItemForm>,
) -> Result<(StatusCode, Json<ApiResponse<Item>>), ServiceError> {
    let item = state.items.add_item(&user, form).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::notify(
            item,
            Notification::success("Item added", "The item was added successfully."),
        )),
    ))
}

/// Item with its stock level and history
pub async fn get_item(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<ItemDetail> {
    let item = state.items.get_item(id).await?;
    let history = state.history.subscribe(Some(id)).first_or_empty().await;
    let stock = item.stock_management_enabled.then(|| assess(&item));

    Ok(Json(ApiResponse::success(ItemDetail {
        history: history_rows(&history),
        stock,
        item,
    })))
}

pub async fn update_item(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(form): Json<EditItemForm>,
) -> ApiResult<Item> {
    let item = state.items.edit_item(&user, id, form).await?;
    Ok(Json(ApiResponse::notify(
        item,
        Notification::success("Item updated", "The item was updated successfully."),
    )))
}

pub async fn delete_item(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Uuid> {
    state.items.delete_item(&user, id).await?;
    Ok(Json(ApiResponse::notify(
        id,
        Notification::success("Item deleted", "The item was deleted successfully."),
    )))
}

pub async fn decrease_quantity(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(form): Json<DecreaseQuantityForm>,
) -> ApiResult<Item> {
    let item = state.items.decrease_quantity(&user, id, form).await?;
    Ok(Json(ApiResponse::notify(
        item,
        Notification::success("Quantity updated", "The quantity was decreased."),
    )))
}
