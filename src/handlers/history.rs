use axum::{
    extract::{Json, Query, State},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::AppState;
use crate::{
    views::{history_rows, page_window, paginate, HistoryRow, PageLink},
    ApiResponse, ApiResult,
};

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    #[serde(default = "default_page")]
    pub page: usize,
    pub item_id: Option<Uuid>,
}

fn default_page() -> usize {
    1
}

/// One page of the history table with its page links.
#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryPageView {
    pub page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
    pub rows: Vec<HistoryRow>,
    pub pages: Vec<PageLink>,
}

/// Create the history router
pub fn history_routes() -> Router<AppState> {
    Router::new().route("/", get(list_history))
}

pub async fn list_history(
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> ApiResult<HistoryPageView> {
    let snapshot = state.history.subscribe(params.item_id).first_or_empty().await;
    let page = paginate(&snapshot, params.page, state.config.history_page_size);

    Ok(Json(ApiResponse::success(HistoryPageView {
        pages: page_window(page.page, page.total_pages),
        rows: history_rows(&page.entries),
        page: page.page,
        page_size: page.page_size,
        total_items: page.total_items,
        total_pages: page.total_pages,
    })))
}
