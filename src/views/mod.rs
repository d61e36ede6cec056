//! Pure derivations over item and history snapshots.
//!
//! Nothing here touches the backend; handlers feed in the latest snapshot
//! and serialise the result.

pub mod grouping;
pub mod history;
pub mod pagination;

pub use grouping::{
    filter_by_location, fold, group_by_location, location_key, sort_items, LocationFilter,
    LocationGroup, NO_LOCATION,
};
pub use history::{change_label, history_rows, HistoryRow};
pub use pagination::{page_window, paginate, total_pages, Page, PageLink, HISTORY_PAGE_SIZE};
