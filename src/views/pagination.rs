use serde::{Deserialize, Serialize};

pub const HISTORY_PAGE_SIZE: usize = 25;

/// Pages shown in full before the window starts eliding.
const MAX_VISIBLE_PAGES: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    /// 1-based page number.
    pub page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
    pub entries: Vec<T>,
}

pub fn total_pages(total_items: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total_items.div_ceil(page_size)
}

/// Slice out page `page` (1-based). Pages past the end are empty.
pub fn paginate<T: Clone>(entries: &[T], page: usize, page_size: usize) -> Page<T> {
    let total_pages = total_pages(entries.len(), page_size);
    let slice = if page == 0 || page_size == 0 {
        &[][..]
    } else {
        let start = (page - 1).saturating_mul(page_size).min(entries.len());
        let end = start.saturating_add(page_size).min(entries.len());
        &entries[start..end]
    };

    Page {
        page,
        page_size,
        total_items: entries.len(),
        total_pages,
        entries: slice.to_vec(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "page", rename_all = "lowercase")]
pub enum PageLink {
    Number(usize),
    Ellipsis,
}

/// Page links around `current`: everything up to five pages, otherwise
/// the first and last page, the neighbours of `current`, and ellipses
/// for the gaps. `current` outside `1..=total` is clamped.
pub fn page_window(current: usize, total: usize) -> Vec<PageLink> {
    if total <= MAX_VISIBLE_PAGES {
        return (1..=total).map(PageLink::Number).collect();
    }
    let current = current.clamp(1, total);

    let mut links = vec![PageLink::Number(1)];
    if current > 3 {
        links.push(PageLink::Ellipsis);
    }
    let from = current.saturating_sub(1).max(2);
    let to = (current + 1).min(total - 1);
    links.extend((from..=to).map(PageLink::Number));
    if current + 2 < total {
        links.push(PageLink::Ellipsis);
    }
    links.push(PageLink::Number(total));
    links
}
