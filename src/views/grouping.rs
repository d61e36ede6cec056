use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

use crate::models::Item;

pub const NO_LOCATION: &str = "No location";

/// Location filter of the item list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LocationFilter {
    #[default]
    All,
    Only(String),
}

impl LocationFilter {
    /// Parses the `location` query value; empty and `all` mean no filter.
    pub fn from_query(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None | Some("") => LocationFilter::All,
            Some(v) if v.eq_ignore_ascii_case("all") => LocationFilter::All,
            Some(v) => LocationFilter::Only(v.to_string()),
        }
    }

    pub fn matches(&self, item: &Item) -> bool {
        match self {
            LocationFilter::All => true,
            LocationFilter::Only(location) => {
                location_key(&item.location) == location_key(location)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationGroup {
    pub location: String,
    pub items: Vec<Item>,
}

/// Identity of a location: NFC-normalised and lowercased, so case
/// variants and canonically equivalent spellings compare equal. Accents
/// still distinguish locations.
pub fn location_key(value: &str) -> String {
    value.trim().nfc().collect::<String>().to_lowercase()
}

/// Sort key ignoring case and accents, so "Électroménager" sorts next to
/// "electricite" rather than after "z".
pub fn fold(value: &str) -> String {
    value
        .trim()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

fn compare_folded(a: &str, b: &str) -> Ordering {
    fold(a)
        .cmp(&fold(b))
        .then_with(|| location_key(a).cmp(&location_key(b)))
}

/// Sorts by location, then category.
pub fn sort_items(items: &mut [Item]) {
    items.sort_by(|a, b| {
        compare_folded(&a.location, &b.location)
            .then_with(|| compare_folded(&a.category, &b.category))
    });
}

pub fn filter_by_location(items: &[Item], filter: &LocationFilter) -> Vec<Item> {
    items.iter().filter(|i| filter.matches(i)).cloned().collect()
}

/// Groups items by location.
///
/// Spellings that differ only in case or Unicode normal form share a group
/// named after the first spelling seen. With `LocationFilter::Only` a
/// single group named after the filter value is returned.
pub fn group_by_location(items: &[Item], filter: &LocationFilter) -> Vec<LocationGroup> {
    if let LocationFilter::Only(location) = filter {
        let mut matching = filter_by_location(items, filter);
        matching.sort_by(|a, b| compare_folded(&a.category, &b.category));
        return vec![LocationGroup {
            location: location.clone(),
            items: matching,
        }];
    }

    let mut groups: Vec<(String, LocationGroup)> = Vec::new();
    for item in items {
        let label = if item.location.trim().is_empty() {
            NO_LOCATION.to_string()
        } else {
            item.location.clone()
        };
        let key = location_key(&label);
        match groups.iter_mut().find(|(k, _)| *k == key) {
            Some((_, group)) => group.items.push(item.clone()),
            None => groups.push((
                key,
                LocationGroup {
                    location: label,
                    items: vec![item.clone()],
                },
            )),
        }
    }

    groups.sort_by(|(_, a), (_, b)| compare_folded(&a.location, &b.location));
    groups
        .into_iter()
        .map(|(_, mut group)| {
            group
                .items
                .sort_by(|a, b| compare_folded(&a.category, &b.category));
            group
        })
        .collect()
}
