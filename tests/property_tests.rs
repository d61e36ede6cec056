use chrono::Utc;
use proptest::prelude::*;
use uuid::Uuid;

use home_inventory::models::Item;
use home_inventory::views::{
    fold, group_by_location, location_key, page_window, paginate, LocationFilter, PageLink,
};

fn item(location: &str, category: &str) -> Item {
    Item {
        id: Uuid::new_v4(),
        name: "Thing".into(),
        quantity: 1,
        category: category.into(),
        location: location.into(),
        condition: None,
        notes: None,
        purchase_link: None,
        stock_management_enabled: false,
        min_stock: None,
        optimal_stock: None,
        created_at: Utc::now(),
    }
}

proptest! {
    #[test]
    fn pages_cover_every_entry_once(len in 0usize..300, page_size in 1usize..60) {
        let entries: Vec<usize> = (0..len).collect();
        let total = paginate(&entries, 1, page_size).total_pages;
        prop_assert_eq!(total, (len + page_size - 1) / page_size);

        let joined: Vec<usize> = (1..=total)
            .flat_map(|p| paginate(&entries, p, page_size).entries)
            .collect();
        prop_assert_eq!(joined, entries.clone());
        prop_assert!(paginate(&entries, total + 1, page_size).entries.is_empty());
    }

    #[test]
    fn page_window_is_bounded_and_ordered(total in 1usize..200, pick in 0usize..200) {
        let current = pick % total + 1;
        let links = page_window(current, total);
        let numbers: Vec<usize> = links
            .iter()
            .filter_map(|link| match link {
                PageLink::Number(n) => Some(*n),
                PageLink::Ellipsis => None,
            })
            .collect();

        prop_assert!(links.len() <= 7);
        prop_assert_eq!(numbers.first().copied(), Some(1));
        prop_assert_eq!(numbers.last().copied(), Some(total));
        prop_assert!(numbers.contains(&current));
        prop_assert!(numbers.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn groups_are_case_insensitive_and_sorted(
        locations in prop::collection::vec(prop::sample::select(vec!["Cuisine", "cuisine", "Salon", "SALON", "Cave", "Entrée", "entree", "ENTRE\u{301}E"]), 1..30)
    ) {
        let items: Vec<Item> = locations.iter().map(|l| item(l, "Divers")).collect();
        let groups = group_by_location(&items, &LocationFilter::All);

        let folded: Vec<String> = groups.iter().map(|g| fold(&g.location)).collect();
        prop_assert!(folded.windows(2).all(|w| w[0] <= w[1]));

        let mut keys: Vec<String> = groups.iter().map(|g| location_key(&g.location)).collect();
        keys.sort();
        keys.dedup();
        prop_assert_eq!(keys.len(), groups.len());

        let grouped: usize = groups.iter().map(|g| g.items.len()).sum();
        prop_assert_eq!(grouped, items.len());
    }
}
