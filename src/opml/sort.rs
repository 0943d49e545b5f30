use super::types::{FeedEntry, Subscriptions};

/// Sorts feeds by case-insensitive title.
///
/// The sort is stable: entries whose lowercased titles are equal (such as
/// `"A"` and `"a"`) keep their original relative order.
pub fn sort_entries(entries: &mut [FeedEntry]) {
    entries.sort_by_cached_key(|entry| entry.title.to_lowercase());
}

/// Sorts the flat list once, or each category's feeds independently.
/// Categories themselves stay in document order.
pub fn sort_subscriptions(subscriptions: &mut Subscriptions) {
    match subscriptions {
        Subscriptions::Flat(entries) => sort_entries(entries),
        Subscriptions::Categorized(groups) => {
            for group in groups.iter_mut() {
                sort_entries(&mut group.entries);
            }
        }
    }
}
