pub mod pages;

use std::cmp::Ordering;
use std::collections::BTreeSet;

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::model::{FilterState, SortOption, Status, User};

pub use pages::{page_items, paginate, showing_range, total_pages, PageItem, ShowingRange};

/// Case-insensitive substring match on name and email. A blank query keeps everything.
pub fn search(users: &[User], query: &str) -> Vec<User> {
    if query.trim().is_empty() {
        return users.to_vec();
    }
    let term = query.to_lowercase();
    users
        .iter()
        .filter(|u| u.name.to_lowercase().contains(&term) || u.email.to_lowercase().contains(&term))
        .cloned()
        .collect()
}

/// An empty set means "all statuses".
pub fn filter_by_status(users: &[User], statuses: &BTreeSet<Status>) -> Vec<User> {
    if statuses.is_empty() {
        return users.to_vec();
    }
    users
        .iter()
        .filter(|u| statuses.contains(&u.status))
        .cloned()
        .collect()
}

pub fn sort_users(users: &[User], option: SortOption) -> Vec<User> {
    let mut sorted = users.to_vec();
    // slice::sort_by is stable, so equal names keep their prior order.
    match option {
        SortOption::NameAsc => sorted.sort_by(|a, b| locale_cmp(&a.name, &b.name)),
        SortOption::NameDesc => sorted.sort_by(|a, b| locale_cmp(&b.name, &a.name)),
        SortOption::None => {}
    }
    sorted
}

fn base_letters(s: &str) -> impl Iterator<Item = char> + '_ {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
}

fn with_accents(s: &str) -> impl Iterator<Item = char> + '_ {
    s.nfd().flat_map(char::to_lowercase)
}

/// Tiered comparison in the manner of a UI collation: base letters with accents and case
/// ignored, then accents (unaccented first), then case (lower first), then raw code points.
/// So "Émilie" sorts among the e's and "e" < "é" < "f".
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    base_letters(a)
        .cmp(base_letters(b))
        .then_with(|| with_accents(a).cmp(with_accents(b)))
        .then_with(|| case_cmp(a, b))
        .then_with(|| a.cmp(b))
}

fn case_cmp(a: &str, b: &str) -> Ordering {
    for (ca, cb) in a.nfd().zip(b.nfd()) {
        if ca == cb {
            continue;
        }
        match (ca.is_lowercase(), cb.is_lowercase()) {
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            _ => break,
        }
    }
    Ordering::Equal
}

/// search, then status filter, then sort. Pagination is applied by the caller on the result.
pub fn apply(users: &[User], filters: &FilterState, sort: SortOption) -> Vec<User> {
    let matched = search(users, &filters.search);
    let filtered = filter_by_status(&matched, &filters.statuses);
    sort_users(&filtered, sort)
}
