use serde::Serialize;

use super::{DetailState, Phase, ViewState};
use crate::analytics::{self, Analytics};
use crate::model::{FilterState, SortOption, User};
use crate::pipeline::{self, PageItem, ShowingRange};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PaginationView {
    pub current_page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
    pub has_previous: bool,
    pub has_next: bool,
    pub items: Vec<PageItem>,
    pub showing: ShowingRange,
}

/// Serializable snapshot handed to whatever renders the dashboard.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Dashboard {
    #[serde(flatten)]
    pub phase: Phase,
    pub filters: FilterState,
    pub sort: SortOption,
    /// Users on the current page.
    pub rows: Vec<User>,
    /// Filtered list is empty while ready.
    pub empty: bool,
    /// Computed over the whole filtered list, not only the current page.
    pub analytics: Analytics,
    pub pagination: PaginationView,
    pub detail: DetailState,
}

impl Dashboard {
    pub fn from_state(state: &ViewState) -> Self {
        let p = state.pagination;
        Self {
            phase: state.phase.clone(),
            filters: state.filters.clone(),
            sort: state.sort,
            rows: state.current_page().to_vec(),
            empty: state.is_ready() && state.filtered.is_empty(),
            analytics: analytics::aggregate(&state.filtered),
            pagination: PaginationView {
                current_page: p.current_page,
                page_size: p.page_size,
                total_items: p.total_items,
                total_pages: p.total_pages,
                has_previous: p.has_previous(),
                has_next: p.has_next(),
                items: pipeline::page_items(p.current_page, p.total_pages),
                showing: pipeline::showing_range(p.current_page, p.page_size, p.total_items),
            },
            detail: state.detail.clone(),
        }
    }
}

impl From<&ViewState> for Dashboard {
    fn from(state: &ViewState) -> Self {
        Self::from_state(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Status;
    use crate::view::{reduce, Event};

    fn user(id: &str, joined_at: &str, status: Status) -> User {
        User {
            id: id.to_string(),
            name: format!("Person {id}"),
            email: format!("p{id}@example.com"),
            avatar: None,
            status,
            joined_at: joined_at.to_string(),
            bio: String::new(),
            last_seen: String::new(),
        }
    }

    #[test]
    fn analytics_follow_filtered_list_not_page() {
        let users: Vec<User> = (1..=12)
            .map(|i| {
                let status = if i % 3 == 0 { Status::Inactive } else { Status::Active };
                user(&i.to_string(), "2024-04-01T00:00:00Z", status)
            })
            .collect();
        let state = reduce(
            &ViewState::with_page_size(5),
            Event::FetchSucceeded(users),
        );
        let dash = Dashboard::from_state(&state);
        assert_eq!(dash.rows.len(), 5);
        assert_eq!(dash.analytics.total, 12);
        assert_eq!(dash.analytics.active, 8);
        assert_eq!(dash.analytics.active_rate, 67);
        assert_eq!(dash.pagination.total_pages, 3);
        assert!(dash.pagination.has_next);
        assert!(!dash.pagination.has_previous);
        assert_eq!(dash.pagination.showing.end, 5);
        assert!(!dash.empty);
    }

    #[test]
    fn loading_dashboard_is_not_empty_state() {
        let dash = Dashboard::from(&ViewState::default());
        assert_eq!(dash.phase, Phase::Loading);
        assert!(!dash.empty);
        assert!(dash.rows.is_empty());
    }

    #[test]
    fn serializes_phase_inline() {
        let state = reduce(&ViewState::default(), Event::FetchFailed("boom".to_string()));
        let json = serde_json::to_value(Dashboard::from_state(&state)).unwrap();
        assert_eq!(json["phase"], "error");
        assert_eq!(json["message"], "boom");
        assert_eq!(json["detail"]["state"], "closed");
    }
}
