pub mod dashboard;

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;

use crate::model::{is_allowed_page_size, FilterState, PaginationState, SortOption, Status, User};
use crate::pipeline;

pub use dashboard::{Dashboard, PaginationView};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum Phase {
    Loading,
    Ready,
    Error { message: String },
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DetailState {
    #[default]
    Closed,
    Loading { user: User },
    Loaded { user: User },
    Failed { user: User, message: String },
}

impl DetailState {
    pub fn user(&self) -> Option<&User> {
        match self {
            Self::Closed => None,
            Self::Loading { user } | Self::Loaded { user } | Self::Failed { user, .. } => Some(user),
        }
    }

    pub fn is_open(&self) -> bool {
        !matches!(self, Self::Closed)
    }

    /// Swaps in the record with the same id from a freshly fetched list, or closes when the
    /// user is gone.
    fn refreshed(self, users: &[User]) -> Self {
        let Some(id) = self.user().map(|u| u.id.clone()) else {
            return self;
        };
        let Some(fresh) = users.iter().find(|u| u.id == id).cloned() else {
            return Self::Closed;
        };
        match self {
            Self::Closed => Self::Closed,
            Self::Loading { .. } => Self::Loading { user: fresh },
            Self::Loaded { .. } => Self::Loaded { user: fresh },
            Self::Failed { message, .. } => Self::Failed { user: fresh, message },
        }
    }
}

/// Everything the dashboard shows, derived from `users` plus the filter, sort and page
/// inputs. Never patched in place: [`reduce`] builds a fresh value for every event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ViewState {
    pub phase: Phase,
    /// Raw list from the last successful fetch.
    pub users: Arc<[User]>,
    pub filters: FilterState,
    pub sort: SortOption,
    /// `users` after search, status filter and sort. Not yet paginated.
    pub filtered: Arc<[User]>,
    pub pagination: PaginationState,
    pub detail: DetailState,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            phase: Phase::Loading,
            users: Arc::from(Vec::new()),
            filters: FilterState::default(),
            sort: SortOption::None,
            filtered: Arc::from(Vec::new()),
            pagination: PaginationState::default(),
            detail: DetailState::Closed,
        }
    }
}

impl ViewState {
    pub fn with_page_size(page_size: usize) -> Self {
        let mut state = Self::default();
        if is_allowed_page_size(page_size) {
            state.pagination = state.pagination.with_page_size(page_size);
        }
        state
    }

    /// Loading state that already carries the starting filters and sort, so they apply to
    /// whichever fetch succeeds first.
    pub fn with_view(page_size: usize, filters: FilterState, sort: SortOption) -> Self {
        Self {
            filters,
            sort,
            ..Self::with_page_size(page_size)
        }
    }

    pub fn current_page(&self) -> &[User] {
        pipeline::paginate(
            &self.filtered[..],
            self.pagination.current_page,
            self.pagination.page_size,
        )
    }

    pub fn is_ready(&self) -> bool {
        self.phase == Phase::Ready
    }

    pub fn error(&self) -> Option<&str> {
        match &self.phase {
            Phase::Error { message } => Some(message),
            _ => None,
        }
    }

    pub fn find_user(&self, id: &str) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    /// Re-runs search -> status filter -> sort and puts the cursor back on page 1.
    fn refiltered(self) -> Self {
        let filtered: Arc<[User]> = pipeline::apply(&self.users, &self.filters, self.sort).into();
        let pagination = self.pagination.reset(filtered.len());
        Self {
            filtered,
            pagination,
            ..self
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    FetchStarted,
    FetchSucceeded(Vec<User>),
    FetchFailed(String),
    Retry,
    SearchChanged(String),
    StatusFilterChanged(BTreeSet<Status>),
    SortChanged(SortOption),
    PageChanged(usize),
    PageSizeChanged(usize),
    UserSelected(String),
    DetailSettled,
    DetailFailed(String),
    DetailClosed,
}

/// Pure transition function. Events that make no sense in the current phase return an
/// unchanged copy.
pub fn reduce(state: &ViewState, event: Event) -> ViewState {
    let current = state.clone();
    match event {
        Event::FetchStarted | Event::Retry => ViewState {
            phase: Phase::Loading,
            ..current
        },
        Event::FetchSucceeded(users) => {
            let detail = current.detail.clone().refreshed(&users);
            ViewState {
                phase: Phase::Ready,
                users: users.into(),
                detail,
                ..current
            }
            .refiltered()
        }
        Event::FetchFailed(message) => ViewState {
            phase: Phase::Error { message },
            users: Arc::from(Vec::new()),
            filtered: Arc::from(Vec::new()),
            pagination: current.pagination.reset(0),
            detail: DetailState::Closed,
            ..current
        },
        Event::SearchChanged(search) => ViewState {
            filters: FilterState {
                search,
                ..current.filters.clone()
            },
            ..current
        }
        .refiltered(),
        Event::StatusFilterChanged(statuses) => ViewState {
            filters: FilterState {
                statuses,
                ..current.filters.clone()
            },
            ..current
        }
        .refiltered(),
        Event::SortChanged(sort) => ViewState { sort, ..current }.refiltered(),
        Event::PageChanged(page) => ViewState {
            pagination: current.pagination.with_page(page),
            ..current
        },
        Event::PageSizeChanged(size) if is_allowed_page_size(size) => ViewState {
            pagination: current.pagination.with_page_size(size),
            ..current
        },
        Event::PageSizeChanged(_) => current,
        Event::UserSelected(id) => match current.find_user(&id).cloned() {
            Some(user) => ViewState {
                detail: DetailState::Loading { user },
                ..current
            },
            None => current,
        },
        Event::DetailSettled => match current.detail.clone() {
            DetailState::Loading { user } => ViewState {
                detail: DetailState::Loaded { user },
                ..current
            },
            _ => current,
        },
        Event::DetailFailed(message) => match current.detail.clone() {
            DetailState::Loading { user } => ViewState {
                detail: DetailState::Failed { user, message },
                ..current
            },
            _ => current,
        },
        Event::DetailClosed => ViewState {
            detail: DetailState::Closed,
            ..current
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str, name: &str, status: Status) -> User {
        User {
            id: id.to_string(),
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            avatar: None,
            status,
            joined_at: "2024-01-15T08:00:00Z".to_string(),
            bio: String::new(),
            last_seen: String::new(),
        }
    }

    fn eight_users() -> Vec<User> {
        let names = ["Hal", "Gia", "Fay", "Eve", "Dan", "Cal", "Bea", "Abe"];
        names
            .iter()
            .enumerate()
            .map(|(i, n)| {
                let status = if i < 5 { Status::Active } else { Status::Inactive };
                user(&(i + 1).to_string(), n, status)
            })
            .collect()
    }

    fn ready(page_size: usize) -> ViewState {
        reduce(
            &ViewState::with_page_size(page_size),
            Event::FetchSucceeded(eight_users()),
        )
    }

    #[test]
    fn fetch_success_populates_totals() {
        let s = ready(5);
        assert!(s.is_ready());
        assert_eq!(s.pagination.total_items, 8);
        assert_eq!(s.pagination.total_pages, 2);
        assert_eq!(s.current_page().len(), 5);

        let s = reduce(&s, Event::PageChanged(2));
        assert_eq!(s.current_page().len(), 3);
    }

    #[test]
    fn fetch_failure_clears_users_and_retry_reloads() {
        let s = reduce(&ready(10), Event::UserSelected("1".to_string()));
        let failed = reduce(&s, Event::FetchFailed("Failed to fetch users".to_string()));
        assert_eq!(failed.error(), Some("Failed to fetch users"));
        assert!(failed.users.is_empty());
        assert!(failed.filtered.is_empty());
        assert_eq!(failed.pagination.total_items, 0);
        assert!(!failed.detail.is_open());

        let retried = reduce(&failed, Event::Retry);
        assert_eq!(retried.phase, Phase::Loading);
    }

    #[test]
    fn filter_and_sort_changes_reset_page() {
        let s = reduce(&ready(5), Event::PageChanged(2));
        assert_eq!(s.pagination.current_page, 2);

        let sorted = reduce(&s, Event::SortChanged(SortOption::NameAsc));
        assert_eq!(sorted.pagination.current_page, 1);
        assert_eq!(sorted.current_page()[0].name, "Abe");

        let paged = reduce(&sorted, Event::PageChanged(2));
        let inactive = reduce(
            &paged,
            Event::StatusFilterChanged(BTreeSet::from([Status::Inactive])),
        );
        assert_eq!(inactive.pagination.current_page, 1);
        assert_eq!(inactive.pagination.total_items, 3);
        assert_eq!(inactive.pagination.total_pages, 1);
        let names: Vec<&str> = inactive.current_page().iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["Abe", "Bea", "Cal"]);
    }

    #[test]
    fn search_without_match_empties_view() {
        let s = reduce(&ready(10), Event::SearchChanged("zz".to_string()));
        assert!(s.filtered.is_empty());
        assert!(s.current_page().is_empty());
        assert_eq!(s.pagination.total_pages, 0);
        assert_eq!(s.pagination.current_page, 1);
        assert_eq!(s.users.len(), 8);
    }

    #[test]
    fn page_change_keeps_filters_and_clamps() {
        let s = reduce(&ready(5), Event::SearchChanged("a".to_string()));
        let before = s.filtered.clone();
        let s = reduce(&s, Event::PageChanged(99));
        assert_eq!(s.filtered, before);
        assert_eq!(s.pagination.current_page, s.pagination.last_page());
    }

    #[test]
    fn page_size_change_resets_and_recomputes() {
        let s = reduce(&ready(5), Event::PageChanged(2));
        let s = reduce(&s, Event::PageSizeChanged(20));
        assert_eq!(s.pagination.current_page, 1);
        assert_eq!(s.pagination.total_pages, 1);

        let unchanged = reduce(&s, Event::PageSizeChanged(7));
        assert_eq!(unchanged, s);
    }

    #[test]
    fn detail_lifecycle() {
        let s = ready(10);
        let unknown = reduce(&s, Event::UserSelected("nope".to_string()));
        assert!(!unknown.detail.is_open());

        let opening = reduce(&s, Event::UserSelected("3".to_string()));
        assert!(matches!(opening.detail, DetailState::Loading { ref user } if user.name == "Fay"));

        let loaded = reduce(&opening, Event::DetailSettled);
        assert!(matches!(loaded.detail, DetailState::Loaded { .. }));
        // settling twice is a no-op
        assert_eq!(reduce(&loaded, Event::DetailSettled), loaded);

        let closed = reduce(&loaded, Event::DetailClosed);
        assert_eq!(closed.detail, DetailState::Closed);
    }

    #[test]
    fn refetch_refreshes_or_closes_open_detail() {
        let open = reduce(
            &reduce(&ready(10), Event::UserSelected("3".to_string())),
            Event::DetailSettled,
        );

        let mut renamed = eight_users();
        renamed[2].name = "Fay Renamed".to_string();
        let refreshed = reduce(&open, Event::FetchSucceeded(renamed));
        assert!(matches!(
            refreshed.detail,
            DetailState::Loaded { ref user } if user.name == "Fay Renamed"
        ));

        let without: Vec<User> = eight_users().into_iter().filter(|u| u.id != "3").collect();
        let gone = reduce(&open, Event::FetchSucceeded(without));
        assert_eq!(gone.detail, DetailState::Closed);
    }

    #[test]
    fn starting_view_survives_failed_fetch() {
        let start = ViewState::with_view(
            5,
            FilterState {
                statuses: BTreeSet::from([Status::Inactive]),
                search: String::new(),
            },
            SortOption::NameAsc,
        );
        let failed = reduce(&start, Event::FetchFailed("offline".to_string()));
        let retried = reduce(&failed, Event::Retry);
        let ready = reduce(&retried, Event::FetchSucceeded(eight_users()));
        let names: Vec<&str> = ready.filtered.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["Abe", "Bea", "Cal"]);
        assert_eq!(ready.pagination.page_size, 5);
    }

    #[test]
    fn reduce_leaves_previous_state_untouched() {
        let s = ready(5);
        let snapshot = s.clone();
        let _ = reduce(&s, Event::SortChanged(SortOption::NameDesc));
        assert_eq!(s, snapshot);
    }
}
