use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::watch;

use crate::debounce::{Debouncer, DEFAULT_SEARCH_DEBOUNCE};
use crate::model::{
    is_allowed_page_size, FilterState, SortOption, Status, DEFAULT_PAGE_SIZE, PAGE_SIZES,
};
use crate::source::{self, DataSource, SourceError};
use crate::view::{reduce, Dashboard, Event, Phase, ViewState};

pub const DEFAULT_FETCH_DELAY: Duration = Duration::from_millis(800);
pub const DEFAULT_DETAIL_DELAY: Duration = Duration::from_millis(500);

#[derive(Clone, Debug)]
pub struct Options {
    pub source: DataSource,
    pub search: String,
    pub statuses: BTreeSet<Status>,
    pub sort: SortOption,
    pub page: usize,
    pub page_size: usize,
    pub timeout_seconds: usize,
    pub proxy: Option<String>,
    /// Cosmetic pause before the fetch is issued.
    pub fetch_delay: Duration,
    /// Cosmetic pause while the detail view shows its loading state.
    pub detail_delay: Duration,
    pub search_debounce: Duration,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            source: DataSource::default(),
            search: String::new(),
            statuses: BTreeSet::new(),
            sort: SortOption::None,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            timeout_seconds: 10,
            proxy: None,
            fetch_delay: DEFAULT_FETCH_DELAY,
            detail_delay: DEFAULT_DETAIL_DELAY,
            search_debounce: DEFAULT_SEARCH_DEBOUNCE,
        }
    }
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("invalid page_size {value}, expected 5, 10 or 20")]
    InvalidPageSize { value: usize },

    #[error("invalid page {value}, expected positive integer")]
    InvalidPage { value: usize },

    #[error("invalid timeout {value}, expected positive integer")]
    InvalidTimeout { value: usize },

    #[error(transparent)]
    Source(#[from] SourceError),
}

struct Shared {
    source: DataSource,
    client: reqwest::Client,
    state: watch::Sender<ViewState>,
}

impl Shared {
    fn dispatch(&self, event: Event) -> ViewState {
        tracing::debug!(?event, "applying view event");
        let mut applied = ViewState::default();
        self.state.send_modify(|state| {
            *state = reduce(state, event);
            applied = state.clone();
        });
        applied
    }
}

/// Owns the current [`ViewState`] and drives the async parts around it: the fetch, the
/// debounced search box and the detail view's loading pause.
pub struct Session {
    options: Options,
    shared: Arc<Shared>,
    search: Debouncer<String>,
    /// Starting page from [`Options`], consumed by the first successful fetch. 0 once used.
    initial_page: AtomicUsize,
}

impl Session {
    pub fn new(options: Options) -> Result<Self, RunnerError> {
        if !is_allowed_page_size(options.page_size) {
            return Err(RunnerError::InvalidPageSize {
                value: options.page_size,
            });
        }
        if options.page == 0 {
            return Err(RunnerError::InvalidPage {
                value: options.page,
            });
        }
        if options.timeout_seconds == 0 {
            return Err(RunnerError::InvalidTimeout {
                value: options.timeout_seconds,
            });
        }
        let client = source::build_client(options.proxy.as_deref(), options.timeout_seconds)?;
        let initial = ViewState::with_view(
            options.page_size,
            FilterState {
                statuses: options.statuses.clone(),
                search: options.search.clone(),
            },
            options.sort,
        );
        let (state, _) = watch::channel(initial);
        let shared = Arc::new(Shared {
            source: options.source.clone(),
            client,
            state,
        });
        let sink = Arc::clone(&shared);
        let search = Debouncer::new(options.search_debounce, move |text: String| {
            sink.dispatch(Event::SearchChanged(text));
        });
        let initial_page = AtomicUsize::new(options.page);
        Ok(Self {
            options,
            shared,
            search,
            initial_page,
        })
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn state(&self) -> ViewState {
        self.shared.state.borrow().clone()
    }

    pub fn dashboard(&self) -> Dashboard {
        Dashboard::from_state(&self.shared.state.borrow())
    }

    /// Receives every state replacement, including debounced search results.
    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.shared.state.subscribe()
    }

    pub fn dispatch(&self, event: Event) -> ViewState {
        self.shared.dispatch(event)
    }

    /// Loading -> Ready | Error. Returns the number of users on success; on failure the
    /// state already carries the message and the error is handed back as well.
    pub async fn load(&self) -> Result<usize, SourceError> {
        self.dispatch(Event::FetchStarted);
        self.fetch().await
    }

    /// Retry from the error state; re-enters Loading and fetches again.
    pub async fn retry(&self) -> Result<usize, SourceError> {
        self.dispatch(Event::Retry);
        self.fetch().await
    }

    async fn fetch(&self) -> Result<usize, SourceError> {
        if !self.options.fetch_delay.is_zero() {
            tokio::time::sleep(self.options.fetch_delay).await;
        }
        match source::load_users(&self.shared.source, &self.shared.client).await {
            Ok(users) => {
                let count = users.len();
                tracing::info!(
                    source = %self.shared.source.describe(),
                    users = count,
                    "users loaded"
                );
                self.dispatch(Event::FetchSucceeded(users));
                let page = self.initial_page.swap(0, Ordering::SeqCst);
                if page > 1 {
                    self.go_to_page(page);
                }
                Ok(count)
            }
            Err(e) => {
                tracing::error!(source = %self.shared.source.describe(), error = %e, "fetch failed");
                self.search.cancel();
                self.dispatch(Event::FetchFailed(e.to_string()));
                Err(e)
            }
        }
    }

    /// Loads once. The starting search, status filter and sort from [`Options`] are part of
    /// the state from construction, so they also hold when the first load fails and a later
    /// [`Session::retry`] succeeds.
    pub async fn run(&self) -> Result<Dashboard, RunnerError> {
        self.load().await?;
        Ok(self.dashboard())
    }

    /// Debounced: only the last text within the quiet period is applied.
    pub fn search(&self, text: impl Into<String>) {
        self.search.call(text.into());
    }

    /// Applies search text immediately, dropping any pending debounced input.
    pub fn search_now(&self, text: impl Into<String>) -> ViewState {
        self.search.cancel();
        self.dispatch(Event::SearchChanged(text.into()))
    }

    pub fn has_pending_search(&self) -> bool {
        self.search.is_pending()
    }

    pub fn set_statuses(&self, statuses: BTreeSet<Status>) -> ViewState {
        self.dispatch(Event::StatusFilterChanged(statuses))
    }

    pub fn set_sort(&self, sort: SortOption) -> ViewState {
        self.dispatch(Event::SortChanged(sort))
    }

    pub fn toggle_sort(&self) -> ViewState {
        let next = self.shared.state.borrow().sort.toggled();
        self.set_sort(next)
    }

    pub fn go_to_page(&self, page: usize) -> ViewState {
        self.dispatch(Event::PageChanged(page))
    }

    pub fn next_page(&self) -> ViewState {
        let page = self.shared.state.borrow().pagination.current_page;
        self.go_to_page(page.saturating_add(1))
    }

    pub fn previous_page(&self) -> ViewState {
        let page = self.shared.state.borrow().pagination.current_page;
        self.go_to_page(page.saturating_sub(1))
    }

    pub fn set_page_size(&self, size: usize) -> ViewState {
        if !is_allowed_page_size(size) {
            tracing::warn!(size, allowed = ?PAGE_SIZES, "ignoring unsupported page size");
        }
        self.dispatch(Event::PageSizeChanged(size))
    }

    /// Opens the detail view for `id`, waits out the cosmetic delay, then shows the record
    /// already held. Returns false when no such user is loaded.
    pub async fn open_detail(&self, id: &str) -> bool {
        let state = self.dispatch(Event::UserSelected(id.to_string()));
        if !state.detail.is_open() {
            tracing::warn!(user = %id, "no such user");
            return false;
        }
        if !self.options.detail_delay.is_zero() {
            tokio::time::sleep(self.options.detail_delay).await;
        }
        self.dispatch(Event::DetailSettled);
        true
    }

    pub fn close_detail(&self) -> ViewState {
        self.dispatch(Event::DetailClosed)
    }

    pub fn phase(&self) -> Phase {
        self.shared.state.borrow().phase.clone()
    }
}
