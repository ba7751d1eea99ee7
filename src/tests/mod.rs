use std::collections::BTreeSet;
use std::time::Duration;

use crate::analytics;
use crate::model::{SortOption, Status, User};
use crate::pipeline::{self, PageItem};
use crate::runner::{Options, Session};
use crate::source::DataSource;
use crate::view::{reduce, Dashboard, Event, Phase, ViewState};

fn user(id: usize, name: &str, status: Status, joined_at: &str) -> User {
    User {
        id: id.to_string(),
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
        avatar: None,
        status,
        joined_at: joined_at.to_string(),
        bio: String::new(),
        last_seen: "2024-03-01T12:00:00Z".to_string(),
    }
}

/// Eight users, five Active and three Inactive.
fn directory() -> Vec<User> {
    let names = [
        "Hana Ito", "Ben Carter", "Ava Stone", "Omar Haddad", "Lena Vogel", "Ravi Nair",
        "Chloe Martin", "Diego Ruiz",
    ];
    names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let status = if i < 5 { Status::Active } else { Status::Inactive };
            user(i + 1, name, status, &format!("2024-0{}-12T08:00:00Z", (i % 4) + 1))
        })
        .collect()
}

fn quiet(source: DataSource) -> Options {
    Options {
        source,
        page_size: 5,
        fetch_delay: Duration::ZERO,
        detail_delay: Duration::ZERO,
        ..Options::default()
    }
}

#[test]
fn eight_users_split_over_two_pages_of_five() {
    let users = directory();
    let first = pipeline::paginate(&users, 1, 5);
    let second = pipeline::paginate(&users, 2, 5);
    assert_eq!(first.len(), 5);
    assert_eq!(second.len(), 3);
    assert_eq!(pipeline::total_pages(users.len(), 5), 2);
    assert_eq!(
        pipeline::page_items(1, 2),
        vec![PageItem::Page(1), PageItem::Page(2)]
    );
}

#[test]
fn search_without_match_shows_empty_state() {
    let state = reduce(&ViewState::with_page_size(5), Event::FetchSucceeded(directory()));
    let state = reduce(&state, Event::SearchChanged("zz".to_string()));
    assert!(state.filtered.is_empty());
    let dash = Dashboard::from_state(&state);
    assert!(dash.empty);
    assert!(dash.rows.is_empty());
    assert!(dash.analytics.is_empty());
}

#[test]
fn january_and_february_buckets() {
    let users = vec![
        user(1, "A", Status::Active, "2024-01-03T00:00:00Z"),
        user(2, "B", Status::Active, "2024-01-28T00:00:00Z"),
        user(3, "C", Status::Inactive, "2024-02-14T00:00:00Z"),
    ];
    let a = analytics::aggregate(&users);
    let pairs: Vec<(String, usize)> = a.buckets.iter().map(|b| (b.label.clone(), b.users)).collect();
    assert_eq!(
        pairs,
        vec![("Jan 2024".to_string(), 2), ("Feb 2024".to_string(), 1)]
    );
    assert_eq!(a.avg_per_month, 2);
    assert_eq!(a.active_rate, 67);
}

#[test]
fn pipeline_stages_run_in_order() {
    let users = directory();
    let filters = crate::model::FilterState {
        statuses: BTreeSet::from([Status::Active]),
        search: "a".to_string(),
    };
    let out = pipeline::apply(&users, &filters, SortOption::NameDesc);
    assert!(out.iter().all(|u| u.status == Status::Active));
    assert!(out.windows(2).all(|w| pipeline::locale_cmp(&w[0].name, &w[1].name).is_ge()));
    assert!(out
        .iter()
        .all(|u| u.name.to_lowercase().contains('a') || u.email.contains('a')));
}

#[test]
fn filter_change_resets_page_but_page_size_keeps_filters() {
    let ready = reduce(&ViewState::with_page_size(5), Event::FetchSucceeded(directory()));
    let on_two = reduce(&ready, Event::PageChanged(2));
    assert_eq!(on_two.pagination.current_page, 2);

    let sorted = reduce(&on_two, Event::SortChanged(SortOption::NameAsc));
    assert_eq!(sorted.pagination.current_page, 1);

    let filtered = reduce(&sorted, Event::StatusFilterChanged(BTreeSet::from([Status::Inactive])));
    let resized = reduce(&filtered, Event::PageSizeChanged(20));
    assert_eq!(resized.pagination.page_size, 20);
    assert_eq!(resized.pagination.current_page, 1);
    assert_eq!(resized.filtered.len(), 3);
    assert_eq!(resized.filters.statuses, BTreeSet::from([Status::Inactive]));
}

#[tokio::test]
async fn fetch_success_reaches_ready() {
    let session = Session::new(quiet(DataSource::Inline(directory()))).unwrap();
    let dash = session.run().await.unwrap();
    assert_eq!(dash.phase, Phase::Ready);
    assert_eq!(dash.pagination.total_items, 8);
    assert_eq!(dash.pagination.total_pages, 2);
    assert_eq!(dash.rows.len(), 5);
}

#[tokio::test]
async fn fetch_failure_clears_users_and_retry_recovers() {
    let dir = std::env::temp_dir().join(format!("userdash-it-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("users.json");
    std::fs::write(&path, "{\"users\": null}").unwrap();

    let session = Session::new(quiet(DataSource::File(path.clone()))).unwrap();
    assert!(session.run().await.is_err());
    let state = session.state();
    assert!(matches!(state.phase, Phase::Error { .. }));
    assert!(state.users.is_empty());

    let body = serde_json::json!({ "users": directory() }).to_string();
    std::fs::write(&path, body).unwrap();
    assert_eq!(session.retry().await.unwrap(), 8);
    assert_eq!(session.phase(), Phase::Ready);

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test(start_paused = true)]
async fn detail_view_opens_after_delay_and_closes() {
    let options = Options {
        detail_delay: Duration::from_millis(500),
        ..quiet(DataSource::Inline(directory()))
    };
    let session = Session::new(options).unwrap();
    session.run().await.unwrap();

    assert!(session.open_detail("3").await);
    let state = session.state();
    assert_eq!(state.detail.user().map(|u| u.name.as_str()), Some("Ava Stone"));
    assert!(!matches!(state.detail, crate::view::DetailState::Loading { .. }));

    assert!(!session.close_detail().detail.is_open());
    assert!(!session.open_detail("404").await);
}
