use std::error::Error;
use std::time::Duration;

use userdash::model::{Status, User};
use userdash::runner::{Options, Session};
use userdash::source::DataSource;

fn member(id: &str, name: &str, status: Status, joined_at: &str) -> User {
    User {
        id: id.to_string(),
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        avatar: None,
        status,
        joined_at: joined_at.to_string(),
        bio: String::new(),
        last_seen: joined_at.to_string(),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let session = Session::new(Options {
        source: DataSource::Inline(vec![
            member("1", "Alice", Status::Active, "2024-01-04T10:00:00Z"),
            member("2", "Albert", Status::Inactive, "2024-01-20T10:00:00Z"),
            member("3", "Bob", Status::Active, "2024-02-11T10:00:00Z"),
        ]),
        fetch_delay: Duration::ZERO,
        search_debounce: Duration::from_millis(100),
        ..Options::default()
    })?;
    session.run().await?;

    let mut changes = session.subscribe();
    session.search("a");
    session.search("al");
    changes.changed().await?;

    let dashboard = session.dashboard();
    println!("Matches for 'al': {}", dashboard.pagination.total_items);
    println!("Active rate: {}%", dashboard.analytics.active_rate);

    Ok(())
}
