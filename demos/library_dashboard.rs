use std::error::Error;
use std::time::Duration;

use userdash::model::{SortOption, Status};
use userdash::runner::{Options, Session};
use userdash::source::DataSource;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let session = Session::new(Options {
        source: DataSource::parse("./data/users.json"),
        statuses: [Status::Active].into_iter().collect(),
        sort: SortOption::NameAsc,
        page_size: 5,
        fetch_delay: Duration::ZERO,
        ..Options::default()
    })?;

    let dashboard = session.run().await?;

    println!(
        "Showing {}-{} of {}",
        dashboard.pagination.showing.start,
        dashboard.pagination.showing.end,
        dashboard.pagination.showing.total
    );
    for user in dashboard.rows.iter() {
        println!("{} {} {}", user.id, user.name, user.email);
    }
    for bucket in dashboard.analytics.buckets.iter() {
        println!("{} {}", bucket.label, bucket.users);
    }

    Ok(())
}
