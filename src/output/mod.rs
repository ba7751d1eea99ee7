pub mod report;

use chrono::{DateTime, Utc};
use colored::Colorize;

use crate::analytics::{parse_timestamp, Analytics};
use crate::model::{Status, User};
use crate::pipeline::PageItem;
use crate::utils;
use crate::view::{Dashboard, DetailState, Phase};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Html,
}

impl OutputFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "text" | "txt" => Some(Self::Text),
            "json" => Some(Self::Json),
            "html" | "htm" => Some(Self::Html),
            _ => None,
        }
    }
}

pub fn infer_format_from_path(path: &str) -> Option<OutputFormat> {
    let lower = path.trim().to_lowercase();
    if lower.ends_with(".json") {
        return Some(OutputFormat::Json);
    }
    if lower.ends_with(".html") || lower.ends_with(".htm") {
        return Some(OutputFormat::Html);
    }
    if lower.ends_with(".txt") {
        return Some(OutputFormat::Text);
    }
    None
}

pub fn render(dashboard: &Dashboard, format: OutputFormat, now: DateTime<Utc>) -> Vec<u8> {
    match format {
        OutputFormat::Text => render_text(dashboard, now),
        OutputFormat::Json => render_json(dashboard),
        OutputFormat::Html => report::render_html(dashboard, now),
    }
}

pub fn render_json(dashboard: &Dashboard) -> Vec<u8> {
    serde_json::to_vec_pretty(dashboard).unwrap_or_else(|_| b"{}\n".to_vec())
}

fn short_date(raw: &str) -> String {
    parse_timestamp(raw)
        .map(|dt| dt.format("%b %-d, %Y").to_string())
        .unwrap_or_else(|| raw.to_string())
}

fn status_cell(status: Status) -> String {
    let label = format!("{:<8}", status.as_str());
    match status {
        Status::Active => label.green().to_string(),
        Status::Inactive => label.dimmed().to_string(),
    }
}

fn format_kv_line(out: &mut String, label: &str, value: &str) {
    out.push_str(&format!(":: {:<10}: {}\n", label, value));
}

pub fn render_page_items(items: &[PageItem], current: usize) -> String {
    items
        .iter()
        .map(|item| match item {
            PageItem::Page(n) if *n == current => format!("[{n}]").bold().to_string(),
            PageItem::Page(n) => n.to_string(),
            PageItem::Ellipsis => "…".to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn render_table(out: &mut String, rows: &[User]) {
    out.push_str(&format!(
        "  {:<6} {:<22} {:<30} {:<8} {}\n",
        "ID", "NAME", "EMAIL", "STATUS", "JOINED"
    )
    .bold()
    .to_string());
    for u in rows {
        out.push_str(&format!(
            "  {:<6} {:<22} {:<30} {} {}\n",
            utils::truncate(&u.id, 6),
            utils::truncate(&u.name, 22),
            utils::truncate(&u.email, 30),
            status_cell(u.status),
            short_date(&u.joined_at),
        ));
    }
}

pub fn render_analytics(out: &mut String, a: &Analytics) {
    out.push_str(&format!("{}\n", "Analytics".bold()));
    if a.is_empty() {
        out.push_str("  No data available for the current filters\n");
        return;
    }
    out.push_str(&format!(
        "  Total {}  Active {}  Inactive {}  Active rate {}%\n",
        a.total,
        a.active.to_string().green(),
        a.inactive,
        a.active_rate
    ));
    out.push_str("  Users joined per month\n");
    let widest = a.buckets.iter().map(|b| b.users).max().unwrap_or(0);
    for b in &a.buckets {
        let width = if widest == 0 { 0 } else { (b.users * 30).div_ceil(widest) };
        out.push_str(&format!(
            "  {:<8} | {} {}\n",
            b.label,
            "#".repeat(width).blue(),
            b.users
        ));
    }
    out.push_str(&format!("  Avg per month: {}\n", a.avg_per_month));
    if a.skipped > 0 {
        out.push_str(&format!(
            "  {} user(s) left out of the chart: unreadable join date\n",
            a.skipped
        ));
    }
}

pub fn render_detail(out: &mut String, detail: &DetailState, now: DateTime<Utc>) {
    let user = match detail {
        DetailState::Closed => return,
        DetailState::Loading { user } => {
            out.push_str(&format!("{} {}\n", user.name.bold(), "loading details...".dimmed()));
            return;
        }
        DetailState::Failed { user, message } => {
            out.push_str(&format!("{} {}\n", user.name.bold(), message.red()));
            return;
        }
        DetailState::Loaded { user } => user,
    };
    out.push_str(&format!(
        "[{}] {} {}\n",
        user.initial().bold(),
        user.name.bold(),
        status_cell(user.status).trim_end()
    ));
    format_kv_line(out, "Email", &user.email);
    format_kv_line(out, "ID", &user.id);
    format_kv_line(out, "Joined", &utils::format_long_date(&user.joined_at));
    format_kv_line(
        out,
        "Last seen",
        &format!(
            "{} ({})",
            utils::format_long_date(&user.last_seen),
            utils::time_ago_str(&user.last_seen, now)
        ),
    );
    if let Some(avatar) = user.avatar.as_deref() {
        format_kv_line(out, "Avatar", avatar);
    }
    if !user.bio.trim().is_empty() {
        format_kv_line(out, "Bio", user.bio.trim());
    }
}

pub fn render_text(dashboard: &Dashboard, now: DateTime<Utc>) -> Vec<u8> {
    let mut out = String::new();
    match &dashboard.phase {
        Phase::Loading => {
            out.push_str("Loading users...\n");
            return out.into_bytes();
        }
        Phase::Error { message } => {
            out.push_str(&format!("{}\n", "Something went wrong".red().bold()));
            out.push_str(&format!("  {message}\n"));
            out.push_str("  Try again with 'retry'.\n");
            return out.into_bytes();
        }
        Phase::Ready => {}
    }

    let p = &dashboard.pagination;
    let search = dashboard.filters.search.trim();
    format_kv_line(
        &mut out,
        "Filters",
        &format!(
            "search={} status={} sort={}",
            if search.is_empty() { "-" } else { search },
            utils::format_status_set(&dashboard.filters.statuses),
            dashboard.sort.label()
        ),
    );
    out.push('\n');

    if dashboard.empty {
        out.push_str(&format!("{}\n", "No users found".bold()));
        out.push_str("  Try adjusting your search or filter to find what you're looking for.\n");
    } else {
        render_table(&mut out, &dashboard.rows);
        out.push('\n');
        out.push_str(&format!(
            "  Showing {}-{} of {}  |  Page {} of {}  |  {} per page\n",
            p.showing.start,
            p.showing.end,
            p.showing.total,
            p.current_page,
            p.total_pages.max(1),
            p.page_size
        ));
        out.push_str(&format!(
            "  {}\n",
            render_page_items(&p.items, p.current_page)
        ));
    }
    out.push('\n');
    render_analytics(&mut out, &dashboard.analytics);

    if dashboard.detail.is_open() {
        out.push('\n');
        render_detail(&mut out, &dashboard.detail, now);
    }
    out.into_bytes()
}
