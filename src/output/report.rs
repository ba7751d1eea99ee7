use chrono::{DateTime, Utc};

use crate::analytics::Analytics;
use crate::model::{Status, User};
use crate::pipeline::PageItem;
use crate::utils;
use crate::view::{Dashboard, DetailState, Phase};

fn json_for_script_tag(value: &str) -> String {
    value.replace("</", "<\\/")
}

fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn status_badge(status: Status) -> String {
    let cls = match status {
        Status::Active => "bg-emerald-100 text-emerald-700 dark:bg-emerald-900/30 dark:text-emerald-300",
        Status::Inactive => "bg-slate-100 text-slate-600 dark:bg-slate-800 dark:text-slate-300",
    };
    format!(
        r#"<span class="px-2.5 py-1 rounded-full text-[11px] font-bold uppercase {cls}">{}</span>"#,
        status.as_str()
    )
}

fn table_rows(rows: &[User]) -> String {
    rows.iter()
        .map(|u| {
            format!(
                r#"<tr class="border-b border-slate-100 dark:border-slate-800" data-user-id="{id}">
  <td class="px-6 py-4"><div class="flex items-center gap-3"><div class="size-9 rounded-full bg-primary/10 text-primary flex items-center justify-center font-bold">{initial}</div><span class="font-semibold">{name}</span></div></td>
  <td class="px-6 py-4 text-slate-500">{email}</td>
  <td class="px-6 py-4">{status}</td>
  <td class="px-6 py-4 text-slate-500">{joined}</td>
</tr>"#,
                id = escape_html(&u.id),
                initial = escape_html(&u.initial()),
                name = escape_html(&u.name),
                email = escape_html(&u.email),
                status = status_badge(u.status),
                joined = escape_html(&utils::format_long_date(&u.joined_at)),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn pager(items: &[PageItem], current: usize) -> String {
    items
        .iter()
        .map(|item| match item {
            PageItem::Page(n) if *n == current => format!(
                r#"<span class="flex items-center justify-center size-9 rounded-lg bg-primary text-white text-xs font-bold">{n}</span>"#
            ),
            PageItem::Page(n) => format!(
                r#"<span class="flex items-center justify-center size-9 rounded-lg border border-slate-200 dark:border-slate-700 text-xs font-bold">{n}</span>"#
            ),
            PageItem::Ellipsis => {
                r#"<span class="flex items-center justify-center size-9 text-slate-400 font-bold">…</span>"#.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("")
}

fn analytics_panel(a: &Analytics) -> String {
    if a.is_empty() {
        return r#"<p class="text-slate-500">No data available for the current filters.</p>"#.to_string();
    }
    let widest = a.buckets.iter().map(|b| b.users).max().unwrap_or(0).max(1);
    let bars = a
        .buckets
        .iter()
        .map(|b| {
            format!(
                r#"<div class="flex items-center gap-3 text-xs"><span class="w-20 text-slate-500">{label}</span><div class="h-3 rounded bg-primary" style="width:{pct}%"></div><span class="font-bold">{n}</span></div>"#,
                label = escape_html(&b.label),
                pct = b.users * 100 / widest,
                n = b.users
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        r#"<div class="grid grid-cols-2 md:grid-cols-4 gap-4 mb-6">
  <div><div class="text-xs text-slate-500 uppercase">Total</div><div class="text-2xl font-bold">{total}</div></div>
  <div><div class="text-xs text-slate-500 uppercase">Active</div><div class="text-2xl font-bold text-emerald-600">{active}</div></div>
  <div><div class="text-xs text-slate-500 uppercase">Inactive</div><div class="text-2xl font-bold">{inactive}</div></div>
  <div><div class="text-xs text-slate-500 uppercase">Active rate</div><div class="text-2xl font-bold">{rate}%</div></div>
</div>
<div class="flex flex-col gap-2">{bars}</div>
<p class="mt-4 text-xs text-slate-500">Avg per month: {avg}</p>"#,
        total = a.total,
        active = a.active,
        inactive = a.inactive,
        rate = a.active_rate,
        avg = a.avg_per_month,
    )
}

fn detail_panel(detail: &DetailState, now: DateTime<Utc>) -> String {
    let Some(user) = detail.user() else {
        return String::new();
    };
    let body = match detail {
        DetailState::Loaded { .. } => format!(
            r#"<dl class="grid grid-cols-[8rem_1fr] gap-2 text-sm">
  <dt class="text-slate-500">Email</dt><dd>{email}</dd>
  <dt class="text-slate-500">Status</dt><dd>{status}</dd>
  <dt class="text-slate-500">Joined</dt><dd>{joined}</dd>
  <dt class="text-slate-500">Last seen</dt><dd>{seen} ({ago})</dd>
  <dt class="text-slate-500">Bio</dt><dd>{bio}</dd>
</dl>"#,
            email = escape_html(&user.email),
            status = status_badge(user.status),
            joined = escape_html(&utils::format_long_date(&user.joined_at)),
            seen = escape_html(&utils::format_long_date(&user.last_seen)),
            ago = escape_html(&utils::time_ago_str(&user.last_seen, now)),
            bio = escape_html(&user.bio),
        ),
        DetailState::Failed { message, .. } => format!(
            r#"<p class="text-red-600">{}</p>"#,
            escape_html(message)
        ),
        _ => r#"<p class="text-slate-500">Loading user details...</p>"#.to_string(),
    };
    format!(
        r#"<section class="bg-white dark:bg-slate-900 rounded-2xl border border-slate-200 dark:border-slate-800 p-6 mt-8">
  <h2 class="text-xl mb-4">{name}</h2>
  {body}
</section>"#,
        name = escape_html(&user.name),
    )
}

fn main_section(dashboard: &Dashboard, now: DateTime<Utc>) -> String {
    match &dashboard.phase {
        Phase::Loading => {
            return r#"<p class="text-slate-500">Loading users...</p>"#.to_string();
        }
        Phase::Error { message } => {
            return format!(
                r#"<div class="bg-red-50 dark:bg-red-900/20 border border-red-200 rounded-2xl p-5"><div class="font-bold text-red-700">Something went wrong</div><p class="text-red-600">{}</p></div>"#,
                escape_html(message)
            );
        }
        Phase::Ready => {}
    }
    let p = &dashboard.pagination;
    let table = if dashboard.empty {
        r#"<div class="p-10 text-center"><div class="font-bold">No users found</div><p class="text-slate-500">Try adjusting your search or filter to find what you're looking for.</p></div>"#.to_string()
    } else {
        format!(
            r#"<table class="w-full text-left border-collapse">
  <thead><tr class="bg-slate-50 dark:bg-slate-800/50 text-[11px] uppercase tracking-widest">
    <th class="px-6 py-4">Name</th><th class="px-6 py-4">Email</th><th class="px-6 py-4">Status</th><th class="px-6 py-4">Joined</th>
  </tr></thead>
  <tbody>
{rows}
  </tbody>
</table>
<div class="flex items-center justify-between px-6 py-4">
  <span class="text-xs text-slate-500">Showing {start}-{end} of {total}</span>
  <div class="flex gap-1">{pager}</div>
</div>"#,
            rows = table_rows(&dashboard.rows),
            start = p.showing.start,
            end = p.showing.end,
            total = p.showing.total,
            pager = pager(&p.items, p.current_page),
        )
    };
    format!(
        r#"<div class="grid lg:grid-cols-[2fr_1fr] gap-8">
  <div class="bg-white dark:bg-slate-900 border border-slate-200 dark:border-slate-800 rounded-2xl overflow-hidden shadow-sm">{table}</div>
  <div class="bg-white dark:bg-slate-900 border border-slate-200 dark:border-slate-800 rounded-2xl p-6 shadow-sm"><h2 class="text-lg mb-4">Analytics</h2>{analytics}</div>
</div>
{detail}"#,
        analytics = analytics_panel(&dashboard.analytics),
        detail = detail_panel(&dashboard.detail, now),
    )
}

pub fn render_html(dashboard: &Dashboard, now: DateTime<Utc>) -> Vec<u8> {
    let json = serde_json::to_string(dashboard).unwrap_or_else(|_| "{}".to_string());
    let json = json_for_script_tag(&json);
    let search = dashboard.filters.search.trim();
    let summary = format!(
        "search: {} · status: {} · sort: {}",
        if search.is_empty() { "-" } else { search },
        utils::format_status_set(&dashboard.filters.statuses),
        dashboard.sort.label()
    );

    let html = format!(
        r####"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8"/>
  <meta content="width=device-width, initial-scale=1.0" name="viewport"/>
  <title>User Dashboard</title>
  <script src="https://cdn.tailwindcss.com?plugins=forms,container-queries"></script>
  <script id="tailwind-config">
    tailwind.config = {{
      darkMode: "class",
      theme: {{
        extend: {{
          colors: {{
            "primary": "#135bec",
            "background-light": "#f8fafc",
            "background-dark": "#0f172a"
          }}
        }}
      }}
    }};
  </script>
</head>
<body class="bg-background-light dark:bg-background-dark text-slate-900 dark:text-slate-100 min-h-screen">
  <script type="application/json" id="dashboard-data">{json}</script>
  <header class="flex items-center justify-between border-b border-slate-200 dark:border-slate-800 bg-white dark:bg-slate-900 px-8 py-4">
    <h1 class="text-xl font-bold uppercase tracking-tight">User Dashboard</h1>
    <button id="theme-toggle" class="rounded-xl bg-slate-100 dark:bg-slate-800 px-4 py-2 text-xs font-bold" type="button">Theme</button>
  </header>
  <main class="max-w-[1440px] mx-auto w-full px-8 py-10">
    <p class="text-slate-500 text-sm mb-6">{summary}</p>
    {main}
  </main>
  <script>
    (function() {{
      const root = document.documentElement;
      const stored = localStorage.getItem('userdash-theme');
      if (stored === 'dark') root.classList.add('dark');
      document.getElementById('theme-toggle').addEventListener('click', function() {{
        const dark = root.classList.toggle('dark');
        localStorage.setItem('userdash-theme', dark ? 'dark' : 'light');
      }});
    }})();
  </script>
</body>
</html>"####,
        summary = escape_html(&summary),
        main = main_section(dashboard, now),
    );

    html.into_bytes()
}
