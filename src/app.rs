use std::collections::HashMap;
use std::time::Duration;

use chrono::Utc;
use clap::{error::ErrorKind, CommandFactory, Parser};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use tokio::fs::OpenOptions;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::EnvFilter;

use crate::cli::args::CliArgs;
use crate::cli::validation;
use crate::config::{self, ConfigFile};
use crate::model::{is_allowed_page_size, SortOption};
use crate::output::{self, OutputFormat};
use crate::runner::{self, Options, Session};
use crate::source::DataSource;
use crate::view::Phase;

fn print_banner() {
    const BANNER: &str = r#"
                                 __           __
   __  __________  _____    ____/ /___ ______/ /_
  / / / / ___/ _ \/ ___/   / __  / __ `/ ___/ __ \
 / /_/ (__  )  __/ /      / /_/ / /_/ (__  ) / / /
 \__,_/____/\___/_/       \__,_/\__,_/____/_/ /_/
       v0.1.0 - user directory dashboard
    "#;
    print!("{}", BANNER);
    println!();
}

fn format_kv_line(label: &str, value: &str) {
    println!(":: {:<10}: {}", label, value);
}

/// Installs the global tracing subscriber. `RUST_LOG` wins over `-v`; logs go to stderr so
/// rendered output on stdout stays clean.
fn init_tracing(verbose: u8, no_color: bool) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("userdash={level}")));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(!no_color)
        .with_target(false)
        .try_init();
}

fn render_custom_help() -> String {
    let cmd = CliArgs::command();
    let mut out = String::new();

    out.push_str(cmd.get_name());
    if let Some(version) = cmd.get_version() {
        out.push(' ');
        out.push_str(version);
    }
    out.push('\n');

    if let Some(about) = cmd.get_about() {
        out.push_str(&about.to_string());
        out.push('\n');
    }

    if let Some(long_about) = cmd.get_long_about() {
        out.push('\n');
        out.push_str(&long_about.to_string());
        out.push('\n');
    }

    out.push('\n');
    out.push_str("Usage: ");
    out.push_str(cmd.get_name());
    out.push_str(" [OPTIONS]\n\n");

    let mut sections: Vec<(String, Vec<&clap::Arg>)> = Vec::new();
    let mut section_idx: HashMap<String, usize> = HashMap::new();

    for arg in cmd.get_arguments() {
        if arg.is_hide_set() {
            continue;
        }
        let heading = arg.get_help_heading().unwrap_or("Options").to_string();
        let idx = match section_idx.get(&heading).copied() {
            Some(i) => i,
            None => {
                sections.push((heading.clone(), Vec::new()));
                let i = sections.len() - 1;
                section_idx.insert(heading, i);
                i
            }
        };
        sections[idx].1.push(arg);
    }

    for (heading, args) in sections {
        out.push_str(&heading);
        out.push_str(":\n");

        for arg in args {
            let mut parts: Vec<String> = Vec::new();
            if let Some(short) = arg.get_short() {
                parts.push(format!("-{short}"));
            }
            if let Some(long) = arg.get_long() {
                parts.push(format!("--{long}"));
            }
            if let Some(aliases) = arg.get_visible_aliases() {
                for alias in aliases {
                    let rendered = format!("--{alias}");
                    if !parts.iter().any(|p| p == &rendered) {
                        parts.push(rendered);
                    }
                }
            }

            let mut flags = parts.join(", ");
            if arg.get_action().takes_values() {
                let value_name = arg
                    .get_value_names()
                    .and_then(|names| names.first())
                    .map(|name| name.as_str())
                    .unwrap_or("VALUE");
                flags.push_str(&format!(" <{value_name}>"));
            }

            out.push_str("  ");
            out.push_str(&flags);
            out.push('\n');

            if let Some(help) = arg.get_help() {
                let help = help.to_string();
                if !help.trim().is_empty() {
                    out.push_str("          ");
                    out.push_str(help.trim());
                    out.push('\n');
                }
            }
        }
        out.push('\n');
    }

    out
}

const REPL_HELP: &str = "\
Commands:
  search <text>              filter by name or email (debounced; no text clears now)
  status <active,inactive|all>
  sort <asc|desc|none|toggle>
  page <n> | next | prev
  size <5|10|20>
  show <id> | close          open or close the user detail view
  retry | reload             fetch the users again
  render                     print the dashboard
  help | quit
";

struct RunConfig {
    options: Options,
    output: Option<String>,
    output_format: OutputFormat,
    user: Option<String>,
    interactive: bool,
    no_color: bool,
    verbose: u8,
}

fn build_run_config(args: CliArgs, cfg: ConfigFile) -> Result<RunConfig, String> {
    validation::validate(&args)?;

    let no_color = if args.color {
        false
    } else {
        args.no_color || cfg.no_color.unwrap_or(false)
    };

    let source = args
        .source
        .or(cfg.source)
        .map(|s| DataSource::parse(&s))
        .unwrap_or_default();

    let search = args.search.or(cfg.search).unwrap_or_default();

    let status_raw = args.status.or(cfg.status).unwrap_or_default();
    let statuses = crate::utils::parse_status_set_csv(&status_raw)
        .map_err(|e| format!("invalid status filter '{status_raw}': {e}"))?;

    let sort_raw = args.sort.or(cfg.sort).unwrap_or_default();
    let sort: SortOption = sort_raw
        .parse()
        .map_err(|e| format!("invalid sort '{sort_raw}': {e}"))?;

    let page = args.page.or(cfg.page).unwrap_or(1);
    if page == 0 {
        return Err("invalid page 0, expected positive integer".to_string());
    }
    let page_size = args
        .page_size
        .or(cfg.page_size)
        .unwrap_or(crate::model::DEFAULT_PAGE_SIZE);
    if !is_allowed_page_size(page_size) {
        return Err(format!("invalid page size {page_size}, expected 5, 10 or 20"));
    }
    let timeout_seconds = args.timeout.or(cfg.timeout).unwrap_or(10);
    if timeout_seconds == 0 {
        return Err("invalid timeout 0, expected positive integer".to_string());
    }
    let proxy = args
        .proxy
        .or(cfg.proxy)
        .filter(|p| !p.trim().is_empty());

    let fetch_delay = args
        .fetch_delay
        .or(cfg.fetch_delay_ms)
        .map(Duration::from_millis)
        .unwrap_or(runner::DEFAULT_FETCH_DELAY);
    let detail_delay = args
        .detail_delay
        .or(cfg.detail_delay_ms)
        .map(Duration::from_millis)
        .unwrap_or(runner::DEFAULT_DETAIL_DELAY);
    let search_debounce = args
        .debounce
        .or(cfg.search_debounce_ms)
        .map(Duration::from_millis)
        .unwrap_or(crate::debounce::DEFAULT_SEARCH_DEBOUNCE);

    let output = if args.interactive {
        None
    } else {
        args.output.or(cfg.output).map(|p| config::expand_tilde_string(&p))
    };
    let output_format = match args.output_format.or(cfg.output_format) {
        Some(raw) => OutputFormat::parse(&raw)
            .ok_or_else(|| format!("invalid output format '{raw}', expected text, json or html"))?,
        None => output
            .as_deref()
            .and_then(output::infer_format_from_path)
            .unwrap_or(OutputFormat::Text),
    };

    Ok(RunConfig {
        options: Options {
            source,
            search,
            statuses,
            sort,
            page,
            page_size,
            timeout_seconds,
            proxy,
            fetch_delay,
            detail_delay,
            search_debounce,
        },
        output,
        output_format,
        user: args.user.filter(|u| !u.trim().is_empty()),
        interactive: args.interactive,
        no_color,
        verbose: args.verbose,
    })
}

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::with_draw_target(None, ProgressDrawTarget::stderr());
    pb.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn print_summary(run: &RunConfig) {
    let opts = &run.options;
    format_kv_line("Source", &opts.source.describe());
    format_kv_line("Page size", &opts.page_size.to_string());
    format_kv_line("Sort", opts.sort.label());
    format_kv_line("Status", &crate::utils::format_status_set(&opts.statuses));
    if !opts.search.trim().is_empty() {
        format_kv_line("Search", opts.search.trim());
    }
    if let Some(path) = run.output.as_deref() {
        format_kv_line("Output", path);
    }
    println!();
}

fn print_dashboard(session: &Session) {
    let rendered = output::render_text(&session.dashboard(), Utc::now());
    print!("{}", String::from_utf8_lossy(&rendered));
}

async fn write_output(path: &str, rendered: &[u8]) -> Result<(), String> {
    let mut outfile = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
        .await
        .map_err(|e| format!("failed to open output file: {e}"))?;
    outfile
        .write_all(rendered)
        .await
        .map_err(|_| "failed to write output file".to_string())?;
    Ok(())
}

async fn load_with_spinner(session: &Session, retry: bool) {
    let pb = spinner("Loading users...");
    let result = if retry {
        session.retry().await
    } else {
        session.load().await
    };
    pb.finish_and_clear();
    if let Ok(count) = result {
        tracing::debug!(users = count, "load finished");
    }
}

async fn run_once(session: &Session, run: &RunConfig) -> Result<(), String> {
    let pb = spinner("Loading users...");
    let result = session.run().await;
    pb.finish_and_clear();

    if result.is_ok() {
        if let Some(id) = run.user.as_deref() {
            if !session.open_detail(id).await {
                return Err(format!("no user with id '{id}'"));
            }
        }
    }

    let dashboard = session.dashboard();
    let rendered = output::render(&dashboard, run.output_format, Utc::now());
    match run.output.as_deref() {
        Some(path) => {
            write_output(path, &rendered).await?;
            format_kv_line("Saved", path);
        }
        None => {
            let mut stdout = tokio::io::stdout();
            stdout
                .write_all(&rendered)
                .await
                .map_err(|e| format!("failed to write output: {e}"))?;
            let _ = stdout.flush().await;
        }
    }

    match (result, dashboard.phase) {
        (Err(e), _) => Err(e.to_string()),
        (Ok(_), Phase::Error { message }) => Err(message),
        _ => Ok(()),
    }
}

enum Flow {
    Continue,
    Render,
    Quit,
}

async fn handle_command(session: &Session, line: &str) -> Flow {
    let line = line.trim();
    let (cmd, rest) = match line.split_once(char::is_whitespace) {
        Some((cmd, rest)) => (cmd, rest.trim()),
        None => (line, ""),
    };
    match cmd.to_lowercase().as_str() {
        "" => Flow::Continue,
        "quit" | "exit" | "q" => Flow::Quit,
        "help" | "?" => {
            print!("{REPL_HELP}");
            Flow::Continue
        }
        "render" | "r" => Flow::Render,
        "search" | "/" if rest.is_empty() => {
            session.search_now("");
            Flow::Render
        }
        "search" | "/" => {
            session.search(rest);
            Flow::Continue
        }
        "status" => match crate::utils::parse_status_set_csv(rest) {
            Ok(set) => {
                session.set_statuses(set);
                Flow::Render
            }
            Err(e) => {
                println!("{}", e.red());
                Flow::Continue
            }
        },
        "sort" => {
            if rest.eq_ignore_ascii_case("toggle") || rest.is_empty() {
                session.toggle_sort();
                return Flow::Render;
            }
            match rest.parse::<SortOption>() {
                Ok(sort) => {
                    session.set_sort(sort);
                    Flow::Render
                }
                Err(e) => {
                    println!("{}", e.red());
                    Flow::Continue
                }
            }
        }
        "page" => match crate::utils::parse_positive(rest) {
            Ok(n) => {
                session.go_to_page(n);
                Flow::Render
            }
            Err(e) => {
                println!("{}", e.red());
                Flow::Continue
            }
        },
        "next" | "n" => {
            session.next_page();
            Flow::Render
        }
        "prev" | "p" => {
            session.previous_page();
            Flow::Render
        }
        "size" => match crate::utils::parse_page_size(rest) {
            Ok(size) => {
                session.set_page_size(size);
                Flow::Render
            }
            Err(e) => {
                println!("{}", e.red());
                Flow::Continue
            }
        },
        "show" => {
            if rest.is_empty() {
                println!("{}", "usage: show <id>".red());
                return Flow::Continue;
            }
            if !session.state().is_ready() {
                println!("{}", "users are not loaded".red());
                return Flow::Continue;
            }
            println!("{}", "Loading user details...".dimmed());
            if session.open_detail(rest).await {
                Flow::Render
            } else {
                println!("{}", format!("no user with id '{rest}'").red());
                Flow::Continue
            }
        }
        "close" => {
            session.close_detail();
            Flow::Render
        }
        "retry" => {
            if !matches!(session.phase(), Phase::Error { .. }) {
                println!("nothing to retry");
                return Flow::Continue;
            }
            load_with_spinner(session, true).await;
            Flow::Render
        }
        "reload" => {
            load_with_spinner(session, false).await;
            Flow::Render
        }
        other => {
            println!("{}", format!("unknown command '{other}', type 'help'").red());
            Flow::Continue
        }
    }
}

async fn run_interactive(session: &Session) -> Result<(), String> {
    let pb = spinner("Loading users...");
    let _ = session.run().await;
    pb.finish_and_clear();
    print_dashboard(session);
    println!("{}", "Type 'help' for commands.".dimmed());

    let mut rx = session.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut awaiting_search = false;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(e) => return Err(format!("failed to read stdin: {e}")),
                };
                let flow = handle_command(session, &line).await;
                awaiting_search = session.has_pending_search();
                rx.borrow_and_update();
                match flow {
                    Flow::Quit => break,
                    Flow::Render => print_dashboard(session),
                    Flow::Continue => {}
                }
            }
            changed = rx.changed(), if awaiting_search => {
                if changed.is_err() {
                    break;
                }
                rx.borrow_and_update();
                awaiting_search = false;
                print_dashboard(session);
            }
        }
    }
    Ok(())
}

async fn run_async(run: RunConfig) -> Result<(), String> {
    if run.no_color {
        colored::control::set_override(false);
    }
    let to_stdout_text = run.output.is_none() && run.output_format == OutputFormat::Text;
    if run.interactive || to_stdout_text {
        print_banner();
        print_summary(&run);
    }

    let session = Session::new(run.options.clone()).map_err(|e| e.to_string())?;

    if run.interactive {
        return run_interactive(&session).await;
    }
    run_once(&session, &run).await
}

pub fn run_cli() -> Result<(), String> {
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp => {
                print!("{}", render_custom_help());
                return Ok(());
            }
            ErrorKind::DisplayVersion => {
                let cmd = CliArgs::command();
                print!("{}", cmd.render_version());
                return Ok(());
            }
            _ => return Err(e.to_string()),
        },
    };

    let user_config_path = args.config.clone().map(|p| config::expand_tilde(&p));

    if args.init_config {
        let path = user_config_path
            .or_else(config::default_config_path)
            .ok_or_else(|| "could not determine home directory for config".to_string())?;
        if config::ensure_default_config_file(&path)? {
            format_kv_line("Config", &format!("written to {}", path.display()));
        } else {
            format_kv_line("Config", &format!("{} already exists", path.display()));
        }
        return Ok(());
    }

    let cfg = match user_config_path.as_ref() {
        Some(path) => config::load_config(path, false)?,
        None => match config::default_config_path() {
            Some(path) => config::load_config(&path, true)?,
            None => ConfigFile::default(),
        },
    };

    let run = build_run_config(args, cfg)?;
    init_tracing(run.verbose, run.no_color);

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("failed to build runtime: {e}"))?;

    rt.block_on(run_async(run))
}
