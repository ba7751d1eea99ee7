use clap::{ArgAction, Parser};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "userdash",
    version,
    about = "user-directory dashboard",
    long_about = "userdash loads a static list of user records and shows them as a dashboard: search, status filter, sort, pagination, a monthly join chart and a per-user detail view.\n\nExamples:\n  userdash\n  userdash -s https://example.com/users.json -q alice --status active\n  userdash --sort desc -n 5 -p 2 -o dashboard.html\n  userdash -i\n\nTip: Use --config to persist view settings and keep CLI invocations short."
)]
pub struct CliArgs {
    #[arg(
        short = 'v',
        long = "vb",
        visible_alias = "verbose",
        action = ArgAction::Count,
        help_heading = "Output",
        help = "Increase log verbosity (-v, -vv, -vvv)."
    )]
    pub verbose: u8,

    #[arg(
        short = 'c',
        long = "clr",
        visible_alias = "color",
        help_heading = "Output",
        help = "Enable colored output (overrides --no-color)."
    )]
    pub color: bool,

    #[arg(
        long = "nc",
        visible_alias = "no-color",
        help_heading = "Output",
        help = "Disable colored output."
    )]
    pub no_color: bool,

    #[arg(
        short = 'o',
        long = "out",
        visible_alias = "output",
        value_name = "FILE",
        help_heading = "Output",
        help = "Write the rendered dashboard to a file instead of stdout."
    )]
    pub output: Option<String>,

    #[arg(
        long = "of",
        visible_alias = "output-format",
        value_name = "FORMAT",
        help_heading = "Output",
        help = "Output format: text, json or html (inferred from --output extension)."
    )]
    pub output_format: Option<String>,

    #[arg(
        short = 's',
        long = "src",
        visible_alias = "source",
        value_name = "PATH|URL",
        help_heading = "Input",
        help = "Users document to load (file path or http(s) URL)."
    )]
    pub source: Option<String>,

    #[arg(
        short = 'C',
        long = "cfg",
        visible_alias = "config",
        value_name = "FILE",
        help_heading = "Input",
        help = "Path to config file (defaults to ~/.userdash/config.yml when present)."
    )]
    pub config: Option<String>,

    #[arg(
        long = "init-config",
        help_heading = "Input",
        help = "Write a commented default config file and exit."
    )]
    pub init_config: bool,

    #[arg(
        short = 'q',
        long = "q",
        visible_alias = "search",
        value_name = "TEXT",
        help_heading = "View",
        help = "Search text matched against name and email (case-insensitive)."
    )]
    pub search: Option<String>,

    #[arg(
        long = "st",
        visible_alias = "status",
        value_name = "STATUSES",
        help_heading = "View",
        help = "Status filter, comma-separated (Active,Inactive) or 'all'."
    )]
    pub status: Option<String>,

    #[arg(
        long = "so",
        visible_alias = "sort",
        value_name = "ORDER",
        help_heading = "View",
        help = "Sort by name: asc, desc or none."
    )]
    pub sort: Option<String>,

    #[arg(
        short = 'p',
        long = "pg",
        visible_alias = "page",
        value_name = "N",
        help_heading = "View",
        help = "Page to show (1-based, clamped to the last page)."
    )]
    pub page: Option<usize>,

    #[arg(
        short = 'n',
        long = "ps",
        visible_alias = "page-size",
        value_name = "N",
        help_heading = "View",
        help = "Rows per page: 5, 10 or 20."
    )]
    pub page_size: Option<usize>,

    #[arg(
        short = 'u',
        long = "usr",
        visible_alias = "user",
        value_name = "ID",
        help_heading = "View",
        help = "Open the detail view for a user id."
    )]
    pub user: Option<String>,

    #[arg(
        short = 'i',
        long = "it",
        visible_alias = "interactive",
        help_heading = "View",
        help = "Read commands from stdin (type 'help' for the list)."
    )]
    pub interactive: bool,

    #[arg(
        long = "to",
        visible_alias = "timeout",
        value_name = "SECONDS",
        help_heading = "Network",
        help = "HTTP timeout in seconds."
    )]
    pub timeout: Option<usize>,

    #[arg(
        short = 'x',
        long = "px",
        visible_alias = "proxy",
        value_name = "URL",
        help_heading = "Network",
        help = "HTTP proxy for URL sources."
    )]
    pub proxy: Option<String>,

    #[arg(
        long = "fd",
        visible_alias = "fetch-delay",
        value_name = "MS",
        help_heading = "Timing",
        help = "Simulated delay before the fetch (milliseconds)."
    )]
    pub fetch_delay: Option<u64>,

    #[arg(
        long = "dd",
        visible_alias = "detail-delay",
        value_name = "MS",
        help_heading = "Timing",
        help = "Simulated loading delay of the detail view (milliseconds)."
    )]
    pub detail_delay: Option<u64>,

    #[arg(
        long = "db",
        visible_alias = "debounce",
        value_name = "MS",
        help_heading = "Timing",
        help = "Quiet period before interactive search input is applied (milliseconds)."
    )]
    pub debounce: Option<u64>,
}
