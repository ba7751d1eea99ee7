use crate::cli::args::CliArgs;
use crate::model::{is_allowed_page_size, SortOption};

pub fn validate(args: &CliArgs) -> Result<(), String> {
    if let Some(size) = args.page_size {
        if !is_allowed_page_size(size) {
            return Err(format!("invalid --page-size {size}, expected 5, 10 or 20"));
        }
    }
    if let Some(page) = args.page {
        if page == 0 {
            return Err("invalid --page, expected positive integer".to_string());
        }
    }
    if let Some(timeout) = args.timeout {
        if timeout == 0 {
            return Err("invalid --timeout, expected positive integer".to_string());
        }
    }
    if let Some(raw) = args.status.as_deref() {
        crate::utils::parse_status_set_csv(raw)
            .map_err(|e| format!("invalid --status '{raw}': {e}"))?;
    }
    if let Some(raw) = args.sort.as_deref() {
        raw.parse::<SortOption>()
            .map_err(|e| format!("invalid --sort '{raw}': {e}"))?;
    }
    if let Some(raw) = args.output_format.as_deref() {
        if crate::output::OutputFormat::parse(raw).is_none() {
            return Err(format!(
                "invalid --output-format '{raw}', expected text, json or html"
            ));
        }
    }
    if args.interactive && args.output.is_some() {
        return Err("--output cannot be combined with --interactive".to_string());
    }
    Ok(())
}
