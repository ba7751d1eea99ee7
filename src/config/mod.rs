use std::env;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq)]
pub struct ConfigFile {
    pub source: Option<String>,
    pub search: Option<String>,
    #[serde(alias = "status_filter")]
    pub status: Option<String>,
    pub sort: Option<String>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
    pub timeout: Option<usize>,
    pub proxy: Option<String>,
    pub fetch_delay_ms: Option<u64>,
    pub detail_delay_ms: Option<u64>,
    #[serde(alias = "debounce_ms")]
    pub search_debounce_ms: Option<u64>,
    pub output: Option<String>,
    pub output_format: Option<String>,
    pub no_color: Option<bool>,
}

fn home_dir() -> Option<PathBuf> {
    env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(|| env::var_os("USERPROFILE").map(PathBuf::from))
        .or_else(|| {
            let drive = env::var_os("HOMEDRIVE")?;
            let path = env::var_os("HOMEPATH")?;
            Some(PathBuf::from(drive).join(path))
        })
}

pub fn default_config_path() -> Option<PathBuf> {
    Some(home_dir()?.join(".userdash").join("config.yml"))
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\")) {
        if let Some(home) = home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

pub fn expand_tilde_string(path: &str) -> String {
    expand_tilde(path).to_string_lossy().to_string()
}

pub fn parse_config(contents: &str, path: &Path) -> Result<ConfigFile, String> {
    serde_yaml::from_str::<Option<ConfigFile>>(contents)
        .map(Option::unwrap_or_default)
        .map_err(|e| format!("failed to parse config '{}': {e}", path.display()))
}

pub fn load_config(path: &Path, allow_missing: bool) -> Result<ConfigFile, String> {
    match std::fs::read_to_string(path) {
        Ok(contents) => parse_config(&contents, path),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound && allow_missing => {
            Ok(ConfigFile::default())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(format!("config file not found '{}'", path.display()))
        }
        Err(e) => Err(format!("failed to read config '{}': {e}", path.display())),
    }
}

fn default_config_yaml() -> String {
    r#"# userdash config
#
# Location (default):
#   ~/.userdash/config.yml

# Data source: a local JSON file or an http(s) URL serving {"users": [...]}
source: ./data/users.json

# Initial view
# search: ""
# status: Active,Inactive   # empty or "all" shows everyone
sort: none                  # name_asc | name_desc | none
page: 1
page_size: 10               # 5 | 10 | 20

# HTTP
timeout: 10
# proxy: http://127.0.0.1:8080

# Timing (milliseconds)
fetch_delay_ms: 800
detail_delay_ms: 500
search_debounce_ms: 300

# Output (optional)
# output: ./dashboard.html
# output_format: html       # text | json | html

no_color: false
"#
    .to_string()
}

pub fn ensure_default_config_file(path: &Path) -> Result<bool, String> {
    if path.exists() {
        return Ok(false);
    }
    let parent = path
        .parent()
        .ok_or_else(|| format!("invalid config path '{}'", path.display()))?;
    std::fs::create_dir_all(parent).map_err(|e| {
        format!(
            "failed to create config directory '{}': {e}",
            parent.display()
        )
    })?;
    std::fs::write(path, default_config_yaml())
        .map_err(|e| format!("failed to write config file '{}': {e}", path.display()))?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_yaml_parses() {
        let cfg = parse_config(&default_config_yaml(), Path::new("default.yml")).unwrap();
        assert_eq!(cfg.source.as_deref(), Some("./data/users.json"));
        assert_eq!(cfg.page_size, Some(10));
        assert_eq!(cfg.search_debounce_ms, Some(300));
        assert_eq!(cfg.sort.as_deref(), Some("none"));
    }

    #[test]
    fn empty_file_is_default() {
        assert_eq!(
            parse_config("", Path::new("empty.yml")).unwrap(),
            ConfigFile::default()
        );
    }

    #[test]
    fn aliases_are_accepted() {
        let cfg = parse_config("status_filter: active\ndebounce_ms: 50\n", Path::new("a.yml")).unwrap();
        assert_eq!(cfg.status.as_deref(), Some("active"));
        assert_eq!(cfg.search_debounce_ms, Some(50));
    }

    #[test]
    fn missing_file_handling() {
        let path = Path::new("/definitely/not/here/config.yml");
        assert_eq!(load_config(path, true).unwrap(), ConfigFile::default());
        assert!(load_config(path, false).is_err());
    }

    #[test]
    fn writes_default_once() {
        let dir = env::temp_dir().join(format!("userdash-cfg-{}", std::process::id()));
        let path = dir.join("config.yml");
        let _ = std::fs::remove_dir_all(&dir);
        assert!(ensure_default_config_file(&path).unwrap());
        assert!(!ensure_default_config_file(&path).unwrap());
        assert!(load_config(&path, false).is_ok());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
