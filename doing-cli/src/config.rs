use anyhow::{Context, Result};
use directories::BaseDirs;
use doing_core::Config;
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::debug;

const DEFAULT_DOING_FILE: &str = "what_was_i_doing.md";

/// Optional keys of `config.toml`:
///
/// ```toml
/// doing_file = "~/journal/doing.md"
/// current_section = "Currently"
/// archive_section = "Archive"
/// later_section = "Later"
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    doing_file: Option<PathBuf>,
    current_section: Option<String>,
    archive_section: Option<String>,
    later_section: Option<String>,
}

/// Builds the engine config: file values over defaults, then `doing_file`
/// (the `--doing-file` flag or `DOING_FILE`) over both.
pub fn load(doing_file: Option<&Path>, config_file: Option<&Path>) -> Result<Config> {
    let file_config = match config_file {
        Some(path) => read_file_config(path)?,
        None => match default_config_file() {
            Some(path) => read_file_config(&path)?,
            None => FileConfig::default(),
        },
    };
    let config = merge(file_config, doing_file, BaseDirs::new().map(|b| b.home_dir().to_path_buf()));
    config.validate().context("invalid section name in config")?;
    Ok(config)
}

fn merge(file_config: FileConfig, doing_file: Option<&Path>, home: Option<PathBuf>) -> Config {
    let path = doing_file
        .map(Path::to_path_buf)
        .or(file_config.doing_file)
        .map(|p| expand_home(p, home.as_deref()))
        .unwrap_or_else(|| {
            home.as_deref()
                .unwrap_or(Path::new("."))
                .join(DEFAULT_DOING_FILE)
        });

    let mut config = Config::new(path);
    if let Some(name) = non_empty(file_config.current_section) {
        config.current_section = name;
    }
    if let Some(name) = non_empty(file_config.archive_section) {
        config.archive_section = name;
    }
    if let Some(name) = non_empty(file_config.later_section) {
        config.later_section = name;
    }
    config
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// `~/x` → `<home>/x`
fn expand_home(path: PathBuf, home: Option<&Path>) -> PathBuf {
    match (path.strip_prefix("~"), home) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path,
    }
}

/// First existing of `~/.config/doing/config.toml` and the platform config dir.
fn default_config_file() -> Option<PathBuf> {
    let base = BaseDirs::new()?;
    [
        base.home_dir().join(".config").join("doing").join("config.toml"),
        base.config_dir().join("doing").join("config.toml"),
    ]
    .into_iter()
    .find(|p| p.exists())
}

fn read_file_config(path: &Path) -> Result<FileConfig> {
    let s = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    debug!(path = %path.display(), "loaded config file");
    parse_file(&s).with_context(|| format!("parsing {}", path.display()))
}

fn parse_file(s: &str) -> Result<FileConfig> {
    Ok(toml::from_str::<FileConfig>(s)?)
}
