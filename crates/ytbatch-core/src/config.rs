use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::job::Quality;

/// IP protocol version forced on the downloader (`-4` / `-6`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IpVersion {
    #[default]
    V4,
    V6,
}

impl IpVersion {
    pub fn flag(self) -> &'static str {
        match self {
            IpVersion::V4 => "-4",
            IpVersion::V6 => "-6",
        }
    }
}

/// How the external downloader is launched and the fixed arguments it gets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    /// Downloader executable (looked up on PATH when not absolute).
    pub program: PathBuf,
    /// Arguments placed before all generated ones, e.g. `["-m", "yt_dlp"]`
    /// when `program = "python3"`.
    pub program_args: Vec<String>,
    /// Browser whose stored cookies are reused for authentication.
    pub cookies_browser: String,
    pub ip_version: IpVersion,
    /// Value of `--extractor-args`.
    pub extractor_args: String,
    /// Name of the per-destination archive file used for deduplication.
    pub archive_file_name: String,
    /// Output template joined onto the job's destination directory.
    pub output_template: String,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from("yt-dlp"),
            program_args: Vec::new(),
            cookies_browser: "firefox".to_string(),
            ip_version: IpVersion::V4,
            extractor_args: "youtube:player_client=web_safari;player_js_version=actual".to_string(),
            archive_file_name: "download_archive.txt".to_string(),
            output_template: "%(title)s.%(ext)s".to_string(),
        }
    }
}

/// Defaults applied to every run unless overridden on the command line or by a batch file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    pub quality: Quality,
    pub use_archive: bool,
    /// Fragments fetched concurrently per item (`--concurrent-fragments`).
    pub concurrent_fragments: u32,
    /// Lower bound of the sleep between items, in seconds.
    pub sleep_interval_secs: u32,
    /// Upper bound of the sleep between items, in seconds.
    pub max_sleep_interval_secs: u32,
    /// Default output directory for `ytbatch download` (None = `~/Downloads/youtube`).
    pub output_dir: Option<PathBuf>,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            quality: Quality::default(),
            use_archive: true,
            concurrent_fragments: 8,
            sleep_interval_secs: 3,
            max_sleep_interval_secs: 10,
            output_dir: None,
        }
    }
}

/// Runner timing knobs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Seconds to wait after a graceful terminate before force-killing the downloader.
    pub stop_grace_secs: u64,
    /// Upper bound on how long a paused run sleeps before re-checking its flags.
    pub pause_poll_ms: u64,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            stop_grace_secs: 5,
            pause_poll_ms: 100,
        }
    }
}

/// Command used by `ytbatch update` to upgrade the downloader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdaterConfig {
    pub program: PathBuf,
    pub args: Vec<String>,
    /// Timeout for the update command in seconds.
    pub timeout_secs: u64,
}

impl Default for UpdaterConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from("pip3"),
            args: vec!["install".into(), "-U".into(), "yt-dlp".into()],
            timeout_secs: 120,
        }
    }
}

/// Global configuration loaded from `~/.config/ytbatch/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub tool: ToolConfig,
    #[serde(default)]
    pub defaults: DefaultsConfig,
    #[serde(default)]
    pub runner: RunnerConfig,
    #[serde(default)]
    pub updater: UpdaterConfig,
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("ytbatch")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<AppConfig> {
    load_or_init_at(&config_path()?)
}

/// Like [`load_or_init`] but at an explicit path.
pub fn load_or_init_at(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        let default_cfg = AppConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create config dir: {}", parent.display()))?;
        }
        fs::write(path, toml).with_context(|| format!("write config: {}", path.display()))?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data =
        fs::read_to_string(path).with_context(|| format!("read config: {}", path.display()))?;
    let cfg: AppConfig =
        toml::from_str(&data).with_context(|| format!("parse config: {}", path.display()))?;
    Ok(cfg)
}
